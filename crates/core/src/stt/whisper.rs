use crate::config::ServiceUrl;
use crate::stt::{SttClient, SttError, Transcript};
use crate::util::{is_transient_status, retry_with_backoff, RetryConfig};
use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

/// Client for a whisper-server `/inference` endpoint: the recorded question
/// goes up as a multipart WAV, the transcript comes back as JSON.
#[derive(Clone)]
pub struct WhisperHttpClient {
    client: Client,
    url: ServiceUrl,
    retry: RetryConfig,
}

#[derive(Deserialize)]
struct InferenceResponse {
    text: String,
}

impl WhisperHttpClient {
    pub fn new(url: ServiceUrl) -> Self {
        Self {
            client: Client::new(),
            url,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn request(&self, wav: Bytes, language: &str) -> Result<Transcript, SttError> {
        let part = Part::bytes(wav.to_vec())
            .file_name("input.wav")
            .mime_str("audio/wav")?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url.as_url().clone())
            .query(&[("language", language)])
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable body".to_owned());
            return Err(SttError::HttpStatus(status, body));
        }

        let parsed: InferenceResponse = response
            .json()
            .await
            .map_err(|e| SttError::InvalidResponse(e.to_string()))?;
        transcript_from_response(parsed)
    }
}

// Whitespace-only transcripts are rejected before they reach the chat step.
fn transcript_from_response(parsed: InferenceResponse) -> Result<Transcript, SttError> {
    let text = parsed.text.trim().to_owned();
    if text.is_empty() {
        return Err(SttError::EmptyTranscript);
    }
    Ok(Transcript { text })
}

impl SttClient for WhisperHttpClient {
    fn transcribe(
        &self,
        wav: Bytes,
        language: String,
    ) -> BoxFuture<'_, Result<Transcript, SttError>> {
        async move {
            retry_with_backoff(
                &self.retry,
                || self.request(wav.clone(), &language),
                |e| matches!(e, SttError::HttpStatus(status, _) if is_transient_status(*status)),
            )
            .await
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inference_response_parses_and_trims() {
        let parsed: InferenceResponse =
            serde_json::from_str(r#"{"text": " hallo daar \n"}"#).expect("parse");
        let transcript = transcript_from_response(parsed).expect("non-empty");
        assert_eq!(transcript.text, "hallo daar");
    }

    #[test]
    fn whitespace_only_transcript_is_an_error() {
        let parsed: InferenceResponse = serde_json::from_str(r#"{"text": "  \n "}"#).expect("parse");
        let err = transcript_from_response(parsed).unwrap_err();
        assert!(matches!(err, SttError::EmptyTranscript));
    }
}
