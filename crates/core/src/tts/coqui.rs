use crate::config::ServiceUrl;
use crate::tts::{TtsClient, TtsError};
use crate::util::{is_transient_status, retry_with_backoff, RetryConfig};
use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;

/// Client for a Coqui-TTS `/api/tts` endpoint. Text and speaker go in the
/// query string; the body of a successful response is the WAV audio.
#[derive(Clone)]
pub struct CoquiTtsClient {
    client: Client,
    url: ServiceUrl,
    retry: RetryConfig,
}

impl CoquiTtsClient {
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

    async fn request(&self, text: &str, speaker_id: &str) -> Result<Bytes, TtsError> {
        let response = self
            .client
            .get(self.url.as_url().clone())
            .query(&[("text", text), ("speaker_id", speaker_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable body".to_owned());
            return Err(TtsError::HttpStatus(status, body));
        }

        Ok(response.bytes().await?)
    }
}

impl TtsClient for CoquiTtsClient {
    fn synthesize(
        &self,
        text: String,
        speaker_id: String,
    ) -> BoxFuture<'_, Result<Bytes, TtsError>> {
        async move {
            retry_with_backoff(
                &self.retry,
                || self.request(&text, &speaker_id),
                |e| matches!(e, TtsError::HttpStatus(status, _) if is_transient_status(*status)),
            )
            .await
        }
        .boxed()
    }
}
