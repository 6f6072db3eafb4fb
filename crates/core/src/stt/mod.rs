mod whisper;

use bytes::Bytes;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

pub use whisper::WhisperHttpClient;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
}

#[derive(thiserror::Error, Debug)]
pub enum SttError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("http error {0}: {1}")]
    HttpStatus(u16, String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("transcription came back empty")]
    EmptyTranscript,
}

pub trait SttClient: Send + Sync {
    fn transcribe(
        &self,
        wav: Bytes,
        language: String,
    ) -> BoxFuture<'_, Result<Transcript, SttError>>;
}
