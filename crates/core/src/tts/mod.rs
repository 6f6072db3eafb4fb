mod coqui;

use bytes::Bytes;
use futures::future::BoxFuture;

pub use coqui::CoquiTtsClient;

#[derive(thiserror::Error, Debug)]
pub enum TtsError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("http error {0}: {1}")]
    HttpStatus(u16, String),
}

/// Synthesizes speech for a reply. The returned bytes are a complete WAV
/// file, written to disk verbatim and decoded separately for analysis.
pub trait TtsClient: Send + Sync {
    fn synthesize(
        &self,
        text: String,
        speaker_id: String,
    ) -> BoxFuture<'_, Result<Bytes, TtsError>>;
}
