mod gemini;

use futures::future::BoxFuture;

pub use gemini::GeminiChatClient;

#[derive(thiserror::Error, Debug)]
pub enum ChatError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("http error {0}: {1}")]
    HttpStatus(u16, String),

    #[error("response contains no candidates")]
    NoCandidates,

    #[error("candidate contains no content parts")]
    NoParts,

    #[error("content part contains no text")]
    NoText,
}

pub trait ChatClient: Send + Sync {
    fn reply(&self, prompt: String) -> BoxFuture<'_, Result<String, ChatError>>;
}
