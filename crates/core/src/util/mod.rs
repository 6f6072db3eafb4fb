pub mod retry;

pub use retry::{is_transient_status, retry_with_backoff, RetryConfig};
