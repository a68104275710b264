use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned status {0}: {1}")]
    Status(u16, String),

    #[error("Failed to deserialize response: {0}")]
    Deserialization(String),
}
