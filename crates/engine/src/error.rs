use api_client::error::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No session available to follow")]
    NoSession,

    #[error("Session {0} not found upstream")]
    SessionNotFound(u64),

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}
