use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Unknown sort field: {0}")]
    UnknownSortField(String),
}
