use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComparisonError {
    #[error("Cannot compare driver {0} against themselves")]
    SameDriver(u32),
}
