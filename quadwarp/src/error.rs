use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WarpError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("degenerate configuration: {0}")]
    DegenerateConfiguration(String),

    #[cfg(feature = "serde")]
    #[error("settings error: {0}")]
    Settings(String),
}
