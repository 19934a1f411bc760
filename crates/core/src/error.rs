use thiserror::Error;

pub type ProjectorResult<T> = Result<T, ProjectorError>;

/// Errors raised by the layers around the engine. The forward model, the
/// solver and the insight rules are total and never return one of these.
#[derive(Error, Debug)]
pub enum ProjectorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ProjectorError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
