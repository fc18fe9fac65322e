use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("SPAWN_FAILED: {0}")]
    Spawn(String),
    #[error("COMMAND_FAILED: {0}")]
    CommandFailed(String),
    #[error("TIMED_OUT: {0}")]
    Timeout(String),
    #[error("MALFORMED_OUTPUT: {0}")]
    MalformedOutput(String),
    #[error("CONFIG_INVALID: {0}")]
    Config(String),
    #[error("IO_FAILURE: {0}")]
    Io(String),
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
}

impl From<std::io::Error> for CheckerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for CheckerError {
    fn from(value: serde_json::Error) -> Self {
        Self::MalformedOutput(value.to_string())
    }
}

impl From<serde_yaml::Error> for CheckerError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Config(value.to_string())
    }
}

pub type CheckerResult<T> = Result<T, CheckerError>;
