use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("store unavailable: {0}")]
    Store(String),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("time entry title must not be empty")]
    EmptyTitle,
    #[error("time entry not found: {0}")]
    EntryNotFound(String),
}

impl From<chrono::ParseError> for StatsError {
    fn from(value: chrono::ParseError) -> Self {
        Self::InvalidDate(value.to_string())
    }
}

pub type StatsResult<T> = Result<T, StatsError>;
