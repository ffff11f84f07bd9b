//! Error types for the volatility snapshot service

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VolError {
    /// Quote feed was unreachable or returned an unusable response.
    #[error("Feed error: {0}")]
    Feed(String),

    /// Payload decoded but did not contain the expected data.
    #[error("Data error: {0}")]
    Data(String),

    /// Root-finding or other numerical failure (non-convergence, bad domain).
    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Too few or degenerate points to reconstruct a surface grid.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Snapshot store rejected a read or write.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type VolResult<T> = Result<T, VolError>;

impl VolError {
    pub fn feed(msg: impl Into<String>) -> Self {
        Self::Feed(msg.into())
    }

    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    pub fn numerical(msg: impl Into<String>) -> Self {
        Self::Numerical(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn scheduler(msg: impl Into<String>) -> Self {
        Self::Scheduler(msg.into())
    }
}
