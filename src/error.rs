// src/error.rs

use thiserror::Error;

use crate::simulation_engine::intersections::IntersectionId;

/// Root error type for the signal automation core.
#[derive(Error, Debug)]
pub enum SignalError {
    /// Rejected at construction; the loop never starts with this config.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A density sampler could not produce a reading.
    #[error("density sampler failed for intersection {intersection}: {reason}")]
    SamplerFailure {
        intersection: IntersectionId,
        reason: String,
    },

    /// A violation notifier could not deliver a record.
    #[error("notification error: {0}")]
    Notification(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type SignalResult<T> = Result<T, SignalError>;
