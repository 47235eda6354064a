use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParameterError {
    #[error("politeness must be in range [0, 1], got {0}")]
    Politeness(f64),

    #[error("safe deceleration must be a non-negative magnitude, got {0}")]
    SafeDeceleration(f64),

    #[error("minimum gap must be non-negative, got {0}")]
    MinimumGap(f64),

    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },
}

pub type ParameterResult<T> = Result<T, ParameterError>;
