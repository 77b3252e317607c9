use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid rate {name} = {value}: must be finite and strictly positive")]
    InvalidRate { name: String, value: f64 },
    #[error("degenerate distribution: {len} weights carry no probability mass")]
    DegenerateDistribution { len: usize },
    #[error("state is not a valid count vector after reaction {reaction} at t = {time}: {state:?}")]
    NonFiniteState {
        reaction: usize,
        time: f64,
        state: Vec<f64>,
    },
    #[error("shape mismatch: {0}")]
    Shape(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("integration failed: {0}")]
    Integration(String),
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, SimError>;

pub(crate) fn require_positive(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::InvalidRate {
            name: name.to_string(),
            value,
        })
    }
}
