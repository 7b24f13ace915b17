use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the trajectory and solver layers.
#[derive(Debug, Error)]
pub enum Error {
    #[error("time grid needs at least 2 points, got {0}")]
    GridTooShort(usize),

    #[error("time values must be strictly increasing: t[{index}] = {value} does not follow {previous}")]
    NonMonotonicTimes {
        index: usize,
        value: f64,
        previous: f64,
    },

    #[error("step size must be positive, got {0}")]
    NonPositiveStep(f64),

    #[error("time span must satisfy start < end, got [{0}, {1}]")]
    EmptyTimeSpan(f64, f64),

    #[error("state dimension mismatch: system is {expected}-dimensional, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("trajectory length mismatch: {times} time values vs {states} states")]
    LengthMismatch { times: usize, states: usize },

    #[error("requested output time {0} lies outside the integration span [{1}, {2}]")]
    OutputTimeOutOfSpan(f64, f64, f64),

    #[error("adaptive solver spent its budget of {0} steps before reaching the end of the span")]
    StepBudgetExhausted(usize),

    #[error("state became non-finite at t = {0}")]
    NonFiniteState(f64),
}
