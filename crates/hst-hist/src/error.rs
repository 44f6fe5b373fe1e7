use thiserror::Error;

/// Errors from axis validation and histogram construction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HistError {
    #[error("axis must have at least one bin")]
    ZeroBins,

    #[error("invalid axis range: min {min} must be finite and below max {max}")]
    InvalidRange { min: f64, max: f64 },

    #[error("variable binning needs at least 2 edges, got {0}")]
    TooFewEdges(usize),

    #[error("bin edges must be strictly increasing (edge {index} is not above its predecessor)")]
    NonIncreasingEdges { index: usize },

    #[error("bin edge {index} is not finite")]
    NonFiniteEdge { index: usize },

    #[error("axis index {index} out of range for a {dims}-dimensional histogram")]
    AxisOutOfRange { index: usize, dims: usize },

    #[error("total cell count overflows usize")]
    TooManyCells,

    #[error("inconsistent histogram: {0}")]
    Inconsistent(String),
}

/// Result alias for histogram operations.
pub type HistResult<T> = Result<T, HistError>;
