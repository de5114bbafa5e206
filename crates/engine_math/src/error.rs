//! Math-layer error types.

/// Errors returned by the pure algebra operations.
///
/// These are local failures: nothing is mutated when one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    /// A zero-length vector or quaternion was passed where a direction or
    /// divisor is required.
    #[error("degenerate input: {0}")]
    DegenerateInput(&'static str),

    /// The requested rotation is not uniquely defined (e.g. between two
    /// anti-parallel vectors).
    #[error("degenerate rotation: vectors are anti-parallel")]
    DegenerateRotation,

    /// A slice had the wrong number of elements.
    #[error("invalid argument: expected {expected} elements, got {actual}")]
    InvalidArgument {
        /// Number of elements required.
        expected: usize,
        /// Number of elements supplied.
        actual: usize,
    },
}

/// Convenience alias for results in this crate.
pub type MathResult<T> = Result<T, MathError>;
