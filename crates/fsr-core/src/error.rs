//! Error taxonomy shared by the evaluator and both register kinds.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, FsrError>;

/// Failures raised by expression construction, evaluation and register setup.
///
/// Every variant describes a caller programming error; nothing is retried or
/// recovered internally.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FsrError {
    /// Unrecognised token or an operand/operator balance other than one.
    #[error("malformed expression: {0}")]
    MalformedExpression(String),

    /// An index is outside the bit vector it was applied to.
    #[error("index {index} out of range for a {len}-bit state")]
    IndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Length of the state it was checked against.
        len: usize,
    },

    /// An operator was reached with fewer than two values on the stack.
    #[error("stack underflow while evaluating expression")]
    StackUnderflow,

    /// More than one value was left after evaluation.
    #[error("expression left {0} values on the stack")]
    UnresolvedExpression(usize),

    /// Tap set too short, contains zero or duplicates, or disagrees with the state length.
    #[error("invalid feedback polynomial: {0}")]
    InvalidPolynomial(String),

    /// Replacement tap set has a different degree than the register.
    #[error("polynomial degree {found} does not match register length {expected}")]
    DegreeMismatch {
        /// Register length.
        expected: usize,
        /// Degree of the rejected tap set.
        found: usize,
    },

    /// A nonlinear register was configured without a feedback expression.
    #[error("nonlinear register requires a feedback expression")]
    MissingFeedbackFunction,

    /// Unknown seed keyword, or missing/invalid register size.
    #[error("invalid seed specification: {0}")]
    InvalidSeedSpecification(String),

    /// A state bit outside {0, 1}.
    #[error("bit value {0} is not 0 or 1")]
    InvalidBit(u8),
}
