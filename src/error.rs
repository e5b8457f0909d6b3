//! Error types.

use std::io;

use thiserror::Error;

/// Every failure the engine can report.
///
/// All of these are precondition violations detected at the call that would
/// break an invariant. Numeric problems (NaN, infinities) are never errors;
/// they propagate through the math untouched.
#[derive(Debug, Error)]
pub enum Error {
    /// Two operands (or an operand and a layer) have incompatible shapes.
    #[error("dimension mismatch in {op}: {left:?} vs {right:?}")]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },
    /// A row, column or layer index was past the end.
    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
    /// The network or training parameters make no sense.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A line of delimited input could not be read as numbers.
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn mismatch(
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    ) -> Self {
        Error::DimensionMismatch { op, left, right }
    }

    pub(crate) fn config<S: Into<String>>(message: S) -> Self {
        Error::InvalidConfiguration(message.into())
    }
}
