//! Error handling for the sigstream crates

use std::fmt;

/// Result type alias for sigstream operations
pub type SigResult<T> = Result<T, SigError>;

/// Error type shared by all sigstream crates
#[derive(Debug)]
#[non_exhaustive]
pub enum SigError {
    /// Invalid argument to an operation
    InvalidArgument {
        /// Description of the argument error
        reason: String,
    },

    /// Board model is not supported for the requested operation
    UnsupportedBoard {
        /// Name of the offending board
        board: String,
        /// What was attempted
        reason: &'static str,
    },

    /// Operation called in the wrong session state
    SessionState {
        /// Operation that was attempted
        operation: &'static str,
        /// State the session was in
        state: &'static str,
    },

    /// Sample source failure
    Source {
        /// Description of the source failure
        reason: String,
    },

    /// Data buffer dimensions do not line up
    DimensionMismatch {
        /// Number of rows expected
        rows: usize,
        /// Number of values provided
        values: usize,
    },

    /// Row index out of range
    RowOutOfRange {
        /// Requested row
        row: usize,
        /// Number of rows available
        num_rows: usize,
    },

    /// Recording or parameter format error
    Format {
        /// Description of the format issue
        reason: String,
    },

    /// Underlying I/O failure
    Io {
        /// What was being done when the failure occurred
        context: &'static str,
        /// The I/O error itself
        source: std::io::Error,
    },
}

impl fmt::Display for SigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigError::InvalidArgument { reason } => {
                write!(f, "Invalid argument: {}", reason)
            }
            SigError::UnsupportedBoard { board, reason } => {
                write!(f, "Unsupported board {}: {}", board, reason)
            }
            SigError::SessionState { operation, state } => {
                write!(f, "Cannot {} while session is {}", operation, state)
            }
            SigError::Source { reason } => {
                write!(f, "Sample source error: {}", reason)
            }
            SigError::DimensionMismatch { rows, values } => {
                write!(
                    f,
                    "Dimension mismatch: {} values cannot form a matrix with {} rows",
                    values, rows
                )
            }
            SigError::RowOutOfRange { row, num_rows } => {
                write!(f, "Row {} out of range (matrix has {} rows)", row, num_rows)
            }
            SigError::Format { reason } => {
                write!(f, "Format error: {}", reason)
            }
            SigError::Io { context, source } => {
                write!(f, "I/O error while trying to {}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for SigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SigError {
    fn from(err: serde_json::Error) -> Self {
        SigError::Format {
            reason: format!("JSON: {}", err),
        }
    }
}
