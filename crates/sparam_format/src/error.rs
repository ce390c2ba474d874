//! Error types for shared parameter file operations.

use thiserror::Error;

/// Result type alias for shared parameter operations.
pub type SharedParamResult<T> = Result<T, SharedParamError>;

/// Errors that can occur while reading, validating, mutating or writing a
/// shared parameter file.
///
/// The first three variants are the invariant errors. Each carries the
/// 1-based line number of the offending row.
#[derive(Error, Debug)]
pub enum SharedParamError {
    #[error("Format error on line {line}: {message}")]
    Format { line: usize, message: String },

    #[error("Reference error on line {line}: {message}")]
    Reference { line: usize, message: String },

    #[error("Duplicate error on line {line}: {message}")]
    Duplicate { line: usize, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SharedParamError {
    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn reference(line: usize, message: impl Into<String>) -> Self {
        Self::Reference {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn duplicate(line: usize, message: impl Into<String>) -> Self {
        Self::Duplicate {
            line,
            message: message.into(),
        }
    }

    /// Line number of the offending row, for the invariant errors.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Format { line, .. } | Self::Reference { line, .. } | Self::Duplicate { line, .. } => {
                Some(*line)
            }
            _ => None,
        }
    }

    /// Whether the error is a format, reference or duplicate violation
    /// rather than an I/O or lookup failure.
    pub fn is_invariant_violation(&self) -> bool {
        self.line().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_is_exposed_for_invariant_errors() {
        let err = SharedParamError::format(7, "PARAM row has 8 fields, expected 9");
        assert_eq!(err.line(), Some(7));
        assert!(err.is_invariant_violation());
        assert_eq!(
            err.to_string(),
            "Format error on line 7: PARAM row has 8 fields, expected 9"
        );
    }

    #[test]
    fn test_io_error_has_no_line() {
        let err = SharedParamError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.line(), None);
        assert!(!err.is_invariant_violation());
    }
}
