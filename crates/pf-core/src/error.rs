use thiserror::Error;

pub type PfResult<T> = Result<T, PfError>;

#[derive(Error, Debug)]
pub enum PfError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("{path}: {source}")]
    Field {
        path: String,
        #[source]
        source: FieldError,
    },
}

/// Construction-time contract violation on a single field.
///
/// These carry no path; the caller attaches one when collecting findings
/// over a whole document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("required value is missing or empty")]
    Required,

    #[error("value is {actual} characters long (max {max})")]
    MaxLength { max: usize, actual: usize },

    #[error("value '{value}' does not match pattern {pattern}")]
    PatternMismatch { pattern: &'static str, value: String },

    #[error("'{value}' is neither a known {enumeration} value nor an authority:code string")]
    InvalidEnumerationValue {
        enumeration: &'static str,
        value: String,
    },

    #[error("'{value}' is not a valid timestamp: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("at most {max} value(s) allowed, found {actual}")]
    TooMany { max: usize, actual: usize },
}

impl FieldError {
    /// Attach a document path, producing a reportable error.
    pub fn at(self, path: impl Into<String>) -> PfError {
        PfError::Field {
            path: path.into(),
            source: self,
        }
    }
}
