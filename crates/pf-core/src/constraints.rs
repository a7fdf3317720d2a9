//! Field contracts inherited from the PRODML schema.
//!
//! XSD patterns are implicitly anchored and `.` never matches a line break,
//! so the compiled regexes spell that out explicitly.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use uuid::Uuid;

use crate::error::FieldError;

/// Maximum length of a `uid` attribute.
pub const UID_MAX_LEN: usize = 64;

/// Maximum length of a name-ish string (`String64` in the schema).
pub const NAME_MAX_LEN: usize = 64;

/// Maximum length of a comment (`String2000`).
pub const COMMENT_MAX_LEN: usize = 2000;

pub const UUID_PATTERN: &str =
    "[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12}";
pub const OPEN_ENUM_PATTERN: &str = ".*:.*";
pub const TIMESTAMP_PATTERN: &str = ".+T.+[Z+\\-].*";

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12}$")
        .expect("uuid pattern is valid")
});

static OPEN_ENUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\r\n]*:[^\r\n]*$").expect("open enum pattern is valid"));

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\r\n]+T[^\r\n]+[Z+\-][^\r\n]*$").expect("timestamp pattern is valid")
});

/// Reject empty (or whitespace-only) required strings.
pub fn required(value: &str) -> Result<&str, FieldError> {
    if value.trim().is_empty() {
        Err(FieldError::Required)
    } else {
        Ok(value)
    }
}

/// Length check in characters, not bytes.
pub fn max_length(value: &str, max: usize) -> Result<&str, FieldError> {
    let actual = value.chars().count();
    if actual > max {
        Err(FieldError::MaxLength { max, actual })
    } else {
        Ok(value)
    }
}

/// Required, bounded name string.
pub fn name(value: &str) -> Result<&str, FieldError> {
    max_length(required(value)?, NAME_MAX_LEN)
}

/// Validate a UUID string against the schema pattern and parse it.
///
/// `Uuid::parse_str` also accepts braced, URN and simple forms; the schema
/// only allows the hyphenated one, so the pattern runs first.
pub fn uuid(value: &str) -> Result<Uuid, FieldError> {
    if !UUID_RE.is_match(value) {
        return Err(FieldError::PatternMismatch {
            pattern: UUID_PATTERN,
            value: value.to_string(),
        });
    }
    Uuid::parse_str(value).map_err(|_| FieldError::PatternMismatch {
        pattern: UUID_PATTERN,
        value: value.to_string(),
    })
}

/// Whether `value` has the shape of an authority-qualified custom code.
pub fn is_open_enum_escape(value: &str) -> bool {
    OPEN_ENUM_RE.is_match(value)
}

/// Validate and parse a timestamp string.
pub fn timestamp(value: &str) -> Result<DateTime<Utc>, FieldError> {
    if !TIMESTAMP_RE.is_match(value) {
        return Err(FieldError::PatternMismatch {
            pattern: TIMESTAMP_PATTERN,
            value: value.to_string(),
        });
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| FieldError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Collapse a "list of 0 or 1" into an `Option`, rejecting longer lists.
pub fn at_most_one<T>(values: Vec<T>) -> Result<Option<T>, FieldError> {
    let actual = values.len();
    if actual > 1 {
        return Err(FieldError::TooMany { max: 1, actual });
    }
    Ok(values.into_iter().next())
}
