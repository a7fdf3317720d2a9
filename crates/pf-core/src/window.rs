//! Half-open validity intervals `[start, end)`.

use core::fmt;

use chrono::{DateTime, Utc};

/// Validity interval of a connection or other time-bounded fact.
///
/// A missing start means "since forever"; a missing end means the fact is
/// still active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Window {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl Window {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Unbounded on both sides.
    pub fn always() -> Self {
        Self::default()
    }

    /// `[start, ∞)`.
    pub fn since(start: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn is_open_ended(&self) -> bool {
        self.end.is_none()
    }

    /// An interval whose end is not after its start can never contain anything.
    pub fn is_empty(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if e <= s)
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.is_none_or(|s| s <= at) && self.end.is_none_or(|e| at < e)
    }

    /// Whether two half-open intervals share at least one instant.
    pub fn overlaps(&self, other: &Window) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let starts_before_other_ends = match (self.start, other.end) {
            (Some(s), Some(e)) => s < e,
            _ => true,
        };
        let other_starts_before_self_ends = match (other.start, self.end) {
            (Some(s), Some(e)) => s < e,
            _ => true,
        };
        starts_before_other_ends && other_starts_before_self_ends
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.start {
            Some(s) => write!(f, "[{}", s.to_rfc3339())?,
            None => f.write_str("(-inf")?,
        }
        match self.end {
            Some(e) => write!(f, ", {})", e.to_rfc3339()),
            None => f.write_str(", +inf)"),
        }
    }
}
