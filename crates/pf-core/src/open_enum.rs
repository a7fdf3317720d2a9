//! Open (extensible) enumerations.
//!
//! Many PRODML fields accept either one of a fixed set of literal codes or a
//! locally defined code qualified by a naming authority (`authority:code`).
//! [`OpenEnum`] keeps the two cases apart while reproducing the source string
//! exactly on display.

use core::fmt;
use core::str::FromStr;

use crate::constraints;
use crate::error::FieldError;

/// A closed set of literal codes.
///
/// Literal strings are carried verbatim; they are not identifiers
/// ("gas liquid ratio", "c2-c4+n2") and must never be normalized.
pub trait Enumeration: Copy + Eq + 'static {
    /// Schema type name, used in error messages.
    const NAME: &'static str;

    /// Every variant, in schema order.
    const ALL: &'static [Self];

    /// The exact literal string of this variant.
    fn as_str(self) -> &'static str;

    /// Case-sensitive exact match against the literal strings.
    fn from_literal(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == value)
    }
}

/// Declare a closed enumeration with its literal strings.
///
/// ```
/// pf_core::enumeration! {
///     /// Valve states.
///     pub enum ValveState : "ValveState" {
///         Open => "open",
///         PartlyOpen => "partly open",
///     }
/// }
///
/// use pf_core::Enumeration;
/// assert_eq!(ValveState::PartlyOpen.as_str(), "partly open");
/// assert_eq!(ValveState::from_literal("open"), Some(ValveState::Open));
/// ```
#[macro_export]
macro_rules! enumeration {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $schema:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $literal:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::open_enum::Enumeration for $name {
            const NAME: &'static str = $schema;
            const ALL: &'static [Self] = &[ $( $name::$variant ),+ ];

            fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $literal ),+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str($crate::open_enum::Enumeration::as_str(*self))
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::error::FieldError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                <$name as $crate::open_enum::Enumeration>::from_literal(value).ok_or_else(|| {
                    $crate::error::FieldError::InvalidEnumerationValue {
                        enumeration: $schema,
                        value: value.to_string(),
                    }
                })
            }
        }
    };
}

/// A known enumerant, or a custom code under a naming authority.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OpenEnum<E> {
    Known(E),
    Custom { authority: String, code: String },
}

impl<E: Enumeration> OpenEnum<E> {
    /// Decode a raw field value.
    ///
    /// Known literals win; otherwise the value must match `.*:.*` and is
    /// split on the first colon.
    pub fn parse(value: &str) -> Result<Self, FieldError> {
        if let Some(known) = E::from_literal(value) {
            return Ok(Self::Known(known));
        }
        if constraints::is_open_enum_escape(value) {
            if let Some((authority, code)) = value.split_once(':') {
                return Ok(Self::Custom {
                    authority: authority.to_string(),
                    code: code.to_string(),
                });
            }
        }
        Err(FieldError::InvalidEnumerationValue {
            enumeration: E::NAME,
            value: value.to_string(),
        })
    }

    /// Build a custom code; the authority must not contain a colon or the
    /// value would re-split differently.
    pub fn custom(authority: impl Into<String>, code: impl Into<String>) -> Result<Self, FieldError> {
        let authority = authority.into();
        let code = code.into();
        if authority.contains(':') || authority.contains(['\r', '\n']) || code.contains(['\r', '\n'])
        {
            return Err(FieldError::InvalidEnumerationValue {
                enumeration: E::NAME,
                value: format!("{authority}:{code}"),
            });
        }
        Ok(Self::Custom { authority, code })
    }

    pub fn known(&self) -> Option<E> {
        match self {
            Self::Known(e) => Some(*e),
            Self::Custom { .. } => None,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom { .. })
    }
}

impl<E: Enumeration> From<E> for OpenEnum<E> {
    fn from(value: E) -> Self {
        Self::Known(value)
    }
}

impl<E: Enumeration> fmt::Display for OpenEnum<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(e) => f.write_str(e.as_str()),
            Self::Custom { authority, code } => write!(f, "{authority}:{code}"),
        }
    }
}

impl<E: Enumeration> FromStr for OpenEnum<E> {
    type Err = FieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::enums::{ReportingFacility, ReportingFlow, ReportingProduct};
    use proptest::prelude::*;

    fn round_trip_all<E: Enumeration + fmt::Debug>() {
        for &e in E::ALL {
            let raw = OpenEnum::Known(e).to_string();
            assert_eq!(OpenEnum::<E>::parse(&raw), Ok(OpenEnum::Known(e)));
        }
    }

    #[test]
    fn every_known_enumerant_round_trips() {
        round_trip_all::<ReportingFacility>();
        round_trip_all::<ReportingProduct>();
        round_trip_all::<ReportingFlow>();
    }

    proptest! {
        #[test]
        fn custom_round_trips(authority in "[a-zA-Z0-9._-]{1,16}", code in "[a-zA-Z0-9 ._:+-]{1,24}") {
            let value = OpenEnum::<ReportingProduct>::custom(authority.clone(), code.clone()).unwrap();
            let raw = value.to_string();
            let parsed = OpenEnum::<ReportingProduct>::parse(&raw).unwrap();
            prop_assert_eq!(parsed, OpenEnum::Custom { authority, code });
        }

        #[test]
        fn colonless_unknown_is_rejected(raw in "[a-z]{1,12}") {
            prop_assume!(ReportingFacility::from_literal(&raw).is_none());
            prop_assert!(OpenEnum::<ReportingFacility>::parse(&raw).is_err());
        }
    }
}
