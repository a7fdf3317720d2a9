use core::fmt;
use core::num::NonZeroU32;

use uuid::Uuid;

use crate::constraints::{self, UID_MAX_LEN};
use crate::error::FieldError;

/// Compact positional identifier into a parent's child list.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<Id>` to be pointer-optimized
///
/// An `Id` only means something relative to the parent it was taken from;
/// it is never persisted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(NonZeroU32);

impl Id {
    /// Create an Id from a 0-based index by storing index+1.
    pub fn from_index(index: u32) -> Self {
        // index+1 must be nonzero
        Self(NonZeroU32::new(index + 1).expect("index+1 is nonzero"))
    }

    /// Create an Id from a `usize` position, as produced by `enumerate()`.
    pub fn from_usize(index: usize) -> Self {
        Self::from_index(u32::try_from(index).expect("child lists fit in u32"))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    pub fn as_usize(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Arena ids for units and ports within one network.
pub type UnitId = Id;
pub type PortId = Id;

/// Context-local identifier (`uid` attribute).
///
/// Unique only among siblings under one parent. Deliberately not
/// convertible into a [`DataObjectReference`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uid(String);

impl Uid {
    pub fn new(value: impl Into<String>) -> Result<Self, FieldError> {
        let value = value.into();
        constraints::max_length(constraints::required(&value)?, UID_MAX_LEN)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uid({:?})", self.0)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Uid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Uid {
    type Error = FieldError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Cross-document pointer to a top-level data object.
///
/// The core only models the pointer; fetching the target is the job of
/// whatever store the consumer injects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataObjectReference {
    object_type: String,
    uuid: Uuid,
    version: Option<String>,
    title: Option<String>,
}

impl DataObjectReference {
    /// Object type of a product flow model document.
    pub const PRODUCT_FLOW_MODEL: &'static str = "ProductFlowModel";

    /// Build a reference from its raw string parts, enforcing the UUID pattern.
    pub fn new(object_type: impl Into<String>, uuid: &str) -> Result<Self, FieldError> {
        let object_type = object_type.into();
        constraints::required(&object_type)?;
        Ok(Self {
            object_type,
            uuid: constraints::uuid(uuid)?,
            version: None,
            title: None,
        })
    }

    pub fn from_uuid(object_type: impl Into<String>, uuid: Uuid) -> Self {
        Self {
            object_type: object_type.into(),
            uuid,
            version: None,
            title: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Re-check the shape of a reference before it is handed to a lookup.
    ///
    /// References built through [`DataObjectReference::new`] always pass;
    /// ones assembled through [`DataObjectReference::from_uuid`] may carry an
    /// empty object type.
    pub fn validate_shape(&self) -> Result<(), FieldError> {
        constraints::required(&self.object_type)?;
        constraints::uuid(&self.uuid.hyphenated().to_string())?;
        Ok(())
    }
}

impl fmt::Display for DataObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.object_type, self.uuid.hyphenated())?;
        if let Some(version) = &self.version {
            write!(f, "@{version}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trip_index() {
        for i in [0_u32, 1, 2, 42, 10_000] {
            let id = Id::from_index(i);
            assert_eq!(id.index(), i);
        }
        assert_eq!(Id::from_usize(3).as_usize(), 3);
    }

    #[test]
    fn option_id_is_small() {
        assert_eq!(
            core::mem::size_of::<Id>(),
            core::mem::size_of::<Option<Id>>()
        );
    }

    #[test]
    fn uid_enforces_length_and_presence() {
        assert!(Uid::new("port-1").is_ok());
        assert_eq!(Uid::new(""), Err(FieldError::Required));
        assert!(matches!(
            Uid::new("x".repeat(65)),
            Err(FieldError::MaxLength { max: 64, .. })
        ));
    }

    #[test]
    fn reference_requires_hyphenated_uuid() {
        let r = DataObjectReference::new(
            DataObjectReference::PRODUCT_FLOW_MODEL,
            "0f7e4c5a-1b2c-4d3e-8f90-a1b2c3d4e5f6",
        )
        .unwrap()
        .with_version("2.0");
        assert_eq!(r.object_type(), "ProductFlowModel");
        assert_eq!(r.version(), Some("2.0"));
        assert_eq!(
            r.to_string(),
            "ProductFlowModel(0f7e4c5a-1b2c-4d3e-8f90-a1b2c3d4e5f6)@2.0"
        );

        assert!(DataObjectReference::new("ProductFlowModel", "not-a-uuid").is_err());
        assert_eq!(
            DataObjectReference::new("", "0f7e4c5a-1b2c-4d3e-8f90-a1b2c3d4e5f6"),
            Err(FieldError::Required)
        );
    }

    #[test]
    fn from_uuid_shape_check_flags_empty_type() {
        let r = DataObjectReference::from_uuid("", Uuid::nil());
        assert_eq!(r.validate_shape(), Err(FieldError::Required));
    }
}
