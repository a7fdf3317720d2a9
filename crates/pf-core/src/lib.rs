//! pf-core: stable foundation for the PRODML product flow binding.
//!
//! Contains:
//! - ids (context-local `Uid`, cross-document `DataObjectReference`, arena `Id`)
//! - constraints (length / pattern contracts inherited from the XML schema)
//! - open_enum (closed-or-authority-qualified enumerations)
//! - enums (flow topology enumerations)
//! - measure (opaque `(value, uom)` cells, uom SI types, tolerances)
//! - window (half-open validity intervals)
//! - error (shared error types)

pub mod constraints;
pub mod enums;
pub mod error;
pub mod ids;
pub mod measure;
pub mod open_enum;
pub mod window;

/// XML namespace of the PRODML v2 data objects.
pub const PRODML_NAMESPACE: &str = "http://www.energistics.org/energyml/data/prodmlv2";

// Re-exports: nice ergonomics for downstream crates
pub use error::{FieldError, PfError, PfResult};
pub use ids::*;
pub use measure::*;
pub use open_enum::{Enumeration, OpenEnum};
pub use window::Window;
