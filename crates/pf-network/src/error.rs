//! Network construction and resolution errors.

use pf_core::Window;
use thiserror::Error;

pub type NetworkResult<T> = Result<T, NetworkError>;

/// Structural (build-time) and semantic (query-time) findings against a model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Unresolved reference '{name}' in {scope} ({matches} matches)")]
    UnresolvedLocalReference {
        scope: String,
        name: String,
        matches: usize,
    },

    #[error("Network '{network}' has no plan named '{plan}'")]
    UnknownPlan { network: String, plan: String },

    #[error("Cyclic network hierarchy: {}", .chain.join(" -> "))]
    CyclicNetworkHierarchy { chain: Vec<String> },

    #[error("Port {port} has overlapping connection windows {first} and {second}")]
    OverlappingConnectionWindows {
        port: String,
        first: Window,
        second: Window,
    },

    #[error("Model has no root network")]
    NoRootNetwork,

    #[error("Model has several root networks: {}", .roots.join(", "))]
    MultipleRootNetworks { roots: Vec<String> },

    #[error("Duplicate {kind} name '{name}' in {scope}")]
    DuplicateName {
        scope: String,
        kind: &'static str,
        name: String,
    },

    #[error("Blank {kind} name in {scope}")]
    EmptyName { scope: String, kind: &'static str },

    #[error("Duplicate uid '{uid}' among {kind}s in {scope}")]
    DuplicateUid {
        scope: String,
        kind: &'static str,
        uid: String,
    },

    #[error("{scope} must have at least one {what}")]
    MissingChildren { scope: String, what: &'static str },

    #[error("Empty validity window {window} in {scope}")]
    InvalidWindow { scope: String, window: Window },

    #[error("Malformed reference {reference}: {reason}")]
    MalformedReference { reference: String, reason: String },

    #[error("No document found for {reference}")]
    DocumentNotFound { reference: String },

    #[error("Lookup for {reference} returned model {found}")]
    ReferenceMismatch { reference: String, found: String },

    #[error("Port {port} is exposed and cannot take an external connection")]
    ExposedPortNotConnectable { port: String },

    #[error("External connection {from} -> {to} has no matching connection back")]
    UnpairedExternalConnect { from: String, to: String },

    #[error("{scope} is structurally invalid ({} findings)", .findings.len())]
    Invalid {
        scope: String,
        findings: Vec<NetworkError>,
    },
}

impl NetworkError {
    pub(crate) fn unresolved(scope: impl Into<String>, name: &str, matches: usize) -> Self {
        Self::UnresolvedLocalReference {
            scope: scope.into(),
            name: name.to_string(),
            matches,
        }
    }

    /// Flatten an `Invalid` wrapper into its individual findings.
    pub fn into_findings(self) -> Vec<NetworkError> {
        match self {
            Self::Invalid { findings, .. } => findings,
            other => vec![other],
        }
    }
}

/// Warning-level finding: a unit's ports and its internal network's
/// external ports do not name-match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortContractMismatch {
    pub network: String,
    pub unit: String,
    pub internal_network: String,
    /// Unit port names with no external port of the same name.
    pub missing_in_internal: Vec<String>,
    /// Internal external-port names the unit does not expose.
    pub missing_on_unit: Vec<String>,
}

impl std::fmt::Display for PortContractMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unit {}/{} and internal network {} disagree on ports (unit only: [{}], network only: [{}])",
            self.network,
            self.unit,
            self.internal_network,
            self.missing_in_internal.join(", "),
            self.missing_on_unit.join(", ")
        )
    }
}
