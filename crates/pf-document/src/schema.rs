//! Model document schema definitions.
//!
//! These types mirror the PRODML element structure with raw strings; nothing
//! is checked at deserialization time. Lowering (see [`crate::lower`]) turns
//! a document into a validated `pf_network::Model` and reports every field
//! finding at once.
//!
//! Elements the XML schema declares as "list of 0 or 1" are kept as lists
//! here so that a document carrying two values can be reported instead of
//! silently truncated.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ModelDocument {
    pub uuid: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// 0 or 1.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub installation: Vec<FacilityIdentifierDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtim_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtim_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub networks: Vec<NetworkDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NetworkDef {
    pub uid: String,
    pub name: String,
    /// Name of the containing network; 0 or 1.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parent_network: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub units: Vec<UnitDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_ports: Vec<PortDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plans: Vec<PlanDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_connects: Vec<ExternalConnectDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub change_log: Vec<ChangeLogDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UnitDef {
    pub uid: String,
    pub name: String,
    pub facility: FacilityIdentifierDef,
    /// 0 or 1.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facility_parent: Vec<FacilityIdentifierDef>,
    /// Name of the network detailing this unit; 0 or 1.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub internal_network: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub ports: Vec<PortDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FacilityIdentifierDef {
    pub name: String,
    /// Reporting facility literal or `authority:code`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naming_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PortDef {
    pub uid: String,
    pub name: String,
    /// `inlet`, `outlet` or `unknown`.
    pub direction: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub exposed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// 0 or 1.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facility: Vec<FacilityIdentifierDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expected_flow_product: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expected_flow_property: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connected_nodes: Vec<ConnectedNodeDef>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ConnectedNodeDef {
    pub uid: String,
    pub node: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtim_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtim_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlanDef {
    pub uid: String,
    pub name: String,
    pub dtim_start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DataObjectReferenceDef {
    pub object_type: String,
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ExternalConnectDef {
    pub uid: String,
    /// External port of this network.
    pub port: String,
    pub target_model: DataObjectReferenceDef,
    pub target_network: String,
    pub target_port: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChangeLogDef {
    pub uid: String,
    pub dtim: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}
