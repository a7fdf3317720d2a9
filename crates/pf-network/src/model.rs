//! Product flow network object model.
//!
//! Leaf records (`Port`, `Unit`, `ConnectedNode`, ...) are plain data with
//! public fields. `Network` and `Model` are only produced by the builders,
//! which run the structural checks, and expose read-only accessors.

use core::fmt;

use chrono::{DateTime, Utc};
use pf_core::enums::{ProductFlowPortType, ReportingFacility, ReportingFlow, ReportingProduct};
use pf_core::{DataObjectReference, OpenEnum, PortId, Uid, UnitId, Window};
use uuid::Uuid;

/// Nominal direction of a port relative to its parent.
pub type PortDirection = ProductFlowPortType;

/// Identity of a facility: free-text name qualified by kind and naming system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilityIdentifier {
    pub name: String,
    pub kind: Option<OpenEnum<ReportingFacility>>,
    pub naming_system: Option<String>,
    pub uid_ref: Option<String>,
}

impl FacilityIdentifier {
    pub fn new(name: impl Into<String>, kind: impl Into<OpenEnum<ReportingFacility>>) -> Self {
        Self {
            name: name.into(),
            kind: Some(kind.into()),
            naming_system: None,
            uid_ref: None,
        }
    }

    pub fn with_naming_system(mut self, naming_system: impl Into<String>) -> Self {
        self.naming_system = Some(naming_system.into());
        self
    }
}

/// Time-bounded membership of a port in a named node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedNode {
    pub uid: Uid,
    /// Node name; ports sharing it at the same instant are connected.
    pub node: String,
    pub window: Window,
    pub plan_name: Option<String>,
    pub comment: Option<String>,
}

impl ConnectedNode {
    pub fn new(uid: Uid, node: impl Into<String>, window: Window) -> Self {
        Self {
            uid,
            node: node.into(),
            window,
            plan_name: None,
            comment: None,
        }
    }

    pub fn in_plan(mut self, plan: impl Into<String>) -> Self {
        self.plan_name = Some(plan.into());
        self
    }
}

/// Attachment point on a unit, or an external port of a network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub uid: Uid,
    pub name: String,
    pub direction: PortDirection,
    /// Internal port surfaced for visibility; not externally connectable.
    pub exposed: bool,
    pub plan_name: Option<String>,
    pub facility: Option<FacilityIdentifier>,
    pub expected_products: Vec<OpenEnum<ReportingProduct>>,
    pub expected_flows: Vec<OpenEnum<ReportingFlow>>,
    pub comment: Option<String>,
    pub connections: Vec<ConnectedNode>,
}

impl Port {
    pub fn new(uid: Uid, name: impl Into<String>, direction: PortDirection) -> Self {
        Self {
            uid,
            name: name.into(),
            direction,
            exposed: false,
            plan_name: None,
            facility: None,
            expected_products: Vec::new(),
            expected_flows: Vec::new(),
            comment: None,
            connections: Vec::new(),
        }
    }

    pub fn in_plan(mut self, plan: impl Into<String>) -> Self {
        self.plan_name = Some(plan.into());
        self
    }

    pub fn exposed(mut self) -> Self {
        self.exposed = true;
        self
    }
}

/// A behaviour container (separator, valve, well...) exposing ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub uid: Uid,
    pub name: String,
    pub facility: FacilityIdentifier,
    pub facility_parent: Option<FacilityIdentifier>,
    /// Name of a network in the same model that details this unit.
    pub internal_network: Option<String>,
    pub plan_name: Option<String>,
    pub comment: Option<String>,
    pub ports: Vec<Port>,
}

impl Unit {
    pub fn new(uid: Uid, name: impl Into<String>, facility: FacilityIdentifier) -> Self {
        Self {
            uid,
            name: name.into(),
            facility,
            facility_parent: None,
            internal_network: None,
            plan_name: None,
            comment: None,
            ports: Vec::new(),
        }
    }

    pub fn in_plan(mut self, plan: impl Into<String>) -> Self {
        self.plan_name = Some(plan.into());
        self
    }

    pub fn with_internal_network(mut self, network: impl Into<String>) -> Self {
        self.internal_network = Some(network.into());
        self
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id.as_usize())
    }
}

/// Named, time-anchored hypothetical variant of a network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub uid: Uid,
    pub name: String,
    /// Instant at which the plan diverges from the actual topology.
    pub dtim_start: DateTime<Utc>,
    pub purpose: Option<String>,
}

impl Plan {
    pub fn new(uid: Uid, name: impl Into<String>, dtim_start: DateTime<Utc>) -> Self {
        Self {
            uid,
            name: name.into(),
            dtim_start,
            purpose: None,
        }
    }
}

/// Directed link from one of this network's external ports to an external
/// port in another model document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalConnect {
    pub uid: Uid,
    pub port: String,
    pub target_model: DataObjectReference,
    pub target_network: String,
    pub target_port: String,
}

/// Record of a topology change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeLog {
    pub uid: Uid,
    pub dtim: DateTime<Utc>,
    pub reason: Option<String>,
    pub plan_name: Option<String>,
    pub comment: Option<String>,
}

/// Which parent a port hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PortOwner {
    Unit(UnitId),
    /// External port of the network itself.
    Network,
}

/// Position of a port inside one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortAddress {
    pub owner: PortOwner,
    pub port: PortId,
}

impl PortAddress {
    pub fn unit(unit: UnitId, port: PortId) -> Self {
        Self {
            owner: PortOwner::Unit(unit),
            port,
        }
    }

    pub fn external(port: PortId) -> Self {
        Self {
            owner: PortOwner::Network,
            port,
        }
    }

    pub fn is_external(&self) -> bool {
        self.owner == PortOwner::Network
    }
}

/// Units and external ports for one facility view.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    pub(crate) uid: Uid,
    pub(crate) name: String,
    pub(crate) parent: Option<String>,
    pub(crate) comment: Option<String>,
    pub(crate) units: Vec<Unit>,
    pub(crate) ports: Vec<Port>,
    pub(crate) plans: Vec<Plan>,
    pub(crate) external_connects: Vec<ExternalConnect>,
    pub(crate) change_log: Vec<ChangeLog>,
}

impl Network {
    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the containing network; `None` for the model root.
    pub fn parent_name(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// External ports of this network.
    pub fn external_ports(&self) -> &[Port] {
        &self.ports
    }

    /// Plans declared directly on this network (not inherited ones).
    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn external_connects(&self) -> &[ExternalConnect] {
        &self.external_connects
    }

    pub fn change_log(&self) -> &[ChangeLog] {
        &self.change_log
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id.as_usize())
    }

    pub fn port(&self, address: PortAddress) -> Option<&Port> {
        match address.owner {
            PortOwner::Unit(unit) => self.unit(unit)?.port(address.port),
            PortOwner::Network => self.ports.get(address.port.as_usize()),
        }
    }

    /// Human-readable path of a port, e.g. `Facility/SeparatorA/out1`.
    pub fn port_path(&self, address: PortAddress) -> String {
        let port = self.port(address).map_or("?", |p| p.name.as_str());
        match address.owner {
            PortOwner::Unit(unit) => {
                let unit = self.unit(unit).map_or("?", |u| u.name.as_str());
                format!("{}/{}/{}", self.name, unit, port)
            }
            PortOwner::Network => format!("{}/{}", self.name, port),
        }
    }

    /// Every port address, unit ports first, in document order.
    pub fn port_addresses(&self) -> impl Iterator<Item = PortAddress> + '_ {
        let unit_ports = self.units.iter().enumerate().flat_map(|(u, unit)| {
            (0..unit.ports.len())
                .map(move |p| PortAddress::unit(UnitId::from_usize(u), PortId::from_usize(p)))
        });
        let external = (0..self.ports.len()).map(|p| PortAddress::external(PortId::from_usize(p)));
        unit_ports.chain(external)
    }

    /// Change log entries falling inside `window`, oldest first.
    pub fn changes_within(&self, window: &Window) -> Vec<&ChangeLog> {
        let mut changes: Vec<&ChangeLog> = self
            .change_log
            .iter()
            .filter(|c| window.contains(c.dtim))
            .collect();
        changes.sort_by_key(|c| c.dtim);
        changes
    }
}

/// A product flow model document: the set of networks for one installation.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub(crate) uuid: Uuid,
    pub(crate) title: String,
    pub(crate) schema_version: Option<String>,
    pub(crate) installation: Option<FacilityIdentifier>,
    pub(crate) validity: Window,
    pub(crate) comment: Option<String>,
    pub(crate) networks: Vec<Network>,
}

impl Model {
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn schema_version(&self) -> Option<&str> {
        self.schema_version.as_deref()
    }

    pub fn installation(&self) -> Option<&FacilityIdentifier> {
        self.installation.as_ref()
    }

    pub fn validity(&self) -> Window {
        self.validity
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    /// Look a network up by name (names are unique within a model).
    pub fn network(&self, name: &str) -> Option<&Network> {
        self.networks.iter().find(|n| n.name == name)
    }

    /// A reference other documents can use to point at this model.
    pub fn reference(&self) -> DataObjectReference {
        DataObjectReference::from_uuid(DataObjectReference::PRODUCT_FLOW_MODEL, self.uuid)
            .with_title(self.title.clone())
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.uuid.hyphenated())
    }
}
