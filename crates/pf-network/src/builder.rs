//! Incremental network and model builders.

use pf_core::{PortId, Uid, UnitId, Window};
use uuid::Uuid;

use crate::error::{NetworkError, NetworkResult};
use crate::model::{
    ChangeLog, ConnectedNode, ExternalConnect, FacilityIdentifier, Model, Network, Plan, Port,
    PortAddress, PortOwner, Unit,
};
use crate::validate;

/// Builder for one network.
///
/// Add units, their ports and external ports, then call `build()` to run the
/// structural checks and freeze the network.
#[derive(Debug)]
pub struct NetworkBuilder {
    network: Network,
}

impl NetworkBuilder {
    pub fn new(uid: Uid, name: impl Into<String>) -> Self {
        Self {
            network: Network {
                uid,
                name: name.into(),
                parent: None,
                comment: None,
                units: Vec::new(),
                ports: Vec::new(),
                plans: Vec::new(),
                external_connects: Vec::new(),
                change_log: Vec::new(),
            },
        }
    }

    /// Declare the containing network (by name, within the same model).
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.network.parent = Some(parent.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.network.comment = Some(comment.into());
        self
    }

    /// Add a unit (with whatever ports it already carries) and return its ID.
    pub fn add_unit(&mut self, unit: Unit) -> UnitId {
        let id = UnitId::from_usize(self.network.units.len());
        self.network.units.push(unit);
        id
    }

    /// Add a port to a unit.
    ///
    /// Returns `None` if the unit ID was not handed out by this builder.
    pub fn add_port(&mut self, unit: UnitId, port: Port) -> Option<PortAddress> {
        let unit_ref = self.network.units.get_mut(unit.as_usize())?;
        let id = PortId::from_usize(unit_ref.ports.len());
        unit_ref.ports.push(port);
        Some(PortAddress::unit(unit, id))
    }

    /// Add an external port on the network boundary.
    pub fn add_external_port(&mut self, port: Port) -> PortAddress {
        let id = PortId::from_usize(self.network.ports.len());
        self.network.ports.push(port);
        PortAddress::external(id)
    }

    /// Attach a node membership to a port.
    pub fn connect(&mut self, address: PortAddress, connection: ConnectedNode) -> Option<()> {
        let port = match address.owner {
            PortOwner::Unit(unit) => self
                .network
                .units
                .get_mut(unit.as_usize())?
                .ports
                .get_mut(address.port.as_usize())?,
            PortOwner::Network => self.network.ports.get_mut(address.port.as_usize())?,
        };
        port.connections.push(connection);
        Some(())
    }

    pub fn add_plan(&mut self, plan: Plan) {
        self.network.plans.push(plan);
    }

    pub fn add_external_connect(&mut self, connect: ExternalConnect) {
        self.network.external_connects.push(connect);
    }

    pub fn add_change(&mut self, change: ChangeLog) {
        self.network.change_log.push(change);
    }

    /// Validate and freeze the network.
    pub fn build(self) -> NetworkResult<Network> {
        let findings = validate::network_findings(&self.network);
        if findings.is_empty() {
            Ok(self.network)
        } else {
            Err(NetworkError::Invalid {
                scope: format!("network '{}'", self.network.name),
                findings,
            })
        }
    }
}

/// Builder for a model document.
#[derive(Debug)]
pub struct ModelBuilder {
    model: Model,
}

impl ModelBuilder {
    pub fn new(uuid: Uuid, title: impl Into<String>) -> Self {
        Self {
            model: Model {
                uuid,
                title: title.into(),
                schema_version: None,
                installation: None,
                validity: Window::always(),
                comment: None,
                networks: Vec::new(),
            },
        }
    }

    pub fn schema_version(mut self, version: impl Into<String>) -> Self {
        self.model.schema_version = Some(version.into());
        self
    }

    pub fn installation(mut self, installation: FacilityIdentifier) -> Self {
        self.model.installation = Some(installation);
        self
    }

    pub fn validity(mut self, validity: Window) -> Self {
        self.model.validity = validity;
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.model.comment = Some(comment.into());
        self
    }

    pub fn network(mut self, network: Network) -> Self {
        self.model.networks.push(network);
        self
    }

    pub fn add_network(&mut self, network: Network) {
        self.model.networks.push(network);
    }

    /// Validate and freeze the model.
    ///
    /// Only document-local structure is checked here; the network hierarchy
    /// is checked when a query needs it.
    pub fn build(self) -> NetworkResult<Model> {
        let mut findings = Vec::new();
        if self.model.validity.is_empty() {
            findings.push(NetworkError::InvalidWindow {
                scope: self.model.title.clone(),
                window: self.model.validity,
            });
        }
        findings.extend(validate::model_findings(
            &self.model.title,
            &self.model.networks,
        ));
        if findings.is_empty() {
            Ok(self.model)
        } else {
            Err(NetworkError::Invalid {
                scope: format!("model '{}'", self.model.title),
                findings,
            })
        }
    }
}
