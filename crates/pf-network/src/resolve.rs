//! Reference resolution: local names within a network, and cross-document
//! pointers through an injected lookup.

use std::collections::BTreeSet;
use std::sync::Arc;

use pf_core::{DataObjectReference, PortId, UnitId};
use tracing::{debug, warn};

use crate::error::{NetworkError, NetworkResult, PortContractMismatch};
use crate::model::{ExternalConnect, Model, Network, Port, PortAddress, Unit};
use crate::plan::{PlanSelector, select_visible};

/// Fetches model documents by reference.
///
/// The core never performs I/O itself; consumers plug in whatever store they
/// have (in-memory map, file system, remote repository).
pub trait ModelLookup: Send + Sync {
    fn lookup(&self, reference: &DataObjectReference) -> Option<Arc<Model>>;
}

impl<F> ModelLookup for F
where
    F: Fn(&DataObjectReference) -> Option<Arc<Model>> + Send + Sync,
{
    fn lookup(&self, reference: &DataObjectReference) -> Option<Arc<Model>> {
        self(reference)
    }
}

/// Something a bare name inside a network can point at.
#[derive(Debug, Clone, Copy)]
pub enum LocalTarget<'a> {
    Unit(UnitId, &'a Unit),
    ExternalPort(PortAddress, &'a Port),
}

/// Exactly one candidate, or an `UnresolvedLocalReference` with the count.
fn unique<'a, T>(
    candidates: Vec<(usize, &'a T)>,
    scope: impl FnOnce() -> String,
    name: &str,
) -> NetworkResult<(usize, &'a T)> {
    match candidates.as_slice() {
        [only] => Ok(*only),
        other => Err(NetworkError::unresolved(scope(), name, other.len())),
    }
}

fn candidates<'a, T>(
    items: &'a [T],
    item_name: impl Fn(&T) -> &str,
    tag: impl Fn(&T) -> Option<&str>,
    selector: &PlanSelector,
    name: &str,
) -> Vec<(usize, &'a T)> {
    select_visible(items, &item_name, tag, selector.plan_name())
        .into_iter()
        .filter(|&(_, item)| item_name(item) == name)
        .collect()
}

/// Resolve a network by name within a model.
pub fn resolve_network<'m>(model: &'m Model, name: &str) -> NetworkResult<&'m Network> {
    let matches: Vec<(usize, &Network)> = model
        .networks()
        .iter()
        .enumerate()
        .filter(|(_, n)| n.name() == name)
        .collect();
    unique(matches, || format!("model '{}'", model.title()), name).map(|(_, n)| n)
}

/// Resolve a unit by name among the units visible under `selector`.
pub fn resolve_unit<'a>(
    network: &'a Network,
    name: &str,
    selector: &PlanSelector,
) -> NetworkResult<(UnitId, &'a Unit)> {
    let found = candidates(
        network.units(),
        |u| u.name.as_str(),
        |u| u.plan_name.as_deref(),
        selector,
        name,
    );
    unique(found, || format!("network '{}' units", network.name()), name)
        .map(|(i, u)| (UnitId::from_usize(i), u))
}

/// Resolve a port of a named unit.
pub fn resolve_unit_port<'a>(
    network: &'a Network,
    unit: &str,
    port: &str,
    selector: &PlanSelector,
) -> NetworkResult<(PortAddress, &'a Port)> {
    let (unit_id, unit_ref) = resolve_unit(network, unit, selector)?;
    let found = candidates(
        unit_ref.ports.as_slice(),
        |p| p.name.as_str(),
        |p| p.plan_name.as_deref(),
        selector,
        port,
    );
    unique(
        found,
        || format!("unit '{}/{}' ports", network.name(), unit_ref.name),
        port,
    )
    .map(|(i, p)| (PortAddress::unit(unit_id, PortId::from_usize(i)), p))
}

/// Resolve one of the network's external ports.
pub fn resolve_external_port<'a>(
    network: &'a Network,
    name: &str,
    selector: &PlanSelector,
) -> NetworkResult<(PortAddress, &'a Port)> {
    let found = candidates(
        network.external_ports(),
        |p| p.name.as_str(),
        |p| p.plan_name.as_deref(),
        selector,
        name,
    );
    unique(
        found,
        || format!("network '{}' external ports", network.name()),
        name,
    )
    .map(|(i, p)| (PortAddress::external(PortId::from_usize(i)), p))
}

/// Resolve a bare name to a unit or an external port.
///
/// A unit and an external port sharing the name is ambiguous, not a
/// preference.
pub fn resolve_local<'a>(
    network: &'a Network,
    name: &str,
    selector: &PlanSelector,
) -> NetworkResult<LocalTarget<'a>> {
    let units = candidates(
        network.units(),
        |u| u.name.as_str(),
        |u| u.plan_name.as_deref(),
        selector,
        name,
    );
    let ports = candidates(
        network.external_ports(),
        |p| p.name.as_str(),
        |p| p.plan_name.as_deref(),
        selector,
        name,
    );
    match (units.as_slice(), ports.as_slice()) {
        ([(i, unit)], []) => Ok(LocalTarget::Unit(UnitId::from_usize(*i), *unit)),
        ([], [(i, port)]) => Ok(LocalTarget::ExternalPort(
            PortAddress::external(PortId::from_usize(*i)),
            *port,
        )),
        (u, p) => Err(NetworkError::unresolved(
            format!("network '{}'", network.name()),
            name,
            u.len() + p.len(),
        )),
    }
}

/// Fetch the model a reference points at.
///
/// The reference shape is checked before the lookup is consulted, and the
/// returned document must carry the requested UUID.
pub fn resolve_model(
    reference: &DataObjectReference,
    lookup: &dyn ModelLookup,
) -> NetworkResult<Arc<Model>> {
    reference
        .validate_shape()
        .map_err(|e| NetworkError::MalformedReference {
            reference: reference.to_string(),
            reason: e.to_string(),
        })?;

    debug!(%reference, "resolving model reference");
    let model = lookup
        .lookup(reference)
        .ok_or_else(|| NetworkError::DocumentNotFound {
            reference: reference.to_string(),
        })?;

    if model.uuid() != reference.uuid() {
        return Err(NetworkError::ReferenceMismatch {
            reference: reference.to_string(),
            found: model.uuid().hyphenated().to_string(),
        });
    }
    Ok(model)
}

/// Resolved far end of an external connection.
#[derive(Debug, Clone)]
pub struct ExternalTarget {
    model: Arc<Model>,
    network: usize,
    port: PortAddress,
}

impl ExternalTarget {
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    pub fn network(&self) -> &Network {
        &self.model.networks()[self.network]
    }

    pub fn port_address(&self) -> PortAddress {
        self.port
    }

    pub fn port(&self) -> &Port {
        self.network()
            .port(self.port)
            .expect("address was resolved against this network")
    }
}

fn connectable(port: &Port, path: impl FnOnce() -> String) -> NetworkResult<()> {
    if port.exposed {
        return Err(NetworkError::ExposedPortNotConnectable { port: path() });
    }
    Ok(())
}

/// Follow an external connection into the target document.
///
/// Exposed ports are visible from outside but not connectable, so neither
/// end may be one.
pub fn resolve_external_connect(
    network: &Network,
    connect: &ExternalConnect,
    lookup: &dyn ModelLookup,
) -> NetworkResult<ExternalTarget> {
    let (_, local) = resolve_external_port(network, &connect.port, &PlanSelector::Actual)?;
    connectable(local, || format!("{}/{}", network.name(), local.name))?;

    let model = resolve_model(&connect.target_model, lookup)?;
    let network_index = model
        .networks()
        .iter()
        .position(|n| n.name() == connect.target_network)
        .ok_or_else(|| {
            NetworkError::unresolved(
                format!("model '{}'", model.title()),
                &connect.target_network,
                0,
            )
        })?;
    let target_network = &model.networks()[network_index];
    let (port, remote) =
        resolve_external_port(target_network, &connect.target_port, &PlanSelector::Actual)?;
    connectable(remote, || {
        format!("{}:{}/{}", model.title(), target_network.name(), remote.name)
    })?;

    Ok(ExternalTarget {
        model,
        network: network_index,
        port,
    })
}

/// Opt-in integrity check: every external connection of `model` must be
/// matched by one pointing back from the target document.
///
/// Resolution failures are reported alongside unpaired connections.
pub fn check_external_pairing(model: &Model, lookup: &dyn ModelLookup) -> Vec<NetworkError> {
    let mut findings = Vec::new();
    for network in model.networks() {
        for connect in network.external_connects() {
            let from = format!("{}/{}", network.name(), connect.port);
            let to = format!(
                "{}:{}/{}",
                connect.target_model, connect.target_network, connect.target_port
            );
            let target = match resolve_external_connect(network, connect, lookup) {
                Ok(target) => target,
                Err(e) => {
                    findings.push(e);
                    continue;
                }
            };
            let paired = target.network().external_connects().iter().any(|back| {
                back.port == target.port().name
                    && back.target_model.uuid() == model.uuid()
                    && back.target_network == network.name()
                    && back.target_port == connect.port
            });
            if !paired {
                warn!(%from, %to, "external connection is not paired");
                findings.push(NetworkError::UnpairedExternalConnect { from, to });
            }
        }
    }
    findings
}

fn port_names<'a>(ports: &'a [Port], selector: &PlanSelector) -> BTreeSet<&'a str> {
    select_visible(ports, |p| p.name.as_str(), |p| p.plan_name.as_deref(), selector.plan_name())
        .into_iter()
        .map(|(_, p)| p.name.as_str())
        .collect()
}

/// Compare a unit's ports with the external ports of its internal network.
///
/// Returns `Ok(None)` for units without an internal network or with a
/// matching one.
pub fn check_internal_contract(
    model: &Model,
    network: &Network,
    unit: &Unit,
    selector: &PlanSelector,
) -> NetworkResult<Option<PortContractMismatch>> {
    let Some(internal_name) = unit.internal_network.as_deref() else {
        return Ok(None);
    };
    let internal = resolve_network(model, internal_name)?;

    let unit_ports = port_names(&unit.ports, selector);
    let network_ports = port_names(internal.external_ports(), selector);
    if unit_ports == network_ports {
        return Ok(None);
    }

    let mismatch = PortContractMismatch {
        network: network.name().to_string(),
        unit: unit.name.clone(),
        internal_network: internal_name.to_string(),
        missing_in_internal: unit_ports
            .difference(&network_ports)
            .map(|s| s.to_string())
            .collect(),
        missing_on_unit: network_ports
            .difference(&unit_ports)
            .map(|s| s.to_string())
            .collect(),
    };
    warn!(%mismatch, "port contract mismatch");
    Ok(Some(mismatch))
}

/// Contract findings across a whole model.
#[derive(Debug, Clone, Default)]
pub struct ContractReport {
    pub mismatches: Vec<PortContractMismatch>,
    /// Dangling internal network references.
    pub errors: Vec<NetworkError>,
}

impl ContractReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty() && self.errors.is_empty()
    }
}

/// Run the internal network contract check for every unit in the actual topology.
pub fn check_contracts(model: &Model) -> ContractReport {
    let mut report = ContractReport::default();
    for network in model.networks() {
        for unit in network.units() {
            match check_internal_contract(model, network, unit, &PlanSelector::Actual) {
                Ok(Some(mismatch)) => report.mismatches.push(mismatch),
                Ok(None) => {}
                Err(e) => report.errors.push(e),
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ModelBuilder, NetworkBuilder};
    use crate::model::{FacilityIdentifier, PortDirection};
    use pf_core::Uid;
    use pf_core::enums::ReportingFacility;
    use uuid::Uuid;

    fn uid(s: &str) -> Uid {
        Uid::new(s).unwrap()
    }

    fn unit(u: &str, name: &str, ports: &[(&str, PortDirection)]) -> Unit {
        let mut unit = Unit::new(
            uid(u),
            name,
            FacilityIdentifier::new(name, ReportingFacility::Separator),
        );
        for (i, (port, dir)) in ports.iter().enumerate() {
            unit.ports.push(Port::new(uid(&format!("{u}-p{i}")), *port, *dir));
        }
        unit
    }

    fn facility() -> Network {
        let mut b = NetworkBuilder::new(uid("n1"), "Facility");
        b.add_unit(
            unit(
                "u1",
                "SeparatorA",
                &[("in1", PortDirection::Inlet), ("out1", PortDirection::Outlet)],
            )
            .with_internal_network("SeparatorDetail"),
        );
        b.add_unit(unit("u2", "Tank1", &[("in1", PortDirection::Inlet)]));
        b.add_external_port(Port::new(uid("x1"), "Tank1", PortDirection::Outlet));
        b.add_external_port(Port::new(uid("x2"), "export", PortDirection::Outlet));
        b.build().unwrap()
    }

    fn detail(ports: &[&str]) -> Network {
        let mut b = NetworkBuilder::new(uid("n2"), "SeparatorDetail").parent("Facility");
        b.add_unit(unit("u1", "Vessel", &[("in", PortDirection::Inlet)]));
        for (i, p) in ports.iter().enumerate() {
            b.add_external_port(Port::new(uid(&format!("x{i}")), *p, PortDirection::Unknown));
        }
        b.build().unwrap()
    }

    fn model(detail_ports: &[&str]) -> Model {
        ModelBuilder::new(Uuid::nil(), "M")
            .network(facility())
            .network(detail(detail_ports))
            .build()
            .unwrap()
    }

    #[test]
    fn resolves_units_and_ports_by_name() {
        let net = facility();
        let (id, sep) = resolve_unit(&net, "SeparatorA", &PlanSelector::Actual).unwrap();
        assert_eq!(id.index(), 0);
        assert_eq!(sep.name, "SeparatorA");

        let (addr, port) =
            resolve_unit_port(&net, "SeparatorA", "out1", &PlanSelector::Actual).unwrap();
        assert_eq!(port.direction, PortDirection::Outlet);
        assert_eq!(net.port_path(addr), "Facility/SeparatorA/out1");

        let (addr, _) = resolve_external_port(&net, "export", &PlanSelector::Actual).unwrap();
        assert!(addr.is_external());
    }

    #[test]
    fn missing_name_is_unresolved_with_zero_matches() {
        let net = facility();
        assert_eq!(
            resolve_unit(&net, "Nope", &PlanSelector::Actual).unwrap_err(),
            NetworkError::UnresolvedLocalReference {
                scope: "network 'Facility' units".into(),
                name: "Nope".into(),
                matches: 0
            }
        );
    }

    #[test]
    fn unit_and_port_with_same_name_is_ambiguous() {
        let net = facility();
        assert!(matches!(
            resolve_local(&net, "Tank1", &PlanSelector::Actual),
            Err(NetworkError::UnresolvedLocalReference { matches: 2, .. })
        ));
        assert!(matches!(
            resolve_local(&net, "export", &PlanSelector::Actual),
            Ok(LocalTarget::ExternalPort(..))
        ));
        assert!(matches!(
            resolve_local(&net, "SeparatorA", &PlanSelector::Actual),
            Ok(LocalTarget::Unit(..))
        ));
    }

    #[test]
    fn matching_internal_network_passes_contract() {
        let m = model(&["in1", "out1"]);
        assert!(check_contracts(&m).is_clean());
    }

    #[test]
    fn contract_mismatch_reports_both_sides() {
        let m = model(&["in1", "gas_out"]);
        let report = check_contracts(&m);
        assert!(report.errors.is_empty());
        assert_eq!(
            report.mismatches,
            vec![PortContractMismatch {
                network: "Facility".into(),
                unit: "SeparatorA".into(),
                internal_network: "SeparatorDetail".into(),
                missing_in_internal: vec!["out1".into()],
                missing_on_unit: vec!["gas_out".into()],
            }]
        );
    }

    #[test]
    fn dangling_internal_network_is_an_error() {
        let m = ModelBuilder::new(Uuid::nil(), "M")
            .network(facility())
            .build()
            .unwrap();
        let report = check_contracts(&m);
        assert!(report.mismatches.is_empty());
        assert!(matches!(
            report.errors[..],
            [NetworkError::UnresolvedLocalReference { matches: 0, .. }]
        ));
    }

    #[test]
    fn lookup_must_return_the_requested_document() {
        let m = Arc::new(model(&["in1", "out1"]));
        let served = Arc::clone(&m);
        let lookup = move |_: &DataObjectReference| Some(Arc::clone(&served));

        let good = DataObjectReference::from_uuid("ProductFlowModel", Uuid::nil());
        assert!(resolve_model(&good, &lookup).is_ok());

        let other = DataObjectReference::new(
            "ProductFlowModel",
            "0f7e4c5a-1b2c-4d3e-8f90-a1b2c3d4e5f6",
        )
        .unwrap();
        assert!(matches!(
            resolve_model(&other, &lookup),
            Err(NetworkError::ReferenceMismatch { .. })
        ));

        let malformed = DataObjectReference::from_uuid("", Uuid::nil());
        assert!(matches!(
            resolve_model(&malformed, &lookup),
            Err(NetworkError::MalformedReference { .. })
        ));

        let nothing = |_: &DataObjectReference| -> Option<Arc<Model>> { None };
        assert!(matches!(
            resolve_model(&good, &nothing),
            Err(NetworkError::DocumentNotFound { .. })
        ));
    }
}
