//! Plan overlay: the flattened view of a network as of a plan.
//!
//! `view(P) = actual ∪ tagged(P)`, where a component tagged with P shadows an
//! untagged sibling of the same name. Plans never delete: an actual
//! component without a tagged replacement stays visible.

use chrono::{DateTime, Utc};
use tracing::debug;

use pf_core::{PortId, UnitId};

use crate::error::{NetworkError, NetworkResult};
use crate::hierarchy;
use crate::model::{Model, Network, Plan, Port, PortAddress, Unit};

/// Which topology a query looks at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum PlanSelector {
    /// The current, non-plan topology.
    #[default]
    Actual,
    /// The actual topology overlaid with one named plan.
    Plan(String),
}

impl PlanSelector {
    pub fn plan(name: impl Into<String>) -> Self {
        Self::Plan(name.into())
    }

    pub fn plan_name(&self) -> Option<&str> {
        match self {
            Self::Actual => None,
            Self::Plan(name) => Some(name.as_str()),
        }
    }
}

/// Find a plan declared on `network` or inherited from one of its ancestors.
pub fn find_plan<'m>(model: &'m Model, network: &'m Network, name: &str) -> NetworkResult<&'m Plan> {
    for net in hierarchy::lineage(model, network)? {
        if let Some(plan) = net.plans().iter().find(|p| p.name == name) {
            return Ok(plan);
        }
    }
    Err(NetworkError::UnknownPlan {
        network: network.name().to_string(),
        plan: name.to_string(),
    })
}

/// A port as seen through a view.
#[derive(Debug, Clone, Copy)]
pub struct PortView<'a> {
    pub address: PortAddress,
    pub port: &'a Port,
}

/// A unit as seen through a view, with its visible ports.
#[derive(Debug, Clone)]
pub struct UnitView<'a> {
    pub id: UnitId,
    pub unit: &'a Unit,
    pub ports: Vec<PortView<'a>>,
}

impl<'a> UnitView<'a> {
    pub fn port(&self, name: &str) -> Option<&PortView<'a>> {
        self.ports.iter().find(|p| p.port.name == name)
    }
}

/// Flattened network as of a plan selection.
#[derive(Debug, Clone)]
pub struct NetworkView<'a> {
    network: &'a Network,
    selector: PlanSelector,
    overlay: Option<&'a Plan>,
    units: Vec<UnitView<'a>>,
    external_ports: Vec<PortView<'a>>,
}

impl<'a> NetworkView<'a> {
    pub fn network(&self) -> &'a Network {
        self.network
    }

    pub fn selector(&self) -> &PlanSelector {
        &self.selector
    }

    /// The plan whose components were merged in; `None` for the actual view
    /// or when the query instant precedes the plan's divergence.
    pub fn overlay(&self) -> Option<&'a Plan> {
        self.overlay
    }

    pub fn units(&self) -> &[UnitView<'a>] {
        &self.units
    }

    pub fn unit(&self, name: &str) -> Option<&UnitView<'a>> {
        self.units.iter().find(|u| u.unit.name == name)
    }

    pub fn external_ports(&self) -> &[PortView<'a>] {
        &self.external_ports
    }

    pub fn external_port(&self, name: &str) -> Option<&PortView<'a>> {
        self.external_ports.iter().find(|p| p.port.name == name)
    }

    /// Every visible port with its owning unit name (`None` for external ports).
    pub fn ports(&self) -> impl Iterator<Item = (Option<&'a str>, PortView<'a>)> + '_ {
        let unit_ports = self
            .units
            .iter()
            .flat_map(|u| u.ports.iter().map(move |p| (Some(u.unit.name.as_str()), *p)));
        let external = self.external_ports.iter().map(|p| (None, *p));
        unit_ports.chain(external)
    }

    pub fn port_count(&self) -> usize {
        self.units.iter().map(|u| u.ports.len()).sum::<usize>() + self.external_ports.len()
    }
}

/// Whether a component with `tag` is visible when `overlay` is merged in,
/// given the tags and names of its siblings.
pub(crate) fn select_visible<'a, T>(
    items: &'a [T],
    name: impl Fn(&T) -> &str,
    tag: impl Fn(&T) -> Option<&str>,
    overlay: Option<&str>,
) -> Vec<(usize, &'a T)> {
    items
        .iter()
        .enumerate()
        .filter(|&(_, item)| match (tag(item), overlay) {
            (None, None) => true,
            (None, Some(plan)) => !items
                .iter()
                .any(|other| tag(other) == Some(plan) && name(other) == name(item)),
            (Some(t), Some(plan)) => t == plan,
            (Some(_), None) => false,
        })
        .collect()
}

fn visible_ports<'a>(
    ports: &'a [Port],
    overlay: Option<&str>,
    address: impl Fn(PortId) -> PortAddress,
) -> Vec<PortView<'a>> {
    select_visible(ports, |p| p.name.as_str(), |p| p.plan_name.as_deref(), overlay)
        .into_iter()
        .map(|(i, port)| PortView {
            address: address(PortId::from_usize(i)),
            port,
        })
        .collect()
}

/// Flatten `network` as of `selector`.
///
/// With an instant earlier than the plan's `dtim_start`, the plan has not
/// diverged yet and the view equals the actual one (the plan name is still
/// checked).
pub fn view<'a>(
    model: &'a Model,
    network: &'a Network,
    selector: &PlanSelector,
    at: Option<DateTime<Utc>>,
) -> NetworkResult<NetworkView<'a>> {
    let overlay = match selector.plan_name() {
        None => None,
        Some(name) => {
            let plan = find_plan(model, network, name)?;
            match at {
                Some(t) if t < plan.dtim_start => None,
                _ => Some(plan),
            }
        }
    };
    let overlay_name = overlay.map(|p| p.name.as_str());

    debug!(
        network = network.name(),
        plan = ?selector.plan_name(),
        overlaid = overlay.is_some(),
        "building network view"
    );

    let units = select_visible(
        network.units(),
        |u| u.name.as_str(),
        |u| u.plan_name.as_deref(),
        overlay_name,
    )
    .into_iter()
    .map(|(i, unit)| {
        let id = UnitId::from_usize(i);
        UnitView {
            id,
            unit,
            ports: visible_ports(&unit.ports, overlay_name, |p| PortAddress::unit(id, p)),
        }
    })
    .collect();

    let external_ports = visible_ports(network.external_ports(), overlay_name, PortAddress::external);

    Ok(NetworkView {
        network,
        selector: selector.clone(),
        overlay,
        units,
        external_ports,
    })
}

/// Look the network up by name and flatten it.
pub fn view_by_name<'a>(
    model: &'a Model,
    network: &str,
    selector: &PlanSelector,
    at: Option<DateTime<Utc>>,
) -> NetworkResult<NetworkView<'a>> {
    let net = crate::resolve::resolve_network(model, network)?;
    view(model, net, selector, at)
}
