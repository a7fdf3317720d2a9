//! Node materialization.
//!
//! Nodes are never stored. At a given instant (and plan) every port's active
//! membership names a node; ports naming the same node form one group.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use pf_core::{MassRate, Pressure, Tolerances, kgps, nearly_equal};
use tracing::{debug, warn};

use crate::error::{NetworkError, NetworkResult};
use crate::model::{ConnectedNode, Model, Network, Port, PortAddress, PortDirection};
use crate::plan::{self, NetworkView, PlanSelector, PortView};

/// Which way a member moves product relative to the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeSide {
    /// Delivers product into the node.
    Supplies,
    /// Takes product out of the node.
    Draws,
}

/// A port's participation in a node at the queried instant.
#[derive(Debug, Clone, Copy)]
pub struct NodeMember<'a> {
    pub address: PortAddress,
    /// Owning unit, `None` for an external port.
    pub unit: Option<&'a str>,
    pub port: &'a Port,
    pub connection: &'a ConnectedNode,
}

impl NodeMember<'_> {
    pub fn direction(&self) -> PortDirection {
        self.port.direction
    }

    /// Side of the node balance this member counts on.
    ///
    /// A unit outlet feeds the node; an external inlet port brings product
    /// into the network and therefore also feeds the node it joins.
    pub fn node_side(&self) -> Option<NodeSide> {
        let external = self.address.is_external();
        match (self.port.direction, external) {
            (PortDirection::Outlet, false) | (PortDirection::Inlet, true) => {
                Some(NodeSide::Supplies)
            }
            (PortDirection::Inlet, false) | (PortDirection::Outlet, true) => Some(NodeSide::Draws),
            (PortDirection::Unknown, _) => None,
        }
    }
}

/// Result of a node mass balance.
#[derive(Debug, Clone)]
pub struct MassBalance {
    pub inflow: MassRate,
    pub outflow: MassRate,
    /// Members with unknown direction or without a flow value.
    pub unclassified: Vec<PortAddress>,
    pub balanced: bool,
}

impl MassBalance {
    pub fn imbalance(&self) -> MassRate {
        self.inflow - self.outflow
    }
}

/// Spread of member pressures across a node.
#[derive(Debug, Clone)]
pub struct PressureCheck {
    pub lowest: Option<Pressure>,
    pub highest: Option<Pressure>,
    /// Members without a pressure value.
    pub unknown: Vec<PortAddress>,
    /// No pressure drop across the node, within tolerance.
    pub uniform: bool,
}

/// Ports sharing one node name at the queried instant.
#[derive(Debug, Clone)]
pub struct NodeGroup<'a> {
    pub node: &'a str,
    pub members: Vec<NodeMember<'a>>,
}

impl<'a> NodeGroup<'a> {
    /// Check conservation of mass for this node.
    ///
    /// `flow_of` returns the reported flow through a member's port; negative
    /// values mean the flow reversed during the period and are summed as-is.
    pub fn mass_balance<F>(&self, mut flow_of: F, tolerances: Tolerances) -> MassBalance
    where
        F: FnMut(&NodeMember<'a>) -> Option<MassRate>,
    {
        let mut inflow = kgps(0.0);
        let mut outflow = kgps(0.0);
        let mut unclassified = Vec::new();

        for member in &self.members {
            match (member.node_side(), flow_of(member)) {
                (Some(NodeSide::Supplies), Some(flow)) => inflow += flow,
                (Some(NodeSide::Draws), Some(flow)) => outflow += flow,
                _ => unclassified.push(member.address),
            }
        }

        let balanced = nearly_equal(inflow.value, outflow.value, tolerances);
        MassBalance {
            inflow,
            outflow,
            unclassified,
            balanced,
        }
    }

    /// Check that all members report the same pressure.
    ///
    /// A node with fewer than two known pressures is trivially uniform.
    pub fn pressure_check<F>(&self, mut pressure_of: F, tolerances: Tolerances) -> PressureCheck
    where
        F: FnMut(&NodeMember<'a>) -> Option<Pressure>,
    {
        let mut lowest: Option<Pressure> = None;
        let mut highest: Option<Pressure> = None;
        let mut unknown = Vec::new();

        for member in &self.members {
            let Some(p) = pressure_of(member) else {
                unknown.push(member.address);
                continue;
            };
            if lowest.is_none_or(|lo| p.value < lo.value) {
                lowest = Some(p);
            }
            if highest.is_none_or(|hi| p.value > hi.value) {
                highest = Some(p);
            }
        }

        let uniform = match (lowest, highest) {
            (Some(lo), Some(hi)) => nearly_equal(lo.value, hi.value, tolerances),
            _ => true,
        };
        PressureCheck {
            lowest,
            highest,
            unknown,
            uniform,
        }
    }
}

/// Node groups of one network view at one instant.
#[derive(Debug, Clone, Default)]
pub struct NodePartition<'a> {
    groups: Vec<NodeGroup<'a>>,
    index: HashMap<&'a str, usize>,
    disconnected: Vec<PortView<'a>>,
    conflicts: Vec<NetworkError>,
}

impl<'a> NodePartition<'a> {
    /// Groups in order of first appearance in the document.
    pub fn groups(&self) -> &[NodeGroup<'a>] {
        &self.groups
    }

    pub fn group(&self, node: &str) -> Option<&NodeGroup<'a>> {
        self.index.get(node).map(|&i| &self.groups[i])
    }

    /// Visible ports without an active membership.
    pub fn disconnected(&self) -> &[PortView<'a>] {
        &self.disconnected
    }

    /// Ports left out because their memberships overlap.
    pub fn conflicts(&self) -> &[NetworkError] {
        &self.conflicts
    }

    /// Node a port belongs to, if any.
    pub fn node_of(&self, address: PortAddress) -> Option<&'a str> {
        self.groups
            .iter()
            .find(|g| g.members.iter().any(|m| m.address == address))
            .map(|g| g.node)
    }

    fn push(&mut self, member: NodeMember<'a>) {
        let node = member.connection.node.as_str();
        match self.index.get(node) {
            Some(&i) => self.groups[i].members.push(member),
            None => {
                self.index.insert(node, self.groups.len());
                self.groups.push(NodeGroup {
                    node,
                    members: vec![member],
                });
            }
        }
    }
}

/// First overlapping pair within one tier of a port's memberships.
fn first_overlap<'a>(tier: &[&'a ConnectedNode]) -> Option<(&'a ConnectedNode, &'a ConnectedNode)> {
    tier.iter().enumerate().find_map(|(i, a)| {
        tier[i + 1..]
            .iter()
            .find(|b| a.window.overlaps(&b.window))
            .map(|b| (*a, *b))
    })
}

/// Active membership of a port, or the overlap that makes it undecidable.
///
/// Plan-tagged memberships shadow untagged ones whenever one of them is
/// active; memberships tagged with another plan are ignored.
fn active_membership<'a>(
    port: &'a Port,
    overlay: Option<&str>,
    at: DateTime<Utc>,
) -> Result<Option<&'a ConnectedNode>, (&'a ConnectedNode, &'a ConnectedNode)> {
    let actual: Vec<&ConnectedNode> = port
        .connections
        .iter()
        .filter(|c| c.plan_name.is_none())
        .collect();
    let planned: Vec<&ConnectedNode> = match overlay {
        Some(plan) => port
            .connections
            .iter()
            .filter(|c| c.plan_name.as_deref() == Some(plan))
            .collect(),
        None => Vec::new(),
    };

    for tier in [&planned, &actual] {
        if let Some(pair) = first_overlap(tier) {
            return Err(pair);
        }
    }

    let active = |tier: &[&'a ConnectedNode]| tier.iter().copied().find(|c| c.window.contains(at));
    Ok(active(planned.as_slice()).or_else(|| active(actual.as_slice())))
}

/// Partition the ports of an already flattened view.
pub fn materialize_view<'a>(view: &NetworkView<'a>, at: DateTime<Utc>) -> NodePartition<'a> {
    let network = view.network();
    let overlay = view.overlay().map(|p| p.name.as_str());
    debug!(network = network.name(), plan = ?overlay, %at, "materializing nodes");

    let mut partition = NodePartition::default();
    for (unit, port_view) in view.ports() {
        match active_membership(port_view.port, overlay, at) {
            Ok(Some(connection)) => partition.push(NodeMember {
                address: port_view.address,
                unit,
                port: port_view.port,
                connection,
            }),
            Ok(None) => partition.disconnected.push(port_view),
            Err((first, second)) => {
                let port = network.port_path(port_view.address);
                warn!(%port, first = %first.window, second = %second.window, "overlapping node memberships");
                partition
                    .conflicts
                    .push(NetworkError::OverlappingConnectionWindows {
                        port,
                        first: first.window,
                        second: second.window,
                    });
            }
        }
    }
    partition
}

/// Flatten `network` under `selector` and partition its ports into nodes at `at`.
pub fn materialize<'a>(
    model: &'a Model,
    network: &'a Network,
    selector: &PlanSelector,
    at: DateTime<Utc>,
) -> NetworkResult<NodePartition<'a>> {
    let view = plan::view(model, network, selector, Some(at))?;
    Ok(materialize_view(&view, at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ModelBuilder, NetworkBuilder};
    use crate::model::{FacilityIdentifier, Plan, Unit};
    use chrono::TimeZone;
    use pf_core::enums::ReportingFacility;
    use pf_core::{Measure, Uid, Window};
    use uuid::Uuid;

    fn uid(s: &str) -> Uid {
        Uid::new(s).unwrap()
    }

    fn t(year: i32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap()
    }

    fn span(from: i32, to: i32) -> Window {
        Window::new(Some(t(from)), Some(t(to)))
    }

    fn unit(u: &str, name: &str, kind: ReportingFacility) -> Unit {
        Unit::new(uid(u), name, FacilityIdentifier::new(name, kind))
    }

    /// SeparatorA.out1 and Tank1.in1 share node N1; Tank1 moves to N2 in 2030.
    fn facility() -> Model {
        let mut b = NetworkBuilder::new(uid("n1"), "Facility");
        b.add_plan(Plan::new(uid("plan1"), "Future", t(2030)));

        let sep = b.add_unit(unit("u1", "SeparatorA", ReportingFacility::Separator));
        let out1 = b
            .add_port(sep, Port::new(uid("p1"), "out1", PortDirection::Outlet))
            .unwrap();
        b.connect(out1, ConnectedNode::new(uid("c1"), "N1", Window::always()))
            .unwrap();

        let tank = b.add_unit(unit("u2", "Tank1", ReportingFacility::Tank));
        let in1 = b
            .add_port(tank, Port::new(uid("p1"), "in1", PortDirection::Inlet))
            .unwrap();
        b.connect(in1, ConnectedNode::new(uid("c1"), "N1", Window::always()))
            .unwrap();
        b.connect(
            in1,
            ConnectedNode::new(uid("c2"), "N2", Window::since(t(2030))).in_plan("Future"),
        )
        .unwrap();

        let spare = b.add_unit(unit("u3", "Spare", ReportingFacility::Tank));
        b.add_port(spare, Port::new(uid("p1"), "in1", PortDirection::Inlet))
            .unwrap();

        let export = b.add_external_port(Port::new(uid("x1"), "export", PortDirection::Outlet));
        b.connect(export, ConnectedNode::new(uid("c1"), "N3", span(2020, 2025)))
            .unwrap();

        ModelBuilder::new(Uuid::nil(), "M")
            .network(b.build().unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn separator_and_tank_share_node() {
        let m = facility();
        let net = m.network("Facility").unwrap();
        let nodes = materialize(&m, net, &PlanSelector::Actual, t(2024)).unwrap();

        let n1 = nodes.group("N1").unwrap();
        let members: Vec<(Option<&str>, &str)> = n1
            .members
            .iter()
            .map(|m| (m.unit, m.port.name.as_str()))
            .collect();
        assert_eq!(
            members,
            [(Some("SeparatorA"), "out1"), (Some("Tank1"), "in1")]
        );
        let names: Vec<&str> = nodes.groups().iter().map(|g| g.node).collect();
        assert_eq!(names, ["N1", "N3"]);
        assert_eq!(nodes.disconnected().len(), 1);
        assert_eq!(nodes.disconnected()[0].port.name, "in1");
        assert!(nodes.conflicts().is_empty());
    }

    #[test]
    fn expired_membership_disconnects_port() {
        let m = facility();
        let net = m.network("Facility").unwrap();
        let nodes = materialize(&m, net, &PlanSelector::Actual, t(2026)).unwrap();
        assert!(nodes.group("N3").is_none());
        assert_eq!(nodes.disconnected().len(), 2);
    }

    #[test]
    fn plan_membership_shadows_actual_once_active() {
        let m = facility();
        let net = m.network("Facility").unwrap();
        let plan = PlanSelector::plan("Future");

        let before = materialize(&m, net, &plan, t(2029)).unwrap();
        assert_eq!(before.group("N1").unwrap().members.len(), 2);

        let after = materialize(&m, net, &plan, t(2031)).unwrap();
        assert_eq!(after.group("N1").unwrap().members.len(), 1);
        let tank_in = after.group("N2").unwrap().members[0].address;
        assert_eq!(after.node_of(tank_in), Some("N2"));
        assert_eq!(net.port_path(tank_in), "Facility/Tank1/in1");
    }

    #[test]
    fn overlapping_memberships_exclude_the_port() {
        let mut b = NetworkBuilder::new(uid("n1"), "Facility");
        let u = b.add_unit(unit("u1", "Valve", ReportingFacility::BlockValve));
        let p = b
            .add_port(u, Port::new(uid("p1"), "in", PortDirection::Inlet))
            .unwrap();
        b.connect(p, ConnectedNode::new(uid("c1"), "N1", span(2020, 2025)))
            .unwrap();
        b.connect(p, ConnectedNode::new(uid("c2"), "N2", span(2024, 2026)))
            .unwrap();
        let q = b
            .add_port(u, Port::new(uid("p2"), "out", PortDirection::Outlet))
            .unwrap();
        b.connect(q, ConnectedNode::new(uid("c1"), "N9", Window::always()))
            .unwrap();
        let m = ModelBuilder::new(Uuid::nil(), "M")
            .network(b.build().unwrap())
            .build()
            .unwrap();

        let nodes = materialize(&m, &m.networks()[0], &PlanSelector::Actual, t(2021)).unwrap();
        assert!(nodes.group("N1").is_none());
        assert!(nodes.group("N9").is_some());
        assert!(matches!(
            &nodes.conflicts()[..],
            [NetworkError::OverlappingConnectionWindows { port, .. }] if port == "Facility/Valve/in"
        ));
    }

    #[test]
    fn mass_balance_counts_external_ports_on_the_opposite_side() {
        let m = facility();
        let net = m.network("Facility").unwrap();
        let nodes = materialize(&m, net, &PlanSelector::Actual, t(2024)).unwrap();

        let n1 = nodes.group("N1").unwrap();
        let balance = n1.mass_balance(|_| Some(kgps(5.0)), Tolerances::reported());
        assert!(balance.balanced);
        assert_eq!(balance.inflow.value, 5.0);
        assert!(balance.unclassified.is_empty());

        let n3 = nodes.group("N3").unwrap();
        assert_eq!(n3.members[0].node_side(), Some(NodeSide::Draws));
        let balance = n3.mass_balance(|_| Some(kgps(2.0)), Tolerances::reported());
        assert!(!balance.balanced);
        assert_eq!(balance.imbalance().value, -2.0);
    }

    #[test]
    fn pressure_check_flags_a_drop_across_the_node() {
        let m = facility();
        let net = m.network("Facility").unwrap();
        let nodes = materialize(&m, net, &PlanSelector::Actual, t(2024)).unwrap();
        let n1 = nodes.group("N1").unwrap();

        let same = Measure::new(12.0, "bar").unwrap();
        let check = n1.pressure_check(|_| same.as_pressure(), Tolerances::reported());
        assert!(check.uniform);

        let reported = |member: &NodeMember<'_>| {
            let bar = if member.unit == Some("Tank1") { 11.5 } else { 12.0 };
            Measure::new(bar, "bar").unwrap().as_pressure()
        };
        let check = n1.pressure_check(reported, Tolerances::reported());
        assert!(!check.uniform);
        assert_eq!(check.highest.unwrap().value - check.lowest.unwrap().value, 50_000.0);

        let check = n1.pressure_check(|_| None, Tolerances::reported());
        assert!(check.uniform);
        assert_eq!(check.unknown.len(), 2);
    }

    #[test]
    fn missing_flows_are_unclassified() {
        let m = facility();
        let net = m.network("Facility").unwrap();
        let nodes = materialize(&m, net, &PlanSelector::Actual, t(2024)).unwrap();
        let n1 = nodes.group("N1").unwrap();
        let balance = n1.mass_balance(
            |member| (member.unit == Some("SeparatorA")).then(|| kgps(3.0)),
            Tolerances::default(),
        );
        assert_eq!(balance.unclassified.len(), 1);
        assert!(!balance.balanced);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::builder::{ModelBuilder, NetworkBuilder};
    use crate::model::{FacilityIdentifier, Unit};
    use chrono::TimeZone;
    use pf_core::enums::ReportingFacility;
    use pf_core::{Uid, Window};
    use proptest::prelude::*;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn year(y: i32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, 1, 1, 0, 0, 0).unwrap()
    }

    /// (node index, start year, length in years)
    type Membership = (usize, i32, i32);

    fn membership() -> impl Strategy<Value = Membership> {
        (0usize..4, 2000i32..2010, 1i32..6)
    }

    fn build(ports: &[Vec<Membership>]) -> Model {
        let mut b = NetworkBuilder::new(Uid::new("n").unwrap(), "Net");
        for (u, memberships) in ports.iter().enumerate() {
            let unit = b.add_unit(Unit::new(
                Uid::new(format!("u{u}")).unwrap(),
                format!("U{u}"),
                FacilityIdentifier::new("U", ReportingFacility::Unknown),
            ));
            let port = b
                .add_port(
                    unit,
                    Port::new(Uid::new("p").unwrap(), "p", PortDirection::Inlet),
                )
                .unwrap();
            for (i, (node, start, len)) in memberships.iter().enumerate() {
                let window = Window::new(Some(year(*start)), Some(year(start + len)));
                b.connect(
                    port,
                    ConnectedNode::new(Uid::new(format!("c{i}")).unwrap(), format!("N{node}"), window),
                )
                .unwrap();
            }
        }
        ModelBuilder::new(Uuid::nil(), "M")
            .network(b.build().unwrap())
            .build()
            .unwrap()
    }

    proptest! {
        #[test]
        fn every_port_lands_in_exactly_one_bucket(
            ports in prop::collection::vec(prop::collection::vec(membership(), 0..4), 1..8),
            at in 1998i32..2017,
        ) {
            let m = build(&ports);
            let net = &m.networks()[0];
            let nodes = materialize(&m, net, &PlanSelector::Actual, year(at)).unwrap();

            let mut seen = HashSet::new();
            for group in nodes.groups() {
                for member in &group.members {
                    prop_assert!(seen.insert(member.address));
                }
            }
            for port in nodes.disconnected() {
                prop_assert!(seen.insert(port.address));
            }
            prop_assert_eq!(seen.len() + nodes.conflicts().len(), net.units().len());
        }

        #[test]
        fn grouped_flows_balance_when_supply_matches_draw(
            supplies in prop::collection::vec(0.0f64..1e4, 1..6),
            skew in 1.0f64..100.0,
        ) {
            let mut b = NetworkBuilder::new(Uid::new("n").unwrap(), "Net");
            let sink = b.add_unit(Unit::new(
                Uid::new("sink").unwrap(),
                "Sink",
                FacilityIdentifier::new("Sink", ReportingFacility::Tank),
            ));
            let inlet = b
                .add_port(sink, Port::new(Uid::new("p").unwrap(), "in", PortDirection::Inlet))
                .unwrap();
            b.connect(inlet, ConnectedNode::new(Uid::new("c").unwrap(), "N", Window::always()))
                .unwrap();
            for i in 0..supplies.len() {
                let u = b.add_unit(Unit::new(
                    Uid::new(format!("w{i}")).unwrap(),
                    format!("Well{i}"),
                    FacilityIdentifier::new("Well", ReportingFacility::Unknown),
                ));
                let out = b
                    .add_port(u, Port::new(Uid::new("p").unwrap(), "out", PortDirection::Outlet))
                    .unwrap();
                b.connect(out, ConnectedNode::new(Uid::new("c").unwrap(), "N", Window::always()))
                    .unwrap();
            }
            let m = ModelBuilder::new(Uuid::nil(), "M")
                .network(b.build().unwrap())
                .build()
                .unwrap();
            let nodes = materialize(&m, &m.networks()[0], &PlanSelector::Actual, year(2020)).unwrap();
            let group = nodes.group("N").unwrap();

            let total: f64 = supplies.iter().sum();
            let flow = |extra: f64| {
                let supplies = supplies.clone();
                move |member: &NodeMember<'_>| match member.unit {
                    Some("Sink") => Some(kgps(total + extra)),
                    Some(name) => {
                        let i: usize = name.trim_start_matches("Well").parse().ok()?;
                        Some(kgps(supplies[i]))
                    }
                    None => None,
                }
            };

            let even = group.mass_balance(flow(0.0), Tolerances::reported());
            prop_assert!(even.balanced);
            prop_assert!(even.unclassified.is_empty());

            let uneven = group.mass_balance(flow(skew), Tolerances::reported());
            prop_assert!(!uneven.balanced);
        }
    }
}
