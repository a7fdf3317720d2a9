//! Structural validation run by the builders.
//!
//! Everything here only needs the object being built. Findings that need the
//! whole model (hierarchy, plans, internal networks) are computed by the
//! query modules instead.

use std::collections::HashSet;

use pf_core::Uid;

use crate::error::NetworkError;
use crate::model::{Network, Port};

/// Names must be unique per plan tag: an untagged "P1" and a "Future"-tagged
/// "P1" may coexist (the latter shadows the former in the plan view).
fn check_names<'a, I>(scope: &str, kind: &'static str, items: I, findings: &mut Vec<NetworkError>)
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let mut seen: HashSet<(&str, Option<&str>)> = HashSet::new();
    for (name, plan) in items {
        if name.trim().is_empty() {
            findings.push(NetworkError::EmptyName {
                scope: scope.to_string(),
                kind,
            });
            continue;
        }
        if !seen.insert((name, plan)) {
            findings.push(NetworkError::DuplicateName {
                scope: scope.to_string(),
                kind,
                name: name.to_string(),
            });
        }
    }
}

fn check_uids<'a, I>(scope: &str, kind: &'static str, uids: I, findings: &mut Vec<NetworkError>)
where
    I: IntoIterator<Item = &'a Uid>,
{
    let mut seen = HashSet::new();
    for uid in uids {
        if !seen.insert(uid) {
            findings.push(NetworkError::DuplicateUid {
                scope: scope.to_string(),
                kind,
                uid: uid.to_string(),
            });
        }
    }
}

fn check_ports(scope: &str, ports: &[Port], findings: &mut Vec<NetworkError>) {
    check_uids(scope, "port", ports.iter().map(|p| &p.uid), findings);
    check_names(
        scope,
        "port",
        ports.iter().map(|p| (p.name.as_str(), p.plan_name.as_deref())),
        findings,
    );

    for port in ports {
        let port_scope = format!("{scope}/{}", port.name);
        check_uids(
            &port_scope,
            "connected node",
            port.connections.iter().map(|c| &c.uid),
            findings,
        );
        for connection in &port.connections {
            if connection.window.is_empty() {
                findings.push(NetworkError::InvalidWindow {
                    scope: port_scope.clone(),
                    window: connection.window,
                });
            }
            if connection.node.trim().is_empty() {
                findings.push(NetworkError::EmptyName {
                    scope: port_scope.clone(),
                    kind: "node",
                });
            }
        }
    }
}

/// Collect every structural finding for a network.
pub(crate) fn network_findings(network: &Network) -> Vec<NetworkError> {
    let mut findings = Vec::new();
    let scope = network.name.as_str();

    if network.units.is_empty() {
        findings.push(NetworkError::MissingChildren {
            scope: scope.to_string(),
            what: "unit",
        });
    }

    check_uids(scope, "unit", network.units.iter().map(|u| &u.uid), &mut findings);
    check_names(
        scope,
        "unit",
        network
            .units
            .iter()
            .map(|u| (u.name.as_str(), u.plan_name.as_deref())),
        &mut findings,
    );

    for unit in &network.units {
        let unit_scope = format!("{scope}/{}", unit.name);
        if unit.ports.is_empty() {
            findings.push(NetworkError::MissingChildren {
                scope: unit_scope.clone(),
                what: "port",
            });
        }
        check_ports(&unit_scope, &unit.ports, &mut findings);
    }

    check_ports(scope, &network.ports, &mut findings);

    check_uids(scope, "plan", network.plans.iter().map(|p| &p.uid), &mut findings);
    check_names(
        scope,
        "plan",
        network.plans.iter().map(|p| (p.name.as_str(), None)),
        &mut findings,
    );

    check_uids(
        scope,
        "external connect",
        network.external_connects.iter().map(|c| &c.uid),
        &mut findings,
    );
    check_uids(
        scope,
        "change log",
        network.change_log.iter().map(|c| &c.uid),
        &mut findings,
    );

    findings
}

/// Collect structural findings across the networks of one model.
pub(crate) fn model_findings(title: &str, networks: &[Network]) -> Vec<NetworkError> {
    let mut findings = Vec::new();
    if networks.is_empty() {
        findings.push(NetworkError::MissingChildren {
            scope: title.to_string(),
            what: "network",
        });
    }
    check_uids(title, "network", networks.iter().map(|n| &n.uid), &mut findings);
    check_names(
        title,
        "network",
        networks.iter().map(|n| (n.name.as_str(), None)),
        &mut findings,
    );
    findings
}
