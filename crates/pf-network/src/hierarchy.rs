//! Parent/child structure of the networks in one model.
//!
//! Parent pointers are names and may be wrong in source documents, so every
//! walk keeps a visited set and stops at the first repeat.

use std::collections::HashSet;

use crate::error::{NetworkError, NetworkResult};
use crate::model::{Model, Network};

/// Resolve a network's parent, `None` for a root.
pub fn parent<'m>(model: &'m Model, network: &Network) -> NetworkResult<Option<&'m Network>> {
    let Some(parent_name) = network.parent_name() else {
        return Ok(None);
    };
    let mut matches = model.networks().iter().filter(|n| n.name() == parent_name);
    match (matches.next(), matches.next()) {
        (Some(found), None) => Ok(Some(found)),
        (None, _) => Err(NetworkError::unresolved(
            format!("parent of network '{}'", network.name()),
            parent_name,
            0,
        )),
        (Some(_), Some(_)) => Err(NetworkError::unresolved(
            format!("parent of network '{}'", network.name()),
            parent_name,
            2 + matches.count(),
        )),
    }
}

/// The chain from `network` (inclusive) up to its root, nearest first.
///
/// Terminates in O(depth): a repeated name means a cycle.
pub fn lineage<'m>(model: &'m Model, network: &'m Network) -> NetworkResult<Vec<&'m Network>> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut chain: Vec<&'m Network> = Vec::new();
    let mut current = Some(network);

    while let Some(net) = current {
        if !visited.insert(net.name()) {
            let mut names: Vec<String> = chain.iter().map(|n| n.name().to_string()).collect();
            names.push(net.name().to_string());
            return Err(NetworkError::CyclicNetworkHierarchy { chain: names });
        }
        chain.push(net);
        current = parent(model, net)?;
    }

    Ok(chain)
}

/// Check that every network's parent chain ends at a root.
pub fn validate_hierarchy(model: &Model) -> NetworkResult<()> {
    for network in model.networks() {
        lineage(model, network)?;
    }
    Ok(())
}

/// The single network without a parent.
pub fn root(model: &Model) -> NetworkResult<&Network> {
    validate_hierarchy(model)?;

    let roots: Vec<&Network> = model
        .networks()
        .iter()
        .filter(|n| n.parent_name().is_none())
        .collect();
    match roots.as_slice() {
        [root] => Ok(*root),
        [] => Err(NetworkError::NoRootNetwork),
        many => Err(NetworkError::MultipleRootNetworks {
            roots: many.iter().map(|n| n.name().to_string()).collect(),
        }),
    }
}

/// Networks whose parent is `name`, in document order.
pub fn children<'m>(model: &'m Model, name: &str) -> Vec<&'m Network> {
    model
        .networks()
        .iter()
        .filter(|n| n.parent_name() == Some(name))
        .collect()
}

/// Number of ancestors above `network` (0 for the root).
pub fn depth(model: &Model, network: &Network) -> NetworkResult<usize> {
    Ok(lineage(model, network)?.len() - 1)
}
