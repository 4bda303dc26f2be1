//! Naming convention rules.

use hashbrown::HashMap;

use super::GroupScan;
use crate::error::ProviderResult;
use crate::id::{NodeId, NodeKind};
use crate::params::CheckParams;
use crate::provider::NodeResolver;

/// Text after the last `|` of a node path.
pub(crate) fn leaf_name(name: &str) -> &str {
    name.rsplit('|').next().unwrap_or(name)
}

pub(super) fn trailing_numbers(
    node: NodeId,
    resolver: &dyn NodeResolver,
    _params: &CheckParams,
) -> ProviderResult<bool> {
    let name = resolver.resolve_name(node)?;
    Ok(leaf_name(&name)
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_digit()))
}

pub(super) fn duplicated_names(
    nodes: &[NodeId],
    resolver: &dyn NodeResolver,
    _params: &CheckParams,
) -> GroupScan {
    let mut scan = GroupScan::default();
    let mut by_leaf: HashMap<String, Vec<NodeId>> = HashMap::new();

    for &node in nodes {
        match resolver.resolve_name(node) {
            Ok(name) => by_leaf
                .entry(leaf_name(&name).to_owned())
                .or_default()
                .push(node),
            Err(err) => scan.failures.push((node, err)),
        }
    }

    for group in by_leaf.into_values() {
        if group.len() > 1 {
            scan.flagged.extend(group);
        }
    }
    scan
}

pub(super) fn namespaces(
    node: NodeId,
    resolver: &dyn NodeResolver,
    _params: &CheckParams,
) -> ProviderResult<bool> {
    Ok(resolver.resolve_name(node)?.contains(':'))
}

pub(super) fn shape_names(
    node: NodeId,
    resolver: &dyn NodeResolver,
    _params: &CheckParams,
) -> ProviderResult<bool> {
    let mut shapes = Vec::new();
    for child in resolver.children(node)? {
        if resolver.node_kind(child)? == NodeKind::Mesh {
            shapes.push(child);
        }
    }

    let [shape] = shapes.as_slice() else {
        return Ok(false);
    };

    let name = resolver.resolve_name(node)?;
    let shape_name = resolver.resolve_name(*shape)?;
    let expected = format!("{}Shape", leaf_name(&name));
    Ok(leaf_name(&shape_name) != expected)
}
