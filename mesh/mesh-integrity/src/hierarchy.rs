//! Candidate expansion over the node hierarchy.

use hashbrown::HashSet;
use tracing::debug;

use crate::error::ProviderResult;
use crate::id::{NodeId, NodeKind};
use crate::provider::NodeResolver;

/// Every transform at or below the given roots, depth first.
///
/// Roots are visited in the order given and children in the order the
/// resolver lists them. A node reachable from several roots appears once, at
/// its first visit. Shapes and other non-transform nodes are left out.
///
/// # Errors
///
/// Fails if any visited node cannot be resolved.
///
/// # Example
///
/// ```
/// use mesh_integrity::{expand_hierarchy, InMemoryScene};
/// use mesh_types::PolyMesh;
///
/// let mut scene = InMemoryScene::new();
/// let root = scene.add_transform("root", None);
/// let (body, _) = scene.add_mesh_object("body", Some(root), PolyMesh::unit_quad());
///
/// assert_eq!(expand_hierarchy(&[root], &scene).unwrap(), vec![root, body]);
/// ```
pub fn expand_hierarchy(
    roots: &[NodeId],
    resolver: &dyn NodeResolver,
) -> ProviderResult<Vec<NodeId>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = roots.iter().rev().copied().collect();

    while let Some(node) = stack.pop() {
        if !seen.insert(node) {
            continue;
        }
        if resolver.node_kind(node)? == NodeKind::Transform {
            out.push(node);
        }
        let children = resolver.children(node)?;
        stack.extend(children.into_iter().rev());
    }

    debug!(roots = roots.len(), expanded = out.len(), "Expanded hierarchy");
    Ok(out)
}
