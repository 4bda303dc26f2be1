//! Transform, shading and scene hygiene rules.

use nalgebra::Point3;

use crate::error::ProviderResult;
use crate::id::{NodeId, NodeKind};
use crate::params::CheckParams;
use crate::provider::NodeResolver;

pub(super) fn layers(
    node: NodeId,
    resolver: &dyn NodeResolver,
    _params: &CheckParams,
) -> ProviderResult<bool> {
    Ok(resolver.display_layer(node)?.is_some())
}

pub(super) fn history(
    node: NodeId,
    resolver: &dyn NodeResolver,
    params: &CheckParams,
) -> ProviderResult<bool> {
    let Some(shape) = resolver.shape_of(node)? else {
        return Ok(false);
    };
    Ok(resolver.upstream_history_size(shape)? > params.max_history_size)
}

pub(super) fn shaders(
    node: NodeId,
    resolver: &dyn NodeResolver,
    params: &CheckParams,
) -> ProviderResult<bool> {
    let Some(shape) = resolver.shape_of(node)? else {
        return Ok(false);
    };
    Ok(resolver
        .shading_groups(shape)?
        .iter()
        .any(|group| *group != params.default_shading_group))
}

pub(super) fn unfrozen_transforms(
    node: NodeId,
    resolver: &dyn NodeResolver,
    _params: &CheckParams,
) -> ProviderResult<bool> {
    Ok(!resolver.world_transform(node)?.is_identity())
}

pub(super) fn uncentered_pivots(
    node: NodeId,
    resolver: &dyn NodeResolver,
    _params: &CheckParams,
) -> ProviderResult<bool> {
    Ok(resolver.rotate_pivot_world(node)? != Point3::origin())
}

pub(super) fn parent_geometry(
    node: NodeId,
    resolver: &dyn NodeResolver,
    _params: &CheckParams,
) -> ProviderResult<bool> {
    let Some(parent) = resolver.parent(node)? else {
        return Ok(false);
    };
    for sibling in resolver.children(parent)? {
        if resolver.node_kind(sibling)? == NodeKind::Mesh {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(super) fn empty_groups(
    node: NodeId,
    resolver: &dyn NodeResolver,
    _params: &CheckParams,
) -> ProviderResult<bool> {
    if resolver.node_kind(node)? != NodeKind::Transform {
        return Ok(false);
    }
    Ok(resolver.children(node)?.is_empty())
}
