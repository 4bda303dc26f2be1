//! Topology and geometry rules.

use super::ElementScan;
use crate::error::ProviderResult;
use crate::params::CheckParams;
use crate::provider::MeshHandle;

pub(super) fn triangles(
    mesh: &MeshHandle<'_>,
    _params: &CheckParams,
) -> ProviderResult<ElementScan> {
    ElementScan::filter(mesh.polygon_count(), |face| {
        Ok(mesh.polygon_edge_count(face)? == 3)
    })
}

pub(super) fn ngons(
    mesh: &MeshHandle<'_>,
    _params: &CheckParams,
) -> ProviderResult<ElementScan> {
    ElementScan::filter(mesh.polygon_count(), |face| {
        Ok(mesh.polygon_edge_count(face)? > 4)
    })
}

pub(super) fn hard_edges(
    mesh: &MeshHandle<'_>,
    _params: &CheckParams,
) -> ProviderResult<ElementScan> {
    ElementScan::filter(mesh.edge_count(), |edge| {
        Ok(!mesh.edge_is_smooth(edge)? && !mesh.edge_on_boundary(edge)?)
    })
}

pub(super) fn lamina(
    mesh: &MeshHandle<'_>,
    _params: &CheckParams,
) -> ProviderResult<ElementScan> {
    ElementScan::filter(mesh.polygon_count(), |face| mesh.polygon_is_lamina(face))
}

pub(super) fn zero_area_faces(
    mesh: &MeshHandle<'_>,
    params: &CheckParams,
) -> ProviderResult<ElementScan> {
    ElementScan::filter(mesh.polygon_count(), |face| {
        Ok(mesh.polygon_area(face)? <= params.zero_area_threshold)
    })
}

pub(super) fn zero_length_edges(
    mesh: &MeshHandle<'_>,
    params: &CheckParams,
) -> ProviderResult<ElementScan> {
    ElementScan::filter(mesh.edge_count(), |edge| {
        Ok(mesh.edge_length(edge)? <= params.zero_length_threshold)
    })
}

pub(super) fn non_manifold_edges(
    mesh: &MeshHandle<'_>,
    _params: &CheckParams,
) -> ProviderResult<ElementScan> {
    ElementScan::filter(mesh.edge_count(), |edge| {
        Ok(mesh.edge_connected_face_count(edge)? > 2)
    })
}

pub(super) fn open_edges(
    mesh: &MeshHandle<'_>,
    _params: &CheckParams,
) -> ProviderResult<ElementScan> {
    ElementScan::filter(mesh.edge_count(), |edge| {
        Ok(mesh.edge_connected_face_count(edge)? < 2)
    })
}

pub(super) fn poles(
    mesh: &MeshHandle<'_>,
    params: &CheckParams,
) -> ProviderResult<ElementScan> {
    ElementScan::filter(mesh.vertex_count(), |vertex| {
        Ok(mesh.vertex_connected_edge_count(vertex)? > params.max_pole_valence)
    })
}

pub(super) fn starlike(
    mesh: &MeshHandle<'_>,
    _params: &CheckParams,
) -> ProviderResult<ElementScan> {
    ElementScan::filter(mesh.polygon_count(), |face| {
        Ok(!mesh.polygon_is_starlike(face)?)
    })
}
