//! UV layout rules.

use std::collections::BTreeSet;

use mesh_types::Uv;

use super::ElementScan;
use crate::error::ProviderResult;
use crate::params::CheckParams;
use crate::provider::MeshHandle;

pub(super) fn missing_uvs(
    mesh: &MeshHandle<'_>,
    _params: &CheckParams,
) -> ProviderResult<ElementScan> {
    ElementScan::filter(mesh.polygon_count(), |face| {
        Ok(!mesh.polygon_has_uvs(face)?)
    })
}

pub(super) fn uv_range(
    mesh: &MeshHandle<'_>,
    params: &CheckParams,
) -> ProviderResult<ElementScan> {
    let uvs = mesh.mesh_all_uvs()?;
    // V is only bounded from below.
    Ok(scan_finite(&uvs, |uv| {
        uv.u < params.uv_u_min || uv.u > params.uv_u_max || uv.v < params.uv_v_min
    }))
}

pub(super) fn on_border(
    mesh: &MeshHandle<'_>,
    params: &CheckParams,
) -> ProviderResult<ElementScan> {
    let uvs = mesh.mesh_all_uvs()?;
    let near_integer = |value: f64| (value - value.round()).abs() < params.border_tolerance;
    Ok(scan_finite(&uvs, |uv| near_integer(uv.u) || near_integer(uv.v)))
}

/// Flag UVs matching `predicate`; non-finite UVs are skipped.
fn scan_finite(uvs: &[Uv], predicate: impl Fn(Uv) -> bool) -> ElementScan {
    let mut scan = ElementScan::default();
    for (id, &uv) in uvs.iter().enumerate() {
        if !uv.is_finite() {
            scan.skipped.push((id, format!("uv {id} is not finite, skipped")));
        } else if predicate(uv) {
            scan.flagged.push(id);
        }
    }
    scan
}

pub(super) fn cross_border(
    mesh: &MeshHandle<'_>,
    _params: &CheckParams,
) -> ProviderResult<ElementScan> {
    let mut scan = ElementScan::default();
    for face in 0..mesh.polygon_count() {
        if !mesh.polygon_has_uvs(face)? {
            let reason = format!("polygon {face} has no uvs, skipped");
            scan.skipped.push((face, reason));
            continue;
        }
        let coords = mesh.polygon_uv_coords(face)?;
        if !coords.iter().all(|uv| uv.is_finite()) {
            let reason = format!("polygon {face} has non-finite uvs, skipped");
            scan.skipped.push((face, reason));
        } else if spans_tiles(&coords) {
            scan.flagged.push(face);
        }
    }
    Ok(scan)
}

/// Whether the coordinates fall in more than one tile along U or along V.
fn spans_tiles(coords: &[Uv]) -> bool {
    let mut u_tiles = BTreeSet::new();
    let mut v_tiles = BTreeSet::new();
    for uv in coords {
        let (u, v) = uv.tile();
        u_tiles.insert(u);
        v_tiles.insert(v);
    }
    u_tiles.len() > 1 || v_tiles.len() > 1
}

pub(super) fn self_penetrating_uvs(
    mesh: &MeshHandle<'_>,
    _params: &CheckParams,
) -> ProviderResult<ElementScan> {
    let mut flagged = mesh.mesh_overlapping_faces()?;
    flagged.sort_unstable();
    flagged.dedup();
    Ok(ElementScan {
        flagged,
        skipped: Vec::new(),
    })
}
