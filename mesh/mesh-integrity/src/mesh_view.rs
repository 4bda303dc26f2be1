//! [`MeshTopologyProvider`] over a [`PolyMesh`].

use mesh_types::{MeshAdjacency, PolyMesh, Uv, polygon};
use nalgebra::Point3;

use crate::error::{ProviderError, ProviderResult};
use crate::id::ElementKind;
use crate::provider::MeshTopologyProvider;

/// Read-only topology view of a [`PolyMesh`].
///
/// Adjacency is built once when the view is created; the mesh is borrowed for
/// the lifetime of the view, so indices cannot change underneath it.
///
/// # Example
///
/// ```
/// use mesh_integrity::{MeshTopologyProvider, PolyMeshView};
/// use mesh_types::PolyMesh;
///
/// let quad = PolyMesh::unit_quad();
/// let view = PolyMeshView::new(&quad);
///
/// assert_eq!(view.edge_count(), 4);
/// assert_eq!(view.edge_connected_face_count(0).unwrap(), 1);
/// ```
#[derive(Debug)]
pub struct PolyMeshView<'a> {
    mesh: &'a PolyMesh,
    adjacency: MeshAdjacency,
}

impl<'a> PolyMeshView<'a> {
    /// Build a view over a mesh.
    #[must_use]
    pub fn new(mesh: &'a PolyMesh) -> Self {
        Self {
            mesh,
            adjacency: MeshAdjacency::build(&mesh.faces),
        }
    }

    /// The mesh being viewed.
    #[must_use]
    pub fn mesh(&self) -> &'a PolyMesh {
        self.mesh
    }

    /// Edge numbering and connectivity.
    #[must_use]
    pub fn adjacency(&self) -> &MeshAdjacency {
        &self.adjacency
    }

    fn check_face(&self, face: usize) -> ProviderResult<()> {
        check_index(ElementKind::Polygon, face, self.mesh.face_count())
    }

    fn check_edge(&self, edge: usize) -> ProviderResult<()> {
        check_index(ElementKind::Edge, edge, self.adjacency.edge_count())
    }

    fn positions(&self, face: usize) -> ProviderResult<Vec<Point3<f64>>> {
        self.check_face(face)?;
        self.mesh
            .polygon_positions(face)
            .ok_or_else(|| self.invalid_face(face))
    }

    fn position(&self, vertex: u32) -> ProviderResult<&Point3<f64>> {
        let index = vertex as usize;
        self.mesh
            .positions
            .get(index)
            .ok_or(ProviderError::IndexOutOfRange {
                kind: ElementKind::Vertex,
                index,
                count: self.mesh.vertex_count(),
            })
    }

    fn invalid_face(&self, face: usize) -> ProviderError {
        match self.mesh.validate() {
            Err(err) => ProviderError::InvalidMesh(err),
            Ok(()) => ProviderError::Host(format!("polygon {face} could not be read")),
        }
    }
}

fn check_index(kind: ElementKind, index: usize, count: usize) -> ProviderResult<()> {
    if index < count {
        Ok(())
    } else {
        Err(ProviderError::IndexOutOfRange { kind, index, count })
    }
}

impl MeshTopologyProvider for PolyMeshView<'_> {
    fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    fn edge_count(&self) -> usize {
        self.adjacency.edge_count()
    }

    fn polygon_count(&self) -> usize {
        self.mesh.face_count()
    }

    fn polygon_edge_count(&self, face: usize) -> ProviderResult<usize> {
        self.check_face(face)?;
        Ok(self.adjacency.edges_for_face(face).len())
    }

    fn polygon_is_lamina(&self, face: usize) -> ProviderResult<bool> {
        self.check_face(face)?;
        Ok(self.adjacency.is_lamina(face))
    }

    fn polygon_area(&self, face: usize) -> ProviderResult<f64> {
        Ok(polygon::polygon_area(&self.positions(face)?))
    }

    fn polygon_is_starlike(&self, face: usize) -> ProviderResult<bool> {
        Ok(polygon::is_starlike(&self.positions(face)?))
    }

    fn polygon_has_uvs(&self, face: usize) -> ProviderResult<bool> {
        self.check_face(face)?;
        Ok(self.mesh.faces[face].has_uvs())
    }

    fn polygon_uv_coords(&self, face: usize) -> ProviderResult<Vec<Uv>> {
        if !self.polygon_has_uvs(face)? {
            return Err(ProviderError::NoUvs { face });
        }
        self.mesh
            .polygon_uvs(face)
            .ok_or_else(|| self.invalid_face(face))
    }

    fn edge_is_smooth(&self, edge: usize) -> ProviderResult<bool> {
        self.check_edge(edge)?;
        Ok(self
            .adjacency
            .edge(edge)
            .is_none_or(|(v0, v1)| !self.mesh.is_edge_hard(v0, v1)))
    }

    fn edge_on_boundary(&self, edge: usize) -> ProviderResult<bool> {
        self.check_edge(edge)?;
        Ok(self.adjacency.faces_for_edge(edge).len() < 2)
    }

    fn edge_length(&self, edge: usize) -> ProviderResult<f64> {
        self.check_edge(edge)?;
        let (v0, v1) = self
            .adjacency
            .edge(edge)
            .ok_or_else(|| ProviderError::Host(format!("edge {edge} has no vertices")))?;
        let a = self.position(v0)?;
        let b = self.position(v1)?;
        Ok(nalgebra::distance(a, b))
    }

    fn edge_connected_face_count(&self, edge: usize) -> ProviderResult<usize> {
        self.check_edge(edge)?;
        Ok(self.adjacency.faces_for_edge(edge).len())
    }

    fn vertex_connected_edge_count(&self, vertex: usize) -> ProviderResult<usize> {
        check_index(ElementKind::Vertex, vertex, self.mesh.vertex_count())?;
        let id = u32::try_from(vertex).map_err(|_| ProviderError::IndexOutOfRange {
            kind: ElementKind::Vertex,
            index: vertex,
            count: self.mesh.vertex_count(),
        })?;
        Ok(self.adjacency.edges_for_vertex(id).len())
    }

    fn mesh_all_uvs(&self) -> ProviderResult<Vec<Uv>> {
        Ok(self.mesh.uvs.clone())
    }

    fn mesh_overlapping_faces(&self) -> ProviderResult<Vec<usize>> {
        Ok(mesh_types::overlapping_faces(self.mesh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::Polygon;

    #[test]
    fn quad_queries() {
        let quad = PolyMesh::unit_quad();
        let view = PolyMeshView::new(&quad);

        assert_eq!(view.vertex_count(), 4);
        assert_eq!(view.polygon_count(), 1);
        assert_eq!(view.polygon_edge_count(0).unwrap(), 4);
        assert_relative_eq!(view.polygon_area(0).unwrap(), 1.0, epsilon = 1e-12);
        assert!(view.polygon_is_starlike(0).unwrap());
        assert!(!view.polygon_is_lamina(0).unwrap());
        assert_eq!(view.polygon_uv_coords(0).unwrap().len(), 4);
        assert_eq!(view.vertex_connected_edge_count(2).unwrap(), 2);
        for edge in 0..4 {
            assert!(view.edge_on_boundary(edge).unwrap());
            assert!(view.edge_is_smooth(edge).unwrap());
            assert_relative_eq!(view.edge_length(edge).unwrap(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn cube_edges_are_interior() {
        let cube = PolyMesh::unit_cube();
        let view = PolyMeshView::new(&cube);

        assert_eq!(view.edge_count(), 12);
        for edge in 0..view.edge_count() {
            assert_eq!(view.edge_connected_face_count(edge).unwrap(), 2);
            assert!(!view.edge_on_boundary(edge).unwrap());
        }
        for vertex in 0..view.vertex_count() {
            assert_eq!(view.vertex_connected_edge_count(vertex).unwrap(), 3);
        }
    }

    #[test]
    fn hard_flag_is_reported() {
        let mut cube = PolyMesh::unit_cube();
        cube.set_edge_hard(2, 6);
        let view = PolyMeshView::new(&cube);
        let edge = view.adjacency().edge_id(6, 2).unwrap();
        assert!(!view.edge_is_smooth(edge).unwrap());
    }

    #[test]
    fn out_of_range_indices_are_errors() {
        let quad = PolyMesh::unit_quad();
        let view = PolyMeshView::new(&quad);

        assert_eq!(
            view.polygon_area(1),
            Err(ProviderError::IndexOutOfRange {
                kind: ElementKind::Polygon,
                index: 1,
                count: 1,
            })
        );
        assert!(view.edge_length(4).is_err());
        assert!(view.vertex_connected_edge_count(9).is_err());
    }

    #[test]
    fn unmapped_face_has_no_uv_coords() {
        let mesh = PolyMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![Polygon::new(vec![0, 1, 2])],
        );
        let view = PolyMeshView::new(&mesh);

        assert!(!view.polygon_has_uvs(0).unwrap());
        assert_eq!(view.polygon_uv_coords(0), Err(ProviderError::NoUvs { face: 0 }));
        assert!(view.mesh_all_uvs().unwrap().is_empty());
    }

    #[test]
    fn dangling_vertex_index_is_invalid_mesh() {
        let mesh = PolyMesh::from_parts(
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)],
            vec![Polygon::new(vec![0, 1, 7])],
        );
        let view = PolyMeshView::new(&mesh);
        assert!(matches!(
            view.polygon_area(0),
            Err(ProviderError::InvalidMesh(_))
        ));
    }
}
