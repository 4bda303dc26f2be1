//! Polygon mesh adjacency.
//!
//! Numbers the unique undirected edges of a mesh and provides lookups for
//! edge-to-face, face-to-edge and vertex-to-edge relationships.

use hashbrown::HashMap;

use crate::mesh::{Polygon, normalize_edge};

/// Adjacency information for a polygon mesh.
///
/// Provides efficient lookups for:
/// - Faces adjacent to an edge
/// - Edges bounding a face
/// - Edges incident to a vertex
/// - Boundary edges (edges with only one adjacent face)
/// - Non-manifold edges (edges with more than two adjacent faces)
#[derive(Debug, Clone, Default)]
pub struct MeshAdjacency {
    /// Edge endpoints by edge id. v0 <= v1.
    edges: Vec<(u32, u32)>,
    /// Maps normalized endpoints to edge id.
    edge_ids: HashMap<(u32, u32), usize>,
    /// Distinct faces bordering each edge, by edge id.
    edge_faces: Vec<Vec<usize>>,
    /// Edge ids of each face, in winding order.
    face_edges: Vec<Vec<usize>>,
    /// Edge ids incident to each vertex.
    vertex_edges: HashMap<u32, Vec<usize>>,
}

impl MeshAdjacency {
    /// Build adjacency information from a list of polygons.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{MeshAdjacency, Polygon};
    ///
    /// let faces = vec![Polygon::new([0, 1, 2]), Polygon::new([1, 3, 2])];
    /// let adj = MeshAdjacency::build(&faces);
    ///
    /// assert_eq!(adj.edge_count(), 5);
    /// assert_eq!(adj.boundary_edge_count(), 4);
    /// ```
    #[must_use]
    pub fn build(faces: &[Polygon]) -> Self {
        let mut adjacency = Self {
            face_edges: Vec::with_capacity(faces.len()),
            ..Self::default()
        };

        for (face_idx, face) in faces.iter().enumerate() {
            let mut boundary = Vec::with_capacity(face.len());

            for (v0, v1) in face.edges() {
                let key = normalize_edge(v0, v1);
                let edge = match adjacency.edge_ids.get(&key) {
                    Some(&edge) => edge,
                    None => adjacency.insert_edge(key),
                };

                let bordering = &mut adjacency.edge_faces[edge];
                if !bordering.contains(&face_idx) {
                    bordering.push(face_idx);
                }
                boundary.push(edge);
            }

            adjacency.face_edges.push(boundary);
        }

        adjacency
    }

    fn insert_edge(&mut self, key: (u32, u32)) -> usize {
        let edge = self.edges.len();
        self.edges.push(key);
        self.edge_ids.insert(key, edge);
        self.edge_faces.push(Vec::new());

        self.vertex_edges.entry(key.0).or_default().push(edge);
        if key.1 != key.0 {
            self.vertex_edges.entry(key.1).or_default().push(edge);
        }

        edge
    }

    /// Get the endpoints of an edge, lower vertex index first.
    #[must_use]
    pub fn edge(&self, edge: usize) -> Option<(u32, u32)> {
        self.edges.get(edge).copied()
    }

    /// Look up the id of the edge between two vertices.
    ///
    /// Returns `None` if the edge doesn't exist in the mesh.
    #[must_use]
    pub fn edge_id(&self, v0: u32, v1: u32) -> Option<usize> {
        self.edge_ids.get(&normalize_edge(v0, v1)).copied()
    }

    /// Get faces adjacent to an edge.
    ///
    /// Returns an empty slice if the edge doesn't exist.
    #[must_use]
    pub fn faces_for_edge(&self, edge: usize) -> &[usize] {
        self.edge_faces.get(edge).map_or(&[], Vec::as_slice)
    }

    /// Get the edges bounding a face, in winding order.
    ///
    /// Returns an empty slice if the face doesn't exist.
    #[must_use]
    pub fn edges_for_face(&self, face: usize) -> &[usize] {
        self.face_edges.get(face).map_or(&[], Vec::as_slice)
    }

    /// Get edges incident to a vertex.
    ///
    /// Returns an empty slice if the vertex is not used by any face.
    #[must_use]
    pub fn edges_for_vertex(&self, vertex: u32) -> &[usize] {
        self.vertex_edges.get(&vertex).map_or(&[], Vec::as_slice)
    }

    /// Check whether every edge of `face` is also bordered by one other,
    /// common face.
    ///
    /// This is the lamina condition: two faces stacked on the same boundary.
    #[must_use]
    pub fn is_lamina(&self, face: usize) -> bool {
        let edges = self.edges_for_face(face);
        let Some((&first, rest)) = edges.split_first() else {
            return false;
        };

        let mut shared: Vec<usize> = self
            .faces_for_edge(first)
            .iter()
            .copied()
            .filter(|&other| other != face)
            .collect();

        for &edge in rest {
            let faces = self.faces_for_edge(edge);
            shared.retain(|other| faces.contains(other));
            if shared.is_empty() {
                return false;
            }
        }

        !shared.is_empty()
    }

    /// Iterate over all boundary edge ids (edges with exactly one adjacent face).
    pub fn boundary_edges(&self) -> impl Iterator<Item = usize> + '_ {
        self.edge_faces
            .iter()
            .enumerate()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(edge, _)| edge)
    }

    /// Count the number of boundary edges.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.boundary_edges().count()
    }

    /// Iterate over all non-manifold edge ids (edges with more than two adjacent faces).
    pub fn non_manifold_edges(&self) -> impl Iterator<Item = usize> + '_ {
        self.edge_faces
            .iter()
            .enumerate()
            .filter(|(_, faces)| faces.len() > 2)
            .map(|(edge, _)| edge)
    }

    /// Count the number of non-manifold edges.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.non_manifold_edges().count()
    }

    /// Check if the mesh is manifold (all edges have at most 2 adjacent faces).
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.edge_faces.iter().all(|faces| faces.len() <= 2)
    }

    /// Check if the mesh is watertight (no boundary edges).
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.edge_faces.iter().all(|faces| faces.len() >= 2)
    }

    /// Get the total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of vertices used by at least one edge.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_edges.len()
    }
}
