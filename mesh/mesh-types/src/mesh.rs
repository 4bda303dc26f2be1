//! Indexed polygon mesh.

use std::collections::BTreeSet;

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MeshError, MeshResult};
use crate::uv::Uv;

/// One polygon face.
///
/// Vertex indices are stored in winding order. When the face is mapped,
/// `uvs` holds one UV index per face-vertex, in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polygon {
    /// Vertex indices in winding order.
    pub vertices: Vec<u32>,

    /// UV indices, one per face-vertex. `None` for an unmapped face.
    pub uvs: Option<Vec<u32>>,
}

impl Polygon {
    /// Create an unmapped polygon from vertex indices.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::Polygon;
    ///
    /// let tri = Polygon::new([0, 1, 2]);
    /// assert_eq!(tri.len(), 3);
    /// assert!(!tri.has_uvs());
    /// ```
    #[must_use]
    pub fn new(vertices: impl Into<Vec<u32>>) -> Self {
        Self {
            vertices: vertices.into(),
            uvs: None,
        }
    }

    /// Attach UV indices to this polygon.
    #[must_use]
    pub fn with_uvs(mut self, uvs: impl Into<Vec<u32>>) -> Self {
        self.uvs = Some(uvs.into());
        self
    }

    /// Number of face-vertices (equal to the number of boundary edges).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Check whether the polygon has no vertices.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Check whether the polygon carries a non-empty UV mapping.
    #[inline]
    #[must_use]
    pub fn has_uvs(&self) -> bool {
        self.uvs.as_ref().is_some_and(|uvs| !uvs.is_empty())
    }

    /// Iterate over boundary edges as `(from, to)` vertex pairs in winding order.
    ///
    /// The last edge closes the loop back to the first vertex.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

/// An indexed polygon mesh with optional UVs and per-edge hardness.
///
/// # Memory Layout
///
/// - `positions`: vertex positions
/// - `faces`: polygons referencing `positions` (and `uvs` when mapped)
/// - `uvs`: shared UV table, indexed by UV id
///
/// Edges default to smooth. Hard edges are stored by their endpoints so that
/// the flag survives edge renumbering.
///
/// # Example
///
/// ```
/// use mesh_types::{PolyMesh, Polygon, Point3};
///
/// let mut mesh = PolyMesh::new();
/// mesh.positions.push(Point3::new(0.0, 0.0, 0.0));
/// mesh.positions.push(Point3::new(1.0, 0.0, 0.0));
/// mesh.positions.push(Point3::new(0.0, 1.0, 0.0));
/// mesh.faces.push(Polygon::new([0, 1, 2]));
///
/// assert_eq!(mesh.face_count(), 1);
/// assert!(mesh.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolyMesh {
    /// Vertex positions.
    pub positions: Vec<Point3<f64>>,

    /// Polygon faces.
    pub faces: Vec<Polygon>,

    /// UV coordinates, indexed by UV id.
    pub uvs: Vec<Uv>,

    hard_edges: BTreeSet<(u32, u32)>,
}

impl PolyMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            positions: Vec::new(),
            faces: Vec::new(),
            uvs: Vec::new(),
            hard_edges: BTreeSet::new(),
        }
    }

    /// Create a mesh from positions and faces, without UVs.
    #[must_use]
    pub fn from_parts(positions: Vec<Point3<f64>>, faces: Vec<Polygon>) -> Self {
        Self {
            positions,
            faces,
            ..Self::new()
        }
    }

    /// Replace the UV table.
    #[must_use]
    pub fn with_uvs(mut self, uvs: Vec<Uv>) -> Self {
        self.uvs = uvs;
        self
    }

    /// A single quad in the XY plane spanning `(0,0)-(1,1)`, mapped to the
    /// unit UV square.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::PolyMesh;
    ///
    /// let quad = PolyMesh::unit_quad();
    /// assert_eq!(quad.face_count(), 1);
    /// assert_eq!(quad.uvs.len(), 4);
    /// ```
    #[must_use]
    pub fn unit_quad() -> Self {
        Self::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![Polygon::new([0, 1, 2, 3]).with_uvs([0, 1, 2, 3])],
        )
        .with_uvs(vec![
            Uv::new(0.0, 0.0),
            Uv::new(1.0, 0.0),
            Uv::new(1.0, 1.0),
            Uv::new(0.0, 1.0),
        ])
    }

    /// A closed unit cube made of six outward-facing quads, without UVs.
    #[must_use]
    pub fn unit_cube() -> Self {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let faces = vec![
            Polygon::new([0, 3, 2, 1]), // bottom
            Polygon::new([4, 5, 6, 7]), // top
            Polygon::new([0, 1, 5, 4]), // front
            Polygon::new([2, 3, 7, 6]), // back
            Polygon::new([0, 4, 7, 3]), // left
            Polygon::new([1, 2, 6, 5]), // right
        ];
        Self::from_parts(positions, faces)
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of faces.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh has no faces.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Mark the edge between two vertices as hard.
    pub fn set_edge_hard(&mut self, v0: u32, v1: u32) {
        self.hard_edges.insert(normalize_edge(v0, v1));
    }

    /// Mark the edge between two vertices as smooth.
    pub fn set_edge_smooth(&mut self, v0: u32, v1: u32) {
        self.hard_edges.remove(&normalize_edge(v0, v1));
    }

    /// Check whether the edge between two vertices is hard.
    #[must_use]
    pub fn is_edge_hard(&self, v0: u32, v1: u32) -> bool {
        self.hard_edges.contains(&normalize_edge(v0, v1))
    }

    /// Resolve a face's vertex positions.
    ///
    /// Returns `None` if the face or any referenced vertex does not exist.
    #[must_use]
    pub fn polygon_positions(&self, face: usize) -> Option<Vec<Point3<f64>>> {
        self.faces
            .get(face)?
            .vertices
            .iter()
            .map(|&v| self.positions.get(v as usize).copied())
            .collect()
    }

    /// Resolve a face's UV coordinates.
    ///
    /// Returns `None` if the face does not exist, is unmapped, or references
    /// a missing UV.
    #[must_use]
    pub fn polygon_uvs(&self, face: usize) -> Option<Vec<Uv>> {
        let polygon = self.faces.get(face)?;
        if !polygon.has_uvs() {
            return None;
        }
        polygon
            .uvs
            .as_ref()?
            .iter()
            .map(|&uv| self.uvs.get(uv as usize).copied())
            .collect()
    }

    /// Check every face for valid references.
    ///
    /// # Errors
    ///
    /// Returns the first structural problem found: a face with fewer than three
    /// vertices, an out-of-range vertex or UV index, or a UV list whose length
    /// differs from the vertex list.
    pub fn validate(&self) -> MeshResult<()> {
        for (face, polygon) in self.faces.iter().enumerate() {
            if polygon.len() < 3 {
                return Err(MeshError::DegenerateFace {
                    face,
                    vertices: polygon.len(),
                });
            }

            if let Some(&index) = polygon
                .vertices
                .iter()
                .find(|&&v| v as usize >= self.positions.len())
            {
                return Err(MeshError::InvalidVertexIndex {
                    face,
                    index,
                    vertex_count: self.positions.len(),
                });
            }

            let Some(uvs) = polygon.uvs.as_ref() else {
                continue;
            };
            if uvs.is_empty() {
                continue;
            }
            if uvs.len() != polygon.len() {
                return Err(MeshError::UvCountMismatch {
                    face,
                    vertices: polygon.len(),
                    uvs: uvs.len(),
                });
            }
            if let Some(&index) = uvs.iter().find(|&&uv| uv as usize >= self.uvs.len()) {
                return Err(MeshError::InvalidUvIndex {
                    face,
                    index,
                    uv_count: self.uvs.len(),
                });
            }
        }

        Ok(())
    }
}

/// Normalize edge direction so v0 <= v1.
#[inline]
pub(crate) fn normalize_edge(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 { (v0, v1) } else { (v1, v0) }
}
