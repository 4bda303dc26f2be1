//! Contracts with the host application.
//!
//! The checker never owns scene or mesh storage. A host (a DCC plugin, a
//! standalone mesh library, a test double) implements [`NodeResolver`] for
//! node-level facts and hands out [`MeshTopologyProvider`]s for element-level
//! queries. Every query is a pure read and must not change element indexing
//! for the remainder of a run.

use std::ops::Deref;

use mesh_types::Uv;
use nalgebra::{Point3, Vector3};

use crate::error::ProviderResult;
use crate::id::{NodeId, NodeKind};

/// Read-only topology and geometry queries over one mesh.
///
/// Indices are 0-based and valid in `0..vertex_count()`, `0..edge_count()`
/// and `0..polygon_count()` respectively. Out-of-range indices are reported
/// as [`ProviderError::IndexOutOfRange`](crate::ProviderError::IndexOutOfRange).
pub trait MeshTopologyProvider {
    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Number of edges.
    fn edge_count(&self) -> usize;

    /// Number of polygons.
    fn polygon_count(&self) -> usize;

    /// Number of edges bounding a polygon.
    fn polygon_edge_count(&self, face: usize) -> ProviderResult<usize>;

    /// Whether every edge of the polygon is shared with one other, common polygon.
    fn polygon_is_lamina(&self, face: usize) -> ProviderResult<bool>;

    /// Polygon area in world units.
    fn polygon_area(&self, face: usize) -> ProviderResult<f64>;

    /// Whether some interior point of the polygon sees all of its vertices.
    fn polygon_is_starlike(&self, face: usize) -> ProviderResult<bool>;

    /// Whether the polygon is UV mapped.
    fn polygon_has_uvs(&self, face: usize) -> ProviderResult<bool>;

    /// UV coordinates of the polygon's face-vertices.
    ///
    /// Fails with [`ProviderError::NoUvs`](crate::ProviderError::NoUvs) when
    /// [`polygon_has_uvs`](Self::polygon_has_uvs) is false.
    fn polygon_uv_coords(&self, face: usize) -> ProviderResult<Vec<Uv>>;

    /// Whether the edge is shaded smooth.
    fn edge_is_smooth(&self, edge: usize) -> ProviderResult<bool>;

    /// Whether the edge lies on a mesh border.
    fn edge_on_boundary(&self, edge: usize) -> ProviderResult<bool>;

    /// Edge length in world units.
    fn edge_length(&self, edge: usize) -> ProviderResult<f64>;

    /// Number of polygons bordering the edge.
    fn edge_connected_face_count(&self, edge: usize) -> ProviderResult<usize>;

    /// Number of edges incident to the vertex.
    fn vertex_connected_edge_count(&self, vertex: usize) -> ProviderResult<usize>;

    /// Every UV coordinate of the mesh, indexed by UV id.
    fn mesh_all_uvs(&self) -> ProviderResult<Vec<Uv>>;

    /// Polygons whose UVs overlap other polygons' UVs.
    fn mesh_overlapping_faces(&self) -> ProviderResult<Vec<usize>>;
}

/// World-space transform of a node, rotation as Euler angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    /// World translation.
    pub translate: Vector3<f64>,
    /// World rotation, XYZ Euler angles in degrees.
    pub rotate: Vector3<f64>,
    /// World scale.
    pub scale: Vector3<f64>,
}

impl WorldTransform {
    /// The identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            translate: Vector3::zeros(),
            rotate: Vector3::zeros(),
            scale: Vector3::repeat(1.0),
        }
    }

    /// Whether the transform is exactly the identity.
    ///
    /// Comparison is exact, with no tolerance.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Node-level facts about the scene.
pub trait NodeResolver {
    /// Current name of the node; may be a `|`-separated path.
    fn resolve_name(&self, node: NodeId) -> ProviderResult<String>;

    /// Type of the node.
    fn node_kind(&self, node: NodeId) -> ProviderResult<NodeKind>;

    /// World-space transform of the node.
    fn world_transform(&self, node: NodeId) -> ProviderResult<WorldTransform>;

    /// World-space position of the node's rotate pivot.
    fn rotate_pivot_world(&self, node: NodeId) -> ProviderResult<Point3<f64>>;

    /// Parent of the node, `None` at the scene root.
    fn parent(&self, node: NodeId) -> ProviderResult<Option<NodeId>>;

    /// Direct children of the node.
    fn children(&self, node: NodeId) -> ProviderResult<Vec<NodeId>>;

    /// The mesh shape to inspect for a node.
    ///
    /// A mesh node is its own shape; a transform yields its first mesh child.
    fn shape_of(&self, node: NodeId) -> ProviderResult<Option<NodeId>>;

    /// Names of the shading groups a shape is assigned to.
    fn shading_groups(&self, node: NodeId) -> ProviderResult<Vec<String>>;

    /// Number of nodes in the upstream construction history, the node included.
    fn upstream_history_size(&self, node: NodeId) -> ProviderResult<usize>;

    /// Display layer the node belongs to, if any.
    fn display_layer(&self, node: NodeId) -> ProviderResult<Option<String>>;

    /// Open a mesh shape for topology queries.
    fn open_mesh(&self, shape: NodeId) -> ProviderResult<Box<dyn MeshTopologyProvider + '_>>;
}

/// One mesh opened for the per-mesh rules run on a single candidate node.
///
/// The handle is bound to the candidate node the rule was asked about, so
/// element violations are reported under that node even when the topology
/// comes from its shape child.
pub struct MeshHandle<'a> {
    node: NodeId,
    shape: NodeId,
    mesh: Box<dyn MeshTopologyProvider + 'a>,
}

impl<'a> MeshHandle<'a> {
    /// Resolve a node's mesh shape and open it.
    ///
    /// Returns `Ok(None)` when the node has no mesh shape.
    ///
    /// # Errors
    ///
    /// Propagates any failure to resolve or open the shape.
    pub fn open(resolver: &'a dyn NodeResolver, node: NodeId) -> ProviderResult<Option<Self>> {
        let Some(shape) = resolver.shape_of(node)? else {
            return Ok(None);
        };
        let mesh = resolver.open_mesh(shape)?;
        Ok(Some(Self { node, shape, mesh }))
    }

    /// Wrap an already opened mesh.
    #[must_use]
    pub fn new(node: NodeId, shape: NodeId, mesh: Box<dyn MeshTopologyProvider + 'a>) -> Self {
        Self { node, shape, mesh }
    }

    /// The candidate node violations are attributed to.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The shape the topology was read from.
    #[must_use]
    pub fn shape(&self) -> NodeId {
        self.shape
    }
}

impl<'a> Deref for MeshHandle<'a> {
    type Target = dyn MeshTopologyProvider + 'a;

    fn deref(&self) -> &Self::Target {
        self.mesh.as_ref()
    }
}

impl std::fmt::Debug for MeshHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshHandle")
            .field("node", &self.node)
            .field("shape", &self.shape)
            .field("polygons", &self.mesh.polygon_count())
            .finish()
    }
}
