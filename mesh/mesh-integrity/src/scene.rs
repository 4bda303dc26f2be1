//! An in-memory scene implementing [`NodeResolver`].
//!
//! Useful as a standalone backend for meshes loaded outside a DCC, and as the
//! scene double the test suite checks against. Nodes form a parent/child
//! hierarchy of transforms with mesh shapes underneath; each mesh shape owns a
//! [`PolyMesh`] which is exposed through [`PolyMeshView`].

use hashbrown::HashMap;
use mesh_types::PolyMesh;
use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Vector3};

use crate::error::{ProviderError, ProviderResult};
use crate::id::{NodeId, NodeKind};
use crate::mesh_view::PolyMeshView;
use crate::provider::{MeshTopologyProvider, NodeResolver, WorldTransform};

const DEFAULT_SHADING_GROUP: &str = "initialShadingGroup";

/// Local transform channels of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    /// Translation relative to the parent.
    pub translate: Vector3<f64>,
    /// XYZ Euler rotation in degrees.
    pub rotate: Vector3<f64>,
    /// Scale.
    pub scale: Vector3<f64>,
    /// Rotate pivot in object space.
    pub rotate_pivot: Point3<f64>,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            translate: Vector3::zeros(),
            rotate: Vector3::zeros(),
            scale: Vector3::repeat(1.0),
            rotate_pivot: Point3::origin(),
        }
    }
}

impl LocalTransform {
    fn matrix(&self) -> Matrix4<f64> {
        let rotation = Rotation3::from_euler_angles(
            self.rotate.x.to_radians(),
            self.rotate.y.to_radians(),
            self.rotate.z.to_radians(),
        );
        Matrix4::new_translation(&self.translate)
            * rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }
}

#[derive(Debug, Clone)]
struct SceneNode {
    name: String,
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: LocalTransform,
    display_layer: Option<String>,
    shading_groups: Vec<String>,
    history_size: usize,
    mesh: Option<PolyMesh>,
}

impl SceneNode {
    fn new(name: &str, kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            parent,
            children: Vec::new(),
            local: LocalTransform::default(),
            display_layer: None,
            shading_groups: Vec::new(),
            history_size: 1,
            mesh: None,
        }
    }
}

/// A scene held entirely in memory.
///
/// # Example
///
/// ```
/// use mesh_integrity::{InMemoryScene, NodeResolver};
/// use mesh_types::PolyMesh;
///
/// let mut scene = InMemoryScene::new();
/// let root = scene.add_transform("root", None);
/// let (body, shape) = scene.add_mesh_object("body", Some(root), PolyMesh::unit_cube());
///
/// assert_eq!(scene.resolve_name(body).unwrap(), "|root|body");
/// assert_eq!(scene.shape_of(body).unwrap(), Some(shape));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryScene {
    nodes: HashMap<NodeId, SceneNode>,
}

impl InMemoryScene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the scene.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the scene has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check if a node exists.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Add a node of any kind.
    ///
    /// A parent that is not in the scene is ignored and the node is added at
    /// the root.
    pub fn add_node(&mut self, name: &str, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId::new_v4();
        let parent = parent.filter(|p| self.nodes.contains_key(p));
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.push(id);
        }
        self.nodes.insert(id, SceneNode::new(name, kind, parent));
        id
    }

    /// Add a transform.
    pub fn add_transform(&mut self, name: &str, parent: Option<NodeId>) -> NodeId {
        self.add_node(name, NodeKind::Transform, parent)
    }

    /// Add a mesh shape under a transform.
    ///
    /// The shape starts in the default shading group with a history of one.
    pub fn add_mesh(&mut self, name: &str, parent: NodeId, mesh: PolyMesh) -> NodeId {
        let id = self.add_node(name, NodeKind::Mesh, Some(parent));
        if let Some(node) = self.nodes.get_mut(&id) {
            node.shading_groups.push(DEFAULT_SHADING_GROUP.to_owned());
            node.mesh = Some(mesh);
        }
        id
    }

    /// Add a transform named `name` with a mesh shape named `<name>Shape`.
    ///
    /// Returns `(transform, shape)`.
    pub fn add_mesh_object(
        &mut self,
        name: &str,
        parent: Option<NodeId>,
        mesh: PolyMesh,
    ) -> (NodeId, NodeId) {
        let transform = self.add_transform(name, parent);
        let shape = self.add_mesh(&format!("{name}Shape"), transform, mesh);
        (transform, shape)
    }

    /// Remove a node and everything below it.
    pub fn remove(&mut self, node: NodeId) {
        let Some(removed) = self.nodes.remove(&node) else {
            return;
        };
        if let Some(parent) = removed.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != node);
        }
        for child in removed.children {
            self.remove(child);
        }
    }

    /// Rename a node.
    pub fn rename(&mut self, node: NodeId, name: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            name.clone_into(&mut n.name);
        }
    }

    /// Replace a node's local transform.
    pub fn set_local_transform(&mut self, node: NodeId, local: LocalTransform) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.local = local;
        }
    }

    /// Put a node in a display layer.
    pub fn set_display_layer(&mut self, node: NodeId, layer: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.display_layer = Some(layer.to_owned());
        }
    }

    /// Assign a shape to a single shading group, replacing earlier assignments.
    pub fn assign_shading_group(&mut self, shape: NodeId, group: &str) {
        if let Some(n) = self.nodes.get_mut(&shape) {
            n.shading_groups = vec![group.to_owned()];
        }
    }

    /// Remove every shading group assignment from a shape.
    pub fn clear_shading_groups(&mut self, shape: NodeId) {
        if let Some(n) = self.nodes.get_mut(&shape) {
            n.shading_groups.clear();
        }
    }

    /// Set the number of nodes in a shape's construction history.
    pub fn set_history_size(&mut self, shape: NodeId, size: usize) {
        if let Some(n) = self.nodes.get_mut(&shape) {
            n.history_size = size;
        }
    }

    /// Mutable access to a shape's mesh.
    pub fn mesh_mut(&mut self, shape: NodeId) -> Option<&mut PolyMesh> {
        self.nodes.get_mut(&shape)?.mesh.as_mut()
    }

    fn get(&self, node: NodeId) -> ProviderResult<&SceneNode> {
        self.nodes.get(&node).ok_or(ProviderError::NodeNotFound(node))
    }

    fn world_matrix(&self, node: NodeId) -> ProviderResult<Matrix4<f64>> {
        let mut matrix = Matrix4::identity();
        let mut current = Some(node);
        while let Some(id) = current {
            let n = self.get(id)?;
            matrix = n.local.matrix() * matrix;
            current = n.parent;
        }
        Ok(matrix)
    }
}

/// Split an affine matrix into translate, XYZ Euler rotation (degrees) and scale.
fn decompose(matrix: &Matrix4<f64>) -> WorldTransform {
    let translate = Vector3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]);
    let linear: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();

    let mut scale = Vector3::zeros();
    let mut basis = linear;
    for axis in 0..3 {
        let length = linear.column(axis).norm();
        scale[axis] = length;
        if length > 0.0 {
            basis.set_column(axis, &(linear.column(axis) / length));
        }
    }

    let (x, y, z) = Rotation3::from_matrix_unchecked(basis).euler_angles();
    WorldTransform {
        translate,
        rotate: Vector3::new(x.to_degrees(), y.to_degrees(), z.to_degrees()),
        scale,
    }
}

impl NodeResolver for InMemoryScene {
    fn resolve_name(&self, node: NodeId) -> ProviderResult<String> {
        let mut parts = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            let n = self.get(id)?;
            parts.push(n.name.as_str());
            current = n.parent;
        }
        parts.reverse();
        Ok(format!("|{}", parts.join("|")))
    }

    fn node_kind(&self, node: NodeId) -> ProviderResult<NodeKind> {
        Ok(self.get(node)?.kind)
    }

    fn world_transform(&self, node: NodeId) -> ProviderResult<WorldTransform> {
        Ok(decompose(&self.world_matrix(node)?))
    }

    fn rotate_pivot_world(&self, node: NodeId) -> ProviderResult<Point3<f64>> {
        let pivot = self.get(node)?.local.rotate_pivot;
        Ok(self.world_matrix(node)?.transform_point(&pivot))
    }

    fn parent(&self, node: NodeId) -> ProviderResult<Option<NodeId>> {
        Ok(self.get(node)?.parent)
    }

    fn children(&self, node: NodeId) -> ProviderResult<Vec<NodeId>> {
        Ok(self.get(node)?.children.clone())
    }

    fn shape_of(&self, node: NodeId) -> ProviderResult<Option<NodeId>> {
        let n = self.get(node)?;
        match n.kind {
            NodeKind::Mesh => Ok(Some(node)),
            NodeKind::Transform => Ok(n
                .children
                .iter()
                .copied()
                .find(|c| self.nodes.get(c).is_some_and(|n| n.kind == NodeKind::Mesh))),
            NodeKind::Other => Ok(None),
        }
    }

    fn shading_groups(&self, node: NodeId) -> ProviderResult<Vec<String>> {
        Ok(self.get(node)?.shading_groups.clone())
    }

    fn upstream_history_size(&self, node: NodeId) -> ProviderResult<usize> {
        Ok(self.get(node)?.history_size)
    }

    fn display_layer(&self, node: NodeId) -> ProviderResult<Option<String>> {
        Ok(self.get(node)?.display_layer.clone())
    }

    fn open_mesh(&self, shape: NodeId) -> ProviderResult<Box<dyn MeshTopologyProvider + '_>> {
        let mesh = self
            .get(shape)?
            .mesh
            .as_ref()
            .ok_or(ProviderError::NotAMesh(shape))?;
        Ok(Box::new(PolyMeshView::new(mesh)))
    }
}
