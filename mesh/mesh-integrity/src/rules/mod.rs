//! The rule registry.
//!
//! Every rule is a pure function over the provider contracts, registered in
//! [`RULES`] under a stable name. Rules come in three shapes:
//!
//! - [`Check::Node`]: one node at a time, node-level result
//! - [`Check::Group`]: the whole candidate list at once, node-level result
//! - [`Check::Element`]: one opened mesh at a time, element indices as result
//!
//! The runner owns fault isolation; a rule simply returns provider errors.

mod general;
mod naming;
mod topology;
mod uv;

use std::fmt;

use crate::error::{ProviderError, ProviderResult};
use crate::id::{ElementKind, NodeId};
use crate::params::CheckParams;
use crate::provider::{MeshHandle, NodeResolver};

/// UI grouping of rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Node naming conventions.
    Naming,
    /// Transform, shading and scene hygiene.
    General,
    /// Mesh topology and geometry.
    Topology,
    /// UV layout.
    Uv,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 4] = [Self::Naming, Self::General, Self::Topology, Self::Uv];

    /// Lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Naming => "naming",
            Self::General => "general",
            Self::Topology => "topology",
            Self::Uv => "uv",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a rule needs from the providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Node ids and the resolver only.
    Node,
    /// An opened mesh per candidate node.
    Element,
}

/// Outcome of a rule that looks at the whole candidate list.
#[derive(Debug, Default)]
pub struct GroupScan {
    /// Nodes that violate the rule.
    pub flagged: Vec<NodeId>,
    /// Nodes that could not be checked.
    pub failures: Vec<(NodeId, ProviderError)>,
}

/// Outcome of an element-level rule over one mesh.
#[derive(Debug, Default)]
pub struct ElementScan {
    /// Indices of violating elements.
    pub flagged: Vec<usize>,
    /// Elements that were skipped, with the reason.
    pub skipped: Vec<(usize, String)>,
}

impl ElementScan {
    /// Scan `0..count`, flagging every index the predicate accepts.
    pub(crate) fn filter<F>(count: usize, mut predicate: F) -> ProviderResult<Self>
    where
        F: FnMut(usize) -> ProviderResult<bool>,
    {
        let mut scan = Self::default();
        for index in 0..count {
            if predicate(index)? {
                scan.flagged.push(index);
            }
        }
        Ok(scan)
    }
}

/// Per-node rule.
pub type NodeCheck = fn(NodeId, &dyn NodeResolver, &CheckParams) -> ProviderResult<bool>;

/// Whole-list rule.
pub type GroupCheck = fn(&[NodeId], &dyn NodeResolver, &CheckParams) -> GroupScan;

/// Per-mesh rule.
pub type ElementCheck = fn(&MeshHandle<'_>, &CheckParams) -> ProviderResult<ElementScan>;

/// The function implementing a rule.
#[derive(Clone, Copy)]
pub enum Check {
    /// Returns whether one node violates the rule.
    Node(NodeCheck),
    /// Evaluates all candidate nodes together.
    Group(GroupCheck),
    /// Returns the violating elements of one mesh.
    Element(ElementCheck),
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(_) => f.write_str("Check::Node"),
            Self::Group(_) => f.write_str("Check::Group"),
            Self::Element(_) => f.write_str("Check::Element"),
        }
    }
}

/// A registered rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    /// Stable identifier used in requests and reports.
    pub name: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// UI grouping.
    pub category: Category,
    /// What violation indices refer to.
    pub kind: ElementKind,
    /// Implementation.
    pub check: Check,
}

impl RuleSpec {
    /// What the rule needs from the providers.
    #[must_use]
    pub fn granularity(&self) -> Granularity {
        match self.check {
            Check::Node(_) | Check::Group(_) => Granularity::Node,
            Check::Element(_) => Granularity::Element,
        }
    }
}

macro_rules! rule {
    ($name:literal, $label:literal, $category:ident, $kind:ident, $check:ident($f:path)) => {
        RuleSpec {
            name: $name,
            label: $label,
            category: Category::$category,
            kind: ElementKind::$kind,
            check: Check::$check($f),
        }
    };
}

/// Every rule, in display order.
pub static RULES: &[RuleSpec] = &[
    rule!("trailing_numbers", "Trailing numbers", Naming, Node, Node(naming::trailing_numbers)),
    rule!("duplicated_names", "Duplicated names", Naming, Node, Group(naming::duplicated_names)),
    rule!("shape_names", "Shape names", Naming, Node, Node(naming::shape_names)),
    rule!("namespaces", "Namespaces", Naming, Node, Node(naming::namespaces)),
    rule!("layers", "Display layers", General, Node, Node(general::layers)),
    rule!("history", "Construction history", General, Node, Node(general::history)),
    rule!("shaders", "Shaders", General, Node, Node(general::shaders)),
    rule!(
        "unfrozen_transforms",
        "Unfrozen transforms",
        General,
        Node,
        Node(general::unfrozen_transforms)
    ),
    rule!(
        "uncentered_pivots",
        "Uncentered pivots",
        General,
        Node,
        Node(general::uncentered_pivots)
    ),
    rule!("parent_geometry", "Parent geometry", General, Node, Node(general::parent_geometry)),
    rule!("empty_groups", "Empty groups", General, Node, Node(general::empty_groups)),
    rule!("triangles", "Triangles", Topology, Polygon, Element(topology::triangles)),
    rule!("ngons", "Ngons", Topology, Polygon, Element(topology::ngons)),
    rule!("open_edges", "Open edges", Topology, Edge, Element(topology::open_edges)),
    rule!("poles", "Poles", Topology, Vertex, Element(topology::poles)),
    rule!("hard_edges", "Hard edges", Topology, Edge, Element(topology::hard_edges)),
    rule!("lamina", "Lamina faces", Topology, Polygon, Element(topology::lamina)),
    rule!(
        "zero_area_faces",
        "Zero area faces",
        Topology,
        Polygon,
        Element(topology::zero_area_faces)
    ),
    rule!(
        "zero_length_edges",
        "Zero length edges",
        Topology,
        Edge,
        Element(topology::zero_length_edges)
    ),
    rule!(
        "non_manifold_edges",
        "Non-manifold edges",
        Topology,
        Edge,
        Element(topology::non_manifold_edges)
    ),
    rule!("starlike", "Starlike", Topology, Polygon, Element(topology::starlike)),
    rule!(
        "self_penetrating_uvs",
        "Self-penetrating UVs",
        Uv,
        Polygon,
        Element(uv::self_penetrating_uvs)
    ),
    rule!("missing_uvs", "Missing UVs", Uv, Polygon, Element(uv::missing_uvs)),
    rule!("uv_range", "UV range", Uv, Uv, Element(uv::uv_range)),
    rule!("on_border", "UVs on border", Uv, Uv, Element(uv::on_border)),
    rule!("cross_border", "Cross border", Uv, Polygon, Element(uv::cross_border)),
];

/// Look up a rule by name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static RuleSpec> {
    RULES.iter().find(|rule| rule.name == name)
}

/// Every registered rule.
#[must_use]
pub fn all() -> &'static [RuleSpec] {
    RULES
}

/// Rules in one category, in display order.
pub fn in_category(category: Category) -> impl Iterator<Item = &'static RuleSpec> {
    RULES.iter().filter(move |rule| rule.category == category)
}
