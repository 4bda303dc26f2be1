//! Mesh integrity checking for asset pipelines.
//!
//! This crate inspects polygon meshes and the scene nodes that own them and
//! reports defects before an asset ships:
//! - Naming (trailing numbers, duplicated names, namespaces, shape names)
//! - Scene hygiene (unfrozen transforms, uncentered pivots, history, shaders,
//!   display layers, empty groups, geometry parented beside transforms)
//! - Topology and geometry (triangles, ngons, lamina faces, hard edges,
//!   zero-area faces, zero-length edges, non-manifold and open edges, poles,
//!   non-starlike faces)
//! - UV layout (missing UVs, UV range, tile borders, shells overlapping)
//!
//! The checker never touches scene or mesh storage directly. A host implements
//! [`NodeResolver`] and [`MeshTopologyProvider`]; [`InMemoryScene`] and
//! [`PolyMeshView`] are ready-made implementations over [`mesh_types`].
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with zero Bevy dependencies.
//!
//! # Example
//!
//! ```
//! use mesh_integrity::{CheckRequest, CheckRunner, InMemoryScene, expand_hierarchy};
//! use mesh_types::PolyMesh;
//!
//! let mut scene = InMemoryScene::new();
//! let root = scene.add_transform("asset", None);
//! scene.add_mesh_object("body02", Some(root), PolyMesh::unit_cube());
//!
//! let nodes = expand_hierarchy(&[root], &scene).unwrap();
//! let request = CheckRequest::new(["trailing_numbers", "open_edges"], nodes).unwrap();
//! let result = CheckRunner::new(&scene).run(&request).unwrap();
//!
//! assert_eq!(result.get("trailing_numbers").unwrap().len(), 1);
//! assert!(result.get("open_edges").unwrap().is_empty());
//! println!("{}", result.render(&scene));
//! ```
//!
//! # Features
//!
//! - `serde` (default): JSON reports and JSON parameter files.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod hierarchy;
mod id;
mod mesh_view;
mod params;
mod provider;
mod report;
pub mod rules;
mod runner;
mod scene;

pub use error::{CheckError, CheckResult, ProviderError, ProviderResult};
pub use hierarchy::expand_hierarchy;
pub use id::{ElementKind, NodeId, NodeKind};
pub use mesh_view::PolyMeshView;
pub use params::CheckParams;
pub use provider::{MeshHandle, MeshTopologyProvider, NodeResolver, WorldTransform};
pub use report::{CheckRunResult, Diagnostic, RuleResult, RuleStatus, Severity, Violation};
pub use rules::{Category, Granularity, RuleSpec};
pub use runner::{CheckRequest, CheckRunner};
pub use scene::{InMemoryScene, LocalTransform};

// Re-export the UV type used by provider queries
pub use mesh_types::Uv;
