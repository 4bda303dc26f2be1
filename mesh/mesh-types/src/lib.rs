//! Polygon mesh types for integrity checking.
//!
//! This crate provides a small, read-mostly polygon mesh model:
//!
//! - [`PolyMesh`] - An n-gon mesh with indexed vertices and optional per-face UVs
//! - [`Polygon`] - One face: vertex indices plus optional UV indices
//! - [`MeshAdjacency`] - Stable edge numbering with edge-to-face and vertex-to-edge lookups
//! - [`Uv`] - A texture coordinate and its integer tile
//!
//! Geometric predicates live in [`polygon`] (area, starlike test) and [`uv`]
//! (texture-space overlap detection).
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//! - CLI tools
//! - DCC plugins
//! - Servers
//!
//! # Edge Numbering
//!
//! Edges are numbered in the order they are first encountered while walking
//! faces in index order, and each face's boundary in winding order. The same
//! mesh always yields the same numbering.
//!
//! # Example
//!
//! ```
//! use mesh_types::{MeshAdjacency, PolyMesh};
//!
//! let quad = PolyMesh::unit_quad();
//! let adjacency = MeshAdjacency::build(&quad.faces);
//!
//! assert_eq!(adjacency.edge_count(), 4);
//! assert_eq!(adjacency.boundary_edge_count(), 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod adjacency;
mod error;
mod mesh;
pub mod polygon;
pub mod uv;

pub use adjacency::MeshAdjacency;
pub use error::{MeshError, MeshResult};
pub use mesh::{PolyMesh, Polygon};
pub use uv::{Uv, overlapping_faces};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};
