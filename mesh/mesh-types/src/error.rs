//! Error types for mesh construction.

use thiserror::Error;

/// Result type for mesh construction and validation.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors that can occur when a mesh is structurally invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index} (mesh has {vertex_count} vertices)")]
    InvalidVertexIndex {
        /// Face holding the bad reference.
        face: usize,
        /// The invalid vertex index.
        index: u32,
        /// Total number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A face references a UV that does not exist.
    #[error("face {face} references uv {index} (mesh has {uv_count} uvs)")]
    InvalidUvIndex {
        /// Face holding the bad reference.
        face: usize,
        /// The invalid UV index.
        index: u32,
        /// Total number of UVs in the mesh.
        uv_count: usize,
    },

    /// A face's UV list does not match its vertex list.
    #[error("face {face} has {vertices} vertices but {uvs} uvs")]
    UvCountMismatch {
        /// Offending face.
        face: usize,
        /// Number of face vertices.
        vertices: usize,
        /// Number of face UVs.
        uvs: usize,
    },

    /// A face has fewer than three vertices.
    #[error("face {face} has only {vertices} vertices")]
    DegenerateFace {
        /// Offending face.
        face: usize,
        /// Number of face vertices.
        vertices: usize,
    },
}
