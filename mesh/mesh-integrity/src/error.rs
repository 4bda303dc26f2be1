//! Error types for integrity checking.

use mesh_types::MeshError;
use thiserror::Error;

use crate::id::{ElementKind, NodeId};

/// Result type for provider queries.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Result type for check runs.
pub type CheckResult<T> = Result<T, CheckError>;

/// A failed query against a scene or mesh provider.
///
/// Provider errors are recoverable: the runner records them as diagnostics on
/// the affected rule and node, then continues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// The node no longer resolves to a live scene object.
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),

    /// The node exists but has no mesh data to open.
    #[error("node {0} is not a mesh")]
    NotAMesh(NodeId),

    /// An element index was outside the mesh.
    #[error("{kind} index {index} out of range (mesh has {count})")]
    IndexOutOfRange {
        /// Kind of element that was addressed.
        kind: ElementKind,
        /// The requested index.
        index: usize,
        /// Number of elements of that kind.
        count: usize,
    },

    /// UV coordinates were requested for an unmapped face.
    #[error("polygon {face} has no uvs")]
    NoUvs {
        /// The unmapped face.
        face: usize,
    },

    /// Mesh data was structurally invalid.
    #[error("invalid mesh: {0}")]
    InvalidMesh(#[from] MeshError),

    /// Any other failure reported by the host application.
    #[error("host error: {0}")]
    Host(String),
}

/// Errors that reject or abort a whole check run.
#[derive(Debug, Error)]
pub enum CheckError {
    /// No rules were requested.
    #[error("no rules requested")]
    NoRules,

    /// No candidate nodes were supplied.
    #[error("no candidate nodes supplied")]
    NoNodes,

    /// A requested rule name is not in the registry.
    #[error("unknown rule: {0}")]
    UnknownRule(String),

    /// A check parameter is out of its valid range.
    #[error("invalid check parameters: {message}")]
    InvalidParams {
        /// Description of the problem.
        message: String,
    },

    /// The run was cancelled before it completed.
    #[error("check run cancelled")]
    Cancelled,

    /// Reading configuration or writing a report failed.
    #[cfg(feature = "serde")]
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
