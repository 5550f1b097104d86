//! Non-fatal conditions raised while applying operations

use super::{Kind, NodeId};

/// Why an operation (or one of its properties) was ignored
///
/// None of these ever reach the remote authority: the batch loop logs them,
/// counts them, and moves on to the next operation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyIssue {
    /// `Create` named a kind the engine cannot build
    #[error("node {id}: unsupported kind '{kind}'")]
    UnknownKind {
        /// Node that was not created
        id: NodeId,
        /// Kind that was requested
        kind: Kind,
    },

    /// `Create` reused an id that is still live
    #[error("node {id} already exists")]
    DuplicateId {
        /// Offending id
        id: NodeId,
    },

    /// An operation addressed an id absent from the tables
    #[error("node {id} does not exist")]
    MissingReference {
        /// Missing id
        id: NodeId,
    },

    /// A property value had the wrong shape for its key
    #[error("property '{key}' expects {expected}, got {found}")]
    TypeMismatch {
        /// Property key
        key: String,
        /// Expected wire type
        expected: &'static str,
        /// Received wire type
        found: &'static str,
    },

    /// The key is unknown, or the node's kind has no such member
    #[error("property '{key}' is not supported on {kind}")]
    UnsupportedProp {
        /// Property key
        key: String,
        /// Kind of the addressed node, [`Kind::Unsupported`] when undecided
        kind: Kind,
    },

    /// An attach or detach that would break the graph's structure
    #[error("cannot link {child} under {parent}: {reason}")]
    InvalidStructure {
        /// Parent id
        parent: NodeId,
        /// Child id
        child: NodeId,
        /// What is wrong with the edge
        reason: &'static str,
    },
}
