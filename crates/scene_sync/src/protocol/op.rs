//! Incremental operations and full-tree descriptors

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Kind, PropValue};

/// Identity of a node, unique within a host's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// One incremental mutation issued by the remote authority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Op {
    /// Build a default object of `kind` and apply `props` in order
    Create {
        /// New node id
        id: NodeId,
        /// Kind of object to build
        kind: Kind,
        /// Initial properties, applied with `SetProp` semantics
        #[serde(default)]
        props: Vec<(String, PropValue)>,
    },
    /// Link `child_id` under `parent_id`
    Attach {
        /// Parent node
        #[serde(rename = "parentId")]
        parent_id: NodeId,
        /// Child node
        #[serde(rename = "childId")]
        child_id: NodeId,
    },
    /// Undo an `Attach`
    Detach {
        /// Parent node
        #[serde(rename = "parentId")]
        parent_id: NodeId,
        /// Child node
        #[serde(rename = "childId")]
        child_id: NodeId,
    },
    /// Set one property
    SetProp {
        /// Target node
        id: NodeId,
        /// Property key
        key: String,
        /// New value
        value: PropValue,
    },
    /// Unset one property (only `active` has an effect)
    UnsetProp {
        /// Target node
        id: NodeId,
        /// Property key
        key: String,
    },
    /// Destroy a node
    Delete {
        /// Target node
        id: NodeId,
    },
}

impl Op {
    /// `Create` with no initial properties
    pub fn create(id: i64, kind: Kind) -> Self {
        Self::Create { id: NodeId(id), kind, props: Vec::new() }
    }

    /// `Create` with initial properties
    pub fn create_with(id: i64, kind: Kind, props: Vec<(&str, PropValue)>) -> Self {
        Self::Create {
            id: NodeId(id),
            kind,
            props: props.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }

    /// `Attach`
    pub const fn attach(parent: i64, child: i64) -> Self {
        Self::Attach { parent_id: NodeId(parent), child_id: NodeId(child) }
    }

    /// `Detach`
    pub const fn detach(parent: i64, child: i64) -> Self {
        Self::Detach { parent_id: NodeId(parent), child_id: NodeId(child) }
    }

    /// `SetProp`
    pub fn set(id: i64, key: &str, value: PropValue) -> Self {
        Self::SetProp { id: NodeId(id), key: key.to_string(), value }
    }

    /// `UnsetProp`
    pub fn unset(id: i64, key: &str) -> Self {
        Self::UnsetProp { id: NodeId(id), key: key.to_string() }
    }

    /// `Delete`
    pub const fn delete(id: i64) -> Self {
        Self::Delete { id: NodeId(id) }
    }

    /// Short operation name for logs
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Attach { .. } => "attach",
            Self::Detach { .. } => "detach",
            Self::SetProp { .. } => "setProp",
            Self::UnsetProp { .. } => "unsetProp",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Full-tree description used to seed a `reset`
///
/// Only read during materialization; nothing keeps it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Node id
    pub id: NodeId,
    /// Node kind
    pub kind: Kind,
    /// Properties in application order
    #[serde(default)]
    pub props: Vec<(String, PropValue)>,
    /// Children in attach order
    #[serde(default)]
    pub children: Vec<NodeDescriptor>,
}

impl NodeDescriptor {
    /// Descriptor with no props and no children
    pub const fn new(id: i64, kind: Kind) -> Self {
        Self { id: NodeId(id), kind, props: Vec::new(), children: Vec::new() }
    }

    /// Append a property
    pub fn with_prop(mut self, key: &str, value: PropValue) -> Self {
        self.props.push((key.to_string(), value));
        self
    }

    /// Append a child
    pub fn with_child(mut self, child: NodeDescriptor) -> Self {
        self.children.push(child);
        self
    }

    /// Number of descriptors in this tree, including the root
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }
}
