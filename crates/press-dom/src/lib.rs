//! Press DOM - Document tree
//!
//! Arena-allocated document tree. Every node lives in one `Vec` and is
//! addressed by a [`NodeId`]; links between nodes are ids, never pointers.

mod document;
mod kind;
mod node;
mod tree;

pub use document::Document;
pub use kind::ElementKind;
pub use node::{ElementData, Node, NodeData};
pub use tree::{Children, DomTree};

use thiserror::Error;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node
    pub const ROOT: NodeId = NodeId(0);
    /// Invalid/absent node
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this id refers to a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index of this node
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Tree structure errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),

    #[error("node {child:?} already has parent {parent:?}")]
    AlreadyAttached { child: NodeId, parent: NodeId },

    #[error("appending {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("text node {0:?} cannot have children")]
    NotAContainer(NodeId),
}
