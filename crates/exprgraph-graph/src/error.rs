//! Error vocabulary for the `NExpr` data model and graph algebra.
//!
//! Covers the structural error kinds that can arise purely from graph
//! shape, independent of elaboration or evaluation.

use exprgraph_core::NodeId;

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum GraphError {
    #[error("root node {0:?} is not present in the adjacency map")]
    MissingNode(NodeId),

    #[error("node {parent:?} references missing child {missing:?}")]
    DanglingReference { parent: NodeId, missing: NodeId },

    #[error("alias {name:?} references missing node {target:?}")]
    DanglingAlias { name: String, target: NodeId },

    #[error("predicate for byName({0:?}) matched no alias")]
    UnknownAlias(String),

    #[error("splice at {node:?} would replace output type {from:?} with incompatible {to:?}")]
    SpliceTypeMismatch {
        node: NodeId,
        from: &'static str,
        to: &'static str,
    },

    #[error("splice child index {index} out of range for node {node:?} with {len} children")]
    InvalidChildIndex {
        node: NodeId,
        index: usize,
        len: usize,
    },

    #[error("splice of node {0:?} would introduce a cycle")]
    CycleInSplice(NodeId),

    #[error("attempted to fold or read an uncommitted DirtyExpr")]
    DirtyRefused,
}
