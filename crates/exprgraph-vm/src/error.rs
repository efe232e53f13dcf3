//! Error vocabulary for fold evaluation.

use exprgraph_core::NodeId;
use exprgraph_graph::{Kind, Value};

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum FoldError {
    #[error("no interpreter handler registered for kind {0:?}")]
    NoHandler(Kind),

    #[error("node {0:?} is an unresolved input: call inject_input or supply a StepHandler")]
    UnresolvedInput(NodeId),

    #[error("node {0:?} is an external effect with no interpreter handler: supply a StepHandler")]
    ExternalEffect(NodeId),

    #[error("node {node:?} expected {expected} children, found {found}")]
    ArityMismatch {
        node: NodeId,
        expected: usize,
        found: usize,
    },

    #[error("node {node:?} expected value shape {expected}, found {found:?}")]
    ShapeMismatch {
        node: NodeId,
        expected: &'static str,
        found: Value,
    },

    #[error("unbound lambda parameter {0:?}")]
    UnboundParam(String),

    #[error("user code raised: {0:?}")]
    UserError(Value),

    /// A handler received a value of the wrong shape. Unlike
    /// [`FoldError::ShapeMismatch`] this carries no `NodeId` — handlers see
    /// only already-evaluated `Value`s, never the node that produced them.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
