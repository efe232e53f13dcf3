//! `CExpr`/`NExpr` data model and graph algebra for exprgraph.
//!
//! - [`cexpr`] — permissive construction-time expression tree.
//! - [`nexpr`] — normalized adjacency-map expression DAG, plus its
//!   uncommitted [`nexpr::DirtyExpr`] variant.
//! - [`kind`] — namespaced node-kind strings.
//! - [`value`] — literal/runtime value shapes.
//! - [`predicate`] — first-class node predicates.
//! - [`algebra`] — select/map/replace/wrap/splice/gc/rewire/name/pipe.
//! - [`hash`] — deterministic content hashing.

pub mod algebra;
pub mod cexpr;
pub mod error;
pub mod hash;
pub mod kind;
pub mod nexpr;
pub mod predicate;
pub mod value;

pub use cexpr::{Arg, CExpr, CExprRef};
pub use error::GraphError;
pub use hash::content_hash;
pub use kind::Kind;
pub use nexpr::{ChildRef, DirtyExpr, NExpr, NodeEntry};
pub use value::Value;
