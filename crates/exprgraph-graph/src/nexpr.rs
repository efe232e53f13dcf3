//! Normalized expression graph (`NExpr`) and its uncommitted variant
//! (`DirtyExpr`).

use indexmap::IndexMap;

use exprgraph_core::NodeId;

use crate::error::GraphError;
use crate::kind::Kind;
use crate::value::Value;

/// A child-position reference: either a single node, or a structural
/// container of further references.
///
/// This lets graph algebra (gc, splice, wrap, rewire) traverse every
/// `children` shape — flat sequences for regular kinds, nested
/// sequences/maps for structural kinds — with one recursive walk instead
/// of one per shape.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ChildRef {
    Id(NodeId),
    Seq(Vec<ChildRef>),
    Map(IndexMap<String, ChildRef>),
}

impl ChildRef {
    /// Depth-first iterator over every `NodeId` reachable from this
    /// `ChildRef`, in traversal order.
    pub fn ids(&self) -> Box<dyn Iterator<Item = &NodeId> + '_> {
        match self {
            ChildRef::Id(id) => Box::new(std::iter::once(id)),
            ChildRef::Seq(items) => Box::new(items.iter().flat_map(|c| c.ids())),
            ChildRef::Map(map) => Box::new(map.values().flat_map(|c| c.ids())),
        }
    }

    /// Replace every occurrence of `old` with `new` (used by
    /// `rewireChildren` and by `wrapByName`'s parent-pointer surgery).
    pub fn replacing(&self, old: &NodeId, new: &NodeId) -> ChildRef {
        match self {
            ChildRef::Id(id) if id == old => ChildRef::Id(new.clone()),
            ChildRef::Id(id) => ChildRef::Id(id.clone()),
            ChildRef::Seq(items) => {
                ChildRef::Seq(items.iter().map(|c| c.replacing(old, new)).collect())
            }
            ChildRef::Map(map) => ChildRef::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.replacing(old, new)))
                    .collect(),
            ),
        }
    }

    pub fn as_id(&self) -> Option<&NodeId> {
        match self {
            ChildRef::Id(id) => Some(id),
            _ => None,
        }
    }
}

impl From<NodeId> for ChildRef {
    fn from(id: NodeId) -> Self {
        ChildRef::Id(id)
    }
}

impl From<Vec<NodeId>> for ChildRef {
    fn from(ids: Vec<NodeId>) -> Self {
        ChildRef::Seq(ids.into_iter().map(ChildRef::Id).collect())
    }
}

/// A single entry in the adjacency map.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeEntry {
    pub kind: Kind,
    pub children: ChildRef,
    /// Precomputed value for literal nodes and aliases; `None` for
    /// everything that must be evaluated by a fold.
    pub out: Option<Value>,
}

impl NodeEntry {
    pub fn leaf(kind: impl Into<Kind>, out: Value) -> Self {
        NodeEntry {
            kind: kind.into(),
            children: ChildRef::Seq(vec![]),
            out: Some(out),
        }
    }

    pub fn flat(kind: impl Into<Kind>, children: Vec<NodeId>) -> Self {
        NodeEntry {
            kind: kind.into(),
            children: ChildRef::from(children),
            out: None,
        }
    }

    pub fn structural(kind: impl Into<Kind>, shape: ChildRef) -> Self {
        NodeEntry {
            kind: kind.into(),
            children: ChildRef::Seq(vec![shape]),
            out: None,
        }
    }

    /// Flat ordered children, for kinds that never use the structural
    /// (single nested seq/map) shape. Empty if `children` is itself a
    /// structural wrapper.
    pub fn flat_children(&self) -> &[ChildRef] {
        match &self.children {
            ChildRef::Seq(items) => items,
            _ => &[],
        }
    }
}

/// Normalized, immutable expression DAG.
///
/// Invariants:
/// 1. Every ID appearing in any `children` position exists in `adj`.
/// 2. `counter` strictly exceeds every used ID under the successor order.
/// 3. `root_id` exists in `adj`.
/// 4. No cycles — the graph may share subtrees but is acyclic.
/// 5. Alias entries live in `aliases`, keyed by name, pointing at a node
///    that is otherwise unmodified and still reachable through its own ID.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct NExpr {
    pub root_id: NodeId,
    pub adj: IndexMap<NodeId, NodeEntry>,
    pub counter: NodeId,
    pub aliases: IndexMap<String, NodeId>,
}

impl NExpr {
    /// Construct without validation — the caller guarantees invariants.
    /// Used by the elaborator and by graph algebra that has already
    /// established the invariants by construction.
    pub fn new_unchecked(
        root_id: NodeId,
        adj: IndexMap<NodeId, NodeEntry>,
        counter: NodeId,
        aliases: IndexMap<String, NodeId>,
    ) -> Self {
        NExpr {
            root_id,
            adj,
            counter,
            aliases,
        }
    }

    pub fn get(&self, id: &NodeId) -> Option<&NodeEntry> {
        self.adj.get(id)
    }

    pub fn root(&self) -> &NodeEntry {
        self.adj
            .get(&self.root_id)
            .expect("root_id always present per invariant 3")
    }

    /// Mark this graph as mutable, producing a [`DirtyExpr`] that evaluation
    /// refuses until [`DirtyExpr::commit`] re-validates it.
    pub fn dirty(self) -> DirtyExpr {
        DirtyExpr(self)
    }

    /// Check every stated invariant, returning the first violation found.
    pub fn check_invariants(&self) -> Result<(), GraphError> {
        if !self.adj.contains_key(&self.root_id) {
            return Err(GraphError::MissingNode(self.root_id.clone()));
        }
        for (id, entry) in &self.adj {
            for child in entry.children.ids() {
                if !self.adj.contains_key(child) {
                    return Err(GraphError::DanglingReference {
                        parent: id.clone(),
                        missing: child.clone(),
                    });
                }
            }
        }
        for (name, target) in &self.aliases {
            if !self.adj.contains_key(target) {
                return Err(GraphError::DanglingAlias {
                    name: name.clone(),
                    target: target.clone(),
                });
            }
        }
        Ok(())
    }
}

/// An `NExpr` mid-transformation, not yet validated.
///
/// Structurally identical to `NExpr` but a distinct type, so `fold()`
/// (which only accepts `&NExpr`) cannot be called on uncommitted state —
/// the type system refuses a dirty graph without a runtime flag check on
/// the hot path.
#[derive(Clone, Debug)]
pub struct DirtyExpr(pub(crate) NExpr);

impl DirtyExpr {
    pub fn from_nexpr_unchecked(expr: NExpr) -> Self {
        DirtyExpr(expr)
    }

    /// Validate invariants and return a fresh, evaluable `NExpr`.
    pub fn commit(self) -> Result<NExpr, GraphError> {
        self.0.check_invariants()?;
        Ok(self.0)
    }

    pub fn peek(&self) -> &NExpr {
        &self.0
    }

    pub fn peek_mut(&mut self) -> &mut NExpr {
        &mut self.0
    }
}

#[cfg(test)]
#[path = "nexpr_tests.rs"]
mod nexpr_tests;
