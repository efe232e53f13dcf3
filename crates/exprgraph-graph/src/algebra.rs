//! Pure and mutable transformations on normalized graphs.
//!
//! Every transformation returns a new [`NExpr`] (or a [`DirtyExpr`] for the
//! mutation-flavoured helpers that may transiently break invariant 1 until
//! `commit()`), never mutating its input in place — `NExpr` is immutable
//! data.

use std::collections::HashSet;

use exprgraph_core::{IdCounter, NodeId};
use indexmap::IndexMap;

use crate::error::GraphError;
use crate::kind::internal;
use crate::nexpr::{ChildRef, DirtyExpr, NExpr, NodeEntry};
use crate::predicate::Predicate;
use crate::value::Value;

/// IDs of every node matching `pred`.
pub fn select_where(expr: &NExpr, pred: &impl Predicate) -> Vec<NodeId> {
    expr.adj
        .iter()
        .filter(|(id, entry)| pred.test(entry, id, expr))
        .map(|(id, _)| id.clone())
        .collect()
}

/// Replace every entry matching `pred` with `f(entry)`. Non-matching
/// entries pass through unchanged; root and counter are preserved unless
/// the root itself matches, in which case the replacement's identity
/// (kind/out) is what downstream folds see for the root.
pub fn map_where(expr: &NExpr, pred: &impl Predicate, f: impl Fn(&NodeEntry) -> NodeEntry) -> NExpr {
    let mut adj = IndexMap::with_capacity(expr.adj.len());
    for (id, entry) in &expr.adj {
        let replaced = if pred.test(entry, id, expr) {
            f(entry)
        } else {
            entry.clone()
        };
        adj.insert(id.clone(), replaced);
    }
    NExpr::new_unchecked(expr.root_id.clone(), adj, expr.counter.clone(), expr.aliases.clone())
}

/// Shorthand for `map_where` that swaps only `kind`, preserving `children`
/// and `out`. Returns a `DirtyExpr` because swapping a kind can change the
/// node's effective output type without the caller having re-checked
/// downstream consumers.
pub fn replace_where(expr: &NExpr, pred: &impl Predicate, new_kind: impl Into<String>) -> DirtyExpr {
    let new_kind = new_kind.into();
    let mapped = map_where(expr, pred, |entry| NodeEntry {
        kind: new_kind.as_str().into(),
        children: entry.children.clone(),
        out: entry.out.clone(),
    });
    DirtyExpr::from_nexpr_unchecked(mapped)
}

/// Insert a new wrapper entry above `target_id`: every parent's reference
/// to `target_id` is remapped to the fresh wrapper ID, the wrapper's single
/// child is `target_id`, and the wrapper inherits `target_id`'s `out`. If
/// `target_id` was the root, the wrapper becomes the new root. Consumes one
/// counter slot.
pub fn wrap_by_name(
    expr: &NExpr,
    target_id: &NodeId,
    wrapper_kind: impl Into<String>,
) -> Result<DirtyExpr, GraphError> {
    if !expr.adj.contains_key(target_id) {
        return Err(GraphError::MissingNode(target_id.clone()));
    }

    // `expr.counter` is the next unused ID; the wrapper consumes exactly
    // that one, and the new counter value is its successor.
    let wrapper_id = expr.counter.clone();
    let new_counter = IdCounter::resume_after(&wrapper_id).peek();

    let target_out = expr.adj.get(target_id).expect("checked above").out.clone();

    let mut adj = IndexMap::with_capacity(expr.adj.len() + 1);
    for (id, entry) in &expr.adj {
        let rewritten_children = entry.children.replacing(target_id, &wrapper_id);
        adj.insert(id.clone(), NodeEntry {
            kind: entry.kind.clone(),
            children: rewritten_children,
            out: entry.out.clone(),
        });
    }
    adj.insert(
        wrapper_id.clone(),
        NodeEntry {
            kind: wrapper_kind.into().into(),
            children: ChildRef::Seq(vec![ChildRef::Id(target_id.clone())]),
            out: target_out,
        },
    );

    let new_root = if expr.root_id == *target_id {
        wrapper_id.clone()
    } else {
        expr.root_id.clone()
    };

    Ok(DirtyExpr::from_nexpr_unchecked(NExpr::new_unchecked(
        new_root,
        adj,
        new_counter,
        expr.aliases.clone(),
    )))
}

/// Remove every node matching `pred` and reconnect its parents to
/// `children[child_index]` of the matched node. If the root matches, the
/// chosen child becomes the new root. Chases transitively through the
/// matched set so a spliced node's chosen child, if itself matched, is
/// also bypassed.
pub fn splice_where(
    expr: &NExpr,
    pred: &impl Predicate,
    child_index: usize,
) -> Result<NExpr, GraphError> {
    let matched: HashSet<NodeId> = select_where(expr, pred).into_iter().collect();

    // For every matched node, find the ultimate replacement by chasing
    // through chains of matched nodes. Only literal nodes carry a
    // precomputed `out`; this crate has no registry to consult for a
    // non-literal node's output type, so the type check below is
    // best-effort — it catches a splice that would swap in a
    // differently-typed literal without requiring a dependency on
    // `exprgraph-compiler`.
    let replacement_of = |id: &NodeId| -> Result<NodeId, GraphError> {
        let original_out = expr.adj.get(id).and_then(|e| e.out.as_ref());
        let mut current = id.clone();
        let mut seen = HashSet::new();
        loop {
            if !seen.insert(current.clone()) {
                return Err(GraphError::CycleInSplice(id.clone()));
            }
            let entry = expr.adj.get(&current).ok_or_else(|| GraphError::MissingNode(current.clone()))?;
            let flat = entry.flat_children();
            let chosen = flat.get(child_index).and_then(ChildRef::as_id).ok_or_else(|| {
                GraphError::InvalidChildIndex {
                    node: current.clone(),
                    index: child_index,
                    len: flat.len(),
                }
            })?;
            if matched.contains(chosen) {
                current = chosen.clone();
                continue;
            }
            if let Some(from) = original_out {
                if let Some(to) = expr.adj.get(chosen).and_then(|e| e.out.as_ref()) {
                    let (from_tag, to_tag) = (from.type_tag(), to.type_tag());
                    if from_tag != to_tag {
                        return Err(GraphError::SpliceTypeMismatch {
                            node: id.clone(),
                            from: from_tag,
                            to: to_tag,
                        });
                    }
                }
            }
            return Ok(chosen.clone());
        }
    };

    let mut resolved = IndexMap::new();
    for id in &matched {
        resolved.insert(id.clone(), replacement_of(id)?);
    }

    let remap = |cr: &ChildRef| -> ChildRef {
        fn go(cr: &ChildRef, resolved: &IndexMap<NodeId, NodeId>) -> ChildRef {
            match cr {
                ChildRef::Id(id) => {
                    let mut target = id.clone();
                    while let Some(next) = resolved.get(&target) {
                        target = next.clone();
                    }
                    ChildRef::Id(target)
                }
                ChildRef::Seq(items) => ChildRef::Seq(items.iter().map(|c| go(c, resolved)).collect()),
                ChildRef::Map(map) => {
                    ChildRef::Map(map.iter().map(|(k, v)| (k.clone(), go(v, resolved))).collect())
                }
            }
        }
        go(cr, &resolved)
    };

    let mut adj = IndexMap::with_capacity(expr.adj.len());
    for (id, entry) in &expr.adj {
        if matched.contains(id) {
            continue;
        }
        adj.insert(
            id.clone(),
            NodeEntry {
                kind: entry.kind.clone(),
                children: remap(&entry.children),
                out: entry.out.clone(),
            },
        );
    }

    let mut new_root = expr.root_id.clone();
    while let Some(next) = resolved.get(&new_root) {
        new_root = next.clone();
    }

    let mut aliases = IndexMap::with_capacity(expr.aliases.len());
    for (name, target) in &expr.aliases {
        let mut t = target.clone();
        while let Some(next) = resolved.get(&t) {
            t = next.clone();
        }
        aliases.insert(name.clone(), t);
    }

    let spliced = NExpr::new_unchecked(new_root, adj, expr.counter.clone(), aliases);
    spliced.check_invariants()?;
    Ok(spliced)
}

/// Remove every node not forward-reachable from the root.
pub fn gc(expr: &NExpr) -> NExpr {
    gc_impl(expr, false)
}

/// Like [`gc`] but also keeps any entry that an alias still points to.
pub fn gc_preserving_aliases(expr: &NExpr) -> NExpr {
    gc_impl(expr, true)
}

fn gc_impl(expr: &NExpr, preserve_aliases: bool) -> NExpr {
    let mut reachable = HashSet::new();
    let mut stack = vec![expr.root_id.clone()];
    if preserve_aliases {
        stack.extend(expr.aliases.values().cloned());
    }
    while let Some(id) = stack.pop() {
        if !reachable.insert(id.clone()) {
            continue;
        }
        if let Some(entry) = expr.adj.get(&id) {
            stack.extend(entry.children.ids().cloned());
        }
    }

    let adj = expr
        .adj
        .iter()
        .filter(|(id, _)| reachable.contains(*id))
        .map(|(id, entry)| (id.clone(), entry.clone()))
        .collect();

    let aliases = if preserve_aliases {
        expr.aliases.clone()
    } else {
        expr.aliases
            .iter()
            .filter(|(_, target)| reachable.contains(*target))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    };

    NExpr::new_unchecked(expr.root_id.clone(), adj, expr.counter.clone(), aliases)
}

/// Replace every occurrence of `old_id` in any children position with
/// `new_id`. Does not alter the aliased target of any `@name` entry.
pub fn rewire_children(mut dirty: DirtyExpr, old_id: &NodeId, new_id: &NodeId) -> DirtyExpr {
    let expr = dirty.peek_mut();
    for entry in expr.adj.values_mut() {
        entry.children = entry.children.replacing(old_id, new_id);
    }
    dirty
}

/// Add a metadata entry at key `@alias_name` referencing `target_id`.
/// Does not consume a counter slot; the target node is left untouched.
pub fn name(expr: &NExpr, alias_name: impl Into<String>, target_id: &NodeId) -> Result<NExpr, GraphError> {
    if !expr.adj.contains_key(target_id) {
        return Err(GraphError::MissingNode(target_id.clone()));
    }
    let mut aliases = expr.aliases.clone();
    aliases.insert(alias_name.into(), target_id.clone());
    Ok(NExpr::new_unchecked(
        expr.root_id.clone(),
        expr.adj.clone(),
        expr.counter.clone(),
        aliases,
    ))
}

/// Replace every `core/input` entry's `out` with `data`.
pub fn inject_input(expr: &NExpr, data: Value) -> NExpr {
    map_where(expr, &crate::predicate::by_kind(internal::INPUT), |entry| NodeEntry {
        kind: entry.kind.clone(),
        children: entry.children.clone(),
        out: Some(data.clone()),
    })
}

/// Left-to-right composition of fallible graph operations.
pub fn pipe(expr: NExpr, ops: &[&dyn Fn(&NExpr) -> Result<NExpr, GraphError>]) -> Result<NExpr, GraphError> {
    let mut current = expr;
    for op in ops {
        current = op(&current)?;
    }
    Ok(current)
}

#[cfg(test)]
#[path = "algebra_tests.rs"]
mod algebra_tests;
