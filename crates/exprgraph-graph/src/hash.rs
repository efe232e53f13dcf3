//! Deterministic, non-cryptographic content hashing.
//!
//! Two graphs that differ only in ID assignment (e.g. one was re-elaborated
//! from an equivalent but differently-ordered `CExpr` tree) must still hash
//! identically, so the hash walks the graph canonically from the root and
//! renumbers nodes by first-visit order rather than hashing stored IDs.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use exprgraph_core::NodeId;

use crate::nexpr::{ChildRef, NExpr};
use crate::value::Value;

/// Content hash of `expr`, stable across ID-renumbering-only differences.
pub fn content_hash(expr: &NExpr) -> u64 {
    let mut renumber = HashMap::new();
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    hash_node(expr, &expr.root_id, &mut renumber, &mut hasher);
    hasher.finish()
}

fn hash_node(
    expr: &NExpr,
    id: &NodeId,
    renumber: &mut HashMap<NodeId, u32>,
    hasher: &mut impl Hasher,
) {
    let next = renumber.len() as u32;
    match renumber.entry(id.clone()) {
        std::collections::hash_map::Entry::Occupied(e) => {
            // Already visited: hash the canonical (renumbered) back-reference
            // only, so shared subtrees contribute once to structure but every
            // reference site still participates in the hash.
            0xBACu16.hash(hasher);
            e.get().hash(hasher);
            return;
        }
        std::collections::hash_map::Entry::Vacant(e) => {
            e.insert(next);
        }
    }

    let Some(entry) = expr.adj.get(id) else {
        0xDEADu32.hash(hasher);
        return;
    };

    entry.kind.as_str().hash(hasher);
    hash_value(&entry.out, hasher);
    hash_children(&entry.children, expr, renumber, hasher);
}

fn hash_children(
    cr: &ChildRef,
    expr: &NExpr,
    renumber: &mut HashMap<NodeId, u32>,
    hasher: &mut impl Hasher,
) {
    match cr {
        ChildRef::Id(id) => {
            b'I'.hash(hasher);
            hash_node(expr, id, renumber, hasher);
        }
        ChildRef::Seq(items) => {
            b'['.hash(hasher);
            items.len().hash(hasher);
            for item in items {
                hash_children(item, expr, renumber, hasher);
            }
            b']'.hash(hasher);
        }
        ChildRef::Map(map) => {
            b'{'.hash(hasher);
            map.len().hash(hasher);
            for (k, v) in map {
                k.hash(hasher);
                hash_children(v, expr, renumber, hasher);
            }
            b'}'.hash(hasher);
        }
    }
}

fn hash_value(out: &Option<Value>, hasher: &mut impl Hasher) {
    match out {
        None => 0u8.hash(hasher),
        Some(Value::Unit) => 1u8.hash(hasher),
        Some(Value::Num(n)) => {
            2u8.hash(hasher);
            n.to_bits().hash(hasher);
        }
        Some(Value::Str(s)) => {
            3u8.hash(hasher);
            s.hash(hasher);
        }
        Some(Value::Bool(b)) => {
            4u8.hash(hasher);
            b.hash(hasher);
        }
        Some(Value::List(items)) => {
            5u8.hash(hasher);
            items.len().hash(hasher);
            for item in items {
                hash_value(&Some(item.clone()), hasher);
            }
        }
        Some(Value::Map(map)) => {
            6u8.hash(hasher);
            map.len().hash(hasher);
            for (k, v) in map {
                k.hash(hasher);
                hash_value(&Some(v.clone()), hasher);
            }
        }
    }
}

#[cfg(test)]
#[path = "hash_tests.rs"]
mod hash_tests;
