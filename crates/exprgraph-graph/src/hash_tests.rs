use super::*;
use crate::nexpr::{NExpr, NodeEntry};
use crate::value::Value;
use exprgraph_core::NodeId;
use indexmap::IndexMap;

fn build(a_id: &str, b_id: &str, root_id: &str, counter: &str) -> NExpr {
    let mut adj = IndexMap::new();
    adj.insert(NodeId::new(a_id), NodeEntry::leaf("core/literal", Value::Num(1.0)));
    adj.insert(NodeId::new(b_id), NodeEntry::leaf("core/literal", Value::Num(2.0)));
    adj.insert(
        NodeId::new(root_id),
        NodeEntry::flat("num/add", vec![NodeId::new(a_id), NodeId::new(b_id)]),
    );
    NExpr::new_unchecked(NodeId::new(root_id), adj, NodeId::new(counter), IndexMap::new())
}

#[test]
fn identical_graphs_hash_identically() {
    let g1 = build("a", "b", "c", "d");
    let g2 = build("a", "b", "c", "d");
    assert_eq!(content_hash(&g1), content_hash(&g2));
}

#[test]
fn renumbered_but_isomorphic_graphs_hash_identically() {
    let g1 = build("a", "b", "c", "d");
    let g2 = build("x", "y", "z", "zz");
    assert_eq!(content_hash(&g1), content_hash(&g2));
}

#[test]
fn semantically_distinct_graphs_hash_differently() {
    let g1 = build("a", "b", "c", "d");
    let mut g2 = build("a", "b", "c", "d");
    g2.adj.insert(NodeId::new("a"), NodeEntry::leaf("core/literal", Value::Num(42.0)));
    assert_ne!(content_hash(&g1), content_hash(&g2));
}
