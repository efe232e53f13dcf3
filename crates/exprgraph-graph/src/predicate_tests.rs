use super::*;
use crate::algebra::select_where;
use crate::nexpr::{NExpr, NodeEntry};
use crate::value::Value;
use exprgraph_core::NodeId;
use indexmap::IndexMap;

fn sample() -> NExpr {
    let mut adj = IndexMap::new();
    adj.insert(NodeId::new("a"), NodeEntry::leaf("core/literal", Value::Num(1.0)));
    adj.insert(NodeId::new("b"), NodeEntry::leaf("core/literal", Value::Num(2.0)));
    adj.insert(NodeId::new("c"), NodeEntry::flat("num/add", vec![NodeId::new("a"), NodeId::new("b")]));
    let mut aliases = IndexMap::new();
    aliases.insert("sum".to_string(), NodeId::new("c"));
    NExpr::new_unchecked(NodeId::new("c"), adj, NodeId::new("d"), aliases)
}

#[test]
fn by_kind_matches_exact() {
    let expr = sample();
    let matches = select_where(&expr, &by_kind("core/literal"));
    assert_eq!(matches.len(), 2);
}

#[test]
fn by_kind_glob_matches_prefix() {
    let expr = sample();
    let matches = select_where(&expr, &by_kind_glob("core/"));
    assert_eq!(matches.len(), 2);
}

#[test]
fn is_leaf_excludes_internal_nodes() {
    let expr = sample();
    let matches = select_where(&expr, &is_leaf());
    assert_eq!(matches.len(), 2);
}

#[test]
fn has_child_count_matches() {
    let expr = sample();
    let matches = select_where(&expr, &has_child_count(2));
    assert_eq!(matches, vec![NodeId::new("c")]);
}

#[test]
fn not_inverts() {
    let expr = sample();
    let matches = select_where(&expr, &not(is_leaf()));
    assert_eq!(matches, vec![NodeId::new("c")]);
}

#[test]
fn and_or_compose() {
    let expr = sample();
    let both = select_where(&expr, &and(by_kind("core/literal"), is_leaf()));
    assert_eq!(both.len(), 2);
    let either = select_where(&expr, &or(by_kind("num/add"), is_leaf()));
    assert_eq!(either.len(), 3);
}

#[test]
fn by_name_matches_aliased_node() {
    let expr = sample();
    let matches = select_where(&expr, &by_name("sum"));
    assert_eq!(matches, vec![NodeId::new("c")]);
}
