use super::*;
use crate::nexpr::{NExpr, NodeEntry};
use crate::predicate::by_kind;
use crate::value::Value;
use exprgraph_core::NodeId;
use indexmap::IndexMap;

fn sample() -> NExpr {
    let mut adj = IndexMap::new();
    adj.insert(NodeId::new("a"), NodeEntry::leaf("core/literal", Value::Num(3.0)));
    adj.insert(NodeId::new("b"), NodeEntry::leaf("core/literal", Value::Num(4.0)));
    adj.insert(NodeId::new("c"), NodeEntry::flat("num/add", vec![NodeId::new("a"), NodeId::new("b")]));
    NExpr::new_unchecked(NodeId::new("c"), adj, NodeId::new("d"), IndexMap::new())
}

#[test]
fn wrap_then_splice_is_identity() {
    let expr = sample();
    let wrapped = wrap_by_name(&expr, &NodeId::new("a"), "debug/wrap")
        .unwrap()
        .commit()
        .unwrap();
    assert!(select_where(&wrapped, &by_kind("debug/wrap")).len() == 1);

    let spliced = splice_where(&wrapped, &by_kind("debug/wrap"), 0).unwrap();
    assert!(select_where(&spliced, &by_kind("debug/wrap")).is_empty());
    // parent `c` should reference `a` directly again.
    let c = spliced.get(&spliced.root_id).unwrap();
    let ids: Vec<_> = c.children.ids().cloned().collect();
    assert!(ids.contains(&NodeId::new("a")));
}

#[test]
fn wrap_at_root_moves_root() {
    let expr = sample();
    let wrapped = wrap_by_name(&expr, &NodeId::new("c"), "debug/wrap")
        .unwrap()
        .commit()
        .unwrap();
    assert_ne!(wrapped.root_id, NodeId::new("c"));
    assert_eq!(wrapped.get(&wrapped.root_id).unwrap().kind.as_str(), "debug/wrap");
}

#[test]
fn splice_rejects_a_replacement_of_a_different_output_type() {
    let mut expr = sample();
    expr.adj.insert(NodeId::new("s"), NodeEntry::leaf("core/literal", Value::Str("nope".into())));
    expr.adj.insert(
        NodeId::new("w"),
        NodeEntry {
            kind: "debug/wrap".into(),
            children: crate::nexpr::ChildRef::Seq(vec![crate::nexpr::ChildRef::Id(NodeId::new("s"))]),
            out: Some(Value::Num(3.0)),
        },
    );
    expr.adj.insert(NodeId::new("c"), NodeEntry::flat("num/add", vec![NodeId::new("w"), NodeId::new("b")]));

    let err = splice_where(&expr, &by_kind("debug/wrap"), 0).unwrap_err();
    assert!(matches!(err, GraphError::SpliceTypeMismatch { .. }));
}

#[test]
fn splice_at_root_promotes_child() {
    let expr = sample();
    let wrapped = wrap_by_name(&expr, &NodeId::new("c"), "debug/wrap")
        .unwrap()
        .commit()
        .unwrap();
    let spliced = splice_where(&wrapped, &by_kind("debug/wrap"), 0).unwrap();
    assert_eq!(spliced.root_id, NodeId::new("c"));
}

#[test]
fn gc_drops_unreachable_nodes() {
    let mut expr = sample();
    expr.adj.insert(NodeId::new("z"), NodeEntry::leaf("core/literal", Value::Num(99.0)));
    assert_eq!(expr.adj.len(), 4);
    let collected = gc(&expr);
    assert_eq!(collected.adj.len(), 3);
    assert!(!collected.adj.contains_key(&NodeId::new("z")));
}

#[test]
fn gc_preserving_aliases_keeps_aliased_orphan() {
    let mut expr = sample();
    expr.adj.insert(NodeId::new("z"), NodeEntry::leaf("core/literal", Value::Num(99.0)));
    let named = name(&expr, "kept", &NodeId::new("z")).unwrap();
    let collected = gc_preserving_aliases(&named);
    assert!(collected.adj.contains_key(&NodeId::new("z")));

    let collected_plain = gc(&named);
    assert!(!collected_plain.adj.contains_key(&NodeId::new("z")));
}

#[test]
fn rewire_children_updates_every_reference() {
    let expr = sample();
    let dirty = expr.clone().dirty();
    let rewired = rewire_children(dirty, &NodeId::new("a"), &NodeId::new("b"))
        .commit()
        .unwrap();
    let c = rewired.get(&NodeId::new("c")).unwrap();
    let ids: Vec<_> = c.children.ids().cloned().collect();
    assert_eq!(ids, vec![NodeId::new("b"), NodeId::new("b")]);
}

#[test]
fn name_adds_alias_without_consuming_counter() {
    let expr = sample();
    let named = name(&expr, "result", &NodeId::new("c")).unwrap();
    assert_eq!(named.counter, expr.counter);
    assert_eq!(named.aliases.get("result"), Some(&NodeId::new("c")));
}

#[test]
fn inject_input_only_touches_input_nodes() {
    let mut expr = sample();
    expr.adj.insert(NodeId::new("e"), NodeEntry::flat("core/input", vec![]));
    let injected = inject_input(&expr, Value::Str("hello".into()));
    assert_eq!(injected.get(&NodeId::new("e")).unwrap().out, Some(Value::Str("hello".into())));
    assert_eq!(injected.get(&NodeId::new("a")).unwrap().out, Some(Value::Num(3.0)));
}
