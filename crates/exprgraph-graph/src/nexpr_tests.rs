use super::*;
use exprgraph_core::NodeId;
use indexmap::IndexMap;

fn two_node_graph() -> NExpr {
    let mut adj = IndexMap::new();
    adj.insert(NodeId::new("a"), NodeEntry::leaf("core/literal", Value::Num(1.0)));
    adj.insert(NodeId::new("b"), NodeEntry::flat("num/add", vec![NodeId::new("a"), NodeId::new("a")]));
    NExpr::new_unchecked(NodeId::new("b"), adj, NodeId::new("c"), IndexMap::new())
}

#[test]
fn valid_graph_passes_invariant_check() {
    assert!(two_node_graph().check_invariants().is_ok());
}

#[test]
fn missing_root_fails_invariant_check() {
    let mut expr = two_node_graph();
    expr.root_id = NodeId::new("zzz");
    assert!(matches!(expr.check_invariants(), Err(GraphError::MissingNode(_))));
}

#[test]
fn dangling_child_fails_invariant_check() {
    let mut expr = two_node_graph();
    expr.adj
        .insert(NodeId::new("b"), NodeEntry::flat("num/add", vec![NodeId::new("a"), NodeId::new("ghost")]));
    assert!(matches!(
        expr.check_invariants(),
        Err(GraphError::DanglingReference { .. })
    ));
}

#[test]
fn dirty_then_commit_round_trips_unchanged_graph() {
    let expr = two_node_graph();
    let before = format!("{expr:?}");
    let committed = expr.dirty().commit().expect("valid graph commits");
    assert_eq!(format!("{committed:?}"), before);
}

#[test]
fn commit_rejects_dangling_reference() {
    let mut expr = two_node_graph();
    expr.adj
        .insert(NodeId::new("b"), NodeEntry::flat("num/add", vec![NodeId::new("ghost")]));
    let dirty = expr.dirty();
    assert!(dirty.commit().is_err());
}

#[test]
fn child_ref_ids_walks_structural_shapes() {
    let shape = ChildRef::Map(IndexMap::from([
        ("x".to_string(), ChildRef::Id(NodeId::new("a"))),
        ("y".to_string(), ChildRef::Seq(vec![ChildRef::Id(NodeId::new("b"))])),
    ]));
    let ids: Vec<_> = shape.ids().cloned().collect();
    assert_eq!(ids, vec![NodeId::new("a"), NodeId::new("b")]);
}
