use super::*;
use exprgraph_graph::kind::internal;

#[test]
fn result_with_no_children_is_never_orphaned() {
    let stack = RecordingStack::new();
    let result = record_block(&stack, || CExpr::new(internal::LITERAL, vec![Arg::from(1.0)])).unwrap();
    assert_eq!(result.kind.as_str(), internal::LITERAL);
}

#[test]
fn nodes_wired_into_the_result_are_not_orphans() {
    let stack = RecordingStack::new();
    let result = record_block(&stack, || {
        let a = CExpr::new(internal::LITERAL, vec![Arg::from(2.0)]);
        stack.observe(&a);
        let b = CExpr::new(internal::LITERAL, vec![Arg::from(3.0)]);
        stack.observe(&b);
        CExpr::new(internal::BEGIN, vec![Arg::Expr(a), Arg::Expr(b)])
    });
    assert!(result.is_ok());
}

#[test]
fn node_built_but_never_wired_in_is_an_orphan() {
    let stack = RecordingStack::new();
    let outcome = record_block(&stack, || {
        let discarded = CExpr::new(internal::LITERAL, vec![Arg::from(42.0)]);
        stack.observe(&discarded);
        CExpr::new(internal::LITERAL, vec![Arg::from(1.0)])
    });
    assert!(matches!(outcome, Err(CaptureError::UnreachableOrphan(_))));
}
