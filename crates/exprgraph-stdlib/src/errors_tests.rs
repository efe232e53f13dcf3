use super::*;
use exprgraph_compiler::{compose, Surface};
use exprgraph_graph::Arg;
use exprgraph_vm::fold;

fn surface_and_interp() -> (Surface, Interpreter) {
    let registry = compose(&[plugin()]).unwrap();
    (Surface::new(registry), interpreter())
}

#[test]
fn fail_raises_a_user_error_carrying_its_value() {
    let (s, interp) = surface_and_interp();
    let message = s.literal(Value::Str("boom".into()));
    let node = s.call("fail", vec![message.into()]).unwrap();
    let expr = exprgraph_compiler::elaborate(&node, s.registry()).unwrap();
    let err = fold(&expr, &interp).unwrap_err();
    assert_eq!(err, FoldError::UserError(Value::Str("boom".into())));
}

#[test]
fn try_catch_routes_a_failing_body_to_its_handler() {
    let (s, interp) = surface_and_interp();
    let message = s.literal(Value::Str("boom".into()));
    let body = s.call("fail", vec![message.into()]).unwrap();
    let handler = s.call("current_error", vec![]).unwrap();
    let node = s
        .call("try_catch", vec![Arg::Expr(body), Arg::Expr(handler)])
        .unwrap();
    let expr = exprgraph_compiler::elaborate(&node, s.registry()).unwrap();
    assert_eq!(fold(&expr, &interp).unwrap(), Value::Str("boom".into()));
}

#[test]
fn try_catch_skips_the_handler_when_the_body_succeeds() {
    let (s, interp) = surface_and_interp();
    let ok_value = s.literal(Value::Num(1.0));
    let message = s.literal(Value::Str("unreached".into()));
    let handler = s.call("fail", vec![message.into()]).unwrap();
    let node = s
        .call("try_catch", vec![Arg::Expr(ok_value), Arg::Expr(handler)])
        .unwrap();
    let expr = exprgraph_compiler::elaborate(&node, s.registry()).unwrap();
    assert_eq!(fold(&expr, &interp).unwrap(), Value::Num(1.0));
}

#[test]
fn guard_passes_through_the_value_when_the_condition_holds() {
    let (s, interp) = surface_and_interp();
    let cond = s.literal(Value::Bool(true));
    let value = s.literal(Value::Num(42.0));
    let node = s.call("guard", vec![cond.into(), value.into()]).unwrap();
    let expr = exprgraph_compiler::elaborate(&node, s.registry()).unwrap();
    assert_eq!(fold(&expr, &interp).unwrap(), Value::Num(42.0));
}

#[test]
fn guard_fails_with_the_value_when_the_condition_does_not_hold() {
    let (s, interp) = surface_and_interp();
    let cond = s.literal(Value::Bool(false));
    let value = s.literal(Value::Num(42.0));
    let node = s.call("guard", vec![cond.into(), value.into()]).unwrap();
    let expr = exprgraph_compiler::elaborate(&node, s.registry()).unwrap();
    assert_eq!(fold(&expr, &interp).unwrap_err(), FoldError::UserError(Value::Num(42.0)));
}
