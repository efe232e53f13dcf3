use super::*;
use exprgraph_compiler::{compose, Surface};
use exprgraph_vm::fold;

fn surface_and_interp() -> (Surface, Interpreter) {
    let registry = compose(&[plugin()]).unwrap();
    (Surface::new(registry), interpreter())
}

#[test]
fn let_then_get_round_trips_the_initial_value() {
    let (s, interp) = surface_and_interp();
    let five = s.literal(Value::Num(5.0));
    let cell = s.call("let", vec![five.into()]).unwrap();
    let node = s.call("get", vec![cell.into()]).unwrap();
    let expr = exprgraph_compiler::elaborate(&node, s.registry()).unwrap();
    assert_eq!(fold(&expr, &interp).unwrap(), Value::Num(5.0));
}

#[test]
fn set_then_get_through_the_same_shared_cell_sees_the_write() {
    let (s, interp) = surface_and_interp();
    let zero = s.literal(Value::Num(0.0));
    let nine = s.literal(Value::Num(9.0));
    let cell = s.call("let", vec![zero.into()]).unwrap();
    let write = s.call("set", vec![cell.clone().into(), nine.into()]).unwrap();
    let read = s.call("get", vec![cell.into()]).unwrap();
    let node = s.begin(vec![write, read]);
    let expr = exprgraph_compiler::elaborate(&node, s.registry()).unwrap();
    assert_eq!(fold(&expr, &interp).unwrap(), Value::Num(9.0));
}

#[test]
fn push_appends_to_a_list_cell() {
    let (s, interp) = surface_and_interp();
    let empty = s.literal(Value::List(vec![]));
    let one = s.literal(Value::Num(1.0));
    let two = s.literal(Value::Num(2.0));
    let cell = s.call("let", vec![empty.into()]).unwrap();
    let first = s.call("push", vec![cell.clone().into(), one.into()]).unwrap();
    let second = s.call("push", vec![cell.clone().into(), two.into()]).unwrap();
    let read = s.call("get", vec![cell.into()]).unwrap();
    let node = s.begin(vec![first, second, read]);
    let expr = exprgraph_compiler::elaborate(&node, s.registry()).unwrap();
    assert_eq!(
        fold(&expr, &interp).unwrap(),
        Value::List(vec![Value::Num(1.0), Value::Num(2.0)])
    );
}
