use super::*;
use exprgraph_compiler::{compose, Surface};
use exprgraph_vm::fold;

fn surface_and_interp() -> (Surface, Interpreter) {
    let registry = compose(&[plugin(), crate::state::plugin()]).unwrap();
    let mut interp = interpreter();
    interp.merge(crate::state::interpreter());
    (Surface::new(registry), interp)
}

#[test]
fn while_loops_until_the_condition_goes_false() {
    let (s, interp) = surface_and_interp();
    let zero = s.literal(Value::Num(0.0));
    let counter = s.call("let", vec![zero.into()]).unwrap();
    let flag_init = s.literal(Value::Bool(true));
    let flag = s.call("let", vec![flag_init.into()]).unwrap();

    let one = s.literal(Value::Num(1.0));
    let bump = s.call("set", vec![counter.clone().into(), one.into()]).unwrap();
    let false_value = s.literal(Value::Bool(false));
    let stop = s.call("set", vec![flag.clone().into(), false_value.into()]).unwrap();
    let body = s.call("par", vec![bump.into(), stop.into()]).unwrap();
    let cond = s.call("get", vec![flag.into()]).unwrap();
    let while_node = s.call("while", vec![cond.into(), body.into()]).unwrap();
    let read = s.call("get", vec![counter.into()]).unwrap();
    let node = s.begin(vec![while_node, read]);
    let expr = exprgraph_compiler::elaborate(&node, s.registry()).unwrap();
    assert_eq!(fold(&expr, &interp).unwrap(), Value::Num(1.0));
}

#[test]
fn each_collects_one_result_per_item() {
    let (s, interp) = surface_and_interp();
    let items = s.literal(Value::List(vec![Value::Num(1.0), Value::Num(2.0), Value::Num(3.0)]));
    let each_node = each(&s, "item", items, |item| item).unwrap();
    let expr = exprgraph_compiler::elaborate(&each_node, s.registry()).unwrap();
    assert_eq!(
        fold(&expr, &interp).unwrap(),
        Value::List(vec![Value::Num(1.0), Value::Num(2.0), Value::Num(3.0)])
    );
}

#[test]
fn par_sequences_and_returns_the_last_value() {
    let (s, interp) = surface_and_interp();
    let one = s.literal(Value::Num(1.0));
    let cell = s.call("let", vec![one.into()]).unwrap();
    let two = s.literal(Value::Num(2.0));
    let write = s.call("set", vec![cell.clone().into(), two.into()]).unwrap();
    let read = s.call("get", vec![cell.into()]).unwrap();
    let node = s.call("par", vec![write.into(), read.into()]).unwrap();
    let expr = exprgraph_compiler::elaborate(&node, s.registry()).unwrap();
    assert_eq!(fold(&expr, &interp).unwrap(), Value::Num(2.0));
}
