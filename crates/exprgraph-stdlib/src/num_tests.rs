use super::*;
use exprgraph_compiler::{compose, Surface};
use exprgraph_vm::fold;

fn surface_and_interp() -> (Surface, Interpreter) {
    let registry = compose(&[plugin()]).unwrap();
    (Surface::new(registry), interpreter())
}

#[test]
fn add_elaborates_and_folds() {
    let (s, interp) = surface_and_interp();
    let node = s.call("add", vec![2.0.into(), 3.0.into()]).unwrap();
    let expr = exprgraph_compiler::elaborate(&node, s.registry()).unwrap();
    assert_eq!(fold(&expr, &interp).unwrap(), Value::Num(5.0));
}

#[test]
fn eq_trait_dispatches_to_num_eq() {
    let (s, interp) = surface_and_interp();
    let a = s.call("add", vec![1.0.into(), 1.0.into()]).unwrap();
    let b = s.call("add", vec![0.0.into(), 2.0.into()]).unwrap();
    let node = s.trait_call("eq", vec![a, b]).unwrap();
    let expr = exprgraph_compiler::elaborate(&node, s.registry()).unwrap();
    assert_eq!(fold(&expr, &interp).unwrap(), Value::Bool(true));
}

#[test]
fn show_formats_a_number_as_a_string() {
    let (s, interp) = surface_and_interp();
    let node = s.call("show", vec![42.0.into()]).unwrap();
    let expr = exprgraph_compiler::elaborate(&node, s.registry()).unwrap();
    assert_eq!(fold(&expr, &interp).unwrap(), Value::Str("42".into()));
}
