use super::*;
use crate::plugin::{KindSpec, Plugin};
use exprgraph_core::TypeTag;

const NUM: TypeTag = TypeTag::new("num");

fn num_plugin() -> Plugin {
    Plugin::builder("num")
        .kind("num/add", KindSpec::new(vec![NUM, NUM], NUM))
        .lift(NUM, "core/literal")
        .build()
}

#[test]
fn compose_merges_ctors_and_kinds() {
    let registry = compose(&[num_plugin()]).unwrap();
    assert!(registry.kind_spec(&"num/add".into()).is_some());
    assert_eq!(registry.lift_kind(NUM), Some(&"core/literal".into()));
}

#[test]
fn compose_detects_incompatible_kind_conflict() {
    let other = Plugin::builder("other")
        .kind("num/add", KindSpec::new(vec![NUM], NUM))
        .build();
    let err = compose(&[num_plugin(), other]).unwrap_err();
    assert!(matches!(err, RegistryError::PluginConflict { .. }));
}

#[test]
fn compose_allows_identical_kind_spec_from_two_plugins() {
    let dup = Plugin::builder("num2")
        .kind("num/add", KindSpec::new(vec![NUM, NUM], NUM))
        .build();
    let registry = compose(&[num_plugin(), dup]).unwrap();
    assert!(registry.kind_spec(&"num/add".into()).is_some());
}

#[test]
fn later_plugin_wins_for_lifts() {
    let first = Plugin::builder("a").lift(NUM, "a/lit").build();
    let second = Plugin::builder("b").lift(NUM, "b/lit").build();
    let registry = compose(&[first, second]).unwrap();
    assert_eq!(registry.lift_kind(NUM), Some(&"b/lit".into()));
}
