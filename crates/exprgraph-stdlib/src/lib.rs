//! Built-in plugins: numeric and string operations, mutable cells,
//! error handling, and loop/sequencing control.
//!
//! Each module contributes a `plugin()` (the elaboration-time surface:
//! constructors, kind specs, lift rules, trait instances) and, except for
//! `control`'s engine-core kinds, an `interpreter()` (the matching
//! evaluation-time handlers). The two halves are bridged purely by
//! agreeing on kind-name strings (`"num/add"`, `"st/let"`, ...); see
//! DESIGN.md "Plugin split across compiler/vm".

pub mod control;
pub mod errors;
pub mod num;
pub mod state;
pub mod strings;

use exprgraph_compiler::{compose, Plugin, RegistryError};
use exprgraph_vm::Interpreter;

/// Every built-in plugin, in the order `all()` composes them.
pub fn plugins() -> Vec<Plugin> {
    vec![num::plugin(), strings::plugin(), state::plugin(), errors::plugin(), control::plugin()]
}

/// Compose every built-in plugin into one registry, and merge every
/// built-in interpreter into one `Interpreter`. The pairing mirrors
/// `plugins()`'s composition order, so a kind a later plugin redefines
/// gets both halves from that same plugin.
pub fn all() -> Result<(exprgraph_compiler::Registry, Interpreter), RegistryError> {
    let registry = compose(&plugins())?;
    let mut interp = Interpreter::new();
    interp.merge(num::interpreter());
    interp.merge(strings::interpreter());
    interp.merge(state::interpreter());
    interp.merge(errors::interpreter());
    interp.merge(control::interpreter());
    Ok((registry, interp))
}

#[cfg(test)]
mod lib_tests {
    use super::*;
    use exprgraph_compiler::Surface;
    use exprgraph_graph::Value;
    use exprgraph_vm::fold;

    #[test]
    fn all_composes_without_conflicts() {
        assert!(all().is_ok());
    }

    /// `num` and `str` both contribute a `show` ctor under the same name,
    /// so composing every built-in plugin picks whichever registered
    /// last for that bare name (documented "later plugin wins" ctor
    /// behavior). Dispatching by argument type instead of ctor name is
    /// exactly what `trait_call` is for, so mixed-type code should use
    /// it rather than the bare ctor name once more than one plugin
    /// contributes the same trait.
    #[test]
    fn trait_call_dispatches_show_by_argument_type_across_plugins() {
        let (registry, interp) = all().unwrap();
        let s = Surface::new(registry);
        let sum = s.call("add", vec![1.0.into(), 2.0.into()]).unwrap();
        let shown = s.trait_call("show", vec![sum]).unwrap();
        let expr = exprgraph_compiler::elaborate(&shown, s.registry()).unwrap();
        assert_eq!(fold(&expr, &interp).unwrap(), Value::Str("3".to_string()));

        let greeting = s.literal(Value::Str("hi".to_string()));
        let shown_str = s.trait_call("show", vec![greeting]).unwrap();
        let expr = exprgraph_compiler::elaborate(&shown_str, s.registry()).unwrap();
        assert_eq!(fold(&expr, &interp).unwrap(), Value::Str("hi".to_string()));
    }
}
