//! Plugin shape and the merge rules that build a [`Registry`](crate::registry::Registry)
//! from one or more plugins.
//!
//! A plugin only carries the *elaboration-time* surface here (constructors,
//! kind specs, trait instances, lift rules, structural shapes). The
//! *evaluation-time* half — the interpreter handlers a plugin provides for
//! its kinds — is a separate concern owned by `exprgraph-vm`, so that this
//! crate never needs to depend on the fold engine. A built-in plugin crate
//! (e.g. `exprgraph-stdlib`) implements both halves and wires them together
//! by kind name; see DESIGN.md "Plugin split across compiler/vm".

use indexmap::IndexMap;
use std::rc::Rc;

use exprgraph_core::TypeTag;
use exprgraph_graph::{Arg, CExprRef, Kind};

/// A constructor: given the args a host call site passed, builds a `CExpr`.
pub type CtorFn = Rc<dyn Fn(Vec<Arg>) -> CExprRef>;

/// Elaboration-time type information for one node kind.
#[derive(Clone, Debug, PartialEq)]
pub struct KindSpec {
    pub inputs: Vec<TypeTag>,
    pub output: TypeTag,
}

impl KindSpec {
    pub fn new(inputs: Vec<TypeTag>, output: TypeTag) -> Self {
        KindSpec { inputs, output }
    }
}

/// A trait's dispatch table: which kind to resolve to for each concrete
/// argument type tag.
#[derive(Clone, Debug)]
pub struct TraitSpec {
    pub output_type_tag: TypeTag,
    pub mapping: IndexMap<TypeTag, Kind>,
}

impl TraitSpec {
    pub fn new(output_type_tag: TypeTag, mapping: IndexMap<TypeTag, Kind>) -> Self {
        TraitSpec {
            output_type_tag,
            mapping,
        }
    }
}

/// A structural shape descriptor for kinds elaborated via "walk this value's
/// shape" rather than positional argument lists.
#[derive(Clone, Debug)]
pub enum ShapeDescriptor {
    /// Walk the value's own shape dynamically, with no further constraint.
    Dynamic,
    Seq(Vec<ShapeDescriptor>),
    Record(IndexMap<String, ShapeDescriptor>),
    Concrete(TypeTag),
}

/// A plugin's elaboration-time contribution.
#[derive(Clone)]
pub struct Plugin {
    pub name: String,
    pub ctors: IndexMap<String, CtorFn>,
    pub kinds: IndexMap<Kind, KindSpec>,
    /// Kinds this plugin owns, including ones with no `KindSpec` (e.g.
    /// internal bookkeeping kinds handled only at evaluation time).
    pub node_kinds: Vec<Kind>,
    pub traits: IndexMap<String, TraitSpec>,
    pub lifts: IndexMap<TypeTag, Kind>,
    pub shapes: IndexMap<Kind, ShapeDescriptor>,
}

impl Plugin {
    pub fn builder(name: impl Into<String>) -> PluginBuilder {
        PluginBuilder {
            plugin: Plugin {
                name: name.into(),
                ctors: IndexMap::new(),
                kinds: IndexMap::new(),
                node_kinds: Vec::new(),
                traits: IndexMap::new(),
                lifts: IndexMap::new(),
                shapes: IndexMap::new(),
            },
        }
    }
}

/// Fluent builder mirroring how the built-in plugins in `exprgraph-stdlib`
/// assemble their `Plugin` values.
pub struct PluginBuilder {
    plugin: Plugin,
}

impl PluginBuilder {
    pub fn ctor(mut self, name: impl Into<String>, f: impl Fn(Vec<Arg>) -> CExprRef + 'static) -> Self {
        self.plugin.ctors.insert(name.into(), Rc::new(f));
        self
    }

    pub fn kind(mut self, kind: impl Into<Kind>, spec: KindSpec) -> Self {
        let kind = kind.into();
        self.plugin.node_kinds.push(kind.clone());
        self.plugin.kinds.insert(kind, spec);
        self
    }

    /// Register a kind this plugin owns at evaluation time without an
    /// elaboration-time `KindSpec` (e.g. internal/variadic kinds).
    pub fn bare_kind(mut self, kind: impl Into<Kind>) -> Self {
        self.plugin.node_kinds.push(kind.into());
        self
    }

    pub fn trait_instance(mut self, name: impl Into<String>, spec: TraitSpec) -> Self {
        self.plugin.traits.insert(name.into(), spec);
        self
    }

    pub fn lift(mut self, tag: TypeTag, kind: impl Into<Kind>) -> Self {
        self.plugin.lifts.insert(tag, kind.into());
        self
    }

    pub fn shape(mut self, kind: impl Into<Kind>, shape: ShapeDescriptor) -> Self {
        self.plugin.shapes.insert(kind.into(), shape);
        self
    }

    pub fn build(self) -> Plugin {
        self.plugin
    }
}

#[cfg(test)]
mod plugin_tests {
    use super::*;
    use exprgraph_core::TypeTag;

    #[test]
    fn kind_registers_in_both_kinds_and_node_kinds() {
        let plugin = Plugin::builder("num")
            .kind("num/add", KindSpec::new(vec![TypeTag::new("num")], TypeTag::new("num")))
            .build();
        assert!(plugin.kinds.contains_key(&Kind::from("num/add")));
        assert!(plugin.node_kinds.contains(&"num/add".into()));
    }

    #[test]
    fn bare_kind_skips_kind_spec() {
        let plugin = Plugin::builder("state").bare_kind("st/let").build();
        assert!(plugin.node_kinds.contains(&"st/let".into()));
        assert!(!plugin.kinds.contains_key(&Kind::from("st/let")));
    }
}
