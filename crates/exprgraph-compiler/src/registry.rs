//! Plugin composition: merges one or more [`Plugin`]s into a single
//! [`Registry`] the elaborator dispatches against.

use indexmap::IndexMap;

use exprgraph_core::TypeTag;
use exprgraph_graph::Kind;

use crate::error::RegistryError;
use crate::plugin::{CtorFn, KindSpec, Plugin, ShapeDescriptor, TraitSpec};

/// The merged runtime dispatch surface built once from a set of plugins.
///
/// Holds exactly what the constructor surface needs: a combined
/// constructor table, lift rules from host type tag to lifting kind, trait
/// dispatch tables, and per-kind type specs. `kind_inputs`/`kind_outputs`
/// are accessor methods over `kind_specs` rather than separately stored
/// maps, since they are pure projections of the same data.
pub struct Registry {
    pub ctors: IndexMap<String, CtorFn>,
    pub kind_specs: IndexMap<Kind, KindSpec>,
    pub trait_map: IndexMap<String, TraitSpec>,
    pub lift_map: IndexMap<TypeTag, Kind>,
    pub shapes: IndexMap<Kind, ShapeDescriptor>,
    /// Every kind any plugin claims ownership of, including kinds with no
    /// `KindSpec` — used by imperative capture's orphan-reachability check
    /// to tell "a node this registry knows about" from a stray/internal one.
    pub known_kinds: IndexMap<Kind, String>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("ctors", &self.ctors.keys().collect::<Vec<_>>())
            .field("kind_specs", &self.kind_specs)
            .field("trait_map", &self.trait_map)
            .field("lift_map", &self.lift_map)
            .field("shapes", &self.shapes)
            .field("known_kinds", &self.known_kinds)
            .finish()
    }
}

impl Registry {
    pub fn ctor(&self, name: &str) -> Option<&CtorFn> {
        self.ctors.get(name)
    }

    pub fn kind_spec(&self, kind: &Kind) -> Option<&KindSpec> {
        self.kind_specs.get(kind)
    }

    pub fn kind_inputs(&self, kind: &Kind) -> Option<&[TypeTag]> {
        self.kind_specs.get(kind).map(|spec| spec.inputs.as_slice())
    }

    pub fn kind_output(&self, kind: &Kind) -> Option<TypeTag> {
        self.kind_specs.get(kind).map(|spec| spec.output)
    }

    pub fn trait_spec(&self, name: &str) -> Option<&TraitSpec> {
        self.trait_map.get(name)
    }

    pub fn lift_kind(&self, tag: TypeTag) -> Option<&Kind> {
        self.lift_map.get(&tag)
    }

    pub fn shape(&self, kind: &Kind) -> Option<&ShapeDescriptor> {
        self.shapes.get(kind)
    }
}

/// Merge `plugins` in order into one [`Registry`].
///
/// Constructors, lift rules, and shapes follow "later plugin wins":
/// iterating in order and overwriting earlier entries. Trait instances
/// merge per type tag instead of overwriting wholesale, so a `num`
/// plugin and a `str` plugin can each contribute their own `eq` mapping
/// without one shadowing the other; only a tag both plugins map follows
/// later-wins. Kind specs are stricter still — two plugins may both
/// contribute a kind only if their `KindSpec`s agree, otherwise this
/// fails with [`RegistryError::PluginConflict`], since a silent override
/// there would let one plugin's type contract for a kind silently
/// replace another's.
pub fn compose(plugins: &[Plugin]) -> Result<Registry, RegistryError> {
    let mut ctors = IndexMap::new();
    let mut kind_specs: IndexMap<Kind, KindSpec> = IndexMap::new();
    let mut trait_map = IndexMap::new();
    let mut lift_map = IndexMap::new();
    let mut shapes = IndexMap::new();
    let mut known_kinds: IndexMap<Kind, String> = IndexMap::new();
    let mut kind_spec_owner: IndexMap<Kind, String> = IndexMap::new();

    for plugin in plugins {
        for (name, ctor) in &plugin.ctors {
            ctors.insert(name.clone(), ctor.clone());
        }
        for (tag, kind) in &plugin.lifts {
            lift_map.insert(*tag, kind.clone());
        }
        for (name, spec) in &plugin.traits {
            let entry = trait_map
                .entry(name.clone())
                .or_insert_with(|| TraitSpec::new(spec.output_type_tag, IndexMap::new()));
            entry.output_type_tag = spec.output_type_tag;
            for (tag, kind) in &spec.mapping {
                entry.mapping.insert(*tag, kind.clone());
            }
        }
        for (kind, shape) in &plugin.shapes {
            shapes.insert(kind.clone(), shape.clone());
        }
        for (kind, spec) in &plugin.kinds {
            if let Some(existing) = kind_specs.get(kind) {
                if existing != spec {
                    return Err(RegistryError::PluginConflict {
                        kind: kind.clone(),
                        first: kind_spec_owner.get(kind).cloned().unwrap_or_default(),
                        second: plugin.name.clone(),
                    });
                }
            }
            kind_specs.insert(kind.clone(), spec.clone());
            kind_spec_owner.insert(kind.clone(), plugin.name.clone());
        }
        for kind in &plugin.node_kinds {
            if let Some(owner) = known_kinds.get(kind) {
                if owner != &plugin.name {
                    log::debug!(
                        "kind {kind:?} claimed by both {owner:?} and {:?}",
                        plugin.name
                    );
                }
            }
            known_kinds.insert(kind.clone(), plugin.name.clone());
        }
    }

    Ok(Registry {
        ctors,
        kind_specs,
        trait_map,
        lift_map,
        shapes,
        known_kinds,
    })
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;
