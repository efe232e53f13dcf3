//! The `$` constructor surface: the host-facing API for building `CExpr`
//! trees, backed by a composed [`Registry`].

use std::rc::Rc;

use exprgraph_graph::{Arg, CExpr, CExprRef, Kind};

use crate::capture::RecordingStack;
use crate::error::{CaptureError, ElaborateError};
use crate::registry::Registry;

/// Trait calls are built-dispatch-deferred: the concrete kind is not known
/// until elaboration sees each argument's resolved output type, so the `$`
/// surface tags them with this prefix rather than resolving them eagerly.
pub const TRAIT_PREFIX: &str = "trait/";

pub fn trait_call_kind(trait_name: &str) -> Kind {
    Kind::new(format!("{TRAIT_PREFIX}{trait_name}"))
}

/// Extract the trait name back out of a kind built by [`trait_call_kind`].
pub fn as_trait_call(kind: &Kind) -> Option<&str> {
    kind.as_str().strip_prefix(TRAIT_PREFIX)
}

/// The host-facing constructor surface produced by composing a set of
/// plugins. Cheap to clone: holds an `Rc<Registry>` internally.
#[derive(Clone)]
pub struct Surface {
    registry: Rc<Registry>,
    recording: Rc<RecordingStack>,
}

impl Surface {
    pub fn new(registry: Registry) -> Self {
        Surface {
            registry: Rc::new(registry),
            recording: Rc::new(RecordingStack::new()),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Invoke a plugin-registered constructor by name.
    pub fn call(&self, name: &str, args: Vec<Arg>) -> Result<CExprRef, ElaborateError> {
        let ctor = self
            .registry
            .ctor(name)
            .ok_or_else(|| ElaborateError::UnknownCtor(name.to_string()))?;
        let node = ctor(args);
        self.recording.observe(&node);
        Ok(node)
    }

    /// Invoke a trait by name, deferring concrete-kind dispatch to
    /// elaboration, which resolves it once each operand's output type is
    /// known.
    pub fn trait_call(&self, trait_name: &str, args: Vec<CExprRef>) -> Result<CExprRef, ElaborateError> {
        if !self.registry.trait_map.contains_key(trait_name) {
            return Err(ElaborateError::UnknownTrait(trait_name.to_string()));
        }
        let kind = trait_call_kind(trait_name);
        let node = CExpr::new(kind, args.into_iter().map(Arg::Expr).collect());
        self.recording.observe(&node);
        Ok(node)
    }

    /// Build a literal node directly from a value, bypassing the lift map.
    /// Needed for values no registered lift rule covers (lists, maps) —
    /// bare scalar primitives should go through a plugin's ctor instead, so
    /// they pick up that plugin's kind and trait instances.
    pub fn literal(&self, value: exprgraph_graph::Value) -> CExprRef {
        let node = CExpr::new(exprgraph_graph::kind::internal::LITERAL, vec![Arg::Prim(value)]);
        self.recording.observe(&node);
        node
    }

    /// Build an `input()` placeholder node, filled in later by
    /// `inject_input`.
    pub fn input(&self) -> CExprRef {
        let node = CExpr::new(exprgraph_graph::kind::internal::INPUT, vec![]);
        self.recording.observe(&node);
        node
    }

    /// Build a property-access node reading `field` off `target`'s output.
    pub fn access(&self, target: CExprRef, field: impl Into<String>) -> CExprRef {
        let node = CExpr::new(
            exprgraph_graph::kind::internal::ACCESS,
            vec![Arg::Expr(target), Arg::from(field.into())],
        );
        self.recording.observe(&node);
        node
    }

    /// Sequence `children`, evaluating each in order and taking the value
    /// of the last.
    pub fn begin(&self, children: Vec<CExprRef>) -> CExprRef {
        let node = CExpr::new(
            exprgraph_graph::kind::internal::BEGIN,
            children.into_iter().map(Arg::Expr).collect(),
        );
        self.recording.observe(&node);
        node
    }

    /// Build a placeholder that reads the value bound to `name` by the
    /// nearest enclosing binder (e.g. `control/each`'s per-iteration item).
    pub fn lambda_param(&self, name: impl Into<String>) -> CExprRef {
        let node = CExpr::new(
            exprgraph_graph::kind::internal::LAMBDA_PARAM,
            vec![Arg::from(name.into())],
        );
        self.recording.observe(&node);
        node
    }

    /// Run `build` under a fresh imperative-capture frame and validate
    /// that every node it constructed is reachable from the returned
    /// expression. Used by plugins (e.g. a `control` plugin's `each`)
    /// that let host code build a per-iteration fragment as an ordinary
    /// closure.
    pub fn record_block(&self, build: impl FnOnce() -> CExprRef) -> Result<CExprRef, CaptureError> {
        crate::capture::record_block(&self.recording, build)
    }
}

#[cfg(test)]
#[path = "ctors_tests.rs"]
mod ctors_tests;
