//! Cooperative fold engine.
//!
//! Evaluation is a memoized post-order walk: [`Stepper::eval`] takes `&self`
//! (all mutable state lives behind `RefCell`), so a [`interpreter::LazyHandler`](crate::interpreter)
//! can recursively call back into the same `Stepper` to evaluate its
//! children on demand — which `try`/`catch` needs to catch a child's error
//! without aborting the whole fold, and which control/while`/`control/each`
//! need to re-run a subgraph once per loop iteration.
//!
//! Looping kinds cannot simply memoize their children's results once: a
//! child whose value depends on mutable cell state must be recomputed
//! every time it's visited. [`compute_volatile`] tags every node that is
//! itself a stateful/control kind, or that transitively depends on one, so
//! [`Stepper::eval`] can skip the memo cache for exactly those nodes.
//!
//! An unresolved `core/input` node aborts the walk with
//! [`FoldError::UnresolvedInput`] instead of panicking or blocking; `tick`
//! turns that into [`Yield::NeedInput`] so a caller can supply the value
//! and retry. Retrying re-walks from the root, but every already-resolved
//! non-volatile node is an instant memo hit, so this costs no more than a
//! true suspended coroutine would.
//!
//! A node under the `effect/*` namespace with no registered interpreter
//! handler gets the same treatment: evaluation captures its already-folded
//! arguments and the [`StepContext`] (depth, ancestor path, parent) it was
//! reached at, aborts with [`FoldError::ExternalEffect`], and `tick` turns
//! that into [`Yield::Effect`]. [`run_with_handler`] delegates both kinds of
//! yield to a caller-supplied [`StepHandler`] — `provide_input` for missing
//! inputs, `handle_effect` for everything an SDK-adapter-style plugin would
//! hand off to a real collaborator (an HTTP call, a queue, anything outside
//! the graph).

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use exprgraph_core::NodeId;
use exprgraph_graph::kind::internal;
use exprgraph_graph::{ChildRef, Kind, NExpr, NodeEntry, Value};

use crate::error::FoldError;
use crate::interpreter::{Handler, Interpreter};
use crate::state::FoldState;

fn is_inherently_volatile(kind: &Kind) -> bool {
    let s = kind.as_str();
    // "st/let" allocates its cell once and is safe to memoize like any
    // other node; every other "st/*" kind reads or mutates a cell and
    // must be re-run on every reference.
    (s.starts_with("st/") && s != "st/let") || s.starts_with("control/") || s == internal::LAMBDA_PARAM
}

/// Compute the set of nodes that must never be memoized: stateful/control
/// kinds and anything that transitively reaches one through its children.
///
/// Assumes `expr.adj`'s iteration order lists every node after its
/// children — true of every `NExpr` this workspace produces, since the
/// elaborator inserts children before parents and graph algebra only
/// filters or appends, never reorders existing entries.
fn compute_volatile(expr: &NExpr) -> HashSet<NodeId> {
    let mut volatile = HashSet::new();
    for (id, entry) in &expr.adj {
        let tainted = is_inherently_volatile(&entry.kind)
            || entry.children.ids().any(|child| volatile.contains(child));
        if tainted {
            volatile.insert(id.clone());
        }
    }
    volatile
}

/// Kinds under this namespace have no interpreter handler by design — they
/// represent collaboration with something outside the graph (an HTTP call,
/// an SDK adapter, anything a `StepHandler` supplies) and are delegated to
/// it instead of failing with `NoHandler`.
const EFFECT_PREFIX: &str = "effect/";

fn is_effect_kind(kind: &Kind) -> bool {
    kind.as_str().starts_with(EFFECT_PREFIX)
}

/// Where in the walk a yield happened: how deep, the ancestor chain from
/// the root (exclusive of the yielding node), and the immediate parent.
#[derive(Clone)]
struct StepLocation {
    depth: usize,
    path: Vec<NodeId>,
    parent_node: Option<NodeId>,
}

/// What an unhandled `effect/*` node was asked to do, captured at the point
/// evaluation reached it so a [`StepHandler`] can see the node's own
/// arguments without re-walking the graph.
struct PendingEffect {
    kind: Kind,
    args: Vec<Value>,
    location: StepLocation,
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Unit => false,
        Value::Bool(b) => *b,
        Value::Num(n) => *n != 0.0,
        Value::Str(s) => !s.is_empty(),
        Value::List(items) => !items.is_empty(),
        Value::Map(map) => !map.is_empty(),
    }
}

/// What one [`Stepper::tick`] produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Yield {
    Done(Value),
    NeedInput(NodeId),
    Effect(NodeId),
}

/// Drives one fold over one `NExpr`. Not reused across folds — construct a
/// fresh `Stepper` (or call [`fold`]/[`run_with_handler`]) per evaluation.
pub struct Stepper<'e> {
    expr: &'e NExpr,
    interpreter: &'e Interpreter,
    memo: RefCell<HashMap<NodeId, Value>>,
    volatile: HashSet<NodeId>,
    state: FoldState,
    path: RefCell<Vec<NodeId>>,
    pending_effects: RefCell<HashMap<NodeId, PendingEffect>>,
    pending_inputs: RefCell<HashMap<NodeId, StepLocation>>,
}

impl<'e> Stepper<'e> {
    pub fn new(expr: &'e NExpr, interpreter: &'e Interpreter) -> Self {
        Stepper {
            expr,
            interpreter,
            memo: RefCell::new(HashMap::new()),
            volatile: compute_volatile(expr),
            state: FoldState::new(),
            path: RefCell::new(Vec::new()),
            pending_effects: RefCell::new(HashMap::new()),
            pending_inputs: RefCell::new(HashMap::new()),
        }
    }

    fn current_location(&self) -> StepLocation {
        let path = self.path.borrow();
        let depth = path.len().saturating_sub(1);
        let parent_node = if path.len() >= 2 { Some(path[path.len() - 2].clone()) } else { None };
        StepLocation { depth, path: path.clone(), parent_node }
    }

    pub fn state(&self) -> &FoldState {
        &self.state
    }

    /// Drive evaluation until it finishes, needs an input value, or reaches
    /// an unhandled `effect/*` node.
    pub fn tick(&self) -> Result<Yield, FoldError> {
        match self.eval(&self.expr.root_id) {
            Ok(v) => Ok(Yield::Done(v)),
            Err(FoldError::UnresolvedInput(id)) => Ok(Yield::NeedInput(id)),
            Err(FoldError::ExternalEffect(id)) => Ok(Yield::Effect(id)),
            Err(e) => Err(e),
        }
    }

    /// Supply the value for a `core/input` node, or the result of an
    /// external effect, that a previous `tick` yielded.
    pub fn resume(&self, node: NodeId, value: Value) {
        self.pending_effects.borrow_mut().remove(&node);
        self.pending_inputs.borrow_mut().remove(&node);
        self.memo.borrow_mut().insert(node, value);
    }

    /// The captured effect payload and context for a node a previous `tick`
    /// yielded as [`Yield::Effect`]. Panics if `node` is not a pending effect
    /// — only call this immediately after receiving that yield for `node`.
    fn take_pending_effect(&self, node: &NodeId) -> PendingEffect {
        self.pending_effects
            .borrow_mut()
            .remove(node)
            .unwrap_or_else(|| panic!("node {node:?} is not a pending external effect"))
    }

    /// The captured context for a node a previous `tick` yielded as
    /// [`Yield::NeedInput`].
    fn pending_input_location(&self, node: &NodeId) -> StepLocation {
        self.pending_inputs
            .borrow()
            .get(node)
            .cloned()
            .unwrap_or_else(|| StepLocation { depth: 0, path: Vec::new(), parent_node: None })
    }

    fn eval(&self, id: &NodeId) -> Result<Value, FoldError> {
        if let Some(v) = self.memo.borrow().get(id) {
            return Ok(v.clone());
        }
        let entry = self
            .expr
            .get(id)
            .unwrap_or_else(|| panic!("node {id:?} missing from adjacency map (invariant 1)"));
        self.path.borrow_mut().push(id.clone());
        let result = self.eval_entry(id, entry);
        if let Err(FoldError::UnresolvedInput(ref unresolved)) = result {
            if unresolved == id {
                self.pending_inputs.borrow_mut().insert(id.clone(), self.current_location());
            }
        }
        self.path.borrow_mut().pop();
        let value = result?;
        if !self.volatile.contains(id) {
            self.memo.borrow_mut().insert(id.clone(), value.clone());
        }
        Ok(value)
    }

    fn eval_entry(&self, id: &NodeId, entry: &NodeEntry) -> Result<Value, FoldError> {
        match entry.kind.as_str() {
            internal::LITERAL => Ok(entry.out.clone().unwrap_or(Value::Unit)),
            internal::INPUT => entry
                .out
                .clone()
                .ok_or_else(|| FoldError::UnresolvedInput(id.clone())),
            internal::ACCESS => self.eval_access(id, entry),
            internal::BEGIN => self.eval_begin(entry),
            internal::LAMBDA_PARAM => self.eval_lambda_param(entry),
            "control/while" => self.eval_while(id, entry),
            "control/each" => self.eval_each(id, entry),
            _ => self.eval_dispatched(id, entry),
        }
    }

    fn flat_child_id<'a>(&self, entry: &'a NodeEntry, index: usize) -> Option<&'a NodeId> {
        entry.flat_children().get(index).and_then(ChildRef::as_id)
    }

    fn eval_access(&self, id: &NodeId, entry: &NodeEntry) -> Result<Value, FoldError> {
        let target_id = self.flat_child_id(entry, 0).ok_or_else(|| FoldError::ArityMismatch {
            node: id.clone(),
            expected: 2,
            found: entry.flat_children().len(),
        })?;
        let field_id = self.flat_child_id(entry, 1).ok_or_else(|| FoldError::ArityMismatch {
            node: id.clone(),
            expected: 2,
            found: entry.flat_children().len(),
        })?;
        let target = self.eval(target_id)?;
        let field = self.eval(field_id)?;
        let Value::Str(name) = field else {
            return Err(FoldError::ShapeMismatch {
                node: id.clone(),
                expected: "string field name",
                found: field,
            });
        };
        match target {
            Value::Map(map) => Ok(map.get(&name).cloned().unwrap_or(Value::Unit)),
            other => Err(FoldError::ShapeMismatch {
                node: id.clone(),
                expected: "map",
                found: other,
            }),
        }
    }

    fn eval_begin(&self, entry: &NodeEntry) -> Result<Value, FoldError> {
        let mut last = Value::Unit;
        for child in entry.flat_children() {
            for id in child.ids() {
                last = self.eval(id)?;
            }
        }
        Ok(last)
    }

    fn eval_lambda_param(&self, entry: &NodeEntry) -> Result<Value, FoldError> {
        let name = match &entry.out {
            Some(Value::Str(s)) => s.clone(),
            _ => String::new(),
        };
        self.state.local(&name).ok_or(FoldError::UnboundParam(name))
    }

    fn eval_while(&self, id: &NodeId, entry: &NodeEntry) -> Result<Value, FoldError> {
        let cond_id = self.flat_child_id(entry, 0).ok_or_else(|| FoldError::ArityMismatch {
            node: id.clone(),
            expected: 2,
            found: entry.flat_children().len(),
        })?;
        let body_id = self.flat_child_id(entry, 1).ok_or_else(|| FoldError::ArityMismatch {
            node: id.clone(),
            expected: 2,
            found: entry.flat_children().len(),
        })?;
        while truthy(&self.eval(cond_id)?) {
            self.eval(body_id)?;
        }
        Ok(Value::Unit)
    }

    fn eval_each(&self, id: &NodeId, entry: &NodeEntry) -> Result<Value, FoldError> {
        let iterable_id = self.flat_child_id(entry, 0).ok_or_else(|| FoldError::ArityMismatch {
            node: id.clone(),
            expected: 3,
            found: entry.flat_children().len(),
        })?;
        let param_id = self.flat_child_id(entry, 1).ok_or_else(|| FoldError::ArityMismatch {
            node: id.clone(),
            expected: 3,
            found: entry.flat_children().len(),
        })?;
        let body_id = self.flat_child_id(entry, 2).ok_or_else(|| FoldError::ArityMismatch {
            node: id.clone(),
            expected: 3,
            found: entry.flat_children().len(),
        })?;

        let items = match self.eval(iterable_id)? {
            Value::List(items) => items,
            other => {
                return Err(FoldError::ShapeMismatch {
                    node: id.clone(),
                    expected: "list",
                    found: other,
                })
            }
        };
        let Value::Str(name) = self.eval(param_id)? else {
            return Err(FoldError::ShapeMismatch {
                node: id.clone(),
                expected: "string parameter name",
                found: Value::Unit,
            });
        };

        let mut results = Vec::with_capacity(items.len());
        for item in items {
            self.state.bind_local(&name, item);
            results.push(self.eval(body_id)?);
        }
        self.state.unbind_local(&name);
        Ok(Value::List(results))
    }

    fn eval_dispatched(&self, id: &NodeId, entry: &NodeEntry) -> Result<Value, FoldError> {
        let handler = match self.interpreter.get(&entry.kind) {
            Some(handler) => handler,
            None if is_effect_kind(&entry.kind) => return self.yield_effect(id, entry),
            None => return Err(FoldError::NoHandler(entry.kind.clone())),
        };
        let flat = entry.flat_children();
        match handler {
            Handler::Pure(f) => {
                let mut values = Vec::with_capacity(flat.len());
                for child in flat {
                    for id in child.ids() {
                        values.push(self.eval(id)?);
                    }
                }
                f(&values, &self.state)
            }
            Handler::Lazy(f) => {
                let ids: Vec<NodeId> = flat.iter().flat_map(|c| c.ids().cloned()).collect();
                let mut evaluator = |index: usize| -> Result<Value, FoldError> {
                    let id = ids.get(index).ok_or_else(|| FoldError::ArityMismatch {
                        node: ids.first().cloned().unwrap_or_else(NodeId::first),
                        expected: index + 1,
                        found: ids.len(),
                    })?;
                    self.eval(id)
                };
                f(&mut evaluator, ids.len(), &self.state)
            }
        }
    }

    /// Evaluate `entry`'s own children, capture them alongside the path
    /// context a `StepHandler` needs, and bubble `ExternalEffect` so `tick`
    /// can surface it as [`Yield::Effect`].
    fn yield_effect(&self, id: &NodeId, entry: &NodeEntry) -> Result<Value, FoldError> {
        let mut args = Vec::new();
        for child in entry.flat_children() {
            for child_id in child.ids() {
                args.push(self.eval(child_id)?);
            }
        }
        self.pending_effects.borrow_mut().insert(
            id.clone(),
            PendingEffect {
                kind: entry.kind.clone(),
                args,
                location: self.current_location(),
            },
        );
        Err(FoldError::ExternalEffect(id.clone()))
    }
}

/// Evaluate `expr` to completion. Fails with [`FoldError::UnresolvedInput`]
/// if any reachable `core/input` node has no injected value, or with
/// [`FoldError::ExternalEffect`] if it reaches an unhandled `effect/*` node
/// — use [`run_with_handler`] to supply inputs and effects interactively
/// instead.
pub fn fold(expr: &NExpr, interpreter: &Interpreter) -> Result<Value, FoldError> {
    let stepper = Stepper::new(expr, interpreter);
    match stepper.tick()? {
        Yield::Done(v) => Ok(v),
        Yield::NeedInput(id) => Err(FoldError::UnresolvedInput(id)),
        Yield::Effect(id) => Err(FoldError::ExternalEffect(id)),
    }
}

/// Context surrounding a yielded node: how deep it sits, the chain of
/// ancestor IDs from the root (exclusive of the node itself), and its
/// immediate parent, if any.
pub struct StepContext<'a> {
    pub node: &'a NodeId,
    pub depth: usize,
    pub path: &'a [NodeId],
    pub parent_node: Option<&'a NodeId>,
}

/// The payload of an external effect: an unhandled node's kind and its
/// already-evaluated argument values, in child order.
pub struct StepEffect<'a> {
    pub kind: &'a Kind,
    pub args: &'a [Value],
}

/// External-effect contract for stepwise evaluation. `S` is whatever state
/// the host needs threaded between yields (an input cursor, a mock
/// fixture, a live I/O handle).
pub trait StepHandler<S> {
    fn provide_input(&mut self, ctx: &StepContext, state: &mut S) -> Result<Value, FoldError>;

    /// Resolve an `effect/*` node the interpreter has no handler for. The
    /// default rejects every effect with `NoHandler` — override it to
    /// collaborate with whatever external system the effect's kind names.
    fn handle_effect(
        &mut self,
        effect: &StepEffect,
        _ctx: &StepContext,
        _state: &mut S,
    ) -> Result<Value, FoldError> {
        Err(FoldError::NoHandler(effect.kind.clone()))
    }
}

/// Evaluate `expr`, calling `handler` each time the fold needs a `core/input`
/// value or reaches an unhandled external effect, until the fold completes.
pub fn run_with_handler<S>(
    expr: &NExpr,
    interpreter: &Interpreter,
    handler: &mut impl StepHandler<S>,
    state: &mut S,
) -> Result<Value, FoldError> {
    let stepper = Stepper::new(expr, interpreter);
    loop {
        match stepper.tick()? {
            Yield::Done(v) => return Ok(v),
            Yield::NeedInput(id) => {
                let location = stepper.pending_input_location(&id);
                let ctx = StepContext {
                    node: &id,
                    depth: location.depth,
                    path: &location.path,
                    parent_node: location.parent_node.as_ref(),
                };
                let value = handler.provide_input(&ctx, state)?;
                log::trace!("resumed {id:?} with a supplied input value");
                stepper.resume(id, value);
            }
            Yield::Effect(id) => {
                let pending = stepper.take_pending_effect(&id);
                let effect = StepEffect {
                    kind: &pending.kind,
                    args: &pending.args,
                };
                let ctx = StepContext {
                    node: &id,
                    depth: pending.location.depth,
                    path: &pending.location.path,
                    parent_node: pending.location.parent_node.as_ref(),
                };
                let value = handler.handle_effect(&effect, &ctx, state)?;
                log::trace!("resumed {id:?} with an externally supplied effect result");
                stepper.resume(id, value);
            }
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
