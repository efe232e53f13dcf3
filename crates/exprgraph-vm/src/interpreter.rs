//! Interpreter handler contract: what a plugin provides to evaluate the
//! kinds it owns.

use std::rc::Rc;

use indexmap::IndexMap;

use exprgraph_graph::{Kind, Value};

use crate::error::FoldError;
use crate::state::FoldState;

/// Evaluates a flat node whose children have already been evaluated
/// bottom-up, in `children[i]` order. Used for any kind that is a pure
/// function of its operands plus the fold state (arithmetic, string ops,
/// cell reads/writes, `fail`).
pub type PureHandler = Rc<dyn Fn(&[Value], &FoldState) -> Result<Value, FoldError>>;

/// Re-entrant evaluator handed to a [`LazyHandler`]: evaluates the flat
/// child at `index`, respecting volatility (a volatile child is
/// recomputed on every call, never cached).
pub type ChildEvaluator<'a> = dyn FnMut(usize) -> Result<Value, FoldError> + 'a;

/// Evaluates a flat node that needs control over *when* and *how many
/// times* its children run — looping constructs and `try`/`catch`, which
/// must not evaluate every child exactly once up front.
pub type LazyHandler = Rc<dyn Fn(&mut ChildEvaluator, usize, &FoldState) -> Result<Value, FoldError>>;

#[derive(Clone)]
pub enum Handler {
    Pure(PureHandler),
    Lazy(LazyHandler),
}

impl Handler {
    pub fn pure(f: impl Fn(&[Value], &FoldState) -> Result<Value, FoldError> + 'static) -> Self {
        Handler::Pure(Rc::new(f))
    }

    pub fn lazy(
        f: impl Fn(&mut ChildEvaluator, usize, &FoldState) -> Result<Value, FoldError> + 'static,
    ) -> Self {
        Handler::Lazy(Rc::new(f))
    }
}

/// The merged set of handlers a fold dispatches against, one per kind a
/// plugin's evaluation half registers.
#[derive(Clone, Default)]
pub struct Interpreter {
    handlers: IndexMap<Kind, Handler>,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter::default()
    }

    pub fn register(&mut self, kind: impl Into<Kind>, handler: Handler) -> &mut Self {
        self.handlers.insert(kind.into(), handler);
        self
    }

    pub fn merge(&mut self, other: Interpreter) -> &mut Self {
        for (kind, handler) in other.handlers {
            self.handlers.insert(kind, handler);
        }
        self
    }

    pub fn get(&self, kind: &Kind) -> Option<&Handler> {
        self.handlers.get(kind)
    }
}

#[cfg(test)]
mod interpreter_tests {
    use super::*;

    #[test]
    fn register_and_get_round_trip() {
        let mut interp = Interpreter::new();
        interp.register("num/add", Handler::pure(|args, _| Ok(Value::Num(args[0].as_num().unwrap() + args[1].as_num().unwrap()))));
        assert!(interp.get(&"num/add".into()).is_some());
        assert!(interp.get(&"num/mul".into()).is_none());
    }

    #[test]
    fn merge_keeps_both_and_later_wins() {
        let mut a = Interpreter::new();
        a.register("x", Handler::pure(|_, _| Ok(Value::Num(1.0))));
        let mut b = Interpreter::new();
        b.register("x", Handler::pure(|_, _| Ok(Value::Num(2.0))));
        b.register("y", Handler::pure(|_, _| Ok(Value::Num(3.0))));
        a.merge(b);
        assert!(a.get(&"y".into()).is_some());
        let state = FoldState::new();
        if let Handler::Pure(f) = a.get(&"x".into()).unwrap() {
            assert_eq!(f(&[], &state).unwrap(), Value::Num(2.0));
        } else {
            panic!("expected pure handler");
        }
    }
}
