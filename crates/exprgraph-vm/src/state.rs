//! Per-fold mutable state: cell storage for the `state` plugin's
//! `st/let`/`st/set`/`st/get`/`st/push` kinds, the LIFO error stack for
//! `try`/`catch`, and named lambda-parameter bindings for `each`.
//!
//! One `FoldState` is created per call to [`crate::engine::fold`] or
//! [`crate::engine::Stepper::new`] — never shared or reused across folds,
//! matching the captured-per-fold-closure contract plugins are built
//! against.

use std::cell::RefCell;

use indexmap::IndexMap;

use exprgraph_graph::Value;

/// Mutable per-fold storage, handed to every interpreter [`Handler`](crate::interpreter::Handler)
/// invocation by shared reference; interior mutability lets sibling
/// evaluations see each other's writes within the same fold.
#[derive(Default)]
pub struct FoldState {
    cells: RefCell<Vec<Value>>,
    errors: RefCell<Vec<Value>>,
    locals: RefCell<IndexMap<String, Value>>,
}

impl FoldState {
    pub fn new() -> Self {
        FoldState::default()
    }

    /// Allocate a new cell initialized to `value`, returning its index
    /// (what `st/let` records as its child literal for later `st/get`).
    pub fn alloc_cell(&self, value: Value) -> usize {
        let mut cells = self.cells.borrow_mut();
        cells.push(value);
        cells.len() - 1
    }

    pub fn get_cell(&self, index: usize) -> Option<Value> {
        self.cells.borrow().get(index).cloned()
    }

    pub fn set_cell(&self, index: usize, value: Value) {
        if let Some(slot) = self.cells.borrow_mut().get_mut(index) {
            *slot = value;
        }
    }

    /// Append `value` to the list stored at `index` (cell must hold a
    /// `Value::List`).
    pub fn push_cell(&self, index: usize, value: Value) {
        if let Some(Value::List(items)) = self.cells.borrow_mut().get_mut(index) {
            items.push(value);
        }
    }

    pub fn push_error(&self, value: Value) {
        self.errors.borrow_mut().push(value);
    }

    pub fn pop_error(&self) -> Option<Value> {
        self.errors.borrow_mut().pop()
    }

    /// Read the innermost in-flight error without removing it, for a
    /// `catch` handler that wants to inspect what it's handling.
    pub fn peek_error(&self) -> Option<Value> {
        self.errors.borrow().last().cloned()
    }

    pub fn bind_local(&self, name: impl Into<String>, value: Value) {
        self.locals.borrow_mut().insert(name.into(), value);
    }

    pub fn unbind_local(&self, name: &str) {
        self.locals.borrow_mut().shift_remove(name);
    }

    pub fn local(&self, name: &str) -> Option<Value> {
        self.locals.borrow().get(name).cloned()
    }
}
