//! Mutable cells: `let` allocates one, `get`/`set`/`push` read and write it
//! by reference to the `let` node itself rather than a free-floating index,
//! so DAG sharing (the same `let` node referenced from several places)
//! is what makes two reads see the same cell.
//!
//! `let` is deliberately exempt from this crate's "every `st/*` kind is
//! volatile" rule: it allocates once and its own node is memoized like any
//! other, so a shared `let` node's allocation runs exactly once per fold.

use exprgraph_core::TypeTag;
use exprgraph_graph::{CExpr, Value};

use exprgraph_compiler::{KindSpec, Plugin};
use exprgraph_vm::{FoldError, Handler, Interpreter};

const CELL: TypeTag = TypeTag::new("cell");
const OBJECT: TypeTag = TypeTag::OBJECT;

fn arg_cell_index(args: &[Value], index: usize) -> Result<usize, FoldError> {
    args.get(index)
        .and_then(Value::as_num)
        .map(|n| n as usize)
        .ok_or_else(|| FoldError::InvalidArgument(format!("expected a cell handle at position {index}")))
}

pub fn plugin() -> Plugin {
    Plugin::builder("state")
        .ctor("let", |args| CExpr::new("st/let", args))
        .ctor("get", |args| CExpr::new("st/get", args))
        .ctor("set", |args| CExpr::new("st/set", args))
        .ctor("push", |args| CExpr::new("st/push", args))
        .kind("st/let", KindSpec::new(vec![OBJECT], CELL))
        .kind("st/get", KindSpec::new(vec![CELL], OBJECT))
        .kind("st/set", KindSpec::new(vec![CELL, OBJECT], OBJECT))
        .kind("st/push", KindSpec::new(vec![CELL, OBJECT], OBJECT))
        .build()
}

pub fn interpreter() -> Interpreter {
    let mut interp = Interpreter::new();
    interp.register(
        "st/let",
        Handler::pure(|args, state| {
            let initial = args.first().cloned().unwrap_or(Value::Unit);
            Ok(Value::Num(state.alloc_cell(initial) as f64))
        }),
    );
    interp.register(
        "st/get",
        Handler::pure(|args, state| {
            let index = arg_cell_index(args, 0)?;
            Ok(state.get_cell(index).unwrap_or(Value::Unit))
        }),
    );
    interp.register(
        "st/set",
        Handler::pure(|args, state| {
            let index = arg_cell_index(args, 0)?;
            let value = args.get(1).cloned().unwrap_or(Value::Unit);
            state.set_cell(index, value);
            Ok(Value::Unit)
        }),
    );
    interp.register(
        "st/push",
        Handler::pure(|args, state| {
            let index = arg_cell_index(args, 0)?;
            let value = args.get(1).cloned().unwrap_or(Value::Unit);
            state.push_cell(index, value);
            Ok(Value::Unit)
        }),
    );
    interp
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod state_tests;
