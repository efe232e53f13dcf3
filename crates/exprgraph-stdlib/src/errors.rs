//! `try`/`catch`, `fail`, `guard`, and `current_error`, backed by the
//! fold-scoped LIFO error stack in [`exprgraph_vm::FoldState`].
//!
//! `err/try` is the one kind in this crate that genuinely needs a
//! [`Handler::Lazy`]: it must evaluate its body, and only on failure
//! evaluate its handler, which is exactly the single-pass controlled
//! evaluation that handler shape is for.

use exprgraph_core::TypeTag;
use exprgraph_graph::{CExpr, Value};

use exprgraph_compiler::{KindSpec, Plugin};
use exprgraph_vm::{FoldError, Handler, Interpreter};

const OBJECT: TypeTag = TypeTag::OBJECT;
const BOOL: TypeTag = TypeTag::new("bool");

pub fn plugin() -> Plugin {
    Plugin::builder("errors")
        .ctor("try_catch", |args| CExpr::new("err/try", args))
        .ctor("fail", |args| CExpr::new("err/fail", args))
        .ctor("guard", |args| CExpr::new("err/guard", args))
        .ctor("current_error", |args| CExpr::new("err/current", args))
        .kind("err/try", KindSpec::new(vec![OBJECT, OBJECT], OBJECT))
        .kind("err/fail", KindSpec::new(vec![OBJECT], OBJECT))
        .kind("err/guard", KindSpec::new(vec![BOOL, OBJECT], OBJECT))
        .kind("err/current", KindSpec::new(vec![], OBJECT))
        .build()
}

pub fn interpreter() -> Interpreter {
    let mut interp = Interpreter::new();
    interp.register(
        "err/fail",
        Handler::pure(|args, _state| {
            let value = args.first().cloned().unwrap_or(Value::Unit);
            Err(FoldError::UserError(value))
        }),
    );
    interp.register(
        "err/guard",
        Handler::pure(|args, _state| {
            let cond = args.first().and_then(Value::as_bool).unwrap_or(false);
            let value = args.get(1).cloned().unwrap_or(Value::Unit);
            if cond {
                Ok(value)
            } else {
                Err(FoldError::UserError(value))
            }
        }),
    );
    interp.register(
        "err/current",
        Handler::pure(|_args, state| Ok(state.peek_error().unwrap_or(Value::Unit))),
    );
    interp.register(
        "err/try",
        Handler::lazy(|next, _arity, state| match next(0) {
            Ok(value) => Ok(value),
            Err(FoldError::UserError(err_value)) => {
                state.push_error(err_value);
                let result = next(1);
                state.pop_error();
                result
            }
            Err(other) => Err(other),
        }),
    );
    interp
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
