//! Looping and sequencing: `while`, `each`, and a sequential `par`.
//!
//! `control/while` and `control/each` are evaluated directly by
//! `exprgraph_vm::engine::Stepper` — looping needs a genuine re-entrant
//! call into the evaluator per iteration, which a `Handler` (single pass
//! over its children) can't express — so this plugin contributes only
//! their elaboration-time shape, never an interpreter handler for them.
//! `control/par` has no such need and gets an ordinary variadic handler.

use exprgraph_core::TypeTag;
use exprgraph_graph::{Arg, CExpr, CExprRef, Value};

use exprgraph_compiler::{CaptureError, KindSpec, Plugin, ShapeDescriptor, Surface};
use exprgraph_vm::{Handler, Interpreter};

const OBJECT: TypeTag = TypeTag::OBJECT;

pub fn plugin() -> Plugin {
    Plugin::builder("control")
        .ctor("while", |args| CExpr::new("control/while", args))
        .ctor("par", |args| CExpr::new("control/par", vec![Arg::Seq(args)]))
        .kind("control/while", KindSpec::new(vec![OBJECT, OBJECT], OBJECT))
        .kind("control/each", KindSpec::new(vec![OBJECT, OBJECT, OBJECT], OBJECT))
        .shape("control/par", ShapeDescriptor::Dynamic)
        .bare_kind("control/par")
        .build()
}

/// Build a `control/each` node: iterate `iterable`, binding each item to a
/// fresh `lambda_param` named `param_name` and running `body` with it.
///
/// `body` is recorded under [`Surface::record_block`] so a per-iteration
/// fragment can be assembled with ordinary Rust control flow (host loops,
/// conditionals) while still producing one static graph fragment reused
/// across every iteration at fold time.
pub fn each(
    s: &Surface,
    param_name: impl Into<String>,
    iterable: CExprRef,
    body: impl FnOnce(CExprRef) -> CExprRef,
) -> Result<CExprRef, CaptureError> {
    let param_name = param_name.into();
    let body_expr = s.record_block(|| {
        let param = s.lambda_param(param_name.clone());
        body(param)
    })?;
    let param_name_literal = s.literal(Value::Str(param_name));
    Ok(CExpr::new(
        "control/each",
        vec![Arg::Expr(iterable), Arg::Expr(param_name_literal), Arg::Expr(body_expr)],
    ))
}

pub fn interpreter() -> Interpreter {
    let mut interp = Interpreter::new();
    interp.register(
        "control/par",
        Handler::pure(|args, _state| Ok(args.last().cloned().unwrap_or(Value::Unit))),
    );
    interp
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod control_tests;
