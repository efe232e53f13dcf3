//! Numeric arithmetic: lifts bare `f64` host values to literal nodes and
//! provides `add`/`mul`/`eq`/`show`, plus `eq`/`show` trait instances.

use indexmap::IndexMap;

use exprgraph_core::TypeTag;
use exprgraph_graph::kind::internal;
use exprgraph_graph::{CExpr, Kind, Value};

use exprgraph_compiler::{KindSpec, Plugin, TraitSpec};
use exprgraph_vm::{FoldError, Handler, Interpreter};

const NUM: TypeTag = TypeTag::new("num");
const STR: TypeTag = TypeTag::new("str");
const BOOL: TypeTag = TypeTag::new("bool");

fn arg_num(args: &[Value], index: usize) -> Result<f64, FoldError> {
    args.get(index)
        .and_then(Value::as_num)
        .ok_or_else(|| FoldError::InvalidArgument(format!("expected a number at position {index}")))
}

pub fn plugin() -> Plugin {
    Plugin::builder("num")
        .lift(NUM, internal::LITERAL)
        .ctor("add", |args| CExpr::new("num/add", args))
        .ctor("mul", |args| CExpr::new("num/mul", args))
        .ctor("eq", |args| CExpr::new("num/eq", args))
        .ctor("show", |args| CExpr::new("num/show", args))
        .kind("num/add", KindSpec::new(vec![NUM, NUM], NUM))
        .kind("num/mul", KindSpec::new(vec![NUM, NUM], NUM))
        .kind("num/eq", KindSpec::new(vec![NUM, NUM], BOOL))
        .kind("num/show", KindSpec::new(vec![NUM], STR))
        .trait_instance(
            "eq",
            TraitSpec::new(BOOL, IndexMap::from([(NUM, Kind::new("num/eq"))])),
        )
        .trait_instance(
            "show",
            TraitSpec::new(STR, IndexMap::from([(NUM, Kind::new("num/show"))])),
        )
        .build()
}

pub fn interpreter() -> Interpreter {
    let mut interp = Interpreter::new();
    interp.register(
        "num/add",
        Handler::pure(|args, _| Ok(Value::Num(arg_num(args, 0)? + arg_num(args, 1)?))),
    );
    interp.register(
        "num/mul",
        Handler::pure(|args, _| Ok(Value::Num(arg_num(args, 0)? * arg_num(args, 1)?))),
    );
    interp.register(
        "num/eq",
        Handler::pure(|args, _| Ok(Value::Bool(arg_num(args, 0)? == arg_num(args, 1)?))),
    );
    interp.register(
        "num/show",
        Handler::pure(|args, _| Ok(Value::Str(arg_num(args, 0)?.to_string()))),
    );
    interp
}

#[cfg(test)]
#[path = "num_tests.rs"]
mod num_tests;
