//! String operations: lifts bare `String`/`&str` host values to literal
//! nodes and provides `concat`/`eq`, plus `eq`/`show` trait instances.

use indexmap::IndexMap;

use exprgraph_core::TypeTag;
use exprgraph_graph::kind::internal;
use exprgraph_graph::{CExpr, Kind, Value};

use exprgraph_compiler::{KindSpec, Plugin, TraitSpec};
use exprgraph_vm::{FoldError, Handler, Interpreter};

const STR: TypeTag = TypeTag::new("str");
const BOOL: TypeTag = TypeTag::new("bool");

fn arg_str(args: &[Value], index: usize) -> Result<&str, FoldError> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| FoldError::InvalidArgument(format!("expected a string at position {index}")))
}

pub fn plugin() -> Plugin {
    Plugin::builder("str")
        .lift(STR, internal::LITERAL)
        .ctor("concat", |args| CExpr::new("str/concat", args))
        .ctor("eq", |args| CExpr::new("str/eq", args))
        .ctor("show", |args| CExpr::new("str/show", args))
        .kind("str/concat", KindSpec::new(vec![STR, STR], STR))
        .kind("str/eq", KindSpec::new(vec![STR, STR], BOOL))
        .kind("str/show", KindSpec::new(vec![STR], STR))
        .trait_instance(
            "eq",
            TraitSpec::new(BOOL, IndexMap::from([(STR, Kind::new("str/eq"))])),
        )
        .trait_instance(
            "show",
            TraitSpec::new(STR, IndexMap::from([(STR, Kind::new("str/show"))])),
        )
        .build()
}

pub fn interpreter() -> Interpreter {
    let mut interp = Interpreter::new();
    interp.register(
        "str/concat",
        Handler::pure(|args, _| Ok(Value::Str(format!("{}{}", arg_str(args, 0)?, arg_str(args, 1)?)))),
    );
    interp.register(
        "str/eq",
        Handler::pure(|args, _| Ok(Value::Bool(arg_str(args, 0)? == arg_str(args, 1)?))),
    );
    interp.register(
        "str/show",
        Handler::pure(|args, _| Ok(Value::Str(arg_str(args, 0)?.to_string()))),
    );
    interp
}

#[cfg(test)]
#[path = "strings_tests.rs"]
mod strings_tests;
