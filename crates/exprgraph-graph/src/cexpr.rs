//! Construction-time expression tree (`CExpr`).
//!
//! Permissive, unvalidated, identified by `Rc` pointer identity rather than
//! structure: two constructor calls with identical arguments still produce
//! distinct, non-deduplicated nodes. A constructor call on the `$` surface
//! allocates exactly one `CExpr`; sharing it (binding it to a variable and
//! passing it twice) is what lets the elaborator detect and preserve DAG
//! sharing.

use indexmap::IndexMap;
use std::rc::Rc;

use crate::kind::Kind;
use crate::value::Value;

/// An argument to a constructor call.
#[derive(Clone, Debug)]
pub enum Arg {
    /// A nested expression — elaborated recursively, shared by `Rc` identity.
    Expr(CExprRef),
    /// A raw host primitive, lifted to a literal node at elaboration time.
    Prim(Value),
    /// An ordered sequence of further args (for variadic/structural kinds).
    Seq(Vec<Arg>),
    /// A string-keyed map of further args (for structural/record kinds).
    Map(IndexMap<String, Arg>),
}

impl From<CExprRef> for Arg {
    fn from(e: CExprRef) -> Self {
        Arg::Expr(e)
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Prim(v)
    }
}

impl From<f64> for Arg {
    fn from(n: f64) -> Self {
        Arg::Prim(Value::Num(n))
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Prim(Value::Str(s.to_string()))
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Prim(Value::Str(s))
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Arg::Prim(Value::Bool(b))
    }
}

/// A construction-time expression node: a kind plus its arguments.
///
/// The private unit field is the brand: nothing outside this module can
/// construct a `CExpr` by naming its fields, so every live `CExprRef` is
/// known to have come from [`CExpr::new`].
#[derive(Debug)]
pub struct CExpr {
    pub kind: Kind,
    pub args: Vec<Arg>,
    _brand: (),
}

/// Shared handle to a [`CExpr`]. Cloning a `CExprRef` shares the
/// underlying node — two `Arg::Expr` values referencing the same
/// `CExprRef` describe a shared subtree, not two independent copies.
pub type CExprRef = Rc<CExpr>;

impl CExpr {
    /// Construct a new `CExpr`. The only constructor: everything that
    /// builds expressions (the `$` surface, trait auto-constructors,
    /// structural builders) funnels through here.
    pub fn new(kind: impl Into<Kind>, args: Vec<Arg>) -> CExprRef {
        Rc::new(CExpr {
            kind: kind.into(),
            args,
            _brand: (),
        })
    }

    /// Pointer identity used as the elaboration memoization key, so two
    /// `Arg::Expr` values pointing at the same `CExprRef` elaborate once.
    pub fn identity(this: &CExprRef) -> usize {
        Rc::as_ptr(this) as usize
    }
}
