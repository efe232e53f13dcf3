//! Cooperative fold engine: evaluates an `exprgraph_graph::NExpr` produced
//! by the compiler crate, dispatching each node either to a handful of
//! core-reserved kinds this crate knows directly, or to whatever
//! [`Interpreter`] handlers a plugin crate (`exprgraph-stdlib` and friends)
//! has registered.

pub mod engine;
pub mod error;
pub mod interpreter;
pub mod state;

pub use engine::{fold, run_with_handler, StepContext, StepEffect, StepHandler, Stepper, Yield};
pub use error::FoldError;
pub use interpreter::{ChildEvaluator, Handler, Interpreter, LazyHandler, PureHandler};
pub use state::FoldState;
