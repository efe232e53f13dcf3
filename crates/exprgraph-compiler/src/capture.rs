//! Imperative capture: lets host code build a graph fragment through an
//! ordinary Rust closure (a loop body, a branch) while tracing every
//! `CExpr` it constructs, so the composed fragment can be checked for
//! orphaned nodes before it's wired into the surrounding graph.
//!
//! One `RecordingStack` per `Surface` (never a process-global), since two
//! independent `Surface`s building unrelated graphs must not interleave
//! recordings.

use std::cell::RefCell;
use std::collections::HashSet;

use exprgraph_graph::{Arg, CExpr, CExprRef};

use crate::error::CaptureError;

#[derive(Default)]
struct RecordingFrame {
    built: Vec<CExprRef>,
}

/// Tracks nested recording frames for one `Surface`.
#[derive(Default)]
pub struct RecordingStack {
    frames: RefCell<Vec<RecordingFrame>>,
}

impl RecordingStack {
    pub fn new() -> Self {
        RecordingStack::default()
    }

    /// Record a freshly constructed node against the innermost active
    /// frame, if any. Called by every `Surface` constructor method.
    pub fn observe(&self, node: &CExprRef) {
        if let Some(frame) = self.frames.borrow_mut().last_mut() {
            frame.built.push(node.clone());
        }
    }

    fn push(&self) {
        self.frames.borrow_mut().push(RecordingFrame::default());
    }

    fn pop(&self) -> RecordingFrame {
        self.frames
            .borrow_mut()
            .pop()
            .expect("pop without matching push")
    }
}

/// Run `build` with a fresh recording frame active, then check that every
/// node it constructed is reachable from `build`'s returned `CExprRef`.
/// Returns the result unchanged on success.
pub fn record_block(
    stack: &RecordingStack,
    build: impl FnOnce() -> CExprRef,
) -> Result<CExprRef, CaptureError> {
    stack.push();
    let result = build();
    let frame = stack.pop();
    check_reachable(&frame, &result)?;
    Ok(result)
}

fn check_reachable(frame: &RecordingFrame, result: &CExprRef) -> Result<(), CaptureError> {
    let mut reachable = HashSet::new();
    let mut stack = vec![result.clone()];
    while let Some(node) = stack.pop() {
        let id = CExpr::identity(&node);
        if !reachable.insert(id) {
            continue;
        }
        for arg in &node.args {
            collect_expr_args(arg, &mut stack);
        }
    }

    for node in &frame.built {
        let id = CExpr::identity(node);
        if !reachable.contains(&id) {
            return Err(CaptureError::UnreachableOrphan(node.kind.as_str().to_string()));
        }
    }
    Ok(())
}

fn collect_expr_args(arg: &Arg, stack: &mut Vec<CExprRef>) {
    match arg {
        Arg::Expr(e) => stack.push(e.clone()),
        Arg::Seq(items) => items.iter().for_each(|a| collect_expr_args(a, stack)),
        Arg::Map(map) => map.values().for_each(|a| collect_expr_args(a, stack)),
        Arg::Prim(_) => {}
    }
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod capture_tests;
