//! Elaboration: walks a `CExpr` tree and produces a normalized `NExpr`.
//!
//! Memoizes on `CExpr` object identity so a `CExprRef` shared across two
//! call sites elaborates once and both parents reference the same
//! `NodeId` — this is how DAG sharing in the source tree survives into
//! the normalized graph.
//!
//! Five argument-dispatch cases, matched in order against each node's kind:
//! 1. Already elaborated (memo hit) — reuse the existing `NodeId`.
//! 2. A kind with a registered `KindSpec` — elaborate each positional arg,
//!    lifting bare `Arg::Prim` values through the registry's lift map, and
//!    check each against that `KindSpec`'s declared input types.
//! 3. A kind with a registered structural `ShapeDescriptor` — walk the
//!    single structural argument recursively against the shape.
//! 4. A trait call (`ctors::as_trait_call`) — elaborate its operands first,
//!    then dispatch to a concrete kind from the first operand whose output
//!    type is not opaque (`object`/`unknown`).
//! 5. A core-reserved kind (`literal`/`input`/`access`/`begin`/`lambda_param`)
//!    — handled directly, since these are never contributed by plugins.

use std::collections::HashMap;

use exprgraph_core::{IdCounter, NodeId, TypeTag};
use indexmap::IndexMap;

use exprgraph_graph::kind::internal;
use exprgraph_graph::{Arg, CExpr, CExprRef, ChildRef, Kind, NExpr, NodeEntry, Value};

use crate::ctors::as_trait_call;
use crate::error::ElaborateError;
use crate::plugin::ShapeDescriptor;
use crate::registry::Registry;

fn value_type_tag(value: &Value) -> TypeTag {
    match value {
        Value::Num(_) => TypeTag::new("num"),
        Value::Str(_) => TypeTag::new("str"),
        Value::Bool(_) => TypeTag::new("bool"),
        Value::List(_) | Value::Map(_) => TypeTag::OBJECT,
        Value::Unit => TypeTag::UNKNOWN,
    }
}

struct Ctx<'r> {
    registry: &'r Registry,
    memo: HashMap<usize, NodeId>,
    adj: IndexMap<NodeId, NodeEntry>,
    counter: IdCounter,
}

impl<'r> Ctx<'r> {
    fn fresh_id(&mut self) -> NodeId {
        self.counter.next()
    }

    fn insert(&mut self, entry: NodeEntry) -> NodeId {
        let id = self.fresh_id();
        self.adj.insert(id.clone(), entry);
        id
    }

    fn output_tag(&self, id: &NodeId) -> TypeTag {
        let entry = &self.adj[id];
        if let Some(out) = &entry.out {
            return value_type_tag(out);
        }
        self.registry.kind_output(&entry.kind).unwrap_or(TypeTag::OBJECT)
    }
}

/// Elaborate one `Arg` that is expected to sit in a flat (non-structural)
/// position: either a nested expression or a primitive to lift.
fn elaborate_flat_arg(ctx: &mut Ctx, kind: &Kind, arg: &Arg) -> Result<NodeId, ElaborateError> {
    match arg {
        Arg::Expr(e) => elaborate_node(ctx, e),
        Arg::Prim(v) => {
            let tag = value_type_tag(v);
            let lift_kind = ctx
                .registry
                .lift_kind(tag)
                .cloned()
                .ok_or(ElaborateError::CannotLift(tag))?;
            Ok(ctx.insert(NodeEntry::leaf(lift_kind, v.clone())))
        }
        Arg::Seq(_) | Arg::Map(_) => Err(ElaborateError::UnsupportedArgShape { kind: kind.clone() }),
    }
}

fn elaborate_shape(
    ctx: &mut Ctx,
    kind: &Kind,
    shape: &ShapeDescriptor,
    arg: &Arg,
) -> Result<ChildRef, ElaborateError> {
    match (shape, arg) {
        (ShapeDescriptor::Dynamic, Arg::Seq(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(elaborate_shape(ctx, kind, &ShapeDescriptor::Dynamic, item)?);
            }
            Ok(ChildRef::Seq(out))
        }
        (ShapeDescriptor::Dynamic, Arg::Map(map)) => {
            let mut out = IndexMap::with_capacity(map.len());
            for (key, value) in map {
                out.insert(
                    key.clone(),
                    elaborate_shape(ctx, kind, &ShapeDescriptor::Dynamic, value)?,
                );
            }
            Ok(ChildRef::Map(out))
        }
        (ShapeDescriptor::Dynamic, _) => Ok(ChildRef::Id(elaborate_flat_arg(ctx, kind, arg)?)),
        (ShapeDescriptor::Seq(shapes), Arg::Seq(items)) => {
            if shapes.len() != items.len() {
                return Err(ElaborateError::ArityMismatch {
                    kind: kind.clone(),
                    expected: shapes.len(),
                    found: items.len(),
                });
            }
            let mut out = Vec::with_capacity(items.len());
            for (sub_shape, item) in shapes.iter().zip(items) {
                out.push(elaborate_shape(ctx, kind, sub_shape, item)?);
            }
            Ok(ChildRef::Seq(out))
        }
        (ShapeDescriptor::Record(fields), Arg::Map(map)) => {
            let mut out = IndexMap::with_capacity(fields.len());
            for (field, sub_shape) in fields {
                let value = map.get(field).ok_or_else(|| ElaborateError::MissingRecordField {
                    kind: kind.clone(),
                    field: field.clone(),
                })?;
                out.insert(field.clone(), elaborate_shape(ctx, kind, sub_shape, value)?);
            }
            Ok(ChildRef::Map(out))
        }
        (ShapeDescriptor::Concrete(_), _) => Ok(ChildRef::Id(elaborate_flat_arg(ctx, kind, arg)?)),
        _ => Err(ElaborateError::UnsupportedArgShape { kind: kind.clone() }),
    }
}

fn elaborate_trait_call(ctx: &mut Ctx, trait_name: &str, args: &[Arg]) -> Result<NodeEntry, ElaborateError> {
    let spec = ctx
        .registry
        .trait_spec(trait_name)
        .ok_or_else(|| ElaborateError::UnknownTrait(trait_name.to_string()))?
        .clone();

    let mut child_ids = Vec::with_capacity(args.len());
    let mut tags = Vec::with_capacity(args.len());
    for arg in args {
        let id = match arg {
            Arg::Expr(e) => elaborate_node(ctx, e)?,
            Arg::Prim(v) => {
                let tag = value_type_tag(v);
                let lift_kind = ctx.registry.lift_kind(tag).cloned().ok_or(ElaborateError::CannotLift(tag))?;
                ctx.insert(NodeEntry::leaf(lift_kind, v.clone()))
            }
            Arg::Seq(_) | Arg::Map(_) => {
                return Err(ElaborateError::UnsupportedArgShape {
                    kind: crate::ctors::trait_call_kind(trait_name),
                })
            }
        };
        tags.push(ctx.output_tag(&id));
        child_ids.push(id);
    }

    let mut candidates: Vec<Kind> = Vec::new();
    for tag in &tags {
        if tag.is_opaque() {
            continue;
        }
        if let Some(k) = spec.mapping.get(tag) {
            if !candidates.contains(k) {
                candidates.push(k.clone());
            }
        }
    }

    match candidates.len() {
        0 => Err(ElaborateError::NoTraitInstance {
            trait_name: trait_name.to_string(),
            tag: tags.first().copied().unwrap_or(TypeTag::UNKNOWN),
        }),
        1 => Ok(NodeEntry::flat(candidates.into_iter().next().unwrap(), child_ids)),
        _ => {
            // More than one candidate kind only arises because at least two
            // non-opaque argument tags each have their own mapping. If those
            // tags are themselves distinct, this is a type conflict (e.g.
            // `eq(1, "a")`), not a tie between equally-valid candidates.
            let mut distinct_concrete: Vec<TypeTag> = Vec::new();
            for tag in &tags {
                if tag.is_opaque() {
                    continue;
                }
                if !distinct_concrete.contains(tag) {
                    distinct_concrete.push(*tag);
                }
            }
            if distinct_concrete.len() >= 2 {
                Err(ElaborateError::TraitTypeMismatch {
                    trait_name: trait_name.to_string(),
                    tags: distinct_concrete,
                })
            } else {
                Err(ElaborateError::AmbiguousDispatch {
                    trait_name: trait_name.to_string(),
                    candidates: tags.into_iter().filter(|t| !t.is_opaque()).collect(),
                })
            }
        }
    }
}

fn elaborate_internal(ctx: &mut Ctx, kind_str: &str, args: &[Arg]) -> Result<NodeEntry, ElaborateError> {
    match kind_str {
        internal::LITERAL => {
            let value = match args.first() {
                Some(Arg::Prim(v)) => v.clone(),
                _ => Value::Unit,
            };
            Ok(NodeEntry::leaf(internal::LITERAL, value))
        }
        internal::INPUT => Ok(NodeEntry::flat(internal::INPUT, vec![])),
        internal::ACCESS => {
            let target = args
                .first()
                .ok_or_else(|| ElaborateError::ArityMismatch {
                    kind: internal::ACCESS.into(),
                    expected: 2,
                    found: args.len(),
                })
                .and_then(|a| match a {
                    Arg::Expr(e) => elaborate_node(ctx, e),
                    _ => Err(ElaborateError::UnsupportedArgShape { kind: internal::ACCESS.into() }),
                })?;
            let field = match args.get(1) {
                Some(Arg::Prim(Value::Str(s))) => s.clone(),
                _ => return Err(ElaborateError::UnsupportedArgShape { kind: internal::ACCESS.into() }),
            };
            let field_id = ctx.insert(NodeEntry::leaf(internal::LITERAL, Value::Str(field)));
            Ok(NodeEntry::flat(internal::ACCESS, vec![target, field_id]))
        }
        internal::BEGIN => {
            let mut ids = Vec::with_capacity(args.len());
            for arg in args {
                match arg {
                    Arg::Expr(e) => ids.push(elaborate_node(ctx, e)?),
                    _ => return Err(ElaborateError::UnsupportedArgShape { kind: internal::BEGIN.into() }),
                }
            }
            Ok(NodeEntry::flat(internal::BEGIN, ids))
        }
        internal::LAMBDA_PARAM => {
            let name = match args.first() {
                Some(Arg::Prim(Value::Str(s))) => s.clone(),
                _ => String::new(),
            };
            Ok(NodeEntry {
                kind: internal::LAMBDA_PARAM.into(),
                children: ChildRef::Seq(vec![]),
                out: Some(Value::Str(name)),
            })
        }
        other => Err(ElaborateError::UnknownKind(other.to_string())),
    }
}

fn elaborate_node(ctx: &mut Ctx, expr: &CExprRef) -> Result<NodeId, ElaborateError> {
    let identity = CExpr::identity(expr);
    if let Some(id) = ctx.memo.get(&identity) {
        return Ok(id.clone());
    }

    let entry = if let Some(trait_name) = as_trait_call(&expr.kind) {
        elaborate_trait_call(ctx, trait_name, &expr.args)?
    } else if let Some(spec) = ctx.registry.kind_spec(&expr.kind).cloned() {
        if spec.inputs.len() != expr.args.len() {
            return Err(ElaborateError::ArityMismatch {
                kind: expr.kind.clone(),
                expected: spec.inputs.len(),
                found: expr.args.len(),
            });
        }
        let mut ids = Vec::with_capacity(expr.args.len());
        for (position, (arg, expected)) in expr.args.iter().zip(&spec.inputs).enumerate() {
            let id = elaborate_flat_arg(ctx, &expr.kind, arg)?;
            let found = ctx.output_tag(&id);
            if !found.is_opaque() && *expected != TypeTag::OBJECT && found != *expected {
                return Err(ElaborateError::TypeMismatch {
                    kind: expr.kind.clone(),
                    position,
                    expected: *expected,
                    found,
                });
            }
            ids.push(id);
        }
        NodeEntry::flat(expr.kind.clone(), ids)
    } else if let Some(shape) = ctx.registry.shape(&expr.kind).cloned() {
        let arg = expr.args.first().ok_or_else(|| ElaborateError::ArityMismatch {
            kind: expr.kind.clone(),
            expected: 1,
            found: 0,
        })?;
        let child_ref = elaborate_shape(ctx, &expr.kind, &shape, arg)?;
        NodeEntry::structural(expr.kind.clone(), child_ref)
    } else {
        elaborate_internal(ctx, expr.kind.as_str(), &expr.args)?
    };

    let id = ctx.insert(entry);
    ctx.memo.insert(identity, id.clone());
    Ok(id)
}

/// Elaborate a `CExpr` tree rooted at `root` into a normalized `NExpr`.
pub fn elaborate(root: &CExprRef, registry: &Registry) -> Result<NExpr, ElaborateError> {
    let mut ctx = Ctx {
        registry,
        memo: HashMap::new(),
        adj: IndexMap::new(),
        counter: IdCounter::new(),
    };
    let root_id = elaborate_node(&mut ctx, root)?;
    log::debug!("elaborated {} nodes", ctx.adj.len());
    Ok(NExpr::new_unchecked(root_id, ctx.adj, ctx.counter.peek(), IndexMap::new()))
}

#[cfg(test)]
#[path = "elaborate_tests.rs"]
mod elaborate_tests;
