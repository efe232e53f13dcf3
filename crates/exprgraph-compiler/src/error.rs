//! Error vocabulary for plugin composition, elaboration, and imperative
//! capture.

use exprgraph_core::TypeTag;
use exprgraph_graph::Kind;

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum RegistryError {
    #[error("plugins {first:?} and {second:?} both define kind {kind:?} with incompatible specs")]
    PluginConflict {
        kind: Kind,
        first: String,
        second: String,
    },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ElaborateError {
    #[error("unknown constructor {0:?}")]
    UnknownCtor(String),

    #[error("kind {0:?} is neither plugin-registered nor core-reserved")]
    UnknownKind(String),

    #[error("unknown trait {0:?}")]
    UnknownTrait(String),

    #[error("no lift rule registered for host type tag {0:?}")]
    CannotLift(TypeTag),

    #[error("trait {trait_name:?} has no instance for type {tag:?}")]
    NoTraitInstance { trait_name: String, tag: TypeTag },

    #[error(
        "trait {trait_name:?} dispatch is ambiguous: candidates {candidates:?} all apply"
    )]
    AmbiguousDispatch {
        trait_name: String,
        candidates: Vec<TypeTag>,
    },

    #[error("trait {trait_name:?} dispatch got conflicting argument types: {tags:?}")]
    TraitTypeMismatch {
        trait_name: String,
        tags: Vec<TypeTag>,
    },

    #[error("kind {kind:?} expected {expected} args, got {found}")]
    ArityMismatch {
        kind: Kind,
        expected: usize,
        found: usize,
    },

    #[error("kind {kind:?} argument {position} expected type {expected:?}, found {found:?}")]
    TypeMismatch {
        kind: Kind,
        position: usize,
        expected: TypeTag,
        found: TypeTag,
    },

    #[error("kind {kind:?} received an argument shape its registered shape descriptor does not accept")]
    UnsupportedArgShape { kind: Kind },

    #[error("structural kind {kind:?} expected a record field {field:?}")]
    MissingRecordField { kind: Kind, field: String },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum CaptureError {
    #[error("node built inside a recording block is unreachable from its block's result: {0:?}")]
    UnreachableOrphan(String),

    #[error("recording block closed with no active recording in progress")]
    NoActiveRecording,
}
