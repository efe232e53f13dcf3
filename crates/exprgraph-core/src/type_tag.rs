//! Host-value type tags used for lift rules and trait dispatch.
//!
//! Host values are tagged with JS `typeof`-style strings (`"number"`,
//! `"string"`, `"boolean"`, `"object"`). Rust has no dynamic `typeof`, so
//! plugins declare the tag for each value shape they contribute
//! explicitly; [`TypeTag::OBJECT`] and [`TypeTag::UNKNOWN`] are kept as
//! named constants because trait dispatch treats them specially.

use std::fmt;

/// A plugin-defined or built-in type tag.
///
/// Interned as a plain `&'static str` wrapper rather than an enum because
/// plugins may register arbitrary tags (`"num"`, `"str"`, a future
/// `"duration"`, ...) that the core crate cannot enumerate up front.
#[derive(Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TypeTag(&'static str);

impl TypeTag {
    pub const OBJECT: TypeTag = TypeTag("object");
    pub const UNKNOWN: TypeTag = TypeTag("unknown");

    pub const fn new(tag: &'static str) -> Self {
        TypeTag(tag)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Whether dispatch should treat this tag as "no useful type
    /// information" — trait dispatch picks the first candidate whose tag
    /// is neither `object` nor `unknown`.
    pub fn is_opaque(&self) -> bool {
        *self == TypeTag::OBJECT || *self == TypeTag::UNKNOWN
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({:?})", self.0)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
