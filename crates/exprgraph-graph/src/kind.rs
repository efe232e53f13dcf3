//! Namespaced node-kind strings (`"num/add"`, `"core/access"`, ...).

use std::fmt;

/// A node's operator, e.g. `num/add` or `core/literal`.
///
/// Plain `String` wrapper rather than an enum: kinds are contributed by an
/// open set of plugins the core crate never enumerates.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Kind(String);

impl Kind {
    pub fn new(s: impl Into<String>) -> Self {
        Kind(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Kind({:?})", self.0)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Kind {
    fn from(s: &str) -> Self {
        Kind(s.to_string())
    }
}

impl From<String> for Kind {
    fn from(s: String) -> Self {
        Kind(s)
    }
}

/// Internal kinds the elaborator and imperative capture reserve for
/// themselves. Exempt from the orphan-reachability check.
pub mod internal {
    pub const LITERAL: &str = "core/literal";
    pub const ACCESS: &str = "core/access";
    pub const BEGIN: &str = "core/begin";
    pub const INPUT: &str = "core/input";
    pub const LAMBDA_PARAM: &str = "core/lambda_param";
    pub const ALIAS: &str = "@alias";

    pub fn is_internal(kind: &str) -> bool {
        kind == LITERAL
            || kind == ACCESS
            || kind == BEGIN
            || kind == INPUT
            || kind == LAMBDA_PARAM
            || kind == ALIAS
            || kind.starts_with("st/")
    }
}
