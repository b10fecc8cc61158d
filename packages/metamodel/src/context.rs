//! Processing Context
//!
//! The boundary with the compiler frontend. The frontend walks annotated
//! source declarations and drives the model's `process_*` entry points; the
//! model in turn asks the context, during garbage collection, whether a
//! declaration it remembers from an earlier round still exists and what its
//! current annotations say.

use crate::handle::{ClassHandle, FieldHandle, PackageHandle};
use crate::meta::{Cardinality, Phase};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Re-probing interface supplied by the compiler frontend.
///
/// A `None` return means the declaration itself is gone; a `Some` whose
/// annotation field is `None` means the declaration survived but its
/// qualifying annotation was removed. Garbage collection treats the two
/// differently (see `MetaModel::post_activate`).
pub trait ProcessingContext {
    /// Current state of the package declaration behind `handle`.
    fn package(&self, handle: &PackageHandle) -> Option<PackageDeclaration>;

    /// Current state of a method declared on `owner`.
    fn method(&self, owner: &ClassHandle, signature: &MethodSignature) -> Option<MethodDeclaration>;

    /// Current state of the field declaration behind `handle`.
    fn field(&self, handle: &FieldHandle) -> Option<FieldDeclaration>;
}

/// Parsed attributes of an application annotation on a package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationAnnotation {
    /// Declared display name; defaulted from the package name when absent.
    pub name: Option<String>,
    /// Fully-qualified name of the default controller, if declared.
    pub default_controller: Option<String>,
    /// Whether generated markup escapes XML, if declared.
    pub escape_xml: Option<bool>,
}

/// Snapshot of a package declaration as the frontend currently sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDeclaration {
    /// The application annotation, `None` once it has been removed.
    pub application: Option<ApplicationAnnotation>,
}

/// Snapshot of a controller method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDeclaration {
    /// The qualifying phase annotation, `None` once it has been removed.
    pub phase: Option<Phase>,
}

/// Snapshot of a template field declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDeclaration {
    /// Declared template path, `None` once the path annotation was removed.
    pub path: Option<String>,
}

/// Raised when a signature string form cannot be parsed back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed method signature `{0}`")]
pub struct SignatureParseError(pub String);

/// Identity of a method within its controller: name plus declared parameter
/// types. Serializes to `name(type,type)` so it can key a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    name: String,
    parameter_types: Vec<String>,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>, parameter_types: Vec<String>) -> Self {
        MethodSignature {
            name: name.into(),
            parameter_types,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter_types(&self) -> &[String] {
        &self.parameter_types
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.parameter_types.join(","))
    }
}

impl FromStr for MethodSignature {
    type Err = SignatureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let open = s.find('(').ok_or_else(|| SignatureParseError(s.to_string()))?;
        let rest = &s[open + 1..];
        let close = rest.rfind(')').ok_or_else(|| SignatureParseError(s.to_string()))?;
        if close != rest.len() - 1 || s[..open].is_empty() {
            return Err(SignatureParseError(s.to_string()));
        }
        let inner = &rest[..close];
        let parameter_types = if inner.is_empty() {
            Vec::new()
        } else {
            inner.split(',').map(str::to_string).collect()
        };
        Ok(MethodSignature::new(&s[..open], parameter_types))
    }
}

impl Serialize for MethodSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MethodSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Everything the frontend hands over for one annotated controller method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerMethodDeclaration {
    pub signature: MethodSignature,
    pub phase: Phase,
    /// Declared method id, if the annotation carries one.
    pub id: Option<String>,
    /// Parameter names, aligned with the signature's parameter types.
    pub parameter_names: Vec<String>,
    /// Parameter cardinalities, aligned with the parameter names.
    pub cardinalities: Vec<Cardinality>,
}
