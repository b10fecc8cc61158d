//! Qualified Names
//!
//! Dotted qualified names for packages and classes. These back the identity
//! handles, so they are plain value types: cheap to clone, hashable, and
//! round-trippable through their string form.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A dotted qualified name, e.g. `com.example.shop`.
///
/// The empty name is the root package and is a prefix of every name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    value: String,
}

impl QName {
    pub fn new(value: impl Into<String>) -> Self {
        QName { value: value.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Last segment of the name, e.g. `shop` for `com.example.shop`.
    pub fn simple_name(&self) -> &str {
        match self.value.rfind('.') {
            Some(idx) => &self.value[idx + 1..],
            None => &self.value,
        }
    }

    /// Enclosing name, `None` for a single-segment name.
    pub fn parent(&self) -> Option<QName> {
        self.value.rfind('.').map(|idx| QName::new(&self.value[..idx]))
    }

    /// Whether `self` is a package prefix of `other`.
    ///
    /// `com.example` is a prefix of `com.example` and `com.example.shop`,
    /// but not of `com.examples` (comparison is segment-wise, not textual).
    pub fn is_prefix_of(&self, other: &QName) -> bool {
        if self.value.is_empty() {
            return true;
        }
        match other.value.strip_prefix(&self.value) {
            Some("") => true,
            Some(rest) => rest.starts_with('.'),
            None => false,
        }
    }

    /// Number of characters, used to rank prefix matches.
    pub fn len(&self) -> usize {
        self.value.len()
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for QName {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(QName::new(s))
    }
}

impl Serialize for QName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de> Deserialize<'de> for QName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(QName::new(String::deserialize(deserializer)?))
    }
}

/// A fully-qualified class name: package plus simple name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fqn {
    package: QName,
    simple_name: String,
}

impl Fqn {
    pub fn new(package: QName, simple_name: impl Into<String>) -> Self {
        Fqn {
            package,
            simple_name: simple_name.into(),
        }
    }

    /// Parse `com.example.Shop` into package `com.example` and name `Shop`.
    /// A name without dots lives in the root package.
    pub fn parse(full_name: &str) -> Self {
        match full_name.rfind('.') {
            Some(idx) => Fqn::new(QName::new(&full_name[..idx]), &full_name[idx + 1..]),
            None => Fqn::new(QName::new(""), full_name),
        }
    }

    pub fn package(&self) -> &QName {
        &self.package
    }

    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }

    pub fn full_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Fqn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            f.write_str(&self.simple_name)
        } else {
            write!(f, "{}.{}", self.package, self.simple_name)
        }
    }
}

impl FromStr for Fqn {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Fqn::parse(s))
    }
}

impl Serialize for Fqn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fqn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
