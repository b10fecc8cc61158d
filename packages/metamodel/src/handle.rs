//! Identity Handles
//!
//! Stable identities for source declarations. A handle is the only thing the
//! model is allowed to key entities by: the frontend's declaration objects
//! are rebuilt on every compilation round, but a handle compares equal across
//! rounds as long as it designates the same declaration.
//!
//! Handles serialize to their string form (`com.example`, `com.example.Shop`,
//! `com.example.Shop#index`) so registries keyed by them stay readable JSON
//! objects in the persisted snapshot.

use crate::name::{Fqn, QName};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raised when a handle string form cannot be parsed back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed element handle `{0}`")]
pub struct HandleParseError(pub String);

/// Identity of a package declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageHandle {
    package: QName,
}

impl PackageHandle {
    pub fn new(package: QName) -> Self {
        PackageHandle { package }
    }

    pub fn package(&self) -> &QName {
        &self.package
    }
}

impl fmt::Display for PackageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.package.fmt(f)
    }
}

impl FromStr for PackageHandle {
    type Err = HandleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PackageHandle::new(QName::new(s)))
    }
}

/// Identity of a class declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassHandle {
    fqn: Fqn,
}

impl ClassHandle {
    pub fn new(fqn: Fqn) -> Self {
        ClassHandle { fqn }
    }

    pub fn fqn(&self) -> &Fqn {
        &self.fqn
    }

    /// Package the class is declared in.
    pub fn package(&self) -> &QName {
        self.fqn.package()
    }
}

impl fmt::Display for ClassHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fqn.fmt(f)
    }
}

impl FromStr for ClassHandle {
    type Err = HandleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ClassHandle::new(Fqn::parse(s)))
    }
}

/// Identity of a field declaration: owning class plus field name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldHandle {
    owner: Fqn,
    name: String,
}

impl FieldHandle {
    pub fn new(owner: Fqn, name: impl Into<String>) -> Self {
        FieldHandle {
            owner,
            name: name.into(),
        }
    }

    pub fn owner(&self) -> &Fqn {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package of the owning class.
    pub fn package(&self) -> &QName {
        self.owner.package()
    }
}

impl fmt::Display for FieldHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.owner, self.name)
    }
}

impl FromStr for FieldHandle {
    type Err = HandleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (owner, name) = s
            .split_once('#')
            .ok_or_else(|| HandleParseError(s.to_string()))?;
        if name.is_empty() {
            return Err(HandleParseError(s.to_string()));
        }
        Ok(FieldHandle::new(Fqn::parse(owner), name))
    }
}

/// Tagged variant over the handle kinds, used where the model reports a
/// declaration back to the host toolchain (errors, diagnostics).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementHandle {
    Package(PackageHandle),
    Class(ClassHandle),
    Field(FieldHandle),
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementHandle::Package(h) => write!(f, "package {}", h),
            ElementHandle::Class(h) => write!(f, "class {}", h),
            ElementHandle::Field(h) => write!(f, "field {}", h),
        }
    }
}

impl From<PackageHandle> for ElementHandle {
    fn from(handle: PackageHandle) -> Self {
        ElementHandle::Package(handle)
    }
}

impl From<ClassHandle> for ElementHandle {
    fn from(handle: ClassHandle) -> Self {
        ElementHandle::Class(handle)
    }
}

impl From<FieldHandle> for ElementHandle {
    fn from(handle: FieldHandle) -> Self {
        ElementHandle::Field(handle)
    }
}

macro_rules! string_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(D::Error::custom)
            }
        }
    };
}

string_serde!(PackageHandle);
string_serde!(ClassHandle);
string_serde!(FieldHandle);
