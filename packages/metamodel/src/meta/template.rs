//! Template Entities
//!
//! A `TemplateRefMetaModel` tracks one annotated field declaring a template
//! path. A `TemplateMetaModel` is the template itself, owned by an
//! application and keyed by path within it; it exists only while at least
//! one ref points at it (empty templates are collected at passivation).

use crate::handle::{FieldHandle, PackageHandle};
use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `folder/name.ext`, with an optional folder part that must not start
/// with a slash.
static PATH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^/].*/|)([^./]+)\.([a-zA-Z]+)$").unwrap());

/// Structured form of a template path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatePath {
    folder: String,
    raw_name: String,
    extension: String,
}

impl TemplatePath {
    /// Parse `folder/name.ext`; `None` when the path is outside the shape
    /// the template compilers understand.
    pub fn parse(path: &str) -> Option<TemplatePath> {
        let captures = PATH_PATTERN.captures(path)?;
        Some(TemplatePath {
            folder: captures[1].to_string(),
            raw_name: captures[2].to_string(),
            extension: captures[3].to_string(),
        })
    }

    /// Folder part, empty or ending with `/`.
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Name without folder or extension.
    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl fmt::Display for TemplatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}.{}", self.folder, self.raw_name, self.extension)
    }
}

/// Identifies a template: owning application plus path within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateKey {
    pub application: PackageHandle,
    pub path: String,
}

/// A template, materialized on demand during resolution from the refs
/// declaring its path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateMetaModel {
    pub(crate) path: String,
    /// Refs currently pointing at this template. Empty means the template
    /// is garbage for the next collection pass, never earlier.
    pub(crate) refs: IndexSet<FieldHandle>,
}

impl TemplateMetaModel {
    pub(crate) fn new(path: impl Into<String>) -> Self {
        TemplateMetaModel {
            path: path.into(),
            refs: IndexSet::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn refs(&self) -> impl Iterator<Item = &FieldHandle> {
        self.refs.iter()
    }

    pub fn is_unused(&self) -> bool {
        self.refs.is_empty()
    }

    /// Structured form of the path, for template compilers downstream.
    pub fn parsed_path(&self) -> Option<TemplatePath> {
        TemplatePath::parse(&self.path)
    }
}

/// One annotated field declaring a template path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRefMetaModel {
    pub(crate) handle: FieldHandle,
    pub(crate) path: String,
    /// Template this ref resolved to, `None` while the ref is an orphan.
    pub(crate) template: Option<TemplateKey>,
}

impl TemplateRefMetaModel {
    pub(crate) fn new(handle: FieldHandle, path: impl Into<String>) -> Self {
        TemplateRefMetaModel {
            handle,
            path: path.into(),
            template: None,
        }
    }

    pub fn handle(&self) -> &FieldHandle {
        &self.handle
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn template(&self) -> Option<&TemplateKey> {
        self.template.as_ref()
    }

    pub fn is_orphan(&self) -> bool {
        self.template.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_path_with_folder() {
        let path = TemplatePath::parse("views/shop/index.gtmpl").unwrap();
        assert_eq!(path.folder(), "views/shop/");
        assert_eq!(path.raw_name(), "index");
        assert_eq!(path.extension(), "gtmpl");
        assert_eq!(path.to_string(), "views/shop/index.gtmpl");
    }

    #[test]
    fn should_parse_path_without_folder() {
        let path = TemplatePath::parse("index.gtmpl").unwrap();
        assert_eq!(path.folder(), "");
        assert_eq!(path.raw_name(), "index");
        assert_eq!(path.extension(), "gtmpl");
    }

    #[test]
    fn should_reject_absolute_and_extensionless_paths() {
        assert!(TemplatePath::parse("/index.gtmpl").is_none());
        assert!(TemplatePath::parse("index").is_none());
        assert!(TemplatePath::parse("views/index.").is_none());
    }
}
