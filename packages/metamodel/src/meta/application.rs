//! Application Entity
//!
//! An application is rooted at an annotated package. It owns the ordered set
//! of controllers resolved into it and the templates materialized under it.

use crate::context::ApplicationAnnotation;
use crate::handle::{ClassHandle, PackageHandle};
use crate::meta::template::TemplateMetaModel;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Effective declared attributes of an application, after defaulting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDeclared {
    pub name: String,
    pub default_controller: Option<String>,
    pub escape_xml: Option<bool>,
}

impl ApplicationDeclared {
    /// Apply the annotation's defaulting rules: an omitted display name
    /// becomes the capitalized package simple name suffixed with
    /// `Application`.
    pub fn effective(handle: &PackageHandle, annotation: &ApplicationAnnotation) -> Self {
        let name = match &annotation.name {
            Some(name) => name.clone(),
            None => {
                let simple = handle.package().simple_name();
                let mut chars = simple.chars();
                match chars.next() {
                    Some(first) => {
                        format!("{}{}Application", first.to_uppercase(), chars.as_str())
                    }
                    None => "Application".to_string(),
                }
            }
        };
        ApplicationDeclared {
            name,
            default_controller: annotation.default_controller.clone(),
            escape_xml: annotation.escape_xml,
        }
    }
}

/// An application and everything it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationMetaModel {
    pub(crate) handle: PackageHandle,
    #[serde(flatten)]
    pub(crate) declared: ApplicationDeclared,
    /// Staged attributes from repeated processing in the current round,
    /// applied during resolution so they collapse to one UPDATED event.
    #[serde(skip)]
    pub(crate) pending: Option<ApplicationDeclared>,
    #[serde(skip)]
    pub(crate) modified: bool,
    pub(crate) controllers: IndexSet<ClassHandle>,
    pub(crate) templates: IndexMap<String, TemplateMetaModel>,
}

impl ApplicationMetaModel {
    pub(crate) fn new(handle: PackageHandle, declared: ApplicationDeclared) -> Self {
        ApplicationMetaModel {
            handle,
            declared,
            pending: None,
            modified: false,
            controllers: IndexSet::new(),
            templates: IndexMap::new(),
        }
    }

    pub fn handle(&self) -> &PackageHandle {
        &self.handle
    }

    pub fn name(&self) -> &str {
        &self.declared.name
    }

    pub fn default_controller(&self) -> Option<&str> {
        self.declared.default_controller.as_deref()
    }

    pub fn escape_xml(&self) -> Option<bool> {
        self.declared.escape_xml
    }

    pub fn controllers(&self) -> impl Iterator<Item = &ClassHandle> {
        self.controllers.iter()
    }

    pub fn templates(&self) -> impl Iterator<Item = &TemplateMetaModel> {
        self.templates.values()
    }

    pub fn template(&self, path: &str) -> Option<&TemplateMetaModel> {
        self.templates.get(path)
    }

    /// Stage attributes observed by a repeated `process_application` in the
    /// current round. Identical attributes stage nothing, so re-processing
    /// an unchanged declaration stays a no-op.
    pub(crate) fn stage(&mut self, declared: ApplicationDeclared) {
        if declared == self.declared {
            self.pending = None;
            self.modified = false;
        } else {
            self.pending = Some(declared);
            self.modified = true;
        }
    }

    /// Apply staged attributes at resolution time.
    pub(crate) fn apply_pending(&mut self) {
        if let Some(declared) = self.pending.take() {
            self.declared = declared;
        }
    }
}
