//! Controller Entities
//!
//! A controller is born from the first annotated method observed on a class
//! and dies when garbage collection finds it has no methods left. Until
//! resolution links it to an application it is a valid orphan.

use crate::context::{ControllerMethodDeclaration, MethodSignature};
use crate::handle::{ClassHandle, PackageHandle};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Request phase a controller method participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    View,
    Action,
    Resource,
}

/// Whether a method parameter accepts a single value or multiple values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    Single,
    Multiple,
}

/// A controller method. Owned exclusively by one controller and keyed by its
/// signature within it; never registered on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodMetaModel {
    pub(crate) signature: MethodSignature,
    pub(crate) phase: Phase,
    pub(crate) id: Option<String>,
    pub(crate) parameter_names: Vec<String>,
    pub(crate) cardinalities: Vec<Cardinality>,
}

impl MethodMetaModel {
    pub(crate) fn from_declaration(decl: &ControllerMethodDeclaration) -> Self {
        MethodMetaModel {
            signature: decl.signature.clone(),
            phase: decl.phase,
            id: decl.id.clone(),
            parameter_names: decl.parameter_names.clone(),
            cardinalities: decl.cardinalities.clone(),
        }
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    pub fn name(&self) -> &str {
        self.signature.name()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    pub fn parameter_types(&self) -> &[String] {
        self.signature.parameter_types()
    }

    pub fn cardinalities(&self) -> &[Cardinality] {
        &self.cardinalities
    }
}

/// A controller class and its annotated methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerMetaModel {
    pub(crate) handle: ClassHandle,
    /// Owning application, `None` while the controller is an orphan.
    pub(crate) application: Option<PackageHandle>,
    #[serde(skip)]
    pub(crate) modified: bool,
    pub(crate) methods: IndexMap<MethodSignature, MethodMetaModel>,
}

impl ControllerMetaModel {
    pub(crate) fn new(handle: ClassHandle) -> Self {
        ControllerMetaModel {
            handle,
            application: None,
            modified: false,
            methods: IndexMap::new(),
        }
    }

    pub fn handle(&self) -> &ClassHandle {
        &self.handle
    }

    pub fn application(&self) -> Option<&PackageHandle> {
        self.application.as_ref()
    }

    pub fn is_orphan(&self) -> bool {
        self.application.is_none()
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodMetaModel> {
        self.methods.values()
    }

    pub fn method(&self, signature: &MethodSignature) -> Option<&MethodMetaModel> {
        self.methods.get(signature)
    }

    /// Add or replace the method keyed by its signature. Marks the
    /// controller modified; resolution turns that into a single UPDATED
    /// event (or clears it on first attachment).
    pub(crate) fn add_method(&mut self, decl: &ControllerMethodDeclaration) {
        self.methods
            .insert(decl.signature.clone(), MethodMetaModel::from_declaration(decl));
        self.modified = true;
    }
}
