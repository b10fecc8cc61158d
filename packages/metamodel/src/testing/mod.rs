//! Testing Support
//!
//! A scriptable in-memory `ProcessingContext`. Tests seed it with the
//! declarations a round should see, then mutate it between rounds (strip
//! an annotation, drop a declaration) to script reconciliation scenarios.

use crate::context::{
    ApplicationAnnotation, FieldDeclaration, MethodDeclaration, MethodSignature,
    PackageDeclaration, ProcessingContext,
};
use crate::handle::{ClassHandle, FieldHandle, PackageHandle};
use crate::meta::Phase;
use std::collections::HashMap;

/// In-memory declaration store implementing `ProcessingContext`.
#[derive(Debug, Default)]
pub struct MockProcessingContext {
    packages: HashMap<PackageHandle, PackageDeclaration>,
    methods: HashMap<(ClassHandle, MethodSignature), MethodDeclaration>,
    fields: HashMap<FieldHandle, FieldDeclaration>,
}

impl MockProcessingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a package carrying an application annotation.
    pub fn annotate_package(&mut self, handle: PackageHandle, annotation: ApplicationAnnotation) {
        self.packages.insert(
            handle,
            PackageDeclaration {
                application: Some(annotation),
            },
        );
    }

    /// Keep the package declaration but remove its annotation.
    pub fn strip_package(&mut self, handle: &PackageHandle) {
        self.packages
            .insert(handle.clone(), PackageDeclaration { application: None });
    }

    /// Drop the package declaration entirely.
    pub fn remove_package(&mut self, handle: &PackageHandle) {
        self.packages.remove(handle);
    }

    /// Declare a method carrying a phase annotation.
    pub fn annotate_method(&mut self, owner: ClassHandle, signature: MethodSignature, phase: Phase) {
        self.methods
            .insert((owner, signature), MethodDeclaration { phase: Some(phase) });
    }

    /// Keep the method declaration but remove its annotation.
    pub fn strip_method(&mut self, owner: &ClassHandle, signature: &MethodSignature) {
        self.methods.insert(
            (owner.clone(), signature.clone()),
            MethodDeclaration { phase: None },
        );
    }

    /// Drop the method declaration entirely.
    pub fn remove_method(&mut self, owner: &ClassHandle, signature: &MethodSignature) {
        self.methods.remove(&(owner.clone(), signature.clone()));
    }

    /// Declare a field carrying a template path annotation.
    pub fn annotate_field(&mut self, handle: FieldHandle, path: impl Into<String>) {
        self.fields.insert(
            handle,
            FieldDeclaration {
                path: Some(path.into()),
            },
        );
    }

    /// Keep the field declaration but remove its annotation.
    pub fn strip_field(&mut self, handle: &FieldHandle) {
        self.fields
            .insert(handle.clone(), FieldDeclaration { path: None });
    }

    /// Drop the field declaration entirely.
    pub fn remove_field(&mut self, handle: &FieldHandle) {
        self.fields.remove(handle);
    }
}

impl ProcessingContext for MockProcessingContext {
    fn package(&self, handle: &PackageHandle) -> Option<PackageDeclaration> {
        self.packages.get(handle).cloned()
    }

    fn method(&self, owner: &ClassHandle, signature: &MethodSignature) -> Option<MethodDeclaration> {
        self.methods.get(&(owner.clone(), signature.clone())).cloned()
    }

    fn field(&self, handle: &FieldHandle) -> Option<FieldDeclaration> {
        self.fields.get(handle).cloned()
    }
}
