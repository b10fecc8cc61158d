#![deny(clippy::all)]

/**
 * MVC Metamodel Engine
 *
 * Builds and incrementally maintains the metadata model of an annotated
 * MVC application (applications, controllers, controller methods, view
 * templates) across repeated, partial recompilation rounds, and emits the
 * ordered change events a downstream code/config generator consumes.
 */
pub mod context;
pub mod error;
pub mod event;
pub mod handle;
pub mod logging;
pub mod meta;
pub mod name;
pub mod testing;

pub use context::{
    ApplicationAnnotation, ControllerMethodDeclaration, FieldDeclaration, MethodDeclaration,
    MethodSignature, PackageDeclaration, ProcessingContext,
};
pub use error::ModelError;
pub use event::{EntityRef, EventKind, MetaModelEvent};
pub use handle::{ClassHandle, ElementHandle, FieldHandle, PackageHandle};
pub use meta::{
    ApplicationDeclared, ApplicationMetaModel, Cardinality, ControllerMetaModel, MetaModel,
    MethodMetaModel, Phase, TemplateKey, TemplateMetaModel, TemplatePath, TemplateRefMetaModel,
};
pub use name::{Fqn, QName};

/// Crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
