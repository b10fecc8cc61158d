//! Entity Graph
//!
//! The typed entities of the metamodel and the engine that maintains them
//! across compilation rounds.

mod application;
mod controller;
mod model;
mod template;

pub use application::{ApplicationDeclared, ApplicationMetaModel};
pub use controller::{Cardinality, ControllerMetaModel, MethodMetaModel, Phase};
pub use model::MetaModel;
pub use template::{TemplateKey, TemplateMetaModel, TemplatePath, TemplateRefMetaModel};
