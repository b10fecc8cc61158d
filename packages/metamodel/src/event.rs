//! Model Events
//!
//! Ordered change records describing what a downstream generator must
//! regenerate. Events reference entities by handle, never by borrow: a
//! BEFORE_REMOVE subject is already out of the registries by the time the
//! queue is drained.

use crate::handle::{ClassHandle, FieldHandle, PackageHandle};
use std::fmt;

/// Kind of structural change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The entity was just registered.
    AfterAdd,
    /// The entity is about to be removed from the model.
    BeforeRemove,
    /// The entity's declared attributes or membership changed.
    Updated,
}

/// Reference to the entity an event is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    Application(PackageHandle),
    Controller(ClassHandle),
    Template {
        application: PackageHandle,
        path: String,
    },
    TemplateRef(FieldHandle),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Application(h) => write!(f, "application {}", h),
            EntityRef::Controller(h) => write!(f, "controller {}", h),
            EntityRef::Template { application, path } => {
                write!(f, "template {}:{}", application, path)
            }
            EntityRef::TemplateRef(h) => write!(f, "template ref {}", h),
        }
    }
}

/// One entry of the round's change log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaModelEvent {
    pub kind: EventKind,
    pub entity: EntityRef,
}

impl MetaModelEvent {
    pub fn new(kind: EventKind, entity: EntityRef) -> Self {
        MetaModelEvent { kind, entity }
    }

    pub fn after_add(entity: EntityRef) -> Self {
        MetaModelEvent::new(EventKind::AfterAdd, entity)
    }

    pub fn before_remove(entity: EntityRef) -> Self {
        MetaModelEvent::new(EventKind::BeforeRemove, entity)
    }

    pub fn updated(entity: EntityRef) -> Self {
        MetaModelEvent::new(EventKind::Updated, entity)
    }
}
