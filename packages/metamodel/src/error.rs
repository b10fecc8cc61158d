//! Model Errors
//!
//! Fatal conditions raised by the metamodel engine. Each variant carries the
//! originating declaration so the host toolchain can attach a diagnostic at
//! the right source location. Recoverable reconciliation (a stale template
//! ref, a method whose annotation went away) is not an error: garbage
//! collection drops it silently and logs at debug level.

use crate::event::MetaModelEvent;
use crate::handle::ElementHandle;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A caller registered an entity for a handle that already has one.
    /// Always a caller bug, never retried.
    #[error("an entity is already registered for {0}")]
    DuplicateEntity(ElementHandle),

    /// A declaration the model depends on vanished without going through
    /// the expected annotation-removal path.
    #[error("declaration for {0} no longer exists")]
    InconsistentState(ElementHandle),

    /// A consumer received an event kind/entity combination it does not
    /// handle. Forward-compatibility guard at the event drain, not a
    /// normal runtime path.
    #[error("unsupported model transition: {0:?}")]
    UnsupportedTransition(MetaModelEvent),

    /// Parameter name, type, and cardinality lists for a method must be
    /// equal length and order-aligned.
    #[error("parameter name/type/cardinality lists differ in length for {0}")]
    ParameterArityMismatch(ElementHandle),
}
