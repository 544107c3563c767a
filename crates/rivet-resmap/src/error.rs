//! Error types for resource map operations.

use thiserror::Error;

/// Errors that can occur while declaring or merging resource map layers.
#[derive(Debug, Error)]
pub enum MapError {
    /// Two distinct names claim the same slot in one namespace.
    #[error("{namespace} slot {slot} claimed by both '{name}' and '{other}'")]
    SlotCollision {
        /// Namespace label ("csr", "interrupt", "mem").
        namespace: String,
        /// The name whose declaration triggered the collision.
        name: String,
        /// The name that already held the slot.
        other: String,
        /// The contested slot.
        slot: u64,
    },

    /// One layer redeclares a name with a conflicting slot request.
    #[error("{namespace} name '{name}' redeclared as {new} (already {existing})")]
    DuplicateName {
        namespace: String,
        name: String,
        /// Rendering of the existing request ("slot N" or "auto").
        existing: String,
        /// Rendering of the conflicting request.
        new: String,
    },

    /// A resolve was requested for a name no layer declared.
    #[error("{namespace} name '{name}' was never declared in any layer")]
    UnknownResource { namespace: String, name: String },
}

/// Result type for resource map operations.
pub type Result<T> = std::result::Result<T, MapError>;
