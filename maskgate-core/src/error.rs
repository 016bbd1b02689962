//! Error types for maskgate role declarations.
//!
//! Every error in this module is raised while role vocabularies and role
//! attributes are being declared, which normally happens once at process
//! start. None of them can occur while encoding, decoding or querying masks:
//! unknown role names are ignored by those operations rather than rejected.
//!
//! # Examples
//!
//! ```rust
//! use maskgate_core::{RoleError, RoleVocabulary};
//!
//! let err = RoleVocabulary::new(["read", "read"]).unwrap_err();
//! assert!(matches!(err, RoleError::DuplicateRole(_)));
//! ```

use thiserror::Error;

/// Result type alias for role declaration operations.
pub type Result<T> = std::result::Result<T, RoleError>;

/// Errors raised while declaring role vocabularies and attributes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleError {
    /// The same role name appears twice in one vocabulary.
    #[error("Duplicate role in vocabulary: {0}")]
    DuplicateRole(String),

    /// The vocabulary has more roles than the mask integer has bits.
    #[error("Too many roles: {count} declared, at most {max} fit in a role mask")]
    TooManyRoles {
        /// Number of roles that were declared.
        count: usize,
        /// Bit width of [`RoleMask`](crate::RoleMask).
        max: usize,
    },

    /// A role name is empty or contains whitespace.
    #[error("Invalid role name: {0:?}")]
    InvalidRoleName(String),

    /// An attribute alias is empty or not a plain identifier.
    #[error("Invalid role attribute alias: {0:?}")]
    InvalidAlias(String),

    /// The same alias was declared twice for one entity type.
    #[error("Role attribute `{alias}` is already declared for `{entity}`")]
    DuplicateAttribute {
        /// Entity type name.
        entity: String,
        /// Attribute alias.
        alias: String,
    },
}
