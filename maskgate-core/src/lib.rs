//! # maskgate core
//!
//! Bitmask-backed role attributes for persisted entities.
//!
//! An entity type declares a [`RoleAttribute`]: an alias (`roles` by
//! default), an ordered [`RoleVocabulary`], and the integer column that
//! stores the mask. Each entity then carries a [`RoleField`] for that
//! alias. Role `i` of the vocabulary is bit `i` of the mask.
//!
//! ```rust
//! use maskgate_core::{RoleAttribute, RoleField};
//!
//! let roles = RoleAttribute::declare(["read", "write"]).unwrap();
//! let field = RoleField::with_mask(roles.clone(), Some(3));
//!
//! assert_eq!(field.get().as_slice(), ["read", "write"]);
//! assert!(field.has(["read"]));
//! assert!(!field.has(["delete"]));
//!
//! // Storage-side predicate for "holds write"
//! assert_eq!(roles.with_role("write").to_string(), "(roles_mask & 2) > 0");
//! ```
//!
//! Names outside a vocabulary are ignored everywhere instead of raising.
//! The only errors this crate produces are declaration-time ones.

pub mod error;
pub mod registry;
pub mod roles;

pub use error::{Result, RoleError};
pub use registry::{RoleRegistry, RoleRegistryBuilder};
pub use roles::*;
