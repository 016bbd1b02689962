//! # maskgate - bitmask roles and declarative authorization
//!
//! This crate re-exports the functionality of the constituent crates:
//! - `maskgate-core`: role vocabularies, mask codec, role fields and query filters
//! - `maskgate-authz`: resource resolution, authorization decisions and hooks

pub use maskgate_authz as authz;
pub use maskgate_core as core;

/// Re-export commonly used items
pub mod prelude {
    pub use crate::authz::prelude::*;
}
