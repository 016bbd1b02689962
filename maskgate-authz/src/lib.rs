//! Declarative find-and-authorize hooks over bitmask role attributes
//!
//! Handlers declare, ahead of time, which resource an action operates on
//! and which roles a caller must hold for it. Before the handler runs, the
//! [`Authorizer`] locates the resource through the host's [`Repository`],
//! binds it on the [`AuthorizationContext`], and checks the roles decoded
//! from the entity's mask.
//!
//! # Features
//!
//! - **Resolution strategies**: direct, namespaced, scoped to a bound owner
//!   (`from`) or via a join association of the current identity (`through`)
//! - **Any-of decisions**: one matching role suffices, with a readable
//!   denial message listing both sides
//! - **Fail-fast declarations**: contradictory options and unreachable
//!   targets are rejected when the authorizer is built
//! - **Audit logging**: grants and denials as structured `tracing` events
//! - **JSON configuration**: roles, identities and hooks loaded from a file
//!
//! # Quick Start
//!
//! ```rust
//! use maskgate_authz::prelude::*;
//! use serde_json::{Value, json};
//! use std::any::Any;
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct Admin {
//!     access: RoleField,
//! }
//!
//! impl Entity for Admin {
//!     fn kind(&self) -> &str {
//!         "admin"
//!     }
//!
//!     fn attribute(&self, _field: &str) -> Option<Value> {
//!         None
//!     }
//!
//!     fn role_field(&self) -> Option<&RoleField> {
//!         Some(&self.access)
//!     }
//!
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! struct NoRecords;
//!
//! #[async_trait::async_trait]
//! impl Repository for NoRecords {
//!     async fn find(&self, _: &Scope, _: &Filter) -> anyhow::Result<Option<EntityRef>> {
//!         Ok(None)
//!     }
//!
//!     async fn list(&self, _: &Scope, _: &Filter) -> anyhow::Result<Vec<EntityRef>> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let access = RoleAttribute::declare_as(["support", "content", "marketing"], "access")?;
//!
//!     let authorizer = Authorizer::builder()
//!         .with_repository(Arc::new(NoRecords))
//!         .identity(IdentityAccessor::session("admin"))
//!         .authorize_against("admin", &["content"], RouteFilter::all())
//!         .build()?;
//!
//!     let admin = Admin {
//!         access: RoleField::with_roles(access, ["support"]),
//!     };
//!     let mut ctx = AuthorizationContext::new("index", json!({}))
//!         .with_identity("admin", Arc::new(admin));
//!
//!     let err = authorizer.before_action(&mut ctx).await.unwrap_err();
//!     assert_eq!(
//!         err.to_string(),
//!         "Access denied: content is required; however, you have support roles set"
//!     );
//!     Ok(())
//! }
//! ```

pub mod authorizer;
pub mod config;
pub mod context;
pub mod decision;
pub mod entity;
pub mod error;
pub mod hooks;
pub mod identity;
pub mod inflect;
pub mod repository;
pub mod resolver;

pub mod prelude {
    //! Common imports for maskgate authorization

    pub use crate::authorizer::{Authorizer, AuthorizerBuilder};
    pub use crate::config::*;
    pub use crate::context::*;
    pub use crate::decision::{Denied, authorize, authorize_entity};
    pub use crate::entity::*;
    pub use crate::error::*;
    pub use crate::hooks::*;
    pub use crate::identity::*;
    pub use crate::repository::*;
    pub use crate::resolver::*;

    // Re-export role mask types
    pub use maskgate_core::{
        RoleAttribute, RoleError, RoleField, RoleFilter, RoleMask, RoleRegistry, RoleSet,
        RoleVocabulary,
    };

    // Common Result type
    pub type Result<T> = std::result::Result<T, AuthzError>;
}

// Re-export major components at crate level
pub use authorizer::{Authorizer, AuthorizerBuilder};
pub use context::AuthorizationContext;
pub use decision::Denied;
pub use entity::{Entity, EntityRef};
pub use error::AuthzError;
pub use hooks::{BeforeAction, RouteFilter};
pub use identity::IdentityAccessor;
pub use prelude::Result;
pub use repository::{Filter, Repository, Scope};
pub use resolver::ResolveOptions;
