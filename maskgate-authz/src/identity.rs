//! Caller identity integration
//!
//! Authentication belongs to the host. The authorization layer only needs
//! two things from it per identity scope (`user`, `admin`, ...): a way to
//! read the current identity and a way to insist that one is present.

use crate::context::AuthorizationContext;
use crate::entity::EntityRef;
use crate::error::AuthzError;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

type CurrentIdentityFn = Arc<dyn Fn(&AuthorizationContext) -> Option<EntityRef> + Send + Sync>;
type EnsureAuthenticatedFn =
    Arc<dyn Fn(&AuthorizationContext) -> Result<(), AuthzError> + Send + Sync>;

/// Accessor pair for one identity scope
#[derive(Clone)]
pub struct IdentityAccessor {
    scope: String,
    current: CurrentIdentityFn,
    ensure: EnsureAuthenticatedFn,
}

impl IdentityAccessor {
    /// Accessor built from host callbacks
    pub fn new<C, E>(scope: impl Into<String>, current_identity: C, ensure_authenticated: E) -> Self
    where
        C: Fn(&AuthorizationContext) -> Option<EntityRef> + Send + Sync + 'static,
        E: Fn(&AuthorizationContext) -> Result<(), AuthzError> + Send + Sync + 'static,
    {
        Self {
            scope: scope.into(),
            current: Arc::new(current_identity),
            ensure: Arc::new(ensure_authenticated),
        }
    }

    /// Accessor reading identities stored with
    /// [`AuthorizationContext::with_identity`]; authentication fails when
    /// none was stored for `scope`.
    pub fn session(scope: impl Into<String>) -> Self {
        let scope = scope.into();
        let current_scope = scope.clone();
        let ensure_scope = scope.clone();

        Self::new(
            scope,
            move |ctx: &AuthorizationContext| ctx.identity(&current_scope).cloned(),
            move |ctx: &AuthorizationContext| match ctx.identity(&ensure_scope) {
                Some(_) => Ok(()),
                None => Err(AuthzError::Unauthenticated(ensure_scope.clone())),
            },
        )
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn current_identity(&self, ctx: &AuthorizationContext) -> Option<EntityRef> {
        (self.current)(ctx)
    }

    pub fn ensure_authenticated(&self, ctx: &AuthorizationContext) -> Result<(), AuthzError> {
        (self.ensure)(ctx)
    }
}

impl fmt::Debug for IdentityAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityAccessor")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Entity to authorize under `name`.
///
/// An entity already bound under `name` wins. Otherwise the accessor's
/// current identity is read and authentication is then enforced; the
/// authenticator only gates, it never supplies the identity.
pub fn resolve_caller_identity(
    name: &str,
    ctx: &AuthorizationContext,
    accessor: Option<&IdentityAccessor>,
) -> Result<EntityRef, AuthzError> {
    if let Some(bound) = ctx.get(name) {
        return Ok(bound.clone());
    }

    let accessor = accessor.ok_or_else(|| {
        AuthzError::configuration(format!(
            "nothing is bound under `{name}` and no identity accessor is declared for it"
        ))
    })?;

    debug!(
        request_id = %ctx.request_id(),
        scope = %accessor.scope(),
        "Falling back to current identity"
    );

    let identity = accessor.current_identity(ctx);
    accessor.ensure_authenticated(ctx)?;

    identity.ok_or_else(|| AuthzError::Unauthenticated(accessor.scope().to_string()))
}
