//! Declarative authorization for request handlers

use crate::config::{AuthzConfig, HookConfig};
use crate::context::AuthorizationContext;
use crate::decision;
use crate::entity::EntityRef;
use crate::error::AuthzError;
use crate::hooks::{AuthorizeStep, BeforeAction, Hook, HookKind, RouteFilter};
use crate::identity::{IdentityAccessor, resolve_caller_identity};
use crate::repository::Repository;
use crate::resolver::{FindPlan, ResolutionStrategy, ResolveOptions, Resolver};
use async_trait::async_trait;
use maskgate_core::RoleRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

// Use fully qualified Result to avoid ambiguity
type AuthzResult<T> = std::result::Result<T, AuthzError>;

/// Runs find/authorize hooks for a handler type
///
/// Built once at startup from declarations; every check that can fail
/// without a request (conflicting options, undeclared identity scopes,
/// required roles outside the target's vocabulary) fails in
/// [`AuthorizerBuilder::build`] instead.
pub struct Authorizer {
    repository: Arc<dyn Repository>,
    identities: HashMap<String, IdentityAccessor>,
    default_scope: Option<String>,
    registry: Arc<RoleRegistry>,
    hooks: Vec<Hook>,
    audit_enabled: bool,
}

impl Authorizer {
    /// Create a new authorizer builder
    pub fn builder() -> AuthorizerBuilder {
        AuthorizerBuilder::new()
    }

    /// Hooks in execution order
    pub fn hooks(&self) -> &[Hook] {
        &self.hooks
    }

    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    pub fn default_scope(&self) -> Option<&str> {
        self.default_scope.as_deref()
    }

    /// Run one hook regardless of its route filter
    pub async fn run(&self, hook: &Hook, ctx: &mut AuthorizationContext) -> AuthzResult<()> {
        debug!(
            request_id = %ctx.request_id(),
            action = %ctx.action(),
            hook = %hook.describe(),
            "Running authorization hook"
        );

        match &hook.kind {
            HookKind::Authenticate { scope } => self.authenticate(scope, ctx),
            HookKind::Find { plan, authorize } => {
                self.find(plan, ctx).await?;
                match authorize {
                    Some(step) => self.authorize(&step.target, &step.required, ctx),
                    None => Ok(()),
                }
            }
            HookKind::Authorize(step) => self.authorize(&step.target, &step.required, ctx),
        }
    }

    /// Enforce authentication for an identity scope
    pub fn authenticate(&self, scope: &str, ctx: &AuthorizationContext) -> AuthzResult<()> {
        let accessor = self.identities.get(scope).ok_or_else(|| {
            AuthzError::configuration(format!("no identity accessor declared for `{scope}`"))
        })?;
        accessor.ensure_authenticated(ctx)
    }

    /// Find and bind the plan's resource
    pub async fn find(
        &self,
        plan: &FindPlan,
        ctx: &mut AuthorizationContext,
    ) -> AuthzResult<EntityRef> {
        let resolver = Resolver::new(
            self.repository.as_ref(),
            &self.identities,
            self.default_scope.as_deref(),
        );

        resolver.find(plan, ctx).await.inspect_err(|e| {
            if e.is_not_found() && self.audit_enabled {
                warn!(
                    request_id = %ctx.request_id(),
                    action = %ctx.action(),
                    resource = %plan.resource,
                    result = "not found",
                    "Resource lookup"
                );
            }
        })
    }

    /// Check `target`'s roles against `required`
    ///
    /// `target` is a binding name, falling back to the identity scope of
    /// the same name. Any one matching role suffices; an empty `required`
    /// only needs the target to exist.
    pub fn authorize(
        &self,
        target: &str,
        required: &[String],
        ctx: &AuthorizationContext,
    ) -> AuthzResult<()> {
        let entity = resolve_caller_identity(target, ctx, self.identities.get(target))?;
        if required.is_empty() {
            debug!(
                request_id = %ctx.request_id(),
                target = %target,
                "No roles required"
            );
            return Ok(());
        }

        let field = entity.role_field().ok_or_else(|| {
            AuthzError::configuration(format!(
                "`{target}` ({}) declares no role attribute to authorize against",
                entity.kind()
            ))
        })?;

        let actual = field.get();
        match decision::authorize(field.attribute_name(), required, actual.as_slice()) {
            Ok(()) => {
                if self.audit_enabled {
                    info!(
                        request_id = %ctx.request_id(),
                        action = %ctx.action(),
                        target = %target,
                        attribute = %field.attribute_name(),
                        result = "granted",
                        "Authorization check"
                    );
                }
                Ok(())
            }
            Err(denied) => {
                if self.audit_enabled {
                    warn!(
                        request_id = %ctx.request_id(),
                        action = %ctx.action(),
                        target = %target,
                        attribute = %field.attribute_name(),
                        required = ?denied.required,
                        actual = ?denied.actual,
                        result = "denied",
                        "Authorization check"
                    );
                }
                Err(denied.into())
            }
        }
    }
}

#[async_trait]
impl BeforeAction for Authorizer {
    async fn before_action(&self, ctx: &mut AuthorizationContext) -> AuthzResult<()> {
        for hook in &self.hooks {
            if hook.applies_to(ctx.action()) {
                self.run(hook, ctx).await?;
            }
        }

        debug!(
            request_id = %ctx.request_id(),
            action = %ctx.action(),
            "Authorization hooks passed"
        );
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Declaration {
    Authenticate {
        scope: String,
    },
    Find {
        resource: String,
        required: Option<Vec<String>>,
        options: ResolveOptions,
    },
    Authorize {
        resource: String,
        required: Vec<String>,
    },
}

/// Builder for [`Authorizer`]
pub struct AuthorizerBuilder {
    repository: Option<Arc<dyn Repository>>,
    identities: HashMap<String, IdentityAccessor>,
    default_scope: Option<String>,
    registry: Option<RoleRegistry>,
    declarations: Vec<(Declaration, RouteFilter)>,
    audit_enabled: bool,
    deferred_error: Option<AuthzError>,
}

impl AuthorizerBuilder {
    pub fn new() -> Self {
        Self {
            repository: None,
            identities: HashMap::new(),
            default_scope: None,
            registry: None,
            declarations: Vec::new(),
            audit_enabled: false,
            deferred_error: None,
        }
    }

    /// Persistence used by find hooks
    pub fn with_repository(mut self, repository: Arc<dyn Repository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Role declarations used to validate authorize hooks
    pub fn with_registry(mut self, registry: RoleRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Enable audit logging of grants and denials
    pub fn with_audit_logging(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }

    /// Declare how to read and authenticate an identity scope
    pub fn identity(mut self, accessor: IdentityAccessor) -> Self {
        self.identities.insert(accessor.scope().to_string(), accessor);
        self
    }

    /// Identity scope that `through` lookups start from
    pub fn default_scope(mut self, scope: &str) -> Self {
        self.default_scope = Some(scope.to_string());
        self
    }

    /// Apply a configuration file's settings, roles, identities and hooks
    pub fn with_config(mut self, config: &AuthzConfig) -> Self {
        self.audit_enabled = config.audit_enabled;
        if let Some(scope) = &config.default_scope {
            self.default_scope = Some(scope.clone());
        }
        for scope in &config.identities {
            self = self.identity(IdentityAccessor::session(scope));
        }

        match config.build_registry() {
            Ok(registry) => self.registry = Some(registry),
            Err(e) => {
                self.deferred_error.get_or_insert(e);
            }
        }

        for hook in &config.hooks {
            self = match hook.clone() {
                HookConfig::RequireAuthentication { scope, filter } => {
                    self.require_authentication(&scope, filter)
                }
                HookConfig::FindAndAuthorize {
                    resource,
                    roles,
                    options,
                    filter,
                } => self.find_and_authorize(&resource, roles.as_slice(), options, filter),
                HookConfig::FindResource {
                    resource,
                    options,
                    filter,
                } => self.find_resource(&resource, options, filter),
                HookConfig::AuthorizeAgainst {
                    resource,
                    roles,
                    filter,
                } => self.authorize_against(&resource, roles.as_slice(), filter),
            };
        }
        self
    }

    /// Require an authenticated identity in `scope`
    pub fn require_authentication(self, scope: &str, filter: RouteFilter) -> Self {
        self.declare(
            Declaration::Authenticate {
                scope: scope.to_string(),
            },
            filter,
        )
    }

    /// Find `resource`, then require one of `required` (none: any role)
    pub fn find_and_authorize<S: AsRef<str>>(
        self,
        resource: &str,
        required: &[S],
        options: ResolveOptions,
        filter: RouteFilter,
    ) -> Self {
        let required: Vec<String> = required.iter().map(|r| r.as_ref().to_string()).collect();
        self.declare(
            Declaration::Find {
                resource: resource.to_string(),
                required: (!required.is_empty()).then_some(required),
                options,
            },
            filter,
        )
    }

    /// Find and bind `resource` without a role check
    pub fn find_resource(self, resource: &str, options: ResolveOptions, filter: RouteFilter) -> Self {
        self.declare(
            Declaration::Find {
                resource: resource.to_string(),
                required: None,
                options,
            },
            filter,
        )
    }

    /// Require one of `required` on a bound entity or identity named `resource`
    pub fn authorize_against<S: AsRef<str>>(
        self,
        resource: &str,
        required: &[S],
        filter: RouteFilter,
    ) -> Self {
        self.declare(
            Declaration::Authorize {
                resource: resource.to_string(),
                required: required.iter().map(|r| r.as_ref().to_string()).collect(),
            },
            filter,
        )
    }

    fn declare(mut self, declaration: Declaration, filter: RouteFilter) -> Self {
        if filter.prepend {
            self.declarations.insert(0, (declaration, filter));
        } else {
            self.declarations.push((declaration, filter));
        }
        self
    }

    /// Validate every declaration and build the authorizer
    pub fn build(self) -> AuthzResult<Authorizer> {
        if let Some(e) = self.deferred_error {
            return Err(e);
        }

        let repository = self
            .repository
            .ok_or_else(|| AuthzError::configuration("an authorizer needs a repository"))?;
        let registry = self.registry.unwrap_or_default();

        if let Some(scope) = &self.default_scope
            && !self.identities.contains_key(scope)
        {
            return Err(AuthzError::configuration(format!(
                "default scope `{scope}` has no identity accessor"
            )));
        }

        let mut hooks = Vec::with_capacity(self.declarations.len());
        for (declaration, filter) in self.declarations {
            let kind = match declaration {
                Declaration::Authenticate { scope } => HookKind::Authenticate { scope },
                Declaration::Find {
                    resource,
                    required,
                    options,
                } => {
                    let plan = options.plan(&resource)?;
                    let authorize = required.map(|required| AuthorizeStep {
                        target: plan
                            .join_name()
                            .or_else(|| options.with.clone())
                            .unwrap_or_else(|| resource.clone()),
                        required,
                    });
                    HookKind::Find { plan, authorize }
                }
                Declaration::Authorize { resource, required } => HookKind::Authorize(AuthorizeStep {
                    target: resource,
                    required,
                }),
            };
            hooks.push(Hook { kind, filter });
        }

        let mut bound: Vec<(String, &RouteFilter)> = Vec::new();
        for hook in &hooks {
            check_hook(hook, &bound, &self.identities, self.default_scope.as_deref(), &registry)?;
            bound.extend(bound_by(hook).into_iter().map(|name| (name, &hook.filter)));
        }

        info!(
            hooks = hooks.len(),
            identities = self.identities.len(),
            audit = self.audit_enabled,
            "Authorizer built"
        );

        Ok(Authorizer {
            repository,
            identities: self.identities,
            default_scope: self.default_scope,
            registry: Arc::new(registry),
            hooks,
            audit_enabled: self.audit_enabled,
        })
    }
}

impl Default for AuthorizerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Names a find hook binds once it has run
fn bound_by(hook: &Hook) -> Vec<String> {
    match &hook.kind {
        HookKind::Find { plan, .. } => {
            let mut names = vec![plan.resource.clone()];
            names.extend(plan.join_name());
            names
        }
        _ => Vec::new(),
    }
}

/// `bound` holds names bound by earlier hooks with the filters they run under
fn check_hook(
    hook: &Hook,
    bound: &[(String, &RouteFilter)],
    identities: &HashMap<String, IdentityAccessor>,
    default_scope: Option<&str>,
    registry: &RoleRegistry,
) -> AuthzResult<()> {
    let resolvable = |name: &str| {
        identities.contains_key(name)
            || bound
                .iter()
                .any(|(bound_name, filter)| bound_name == name && filter.covers(&hook.filter))
    };

    let step = match &hook.kind {
        HookKind::Authenticate { scope } => {
            if !identities.contains_key(scope) {
                return Err(AuthzError::configuration(format!(
                    "authentication required for `{scope}`, which has no identity accessor"
                )));
            }
            return Ok(());
        }
        HookKind::Find { plan, authorize } => {
            match &plan.strategy {
                ResolutionStrategy::Through { association } if default_scope.is_none() => {
                    return Err(AuthzError::configuration(format!(
                        "`{}` resolves through `{association}` but no default scope is declared",
                        plan.resource
                    )));
                }
                ResolutionStrategy::From { owner } if !resolvable(owner) => {
                    return Err(AuthzError::configuration(format!(
                        "`{}` resolves from `{owner}`, which nothing binds and no identity provides",
                        plan.resource
                    )));
                }
                _ => {}
            }
            match authorize {
                Some(step) => step,
                None => return Ok(()),
            }
        }
        HookKind::Authorize(step) => step,
    };

    if !resolvable(&step.target) && !bound_by(hook).contains(&step.target) {
        return Err(AuthzError::configuration(format!(
            "`{}` is authorized but no earlier hook binds it for the same actions and no identity provides it",
            step.target
        )));
    }

    if let Some(attribute) = registry.primary(&step.target) {
        let vocabulary = attribute.vocabulary();
        let unknown: Vec<&str> = step
            .required
            .iter()
            .map(String::as_str)
            .filter(|role| !vocabulary.contains(role))
            .collect();

        if !step.required.is_empty() && unknown.len() == step.required.len() {
            return Err(AuthzError::configuration(format!(
                "none of {:?} are {} of `{}` {}; the check could never pass",
                step.required,
                attribute.attribute_name(),
                step.target,
                vocabulary
            )));
        }
        if !unknown.is_empty() {
            warn!(
                target = %step.target,
                unknown = ?unknown,
                "Required roles outside the target's vocabulary are ignored"
            );
        }
    }

    Ok(())
}
