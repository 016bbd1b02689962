//! Target resolution strategies
//!
//! A hook that finds a resource is declared with [`ResolveOptions`]. At
//! declaration time those options are turned into exactly one
//! [`ResolutionStrategy`]; contradictory combinations are rejected then,
//! not per request. At request time the strategy yields a
//! ([`Scope`], [`Filter`]) pair that the host [`Repository`] executes.

use crate::context::AuthorizationContext;
use crate::entity::EntityRef;
use crate::error::AuthzError;
use crate::identity::IdentityAccessor;
use crate::inflect::{pluralize, singularize};
use crate::repository::{Filter, Repository, Scope, TypePath};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

type AuthzResult<T> = std::result::Result<T, AuthzError>;

/// Options accepted by find and authorize declarations
///
/// At most one of `through`, `from` and `namespace`/`class_name` may be
/// given. `find_attribute` and `param_key` adjust the lookup key; `with`
/// names the entity whose roles are checked instead of the found resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveOptions {
    pub from: Option<String>,
    pub through: Option<String>,
    pub namespace: Option<String>,
    pub class_name: Option<String>,
    pub find_attribute: Option<String>,
    pub param_key: Option<String>,
    pub with: Option<String>,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope the lookup to a plural association of a bound entity or identity
    pub fn from(mut self, owner: &str) -> Self {
        self.from = Some(owner.to_string());
        self
    }

    /// Resolve through a join association of the default scope
    pub fn through(mut self, association: &str) -> Self {
        self.through = Some(association.to_string());
        self
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    pub fn class_name(mut self, class_name: &str) -> Self {
        self.class_name = Some(class_name.to_string());
        self
    }

    /// Column to match instead of `id`
    pub fn find_attribute(mut self, field: &str) -> Self {
        self.find_attribute = Some(field.to_string());
        self
    }

    /// Request parameter to read instead of the key column's name
    pub fn param_key(mut self, key: &str) -> Self {
        self.param_key = Some(key.to_string());
        self
    }

    /// Authorize against this entity rather than the resolved resource
    ///
    /// Not combinable with `through`, whose joined record is always the
    /// entity authorized.
    pub fn with(mut self, name: &str) -> Self {
        self.with = Some(name.to_string());
        self
    }

    /// Select the single strategy these options describe
    pub fn strategy(&self, resource: &str) -> AuthzResult<ResolutionStrategy> {
        let typed = self.namespace.is_some() || self.class_name.is_some();
        let given = [self.through.is_some(), self.from.is_some(), typed]
            .iter()
            .filter(|given| **given)
            .count();

        if given > 1 {
            return Err(AuthzError::configuration(format!(
                "`{resource}` combines more than one of `through`, `from` and `namespace`/`class_name`"
            )));
        }

        if let Some(association) = &self.through {
            return Ok(ResolutionStrategy::Through {
                association: association.clone(),
            });
        }

        if let Some(owner) = &self.from {
            return Ok(ResolutionStrategy::From {
                owner: owner.clone(),
            });
        }

        let class_name = self
            .class_name
            .clone()
            .unwrap_or_else(|| resource.to_string());

        if typed {
            Ok(ResolutionStrategy::Namespaced {
                namespace: self.namespace.clone(),
                class_name,
            })
        } else {
            Ok(ResolutionStrategy::Default { class_name })
        }
    }

    pub fn lookup(&self) -> KeyLookup {
        let field = self
            .find_attribute
            .clone()
            .unwrap_or_else(|| KeyLookup::DEFAULT_FIELD.to_string());
        let param = self.param_key.clone().unwrap_or_else(|| field.clone());
        KeyLookup { field, param }
    }

    /// Validate and freeze into a plan for `resource`
    pub fn plan(&self, resource: &str) -> AuthzResult<FindPlan> {
        if resource.is_empty() {
            return Err(AuthzError::configuration("resource name must not be empty"));
        }

        if let (Some(association), Some(with)) = (&self.through, &self.with) {
            return Err(AuthzError::configuration(format!(
                "`{resource}` is authorized through `{association}`; `with: {with}` cannot apply"
            )));
        }

        Ok(FindPlan {
            resource: resource.to_string(),
            strategy: self.strategy(resource)?,
            lookup: self.lookup(),
        })
    }
}

/// How a resource is located
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Via a join association of the default scope identity
    Through { association: String },
    /// Via the plural association of a bound entity or identity
    From { owner: String },
    /// Directly on a (possibly namespaced) type
    Namespaced {
        namespace: Option<String>,
        class_name: String,
    },
    /// Directly on the type named like the resource
    Default { class_name: String },
}

/// Column matched and the request parameter supplying its value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyLookup {
    pub field: String,
    pub param: String,
}

impl KeyLookup {
    pub const DEFAULT_FIELD: &'static str = "id";
}

impl Default for KeyLookup {
    fn default() -> Self {
        Self {
            field: Self::DEFAULT_FIELD.to_string(),
            param: Self::DEFAULT_FIELD.to_string(),
        }
    }
}

/// A resolved declaration: what to find and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindPlan {
    pub resource: String,
    pub strategy: ResolutionStrategy,
    pub lookup: KeyLookup,
}

impl FindPlan {
    /// Name the joined record is bound under for `through` plans
    pub fn join_name(&self) -> Option<String> {
        match &self.strategy {
            ResolutionStrategy::Through { association } => Some(singularize(association)),
            _ => None,
        }
    }

    /// Scope and filter for this request.
    ///
    /// `owner` is the entity the `through`/`from` association hangs off;
    /// it is ignored by the type-based strategies.
    pub fn query(
        &self,
        ctx: &AuthorizationContext,
        owner: Option<EntityRef>,
    ) -> AuthzResult<(Scope, Filter)> {
        let key_filter = || {
            Filter::eq(
                &self.lookup.field,
                ctx.param(&self.lookup.param).unwrap_or(Value::Null),
            )
        };

        let require_owner = |owner: Option<EntityRef>| {
            owner.ok_or_else(|| {
                AuthzError::configuration(format!("no scope to resolve `{}` from", self.resource))
            })
        };

        match &self.strategy {
            ResolutionStrategy::Through { association } => {
                let foreign_key = format!("{}_id", self.resource);
                let filter = match ctx
                    .param(&foreign_key)
                    .or_else(|| ctx.param(&self.lookup.param))
                {
                    Some(value) => Filter::eq(foreign_key, value),
                    None => Filter::All,
                };
                Ok((Scope::association(require_owner(owner)?, association), filter))
            }
            ResolutionStrategy::From { .. } => Ok((
                Scope::association(require_owner(owner)?, pluralize(&self.resource)),
                key_filter(),
            )),
            ResolutionStrategy::Namespaced {
                namespace,
                class_name,
            } => Ok((
                Scope::Type(TypePath {
                    namespace: namespace.clone(),
                    name: class_name.clone(),
                }),
                key_filter(),
            )),
            ResolutionStrategy::Default { class_name } => {
                Ok((Scope::Type(TypePath::new(class_name)), key_filter()))
            }
        }
    }
}

/// Executes [`FindPlan`]s against a repository and binds the results
pub struct Resolver<'a> {
    repository: &'a dyn Repository,
    identities: &'a HashMap<String, IdentityAccessor>,
    default_scope: Option<&'a str>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        repository: &'a dyn Repository,
        identities: &'a HashMap<String, IdentityAccessor>,
        default_scope: Option<&'a str>,
    ) -> Self {
        Self {
            repository,
            identities,
            default_scope,
        }
    }

    /// Find the plan's resource and bind it under its name.
    ///
    /// `through` plans also bind the joined record under the singular
    /// association name. A lookup without a match is
    /// [`AuthzError::NotFound`].
    pub async fn find(
        &self,
        plan: &FindPlan,
        ctx: &mut AuthorizationContext,
    ) -> AuthzResult<EntityRef> {
        let owner = self.owner(plan, ctx)?;
        let (scope, filter) = plan.query(ctx, owner)?;

        debug!(
            request_id = %ctx.request_id(),
            resource = %plan.resource,
            scope = %scope,
            filter = %filter,
            "Resolving resource"
        );

        let mut record = self.find_one(&plan.resource, &scope, &filter).await?;

        if let Some(join_name) = plan.join_name() {
            ctx.bind(join_name, record.clone());
            let target = Scope::association(record, plan.resource.clone());
            record = self.find_one(&plan.resource, &target, &Filter::All).await?;
        }

        ctx.bind(plan.resource.clone(), record.clone());
        Ok(record)
    }

    async fn find_one(
        &self,
        resource: &str,
        scope: &Scope,
        filter: &Filter,
    ) -> AuthzResult<EntityRef> {
        self.repository
            .find(scope, filter)
            .await?
            .ok_or_else(|| AuthzError::NotFound {
                resource: resource.to_string(),
                scope: format!("{scope} where {filter}"),
            })
    }

    fn owner(
        &self,
        plan: &FindPlan,
        ctx: &AuthorizationContext,
    ) -> AuthzResult<Option<EntityRef>> {
        let name = match &plan.strategy {
            ResolutionStrategy::Through { .. } => self.default_scope.ok_or_else(|| {
                AuthzError::configuration(format!(
                    "`{}` resolves through an association but no default scope is declared",
                    plan.resource
                ))
            })?,
            ResolutionStrategy::From { owner } => {
                if let Some(bound) = ctx.get(owner) {
                    return Ok(Some(bound.clone()));
                }
                owner.as_str()
            }
            _ => return Ok(None),
        };

        let accessor = self.identities.get(name).ok_or_else(|| {
            AuthzError::configuration(format!("no identity accessor declared for `{name}`"))
        })?;

        accessor
            .current_identity(ctx)
            .map(Some)
            .ok_or_else(|| AuthzError::Unauthenticated(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_strategy() {
        let plan = ResolveOptions::new().plan("document").unwrap();

        assert_eq!(
            plan.strategy,
            ResolutionStrategy::Default {
                class_name: "document".to_string()
            }
        );
        assert_eq!(plan.lookup, KeyLookup::default());
        assert_eq!(plan.join_name(), None);
    }

    #[test]
    fn test_namespaced_strategy() {
        let plan = ResolveOptions::new().namespace("admin").plan("report").unwrap();
        let ctx = AuthorizationContext::new("show", json!({"id": 4}));
        let (scope, filter) = plan.query(&ctx, None).unwrap();

        assert_eq!(scope.to_string(), "admin/report");
        assert_eq!(filter, Filter::eq("id", json!(4)));
    }

    #[test]
    fn test_class_name_alone_is_typed() {
        let strategy = ResolveOptions::new().class_name("document").strategy("doc").unwrap();

        assert_eq!(
            strategy,
            ResolutionStrategy::Namespaced {
                namespace: None,
                class_name: "document".to_string()
            }
        );
    }

    #[test]
    fn test_conflicting_options_rejected() {
        let err = ResolveOptions::new()
            .through("memberships")
            .from("user")
            .plan("document")
            .unwrap_err();
        assert!(err.is_configuration());

        let err = ResolveOptions::new()
            .from("user")
            .namespace("admin")
            .plan("document")
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_through_rejects_with() {
        let err = ResolveOptions::new()
            .through("memberships")
            .with("admin")
            .plan("document")
            .unwrap_err();
        assert!(err.is_configuration());

        assert!(ResolveOptions::new().namespace("admin").with("admin").plan("report").is_ok());
    }

    #[test]
    fn test_custom_lookup_key() {
        let lookup = ResolveOptions::new().find_attribute("token").lookup();
        assert_eq!(lookup.field, "token");
        assert_eq!(lookup.param, "token");

        let lookup = ResolveOptions::new()
            .find_attribute("token")
            .param_key("id")
            .lookup();
        assert_eq!(lookup.field, "token");
        assert_eq!(lookup.param, "id");
    }

    #[test]
    fn test_missing_param_filters_on_null() {
        let plan = ResolveOptions::new().plan("document").unwrap();
        let ctx = AuthorizationContext::new("show", json!({}));
        let (_, filter) = plan.query(&ctx, None).unwrap();

        assert_eq!(filter, Filter::eq("id", Value::Null));
    }

    #[test]
    fn test_through_without_owner_is_configuration_error() {
        let plan = ResolveOptions::new().through("memberships").plan("document").unwrap();
        let ctx = AuthorizationContext::new("show", json!({"id": 1}));

        assert_eq!(plan.join_name().as_deref(), Some("membership"));
        assert!(plan.query(&ctx, None).unwrap_err().is_configuration());
    }

    #[test]
    fn test_options_deserialize() {
        let options: ResolveOptions =
            serde_json::from_value(json!({"through": "memberships", "param_key": "doc"})).unwrap();

        assert_eq!(options, ResolveOptions::new().through("memberships").param_key("doc"));
        assert!(serde_json::from_value::<ResolveOptions>(json!({"thru": "x"})).is_err());
    }
}
