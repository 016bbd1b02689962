//! Pre-handler hooks and their route filters

use crate::context::AuthorizationContext;
use crate::error::AuthzError;
use crate::resolver::FindPlan;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Which actions a hook runs for
///
/// Passed through untouched to hosts that run hooks with their own
/// dispatcher; [`RouteFilter::applies_to`] serves the built-in one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouteFilter {
    /// Run only for these actions (`None` means every action)
    pub only: Option<Vec<String>>,
    /// Never run for these actions
    pub except: Vec<String>,
    /// Place the hook before all previously declared ones
    pub prepend: bool,
}

impl RouteFilter {
    /// Runs for every action
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            only: Some(actions.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn except<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            except: actions.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn prepended(mut self) -> Self {
        self.prepend = true;
        self
    }

    pub fn applies_to(&self, action: &str) -> bool {
        let included = self
            .only
            .as_ref()
            .is_none_or(|only| only.iter().any(|a| a == action));
        included && !self.except.iter().any(|a| a == action)
    }

    /// Whether this filter runs for every action `other` runs for
    pub fn covers(&self, other: &RouteFilter) -> bool {
        let within_only = match (&self.only, &other.only) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(mine), Some(theirs)) => theirs
                .iter()
                .filter(|action| other.applies_to(action))
                .all(|action| mine.contains(action)),
        };
        within_only && !self.except.iter().any(|action| other.applies_to(action))
    }
}

/// Role check against a named entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeStep {
    /// Binding or identity scope whose roles are checked
    pub target: String,
    /// Any one of these suffices
    pub required: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookKind {
    /// Require the host to have authenticated `scope`
    Authenticate { scope: String },
    /// Find and bind a resource, then optionally authorize
    Find {
        plan: FindPlan,
        authorize: Option<AuthorizeStep>,
    },
    /// Authorize an already bound entity or the current identity
    Authorize(AuthorizeStep),
}

/// One declared pre-handler check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hook {
    pub kind: HookKind,
    pub filter: RouteFilter,
}

impl Hook {
    pub fn applies_to(&self, action: &str) -> bool {
        self.filter.applies_to(action)
    }

    /// Short label for logs
    pub fn describe(&self) -> String {
        match &self.kind {
            HookKind::Authenticate { scope } => format!("authenticate {scope}"),
            HookKind::Find {
                plan,
                authorize: Some(step),
            } => format!("find and authorize {} as {}", plan.resource, step.target),
            HookKind::Find { plan, .. } => format!("find {}", plan.resource),
            HookKind::Authorize(step) => format!("authorize {}", step.target),
        }
    }
}

/// Seam between the host's request dispatch and the authorization layer
///
/// Called before the handler body runs. Any error aborts the request;
/// [`AuthzError::Denied`] and [`AuthzError::NotFound`] arrive unmodified.
#[async_trait]
pub trait BeforeAction: Send + Sync {
    async fn before_action(&self, ctx: &mut AuthorizationContext) -> Result<(), AuthzError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_filter() {
        assert!(RouteFilter::all().applies_to("index"));

        let only = RouteFilter::only(["edit", "update"]);
        assert!(only.applies_to("edit"));
        assert!(!only.applies_to("show"));

        let except = RouteFilter::except(["index", "new", "create"]);
        assert!(except.applies_to("show"));
        assert!(!except.applies_to("create"));
    }

    #[test]
    fn test_route_filter_covers() {
        let all = RouteFilter::all();
        let edit = RouteFilter::only(["edit", "update"]);

        assert!(all.covers(&edit));
        assert!(edit.covers(&RouteFilter::only(["update"])));
        assert!(!edit.covers(&all));
        assert!(!edit.covers(&RouteFilter::only(["update", "destroy"])));

        let except_index = RouteFilter::except(["index"]);
        assert!(except_index.covers(&RouteFilter::only(["show"])));
        assert!(except_index.covers(&RouteFilter::except(["index", "new"])));
        assert!(!except_index.covers(&all));
    }

    #[test]
    fn test_route_filter_deserializes() {
        let filter: RouteFilter =
            serde_json::from_str(r#"{"only": ["destroy"], "prepend": true}"#).unwrap();

        assert_eq!(filter, RouteFilter::only(["destroy"]).prepended());
        assert!(serde_json::from_str::<RouteFilter>("{}").unwrap().applies_to("show"));
    }
}
