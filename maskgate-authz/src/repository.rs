//! Persistence seam
//!
//! The resolver never builds queries itself. It describes where to look
//! ([`Scope`]) and what to match ([`Filter`]) and hands both to a
//! host-supplied [`Repository`].

use crate::entity::{Entity, EntityRef};
use async_trait::async_trait;
use maskgate_core::RoleFilter;
use serde_json::Value;
use std::fmt;

/// Fully qualified entity type, e.g. `admin/report`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypePath {
    pub namespace: Option<String>,
    pub name: String,
}

impl TypePath {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}/{}", namespace, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Where a lookup runs
#[derive(Debug, Clone)]
pub enum Scope {
    /// Every record of a type
    Type(TypePath),
    /// Records reachable from `owner` through a named association.
    /// Singular associations (`membership.document`) yield at most one record.
    Association { owner: EntityRef, association: String },
}

impl Scope {
    pub fn association(owner: EntityRef, association: impl Into<String>) -> Self {
        Self::Association {
            owner,
            association: association.into(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Type(path) => write!(f, "{}", path),
            Scope::Association { owner, association } => {
                write!(f, "{}.{}", owner.kind(), association)
            }
        }
    }
}

/// What a lookup matches
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every record in scope
    All,
    /// `field = value`
    Eq { field: String, value: Value },
    /// Role mask predicate
    Roles(RoleFilter),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::Eq {
            field: field.into(),
            value,
        }
    }

    /// Evaluate against a record held in memory.
    ///
    /// Equality is loose so that request parameters, which usually arrive
    /// as strings, match numeric columns: `"1"` equals `1`. `null` matches
    /// nothing.
    pub fn matches(&self, entity: &dyn Entity) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { field, value } => entity
                .attribute(field)
                .is_some_and(|actual| loosely_equal(&actual, value)),
            Filter::Roles(roles) => {
                let alias = roles
                    .column
                    .strip_suffix("_mask")
                    .unwrap_or(&roles.column);
                entity
                    .role_field_named(alias)
                    .is_some_and(|field| roles.matches(field.mask().unwrap_or_default()))
            }
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => write!(f, "all"),
            Filter::Eq { field, value } => write!(f, "{} = {}", field, value),
            Filter::Roles(roles) => write!(f, "{}", roles),
        }
    }
}

fn loosely_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => false,
        _ if left == right => true,
        _ => scalar_text(left).is_some_and(|l| scalar_text(right).as_deref() == Some(l.as_str())),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Host persistence capability
///
/// `find` returns the first match or `None`; the resolver turns `None`
/// into [`AuthzError::NotFound`](crate::AuthzError::NotFound).
#[async_trait]
pub trait Repository: Send + Sync {
    async fn find(&self, scope: &Scope, filter: &Filter) -> anyhow::Result<Option<EntityRef>>;

    async fn list(&self, scope: &Scope, filter: &Filter) -> anyhow::Result<Vec<EntityRef>>;
}
