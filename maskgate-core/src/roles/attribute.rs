//! Role attribute declarations.

use super::filter::RoleFilter;
use super::vocabulary::{RoleMask, RoleSet, RoleVocabulary};
use crate::error::{Result, RoleError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Alias used when a declaration does not name one.
pub const DEFAULT_ALIAS: &str = "roles";

/// A role attribute declared on an entity type.
///
/// Binds an alias (`roles`, `access`, ...) to a vocabulary and to the
/// persisted mask column `<alias>_mask`. Declared once at startup and shared
/// by every [`RoleField`](super::RoleField) of that alias through an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAttribute {
    name: String,
    column: String,
    vocabulary: RoleVocabulary,
}

impl RoleAttribute {
    /// Declare roles under the default `roles` alias.
    ///
    /// ```rust
    /// use maskgate_core::RoleAttribute;
    ///
    /// let roles = RoleAttribute::declare(["read", "write", "delete"]).unwrap();
    /// assert_eq!(roles.encode(["delete", "read"]), 0b101);
    /// assert_eq!(roles.column(), "roles_mask");
    /// ```
    pub fn declare<I, S>(roles: I) -> Result<Arc<Self>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::declare_as(roles, DEFAULT_ALIAS)
    }

    /// Declare roles under a custom alias such as `access`.
    pub fn declare_as<I, S>(roles: I, alias: &str) -> Result<Arc<Self>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Arc::new(Self::new(RoleVocabulary::new(roles)?, alias)?))
    }

    /// Bind an existing vocabulary to `alias`.
    pub fn new(vocabulary: RoleVocabulary, alias: &str) -> Result<Self> {
        let valid = alias
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && alias.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(RoleError::InvalidAlias(alias.to_string()));
        }

        Ok(Self {
            name: alias.to_string(),
            column: format!("{alias}_mask"),
            vocabulary,
        })
    }

    /// The alias, e.g. `roles` or `access`. Used in denial messages.
    pub fn attribute_name(&self) -> &str {
        &self.name
    }

    /// Name of the persisted mask column.
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn vocabulary(&self) -> &RoleVocabulary {
        &self.vocabulary
    }

    pub fn encode<I, S>(&self, roles: I) -> RoleMask
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.vocabulary.encode(roles)
    }

    pub fn decode(&self, mask: RoleMask) -> RoleSet {
        self.vocabulary.decode(mask)
    }

    pub fn has_any<I, S>(&self, mask: RoleMask, query: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.vocabulary.has_any(mask, query)
    }

    /// Filter for entities holding `role`.
    ///
    /// An unknown role produces a filter that matches nothing.
    pub fn with_role(&self, role: &str) -> RoleFilter {
        RoleFilter::any_of(&self.column, self.vocabulary.bit(role))
    }

    /// Filter for entities holding every role in `roles`.
    pub fn with_all_roles<I, S>(&self, roles: I) -> RoleFilter
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut clauses: Vec<RoleMask> = roles
            .into_iter()
            .map(|role| self.vocabulary.bit(role.as_ref()))
            .collect();
        clauses.dedup();
        RoleFilter::all_of(&self.column, clauses)
    }
}
