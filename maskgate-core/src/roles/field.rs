//! Per-entity role storage.

use super::attribute::RoleAttribute;
use super::vocabulary::{RoleMask, RoleSet};
use std::sync::Arc;

/// The role mask of one entity for one declared alias.
///
/// Entities hold one `RoleField` per alias they declare. The mask starts out
/// unset, which reads the same as "no roles".
///
/// ```rust
/// use maskgate_core::{RoleAttribute, RoleField};
///
/// let access = RoleAttribute::declare_as(["moderator", "support", "editor"], "access").unwrap();
/// let mut field = RoleField::new(access);
///
/// field.set(["editor", "moderator", "support"]);
/// assert_eq!(field.mask(), Some(7));
/// assert_eq!(field.get().as_slice(), ["moderator", "support", "editor"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleField {
    attribute: Arc<RoleAttribute>,
    mask: Option<RoleMask>,
}

impl RoleField {
    /// Empty field with no mask stored yet.
    pub fn new(attribute: Arc<RoleAttribute>) -> Self {
        Self {
            attribute,
            mask: None,
        }
    }

    /// Field rehydrated from a persisted mask column.
    pub fn with_mask(attribute: Arc<RoleAttribute>, mask: Option<RoleMask>) -> Self {
        Self { attribute, mask }
    }

    /// Field holding the given roles.
    pub fn with_roles<I, S>(attribute: Arc<RoleAttribute>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut field = Self::new(attribute);
        field.set(roles);
        field
    }

    pub fn attribute(&self) -> &Arc<RoleAttribute> {
        &self.attribute
    }

    /// Alias this field was declared under.
    pub fn attribute_name(&self) -> &str {
        self.attribute.attribute_name()
    }

    /// Stored mask, `None` when never assigned.
    pub fn mask(&self) -> Option<RoleMask> {
        self.mask
    }

    pub fn set_mask(&mut self, mask: Option<RoleMask>) {
        self.mask = mask;
    }

    /// Roles held, in vocabulary order.
    pub fn get(&self) -> RoleSet {
        self.attribute.decode(self.mask.unwrap_or_default())
    }

    /// Replace the held roles. Unknown names are dropped.
    pub fn set<I, S>(&mut self, roles: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.mask = Some(self.attribute.encode(roles));
    }

    /// Whether the entity holds at least one of `roles`.
    pub fn has<I, S>(&self, roles: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.attribute
            .has_any(self.mask.unwrap_or_default(), roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles() -> Arc<RoleAttribute> {
        RoleAttribute::declare(["read", "write"]).unwrap()
    }

    #[test]
    fn test_unset_mask_reads_as_no_roles() {
        let field = RoleField::new(roles());

        assert_eq!(field.mask(), None);
        assert!(field.get().is_empty());
        assert!(!field.has(["read"]));
    }

    #[test]
    fn test_set_and_get() {
        let mut field = RoleField::new(roles());

        field.set(["write"]);
        assert_eq!(field.mask(), Some(2));

        field.set(["read", "write"]);
        assert_eq!(field.mask(), Some(3));
        assert_eq!(field.get().as_slice(), ["read", "write"]);

        field.set(Vec::<&str>::new());
        assert_eq!(field.mask(), Some(0));
    }

    #[test]
    fn test_has_any_of() {
        let field = RoleField::with_roles(roles(), ["read"]);

        assert!(field.has(["read"]));
        assert!(field.has(["read", "write"]));
        assert!(!field.has(["write"]));
        assert!(!field.has(["delete"]));
    }

    #[test]
    fn test_with_mask_rehydrates() {
        let access = RoleAttribute::declare_as(["moderator", "support", "editor"], "access").unwrap();
        let field = RoleField::with_mask(access, Some(6));

        assert_eq!(field.attribute_name(), "access");
        assert_eq!(field.get().as_slice(), ["support", "editor"]);
    }
}
