//! Startup registry of role attributes per entity type.
//!
//! The registry answers "which role attribute does entity type X carry"
//! for code that only knows the type by name, such as declaration-time
//! validation of authorization hooks. It is built once and then read-only;
//! callers pass it explicitly to whatever needs it.

use crate::error::{Result, RoleError};
use crate::roles::RoleAttribute;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
struct EntityRoles {
    /// Alias declared first; authorization consults this one.
    primary: String,
    attributes: HashMap<String, Arc<RoleAttribute>>,
}

/// Read-only map from entity type names to their role attributes.
#[derive(Debug, Default)]
pub struct RoleRegistry {
    entities: HashMap<String, EntityRoles>,
}

impl RoleRegistry {
    pub fn builder() -> RoleRegistryBuilder {
        RoleRegistryBuilder::default()
    }

    /// Attribute declared under `alias` for `entity`.
    pub fn attribute(&self, entity: &str, alias: &str) -> Option<&Arc<RoleAttribute>> {
        self.entities.get(entity)?.attributes.get(alias)
    }

    /// The first attribute declared for `entity`.
    pub fn primary(&self, entity: &str) -> Option<&Arc<RoleAttribute>> {
        let roles = self.entities.get(entity)?;
        roles.attributes.get(&roles.primary)
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity type names, in no particular order.
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }
}

/// Collects declarations before freezing them into a [`RoleRegistry`].
#[derive(Debug, Default)]
pub struct RoleRegistryBuilder {
    entities: HashMap<String, EntityRoles>,
}

impl RoleRegistryBuilder {
    /// Declare `roles` under `alias` for `entity`.
    pub fn declare<I, S>(self, entity: &str, roles: I, alias: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let attribute = RoleAttribute::declare_as(roles, alias)?;
        self.register(entity, attribute)
    }

    /// Register an attribute that was declared elsewhere.
    pub fn register(mut self, entity: &str, attribute: Arc<RoleAttribute>) -> Result<Self> {
        let alias = attribute.attribute_name().to_string();
        let roles = self
            .entities
            .entry(entity.to_string())
            .or_insert_with(|| EntityRoles {
                primary: alias.clone(),
                attributes: HashMap::new(),
            });

        if roles.attributes.contains_key(&alias) {
            return Err(RoleError::DuplicateAttribute {
                entity: entity.to_string(),
                alias,
            });
        }

        debug!(
            entity = %entity,
            alias = %alias,
            roles = %attribute.vocabulary(),
            "Declared role attribute"
        );
        roles.attributes.insert(alias, attribute);
        Ok(self)
    }

    pub fn build(self) -> RoleRegistry {
        RoleRegistry {
            entities: self.entities,
        }
    }
}
