//! Entities as seen by the authorization layer

use maskgate_core::RoleField;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a record returned by a [`Repository`](crate::Repository)
pub type EntityRef = Arc<dyn Entity>;

/// A persisted record the resolver can bind and the decision layer can read.
///
/// Entity types that carry roles return their primary [`RoleField`] from
/// [`Entity::role_field`]. This is the capability authorization relies on;
/// there is no process-wide lookup of which field holds an entity's roles.
pub trait Entity: Send + Sync + fmt::Debug {
    /// Type name, e.g. `document` or `admin/report`
    fn kind(&self) -> &str;

    /// Value of a column, used when repositories filter in memory
    fn attribute(&self, field: &str) -> Option<Value>;

    /// Role field consulted by authorization checks
    fn role_field(&self) -> Option<&RoleField> {
        None
    }

    /// Role field declared under `alias`
    fn role_field_named(&self, alias: &str) -> Option<&RoleField> {
        self.role_field()
            .filter(|field| field.attribute_name() == alias)
    }

    fn as_any(&self) -> &dyn Any;
}

impl dyn Entity {
    /// Downcast to the host's concrete record type
    pub fn downcast_ref<T: Entity + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}
