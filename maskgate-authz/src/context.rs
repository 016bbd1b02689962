//! Per-request authorization state

use crate::entity::EntityRef;
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// Read-only access to the current request's parameters
pub trait ParamSource: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
}

impl ParamSource for Map<String, Value> {
    fn get(&self, key: &str) -> Option<Value> {
        Map::get(self, key).filter(|v| !v.is_null()).cloned()
    }
}

impl ParamSource for HashMap<String, Value> {
    fn get(&self, key: &str) -> Option<Value> {
        HashMap::get(self, key).filter(|v| !v.is_null()).cloned()
    }
}

impl ParamSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<Value> {
        HashMap::get(self, key).map(|v| Value::String(v.clone()))
    }
}

impl ParamSource for Value {
    fn get(&self, key: &str) -> Option<Value> {
        self.as_object().and_then(|params| ParamSource::get(params, key))
    }
}

/// State for one request, from hook evaluation to handler.
///
/// Holds the request parameters, the identities the host's authentication
/// layer established, and the entities bound by resolution hooks. Each
/// request gets its own context; nothing in it is shared across requests.
pub struct AuthorizationContext {
    request_id: Uuid,
    action: String,
    params: Box<dyn ParamSource>,
    identities: HashMap<String, EntityRef>,
    bindings: HashMap<String, EntityRef>,
}

impl AuthorizationContext {
    /// Context for `action` (e.g. `show`, `update`) with the given parameters
    pub fn new(action: impl Into<String>, params: impl ParamSource + 'static) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            action: action.into(),
            params: Box::new(params),
            identities: HashMap::new(),
            bindings: HashMap::new(),
        }
    }

    /// Record an identity authenticated by the host, e.g. the signed-in `user`
    pub fn with_identity(mut self, scope: impl Into<String>, identity: EntityRef) -> Self {
        self.identities.insert(scope.into(), identity);
        self
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn param(&self, key: &str) -> Option<Value> {
        self.params.get(key)
    }

    pub fn identity(&self, scope: &str) -> Option<&EntityRef> {
        self.identities.get(scope)
    }

    /// Bind an entity under `name`, replacing any earlier binding
    pub fn bind(&mut self, name: impl Into<String>, entity: EntityRef) {
        self.bindings.insert(name.into(), entity);
    }

    pub fn get(&self, name: &str) -> Option<&EntityRef> {
        self.bindings.get(name)
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Consume the context, keeping the bindings for the handler
    pub fn into_bindings(self) -> HashMap<String, EntityRef> {
        self.bindings
    }
}

impl std::fmt::Debug for AuthorizationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationContext")
            .field("request_id", &self.request_id)
            .field("action", &self.action)
            .field("identities", &self.identities.keys().collect::<Vec<_>>())
            .field("bindings", &self.bindings.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_sources() {
        let ctx = AuthorizationContext::new("show", json!({"id": 3, "token": null}));
        assert_eq!(ctx.param("id"), Some(json!(3)));
        assert_eq!(ctx.param("token"), None);
        assert_eq!(ctx.param("missing"), None);

        let mut strings = HashMap::new();
        strings.insert("id".to_string(), "3".to_string());
        let ctx = AuthorizationContext::new("show", strings);
        assert_eq!(ctx.param("id"), Some(json!("3")));
    }

    #[test]
    fn test_contexts_are_isolated() {
        let first = AuthorizationContext::new("show", json!({}));
        let second = AuthorizationContext::new("show", json!({}));

        assert_ne!(first.request_id(), second.request_id());
        assert_eq!(first.action(), "show");
        assert!(!first.is_bound("document"));
    }
}
