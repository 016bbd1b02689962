//! Configuration types for maskgate authorization

use crate::error::AuthzError;
use crate::hooks::RouteFilter;
use crate::resolver::ResolveOptions;
use maskgate_core::{DEFAULT_ALIAS, RoleRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Authorization configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthzConfig {
    /// Log every grant and denial
    pub audit_enabled: bool,
    /// Identity scope that `through` lookups start from
    pub default_scope: Option<String>,
    /// Identity scopes read from the request context
    pub identities: Vec<String>,
    /// Role attribute declarations
    pub roles: Vec<RoleDeclarationConfig>,
    /// Hook declarations, in order
    pub hooks: Vec<HookConfig>,
}

/// One role attribute of one entity type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDeclarationConfig {
    /// Entity type name
    pub entity: String,
    /// Attribute alias
    #[serde(default = "default_alias")]
    pub alias: String,
    /// Role names in bit order. Append only.
    pub roles: Vec<String>,
}

fn default_alias() -> String {
    DEFAULT_ALIAS.to_string()
}

/// A hook declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "hook", rename_all = "snake_case")]
pub enum HookConfig {
    RequireAuthentication {
        scope: String,
        #[serde(default)]
        filter: RouteFilter,
    },
    FindAndAuthorize {
        resource: String,
        #[serde(default)]
        roles: Vec<String>,
        #[serde(default)]
        options: ResolveOptions,
        #[serde(default)]
        filter: RouteFilter,
    },
    FindResource {
        resource: String,
        #[serde(default)]
        options: ResolveOptions,
        #[serde(default)]
        filter: RouteFilter,
    },
    AuthorizeAgainst {
        resource: String,
        roles: Vec<String>,
        #[serde(default)]
        filter: RouteFilter,
    },
}

impl AuthzConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> std::result::Result<Self, AuthzError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AuthzError::Configuration(format!("Failed to read config file: {}", e))
        })?;

        let config: AuthzConfig = serde_json::from_str(&content).map_err(|e| {
            AuthzError::Configuration(format!("Failed to parse config: {}", e))
        })?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file(&self, path: impl AsRef<Path>) -> std::result::Result<(), AuthzError> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            AuthzError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content).map_err(|e| {
            AuthzError::Configuration(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Registry holding every declared role attribute
    pub fn build_registry(&self) -> std::result::Result<RoleRegistry, AuthzError> {
        let mut builder = RoleRegistry::builder();
        for declaration in &self.roles {
            builder = builder.declare(
                &declaration.entity,
                declaration.roles.iter().cloned(),
                &declaration.alias,
            )?;
        }
        Ok(builder.build())
    }

    /// Validate the configuration
    ///
    /// Checks the role declarations and each hook's resolution options.
    /// Cross-hook checks (identity scopes, vocabularies of authorization
    /// targets) run when an [`Authorizer`](crate::Authorizer) is built.
    pub fn validate(&self) -> std::result::Result<(), AuthzError> {
        self.build_registry()?;

        for hook in &self.hooks {
            match hook {
                HookConfig::FindAndAuthorize {
                    resource, options, ..
                }
                | HookConfig::FindResource {
                    resource, options, ..
                } => {
                    options.plan(resource)?;
                }
                HookConfig::RequireAuthentication { scope, .. } => {
                    if !self.identities.contains(scope) {
                        return Err(AuthzError::Configuration(format!(
                            "Authentication required for undeclared identity scope '{}'",
                            scope
                        )));
                    }
                }
                HookConfig::AuthorizeAgainst { .. } => {}
            }
        }

        if let Some(scope) = &self.default_scope
            && !self.identities.contains(scope)
        {
            return Err(AuthzError::Configuration(format!(
                "Default scope '{}' is not a declared identity scope",
                scope
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn documents_config() -> AuthzConfig {
        serde_json::from_value(json!({
            "audit_enabled": true,
            "default_scope": "user",
            "identities": ["user"],
            "roles": [
                {"entity": "membership", "roles": ["download", "fork", "edit", "delete"]}
            ],
            "hooks": [
                {"hook": "require_authentication", "scope": "user"},
                {
                    "hook": "find_and_authorize",
                    "resource": "document",
                    "roles": ["edit"],
                    "options": {"through": "memberships"},
                    "filter": {"only": ["edit", "update"]}
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_config_deserialization() {
        let config = documents_config();

        assert!(config.audit_enabled);
        assert_eq!(config.roles[0].alias, "roles");
        assert_eq!(
            config.hooks[1],
            HookConfig::FindAndAuthorize {
                resource: "document".to_string(),
                roles: vec!["edit".to_string()],
                options: ResolveOptions::new().through("memberships"),
                filter: RouteFilter::only(["edit", "update"]),
            }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_operations() {
        let config = documents_config();
        let temp_file = NamedTempFile::new().unwrap();

        config.to_file(temp_file.path()).unwrap();
        let loaded = AuthzConfig::from_file(temp_file.path()).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let err = AuthzConfig::from_file("/nonexistent/maskgate.json").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_config_validation() {
        let mut config = documents_config();
        config.roles.push(RoleDeclarationConfig {
            entity: "membership".to_string(),
            alias: "roles".to_string(),
            roles: vec!["read".to_string()],
        });
        assert!(config.validate().is_err());

        let mut config = documents_config();
        config.hooks.push(HookConfig::FindResource {
            resource: "report".to_string(),
            options: ResolveOptions::new().from("admin").namespace("admin"),
            filter: RouteFilter::all(),
        });
        assert!(config.validate().is_err());

        let mut config = documents_config();
        config.default_scope = Some("admin".to_string());
        assert!(config.validate().is_err());
    }
}
