//! Error types for maskgate authorization

use crate::decision::Denied;
use maskgate_core::RoleError;
use thiserror::Error;

/// Errors that can occur while resolving and authorizing a request
///
/// `Denied` and `NotFound` are the two outcomes a host maps to responses
/// (forbidden and not found respectively). They are raised where detected
/// and never retried. `Configuration` and `Roles` come from declaration
/// time and should stop the process before it serves requests.
#[derive(Error, Debug)]
pub enum AuthzError {
    #[error(transparent)]
    Denied(#[from] Denied),

    #[error("Not found: no `{resource}` matching {scope}")]
    NotFound { resource: String, scope: String },

    #[error("Authentication required for `{0}`")]
    Unauthenticated(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Role declaration error: {0}")]
    Roles(#[from] RoleError),

    #[error("Repository error: {0}")]
    Repository(#[from] anyhow::Error),
}

impl AuthzError {
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for errors that belong to declaration time rather than to a request.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Roles(_))
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
