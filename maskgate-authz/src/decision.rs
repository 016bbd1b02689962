//! Allow/deny decisions over decoded role sets
//!
//! The rule is a plain intersection: a caller passes when no roles are
//! required, or when it holds *any* one of the required roles. Requiring
//! every role of a set is only available as a storage query
//! ([`RoleAttribute::with_all_roles`](maskgate_core::RoleAttribute::with_all_roles)),
//! never as an authorization check.

use crate::entity::Entity;
use crate::error::AuthzError;
use thiserror::Error;

/// Authorization failure carrying both sides of the comparison
///
/// The rendered message is stable and suitable for showing to callers:
///
/// ```rust
/// use maskgate_authz::Denied;
///
/// let denied = Denied::new("roles", ["foo", "bar"], ["qux"]);
/// assert_eq!(
///     denied.to_string(),
///     "Access denied: foo or bar are required; however, you have qux roles set"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Access denied: {} {} required; however, you have {} roles set",
    enumerate(.required, "or"),
    verb(.required),
    held(.actual)
)]
pub struct Denied {
    /// Role attribute alias that was checked
    pub attribute: String,
    pub required: Vec<String>,
    pub actual: Vec<String>,
}

impl Denied {
    pub fn new<R, A>(
        attribute: impl Into<String>,
        required: impl IntoIterator<Item = R>,
        actual: impl IntoIterator<Item = A>,
    ) -> Self
    where
        R: AsRef<str>,
        A: AsRef<str>,
    {
        Self {
            attribute: attribute.into(),
            required: required.into_iter().map(|r| r.as_ref().to_string()).collect(),
            actual: actual.into_iter().map(|a| a.as_ref().to_string()).collect(),
        }
    }
}

fn verb(required: &[String]) -> &'static str {
    if required.len() == 1 { "is" } else { "are" }
}

fn held(actual: &[String]) -> String {
    if actual.is_empty() {
        "no".to_string()
    } else {
        enumerate(actual, "and")
    }
}

/// `a`, `a or b`, `a, b, or c`
fn enumerate(items: &[String], conjunction: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} {conjunction} {second}"),
        [init @ .., last] => format!("{}, {conjunction} {last}", init.join(", ")),
    }
}

/// Decide whether `actual` satisfies `required`
pub fn authorize<R, A>(attribute: &str, required: &[R], actual: &[A]) -> Result<(), Denied>
where
    R: AsRef<str>,
    A: AsRef<str>,
{
    let allowed = required.is_empty()
        || required
            .iter()
            .any(|r| actual.iter().any(|a| a.as_ref() == r.as_ref()));

    if allowed {
        Ok(())
    } else {
        Err(Denied::new(attribute, required, actual))
    }
}

/// Authorize an entity through its primary role field
///
/// With nothing required the entity needs no role field at all.
pub fn authorize_entity<R>(required: &[R], entity: &dyn Entity) -> Result<(), AuthzError>
where
    R: AsRef<str>,
{
    if required.is_empty() {
        return Ok(());
    }

    let field = entity.role_field().ok_or_else(|| {
        AuthzError::configuration(format!(
            "`{}` declares no role attribute to authorize against",
            entity.kind()
        ))
    })?;

    authorize(field.attribute_name(), required, field.get().as_slice())?;
    Ok(())
}
