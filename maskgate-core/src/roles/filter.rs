//! Storage-side role predicates.
//!
//! A [`RoleFilter`] describes "entities whose mask column has these bits
//! set" without executing anything. Repositories translate it into their own
//! query language, or call [`RoleFilter::matches`] when they hold records in
//! memory.

use super::vocabulary::RoleMask;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Conjunction of `(column & bits) > 0` clauses over one mask column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleFilter {
    /// Persisted mask column, e.g. `roles_mask`.
    pub column: String,
    /// Each clause must share at least one bit with the stored mask.
    pub clauses: Vec<RoleMask>,
}

impl RoleFilter {
    /// Filter holding a single clause.
    pub fn any_of(column: impl Into<String>, bits: RoleMask) -> Self {
        Self {
            column: column.into(),
            clauses: vec![bits],
        }
    }

    /// Filter requiring every clause.
    pub fn all_of(column: impl Into<String>, clauses: Vec<RoleMask>) -> Self {
        Self {
            column: column.into(),
            clauses,
        }
    }

    /// Whether a stored mask satisfies every clause.
    ///
    /// A zero clause (an unknown role) never matches.
    pub fn matches(&self, mask: RoleMask) -> bool {
        self.clauses.iter().all(|bits| mask & bits != 0)
    }

    /// True when some clause can never be satisfied.
    pub fn is_unsatisfiable(&self) -> bool {
        self.clauses.contains(&0)
    }
}

impl fmt::Display for RoleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return write!(f, "TRUE");
        }

        for (index, bits) in self.clauses.iter().enumerate() {
            if index > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "({} & {}) > 0", self.column, bits)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_all_clauses() {
        let filter = RoleFilter::all_of("access_mask", vec![4, 1]);

        assert!(filter.matches(5));
        assert!(filter.matches(7));
        assert!(!filter.matches(4));
        assert!(!filter.matches(0));
    }

    #[test]
    fn test_zero_clause_never_matches() {
        let filter = RoleFilter::any_of("roles_mask", 0);

        assert!(filter.is_unsatisfiable());
        assert!(!filter.matches(RoleMask::MAX));
    }

    #[test]
    fn test_display_renders_predicate() {
        assert_eq!(
            RoleFilter::all_of("access_mask", vec![4, 1]).to_string(),
            "(access_mask & 4) > 0 AND (access_mask & 1) > 0"
        );
        assert_eq!(
            RoleFilter::any_of("roles_mask", 2).to_string(),
            "(roles_mask & 2) > 0"
        );
    }
}
