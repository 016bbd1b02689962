//! Ordered role vocabularies and the mask codec built on them.

use crate::error::{Result, RoleError};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Integer bit-set holding which vocabulary roles an entity has.
pub type RoleMask = u64;

/// Maximum number of roles one vocabulary may declare.
pub const MAX_ROLES: usize = RoleMask::BITS as usize;

/// Decoded roles, in vocabulary order.
pub type RoleSet = SmallVec<[String; 8]>;

/// An ordered, duplicate-free list of role names.
///
/// The role at index `i` occupies bit `i` of a [`RoleMask`]. The order is
/// therefore part of the persisted format: reordering, inserting in the
/// middle of, or removing roles from a vocabulary silently changes the
/// meaning of every mask already stored against it. Only ever append.
///
/// A vocabulary holds at most [`MAX_ROLES`] roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct RoleVocabulary {
    roles: Vec<String>,
}

impl RoleVocabulary {
    /// Declare a vocabulary from role names in bit order.
    pub fn new<I, S>(roles: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles: Vec<String> = roles.into_iter().map(Into::into).collect();

        if roles.len() > MAX_ROLES {
            return Err(RoleError::TooManyRoles {
                count: roles.len(),
                max: MAX_ROLES,
            });
        }

        for (index, role) in roles.iter().enumerate() {
            if role.is_empty() || role.chars().any(char::is_whitespace) {
                return Err(RoleError::InvalidRoleName(role.clone()));
            }
            if roles[..index].contains(role) {
                return Err(RoleError::DuplicateRole(role.clone()));
            }
        }

        Ok(Self { roles })
    }

    /// A vocabulary with no roles; every mask decodes to nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Role names in bit order.
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }

    /// Bit position of `role`, if it belongs to this vocabulary.
    pub fn index_of(&self, role: &str) -> Option<usize> {
        self.roles.iter().position(|r| r == role)
    }

    pub fn contains(&self, role: &str) -> bool {
        self.index_of(role).is_some()
    }

    /// Single-bit mask for `role`; `0` for names outside the vocabulary.
    pub fn bit(&self, role: &str) -> RoleMask {
        self.index_of(role).map(bit_at).unwrap_or(0)
    }

    /// Mask with every vocabulary role set.
    pub fn full_mask(&self) -> RoleMask {
        match self.roles.len() {
            MAX_ROLES => RoleMask::MAX,
            n => bit_at(n) - 1,
        }
    }

    /// Encode role names into a mask.
    ///
    /// Duplicates collapse and names outside the vocabulary are dropped
    /// without error, so the result does not depend on input order.
    pub fn encode<I, S>(&self, roles: I) -> RoleMask
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        roles
            .into_iter()
            .fold(0, |mask, role| mask | self.bit(role.as_ref()))
    }

    /// Decode a mask into role names, in vocabulary order.
    ///
    /// Bits above the vocabulary length are ignored.
    pub fn decode(&self, mask: RoleMask) -> RoleSet {
        self.roles
            .iter()
            .enumerate()
            .filter(|(index, _)| mask & bit_at(*index) != 0)
            .map(|(_, role)| role.clone())
            .collect()
    }

    /// Whether any role in `query` is set in `mask`.
    pub fn has_any<I, S>(&self, mask: RoleMask, query: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        mask & self.encode(query) != 0
    }
}

fn bit_at(index: usize) -> RoleMask {
    1 << index
}

impl TryFrom<Vec<String>> for RoleVocabulary {
    type Error = RoleError;

    fn try_from(roles: Vec<String>) -> Result<Self> {
        Self::new(roles)
    }
}

impl From<RoleVocabulary> for Vec<String> {
    fn from(vocabulary: RoleVocabulary) -> Self {
        vocabulary.roles
    }
}

impl fmt::Display for RoleVocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.roles.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_write() -> RoleVocabulary {
        RoleVocabulary::new(["read", "write"]).unwrap()
    }

    #[test]
    fn test_decode_mask_three() {
        let vocabulary = read_write();

        assert_eq!(vocabulary.decode(3).as_slice(), ["read", "write"]);
        assert!(vocabulary.has_any(3, ["read"]));
        assert!(!vocabulary.has_any(3, ["delete"]));
    }

    #[test]
    fn test_encode_single_names() {
        let vocabulary = read_write();

        assert_eq!(vocabulary.encode(["read"]), 1);
        assert_eq!(vocabulary.encode(["write"]), 2);
        assert_eq!(vocabulary.encode(["read", "write"]), 3);
        assert_eq!(vocabulary.encode(Vec::<String>::new()), 0);
    }

    #[test]
    fn test_encode_ignores_order_duplicates_and_unknown_roles() {
        let vocabulary = RoleVocabulary::new(["moderator", "support", "editor"]).unwrap();

        let forward = vocabulary.encode(["moderator", "support"]);
        assert_eq!(vocabulary.encode(["support", "moderator", "support"]), forward);
        assert_eq!(vocabulary.encode(["support", "admin", "moderator"]), forward);
        assert_eq!(vocabulary.encode(["editor", "moderator", "support"]), 7);
    }

    #[test]
    fn test_decode_ignores_bits_past_vocabulary() {
        let vocabulary = read_write();

        assert_eq!(vocabulary.decode(0b1111_0010).as_slice(), ["write"]);
        assert!(vocabulary.decode(0).is_empty());
    }

    #[test]
    fn test_empty_vocabulary() {
        let vocabulary = RoleVocabulary::empty();

        assert_eq!(vocabulary.encode(["read"]), 0);
        assert!(vocabulary.decode(RoleMask::MAX).is_empty());
        assert_eq!(vocabulary.full_mask(), 0);
    }

    #[test]
    fn test_declaration_errors() {
        assert_eq!(
            RoleVocabulary::new(["read", "write", "read"]),
            Err(RoleError::DuplicateRole("read".to_string()))
        );
        assert!(matches!(
            RoleVocabulary::new(["", "write"]),
            Err(RoleError::InvalidRoleName(_))
        ));
        assert!(matches!(
            RoleVocabulary::new(["can write"]),
            Err(RoleError::InvalidRoleName(_))
        ));

        let too_many: Vec<String> = (0..=MAX_ROLES).map(|i| format!("role{i}")).collect();
        assert_eq!(
            RoleVocabulary::new(too_many),
            Err(RoleError::TooManyRoles {
                count: MAX_ROLES + 1,
                max: MAX_ROLES
            })
        );
    }

    #[test]
    fn test_widest_vocabulary_uses_top_bit() {
        let roles: Vec<String> = (0..MAX_ROLES).map(|i| format!("role{i}")).collect();
        let vocabulary = RoleVocabulary::new(roles).unwrap();

        assert_eq!(vocabulary.full_mask(), RoleMask::MAX);
        assert_eq!(vocabulary.encode(["role63"]), 1 << 63);
        assert_eq!(vocabulary.decode(1 << 63).as_slice(), ["role63"]);
    }

    #[test]
    fn test_deserialize_validates() {
        let vocabulary: RoleVocabulary = serde_json::from_str(r#"["read","write"]"#).unwrap();
        assert_eq!(vocabulary, read_write());

        assert!(serde_json::from_str::<RoleVocabulary>(r#"["read","read"]"#).is_err());
    }
}
