//! Role vocabularies, masks and the fields that store them.

mod attribute;
mod field;
mod filter;
mod vocabulary;

pub use attribute::{DEFAULT_ALIAS, RoleAttribute};
pub use field::RoleField;
pub use filter::RoleFilter;
pub use vocabulary::{MAX_ROLES, RoleMask, RoleSet, RoleVocabulary};
