//! Role and tag based access control for retrieval.
//!
//! A chunk is visible to a user iff its `required_role_strict` equals the
//! user's role, or its `access_tags` share at least one tag with the user's
//! authorized tags (explicit tags plus the tags the role mapping grants).

mod filter;
#[cfg(test)]
mod filter_tests;
mod mapping;
mod scope;

pub use filter::{build_access_filter, AccessFilter};
pub use mapping::RoleMapping;
pub use scope::{AccessScope, DocumentAccess};
