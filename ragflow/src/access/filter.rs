//! Authorization predicate construction and evaluation.

use super::RoleMapping;
use crate::chunking::ChunkMetadata;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;

/// Metadata field holding the strict role.
pub(crate) const ROLE_FIELD: &str = "required_role_strict";
/// Metadata field holding the access tags.
pub(crate) const TAGS_FIELD: &str = "access_tags";

/// A boolean predicate over chunk metadata.
///
/// The absence of a filter (`Option::None` where one is expected) means no
/// restriction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessFilter {
    /// `required_role_strict` equals the role.
    RoleEquals(String),
    /// `access_tags` shares at least one element with the set.
    TagsAnyOf(BTreeSet<String>),
    /// Any of the inner predicates holds.
    Or(Vec<AccessFilter>),
}

impl AccessFilter {
    /// Evaluates the predicate against a chunk's metadata.
    #[must_use]
    pub fn matches(&self, metadata: &ChunkMetadata) -> bool {
        match self {
            Self::RoleEquals(role) => metadata.required_role_strict.as_deref() == Some(role),
            Self::TagsAnyOf(tags) => !metadata.access_tags.is_disjoint(tags),
            Self::Or(filters) => filters.iter().any(|f| f.matches(metadata)),
        }
    }

    /// Renders the predicate as a Chroma-style `where` document.
    #[must_use]
    pub fn to_chroma_where(&self) -> serde_json::Value {
        match self {
            Self::RoleEquals(role) => json!({ ROLE_FIELD: { "$eq": role } }),
            Self::TagsAnyOf(tags) => json!({ TAGS_FIELD: { "$in": tags } }),
            Self::Or(filters) => {
                let inner: Vec<_> = filters.iter().map(Self::to_chroma_where).collect();
                json!({ "$or": inner })
            }
        }
    }
}

/// Builds the retrieval filter for a user.
///
/// Returns `None` when neither a role nor tags are given, which means no
/// restriction at all. Callers serving end users must not reach that case
/// by accident; see [`crate::access::AccessScope`].
///
/// Empty strings and empty tag lists count as absent. The mapping is only
/// read.
#[must_use]
pub fn build_access_filter(
    role: Option<&str>,
    tags: &[String],
    mapping: &RoleMapping,
) -> Option<AccessFilter> {
    let role = role.map(str::trim).filter(|r| !r.is_empty());
    let user_tags = tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    if role.is_none() && tags.iter().all(|t| t.trim().is_empty()) {
        return None;
    }

    let mut authorized: BTreeSet<String> = user_tags.collect();
    if let Some(granted) = role.and_then(|r| mapping.tags_for(r)) {
        authorized.extend(granted.iter().cloned());
    }

    let mut conditions = Vec::with_capacity(2);
    if let Some(role) = role {
        conditions.push(AccessFilter::RoleEquals(role.to_string()));
    }
    if !authorized.is_empty() {
        conditions.push(AccessFilter::TagsAnyOf(authorized));
    }

    match conditions.len() {
        0 => None,
        1 => conditions.pop(),
        _ => Some(AccessFilter::Or(conditions)),
    }
}
