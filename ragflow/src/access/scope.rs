//! Who is asking, and who may read a document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The access scope of a query.
///
/// Unrestricted retrieval has to be requested explicitly; a `User` scope
/// that carries neither a role nor tags is refused at retrieval time rather
/// than widened to everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum AccessScope {
    /// Administrative access to every chunk.
    Unrestricted,
    /// An end user identified by role and/or tags.
    User {
        /// The user's role.
        #[serde(default)]
        role: Option<String>,
        /// Tags granted to the user directly.
        #[serde(default)]
        tags: Vec<String>,
    },
}

impl AccessScope {
    /// Creates a user scope with a role.
    #[must_use]
    pub fn role(role: impl Into<String>) -> Self {
        Self::User {
            role: Some(role.into()),
            tags: Vec::new(),
        }
    }

    /// Creates a user scope with tags only.
    #[must_use]
    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::User {
            role: None,
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a user scope with a role and tags.
    #[must_use]
    pub fn user<I, S>(role: Option<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::User {
            role,
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true for the administrative scope.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }
}

/// Access markings stamped onto every chunk of an ingested document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAccess {
    /// Tags granting access.
    #[serde(default)]
    pub access_tags: BTreeSet<String>,
    /// Role granted access regardless of tags.
    #[serde(default)]
    pub required_role_strict: Option<String>,
}

impl DocumentAccess {
    /// Creates empty access markings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds access tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.access_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Sets the strict role.
    #[must_use]
    pub fn with_required_role(mut self, role: impl Into<String>) -> Self {
        self.required_role_strict = Some(role.into());
        self
    }

    /// Returns true if the document carries no markings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.access_tags.is_empty() && self.required_role_strict.is_none()
    }
}
