//! Role to authorized-tags mapping.

use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};

/// Maps a role name to the tags it is authorized to read.
///
/// Stored on disk as a JSON object of role name to array of tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleMapping {
    roles: BTreeMap<String, BTreeSet<String>>,
}

impl RoleMapping {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the tags granted to a role.
    #[must_use]
    pub fn with_role<I, S>(mut self, role: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles
            .insert(role.into(), tags.into_iter().map(Into::into).collect());
        self
    }

    /// Loads a mapping from a JSON file.
    ///
    /// A missing file yields an empty mapping. A file that exists but cannot
    /// be read or parsed is a configuration error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "Role mapping file not found, using empty mapping");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigurationError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mapping = Self::from_json_str(&raw).map_err(|err| ConfigurationError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

        info!(path = %path.display(), roles = mapping.len(), "Loaded role mapping");
        Ok(mapping)
    }

    /// Parses a mapping from a JSON string.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Returns the tags granted to a role.
    #[must_use]
    pub fn tags_for(&self, role: &str) -> Option<&BTreeSet<String>> {
        self.roles.get(role)
    }

    /// Returns the number of roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns true if no roles are mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
