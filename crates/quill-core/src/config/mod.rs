//! Repository configuration.
//!
//! One value decides persistence: when a remote API base URL is configured
//! every operation goes to that API, otherwise notes live in the local store
//! under `data_dir`. The decision is made once, when the repository is built.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::util::{normalize_text_option, strip_trailing_slashes};

/// Environment variable holding the remote API base URL
pub const API_BASE_ENV: &str = "QUILL_API_BASE";

/// Environment variable overriding the local data directory
pub const DATA_DIR_ENV: &str = "QUILL_DATA_DIR";

/// Which backend the repository talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceMode {
    Local,
    Api,
}

impl fmt::Display for PersistenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Api => f.write_str("api"),
        }
    }
}

/// Settings used to construct a [`crate::repository::NoteRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    api_base: Option<String>,
    data_dir: PathBuf,
}

impl RepositoryConfig {
    /// Local-only configuration rooted at `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_base: None,
            data_dir: data_dir.into(),
        }
    }

    /// Set the remote API base URL. Blank values select local mode.
    #[must_use]
    pub fn with_api_base(mut self, api_base: Option<String>) -> Self {
        self.api_base = normalize_api_base(api_base);
        self
    }

    /// Normalized remote base URL, if any
    pub fn api_base(&self) -> Option<&str> {
        self.api_base.as_deref()
    }

    /// Directory of the local key/value store
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub const fn mode(&self) -> PersistenceMode {
        if self.api_base.is_some() {
            PersistenceMode::Api
        } else {
            PersistenceMode::Local
        }
    }
}

/// Trim an API base URL and strip trailing slashes; blank becomes `None`.
pub fn normalize_api_base(raw: Option<String>) -> Option<String> {
    let value = normalize_text_option(raw)?;
    let stripped = strip_trailing_slashes(&value);
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}
