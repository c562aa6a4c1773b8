//! Database models mapping to the metadata schema.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Description of an indexed source repository.
///
/// `row_id` is assigned by the store on creation and never changes or gets
/// reused afterward. `url` is the natural key: `save_repo` uses it to decide
/// between insert and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct RepoRow {
    #[sqlx(rename = "id")]
    #[serde(default)]
    pub row_id: i64,
    pub name: String,
    pub scm: String,
    pub url: String,
    #[sqlx(rename = "suggestedname")]
    #[serde(default)]
    pub suggested_name: String,
    #[sqlx(rename = "sourceurl")]
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub instructions: String,
    #[sqlx(rename = "sourceid")]
    #[serde(default)]
    pub source_id: i64,
    #[serde(default)]
    pub spdx: String,
    #[serde(default)]
    pub username: String,
}

impl RepoRow {
    /// Build a write payload from the fields `save_repo` actually persists.
    ///
    /// The auxiliary fields are left at their defaults; the store resets them
    /// on every write regardless of what the entity carries.
    pub fn new(name: impl Into<String>, scm: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scm: scm.into(),
            url: url.into(),
            ..Self::default()
        }
    }
}
