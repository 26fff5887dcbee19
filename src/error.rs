//! Error types for validation and catalog loading.

use thiserror::Error;

/// The only way a validation call can fail: the identifier names nothing in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("no case or mission with id '{identifier}'")]
  NotFound { identifier: String },
}

/// Problems found while reading a casebook or compiling its conditions.
#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("failed to read casebook {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },
  #[error("failed to parse casebook {path}: {source}")]
  Parse {
    path: String,
    #[source]
    source: toml::de::Error,
  },
  #[error("cannot infer a check for condition '{text}'")]
  UninferableCondition { text: String },
  #[error("mission '{mission_id}' has no success conditions")]
  EmptyMission { mission_id: String },
  #[error("mission id '{mission_id}' is already used by case '{owner}'")]
  DuplicateMission { mission_id: String, owner: String },
}
