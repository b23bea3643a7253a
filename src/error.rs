#![forbid(unsafe_code)]

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabtuiError {
    #[error("name and surname must not be empty")]
    EmptyField,

    #[error("name and surname must contain only Ukrainian letters")]
    InvalidLetters,

    #[error("an id is required for removal")]
    MissingRemoveId,

    #[error("no entry with id '{0}' in the roster")]
    IdNotFound(String),

    #[error("unknown tube color '{0}'")]
    UnknownColor(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid config key '{0}'")]
    InvalidConfigKey(String),

    #[error("invalid config value for '{key}': {msg}")]
    InvalidConfigValue { key: String, msg: String },

    #[error("{0}")]
    Other(String),
}
