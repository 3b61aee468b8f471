use crate::tree::TreeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditError {
    #[error("host block not found: {host}")]
    HostNotFound { host: String },

    #[error("key not found: {host}/{key}")]
    KeyNotFound { host: String, key: String },

    #[error("no value given for {host}/{key}")]
    EmptyValue { host: String, key: String },

    #[error("invalid directive name: '{key}'")]
    InvalidKey { key: String },

    #[error("invalid host pattern: '{host}'")]
    InvalidHost { host: String },

    #[error("value for {host}/{key} does not fit on one ssh_config line")]
    InvalidValue { host: String, key: String },

    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}
