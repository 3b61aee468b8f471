use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {index} has been removed from the tree")]
    Detached { index: usize },

    #[error("node {index} does not exist")]
    UnknownNode { index: usize },

    #[error("invalid anchor: {message}")]
    InvalidAnchor { message: String },

    #[error("node {index} cannot hold a child of kind {child}")]
    NotABlock { index: usize, child: String },

    #[error("node {index} carries no value")]
    NoValue { index: usize },
}
