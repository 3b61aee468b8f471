//! Conversion between key nodes and their semantic value.

use crate::tree::{ConfigTree, NodeRef, TreeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A directive value as callers express it: one string or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(String),
    List(Vec<String>),
}

impl Value {
    /// The desired values in order; a scalar is a one-element list.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Value::Scalar(value) => vec![value.clone()],
            Value::List(values) => values.clone(),
        }
    }

    /// A single value collapses to a scalar.
    pub fn from_list(mut values: Vec<String>) -> Self {
        if values.len() == 1 {
            Value::Scalar(values.remove(0))
        } else {
            Value::List(values)
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Value::Scalar(value) => value.is_empty(),
            Value::List(values) => values.iter().all(String::is_empty),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(values: Vec<String>) -> Self {
        Value::List(values)
    }
}

impl From<Vec<&str>> for Value {
    fn from(values: Vec<&str>) -> Self {
        Value::List(values.into_iter().map(str::to_string).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(value) => write!(f, "{value}"),
            Value::List(values) => write!(f, "[{}]", values.join(", ")),
        }
    }
}

/// Flattens the values held by `nodes`, in order.
///
/// A node with integer-labeled children contributes the texts of those
/// children; any other node contributes its own text, if it has one.
pub fn decode<T: ConfigTree + ?Sized>(tree: &T, nodes: &[NodeRef]) -> Result<Vec<String>, TreeError> {
    let mut values = Vec::new();
    for node in nodes {
        let mut items = Vec::new();
        for child in tree.children(*node)? {
            if is_index(tree.label(child)?) {
                items.push(child);
            }
        }

        if items.is_empty() {
            if let Some(text) = tree.value(*node)? {
                values.push(text.to_string());
            }
            continue;
        }

        for item in items {
            if let Some(text) = tree.value(item)? {
                values.push(text.to_string());
            }
        }
    }
    Ok(values)
}

fn is_index(label: &str) -> bool {
    !label.is_empty() && label.bytes().all(|b| b.is_ascii_digit())
}
