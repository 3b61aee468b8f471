//! Minimal structural edits that bring a key to a desired value.
//!
//! Two policies, picked by directive:
//!
//! - multi-valued directives (`Ciphers`, `MACs`, `SendEnv`, ...) keep a single
//!   key node whose indexed children hold the values;
//! - every other key treats the existing nodes as slots filled left to right,
//!   removing surplus nodes and inserting new ones next to the last slot or
//!   next to a commented-out template line.

pub mod errors;

pub use errors::EditError;

use crate::lens::{is_keyword, is_plain_value, list_style};
use crate::tree::{ConfigTree, Match, NodeRef, Path, Position, Side, HOST_LABEL, MATCH_LABEL};
use crate::value::decode;
use std::collections::VecDeque;
use tracing::debug;

/// Path of the first host block named `host`.
pub fn host_path(host: &str) -> Path {
    Path::host(Match::literal(host)).at(Position::First)
}

/// Path of every `key` entry under `host`.
pub fn key_path(host: &str, key: &str) -> Path {
    Path::entry(Match::literal(host), Match::literal(key))
}

/// Comments that look like a disabled `key` entry, e.g. `#Port 22`.
pub fn template_path(host: &str, key: &str) -> Result<Path, EditError> {
    let pattern = format!("{}([^a-z.].*)?", regex::escape(key));
    Ok(Path::comment(Match::literal(host), Match::pattern(&pattern)?).at(Position::First))
}

/// Resolves the host block, failing when it does not exist.
pub fn find_host<T: ConfigTree>(tree: &T, host: &str) -> Result<NodeRef, EditError> {
    tree.query(&host_path(host))
        .first()
        .copied()
        .ok_or_else(|| EditError::HostNotFound {
            host: host.to_string(),
        })
}

/// Rejects names the parser would not read back as a single directive.
pub fn check_key(key: &str) -> Result<(), EditError> {
    if !is_keyword(key) || key.eq_ignore_ascii_case(HOST_LABEL) || key.eq_ignore_ascii_case(MATCH_LABEL)
    {
        return Err(EditError::InvalidKey {
            key: key.to_string(),
        });
    }
    Ok(())
}

/// Rejects host patterns that would not render as one `Host` line.
pub fn check_host(host: &str) -> Result<(), EditError> {
    if host.is_empty() || !is_plain_value(host) {
        return Err(EditError::InvalidHost {
            host: host.to_string(),
        });
    }
    Ok(())
}

/// Rejects a key or values that would not parse back unchanged: a value
/// spread over several lines, a trailing comment, or a list item holding its
/// directive's separator.
pub fn check_values(host: &str, key: &str, values: &[String]) -> Result<(), EditError> {
    check_key(key)?;
    let fits = match list_style(key) {
        Some(style) => values
            .iter()
            .filter(|item| !item.is_empty())
            .all(|item| is_plain_value(item) && style.holds(item)),
        None => values.iter().all(|value| is_plain_value(value)),
    };
    if !fits {
        return Err(EditError::InvalidValue {
            host: host.to_string(),
            key: key.to_string(),
        });
    }
    Ok(())
}

/// Sets `key` under `host` to `values` and returns the resolved key path.
///
/// The host block must exist already. Empty values mean "absent".
pub fn set_value<T: ConfigTree>(
    tree: &mut T,
    host: &str,
    key: &str,
    values: &[String],
) -> Result<Path, EditError> {
    check_values(host, key, values)?;
    let base = find_host(tree, host)?;
    let path = key_path(host, key);
    if list_style(key).is_some() {
        let items: Vec<String> = values.iter().filter(|item| !item.is_empty()).cloned().collect();
        set_array_value(tree, base, &path, key, &items)?;
    } else {
        set_simple_value(tree, base, host, &path, key, values)?;
    }
    Ok(path)
}

fn set_array_value<T: ConfigTree>(
    tree: &mut T,
    base: NodeRef,
    path: &Path,
    key: &str,
    values: &[String],
) -> Result<(), EditError> {
    let existing = tree.query(path);

    if values.is_empty() {
        for node in existing {
            tree.remove(node)?;
        }
        debug!(%path, "removed multi-valued directive");
        return Ok(());
    }

    if existing.len() == 1 && decode(tree, &existing)? == values {
        debug!(%path, "multi-valued directive already in sync");
        return Ok(());
    }

    let node = match existing.first() {
        Some(node) => *node,
        None => tree.append_child(base, key)?,
    };
    tree.remove_children(node)?;
    for duplicate in tree.query(&path.clone().at(Position::AllButFirst)) {
        tree.remove(duplicate)?;
    }
    for (idx, value) in values.iter().enumerate() {
        let item = tree.append_child(node, &(idx + 1).to_string())?;
        tree.set_value(item, value)?;
    }
    debug!(%path, count = values.len(), "rewrote multi-valued directive");
    Ok(())
}

fn set_simple_value<T: ConfigTree>(
    tree: &mut T,
    base: NodeRef,
    host: &str,
    path: &Path,
    key: &str,
    values: &[String],
) -> Result<(), EditError> {
    let mut remaining: VecDeque<&String> = values.iter().collect();
    let mut last_slot = None;

    for slot in tree.query(path) {
        match remaining.pop_front() {
            Some(value) if !value.is_empty() => {
                tree.set_value(slot, value)?;
                last_slot = Some(slot);
            }
            _ => {
                tree.remove(slot)?;
                debug!(%path, "removed surplus entry");
            }
        }
    }

    for value in remaining {
        if value.is_empty() {
            continue;
        }
        let node = match last_slot {
            Some(previous) => tree.insert(previous, key, Side::After)?,
            None => match tree.query(&template_path(host, key)?).first() {
                Some(template) => tree.insert(*template, key, Side::Before)?,
                None => tree.append_child(base, key)?,
            },
        };
        tree.set_value(node, value)?;
        debug!(%path, value = value.as_str(), "inserted entry");
        last_slot = Some(node);
    }
    Ok(())
}
