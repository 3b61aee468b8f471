//! `"<key>: <text>"` comments stored directly above a key entry.

use crate::mutation::{key_path, EditError};
use crate::tree::{ConfigTree, Match, Path, Position, Side, COMMENT_LABEL};
use tracing::debug;

/// Annotation comments for `key` under `host`: comments whose text starts with
/// `<key>:` and whose next sibling is a `key` entry.
pub fn annotation_path(host: &str, key: &str) -> Result<Path, EditError> {
    let pattern = format!("{}:.*", regex::escape(key));
    Ok(Path::comment(Match::literal(host), Match::pattern(&pattern)?)
        .followed_by(Match::literal(key)))
}

/// Returns the annotation text without its `<key>:` prefix, or an empty string.
pub fn get_comment<T: ConfigTree>(tree: &T, host: &str, key: &str) -> Result<String, EditError> {
    let path = annotation_path(host, key)?.at(Position::First);
    let Some(node) = tree.query(&path).first().copied() else {
        return Ok(String::new());
    };
    let text = tree.value(node)?.unwrap_or("");
    Ok(strip_key_prefix(text, key).to_string())
}

/// Writes the annotation for `key`, or removes it when `text` is empty.
///
/// A missing annotation is created directly above the first `key` entry.
pub fn set_comment<T: ConfigTree>(
    tree: &mut T,
    host: &str,
    key: &str,
    text: &str,
) -> Result<(), EditError> {
    check_text(host, key, text)?;
    let path = annotation_path(host, key)?;
    let existing = tree.query(&path);

    if text.is_empty() {
        for node in existing {
            tree.remove(node)?;
        }
        debug!(host, key, "cleared annotation");
        return Ok(());
    }

    let node = match existing.first() {
        Some(node) => *node,
        None => {
            let anchor = tree
                .query(&key_path(host, key).at(Position::First))
                .first()
                .copied()
                .ok_or_else(|| EditError::KeyNotFound {
                    host: host.to_string(),
                    key: key.to_string(),
                })?;
            tree.insert(anchor, COMMENT_LABEL, Side::Before)?
        }
    };
    tree.set_value(node, &format!("{key}: {text}"))?;
    debug!(host, key, "wrote annotation");
    Ok(())
}

/// Annotation text must stay on the comment line.
pub fn check_text(host: &str, key: &str, text: &str) -> Result<(), EditError> {
    if text.contains(['\r', '\n']) {
        return Err(EditError::InvalidValue {
            host: host.to_string(),
            key: key.to_string(),
        });
    }
    Ok(())
}

fn strip_key_prefix<'a>(text: &'a str, key: &str) -> &'a str {
    let rest = text
        .get(key.len()..)
        .filter(|_| text.get(..key.len()).is_some_and(|head| head.eq_ignore_ascii_case(key)))
        .unwrap_or(text);
    rest.strip_prefix(':').unwrap_or(rest).trim_start()
}
