//! The ssh_config grammar: text to tree and back.
//!
//! Every line becomes a node. Untouched nodes render their original text, so
//! `serialize(parse(text)) == text` for any input the parser accepts.

pub mod directives;
pub mod errors;
mod parser;
mod render;

pub use directives::{is_multi_valued, list_style, ListStyle};
pub use errors::LensError;

pub use parser::{is_keyword, is_plain_value};
pub(crate) use parser::parse;
pub(crate) use render::render;

/// Formatting used for lines the editor creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LensOptions {
    /// Indentation of entries in a host block that has no entry to copy it from.
    pub indent: String,
}

impl Default for LensOptions {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
        }
    }
}
