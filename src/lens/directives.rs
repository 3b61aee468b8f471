//! Directives whose values are lists stored as indexed children.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

static MULTI_VALUED: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(
        r"^(?:Ciphers|SendEnv|MACs|(HostKey|Kex)Algorithms|GlobalKnownHostsFile|PubkeyAcceptedKeyTypes)$",
    )
    .case_insensitive(true)
    .build()
    .expect("multi-valued directive pattern is valid")
});

/// How the items of a multi-valued directive are laid out on its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    /// `Ciphers aes128-ctr,aes256-ctr`
    Commas,
    /// `SendEnv LANG LC_*`
    Spaces,
}

impl ListStyle {
    pub fn separator(self) -> &'static str {
        match self {
            ListStyle::Commas => ",",
            ListStyle::Spaces => " ",
        }
    }

    /// False when `item` would be split apart on the next parse.
    pub fn holds(self, item: &str) -> bool {
        match self {
            ListStyle::Commas => !item.contains(','),
            ListStyle::Spaces => !item.contains([' ', '\t']),
        }
    }

    pub fn split(self, text: &str) -> Vec<String> {
        match self {
            ListStyle::Commas => text
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
            ListStyle::Spaces => text.split_whitespace().map(str::to_string).collect(),
        }
    }
}

pub fn is_multi_valued(label: &str) -> bool {
    MULTI_VALUED.is_match(label)
}

pub fn list_style(label: &str) -> Option<ListStyle> {
    if !is_multi_valued(label) {
        return None;
    }
    if label.eq_ignore_ascii_case("SendEnv") || label.eq_ignore_ascii_case("GlobalKnownHostsFile") {
        Some(ListStyle::Spaces)
    } else {
        Some(ListStyle::Commas)
    }
}
