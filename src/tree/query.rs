use regex::{Regex, RegexBuilder};
use std::fmt;

/// Predicate over a node label or value.
///
/// Literal matches compare the whole text case-insensitively and never
/// interpret the text as a pattern, so host and key names taken from a
/// resource can be used verbatim. Patterns are anchored to the whole text and
/// are case-insensitive as well.
#[derive(Debug, Clone)]
pub enum Match {
    Any,
    Literal(String),
    Pattern(Regex),
}

impl Match {
    pub fn literal(text: impl Into<String>) -> Self {
        Match::Literal(text.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&format!("^(?:{pattern})$"))
            .case_insensitive(true)
            .build()?;
        Ok(Match::Pattern(regex))
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Match::Any => true,
            Match::Literal(expected) => {
                expected.eq_ignore_ascii_case(text)
                    || expected.to_lowercase() == text.to_lowercase()
            }
            Match::Pattern(regex) => regex.is_match(text),
        }
    }
}

impl PartialEq for Match {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Match::Any, Match::Any) => true,
            (Match::Literal(a), Match::Literal(b)) => a == b,
            (Match::Pattern(a), Match::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl Eq for Match {}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Match::Any => write!(f, "*"),
            Match::Literal(text) => write!(f, "'{text}'"),
            Match::Pattern(regex) => write!(f, "/{}/i", regex.as_str()),
        }
    }
}

/// Ordinal filter applied to the ordered match list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    All,
    First,
    Last,
    /// 1-based
    Nth(usize),
    AllButFirst,
}

impl Position {
    pub(crate) fn select<T: Copy>(self, found: Vec<T>) -> Vec<T> {
        match self {
            Position::All => found,
            Position::First => found.first().copied().into_iter().collect(),
            Position::Last => found.last().copied().into_iter().collect(),
            Position::Nth(n) => n
                .checked_sub(1)
                .and_then(|idx| found.get(idx).copied())
                .into_iter()
                .collect(),
            Position::AllButFirst => found.into_iter().skip(1).collect(),
        }
    }
}

/// What to select inside the matched host blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The host nodes themselves.
    Block,
    /// Key entries whose label matches.
    Entry(Match),
    /// `#comment` nodes whose text matches, optionally only those whose next
    /// sibling (blank lines skipped) is an entry with a matching label.
    Comment {
        text: Match,
        followed_by: Option<Match>,
    },
}

/// A structural query: host predicate, step, position.
///
/// Paths hold no node handles and are resolved against the current tree
/// every time they are queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    host: Match,
    step: Step,
    position: Position,
}

impl Path {
    pub fn host(host: Match) -> Self {
        Self {
            host,
            step: Step::Block,
            position: Position::All,
        }
    }

    pub fn entry(host: Match, label: Match) -> Self {
        Self {
            host,
            step: Step::Entry(label),
            position: Position::All,
        }
    }

    pub fn comment(host: Match, text: Match) -> Self {
        Self {
            host,
            step: Step::Comment {
                text,
                followed_by: None,
            },
            position: Position::All,
        }
    }

    /// Restricts a comment path to comments directly preceding a matching entry.
    /// Has no effect on other steps.
    pub fn followed_by(mut self, label: Match) -> Self {
        if let Step::Comment { followed_by, .. } = &mut self.step {
            *followed_by = Some(label);
        }
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn host_match(&self) -> &Match {
        &self.host
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Host[{}]", self.host)?;
        match &self.step {
            Step::Block => {}
            Step::Entry(label) => write!(f, "/{label}")?,
            Step::Comment { text, followed_by } => {
                write!(f, "/#comment[{text}]")?;
                if let Some(label) = followed_by {
                    write!(f, "[next={label}]")?;
                }
            }
        }
        match self.position {
            Position::All => Ok(()),
            Position::First => write!(f, "[first]"),
            Position::Last => write!(f, "[last]"),
            Position::Nth(n) => write!(f, "[{n}]"),
            Position::AllButFirst => write!(f, "[not first]"),
        }
    }
}
