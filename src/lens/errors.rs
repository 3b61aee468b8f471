use thiserror::Error;

/// Input that does not fit the ssh_config grammar. Line numbers are 1-based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LensError {
    #[error("line {line}: {message}")]
    MalformedLine { line: usize, message: String },

    #[error("line {line}: unterminated quote")]
    UnterminatedQuote { line: usize },

    #[error("line {line}: Host without a pattern")]
    MissingHostPattern { line: usize },
}
