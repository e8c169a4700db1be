use std::fmt;

use thiserror::Error;

/// Failure to turn pattern text into an AST.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("end pattern with unmatched parenthesis at offset {0}")]
    UnclosedGroup(usize),
    #[error("unmatched close parenthesis at offset {0}")]
    UnmatchedParen(usize),
    #[error("premature end of char-class at offset {0}")]
    UnclosedSet(usize),
    #[error("target of repeat operator is not specified at offset {0}")]
    MissingRepeatTarget(usize),
    #[error("too short escape sequence at offset {0}")]
    TrailingBackslash(usize),
    #[error("invalid {construct} at offset {offset}")]
    Invalid {
        construct: &'static str,
        offset: usize,
    },
    #[error("undefined group option at offset {0}")]
    UndefinedGroupOption(usize),
}

/// Pattern-level rejection, shown in place of a diagram or substitution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("{0}")]
    Syntax(String),
    #[error("{0}")]
    UnsupportedConstruct(String),
    #[error("match attempt exceeded the backtracking limit")]
    Timeout,
}

impl PatternError {
    pub fn user_message(&self) -> String {
        format!("Invalid pattern: {self}")
    }
}

impl From<ParseError> for PatternError {
    fn from(err: ParseError) -> Self {
        PatternError::Syntax(err.to_string())
    }
}

/// Failure reported by a match source while enumerating matches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("match attempt exceeded the backtracking limit")]
    Timeout,
    #[error("regex engine error: {0}")]
    Engine(String),
}

impl From<MatchError> for PatternError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::Timeout => PatternError::Timeout,
            MatchError::Engine(message) => PatternError::Syntax(message),
        }
    }
}

/// Input field a validation message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Pattern,
    Template,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Pattern => f.write_str("pattern"),
            Field::Template => f.write_str("template"),
        }
    }
}

/// A message reported alongside otherwise valid output.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: Field,
    pub message: String,
}

impl ValidationError {
    pub fn pattern(message: impl Into<String>) -> Self {
        Self {
            field: Field::Pattern,
            message: message.into(),
        }
    }

    pub fn template(message: impl Into<String>) -> Self {
        Self {
            field: Field::Template,
            message: message.into(),
        }
    }
}
