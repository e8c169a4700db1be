//! Match source: enumerates matches and their captures.
//!
//! Matching itself is delegated to `fancy-regex`, a backtracking engine
//! that understands backreferences, lookaround and atomic groups. Every
//! attempt is bounded by a backtrack limit so hostile patterns fail with
//! [`MatchError::Timeout`] instead of hanging.
//!
//! Patterns are parsed and translated to the engine's dialect first (see
//! [`crate::translate`]), so the engine only ever sees Ruby semantics.

use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use std::sync::Arc;

use fancy_regex::{Captures, Regex, RegexBuilder, RuntimeError};
use log::{debug, trace};

use crate::config::{Flags, DEFAULT_BACKTRACK_LIMIT};
use crate::error::{MatchError, PatternError};
use crate::{parser, translate};

/// Captures of one match. Groups are numbered from 1; group 0 is the match itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchData {
    pub range: Range<usize>,
    pub text: String,
    /// Group `n` is at index `n - 1`; `None` when the group did not participate.
    pub groups: Vec<Option<String>>,
    /// Named groups that participated in this match.
    pub named: BTreeMap<String, String>,
}

impl MatchData {
    pub fn capture_count(&self) -> usize {
        self.groups.len()
    }

    pub fn group(&self, number: usize) -> Option<&str> {
        match number {
            0 => Some(&self.text),
            n => self.groups.get(n - 1)?.as_deref(),
        }
    }

    pub fn name(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.named.contains_key(name)
    }
}

/// Anything that can enumerate the non-overlapping, leftmost-first matches
/// of a pattern in a subject.
pub trait MatchSource {
    fn all_matches(&self, subject: &str) -> Result<Vec<MatchData>, MatchError>;
}

/// A compiled Ruby-style pattern.
#[derive(Debug)]
pub struct Matcher {
    regex: Regex,
    names: Vec<(usize, String)>,
}

impl Matcher {
    pub fn new(pattern: &str, flags: Flags) -> Result<Self, PatternError> {
        Self::with_backtrack_limit(pattern, flags, DEFAULT_BACKTRACK_LIMIT)
    }

    pub fn with_backtrack_limit(
        pattern: &str,
        flags: Flags,
        backtrack_limit: usize,
    ) -> Result<Self, PatternError> {
        let ast = parser::parse(pattern, flags)?;
        let source = engine_source(&translate::engine_pattern(&ast)?, flags);
        let regex = RegexBuilder::new(&source)
            .backtrack_limit(backtrack_limit)
            .build()
            .map_err(|err| PatternError::Syntax(err.to_string()))?;
        let names = regex
            .capture_names()
            .enumerate()
            .filter_map(|(i, name)| name.map(|n| (i, n.to_string())))
            .collect();
        debug!("compiled pattern {pattern:?} with flags {flags:?}");
        Ok(Self { regex, names })
    }

    /// Number of capture groups, not counting the whole match.
    pub fn capture_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    fn match_data(&self, caps: &Captures) -> Option<MatchData> {
        let whole = caps.get(0)?;
        let groups = (1..self.regex.captures_len())
            .map(|i| caps.get(i).map(|m| m.as_str().to_string()))
            .collect();
        let named = self
            .names
            .iter()
            .filter_map(|(i, name)| caps.get(*i).map(|m| (name.clone(), m.as_str().to_string())))
            .collect();
        Some(MatchData {
            range: whole.range(),
            text: whole.as_str().to_string(),
            groups,
            named,
        })
    }
}

impl MatchSource for Matcher {
    fn all_matches(&self, subject: &str) -> Result<Vec<MatchData>, MatchError> {
        let mut matches = Vec::new();
        for caps in self.regex.captures_iter(subject) {
            let caps = caps.map_err(match_error)?;
            if let Some(data) = self.match_data(&caps) {
                trace!("match at {:?}: {:?}", data.range, data.text);
                matches.push(data);
            }
        }
        Ok(matches)
    }
}

fn match_error(err: fancy_regex::Error) -> MatchError {
    match err {
        fancy_regex::Error::RuntimeError(RuntimeError::BacktrackLimitExceeded) => {
            MatchError::Timeout
        }
        other => MatchError::Engine(other.to_string()),
    }
}

/// Ruby's `^` and `$` always work on lines, which is the engine's `m`.
/// Ruby's own `m` is "dot matches newline", spelled `s` by the engine.
/// `x` needs nothing: the translated pattern has no whitespace or comments.
fn engine_source(translated: &str, flags: Flags) -> String {
    let mut prefix = String::from("m");
    if flags.ignore_case {
        prefix.push('i');
    }
    if flags.multiline {
        prefix.push('s');
    }
    format!("(?{prefix}){translated}")
}

/// Compiled patterns keyed on pattern text and flags. Compile errors are not
/// cached, so a pattern that failed is compiled again on the next request.
#[derive(Debug)]
pub struct PatternCache {
    backtrack_limit: usize,
    entries: HashMap<(String, Flags), Arc<Matcher>>,
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new(DEFAULT_BACKTRACK_LIMIT)
    }
}

impl PatternCache {
    pub fn new(backtrack_limit: usize) -> Self {
        Self {
            backtrack_limit,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, pattern: &str, flags: Flags) -> Result<Arc<Matcher>, PatternError> {
        let key = (pattern.to_string(), flags);
        if let Some(matcher) = self.entries.get(&key) {
            trace!("pattern cache hit for {pattern:?}");
            return Ok(Arc::clone(matcher));
        }
        let matcher = Arc::new(Matcher::with_backtrack_limit(
            pattern,
            flags,
            self.backtrack_limit,
        )?);
        self.entries.insert(key, Arc::clone(&matcher));
        Ok(matcher)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
