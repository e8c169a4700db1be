//! Backreference substitution.
//!
//! A template such as `[\1]` or `<\k<word>>` is expanded once per match and
//! the result replaces that match. Before anything is replaced, the
//! template's references are checked against the first match: a numbered
//! reference to a group the pattern does not have abandons the whole
//! substitution, while a name the match did not set is only reported.
//!
//! Replacement text is HTML-escaped because both the subject and the
//! template come from the user and end up in markup.

use std::collections::HashSet;
use std::fmt;

use log::debug;

use crate::error::ValidationError;
use crate::matcher::{MatchData, MatchSource};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateToken {
    Text(String),
    /// `\N`
    Number(usize),
    /// `\k<name>`
    Name(String),
}

impl fmt::Display for TemplateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateToken::Text(text) => f.write_str(text),
            TemplateToken::Number(n) => write!(f, "\\{n}"),
            TemplateToken::Name(name) => write!(f, "\\k<{name}>"),
        }
    }
}

/// Split a template into literal text and references. `\\` is a literal
/// backslash; any other backslash that does not start a reference is kept.
pub fn parse_template(template: &str) -> Vec<TemplateToken> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut rest = template;

    while let Some(ch) = rest.chars().next() {
        let (token, len) = match ch {
            '\\' => reference_at(rest),
            _ => (None, ch.len_utf8()),
        };
        match token {
            Some(token) => {
                if !text.is_empty() {
                    tokens.push(TemplateToken::Text(std::mem::take(&mut text)));
                }
                tokens.push(token);
            }
            None if rest.starts_with("\\\\") => text.push('\\'),
            None => text.push_str(&rest[..len]),
        }
        rest = &rest[len..];
    }
    if !text.is_empty() {
        tokens.push(TemplateToken::Text(text));
    }
    tokens
}

/// Reference at the start of `text` (which begins with `\`), and how many
/// bytes it spans. Not a reference: `None` with the length to copy verbatim.
fn reference_at(text: &str) -> (Option<TemplateToken>, usize) {
    let after = &text[1..];
    let digits = after.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        let number = after[..digits].parse().unwrap_or(usize::MAX);
        return (Some(TemplateToken::Number(number)), 1 + digits);
    }
    if let Some(body) = after.strip_prefix("k<") {
        if let Some(close) = body.find('>').filter(|&close| close > 0) {
            let name = &body[..close];
            return (Some(TemplateToken::Name(name.to_string())), 3 + close + 1);
        }
    }
    if after.starts_with('\\') {
        return (None, 2);
    }
    (None, 1)
}

/// A piece of the substituted subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Subject text outside any match, verbatim.
    Literal(String),
    /// Escaped replacement text for one match.
    Highlight(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub fragments: Vec<Fragment>,
    pub errors: Vec<ValidationError>,
}

impl Substitution {
    /// The subject as-is, with whatever errors explain why.
    pub fn unchanged(subject: &str, errors: Vec<ValidationError>) -> Self {
        let fragments = if subject.is_empty() {
            Vec::new()
        } else {
            vec![Fragment::Literal(subject.to_string())]
        };
        Self { fragments, errors }
    }

    /// Substitute every match `source` finds in `subject` with `template`.
    pub fn build<M: MatchSource + ?Sized>(source: &M, subject: &str, template: &str) -> Self {
        let tokens = parse_template(template);
        let matches = match source.all_matches(subject) {
            Ok(matches) => matches,
            Err(err) => {
                debug!("matching failed: {err}");
                return Self::unchanged(subject, vec![ValidationError::pattern(err.to_string())]);
            }
        };
        let Some(reference) = matches.first() else {
            return Self::unchanged(subject, Vec::new());
        };

        let (errors, numbered_invalid) = validate(&tokens, reference);
        if numbered_invalid {
            debug!("template {template:?} refers to missing groups, leaving subject unchanged");
            return Self::unchanged(subject, errors);
        }

        let replacements: Vec<String> = matches.iter().map(|m| expand(&tokens, m)).collect();
        let degenerate = matches
            .iter()
            .zip(&replacements)
            .all(|(m, replacement)| m.text.is_empty() && replacement.is_empty());
        if degenerate {
            return Self::unchanged(subject, errors);
        }

        let mut fragments = Vec::new();
        let mut cursor = 0;
        for (m, replacement) in matches.iter().zip(replacements) {
            if m.range.start < cursor {
                continue;
            }
            if let Some(between) = subject.get(cursor..m.range.start).filter(|s| !s.is_empty()) {
                fragments.push(Fragment::Literal(between.to_string()));
            }
            fragments.push(Fragment::Highlight(escape_html(&replacement)));
            cursor = m.range.end;
        }
        if let Some(tail) = subject.get(cursor..).filter(|s| !s.is_empty()) {
            fragments.push(Fragment::Literal(tail.to_string()));
        }
        Self { fragments, errors }
    }

    pub fn highlight_count(&self) -> usize {
        self.fragments
            .iter()
            .filter(|f| matches!(f, Fragment::Highlight(_)))
            .count()
    }

    /// The substituted subject as plain text, replacements unescaped.
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| match f {
                Fragment::Literal(text) => text.clone(),
                Fragment::Highlight(text) => unescape_html(text),
            })
            .collect()
    }

    /// HTML with each replacement in a `<span class="…">`. Literal subject
    /// text is escaped here as well.
    pub fn to_html(&self, class: &str) -> String {
        let mut html = String::new();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Literal(text) => html.push_str(&escape_html(text)),
                Fragment::Highlight(text) => {
                    html.push_str(&format!(
                        "<span class=\"{}\">{}</span>",
                        escape_html(class),
                        text
                    ));
                }
            }
        }
        html
    }
}

/// Checks references against the reference match. The flag is set when a
/// numbered reference is out of range.
fn validate(tokens: &[TemplateToken], reference: &MatchData) -> (Vec<ValidationError>, bool) {
    let mut errors = Vec::new();
    let mut reported = HashSet::new();
    let mut numbered_invalid = false;
    let count = reference.capture_count();

    for token in tokens {
        let message = match token {
            TemplateToken::Number(n) if *n > count => {
                numbered_invalid = true;
                format!("{token} refers to group {n}, but the pattern has {count} capture group(s)")
            }
            TemplateToken::Name(name) if !reference.has_name(name) => {
                format!("{token} refers to a named group that is not set in the match")
            }
            _ => continue,
        };
        if reported.insert(token) {
            debug!("invalid template reference {token}");
            errors.push(ValidationError::template(message));
        }
    }
    (errors, numbered_invalid)
}

/// Expand the template for one match. Unset groups are empty; a number this
/// match cannot resolve at all stands for the matched text.
fn expand(tokens: &[TemplateToken], m: &MatchData) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            TemplateToken::Text(text) => out.push_str(text),
            TemplateToken::Number(n) if *n > m.capture_count() => out.push_str(&m.text),
            TemplateToken::Number(n) => out.push_str(m.group(*n).unwrap_or_default()),
            TemplateToken::Name(name) => out.push_str(m.name(name).unwrap_or_default()),
        }
    }
    out
}

/// Escape HTML special characters
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Inverse of [`escape_html`].
fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
