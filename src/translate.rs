//! Translation from a Ruby AST to the matching engine's pattern dialect.
//!
//! The engine speaks a Perl-like dialect, so most nodes are written back
//! much as they were parsed. The rest are rewritten to keep Ruby semantics:
//!
//! * `^` never matches after a final newline, and `\Z` is `(?=\n?\z)`.
//! * Ruby's `m` option is the engine's `s`. `x` is dropped because
//!   whitespace and comments are not emitted at all.
//! * Once a pattern has a named group, plain `(...)` groups do not capture.
//! * Possessive quantifiers become atomic groups, `{,m}` becomes `{0,m}`.
//! * Character escapes are decoded to the characters they stand for.
//!
//! Constructs with no engine equivalent are rejected with
//! [`PatternError::UnsupportedConstruct`].

use crate::ast::{
    AnchorKind, AssertionKind, BackrefKind, CharType, EscapeKind, GroupKind, Node, NodeKind,
};
use crate::error::PatternError;
use crate::quantifier::{self, Greediness, QuantifierKind, Resolution};

/// Engine pattern equivalent to the parsed Ruby pattern `ast`.
pub fn engine_pattern(ast: &Node) -> Result<String, PatternError> {
    let mut translator = Translator {
        named: has_named_group(ast),
        captures: 0,
    };
    let mut out = String::new();
    translator.node(ast, &mut out)?;
    Ok(out)
}

struct Translator {
    /// Named groups present: plain groups are non-capturing and numbered
    /// references are errors.
    named: bool,
    /// Capturing groups opened so far, for relative references.
    captures: usize,
}

impl Translator {
    fn node(&mut self, node: &Node, out: &mut String) -> Result<(), PatternError> {
        let Some(text) = node.quantifier.as_deref() else {
            return self.atom(node, out);
        };
        let mut atom = String::new();
        self.atom(node, &mut atom)?;
        if matches!(node.kind, NodeKind::Escape(EscapeKind::CodepointList)) {
            atom = format!("(?:{atom})");
        }
        match quantifier::resolve(text) {
            Resolution::Quantified(q) if q.greediness == Greediness::Possessive => {
                out.push_str(&format!("(?>{atom}{})", repetition(q.kind)));
            }
            Resolution::Quantified(q) => {
                out.push_str(&atom);
                out.push_str(&repetition(q.kind));
                if q.greediness == Greediness::Lazy {
                    out.push('?');
                }
            }
            Resolution::Skip => {
                out.push_str(&atom);
                out.push_str("{0}");
            }
            Resolution::Fallback(raw) => {
                out.push_str(&atom);
                out.push_str(&raw);
            }
        }
        Ok(())
    }

    fn children(&mut self, node: &Node, out: &mut String) -> Result<(), PatternError> {
        for child in &node.children {
            self.node(child, out)?;
        }
        Ok(())
    }

    fn atom(&mut self, node: &Node, out: &mut String) -> Result<(), PatternError> {
        match &node.kind {
            NodeKind::Root | NodeKind::Sequence => self.children(node, out)?,
            NodeKind::Alternation => {
                for (i, branch) in node.children.iter().enumerate() {
                    if i > 0 {
                        out.push('|');
                    }
                    self.node(branch, out)?;
                }
            }
            NodeKind::Literal => node.text.chars().for_each(|c| push_escaped(c, out)),
            NodeKind::Group(kind) => self.group(node, kind, out)?,
            NodeKind::Assertion(kind) => {
                out.push_str(match kind {
                    AssertionKind::Lookahead => "(?=",
                    AssertionKind::NegativeLookahead => "(?!",
                    AssertionKind::Lookbehind => "(?<=",
                    AssertionKind::NegativeLookbehind => "(?<!",
                });
                self.children(node, out)?;
                out.push(')');
            }
            NodeKind::Conditional { condition } => {
                out.push_str(&format!("(?({condition})"));
                for (i, branch) in node.children.iter().enumerate() {
                    if i > 0 {
                        out.push('|');
                    }
                    self.node(branch, out)?;
                }
                out.push(')');
            }
            NodeKind::CharacterSet { negated } => self.set(node, *negated, out)?,
            NodeKind::SetRange | NodeKind::SetIntersection => self.set_member(node, out)?,
            NodeKind::Anchor(kind) => out.push_str(anchor(*kind)),
            NodeKind::Backreference(kind) => self.backref(node, *kind, out)?,
            NodeKind::CharacterType(kind) => out.push_str(char_type(*kind)?),
            NodeKind::Escape(_) => {
                for c in escape_chars(node)? {
                    push_escaped(c, out);
                }
            }
            NodeKind::Keep => out.push_str(r"\K"),
            NodeKind::PosixClass { .. } => out.push_str(&format!("[{}]", node.text)),
            NodeKind::UnicodeProperty { .. } => out.push_str(&property(&node.text)),
            NodeKind::Comment | NodeKind::WhiteSpace => {}
            NodeKind::Unknown => return Err(unsupported(&format!("'{}'", node.text))),
        }
        Ok(())
    }

    fn group(&mut self, node: &Node, kind: &GroupKind, out: &mut String) -> Result<(), PatternError> {
        let open = match kind {
            GroupKind::Capture { .. } if self.named => "(?:".to_string(),
            GroupKind::Capture { .. } => {
                self.captures += 1;
                "(".to_string()
            }
            GroupKind::Named { name, .. } => {
                self.captures += 1;
                format!("(?<{name}>")
            }
            GroupKind::Passive => "(?:".to_string(),
            GroupKind::Atomic => "(?>".to_string(),
            GroupKind::Absence => return Err(unsupported("absence group (?~...)")),
            GroupKind::Comment => return Ok(()),
            GroupKind::Options { flags } => {
                let flags = engine_flags(flags);
                if node.children.is_empty() {
                    if !flags.is_empty() {
                        out.push_str(&format!("(?{flags})"));
                    }
                    return Ok(());
                }
                if flags.is_empty() {
                    "(?:".to_string()
                } else {
                    format!("(?{flags}:")
                }
            }
        };
        out.push_str(&open);
        self.children(node, out)?;
        out.push(')');
        Ok(())
    }

    fn backref(&mut self, node: &Node, kind: BackrefKind, out: &mut String) -> Result<(), PatternError> {
        let body = reference_body(&node.text);
        match kind {
            BackrefKind::Number | BackrefKind::NumberRef | BackrefKind::NumberRelative
                if self.named =>
            {
                return Err(PatternError::Syntax(
                    "numbered backref/call is not allowed. (use name)".to_string(),
                ));
            }
            BackrefKind::Number => out.push_str(&node.text),
            BackrefKind::NumberRef => out.push_str(&format!("\\{body}")),
            BackrefKind::NumberRelative => {
                let number = body
                    .strip_prefix('-')
                    .and_then(|back| back.parse::<usize>().ok())
                    .and_then(|back| (self.captures + 1).checked_sub(back))
                    .filter(|&number| number > 0)
                    .ok_or_else(|| {
                        PatternError::Syntax(format!("invalid backref number/name: {}", node.text))
                    })?;
                out.push_str(&format!("\\{number}"));
            }
            BackrefKind::Name => out.push_str(&format!("\\k<{body}>")),
            BackrefKind::NumberRecursionLevel | BackrefKind::NameRecursionLevel => {
                return Err(unsupported("back-reference with a recursion level"));
            }
            BackrefKind::NumberCall | BackrefKind::NameCall => {
                return Err(unsupported("subexpression call"));
            }
        }
        Ok(())
    }

    fn set(&mut self, node: &Node, negated: bool, out: &mut String) -> Result<(), PatternError> {
        out.push('[');
        if negated {
            out.push('^');
        }
        for member in &node.children {
            self.set_member(member, out)?;
        }
        out.push(']');
        Ok(())
    }

    fn set_member(&mut self, member: &Node, out: &mut String) -> Result<(), PatternError> {
        match &member.kind {
            NodeKind::SetRange => {
                for (i, endpoint) in member.children.iter().enumerate() {
                    if i > 0 {
                        out.push('-');
                    }
                    match escape_chars(endpoint)?.as_slice() {
                        [c] => push_set_escaped(*c, out),
                        _ => {
                            return Err(PatternError::Syntax(format!(
                                "invalid range in char-class: {}",
                                member.text
                            )))
                        }
                    }
                }
            }
            NodeKind::SetIntersection => {
                for (i, operand) in member.children.iter().enumerate() {
                    if i > 0 {
                        out.push_str("&&");
                    }
                    for m in &operand.children {
                        self.set_member(m, out)?;
                    }
                }
            }
            NodeKind::CharacterSet { negated } => self.set(member, *negated, out)?,
            NodeKind::PosixClass { .. } => out.push_str(&member.text),
            NodeKind::CharacterType(CharType::Hex) => out.push_str("0-9a-fA-F"),
            NodeKind::CharacterType(kind) => out.push_str(char_type(*kind)?),
            NodeKind::UnicodeProperty { .. } => out.push_str(&property(&member.text)),
            NodeKind::Literal | NodeKind::Escape(_) => {
                for c in escape_chars(member)? {
                    push_set_escaped(c, out);
                }
            }
            _ => self.atom(member, out)?,
        }
        Ok(())
    }
}

fn has_named_group(node: &Node) -> bool {
    matches!(node.kind, NodeKind::Group(GroupKind::Named { .. }))
        || node.children.iter().any(has_named_group)
}

fn unsupported(construct: &str) -> PatternError {
    PatternError::UnsupportedConstruct(format!("{construct} is not supported when substituting"))
}

fn repetition(kind: QuantifierKind) -> String {
    match kind {
        QuantifierKind::Star => "*".to_string(),
        QuantifierKind::Plus => "+".to_string(),
        QuantifierKind::Optional => "?".to_string(),
        QuantifierKind::Exact(n) => format!("{{{n}}}"),
        QuantifierKind::Range { min, max } => format!("{{{min},{max}}}"),
        QuantifierKind::AtLeast(min) => format!("{{{min},}}"),
    }
}

/// `im-x` → `is`
fn engine_flags(flags: &str) -> String {
    let (on, off) = flags.split_once('-').unwrap_or((flags, ""));
    let convert = |letters: &str| {
        letters
            .chars()
            .filter(|&c| c != 'x')
            .map(|c| if c == 'm' { 's' } else { c })
            .collect::<String>()
    };
    let (on, off) = (convert(on), convert(off));
    if off.is_empty() {
        on
    } else {
        format!("{on}-{off}")
    }
}

fn anchor(kind: AnchorKind) -> &'static str {
    match kind {
        AnchorKind::BeginningOfLine => r"(?:\A|^(?!\z))",
        AnchorKind::EndOfLine => "$",
        AnchorKind::BeginningOfString => r"\A",
        AnchorKind::EndOfString => r"\z",
        AnchorKind::EndOfStringOrBeforeEndOfLine => r"(?=\n?\z)",
        AnchorKind::WordBoundary => r"\b",
        AnchorKind::NonWordBoundary => r"\B",
        AnchorKind::MatchStart => r"\G",
    }
}

fn char_type(kind: CharType) -> Result<&'static str, PatternError> {
    Ok(match kind {
        CharType::Any => ".",
        CharType::Digit => r"\d",
        CharType::NonDigit => r"\D",
        CharType::Hex => "[0-9a-fA-F]",
        CharType::NonHex => "[^0-9a-fA-F]",
        CharType::Word => r"\w",
        CharType::NonWord => r"\W",
        CharType::Space => r"\s",
        CharType::NonSpace => r"\S",
        CharType::Linebreak => return Err(unsupported(r"line break escape \R")),
        CharType::ExtendedGrapheme => return Err(unsupported(r"grapheme cluster escape \X")),
    })
}

/// `\p{^Greek}` → `\P{Greek}`
fn property(text: &str) -> String {
    let name = text.get(3..text.len().saturating_sub(1)).unwrap_or_default();
    match name.strip_prefix('^') {
        Some(name) if text.starts_with("\\P") => format!("\\p{{{name}}}"),
        Some(name) => format!("\\P{{{name}}}"),
        None => text.to_string(),
    }
}

/// Name or number between the delimiters of `\k<...>` or `\k'...'`.
fn reference_body(text: &str) -> &str {
    text.get(3..text.len().saturating_sub(1)).unwrap_or_default()
}

/// Characters a literal or character escape stands for.
fn escape_chars(node: &Node) -> Result<Vec<char>, PatternError> {
    let NodeKind::Escape(kind) = &node.kind else {
        return Ok(node.literal_text().chars().collect());
    };
    let text = node.text.as_str();
    let fixed = match kind {
        EscapeKind::Literal => return Ok(node.literal_text().chars().collect()),
        EscapeKind::AsciiEscape => '\u{1b}',
        EscapeKind::Backspace => '\u{8}',
        EscapeKind::Bell => '\u{7}',
        EscapeKind::FormFeed => '\u{c}',
        EscapeKind::Newline => '\n',
        EscapeKind::CarriageReturn => '\r',
        EscapeKind::VerticalTab => '\u{b}',
        EscapeKind::Tab => '\t',
        EscapeKind::Octal => codepoint(text.get(1..), 8)?,
        EscapeKind::Hex => codepoint(text.get(2..), 16)?,
        EscapeKind::Codepoint | EscapeKind::CodepointList => {
            let body = text.get(2..).unwrap_or_default();
            let body = body.trim_start_matches('{').trim_end_matches('}');
            return body
                .split_whitespace()
                .map(|digits| codepoint(Some(digits), 16))
                .collect();
        }
        EscapeKind::Utf8Hex => {
            let bytes = text
                .split("\\x")
                .filter(|hex| !hex.is_empty())
                .map(|hex| u8::from_str_radix(hex, 16))
                .collect::<Result<Vec<u8>, _>>()
                .map_err(|_| invalid_escape(text))?;
            let decoded = String::from_utf8(bytes).map_err(|_| {
                PatternError::Syntax(format!("invalid multibyte escape: {text}"))
            })?;
            return Ok(decoded.chars().collect());
        }
        EscapeKind::Control => match text.chars().last() {
            Some('?') => '\u{7f}',
            Some(c) if c.is_ascii() => char::from(c as u8 & 0x1f),
            _ => return Err(invalid_escape(text)),
        },
        EscapeKind::Meta | EscapeKind::MetaControl => {
            return Err(unsupported(&format!("meta escape {text}")))
        }
    };
    Ok(vec![fixed])
}

fn codepoint(digits: Option<&str>, radix: u32) -> Result<char, PatternError> {
    digits
        .and_then(|d| u32::from_str_radix(d, radix).ok())
        .and_then(char::from_u32)
        .ok_or_else(|| PatternError::Syntax(format!("invalid code point: {}", digits.unwrap_or(""))))
}

fn invalid_escape(text: &str) -> PatternError {
    PatternError::Syntax(format!("invalid escape: {text}"))
}

fn push_escaped(c: char, out: &mut String) {
    if matches!(
        c,
        '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
    ) {
        out.push('\\');
    }
    out.push(c);
}

fn push_set_escaped(c: char, out: &mut String) {
    if matches!(c, '\\' | ']' | '[' | '^' | '-' | '&' | '~') {
        out.push('\\');
    }
    out.push(c);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Flags;
    use crate::parser::parse;

    fn translate(pattern: &str) -> Result<String, PatternError> {
        engine_pattern(&parse(pattern, Flags::default()).unwrap())
    }

    #[test]
    fn plain_patterns_pass_through() {
        assert_eq!(translate(r"a(b|c)+\d").unwrap(), r"a(b|c)+\d");
        assert_eq!(translate(r"(?=x)(?<!y)\1").unwrap(), r"(?=x)(?<!y)\1");
    }

    #[test]
    fn ruby_anchors_are_rewritten() {
        assert_eq!(translate(r"^a\Z").unwrap(), r"(?:\A|^(?!\z))a(?=\n?\z)");
    }

    #[test]
    fn named_groups_turn_off_plain_captures() {
        assert_eq!(translate("(?<w>a)(b)").unwrap(), "(?<w>a)(?:b)");
        assert_eq!(translate("(?'w'a)").unwrap(), "(?<w>a)");
        assert!(matches!(translate(r"(?<w>a)\1"), Err(PatternError::Syntax(_))));
    }

    #[test]
    fn relative_references_resolve_to_numbers() {
        assert_eq!(translate(r"(a)(b)\k<-1>\k<-2>").unwrap(), r"(a)(b)\2\1");
        assert!(translate(r"(a)\k<-2>").is_err());
    }

    #[test]
    fn quantifiers_are_normalized() {
        assert_eq!(translate("a{,3}b*+c??").unwrap(), "a{0,3}(?>b*)c??");
    }

    #[test]
    fn options_use_engine_letters() {
        assert_eq!(translate("(?m-x:a)(?x)b").unwrap(), "(?s:a)b");
        assert_eq!(engine_flags("im-x"), "is");
        assert_eq!(engine_flags("-m"), "-s");
    }

    #[test]
    fn escapes_are_decoded() {
        assert_eq!(translate(r"\x41\u{42 43}\e\.\{").unwrap(), "ABC\u{1b}\\.\\{");
        assert_eq!(translate(r"\xE2\x82\xAC").unwrap(), "€");
        assert_eq!(translate(r"\cA").unwrap(), "\u{1}");
        assert!(matches!(translate(r"\xE2"), Err(PatternError::Syntax(_))));
    }

    #[test]
    fn sets_escape_their_members() {
        assert_eq!(translate(r"[a\-z\]]").unwrap(), r"[a\-z\]]");
        assert_eq!(translate(r"[\x41-\x5A\h]").unwrap(), "[A-Z0-9a-fA-F]");
        assert_eq!(translate(r"[a-z&&[^aeiou]]").unwrap(), "[a-z&&[^aeiou]]");
        assert_eq!(translate(r"\p{^Greek}").unwrap(), r"\P{Greek}");
    }

    #[test]
    fn constructs_without_engine_support() {
        for pattern in ["(?~ab)", r"\R", r"\X", r"\g<1>", r"\M-a", r"(a)\k<1+0>"] {
            assert!(
                matches!(translate(pattern), Err(PatternError::UnsupportedConstruct(_))),
                "{pattern}"
            );
        }
    }
}
