use crate::ast::{
    AnchorKind, AssertionKind, BackrefKind, CharType, EscapeKind, GroupKind, Node, NodeKind,
};
use crate::config::Flags;
use crate::error::ParseError;

/// Parse a pattern written in Ruby regex syntax.
pub fn parse(pattern: &str, flags: Flags) -> Result<Node, ParseError> {
    Parser::new(pattern).extended(flags.extended).parse()
}

/// Parser for Ruby (Onigmo) regular expressions.
///
/// The `Parser` struct holds the pattern and the current position.
/// It also manages group numbers for capturing groups and tracks whether
/// extended (`x`) mode is in effect.
pub struct Parser<'a> {
    pub pattern: &'a str,
    pub pos: usize,
    next_group_id: usize,
    extended: bool,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given pattern.
    pub fn new(pattern: &'a str) -> Self {
        Self {
            pattern,
            pos: 0,
            next_group_id: 1,
            extended: false,
        }
    }

    /// Start in extended mode, as if the pattern were compiled with `x`.
    pub fn extended(mut self, extended: bool) -> Self {
        self.extended = extended;
        self
    }

    /// Allocate a new group number for capturing groups.
    fn alloc_group_id(&mut self) -> usize {
        let id = self.next_group_id;
        self.next_group_id += 1;
        id
    }

    /// Peek at the next character in the pattern without advancing.
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn rest(&self) -> &'a str {
        &self.pattern[self.pos..]
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Advance the parser by one character and return it.
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn advance_by(&mut self, prefix: &str) {
        self.pos += prefix.len();
    }

    /// Expect a specific character and advance if it matches.
    fn expect(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn source(&self, start: usize) -> &'a str {
        &self.pattern[start..self.pos]
    }

    /// Consume characters up to (not including) `end`, returning them.
    fn take_until(&mut self, end: char) -> Option<&'a str> {
        let len = self.rest().find(end)?;
        let taken = &self.rest()[..len];
        self.pos += len;
        Some(taken)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.advance();
        }
        self.source(start)
    }

    fn invalid(&self, construct: &'static str, offset: usize) -> ParseError {
        ParseError::Invalid { construct, offset }
    }

    /// Entry point for parsing a regex pattern.
    ///
    /// Example:
    /// - Pattern: `a|b` → Root([Alternation([Sequence([Literal('a')]), Sequence([Literal('b')])])])
    pub fn parse(&mut self) -> Result<Node, ParseError> {
        let children = self.parse_alt()?;
        if self.peek().is_some() {
            return Err(ParseError::UnmatchedParen(self.pos));
        }
        Ok(Node::with_children(NodeKind::Root, self.pattern, children))
    }

    /// Parse alternation (`|`) up to the end of the enclosing group.
    ///
    /// Example:
    /// - Pattern: `a|b` → [Alternation([Sequence([a]), Sequence([b])])]
    /// - Pattern: `ab`  → [Literal('a'), Literal('b')]
    fn parse_alt(&mut self) -> Result<Vec<Node>, ParseError> {
        let start = self.pos;
        let first = self.parse_seq()?;
        if self.peek() != Some('|') {
            return Ok(first);
        }
        let mut branches = vec![Node::with_children(
            NodeKind::Sequence,
            self.source(start),
            first,
        )];
        while self.expect('|') {
            let branch_start = self.pos;
            let items = self.parse_seq()?;
            branches.push(Node::with_children(
                NodeKind::Sequence,
                self.source(branch_start),
                items,
            ));
        }
        Ok(vec![Node::with_children(
            NodeKind::Alternation,
            self.source(start),
            branches,
        )])
    }

    /// Parse a sequence of quantified atoms (concatenation).
    ///
    /// Example:
    /// - Pattern: `a(b|c)d` → [Literal('a'), Group, Literal('d')]
    fn parse_seq(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        while let Some(ch) = self.peek() {
            if ch == ')' || ch == '|' {
                break;
            }
            if self.extended && ch.is_whitespace() {
                let start = self.pos;
                self.take_while(char::is_whitespace);
                nodes.push(Node::new(NodeKind::WhiteSpace, self.source(start)));
                continue;
            }
            if self.extended && ch == '#' {
                let start = self.pos;
                self.take_while(|c| c != '\n');
                self.expect('\n');
                nodes.push(Node::new(NodeKind::Comment, self.source(start)));
                continue;
            }
            nodes.push(self.parse_quantified()?);
        }
        Ok(nodes)
    }

    /// Parse an atom followed by any quantifiers.
    ///
    /// Example:
    /// - Pattern: `a?`     → Literal('a') quantified `?`
    /// - Pattern: `b{2,}+` → Literal('b') quantified `{2,}+`
    /// - Pattern: `c**`    → Passive(Literal('c') quantified `*`) quantified `*`
    fn parse_quantified(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        let mut node = self.parse_atom()?;
        if matches!(node.kind, NodeKind::Group(GroupKind::Comment)) {
            return Ok(node);
        }
        while let Some(quantifier) = self.parse_quantifier() {
            if node.quantifier.is_some() {
                node = Node::with_children(
                    NodeKind::Group(GroupKind::Passive),
                    &self.pattern[start..self.pos - quantifier.len()],
                    vec![node],
                );
            }
            node.quantifier = Some(quantifier.to_string());
        }
        Ok(node)
    }

    /// Consume a quantifier at the current position, if there is one.
    fn parse_quantifier(&mut self) -> Option<&'a str> {
        let start = self.pos;
        match self.peek()? {
            '*' | '+' | '?' => {
                self.advance();
            }
            '{' => {
                let len = interval_len(self.rest())?;
                self.pos += len;
            }
            _ => return None,
        }
        if matches!(self.peek(), Some('?' | '+')) {
            self.advance();
        }
        Some(self.source(start))
    }

    /// Parse a single atom: group, set, escape, anchor, dot or literal.
    ///
    /// Examples:
    /// - Pattern: `(abc)` → Group(Capture #1, [a, b, c])
    /// - Pattern: `[abc]` → CharacterSet([a, b, c])
    /// - Pattern: `\d`   → CharacterType(Digit)
    /// - Pattern: `\1`   → Backreference(Number)
    /// - Pattern: `.`    → CharacterType(Any)
    /// - Pattern: `^`    → Anchor(BeginningOfLine)
    /// - Pattern: `a`    → Literal('a')
    fn parse_atom(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        match self.peek() {
            Some('(') => self.parse_group(),
            Some('[') => self.parse_set(),
            Some('\\') => self.parse_escape(false),
            Some('.') => {
                self.advance();
                Ok(Node::new(NodeKind::CharacterType(CharType::Any), "."))
            }
            Some('^') => {
                self.advance();
                Ok(Node::new(NodeKind::Anchor(AnchorKind::BeginningOfLine), "^"))
            }
            Some('$') => {
                self.advance();
                Ok(Node::new(NodeKind::Anchor(AnchorKind::EndOfLine), "$"))
            }
            Some('*' | '+' | '?') => Err(ParseError::MissingRepeatTarget(start)),
            Some('{') if interval_len(self.rest()).is_some() => {
                Err(ParseError::MissingRepeatTarget(start))
            }
            Some(_) => {
                self.advance();
                Ok(Node::literal(self.source(start)))
            }
            None => Err(ParseError::MissingRepeatTarget(start)),
        }
    }

    /// Parse any parenthesized construct.
    ///
    /// Examples:
    /// - `(?:a)`      → Group(Passive)
    /// - `(?<n>a)`    → Group(Named "n")
    /// - `(?i)`       → Group(Options "i"), no children
    /// - `(?(1)a|b)`  → Conditional "1"
    /// - `(?#note)`   → Group(Comment)
    fn parse_group(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        self.advance(); // consume '('
        let outer_extended = self.extended;

        let kind = if self.expect('?') {
            match self.peek() {
                Some('#') => {
                    self.take_until(')')
                        .ok_or(ParseError::UnclosedGroup(start))?;
                    self.advance();
                    return Ok(Node::new(
                        NodeKind::Group(GroupKind::Comment),
                        self.source(start),
                    ));
                }
                Some('(') => return self.parse_conditional(start),
                Some(':') => self.group_kind(GroupKind::Passive),
                Some('>') => self.group_kind(GroupKind::Atomic),
                Some('~') => self.group_kind(GroupKind::Absence),
                Some('=') => self.assertion_kind(AssertionKind::Lookahead, "="),
                Some('!') => self.assertion_kind(AssertionKind::NegativeLookahead, "!"),
                Some('<') if self.starts_with("<=") => {
                    self.assertion_kind(AssertionKind::Lookbehind, "<=")
                }
                Some('<') if self.starts_with("<!") => {
                    self.assertion_kind(AssertionKind::NegativeLookbehind, "<!")
                }
                Some(open @ ('<' | '\'')) => {
                    self.advance();
                    let close = if open == '<' { '>' } else { '\'' };
                    let name_start = self.pos;
                    let name = self
                        .take_until(close)
                        .ok_or(self.invalid("group name", name_start))?;
                    if !is_group_name(name) {
                        return Err(self.invalid("group name", name_start));
                    }
                    self.advance();
                    NodeKind::Group(GroupKind::Named {
                        name: name.to_string(),
                        number: self.alloc_group_id(),
                    })
                }
                _ => {
                    let flags_start = self.pos;
                    let flags = self.take_while(|c| matches!(c, 'i' | 'm' | 'x' | '-'));
                    let (on, off) = flags.split_once('-').unwrap_or((flags, ""));
                    if off.contains('-') {
                        return Err(ParseError::UndefinedGroupOption(flags_start));
                    }
                    match self.peek() {
                        Some(')') => {
                            self.advance();
                            self.apply_extended(on, off);
                            return Ok(Node::new(
                                NodeKind::Group(GroupKind::Options {
                                    flags: flags.to_string(),
                                }),
                                self.source(start),
                            ));
                        }
                        Some(':') => {
                            self.advance();
                            self.apply_extended(on, off);
                            NodeKind::Group(GroupKind::Options {
                                flags: flags.to_string(),
                            })
                        }
                        _ => return Err(ParseError::UndefinedGroupOption(flags_start)),
                    }
                }
            }
        } else {
            NodeKind::Group(GroupKind::Capture {
                number: Some(self.alloc_group_id()),
            })
        };

        let children = self.parse_alt()?;
        self.extended = outer_extended;
        if !self.expect(')') {
            return Err(ParseError::UnclosedGroup(start));
        }
        Ok(Node::with_children(kind, self.source(start), children))
    }

    fn group_kind(&mut self, kind: GroupKind) -> NodeKind {
        self.advance();
        NodeKind::Group(kind)
    }

    fn assertion_kind(&mut self, kind: AssertionKind, prefix: &str) -> NodeKind {
        self.advance_by(prefix);
        NodeKind::Assertion(kind)
    }

    fn apply_extended(&mut self, on: &str, off: &str) {
        if on.contains('x') {
            self.extended = true;
        }
        if off.contains('x') {
            self.extended = false;
        }
    }

    /// Parse `(?(cond)yes|no)`; the opening `(?` is already consumed.
    fn parse_conditional(&mut self, start: usize) -> Result<Node, ParseError> {
        self.advance(); // consume '('
        let cond_start = self.pos;
        let condition = self
            .take_until(')')
            .ok_or(self.invalid("conditional pattern", cond_start))?;
        if condition.is_empty() {
            return Err(self.invalid("conditional pattern", cond_start));
        }
        self.advance();

        let outer_extended = self.extended;
        let mut branches = Vec::new();
        loop {
            let branch_start = self.pos;
            let items = self.parse_seq()?;
            branches.push(Node::with_children(
                NodeKind::Sequence,
                self.source(branch_start),
                items,
            ));
            if !self.expect('|') {
                break;
            }
            if branches.len() == 2 {
                return Err(self.invalid("conditional pattern", self.pos - 1));
            }
        }
        self.extended = outer_extended;
        if !self.expect(')') {
            return Err(ParseError::UnclosedGroup(start));
        }
        Ok(Node::with_children(
            NodeKind::Conditional {
                condition: condition.to_string(),
            },
            self.source(start),
            branches,
        ))
    }

    /// Parse a backslash escape. Inside a character set, `\b` is a backspace
    /// and anchors, backreferences and calls are not recognized.
    fn parse_escape(&mut self, in_set: bool) -> Result<Node, ParseError> {
        let start = self.pos;
        self.advance(); // consume '\'
        let ch = self
            .advance()
            .ok_or(ParseError::TrailingBackslash(start))?;

        let kind = match ch {
            'b' if in_set => NodeKind::Escape(EscapeKind::Backspace),
            'A' if !in_set => NodeKind::Anchor(AnchorKind::BeginningOfString),
            'z' if !in_set => NodeKind::Anchor(AnchorKind::EndOfString),
            'Z' if !in_set => NodeKind::Anchor(AnchorKind::EndOfStringOrBeforeEndOfLine),
            'b' => NodeKind::Anchor(AnchorKind::WordBoundary),
            'B' if !in_set => NodeKind::Anchor(AnchorKind::NonWordBoundary),
            'G' if !in_set => NodeKind::Anchor(AnchorKind::MatchStart),
            'K' if !in_set => NodeKind::Keep,
            'R' if !in_set => NodeKind::CharacterType(CharType::Linebreak),
            'X' if !in_set => NodeKind::CharacterType(CharType::ExtendedGrapheme),
            'd' => NodeKind::CharacterType(CharType::Digit),
            'D' => NodeKind::CharacterType(CharType::NonDigit),
            'h' => NodeKind::CharacterType(CharType::Hex),
            'H' => NodeKind::CharacterType(CharType::NonHex),
            'w' => NodeKind::CharacterType(CharType::Word),
            'W' => NodeKind::CharacterType(CharType::NonWord),
            's' => NodeKind::CharacterType(CharType::Space),
            'S' => NodeKind::CharacterType(CharType::NonSpace),
            'p' | 'P' => {
                if !self.expect('{') {
                    return Err(self.invalid("character property name", start));
                }
                let name = self
                    .take_until('}')
                    .ok_or(self.invalid("character property name", start))?;
                self.advance();
                let negated = (ch == 'P') != name.starts_with('^');
                NodeKind::UnicodeProperty { negated }
            }
            'k' if !in_set => NodeKind::Backreference(self.parse_reference(start, false)?),
            'g' if !in_set => NodeKind::Backreference(self.parse_reference(start, true)?),
            '1'..='9' if !in_set => {
                self.take_while(|c| c.is_ascii_digit());
                NodeKind::Backreference(BackrefKind::Number)
            }
            '0'..='7' => {
                let mut taken = 0;
                while taken < 2 && matches!(self.peek(), Some('0'..='7')) {
                    self.advance();
                    taken += 1;
                }
                NodeKind::Escape(EscapeKind::Octal)
            }
            'x' => self.parse_hex_escape(start)?,
            'u' => self.parse_codepoint_escape(start)?,
            'e' => NodeKind::Escape(EscapeKind::AsciiEscape),
            'a' => NodeKind::Escape(EscapeKind::Bell),
            'f' => NodeKind::Escape(EscapeKind::FormFeed),
            'n' => NodeKind::Escape(EscapeKind::Newline),
            'r' => NodeKind::Escape(EscapeKind::CarriageReturn),
            't' => NodeKind::Escape(EscapeKind::Tab),
            'v' => NodeKind::Escape(EscapeKind::VerticalTab),
            'c' => {
                self.advance()
                    .ok_or(self.invalid("control-code syntax", start))?;
                NodeKind::Escape(EscapeKind::Control)
            }
            'C' => {
                if !self.expect('-') || self.advance().is_none() {
                    return Err(self.invalid("control-code syntax", start));
                }
                NodeKind::Escape(EscapeKind::Control)
            }
            'M' => {
                if !self.expect('-') {
                    return Err(self.invalid("meta-code syntax", start));
                }
                if self.starts_with("\\C-") {
                    self.advance_by("\\C-");
                    self.advance()
                        .ok_or(self.invalid("meta-code syntax", start))?;
                    NodeKind::Escape(EscapeKind::MetaControl)
                } else if self.starts_with("\\c") {
                    self.advance_by("\\c");
                    self.advance()
                        .ok_or(self.invalid("meta-code syntax", start))?;
                    NodeKind::Escape(EscapeKind::MetaControl)
                } else {
                    self.advance()
                        .ok_or(self.invalid("meta-code syntax", start))?;
                    NodeKind::Escape(EscapeKind::Meta)
                }
            }
            _ => NodeKind::Escape(EscapeKind::Literal),
        };
        Ok(Node::new(kind, self.source(start)))
    }

    /// Parse the `<...>` or `'...'` part of `\k` and `\g`.
    ///
    /// Examples:
    /// - `\k<1>`      → NumberRef
    /// - `\k<-1>`     → NumberRelative
    /// - `\k<name+0>` → NameRecursionLevel
    /// - `\g<-1>`     → NumberCall
    fn parse_reference(&mut self, start: usize, call: bool) -> Result<BackrefKind, ParseError> {
        let construct = if call {
            "subexp call"
        } else {
            "backref"
        };
        let close = match self.advance() {
            Some('<') => '>',
            Some('\'') => '\'',
            _ => return Err(self.invalid(construct, start)),
        };
        let body = self
            .take_until(close)
            .ok_or(self.invalid(construct, start))?;
        self.advance();

        let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        let signed = |s: &str| {
            s.strip_prefix('-')
                .or_else(|| s.strip_prefix('+'))
                .is_some_and(numeric)
        };

        if call {
            return if numeric(body) || signed(body) {
                Ok(BackrefKind::NumberCall)
            } else if is_group_name(body) {
                Ok(BackrefKind::NameCall)
            } else {
                Err(self.invalid(construct, start))
            };
        }

        if numeric(body) {
            return Ok(BackrefKind::NumberRef);
        }
        if body.strip_prefix('-').is_some_and(numeric) {
            return Ok(BackrefKind::NumberRelative);
        }
        if let Some(split) = body.rfind(['+', '-']).filter(|&i| i > 0) {
            let (target, level) = body.split_at(split);
            if signed(level) {
                if numeric(target) {
                    return Ok(BackrefKind::NumberRecursionLevel);
                }
                if is_group_name(target) {
                    return Ok(BackrefKind::NameRecursionLevel);
                }
            }
        }
        if is_group_name(body) {
            Ok(BackrefKind::Name)
        } else {
            Err(self.invalid(construct, start))
        }
    }

    /// `\xHH`; a run of high-byte `\xHH` escapes is one UTF-8 sequence.
    fn parse_hex_escape(&mut self, start: usize) -> Result<NodeKind, ParseError> {
        let digits = self.take_hex(2);
        let value =
            u8::from_str_radix(digits, 16).map_err(|_| self.invalid("hex escape", start))?;
        if value < 0x80 {
            return Ok(NodeKind::Escape(EscapeKind::Hex));
        }
        while self.starts_with("\\x") && self.peek_nth(2).is_some_and(|c| c.is_ascii_hexdigit()) {
            let save = self.pos;
            self.advance_by("\\x");
            let next = self.take_hex(2);
            if u8::from_str_radix(next, 16).map_or(true, |b| b < 0x80) {
                self.pos = save;
                break;
            }
        }
        Ok(NodeKind::Escape(EscapeKind::Utf8Hex))
    }

    /// `\uHHHH`, `\u{H}` or `\u{H H ...}`.
    fn parse_codepoint_escape(&mut self, start: usize) -> Result<NodeKind, ParseError> {
        if self.expect('{') {
            let body = self
                .take_until('}')
                .ok_or(self.invalid("Unicode escape", start))?;
            self.advance();
            let codepoints: Vec<&str> = body.split_whitespace().collect();
            if codepoints.is_empty()
                || !codepoints
                    .iter()
                    .all(|cp| cp.len() <= 6 && cp.chars().all(|c| c.is_ascii_hexdigit()))
            {
                return Err(self.invalid("Unicode escape", start));
            }
            return Ok(if codepoints.len() > 1 {
                NodeKind::Escape(EscapeKind::CodepointList)
            } else {
                NodeKind::Escape(EscapeKind::Codepoint)
            });
        }
        if self.take_hex(4).len() != 4 {
            return Err(self.invalid("Unicode escape", start));
        }
        Ok(NodeKind::Escape(EscapeKind::Codepoint))
    }

    fn take_hex(&mut self, max: usize) -> &'a str {
        let start = self.pos;
        let mut taken = 0;
        while taken < max && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            self.advance();
            taken += 1;
        }
        self.source(start)
    }

    /// Parse a character set, e.g. `[abc]`, `[^a-z]` or `[a-z&&[^aeiou]]`.
    ///
    /// Examples:
    /// - Pattern: `[a-d]`         → CharacterSet([SetRange([a, d])])
    /// - Pattern: `[^[:alpha:]]`  → CharacterSet(negated, [PosixClass])
    /// - Pattern: `[a-z&&[^x]]`   → CharacterSet([SetIntersection([Sequence, Sequence])])
    fn parse_set(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        self.advance(); // consume '['
        let negated = self.expect('^');
        let members_start = self.pos;

        let mut operands: Vec<Node> = Vec::new();
        let mut operand_start = self.pos;
        let mut members: Vec<Node> = Vec::new();
        let mut first = true;
        loop {
            match self.peek() {
                None => return Err(ParseError::UnclosedSet(start)),
                Some(']') if !first => break,
                Some('&') if self.starts_with("&&") => {
                    operands.push(Node::with_children(
                        NodeKind::Sequence,
                        self.source(operand_start),
                        std::mem::take(&mut members),
                    ));
                    self.advance_by("&&");
                    operand_start = self.pos;
                }
                Some(_) => {
                    let member = self.parse_set_member()?;
                    members.push(self.parse_set_range(member)?);
                }
            }
            first = false;
        }

        let members = if operands.is_empty() {
            members
        } else {
            operands.push(Node::with_children(
                NodeKind::Sequence,
                self.source(operand_start),
                members,
            ));
            vec![Node::with_children(
                NodeKind::SetIntersection,
                self.source(members_start),
                operands,
            )]
        };
        self.advance(); // consume ']'
        Ok(Node::with_children(
            NodeKind::CharacterSet { negated },
            self.source(start),
            members,
        ))
    }

    fn parse_set_member(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        match self.peek() {
            Some('[') if self.starts_with("[:") => match self.parse_posix_class()? {
                Some(node) => Ok(node),
                None => self.parse_set(),
            },
            Some('[') => self.parse_set(),
            Some('\\') => self.parse_escape(true),
            Some(_) => {
                self.advance();
                Ok(Node::literal(self.source(start)))
            }
            None => Err(ParseError::UnclosedSet(start)),
        }
    }

    /// `[:alpha:]` or `[:^alpha:]`; `None` when the text is not a POSIX
    /// bracket, in which case it is parsed as a nested set.
    fn parse_posix_class(&mut self) -> Result<Option<Node>, ParseError> {
        let start = self.pos;
        let Some(end) = self.rest().find(":]").filter(|&end| end >= 2) else {
            return Ok(None);
        };
        let name = &self.rest()[2..end];
        let bare = name.strip_prefix('^').unwrap_or(name);
        if bare.is_empty() || !bare.chars().all(|c| c.is_ascii_alphabetic()) {
            return Ok(None);
        }
        self.pos += end + 2;
        Ok(Some(Node::new(
            NodeKind::PosixClass {
                negated: name.starts_with('^'),
            },
            self.source(start),
        )))
    }

    /// If `start` is followed by `-x`, build a range; otherwise return it as is.
    fn parse_set_range(&mut self, start: Node) -> Result<Node, ParseError> {
        let endpoint = |node: &Node| matches!(node.kind, NodeKind::Literal | NodeKind::Escape(_));
        if !endpoint(&start)
            || self.peek() != Some('-')
            || matches!(self.peek_nth(1), None | Some(']' | '['))
            || self.rest()[1..].starts_with("&&")
        {
            return Ok(start);
        }
        let save = self.pos;
        self.advance(); // consume '-'
        let end = self.parse_set_member()?;
        if !endpoint(&end) {
            self.pos = save;
            return Ok(start);
        }
        let text = format!("{}-{}", start.text, end.text);
        Ok(Node::with_children(NodeKind::SetRange, text, vec![start, end]))
    }
}

/// Length of an interval quantifier (`{n}`, `{n,}`, `{n,m}`, `{,m}`) at the
/// start of `text`, if there is one. Anything else starting with `{` is a literal.
fn interval_len(text: &str) -> Option<usize> {
    let close = text.find('}')?;
    let inner = &text[1..close];
    let (min, max) = inner.split_once(',').unwrap_or((inner, inner));
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !digits(min) || !digits(max) || (min.is_empty() && max.is_empty()) {
        return None;
    }
    Some(close + 1)
}

fn is_group_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}
