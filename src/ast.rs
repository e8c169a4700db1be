//! AST types for Ruby (Onigmo) flavored regular expressions.
//!
//! Every node carries its own source text and, when the parser attached one,
//! the raw text of its quantifier. Quantifiers are kept unparsed here; the
//! diagram compiler resolves them.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    /// Source text of the node, without its quantifier.
    pub text: String,
    /// Raw quantifier text as written, e.g. `{2,3}` or `*?`.
    pub quantifier: Option<String>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Whole pattern.
    Root,
    /// One alternative of an alternation, a conditional branch, or a set operand.
    Sequence,
    /// `a|b|c`; children are `Sequence` nodes.
    Alternation,
    Literal,
    Group(GroupKind),
    Assertion(AssertionKind),
    Anchor(AnchorKind),
    Backreference(BackrefKind),
    CharacterType(CharType),
    CharacterSet {
        negated: bool,
    },
    /// `a-z` inside a character set; children are the two endpoints.
    SetRange,
    /// `a-z&&[^aeiou]`; children are `Sequence` operands.
    SetIntersection,
    Escape(EscapeKind),
    PosixClass {
        negated: bool,
    },
    UnicodeProperty {
        negated: bool,
    },
    /// `(?(cond)yes|no)`; children are one or two `Sequence` branches.
    Conditional {
        condition: String,
    },
    /// `# ...` in extended mode.
    Comment,
    /// Insignificant whitespace in extended mode.
    WhiteSpace,
    /// `\K`
    Keep,
    /// A construct produced by some other AST source that this crate does not model.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKind {
    Capture { number: Option<usize> },
    Named { name: String, number: usize },
    Passive,
    Atomic,
    Absence,
    Comment,
    Options { flags: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionKind {
    Lookahead,
    NegativeLookahead,
    Lookbehind,
    NegativeLookbehind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    BeginningOfLine,
    EndOfLine,
    BeginningOfString,
    EndOfString,
    EndOfStringOrBeforeEndOfLine,
    WordBoundary,
    NonWordBoundary,
    MatchStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackrefKind {
    /// `\1`
    Number,
    /// `\k<1>`
    NumberRef,
    /// `\k<-1>`
    NumberRelative,
    /// `\k<name>`
    Name,
    /// `\k<1+0>`
    NumberRecursionLevel,
    /// `\k<name+0>`
    NameRecursionLevel,
    /// `\g<1>`, `\g<-1>`, `\g<0>`
    NumberCall,
    /// `\g<name>`
    NameCall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharType {
    Any,
    Digit,
    NonDigit,
    Hex,
    NonHex,
    Word,
    NonWord,
    Space,
    NonSpace,
    Linebreak,
    ExtendedGrapheme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeKind {
    /// An escaped metacharacter such as `\.`; stands for itself.
    Literal,
    /// `\e`
    AsciiEscape,
    /// `\b` inside a character set.
    Backspace,
    Bell,
    FormFeed,
    Newline,
    CarriageReturn,
    Tab,
    VerticalTab,
    Octal,
    Hex,
    Codepoint,
    CodepointList,
    Utf8Hex,
    Control,
    Meta,
    MetaControl,
}

impl Node {
    pub fn new(kind: NodeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            quantifier: None,
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: NodeKind, text: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            children,
            ..Self::new(kind, text)
        }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Literal, text)
    }

    pub fn quantified(mut self, quantifier: impl Into<String>) -> Self {
        self.quantifier = Some(quantifier.into());
        self
    }

    /// Whether the literal merger may fold this node into a text run.
    pub fn is_mergeable_literal(&self) -> bool {
        self.quantifier.is_none()
            && matches!(
                self.kind,
                NodeKind::Literal | NodeKind::Escape(EscapeKind::Literal)
            )
    }

    /// Literal text of a literal or literal-escape node, backslash stripped.
    pub fn literal_text(&self) -> &str {
        match self.kind {
            NodeKind::Escape(EscapeKind::Literal) => {
                self.text.strip_prefix('\\').unwrap_or(&self.text)
            }
            _ => &self.text,
        }
    }

    /// Body of a `(?#...)` comment group or an extended-mode `# ...` comment.
    pub fn comment_body(&self) -> &str {
        match self.kind {
            NodeKind::Group(GroupKind::Comment) => self
                .text
                .strip_prefix("(?#")
                .map(|rest| rest.strip_suffix(')').unwrap_or(rest))
                .unwrap_or(&self.text),
            _ => self.text.strip_prefix('#').unwrap_or(&self.text),
        }
    }
}
