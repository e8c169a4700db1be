//! Compiler: converts a regex AST into railroad diagram primitives.
//!
//! The transform is total. Every node kind has a rendering, and anything the
//! compiler has no dedicated shape for degrades to a quoted terminal, so a
//! diagram can be drawn for any tree the parser produces.

use crate::ast::{
    AnchorKind, AssertionKind, BackrefKind, CharType, EscapeKind, GroupKind, Node, NodeKind,
};
use crate::diagram::{ChoiceMode, DiagramNode};
use crate::merge::merge;
use crate::quantifier;

/// Compile an AST node into a diagram.
pub fn compile(node: &Node) -> DiagramNode {
    let quantifier = node.quantifier.as_deref();
    let wrap = |diagram| quantifier::apply(quantifier, diagram);

    match &node.kind {
        NodeKind::Root | NodeKind::Sequence => compile_sequence(&node.children),
        NodeKind::Alternation => {
            DiagramNode::choice(0, node.children.iter().map(compile).collect())
        }
        NodeKind::Group(GroupKind::Comment) => DiagramNode::comment(comment_text(node)),
        NodeKind::Group(kind) => wrap(compile_group(node, kind)),
        NodeKind::Assertion(kind) => wrap(DiagramNode::group(
            compile_sequence(&node.children),
            assertion_label(*kind),
        )),
        NodeKind::Conditional { condition } => wrap(compile_conditional(node, condition)),
        NodeKind::CharacterSet { negated } => wrap(compile_set(node, *negated)),
        NodeKind::SetRange | NodeKind::SetIntersection => wrap(compile_set_member(node)),
        NodeKind::Anchor(kind) => wrap(DiagramNode::non_terminal(anchor_label(*kind))),
        NodeKind::Backreference(kind) => wrap(DiagramNode::non_terminal(format!(
            "{} {}",
            backref_label(*kind),
            node.text
        ))),
        NodeKind::CharacterType(kind) => wrap(DiagramNode::non_terminal(char_type_label(*kind))),
        NodeKind::Escape(EscapeKind::Literal) | NodeKind::Literal => {
            wrap(DiagramNode::terminal(quote(node.literal_text())))
        }
        NodeKind::Escape(kind) => wrap(DiagramNode::non_terminal(escape_label(*kind, &node.text))),
        NodeKind::Keep | NodeKind::PosixClass { .. } | NodeKind::UnicodeProperty { .. } => {
            wrap(DiagramNode::non_terminal(node.text.as_str()))
        }
        NodeKind::WhiteSpace => DiagramNode::Skip,
        NodeKind::Comment => DiagramNode::comment(node.comment_body().trim()),
        NodeKind::Unknown => wrap(DiagramNode::terminal(quote(&node.text))),
    }
}

/// Merge literal runs, then compile each sibling in order.
fn compile_sequence(children: &[Node]) -> DiagramNode {
    let merged = merge(children);
    if merged.is_empty() {
        return DiagramNode::Skip;
    }
    DiagramNode::Sequence {
        children: merged.iter().map(compile).collect(),
    }
}

fn compile_group(node: &Node, kind: &GroupKind) -> DiagramNode {
    let body = || compile_sequence(&node.children);
    match kind {
        GroupKind::Capture { number: Some(number) } => {
            DiagramNode::group(body(), format!("group #{number}"))
        }
        GroupKind::Capture { number: None } => DiagramNode::group(body(), "capture group"),
        GroupKind::Named { name, .. } => DiagramNode::group(body(), format!("group: {name}")),
        GroupKind::Passive => DiagramNode::group(body(), "non-capturing group"),
        GroupKind::Atomic => DiagramNode::group(body(), "atomic group"),
        GroupKind::Absence => DiagramNode::group(body(), "absence group"),
        GroupKind::Options { flags } if node.children.is_empty() => {
            DiagramNode::group(DiagramNode::comment(flag_summary(flags)), "options")
        }
        GroupKind::Options { flags } => {
            DiagramNode::group(body(), format!("options {}", flag_summary(flags)))
        }
        GroupKind::Comment => DiagramNode::comment(comment_text(node)),
    }
}

fn comment_text(node: &Node) -> String {
    let body = node.comment_body().trim();
    if body.is_empty() {
        "(empty comment)".to_string()
    } else {
        body.to_string()
    }
}

/// `im-x` → `on: i, m; off: x`
fn flag_summary(flags: &str) -> String {
    let (on, off) = flags.split_once('-').unwrap_or((flags, ""));
    let list = |chars: &str| chars.chars().map(String::from).collect::<Vec<_>>().join(", ");
    let mut segments = Vec::new();
    if !on.is_empty() {
        segments.push(format!("on: {}", list(on)));
    }
    if !off.is_empty() {
        segments.push(format!("off: {}", list(off)));
    }
    segments.join("; ")
}

fn compile_conditional(node: &Node, condition: &str) -> DiagramNode {
    let branch = |i: usize| node.children.get(i).map(|b| compile_sequence(&b.children));
    let mut branches = vec![match branch(0) {
        Some(yes) if !yes.is_skip() => DiagramNode::group(yes, "True"),
        _ => DiagramNode::Skip,
    }];
    if let Some(no) = branch(1) {
        branches.push(DiagramNode::group(no, "False"));
    }
    DiagramNode::group(
        DiagramNode::choice(0, branches),
        format!("Condition: {}", condition_label(condition)),
    )
}

fn condition_label(condition: &str) -> String {
    let name = condition
        .strip_prefix('<')
        .and_then(|c| c.strip_suffix('>'))
        .or_else(|| {
            condition
                .strip_prefix('\'')
                .and_then(|c| c.strip_suffix('\''))
        });
    match name {
        Some(name) => name.to_string(),
        None if !condition.is_empty() && condition.bytes().all(|b| b.is_ascii_digit()) => {
            format!("group #{condition}")
        }
        None => condition.to_string(),
    }
}

fn compile_set(node: &Node, negated: bool) -> DiagramNode {
    let label = if negated {
        "negated character set"
    } else {
        "character set"
    };
    DiagramNode::multiple_choice(
        ChoiceMode::Any,
        node.children.iter().map(compile_set_member).collect(),
        label,
    )
}

/// Set members are alternatives, so they are never merged.
fn compile_set_member(member: &Node) -> DiagramNode {
    match &member.kind {
        NodeKind::SetRange => {
            let endpoint = |i: usize| member.children.get(i).map_or("", |n| n.text.as_str());
            DiagramNode::terminal(format!("\"{}\" - \"{}\"", endpoint(0), endpoint(1)))
        }
        NodeKind::SetIntersection => DiagramNode::multiple_choice(
            ChoiceMode::All,
            member.children.iter().map(compile_operand).collect(),
            "intersection",
        ),
        NodeKind::CharacterSet { negated } => compile_set(member, *negated),
        _ => compile(member),
    }
}

fn compile_operand(operand: &Node) -> DiagramNode {
    let members = &operand.children;
    let literal_only = members
        .iter()
        .all(|m| matches!(m.kind, NodeKind::Literal | NodeKind::Escape(EscapeKind::Literal)));
    let compiled = members.iter().map(compile_set_member).collect();
    if members.len() >= 2 && literal_only {
        DiagramNode::multiple_choice(ChoiceMode::Any, compiled, "any of")
    } else {
        DiagramNode::Sequence { children: compiled }
    }
}

fn quote(text: &str) -> String {
    format!("\"{text}\"")
}

fn assertion_label(kind: AssertionKind) -> &'static str {
    match kind {
        AssertionKind::Lookahead => "positive lookahead",
        AssertionKind::NegativeLookahead => "negative lookahead",
        AssertionKind::Lookbehind => "positive lookbehind",
        AssertionKind::NegativeLookbehind => "negative lookbehind",
    }
}

fn anchor_label(kind: AnchorKind) -> &'static str {
    match kind {
        AnchorKind::BeginningOfLine => "beginning of line",
        AnchorKind::EndOfLine => "end of line",
        AnchorKind::BeginningOfString => "beginning of string",
        AnchorKind::EndOfString => "end of string",
        AnchorKind::EndOfStringOrBeforeEndOfLine => "end of string or before end of line",
        AnchorKind::WordBoundary => "word boundary",
        AnchorKind::NonWordBoundary => "non-word boundary",
        AnchorKind::MatchStart => "start of match",
    }
}

fn backref_label(kind: BackrefKind) -> &'static str {
    match kind {
        BackrefKind::Number | BackrefKind::NumberRef => "back-reference",
        BackrefKind::NumberRelative => "relative back-reference",
        BackrefKind::Name => "named back-reference",
        BackrefKind::NumberRecursionLevel => "back-reference at recursion level",
        BackrefKind::NameRecursionLevel => "named back-reference at recursion level",
        BackrefKind::NumberCall => "subexpression call",
        BackrefKind::NameCall => "named subexpression call",
    }
}

fn char_type_label(kind: CharType) -> &'static str {
    match kind {
        CharType::Any => "any character",
        CharType::Digit => "digit",
        CharType::NonDigit => "non-digit",
        CharType::Hex => "hex digit",
        CharType::NonHex => "non-hex digit",
        CharType::Word => "word character",
        CharType::NonWord => "non-word character",
        CharType::Space => "whitespace",
        CharType::NonSpace => "non-whitespace",
        CharType::Linebreak => "line break",
        CharType::ExtendedGrapheme => "extended grapheme",
    }
}

/// Control characters get a fixed name; value-carrying escapes keep their token.
fn escape_label(kind: EscapeKind, text: &str) -> String {
    let fixed = match kind {
        EscapeKind::AsciiEscape => "escape",
        EscapeKind::Backspace => "backspace",
        EscapeKind::Bell => "bell",
        EscapeKind::FormFeed => "form feed",
        EscapeKind::Newline => "new line",
        EscapeKind::CarriageReturn => "carriage return",
        EscapeKind::Tab => "tab",
        EscapeKind::VerticalTab => "vertical tab",
        EscapeKind::Literal => return quote(text.strip_prefix('\\').unwrap_or(text)),
        EscapeKind::Octal => return format!("octal {text}"),
        EscapeKind::Hex => return format!("hex {text}"),
        EscapeKind::Codepoint => return format!("codepoint {text}"),
        EscapeKind::CodepointList => return format!("codepoint list {text}"),
        EscapeKind::Utf8Hex => return format!("UTF-8 hex {text}"),
        EscapeKind::Control => return format!("control {text}"),
        EscapeKind::Meta => return format!("meta {text}"),
        EscapeKind::MetaControl => return format!("meta control {text}"),
    };
    fixed.to_string()
}
