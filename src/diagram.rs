//! Railroad diagram primitives.
//!
//! This is the vocabulary a renderer lays out. The tree is finite, owns all
//! of its text and keeps no link back to the AST it was compiled from.
//!
//! Besides JSON (via serde), a tree can be dumped one node per line:
//!
//! ```text
//! └─ Sequence
//!   ├─ Terminal: "ab"
//!   └─ OneOrMore (lazy)
//!     └─ NonTerminal: digit
//! ```

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagramNode {
    Terminal {
        text: String,
    },
    NonTerminal {
        text: String,
    },
    Sequence {
        children: Vec<DiagramNode>,
    },
    Choice {
        default: usize,
        children: Vec<DiagramNode>,
    },
    Optional {
        child: Box<DiagramNode>,
    },
    ZeroOrMore {
        child: Box<DiagramNode>,
        comment: Option<String>,
    },
    OneOrMore {
        child: Box<DiagramNode>,
        comment: Option<String>,
    },
    Group {
        child: Box<DiagramNode>,
        label: String,
    },
    MultipleChoice {
        default: usize,
        mode: ChoiceMode,
        children: Vec<DiagramNode>,
        comment: String,
    },
    Comment {
        text: String,
    },
    Skip,
}

/// Whether a `MultipleChoice` takes any one branch or requires all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChoiceMode {
    Any,
    All,
}

impl DiagramNode {
    pub fn terminal(text: impl Into<String>) -> Self {
        DiagramNode::Terminal { text: text.into() }
    }

    pub fn non_terminal(text: impl Into<String>) -> Self {
        DiagramNode::NonTerminal { text: text.into() }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        DiagramNode::Comment { text: text.into() }
    }

    pub fn group(child: DiagramNode, label: impl Into<String>) -> Self {
        DiagramNode::Group {
            child: Box::new(child),
            label: label.into(),
        }
    }

    pub fn optional(child: DiagramNode) -> Self {
        DiagramNode::Optional {
            child: Box::new(child),
        }
    }

    pub fn zero_or_more(child: DiagramNode, comment: Option<String>) -> Self {
        DiagramNode::ZeroOrMore {
            child: Box::new(child),
            comment,
        }
    }

    pub fn one_or_more(child: DiagramNode, comment: Option<String>) -> Self {
        DiagramNode::OneOrMore {
            child: Box::new(child),
            comment,
        }
    }

    pub fn choice(default: usize, children: Vec<DiagramNode>) -> Self {
        DiagramNode::Choice { default, children }
    }

    pub fn multiple_choice(
        mode: ChoiceMode,
        children: Vec<DiagramNode>,
        comment: impl Into<String>,
    ) -> Self {
        DiagramNode::MultipleChoice {
            default: 0,
            mode,
            children,
            comment: comment.into(),
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, DiagramNode::Skip)
    }

    fn node_type(&self) -> &'static str {
        match self {
            DiagramNode::Terminal { .. } => "Terminal",
            DiagramNode::NonTerminal { .. } => "NonTerminal",
            DiagramNode::Sequence { .. } => "Sequence",
            DiagramNode::Choice { .. } => "Choice",
            DiagramNode::Optional { .. } => "Optional",
            DiagramNode::ZeroOrMore { .. } => "ZeroOrMore",
            DiagramNode::OneOrMore { .. } => "OneOrMore",
            DiagramNode::Group { .. } => "Group",
            DiagramNode::MultipleChoice { .. } => "MultipleChoice",
            DiagramNode::Comment { .. } => "Comment",
            DiagramNode::Skip => "Skip",
        }
    }

    fn display_label(&self) -> Option<String> {
        match self {
            DiagramNode::Terminal { text }
            | DiagramNode::NonTerminal { text }
            | DiagramNode::Comment { text } => Some(format!(": {text}")),
            DiagramNode::Group { label, .. } => Some(format!(": {label}")),
            DiagramNode::ZeroOrMore { comment, .. } | DiagramNode::OneOrMore { comment, .. } => {
                comment.as_ref().map(|c| format!(" ({c})"))
            }
            DiagramNode::MultipleChoice { mode, comment, .. } => {
                let mode = match mode {
                    ChoiceMode::Any => "any",
                    ChoiceMode::All => "all",
                };
                Some(format!(" [{mode}]: {comment}"))
            }
            _ => None,
        }
    }

    fn children(&self) -> Vec<&DiagramNode> {
        match self {
            DiagramNode::Sequence { children }
            | DiagramNode::Choice { children, .. }
            | DiagramNode::MultipleChoice { children, .. } => children.iter().collect(),
            DiagramNode::Optional { child }
            | DiagramNode::ZeroOrMore { child, .. }
            | DiagramNode::OneOrMore { child, .. }
            | DiagramNode::Group { child, .. } => vec![child.as_ref()],
            _ => Vec::new(),
        }
    }

    /// One line per node, nesting shown with box-drawing connectors.
    pub fn to_tree_string(&self) -> String {
        let mut result = String::new();
        append_node(&mut result, self, "", true);
        result
    }
}

fn append_node(result: &mut String, node: &DiagramNode, prefix: &str, is_last: bool) {
    let connector = if is_last { "└─" } else { "├─" };
    result.push_str(prefix);
    result.push_str(connector);
    result.push(' ');
    result.push_str(node.node_type());
    if let Some(label) = node.display_label() {
        result.push_str(&label);
    }
    result.push('\n');

    let new_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    let children = node.children();
    for (i, child) in children.iter().enumerate() {
        append_node(result, child, &new_prefix, i == children.len() - 1);
    }
}
