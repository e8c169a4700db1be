//! End-to-end diagram tests: pattern text through the parser and compiler.

use regex_workbench::config::Flags;
use regex_workbench::diagram::{ChoiceMode, DiagramNode};
use regex_workbench::error::PatternError;
use regex_workbench::{diagram, Workbench};
use rstest::rstest;

fn seq(children: Vec<DiagramNode>) -> DiagramNode {
    DiagramNode::Sequence { children }
}

fn term(text: &str) -> DiagramNode {
    DiagramNode::terminal(format!("\"{text}\""))
}

fn nt(text: &str) -> DiagramNode {
    DiagramNode::non_terminal(text)
}

fn compile(pattern: &str) -> DiagramNode {
    diagram(pattern, Flags::default()).unwrap()
}

fn only_child(pattern: &str) -> DiagramNode {
    match compile(pattern) {
        DiagramNode::Sequence { mut children } if children.len() == 1 => children.remove(0),
        other => panic!("expected a one-element sequence, got {other:?}"),
    }
}

#[test]
fn simple_character_set_has_one_range() {
    assert_eq!(
        only_child("[a-d]"),
        DiagramNode::multiple_choice(
            ChoiceMode::Any,
            vec![DiagramNode::terminal("\"a\" - \"d\"")],
            "character set"
        )
    );
}

#[test]
fn negated_set_label() {
    let DiagramNode::MultipleChoice { comment, .. } = only_child("[^x]") else {
        panic!("not a multiple choice");
    };
    assert_eq!(comment, "negated character set");
}

#[test]
fn exact_count_forms_are_identical() {
    let expected = DiagramNode::one_or_more(term("a"), Some("2 time(s)".into()));
    assert_eq!(only_child("a{2,2}"), expected);
    assert_eq!(only_child("a{2}"), expected);
}

#[test]
fn zero_lower_bound_range_is_zero_or_more() {
    assert_eq!(
        only_child("a{0,4}"),
        DiagramNode::zero_or_more(term("a"), Some("0-4 time(s)".into()))
    );
}

#[rstest]
#[case("a{0}")]
#[case("a{0,0}")]
#[case("a{0}+")]
#[case("a{,0}")]
fn zero_width_quantifiers_skip(#[case] pattern: &str) {
    assert_eq!(only_child(pattern), DiagramNode::Skip);
}

#[test]
fn literal_runs_merge_across_escapes() {
    assert_eq!(
        compile(r"foo\.bar+"),
        seq(vec![
            term("foo.ba"),
            DiagramNode::one_or_more(term("r"), None),
        ])
    );
}

#[test]
fn named_capture_with_quantified_digit() {
    assert_eq!(
        compile(r"(?<year>\d{4})-\d"),
        seq(vec![
            DiagramNode::group(
                seq(vec![DiagramNode::one_or_more(
                    nt("digit"),
                    Some("4 time(s)".into())
                )]),
                "group: year"
            ),
            term("-"),
            nt("digit"),
        ])
    );
}

#[test]
fn alternation_is_choice_defaulting_to_first() {
    assert_eq!(
        only_child("ab|c"),
        DiagramNode::choice(0, vec![seq(vec![term("ab")]), seq(vec![term("c")])])
    );
}

#[rstest]
#[case("(?=a)", "positive lookahead")]
#[case("(?!a)", "negative lookahead")]
#[case("(?<=a)", "positive lookbehind")]
#[case("(?<!a)", "negative lookbehind")]
#[case("(?>a)", "atomic group")]
#[case("(?~a)", "absence group")]
#[case("(?:a)", "non-capturing group")]
#[case("(a)", "group #1")]
#[case("(?'q'a)", "group: q")]
#[case("(?m:a)", "options on: m")]
fn group_labels(#[case] pattern: &str, #[case] label: &str) {
    assert_eq!(
        only_child(pattern),
        DiagramNode::group(seq(vec![term("a")]), label)
    );
}

#[test]
fn quantified_group_is_wrapped() {
    assert_eq!(
        only_child("(?:ab)*?"),
        DiagramNode::zero_or_more(
            DiagramNode::group(seq(vec![term("ab")]), "non-capturing group"),
            Some("lazy".into())
        )
    );
}

#[test]
fn options_without_children() {
    assert_eq!(
        compile("(?i-mx)a"),
        seq(vec![
            DiagramNode::group(DiagramNode::comment("on: i; off: m, x"), "options"),
            term("a"),
        ])
    );
}

#[rstest]
#[case("^", "beginning of line")]
#[case("$", "end of line")]
#[case(r"\A", "beginning of string")]
#[case(r"\z", "end of string")]
#[case(r"\Z", "end of string or before end of line")]
#[case(r"\b", "word boundary")]
#[case(r"\B", "non-word boundary")]
#[case(r"\G", "start of match")]
#[case(".", "any character")]
#[case(r"\h", "hex digit")]
#[case(r"\S", "non-whitespace")]
#[case(r"\R", "line break")]
#[case(r"\X", "extended grapheme")]
#[case(r"\t", "tab")]
#[case(r"\e", "escape")]
#[case(r"\x41", r"hex \x41")]
#[case(r"\u{1F600}", r"codepoint \u{1F600}")]
#[case(r"\M-a", r"meta \M-a")]
#[case(r"\K", r"\K")]
#[case(r"\p{Greek}", r"\p{Greek}")]
#[case(r"\1", r"back-reference \1")]
#[case(r"\k<-1>", r"relative back-reference \k<-1>")]
#[case(r"\k<n>", r"named back-reference \k<n>")]
#[case(r"\g<n>", r"named subexpression call \g<n>")]
#[case(r"\g<-1>", r"subexpression call \g<-1>")]
fn non_terminal_labels(#[case] pattern: &str, #[case] label: &str) {
    assert_eq!(only_child(pattern), nt(label));
}

#[test]
fn anchors_keep_quantifiers() {
    assert_eq!(
        only_child("^+"),
        DiagramNode::one_or_more(nt("beginning of line"), None)
    );
}

#[test]
fn comment_group_ignores_quantifier_context() {
    assert_eq!(
        compile("a(?# note )b"),
        seq(vec![term("a"), DiagramNode::comment("note"), term("b")])
    );
}

#[test]
fn extended_mode_whitespace_and_comments() {
    let flags: Flags = "x".parse().unwrap();
    assert_eq!(
        diagram("a b # trailing", flags).unwrap(),
        seq(vec![
            term("a"),
            DiagramNode::Skip,
            term("b"),
            DiagramNode::Skip,
            DiagramNode::comment("trailing"),
        ])
    );
}

#[test]
fn conditional_with_both_branches() {
    assert_eq!(
        only_child("(?(<q>)a|b)"),
        DiagramNode::group(
            DiagramNode::choice(
                0,
                vec![
                    DiagramNode::group(seq(vec![term("a")]), "True"),
                    DiagramNode::group(seq(vec![term("b")]), "False"),
                ]
            ),
            "Condition: q"
        )
    );
}

#[test]
fn intersection_operands() {
    let vowels = ["a", "e", "i", "o", "u"].map(term).to_vec();
    assert_eq!(
        only_child("[a-z&&[^aeiou]]"),
        DiagramNode::multiple_choice(
            ChoiceMode::Any,
            vec![DiagramNode::multiple_choice(
                ChoiceMode::All,
                vec![
                    seq(vec![DiagramNode::terminal("\"a\" - \"z\"")]),
                    seq(vec![DiagramNode::multiple_choice(
                        ChoiceMode::Any,
                        vowels,
                        "negated character set"
                    )]),
                ],
                "intersection"
            )],
            "character set"
        )
    );
}

#[test]
fn literal_only_operands_are_choices() {
    let DiagramNode::MultipleChoice { children, .. } = only_child("[ab&&bc]") else {
        panic!("not a multiple choice");
    };
    let DiagramNode::MultipleChoice { children: operands, mode, .. } = &children[0] else {
        panic!("intersection missing");
    };
    assert_eq!(*mode, ChoiceMode::All);
    assert_eq!(
        operands[0],
        DiagramNode::multiple_choice(ChoiceMode::Any, vec![term("a"), term("b")], "any of")
    );
}

#[test]
fn posix_class_in_set() {
    assert_eq!(
        only_child("[[:alpha:]_]"),
        DiagramNode::multiple_choice(
            ChoiceMode::Any,
            vec![nt("[:alpha:]"), term("_")],
            "character set"
        )
    );
}

#[test]
fn unsupported_bounded_range_modifiers() {
    for pattern in ["a{1,3}?", "(b{,2}+)"] {
        let err = diagram(pattern, Flags::default()).unwrap_err();
        assert!(matches!(err, PatternError::UnsupportedConstruct(_)), "{pattern}");
        assert!(err.user_message().starts_with("Invalid pattern: lazy or possessive"));
    }
}

#[test]
fn syntax_errors_are_reported() {
    let err = diagram("(a", Flags::default()).unwrap_err();
    assert!(matches!(err, PatternError::Syntax(_)));
    assert!(err.user_message().starts_with("Invalid pattern: "));
}

#[test]
fn workbench_uses_configured_flags() {
    let mut config = regex_workbench::config::WorkbenchConfig::default();
    config.flags = "x".parse().unwrap();
    let workbench = Workbench::new(config);
    assert_eq!(
        workbench.diagram(" ").unwrap(),
        seq(vec![DiagramNode::Skip])
    );
}
