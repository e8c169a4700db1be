//! Substitution against the real regex engine.

use regex_workbench::config::WorkbenchConfig;
use regex_workbench::error::Field;
use regex_workbench::substitute::Fragment;
use regex_workbench::{substitute, Workbench};
use rstest::rstest;

fn literal(text: &str) -> Fragment {
    Fragment::Literal(text.to_string())
}

fn highlight(text: &str) -> Fragment {
    Fragment::Highlight(text.to_string())
}

fn workbench(flags: &str) -> Workbench {
    let mut config = WorkbenchConfig::default();
    config.flags = flags.parse().unwrap();
    Workbench::new(config)
}

#[test]
fn missing_group_leaves_subject_unchanged() {
    let result = substitute("(hello)", "hello", r"\9");
    assert_eq!(result.fragments, vec![literal("hello")]);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field, Field::Template);
    assert!(result.errors[0].message.contains(r"\9"));
}

#[test]
fn numbered_reference() {
    let result = substitute("(hello)", "hello", r"\1");
    assert_eq!(result.fragments, vec![highlight("hello")]);
    assert!(result.errors.is_empty());
}

#[test]
fn replacements_are_escaped() {
    let result = substitute("(foo)", "foo foo foo", "<script>");
    assert_eq!(
        result.fragments,
        vec![
            highlight("&lt;script&gt;"),
            literal(" "),
            highlight("&lt;script&gt;"),
            literal(" "),
            highlight("&lt;script&gt;"),
        ]
    );
    assert_eq!(result.highlight_count(), 3);
    assert!(!result.to_html("highlight").contains("<script>"));
}

#[test]
fn named_reference() {
    let result = substitute("(?<word>hello)", "hello", r"[\k<word>]");
    assert_eq!(result.fragments, vec![highlight("[hello]")]);
    assert!(result.errors.is_empty());
}

#[test]
fn no_match_is_unchanged_without_errors() {
    let result = substitute("(goodbye)", "hello hello", "x");
    assert_eq!(result.fragments, vec![literal("hello hello")]);
    assert!(result.errors.is_empty());
}

#[test]
fn unset_name_in_later_match_expands_to_empty() {
    let result = substitute("(?<a>x)?y", "xy y", r"\k<a>");
    assert_eq!(
        result.fragments,
        vec![highlight("x"), literal(" "), highlight("")]
    );
    assert!(result.errors.is_empty());
}

#[test]
fn unset_name_in_first_match_is_reported_but_applied() {
    let result = substitute("(?<a>x)?y", "y", r"<\k<a>>");
    assert_eq!(result.fragments, vec![highlight("&lt;&gt;")]);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field, Field::Template);
}

#[test]
fn empty_matches_with_empty_template_change_nothing() {
    let result = substitute("x*", "abc", "");
    assert_eq!(result.fragments, vec![literal("abc")]);
    assert!(result.errors.is_empty());
}

#[test]
fn empty_subject_has_no_fragments() {
    let result = substitute("a", "", "b");
    assert!(result.fragments.is_empty());
    assert_eq!(result.text(), "");
}

#[rstest]
#[case("(a")]
#[case("a{1,2}+")]
#[case("*")]
fn invalid_patterns_are_pattern_errors(#[case] pattern: &str) {
    let result = substitute(pattern, "aaa", "b");
    assert_eq!(result.fragments, vec![literal("aaa")]);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field, Field::Pattern);
}

#[test]
fn unsupported_construct_message() {
    let result = substitute("a{1,2}?", "aa", "b");
    assert!(result.errors[0].message.contains("bounded range"));
    assert!(result.errors[0].to_string().starts_with("pattern: "));
}

#[test]
fn ignore_case_flag() {
    let result = workbench("i").substitute("hello", "HeLLo!", "bye");
    assert_eq!(result.fragments, vec![highlight("bye"), literal("!")]);
}

#[test]
fn ruby_multiline_lets_dot_match_newline() {
    let subject = "a\nb";
    assert_eq!(substitute("a.b", subject, "x").fragments, vec![literal(subject)]);
    assert_eq!(
        workbench("m").substitute("a.b", subject, "x").fragments,
        vec![highlight("x")]
    );
}

#[test]
fn catastrophic_backtracking_times_out() {
    let mut config = WorkbenchConfig::default();
    config.backtrack_limit = 100_000;
    let mut workbench = Workbench::new(config);
    let subject = "ab".repeat(28);
    let result = workbench.substitute("(?i)(a|b|ab)*(?=c)", &subject, "x");
    assert_eq!(result.fragments, vec![literal(&subject)]);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field, Field::Pattern);
    assert!(result.errors[0].message.contains("backtracking limit"));
}

#[test]
fn html_output_uses_configured_class() {
    let mut config = WorkbenchConfig::default();
    config.highlight_class = "hit".to_string();
    let mut workbench = Workbench::new(config);
    let result = workbench.substitute("b", "a<b", "c");
    assert_eq!(
        result.to_html(&workbench.config().highlight_class),
        "a&lt;<span class=\"hit\">c</span>"
    );
}

#[rstest]
#[case("^a", "X\nX")]
#[case("a$", "X\nX")]
#[case(r"a\Z", "a\nX")]
#[case(r"a\z", "a\nX")]
fn line_and_string_anchors(#[case] pattern: &str, #[case] expected: &str) {
    let result = substitute(pattern, "a\na", "X");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.text(), expected);
}

#[test]
fn end_of_string_anchor_before_final_newline() {
    let result = substitute(r"a\Z", "a\n", "X");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.fragments, vec![highlight("X"), literal("\n")]);
}

#[test]
fn line_start_does_not_match_after_final_newline() {
    let result = substitute("^", "a\n", "> ");
    assert_eq!(result.text(), "> a\n");
}

#[test]
fn plain_groups_beside_named_groups_do_not_count() {
    let result = substitute("(?<w>a)(b)", "ab", r"\2");
    assert_eq!(result.fragments, vec![literal("ab")]);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field, Field::Template);

    let result = substitute("(?<w>a)(b)", "ab", r"\1");
    assert_eq!(result.fragments, vec![highlight("a")]);
}

#[rstest]
#[case("(?~ab)", "absence group")]
#[case(r"\R", r"\R")]
#[case(r"a\X", r"\X")]
#[case(r"(a)\g<1>", "subexpression call")]
fn constructs_the_engine_cannot_run(#[case] pattern: &str, #[case] construct: &str) {
    assert!(regex_workbench::diagram(pattern, Default::default()).is_ok());
    let result = substitute(pattern, "ab", "x");
    assert_eq!(result.fragments, vec![literal("ab")]);
    assert_eq!(result.errors[0].field, Field::Pattern);
    assert!(result.errors[0].message.contains(construct), "{}", result.errors[0].message);
    assert!(result.errors[0].message.contains("not supported"));
}

#[rstest]
#[case(r"\h+", "c0ffee!", "x!")]
#[case(r"a{,2}b", "aab", "x")]
#[case(r"a*+b", "aab", "x")]
#[case(r"\x41B", "AB", "x")]
#[case(r"(?'n'b)\k'n'", "abb", "ax")]
#[case(r"[a-c&&[^b]]", "abc", "xbx")]
#[case("(?m:a.)b", "a\nb", "x")]
fn ruby_syntax_the_engine_spells_differently(
    #[case] pattern: &str,
    #[case] subject: &str,
    #[case] expected: &str,
) {
    let result = substitute(pattern, subject, "x");
    assert!(result.errors.is_empty(), "{pattern}: {:?}", result.errors);
    assert_eq!(result.text(), expected);
}

#[test]
fn plain_text_unescapes_replacements() {
    let result = substitute("foo", "a<foo", "<x>");
    assert_eq!(result.text(), "a<<x>");
    assert_eq!(
        result.to_html("highlight"),
        "a&lt;<span class=\"highlight\">&lt;x&gt;</span>"
    );
}
