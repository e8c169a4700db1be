//! Quantifier resolution.
//!
//! The AST keeps quantifiers as raw text. [`resolve`] turns that text into a
//! kind and a greediness, or decides the quantified element can never appear
//! (`{0}` and friends), or gives up and keeps the raw text for a labeled
//! wrapper. It never fails.

use crate::diagram::DiagramNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Greediness {
    Greedy,
    Lazy,
    Possessive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantifierKind {
    /// `*`
    Star,
    /// `+`
    Plus,
    /// `?`
    Optional,
    /// `{n}`, or `{n,n}`.
    Exact(u32),
    /// `{n,m}` with `n < m`, or `{,m}` (min 0).
    Range { min: u32, max: u32 },
    /// `{n,}`
    AtLeast(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantifier {
    pub kind: QuantifierKind,
    pub greediness: Greediness,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Quantified(Quantifier),
    /// Zero repetitions; the element never appears.
    Skip,
    /// Text outside the quantifier grammar.
    Fallback(String),
}

pub fn resolve(text: &str) -> Resolution {
    match parse(text) {
        Some(Parsed::Quantified(quantifier)) => Resolution::Quantified(quantifier),
        Some(Parsed::Never) => Resolution::Skip,
        None => Resolution::Fallback(text.to_string()),
    }
}

enum Parsed {
    Quantified(Quantifier),
    Never,
}

fn parse(text: &str) -> Option<Parsed> {
    let (base, suffix) = split_suffix(text)?;
    let greediness = match suffix {
        "" => Greediness::Greedy,
        "?" => Greediness::Lazy,
        "+" => Greediness::Possessive,
        _ => return None,
    };
    let kind = match base {
        "*" => QuantifierKind::Star,
        "+" => QuantifierKind::Plus,
        "?" => QuantifierKind::Optional,
        interval => match parse_interval(interval)? {
            Some(kind) => kind,
            None => return Some(Parsed::Never),
        },
    };
    Some(Parsed::Quantified(Quantifier { kind, greediness }))
}

/// Splits `*?` into (`*`, `?`) and `{2,3}+` into (`{2,3}`, `+`).
fn split_suffix(text: &str) -> Option<(&str, &str)> {
    if text.starts_with('{') {
        let close = text.find('}')?;
        Some(text.split_at(close + 1))
    } else if matches!(text.chars().next(), Some('*' | '+' | '?')) {
        Some(text.split_at(1))
    } else {
        None
    }
}

/// `Some(None)` means the interval allows zero repetitions only.
fn parse_interval(interval: &str) -> Option<Option<QuantifierKind>> {
    let inner = interval.strip_prefix('{')?.strip_suffix('}')?;
    let kind = match inner.split_once(',') {
        None => QuantifierKind::Exact(parse_count(inner)?),
        Some(("", "")) => return None,
        Some((min, "")) => QuantifierKind::AtLeast(parse_count(min)?),
        Some((min, max)) => {
            let min = if min.is_empty() { 0 } else { parse_count(min)? };
            let max = parse_count(max)?;
            if min > max {
                return None;
            }
            if min == max {
                QuantifierKind::Exact(min)
            } else {
                QuantifierKind::Range { min, max }
            }
        }
    };
    if matches!(kind, QuantifierKind::Exact(0)) {
        return Some(None);
    }
    Some(Some(kind))
}

fn parse_count(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl Greediness {
    fn comment(self) -> Option<&'static str> {
        match self {
            Greediness::Greedy => None,
            Greediness::Lazy => Some("lazy"),
            Greediness::Possessive => Some("possessive"),
        }
    }

    fn annotate(self, times: String) -> String {
        match self.comment() {
            Some(mode) => format!("{times} ({mode})"),
            None => times,
        }
    }
}

impl Resolution {
    /// Wraps a compiled element in the diagram shape for this quantifier.
    pub fn wrap(&self, child: DiagramNode) -> DiagramNode {
        let quantifier = match self {
            Resolution::Skip => return DiagramNode::Skip,
            Resolution::Fallback(raw) => {
                return DiagramNode::group(child, format!("quantifier: {raw}"))
            }
            Resolution::Quantified(quantifier) => *quantifier,
        };
        let greediness = quantifier.greediness;
        match quantifier.kind {
            QuantifierKind::Star => {
                DiagramNode::zero_or_more(child, greediness.comment().map(String::from))
            }
            QuantifierKind::Plus => {
                DiagramNode::one_or_more(child, greediness.comment().map(String::from))
            }
            QuantifierKind::Optional => match greediness.comment() {
                None => DiagramNode::optional(child),
                Some(mode) => DiagramNode::group(DiagramNode::optional(child), mode),
            },
            QuantifierKind::Exact(n) => DiagramNode::one_or_more(
                child,
                Some(greediness.annotate(format!("{n} time(s)"))),
            ),
            QuantifierKind::Range { min: 0, max } => DiagramNode::zero_or_more(
                child,
                Some(greediness.annotate(format!("0-{max} time(s)"))),
            ),
            QuantifierKind::Range { min, max } => DiagramNode::one_or_more(
                child,
                Some(greediness.annotate(format!("{min}-{max} time(s)"))),
            ),
            QuantifierKind::AtLeast(0) => DiagramNode::zero_or_more(
                child,
                Some(greediness.annotate("0+ time(s)".to_string())),
            ),
            QuantifierKind::AtLeast(min) => DiagramNode::one_or_more(
                child,
                Some(greediness.annotate(format!("{min}+ time(s)"))),
            ),
        }
    }
}

/// Whether `text` is a bounded interval (`{n,m}` or `{,m}`) with a lazy or
/// possessive suffix. Such quantifiers are rejected before compiling.
pub fn is_modified_bounded_range(text: &str) -> bool {
    let Some((base, suffix)) = split_suffix(text) else {
        return false;
    };
    let bounded = base
        .strip_prefix('{')
        .and_then(|b| b.strip_suffix('}'))
        .and_then(|inner| inner.split_once(','))
        .is_some_and(|(_, max)| parse_count(max).is_some());
    bounded && matches!(suffix, "?" | "+")
}

/// Resolves optional quantifier text and wraps `child` accordingly.
pub fn apply(quantifier: Option<&str>, child: DiagramNode) -> DiagramNode {
    match quantifier {
        Some(text) => resolve(text).wrap(child),
        None => child,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quantified(kind: QuantifierKind, greediness: Greediness) -> Resolution {
        Resolution::Quantified(Quantifier { kind, greediness })
    }

    #[test]
    fn simple_operators() {
        assert_eq!(resolve("*"), quantified(QuantifierKind::Star, Greediness::Greedy));
        assert_eq!(resolve("+?"), quantified(QuantifierKind::Plus, Greediness::Lazy));
        assert_eq!(
            resolve("?+"),
            quantified(QuantifierKind::Optional, Greediness::Possessive)
        );
    }

    #[test]
    fn intervals() {
        assert_eq!(
            resolve("{3}"),
            quantified(QuantifierKind::Exact(3), Greediness::Greedy)
        );
        assert_eq!(
            resolve("{2,}?"),
            quantified(QuantifierKind::AtLeast(2), Greediness::Lazy)
        );
        assert_eq!(
            resolve("{,5}"),
            quantified(QuantifierKind::Range { min: 0, max: 5 }, Greediness::Greedy)
        );
        assert_eq!(
            resolve("{4,4}"),
            quantified(QuantifierKind::Exact(4), Greediness::Greedy)
        );
    }

    #[test]
    fn zero_width_forms_skip() {
        for text in ["{0}", "{0,0}", "{,0}", "{0}?", "{0,0}+", "{,0}?"] {
            assert_eq!(resolve(text), Resolution::Skip, "{text}");
        }
    }

    #[test]
    fn nonsense_falls_back() {
        for text in ["", "{}", "{,}", "{3,1}", "{a}", "*??", "x", "{2"] {
            assert_eq!(resolve(text), Resolution::Fallback(text.to_string()), "{text:?}");
        }
    }

    #[test]
    fn zero_lower_bound_joins_zero_or_more_family() {
        let wrapped = resolve("{0,4}").wrap(DiagramNode::terminal("\"a\""));
        assert_eq!(
            wrapped,
            DiagramNode::zero_or_more(DiagramNode::terminal("\"a\""), Some("0-4 time(s)".into()))
        );
    }

    #[test]
    fn lazy_interval_is_annotated() {
        let wrapped = resolve("{2,3}?").wrap(DiagramNode::Skip);
        assert_eq!(
            wrapped,
            DiagramNode::one_or_more(DiagramNode::Skip, Some("2-3 time(s) (lazy)".into()))
        );
    }

    #[test]
    fn modified_bounded_ranges() {
        assert!(is_modified_bounded_range("{1,3}?"));
        assert!(is_modified_bounded_range("{,3}+"));
        assert!(!is_modified_bounded_range("{1,3}"));
        assert!(!is_modified_bounded_range("{3}?"));
        assert!(!is_modified_bounded_range("{3,}+"));
        assert!(!is_modified_bounded_range("*?"));
    }

    #[test]
    fn fallback_wraps_in_labeled_group() {
        let wrapped = apply(Some("{9,1}"), DiagramNode::terminal("\"a\""));
        assert_eq!(
            wrapped,
            DiagramNode::group(DiagramNode::terminal("\"a\""), "quantifier: {9,1}")
        );
    }
}
