pub mod ast;
pub mod compiler;
pub mod config;
pub mod diagram;
pub mod error;
pub mod matcher;
pub mod merge;
pub mod parser;
pub mod quantifier;
pub mod substitute;
pub mod translate;

use log::debug;

use crate::ast::Node;
use crate::config::{Flags, WorkbenchConfig};
use crate::diagram::DiagramNode;
use crate::error::{PatternError, ValidationError};
use crate::matcher::PatternCache;
use crate::substitute::Substitution;

/// Railroad diagram for a pattern.
pub fn diagram(pattern: &str, flags: Flags) -> Result<DiagramNode, PatternError> {
    let ast = parse_checked(pattern, flags)?;
    Ok(compiler::compile(&ast))
}

/// Substitute `template` into every match of `pattern` in `subject`,
/// using the default configuration.
pub fn substitute(pattern: &str, subject: &str, template: &str) -> Substitution {
    Workbench::new(WorkbenchConfig::default()).substitute(pattern, subject, template)
}

/// Diagram and substitution entry points sharing one configuration and a
/// cache of compiled patterns.
#[derive(Debug)]
pub struct Workbench {
    config: WorkbenchConfig,
    cache: PatternCache,
}

impl Workbench {
    pub fn new(config: WorkbenchConfig) -> Self {
        let cache = PatternCache::new(config.backtrack_limit);
        Self { config, cache }
    }

    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    pub fn diagram(&self, pattern: &str) -> Result<DiagramNode, PatternError> {
        diagram(pattern, self.config.flags)
    }

    pub fn substitute(&mut self, pattern: &str, subject: &str, template: &str) -> Substitution {
        let flags = self.config.flags;
        let matcher = parse_checked(pattern, flags).and_then(|_| self.cache.get(pattern, flags));
        match matcher {
            Ok(matcher) => Substitution::build(matcher.as_ref(), subject, template),
            Err(err) => {
                debug!("rejected pattern {pattern:?}: {err}");
                Substitution::unchanged(subject, vec![ValidationError::pattern(err.to_string())])
            }
        }
    }
}

/// Parse, then reject constructs the workbench refuses to run.
fn parse_checked(pattern: &str, flags: Flags) -> Result<Node, PatternError> {
    let ast = parser::parse(pattern, flags)?;
    if let Some(quantifier) = find_unsupported_quantifier(&ast) {
        return Err(PatternError::UnsupportedConstruct(format!(
            "lazy or possessive quantifier '{quantifier}' on a bounded range is not supported"
        )));
    }
    Ok(ast)
}

fn find_unsupported_quantifier(node: &Node) -> Option<&str> {
    if let Some(quantifier) = node
        .quantifier
        .as_deref()
        .filter(|q| quantifier::is_modified_bounded_range(q))
    {
        return Some(quantifier);
    }
    node.children.iter().find_map(find_unsupported_quantifier)
}
