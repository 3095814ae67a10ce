//! Textual clean-up of generated Java.
//!
//! Each rule targets one malformation in hand-edited or fallback-assembled
//! Java: scalars declared for collection values, map initialisers, `if`
//! chains and so on. Rules run in a fixed order, only rewrite matches that
//! start in code, and running the pipeline twice gives the same text as
//! running it once.

mod collections;
mod conditionals;
mod layout;
mod loops;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::scan::code_mask;

pub use collections::{CollectionTypes, MapBlocks};
pub use conditionals::{Conditionals, ReturnTails};
pub use layout::{CollapseBlankLines, FlattenNestedBraces, Reindent};
pub use loops::LoopHeaders;

/// One rewrite over the whole text.
pub trait RepairRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cheap pre-check; `rewrite` only runs when this holds.
    fn applies(&self, text: &str) -> bool;

    fn rewrite(&self, text: &str) -> String;
}

/// An ordered list of rules.
pub struct RepairPipeline {
    rules: Vec<Box<dyn RepairRule>>,
}

impl RepairPipeline {
    pub fn new(rules: Vec<Box<dyn RepairRule>>) -> Self {
        Self { rules }
    }

    /// The standard rule order, re-indenting with `indent_width` spaces.
    pub fn standard(indent_width: usize) -> Self {
        Self::new(vec![
            Box::new(CollapseBlankLines),
            Box::new(FlattenNestedBraces),
            Box::new(LoopHeaders),
            Box::new(MapBlocks),
            Box::new(CollectionTypes),
            Box::new(Conditionals),
            Box::new(ReturnTails),
            Box::new(Reindent::new(indent_width)),
        ])
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn run(&self, text: &str) -> String {
        let mut text = text.to_string();
        for rule in &self.rules {
            if !rule.applies(&text) {
                continue;
            }
            let rewritten = rule.rewrite(&text);
            if rewritten != text {
                debug!(rule = rule.name(), "repair rule applied");
                text = rewritten;
            }
        }
        text
    }
}

impl Default for RepairPipeline {
    fn default() -> Self {
        Self::standard(4)
    }
}

/// Run the standard pipeline with four-space indentation.
pub fn repair(text: &str) -> String {
    static PIPELINE: Lazy<RepairPipeline> = Lazy::new(RepairPipeline::default);
    PIPELINE.run(text)
}

/// Replace every match of `pattern` that starts in code. Matches starting
/// inside a string or comment are kept as written.
pub(crate) fn replace_code(text: &str, pattern: &Regex, replacement: &str) -> String {
    replace_code_with(text, pattern, |caps, out| caps.expand(replacement, out))
}

/// [`replace_code`] with the replacement written by `rewrite`.
pub(crate) fn replace_code_with(
    text: &str,
    pattern: &Regex,
    mut rewrite: impl FnMut(&Captures<'_>, &mut String),
) -> String {
    let mask = code_mask(text);
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    for caps in pattern.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if !mask.get(whole.start()).copied().unwrap_or(false) {
            continue;
        }
        out.push_str(&text[copied..whole.start()]);
        rewrite(&caps, &mut out);
        copied = whole.end();
    }
    out.push_str(&text[copied..]);
    out
}

/// Whether `pattern` matches anywhere in code.
pub(crate) fn matches_code(text: &str, pattern: &Regex) -> bool {
    let mut found = pattern.find_iter(text).peekable();
    if found.peek().is_none() {
        return false;
    }
    let mask = code_mask(text);
    found.any(|m| mask.get(m.start()).copied().unwrap_or(false))
}

#[cfg(test)]
mod tests;
