//! Whitespace and brace-structure rules.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{matches_code, replace_code, RepairRule};
use crate::scan::code_mask;

static BLANK_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("valid regex"));
static NESTED_BRACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\s+)\{([^{}]*)\}(\s+)\}").expect("valid regex"));

/// Three or more line breaks in a row become one blank line.
pub struct CollapseBlankLines;

impl RepairRule for CollapseBlankLines {
    fn name(&self) -> &'static str {
        "collapse-blank-lines"
    }

    fn applies(&self, text: &str) -> bool {
        BLANK_RUN.is_match(text)
    }

    fn rewrite(&self, text: &str) -> String {
        BLANK_RUN.replace_all(text, "\n\n").into_owned()
    }
}

/// `{ { body } }` becomes `{ body }`. Braces must be whitespace-separated,
/// so `{{` initialisers are left alone.
pub struct FlattenNestedBraces;

impl RepairRule for FlattenNestedBraces {
    fn name(&self) -> &'static str {
        "flatten-nested-braces"
    }

    fn applies(&self, text: &str) -> bool {
        matches_code(text, &NESTED_BRACES)
    }

    fn rewrite(&self, text: &str) -> String {
        let mut text = text.to_string();
        loop {
            let next = replace_code(&text, &NESTED_BRACES, "{$2}");
            if next == text {
                return text;
            }
            text = next;
        }
    }
}

/// Recompute indentation from brace depth.
///
/// A line whose first code character is `}` sits one level out, and a line
/// whose last code character is `{` indents the lines after it. Braces in
/// strings and comments do not count.
pub struct Reindent {
    width: usize,
}

impl Reindent {
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    fn reindented(&self, text: &str) -> String {
        let mask = code_mask(text);
        let mut out = String::with_capacity(text.len());
        let mut depth = 0usize;
        let mut offset = 0;

        for line in text.split_inclusive('\n') {
            let body = line.trim_end_matches(['\n', '\r']);
            let leading = body.len() - body.trim_start().len();
            let trimmed = body.trim();
            let start = offset + leading;
            offset += line.len();

            if trimmed.is_empty() {
                if line.ends_with('\n') {
                    out.push('\n');
                }
                continue;
            }

            let code: Vec<u8> = trimmed
                .bytes()
                .enumerate()
                .filter(|(i, byte)| mask[start + i] && !byte.is_ascii_whitespace())
                .map(|(_, byte)| byte)
                .collect();
            if code.first() == Some(&b'}') {
                depth = depth.saturating_sub(1);
            }

            out.push_str(&" ".repeat(depth * self.width));
            out.push_str(trimmed);
            if line.ends_with('\n') {
                out.push('\n');
            }

            if code.last() == Some(&b'{') {
                depth += 1;
            }
        }
        out
    }
}

impl RepairRule for Reindent {
    fn name(&self) -> &'static str {
        "reindent"
    }

    fn applies(&self, text: &str) -> bool {
        !text.trim().is_empty()
    }

    fn rewrite(&self, text: &str) -> String {
        self.reindented(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_blank_lines() {
        let rule = CollapseBlankLines;
        assert_eq!(rule.rewrite("a;\n\n  \n\nb;\n"), "a;\n\nb;\n");
        assert!(!rule.applies("a;\n\nb;\n"));
    }

    #[test]
    fn test_flatten_nested_braces() {
        let rule = FlattenNestedBraces;
        assert_eq!(
            rule.rewrite("if (a) { {\n  b();\n} }"),
            "if (a) {\n  b();\n}"
        );
        assert_eq!(rule.rewrite("x { { { a; } } }"), "x { a; }");
    }

    #[test]
    fn test_double_brace_initialiser_is_kept() {
        let text = "new LinkedHashMap<String, Object>() {{\n    put(\"a\", 1);\n}};";
        assert!(!FlattenNestedBraces.applies(text));
    }

    #[test]
    fn test_braces_in_strings_are_kept() {
        let text = "String s = \"{ {x} }\";";
        assert!(!FlattenNestedBraces.applies(text));
        assert_eq!(FlattenNestedBraces.rewrite(text), text);
    }

    #[test]
    fn test_reindent() {
        let rule = Reindent::new(4);
        assert_eq!(
            rule.rewrite("void f() {\nif (a) {\n  b();\n      } else {\nc(); // {\n}\n}\n"),
            "void f() {\n    if (a) {\n        b();\n    } else {\n        c(); // {\n    }\n}\n"
        );
    }

    #[test]
    fn test_reindent_ignores_braces_in_strings_and_keeps_blank_lines() {
        let rule = Reindent::new(2);
        assert_eq!(
            rule.rewrite("a() {\n\n   s = \"{\";\n}\n"),
            "a() {\n\n  s = \"{\";\n}\n"
        );
    }
}
