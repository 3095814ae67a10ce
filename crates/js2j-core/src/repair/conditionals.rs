//! `if`/`else` and `return` repairs.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{matches_code, replace_code, RepairRule};
use crate::scan::brace_balance;

static DETACHED_ELSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\}\s*\n\s*else\b").expect("valid regex"));
static UNCLOSED_IF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(if\s*\([^)]*\)\s*\{[^{}]*;)(\s*)else\b").expect("valid regex")
});
static EXTRA_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\}\s*else\s*\{[^{}]*\})\s*\}").expect("valid regex"));
static RETURN_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(return\s+[^;{}]+;)\s*\);").expect("valid regex"));

/// Broken `if`/`else` chains.
///
/// - `}` and `else` on separate lines are joined as `} else`;
/// - an `if` body that reaches `else` without closing gets its `}`;
/// - while the text closes more braces than it opens, a `}` directly after
///   an `else` block is dropped.
pub struct Conditionals;

impl RepairRule for Conditionals {
    fn name(&self) -> &'static str {
        "repair-conditionals"
    }

    fn applies(&self, text: &str) -> bool {
        text.contains("else")
    }

    fn rewrite(&self, text: &str) -> String {
        let text = replace_code(text, &DETACHED_ELSE, "} else");
        let mut text = replace_code(&text, &UNCLOSED_IF, "$1\n} else");
        while brace_balance(&text) < 0 && matches_code(&text, &EXTRA_CLOSE) {
            let next = EXTRA_CLOSE.replacen(&text, 1, "$1").into_owned();
            if next == text {
                break;
            }
            text = next;
        }
        text
    }
}

/// `return x; );` left behind by a mis-split call loses the `);`.
pub struct ReturnTails;

impl RepairRule for ReturnTails {
    fn name(&self) -> &'static str {
        "repair-return-tails"
    }

    fn applies(&self, text: &str) -> bool {
        text.contains("return")
    }

    fn rewrite(&self, text: &str) -> String {
        replace_code(text, &RETURN_TAIL, "$1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_else_joined() {
        assert_eq!(
            Conditionals.rewrite("if (a) {\n    b();\n}\nelse {\n    c();\n}\n"),
            "if (a) {\n    b();\n} else {\n    c();\n}\n"
        );
    }

    #[test]
    fn test_unclosed_if_gets_brace() {
        assert_eq!(
            Conditionals.rewrite("if (a) {\n    b();\nelse {\n    c();\n}\n"),
            "if (a) {\n    b();\n} else {\n    c();\n}\n"
        );
    }

    #[test]
    fn test_extra_close_after_else_dropped() {
        assert_eq!(
            Conditionals.rewrite("if (a) {\n    b();\n} else {\n    c();\n}\n}\n"),
            "if (a) {\n    b();\n} else {\n    c();\n}\n"
        );
    }

    #[test]
    fn test_balanced_chain_is_untouched() {
        let text = "void f() {\n    if (a) {\n        b();\n    } else {\n        c();\n    }\n}\n";
        assert_eq!(Conditionals.rewrite(text), text);
    }

    #[test]
    fn test_else_in_string_is_kept() {
        let text = "}\nString s = \"}\n else\";";
        assert_eq!(Conditionals.rewrite(text), text);
    }

    #[test]
    fn test_return_tail() {
        assert_eq!(ReturnTails.rewrite("return x + 1; );\n"), "return x + 1;\n");
        assert_eq!(ReturnTails.rewrite("return f(x);\n"), "return f(x);\n");
    }
}
