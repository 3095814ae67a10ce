//! `for` header repairs.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{matches_code, replace_code, RepairRule};
use crate::scan::code_mask;

static PLACEHOLDER_UPDATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\bfor\s*\(\s*(?:[\w<>\[\]]+\s+)?(\w+)\s*=[^;]*;[^;]*;\s*)"/\* unsupported: [^"]*\*/"(\s*\))"#)
        .expect("valid regex")
});
static FOR_HEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*for\s*\(").expect("valid regex"));

/// Loop headers the translator could not finish.
///
/// - a placeholder in the update slot becomes `<var>++`, with the variable
///   taken from the initializer;
/// - a header with more `)` than `(` loses the surplus before its `{`.
pub struct LoopHeaders;

impl RepairRule for LoopHeaders {
    fn name(&self) -> &'static str {
        "repair-loop-headers"
    }

    fn applies(&self, text: &str) -> bool {
        text.contains("for")
    }

    fn rewrite(&self, text: &str) -> String {
        let text = if matches_code(text, &PLACEHOLDER_UPDATE) {
            replace_code(text, &PLACEHOLDER_UPDATE, "${1}${2}++${3}")
        } else {
            text.to_string()
        };
        text.split_inclusive('\n')
            .map(|line| {
                if FOR_HEAD.is_match(line) {
                    balanced_header(line)
                } else {
                    line.to_string()
                }
            })
            .collect()
    }
}

/// Drop surplus `)` that sit right before the header's opening `{`.
fn balanced_header(line: &str) -> String {
    let mask = code_mask(line);
    let bytes = line.as_bytes();
    let mut surplus = 0i64;
    for (i, &byte) in bytes.iter().enumerate() {
        if !mask[i] {
            continue;
        }
        match byte {
            b'(' => surplus -= 1,
            b')' => surplus += 1,
            _ => {}
        }
    }
    if surplus <= 0 {
        return line.to_string();
    }

    let body = line.trim_end();
    let Some(head) = body.strip_suffix('{') else {
        return line.to_string();
    };
    let mut head = head.trim_end().to_string();
    while surplus > 0 && head.ends_with(')') {
        let trimmed = head[..head.len() - 1].trim_end();
        // keep the header's own closing paren
        if !trimmed.ends_with(')') {
            break;
        }
        head.truncate(trimmed.len());
        surplus -= 1;
    }
    format!("{head} {{{}", &line[body.len()..])
}
