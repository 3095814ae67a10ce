//! Arrow functions to function expressions.

use crate::scan::{code_mask, find_matching_back};

struct Arrow {
    /// Start of the parameter list, `(` included.
    params_start: usize,
    params: String,
    body: ArrowBody,
}

enum ArrowBody {
    /// Body starts with `{` at this offset.
    Block(usize),
    /// Expression body spanning this range.
    Expression(usize, usize),
}

/// Rewrite every arrow function into `function(..)` form.
///
/// Block bodies keep their text. Expression bodies are wrapped in
/// `{ return ..; }` after their own arrows are rewritten.
pub fn rewrite_arrows(source: &str) -> String {
    let mask = code_mask(source);
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut copied = 0;
    let mut i = 0;

    while i + 1 < bytes.len() {
        if !(mask[i] && bytes[i] == b'=' && bytes[i + 1] == b'>') {
            i += 1;
            continue;
        }
        // `==>` or `>=>` are not arrows
        if i > 0 && mask[i - 1] && matches!(bytes[i - 1], b'=' | b'!' | b'<' | b'>') {
            i += 2;
            continue;
        }
        let Some(arrow) = parse_arrow(source, &mask, i, copied) else {
            i += 2;
            continue;
        };

        out.push_str(&source[copied..arrow.params_start]);
        out.push_str(&format!("function({})", arrow.params));
        match arrow.body {
            ArrowBody::Block(start) => {
                out.push(' ');
                copied = start;
                i = start;
            }
            ArrowBody::Expression(start, end) => {
                let body = rewrite_arrows(source[start..end].trim());
                out.push_str(&format!(" {{ return {}; }}", body));
                copied = end;
                i = end;
            }
        }
    }
    out.push_str(&source[copied..]);
    out
}

fn parse_arrow(source: &str, mask: &[bool], arrow: usize, floor: usize) -> Option<Arrow> {
    let bytes = source.as_bytes();

    // Parameters: `(..)` or a lone identifier before `=>`.
    let mut end = arrow;
    while end > floor && bytes[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    if end == floor {
        return None;
    }
    let (params_start, params) = if bytes[end - 1] == b')' {
        let open = find_matching_back(source, mask, end - 1)?;
        if open < floor {
            return None;
        }
        (open, source[open + 1..end - 1].trim().to_string())
    } else {
        let mut start = end;
        while start > floor && is_ident_byte(bytes[start - 1]) {
            start -= 1;
        }
        if start == end {
            return None;
        }
        (start, source[start..end].to_string())
    };

    // `async x => ..` keeps its `async`
    let mut body_start = arrow + 2;
    while body_start < bytes.len() && bytes[body_start].is_ascii_whitespace() {
        body_start += 1;
    }
    if body_start >= bytes.len() {
        return None;
    }
    if bytes[body_start] == b'{' {
        return Some(Arrow {
            params_start,
            params,
            body: ArrowBody::Block(body_start),
        });
    }

    let body_end = expression_end(source, mask, body_start);
    if source[body_start..body_end].trim().is_empty() {
        return None;
    }
    Some(Arrow {
        params_start,
        params,
        body: ArrowBody::Expression(body_start, body_end),
    })
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// End of an expression body: `;` or `,` at depth zero, an unbalanced
/// closer, or a line break the expression cannot continue across.
fn expression_end(source: &str, mask: &[bool], start: usize) -> usize {
    let bytes = source.as_bytes();
    let mut depth = 0usize;
    let mut i = start;

    while i < bytes.len() {
        if !mask[i] {
            i += 1;
            continue;
        }
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => {
                if depth == 0 {
                    return i;
                }
                depth -= 1;
            }
            b';' | b',' if depth == 0 => return i,
            b'\n' if depth == 0 && !continues_across(source, mask, start, i) => return i,
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

fn continues_across(source: &str, mask: &[bool], start: usize, newline: usize) -> bool {
    let before = source[start..newline].trim_end();
    let Some(last) = before.chars().last() else {
        return true;
    };
    if "+-*/%&|^=<>?:!.([{,".contains(last) {
        return true;
    }
    let after = source[newline..].trim_start();
    let offset = source.len() - after.len();
    match after.chars().next() {
        Some(next) if offset < mask.len() && mask[offset] => {
            ".+-*/%&|^?:=<>".contains(next)
        }
        _ => false,
    }
}
