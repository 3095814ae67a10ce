//! Template literals to string concatenation.
//!
//! A small state machine walks the text tracking whether it is in code, a
//! quoted string, a comment or a template. Inside a template, `${` opens a
//! hole whose braces are balanced (strings and nested templates included)
//! to find its end.

enum Part {
    Text(String),
    Hole(String),
}

/// Rewrite every template literal as a parenthesised concatenation.
pub fn rewrite_templates(source: &str) -> String {
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => i = crate::scan::skip_quoted(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = bytes[i..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(bytes.len(), |offset| i + offset);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = source[i + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |offset| i + 2 + offset + 2);
            }
            b'`' => {
                let Some((parts, end)) = split_template(source, i) else {
                    // unbalanced: leave the rest as written
                    break;
                };
                out.push_str(&source[copied..i]);
                out.push_str(&concatenation(parts));
                copied = end;
                i = end;
            }
            _ => i += 1,
        }
    }
    out.push_str(&source[copied..]);
    out
}

/// Split the template opened at `open` into parts. Returns the parts and the
/// offset just past the closing backtick.
fn split_template(source: &str, open: usize) -> Option<(Vec<Part>, usize)> {
    let bytes = source.as_bytes();
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut i = open + 1;
    let mut run = i;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => {
                text.push_str(&source[run..i]);
                parts.push(Part::Text(text));
                return Some((parts, i + 1));
            }
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                text.push_str(&source[run..i]);
                parts.push(Part::Text(std::mem::take(&mut text)));
                let close = hole_end(source, i + 2)?;
                parts.push(Part::Hole(source[i + 2..close].to_string()));
                i = close + 1;
                run = i;
            }
            _ => i += 1,
        }
    }
    None
}

/// Offset of the `}` closing a hole whose contents start at `start`.
fn hole_end(source: &str, start: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut depth = 0usize;
    let mut i = start;

    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = crate::scan::skip_quoted(bytes, i);
                continue;
            }
            b'`' => {
                let (_, end) = split_template(source, i)?;
                i = end;
                continue;
            }
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(i),
            b'}' => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    None
}

fn concatenation(parts: Vec<Part>) -> String {
    let mut operands = Vec::new();
    let mut starts_with_text = false;

    for (index, part) in parts.into_iter().enumerate() {
        match part {
            Part::Text(raw) => {
                if index == 0 {
                    starts_with_text = !raw.is_empty();
                }
                if !raw.is_empty() {
                    operands.push(quoted(&raw));
                }
            }
            Part::Hole(expr) => {
                let expr = rewrite_templates(expr.trim());
                if is_simple(&expr) {
                    operands.push(expr);
                } else {
                    operands.push(format!("({expr})"));
                }
            }
        }
    }

    match operands.len() {
        0 => "\"\"".to_string(),
        1 if starts_with_text => operands.remove(0),
        _ => {
            // keep string context even when the template opens with a hole
            if !starts_with_text {
                operands.insert(0, "\"\"".to_string());
            }
            format!("({})", operands.join(" + "))
        }
    }
}

/// Identifier, member path or a call on one.
fn is_simple(expr: &str) -> bool {
    let head_end = expr
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$' || c == '.'))
        .unwrap_or(expr.len());
    if head_end == 0 {
        return false;
    }
    let rest = &expr[head_end..];
    rest.is_empty()
        || (rest.starts_with('(')
            && rest.ends_with(')')
            && crate::scan::find_matching(rest, 0) == Some(rest.len() - 1))
}

/// Template text as a double-quoted literal.
fn quoted(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('`') => out.push('`'),
                Some('$') => out.push('$'),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push_str("\\\\"),
            },
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_template() {
        assert_eq!(rewrite_templates("var s = `plain`;"), "var s = \"plain\";");
    }

    #[test]
    fn test_holes() {
        assert_eq!(
            rewrite_templates("var s = `Hello, ${name}!`;"),
            "var s = (\"Hello, \" + name + \"!\");"
        );
    }

    #[test]
    fn test_leading_hole_keeps_string_context() {
        assert_eq!(
            rewrite_templates("`${a}${b}`"),
            "(\"\" + a + b)"
        );
    }

    #[test]
    fn test_operator_holes_are_parenthesised() {
        assert_eq!(
            rewrite_templates("`sum: ${a + b}`"),
            "(\"sum: \" + (a + b))"
        );
        assert_eq!(
            rewrite_templates("`n: ${xs.length} ${f(x)}`"),
            "(\"n: \" + xs.length + \" \" + f(x))"
        );
    }

    #[test]
    fn test_braces_and_strings_inside_holes() {
        assert_eq!(
            rewrite_templates("`v: ${ {a: \"}\"}.a }`"),
            "(\"v: \" + ({a: \"}\"}.a))"
        );
    }

    #[test]
    fn test_nested_template() {
        assert_eq!(
            rewrite_templates("`a ${`b ${c}`}`"),
            "(\"a \" + ((\"b \" + c)))"
        );
    }

    #[test]
    fn test_quotes_and_newlines_are_escaped() {
        assert_eq!(
            rewrite_templates("`say \"hi\"\nnow`"),
            "\"say \\\"hi\\\"\\nnow\""
        );
    }

    #[test]
    fn test_backticks_in_strings_are_ignored() {
        let src = "var s = \"`\"; // `";
        assert_eq!(rewrite_templates(src), src);
    }

    #[test]
    fn test_unbalanced_hole_leaves_text() {
        let src = "var s = `a ${b`;";
        assert_eq!(rewrite_templates(src), src);
    }
}
