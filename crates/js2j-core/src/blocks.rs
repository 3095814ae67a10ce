//! Splitting a source file into top-level chunks that parse on their own.
//!
//! Used when the whole file fails to parse: each chunk is tried separately
//! so one bad statement costs only its own block.

use crate::scan::code_mask;

/// A run of source lines ending at a top-level statement boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBlock {
    pub text: String,
    /// 1-based line number of the first line.
    pub line: usize,
}

/// Words that continue the previous statement when they open the next line.
const CONTINUATIONS: &[&str] = &["else", "catch", "finally", "while"];

/// Split `source` at depth-zero lines ending in `;` or `}`, and at blank
/// lines outside brackets. Brackets inside strings and comments are ignored.
pub fn split_into_blocks(source: &str) -> Vec<SourceBlock> {
    let mask = code_mask(source);
    let lines: Vec<(usize, &str)> = source
        .split_inclusive('\n')
        .scan(0, |offset, line| {
            let start = *offset;
            *offset += line.len();
            Some((start, line))
        })
        .collect();

    let mut blocks = Vec::new();
    let mut start: Option<(usize, usize)> = None;
    let mut depth = 0i64;

    for (index, &(offset, line)) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            if depth <= 0 {
                flush(source, &mut start, offset, &mut blocks);
                depth = 0;
            }
            continue;
        }
        if start.is_none() {
            start = Some((offset, index + 1));
        }

        let mut last_code = None;
        for (i, byte) in line.bytes().enumerate() {
            if !mask[offset + i] {
                continue;
            }
            match byte {
                b'{' | b'(' | b'[' => depth += 1,
                b'}' | b')' | b']' => depth -= 1,
                _ => {}
            }
            if !byte.is_ascii_whitespace() {
                last_code = Some(byte);
            }
        }

        let at_boundary = depth <= 0 && matches!(last_code, Some(b';' | b'}'));
        if at_boundary && !next_line_continues(&lines[index + 1..]) {
            flush(source, &mut start, offset + line.len(), &mut blocks);
            depth = 0;
        }
    }
    flush(source, &mut start, source.len(), &mut blocks);
    blocks
}

fn flush(
    source: &str,
    start: &mut Option<(usize, usize)>,
    end: usize,
    blocks: &mut Vec<SourceBlock>,
) {
    if let Some((offset, line)) = start.take() {
        let text = &source[offset..end];
        if !text.trim().is_empty() {
            blocks.push(SourceBlock {
                text: text.to_string(),
                line,
            });
        }
    }
}

fn next_line_continues(rest: &[(usize, &str)]) -> bool {
    let Some(next) = rest
        .iter()
        .map(|(_, line)| line.trim_start())
        .find(|line| !line.trim().is_empty())
    else {
        return false;
    };
    next.starts_with('.')
        || CONTINUATIONS.iter().any(|word| {
            next.strip_prefix(word)
                .is_some_and(|after| !after.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<String> {
        split_into_blocks(source)
            .into_iter()
            .map(|block| block.text)
            .collect()
    }

    #[test]
    fn test_statements_split_at_semicolons() {
        assert_eq!(texts("var a = 1;\nvar b = 2;\n"), ["var a = 1;\n", "var b = 2;\n"]);
    }

    #[test]
    fn test_function_stays_whole() {
        let src = "function f() {\n  var x = 1;\n  return x;\n}\nvar y = f();\n";
        assert_eq!(texts(src), ["function f() {\n  var x = 1;\n  return x;\n}\n", "var y = f();\n"]);
    }

    #[test]
    fn test_else_and_chains_continue() {
        let src = "if (a) {\n  b();\n}\nelse {\n  c();\n}\nxs\n  .map(f);\n";
        assert_eq!(
            texts(src),
            ["if (a) {\n  b();\n}\nelse {\n  c();\n}\n", "xs\n  .map(f);\n"]
        );
    }

    #[test]
    fn test_braces_in_strings_do_not_count() {
        let src = "var s = \"{\";\nvar t = 2;\n";
        assert_eq!(texts(src).len(), 2);
    }

    #[test]
    fn test_blank_lines_split_at_depth_zero_only() {
        let src = "var a = 1\n\nvar b = {\n\n  k: 1\n};\n";
        let blocks = split_into_blocks(src);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].line, 1);
        assert_eq!(blocks[1].line, 3);
    }

    #[test]
    fn test_unbalanced_block_keeps_going() {
        let src = "function broken() {\n  if (x {\n}\nvar ok = 1;\n";
        let blocks = split_into_blocks(src);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].text.contains("var ok"));
    }
}
