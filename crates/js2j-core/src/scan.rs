//! Lexical scanning shared by the text-level passes.
//!
//! JavaScript and the generated Java agree closely enough on string and
//! comment syntax that one byte-level lexer serves both. Only ASCII bytes are
//! significant, so UTF-8 continuation bytes never confuse it.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Region {
    Code,
    /// A `'`, `"` or `` ` `` quoted literal, quotes included.
    Quoted,
    Comment,
}

/// Split `src` into contiguous runs of code, quoted literals and comments.
pub(crate) fn regions(src: &str) -> Vec<(Region, Range<usize>)> {
    let bytes = src.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    let mut i = 0;

    fn push(out: &mut Vec<(Region, Range<usize>)>, region: Region, range: Range<usize>) {
        if !range.is_empty() {
            out.push((region, range));
        }
    }

    while i < bytes.len() {
        let (region, end) = match bytes[i] {
            b'"' | b'\'' | b'`' => (Region::Quoted, skip_quoted(bytes, i)),
            b'/' if bytes.get(i + 1) == Some(&b'/') => (Region::Comment, skip_line_comment(bytes, i)),
            b'/' if bytes.get(i + 1) == Some(&b'*') => (Region::Comment, skip_block_comment(bytes, i)),
            _ => {
                i += 1;
                continue;
            }
        };
        push(&mut out, Region::Code, start..i);
        push(&mut out, region, i..end);
        i = end;
        start = end;
    }
    push(&mut out, Region::Code, start..bytes.len());
    out
}

/// Per-byte flag: `true` where the byte is code.
pub(crate) fn code_mask(src: &str) -> Vec<bool> {
    let mut mask = vec![false; src.len()];
    for (region, range) in regions(src) {
        if region == Region::Code {
            mask[range].fill(true);
        }
    }
    mask
}

/// Apply `rewrite` to every code run, leaving literals and comments intact.
pub(crate) fn map_code(src: &str, rewrite: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(src.len());
    for (region, range) in regions(src) {
        match region {
            Region::Code => out.push_str(&rewrite(&src[range])),
            _ => out.push_str(&src[range]),
        }
    }
    out
}

/// Index just past the literal opened at `open`. Plain quotes stop at an
/// unescaped newline; backticks may span lines.
pub(crate) fn skip_quoted(bytes: &[u8], open: usize) -> usize {
    let quote = bytes[open];
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' if quote != b'`' => return i,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn skip_line_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |offset| start + offset)
}

fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start + 2..]
        .windows(2)
        .position(|w| w == b"*/")
        .map_or(bytes.len(), |offset| start + 2 + offset + 2)
}

/// Index of the bracket closing the one at `open` (`{`, `(` or `[`), skipping
/// literals and comments.
pub(crate) fn find_matching(src: &str, open: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    let (opener, closer) = match bytes.get(open)? {
        b'{' => (b'{', b'}'),
        b'(' => (b'(', b')'),
        b'[' => (b'[', b']'),
        _ => return None,
    };

    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' | b'`' => {
                i = skip_quoted(bytes, i);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = skip_line_comment(bytes, i);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_block_comment(bytes, i);
                continue;
            }
            c if c == opener => depth += 1,
            c if c == closer => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index of the bracket opening the one that closes at `close`, scanning
/// backwards over code bytes only.
pub(crate) fn find_matching_back(src: &str, mask: &[bool], close: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    let (opener, closer) = match bytes.get(close)? {
        b')' => (b'(', b')'),
        b']' => (b'[', b']'),
        b'}' => (b'{', b'}'),
        _ => return None,
    };

    let mut depth = 0usize;
    let mut i = close + 1;
    while i > 0 {
        i -= 1;
        if !mask[i] {
            continue;
        }
        if bytes[i] == closer {
            depth += 1;
        } else if bytes[i] == opener {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Net `{` minus `}` over code bytes.
pub(crate) fn brace_balance(src: &str) -> i64 {
    let bytes = src.as_bytes();
    regions(src)
        .into_iter()
        .filter(|(region, _)| *region == Region::Code)
        .flat_map(|(_, range)| bytes[range].iter())
        .map(|&b| match b {
            b'{' => 1,
            b'}' => -1,
            _ => 0,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regions_split_literals_and_comments() {
        let src = "a = \"x{\"; // c {\nb";
        let kinds: Vec<Region> = regions(src).into_iter().map(|(r, _)| r).collect();
        assert_eq!(
            kinds,
            vec![Region::Code, Region::Quoted, Region::Code, Region::Comment, Region::Code]
        );
    }

    #[test]
    fn test_map_code_skips_strings() {
        let out = map_code("let a = 'let b';", |code| code.replace("let", "var"));
        assert_eq!(out, "var a = 'let b';");
    }

    #[test]
    fn test_find_matching_ignores_braces_in_strings() {
        let src = "{ a = \"}\"; { b } }";
        assert_eq!(find_matching(src, 0), Some(src.len() - 1));
        assert_eq!(find_matching(src, 11), Some(15));
    }

    #[test]
    fn test_find_matching_unbalanced() {
        assert_eq!(find_matching("{ { }", 0), None);
    }

    #[test]
    fn test_find_matching_back() {
        let src = "f(a, (b)) => 1";
        let mask = code_mask(src);
        assert_eq!(find_matching_back(src, &mask, 8), Some(1));
    }

    #[test]
    fn test_brace_balance() {
        assert_eq!(brace_balance("{ } }"), -1);
        assert_eq!(brace_balance("{ \"}\" // }\n"), 1);
    }
}
