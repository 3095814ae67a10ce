//! Identifier and literal spelling.

use std::collections::HashSet;

/// Java reserved words that are legal JavaScript identifiers.
fn java_keywords() -> HashSet<&'static str> {
    [
        "abstract", "assert", "boolean", "byte", "char", "class", "const", "double", "enum",
        "extends", "final", "float", "goto", "implements", "import", "instanceof", "int",
        "interface", "long", "native", "package", "private", "protected", "public", "short",
        "static", "strictfp", "synchronized", "throws", "transient", "volatile", "_",
    ]
    .into_iter()
    .collect()
}

/// Convert a JavaScript identifier to a safe Java identifier.
pub fn to_java_name(name: &str) -> String {
    let keywords = java_keywords();

    // Replace invalid characters with _
    let mut safe: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if safe.is_empty() || safe.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        safe = format!("_{}", safe);
    }

    if keywords.contains(safe.as_str()) {
        format!("_{}", safe)
    } else {
        safe
    }
}

/// Quote and escape a string as a Java string literal.
pub fn java_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
