//! Source-to-source rewrites that bring modern JavaScript down to the subset
//! the translators understand.
//!
//! Passes run in a fixed order, each over the output of the previous one:
//! module syntax, block-scoped bindings, arrow functions, `for`-`of` loops,
//! template literals, then classes. A pass that cannot find a balanced
//! closing bracket leaves the rest of the text alone.

mod arrow;
mod class;
mod template;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::scan::{code_mask, map_code};

pub use arrow::rewrite_arrows;
pub use class::rewrite_classes;
pub use template::rewrite_templates;

/// Run every normalization pass.
pub fn normalize(source: &str) -> String {
    let passes: [(&str, fn(&str) -> String); 6] = [
        ("modules", strip_modules),
        ("bindings", rewrite_bindings),
        ("arrows", rewrite_arrows),
        ("for-of", rewrite_for_of),
        ("templates", rewrite_templates),
        ("classes", rewrite_classes),
    ];

    let mut text = source.to_string();
    for (name, pass) in passes {
        let next = pass(&text);
        if next != text {
            debug!(pass = name, "normalization applied");
            text = next;
        }
    }
    text
}

// -----------------------------------------------------------------------------
// Modules
// -----------------------------------------------------------------------------

static IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?m)^([ \t]*)import\s+(?:[\w$*{}\s,]+?\s+from\s+)?['"]([^'"\n]+)['"][ \t]*;?"#,
    )
    .expect("valid regex")
});
static EXPORT_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^([ \t]*)export\s*(?:\*|\{[^}]*\})\s*(?:from\s*['"][^'"\n]*['"])?[ \t]*;?"#)
        .expect("valid regex")
});
static EXPORT_DEFAULT_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)export\s+default\s+(async\s+function|function|class)\b")
        .expect("valid regex")
});
static EXPORT_DEFAULT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)export\s+default\s+").expect("valid regex")
});
static EXPORT_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)export\s+(async\s+function|function|class|var|let|const)\b")
        .expect("valid regex")
});

/// Replace imports with comments and drop `export` keywords.
pub fn strip_modules(source: &str) -> String {
    let text = IMPORT.replace_all(source, |caps: &Captures| {
        format!("{}// import removed: {}", &caps[1], &caps[2])
    });
    let text = EXPORT_LIST.replace_all(&text, "${1}// export removed");
    let text = EXPORT_DEFAULT_DECL.replace_all(&text, "$1$2");
    let text = EXPORT_DEFAULT.replace_all(&text, "${1}var defaultExport = ");
    EXPORT_DECL.replace_all(&text, "$1$2").into_owned()
}

// -----------------------------------------------------------------------------
// Bindings
// -----------------------------------------------------------------------------

static BLOCK_SCOPED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:let|const)\s+([A-Za-z_$\[{])").expect("valid regex"));

/// `let`/`const` become `var`, outside literals and comments.
pub fn rewrite_bindings(source: &str) -> String {
    map_code(source, |code| {
        BLOCK_SCOPED.replace_all(code, "var $1").into_owned()
    })
}

// -----------------------------------------------------------------------------
// for-of
// -----------------------------------------------------------------------------

static FOR_OF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"for\s*\(\s*(?:var|let|const)?\s*([A-Za-z_$][\w$]*)\s+of\s+([A-Za-z_$][\w$.]*)\s*\)\s*\{",
    )
    .expect("valid regex")
});

/// `for (x of seq) {` becomes an index loop over `seq` with `x_index`.
pub fn rewrite_for_of(source: &str) -> String {
    let mask = code_mask(source);
    let mut out = String::with_capacity(source.len());
    let mut copied = 0;

    for caps in FOR_OF.captures_iter(source) {
        let Some(whole) = caps.get(0) else { continue };
        if !mask[whole.start()] {
            continue;
        }
        let (item, seq) = (&caps[1], &caps[2]);
        let line_start = source[..whole.start()].rfind('\n').map_or(0, |i| i + 1);
        let indent: String = source[line_start..]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect();

        out.push_str(&source[copied..whole.start()]);
        out.push_str(&format!(
            "for (var {item}_index = 0; {item}_index < {seq}.length; {item}_index++) {{\n{indent}    var {item} = {seq}[{item}_index];"
        ));
        copied = whole.end();
    }
    out.push_str(&source[copied..]);
    out
}
