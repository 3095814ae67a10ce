//! Map initialiser and collection declaration repairs.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{replace_code, replace_code_with, RepairRule};
use crate::scan::{code_mask, find_matching};

static UNTYPED_MAP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bObject(\s+\w+\s*=\s*new\s+(?:Linked)?HashMap<)").expect("valid regex")
});
static MAP_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"new\s+(?:Linked)?HashMap<[^>]*>\(\)\s*\{").expect("valid regex")
});
static PUT_AFTER_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{[ \t]*(put\()").expect("valid regex"));
static CLOSE_AFTER_PUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r";[ \t]*\}\}").expect("valid regex"));
static PUT_AFTER_PUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\);[ \t]*put\(").expect("valid regex"));

static SCALAR_AS_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(int|double|boolean|long|float|String)\s+(\w+)\s*=\s*Arrays\.asList\(([^;]*)\);")
        .expect("valid regex")
});
static SCALAR_NEW_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(int|double|boolean|long|float|String)(\s+\w+\s*=\s*new\s+ArrayList<)")
        .expect("valid regex")
});
static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+(?:\.\d+)?[lLdDfF]?$").expect("valid regex"));

/// Keyed-map declarations and double-brace initialisers.
///
/// - `Object x = new HashMap<..>` is declared as `Map<String, Object>`;
/// - a single-brace initialiser body is restored to `{{ .. }}`;
/// - `put(..)` calls sharing a line with `{{`, `}}` or each other are split
///   onto their own lines.
pub struct MapBlocks;

impl RepairRule for MapBlocks {
    fn name(&self) -> &'static str {
        "repair-map-blocks"
    }

    fn applies(&self, text: &str) -> bool {
        text.contains("HashMap") || text.contains("put(")
    }

    fn rewrite(&self, text: &str) -> String {
        let text = replace_code(text, &UNTYPED_MAP, "Map<String, Object>$1");
        let text = double_braced(&text);
        let text = replace_code(&text, &PUT_AFTER_OPEN, "{{\n$1");
        let text = replace_code(&text, &CLOSE_AFTER_PUT, ";\n}}");
        replace_code(&text, &PUT_AFTER_PUT, ");\nput(")
    }
}

/// `new HashMap<..>() { put(..); }` becomes `new HashMap<..>() {{ put(..); }}`.
fn double_braced(text: &str) -> String {
    let mut text = text.to_string();
    let mut from = 0;
    while let Some(found) = MAP_OPEN.find_at(&text, from) {
        let open = found.end() - 1;
        from = found.end();
        let mask = code_mask(&text);
        if !mask[found.start()] || text[open + 1..].starts_with('{') {
            continue;
        }
        let Some(close) = find_matching(&text, open) else {
            continue;
        };
        if !text[open + 1..close].trim_start().starts_with("put(") {
            continue;
        }
        text.insert(close, '}');
        text.insert(open, '{');
        from = close + 2;
    }
    text
}

/// Scalar declarations that actually hold collections.
///
/// - `int x = Arrays.asList(1, 2)` becomes `int[] x = {1, 2}`; other
///   element kinds become `List<String>` or `List<Object>`;
/// - a primitive or `String` declared with `new ArrayList` becomes the boxed
///   `List`.
pub struct CollectionTypes;

impl RepairRule for CollectionTypes {
    fn name(&self) -> &'static str {
        "repair-collection-types"
    }

    fn applies(&self, text: &str) -> bool {
        text.contains("Arrays.asList") || text.contains("ArrayList")
    }

    fn rewrite(&self, text: &str) -> String {
        let text = replace_code_with(text, &SCALAR_AS_LIST, scalar_list);
        replace_code_with(&text, &SCALAR_NEW_LIST, |caps, out| {
            out.push_str(&format!("List<{}>{}", boxed(&caps[1]), &caps[2]));
        })
    }
}

fn boxed(primitive: &str) -> &str {
    match primitive {
        "int" => "Integer",
        "double" => "Double",
        "boolean" => "Boolean",
        "long" => "Long",
        "float" => "Float",
        other => other,
    }
}

fn scalar_list(caps: &Captures<'_>, out: &mut String) {
    let (ty, name, items) = (&caps[1], &caps[2], &caps[3]);
    let numeric =
        !items.trim().is_empty() && items.split(',').all(|item| NUMBER.is_match(item.trim()));
    let declaration = match ty {
        "int" | "long" | "double" | "float" if numeric => format!("{ty}[] {name} = {{{items}}};"),
        "String" => format!("List<String> {name} = Arrays.asList({items});"),
        _ => format!("List<Object> {name} = Arrays.asList({items});"),
    };
    out.push_str(&declaration);
}
