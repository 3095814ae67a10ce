//! Class declarations to constructor functions plus prototype assignments.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::scan::{code_mask, find_matching};

static CLASS_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bclass\s+([A-Za-z_$][\w$]*)(?:\s+extends\s+([A-Za-z_$][\w$.]*))?\s*\{")
        .expect("valid regex")
});
static METHOD_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(static\s+)?(?:async\s+)?(?:(get|set)\s+)?\*?\s*(#?[A-Za-z_$][\w$]*)\s*\(")
        .expect("valid regex")
});
static FIELD_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(static\s+)?(#?[A-Za-z_$][\w$]*)[ \t]*(=|;|\n|$)").expect("valid regex")
});
static SUPER_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bsuper\s*\(").expect("valid regex"));
static SUPER_METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bsuper\.([A-Za-z_$][\w$]*)\s*\(").expect("valid regex")
});
static EMPTY_CALL_ARGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.call\(this,\s*\)").expect("valid regex"));

#[derive(Debug, PartialEq)]
enum MemberKind {
    Constructor,
    Method,
    Getter,
    Setter,
    Field,
}

#[derive(Debug)]
struct Member {
    kind: MemberKind,
    is_static: bool,
    name: String,
    params: String,
    /// Method body with braces, or a field initializer.
    body: String,
}

/// Rewrite every `class` declaration whose body can be split into members.
pub fn rewrite_classes(source: &str) -> String {
    let mut text = source.to_string();
    let mut search_from = 0;

    while search_from < text.len() {
        let mask = code_mask(&text);
        let Some(caps) = CLASS_HEAD
            .captures_iter(&text[search_from..])
            .find(|caps| caps.get(0).is_some_and(|m| mask[search_from + m.start()]))
        else {
            break;
        };
        let Some(head) = caps.get(0) else { break };
        let start = search_from + head.start();
        let open = search_from + head.end() - 1;
        let Some(close) = find_matching(&text, open) else {
            break;
        };
        let name = caps[1].to_string();
        let base = caps.get(2).map(|m| m.as_str().to_string());

        let Some(members) = parse_members(&text[open + 1..close]) else {
            search_from = close + 1;
            continue;
        };

        let line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
        let indent: String = text[line_start..]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect();
        let rendered = render_class(&name, base.as_deref(), members, &indent);

        let mut end = close + 1;
        // a trailing `;` after a class body is noise
        if text[end..].starts_with(';') {
            end += 1;
        }
        text.replace_range(start..end, &rendered);
        search_from = start + rendered.len();
    }
    text
}

fn parse_members(body: &str) -> Option<Vec<Member>> {
    let bytes = body.as_bytes();
    let mut members = Vec::new();
    let mut i = 0;

    loop {
        i = skip_trivia(body, i);
        if i >= bytes.len() {
            return Some(members);
        }
        let rest = &body[i..];

        if let Some(caps) = METHOD_HEAD.captures(rest) {
            let head = caps.get(0)?;
            let paren = i + head.end() - 1;
            let paren_close = find_matching(body, paren)?;
            let brace = skip_trivia(body, paren_close + 1);
            if bytes.get(brace) != Some(&b'{') {
                return None;
            }
            let brace_close = find_matching(body, brace)?;
            let name = caps[3].trim_start_matches('#').to_string();
            let kind = match caps.get(2).map(|m| m.as_str()) {
                Some("get") => MemberKind::Getter,
                Some("set") => MemberKind::Setter,
                _ if name == "constructor" => MemberKind::Constructor,
                _ => MemberKind::Method,
            };
            members.push(Member {
                kind,
                is_static: caps.get(1).is_some(),
                name,
                params: body[paren + 1..paren_close].trim().to_string(),
                body: body[brace..=brace_close].to_string(),
            });
            i = brace_close + 1;
        } else if let Some(caps) = FIELD_HEAD.captures(rest) {
            let head = caps.get(0)?;
            let name = caps[2].trim_start_matches('#').to_string();
            let (value, next) = if &caps[3] == "=" {
                let value_start = i + head.end();
                let value_end = initializer_end(body, value_start);
                (body[value_start..value_end].trim().to_string(), value_end + 1)
            } else {
                ("undefined".to_string(), i + head.end())
            };
            members.push(Member {
                kind: MemberKind::Field,
                is_static: caps.get(1).is_some(),
                name,
                params: String::new(),
                body: value,
            });
            i = next;
        } else {
            return None;
        }
    }
}

/// Skip whitespace, stray `;` and comments.
fn skip_trivia(text: &str, mut i: usize) -> usize {
    let bytes = text.as_bytes();
    while i < bytes.len() {
        match bytes[i] {
            b if b.is_ascii_whitespace() || b == b';' => i += 1,
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = text[i..].find('\n').map_or(bytes.len(), |offset| i + offset);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = text[i + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |offset| i + 2 + offset + 2);
            }
            _ => break,
        }
    }
    i
}

/// End of a field initializer: `;` or a line break at bracket depth zero.
fn initializer_end(text: &str, start: usize) -> usize {
    let mask = code_mask(text);
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    for i in start..bytes.len() {
        if !mask[i] {
            continue;
        }
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b';' | b'\n' if depth == 0 => return i,
            _ => {}
        }
    }
    bytes.len()
}

fn capitalized(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn resolve_super(body: &str, base: Option<&str>) -> String {
    let Some(base) = base else {
        return body.to_string();
    };
    let body = SUPER_CALL.replace_all(body, format!("{base}.call(this, ").as_str());
    let body = SUPER_METHOD.replace_all(&body, format!("{base}.prototype.$1.call(this, ").as_str());
    let body = EMPTY_CALL_ARGS.replace_all(&body, ".call(this)");
    body.replace("this.#", "this.")
}

fn render_class(name: &str, base: Option<&str>, members: Vec<Member>, indent: &str) -> String {
    let fields: Vec<String> = members
        .iter()
        .filter(|m| m.kind == MemberKind::Field && !m.is_static)
        .map(|m| format!("this.{} = {};", m.name, m.body))
        .collect();

    let constructor = members.iter().find(|m| m.kind == MemberKind::Constructor);
    let (params, ctor_body) = match constructor {
        Some(ctor) => (ctor.params.as_str(), resolve_super(&ctor.body, base)),
        None => match base {
            Some(base) => ("", format!("{{\n{indent}    {base}.call(this);\n{indent}}}")),
            None => ("", format!("{{\n{indent}}}")),
        },
    };
    let ctor_body = with_fields(&ctor_body, base, &fields, indent);

    let mut out = format!("function {name}({params}) {ctor_body}");
    if let Some(base) = base {
        out.push_str(&format!(
            "\n{indent}{name}.prototype = Object.create({base}.prototype);"
        ));
    }

    for member in &members {
        let target = if member.is_static {
            name.to_string()
        } else {
            format!("{name}.prototype")
        };
        let line = match member.kind {
            MemberKind::Constructor => continue,
            MemberKind::Field if member.is_static => {
                format!("{target}.{} = {};", member.name, member.body)
            }
            MemberKind::Field => continue,
            MemberKind::Method => format!(
                "{target}.{} = function({}) {};",
                member.name,
                member.params,
                resolve_super(&member.body, base)
            ),
            MemberKind::Getter | MemberKind::Setter => {
                let prefix = if member.kind == MemberKind::Getter { "get" } else { "set" };
                format!(
                    "{target}.{prefix}{} = function({}) {};",
                    capitalized(&member.name),
                    member.params,
                    resolve_super(&member.body, base)
                )
            }
        };
        out.push('\n');
        out.push_str(indent);
        out.push_str(&line);
    }
    out
}

/// Insert field initializers at the top of a constructor body, after a
/// leading superclass call.
fn with_fields(body: &str, base: Option<&str>, fields: &[String], indent: &str) -> String {
    if fields.is_empty() {
        return body.to_string();
    }
    let inserted: String = fields
        .iter()
        .map(|field| format!("\n{indent}    {field}"))
        .collect();

    let after_open = 1;
    let insert_at = base
        .and_then(|base| {
            let rest = &body[after_open..];
            let trimmed = rest.trim_start();
            let offset = after_open + rest.len() - trimmed.len();
            trimmed
                .starts_with(&format!("{base}.call(this"))
                .then(|| trimmed.find(';').map(|semi| offset + semi + 1))
                .flatten()
        })
        .unwrap_or(after_open);

    let mut out = body.to_string();
    out.insert_str(insert_at, &inserted);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_with_constructor_and_method() {
        let src = "class Person {\n    constructor(a, b) {\n        this.firstName = a;\n    }\n    greet() {\n        return this.firstName;\n    }\n}\n";
        let out = rewrite_classes(src);
        assert_eq!(
            out,
            "function Person(a, b) {\n        this.firstName = a;\n    }\nPerson.prototype.greet = function() {\n        return this.firstName;\n    };\n"
        );
    }

    #[test]
    fn test_extends_and_super() {
        let src = "class Dog extends Animal {\n  constructor(name) {\n    super(name);\n  }\n  speak() {\n    return super.speak();\n  }\n}";
        let out = rewrite_classes(src);
        assert!(out.starts_with("function Dog(name) {\n    Animal.call(this, name);"));
        assert!(out.contains("Dog.prototype = Object.create(Animal.prototype);"));
        assert!(out.contains("return Animal.prototype.speak.call(this);"));
    }

    #[test]
    fn test_static_getter_setter_and_fields() {
        let src = "class Counter {\n  count = 0;\n  static create() { return new Counter(); }\n  get value() { return this.count; }\n  set value(v) { this.count = v; }\n}";
        let out = rewrite_classes(src);
        assert!(out.starts_with("function Counter() {\n    this.count = 0;\n}"));
        assert!(out.contains("Counter.create = function() { return new Counter(); };"));
        assert!(out.contains("Counter.prototype.getValue = function() { return this.count; };"));
        assert!(out.contains("Counter.prototype.setValue = function(v) { this.count = v; };"));
    }

    #[test]
    fn test_class_word_in_string_is_ignored() {
        let src = "var s = \"class A {\";";
        assert_eq!(rewrite_classes(src), src);
    }

    #[test]
    fn test_unbalanced_class_is_left_alone() {
        let src = "class A {\n  f() {\n";
        assert_eq!(rewrite_classes(src), src);
    }
}
