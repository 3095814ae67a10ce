//! Heuristic type inference.
//!
//! Every translator asks [`infer`] for types. Signals are tried in precedence
//! order: the shape of a literal (or an already-declared binding) beats
//! naming conventions, which beat scanning a function body. When nothing
//! matches the answer is [`TypeTag::Any`]. Nothing here is sound, and two
//! uses of one name may well get different answers.

use indexmap::IndexMap;
use js2j_ir::{BinaryOp, LogicalOp, SourceNode, TypeTag, UnaryOp};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::number::java_number;

/// What the caller knows about the thing being typed.
#[derive(Debug, Clone, Copy)]
pub enum Signal<'a> {
    /// The shape of an expression.
    Literal(&'a SourceNode),
    /// Naming conventions of a variable, parameter or field.
    Binding(&'a str),
    /// Naming conventions of a function, then `return`s in its body text.
    Method { name: &'a str, body: &'a str },
    /// A declaration: the initializer's shape, then the binding name.
    Declaration {
        name: &'a str,
        init: Option<&'a SourceNode>,
    },
    /// A function parameter: call-site arguments, then how the body uses
    /// it, then its name.
    Parameter {
        function: &'a str,
        index: usize,
        name: &'a str,
        body: &'a [SourceNode],
    },
    /// A function result. `returns` holds the values of value-returning
    /// `return` statements, in source order.
    Result {
        name: &'a str,
        returns: &'a [&'a SourceNode],
        body: &'a str,
    },
}

pub fn infer(signal: Signal<'_>, ctx: &InferenceContext) -> TypeTag {
    match signal {
        Signal::Literal(node) => literal_shape(node, ctx),
        Signal::Binding(name) => binding_type(name),
        Signal::Method { name, body } => method_type(name, body),
        Signal::Declaration { name, init } => {
            let shape = init.map_or(TypeTag::Any, |init| literal_shape(init, ctx));
            if shape.is_any() {
                binding_type(name)
            } else {
                shape
            }
        }
        Signal::Parameter {
            function,
            index,
            name,
            body,
        } => parameter_type(function, index, name, body, ctx),
        Signal::Result {
            name,
            returns,
            body,
        } => {
            let Some(first) = returns.first() else {
                return TypeTag::Void;
            };
            let shape = literal_shape(first, ctx);
            if shape.is_any() {
                method_type(name, body)
            } else {
                shape
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Context
// -----------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Binding {
    ty: TypeTag,
    closure: bool,
}

/// Types of the bindings seen so far in one translation unit.
///
/// A stack of scopes: functions push one so their parameters do not leak into
/// siblings. The outermost scope is never popped. Class fields are declared
/// as `this.<field>`.
#[derive(Debug, Clone)]
pub struct InferenceContext {
    scopes: Vec<IndexMap<String, Binding>>,
    functions: IndexMap<String, TypeTag>,
    /// Argument types seen at call sites, per function and position.
    arguments: IndexMap<String, Vec<TypeTag>>,
}

impl Default for InferenceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceContext {
    pub fn new() -> Self {
        Self {
            scopes: vec![IndexMap::new()],
            functions: IndexMap::new(),
            arguments: IndexMap::new(),
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(IndexMap::new());
    }

    pub fn exit_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn declare(&mut self, name: impl Into<String>, ty: TypeTag) {
        self.insert(name.into(), ty, false);
    }

    /// Declare a binding that holds a translated closure.
    pub fn declare_closure(&mut self, name: impl Into<String>) {
        self.insert(name.into(), TypeTag::Any, true);
    }

    fn insert(&mut self, name: String, ty: TypeTag, closure: bool) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, Binding { ty, closure });
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&TypeTag> {
        self.binding(name).map(|binding| &binding.ty)
    }

    pub fn is_closure(&self, name: &str) -> bool {
        self.binding(name).is_some_and(|binding| binding.closure)
    }

    fn binding(&self, name: &str) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn declare_function(&mut self, name: impl Into<String>, ty: TypeTag) {
        self.functions.insert(name.into(), ty);
    }

    pub fn function_type(&self, name: &str) -> Option<&TypeTag> {
        self.functions.get(name)
    }

    /// Record the argument types of one call. A position keeps the first
    /// type that is not `Any`.
    pub fn declare_call(&mut self, function: impl Into<String>, args: Vec<TypeTag>) {
        let known = self.arguments.entry(function.into()).or_default();
        for (index, ty) in args.into_iter().enumerate() {
            match known.get_mut(index) {
                Some(slot) if slot.is_any() => *slot = ty,
                Some(_) => {}
                None => known.push(ty),
            }
        }
    }

    pub fn argument_type(&self, function: &str, index: usize) -> Option<&TypeTag> {
        self.arguments
            .get(function)
            .and_then(|args| args.get(index))
            .filter(|ty| !ty.is_any())
    }
}

// -----------------------------------------------------------------------------
// Literal shapes
// -----------------------------------------------------------------------------

fn literal_shape(node: &SourceNode, ctx: &InferenceContext) -> TypeTag {
    match node {
        SourceNode::Text { .. } => TypeTag::Text,
        SourceNode::Number { raw } => number_type(raw),
        SourceNode::Boolean { .. } => TypeTag::Boolean,
        SourceNode::Array { elements } => TypeTag::list_of(element_type(elements, ctx)),
        SourceNode::Object { .. } => TypeTag::KeyedMap,
        SourceNode::Identifier { name } => ctx.lookup(name).cloned().unwrap_or(TypeTag::Any),
        SourceNode::Member { object, property } => match (object.as_ref(), property.as_str()) {
            (SourceNode::This, field) => ctx
                .lookup(&format!("this.{field}"))
                .cloned()
                .unwrap_or(TypeTag::Any),
            (_, "length") => TypeTag::Integer,
            _ => TypeTag::Any,
        },
        SourceNode::Binary { op, left, right } => {
            binary_shape(*op, literal_shape(left, ctx), literal_shape(right, ctx))
        }
        SourceNode::Logical { op, left, right } => {
            let (left, right) = (literal_shape(left, ctx), literal_shape(right, ctx));
            match op {
                LogicalOp::And | LogicalOp::Or if left == TypeTag::Boolean && left == right => {
                    TypeTag::Boolean
                }
                LogicalOp::Nullish if left == right => left,
                _ => TypeTag::Any,
            }
        }
        SourceNode::Unary { op, operand } => match op {
            UnaryOp::Not => TypeTag::Boolean,
            UnaryOp::TypeOf => TypeTag::Text,
            UnaryOp::BitNot => TypeTag::Integer,
            UnaryOp::Neg | UnaryOp::Plus => {
                let inner = literal_shape(operand, ctx);
                if inner.is_numeric() { inner } else { TypeTag::Any }
            }
            UnaryOp::Void | UnaryOp::Delete => TypeTag::Any,
        },
        SourceNode::Update { operand, .. } => literal_shape(operand, ctx),
        SourceNode::Assign { value, .. } => literal_shape(value, ctx),
        SourceNode::Conditional {
            consequent,
            alternate,
            ..
        } => {
            let then = literal_shape(consequent, ctx);
            if then == literal_shape(alternate, ctx) {
                then
            } else {
                TypeTag::Any
            }
        }
        SourceNode::Call { callee, .. } => call_shape(callee, ctx),
        _ => TypeTag::Any,
    }
}

fn number_type(raw: &str) -> TypeTag {
    java_number(raw).type_tag()
}

fn element_type(elements: &[SourceNode], ctx: &InferenceContext) -> TypeTag {
    let mut shapes = elements.iter().map(|element| literal_shape(element, ctx));
    let Some(first) = shapes.next() else {
        return TypeTag::Any;
    };
    if shapes.all(|shape| shape == first) {
        first
    } else {
        TypeTag::Any
    }
}

fn binary_shape(op: BinaryOp, left: TypeTag, right: TypeTag) -> TypeTag {
    match op {
        BinaryOp::Add if left == TypeTag::Text || right == TypeTag::Text => TypeTag::Text,
        BinaryOp::Pow if left.is_numeric() && right.is_numeric() => TypeTag::Real,
        op if op.is_comparison() => TypeTag::Boolean,
        BinaryOp::In | BinaryOp::InstanceOf => TypeTag::Boolean,
        BinaryOp::BitAnd
        | BinaryOp::BitOr
        | BinaryOp::BitXor
        | BinaryOp::Shl
        | BinaryOp::Shr
        | BinaryOp::UShr => TypeTag::Integer,
        _ if left.is_numeric() && right.is_numeric() => {
            if left == TypeTag::Real || right == TypeTag::Real {
                TypeTag::Real
            } else {
                TypeTag::Integer
            }
        }
        _ => TypeTag::Any,
    }
}

fn call_shape(callee: &SourceNode, ctx: &InferenceContext) -> TypeTag {
    let known = match callee {
        SourceNode::Identifier { name } => ctx.function_type(name).cloned(),
        SourceNode::Member { property, .. } => match property.as_str() {
            "toString" | "toUpperCase" | "toLowerCase" | "trim" | "join" | "substring"
            | "charAt" | "toFixed" => Some(TypeTag::Text),
            "indexOf" | "lastIndexOf" => Some(TypeTag::Integer),
            "includes" | "startsWith" | "endsWith" => Some(TypeTag::Boolean),
            _ => None,
        },
        _ => None,
    };
    match known {
        Some(TypeTag::Void) | None => TypeTag::Any,
        Some(ty) => ty,
    }
}

// -----------------------------------------------------------------------------
// Naming conventions
// -----------------------------------------------------------------------------

/// `name` starts with `prefix` followed by an uppercase letter or `_`.
fn has_word_prefix(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_uppercase() || c == '_')
}

fn has_word_suffix(name: &str, suffix: &str) -> bool {
    name.len() > suffix.len() && name.ends_with(suffix)
}

fn binding_type(name: &str) -> TypeTag {
    if ["is", "has", "can", "should"]
        .iter()
        .any(|prefix| has_word_prefix(name, prefix))
        || matches!(name, "enabled" | "visible")
    {
        return TypeTag::Boolean;
    }

    if ["List", "Array", "Collection", "Set", "Items"]
        .iter()
        .any(|suffix| has_word_suffix(name, suffix))
        || matches!(name, "items" | "elements" | "list" | "array")
    {
        return TypeTag::list_of(TypeTag::Any);
    }

    if ["Name", "Text", "Message", "Label", "Title", "Str", "Description"]
        .iter()
        .any(|suffix| has_word_suffix(name, suffix))
        || matches!(
            name,
            "greeting" | "name" | "text" | "message" | "str" | "label" | "title" | "description"
        )
    {
        return TypeTag::Text;
    }

    if ["Count", "Index", "Size", "Length"]
        .iter()
        .any(|suffix| has_word_suffix(name, suffix))
        || name.starts_with("num")
        || matches!(
            name,
            "count" | "sum" | "total" | "index" | "i" | "j" | "k" | "n" | "len" | "length" | "size"
        )
    {
        return TypeTag::Integer;
    }

    TypeTag::Any
}

/// Members that only make sense on a sequence.
const SEQUENCE_MEMBERS: &[&str] = &[
    "length", "push", "pop", "shift", "includes", "indexOf", "forEach", "map", "filter",
];

fn parameter_type(
    function: &str,
    index: usize,
    name: &str,
    body: &[SourceNode],
    ctx: &InferenceContext,
) -> TypeTag {
    if let Some(argument) = ctx.argument_type(function, index) {
        return argument.clone();
    }
    let named = binding_type(name);
    if named == TypeTag::Text || !used_as_sequence(name, body) {
        return named;
    }
    match named {
        TypeTag::OrderedList(_) => named,
        scalar if scalar.is_primitive() => TypeTag::list_of(scalar),
        _ => TypeTag::list_of(TypeTag::Any),
    }
}

/// `name.length`, `name.push(..)` or `name[i]` with a non-text index.
fn used_as_sequence(name: &str, body: &[SourceNode]) -> bool {
    let mut found = false;
    for node in body {
        node.visit(&mut |node| {
            found |= match node {
                SourceNode::Member { object, property } => {
                    object.as_identifier() == Some(name)
                        && SEQUENCE_MEMBERS.contains(&property.as_str())
                }
                SourceNode::Index { object, index } => {
                    object.as_identifier() == Some(name)
                        && !matches!(**index, SourceNode::Text { .. })
                }
                _ => false,
            };
        });
    }
    found
}

static RETURN_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\breturn\b([^;]*)").expect("valid regex"));
static BOOLEAN_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:true|false)\b").expect("valid regex"));
static NUMERIC_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[+\-*/%]|\b(?:sum|count|total|index)\b").expect("valid regex")
});

fn method_type(name: &str, body: &str) -> TypeTag {
    if let Some(prop) = name.strip_prefix("get").filter(|_| has_word_prefix(name, "get")) {
        let mut chars = prop.chars();
        let prop = match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        let ty = binding_type(&prop);
        if !ty.is_any() {
            return ty;
        }
    }

    if ["is", "has", "can", "should"]
        .iter()
        .any(|prefix| has_word_prefix(name, prefix))
    {
        return TypeTag::Boolean;
    }
    if ["calculate", "compute", "count"]
        .iter()
        .any(|prefix| name.starts_with(prefix))
        || matches!(name, "add" | "subtract" | "multiply" | "sum")
    {
        return TypeTag::Integer;
    }
    if ["say", "format", "convert", "describe"]
        .iter()
        .any(|prefix| name.starts_with(prefix))
        || name == "toString"
        || ["Name", "Text", "Message"]
            .iter()
            .any(|part| name.contains(part))
    {
        return TypeTag::Text;
    }

    body_type(body)
}

/// Classify a function by what its `return` statements return.
fn body_type(body: &str) -> TypeTag {
    let returned: Vec<&str> = RETURN_VALUE
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|value| !value.is_empty())
        .collect();

    if returned.iter().any(|value| value.contains(['"', '\''])) {
        TypeTag::Text
    } else if returned.iter().any(|value| BOOLEAN_WORD.is_match(value)) {
        TypeTag::Boolean
    } else if returned.iter().any(|value| NUMERIC_TOKEN.is_match(value)) {
        TypeTag::Integer
    } else {
        TypeTag::Any
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(node: SourceNode) -> TypeTag {
        infer(Signal::Literal(&node), &InferenceContext::new())
    }

    fn named(name: &str) -> TypeTag {
        infer(Signal::Binding(name), &InferenceContext::new())
    }

    #[test]
    fn test_literal_shapes() {
        assert_eq!(shape(SourceNode::text("hi")), TypeTag::Text);
        assert_eq!(shape(SourceNode::number("3.14")), TypeTag::Real);
        assert_eq!(shape(SourceNode::number("42")), TypeTag::Integer);
        assert_eq!(shape(SourceNode::number("0xff")), TypeTag::Integer);
        assert_eq!(shape(SourceNode::Boolean { value: false }), TypeTag::Boolean);
        assert_eq!(shape(SourceNode::Null), TypeTag::Any);
        assert_eq!(
            shape(SourceNode::Object { properties: vec![] }),
            TypeTag::KeyedMap
        );
    }

    #[test]
    fn test_array_element_types() {
        let ints = SourceNode::Array {
            elements: vec![SourceNode::number("1"), SourceNode::number("2")],
        };
        assert_eq!(shape(ints), TypeTag::list_of(TypeTag::Integer));
        let mixed = SourceNode::Array {
            elements: vec![SourceNode::number("1"), SourceNode::text("a")],
        };
        assert_eq!(shape(mixed), TypeTag::list_of(TypeTag::Any));
    }

    #[test]
    fn test_concatenation_with_text_is_text() {
        let node = SourceNode::Binary {
            op: BinaryOp::Add,
            left: Box::new(SourceNode::text("Hello, ")),
            right: Box::new(SourceNode::identifier("who")),
        };
        assert_eq!(shape(node), TypeTag::Text);
    }

    #[test]
    fn test_name_heuristics() {
        assert_eq!(named("isReady"), TypeTag::Boolean);
        assert_eq!(named("island"), TypeTag::Any);
        assert_eq!(named("userList"), TypeTag::list_of(TypeTag::Any));
        assert_eq!(named("firstName"), TypeTag::Text);
        assert_eq!(named("greeting"), TypeTag::Text);
        assert_eq!(named("numbers"), TypeTag::Integer);
        assert_eq!(named("itemCount"), TypeTag::Integer);
        assert_eq!(named("total"), TypeTag::Integer);
        assert_eq!(named("payload"), TypeTag::Any);
    }

    #[test]
    fn test_literal_beats_name() {
        let ctx = InferenceContext::new();
        let init = SourceNode::text("3");
        let ty = infer(
            Signal::Declaration {
                name: "count",
                init: Some(&init),
            },
            &ctx,
        );
        assert_eq!(ty, TypeTag::Text);
        let ty = infer(
            Signal::Declaration {
                name: "count",
                init: Some(&SourceNode::Null),
            },
            &ctx,
        );
        assert_eq!(ty, TypeTag::Integer);
    }

    #[test]
    fn test_context_lookup_and_scopes() {
        let mut ctx = InferenceContext::new();
        ctx.declare("total", TypeTag::Real);
        ctx.enter_scope();
        ctx.declare("x", TypeTag::Text);
        assert_eq!(
            infer(Signal::Literal(&SourceNode::identifier("x")), &ctx),
            TypeTag::Text
        );
        assert_eq!(ctx.lookup("total"), Some(&TypeTag::Real));
        ctx.exit_scope();
        assert_eq!(ctx.lookup("x"), None);
        ctx.exit_scope();
        assert_eq!(ctx.depth(), 1);
        assert_eq!(ctx.lookup("total"), Some(&TypeTag::Real));
    }

    #[test]
    fn test_method_names() {
        let ctx = InferenceContext::new();
        let method = |name| infer(Signal::Method { name, body: "{}" }, &ctx);
        assert_eq!(method("getFullName"), TypeTag::Text);
        assert_eq!(method("getCount"), TypeTag::Integer);
        assert_eq!(method("hasAccess"), TypeTag::Boolean);
        assert_eq!(method("calculateTotal"), TypeTag::Integer);
        assert_eq!(method("sayHello"), TypeTag::Text);
        assert_eq!(method("formatDate"), TypeTag::Text);
        assert_eq!(method("run"), TypeTag::Any);
    }

    #[test]
    fn test_body_scan() {
        let ctx = InferenceContext::new();
        let body = |body| infer(Signal::Method { name: "run", body }, &ctx);
        assert_eq!(body("{ return 'x' + y; }"), TypeTag::Text);
        assert_eq!(body("{ if (a) { return true; } return false; }"), TypeTag::Boolean);
        assert_eq!(body("{ return a - b; }"), TypeTag::Integer);
        assert_eq!(body("{ return; }"), TypeTag::Any);
    }

    #[test]
    fn test_result_without_value_is_void() {
        let ctx = InferenceContext::new();
        let ty = infer(
            Signal::Result {
                name: "getName",
                returns: &[],
                body: "{ return; }",
            },
            &ctx,
        );
        assert_eq!(ty, TypeTag::Void);
    }

    #[test]
    fn test_result_uses_context() {
        let mut ctx = InferenceContext::new();
        ctx.declare("sum", TypeTag::Integer);
        let sum = SourceNode::identifier("sum");
        let ty = infer(
            Signal::Result {
                name: "run",
                returns: &[&sum],
                body: "{ return sum; }",
            },
            &ctx,
        );
        assert_eq!(ty, TypeTag::Integer);
    }
}
