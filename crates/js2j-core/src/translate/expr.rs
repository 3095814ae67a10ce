//! Expression translation.
//!
//! Most node kinds map one to one. The interesting cases are the idioms
//! keyed on a known binding type: maps, lists and strings each spell member
//! access, indexing and `length` differently in Java.

use js2j_ir::{
    AssignOp, BinaryOp, JavaAssignOp, JavaBinaryOp, JavaExpr, JavaUnaryOp, Literal, LogicalOp,
    SourceNode, TypeTag, UnaryOp, UpdateOp,
};

use super::{Scope, UnitTranslator};
use crate::infer::{infer, Signal};
use crate::number::{java_number, JavaNumber};

const FUNCTION_TYPE: &str = "Function<Object[], Object>";
const MAP_TYPE: &str = "Map<String, Object>";

impl UnitTranslator<'_> {
    /// Type of an expression as inference sees it right now.
    pub(crate) fn known(&self, node: &SourceNode) -> TypeTag {
        infer(Signal::Literal(node), &self.ctx)
    }

    pub(crate) fn expr(&mut self, node: &SourceNode, scope: &Scope<'_>) -> JavaExpr {
        match node {
            SourceNode::Text { value } => JavaExpr::string(value.clone()),
            SourceNode::Number { raw } => number_literal(raw),
            SourceNode::Boolean { value } => JavaExpr::Literal {
                value: Literal::Bool(*value),
            },
            SourceNode::Null | SourceNode::Undefined => JavaExpr::null(),
            SourceNode::Identifier { name } => identifier(name),
            SourceNode::This if scope.self_map => JavaExpr::name("self"),
            SourceNode::This => JavaExpr::This,
            SourceNode::Binary { op, left, right } => self.binary(*op, left, right, scope),
            SourceNode::Logical { op, left, right } => self.logical(*op, left, right, scope),
            SourceNode::Unary { op, operand } => self.unary(*op, operand, scope),
            SourceNode::Update {
                op,
                operand,
                operator_start,
                operand_start,
            } => {
                let prefix = operator_start < operand_start;
                let op = match (op, prefix) {
                    (UpdateOp::Increment, true) => JavaUnaryOp::PreIncrement,
                    (UpdateOp::Increment, false) => JavaUnaryOp::PostIncrement,
                    (UpdateOp::Decrement, true) => JavaUnaryOp::PreDecrement,
                    (UpdateOp::Decrement, false) => JavaUnaryOp::PostDecrement,
                };
                JavaExpr::Unary {
                    op,
                    operand: Box::new(self.expr(operand, scope)),
                }
            }
            SourceNode::Assign { op, target, value } => self.assign(*op, target, value, scope),
            SourceNode::Call { callee, args } => self.call(callee, args, scope),
            SourceNode::New { callee, args } => self.new_expr(callee, args, scope),
            SourceNode::Member { object, property } => self.member(object, property, scope),
            SourceNode::Index { object, index } => self.index(object, index, scope),
            SourceNode::Conditional {
                test,
                consequent,
                alternate,
            } => JavaExpr::Conditional {
                test: Box::new(self.condition(test, scope)),
                then: Box::new(self.expr(consequent, scope)),
                otherwise: Box::new(self.expr(alternate, scope)),
            },
            SourceNode::Array { elements } => self.array_literal(elements, scope),
            SourceNode::Object { properties } => self.object_literal(properties, scope),
            SourceNode::Function(function) => self.closure(function, false, scope),
            SourceNode::Unsupported { kind, .. } => JavaExpr::placeholder(kind.clone()),
            SourceNode::Sequence { .. }
            | SourceNode::VarDecl { .. }
            | SourceNode::ExprStmt { .. }
            | SourceNode::Block { .. }
            | SourceNode::If { .. }
            | SourceNode::For { .. }
            | SourceNode::ForIn { .. }
            | SourceNode::While { .. }
            | SourceNode::DoWhile { .. }
            | SourceNode::Switch { .. }
            | SourceNode::Return { .. }
            | SourceNode::Break { .. }
            | SourceNode::Continue { .. }
            | SourceNode::Throw { .. }
            | SourceNode::Try { .. }
            | SourceNode::Empty
            | SourceNode::Comment { .. } => JavaExpr::placeholder(node.kind_name()),
        }
    }

    pub(crate) fn args(&mut self, args: &[SourceNode], scope: &Scope<'_>) -> Vec<JavaExpr> {
        args.iter().map(|arg| self.expr(arg, scope)).collect()
    }

    /// A value headed for a slot of type `target`. An untyped identifier
    /// gets a cast so the assignment type-checks.
    pub(crate) fn coerced(
        &mut self,
        value: &SourceNode,
        target: &TypeTag,
        scope: &Scope<'_>,
    ) -> JavaExpr {
        let expr = self.expr(value, scope);
        let untyped = value
            .as_identifier()
            .is_some_and(|name| self.ctx.lookup(name).is_some_and(TypeTag::is_any));
        if untyped && !target.is_any() && *target != TypeTag::Void {
            JavaExpr::Cast {
                ty: target.java_name(),
                expr: Box::new(expr),
            }
        } else {
            expr
        }
    }

    /// A test position. Known numbers and strings get an explicit truth
    /// test since Java conditions must be boolean.
    pub(crate) fn condition(&mut self, node: &SourceNode, scope: &Scope<'_>) -> JavaExpr {
        let expr = self.expr(node, scope);
        match self.known(node) {
            TypeTag::Integer | TypeTag::Real => {
                JavaExpr::binary(JavaBinaryOp::NotEq, expr, JavaExpr::int("0"))
            }
            TypeTag::Text => JavaExpr::binary(
                JavaBinaryOp::And,
                JavaExpr::binary(JavaBinaryOp::NotEq, expr.clone(), JavaExpr::null()),
                JavaExpr::not(JavaExpr::method(expr, "isEmpty", Vec::new())),
            ),
            _ => expr,
        }
    }

    fn binary(
        &mut self,
        op: BinaryOp,
        left: &SourceNode,
        right: &SourceNode,
        scope: &Scope<'_>,
    ) -> JavaExpr {
        match op {
            BinaryOp::Eq | BinaryOp::StrictEq | BinaryOp::NotEq | BinaryOp::StrictNotEq => {
                let negate = matches!(op, BinaryOp::NotEq | BinaryOp::StrictNotEq);
                let textual = (self.known(left) == TypeTag::Text
                    || self.known(right) == TypeTag::Text)
                    && !is_null(left)
                    && !is_null(right);
                let l = self.comparison_operand(left, right, scope);
                let r = self.comparison_operand(right, left, scope);
                if textual {
                    let equals = JavaExpr::method(JavaExpr::name("Objects"), "equals", vec![l, r]);
                    if negate {
                        JavaExpr::not(equals)
                    } else {
                        equals
                    }
                } else {
                    let op = if negate {
                        JavaBinaryOp::NotEq
                    } else {
                        JavaBinaryOp::Eq
                    };
                    JavaExpr::binary(op, l, r)
                }
            }
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                let l = self.comparison_operand(left, right, scope);
                let r = self.comparison_operand(right, left, scope);
                JavaExpr::binary(java_binary(op).unwrap_or(JavaBinaryOp::Lt), l, r)
            }
            BinaryOp::Pow => {
                let args = vec![self.expr(left, scope), self.expr(right, scope)];
                JavaExpr::method(JavaExpr::name("Math"), "pow", args)
            }
            BinaryOp::In => {
                let key = self.expr(left, scope);
                let map = self.as_map(right, scope);
                JavaExpr::method(map, "containsKey", vec![key])
            }
            BinaryOp::InstanceOf => JavaExpr::InstanceOf {
                expr: Box::new(self.expr(left, scope)),
                class: right
                    .member_path()
                    .map_or_else(|| "Object".to_string(), |path| java_class(&path).to_string()),
            },
            op => match java_binary(op) {
                Some(java) => {
                    JavaExpr::binary(java, self.expr(left, scope), self.expr(right, scope))
                }
                None => JavaExpr::placeholder("Binary"),
            },
        }
    }

    /// `xs.length` compared against an identifier reads the collection size.
    fn comparison_operand(
        &mut self,
        node: &SourceNode,
        other: &SourceNode,
        scope: &Scope<'_>,
    ) -> JavaExpr {
        match node {
            SourceNode::Member { object, property }
                if property == "length" && matches!(other, SourceNode::Identifier { .. }) =>
            {
                let accessor = if self.known(object) == TypeTag::Text {
                    "length"
                } else {
                    "size"
                };
                JavaExpr::method(self.expr(object, scope), accessor, Vec::new())
            }
            _ => self.expr(node, scope),
        }
    }

    fn logical(
        &mut self,
        op: LogicalOp,
        left: &SourceNode,
        right: &SourceNode,
        scope: &Scope<'_>,
    ) -> JavaExpr {
        match op {
            LogicalOp::And | LogicalOp::Or => {
                let java = if op == LogicalOp::And {
                    JavaBinaryOp::And
                } else {
                    JavaBinaryOp::Or
                };
                JavaExpr::binary(java, self.condition(left, scope), self.condition(right, scope))
            }
            LogicalOp::Nullish => {
                let args = vec![self.expr(left, scope), self.expr(right, scope)];
                JavaExpr::method(JavaExpr::name("Objects"), "requireNonNullElse", args)
            }
        }
    }

    fn unary(&mut self, op: UnaryOp, operand: &SourceNode, scope: &Scope<'_>) -> JavaExpr {
        let op = match op {
            UnaryOp::Neg => JavaUnaryOp::Neg,
            UnaryOp::Plus => JavaUnaryOp::Plus,
            UnaryOp::BitNot => JavaUnaryOp::BitNot,
            UnaryOp::Not => return JavaExpr::not(self.condition(operand, scope)),
            UnaryOp::Void => return JavaExpr::null(),
            UnaryOp::TypeOf => return JavaExpr::placeholder("typeof"),
            UnaryOp::Delete => {
                return match operand {
                    SourceNode::Member { object, property } if self.is_map(object, scope) => {
                        let map = self.expr(object, scope);
                        JavaExpr::method(map, "remove", vec![JavaExpr::string(property.clone())])
                    }
                    _ => JavaExpr::placeholder("delete"),
                };
            }
        };
        JavaExpr::Unary {
            op,
            operand: Box::new(self.expr(operand, scope)),
        }
    }

    fn assign(
        &mut self,
        op: AssignOp,
        target: &SourceNode,
        value: &SourceNode,
        scope: &Scope<'_>,
    ) -> JavaExpr {
        if op == AssignOp::Assign {
            match target {
                SourceNode::Member { object, property } if self.is_map(object, scope) => {
                    let map = self.expr(object, scope);
                    let value = self.expr(value, scope);
                    return JavaExpr::method(
                        map,
                        "put",
                        vec![JavaExpr::string(property.clone()), value],
                    );
                }
                SourceNode::Index { object, index } => match self.known(object) {
                    TypeTag::KeyedMap => {
                        let args = vec![self.expr(index, scope), self.expr(value, scope)];
                        return JavaExpr::method(self.expr(object, scope), "put", args);
                    }
                    TypeTag::OrderedList(_) => {
                        let args = vec![self.expr(index, scope), self.expr(value, scope)];
                        return JavaExpr::method(self.expr(object, scope), "set", args);
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        let target_expr = self.expr(target, scope);
        let java = match op {
            AssignOp::Assign => {
                let ty = self.known(target);
                let value = self.coerced(value, &ty, scope);
                return JavaExpr::assign(JavaAssignOp::Assign, target_expr, value);
            }
            AssignOp::Add => JavaAssignOp::Add,
            AssignOp::Sub => JavaAssignOp::Sub,
            AssignOp::Mul => JavaAssignOp::Mul,
            AssignOp::Div => JavaAssignOp::Div,
            AssignOp::Rem => JavaAssignOp::Rem,
            AssignOp::BitAnd => JavaAssignOp::BitAnd,
            AssignOp::BitOr => JavaAssignOp::BitOr,
            AssignOp::BitXor => JavaAssignOp::BitXor,
            AssignOp::Shl => JavaAssignOp::Shl,
            AssignOp::Shr => JavaAssignOp::Shr,
            AssignOp::UShr => JavaAssignOp::UShr,
            // No compound form in Java: spell out `t = t op v`.
            AssignOp::Pow => {
                let args = vec![target_expr.clone(), self.expr(value, scope)];
                let value = JavaExpr::method(JavaExpr::name("Math"), "pow", args);
                return JavaExpr::assign(JavaAssignOp::Assign, target_expr, value);
            }
            AssignOp::And | AssignOp::Or => {
                let java = if op == AssignOp::And {
                    JavaBinaryOp::And
                } else {
                    JavaBinaryOp::Or
                };
                let value = JavaExpr::binary(java, target_expr.clone(), self.expr(value, scope));
                return JavaExpr::assign(JavaAssignOp::Assign, target_expr, value);
            }
            AssignOp::Nullish => {
                let args = vec![target_expr.clone(), self.expr(value, scope)];
                let value = JavaExpr::method(JavaExpr::name("Objects"), "requireNonNullElse", args);
                return JavaExpr::assign(JavaAssignOp::Assign, target_expr, value);
            }
        };
        JavaExpr::assign(java, target_expr, self.expr(value, scope))
    }

    fn call(&mut self, callee: &SourceNode, args: &[SourceNode], scope: &Scope<'_>) -> JavaExpr {
        if let Some(path) = callee.member_path() {
            if let Some(stream) = console_stream(&path) {
                return self.print(stream, args, scope);
            }
            if let Some(mapped) = self.global_call(&path, args, scope) {
                return mapped;
            }
        }
        match callee {
            SourceNode::Identifier { name } if self.ctx.is_closure(name) => {
                let function = JavaExpr::name(name.clone());
                self.apply(function, None, args, scope)
            }
            SourceNode::Identifier { name } => JavaExpr::call(name.clone(), self.args(args, scope)),
            SourceNode::Member { object, property } => {
                self.method_call(object, property, args, scope)
            }
            other => {
                let function = self.expr(other, scope);
                self.apply(function, None, args, scope)
            }
        }
    }

    fn method_call(
        &mut self,
        object: &SourceNode,
        property: &str,
        args: &[SourceNode],
        scope: &Scope<'_>,
    ) -> JavaExpr {
        let this_first = matches!(args.first(), Some(SourceNode::This));
        if property == "call" && this_first && scope.superclass.is_some() {
            // Base.call(this, ..) inside a constructor
            if scope.in_constructor && object.as_identifier() == scope.superclass {
                return JavaExpr::call("super", self.args(&args[1..], scope));
            }
            // Base.prototype.m.call(this, ..)
            if let SourceNode::Member {
                object: proto,
                property: method,
            } = object
            {
                if let SourceNode::Member { object: base, property } = proto.as_ref() {
                    if property == "prototype" && base.as_identifier() == scope.superclass {
                        let rest = self.args(&args[1..], scope);
                        return JavaExpr::method(JavaExpr::name("super"), method.clone(), rest);
                    }
                }
            }
        }

        if self.is_map(object, scope) {
            let map = self.expr(object, scope);
            let function = JavaExpr::method(
                map.clone(),
                "get",
                vec![JavaExpr::string(property.to_string())],
            );
            return self.apply(function, Some(map), args, scope);
        }

        let name = match (self.known(object), property) {
            (TypeTag::OrderedList(_), "push") => "add",
            (TypeTag::OrderedList(_) | TypeTag::Text, "includes") => "contains",
            _ => property,
        };
        let receiver = self.expr(object, scope);
        JavaExpr::method(receiver, name, self.args(args, scope))
    }

    /// Invoke a closure value, packing the arguments into an `Object[]`.
    fn apply(
        &mut self,
        function: JavaExpr,
        receiver: Option<JavaExpr>,
        args: &[SourceNode],
        scope: &Scope<'_>,
    ) -> JavaExpr {
        let mut packed: Vec<JavaExpr> = receiver.into_iter().collect();
        packed.extend(self.args(args, scope));
        JavaExpr::method(
            JavaExpr::Cast {
                ty: FUNCTION_TYPE.to_string(),
                expr: Box::new(function),
            },
            "apply",
            vec![JavaExpr::ArrayOf {
                ty: "Object".to_string(),
                elements: packed,
            }],
        )
    }

    fn print(&mut self, stream: &str, args: &[SourceNode], scope: &Scope<'_>) -> JavaExpr {
        let mut parts = args.iter().map(|arg| self.expr(arg, scope)).collect::<Vec<_>>().into_iter();
        let joined = parts.next().map(|first| {
            parts.fold(first, |acc, part| {
                let spaced = JavaExpr::binary(JavaBinaryOp::Add, acc, JavaExpr::string(" "));
                JavaExpr::binary(JavaBinaryOp::Add, spaced, part)
            })
        });
        JavaExpr::method(
            JavaExpr::field(JavaExpr::name("System"), stream),
            "println",
            joined.into_iter().collect(),
        )
    }

    /// Global functions with a direct Java counterpart.
    fn global_call(
        &mut self,
        path: &str,
        args: &[SourceNode],
        scope: &Scope<'_>,
    ) -> Option<JavaExpr> {
        let first = args.first()?;
        let text_of = |this: &mut Self| {
            let value = this.expr(first, scope);
            JavaExpr::method(JavaExpr::name("String"), "valueOf", vec![value])
        };
        Some(match path {
            "parseInt" => {
                let text = text_of(self);
                JavaExpr::method(JavaExpr::name("Integer"), "parseInt", vec![text])
            }
            "parseFloat" | "Number" => {
                let text = text_of(self);
                JavaExpr::method(JavaExpr::name("Double"), "parseDouble", vec![text])
            }
            "String" | "JSON.stringify" => text_of(self),
            "Array.isArray" => JavaExpr::InstanceOf {
                expr: Box::new(self.expr(first, scope)),
                class: "List".to_string(),
            },
            "Object.keys" => {
                let keys = JavaExpr::method(self.as_map(first, scope), "keySet", Vec::new());
                JavaExpr::New {
                    class: "ArrayList<>".to_string(),
                    args: vec![keys],
                }
            }
            _ => return None,
        })
    }

    fn new_expr(&mut self, callee: &SourceNode, args: &[SourceNode], scope: &Scope<'_>) -> JavaExpr {
        let Some(class) = callee.member_path() else {
            return JavaExpr::placeholder("New");
        };
        match class.as_str() {
            error if error.ends_with("Error") => JavaExpr::New {
                class: "RuntimeException".to_string(),
                args: args
                    .first()
                    .map(|message| self.message(message, scope))
                    .into_iter()
                    .collect(),
            },
            "Array" if args.is_empty() => JavaExpr::ListOf {
                elements: Vec::new(),
            },
            "Array" => JavaExpr::New {
                class: "ArrayList<>".to_string(),
                args: self.args(args, scope),
            },
            "Map" => JavaExpr::New {
                class: "LinkedHashMap<>".to_string(),
                args: Vec::new(),
            },
            "Set" => JavaExpr::New {
                class: "LinkedHashSet<>".to_string(),
                args: Vec::new(),
            },
            "Object" => JavaExpr::MapOf {
                entries: Vec::new(),
            },
            _ => JavaExpr::New {
                class: class.clone(),
                args: self.args(args, scope),
            },
        }
    }

    /// An exception message. Anything not known to be text is stringified.
    pub(crate) fn message(&mut self, node: &SourceNode, scope: &Scope<'_>) -> JavaExpr {
        let value = self.expr(node, scope);
        if self.known(node) == TypeTag::Text {
            value
        } else {
            JavaExpr::method(JavaExpr::name("String"), "valueOf", vec![value])
        }
    }

    fn member(&mut self, object: &SourceNode, property: &str, scope: &Scope<'_>) -> JavaExpr {
        if property == "length" {
            match self.known(object) {
                TypeTag::Text => {
                    return JavaExpr::method(self.expr(object, scope), "length", Vec::new())
                }
                TypeTag::OrderedList(_) => {
                    return JavaExpr::method(self.expr(object, scope), "size", Vec::new())
                }
                _ => {}
            }
        }
        let receiver = self.expr(object, scope);
        if self.is_map(object, scope) {
            return JavaExpr::method(receiver, "get", vec![JavaExpr::string(property.to_string())]);
        }
        JavaExpr::field(receiver, property)
    }

    fn index(&mut self, object: &SourceNode, index: &SourceNode, scope: &Scope<'_>) -> JavaExpr {
        let receiver = self.expr(object, scope);
        let index = self.expr(index, scope);
        match self.known(object) {
            TypeTag::KeyedMap | TypeTag::OrderedList(_) => {
                JavaExpr::method(receiver, "get", vec![index])
            }
            TypeTag::Text => {
                let ch = JavaExpr::method(receiver, "charAt", vec![index]);
                JavaExpr::method(JavaExpr::name("String"), "valueOf", vec![ch])
            }
            _ => JavaExpr::ArrayAccess {
                array: Box::new(receiver),
                index: Box::new(index),
            },
        }
    }

    /// Whether member access on `object` goes through a keyed map.
    pub(crate) fn is_map(&self, object: &SourceNode, scope: &Scope<'_>) -> bool {
        match object {
            SourceNode::This => scope.self_map,
            other => self.known(other) == TypeTag::KeyedMap,
        }
    }

    /// `object` as a map, cast when its type is unknown.
    pub(crate) fn as_map(&mut self, object: &SourceNode, scope: &Scope<'_>) -> JavaExpr {
        let expr = self.expr(object, scope);
        if self.is_map(object, scope) {
            expr
        } else {
            JavaExpr::Cast {
                ty: MAP_TYPE.to_string(),
                expr: Box::new(expr),
            }
        }
    }
}

fn is_null(node: &SourceNode) -> bool {
    matches!(node, SourceNode::Null | SourceNode::Undefined)
}

fn identifier(name: &str) -> JavaExpr {
    match name {
        "NaN" => JavaExpr::field(JavaExpr::name("Double"), "NaN"),
        "Infinity" => JavaExpr::field(JavaExpr::name("Double"), "POSITIVE_INFINITY"),
        "undefined" => JavaExpr::null(),
        name => JavaExpr::name(name),
    }
}

/// A numeric lexeme in Java spelling.
fn number_literal(raw: &str) -> JavaExpr {
    match java_number(raw) {
        JavaNumber::Int(raw) | JavaNumber::Long(raw) => JavaExpr::int(raw),
        JavaNumber::Double(raw) => JavaExpr::Literal {
            value: Literal::Double(raw),
        },
        JavaNumber::Infinite => JavaExpr::field(JavaExpr::name("Double"), "POSITIVE_INFINITY"),
    }
}

fn java_binary(op: BinaryOp) -> Option<JavaBinaryOp> {
    Some(match op {
        BinaryOp::Add => JavaBinaryOp::Add,
        BinaryOp::Sub => JavaBinaryOp::Sub,
        BinaryOp::Mul => JavaBinaryOp::Mul,
        BinaryOp::Div => JavaBinaryOp::Div,
        BinaryOp::Rem => JavaBinaryOp::Rem,
        BinaryOp::Eq | BinaryOp::StrictEq => JavaBinaryOp::Eq,
        BinaryOp::NotEq | BinaryOp::StrictNotEq => JavaBinaryOp::NotEq,
        BinaryOp::Lt => JavaBinaryOp::Lt,
        BinaryOp::LtEq => JavaBinaryOp::LtEq,
        BinaryOp::Gt => JavaBinaryOp::Gt,
        BinaryOp::GtEq => JavaBinaryOp::GtEq,
        BinaryOp::BitAnd => JavaBinaryOp::BitAnd,
        BinaryOp::BitOr => JavaBinaryOp::BitOr,
        BinaryOp::BitXor => JavaBinaryOp::BitXor,
        BinaryOp::Shl => JavaBinaryOp::Shl,
        BinaryOp::Shr => JavaBinaryOp::Shr,
        BinaryOp::UShr => JavaBinaryOp::UShr,
        BinaryOp::Pow | BinaryOp::In | BinaryOp::InstanceOf => return None,
    })
}

fn java_class(js: &str) -> &str {
    match js {
        "Array" => "List",
        "Object" => "Map",
        "Function" => "Function",
        "Number" => "Number",
        "String" => "String",
        "Boolean" => "Boolean",
        "Error" => "RuntimeException",
        other => other,
    }
}

fn console_stream(path: &str) -> Option<&'static str> {
    match path {
        "console.log" | "console.info" | "console.debug" => Some("out"),
        "console.error" | "console.warn" => Some("err"),
        _ => None,
    }
}
