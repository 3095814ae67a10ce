//! Tree-sitter based JavaScript front-end.

use js2j_ir::{
    AssignOp, BinaryOp, CatchClause, DeclKind, Declarator, Function, LogicalOp, Property,
    SourceNode, SwitchCase, UnaryOp, UpdateOp,
};
use thiserror::Error;
use tree_sitter::{Node, Parser, Tree};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to load JavaScript grammar: {0}")]
    Language(String),

    #[error("parser produced no tree")]
    Failed,

    #[error("syntax error in {unit} at {line}:{column}")]
    Syntax {
        unit: String,
        line: usize,
        column: usize,
    },

    #[error("{kind} is missing its {field}")]
    MissingField { kind: String, field: String },
}

/// Parse JavaScript source into a list of top-level statements.
///
/// `unit` names the source in error messages. A tree containing any ERROR or
/// MISSING node is rejected so callers can fall back to smaller chunks.
pub fn parse(source: &str, unit: Option<&str>) -> Result<Vec<SourceNode>, ParseError> {
    let mut parser = Parser::new();
    let language = tree_sitter_javascript::LANGUAGE;
    parser
        .set_language(&language.into())
        .map_err(|err| ParseError::Language(err.to_string()))?;

    let tree = parser.parse(source, None).ok_or(ParseError::Failed)?;

    let ctx = LowerContext::new(source);
    ctx.lower_program(&tree, unit.unwrap_or("<input>"))
}

struct LowerContext<'a> {
    source: &'a str,
}

impl<'a> LowerContext<'a> {
    fn new(source: &'a str) -> Self {
        Self { source }
    }

    fn node_text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn field<'t>(&self, node: Node<'t>, field: &str) -> Result<Node<'t>, ParseError> {
        node.child_by_field_name(field)
            .ok_or_else(|| ParseError::MissingField {
                kind: node.kind().into(),
                field: field.into(),
            })
    }

    fn lower_program(&self, tree: &Tree, unit: &str) -> Result<Vec<SourceNode>, ParseError> {
        let root = tree.root_node();

        if root.has_error() {
            let (line, column) = first_error(root)
                .map(|node| {
                    let pos = node.start_position();
                    (pos.row + 1, pos.column + 1)
                })
                .unwrap_or((1, 1));
            return Err(ParseError::Syntax {
                unit: unit.into(),
                line,
                column,
            });
        }

        self.lower_statements(root)
    }

    // -------------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------------

    /// Lower every named child of a statement container, comments included.
    fn lower_statements(&self, node: Node) -> Result<Vec<SourceNode>, ParseError> {
        let mut out = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "hash_bang_line" {
                continue;
            }
            out.push(self.lower_statement(child)?);
        }
        Ok(out)
    }

    fn lower_statement(&self, node: Node) -> Result<SourceNode, ParseError> {
        match node.kind() {
            "expression_statement" => {
                let expr = self.first_named(node)?;
                Ok(SourceNode::ExprStmt {
                    expression: Box::new(self.lower_expr(expr)?),
                })
            }
            "variable_declaration" => self.lower_var_decl(node, DeclKind::Var),
            "lexical_declaration" => {
                let kind = match node.child_by_field_name("kind").map(|k| self.node_text(k)) {
                    Some("const") => DeclKind::Const,
                    _ => DeclKind::Let,
                };
                self.lower_var_decl(node, kind)
            }
            "function_declaration" => Ok(SourceNode::Function(self.lower_function(node)?)),
            "statement_block" => Ok(SourceNode::Block {
                body: self.lower_statements(node)?,
            }),
            "if_statement" => self.lower_if(node),
            "for_statement" => self.lower_for(node),
            "for_in_statement" => self.lower_for_in(node),
            "while_statement" => Ok(SourceNode::While {
                test: Box::new(self.lower_expr(self.field(node, "condition")?)?),
                body: Box::new(self.lower_statement(self.field(node, "body")?)?),
            }),
            "do_statement" => Ok(SourceNode::DoWhile {
                body: Box::new(self.lower_statement(self.field(node, "body")?)?),
                test: Box::new(self.lower_expr(self.field(node, "condition")?)?),
            }),
            "switch_statement" => self.lower_switch(node),
            "return_statement" => {
                let argument = match self.named_children(node).into_iter().next() {
                    Some(expr) => Some(Box::new(self.lower_expr(expr)?)),
                    None => None,
                };
                Ok(SourceNode::Return { argument })
            }
            "break_statement" => Ok(SourceNode::Break {
                label: self.label(node),
            }),
            "continue_statement" => Ok(SourceNode::Continue {
                label: self.label(node),
            }),
            "throw_statement" => Ok(SourceNode::Throw {
                argument: Box::new(self.lower_expr(self.first_named(node)?)?),
            }),
            "try_statement" => self.lower_try(node),
            "empty_statement" => Ok(SourceNode::Empty),
            "comment" => Ok(SourceNode::Comment {
                text: comment_text(self.node_text(node)),
            }),
            _ => Ok(self.unsupported(node)),
        }
    }

    fn lower_var_decl(&self, node: Node, kind: DeclKind) -> Result<SourceNode, ParseError> {
        let mut declarators = Vec::new();
        for child in self.named_children(node) {
            if child.kind() != "variable_declarator" {
                continue;
            }
            let name = self.node_text(self.field(child, "name")?).to_string();
            let init = match child.child_by_field_name("value") {
                Some(value) => Some(self.lower_expr(value)?),
                None => None,
            };
            declarators.push(Declarator { name, init });
        }
        Ok(SourceNode::VarDecl { kind, declarators })
    }

    fn lower_if(&self, node: Node) -> Result<SourceNode, ParseError> {
        let test = self.lower_expr(self.field(node, "condition")?)?;
        let consequent = self.lower_statement(self.field(node, "consequence")?)?;
        let alternate = match node.child_by_field_name("alternative") {
            // else_clause wraps the actual statement
            Some(clause) => Some(Box::new(self.lower_statement(self.first_named(clause)?)?)),
            None => None,
        };
        Ok(SourceNode::If {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate,
        })
    }

    fn lower_for(&self, node: Node) -> Result<SourceNode, ParseError> {
        let init = match node.child_by_field_name("initializer") {
            Some(init) => self.lower_for_clause(init)?,
            None => None,
        };
        let test = match node.child_by_field_name("condition") {
            Some(cond) => self.lower_for_clause(cond)?,
            None => None,
        };
        let update = match node.child_by_field_name("increment") {
            Some(update) => Some(Box::new(self.lower_expr(update)?)),
            None => None,
        };
        let body = self.lower_statement(self.field(node, "body")?)?;
        Ok(SourceNode::For {
            init,
            test,
            update,
            body: Box::new(body),
        })
    }

    /// A `for` header slot: a declaration, an expression (possibly wrapped in
    /// an expression statement), or nothing.
    fn lower_for_clause(&self, node: Node) -> Result<Option<Box<SourceNode>>, ParseError> {
        let lowered = match node.kind() {
            "empty_statement" | ";" => return Ok(None),
            "variable_declaration" | "lexical_declaration" => self.lower_statement(node)?,
            "expression_statement" => self.lower_expr(self.first_named(node)?)?,
            _ => self.lower_expr(node)?,
        };
        Ok(Some(Box::new(lowered)))
    }

    fn lower_for_in(&self, node: Node) -> Result<SourceNode, ParseError> {
        let operator = node
            .child_by_field_name("operator")
            .map(|op| self.node_text(op))
            .unwrap_or("in");
        if operator != "in" {
            return Ok(self.unsupported_as(node, "for_of_statement"));
        }
        let left = self.field(node, "left")?;
        let binding = match left.kind() {
            "identifier" => self.node_text(left).to_string(),
            _ => return Ok(self.unsupported_as(node, "for_in_pattern")),
        };
        Ok(SourceNode::ForIn {
            binding,
            object: Box::new(self.lower_expr(self.field(node, "right")?)?),
            body: Box::new(self.lower_statement(self.field(node, "body")?)?),
        })
    }

    fn lower_switch(&self, node: Node) -> Result<SourceNode, ParseError> {
        let discriminant = self.lower_expr(self.field(node, "value")?)?;
        let body = self.field(node, "body")?;
        let mut cases = Vec::new();
        for case in self.named_children(body) {
            let value = case.child_by_field_name("value");
            let test = match (case.kind(), value) {
                ("switch_case", Some(value)) => Some(self.lower_expr(value)?),
                _ => None,
            };
            let mut stmts = Vec::new();
            let mut cursor = case.walk();
            for child in case.named_children(&mut cursor) {
                if Some(child.id()) == value.map(|v| v.id()) {
                    continue;
                }
                stmts.push(self.lower_statement(child)?);
            }
            cases.push(SwitchCase { test, body: stmts });
        }
        Ok(SourceNode::Switch {
            discriminant: Box::new(discriminant),
            cases,
        })
    }

    fn lower_try(&self, node: Node) -> Result<SourceNode, ParseError> {
        let block = self.lower_statements(self.field(node, "body")?)?;
        let handler = match node.child_by_field_name("handler") {
            Some(clause) => Some(CatchClause {
                param: clause
                    .child_by_field_name("parameter")
                    .map(|p| self.node_text(p).to_string()),
                body: self.lower_statements(self.field(clause, "body")?)?,
            }),
            None => None,
        };
        let finalizer = match node.child_by_field_name("finalizer") {
            Some(clause) => Some(self.lower_statements(self.field(clause, "body")?)?),
            None => None,
        };
        Ok(SourceNode::Try {
            block,
            handler,
            finalizer,
        })
    }

    fn label(&self, node: Node) -> Option<String> {
        node.child_by_field_name("label")
            .map(|label| self.node_text(label).to_string())
    }

    // -------------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------------

    fn lower_expr(&self, node: Node) -> Result<SourceNode, ParseError> {
        match node.kind() {
            // Literals
            "number" => Ok(SourceNode::number(self.node_text(node))),
            "string" => Ok(SourceNode::text(decode_string(self.node_text(node)))),
            "true" => Ok(SourceNode::Boolean { value: true }),
            "false" => Ok(SourceNode::Boolean { value: false }),
            "null" => Ok(SourceNode::Null),
            "undefined" => Ok(SourceNode::Undefined),

            "identifier" | "property_identifier" | "shorthand_property_identifier" => {
                Ok(SourceNode::identifier(self.node_text(node)))
            }
            "this" => Ok(SourceNode::This),
            "parenthesized_expression" => self.lower_expr(self.first_named(node)?),
            "binary_expression" => self.lower_binary(node),
            "unary_expression" => {
                let token = self.node_text(self.field(node, "operator")?);
                let operand = self.lower_expr(self.field(node, "argument")?)?;
                match UnaryOp::from_token(token) {
                    Some(op) => Ok(SourceNode::Unary {
                        op,
                        operand: Box::new(operand),
                    }),
                    None => Ok(self.unsupported(node)),
                }
            }
            "update_expression" => {
                let operator = self.field(node, "operator")?;
                let argument = self.field(node, "argument")?;
                let op = match self.node_text(operator) {
                    "--" => UpdateOp::Decrement,
                    _ => UpdateOp::Increment,
                };
                Ok(SourceNode::Update {
                    op,
                    operand: Box::new(self.lower_expr(argument)?),
                    operator_start: operator.start_byte(),
                    operand_start: argument.start_byte(),
                })
            }
            "assignment_expression" => Ok(SourceNode::Assign {
                op: AssignOp::Assign,
                target: Box::new(self.lower_expr(self.field(node, "left")?)?),
                value: Box::new(self.lower_expr(self.field(node, "right")?)?),
            }),
            "augmented_assignment_expression" => {
                let token = self.node_text(self.field(node, "operator")?);
                let Some(op) = AssignOp::from_token(token) else {
                    return Ok(self.unsupported(node));
                };
                Ok(SourceNode::Assign {
                    op,
                    target: Box::new(self.lower_expr(self.field(node, "left")?)?),
                    value: Box::new(self.lower_expr(self.field(node, "right")?)?),
                })
            }
            "call_expression" => {
                let arguments = self.field(node, "arguments")?;
                if arguments.kind() != "arguments" {
                    // tagged template
                    return Ok(self.unsupported(node));
                }
                Ok(SourceNode::Call {
                    callee: Box::new(self.lower_expr(self.field(node, "function")?)?),
                    args: self.lower_arguments(arguments)?,
                })
            }
            "new_expression" => {
                let args = match node.child_by_field_name("arguments") {
                    Some(arguments) => self.lower_arguments(arguments)?,
                    None => Vec::new(),
                };
                Ok(SourceNode::New {
                    callee: Box::new(self.lower_expr(self.field(node, "constructor")?)?),
                    args,
                })
            }
            "member_expression" => Ok(SourceNode::Member {
                object: Box::new(self.lower_expr(self.field(node, "object")?)?),
                property: self.node_text(self.field(node, "property")?).to_string(),
            }),
            "subscript_expression" => Ok(SourceNode::Index {
                object: Box::new(self.lower_expr(self.field(node, "object")?)?),
                index: Box::new(self.lower_expr(self.field(node, "index")?)?),
            }),
            "ternary_expression" => Ok(SourceNode::Conditional {
                test: Box::new(self.lower_expr(self.field(node, "condition")?)?),
                consequent: Box::new(self.lower_expr(self.field(node, "consequence")?)?),
                alternate: Box::new(self.lower_expr(self.field(node, "alternative")?)?),
            }),
            "sequence_expression" => {
                let mut expressions = Vec::new();
                self.collect_sequence(node, &mut expressions)?;
                Ok(SourceNode::Sequence { expressions })
            }
            "array" => {
                let mut elements = Vec::new();
                for child in self.named_children(node) {
                    elements.push(self.lower_expr(child)?);
                }
                Ok(SourceNode::Array { elements })
            }
            "object" => self.lower_object(node),
            "function_expression" | "function" | "arrow_function" => {
                Ok(SourceNode::Function(self.lower_function(node)?))
            }

            _ => Ok(self.unsupported(node)),
        }
    }

    fn lower_binary(&self, node: Node) -> Result<SourceNode, ParseError> {
        let token = self.node_text(self.field(node, "operator")?);
        let left = Box::new(self.lower_expr(self.field(node, "left")?)?);
        let right = Box::new(self.lower_expr(self.field(node, "right")?)?);

        if let Some(op) = LogicalOp::from_token(token) {
            return Ok(SourceNode::Logical { op, left, right });
        }
        match BinaryOp::from_token(token) {
            Some(op) => Ok(SourceNode::Binary { op, left, right }),
            None => Ok(self.unsupported(node)),
        }
    }

    fn lower_arguments(&self, node: Node) -> Result<Vec<SourceNode>, ParseError> {
        self.named_children(node)
            .into_iter()
            .map(|arg| self.lower_expr(arg))
            .collect()
    }

    fn collect_sequence(&self, node: Node, out: &mut Vec<SourceNode>) -> Result<(), ParseError> {
        for child in self.named_children(node) {
            if child.kind() == "sequence_expression" {
                self.collect_sequence(child, out)?;
            } else {
                out.push(self.lower_expr(child)?);
            }
        }
        Ok(())
    }

    fn lower_object(&self, node: Node) -> Result<SourceNode, ParseError> {
        let mut properties = Vec::new();
        for child in self.named_children(node) {
            match child.kind() {
                "pair" => {
                    let key = self.property_key(self.field(child, "key")?);
                    let value = self.lower_expr(self.field(child, "value")?)?;
                    properties.push(Property { key, value });
                }
                "shorthand_property_identifier" => {
                    let name = self.node_text(child).to_string();
                    properties.push(Property {
                        key: name.clone(),
                        value: SourceNode::identifier(name),
                    });
                }
                "method_definition" => {
                    let key = self.property_key(self.field(child, "name")?);
                    properties.push(Property {
                        key,
                        value: SourceNode::Function(self.lower_function(child)?),
                    });
                }
                _ => properties.push(Property {
                    key: self.node_text(child).to_string(),
                    value: self.unsupported(child),
                }),
            }
        }
        Ok(SourceNode::Object { properties })
    }

    fn property_key(&self, key: Node) -> String {
        match key.kind() {
            "string" => decode_string(self.node_text(key)),
            _ => self.node_text(key).to_string(),
        }
    }

    /// Lower any function-shaped node: declarations, expressions, methods and
    /// arrow functions.
    fn lower_function(&self, node: Node) -> Result<Function, ParseError> {
        let name = node
            .child_by_field_name("name")
            .map(|name| self.node_text(name).to_string());

        let mut params = Vec::new();
        if let Some(formal) = node.child_by_field_name("parameters") {
            for param in self.named_children(formal) {
                params.push(self.param_name(param));
            }
        } else if let Some(single) = node.child_by_field_name("parameter") {
            params.push(self.param_name(single));
        }

        let body_node = self.field(node, "body")?;
        let body_text = self.node_text(body_node).to_string();
        let body = if body_node.kind() == "statement_block" {
            self.lower_statements(body_node)?
        } else {
            // concise arrow body
            vec![SourceNode::Return {
                argument: Some(Box::new(self.lower_expr(body_node)?)),
            }]
        };

        Ok(Function {
            name,
            params,
            body,
            body_text,
        })
    }

    fn param_name(&self, param: Node) -> String {
        match param.kind() {
            "assignment_pattern" => param
                .child_by_field_name("left")
                .map(|left| self.node_text(left).to_string())
                .unwrap_or_else(|| self.node_text(param).to_string()),
            "rest_pattern" => self.node_text(param).trim_start_matches("...").to_string(),
            _ => self.node_text(param).to_string(),
        }
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    /// Named children, skipping comments.
    fn named_children<'t>(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .collect()
    }

    fn first_named<'t>(&self, node: Node<'t>) -> Result<Node<'t>, ParseError> {
        self.named_children(node)
            .into_iter()
            .next()
            .ok_or_else(|| ParseError::MissingField {
                kind: node.kind().into(),
                field: "child".into(),
            })
    }

    fn unsupported(&self, node: Node) -> SourceNode {
        self.unsupported_as(node, node.kind())
    }

    fn unsupported_as(&self, node: Node, kind: &str) -> SourceNode {
        SourceNode::Unsupported {
            kind: kind.into(),
            text: self.node_text(node).to_string(),
        }
    }
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error)
}

/// Strip comment markers, JSDoc gutters and blank edge lines.
pub(crate) fn comment_text(raw: &str) -> String {
    if let Some(line) = raw.strip_prefix("//") {
        return line.trim().to_string();
    }
    let inner = raw
        .strip_prefix("/*")
        .and_then(|rest| rest.strip_suffix("*/"))
        .unwrap_or(raw);
    let lines: Vec<&str> = inner
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .collect();
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    lines[start..end].join("\n")
}

/// Decode a quoted JavaScript string literal into its value.
pub(crate) fn decode_string(raw: &str) -> String {
    let inner = if raw.len() >= 2 && (raw.starts_with('"') || raw.starts_with('\'')) {
        &raw[1..raw.len() - 1]
    } else {
        raw
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                push_code_point(&mut out, &hex);
            }
            Some('u') => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|&c| c != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                push_code_point(&mut out, &hex);
            }
            // line continuation
            Some('\n') => {}
            Some('\r') => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn push_code_point(out: &mut String, hex: &str) {
    match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        Some(c) => out.push(c),
        None => out.push_str(hex),
    }
}
