//! Java tree to source text.
//!
//! Indentation follows one rule everywhere: a line ending in `{` opens a level
//! and a line starting with `}` closes one. Multi-line expressions (map
//! initialisers, closures) are laid out the same way so the output survives
//! re-indentation unchanged.

use std::fmt::Write;

use js2j_ir::{
    Block, ClassDecl, CompilationUnit, ElseBranch, ForInit, JavaExpr, JavaItem, JavaStmt,
    JavaUnaryOp, Literal, LocalVar, MethodDecl, Param, SwitchEntry,
};
use serde::{Deserialize, Serialize};

use crate::names::{java_string_literal, to_java_name};

/// How top-level items are arranged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// Items concatenated as-is, separated by blank lines.
    #[default]
    Loose,
    /// Items wrapped in a public class with a `main` method.
    Class,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub indent_width: usize,
    pub layout: Layout,
    pub class_name: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent_width: 4,
            layout: Layout::Loose,
            class_name: "GeneratedClass".into(),
        }
    }
}

/// The keyed-map implementation used for object literals.
pub const MAP_CLASS: &str = "LinkedHashMap";

/// Render a compilation unit to Java source.
pub fn render(unit: &CompilationUnit, options: &RenderOptions) -> String {
    let printer = Printer::new(options.indent_width);
    match options.layout {
        Layout::Loose => printer.loose(unit),
        Layout::Class => printer.wrapped(unit, &options.class_name),
    }
}

/// Render one expression at depth zero.
pub fn render_expr(expr: &JavaExpr) -> String {
    Printer::new(4).expr(expr, 0)
}

/// Render one statement at depth zero, without a trailing newline.
pub fn render_stmt(stmt: &JavaStmt) -> String {
    let printer = Printer::new(4);
    let mut out = String::new();
    printer.stmt(&mut out, stmt, 0);
    out.trim_end().to_string()
}

struct Printer {
    indent_width: usize,
}

impl Printer {
    fn new(indent_width: usize) -> Self {
        Self { indent_width }
    }

    fn pad(&self, depth: usize) -> String {
        " ".repeat(depth * self.indent_width)
    }

    fn line(&self, out: &mut String, depth: usize, text: &str) {
        let _ = writeln!(out, "{}{}", self.pad(depth), text);
    }

    // -------------------------------------------------------------------------
    // Units
    // -------------------------------------------------------------------------

    fn loose(&self, unit: &CompilationUnit) -> String {
        let chunks: Vec<String> = unit
            .items
            .iter()
            .map(|item| {
                let mut out = String::new();
                self.item(&mut out, item, 0, false);
                out.trim_end().to_string()
            })
            .collect();
        let mut text = chunks.join("\n\n");
        text.push('\n');
        text
    }

    fn wrapped(&self, unit: &CompilationUnit, class_name: &str) -> String {
        let mut out = String::new();
        out.push_str("import java.util.*;\n");
        out.push_str("import java.util.function.*;\n\n");
        self.line(&mut out, 0, &format!("public class {} {{", to_java_name(class_name)));

        let mut main_body = Block::new();
        let mut members: Vec<String> = Vec::new();
        for item in &unit.items {
            match item {
                JavaItem::Stmt {
                    stmt: JavaStmt::LocalVar(var),
                } => {
                    let mut chunk = String::new();
                    let decl = self.local_var(var, 1);
                    self.line(&mut chunk, 1, &format!("static {};", decl));
                    members.push(chunk);
                }
                JavaItem::Stmt {
                    stmt: JavaStmt::Comment { text },
                } => {
                    let mut chunk = String::new();
                    self.comment(&mut chunk, text, 1);
                    members.push(chunk);
                }
                JavaItem::Stmt { stmt } => main_body.push(stmt.clone()),
                JavaItem::Method { method } => {
                    // top-level functions are called from main
                    let method = MethodDecl {
                        is_static: true,
                        ..method.clone()
                    };
                    let mut chunk = String::new();
                    self.method(&mut chunk, &method, 1, true);
                    members.push(chunk);
                }
                other => {
                    let mut chunk = String::new();
                    self.item(&mut chunk, other, 1, true);
                    members.push(chunk);
                }
            }
        }

        let mut main = String::new();
        self.line(&mut main, 1, "public static void main(String[] args) {");
        self.block_body(&mut main, &main_body, 2);
        self.line(&mut main, 1, "}");
        members.push(main);

        let joined: Vec<&str> = members.iter().map(|m| m.trim_end_matches('\n')).collect();
        out.push_str(&joined.join("\n\n"));
        out.push('\n');
        self.line(&mut out, 0, "}");
        out
    }

    fn item(&self, out: &mut String, item: &JavaItem, depth: usize, nested: bool) {
        match item {
            JavaItem::Stmt { stmt } => self.stmt(out, stmt, depth),
            JavaItem::Method { method } => self.method(out, method, depth, nested),
            JavaItem::Class { class } => self.class(out, class, depth, nested),
            JavaItem::Placeholder { text } => self.comment(out, text, depth),
        }
    }

    // -------------------------------------------------------------------------
    // Declarations
    // -------------------------------------------------------------------------

    fn class(&self, out: &mut String, class: &ClassDecl, depth: usize, nested: bool) {
        let modifiers = if nested { "public static class" } else { "public class" };
        let mut header = format!("{} {}", modifiers, to_java_name(&class.name));
        if let Some(superclass) = &class.superclass {
            let _ = write!(header, " extends {}", to_java_name(superclass));
        }
        header.push_str(" {");
        self.line(out, depth, &header);

        let mut sections: Vec<String> = Vec::new();
        if !class.fields.is_empty() {
            let mut fields = String::new();
            for field in &class.fields {
                self.line(
                    &mut fields,
                    depth + 1,
                    &format!("private {} {};", field.ty.java_name(), to_java_name(&field.name)),
                );
            }
            sections.push(fields);
        }
        if let Some(ctor) = &class.constructor {
            let mut section = String::new();
            self.line(
                &mut section,
                depth + 1,
                &format!(
                    "public {}({}) {{",
                    to_java_name(&class.name),
                    self.params(&ctor.params)
                ),
            );
            self.block_body(&mut section, &ctor.body, depth + 2);
            self.line(&mut section, depth + 1, "}");
            sections.push(section);
        }
        for method in &class.methods {
            let mut section = String::new();
            self.method(&mut section, method, depth + 1, true);
            sections.push(section);
        }

        let joined: Vec<&str> = sections.iter().map(|s| s.trim_end_matches('\n')).collect();
        if !joined.is_empty() {
            out.push_str(&joined.join("\n\n"));
            out.push('\n');
        }
        self.line(out, depth, "}");
    }

    fn method(&self, out: &mut String, method: &MethodDecl, depth: usize, member: bool) {
        let modifiers = match (member, method.is_static) {
            (false, _) => "",
            (true, true) => "public static ",
            (true, false) => "public ",
        };
        self.line(
            out,
            depth,
            &format!(
                "{}{} {}({}) {{",
                modifiers,
                method.return_ty.java_name(),
                to_java_name(&method.name),
                self.params(&method.params)
            ),
        );
        self.block_body(out, &method.body, depth + 1);
        self.line(out, depth, "}");
    }

    fn params(&self, params: &[Param]) -> String {
        params
            .iter()
            .map(|p| format!("{} {}", p.ty.java_name(), to_java_name(&p.name)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    // -------------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------------

    fn block_body(&self, out: &mut String, block: &Block, depth: usize) {
        for stmt in &block.stmts {
            self.stmt(out, stmt, depth);
        }
    }

    fn comment(&self, out: &mut String, text: &str, depth: usize) {
        if text.is_empty() {
            self.line(out, depth, "//");
            return;
        }
        for line in text.lines() {
            if line.is_empty() {
                self.line(out, depth, "//");
            } else {
                self.line(out, depth, &format!("// {}", line));
            }
        }
    }

    fn local_var(&self, var: &LocalVar, depth: usize) -> String {
        let mut text = format!("{} {}", var.ty.java_name(), to_java_name(&var.name));
        if let Some(init) = &var.init {
            let _ = write!(text, " = {}", self.expr(init, depth));
        }
        text
    }

    fn stmt(&self, out: &mut String, stmt: &JavaStmt, depth: usize) {
        match stmt {
            JavaStmt::LocalVar(var) => {
                let decl = self.local_var(var, depth);
                self.line(out, depth, &format!("{};", decl));
            }
            JavaStmt::Expr { expr } => {
                self.line(out, depth, &format!("{};", self.expr(expr, depth)));
            }
            JavaStmt::If {
                test,
                then,
                otherwise,
            } => {
                self.line(out, depth, &format!("if ({}) {{", self.expr(test, depth)));
                self.block_body(out, then, depth + 1);
                self.else_chain(out, otherwise.as_ref(), depth);
            }
            JavaStmt::For {
                init,
                test,
                update,
                body,
            } => {
                let init = match init {
                    Some(ForInit::Declare { vars }) => self.for_declarations(vars, depth),
                    Some(ForInit::Expressions { exprs }) => self.expr_list(exprs, depth),
                    None => String::new(),
                };
                let test = test
                    .as_ref()
                    .map(|t| format!(" {}", self.expr(t, depth)))
                    .unwrap_or_default();
                let update = if update.is_empty() {
                    String::new()
                } else {
                    format!(" {}", self.expr_list(update, depth))
                };
                self.line(out, depth, &format!("for ({};{};{}) {{", init, test, update));
                self.block_body(out, body, depth + 1);
                self.line(out, depth, "}");
            }
            JavaStmt::ForEach {
                ty,
                name,
                iterable,
                body,
            } => {
                self.line(
                    out,
                    depth,
                    &format!(
                        "for ({} {} : {}) {{",
                        ty.java_name(),
                        to_java_name(name),
                        self.expr(iterable, depth)
                    ),
                );
                self.block_body(out, body, depth + 1);
                self.line(out, depth, "}");
            }
            JavaStmt::While { test, body } => {
                self.line(out, depth, &format!("while ({}) {{", self.expr(test, depth)));
                self.block_body(out, body, depth + 1);
                self.line(out, depth, "}");
            }
            JavaStmt::DoWhile { body, test } => {
                self.line(out, depth, "do {");
                self.block_body(out, body, depth + 1);
                self.line(out, depth, &format!("}} while ({});", self.expr(test, depth)));
            }
            JavaStmt::Switch { selector, entries } => {
                self.line(out, depth, &format!("switch ({}) {{", self.expr(selector, depth)));
                for entry in entries {
                    self.switch_entry(out, entry, depth + 1);
                }
                self.line(out, depth, "}");
            }
            JavaStmt::Return { value } => match value {
                Some(value) => {
                    self.line(out, depth, &format!("return {};", self.expr(value, depth)))
                }
                None => self.line(out, depth, "return;"),
            },
            JavaStmt::Break { label } => match label {
                Some(label) => self.line(out, depth, &format!("break {};", label)),
                None => self.line(out, depth, "break;"),
            },
            JavaStmt::Continue { label } => match label {
                Some(label) => self.line(out, depth, &format!("continue {};", label)),
                None => self.line(out, depth, "continue;"),
            },
            JavaStmt::Throw { value } => {
                self.line(out, depth, &format!("throw {};", self.expr(value, depth)));
            }
            JavaStmt::Try {
                body,
                catch,
                finally,
            } => {
                self.line(out, depth, "try {");
                self.block_body(out, body, depth + 1);
                if let Some(catch) = catch {
                    self.line(
                        out,
                        depth,
                        &format!("}} catch (Exception {}) {{", to_java_name(&catch.param)),
                    );
                    self.block_body(out, &catch.body, depth + 1);
                }
                if let Some(finally) = finally {
                    self.line(out, depth, "} finally {");
                    self.block_body(out, finally, depth + 1);
                }
                self.line(out, depth, "}");
            }
            JavaStmt::Comment { text } => self.comment(out, text, depth),
        }
    }

    fn else_chain(&self, out: &mut String, otherwise: Option<&ElseBranch>, depth: usize) {
        match otherwise {
            None => self.line(out, depth, "}"),
            Some(ElseBranch::Block { block }) => {
                self.line(out, depth, "} else {");
                self.block_body(out, block, depth + 1);
                self.line(out, depth, "}");
            }
            Some(ElseBranch::If { stmt }) => match stmt.as_ref() {
                JavaStmt::If {
                    test,
                    then,
                    otherwise,
                } => {
                    self.line(out, depth, &format!("}} else if ({}) {{", self.expr(test, depth)));
                    self.block_body(out, then, depth + 1);
                    self.else_chain(out, otherwise.as_ref(), depth);
                }
                other => {
                    self.line(out, depth, "} else {");
                    self.stmt(out, other, depth + 1);
                    self.line(out, depth, "}");
                }
            },
        }
    }

    fn switch_entry(&self, out: &mut String, entry: &SwitchEntry, depth: usize) {
        let head = if entry.labels.is_empty() {
            "default".to_string()
        } else {
            format!("case {}", self.expr_list(&entry.labels, depth))
        };
        self.line(out, depth, &format!("{} -> {{", head));
        self.block_body(out, &entry.body, depth + 1);
        self.line(out, depth, "}");
    }

    fn for_declarations(&self, vars: &[LocalVar], depth: usize) -> String {
        // Java allows one declared type per for-initializer.
        let Some(first) = vars.first() else {
            return String::new();
        };
        let rest: Vec<String> = vars
            .iter()
            .map(|var| match &var.init {
                Some(init) => format!("{} = {}", to_java_name(&var.name), self.expr(init, depth)),
                None => to_java_name(&var.name),
            })
            .collect();
        format!("{} {}", first.ty.java_name(), rest.join(", "))
    }

    fn expr_list(&self, exprs: &[JavaExpr], depth: usize) -> String {
        exprs
            .iter()
            .map(|e| self.expr(e, depth))
            .collect::<Vec<_>>()
            .join(", ")
    }

    // -------------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------------

    /// Render an expression whose first line sits at `depth`. Continuation
    /// lines carry their own indentation.
    fn expr(&self, expr: &JavaExpr, depth: usize) -> String {
        match expr {
            JavaExpr::Literal { value } => literal(value),
            JavaExpr::Name { name } => to_java_name(name),
            JavaExpr::This => "this".into(),
            JavaExpr::Binary { op, left, right } => {
                let prec = op.precedence();
                let left_text = self.operand(left, depth, |p| p < prec);
                let right_text = self.operand(right, depth, |p| p <= prec);
                format!("{} {} {}", left_text, op.token(), right_text)
            }
            JavaExpr::Unary { op, operand } => {
                let inner = self.wrapped_unless_atomic(operand, depth);
                match op {
                    JavaUnaryOp::Neg => format!("-{}", inner),
                    JavaUnaryOp::Plus => format!("+{}", inner),
                    JavaUnaryOp::Not => format!("!{}", inner),
                    JavaUnaryOp::BitNot => format!("~{}", inner),
                    JavaUnaryOp::PreIncrement => format!("++{}", inner),
                    JavaUnaryOp::PreDecrement => format!("--{}", inner),
                    JavaUnaryOp::PostIncrement => format!("{}++", inner),
                    JavaUnaryOp::PostDecrement => format!("{}--", inner),
                }
            }
            JavaExpr::Assign { op, target, value } => format!(
                "{} {} {}",
                self.expr(target, depth),
                op.token(),
                self.expr(value, depth)
            ),
            JavaExpr::Call { scope, name, args } => {
                let callee = match scope {
                    Some(scope) => {
                        format!("{}.{}", self.wrapped_unless_atomic(scope, depth), name)
                    }
                    None if name == "super" || name == "this" => name.clone(),
                    None => to_java_name(name),
                };
                format!("{}({})", callee, self.expr_list(args, depth))
            }
            JavaExpr::FieldAccess { scope, field } => {
                format!("{}.{}", self.wrapped_unless_atomic(scope, depth), field)
            }
            JavaExpr::ArrayAccess { array, index } => format!(
                "{}[{}]",
                self.wrapped_unless_atomic(array, depth),
                self.expr(index, depth)
            ),
            JavaExpr::Conditional {
                test,
                then,
                otherwise,
            } => format!(
                "{} ? {} : {}",
                self.operand(test, depth, |_| false),
                self.expr(then, depth),
                self.expr(otherwise, depth)
            ),
            JavaExpr::New { class, args } => {
                format!("new {}({})", class, self.expr_list(args, depth))
            }
            JavaExpr::InstanceOf { expr, class } => {
                format!("{} instanceof {}", self.wrapped_unless_atomic(expr, depth), class)
            }
            JavaExpr::Cast { ty, expr } => {
                format!("({}) {}", ty, self.wrapped_unless_atomic(expr, depth))
            }
            JavaExpr::ListOf { elements } => {
                if elements.is_empty() {
                    "new ArrayList<>()".into()
                } else {
                    format!("Arrays.asList({})", self.expr_list(elements, depth))
                }
            }
            JavaExpr::ArrayOf { ty, elements } => {
                format!("new {}[] {{{}}}", ty, self.expr_list(elements, depth))
            }
            JavaExpr::MapOf { entries } => self.map_of(entries, depth),
            JavaExpr::Lambda {
                params,
                self_binding,
                body,
            } => self.lambda(params, *self_binding, body, depth),
            JavaExpr::Placeholder { kind } => {
                java_string_literal(&format!("/* unsupported: {} */", kind))
            }
        }
    }

    fn map_of(&self, entries: &[(String, JavaExpr)], depth: usize) -> String {
        let head = format!("new {}<String, Object>()", MAP_CLASS);
        if entries.is_empty() {
            return head;
        }
        let mut out = format!("{} {{{{\n", head);
        for (key, value) in entries {
            self.line(
                &mut out,
                depth + 1,
                &format!(
                    "put({}, {});",
                    java_string_literal(key),
                    self.expr(value, depth + 1)
                ),
            );
        }
        let _ = write!(out, "{}}}}}", self.pad(depth));
        out
    }

    fn lambda(&self, params: &[String], self_binding: bool, body: &Block, depth: usize) -> String {
        let mut out = String::from("(Function<Object[], Object>) (args) -> {\n");
        let offset = if self_binding {
            self.line(
                &mut out,
                depth + 1,
                "Map<String, Object> self = (Map<String, Object>) args[0];",
            );
            1
        } else {
            0
        };
        for (i, param) in params.iter().enumerate() {
            self.line(
                &mut out,
                depth + 1,
                &format!("Object {} = args[{}];", to_java_name(param), i + offset),
            );
        }
        self.block_body(&mut out, body, depth + 1);
        if !body.last().is_some_and(JavaStmt::is_terminal) {
            self.line(&mut out, depth + 1, "return null;");
        }
        let _ = write!(out, "{}}}", self.pad(depth));
        out
    }

    fn operand(&self, expr: &JavaExpr, depth: usize, needs_parens: impl Fn(u8) -> bool) -> String {
        let text = self.expr(expr, depth);
        let wrap = match expr {
            JavaExpr::Binary { op, .. } => needs_parens(op.precedence()),
            JavaExpr::Conditional { .. }
            | JavaExpr::Assign { .. }
            | JavaExpr::Lambda { .. }
            | JavaExpr::InstanceOf { .. } => true,
            _ => false,
        };
        if wrap { format!("({})", text) } else { text }
    }

    fn wrapped_unless_atomic(&self, expr: &JavaExpr, depth: usize) -> String {
        let text = self.expr(expr, depth);
        match expr {
            JavaExpr::Binary { .. }
            | JavaExpr::Conditional { .. }
            | JavaExpr::Assign { .. }
            | JavaExpr::Cast { .. }
            | JavaExpr::InstanceOf { .. }
            | JavaExpr::Lambda { .. }
            | JavaExpr::Unary { .. } => format!("({})", text),
            _ => text,
        }
    }
}

fn literal(value: &Literal) -> String {
    match value {
        Literal::Str(s) => java_string_literal(s),
        Literal::Int(raw) | Literal::Double(raw) => raw.clone(),
        Literal::Bool(b) => b.to_string(),
        Literal::Null => "null".into(),
    }
}
