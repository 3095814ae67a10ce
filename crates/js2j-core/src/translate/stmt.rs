//! Statement and control-flow translation.

use js2j_ir::{
    BinaryOp, Block, CatchBlock, Declarator, ElseBranch, ForInit, JavaAssignOp, JavaBinaryOp,
    JavaExpr, JavaStmt, JavaUnaryOp, LocalVar, LogicalOp, SourceNode, SwitchCase, SwitchEntry,
    TypeTag,
};
use tracing::warn;

use super::{Scope, UnitTranslator};
use crate::diagnostics::Diagnostic;
use crate::infer::{infer, Signal};

impl UnitTranslator<'_> {
    pub(crate) fn block(&mut self, nodes: &[SourceNode], scope: &Scope<'_>) -> Block {
        let mut block = Block::new();
        for node in nodes {
            self.stmt_into(node, scope, &mut block);
        }
        block
    }

    /// A branch or loop body, which may be a lone statement.
    fn body(&mut self, node: &SourceNode, scope: &Scope<'_>) -> Block {
        match node {
            SourceNode::Block { body } => self.block(body, scope),
            other => self.block(std::slice::from_ref(other), scope),
        }
    }

    /// Translate one statement, appending zero or more Java statements.
    pub(crate) fn stmt_into(&mut self, node: &SourceNode, scope: &Scope<'_>, out: &mut Block) {
        match node {
            SourceNode::VarDecl { declarators, .. } => {
                for declarator in declarators {
                    let stmt = self.declaration(declarator, scope);
                    out.push(stmt);
                }
            }
            SourceNode::ExprStmt { expression } => self.expression_statement(expression, scope, out),
            // `var` is function scoped, so nested blocks flatten
            SourceNode::Block { body } => {
                for node in body {
                    self.stmt_into(node, scope, out);
                }
            }
            SourceNode::If {
                test,
                consequent,
                alternate,
            } => {
                let stmt = self.if_stmt(test, consequent, alternate.as_deref(), scope);
                out.push(stmt);
            }
            SourceNode::For {
                init,
                test,
                update,
                body,
            } => {
                let stmt = self.for_stmt(init.as_deref(), test.as_deref(), update.as_deref(), body, scope);
                out.push(stmt);
            }
            SourceNode::ForIn {
                binding,
                object,
                body,
            } => {
                let stmt = self.for_in(binding, object, body, scope);
                out.push(stmt);
            }
            SourceNode::While { test, body } => {
                let test = self.condition(test, scope);
                let body = self.body(body, scope);
                out.push(JavaStmt::While { test, body });
            }
            SourceNode::DoWhile { body, test } => {
                let body = self.body(body, scope);
                let test = self.condition(test, scope);
                out.push(JavaStmt::DoWhile { body, test });
            }
            SourceNode::Switch {
                discriminant,
                cases,
            } => {
                let stmt = self.switch_stmt(discriminant, cases, scope);
                out.push(stmt);
            }
            SourceNode::Return { argument } => {
                let value = argument.as_deref().map(|value| self.expr(value, scope));
                out.push(JavaStmt::Return { value });
            }
            SourceNode::Break { label } => out.push(JavaStmt::Break {
                label: label.clone(),
            }),
            SourceNode::Continue { label } => out.push(JavaStmt::Continue {
                label: label.clone(),
            }),
            SourceNode::Throw { argument } => {
                let value = self.thrown(argument, scope);
                out.push(JavaStmt::Throw { value });
            }
            SourceNode::Try {
                block,
                handler,
                finalizer,
            } => {
                let body = self.block(block, scope);
                let catch = handler.as_ref().map(|handler| {
                    let param = handler.param.clone().unwrap_or_else(|| "e".to_string());
                    self.ctx.declare(param.clone(), TypeTag::Any);
                    CatchBlock {
                        param,
                        body: self.block(&handler.body, scope),
                    }
                });
                let finally = finalizer.as_ref().map(|finalizer| self.block(finalizer, scope));
                out.push(JavaStmt::Try {
                    body,
                    catch,
                    finally,
                });
            }
            SourceNode::Function(function) => match &function.name {
                Some(name) => {
                    let lambda = self.closure(function, false, scope);
                    self.ctx.declare_closure(name.clone());
                    out.push(JavaStmt::local(TypeTag::Any, name.clone(), Some(lambda)));
                }
                None => out.push(JavaStmt::comment("discarded anonymous function")),
            },
            SourceNode::Empty => {}
            SourceNode::Comment { text } => out.push(JavaStmt::comment(text.clone())),
            SourceNode::Unsupported { kind, .. } => {
                self.report(Diagnostic::note(format!("skipped unsupported statement: {kind}")));
                out.push(JavaStmt::comment(format!("unsupported: {kind}")));
            }
            SourceNode::Text { .. }
            | SourceNode::Number { .. }
            | SourceNode::Boolean { .. }
            | SourceNode::Null
            | SourceNode::Undefined
            | SourceNode::Identifier { .. }
            | SourceNode::This
            | SourceNode::Binary { .. }
            | SourceNode::Logical { .. }
            | SourceNode::Unary { .. }
            | SourceNode::Update { .. }
            | SourceNode::Assign { .. }
            | SourceNode::Call { .. }
            | SourceNode::New { .. }
            | SourceNode::Member { .. }
            | SourceNode::Index { .. }
            | SourceNode::Conditional { .. }
            | SourceNode::Sequence { .. }
            | SourceNode::Array { .. }
            | SourceNode::Object { .. } => self.expression_statement(node, scope, out),
        }
    }

    /// `var name = init`, typed from the initializer, then the name.
    pub(crate) fn declaration(&mut self, declarator: &Declarator, scope: &Scope<'_>) -> JavaStmt {
        if let Some(SourceNode::Function(function)) = &declarator.init {
            let lambda = self.closure(function, false, scope);
            self.ctx.declare_closure(declarator.name.clone());
            return JavaStmt::local(TypeTag::Any, declarator.name.clone(), Some(lambda));
        }
        let ty = infer(
            Signal::Declaration {
                name: &declarator.name,
                init: declarator.init.as_ref(),
            },
            &self.ctx,
        );
        let value = declarator
            .init
            .as_ref()
            .map(|init| self.coerced(init, &ty, scope));
        self.ctx.declare(declarator.name.clone(), ty.clone());
        JavaStmt::local(ty, declarator.name.clone(), value)
    }

    fn expression_statement(&mut self, node: &SourceNode, scope: &Scope<'_>, out: &mut Block) {
        match node {
            SourceNode::Binary {
                op: BinaryOp::Add,
                left,
                right,
            } if matches!(right.as_ref(), SourceNode::Index { .. } | SourceNode::Member { .. }) => {
                match left.as_identifier().filter(|name| self.config.is_accumulator(name)) {
                    Some(name) => self.accumulate(name, right, scope, out),
                    None => self.discard(node, scope, out),
                }
            }
            SourceNode::Conditional {
                test,
                consequent,
                alternate,
            } => {
                let test = self.condition(test, scope);
                let mut then = Block::new();
                self.expression_statement(consequent, scope, &mut then);
                let mut otherwise = Block::new();
                self.expression_statement(alternate, scope, &mut otherwise);
                out.push(JavaStmt::If {
                    test,
                    then,
                    otherwise: Some(ElseBranch::Block { block: otherwise }),
                });
            }
            // a && b();  a || b();
            SourceNode::Logical {
                op: op @ (LogicalOp::And | LogicalOp::Or),
                left,
                right,
            } => {
                let test = self.condition(left, scope);
                let test = if *op == LogicalOp::Or {
                    JavaExpr::not(test)
                } else {
                    test
                };
                let mut then = Block::new();
                self.expression_statement(right, scope, &mut then);
                out.push(JavaStmt::If {
                    test,
                    then,
                    otherwise: None,
                });
            }
            SourceNode::Sequence { expressions } => {
                for expression in expressions {
                    self.expression_statement(expression, scope, out);
                }
            }
            _ => self.discard(node, scope, out),
        }
    }

    /// Emit an expression as a statement, or a comment when Java would
    /// reject it in statement position.
    fn discard(&mut self, node: &SourceNode, scope: &Scope<'_>, out: &mut Block) {
        let expr = self.expr(node, scope);
        match expr {
            JavaExpr::Placeholder { kind } => {
                out.push(JavaStmt::comment(format!("skipped unsupported node: {kind}")));
            }
            expr if expr.is_statement_expression() => out.push(JavaStmt::expr(expr)),
            _ => out.push(JavaStmt::comment(format!(
                "discarded expression without effect: {}",
                node.kind_name()
            ))),
        }
    }

    /// `acc + xs[i];` where the sum was plainly meant to accumulate.
    fn accumulate(&mut self, name: &str, value: &SourceNode, scope: &Scope<'_>, out: &mut Block) {
        self.report(Diagnostic::note(format!(
            "rewrote `{name} + ..` as `{name} += ..` by accumulator naming"
        )));
        let known = self.ctx.lookup(name).cloned();
        if let Some(ty) =
            known.filter(|ty| !(ty.is_numeric() || *ty == TypeTag::Text || ty.is_any()))
        {
            warn!(binding = name, ty = %ty, "accumulator rewrite on a non-numeric binding");
            self.report(Diagnostic::warning(format!(
                "accumulator rewrite on `{name}` of type {ty}"
            )));
        }
        let value = self.expr(value, scope);
        out.push(JavaStmt::expr(JavaExpr::assign(
            JavaAssignOp::Add,
            JavaExpr::name(name),
            value,
        )));
    }

    fn if_stmt(
        &mut self,
        test: &SourceNode,
        consequent: &SourceNode,
        alternate: Option<&SourceNode>,
        scope: &Scope<'_>,
    ) -> JavaStmt {
        let test = self.condition(test, scope);
        let then = self.body(consequent, scope);
        let otherwise = alternate.map(|alternate| match alternate {
            SourceNode::If {
                test,
                consequent,
                alternate,
            } => ElseBranch::If {
                stmt: Box::new(self.if_stmt(test, consequent, alternate.as_deref(), scope)),
            },
            other => ElseBranch::Block {
                block: self.body(other, scope),
            },
        });
        JavaStmt::If {
            test,
            then,
            otherwise,
        }
    }

    fn for_stmt(
        &mut self,
        init: Option<&SourceNode>,
        test: Option<&SourceNode>,
        update: Option<&SourceNode>,
        body: &SourceNode,
        scope: &Scope<'_>,
    ) -> JavaStmt {
        let init = init.map(|init| match init {
            SourceNode::VarDecl { declarators, .. } => ForInit::Declare {
                vars: declarators
                    .iter()
                    .map(|declarator| self.loop_variable(declarator, scope))
                    .collect(),
            },
            SourceNode::Sequence { expressions } => ForInit::Expressions {
                exprs: self.args(expressions, scope),
            },
            other => ForInit::Expressions {
                exprs: vec![self.expr(other, scope)],
            },
        });
        let test = test.map(|test| self.condition(test, scope));
        let update = match update {
            Some(SourceNode::Sequence { expressions }) => self.args(expressions, scope),
            Some(update) => vec![self.expr(update, scope)],
            None => Vec::new(),
        };
        let body = self.body(body, scope);
        JavaStmt::For {
            init,
            test,
            update,
            body,
        }
    }

    /// Loop counters default to `int`.
    fn loop_variable(&mut self, declarator: &Declarator, scope: &Scope<'_>) -> LocalVar {
        let mut ty = infer(
            Signal::Declaration {
                name: &declarator.name,
                init: declarator.init.as_ref(),
            },
            &self.ctx,
        );
        if ty.is_any() {
            ty = TypeTag::Integer;
        }
        let init = declarator
            .init
            .as_ref()
            .map(|init| self.coerced(init, &ty, scope));
        self.ctx.declare(declarator.name.clone(), ty.clone());
        LocalVar {
            ty,
            name: declarator.name.clone(),
            init,
        }
    }

    /// `for (k in obj)` walks map keys, or list indices.
    fn for_in(
        &mut self,
        binding: &str,
        object: &SourceNode,
        body: &SourceNode,
        scope: &Scope<'_>,
    ) -> JavaStmt {
        if let TypeTag::OrderedList(_) = self.known(object) {
            self.ctx.declare(binding, TypeTag::Integer);
            let list = self.expr(object, scope);
            let body = self.body(body, scope);
            return JavaStmt::For {
                init: Some(ForInit::Declare {
                    vars: vec![LocalVar {
                        ty: TypeTag::Integer,
                        name: binding.to_string(),
                        init: Some(JavaExpr::int("0")),
                    }],
                }),
                test: Some(JavaExpr::binary(
                    JavaBinaryOp::Lt,
                    JavaExpr::name(binding),
                    JavaExpr::method(list, "size", Vec::new()),
                )),
                update: vec![JavaExpr::Unary {
                    op: JavaUnaryOp::PostIncrement,
                    operand: Box::new(JavaExpr::name(binding)),
                }],
                body,
            };
        }
        let map = self.as_map(object, scope);
        self.ctx.declare(binding, TypeTag::Text);
        let body = self.body(body, scope);
        JavaStmt::ForEach {
            ty: TypeTag::Text,
            name: binding.to_string(),
            iterable: JavaExpr::method(map, "keySet", Vec::new()),
            body,
        }
    }

    fn switch_stmt(
        &mut self,
        discriminant: &SourceNode,
        cases: &[SwitchCase],
        scope: &Scope<'_>,
    ) -> JavaStmt {
        let selector = self.expr(discriminant, scope);
        let bodies: Vec<(&[SourceNode], bool)> =
            cases.iter().map(|case| case_statements(&case.body)).collect();
        let mut entries = Vec::new();
        let mut labels = Vec::new();
        let mut is_default = false;

        for (index, case) in cases.iter().enumerate() {
            let is_last = index + 1 == cases.len();
            match &case.test {
                Some(test) => {
                    let label = self.expr(test, scope);
                    labels.push(label);
                }
                None => is_default = true,
            }
            // empty cases share the next case's body
            if case.body.is_empty() && !is_last {
                continue;
            }

            let (stmts, breaks) = bodies[index];
            let mut body = self.block(stmts, scope);
            let terminal = body.last().is_some_and(JavaStmt::is_terminal);
            if !breaks && !terminal && !is_last {
                warn!(case = index, "switch case falls through");
                self.report(Diagnostic::warning(format!(
                    "switch case {} falls through; the following case bodies are repeated in it",
                    index + 1
                )));
                // arrow cases never fall through
                for &(stmts, breaks) in &bodies[index + 1..] {
                    let next = self.block(stmts, scope);
                    let terminal = next.last().is_some_and(JavaStmt::is_terminal);
                    body.extend(next.stmts);
                    if breaks || terminal {
                        break;
                    }
                }
            }

            let entry_labels = std::mem::take(&mut labels);
            entries.push(SwitchEntry {
                labels: if is_default { Vec::new() } else { entry_labels },
                body,
            });
            is_default = false;
        }

        JavaStmt::Switch { selector, entries }
    }

    fn thrown(&mut self, argument: &SourceNode, scope: &Scope<'_>) -> JavaExpr {
        match argument {
            SourceNode::New { .. } => match self.expr(argument, scope) {
                JavaExpr::New { class, args } if class == "RuntimeException" => {
                    JavaExpr::New { class, args }
                }
                other => runtime_exception(JavaExpr::method(
                    JavaExpr::name("String"),
                    "valueOf",
                    vec![other],
                )),
            },
            other => {
                let message = self.message(other, scope);
                runtime_exception(message)
            }
        }
    }
}

/// A case body without its braces and trailing `break`, and whether the
/// `break` was there.
fn case_statements(body: &[SourceNode]) -> (&[SourceNode], bool) {
    let stmts = match body {
        [SourceNode::Block { body }] => body.as_slice(),
        body => body,
    };
    match stmts {
        [rest @ .., SourceNode::Break { label: None }] => (rest, true),
        all => (all, false),
    }
}

fn runtime_exception(message: JavaExpr) -> JavaExpr {
    JavaExpr::New {
        class: "RuntimeException".to_string(),
        args: vec![message],
    }
}
