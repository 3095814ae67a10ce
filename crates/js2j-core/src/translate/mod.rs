//! SourceNode to Java tree translation.
//!
//! One [`UnitTranslator`] handles one translation unit. It owns the unit's
//! [`InferenceContext`] and collects diagnostics. Everything about the
//! current function (what `this` means, the superclass `super` calls reach)
//! travels in an explicit [`Scope`] argument.

mod class;
mod expr;
mod literal;
mod stmt;

use std::collections::HashSet;

use indexmap::IndexMap;
use js2j_ir::{AssignOp, Block, Function, JavaItem, SourceNode};

use crate::config::Config;
use crate::diagnostics::Diagnostic;
use crate::infer::{infer, InferenceContext, Signal};

pub(crate) use class::PrototypeMember;

/// Translation settings for the function body being translated.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Scope<'a> {
    /// `this` is the map passed to an object-literal closure.
    pub self_map: bool,
    pub superclass: Option<&'a str>,
    pub in_constructor: bool,
}

pub struct UnitTranslator<'c> {
    config: &'c Config,
    ctx: InferenceContext,
    diagnostics: Vec<Diagnostic>,
}

impl<'c> UnitTranslator<'c> {
    pub fn new(config: &'c Config) -> Self {
        Self {
            config,
            ctx: InferenceContext::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn context(&self) -> &InferenceContext {
        &self.ctx
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Translate top-level statements into output items.
    ///
    /// Constructor functions absorb the prototype assignments that follow
    /// them, functions become methods, and class-shaped literals become
    /// classes. Everything else is translated as a statement.
    pub fn translate_program(&mut self, nodes: &[SourceNode]) -> Vec<JavaItem> {
        let plan = ClassPlan::collect(nodes);
        self.record_calls(nodes);
        self.predeclare_functions(nodes, &plan);

        let scope = Scope::default();
        let mut items = Vec::new();
        for (index, node) in nodes.iter().enumerate() {
            if plan.consumed.contains(&index) {
                continue;
            }
            match node {
                SourceNode::Function(function) => match function.name.as_deref() {
                    Some(name) if plan.members.contains_key(name) => {
                        let class = self.class_from_constructor(
                            name,
                            function,
                            &plan.members[name],
                            plan.superclass.get(name).copied(),
                        );
                        items.push(JavaItem::Class { class });
                    }
                    Some(name) => {
                        let method = self.function_method(name, function, &scope, false);
                        items.push(JavaItem::Method { method });
                    }
                    None => self.statement_items(node, &scope, &mut items),
                },
                SourceNode::VarDecl { declarators, .. } => {
                    for declarator in declarators {
                        match &declarator.init {
                            Some(SourceNode::Function(function)) => {
                                let method =
                                    self.function_method(&declarator.name, function, &scope, false);
                                items.push(JavaItem::Method { method });
                            }
                            Some(SourceNode::Object { properties })
                                if literal::is_class_shaped(properties) =>
                            {
                                let class = self.class_from_literal(&declarator.name, properties);
                                items.push(JavaItem::Class { class });
                            }
                            _ => {
                                let stmt = self.declaration(declarator, &scope);
                                items.push(JavaItem::Stmt { stmt });
                            }
                        }
                    }
                }
                SourceNode::ExprStmt { expression } => match expression.as_ref() {
                    SourceNode::Object { properties } if literal::is_class_shaped(properties) => {
                        let name = self.config.default_class_name.clone();
                        let class = self.class_from_literal(&name, properties);
                        items.push(JavaItem::Class { class });
                    }
                    _ => self.statement_items(node, &scope, &mut items),
                },
                _ => self.statement_items(node, &scope, &mut items),
            }
        }
        items
    }

    fn statement_items(&mut self, node: &SourceNode, scope: &Scope<'_>, items: &mut Vec<JavaItem>) {
        let mut block = Block::new();
        self.stmt_into(node, scope, &mut block);
        items.extend(block.stmts.into_iter().map(|stmt| JavaItem::Stmt { stmt }));
    }

    /// Argument types at every plain call in `nodes`. Top-level variables
    /// count when their initializer has a literal shape.
    fn record_calls(&mut self, nodes: &[SourceNode]) {
        let mut scratch = InferenceContext::new();
        for node in nodes {
            let SourceNode::VarDecl { declarators, .. } = node else {
                continue;
            };
            for declarator in declarators {
                let Some(init) = &declarator.init else {
                    continue;
                };
                let ty = infer(Signal::Literal(init), &scratch);
                if !ty.is_any() {
                    scratch.declare(declarator.name.clone(), ty);
                }
            }
        }

        let mut calls = Vec::new();
        for node in nodes {
            node.visit(&mut |node| {
                if let SourceNode::Call { callee, args } = node {
                    if let Some(name) = callee.as_identifier() {
                        calls.push((name, args));
                    }
                }
            });
        }
        for (name, args) in calls {
            let types = args
                .iter()
                .map(|arg| infer(Signal::Literal(arg), &scratch))
                .collect();
            self.ctx.declare_call(name, types);
        }
    }

    /// Give every top-level function a provisional result type so calls
    /// that precede the definition still infer.
    fn predeclare_functions(&mut self, nodes: &[SourceNode], plan: &ClassPlan<'_>) {
        for node in nodes {
            let (name, function) = match node {
                SourceNode::Function(function) => match function.name.as_deref() {
                    Some(name) if !plan.members.contains_key(name) => (name, function),
                    _ => continue,
                },
                SourceNode::VarDecl { declarators, .. } => {
                    for declarator in declarators {
                        if let Some(SourceNode::Function(function)) = &declarator.init {
                            self.predeclare(&declarator.name, function);
                        }
                    }
                    continue;
                }
                _ => continue,
            };
            self.predeclare(name, function);
        }
    }

    fn predeclare(&mut self, name: &str, function: &Function) {
        let ty = infer(
            Signal::Method {
                name,
                body: &function.body_text,
            },
            &self.ctx,
        );
        self.ctx.declare_function(name, ty);
    }
}

// -----------------------------------------------------------------------------
// Constructor-function grouping
// -----------------------------------------------------------------------------

/// Which top-level functions are constructors and which statements fold
/// into them.
#[derive(Debug, Default)]
struct ClassPlan<'a> {
    members: IndexMap<&'a str, Vec<PrototypeMember<'a>>>,
    superclass: IndexMap<&'a str, &'a str>,
    consumed: HashSet<usize>,
}

impl<'a> ClassPlan<'a> {
    fn collect(nodes: &'a [SourceNode]) -> Self {
        let functions: IndexMap<&str, &Function> = nodes
            .iter()
            .filter_map(|node| {
                let function = node.as_function()?;
                Some((function.name.as_deref()?, function))
            })
            .collect();

        let mut plan = ClassPlan::default();
        let mut statics: Vec<(usize, &str, PrototypeMember<'a>)> = Vec::new();
        let mut constructor_links: Vec<(usize, &str)> = Vec::new();

        for (index, node) in nodes.iter().enumerate() {
            let SourceNode::ExprStmt { expression } = node else {
                continue;
            };
            let SourceNode::Assign {
                op: AssignOp::Assign,
                target,
                value,
            } = expression.as_ref()
            else {
                continue;
            };
            let SourceNode::Member { object, property } = target.as_ref() else {
                continue;
            };

            match (object.as_ref(), value.as_ref()) {
                // X.prototype.m = function ..
                (SourceNode::Member { object: owner, property: proto }, SourceNode::Function(function))
                    if proto == "prototype" =>
                {
                    let Some(owner) = owner.as_identifier().filter(|o| functions.contains_key(o))
                    else {
                        continue;
                    };
                    plan.members.entry(owner).or_default().push(PrototypeMember {
                        name: property,
                        function,
                        is_static: false,
                    });
                    plan.consumed.insert(index);
                }
                // X.prototype.constructor = X
                (SourceNode::Member { object: owner, property: proto }, SourceNode::Identifier { name })
                    if proto == "prototype"
                        && property == "constructor"
                        && owner.as_identifier() == Some(name.as_str()) =>
                {
                    constructor_links.push((index, name.as_str()));
                }
                // X.prototype = Object.create(B.prototype)
                (SourceNode::Identifier { name: owner }, value) if property == "prototype" => {
                    if let (true, Some(base)) = (
                        functions.contains_key(owner.as_str()),
                        object_create_base(value),
                    ) {
                        plan.superclass.insert(owner, base);
                        plan.members.entry(owner).or_default();
                        plan.consumed.insert(index);
                    }
                }
                // X.m = function ..
                (SourceNode::Identifier { name: owner }, SourceNode::Function(function))
                    if functions.contains_key(owner.as_str()) =>
                {
                    statics.push((
                        index,
                        owner.as_str(),
                        PrototypeMember {
                            name: property,
                            function,
                            is_static: true,
                        },
                    ));
                }
                _ => {}
            }
        }

        for (&name, &function) in &functions {
            if !plan.members.contains_key(name) && looks_like_constructor(name, function) {
                plan.members.insert(name, Vec::new());
            }
        }
        for (index, owner, member) in statics {
            if let Some(members) = plan.members.get_mut(owner) {
                members.push(member);
                plan.consumed.insert(index);
            }
        }
        for (index, owner) in constructor_links {
            if plan.members.contains_key(owner) {
                plan.consumed.insert(index);
            }
        }
        plan
    }
}

/// `Object.create(B.prototype)` yields `B`.
fn object_create_base(value: &SourceNode) -> Option<&str> {
    let SourceNode::Call { callee, args } = value else {
        return None;
    };
    if callee.member_path().as_deref() != Some("Object.create") {
        return None;
    }
    match args.first()? {
        SourceNode::Member { object, property } if property == "prototype" => object.as_identifier(),
        _ => None,
    }
}

fn looks_like_constructor(name: &str, function: &Function) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
        && !class::this_assignments(&function.body).is_empty()
}

#[cfg(test)]
mod tests;
