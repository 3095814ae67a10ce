//! Functions to methods, constructor functions and class literals to classes.

use js2j_ir::{
    AssignOp, Block, ClassDecl, ConstructorDecl, FieldDecl, Function, JavaAssignOp, JavaExpr,
    JavaStmt, MethodDecl, Param, Property, SourceNode, TypeTag,
};

use super::{Scope, UnitTranslator};
use crate::infer::{infer, Signal};

/// A function attached to a constructor through its prototype, or directly
/// for statics.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PrototypeMember<'a> {
    pub name: &'a str,
    pub function: &'a Function,
    pub is_static: bool,
}

/// Everything a class is assembled from, whatever source form it came in.
struct ClassShape<'a> {
    name: &'a str,
    superclass: Option<&'a str>,
    constructor: Option<&'a Function>,
    methods: Vec<PrototypeMember<'a>>,
    /// Literal properties that are not functions.
    properties: Vec<(&'a str, &'a SourceNode)>,
}

impl UnitTranslator<'_> {
    /// Translate a named function into a method with inferred types.
    pub(crate) fn function_method(
        &mut self,
        name: &str,
        function: &Function,
        scope: &Scope<'_>,
        is_static: bool,
    ) -> MethodDecl {
        self.ctx.enter_scope();
        let params = function
            .params
            .iter()
            .enumerate()
            .map(|(index, param)| {
                let ty = infer(
                    Signal::Parameter {
                        function: name,
                        index,
                        name: param,
                        body: &function.body,
                    },
                    &self.ctx,
                );
                self.ctx.declare(param.clone(), ty.clone());
                Param::new(ty, param.clone())
            })
            .collect();
        let body = self.block(&function.body, scope);

        let mut returns = Vec::new();
        return_values(&function.body, &mut returns);
        let return_ty = infer(
            Signal::Result {
                name,
                returns: &returns,
                body: &function.body_text,
            },
            &self.ctx,
        );
        self.ctx.exit_scope();
        self.ctx.declare_function(name, return_ty.clone());

        MethodDecl {
            name: name.to_string(),
            return_ty,
            params,
            body,
            is_static,
        }
    }

    pub(crate) fn class_from_constructor(
        &mut self,
        name: &str,
        constructor: &Function,
        members: &[PrototypeMember<'_>],
        superclass: Option<&str>,
    ) -> ClassDecl {
        self.build_class(ClassShape {
            name,
            superclass,
            constructor: Some(constructor),
            methods: members.to_vec(),
            properties: Vec::new(),
        })
    }

    /// `{ constructor: function(..) {..}, m: function(..) {..}, k: v }`.
    pub(crate) fn class_from_literal(&mut self, name: &str, properties: &[Property]) -> ClassDecl {
        let mut shape = ClassShape {
            name,
            superclass: None,
            constructor: None,
            methods: Vec::new(),
            properties: Vec::new(),
        };
        for property in properties {
            match &property.value {
                SourceNode::Function(function) if property.key == "constructor" => {
                    shape.constructor = Some(function);
                }
                SourceNode::Function(function) => shape.methods.push(PrototypeMember {
                    name: &property.key,
                    function,
                    is_static: false,
                }),
                value => shape.properties.push((&property.key, value)),
            }
        }
        self.build_class(shape)
    }

    fn build_class(&mut self, shape: ClassShape<'_>) -> ClassDecl {
        let mut class = ClassDecl::new(shape.name);
        class.superclass = shape.superclass.map(String::from);
        let ctor_body = shape.constructor.map_or(&[][..], |ctor| ctor.body.as_slice());
        let ctor_params = shape.constructor.map_or(&[][..], |ctor| ctor.params.as_slice());

        self.ctx.enter_scope();

        // Field types see the constructor parameters, untyped.
        self.ctx.enter_scope();
        for param in ctor_params {
            self.ctx.declare(param.clone(), TypeTag::Any);
        }
        let assigned = this_assignments(ctor_body);
        for (field, value) in shape.properties.iter().copied().chain(assigned) {
            if class.field(field).is_some() {
                continue;
            }
            let ty = match value {
                SourceNode::Function(_) => TypeTag::Any,
                value => infer(
                    Signal::Declaration {
                        name: field,
                        init: Some(value),
                    },
                    &self.ctx,
                ),
            };
            class.fields.push(FieldDecl {
                ty,
                name: field.to_string(),
            });
        }
        self.ctx.exit_scope();

        for field in &class.fields {
            self.ctx.declare(format!("this.{}", field.name), field.ty.clone());
        }

        let instance = Scope {
            self_map: false,
            superclass: shape.superclass,
            in_constructor: false,
        };

        if shape.constructor.is_some() || !shape.properties.is_empty() {
            let ctor_scope = Scope {
                in_constructor: true,
                ..instance
            };
            self.ctx.enter_scope();
            for param in ctor_params {
                self.ctx.declare(param.clone(), TypeTag::Any);
            }
            let mut body = Block::new();
            for (field, value) in &shape.properties {
                let ty = class.field(field).map_or(TypeTag::Any, |f| f.ty.clone());
                let value = self.coerced(value, &ty, &ctor_scope);
                body.push(JavaStmt::expr(JavaExpr::assign(
                    JavaAssignOp::Assign,
                    JavaExpr::field(JavaExpr::This, *field),
                    value,
                )));
            }
            body.extend(self.block(ctor_body, &ctor_scope).stmts);
            self.ctx.exit_scope();

            class.constructor = Some(ConstructorDecl {
                params: ctor_params
                    .iter()
                    .map(|param| Param::new(TypeTag::Any, param.clone()))
                    .collect(),
                body,
            });
        }

        for member in &shape.methods {
            let method =
                self.function_method(member.name, member.function, &instance, member.is_static);
            class.methods.push(method);
        }

        self.ctx.exit_scope();
        class
    }
}

/// `this.f = v` statements at the top level of a constructor body.
pub(crate) fn this_assignments(body: &[SourceNode]) -> Vec<(&str, &SourceNode)> {
    body.iter()
        .filter_map(|node| {
            let SourceNode::ExprStmt { expression } = node else {
                return None;
            };
            let SourceNode::Assign {
                op: AssignOp::Assign,
                target,
                value,
            } = expression.as_ref()
            else {
                return None;
            };
            match target.as_ref() {
                SourceNode::Member { object, property } if matches!(**object, SourceNode::This) => {
                    Some((property.as_str(), value.as_ref()))
                }
                _ => None,
            }
        })
        .collect()
}

/// Values of `return` statements, not descending into nested functions.
fn return_values<'a>(body: &'a [SourceNode], out: &mut Vec<&'a SourceNode>) {
    for node in body {
        match node {
            SourceNode::Return {
                argument: Some(argument),
            } => out.push(argument),
            SourceNode::Block { body } => return_values(body, out),
            SourceNode::If {
                consequent,
                alternate,
                ..
            } => {
                return_values(std::slice::from_ref(consequent.as_ref()), out);
                if let Some(alternate) = alternate {
                    return_values(std::slice::from_ref(alternate.as_ref()), out);
                }
            }
            SourceNode::For { body, .. }
            | SourceNode::ForIn { body, .. }
            | SourceNode::While { body, .. }
            | SourceNode::DoWhile { body, .. } => {
                return_values(std::slice::from_ref(body.as_ref()), out);
            }
            SourceNode::Switch { cases, .. } => {
                for case in cases {
                    return_values(&case.body, out);
                }
            }
            SourceNode::Try {
                block,
                handler,
                finalizer,
            } => {
                return_values(block, out);
                if let Some(handler) = handler {
                    return_values(&handler.body, out);
                }
                if let Some(finalizer) = finalizer {
                    return_values(finalizer, out);
                }
            }
            _ => {}
        }
    }
}
