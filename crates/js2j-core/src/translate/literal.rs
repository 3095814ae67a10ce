//! Array literals, object literals and function values.

use js2j_ir::{Function, JavaExpr, Property, SourceNode, TypeTag};

use super::{Scope, UnitTranslator};

/// An object literal that reads as a class: function members, one of them
/// named `constructor`.
pub(crate) fn is_class_shaped(properties: &[Property]) -> bool {
    properties
        .iter()
        .any(|p| p.key == "constructor" && matches!(p.value, SourceNode::Function(_)))
}

impl UnitTranslator<'_> {
    pub(crate) fn array_literal(&mut self, elements: &[SourceNode], scope: &Scope<'_>) -> JavaExpr {
        JavaExpr::ListOf {
            elements: elements.iter().map(|e| self.expr(e, scope)).collect(),
        }
    }

    /// Keyed map with insertions in property order. Function-valued
    /// properties become closures that receive the map as `self`.
    pub(crate) fn object_literal(&mut self, properties: &[Property], scope: &Scope<'_>) -> JavaExpr {
        let entries = properties
            .iter()
            .map(|property| {
                let value = match &property.value {
                    SourceNode::Function(function) => self.closure(function, true, scope),
                    value => self.expr(value, scope),
                };
                (property.key.clone(), value)
            })
            .collect();
        JavaExpr::MapOf { entries }
    }

    /// A function value. Parameters are untyped since they arrive through
    /// an `Object[]`.
    pub(crate) fn closure(
        &mut self,
        function: &Function,
        self_binding: bool,
        scope: &Scope<'_>,
    ) -> JavaExpr {
        let inner = Scope {
            self_map: self_binding || scope.self_map,
            in_constructor: false,
            ..*scope
        };
        self.ctx.enter_scope();
        for param in &function.params {
            self.ctx.declare(param.clone(), TypeTag::Any);
        }
        let body = self.block(&function.body, &inner);
        self.ctx.exit_scope();
        JavaExpr::Lambda {
            params: function.params.clone(),
            self_binding,
            body,
        }
    }
}
