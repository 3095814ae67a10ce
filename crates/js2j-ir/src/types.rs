//! The static type lattice assigned by inference.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A target static type.
///
/// Every declaration, parameter, and method result in the target tree carries
/// exactly one of these. `Any` is the fallback when inference has no signal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "element", rename_all = "snake_case")]
pub enum TypeTag {
    Text,
    Integer,
    Real,
    Boolean,
    Any,
    OrderedList(Box<TypeTag>),
    /// String keys, untyped values.
    KeyedMap,
    Void,
}

impl TypeTag {
    pub fn list_of(element: TypeTag) -> Self {
        TypeTag::OrderedList(Box::new(element))
    }

    pub fn is_any(&self) -> bool {
        matches!(self, TypeTag::Any)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, TypeTag::Integer | TypeTag::Real)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            TypeTag::Integer | TypeTag::Real | TypeTag::Boolean | TypeTag::Void
        )
    }

    /// Java spelling in a declaration position.
    pub fn java_name(&self) -> String {
        match self {
            TypeTag::Text => "String".into(),
            TypeTag::Integer => "int".into(),
            TypeTag::Real => "double".into(),
            TypeTag::Boolean => "boolean".into(),
            TypeTag::Any => "Object".into(),
            TypeTag::OrderedList(element) => format!("List<{}>", element.boxed_name()),
            TypeTag::KeyedMap => "Map<String, Object>".into(),
            TypeTag::Void => "void".into(),
        }
    }

    /// Java spelling in a generic argument position, where primitives box.
    pub fn boxed_name(&self) -> String {
        match self {
            TypeTag::Integer => "Integer".into(),
            TypeTag::Real => "Double".into(),
            TypeTag::Boolean => "Boolean".into(),
            TypeTag::Void => "Void".into(),
            other => other.java_name(),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.java_name())
    }
}
