//! JavaScript syntax tree, as produced by the front-end.
//!
//! The tree is immutable once built and covers the subset of the language the
//! normalizer leaves behind. Anything outside that subset is carried as
//! [`SourceNode::Unsupported`] so translation can degrade instead of failing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Eq,
    StrictEq,
    NotEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
    In,
    InstanceOf,
}

impl BinaryOp {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Rem,
            "**" => Self::Pow,
            "==" => Self::Eq,
            "===" => Self::StrictEq,
            "!=" => Self::NotEq,
            "!==" => Self::StrictNotEq,
            "<" => Self::Lt,
            "<=" => Self::LtEq,
            ">" => Self::Gt,
            ">=" => Self::GtEq,
            "&" => Self::BitAnd,
            "|" => Self::BitOr,
            "^" => Self::BitXor,
            "<<" => Self::Shl,
            ">>" => Self::Shr,
            ">>>" => Self::UShr,
            "in" => Self::In,
            "instanceof" => Self::InstanceOf,
            _ => return None,
        })
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::StrictEq
                | Self::NotEq
                | Self::StrictNotEq
                | Self::Lt
                | Self::LtEq
                | Self::Gt
                | Self::GtEq
        )
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Rem | Self::Pow
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOp {
    And,
    Or,
    Nullish,
}

impl LogicalOp {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "&&" => Some(Self::And),
            "||" => Some(Self::Or),
            "??" => Some(Self::Nullish),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    TypeOf,
    Void,
    Delete,
}

impl UnaryOp {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "-" => Self::Neg,
            "+" => Self::Plus,
            "!" => Self::Not,
            "~" => Self::BitNot,
            "typeof" => Self::TypeOf,
            "void" => Self::Void,
            "delete" => Self::Delete,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOp {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
    And,
    Or,
    Nullish,
}

impl AssignOp {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "=" => Self::Assign,
            "+=" => Self::Add,
            "-=" => Self::Sub,
            "*=" => Self::Mul,
            "/=" => Self::Div,
            "%=" => Self::Rem,
            "**=" => Self::Pow,
            "&=" => Self::BitAnd,
            "|=" => Self::BitOr,
            "^=" => Self::BitXor,
            "<<=" => Self::Shl,
            ">>=" => Self::Shr,
            ">>>=" => Self::UShr,
            "&&=" => Self::And,
            "||=" => Self::Or,
            "??=" => Self::Nullish,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declarator {
    pub name: String,
    pub init: Option<SourceNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    pub value: SourceNode,
}

/// A function declaration or expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Vec<SourceNode>,
    /// Raw source of the body, braces included. Used by return-type scanning.
    pub body_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    /// `None` for `default:`.
    pub test: Option<SourceNode>,
    pub body: Vec<SourceNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub param: Option<String>,
    pub body: Vec<SourceNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum SourceNode {
    // -------------------------------------------------------------------------
    // Literals
    // -------------------------------------------------------------------------
    /// Decoded string contents, escapes already resolved.
    Text { value: String },
    /// Numeric lexeme as written.
    Number { raw: String },
    Boolean { value: bool },
    Null,
    Undefined,

    // -------------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------------
    Identifier { name: String },
    This,
    Binary {
        op: BinaryOp,
        left: Box<SourceNode>,
        right: Box<SourceNode>,
    },
    Logical {
        op: LogicalOp,
        left: Box<SourceNode>,
        right: Box<SourceNode>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<SourceNode>,
    },
    /// `++`/`--`. Byte offsets decide prefix vs. postfix.
    Update {
        op: UpdateOp,
        operand: Box<SourceNode>,
        operator_start: usize,
        operand_start: usize,
    },
    Assign {
        op: AssignOp,
        target: Box<SourceNode>,
        value: Box<SourceNode>,
    },
    Call {
        callee: Box<SourceNode>,
        args: Vec<SourceNode>,
    },
    New {
        callee: Box<SourceNode>,
        args: Vec<SourceNode>,
    },
    Member {
        object: Box<SourceNode>,
        property: String,
    },
    Index {
        object: Box<SourceNode>,
        index: Box<SourceNode>,
    },
    Conditional {
        test: Box<SourceNode>,
        consequent: Box<SourceNode>,
        alternate: Box<SourceNode>,
    },
    Sequence { expressions: Vec<SourceNode> },
    Array { elements: Vec<SourceNode> },
    Object { properties: Vec<Property> },
    Function(Function),

    // -------------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------------
    VarDecl {
        kind: DeclKind,
        declarators: Vec<Declarator>,
    },
    ExprStmt { expression: Box<SourceNode> },
    Block { body: Vec<SourceNode> },
    If {
        test: Box<SourceNode>,
        consequent: Box<SourceNode>,
        alternate: Option<Box<SourceNode>>,
    },
    For {
        init: Option<Box<SourceNode>>,
        test: Option<Box<SourceNode>>,
        update: Option<Box<SourceNode>>,
        body: Box<SourceNode>,
    },
    ForIn {
        binding: String,
        object: Box<SourceNode>,
        body: Box<SourceNode>,
    },
    While {
        test: Box<SourceNode>,
        body: Box<SourceNode>,
    },
    DoWhile {
        body: Box<SourceNode>,
        test: Box<SourceNode>,
    },
    Switch {
        discriminant: Box<SourceNode>,
        cases: Vec<SwitchCase>,
    },
    Return { argument: Option<Box<SourceNode>> },
    Break { label: Option<String> },
    Continue { label: Option<String> },
    Throw { argument: Box<SourceNode> },
    Try {
        block: Vec<SourceNode>,
        handler: Option<CatchClause>,
        finalizer: Option<Vec<SourceNode>>,
    },
    Empty,
    /// Comment text without the `//` or `/* */` markers.
    Comment { text: String },

    /// A construct the front-end recognised but has no lowering for.
    Unsupported { kind: String, text: String },
}

impl SourceNode {
    pub fn identifier(name: impl Into<String>) -> Self {
        SourceNode::Identifier { name: name.into() }
    }

    pub fn text(value: impl Into<String>) -> Self {
        SourceNode::Text {
            value: value.into(),
        }
    }

    pub fn number(raw: impl Into<String>) -> Self {
        SourceNode::Number { raw: raw.into() }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            SourceNode::Identifier { name } => Some(name),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            SourceNode::Function(function) => Some(function),
            _ => None,
        }
    }

    /// The dotted path of an identifier/member chain, e.g. `console.log`.
    pub fn member_path(&self) -> Option<String> {
        match self {
            SourceNode::Identifier { name } => Some(name.clone()),
            SourceNode::This => Some("this".into()),
            SourceNode::Member { object, property } => {
                object.member_path().map(|base| format!("{base}.{property}"))
            }
            _ => None,
        }
    }

    /// Visit this node and everything below it, parents first. Nested
    /// function bodies are included.
    pub fn visit<'a, F: FnMut(&'a SourceNode)>(&'a self, f: &mut F) {
        f(self);
        let each = |nodes: &'a [SourceNode], f: &mut F| {
            for node in nodes {
                node.visit(f);
            }
        };
        match self {
            SourceNode::Binary { left, right, .. } | SourceNode::Logical { left, right, .. } => {
                left.visit(f);
                right.visit(f);
            }
            SourceNode::Unary { operand, .. } | SourceNode::Update { operand, .. } => {
                operand.visit(f)
            }
            SourceNode::Assign { target, value, .. } => {
                target.visit(f);
                value.visit(f);
            }
            SourceNode::Call { callee, args } | SourceNode::New { callee, args } => {
                callee.visit(f);
                each(args, f);
            }
            SourceNode::Member { object, .. } => object.visit(f),
            SourceNode::Index { object, index } => {
                object.visit(f);
                index.visit(f);
            }
            SourceNode::Conditional {
                test,
                consequent,
                alternate,
            } => {
                test.visit(f);
                consequent.visit(f);
                alternate.visit(f);
            }
            SourceNode::Sequence { expressions: nodes }
            | SourceNode::Array { elements: nodes }
            | SourceNode::Block { body: nodes } => each(nodes, f),
            SourceNode::Object { properties } => {
                for property in properties {
                    property.value.visit(f);
                }
            }
            SourceNode::Function(function) => each(&function.body, f),
            SourceNode::VarDecl { declarators, .. } => {
                for init in declarators.iter().filter_map(|d| d.init.as_ref()) {
                    init.visit(f);
                }
            }
            SourceNode::ExprStmt { expression } => expression.visit(f),
            SourceNode::If {
                test,
                consequent,
                alternate,
            } => {
                test.visit(f);
                consequent.visit(f);
                if let Some(alternate) = alternate {
                    alternate.visit(f);
                }
            }
            SourceNode::For {
                init,
                test,
                update,
                body,
            } => {
                for part in [init, test, update].into_iter().flatten() {
                    part.visit(f);
                }
                body.visit(f);
            }
            SourceNode::ForIn { object, body, .. } => {
                object.visit(f);
                body.visit(f);
            }
            SourceNode::While { test, body } | SourceNode::DoWhile { body, test } => {
                test.visit(f);
                body.visit(f);
            }
            SourceNode::Switch {
                discriminant,
                cases,
            } => {
                discriminant.visit(f);
                for case in cases {
                    if let Some(test) = &case.test {
                        test.visit(f);
                    }
                    each(&case.body, f);
                }
            }
            SourceNode::Return { argument } => {
                if let Some(argument) = argument {
                    argument.visit(f);
                }
            }
            SourceNode::Throw { argument } => argument.visit(f),
            SourceNode::Try {
                block,
                handler,
                finalizer,
            } => {
                each(block, f);
                if let Some(handler) = handler {
                    each(&handler.body, f);
                }
                if let Some(finalizer) = finalizer {
                    each(finalizer, f);
                }
            }
            SourceNode::Text { .. }
            | SourceNode::Number { .. }
            | SourceNode::Boolean { .. }
            | SourceNode::Null
            | SourceNode::Undefined
            | SourceNode::Identifier { .. }
            | SourceNode::This
            | SourceNode::Break { .. }
            | SourceNode::Continue { .. }
            | SourceNode::Empty
            | SourceNode::Comment { .. }
            | SourceNode::Unsupported { .. } => {}
        }
    }

    /// Short name for diagnostics and placeholders.
    pub fn kind_name(&self) -> &str {
        match self {
            SourceNode::Text { .. } => "Text",
            SourceNode::Number { .. } => "Number",
            SourceNode::Boolean { .. } => "Boolean",
            SourceNode::Null => "Null",
            SourceNode::Undefined => "Undefined",
            SourceNode::Identifier { .. } => "Identifier",
            SourceNode::This => "This",
            SourceNode::Binary { .. } => "Binary",
            SourceNode::Logical { .. } => "Logical",
            SourceNode::Unary { .. } => "Unary",
            SourceNode::Update { .. } => "Update",
            SourceNode::Assign { .. } => "Assign",
            SourceNode::Call { .. } => "Call",
            SourceNode::New { .. } => "New",
            SourceNode::Member { .. } => "Member",
            SourceNode::Index { .. } => "Index",
            SourceNode::Conditional { .. } => "Conditional",
            SourceNode::Sequence { .. } => "Sequence",
            SourceNode::Array { .. } => "Array",
            SourceNode::Object { .. } => "Object",
            SourceNode::Function(_) => "Function",
            SourceNode::VarDecl { .. } => "VarDecl",
            SourceNode::ExprStmt { .. } => "ExprStmt",
            SourceNode::Block { .. } => "Block",
            SourceNode::If { .. } => "If",
            SourceNode::For { .. } => "For",
            SourceNode::ForIn { .. } => "ForIn",
            SourceNode::While { .. } => "While",
            SourceNode::DoWhile { .. } => "DoWhile",
            SourceNode::Switch { .. } => "Switch",
            SourceNode::Return { .. } => "Return",
            SourceNode::Break { .. } => "Break",
            SourceNode::Continue { .. } => "Continue",
            SourceNode::Throw { .. } => "Throw",
            SourceNode::Try { .. } => "Try",
            SourceNode::Empty => "Empty",
            SourceNode::Comment { .. } => "Comment",
            SourceNode::Unsupported { kind, .. } => kind,
        }
    }
}
