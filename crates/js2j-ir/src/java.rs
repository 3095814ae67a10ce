//! Java syntax tree built by the translators.
//!
//! Mirrors the shape of [`crate::SourceNode`] but every declaration position
//! carries a [`TypeTag`]. The tree is mutable while under construction
//! ([`Block::push`], [`ClassDecl`] field vectors) and is consumed once by the
//! printer.

use crate::TypeTag;
use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// Operators
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JavaBinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
}

impl JavaBinaryOp {
    pub fn token(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::UShr => ">>>",
        }
    }

    /// Binding strength, higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::BitOr => 3,
            Self::BitXor => 4,
            Self::BitAnd => 5,
            Self::Eq | Self::NotEq => 6,
            Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => 7,
            Self::Shl | Self::Shr | Self::UShr => 8,
            Self::Add | Self::Sub => 9,
            Self::Mul | Self::Div | Self::Rem => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JavaUnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JavaAssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
}

impl JavaAssignOp {
    pub fn token(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::Add => "+=",
            Self::Sub => "-=",
            Self::Mul => "*=",
            Self::Div => "/=",
            Self::Rem => "%=",
            Self::BitAnd => "&=",
            Self::BitOr => "|=",
            Self::BitXor => "^=",
            Self::Shl => "<<=",
            Self::Shr => ">>=",
            Self::UShr => ">>>=",
        }
    }
}

// -----------------------------------------------------------------------------
// Expressions
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "literal", content = "value", rename_all = "snake_case")]
pub enum Literal {
    /// Unescaped contents; the printer escapes.
    Str(String),
    Int(String),
    Double(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "java_expr", rename_all = "snake_case")]
pub enum JavaExpr {
    Literal { value: Literal },
    Name { name: String },
    This,
    Binary {
        op: JavaBinaryOp,
        left: Box<JavaExpr>,
        right: Box<JavaExpr>,
    },
    Unary {
        op: JavaUnaryOp,
        operand: Box<JavaExpr>,
    },
    Assign {
        op: JavaAssignOp,
        target: Box<JavaExpr>,
        value: Box<JavaExpr>,
    },
    /// `scope.name(args)`, or `name(args)` without a scope.
    Call {
        scope: Option<Box<JavaExpr>>,
        name: String,
        args: Vec<JavaExpr>,
    },
    FieldAccess {
        scope: Box<JavaExpr>,
        field: String,
    },
    ArrayAccess {
        array: Box<JavaExpr>,
        index: Box<JavaExpr>,
    },
    Conditional {
        test: Box<JavaExpr>,
        then: Box<JavaExpr>,
        otherwise: Box<JavaExpr>,
    },
    New {
        class: String,
        args: Vec<JavaExpr>,
    },
    InstanceOf {
        expr: Box<JavaExpr>,
        class: String,
    },
    Cast {
        ty: String,
        expr: Box<JavaExpr>,
    },
    /// `Arrays.asList(..)`, or `new ArrayList<>()` when empty.
    ListOf { elements: Vec<JavaExpr> },
    /// `new T[] {..}`, used for closure argument packs.
    ArrayOf { ty: String, elements: Vec<JavaExpr> },
    /// Keyed-map construction with ordered insertions.
    MapOf { entries: Vec<(String, JavaExpr)> },
    /// `(Function<Object[], Object>) (args) -> { .. }`.
    ///
    /// Parameters are unpacked from `args`; with `self_binding` the first slot
    /// holds the enclosing map and is bound to `self`.
    Lambda {
        params: Vec<String>,
        self_binding: bool,
        body: Block,
    },
    /// Stand-in for an expression with no translation.
    Placeholder { kind: String },
}

impl JavaExpr {
    pub fn name(name: impl Into<String>) -> Self {
        JavaExpr::Name { name: name.into() }
    }

    pub fn string(value: impl Into<String>) -> Self {
        JavaExpr::Literal {
            value: Literal::Str(value.into()),
        }
    }

    pub fn int(raw: impl Into<String>) -> Self {
        JavaExpr::Literal {
            value: Literal::Int(raw.into()),
        }
    }

    pub fn null() -> Self {
        JavaExpr::Literal {
            value: Literal::Null,
        }
    }

    pub fn binary(op: JavaBinaryOp, left: JavaExpr, right: JavaExpr) -> Self {
        JavaExpr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(operand: JavaExpr) -> Self {
        JavaExpr::Unary {
            op: JavaUnaryOp::Not,
            operand: Box::new(operand),
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<JavaExpr>) -> Self {
        JavaExpr::Call {
            scope: None,
            name: name.into(),
            args,
        }
    }

    pub fn method(scope: JavaExpr, name: impl Into<String>, args: Vec<JavaExpr>) -> Self {
        JavaExpr::Call {
            scope: Some(Box::new(scope)),
            name: name.into(),
            args,
        }
    }

    pub fn field(scope: JavaExpr, field: impl Into<String>) -> Self {
        JavaExpr::FieldAccess {
            scope: Box::new(scope),
            field: field.into(),
        }
    }

    pub fn assign(op: JavaAssignOp, target: JavaExpr, value: JavaExpr) -> Self {
        JavaExpr::Assign {
            op,
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    pub fn placeholder(kind: impl Into<String>) -> Self {
        JavaExpr::Placeholder { kind: kind.into() }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, JavaExpr::Placeholder { .. })
    }

    /// Whether Java accepts this expression as a statement on its own.
    pub fn is_statement_expression(&self) -> bool {
        match self {
            JavaExpr::Assign { .. } | JavaExpr::Call { .. } | JavaExpr::New { .. } => true,
            JavaExpr::Unary { op, .. } => matches!(
                op,
                JavaUnaryOp::PreIncrement
                    | JavaUnaryOp::PreDecrement
                    | JavaUnaryOp::PostIncrement
                    | JavaUnaryOp::PostDecrement
            ),
            _ => false,
        }
    }
}

// -----------------------------------------------------------------------------
// Statements
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<JavaStmt>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stmt: JavaStmt) {
        self.stmts.push(stmt);
    }

    pub fn extend(&mut self, stmts: impl IntoIterator<Item = JavaStmt>) {
        self.stmts.extend(stmts);
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    pub fn last(&self) -> Option<&JavaStmt> {
        self.stmts.last()
    }
}

impl From<Vec<JavaStmt>> for Block {
    fn from(stmts: Vec<JavaStmt>) -> Self {
        Self { stmts }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "else", rename_all = "snake_case")]
pub enum ElseBranch {
    Block { block: Block },
    If { stmt: Box<JavaStmt> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalVar {
    pub ty: TypeTag,
    pub name: String,
    pub init: Option<JavaExpr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "init", rename_all = "snake_case")]
pub enum ForInit {
    Declare { vars: Vec<LocalVar> },
    Expressions { exprs: Vec<JavaExpr> },
}

/// One arrow-form `case` entry. Empty `labels` is the default entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchEntry {
    pub labels: Vec<JavaExpr>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchBlock {
    pub param: String,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum JavaStmt {
    LocalVar(LocalVar),
    Expr { expr: JavaExpr },
    If {
        test: JavaExpr,
        then: Block,
        otherwise: Option<ElseBranch>,
    },
    For {
        init: Option<ForInit>,
        test: Option<JavaExpr>,
        update: Vec<JavaExpr>,
        body: Block,
    },
    ForEach {
        ty: TypeTag,
        name: String,
        iterable: JavaExpr,
        body: Block,
    },
    While { test: JavaExpr, body: Block },
    DoWhile { body: Block, test: JavaExpr },
    Switch {
        selector: JavaExpr,
        entries: Vec<SwitchEntry>,
    },
    Return { value: Option<JavaExpr> },
    Break { label: Option<String> },
    Continue { label: Option<String> },
    Throw { value: JavaExpr },
    Try {
        body: Block,
        catch: Option<CatchBlock>,
        finally: Option<Block>,
    },
    /// A `//` comment line.
    Comment { text: String },
}

impl JavaStmt {
    pub fn expr(expr: JavaExpr) -> Self {
        JavaStmt::Expr { expr }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        JavaStmt::Comment { text: text.into() }
    }

    pub fn local(ty: TypeTag, name: impl Into<String>, init: Option<JavaExpr>) -> Self {
        JavaStmt::LocalVar(LocalVar {
            ty,
            name: name.into(),
            init,
        })
    }

    /// Whether control cannot fall off the end of this statement.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JavaStmt::Return { .. }
                | JavaStmt::Throw { .. }
                | JavaStmt::Break { .. }
                | JavaStmt::Continue { .. }
        )
    }
}

// -----------------------------------------------------------------------------
// Declarations
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub ty: TypeTag,
    pub name: String,
}

impl Param {
    pub fn new(ty: TypeTag, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub return_ty: TypeTag,
    pub params: Vec<Param>,
    pub body: Block,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub ty: TypeTag,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    pub params: Vec<Param>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    pub superclass: Option<String>,
    pub fields: Vec<FieldDecl>,
    pub constructor: Option<ConstructorDecl>,
    pub methods: Vec<MethodDecl>,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            fields: Vec::new(),
            constructor: None,
            methods: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// A top-level output item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum JavaItem {
    /// A top-level statement; variable declarations become fields in class
    /// layout.
    Stmt { stmt: JavaStmt },
    Method { method: MethodDecl },
    Class { class: ClassDecl },
    /// Comment standing in for a region that could not be translated.
    Placeholder { text: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub items: Vec<JavaItem>,
}

impl CompilationUnit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: JavaItem) {
        self.items.push(item);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
