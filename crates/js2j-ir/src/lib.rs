//! Syntax trees shared by the js2j pipeline.
//!
//! - [`SourceNode`]: the JavaScript tree produced by the front-end.
//! - [`JavaItem`] and friends: the Java tree built by the translators.
//! - [`TypeTag`]: the type lattice joining the two.

pub mod java;
pub mod source;
mod types;

pub use java::{
    Block, CatchBlock, ClassDecl, CompilationUnit, ConstructorDecl, ElseBranch, FieldDecl,
    ForInit, JavaAssignOp, JavaBinaryOp, JavaExpr, JavaItem, JavaStmt, JavaUnaryOp, Literal,
    LocalVar, MethodDecl, Param, SwitchEntry,
};
pub use source::{
    AssignOp, BinaryOp, CatchClause, DeclKind, Declarator, Function, LogicalOp, Property,
    SourceNode, SwitchCase, UnaryOp, UpdateOp,
};
pub use types::TypeTag;

#[cfg(test)]
mod tests;
