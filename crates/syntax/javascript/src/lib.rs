//! JavaScript front-end.
//!
//! Uses tree-sitter for parsing JavaScript, then lowers the CST into
//! [`js2j_ir::SourceNode`] statements.

mod parser;

pub use parser::{parse, ParseError};
