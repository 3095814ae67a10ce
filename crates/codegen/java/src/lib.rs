//! Java source rendering.
//!
//! Turns a [`js2j_ir::CompilationUnit`] into Java text, either as loose
//! top-level items or wrapped in a generated class.

mod names;
mod printer;

pub use names::{java_string_literal, to_java_name};
pub use printer::{render, render_expr, render_stmt, Layout, RenderOptions, MAP_CLASS};
