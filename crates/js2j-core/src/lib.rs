//! JavaScript to Java source translation.
//!
//! A file goes through five stages:
//!
//! 1. [`normalize`] rewrites newer syntax (classes, arrows, templates,
//!    `let`/`const`, `for..of`, modules) into the older forms the
//!    translators understand.
//! 2. The front-end parses the result into [`js2j_ir::SourceNode`]s.
//! 3. [`UnitTranslator`] lowers them to Java items, using [`infer`] to pick
//!    declared types.
//! 4. The printer renders the Java tree.
//! 5. The [`RepairPipeline`] patches the rendered text.
//!
//! When a file does not parse it is split into top-level blocks
//! ([`split_into_blocks`]) and each block is translated on its own.

mod blocks;
mod config;
mod diagnostics;
mod infer;
pub mod normalize;
mod number;
pub mod repair;
mod scan;
mod translate;
mod unit;

pub use blocks::{split_into_blocks, SourceBlock};
pub use config::{Config, ConfigError};
pub use diagnostics::{Diagnostic, Severity};
pub use infer::{infer, InferenceContext, Signal};
pub use normalize::normalize;
pub use repair::{repair, RepairPipeline, RepairRule};
pub use translate::UnitTranslator;
pub use unit::{class_name_for, translate_file, translate_named, translate_str, Translation};

pub use js2j_codegen_java::Layout;

#[cfg(test)]
mod tests;
