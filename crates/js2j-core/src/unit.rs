//! Whole-file conversion: normalize, parse, translate, render, repair.

use std::path::Path;

use js2j_codegen_java::{render, to_java_name, Layout};
use js2j_ir::{CompilationUnit, JavaItem};
use tracing::{debug, warn};

use crate::blocks::split_into_blocks;
use crate::config::Config;
use crate::diagnostics::Diagnostic;
use crate::normalize::normalize;
use crate::repair::RepairPipeline;
use crate::translate::UnitTranslator;

/// Java text for one source file plus what the translator wants checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub java: String,
    pub diagnostics: Vec<Diagnostic>,
    /// The public wrapper class, in class layout. Java wants it in a file
    /// of the same name.
    pub class_name: Option<String>,
}

/// Convert with default settings, returning only the Java text.
pub fn translate_str(source: &str) -> String {
    translate_file(source, &Config::default()).java
}

pub fn translate_file(source: &str, config: &Config) -> Translation {
    translate_named(source, &config.default_class_name, config)
}

/// Convert one file. `class_name` names the unit in logs and, in class
/// layout, the wrapper class.
///
/// Never fails: when the file does not parse as a whole it is split into
/// top-level blocks, and blocks that still fail become placeholder comments.
pub fn translate_named(source: &str, class_name: &str, config: &Config) -> Translation {
    let source = if config.normalize {
        normalize(source)
    } else {
        source.to_string()
    };

    let mut translator = UnitTranslator::new(config);
    let mut unit = CompilationUnit::new();

    match js2j_syntax_javascript::parse(&source, Some(class_name)) {
        Ok(nodes) => unit.items = translator.translate_program(&nodes),
        Err(err) => {
            debug!(unit = class_name, error = %err, "file did not parse, translating by block");
            for block in split_into_blocks(&source) {
                match js2j_syntax_javascript::parse(&block.text, Some(class_name)) {
                    Ok(nodes) => unit.items.extend(translator.translate_program(&nodes)),
                    Err(err) => {
                        let first_line = block
                            .text
                            .lines()
                            .map(str::trim)
                            .find(|line| !line.is_empty())
                            .unwrap_or_default();
                        warn!(unit = class_name, line = block.line, error = %err, "block failed to translate");
                        translator.report(Diagnostic::error(format!(
                            "line {}: block failed to translate: {err}",
                            block.line
                        )));
                        unit.push(JavaItem::Placeholder {
                            text: format!("block failed to translate: {first_line}"),
                        });
                    }
                }
            }
        }
    }

    if unit.is_empty() {
        unit.push(JavaItem::Placeholder {
            text: "conversion produced no output".to_string(),
        });
    }

    let options = config.render_options(class_name);
    let mut java = render(&unit, &options);
    if config.repair {
        java = RepairPipeline::standard(config.indent_width).run(&java);
    }
    Translation {
        java,
        diagnostics: translator.into_diagnostics(),
        class_name: (options.layout == Layout::Class).then(|| to_java_name(&options.class_name)),
    }
}

/// Wrapper class name for a source path: the file stem in PascalCase.
pub fn class_name_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    let mut name: String = stem
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();
    if name.is_empty() {
        return "GeneratedClass".to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}
