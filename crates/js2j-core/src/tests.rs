//! Whole-file conversion tests: fallback, layout, naming.

use super::*;
use std::path::Path;

fn errors(translation: &Translation) -> usize {
    translation
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count()
}

// =============================================================================
// Fallback
// =============================================================================

#[test]
fn test_parsing_file_has_no_errors() {
    let translation = translate_file("var a = 1;\nvar b = a + 2;\n", &Config::default());
    assert_eq!(translation.java, "int a = 1;\n\nint b = a + 2;\n");
    assert_eq!(errors(&translation), 0);
}

#[test]
fn test_bad_block_becomes_placeholder() {
    let translation = translate_file("var a = 1;\nvar broken = ;\nvar b = 2;\n", &Config::default());
    assert_eq!(
        translation.java,
        "int a = 1;\n\n// block failed to translate: var broken = ;\n\nint b = 2;\n"
    );
    assert_eq!(errors(&translation), 1);
    assert!(translation.diagnostics[0].message.starts_with("line 2:"));
}

#[test]
fn test_fallback_keeps_functions_whole() {
    let source = "function f(x) {\n  return x + 1;\n}\n\nvar = oops;\n";
    let translation = translate_file(source, &Config::default());
    assert!(translation.java.contains("return x + 1;"), "{}", translation.java);
    assert!(translation.java.contains("// block failed to translate: var = oops;"));
    assert_eq!(errors(&translation), 1);
}

#[test]
fn test_empty_input() {
    assert_eq!(translate_str(""), "// conversion produced no output\n");
    assert_eq!(translate_str("\n  \n"), "// conversion produced no output\n");
}

// =============================================================================
// Settings
// =============================================================================

#[test]
fn test_class_layout_wraps_unit() {
    let config = Config {
        layout: Layout::Class,
        ..Config::default()
    };
    let java = translate_named("var a = 1;\nconsole.log(a);\n", "Main", &config).java;
    assert!(java.starts_with("import java.util.*;\n"), "{java}");
    assert!(java.contains("public class Main {"), "{java}");
    assert!(java.contains("    static int a = 1;"), "{java}");
    assert!(java.contains("    public static void main(String[] args) {\n        System.out.println(a);\n    }"), "{java}");
}

#[test]
fn test_configured_class_name_wins() {
    let config = Config {
        layout: Layout::Class,
        class_name: Some("App".to_string()),
        ..Config::default()
    };
    let java = translate_named("var a = 1;\n", "Other", &config).java;
    assert!(java.contains("public class App {"), "{java}");
}

#[test]
fn test_normalization_can_be_disabled() {
    let source = "var name = \"Ada\";\nvar s = `hi ${name}`;\n";
    let normalized = translate_file(source, &Config::default()).java;
    assert!(normalized.contains("\"hi \" + name"), "{normalized}");

    let raw = Config {
        normalize: false,
        ..Config::default()
    };
    assert!(!translate_file(source, &raw).java.contains("\"hi \" + name"));
}

#[test]
fn test_repair_can_be_disabled() {
    let source = "for (var i = 0; i < 3; typeof i) {\n  f(i);\n}\n";
    let raw = Config {
        repair: false,
        ..Config::default()
    };
    let unrepaired = translate_file(source, &raw).java;
    assert!(unrepaired.contains("i < 3; \"/* unsupported: typeof */\") {"), "{unrepaired}");
    let repaired = translate_file(source, &Config::default()).java;
    assert!(repaired.contains("for (int i = 0; i < 3; i++) {"), "{repaired}");
}

// =============================================================================
// Naming
// =============================================================================

#[test]
fn test_class_name_for_paths() {
    assert_eq!(class_name_for(Path::new("src/user-profile.js")), "UserProfile");
    assert_eq!(class_name_for(Path::new("main.js")), "Main");
    assert_eq!(class_name_for(Path::new("3d_model.js")), "_3dModel");
    assert_eq!(class_name_for(Path::new("---.js")), "GeneratedClass");
}
