//! Runs the built `js2j` binary against temporary input trees.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn js2j(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_js2j"))
        .args(args)
        .current_dir(cwd)
        .env("RUST_LOG", "off")
        .output()
        .expect("js2j runs")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// =============================================================================
// convert
// =============================================================================

#[test]
fn test_convert_directory_mirrors_tree() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(src.join("util")).unwrap();
    fs::write(src.join("main.js"), "var a = 1;\n").unwrap();
    fs::write(src.join("util/strings.js"), "function shout(text) {\n  return text + \"!\";\n}\n").unwrap();
    fs::write(src.join("notes.txt"), "not javascript").unwrap();

    let output = js2j(&["convert", "src", "-o", "out"], dir.path());
    assert!(output.status.success(), "{output:?}");

    let main = fs::read_to_string(dir.path().join("out/main.java")).unwrap();
    assert_eq!(main, "int a = 1;\n");
    let strings = fs::read_to_string(dir.path().join("out/util/strings.java")).unwrap();
    assert!(strings.contains("String shout(String text) {"), "{strings}");
    assert!(!dir.path().join("out/notes.java").exists());
    assert_eq!(stdout(&output).lines().count(), 2);
}

#[test]
fn test_convert_single_file_with_class_layout() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("hello-world.js"), "console.log(\"hi\");\n").unwrap();

    let output = js2j(
        &["convert", "hello-world.js", "--layout", "class", "--jobs", "1"],
        dir.path(),
    );
    assert!(output.status.success(), "{output:?}");

    let java = fs::read_to_string(dir.path().join("java-output/HelloWorld.java")).unwrap();
    assert!(java.contains("public class HelloWorld {"), "{java}");
    assert!(java.contains("System.out.println(\"hi\");"), "{java}");
    assert!(!dir.path().join("java-output/hello-world.java").exists());
}

#[test]
fn test_class_layout_file_follows_configured_class() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src/app")).unwrap();
    fs::write(dir.path().join("src/app/main-entry.js"), "var a = 1;\n").unwrap();
    fs::write(dir.path().join("js2j.toml"), "layout = \"class\"\nclass-name = \"App\"\n").unwrap();

    let output = js2j(&["convert", "src", "--config", "js2j.toml"], dir.path());
    assert!(output.status.success(), "{output:?}");
    let java = fs::read_to_string(dir.path().join("java-output/app/App.java")).unwrap();
    assert!(java.contains("public class App {"), "{java}");
    assert!(stdout(&output).contains("App.java"));
}

#[test]
fn test_convert_reads_config_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.js"), "function f() {\n  return 1;\n}\n").unwrap();
    fs::write(dir.path().join("js2j.toml"), "indent-width = 2\n").unwrap();

    let output = js2j(&["convert", "a.js", "--config", "js2j.toml"], dir.path());
    assert!(output.status.success(), "{output:?}");
    let java = fs::read_to_string(dir.path().join("java-output/a.java")).unwrap();
    assert_eq!(java, "int f() {\n  return 1;\n}\n");
}

#[test]
fn test_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = js2j(&["convert", "absent"], dir.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
}

#[test]
fn test_unparseable_file_still_converts() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.js"), "var a = 1;\nvar = ;\n").unwrap();

    let output = js2j(&["convert", "bad.js"], dir.path());
    assert!(output.status.success(), "{output:?}");
    let java = fs::read_to_string(dir.path().join("java-output/bad.java")).unwrap();
    assert!(java.contains("// block failed to translate: var = ;"), "{java}");
}

// =============================================================================
// Other subcommands
// =============================================================================

#[test]
fn test_ast_prints_json() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.js"), "let x = 1;\n").unwrap();

    let output = js2j(&["ast", "a.js"], dir.path());
    assert!(output.status.success(), "{output:?}");
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert!(value.is_array());
    assert_eq!(value.as_array().unwrap().len(), 1);
}

#[test]
fn test_normalize_prints_source() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.js"), "const f = (x) => x + 1;\n").unwrap();

    let output = js2j(&["normalize", "a.js"], dir.path());
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout(&output), "var f = function(x) { return x + 1; };\n");
}

#[test]
fn test_repair_prints_fixed_java() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("A.java"), "void f() {\nif (a) {\nb();\n}\nelse {\nc();\n}\n}\n").unwrap();

    let output = js2j(&["repair", "A.java"], dir.path());
    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        stdout(&output),
        "void f() {\n    if (a) {\n        b();\n    } else {\n        c();\n    }\n}\n"
    );
}
