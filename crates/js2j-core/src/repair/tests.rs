//! Pipeline-level tests: rule order, idempotence, and the printer round trip.

use super::*;
use crate::config::Config;
use crate::unit::translate_file;

fn unrepaired(source: &str) -> String {
    let config = Config {
        repair: false,
        ..Config::default()
    };
    translate_file(source, &config).java
}

fn assert_idempotent(text: &str) {
    let once = repair(text);
    let twice = repair(&once);
    assert_eq!(once, twice, "second run changed:\n{once}");
}

#[test]
fn test_standard_rule_order() {
    assert_eq!(
        RepairPipeline::standard(4).rule_names(),
        vec![
            "collapse-blank-lines",
            "flatten-nested-braces",
            "repair-loop-headers",
            "repair-map-blocks",
            "repair-collection-types",
            "repair-conditionals",
            "repair-return-tails",
            "reindent",
        ]
    );
}

#[test]
fn test_empty_pipeline_is_identity() {
    let text = "int  x = 1;\n\n\n\nint y;";
    assert_eq!(RepairPipeline::new(Vec::new()).run(text), text);
}

#[test]
fn test_printer_output_is_a_fixed_point() {
    let java = unrepaired(
        "var user = { name: \"Ada\", tags: [\"a\"] };\nfunction greet(who) {\n  if (who) {\n    console.log(\"hi \" + who);\n  } else {\n    console.log(\"nobody\");\n  }\n}\n",
    );
    assert_eq!(repair(&java), java);
}

#[test]
fn test_collection_parameter_is_a_fixed_point() {
    let java = unrepaired(
        "var numbers = [1, 2, 3];\nconsole.log(numbers.length);\nfunction calculateSum(numbers) {\n  var sum = 0;\n  for (var i = 0; i < numbers.length; i++) {\n    sum += numbers[i];\n  }\n  return sum;\n}",
    );
    assert!(java.contains("int calculateSum(List<Integer> numbers) {"), "{java}");
    assert!(java.contains("System.out.println(numbers.size());"), "{java}");
    assert_eq!(repair(&java), java);
}

#[test]
fn test_hand_edited_java_is_repaired() {
    let text = "void f() {\nObject m = new HashMap<String, Object>() { put(\"a\", 1); put(\"b\", 2); };\n\n\n\nif (a) {\nb();\n}\nelse {\nc();\n}\n}\n}\n";
    let java = repair(text);
    assert_eq!(
        java,
        "void f() {\n    Map<String, Object> m = new HashMap<String, Object>() {{\n        put(\"a\", 1);\n        put(\"b\", 2);\n    }};\n\n    if (a) {\n        b();\n    } else {\n        c();\n    }\n}\n"
    );
    assert_idempotent(text);
}

#[test]
fn test_indent_width_is_configurable() {
    let pipeline = RepairPipeline::standard(2);
    assert_eq!(pipeline.run("void f() {\nx();\n}\n"), "void f() {\n  x();\n}\n");
}
