//! End-to-end conversions of small but complete programs.

use js2j_core::{
    normalize, repair, split_into_blocks, translate_file, translate_named, Config, Layout, Severity,
};

// =============================================================================
// Test Helpers
// =============================================================================

fn convert(source: &str) -> String {
    translate_file(source, &Config::default()).java
}

fn assert_contains(java: &str, needle: &str) {
    assert!(java.contains(needle), "expected `{needle}` in:\n{java}");
}

// =============================================================================
// Functions
// =============================================================================

const CALCULATE_SUM: &str = "function calculateSum(numbers) {\n  let sum = 0;\n  for (let i = 0; i < numbers.length; i++) {\n    sum += numbers[i];\n  }\n  return sum;\n}\n";

#[test]
fn test_sum_over_array() {
    let java = convert(&format!("{CALCULATE_SUM}\nconsole.log(calculateSum([1, 2, 3, 4, 5]));\n"));
    assert_contains(&java, "int calculateSum(List<Integer> numbers) {");
    assert_contains(&java, "for (int i = 0; i < numbers.size(); i++) {");
    assert_contains(&java, "sum += numbers.get(i);");
    assert_contains(&java, "return sum;");
    assert_contains(&java, "System.out.println(calculateSum(Arrays.asList(1, 2, 3, 4, 5)));");
}

#[test]
fn test_sum_over_named_array_in_class() {
    let config = Config {
        layout: Layout::Class,
        ..Config::default()
    };
    let source = format!("var numbers = [1, 2, 3, 4, 5];\n{CALCULATE_SUM}\nconsole.log(calculateSum(numbers));\n");
    let java = translate_named(&source, "Sum", &config).java;
    assert_contains(&java, "static List<Integer> numbers = Arrays.asList(1, 2, 3, 4, 5);");
    assert_contains(&java, "public static int calculateSum(List<Integer> numbers) {");
    assert_contains(&java, "sum += numbers.get(i);");
    assert_contains(&java, "System.out.println(calculateSum(numbers));");
}

#[test]
fn test_arrow_function_becomes_method() {
    let java = convert("const greet = (name) => `Hello, ${name}!`;\n");
    assert_contains(&java, "String greet(String name) {");
    assert_contains(&java, "\"Hello, \" + name + \"!\"");
}

// =============================================================================
// Classes
// =============================================================================

#[test]
fn test_constructor_function_and_prototype() {
    let java = convert(
        "function Person(first, last) {\n  this.firstName = first;\n  this.lastName = last;\n}\n\nPerson.prototype.getFullName = function() {\n  return this.firstName + \" \" + this.lastName;\n};\n",
    );
    assert_contains(&java, "public class Person {");
    assert_contains(&java, "    private String firstName;\n    private String lastName;");
    assert_contains(&java, "public Person(Object first, Object last) {");
    assert_contains(&java, "public String getFullName() {");
}

#[test]
fn test_es_class_goes_through_prototype_form() {
    let java = convert(
        "class Box {\n  constructor(v) {\n    this.v = v;\n  }\n  get() {\n    return this.v;\n  }\n}\n",
    );
    assert_contains(&java, "public class Box {");
    assert_contains(&java, "public Box(Object v) {");
    assert_contains(&java, "return this.v;");
    assert!(!java.contains("prototype"), "{java}");
}

#[test]
fn test_object_literal_method_reads_self() {
    let java = convert(
        "const person = {\n  firstName: \"Ada\",\n  lastName: \"Lovelace\",\n  fullName: function() {\n    return this.firstName + \" \" + this.lastName;\n  }\n};\n",
    );
    assert_contains(&java, "Map<String, Object> person = new LinkedHashMap<String, Object>() {{");
    assert_contains(&java, "return self.get(\"firstName\") + \" \" + self.get(\"lastName\");");
}

// =============================================================================
// Fallback
// =============================================================================

#[test]
fn test_one_bad_block_among_good_ones() {
    let translation = translate_file(
        "var a = 1;\n\nfunction twice(x) {\n  return x * 2;\n}\n\nvar broken = ;\n\nconsole.log(a);\n",
        &Config::default(),
    );
    let java = &translation.java;
    assert_eq!(java.matches("// block failed to translate").count(), 1, "{java}");
    assert_contains(java, "int a = 1;");
    assert_contains(java, "return x * 2;");
    assert_contains(java, "System.out.println(a);");
    assert_eq!(
        translation
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count(),
        1
    );
}

#[test]
fn test_blocks_cover_the_source() {
    let source = "var a = 1;\nfunction f() {\n  return a;\n}\nif (a) {\n  f();\n} else {\n  a = 2;\n}\n";
    let blocks = split_into_blocks(source);
    let joined: String = blocks.iter().map(|block| block.text.as_str()).collect();
    assert_eq!(joined, source);
    assert_eq!(blocks.len(), 3);
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_output_is_stable_under_repair() {
    let sources = [
        "var xs = [1, 2, 3];\nfor (var i = 0; i < xs.length; i++) { console.log(xs[i]); }\n",
        "function Person(n) { this.name = n; }\nPerson.prototype.hi = function() { return \"hi \" + this.name; };\n",
        "var m = { a: 1, b: { c: 2 } };\nif (m.a) { m.b = null; } else { m.a = 0; }\n",
        "switch (x) { case 1: case 2: y(); break; default: z(); }\n",
    ];
    for source in sources {
        let java = convert(source);
        assert_eq!(repair(&java), java, "repair changed converted output of:\n{source}");
    }
}

#[test]
fn test_numeric_literals_are_valid_java() {
    let java = convert(
        "var a = 0o17;\nvar b = 0x1F;\nvar c = .5;\nvar d = 1e3;\nvar e = 10n;\nvar f = 5000000000;\n",
    );
    assert_contains(&java, "a = 15;");
    assert_contains(&java, "b = 0x1F;");
    assert_contains(&java, "c = 0.5;");
    assert_contains(&java, "d = 1000;");
    assert_contains(&java, "e = 10L;");
    assert_contains(&java, "double f = 5000000000L;");
}

#[test]
fn test_numeric_literals_past_int_range() {
    let java = convert("var mask = 0xFFFFFFFFFF;\nvar big = 99999999999999999999;\nvar huge = 1e400;\n");
    assert_contains(&java, "double mask = 0xFFFFFFFFFFL;");
    assert_contains(&java, "double big = 1e20;");
    assert_contains(&java, "double huge = Double.POSITIVE_INFINITY;");
}

#[test]
fn test_normalized_source_has_no_modern_syntax() {
    let out = normalize(
        "import fs from \"fs\";\nexport const f = (a) => a + 1;\nlet s = `v=${f(1)}`;\nfor (const x of xs) { console.log(x); }\n",
    );
    assert!(out.starts_with("// import removed: fs\n"), "{out}");
    for token in ["from ", "export ", "=>", "`", "let ", "const ", " of "] {
        assert!(!out.contains(token), "`{token}` left in:\n{out}");
    }
}
