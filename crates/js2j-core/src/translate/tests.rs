//! Tests for the translators, checked through rendered Java text.

use super::*;
use crate::diagnostics::Severity;
use js2j_codegen_java::{render, RenderOptions};
use js2j_ir::CompilationUnit;

fn translate_with(source: &str, config: &Config) -> (String, Vec<Diagnostic>) {
    let nodes = js2j_syntax_javascript::parse(source, None).expect("test source parses");
    let mut translator = UnitTranslator::new(config);
    let items = translator.translate_program(&nodes);
    let java = render(&CompilationUnit { items }, &RenderOptions::default());
    (java, translator.into_diagnostics())
}

fn translate(source: &str) -> String {
    translate_with(source, &Config::default()).0
}

fn assert_contains(java: &str, needle: &str) {
    assert!(java.contains(needle), "expected `{needle}` in:\n{java}");
}

fn assert_lacks(java: &str, needle: &str) {
    assert!(!java.contains(needle), "unexpected `{needle}` in:\n{java}");
}

// =============================================================================
// Declarations and functions
// =============================================================================

#[test]
fn test_function_with_loop() {
    let java = translate(
        "function calculateSum(numbers) {\n  var sum = 0;\n  for (var i = 0; i < numbers.length; i++) {\n    sum += numbers[i];\n  }\n  return sum;\n}",
    );
    assert_contains(&java, "int calculateSum(List<Integer> numbers) {");
    assert_contains(&java, "int sum = 0;");
    assert_contains(&java, "for (int i = 0; i < numbers.size(); i++) {");
    assert_contains(&java, "sum += numbers.get(i);");
    assert_contains(&java, "return sum;");
}

#[test]
fn test_parameter_typed_from_call_site() {
    let java = translate(
        "function addAll(values) {\n  var total = 0;\n  for (var i = 0; i < values.length; i++) {\n    total += values[i];\n  }\n  return total;\n}\nvar prices = [1.5, 2.5];\nconsole.log(addAll(prices));",
    );
    assert_contains(&java, "int addAll(List<Double> values) {");
    assert_contains(&java, "total += values.get(i);");
    assert_contains(&java, "System.out.println(addAll(prices));");
}

#[test]
fn test_parameter_used_as_sequence_without_callers() {
    let java = translate("function first(values) {\n  return values[0];\n}\nfunction shout(text) {\n  return text.length;\n}");
    assert_contains(&java, "first(List<Object> values) {");
    assert_contains(&java, "return values.get(0);");
    assert_contains(&java, "shout(String text) {");
    assert_contains(&java, "return text.length();");
}

#[test]
fn test_declaration_types() {
    let java = translate("var greeting = \"hi\";\nvar ratio = 0.5;\nvar isReady = false;\nvar things = [1, 2];\nvar config = {};");
    assert_contains(&java, "String greeting = \"hi\";");
    assert_contains(&java, "double ratio = 0.5;");
    assert_contains(&java, "boolean isReady = false;");
    assert_contains(&java, "List<Integer> things = Arrays.asList(1, 2);");
    assert_contains(&java, "Map<String, Object> config = new LinkedHashMap<String, Object>()");
}

#[test]
fn test_void_function() {
    let java = translate("function log(x) {\n  console.log(x);\n}");
    assert_contains(&java, "void log(Object x) {");
    assert_contains(&java, "System.out.println(x);");
}

#[test]
fn test_function_expression_becomes_method() {
    let java = translate("var describe = function(name) {\n  return \"I am \" + name;\n};");
    assert_contains(&java, "String describe(String name) {");
}

#[test]
fn test_later_calls_use_declared_result() {
    let java = translate("function makeLabel() { return \"x\"; }\nvar out = makeLabel();");
    assert_contains(&java, "String out = makeLabel();");
}

#[test]
fn test_nested_function_is_closure() {
    let java = translate("function outer() {\n  function inner(a) { return a; }\n  return inner(1);\n}");
    assert_contains(&java, "Object inner = (Function<Object[], Object>) (args) -> {");
    assert_contains(&java, "((Function<Object[], Object>) inner).apply(new Object[] {1})");
}

// =============================================================================
// Classes
// =============================================================================

#[test]
fn test_constructor_function_with_prototype() {
    let java = translate(
        "function Person(a, b) {\n  this.firstName = a;\n  this.lastName = b;\n}\nPerson.prototype.fullName = function() {\n  return this.firstName + \" \" + this.lastName;\n};",
    );
    assert_contains(&java, "public class Person {");
    assert_contains(&java, "private String firstName;");
    assert_contains(&java, "private String lastName;");
    assert_contains(&java, "public Person(Object a, Object b) {");
    assert_contains(&java, "this.firstName = (String) a;");
    assert_contains(&java, "public String fullName() {");
    assert_contains(&java, "return this.firstName + \" \" + this.lastName;");
    assert_lacks(&java, "prototype");
}

#[test]
fn test_inheritance_through_object_create() {
    let java = translate(
        "function Animal(name) { this.name = name; }\nfunction Dog(name) { Animal.call(this, name); }\nDog.prototype = Object.create(Animal.prototype);\nDog.prototype.constructor = Dog;\nDog.prototype.speak = function() { return Animal.prototype.speak.call(this); };",
    );
    assert_contains(&java, "public class Dog extends Animal {");
    assert_contains(&java, "super(name);");
    assert_contains(&java, "return super.speak();");
    assert_lacks(&java, "constructor");
}

#[test]
fn test_static_member() {
    let java = translate(
        "function Counter() { this.count = 0; }\nCounter.create = function() { return new Counter(); };",
    );
    assert_contains(&java, "public static Object create() {");
    assert_contains(&java, "return new Counter();");
}

#[test]
fn test_class_shaped_literal() {
    let java = translate(
        "var Shape = {\n  sides: 3,\n  constructor: function(label) { this.label = label; },\n  area: function() { return 0; }\n};",
    );
    assert_contains(&java, "public class Shape {");
    assert_contains(&java, "private int sides;");
    assert_contains(&java, "private String label;");
    assert_contains(&java, "this.sides = 3;");
    assert_contains(&java, "public int area() {");
}

// =============================================================================
// Object literals and closures
// =============================================================================

#[test]
fn test_object_literal_closure_uses_self() {
    let java = translate(
        "var person = {\n  firstName: \"John\",\n  lastName: \"Doe\",\n  fullName: function() {\n    return this.firstName + \" \" + this.lastName;\n  }\n};\nconsole.log(person.fullName());",
    );
    assert_contains(&java, "put(\"firstName\", \"John\");");
    assert_contains(&java, "Map<String, Object> self = (Map<String, Object>) args[0];");
    assert_contains(&java, "return self.get(\"firstName\") + \" \" + self.get(\"lastName\");");
    assert_contains(
        &java,
        "System.out.println(((Function<Object[], Object>) person.get(\"fullName\")).apply(new Object[] {person}));",
    );
}

#[test]
fn test_map_reads_and_writes() {
    let java = translate("var settings = {};\nsettings.mode = \"fast\";\nvar m = settings.mode;\nvar v = settings[\"mode\"];");
    assert_contains(&java, "settings.put(\"mode\", \"fast\");");
    assert_contains(&java, "Object m = settings.get(\"mode\");");
    assert_contains(&java, "Object v = settings.get(\"mode\");");
}

#[test]
fn test_list_idioms() {
    let java = translate("var xs = [1, 2];\nxs.push(3);\nvar n = xs.length;\nvar first = xs[0];\nvar has = xs.includes(2);");
    assert_contains(&java, "xs.add(3);");
    assert_contains(&java, "int n = xs.size();");
    assert_contains(&java, "first = xs.get(0);");
    assert_contains(&java, "xs.contains(2)");
}

#[test]
fn test_string_idioms() {
    let java = translate("var s = \"abc\";\nvar n = s.length;\nvar c = s[1];\nif (s === \"abc\") { n = 0; }");
    assert_contains(&java, "int n = s.length();");
    assert_contains(&java, "String.valueOf(s.charAt(1))");
    assert_contains(&java, "if (Objects.equals(s, \"abc\")) {");
}

// =============================================================================
// Expressions
// =============================================================================

#[test]
fn test_operator_mappings() {
    let java = translate("var a = 2 ** 3;\nvar b = x ?? 1;\nvar c = \"k\" in obj;\nvar d = x === null;\nvar e = -x;");
    assert_contains(&java, "Math.pow(2, 3)");
    assert_contains(&java, "Objects.requireNonNullElse(x, 1)");
    assert_contains(&java, "((Map<String, Object>) obj).containsKey(\"k\")");
    assert_contains(&java, "x == null");
}

#[test]
fn test_console_streams_and_joining() {
    let java = translate("console.error(\"bad\", code);\nconsole.log(\"a\", 1, b);");
    assert_contains(&java, "System.err.println(\"bad\" + \" \" + code);");
    assert_contains(&java, "System.out.println(\"a\" + \" \" + 1 + \" \" + b);");
}

#[test]
fn test_globals_and_constructors() {
    let java = translate("var n = parseInt(s);\nvar list = new Array();\nvar m = new Map();\nvar err = new Error(\"boom\");\nvar inf = Infinity;");
    assert_contains(&java, "Integer.parseInt(String.valueOf(s))");
    assert_contains(&java, "new ArrayList<>()");
    assert_contains(&java, "new LinkedHashMap<>()");
    assert_contains(&java, "new RuntimeException(\"boom\")");
    assert_contains(&java, "Double.POSITIVE_INFINITY");
}

#[test]
fn test_update_prefix_and_postfix() {
    let java = translate("var i = 0;\ni++;\n--i;");
    assert_contains(&java, "i++;");
    assert_contains(&java, "--i;");
}

#[test]
fn test_unsupported_expression_is_placeholder() {
    let java = translate("var t = typeof x;");
    assert_contains(&java, "\"/* unsupported: typeof */\"");
}

// =============================================================================
// Statements
// =============================================================================

#[test]
fn test_expression_without_effect_becomes_comment() {
    let java = translate("\"use strict\";\na + b;");
    assert_contains(&java, "// discarded expression without effect: Text");
    assert_contains(&java, "// discarded expression without effect: Binary");
}

#[test]
fn test_short_circuit_statements() {
    let java = translate("ready && start();\nready || stop();\nok ? yes() : no();");
    assert_contains(&java, "if (ready) {\n    start();\n}");
    assert_contains(&java, "if (!ready) {\n    stop();\n}");
    assert_contains(&java, "if (ok) {\n    yes();\n} else {\n    no();\n}");
}

#[test]
fn test_accumulator_rewrite() {
    let (java, diagnostics) =
        translate_with("var total = 0;\ntotal + prices[0];", &Config::default());
    assert_contains(&java, "total += prices[0];");
    assert!(diagnostics.iter().any(|d| d.severity == Severity::Note));
    assert!(!diagnostics.iter().any(|d| d.severity == Severity::Warning));
}

#[test]
fn test_accumulator_on_list_warns() {
    let (java, diagnostics) =
        translate_with("var result = [];\nresult + data.value;", &Config::default());
    assert_contains(&java, "result += data.value;");
    assert!(diagnostics.iter().any(|d| d.severity == Severity::Warning));
}

#[test]
fn test_switch_merges_and_strips_breaks() {
    let (java, diagnostics) = translate_with(
        "switch (x) {\n  case 1:\n  case 2:\n    a();\n    break;\n  case 3:\n    b();\n  default:\n    c();\n}",
        &Config::default(),
    );
    assert_contains(&java, "case 1, 2 -> {");
    assert_contains(&java, "case 3 -> {\n        b();\n        c();\n    }");
    assert_contains(&java, "default -> {\n        c();\n    }");
    assert_lacks(&java, "break;");
    assert_eq!(
        diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count(),
        1
    );
}

#[test]
fn test_fall_through_stops_at_break() {
    let java = translate(
        "switch (k) {\n  case 1:\n    a();\n  case 2:\n    b();\n    break;\n  case 3:\n    c();\n}",
    );
    assert_contains(&java, "case 1 -> {\n        a();\n        b();\n    }");
    assert_contains(&java, "case 2 -> {\n        b();\n    }");
    assert_contains(&java, "case 3 -> {\n        c();\n    }");
}

#[test]
fn test_for_in_over_unknown_object() {
    let java = translate("for (var key in obj) {\n  console.log(key);\n}");
    assert_contains(&java, "for (String key : ((Map<String, Object>) obj).keySet()) {");
}

#[test]
fn test_throw_and_try() {
    let java = translate("try {\n  throw new TypeError(\"bad\");\n} catch (err) {\n  throw err;\n} finally {\n  done();\n}");
    assert_contains(&java, "throw new RuntimeException(\"bad\");");
    assert_contains(&java, "} catch (Exception err) {");
    assert_contains(&java, "throw new RuntimeException(String.valueOf(err));");
    assert_contains(&java, "} finally {");
}

#[test]
fn test_numeric_conditions_get_truth_tests() {
    let java = translate("var count = 3;\nwhile (count) { count--; }");
    assert_contains(&java, "while (count != 0) {");
}

#[test]
fn test_nested_blocks_flatten() {
    let java = translate("{\n  var a = 1;\n  {\n    var b = 2;\n  }\n}");
    assert_contains(&java, "int a = 1;\n\nint b = 2;");
}
