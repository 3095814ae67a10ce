//! Tests for the shared syntax trees.

use super::*;

#[test]
fn test_type_tag_java_names() {
    assert_eq!(TypeTag::Text.java_name(), "String");
    assert_eq!(TypeTag::Integer.java_name(), "int");
    assert_eq!(TypeTag::Real.java_name(), "double");
    assert_eq!(TypeTag::Boolean.java_name(), "boolean");
    assert_eq!(TypeTag::Any.java_name(), "Object");
    assert_eq!(TypeTag::KeyedMap.java_name(), "Map<String, Object>");
    assert_eq!(TypeTag::Void.java_name(), "void");
}

#[test]
fn test_list_boxes_primitive_elements() {
    assert_eq!(TypeTag::list_of(TypeTag::Integer).java_name(), "List<Integer>");
    assert_eq!(TypeTag::list_of(TypeTag::Text).java_name(), "List<String>");
    assert_eq!(
        TypeTag::list_of(TypeTag::list_of(TypeTag::Boolean)).to_string(),
        "List<List<Boolean>>"
    );
}

#[test]
fn test_type_tag_predicates() {
    assert!(TypeTag::Integer.is_numeric());
    assert!(TypeTag::Real.is_numeric());
    assert!(!TypeTag::Text.is_numeric());
    assert!(TypeTag::Boolean.is_primitive());
    assert!(!TypeTag::list_of(TypeTag::Integer).is_primitive());
}

#[test]
fn test_operator_tokens() {
    assert_eq!(BinaryOp::from_token("==="), Some(BinaryOp::StrictEq));
    assert_eq!(BinaryOp::from_token(">>>"), Some(BinaryOp::UShr));
    assert_eq!(BinaryOp::from_token("&&"), None);
    assert_eq!(LogicalOp::from_token("??"), Some(LogicalOp::Nullish));
    assert_eq!(AssignOp::from_token("+="), Some(AssignOp::Add));
    assert_eq!(UnaryOp::from_token("typeof"), Some(UnaryOp::TypeOf));
    assert!(BinaryOp::Lt.is_comparison());
    assert!(!BinaryOp::Add.is_comparison());
}

#[test]
fn test_member_path() {
    let node = SourceNode::Member {
        object: Box::new(SourceNode::identifier("console")),
        property: "log".into(),
    };
    assert_eq!(node.member_path().as_deref(), Some("console.log"));

    let computed = SourceNode::Member {
        object: Box::new(SourceNode::Call {
            callee: Box::new(SourceNode::identifier("f")),
            args: vec![],
        }),
        property: "x".into(),
    };
    assert_eq!(computed.member_path(), None);
}

#[test]
fn test_statement_expressions() {
    let call = JavaExpr::call("f", vec![]);
    assert!(call.is_statement_expression());
    let sum = JavaExpr::binary(JavaBinaryOp::Add, JavaExpr::name("a"), JavaExpr::int("1"));
    assert!(!sum.is_statement_expression());
    let incr = JavaExpr::Unary {
        op: JavaUnaryOp::PostIncrement,
        operand: Box::new(JavaExpr::name("i")),
    };
    assert!(incr.is_statement_expression());
}

#[test]
fn test_block_builder() {
    let mut block = Block::new();
    assert!(block.is_empty());
    block.push(JavaStmt::comment("first"));
    block.push(JavaStmt::Return { value: None });
    assert_eq!(block.stmts.len(), 2);
    assert!(block.last().is_some_and(JavaStmt::is_terminal));
}

#[test]
fn test_source_tree_serializes_with_node_tags() {
    let node = SourceNode::Binary {
        op: BinaryOp::Add,
        left: Box::new(SourceNode::number("1")),
        right: Box::new(SourceNode::text("a")),
    };
    let json = serde_json::to_value(&node).unwrap();
    assert_eq!(json["node"], "binary");
    assert_eq!(json["op"], "add");
    assert_eq!(json["left"]["raw"], "1");
    assert_eq!(json["right"]["value"], "a");
}

#[test]
fn test_class_decl_field_lookup() {
    let mut class = ClassDecl::new("Person");
    class.fields.push(FieldDecl {
        ty: TypeTag::Text,
        name: "firstName".into(),
    });
    assert_eq!(class.field("firstName").map(|f| &f.ty), Some(&TypeTag::Text));
    assert!(class.field("age").is_none());
}

#[test]
fn test_java_tree_serializes_with_expr_fields() {
    let cast = JavaExpr::Cast {
        ty: "String".into(),
        expr: Box::new(JavaExpr::name("x")),
    };
    let json = serde_json::to_value(&cast).unwrap();
    assert_eq!(json["java_expr"], "cast");
    assert_eq!(json["expr"]["name"], "x");
    let back: JavaExpr = serde_json::from_value(json).unwrap();
    assert_eq!(back, cast);

    let placeholder = JavaExpr::placeholder("typeof");
    let json = serde_json::to_value(&placeholder).unwrap();
    assert_eq!(json["kind"], "typeof");
}

#[test]
fn test_visit_reaches_nested_nodes() {
    let nodes = SourceNode::Block {
        body: vec![SourceNode::If {
            test: Box::new(SourceNode::identifier("a")),
            consequent: Box::new(SourceNode::Return {
                argument: Some(Box::new(SourceNode::Index {
                    object: Box::new(SourceNode::identifier("xs")),
                    index: Box::new(SourceNode::number("0")),
                })),
            }),
            alternate: None,
        }],
    };
    let mut names = Vec::new();
    nodes.visit(&mut |node| names.extend(node.as_identifier()));
    assert_eq!(names, ["a", "xs"]);
}
