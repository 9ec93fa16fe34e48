//! Contract tests for the tree literal codec.
//!
//! Decoding validates exactly like programmatic construction; encoding then
//! decoding gives back a structurally identical tree.

use cas_ast::{collect_variables, AstError, Operator, Tree};
use serde_json::json;

// ============================================================================
// Decoding
// ============================================================================

#[test]
fn decodes_every_operator_name() {
    for op in Operator::all() {
        let operands: Vec<serde_json::Value> = match op {
            Operator::Apply => vec![json!("f"), json!("x")],
            Operator::Interval => vec![json!(["tuple", 0, 1]), json!(["tuple", true, true])],
            Operator::Matrix => vec![json!(["tuple", 1, 1]), json!(["tuple", ["tuple", 1]])],
            _ => match op.arity() {
                cas_ast::Arity::Exactly(n) | cas_ast::Arity::AtLeast(n) => {
                    (0..n).map(|i| json!(format!("x{}", i))).collect()
                }
            },
        };
        let mut literal = vec![json!(op.name())];
        literal.extend(operands);
        let tree = Tree::try_from(serde_json::Value::Array(literal));
        assert!(tree.is_ok(), "operator {} failed: {:?}", op, tree);
        assert_eq!(tree.unwrap().op(), Some(op));
    }
}

#[test]
fn rejects_function_position_that_is_not_a_name() {
    let err = Tree::try_from(json!(["apply", 3, "x"])).unwrap_err();
    assert!(matches!(err, AstError::MalformedShape { op: "apply", .. }));
}

#[test]
fn rejects_nested_errors() {
    let err = Tree::try_from(json!(["+", "x", ["^", "x"]])).unwrap_err();
    assert!(matches!(err, AstError::Arity { op: "^", got: 1, .. }));
}

#[test]
fn discrete_set_literal_keeps_infinity_symbolic() {
    let t = Tree::try_from(json!([
        "discrete_infinite_set",
        ["tuple", 0, 7, 0, "infinity"]
    ]))
    .unwrap();
    let progression = &t.operands()[0];
    assert_eq!(progression.operands()[3].infinity_sign(), Some(1));
    assert!(collect_variables(&t).is_empty());
}

// ============================================================================
// Encoding
// ============================================================================

#[test]
fn encode_then_decode_is_identity() {
    let text = r#"["=",["+",["^","x",2],["-",1]],["*",["+","x",1],["+","x",["-",1]]]]"#;
    let tree = Tree::parse_literal(text).unwrap();
    let encoded = tree.to_json().unwrap();
    assert_eq!(Tree::from_json(&encoded).unwrap(), tree);
}
