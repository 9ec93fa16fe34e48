//! Tree literal codec.
//!
//! The interchange format is JSON: `number | string | boolean | [operator,
//! ...operands]`. Decoding goes through the same validated construction as
//! programmatic building, so an unknown operator or a bad arity is an
//! [`AstError`], never a silently patched tree.
//!
//! Infinite numbers encode as the reserved symbol `infinity` (negated with
//! `["-", "infinity"]`), since JSON has no representation for them.

use serde::de::Error as _;
use serde::ser::{Error as _, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::AstError;
use crate::expression::{Tree, INFINITY};
use crate::operator::Operator;

impl Tree {
    /// Decode a tree literal from a JSON value.
    pub fn from_json(value: &Value) -> Result<Tree, AstError> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(Tree::Number)
                .ok_or_else(|| AstError::InvalidLiteral(n.to_string())),
            Value::String(s) => Ok(Tree::Symbol(s.clone())),
            Value::Bool(b) => Ok(Tree::Bool(*b)),
            Value::Array(items) => {
                let (head, rest) = items
                    .split_first()
                    .ok_or_else(|| AstError::InvalidLiteral("empty array".into()))?;
                let name = head.as_str().ok_or_else(|| {
                    AstError::InvalidLiteral(format!("operator must be a string, got {}", head))
                })?;
                let operands = rest
                    .iter()
                    .map(Tree::from_json)
                    .collect::<Result<Vec<_>, _>>()?;
                Tree::from_op_name(name, operands)
            }
            Value::Null | Value::Object(_) => Err(AstError::InvalidLiteral(value.to_string())),
        }
    }

    /// Parse a tree literal from JSON text.
    ///
    /// # Example
    /// ```
    /// use cas_ast::Tree;
    /// let t = Tree::parse_literal(r#"["+", "x", 1]"#).unwrap();
    /// assert_eq!(t.to_string(), "x + 1");
    /// ```
    pub fn parse_literal(text: &str) -> Result<Tree, AstError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| AstError::InvalidLiteral(e.to_string()))?;
        Tree::from_json(&value)
    }

    /// Encode as a JSON value.
    pub fn to_json(&self) -> Result<Value, AstError> {
        serde_json::to_value(self).map_err(|e| AstError::InvalidLiteral(e.to_string()))
    }
}

impl TryFrom<Value> for Tree {
    type Error = AstError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Tree::from_json(&value)
    }
}

impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Tree::Number(n) if n.is_nan() => Err(S::Error::custom("NaN has no tree literal")),
            Tree::Number(n) if n.is_infinite() => {
                if *n > 0.0 {
                    serializer.serialize_str(INFINITY)
                } else {
                    (Operator::Neg.name(), INFINITY).serialize(serializer)
                }
            }
            Tree::Number(n) => serializer.serialize_f64(*n),
            Tree::Symbol(s) => serializer.serialize_str(s),
            Tree::Bool(b) => serializer.serialize_bool(*b),
            Tree::Node(node) => {
                let mut seq = serializer.serialize_seq(Some(node.operands().len() + 1))?;
                seq.serialize_element(node.op().name())?;
                for operand in node.operands() {
                    seq.serialize_element(operand)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Tree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Tree::from_json(&value).map_err(D::Error::custom)
    }
}
