//! Canonical form of two-sided relations.
//!
//! `a > b` and `a ge b` are rewritten as `b < a` and `b le a`, so every
//! relation reads `lhs OP rhs` with `OP` in `= ne < le`, and is then
//! represented by the difference `lhs - rhs`.

use cas_ast::{Operator, Tree};

use crate::error::EquivError;

/// `difference OP 0`
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NormalizedRelation {
    pub op: Operator,
    pub difference: Tree,
}

impl NormalizedRelation {
    /// Whether scaling the difference by a negative factor changes meaning.
    pub fn is_order(&self) -> bool {
        matches!(self.op, Operator::Lt | Operator::Le)
    }
}

pub(crate) fn normalize(relation: &Tree) -> Result<NormalizedRelation, EquivError> {
    let op = relation
        .op()
        .filter(|op| op.is_relation())
        .ok_or_else(|| EquivError::MalformedRelation(format!("{} is not a relation", relation)))?;
    let [lhs, rhs] = relation.operands() else {
        return Err(EquivError::MalformedRelation(format!(
            "'{}' must have exactly two sides in {}",
            op, relation
        )));
    };
    let (op, lhs, rhs) = match op {
        Operator::Gt => (Operator::Lt, rhs, lhs),
        Operator::Ge => (Operator::Le, rhs, lhs),
        _ => (op, lhs, rhs),
    };
    Ok(NormalizedRelation {
        op,
        difference: Tree::sub(lhs.clone(), rhs.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(text: &str) -> Tree {
        Tree::parse_literal(text).unwrap()
    }

    #[test]
    fn test_greater_flips() {
        let r = normalize(&t(r#"[">","x",1]"#)).unwrap();
        assert_eq!(r.op, Operator::Lt);
        assert_eq!(r.difference, Tree::sub(Tree::num(1.0), Tree::sym("x")));
        assert!(r.is_order());
    }

    #[test]
    fn test_equation_keeps_sides() {
        let r = normalize(&t(r#"["=","y",["*",2,"x"]]"#)).unwrap();
        assert_eq!(r.op, Operator::Eq);
        assert!(!r.is_order());
    }

    #[test]
    fn test_chained_equation_is_malformed() {
        assert!(matches!(
            normalize(&t(r#"["=","a","b","c"]"#)),
            Err(EquivError::MalformedRelation(_))
        ));
        assert!(normalize(&t(r#"["+","a","b"]"#)).is_err());
    }
}
