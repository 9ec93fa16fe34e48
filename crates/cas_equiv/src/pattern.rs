//! Tree pattern matching.
//!
//! In a pattern, every single-letter symbol is a free variable that binds
//! the subtree in the same position. Reserved single letters (`e`, `i`) are
//! constants, not variables. Everything else must match exactly: same
//! operator, same arity, operands in order.
//!
//! A variable occurring more than once must bind structurally equal subtrees
//! each time. Matching either produces the complete, consistent binding map
//! or nothing; callers never see a partial result.

use std::collections::BTreeMap;

use cas_ast::{is_reserved_symbol, Tree};

use crate::compare::equal;
use crate::options::CompareOptions;

/// Variable bindings produced by a successful match.
pub type MatchResult = BTreeMap<String, Tree>;

/// Whether `symbol` acts as a variable inside a pattern.
#[inline]
pub fn is_pattern_variable(symbol: &str) -> bool {
    let mut chars = symbol.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
        && !is_reserved_symbol(symbol)
}

/// Match `tree` against `pattern`.
///
/// # Example
/// ```
/// use cas_ast::Tree;
/// use cas_equiv::pattern::match_tree;
///
/// let tree = Tree::parse_literal(r#"["+","x","y"]"#).unwrap();
/// let pattern = Tree::parse_literal(r#"["+","a","b"]"#).unwrap();
/// let bindings = match_tree(&tree, &pattern).unwrap();
/// assert_eq!(bindings["a"], Tree::sym("x"));
/// ```
pub fn match_tree(tree: &Tree, pattern: &Tree) -> Option<MatchResult> {
    let mut bindings = MatchResult::new();
    let opts = CompareOptions::default();
    match_into(tree, pattern, &mut bindings, &opts).then_some(bindings)
}

fn match_into(
    tree: &Tree,
    pattern: &Tree,
    bindings: &mut MatchResult,
    opts: &CompareOptions,
) -> bool {
    match pattern {
        Tree::Symbol(var) if is_pattern_variable(var) => match bindings.get(var) {
            Some(bound) => equal(bound, tree, opts),
            None => {
                bindings.insert(var.clone(), tree.clone());
                true
            }
        },
        Tree::Node(p) => {
            let Tree::Node(t) = tree else {
                return false;
            };
            p.op() == t.op()
                && p.operands().len() == t.operands().len()
                && p
                    .operands()
                    .iter()
                    .zip(t.operands())
                    .all(|(sub_pattern, sub_tree)| match_into(sub_tree, sub_pattern, bindings, opts))
        }
        leaf => leaf == tree,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(text: &str) -> Tree {
        Tree::parse_literal(text).unwrap()
    }

    #[test]
    fn test_binds_each_variable() {
        let m = match_tree(&t(r#"["+","x","y"]"#), &t(r#"["+","a","b"]"#)).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m["a"], Tree::sym("x"));
        assert_eq!(m["b"], Tree::sym("y"));
    }

    #[test]
    fn test_repeated_variable_consistent() {
        let m = match_tree(&t(r#"["+","x","x"]"#), &t(r#"["+","a","a"]"#)).unwrap();
        assert_eq!(m.len(), 1);
        assert_eq!(m["a"], Tree::sym("x"));
    }

    #[test]
    fn test_repeated_variable_inconsistent() {
        assert!(match_tree(&t(r#"["+","x","y"]"#), &t(r#"["+","a","a"]"#)).is_none());
    }

    #[test]
    fn test_repeated_variable_uses_structural_equality() {
        // Both occurrences bind x*y, written in different order
        let tree = t(r#"["+",["*","x","y"],["*","y","x"]]"#);
        assert!(match_tree(&tree, &t(r#"["+","a","a"]"#)).is_some());
    }

    #[test]
    fn test_binds_whole_subtrees() {
        let m = match_tree(
            &t(r#"["^",["+","x",1],2]"#),
            &t(r#"["^","a",2]"#),
        )
        .unwrap();
        assert_eq!(m["a"], t(r#"["+","x",1]"#));
    }

    #[test]
    fn test_literals_must_match_exactly() {
        assert!(match_tree(&t(r#"["^","x",3]"#), &t(r#"["^","a",2]"#)).is_none());
        // Multi-letter names are literals
        assert!(match_tree(&t("\"x\""), &t("\"foo\"")).is_none());
        // Operand order is not permuted
        assert!(match_tree(&t(r#"["+",1,"x"]"#), &t(r#"["+","a",1]"#)).is_none());
    }

    #[test]
    fn test_reserved_letters_are_constants() {
        assert!(match_tree(&t("\"x\""), &t("\"e\"")).is_none());
        assert!(match_tree(&t("\"e\""), &t("\"e\"")).is_some());
        assert!(!is_pattern_variable("i"));
        assert!(is_pattern_variable("f"));
    }

    #[test]
    fn test_function_names_can_bind() {
        let m = match_tree(&t(r#"["apply","sin","x"]"#), &t(r#"["apply","f","a"]"#)).unwrap();
        assert_eq!(m["f"], Tree::sym("sin"));
    }
}
