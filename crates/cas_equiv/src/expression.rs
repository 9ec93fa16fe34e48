//! The expression capability set.
//!
//! Equality strategies never look inside a host's expression object; they
//! ask it for its tree, its free variables, numeric values under bindings,
//! what is assumed about a variable, and for new expressions in the same
//! context (`from_tree`, `simplify`, `expand`). [`Expression`] is that
//! contract, [`MathExpression`] the default implementation.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use cas_ast::{collect_variables, Tree};
use num_complex::Complex64;

use crate::assumptions::{AssumptionQuery, AssumptionSet};
use crate::error::EvalError;
use crate::eval::{
    eval_complex, eval_modular, eval_real, ComplexBindings, ModBindings, RealBindings,
    DEFAULT_MAX_DEPTH,
};
use crate::options::RewriteOptions;
use crate::transform::{expand, fold_constants};

/// What the equality core needs from an expression.
///
/// Only [`tree`](Self::tree), [`from_tree`](Self::from_tree) and
/// [`assumptions`](Self::assumptions) are required; the rest default to the
/// crate's evaluators and transformations.
pub trait Expression: Sized {
    /// The underlying tree.
    fn tree(&self) -> &Tree;

    /// A new expression in the same context (same assumptions).
    fn from_tree(&self, tree: Tree) -> Self;

    /// What is known about the variables.
    fn assumptions(&self) -> &dyn AssumptionQuery;

    /// Recursion limit for evaluation.
    fn max_depth(&self) -> usize {
        DEFAULT_MAX_DEPTH
    }

    /// Free variables, sorted.
    fn variables(&self) -> BTreeSet<String> {
        collect_variables(self.tree())
    }

    fn get_assumptions(&self, variable: &str) -> Vec<Tree> {
        self.assumptions().get_assumptions(variable)
    }

    fn evaluate(&self, bindings: &ComplexBindings) -> Result<Complex64, EvalError> {
        eval_complex(self.tree(), bindings, self.max_depth())
    }

    fn evaluate_real(&self, bindings: &RealBindings) -> Result<f64, EvalError> {
        eval_real(self.tree(), bindings, self.max_depth())
    }

    /// Value modulo the prime `modulus`; `Ok(None)` is the modular NaN.
    fn finite_field_evaluate(
        &self,
        bindings: &ModBindings,
        modulus: u64,
    ) -> Result<Option<u64>, EvalError> {
        eval_modular(self.tree(), bindings, modulus, self.max_depth())
    }

    fn simplify(&self) -> Self {
        self.from_tree(fold_constants(self.tree()))
    }

    fn expand(&self) -> Self {
        self.from_tree(expand(self.tree(), &RewriteOptions::default()))
    }
}

/// A tree with a shared, read-only set of assumptions.
#[derive(Debug, Clone, PartialEq)]
pub struct MathExpression {
    tree: Tree,
    assumptions: Arc<AssumptionSet>,
    max_depth: usize,
}

impl MathExpression {
    /// An expression with no assumptions.
    pub fn new(tree: Tree) -> Self {
        Self::with_assumptions(tree, Arc::new(AssumptionSet::new()))
    }

    pub fn with_assumptions(tree: Tree, assumptions: Arc<AssumptionSet>) -> Self {
        Self {
            tree,
            assumptions,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn assumption_set(&self) -> &Arc<AssumptionSet> {
        &self.assumptions
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }
}

impl Expression for MathExpression {
    fn tree(&self) -> &Tree {
        &self.tree
    }

    fn from_tree(&self, tree: Tree) -> Self {
        Self {
            tree,
            assumptions: Arc::clone(&self.assumptions),
            max_depth: self.max_depth,
        }
    }

    fn assumptions(&self) -> &dyn AssumptionQuery {
        self.assumptions.as_ref()
    }

    fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl From<Tree> for MathExpression {
    fn from(tree: Tree) -> Self {
        MathExpression::new(tree)
    }
}

impl fmt::Display for MathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.tree, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::truth::Truth;

    fn expr(text: &str) -> MathExpression {
        MathExpression::new(Tree::parse_literal(text).unwrap())
    }

    #[test]
    fn test_from_tree_keeps_assumptions() {
        let facts = Arc::new(AssumptionSet::new().with_integer("n"));
        let e = MathExpression::with_assumptions(Tree::sym("n"), facts);
        let derived = e.from_tree(Tree::sym("m"));
        assert_eq!(derived.assumptions().is_integer("n"), Truth::True);
        assert!(Arc::ptr_eq(e.assumption_set(), derived.assumption_set()));
    }

    #[test]
    fn test_variables() {
        let e = expr(r#"["+",["*","pi","x"],["apply","sin","y"]]"#);
        let vars: Vec<String> = e.variables().into_iter().collect();
        assert_eq!(vars, vec!["x", "y"]);
    }

    #[test]
    fn test_evaluators() {
        let e = expr(r#"["+","x",1]"#);
        let real: RealBindings = [("x".to_string(), 2.0)].into_iter().collect();
        assert_eq!(e.evaluate_real(&real), Ok(3.0));
        let modular: ModBindings = [("x".to_string(), 10)].into_iter().collect();
        assert_eq!(e.finite_field_evaluate(&modular, 11), Ok(Some(0)));
    }

    #[test]
    fn test_simplify_and_expand() {
        assert_eq!(expr(r#"["+",2,3,"x"]"#).simplify().into_tree(), t(r#"["+","x",5]"#));
        let expanded = expr(r#"["*","x",["+","x",1]]"#).expand().into_tree();
        assert_eq!(expanded.op(), Some(cas_ast::Operator::Add));
    }

    #[test]
    fn test_depth_limit_applies() {
        let e = expr(r#"["-",["-",["-","x"]]]"#).with_max_depth(2);
        let real: RealBindings = [("x".to_string(), 1.0)].into_iter().collect();
        assert_eq!(e.evaluate_real(&real), Err(EvalError::DepthExceeded));
    }

    fn t(text: &str) -> Tree {
        Tree::parse_literal(text).unwrap()
    }
}
