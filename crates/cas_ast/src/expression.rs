//! The immutable expression tree.
//!
//! A [`Tree`] is a pure value: a number, a symbol, a boolean, or an operator
//! node with a non-empty ordered operand list. There is no interning and no
//! shared mutable substructure; every transformation builds a new tree.

use crate::builtin::BuiltinFn;
use crate::ensure_shape;
use crate::error::AstError;
use crate::operator::Operator;

/// Reserved symbol for π.
pub const PI: &str = "pi";
/// Reserved symbol for Euler's number.
pub const EULER: &str = "e";
/// Reserved symbol for the imaginary unit.
pub const IMAGINARY_UNIT: &str = "i";
/// Reserved symbol for ∞.
pub const INFINITY: &str = "infinity";
/// Reserved symbol terminating an open-ended list (`0, 7, 14, ...`).
pub const ELLIPSIS: &str = "ldots";

/// Returns true for symbols that are constants rather than free variables.
#[inline]
pub fn is_reserved_symbol(name: &str) -> bool {
    matches!(name, PI | EULER | IMAGINARY_UNIT | INFINITY | ELLIPSIS)
}

/// An expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Tree {
    /// Numeric literal (negative values usually appear as `["-", n]`)
    Number(f64),
    /// Symbol or name
    Symbol(String),
    /// Boolean literal
    Bool(bool),
    /// Operator node
    Node(Node),
}

/// An operator applied to a non-empty operand list.
///
/// Fields are private: a `Node` can only be obtained through validated
/// construction, so its arity and shape invariants always hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    op: Operator,
    operands: Vec<Tree>,
}

impl Node {
    /// The node operator.
    #[inline]
    pub fn op(&self) -> Operator {
        self.op
    }

    /// The operands, in order.
    #[inline]
    pub fn operands(&self) -> &[Tree] {
        &self.operands
    }

    /// Rebuild the node with `f` applied to each value operand.
    ///
    /// Shape positions are carried over untouched: the function name of
    /// `apply`, the closedness flags of `interval` and the size of `matrix`.
    /// Interval endpoints and matrix rows are mapped one by one, so the
    /// result is always a valid node.
    pub fn map_operands<F>(&self, mut f: F) -> Tree
    where
        F: FnMut(&Tree) -> Tree,
    {
        let ops = &self.operands;
        let mapped = match self.op {
            Operator::Apply => vec![ops[0].clone(), f(&ops[1])],
            Operator::Interval => {
                let ends = ops[0].operands().iter().map(&mut f).collect();
                vec![Tree::rebuild(Operator::Tuple, ends), ops[1].clone()]
            }
            Operator::Matrix => {
                let rows = ops[1].operands().iter().map(&mut f).collect();
                vec![ops[0].clone(), Tree::rebuild(Operator::Tuple, rows)]
            }
            _ => ops.iter().map(f).collect(),
        };
        Tree::rebuild(self.op, mapped)
    }

    /// Take the node apart.
    #[inline]
    pub fn into_parts(self) -> (Operator, Vec<Tree>) {
        (self.op, self.operands)
    }
}

impl Tree {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Numeric leaf.
    #[inline]
    pub fn num(value: f64) -> Tree {
        Tree::Number(value)
    }

    /// Symbol leaf.
    #[inline]
    pub fn sym(name: &str) -> Tree {
        Tree::Symbol(name.to_string())
    }

    /// The ellipsis leaf.
    #[inline]
    pub fn ellipsis() -> Tree {
        Tree::sym(ELLIPSIS)
    }

    /// The ∞ leaf.
    #[inline]
    pub fn infinity() -> Tree {
        Tree::sym(INFINITY)
    }

    /// Build a node, validating arity and operand shape.
    pub fn node(op: Operator, operands: Vec<Tree>) -> Result<Tree, AstError> {
        if operands.is_empty() {
            return Err(AstError::EmptyOperands(op.name()));
        }
        let arity = op.arity();
        if !arity.accepts(operands.len()) {
            return Err(AstError::Arity {
                op: op.name(),
                expected: arity.describe(),
                got: operands.len(),
            });
        }
        check_shape(op, &operands)?;
        Ok(Tree::Node(Node { op, operands }))
    }

    /// Build a node from an operator name.
    pub fn from_op_name(name: &str, operands: Vec<Tree>) -> Result<Tree, AstError> {
        let op = Operator::from_name(name).ok_or_else(|| AstError::UnknownOperator(name.into()))?;
        Tree::node(op, operands)
    }

    /// Rebuild a node whose operand list was derived from a valid node of the
    /// same operator without changing the arity class (flattening,
    /// re-nesting, per-operand rewriting of non-shape operands).
    pub(crate) fn rebuild(op: Operator, operands: Vec<Tree>) -> Tree {
        debug_assert!(op.arity().accepts(operands.len()));
        Tree::Node(Node { op, operands })
    }

    /// Chain of an associative operator (`+ * and or`).
    ///
    /// A single operand is returned as is; no operands give the identity
    /// (`0`, `1`, `true`, `false`). Non-associative operators are rejected.
    pub fn assoc(op: Operator, mut operands: Vec<Tree>) -> Result<Tree, AstError> {
        if !op.is_associative() {
            return Err(AstError::MalformedShape {
                op: op.name(),
                reason: "not an associative operator".into(),
            });
        }
        Ok(match operands.len() {
            0 => match op {
                Operator::Add => Tree::Number(0.0),
                Operator::Mul => Tree::Number(1.0),
                _ => Tree::Bool(op == Operator::And),
            },
            1 => operands.remove(0),
            _ => Tree::rebuild(op, operands),
        })
    }

    /// Sum of `terms`; a single term is returned as is, no terms give `0`.
    pub fn add(mut terms: Vec<Tree>) -> Tree {
        match terms.len() {
            0 => Tree::Number(0.0),
            1 => terms.remove(0),
            _ => Tree::rebuild(Operator::Add, terms),
        }
    }

    /// Product of `factors`; a single factor is returned as is, none give `1`.
    pub fn mul(mut factors: Vec<Tree>) -> Tree {
        match factors.len() {
            0 => Tree::Number(1.0),
            1 => factors.remove(0),
            _ => Tree::rebuild(Operator::Mul, factors),
        }
    }

    /// `-inner`
    pub fn neg(inner: Tree) -> Tree {
        Tree::rebuild(Operator::Neg, vec![inner])
    }

    /// `lhs - rhs`, written as `lhs + (-rhs)`.
    pub fn sub(lhs: Tree, rhs: Tree) -> Tree {
        Tree::add(vec![lhs, Tree::neg(rhs)])
    }

    /// `num / den`
    pub fn div(num: Tree, den: Tree) -> Tree {
        Tree::rebuild(Operator::Div, vec![num, den])
    }

    /// `base ^ exp`
    pub fn pow(base: Tree, exp: Tree) -> Tree {
        Tree::rebuild(Operator::Pow, vec![base, exp])
    }

    /// `name(arg)`
    pub fn apply(name: &str, arg: Tree) -> Tree {
        Tree::rebuild(Operator::Apply, vec![Tree::sym(name), arg])
    }

    /// `element in set`
    pub fn member(element: Tree, set: Tree) -> Tree {
        Tree::rebuild(Operator::In, vec![element, set])
    }

    /// Signed numeric literal: negative values are written as `["-", |n|]`.
    pub fn signed_num(value: f64) -> Tree {
        if value < 0.0 {
            Tree::neg(Tree::Number(-value))
        } else {
            Tree::Number(value)
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Numeric value of a plain number leaf.
    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Tree::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value of a number leaf or a negated number leaf.
    pub fn as_signed_number(&self) -> Option<f64> {
        match self {
            Tree::Number(n) => Some(*n),
            Tree::Node(node) if node.op == Operator::Neg => {
                node.operands[0].as_signed_number().map(|n| -n)
            }
            _ => None,
        }
    }

    /// Name of a symbol leaf.
    #[inline]
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Tree::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Value of a boolean leaf.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Tree::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The node, if this is not a leaf.
    #[inline]
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Tree::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Operator of a node.
    #[inline]
    pub fn op(&self) -> Option<Operator> {
        self.as_node().map(Node::op)
    }

    /// Operands of a node; empty for leaves.
    #[inline]
    pub fn operands(&self) -> &[Tree] {
        match self {
            Tree::Node(node) => &node.operands,
            _ => &[],
        }
    }

    /// Whether this is a node with operator `op`.
    #[inline]
    pub fn is_op(&self, op: Operator) -> bool {
        self.op() == Some(op)
    }

    /// Whether this is a leaf.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Tree::Node(_))
    }

    /// Whether this is the ellipsis leaf.
    #[inline]
    pub fn is_ellipsis(&self) -> bool {
        self.as_symbol() == Some(ELLIPSIS)
    }

    /// Sign of an infinite value: `infinity`, `±inf` numbers and negations of
    /// either. `None` for anything finite or non-numeric.
    pub fn infinity_sign(&self) -> Option<i8> {
        match self {
            Tree::Symbol(s) if s == INFINITY => Some(1),
            Tree::Number(n) if n.is_infinite() => Some(if *n > 0.0 { 1 } else { -1 }),
            Tree::Node(node) if node.op == Operator::Neg => {
                node.operands[0].infinity_sign().map(|s| -s)
            }
            _ => None,
        }
    }

    /// Function name and argument of an `apply` node.
    pub fn as_application(&self) -> Option<(&str, &Tree)> {
        match self {
            Tree::Node(node) if node.op == Operator::Apply => {
                Some((node.operands[0].as_symbol()?, &node.operands[1]))
            }
            _ => None,
        }
    }

    /// Whether the tree applies a function the evaluators do not know.
    pub fn contains_symbolic_function(&self) -> bool {
        if let Some((name, arg)) = self.as_application() {
            if !BuiltinFn::is_builtin(name) {
                return true;
            }
            return arg.contains_symbolic_function();
        }
        self.operands().iter().any(Tree::contains_symbolic_function)
    }
}

impl From<f64> for Tree {
    fn from(value: f64) -> Self {
        Tree::Number(value)
    }
}

impl From<i64> for Tree {
    fn from(value: i64) -> Self {
        Tree::signed_num(value as f64)
    }
}

impl From<&str> for Tree {
    fn from(value: &str) -> Self {
        Tree::sym(value)
    }
}

impl From<bool> for Tree {
    fn from(value: bool) -> Self {
        Tree::Bool(value)
    }
}

/// Operand-shape rules beyond arity.
fn check_shape(op: Operator, operands: &[Tree]) -> Result<(), AstError> {
    match op {
        Operator::Apply => {
            ensure_shape!(
                operands[0].as_symbol().is_some(),
                op.name(),
                "function position must be a name, got {}",
                operands[0]
            );
        }
        Operator::Interval => {
            for part in operands {
                ensure_shape!(
                    part.is_op(Operator::Tuple) && part.operands().len() == 2,
                    op.name(),
                    "expected [endpoints tuple, closedness tuple], got {}",
                    part
                );
            }
            ensure_shape!(
                operands[1].operands().iter().all(|c| c.as_bool().is_some()),
                op.name(),
                "closedness flags must be booleans"
            );
        }
        Operator::Matrix => {
            let size = &operands[0];
            ensure_shape!(
                size.is_op(Operator::Tuple)
                    && size.operands().len() == 2
                    && size.operands().iter().all(|d| d.as_number().is_some()),
                op.name(),
                "size must be a tuple of two numbers, got {}",
                size
            );
            ensure_shape!(
                operands[1].is_op(Operator::Tuple),
                op.name(),
                "rows must be a tuple"
            );
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_validation() {
        let ok = Tree::node(Operator::Add, vec![Tree::sym("a"), Tree::sym("b")]);
        assert!(ok.is_ok());

        let err = Tree::node(Operator::Div, vec![Tree::sym("a")]).unwrap_err();
        assert!(matches!(err, AstError::Arity { op: "/", got: 1, .. }));

        let err = Tree::node(Operator::Tuple, vec![]).unwrap_err();
        assert_eq!(err, AstError::EmptyOperands("tuple"));
    }

    #[test]
    fn test_unknown_operator() {
        let err = Tree::from_op_name("frob", vec![Tree::num(1.0)]).unwrap_err();
        assert_eq!(err, AstError::UnknownOperator("frob".into()));
    }

    #[test]
    fn test_apply_shape() {
        let err = Tree::node(Operator::Apply, vec![Tree::num(1.0), Tree::sym("x")]).unwrap_err();
        assert!(matches!(err, AstError::MalformedShape { op: "apply", .. }));
    }

    #[test]
    fn test_interval_shape() {
        let endpoints = Tree::node(Operator::Tuple, vec![Tree::num(0.0), Tree::num(1.0)]).unwrap();
        let closed = Tree::node(Operator::Tuple, vec![Tree::Bool(true), Tree::Bool(false)]).unwrap();
        assert!(Tree::node(Operator::Interval, vec![endpoints.clone(), closed]).is_ok());

        let not_flags = Tree::node(Operator::Tuple, vec![Tree::num(1.0), Tree::Bool(false)]).unwrap();
        assert!(Tree::node(Operator::Interval, vec![endpoints, not_flags]).is_err());
    }

    #[test]
    fn test_signed_number() {
        let minus_two = Tree::signed_num(-2.0);
        assert!(minus_two.is_op(Operator::Neg));
        assert_eq!(minus_two.as_signed_number(), Some(-2.0));
        assert_eq!(Tree::from(3_i64).as_number(), Some(3.0));
    }

    #[test]
    fn test_infinity_sign() {
        assert_eq!(Tree::infinity().infinity_sign(), Some(1));
        assert_eq!(Tree::neg(Tree::infinity()).infinity_sign(), Some(-1));
        assert_eq!(Tree::num(f64::NEG_INFINITY).infinity_sign(), Some(-1));
        assert_eq!(Tree::num(3.0).infinity_sign(), None);
    }

    #[test]
    fn test_symbolic_function_detection() {
        let sin_x = Tree::apply("sin", Tree::sym("x"));
        let f_x = Tree::apply("f", Tree::sym("x"));
        assert!(!sin_x.contains_symbolic_function());
        assert!(f_x.contains_symbolic_function());
        assert!(Tree::add(vec![sin_x, f_x]).contains_symbolic_function());
    }

    #[test]
    fn test_assoc_identities() {
        assert_eq!(Tree::assoc(Operator::Or, vec![]).unwrap(), Tree::Bool(false));
        assert_eq!(Tree::assoc(Operator::And, vec![]).unwrap(), Tree::Bool(true));
        assert!(Tree::assoc(Operator::Pow, vec![]).is_err());
    }

    #[test]
    fn test_map_operands_keeps_shape_positions() {
        let f_x = Tree::apply("f", Tree::sym("x"));
        let mapped = f_x.as_node().unwrap().map_operands(|_| Tree::num(1.0));
        assert_eq!(mapped, Tree::apply("f", Tree::num(1.0)));

        let interval = Tree::parse_literal(r#"["interval",["tuple","a","b"],["tuple",true,false]]"#)
            .unwrap();
        let mapped = interval.as_node().unwrap().map_operands(|_| Tree::num(0.0));
        assert_eq!(
            mapped,
            Tree::parse_literal(r#"["interval",["tuple",0,0],["tuple",true,false]]"#).unwrap()
        );
    }

    #[test]
    fn test_add_collapses() {
        assert_eq!(Tree::add(vec![]), Tree::num(0.0));
        assert_eq!(Tree::add(vec![Tree::sym("x")]), Tree::sym("x"));
        assert_eq!(Tree::mul(vec![]), Tree::num(1.0));
    }
}
