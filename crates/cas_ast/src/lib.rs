//! Immutable expression trees.
//!
//! A [`Tree`] is a number, a symbol, a boolean or an operator node with a
//! non-empty operand list. Operators form the closed set [`Operator`], and
//! every node is validated (arity and operand shape) when it is built,
//! whether programmatically or from a JSON tree literal.

pub mod builtin;
pub mod display;
pub mod error;
pub mod expr_path;
pub mod expression;
pub mod literal;
pub mod operator;
pub mod traversal;

pub use builtin::BuiltinFn;
pub use error::AstError;
pub use expr_path::{path_to_string, TreePath};
pub use expression::{
    is_reserved_symbol, Node, Tree, ELLIPSIS, EULER, IMAGINARY_UNIT, INFINITY, PI,
};
pub use operator::{Arity, Operator, ALL_OPERATORS};
pub use traversal::{
    collect_variables, count_all_nodes, count_nodes_and_max_depth, count_nodes_matching,
    post_order, replace_at, subtree_at, PostOrder,
};
