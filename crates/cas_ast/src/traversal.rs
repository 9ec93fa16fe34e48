//! Canonical tree traversal utilities.
//!
//! Stack-safe, iterative traversal functions for [`Tree`]s. Callers should
//! use these instead of writing their own recursive walks.
//!
//! # Functions
//!
//! - [`count_all_nodes`]: Count total nodes in a tree
//! - [`count_nodes_matching`]: Count nodes matching a predicate
//! - [`count_nodes_and_max_depth`]: Get both node count and max depth
//! - [`collect_variables`]: Collect free variable names
//! - [`post_order`]: Lazy post-order walk yielding paths
//! - [`subtree_at`] / [`replace_at`]: Path addressing (copy-on-write)
//!
//! # Why Iterative?
//!
//! Recursive traversal can overflow the stack on very deep expressions.
//! These functions use explicit stacks, making them safe for any tree depth.

use std::collections::BTreeSet;

use crate::error::AstError;
use crate::expr_path::{path_to_string, TreePath};
use crate::expression::{is_reserved_symbol, Tree};
use crate::operator::Operator;

/// Count all nodes (leaves included) in a tree.
pub fn count_all_nodes(root: &Tree) -> usize {
    count_nodes_matching(root, |_| true)
}

/// Count nodes matching a predicate.
///
/// # Example
/// ```ignore
/// // Count only division nodes
/// let divs = count_nodes_matching(&tree, |t| t.is_op(Operator::Div));
/// ```
pub fn count_nodes_matching<F>(root: &Tree, mut pred: F) -> usize
where
    F: FnMut(&Tree) -> bool,
{
    let mut count = 0;
    let mut stack = vec![root];

    while let Some(tree) = stack.pop() {
        if pred(tree) {
            count += 1;
        }
        stack.extend(tree.operands());
    }

    count
}

/// Count nodes and compute maximum depth.
///
/// # Returns
/// Tuple of (total_nodes, max_depth) where the root has depth 0.
pub fn count_nodes_and_max_depth(root: &Tree) -> (usize, usize) {
    let mut count = 0;
    let mut max_depth = 0;
    let mut stack: Vec<(&Tree, usize)> = vec![(root, 0)];

    while let Some((tree, depth)) = stack.pop() {
        count += 1;
        max_depth = max_depth.max(depth);
        for child in tree.operands() {
            stack.push((child, depth + 1));
        }
    }

    (count, max_depth)
}

/// Collect the free variables of a tree.
///
/// Reserved symbols (`pi`, `e`, `i`, `infinity`, `ldots`) and function names
/// in `apply` position are not variables. The set is ordered so that callers
/// drawing random bindings do so in a reproducible order.
pub fn collect_variables(root: &Tree) -> BTreeSet<String> {
    let mut vars = BTreeSet::new();
    let mut stack = vec![root];

    while let Some(tree) = stack.pop() {
        match tree {
            Tree::Symbol(name) if !is_reserved_symbol(name) => {
                vars.insert(name.clone());
            }
            Tree::Node(node) if node.op() == Operator::Apply => {
                stack.push(&node.operands()[1]);
            }
            Tree::Node(node) => stack.extend(node.operands()),
            _ => {}
        }
    }

    vars
}

/// Lazy post-order walk: children before parents, left to right.
///
/// Yields every position (leaves and nodes, the root last) with its path.
/// The iterator is `Clone`, so a walk can be restarted from any point.
pub fn post_order(root: &Tree) -> PostOrder<'_> {
    PostOrder {
        stack: vec![(root, 0)],
        path: Vec::new(),
    }
}

/// Iterator returned by [`post_order`].
#[derive(Debug, Clone)]
pub struct PostOrder<'a> {
    /// Open nodes with the index of the next child to visit
    stack: Vec<(&'a Tree, usize)>,
    /// Path of the node on top of `stack`
    path: TreePath,
}

impl<'a> Iterator for PostOrder<'a> {
    type Item = (TreePath, &'a Tree);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (tree, next_child) = *self.stack.last()?;
            let operands = tree.operands();
            if next_child < operands.len() {
                if let Some(top) = self.stack.last_mut() {
                    top.1 += 1;
                }
                self.path.push(next_child);
                self.stack.push((&operands[next_child], 0));
            } else {
                self.stack.pop();
                let here = self.path.clone();
                self.path.pop();
                return Some((here, tree));
            }
        }
    }
}

/// The subtree at `path`, if the path addresses one.
pub fn subtree_at<'a>(root: &'a Tree, path: &[usize]) -> Option<&'a Tree> {
    let mut current = root;
    for &index in path {
        current = current.operands().get(index)?;
    }
    Some(current)
}

/// A copy of `root` with the subtree at `path` replaced.
///
/// Nodes along the path are rebuilt through validated construction, so a
/// replacement that breaks an operand shape (a number in function position,
/// say) is reported rather than stored.
pub fn replace_at(root: &Tree, path: &[usize], replacement: Tree) -> Result<Tree, AstError> {
    let Some((&index, rest)) = path.split_first() else {
        return Ok(replacement);
    };
    let Tree::Node(node) = root else {
        return Err(AstError::InvalidPath(path_to_string(path)));
    };
    let child = node
        .operands()
        .get(index)
        .ok_or_else(|| AstError::InvalidPath(path_to_string(path)))?;
    let new_child = replace_at(child, rest, replacement)?;

    let mut operands = node.operands().to_vec();
    operands[index] = new_child;
    Tree::node(node.op(), operands)
}
