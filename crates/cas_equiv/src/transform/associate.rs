//! Flattening and re-nesting of associative chains.

use cas_ast::{AstError, Operator, Tree};

/// Flatten nested chains of `op` into single n-ary nodes, everywhere in the
/// tree: `a + (b + (c + d))` becomes `+(a, b, c, d)`.
///
/// `op` must be associative (`+ * and or`); other operators are an
/// [`AstError::MalformedShape`].
pub fn associate(tree: &Tree, op: Operator) -> Result<Tree, AstError> {
    Tree::assoc(op, Vec::new())?;
    Ok(flatten(tree, op))
}

/// [`associate`] for every associative operator.
pub fn associate_all(tree: &Tree) -> Tree {
    [Operator::Add, Operator::Mul, Operator::And, Operator::Or]
        .into_iter()
        .fold(tree.clone(), |acc, op| flatten(&acc, op))
}

fn flatten(tree: &Tree, op: Operator) -> Tree {
    let Tree::Node(node) = tree else {
        return tree.clone();
    };
    let mapped = node.map_operands(|child| flatten(child, op));
    if node.op() != op {
        return mapped;
    }

    let mut operands = Vec::with_capacity(mapped.operands().len());
    for child in mapped.operands() {
        if child.is_op(op) {
            operands.extend_from_slice(child.operands());
        } else {
            operands.push(child.clone());
        }
    }
    Tree::assoc(op, operands).unwrap_or(mapped)
}

/// Re-nest every `op` node as a right-leaning binary chain:
/// `+(a, b, c, d)` becomes `a + (b + (c + d))`.
pub fn deassociate(tree: &Tree, op: Operator) -> Result<Tree, AstError> {
    Tree::assoc(op, Vec::new())?;
    Ok(nest(tree, op))
}

fn nest(tree: &Tree, op: Operator) -> Tree {
    let Tree::Node(node) = tree else {
        return tree.clone();
    };
    let mapped = node.map_operands(|child| nest(child, op));
    if node.op() != op || mapped.operands().len() <= 2 {
        return mapped;
    }
    right_chain(op, mapped.operands()).unwrap_or(mapped)
}

fn right_chain(op: Operator, operands: &[Tree]) -> Option<Tree> {
    let (last, init) = operands.split_last()?;
    init.iter()
        .rev()
        .try_fold(last.clone(), |chain, operand| {
            Tree::assoc(op, vec![operand.clone(), chain]).ok()
        })
}
