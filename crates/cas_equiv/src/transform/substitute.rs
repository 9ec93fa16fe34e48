//! Pattern instantiation.

use cas_ast::{AstError, Tree};

use crate::pattern::{is_pattern_variable, MatchResult};

/// Replace every bound pattern variable in `pattern` by a copy of its
/// binding. Unbound symbols (and multi-letter names) are left untouched.
///
/// Fails only if a binding lands in a shape position it cannot occupy, such
/// as a number bound to the function name of an `apply`.
pub fn substitute(pattern: &Tree, bindings: &MatchResult) -> Result<Tree, AstError> {
    match pattern {
        Tree::Symbol(var) if is_pattern_variable(var) => {
            Ok(bindings.get(var).cloned().unwrap_or_else(|| pattern.clone()))
        }
        Tree::Node(node) => {
            let operands = node
                .operands()
                .iter()
                .map(|child| substitute(child, bindings))
                .collect::<Result<Vec<_>, _>>()?;
            Tree::node(node.op(), operands)
        }
        leaf => Ok(leaf.clone()),
    }
}
