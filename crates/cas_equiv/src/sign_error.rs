//! Equality up to a bounded number of sign errors.
//!
//! A flip at a position wraps the subtree there in unary minus, or unwraps
//! it when it already is one. Flip sets are tried by increasing size, so a
//! match reports the fewest flips that make the sides equal.

use cas_ast::{post_order, replace_at, subtree_at, Operator, Tree, TreePath};
use tracing::{debug, trace};

use crate::error::EquivError;
use crate::expression::Expression;
use crate::options::SignErrorOptions;

/// Outcome of [`equal_with_sign_errors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignErrorMatch {
    pub matched: bool,
    /// Flips applied to the left side; `0` when unmatched
    pub n_sign_errors: usize,
}

impl SignErrorMatch {
    const fn unmatched() -> Self {
        Self {
            matched: false,
            n_sign_errors: 0,
        }
    }
}

/// Whether `a`, after negating at most `opts.max_sign_errors` of its
/// subtrees, is equal to `b` under `equality`.
///
/// Errors from `equality` propagate.
///
/// ```
/// use cas_ast::Tree;
/// use cas_equiv::options::SignErrorOptions;
/// use cas_equiv::sign_error::equal_with_sign_errors;
/// use cas_equiv::{Expression, MathExpression};
///
/// let a = MathExpression::new(Tree::parse_literal(r#"["+","a",["-","b"]]"#).unwrap());
/// let b = MathExpression::new(Tree::parse_literal(r#"["+","a","b"]"#).unwrap());
/// let syntactic = |x: &MathExpression, y: &MathExpression| Ok(x.tree() == y.tree());
///
/// let found = equal_with_sign_errors(&a, &b, syntactic, &SignErrorOptions::default()).unwrap();
/// assert!(found.matched);
/// assert_eq!(found.n_sign_errors, 1);
/// ```
pub fn equal_with_sign_errors<E, F>(
    a: &E,
    b: &E,
    mut equality: F,
    opts: &SignErrorOptions,
) -> Result<SignErrorMatch, EquivError>
where
    E: Expression,
    F: FnMut(&E, &E) -> Result<bool, EquivError>,
{
    let positions = flippable_positions(a.tree());
    let most = opts.max_sign_errors.min(positions.len());

    for k in 0..=most {
        trace!(k, positions = positions.len(), "trying flip sets");
        let mut chosen: Vec<usize> = (0..k).collect();
        loop {
            if let Some(flipped) = flip_all(a.tree(), &positions, &chosen) {
                if equality(&a.from_tree(flipped), b)? {
                    debug!(n_sign_errors = k, "matched after sign flips");
                    return Ok(SignErrorMatch {
                        matched: true,
                        n_sign_errors: k,
                    });
                }
            }
            if !next_combination(&mut chosen, positions.len()) {
                break;
            }
        }
    }
    Ok(SignErrorMatch::unmatched())
}

/// Positions in post-order where a sign flip makes sense.
///
/// Booleans, function names, the ellipsis and anything that is not a
/// numeric value (relations, containers, logic, sets) are skipped.
fn flippable_positions(root: &Tree) -> Vec<TreePath> {
    post_order(root)
        .filter(|(path, tree)| is_flippable(root, path, tree))
        .map(|(path, _)| path)
        .collect()
}

fn is_flippable(root: &Tree, path: &[usize], tree: &Tree) -> bool {
    if tree.as_bool().is_some() || tree.is_ellipsis() {
        return false;
    }
    if let Some(op) = tree.op() {
        if op.is_relation()
            || op.is_container()
            || matches!(
                op,
                Operator::Set
                    | Operator::In
                    | Operator::And
                    | Operator::Or
                    | Operator::Not
                    | Operator::DiscreteInfiniteSet
            )
        {
            return false;
        }
    }
    match path.split_last() {
        Some((&0, parent)) => !subtree_at(root, parent).is_some_and(|p| p.is_op(Operator::Apply)),
        _ => true,
    }
}

/// Apply the chosen flips in ascending post-order.
///
/// Descendants precede their ancestors in post-order, so every path is
/// still valid when its turn comes. `None` when a flip would produce an
/// invalid node.
fn flip_all(root: &Tree, positions: &[TreePath], chosen: &[usize]) -> Option<Tree> {
    let mut current = root.clone();
    for &index in chosen {
        let path = &positions[index];
        let target = subtree_at(&current, path)?;
        current = match replace_at(&current, path, flip(target)) {
            Ok(tree) => tree,
            Err(err) => {
                trace!(%err, "flip rejected");
                return None;
            }
        };
    }
    Some(current)
}

fn flip(tree: &Tree) -> Tree {
    match tree.as_node() {
        Some(node) if node.op() == Operator::Neg => node.operands()[0].clone(),
        _ => Tree::neg(tree.clone()),
    }
}

/// Advance `chosen` to the next k-combination of `0..n` in lexicographic
/// order; `false` once exhausted.
fn next_combination(chosen: &mut [usize], n: usize) -> bool {
    let k = chosen.len();
    for i in (0..k).rev() {
        if chosen[i] < n - k + i {
            chosen[i] += 1;
            for j in i + 1..k {
                chosen[j] = chosen[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::MathExpression;
    use crate::options::{EqualityOptions, SamplingOptions};
    use crate::oracle::EqualityOracle;

    fn e(text: &str) -> MathExpression {
        MathExpression::new(Tree::parse_literal(text).unwrap())
    }

    fn oracle() -> EqualityOracle {
        EqualityOracle::new(EqualityOptions {
            sampling: SamplingOptions {
                seed: Some(3),
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap()
    }

    fn with_budget(max_sign_errors: usize) -> SignErrorOptions {
        SignErrorOptions { max_sign_errors }
    }

    #[test]
    fn test_single_flip() {
        let o = oracle();
        let found = equal_with_sign_errors(
            &e(r#"["+","a",["-","b"]]"#),
            &e(r#"["+","a","b"]"#),
            |x, y| o.equals(x, y),
            &with_budget(1),
        )
        .unwrap();
        assert_eq!(
            found,
            SignErrorMatch {
                matched: true,
                n_sign_errors: 1
            }
        );
    }

    #[test]
    fn test_equal_needs_no_flip() {
        let o = oracle();
        let found = equal_with_sign_errors(
            &e(r#"["*","x","y"]"#),
            &e(r#"["*","y","x"]"#),
            |x, y| o.equals(x, y),
            &with_budget(2),
        )
        .unwrap();
        assert!(found.matched);
        assert_eq!(found.n_sign_errors, 0);
    }

    #[test]
    fn test_budget_limits_flips() {
        let o = oracle();
        let (a, b) = (e(r#"["+",["-","a"],["-","b"]]"#), e(r#"["+","a",["*",2,"b"]]"#));
        let found = equal_with_sign_errors(&a, &b, |x, y| o.equals(x, y), &with_budget(2)).unwrap();
        assert!(!found.matched);

        let (a, b) = (e(r#"["+",["-","x"],"y",["-","z"]]"#), e(r#"["+","x","y","z"]"#));
        assert!(!equal_with_sign_errors(&a, &b, |x, y| o.equals(x, y), &with_budget(1))
            .unwrap()
            .matched);
        let found = equal_with_sign_errors(&a, &b, |x, y| o.equals(x, y), &with_budget(2)).unwrap();
        assert_eq!(found.n_sign_errors, 2);
    }

    #[test]
    fn test_function_names_are_not_flipped() {
        let positions = flippable_positions(&Tree::apply("sin", Tree::sym("x")));
        // x and the application itself
        assert_eq!(positions, vec![vec![1], vec![]]);
    }

    #[test]
    fn test_relations_are_not_flipped() {
        let tree = Tree::parse_literal(r#"["=","x",1]"#).unwrap();
        assert_eq!(flippable_positions(&tree), vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_next_combination() {
        let mut chosen = vec![0, 1];
        let mut seen = vec![chosen.clone()];
        while next_combination(&mut chosen, 4) {
            seen.push(chosen.clone());
        }
        assert_eq!(seen.len(), 6);
        assert_eq!(seen.last(), Some(&vec![2, 3]));
    }
}
