//! Structural equality of trees.
//!
//! Two trees are structurally equal when they have the same shape, the same
//! operators and arities, identical symbols and booleans, and numbers that
//! agree within the configured tolerance. For the commutative operators
//! (`+`, `*`) any reordering of the right operand list is accepted.
//!
//! # Permutation search
//!
//! Operand reordering is a backtracking assignment: left operand `i` is
//! paired with some unused right operand, then `i + 1` is tried, undoing the
//! pairing on failure. The result is exactly "some permutation matches
//! pointwise", with the same factorial worst case, but typical mismatches
//! are pruned at the first operand.
//!
//! # Caps
//!
//! - Above `max_permutation_arity` operands only the given order is tried.
//! - Deeper than `max_depth` levels the trees are reported as not equal.

use cas_ast::{Operator, Tree};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::options::CompareOptions;

/// Structural equality with the given options.
pub fn equal(left: &Tree, right: &Tree, opts: &CompareOptions) -> bool {
    StructuralComparator::new(opts).are_equal(left, right)
}

/// Structural comparator bound to a set of options.
pub struct StructuralComparator<'a> {
    opts: &'a CompareOptions,
}

impl<'a> StructuralComparator<'a> {
    pub fn new(opts: &'a CompareOptions) -> Self {
        Self { opts }
    }

    /// Check if two trees are structurally equal
    pub fn are_equal(&self, left: &Tree, right: &Tree) -> bool {
        self.compare(left, right, false, 0)
    }

    fn compare(&self, left: &Tree, right: &Tree, in_exponent: bool, depth: usize) -> bool {
        if depth > self.opts.max_depth {
            warn!(
                max_depth = self.opts.max_depth,
                "structural comparison depth limit hit; reporting not equal"
            );
            return false;
        }

        match (left, right) {
            (Tree::Number(a), Tree::Number(b)) => self.numbers_equal(*a, *b, in_exponent),
            (Tree::Symbol(a), Tree::Symbol(b)) => a == b,
            (Tree::Bool(a), Tree::Bool(b)) => a == b,
            (Tree::Node(l), Tree::Node(r)) => {
                if l.op() != r.op() || l.operands().len() != r.operands().len() {
                    return false;
                }
                let (lo, ro) = (l.operands(), r.operands());
                if l.op().is_commutative() {
                    return self.permutation_match(lo, ro, in_exponent, depth);
                }
                lo.iter().zip(ro).enumerate().all(|(i, (a, b))| {
                    let exponent = in_exponent || (l.op() == Operator::Pow && i == 1);
                    self.compare(a, b, exponent, depth + 1)
                })
            }
            _ => false,
        }
    }

    fn numbers_equal(&self, a: f64, b: f64, in_exponent: bool) -> bool {
        let tolerance = if in_exponent && !self.opts.include_error_in_number_exponents {
            0.0
        } else {
            self.opts.allowed_error_in_numbers
        };
        if a == b {
            return true;
        }
        if tolerance == 0.0 {
            return false;
        }
        let diff = (a - b).abs();
        if self.opts.allowed_error_is_absolute {
            diff <= tolerance
        } else {
            diff <= tolerance * a.abs().max(b.abs())
        }
    }

    fn permutation_match(
        &self,
        left: &[Tree],
        right: &[Tree],
        in_exponent: bool,
        depth: usize,
    ) -> bool {
        if left.len() > self.opts.max_permutation_arity {
            debug!(
                arity = left.len(),
                cap = self.opts.max_permutation_arity,
                "operand count above permutation cap; comparing in order"
            );
            return left
                .iter()
                .zip(right)
                .all(|(a, b)| self.compare(a, b, in_exponent, depth + 1));
        }
        let mut used: SmallVec<[bool; 8]> = SmallVec::from_elem(false, right.len());
        self.assign(left, right, 0, &mut used, in_exponent, depth)
    }

    /// Pair `left[index..]` with unused right operands.
    fn assign(
        &self,
        left: &[Tree],
        right: &[Tree],
        index: usize,
        used: &mut SmallVec<[bool; 8]>,
        in_exponent: bool,
        depth: usize,
    ) -> bool {
        let Some(current) = left.get(index) else {
            return true;
        };
        for j in 0..right.len() {
            if used[j] || !self.compare(current, &right[j], in_exponent, depth + 1) {
                continue;
            }
            used[j] = true;
            if self.assign(left, right, index + 1, used, in_exponent, depth) {
                return true;
            }
            used[j] = false;
        }
        false
    }
}
