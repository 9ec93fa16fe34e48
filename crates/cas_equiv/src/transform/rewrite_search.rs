//! Bounded bidirectional rewrite search.
//!
//! Both sides grow a frontier of rewritten forms, breadth first. Each round
//! applies every transformer to the forms discovered in the previous round
//! and keeps the candidates the comparer does not already consider present.
//!
//! | outcome | when |
//! |---------|------|
//! | `True`    | some left form and some right form compare equal |
//! | `False`   | a round adds nothing to either frontier (closure reached) |
//! | `Unknown` | `depth` rounds pass with frontiers still growing, or a frontier exceeds `max_frontier` |

use std::ops::Range;

use cas_ast::Tree;
use tracing::{debug, warn};

use super::search::Transformer;
use crate::options::RewriteOptions;
use crate::truth::Truth;

/// Forms reachable from one side, with the last round's additions marked.
struct Frontier {
    members: Vec<Tree>,
    fresh: Range<usize>,
}

impl Frontier {
    fn new(root: &Tree) -> Self {
        Self {
            members: vec![root.clone()],
            fresh: 0..1,
        }
    }

    /// One breadth-first round. Returns how many forms were added.
    fn grow<C>(&mut self, transformers: &[&dyn Transformer], comparer: &C) -> usize
    where
        C: Fn(&Tree, &Tree) -> bool,
    {
        let candidates: Vec<Tree> = self.members[self.fresh.clone()]
            .iter()
            .flat_map(|form| transformers.iter().flat_map(move |t| t.candidates(form)))
            .collect();

        let start = self.members.len();
        for candidate in candidates {
            if !self.members.iter().any(|m| comparer(m, &candidate)) {
                self.members.push(candidate);
            }
        }
        self.fresh = start..self.members.len();
        self.fresh.len()
    }

    fn fresh(&self) -> &[Tree] {
        &self.members[self.fresh.clone()]
    }
}

/// Decide `left = right` by rewriting both sides.
///
/// # Example
/// ```
/// use cas_ast::Tree;
/// use cas_equiv::compare::equal;
/// use cas_equiv::options::{CompareOptions, RewriteOptions};
/// use cas_equiv::transform::{equal_after_transformations, Transformation, Transformer};
/// use cas_equiv::Truth;
///
/// let square = Transformation::from_literals(r#"["^","a",2]"#, r#"["*","a","a"]"#).unwrap();
/// let left = Tree::parse_literal(r#"["^","x",2]"#).unwrap();
/// let right = Tree::parse_literal(r#"["*","x","x"]"#).unwrap();
/// let opts = CompareOptions::default();
/// let verdict = equal_after_transformations(
///     &left,
///     &right,
///     &[&square as &dyn Transformer],
///     3,
///     |a, b| equal(a, b, &opts),
///     &RewriteOptions::default(),
/// );
/// assert_eq!(verdict, Truth::True);
/// ```
pub fn equal_after_transformations<C>(
    left: &Tree,
    right: &Tree,
    transformers: &[&dyn Transformer],
    depth: usize,
    comparer: C,
    opts: &RewriteOptions,
) -> Truth
where
    C: Fn(&Tree, &Tree) -> bool,
{
    if comparer(left, right) {
        return Truth::True;
    }

    let mut lhs = Frontier::new(left);
    let mut rhs = Frontier::new(right);

    for round in 1..=depth {
        let added_left = lhs.grow(transformers, &comparer);
        let added_right = rhs.grow(transformers, &comparer);
        debug!(
            round,
            left = lhs.members.len(),
            right = rhs.members.len(),
            added_left,
            added_right,
            "rewrite round"
        );

        if added_left == 0 && added_right == 0 {
            return Truth::False;
        }

        let new_left_meets_right = lhs
            .fresh()
            .iter()
            .any(|l| rhs.members.iter().any(|r| comparer(l, r)));
        let left_meets_new_right = rhs
            .fresh()
            .iter()
            .any(|r| lhs.members.iter().any(|l| comparer(l, r)));
        if new_left_meets_right || left_meets_new_right {
            return Truth::True;
        }

        if lhs.members.len() > opts.max_frontier || rhs.members.len() > opts.max_frontier {
            warn!(
                round,
                max_frontier = opts.max_frontier,
                "rewrite frontier cap hit; undecided"
            );
            return Truth::Unknown;
        }
    }

    Truth::Unknown
}
