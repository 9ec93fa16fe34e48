//! Occurrence search and single-occurrence rewriting.

use cas_ast::{post_order, replace_at, AstError, PostOrder, Tree, TreePath};
use tracing::trace;

use super::substitute::substitute;
use crate::pattern::{match_tree, MatchResult};

/// One place where a pattern matched.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    /// Where the matching subtree sits
    pub path: TreePath,
    /// What the pattern variables bound to there
    pub bindings: MatchResult,
}

/// Lazy post-order search for a pattern; see [`search`].
#[derive(Debug, Clone)]
pub struct Search<'a> {
    walk: PostOrder<'a>,
    pattern: &'a Tree,
}

impl Iterator for Search<'_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        for (path, subtree) in self.walk.by_ref() {
            if let Some(bindings) = match_tree(subtree, self.pattern) {
                return Some(Occurrence { path, bindings });
            }
        }
        None
    }
}

/// Every occurrence of `pattern` in `tree`, children before parents.
///
/// The iterator is finite, lazy and `Clone`: cloning it restarts the
/// remaining search independently.
pub fn search<'a>(tree: &'a Tree, pattern: &'a Tree) -> Search<'a> {
    Search {
        walk: post_order(tree),
        pattern,
    }
}

/// A rewrite rule `pattern → replacement`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformation {
    pub pattern: Tree,
    pub replacement: Tree,
}

impl Transformation {
    pub fn new(pattern: Tree, replacement: Tree) -> Self {
        Self {
            pattern,
            replacement,
        }
    }

    /// Build from two tree literals.
    pub fn from_literals(pattern: &str, replacement: &str) -> Result<Self, AstError> {
        Ok(Self::new(
            Tree::parse_literal(pattern)?,
            Tree::parse_literal(replacement)?,
        ))
    }
}

/// Rewrite `tree` at each occurrence of the transformation's pattern.
///
/// Produces one candidate per occurrence, with only that occurrence
/// rewritten. Occurrences whose rewrite would produce a malformed tree are
/// skipped.
pub fn apply_transformation(tree: &Tree, transformation: &Transformation) -> Vec<Tree> {
    search(tree, &transformation.pattern)
        .filter_map(|occurrence| {
            let rewritten = substitute(&transformation.replacement, &occurrence.bindings)
                .and_then(|replacement| replace_at(tree, &occurrence.path, replacement));
            match rewritten {
                Ok(candidate) => Some(candidate),
                Err(e) => {
                    trace!(path = ?occurrence.path, error = %e, "skipping malformed rewrite");
                    None
                }
            }
        })
        .collect()
}

/// Anything that proposes rewritten versions of a tree.
pub trait Transformer {
    /// Candidate rewrites of `tree` (possibly none).
    fn candidates(&self, tree: &Tree) -> Vec<Tree>;
}

impl Transformer for Transformation {
    fn candidates(&self, tree: &Tree) -> Vec<Tree> {
        apply_transformation(tree, self)
    }
}

impl<F> Transformer for F
where
    F: Fn(&Tree) -> Vec<Tree>,
{
    fn candidates(&self, tree: &Tree) -> Vec<Tree> {
        self(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(text: &str) -> Tree {
        Tree::parse_literal(text).unwrap()
    }

    #[test]
    fn test_search_post_order() {
        // (x*y) + (z*w): both products match a*b, the left one first
        let tree = t(r#"["+",["*","x","y"],["*","z","w"]]"#);
        let pattern = t(r#"["*","a","b"]"#);
        let found: Vec<Occurrence> = search(&tree, &pattern).collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].path, vec![0]);
        assert_eq!(found[0].bindings["a"], Tree::sym("x"));
        assert_eq!(found[1].path, vec![1]);
    }

    #[test]
    fn test_search_is_restartable() {
        let tree = t(r#"["+",["*","x","y"],["*","z","w"]]"#);
        let pattern = t(r#"["*","a","b"]"#);
        let mut it = search(&tree, &pattern);
        let first = it.next();
        let copy = it.clone();
        assert!(first.is_some());
        assert_eq!(it.count(), 1);
        assert_eq!(copy.count(), 1);
    }

    #[test]
    fn test_apply_one_candidate_per_occurrence() {
        // Commute every product, one at a time
        let rule = Transformation::from_literals(r#"["*","a","b"]"#, r#"["*","b","a"]"#).unwrap();
        let tree = t(r#"["+",["*","x","y"],["*","z","w"]]"#);
        let out = apply_transformation(&tree, &rule);
        assert_eq!(
            out,
            vec![
                t(r#"["+",["*","y","x"],["*","z","w"]]"#),
                t(r#"["+",["*","x","y"],["*","w","z"]]"#),
            ]
        );
    }

    #[test]
    fn test_no_occurrence_no_candidates() {
        let rule = Transformation::from_literals(r#"["^","a",2]"#, r#"["*","a","a"]"#).unwrap();
        assert!(apply_transformation(&t(r#"["+","x",1]"#), &rule).is_empty());
    }

    #[test]
    fn test_closures_are_transformers() {
        let swap = |tree: &Tree| -> Vec<Tree> { vec![Tree::neg(tree.clone())] };
        assert_eq!(swap.candidates(&Tree::sym("x")), vec![Tree::neg(Tree::sym("x"))]);
    }
}
