//! Polynomial expansion.
//!
//! A tree is expanded into a sum of terms `coeff · f₁ · f₂ · …`: products
//! distribute over sums, integer powers of sums up to `max_expand_power`
//! are multiplied out, and integer powers of a single term distribute over
//! its factors. Within a term equal bases are merged by adding numeric
//! exponents. Like terms (same factors in any order) are combined by adding
//! coefficients, and terms whose coefficient cancels are dropped.
//!
//! Anything the expander does not understand (functions, containers,
//! symbolic exponents) becomes an opaque factor with its operands expanded.

use cas_ast::{Operator, Tree};

use crate::compare::equal;
use crate::options::{CompareOptions, RewriteOptions};

/// Expand `tree` into a sum of monomials.
///
/// # Example
/// ```
/// use cas_ast::Tree;
/// use cas_equiv::compare::equal;
/// use cas_equiv::options::{CompareOptions, RewriteOptions};
/// use cas_equiv::transform::expand;
///
/// let square = Tree::parse_literal(r#"["^",["+","x",1],2]"#).unwrap();
/// let expanded = expand(&square, &RewriteOptions::default());
/// let expected = Tree::parse_literal(r#"["+",["^","x",2],["*",2,"x"],1]"#).unwrap();
/// assert!(equal(&expanded, &expected, &CompareOptions::default()));
/// ```
pub fn expand(tree: &Tree, opts: &RewriteOptions) -> Tree {
    Expander::new(opts).expand(tree)
}

/// `coeff · factors`
#[derive(Clone, Debug)]
struct Term {
    coeff: f64,
    factors: Vec<Tree>,
}

impl Term {
    fn constant(coeff: f64) -> Self {
        Self {
            coeff,
            factors: Vec::new(),
        }
    }

    fn factor(factor: Tree) -> Self {
        Self {
            coeff: 1.0,
            factors: vec![factor],
        }
    }

    fn times(&self, other: &Term) -> Term {
        let mut factors = self.factors.clone();
        factors.extend(other.factors.iter().cloned());
        Term {
            coeff: self.coeff * other.coeff,
            factors,
        }
    }

    fn into_tree(self) -> Tree {
        let magnitude = self.coeff.abs();
        let body = if self.factors.is_empty() {
            Tree::num(magnitude)
        } else if magnitude == 1.0 {
            Tree::mul(self.factors)
        } else {
            let mut factors = Vec::with_capacity(self.factors.len() + 1);
            factors.push(Tree::num(magnitude));
            factors.extend(self.factors);
            Tree::mul(factors)
        };
        if self.coeff < 0.0 {
            Tree::neg(body)
        } else {
            body
        }
    }
}

struct Expander<'a> {
    opts: &'a RewriteOptions,
    compare: CompareOptions,
}

impl<'a> Expander<'a> {
    fn new(opts: &'a RewriteOptions) -> Self {
        Self {
            opts,
            compare: CompareOptions::default(),
        }
    }

    fn expand(&self, tree: &Tree) -> Tree {
        let terms = self.terms(tree);
        Tree::add(terms.into_iter().map(Term::into_tree).collect())
    }

    fn terms(&self, tree: &Tree) -> Vec<Term> {
        let node = match tree {
            Tree::Number(n) => return vec![Term::constant(*n)],
            Tree::Node(node) => node,
            leaf => return vec![Term::factor(leaf.clone())],
        };
        let ops = node.operands();

        match node.op() {
            Operator::Add => {
                let all = ops.iter().flat_map(|t| self.terms(t)).collect();
                self.collect(all)
            }
            Operator::Mul => ops
                .iter()
                .fold(vec![Term::constant(1.0)], |acc, t| self.product(&acc, &self.terms(t))),
            Operator::Neg => self
                .terms(&ops[0])
                .into_iter()
                .map(|t| Term {
                    coeff: -t.coeff,
                    ..t
                })
                .collect(),
            Operator::Div => {
                let num = self.terms(&ops[0]);
                let den = self.terms(&ops[1]);
                match den.as_slice() {
                    [single] if single.factors.is_empty() && single.coeff != 0.0 => {
                        let scale = single.coeff.recip();
                        num.into_iter()
                            .map(|t| Term {
                                coeff: t.coeff * scale,
                                ..t
                            })
                            .collect()
                    }
                    _ => {
                        let reciprocal =
                            Tree::pow(self.rebuild(den), Tree::signed_num(-1.0));
                        self.product(&num, &[Term::factor(reciprocal)])
                    }
                }
            }
            Operator::Pow => self.power(&ops[0], &ops[1]),
            _ => vec![Term::factor(node.map_operands(|t| self.expand(t)))],
        }
    }

    fn power(&self, base: &Tree, exp: &Tree) -> Vec<Term> {
        let base_terms = self.terms(base);
        let k = exp
            .as_signed_number()
            .filter(|e| e.fract() == 0.0 && e.abs() <= i32::MAX as f64)
            .map(|e| e as i32);

        match (k, base_terms.as_slice()) {
            (Some(0), _) => vec![Term::constant(1.0)],
            (Some(k), [single]) if k > 0 || single.coeff != 0.0 => {
                let factors = single
                    .factors
                    .iter()
                    .map(|f| Tree::pow(f.clone(), Tree::signed_num(k as f64)))
                    .collect();
                self.collect(vec![Term {
                    coeff: single.coeff.powi(k),
                    factors,
                }])
            }
            (Some(k), _) if k > 0 && k as u32 <= self.opts.max_expand_power => {
                (1..k).fold(base_terms.clone(), |acc, _| self.product(&acc, &base_terms))
            }
            _ => vec![Term::factor(Tree::pow(
                self.rebuild(base_terms),
                self.expand(exp),
            ))],
        }
    }

    fn product(&self, left: &[Term], right: &[Term]) -> Vec<Term> {
        let all = left
            .iter()
            .flat_map(|a| right.iter().map(move |b| a.times(b)))
            .collect();
        self.collect(all)
    }

    fn rebuild(&self, terms: Vec<Term>) -> Tree {
        Tree::add(terms.into_iter().map(Term::into_tree).collect())
    }

    /// Merge powers within each term, then like terms across the sum.
    fn collect(&self, terms: Vec<Term>) -> Vec<Term> {
        let mut merged: Vec<(Term, Tree)> = Vec::with_capacity(terms.len());
        for term in terms {
            if term.coeff == 0.0 {
                continue;
            }
            let term = self.merge_powers(term);
            let key = Tree::mul(term.factors.clone());
            match merged
                .iter_mut()
                .find(|(_, existing)| equal(existing, &key, &self.compare))
            {
                Some((existing, _)) => existing.coeff += term.coeff,
                None => merged.push((term, key)),
            }
        }
        merged
            .into_iter()
            .map(|(term, _)| term)
            .filter(|term| term.coeff != 0.0)
            .collect()
    }

    /// `x · x^2 · y / x` → `x^2 · y`
    fn merge_powers(&self, term: Term) -> Term {
        let mut powers: Vec<(Tree, f64)> = Vec::new();
        let mut opaque: Vec<Tree> = Vec::new();
        for factor in term.factors {
            match split_power(factor) {
                Ok((base, e)) => {
                    match powers
                        .iter_mut()
                        .find(|(b, _)| equal(b, &base, &self.compare))
                    {
                        Some((_, total)) => *total += e,
                        None => powers.push((base, e)),
                    }
                }
                Err(factor) => opaque.push(factor),
            }
        }
        let mut factors: Vec<Tree> = powers
            .into_iter()
            .filter(|(_, e)| *e != 0.0)
            .map(|(base, e)| {
                if e == 1.0 {
                    base
                } else {
                    Tree::pow(base, Tree::signed_num(e))
                }
            })
            .collect();
        factors.extend(opaque);
        Term {
            coeff: term.coeff,
            factors,
        }
    }
}

/// Base and numeric exponent of a factor; `Err` hands back factors with a
/// symbolic exponent.
fn split_power(factor: Tree) -> Result<(Tree, f64), Tree> {
    if !factor.is_op(Operator::Pow) {
        return Ok((factor, 1.0));
    }
    let Some(e) = factor.operands()[1].as_signed_number() else {
        return Err(factor);
    };
    let base = factor.operands()[0].clone();
    // (b^e1)^k = b^(e1·k) only for integer k
    if e.fract() == 0.0 && base.is_op(Operator::Pow) {
        if let Some(inner) = base.operands()[1].as_signed_number() {
            return Ok((base.operands()[0].clone(), inner * e));
        }
    }
    Ok((base, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(text: &str) -> Tree {
        Tree::parse_literal(text).unwrap()
    }

    fn expands_to(input: &str, expected: &str) {
        let got = expand(&t(input), &RewriteOptions::default());
        assert!(
            equal(&got, &t(expected), &CompareOptions::default()),
            "expand({}) = {}, expected {}",
            input,
            got,
            expected
        );
    }

    #[test]
    fn test_square_of_sum() {
        expands_to(
            r#"["^",["+","a","b"],2]"#,
            r#"["+",["^","a",2],["*",2,"a","b"],["^","b",2]]"#,
        );
    }

    #[test]
    fn test_difference_of_squares() {
        expands_to(
            r#"["*",["+","x",["-",1]],["+","x",1]]"#,
            r#"["+",["^","x",2],["-",1]]"#,
        );
    }

    #[test]
    fn test_cancellation_to_zero() {
        expands_to(r#"["+","x",["-","x"]]"#, "0");
        expands_to(r#"["+",["*","x","y"],["-",["*","y","x"]]]"#, "0");
    }

    #[test]
    fn test_numeric_division_scales() {
        expands_to(r#"["/",["+",["*",2,"x"],4],2]"#, r#"["+","x",2]"#);
    }

    #[test]
    fn test_powers_merge() {
        expands_to(r#"["*","x",["^","x",2]]"#, r#"["^","x",3]"#);
        expands_to(r#"["/",["*","x","y"],"x"]"#, "\"y\"");
    }

    #[test]
    fn test_monomial_power_distributes() {
        expands_to(r#"["^",["*",2,"x"],3]"#, r#"["*",8,["^","x",3]]"#);
    }

    #[test]
    fn test_opaque_factors_expand_inside() {
        expands_to(
            r#"["apply","sin",["*","x",["+",1,1]]]"#,
            r#"["apply","sin",["*",2,"x"]]"#,
        );
    }

    #[test]
    fn test_power_cap() {
        let opts = RewriteOptions {
            max_expand_power: 2,
            ..Default::default()
        };
        let cube = t(r#"["^",["+","x",1],3]"#);
        assert!(equal(&expand(&cube, &opts), &cube, &CompareOptions::default()));
    }
}
