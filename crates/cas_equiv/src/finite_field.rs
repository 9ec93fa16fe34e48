//! Refutation by evaluation in prime fields.
//!
//! Both sides are evaluated modulo each of [`PRIMES`] under shared random
//! residue bindings. One definite mismatch proves the sides different
//! (`False`). Agreement proves nothing, so the best this strategy ever
//! reports is `Unknown`.
//!
//! # Shapes
//!
//! - Containers compare component-wise: a refuted component refutes the
//!   whole, otherwise `Unknown`.
//! - Relations are normalized to `Δ OP 0`. A proportion `λ = Δ₁/Δ₂` is
//!   estimated from one real probe and recovered as a small fraction `n/d`;
//!   the residual check is `d·Δ₁` against `n·Δ₂`. For `<` and `le` a
//!   non-positive `λ` already refutes.
//!
//! # Undecidable samples
//!
//! Anything the modular evaluator cannot handle (functions, non-integer
//! literals, constants) makes the whole answer `Unknown`. A modular NaN
//! (division by a zero residue) only skips that binding.

use std::collections::BTreeSet;

use cas_ast::{Operator, Tree};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::error::EquivError;
use crate::eval::{ModBindings, RealBindings};
use crate::expression::Expression;
use crate::modp::PRIMES;
use crate::options::FiniteFieldOptions;
use crate::ratio::approximate_ratio;
use crate::relation::normalize;
use crate::truth::Truth;

/// Half-width of the real probe that estimates a relation's proportion.
const PROBE_RADIUS: f64 = 10.0;
/// Largest denominator accepted for a proportion.
const MAX_DENOMINATOR: i64 = 10_000;
/// Relative error accepted when recovering a proportion.
const RATIO_TOLERANCE: f64 = 1e-9;

/// Try to refute `a = b` by modular evaluation.
///
/// Never returns `Truth::True`. The RNG is reseeded from `opts.seed` on
/// every call, so the answer is reproducible.
pub fn equals_via_finite_field<E: Expression>(
    a: &E,
    b: &E,
    opts: &FiniteFieldOptions,
) -> Result<Truth, EquivError> {
    opts.validate()?;
    Refuter {
        opts,
        rng: ChaCha8Rng::seed_from_u64(opts.seed),
    }
    .equals(a, b)
}

struct Refuter<'a> {
    opts: &'a FiniteFieldOptions,
    rng: ChaCha8Rng,
}

impl Refuter<'_> {
    fn equals<E: Expression>(&mut self, a: &E, b: &E) -> Result<Truth, EquivError> {
        let (left, right) = (a.tree(), b.tree());

        match (left.as_bool(), right.as_bool()) {
            (Some(x), Some(y)) => return Ok(Truth::from(x == y)),
            (Some(_), None) | (None, Some(_)) => return Ok(Truth::False),
            (None, None) => {}
        }

        let is_container = |t: &Tree| t.op().is_some_and(Operator::is_container);
        if is_container(left) || is_container(right) {
            if left.op() != right.op() || left.operands().len() != right.operands().len() {
                return Ok(Truth::False);
            }
            for (x, y) in left.operands().iter().zip(right.operands()) {
                if self
                    .equals(&a.from_tree(x.clone()), &b.from_tree(y.clone()))?
                    .is_false()
                {
                    return Ok(Truth::False);
                }
            }
            return Ok(Truth::Unknown);
        }

        let is_relation = |t: &Tree| t.op().is_some_and(Operator::is_relation);
        match (is_relation(left), is_relation(right)) {
            (true, true) => self.relations_equal(a, b),
            (false, false) => Ok(self.component_equals(a, b)),
            _ => Ok(Truth::False),
        }
    }

    fn relations_equal<E: Expression>(&mut self, a: &E, b: &E) -> Result<Truth, EquivError> {
        let (l, r) = (normalize(a.tree())?, normalize(b.tree())?);
        if l.op != r.op {
            return Ok(Truth::False);
        }
        let order = l.is_order();
        let dl = a.from_tree(l.difference);
        let dr = b.from_tree(r.difference);

        let symbolic = dl.tree().contains_symbolic_function() || dr.tree().contains_symbolic_function();
        let lambda = if symbolic { 1.0 } else { self.estimate_proportion(&dl, &dr) };
        if order && lambda <= 0.0 {
            debug!(lambda, "order relations scale with opposite signs; refuted");
            return Ok(Truth::False);
        }

        let Some(ratio) = approximate_ratio(lambda, MAX_DENOMINATOR, RATIO_TOLERANCE) else {
            debug!(lambda, "no small rational proportion; undecided");
            return Ok(Truth::Unknown);
        };
        let scaled_left = dl.from_tree(Tree::mul(vec![
            Tree::signed_num(*ratio.denom() as f64),
            dl.tree().clone(),
        ]));
        let scaled_right = dr.from_tree(Tree::mul(vec![
            Tree::signed_num(*ratio.numer() as f64),
            dr.tree().clone(),
        ]));
        Ok(self.component_equals(&scaled_left, &scaled_right))
    }

    /// `Δ₁/Δ₂` at one random real point; `1` when that is not usable.
    fn estimate_proportion<E: Expression>(&mut self, dl: &E, dr: &E) -> f64 {
        let bindings: RealBindings = union_of_variables(dl, dr)
            .into_iter()
            .map(|v| (v, self.rng.gen_range(-PROBE_RADIUS..PROBE_RADIUS)))
            .collect();
        match (dl.evaluate_real(&bindings), dr.evaluate_real(&bindings)) {
            (Ok(x), Ok(y)) if x != 0.0 && y != 0.0 => x / y,
            other => {
                trace!(?other, "proportion probe unusable; assuming 1");
                1.0
            }
        }
    }

    /// Refute scalar equality with shared random residues per prime.
    fn component_equals<E: Expression>(&mut self, a: &E, b: &E) -> Truth {
        let variables = union_of_variables(a, b);
        for &p in PRIMES.iter() {
            for _ in 0..self.opts.trials_per_prime {
                let bindings: ModBindings = variables
                    .iter()
                    .map(|v| (v.clone(), self.rng.gen_range(0..p)))
                    .collect();
                match (
                    a.finite_field_evaluate(&bindings, p),
                    b.finite_field_evaluate(&bindings, p),
                ) {
                    (Ok(Some(x)), Ok(Some(y))) if x != y => {
                        debug!(p, ?bindings, x, y, "finite field refutation");
                        return Truth::False;
                    }
                    (Err(err), _) | (_, Err(err)) => {
                        debug!(%err, "modular evaluation failed; undecided");
                        return Truth::Unknown;
                    }
                    _ => {}
                }
            }
        }
        Truth::Unknown
    }
}

fn union_of_variables<E: Expression>(a: &E, b: &E) -> BTreeSet<String> {
    let mut vars = a.variables();
    vars.extend(b.variables());
    vars
}
