//! Probabilistic equality by random evaluation.
//!
//! # Algorithm
//!
//! 1. Collect the free variables of both sides. A variable either side
//!    assumes to be an integer is drawn from `±integer_range`.
//! 2. Up to `max_trials` times, draw random bindings within `radius`. The
//!    trial is an *anchor* when both sides evaluate to finite values below
//!    `magnitude_cutoff` that agree within `relative_tolerance`.
//! 3. Around an anchor, up to `nearby_probes` bindings are drawn within
//!    `nearby_radius` (integer variables keep their anchor value). Once
//!    `min_nearby_matches` finite probes agree the sides are accepted as
//!    equal. A single disagreeing probe invalidates the anchor and the outer
//!    search resumes.
//!
//! Evaluation errors discard the sample, never the query.
//!
//! # Soundness
//!
//! `true` is strong evidence of equality. `false` only means "not shown
//! equal within the budget": two sides defined nowhere on the sampled
//! region, or agreeing only on a thin set, also give `false`.

use std::collections::{BTreeSet, HashMap};

use cas_ast::{Operator, Tree};
use num_complex::Complex64;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::error::{EquivError, EvalError};
use crate::expression::Expression;
use crate::options::SamplingOptions;
use crate::relation::normalize;

/// Equality by sampling over the complex numbers.
pub fn equals_via_complex<E: Expression>(
    a: &E,
    b: &E,
    opts: &SamplingOptions,
) -> Result<bool, EquivError> {
    opts.validate()?;
    Sampler::<ComplexField>::new(opts).equals(a, b)
}

/// Equality by sampling over the reals.
pub fn equals_via_real<E: Expression>(
    a: &E,
    b: &E,
    opts: &SamplingOptions,
) -> Result<bool, EquivError> {
    opts.validate()?;
    Sampler::<RealField>::new(opts).equals(a, b)
}

// =============================================================================
// Number domains
// =============================================================================

/// What the sampler needs from a number domain.
trait Field {
    type Value: Copy + std::fmt::Debug;

    fn evaluate<E: Expression>(
        expr: &E,
        bindings: &HashMap<String, Self::Value>,
    ) -> Result<Self::Value, EvalError>;

    /// Uniform draw around `center` with per-component half-width `radius`.
    fn draw(rng: &mut ChaCha8Rng, center: Self::Value, radius: f64) -> Self::Value;

    fn zero() -> Self::Value;

    fn from_integer(k: i64) -> Self::Value;

    fn magnitude(value: Self::Value) -> f64;

    fn distance(a: Self::Value, b: Self::Value) -> f64;
}

struct RealField;

impl Field for RealField {
    type Value = f64;

    fn evaluate<E: Expression>(expr: &E, bindings: &HashMap<String, f64>) -> Result<f64, EvalError> {
        expr.evaluate_real(bindings)
    }

    fn draw(rng: &mut ChaCha8Rng, center: f64, radius: f64) -> f64 {
        center + rng.gen_range(-radius..radius)
    }

    fn zero() -> f64 {
        0.0
    }

    fn from_integer(k: i64) -> f64 {
        k as f64
    }

    fn magnitude(value: f64) -> f64 {
        value.abs()
    }

    fn distance(a: f64, b: f64) -> f64 {
        (a - b).abs()
    }
}

struct ComplexField;

impl Field for ComplexField {
    type Value = Complex64;

    fn evaluate<E: Expression>(
        expr: &E,
        bindings: &HashMap<String, Complex64>,
    ) -> Result<Complex64, EvalError> {
        expr.evaluate(bindings)
    }

    fn draw(rng: &mut ChaCha8Rng, center: Complex64, radius: f64) -> Complex64 {
        center
            + Complex64::new(
                rng.gen_range(-radius..radius),
                rng.gen_range(-radius..radius),
            )
    }

    fn zero() -> Complex64 {
        Complex64::new(0.0, 0.0)
    }

    fn from_integer(k: i64) -> Complex64 {
        Complex64::new(k as f64, 0.0)
    }

    fn magnitude(value: Complex64) -> f64 {
        value.norm()
    }

    fn distance(a: Complex64, b: Complex64) -> f64 {
        (a - b).norm()
    }
}

// =============================================================================
// Sampler
// =============================================================================

enum Probe {
    Accepted,
    Invalidated,
}

struct Sampler<'a, F: Field> {
    opts: &'a SamplingOptions,
    rng: ChaCha8Rng,
    _field: std::marker::PhantomData<F>,
}

impl<'a, F: Field> Sampler<'a, F> {
    fn new(opts: &'a SamplingOptions) -> Self {
        let rng = match opts.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            opts,
            rng,
            _field: std::marker::PhantomData,
        }
    }

    /// Dispatch on the shape of the two sides.
    fn equals<E: Expression>(&mut self, a: &E, b: &E) -> Result<bool, EquivError> {
        let (left, right) = (a.tree(), b.tree());

        if let (Some(x), Some(y)) = (left.as_bool(), right.as_bool()) {
            return Ok(x == y);
        }
        if left.as_bool().is_some() || right.as_bool().is_some() {
            return Ok(false);
        }

        let is_container = |t: &Tree| t.op().is_some_and(Operator::is_container);
        if is_container(left) || is_container(right) {
            if left.op() != right.op() || left.operands().len() != right.operands().len() {
                return Ok(false);
            }
            for (x, y) in left.operands().iter().zip(right.operands()) {
                if !self.equals(&a.from_tree(x.clone()), &b.from_tree(y.clone()))? {
                    return Ok(false);
                }
            }
            return Ok(true);
        }

        let is_relation = |t: &Tree| t.op().is_some_and(Operator::is_relation);
        match (is_relation(left), is_relation(right)) {
            (true, true) => {
                let (l, r) = (normalize(left)?, normalize(right)?);
                if l.op != r.op {
                    return Ok(false);
                }
                let order = l.is_order();
                let dl = a.from_tree(l.difference);
                if self.sample(&dl, &b.from_tree(r.difference.clone())) {
                    return Ok(true);
                }
                // a = b and b = a are the same equation
                if order {
                    return Ok(false);
                }
                Ok(self.sample(&dl, &b.from_tree(Tree::neg(r.difference))))
            }
            (false, false) => Ok(self.sample(a, b)),
            _ => Ok(false),
        }
    }

    fn sample<E: Expression>(&mut self, a: &E, b: &E) -> bool {
        let variables: BTreeSet<String> = a.variables().union(&b.variables()).cloned().collect();
        let integers: BTreeSet<&str> = variables
            .iter()
            .filter(|v| {
                a.assumptions().is_integer(v).is_true() || b.assumptions().is_integer(v).is_true()
            })
            .map(String::as_str)
            .collect();

        for trial in 0..self.opts.max_trials {
            let anchor: HashMap<String, F::Value> = variables
                .iter()
                .map(|v| {
                    let value = if integers.contains(v.as_str()) {
                        let range = self.opts.integer_range;
                        F::from_integer(self.rng.gen_range(-range..=range))
                    } else {
                        F::draw(&mut self.rng, F::zero(), self.opts.radius)
                    };
                    (v.clone(), value)
                })
                .collect();

            if !self.agree(a, b, &anchor).unwrap_or(false) {
                continue;
            }
            debug!(trial, ?anchor, "sampling anchor found");

            match self.probe_nearby(a, b, &anchor, &integers) {
                Probe::Accepted => return true,
                Probe::Invalidated => debug!(trial, "sampling anchor invalidated"),
            }
        }
        false
    }

    fn probe_nearby<E: Expression>(
        &mut self,
        a: &E,
        b: &E,
        anchor: &HashMap<String, F::Value>,
        integers: &BTreeSet<&str>,
    ) -> Probe {
        let mut matches = 0;
        for _ in 0..self.opts.nearby_probes {
            let probe: HashMap<String, F::Value> = anchor
                .iter()
                .map(|(v, center)| {
                    let value = if integers.contains(v.as_str()) {
                        *center
                    } else {
                        F::draw(&mut self.rng, *center, self.opts.nearby_radius)
                    };
                    (v.clone(), value)
                })
                .collect();

            match self.agree(a, b, &probe) {
                Some(true) => {
                    matches += 1;
                    if matches >= self.opts.min_nearby_matches {
                        return Probe::Accepted;
                    }
                }
                Some(false) => {
                    trace!(?probe, "nearby probe disagrees");
                    return Probe::Invalidated;
                }
                None => {}
            }
        }
        Probe::Invalidated
    }

    /// `None` when either side has no usable value at `bindings`.
    fn agree<E: Expression>(
        &self,
        a: &E,
        b: &E,
        bindings: &HashMap<String, F::Value>,
    ) -> Option<bool> {
        let va = self.usable(F::evaluate(a, bindings))?;
        let vb = self.usable(F::evaluate(b, bindings))?;
        Some(self.close(va, vb))
    }

    fn usable(&self, value: Result<F::Value, EvalError>) -> Option<F::Value> {
        match value {
            Ok(v) if F::magnitude(v) < self.opts.magnitude_cutoff => Some(v),
            Ok(_) => None,
            Err(err) => {
                trace!(%err, "sample discarded");
                None
            }
        }
    }

    fn close(&self, a: F::Value, b: F::Value) -> bool {
        let (ma, mb) = (F::magnitude(a), F::magnitude(b));
        if ma <= self.opts.zero_tolerance && mb <= self.opts.zero_tolerance {
            return true;
        }
        F::distance(a, b) <= self.opts.relative_tolerance * ma.max(mb)
    }
}
