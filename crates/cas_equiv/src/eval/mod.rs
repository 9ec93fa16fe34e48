//! Checked evaluators.
//!
//! Three numeric domains share one contract: evaluation either produces a
//! value or an [`EvalError`](crate::EvalError) explaining why not. Callers
//! that sample (the numerical sampler, the finite-field refuter) treat every
//! error as "discard this sample", so an error never escapes an equality
//! query.
//!
//! - [`real`]: `f64`, with domain checks (`ln` of a non-positive, ...)
//! - [`complex`]: `Complex64`, where `i` is the imaginary unit
//! - [`modular`]: residues modulo a prime, `Ok(None)` standing for NaN

pub mod complex;
pub mod modular;
pub mod real;

use std::collections::HashMap;

use num_complex::Complex64;

pub use complex::eval_complex;
pub use modular::eval_modular;
pub use real::eval_real;

/// Real variable bindings.
pub type RealBindings = HashMap<String, f64>;
/// Complex variable bindings.
pub type ComplexBindings = HashMap<String, Complex64>;
/// Residue bindings for modular evaluation.
pub type ModBindings = HashMap<String, u64>;

/// Default recursion limit for every evaluator.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Integer value of an exponent, if it is one and fits `i32`.
#[inline]
pub(crate) fn integer_exponent(exp: f64) -> Option<i32> {
    if exp.fract() == 0.0 && exp.abs() <= i32::MAX as f64 {
        Some(exp as i32)
    } else {
        None
    }
}

/// Exact factorial for small non-negative integers.
pub(crate) fn factorial(n: f64) -> Option<f64> {
    if n < 0.0 || n.fract() != 0.0 || n > 170.0 {
        return None;
    }
    Some((1..=n as u32).fold(1.0, |acc, k| acc * k as f64))
}
