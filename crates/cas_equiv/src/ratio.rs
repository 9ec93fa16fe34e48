//! Recovering small fractions from floating-point values.

use num_rational::Ratio;

/// Best fraction with denominator at most `max_denominator` that is within
/// `tolerance` (relative, floored at 1) of `x`, found by walking the
/// continued-fraction convergents of `x`.
pub(crate) fn approximate_ratio(
    x: f64,
    max_denominator: i64,
    tolerance: f64,
) -> Option<Ratio<i64>> {
    if !x.is_finite() || x.abs() > i64::MAX as f64 / 2.0 {
        return None;
    }
    // Convergents h/k, seeded with h₋₂/k₋₂ = 0/1 and h₋₁/k₋₁ = 1/0
    let (mut h_prev, mut h) = (0i64, 1i64);
    let (mut k_prev, mut k) = (1i64, 0i64);
    let mut rest = x;
    for _ in 0..64 {
        let a = rest.floor();
        let a_int = a as i64;
        let h_next = a_int.checked_mul(h)?.checked_add(h_prev)?;
        let k_next = a_int.checked_mul(k)?.checked_add(k_prev)?;
        if k_next > max_denominator {
            return None;
        }
        (h_prev, h, k_prev, k) = (h, h_next, k, k_next);

        if (x - h as f64 / k as f64).abs() <= tolerance * x.abs().max(1.0) {
            return Some(Ratio::new(h, k));
        }
        let fraction = rest - a;
        if fraction == 0.0 {
            break;
        }
        rest = fraction.recip();
    }
    None
}
