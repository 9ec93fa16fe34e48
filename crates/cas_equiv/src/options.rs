//! Tunables for every equality strategy.
//!
//! Each struct has a `Default` matching the documented behavior and a
//! `validate()` that rejects nonsensical values (non-positive tolerances,
//! zero trials) with [`EquivError::InvalidOption`]. Structs derive serde so a
//! host can load them from its own configuration; missing fields take their
//! defaults.

use serde::{Deserialize, Serialize};

use crate::error::EquivError;

fn ensure_finite_non_negative(name: &'static str, value: f64) -> Result<(), EquivError> {
    if !value.is_finite() || value < 0.0 {
        return Err(EquivError::invalid_option(
            name,
            format!("must be finite and non-negative, got {}", value),
        ));
    }
    Ok(())
}

fn ensure_positive(name: &'static str, value: f64) -> Result<(), EquivError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EquivError::invalid_option(
            name,
            format!("must be finite and positive, got {}", value),
        ));
    }
    Ok(())
}

fn ensure_nonzero(name: &'static str, value: usize) -> Result<(), EquivError> {
    if value == 0 {
        return Err(EquivError::invalid_option(name, "must be at least 1"));
    }
    Ok(())
}

// =============================================================================
// Structural comparison
// =============================================================================

/// Options for structural comparison of trees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Tolerance on numeric leaves (0 = exact)
    pub allowed_error_in_numbers: f64,
    /// Interpret the tolerance as absolute rather than relative
    pub allowed_error_is_absolute: bool,
    /// Also apply the tolerance to numbers in exponent position
    pub include_error_in_number_exponents: bool,
    /// Above this many operands `+`/`*` are compared in order only
    pub max_permutation_arity: usize,
    /// Comparisons deeper than this are reported as not equal
    pub max_depth: usize,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            allowed_error_in_numbers: 0.0,
            allowed_error_is_absolute: false,
            include_error_in_number_exponents: false,
            max_permutation_arity: 8,
            max_depth: 512,
        }
    }
}

impl CompareOptions {
    /// Exact comparison with a given numeric tolerance.
    pub fn with_tolerance(allowed_error_in_numbers: f64) -> Self {
        Self {
            allowed_error_in_numbers,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), EquivError> {
        ensure_finite_non_negative("allowed_error_in_numbers", self.allowed_error_in_numbers)?;
        ensure_nonzero("max_depth", self.max_depth)
    }
}

// =============================================================================
// Numerical sampling
// =============================================================================

/// Options for the anchor / nearby-probe sampler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingOptions {
    /// Outer trials looking for an anchor
    pub max_trials: usize,
    /// Nearby probes evaluated around an anchor
    pub nearby_probes: usize,
    /// Agreeing finite nearby probes needed to accept
    pub min_nearby_matches: usize,
    /// Radius of the outer random bindings
    pub radius: f64,
    /// Radius of the nearby perturbation
    pub nearby_radius: f64,
    /// Relative agreement needed between the two sides
    pub relative_tolerance: f64,
    /// Values this small on both sides agree regardless of relative error
    pub zero_tolerance: f64,
    /// Integer-valued variables are drawn from `-integer_range..=integer_range`
    pub integer_range: i64,
    /// Magnitudes at or beyond this are treated as overflow
    pub magnitude_cutoff: f64,
    /// Fixed RNG seed; entropy when `None`
    pub seed: Option<u64>,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            max_trials: 100,
            nearby_probes: 100,
            min_nearby_matches: 10,
            radius: 10.0,
            nearby_radius: 0.1,
            relative_tolerance: 1e-12,
            zero_tolerance: 1e-15,
            integer_range: 10,
            magnitude_cutoff: f64::MAX * 1e-20,
            seed: None,
        }
    }
}

impl SamplingOptions {
    pub fn validate(&self) -> Result<(), EquivError> {
        ensure_nonzero("max_trials", self.max_trials)?;
        ensure_nonzero("nearby_probes", self.nearby_probes)?;
        ensure_nonzero("min_nearby_matches", self.min_nearby_matches)?;
        if self.min_nearby_matches > self.nearby_probes {
            return Err(EquivError::invalid_option(
                "min_nearby_matches",
                format!("cannot exceed nearby_probes ({})", self.nearby_probes),
            ));
        }
        ensure_positive("radius", self.radius)?;
        ensure_positive("nearby_radius", self.nearby_radius)?;
        ensure_positive("relative_tolerance", self.relative_tolerance)?;
        ensure_finite_non_negative("zero_tolerance", self.zero_tolerance)?;
        ensure_positive("magnitude_cutoff", self.magnitude_cutoff)?;
        if self.integer_range < 0 {
            return Err(EquivError::invalid_option(
                "integer_range",
                "must be non-negative",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Finite field refutation
// =============================================================================

/// Options for the modular refuter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiniteFieldOptions {
    /// Random bindings drawn per prime
    pub trials_per_prime: usize,
    /// Seed; the RNG is reseeded with it on every call
    pub seed: u64,
}

impl Default for FiniteFieldOptions {
    fn default() -> Self {
        Self {
            trials_per_prime: 3,
            seed: 0x5EED_CA5E,
        }
    }
}

impl FiniteFieldOptions {
    pub fn validate(&self) -> Result<(), EquivError> {
        ensure_nonzero("trials_per_prime", self.trials_per_prime)
    }
}

// =============================================================================
// Discrete infinite sets
// =============================================================================

/// Options for periodic-set containment and list enumeration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscreteSetOptions {
    /// Explicit terms a `..., ldots` list needs before it can match a set
    pub min_elements_match: usize,
    /// Offset congruence tolerance, in units of the period
    pub tolerance: f64,
    /// Largest combined residue modulus that is enumerated
    pub max_residue_modulus: u64,
    /// Integer samples used to decide a symbolic offset
    pub offset_samples: usize,
}

impl Default for DiscreteSetOptions {
    fn default() -> Self {
        Self {
            min_elements_match: 3,
            tolerance: 1e-10,
            max_residue_modulus: 100_000,
            offset_samples: 5,
        }
    }
}

impl DiscreteSetOptions {
    pub fn validate(&self) -> Result<(), EquivError> {
        ensure_nonzero("min_elements_match", self.min_elements_match)?;
        ensure_positive("tolerance", self.tolerance)?;
        if self.max_residue_modulus == 0 {
            return Err(EquivError::invalid_option(
                "max_residue_modulus",
                "must be at least 1",
            ));
        }
        ensure_nonzero("offset_samples", self.offset_samples)
    }
}

// =============================================================================
// Rewriting
// =============================================================================

/// Options for bounded rewriting and expansion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteOptions {
    /// A frontier that grows past this size ends the search as undecided
    pub max_frontier: usize,
    /// Largest integer power of a sum that `expand` multiplies out
    pub max_expand_power: u32,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            max_frontier: 1000,
            max_expand_power: 12,
        }
    }
}

impl RewriteOptions {
    pub fn validate(&self) -> Result<(), EquivError> {
        ensure_nonzero("max_frontier", self.max_frontier)
    }
}

// =============================================================================
// Aggregate
// =============================================================================

/// Every tunable the [`EqualityOracle`](crate::EqualityOracle) uses.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqualityOptions {
    pub compare: CompareOptions,
    pub sampling: SamplingOptions,
    pub finite_field: FiniteFieldOptions,
    pub discrete_set: DiscreteSetOptions,
    pub rewrite: RewriteOptions,
}

impl EqualityOptions {
    pub fn validate(&self) -> Result<(), EquivError> {
        self.compare.validate()?;
        self.sampling.validate()?;
        self.finite_field.validate()?;
        self.discrete_set.validate()?;
        self.rewrite.validate()
    }
}

/// Options for [`equal_with_sign_errors`](crate::sign_error::equal_with_sign_errors).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignErrorOptions {
    /// Most subtrees that may be negated
    pub max_sign_errors: usize,
}

impl Default for SignErrorOptions {
    fn default() -> Self {
        Self { max_sign_errors: 1 }
    }
}
