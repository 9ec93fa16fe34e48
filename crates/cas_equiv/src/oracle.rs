//! The equality oracle: one entry point over every strategy.
//!
//! [`EqualityOracle::equals`] tries, in order:
//!
//! 1. structural equality after flattening `+ * and or`
//! 2. sampling over the complex numbers
//! 3. periodic-set equality, only when a side is a discrete infinite set
//!
//! and answers `false` when none succeeds. Real sampling and finite-field
//! refutation are not part of the chain; they are available separately.
//! `equals` is the only place where an undecided answer becomes `false`.

use cas_ast::Tree;
use tracing::debug;

use crate::compare::equal;
use crate::discrete_set::{self, DiscreteInfiniteSet};
use crate::error::EquivError;
use crate::expression::Expression;
use crate::finite_field;
use crate::options::EqualityOptions;
use crate::sampling;
use crate::transform::{associate_all, equal_after_transformations, Transformer};
use crate::truth::Truth;

/// Equality strategies bound to validated options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EqualityOracle {
    options: EqualityOptions,
}

impl EqualityOracle {
    /// Fails with [`EquivError::InvalidOption`] on nonsensical options.
    pub fn new(options: EqualityOptions) -> Result<Self, EquivError> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &EqualityOptions {
        &self.options
    }

    /// Whether `a` and `b` denote the same object.
    ///
    /// `false` covers both "shown different" and "not shown equal".
    pub fn equals<E: Expression>(&self, a: &E, b: &E) -> Result<bool, EquivError> {
        if self.equals_via_syntax(a.tree(), b.tree()) {
            debug!(strategy = "syntax", "equal");
            return Ok(true);
        }
        if self.equals_via_complex(a, b)? {
            debug!(strategy = "complex", "equal");
            return Ok(true);
        }
        if DiscreteInfiniteSet::is_set(a.tree()) || DiscreteInfiniteSet::is_set(b.tree()) {
            let verdict = discrete_set::equals(a, b, &self.options.discrete_set, |x, y| {
                self.equals(x, y)
            })?;
            debug!(strategy = "discrete_set", ?verdict);
            return Ok(verdict.to_bool());
        }
        debug!("no strategy established equality");
        Ok(false)
    }

    /// Structural equality up to reordering of `+`/`*` operands and
    /// regrouping of associative chains.
    pub fn equals_via_syntax(&self, a: &Tree, b: &Tree) -> bool {
        equal(&associate_all(a), &associate_all(b), &self.options.compare)
    }

    pub fn equals_via_complex<E: Expression>(&self, a: &E, b: &E) -> Result<bool, EquivError> {
        sampling::equals_via_complex(a, b, &self.options.sampling)
    }

    pub fn equals_via_real<E: Expression>(&self, a: &E, b: &E) -> Result<bool, EquivError> {
        sampling::equals_via_real(a, b, &self.options.sampling)
    }

    /// Refutation only: `False` or `Unknown`.
    pub fn equals_via_finite_field<E: Expression>(
        &self,
        a: &E,
        b: &E,
    ) -> Result<Truth, EquivError> {
        finite_field::equals_via_finite_field(a, b, &self.options.finite_field)
    }

    /// Rewrite search using this oracle's syntactic equality as the comparer.
    pub fn equals_after_transformations(
        &self,
        a: &Tree,
        b: &Tree,
        transformers: &[&dyn Transformer],
        depth: usize,
    ) -> Truth {
        equal_after_transformations(
            a,
            b,
            transformers,
            depth,
            |x, y| self.equals_via_syntax(x, y),
            &self.options.rewrite,
        )
    }
}
