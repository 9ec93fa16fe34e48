//! Deciding whether two mathematical expressions mean the same thing.
//!
//! The [`EqualityOracle`] combines structural comparison, randomized
//! numeric sampling and periodic-set reasoning behind one `equals` call.
//! Each strategy is also usable alone:
//!
//! - [`compare::equal`]: structural equality, commutative operands in any order
//! - [`pattern::match_tree`]: one-way matching where single letters are pattern variables
//! - [`transform`]: regrouping, expansion, substitution and bounded rewrite search
//! - [`sampling`]: agreement at random complex or real points
//! - [`finite_field`]: refutation by evaluation modulo small primes
//! - [`discrete_set`]: equality of unions of arithmetic progressions
//! - [`sign_error`]: equality up to a few negated subtrees
//!
//! Questions that can stay open answer with [`Truth`]; only
//! [`EqualityOracle::equals`] turns `Unknown` into `false`.

pub mod assumptions;
pub mod compare;
pub mod discrete_set;
pub mod error;
pub mod eval;
pub mod expression;
pub mod finite_field;
pub mod modp;
pub mod options;
pub mod oracle;
pub mod pattern;
pub mod sampling;
pub mod sign_error;
pub mod transform;
pub mod truth;

pub(crate) mod ratio;
pub(crate) mod relation;

pub use assumptions::{AssumptionQuery, AssumptionSet, NoAssumptions};
pub use compare::{equal, StructuralComparator};
pub use error::{EquivError, EvalError};
pub use expression::{Expression, MathExpression};
pub use options::{
    CompareOptions, DiscreteSetOptions, EqualityOptions, FiniteFieldOptions, RewriteOptions,
    SamplingOptions, SignErrorOptions,
};
pub use oracle::EqualityOracle;
pub use pattern::{match_tree, MatchResult};
pub use sign_error::{equal_with_sign_errors, SignErrorMatch};
pub use truth::Truth;
