//! Tree transformations.
//!
//! Everything here is copy-on-write: inputs are borrowed, outputs are fresh
//! trees.
//!
//! - [`associate`] / [`deassociate`]: flatten or re-nest associative chains
//! - [`substitute`]: instantiate a pattern with match bindings
//! - [`search`] / [`apply_transformation`]: rewrite one occurrence at a time
//! - [`equal_after_transformations`]: bounded bidirectional rewrite search
//! - [`expand`]: distribute products and integer powers of sums
//! - [`fold_constants`]: fold literal arithmetic

mod associate;
mod expand;
mod fold;
mod rewrite_search;
mod search;
mod substitute;

pub use associate::{associate, associate_all, deassociate};
pub use expand::expand;
pub use fold::fold_constants;
pub use rewrite_search::equal_after_transformations;
pub use search::{apply_transformation, search, Occurrence, Search, Transformation, Transformer};
pub use substitute::substitute;
