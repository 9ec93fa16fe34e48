//! Periodic sets: `{offset + period·k : min_index ≤ k ≤ max_index}`.
//!
//! A discrete infinite set is the union of one or more progressions, written
//! as `["discrete_infinite_set", ["tuple", offset, period, min, max], ...]`.
//!
//! # Containment
//!
//! `A ⊆ B` is decided one progression `a` of `A` at a time. In units of
//! `a`'s period, with `a`'s offset as origin, `a` is the integers and a
//! progression `b` of `B` becomes `{c + (n/d)·j}` where `c` is the scaled
//! offset difference and `n/d` the reduced period ratio. The integers `b`
//! reaches are exactly one residue class `m ≡ (d·c)·d⁻¹ (mod n)`, or none
//! when `d·c` is not an integer. `a ⊆ B` holds iff those classes cover `Z`.
//!
//! Coverage is tested per distinct modulus `n` (each class whose modulus
//! divides `n` contributes), then at the lcm of all moduli, which is exact.
//! Offsets that cannot be decided numerically are decided by simplifying and
//! by sampling integer-valued variables; failing that the answer is
//! `Unknown`.
//!
//! Only doubly-infinite progressions take part in containment. A set with a
//! lower bound can be compared to an ellipsis-terminated list by
//! enumerating its first terms.

use std::collections::{BTreeSet, HashMap};

use cas_ast::{Operator, Tree};
use num_integer::Integer;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::error::EquivError;
use crate::eval::RealBindings;
use crate::expression::Expression;
use crate::modp::{inv_mod, mul_mod, residue};
use crate::options::DiscreteSetOptions;
use crate::ratio::approximate_ratio;
use crate::truth::Truth;

/// Seed for sampling symbolic offsets; containment is deterministic.
const OFFSET_SAMPLE_SEED: u64 = 0x0FF5_E75E;

// =============================================================================
// Types
// =============================================================================

/// One end of a progression's index range.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexBound {
    /// `-infinity` (`-1`) or `infinity` (`1`)
    Infinite(i8),
    Integer(i64),
    /// Symbolic or non-integer bound
    Other(Tree),
}

impl IndexBound {
    pub fn from_tree(tree: &Tree) -> Self {
        if let Some(sign) = tree.infinity_sign() {
            return IndexBound::Infinite(sign);
        }
        match tree.as_signed_number() {
            Some(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                IndexBound::Integer(n as i64)
            }
            _ => IndexBound::Other(tree.clone()),
        }
    }
}

/// `{offset + period·k : min_index ≤ k ≤ max_index}`
#[derive(Debug, Clone, PartialEq)]
pub struct Progression {
    pub offset: Tree,
    pub period: Tree,
    pub min_index: IndexBound,
    pub max_index: IndexBound,
}

impl Progression {
    pub fn is_doubly_infinite(&self) -> bool {
        self.min_index == IndexBound::Infinite(-1) && self.max_index == IndexBound::Infinite(1)
    }

    /// `offset + period·k`
    pub fn term(&self, k: i64) -> Tree {
        Tree::add(vec![
            self.offset.clone(),
            Tree::mul(vec![Tree::signed_num(k as f64), self.period.clone()]),
        ])
    }
}

/// A validated discrete infinite set.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteInfiniteSet {
    pub progressions: Vec<Progression>,
}

impl DiscreteInfiniteSet {
    /// Whether `tree` claims to be a discrete infinite set.
    pub fn is_set(tree: &Tree) -> bool {
        tree.is_op(Operator::DiscreteInfiniteSet)
    }

    pub fn from_tree(tree: &Tree) -> Result<Self, EquivError> {
        if !Self::is_set(tree) {
            return Err(EquivError::MalformedSet(format!(
                "{} is not a discrete_infinite_set",
                tree
            )));
        }
        let progressions = tree
            .operands()
            .iter()
            .map(|item| match item.operands() {
                [offset, period, min, max] if item.is_op(Operator::Tuple) => Ok(Progression {
                    offset: offset.clone(),
                    period: period.clone(),
                    min_index: IndexBound::from_tree(min),
                    max_index: IndexBound::from_tree(max),
                }),
                _ => Err(EquivError::MalformedSet(format!(
                    "expected (offset, period, min_index, max_index), got {}",
                    item
                ))),
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { progressions })
    }

    /// The first `count` terms, simplified in the context of `ctx`.
    ///
    /// Only a single progression with an integer lower bound and no upper
    /// bound has a well-defined "first" term.
    pub fn first_terms<E: Expression>(&self, ctx: &E, count: usize) -> Option<Vec<E>> {
        let [progression] = self.progressions.as_slice() else {
            return None;
        };
        let (IndexBound::Integer(start), IndexBound::Infinite(1)) =
            (&progression.min_index, &progression.max_index)
        else {
            return None;
        };
        Some(
            (*start..)
                .take(count)
                .map(|k| ctx.from_tree(progression.term(k)).simplify())
                .collect(),
        )
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Compare two trees of which at least one is a discrete infinite set.
///
/// Set against set compares by mutual containment; set against an
/// ellipsis-terminated list by enumeration, with `element_equals` deciding
/// term equality. A set never equals anything else. `Unknown` when neither
/// side is a set.
pub fn equals<E, F>(
    a: &E,
    b: &E,
    opts: &DiscreteSetOptions,
    element_equals: F,
) -> Result<Truth, EquivError>
where
    E: Expression,
    F: FnMut(&E, &E) -> Result<bool, EquivError>,
{
    opts.validate()?;
    let (left, right) = (a.tree(), b.tree());
    match (DiscreteInfiniteSet::is_set(left), DiscreteInfiniteSet::is_set(right)) {
        (true, true) => equal_sets(a, b, opts),
        (true, false) if right.is_op(Operator::List) => equals_list(a, b, opts, element_equals),
        (false, true) if left.is_op(Operator::List) => equals_list(b, a, opts, element_equals),
        (true, false) | (false, true) => Ok(Truth::False),
        (false, false) => Ok(Truth::Unknown),
    }
}

/// `a = b` as sets: each contains the other.
pub fn equal_sets<E: Expression>(
    a: &E,
    b: &E,
    opts: &DiscreteSetOptions,
) -> Result<Truth, EquivError> {
    let forward = contained_in(a, b, opts)?;
    if forward.is_false() {
        return Ok(Truth::False);
    }
    Ok(forward.and(contained_in(b, a, opts)?))
}

/// `a ⊆ b`.
pub fn contained_in<E: Expression>(
    a: &E,
    b: &E,
    opts: &DiscreteSetOptions,
) -> Result<Truth, EquivError> {
    let inner = DiscreteInfiniteSet::from_tree(a.tree())?;
    let outer = DiscreteInfiniteSet::from_tree(b.tree())?;

    if !inner
        .progressions
        .iter()
        .chain(&outer.progressions)
        .all(Progression::is_doubly_infinite)
    {
        debug!("containment needs doubly-infinite progressions; undecided");
        return Ok(Truth::Unknown);
    }

    let mut verdict = Truth::True;
    for progression in &inner.progressions {
        let covered = Coverage::new(a, opts).covers(progression, &outer.progressions);
        if covered.is_false() {
            return Ok(Truth::False);
        }
        verdict = verdict.and(covered);
    }
    Ok(verdict)
}

/// Set against an ellipsis-terminated list.
pub fn equals_list<E, F>(
    set: &E,
    list: &E,
    opts: &DiscreteSetOptions,
    mut element_equals: F,
) -> Result<Truth, EquivError>
where
    E: Expression,
    F: FnMut(&E, &E) -> Result<bool, EquivError>,
{
    let parsed = DiscreteInfiniteSet::from_tree(set.tree())?;
    let Some((last, explicit)) = list.tree().operands().split_last() else {
        return Ok(Truth::False);
    };
    if !last.is_ellipsis() {
        // A finite list is never an infinite set
        return Ok(Truth::False);
    }
    if parsed.progressions.len() == 1 && parsed.progressions[0].min_index == IndexBound::Infinite(-1)
    {
        return Ok(Truth::False);
    }
    if explicit.len() < opts.min_elements_match {
        debug!(
            terms = explicit.len(),
            needed = opts.min_elements_match,
            "too few explicit list terms; undecided"
        );
        return Ok(Truth::Unknown);
    }
    let Some(terms) = parsed.first_terms(set, explicit.len()) else {
        return Ok(Truth::Unknown);
    };
    for (term, element) in terms.iter().zip(explicit) {
        if !element_equals(term, &list.from_tree(element.clone()))? {
            return Ok(Truth::False);
        }
    }
    Ok(Truth::True)
}

// =============================================================================
// Residue coverage
// =============================================================================

/// Integers reached by one outer progression, in inner-period units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reach {
    /// `m ≡ residue (mod modulus)`
    Class { residue: u64, modulus: u64 },
    Nothing,
    Undetermined,
}

struct Coverage<'a, E: Expression> {
    ctx: &'a E,
    opts: &'a DiscreteSetOptions,
    rng: ChaCha8Rng,
}

impl<'a, E: Expression> Coverage<'a, E> {
    fn new(ctx: &'a E, opts: &'a DiscreteSetOptions) -> Self {
        Self {
            ctx,
            opts,
            rng: ChaCha8Rng::seed_from_u64(OFFSET_SAMPLE_SEED),
        }
    }

    fn covers(&mut self, inner: &Progression, outer: &[Progression]) -> Truth {
        let reaches: Vec<Reach> = outer.iter().map(|b| self.reach(inner, b)).collect();
        let classes: Vec<(u64, u64)> = reaches
            .iter()
            .filter_map(|r| match r {
                Reach::Class { residue, modulus } => Some((*residue, *modulus)),
                _ => None,
            })
            .collect();
        let undetermined = reaches.contains(&Reach::Undetermined);

        let moduli: BTreeSet<u64> = classes.iter().map(|(_, n)| *n).collect();
        if moduli.iter().any(|&n| residues_covered(&classes, n)) {
            return Truth::True;
        }

        let lcm = moduli.iter().try_fold(1u64, |acc, &n| {
            Some(acc.lcm(&n)).filter(|l| *l <= self.opts.max_residue_modulus)
        });
        match lcm {
            Some(l) if residues_covered(&classes, l) => Truth::True,
            Some(_) if !undetermined => {
                debug!(?classes, "residue classes leave a gap");
                Truth::False
            }
            Some(_) => Truth::Unknown,
            None => {
                debug!(
                    max = self.opts.max_residue_modulus,
                    "combined residue modulus too large; undecided"
                );
                Truth::Unknown
            }
        }
    }

    /// Which integers `outer` reaches in units of `inner`.
    fn reach(&mut self, inner: &Progression, outer: &Progression) -> Reach {
        let ratio_tree = Tree::div(outer.period.clone(), inner.period.clone());
        let Some(ratio) = self.constant(&ratio_tree) else {
            return Reach::Undetermined;
        };
        let max_denominator = i64::try_from(self.opts.max_residue_modulus).unwrap_or(i64::MAX);
        let Some(ratio) = approximate_ratio(ratio.abs(), max_denominator, self.opts.tolerance)
            .filter(|r| *r.numer() > 0)
        else {
            return Reach::Undetermined;
        };
        let (n, d) = (*ratio.numer() as u64, *ratio.denom() as u64);
        if n > self.opts.max_residue_modulus {
            debug!(n, max = self.opts.max_residue_modulus, "period ratio too large; undecided");
            return Reach::Undetermined;
        }

        // c = (offset_b - offset_a) / period_a, scaled by d
        let scaled = Tree::mul(vec![
            Tree::num(d as f64),
            Tree::div(
                Tree::sub(outer.offset.clone(), inner.offset.clone()),
                inner.period.clone(),
            ),
        ]);
        let tolerance = self.opts.tolerance * d as f64;

        match self.constant(&scaled) {
            Some(value) => match integer_within(value, tolerance) {
                Some(e) => class_of(e, n, d),
                None => Reach::Nothing,
            },
            None => self.sampled_reach(&scaled, n, d, tolerance),
        }
    }

    /// Decide a symbolic scaled offset by sampling its integer variables.
    fn sampled_reach(&mut self, scaled: &Tree, n: u64, d: u64, tolerance: f64) -> Reach {
        let expr = self.ctx.from_tree(scaled.clone()).simplify();
        let variables = expr.variables();
        if !variables
            .iter()
            .all(|v| self.ctx.assumptions().is_integer(v).is_true())
        {
            return Reach::Undetermined;
        }

        let mut seen: Option<Reach> = None;
        for _ in 0..self.opts.offset_samples {
            let bindings: RealBindings = variables
                .iter()
                .map(|v| (v.clone(), self.rng.gen_range(-10i64..=10) as f64))
                .collect();
            let Some(e) = expr
                .evaluate_real(&bindings)
                .ok()
                .and_then(|v| integer_within(v, tolerance))
            else {
                return Reach::Undetermined;
            };
            let reach = class_of(e, n, d);
            match seen {
                Some(previous) if previous != reach => return Reach::Undetermined,
                _ => seen = Some(reach),
            }
        }
        seen.unwrap_or(Reach::Undetermined)
    }

    /// Numeric value of a variable-free tree.
    fn constant(&self, tree: &Tree) -> Option<f64> {
        let simplified = self.ctx.from_tree(tree.clone()).simplify();
        if let Some(value) = simplified.tree().as_signed_number() {
            return Some(value);
        }
        if !simplified.variables().is_empty() {
            return None;
        }
        simplified.evaluate_real(&HashMap::new()).ok()
    }
}

fn integer_within(value: f64, tolerance: f64) -> Option<i64> {
    let rounded = value.round();
    ((value - rounded).abs() <= tolerance && rounded.abs() < i64::MAX as f64).then_some(rounded as i64)
}

/// Residue class of `m` with `d·m ≡ e (mod n)`.
fn class_of(e: i64, n: u64, d: u64) -> Reach {
    if n == 1 {
        return Reach::Class {
            residue: 0,
            modulus: 1,
        };
    }
    match inv_mod(d % n, n) {
        Some(d_inv) => Reach::Class {
            residue: mul_mod(residue(e, n), d_inv, n),
            modulus: n,
        },
        None => Reach::Undetermined,
    }
}

/// Whether every residue modulo `modulus` lies in a class whose modulus
/// divides it.
fn residues_covered(classes: &[(u64, u64)], modulus: u64) -> bool {
    let Ok(size) = usize::try_from(modulus) else {
        return false;
    };
    let mut covered = vec![false; size];
    for &(r, n) in classes.iter().filter(|(_, n)| modulus % n == 0) {
        let step = n as usize;
        let mut k = (r % n) as usize;
        while k < size {
            covered[k] = true;
            k += step;
        }
    }
    covered.into_iter().all(|c| c)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::assumptions::AssumptionSet;
    use crate::expression::MathExpression;

    fn e(text: &str) -> MathExpression {
        MathExpression::new(Tree::parse_literal(text).unwrap())
    }

    fn set(progressions: &[(&str, &str)]) -> MathExpression {
        let items: Vec<String> = progressions
            .iter()
            .map(|(offset, period)| {
                format!(r#"["tuple",{},{},["-","infinity"],"infinity"]"#, offset, period)
            })
            .collect();
        e(&format!(r#"["discrete_infinite_set",{}]"#, items.join(",")))
    }

    fn numeric_equals(a: &MathExpression, b: &MathExpression) -> Result<bool, EquivError> {
        let empty = RealBindings::new();
        Ok(matches!(
            (a.evaluate_real(&empty), b.evaluate_real(&empty)),
            (Ok(x), Ok(y)) if (x - y).abs() < 1e-9
        ))
    }

    fn eq(a: &MathExpression, b: &MathExpression) -> Truth {
        equals(a, b, &DiscreteSetOptions::default(), numeric_equals).unwrap()
    }

    #[test]
    fn test_shifted_progression_is_the_same_set() {
        assert_eq!(eq(&set(&[("0", "7")]), &set(&[("7", "7")])), Truth::True);
        // Negative period, same set
        assert_eq!(eq(&set(&[("0", "7")]), &set(&[("0", r#"["-",7]"#)])), Truth::True);
    }

    #[test]
    fn test_union_of_classes() {
        let all = set(&[("0", "1")]);
        let evens_and_odds = set(&[("0", "2"), ("1", "2")]);
        assert_eq!(eq(&all, &evens_and_odds), Truth::True);

        let multiples_of_three = set(&[("0", "3")]);
        let by_six = set(&[("0", "6"), ("3", "6")]);
        assert_eq!(eq(&multiples_of_three, &by_six), Truth::True);
    }

    #[test]
    fn test_gap_is_refuted() {
        assert_eq!(eq(&set(&[("0", "1")]), &set(&[("0", "2")])), Truth::False);
        assert_eq!(
            eq(&set(&[("0", "3"), ("1", "3")]), &set(&[("1", "3"), ("2", "3")])),
            Truth::False
        );
        let opts = DiscreteSetOptions::default();
        assert_eq!(
            contained_in(&set(&[("0", "2")]), &set(&[("0", "1")]), &opts),
            Ok(Truth::True)
        );
    }

    #[test]
    fn test_covered_only_at_the_lcm() {
        // 0, 1, 2 mod 4 and 1, 3, 5 mod 6 cover Z; neither modulus alone does
        let all = set(&[("0", "1")]);
        let mixed = set(&[
            ("0", "4"),
            ("1", "4"),
            ("2", "4"),
            ("1", "6"),
            ("3", "6"),
            ("5", "6"),
        ]);
        let opts = DiscreteSetOptions::default();
        assert_eq!(contained_in(&all, &mixed, &opts), Ok(Truth::True));
    }

    #[test]
    fn test_huge_period_ratio_is_undecided() {
        let opts = DiscreteSetOptions::default();
        let integers = set(&[("0", "1")]);
        let sparse = set(&[("0", "10000000000000")]);
        assert_eq!(contained_in(&integers, &sparse, &opts), Ok(Truth::Unknown));
        assert_eq!(eq(&integers, &sparse), Truth::Unknown);
    }

    #[test]
    fn test_fractional_periods() {
        // Halves contain the integers; the integers do not contain the halves
        let opts = DiscreteSetOptions::default();
        let halves = set(&[("0", "0.5")]);
        let integers = set(&[("0", "1")]);
        assert_eq!(contained_in(&integers, &halves, &opts), Ok(Truth::True));
        assert_eq!(contained_in(&halves, &integers, &opts), Ok(Truth::False));
    }

    #[test]
    fn test_symbolic_offset_needs_integer_assumption() {
        let facts = Arc::new(AssumptionSet::new().with_integer("m"));
        let tree = Tree::parse_literal(
            r#"["discrete_infinite_set",["tuple",["*",7,"m"],7,["-","infinity"],"infinity"]]"#,
        )
        .unwrap();
        let shifted = MathExpression::with_assumptions(tree.clone(), facts);
        let plain = shifted.from_tree(set(&[("0", "7")]).into_tree());
        assert_eq!(eq(&shifted, &plain), Truth::True);

        let unknown_m = MathExpression::new(tree);
        assert_eq!(eq(&unknown_m, &set(&[("0", "7")])), Truth::Unknown);
    }

    #[test]
    fn test_list_enumeration() {
        let from_zero = e(r#"["discrete_infinite_set",["tuple",0,7,0,"infinity"]]"#);
        let list = e(r#"["list",0,7,14,21,"ldots"]"#);
        assert_eq!(eq(&from_zero, &list), Truth::True);
        assert_eq!(eq(&list, &from_zero), Truth::True);

        let longer = e(r#"["list",-14,-7,0,7,14,21,"ldots"]"#);
        assert_eq!(eq(&from_zero, &longer), Truth::False);
        let from_minus_two = e(r#"["discrete_infinite_set",["tuple",0,7,["-",2],"infinity"]]"#);
        assert_eq!(eq(&from_minus_two, &longer), Truth::True);
    }

    #[test]
    fn test_list_edge_cases() {
        let both_ways = set(&[("0", "7")]);
        assert_eq!(eq(&both_ways, &e(r#"["list",0,7,14,"ldots"]"#)), Truth::False);

        let from_zero = e(r#"["discrete_infinite_set",["tuple",0,7,0,"infinity"]]"#);
        assert_eq!(eq(&from_zero, &e(r#"["list",0,7,"ldots"]"#)), Truth::Unknown);
        assert_eq!(eq(&from_zero, &e(r#"["list",0,7,14]"#)), Truth::False);
        assert_eq!(eq(&from_zero, &e("\"x\"")), Truth::False);
    }

    #[test]
    fn test_bounded_ranges_are_undecided() {
        let bounded = e(r#"["discrete_infinite_set",["tuple",0,7,0,"infinity"]]"#);
        assert_eq!(eq(&bounded, &bounded), Truth::Unknown);
    }

    #[test]
    fn test_malformed_set() {
        let bad = e(r#"["discrete_infinite_set",["tuple",0,7,0]]"#);
        let result = equals(&bad, &bad, &DiscreteSetOptions::default(), numeric_equals);
        assert!(matches!(result, Err(EquivError::MalformedSet(_))));
    }

    #[test]
    fn test_first_terms() {
        let s = e(r#"["discrete_infinite_set",["tuple",1,3,2,"infinity"]]"#);
        let parsed = DiscreteInfiniteSet::from_tree(s.tree()).unwrap();
        let terms: Vec<Tree> = parsed
            .first_terms(&s, 3)
            .unwrap()
            .into_iter()
            .map(MathExpression::into_tree)
            .collect();
        assert_eq!(terms, vec![Tree::num(7.0), Tree::num(10.0), Tree::num(13.0)]);
    }
}
