//! Read-only assumption queries.
//!
//! The equality core never stores or derives assumptions; it only asks a
//! collaborator what is known about a variable. Facts are ordinary trees,
//! e.g. `["in", "n", "Z"]` for "n is an integer".
//!
//! # Recognized integer facts
//!
//! | fact                     | `is_integer` |
//! |--------------------------|--------------|
//! | `["in", v, "Z"]`         | `True`       |
//! | `["in", v, "N"]`         | `True`       |
//! | `["not", ["in", v, "Z"]]`| `False`      |
//! | anything else            | `Unknown`    |

use std::collections::BTreeMap;

use cas_ast::{collect_variables, Operator, Tree};

use crate::truth::Truth;

/// Set names whose members are all integers.
const INTEGER_SETS: &[&str] = &["Z", "N", "integers", "naturals"];

/// Read-only view of what is known about variables.
pub trait AssumptionQuery {
    /// Facts mentioning `variable`.
    fn get_assumptions(&self, variable: &str) -> Vec<Tree>;

    /// Whether `variable` is known to be an integer.
    fn is_integer(&self, variable: &str) -> Truth {
        let mut verdict = Truth::Unknown;
        for fact in self.get_assumptions(variable) {
            match integer_fact(&fact, variable) {
                Truth::False => return Truth::False,
                Truth::True => verdict = Truth::True,
                Truth::Unknown => {}
            }
        }
        verdict
    }
}

/// What a single fact says about `variable` being an integer.
fn integer_fact(fact: &Tree, variable: &str) -> Truth {
    if fact.is_op(Operator::Not) {
        return match integer_fact(&fact.operands()[0], variable) {
            Truth::True => Truth::False,
            _ => Truth::Unknown,
        };
    }
    if fact.is_op(Operator::In) {
        let ops = fact.operands();
        if ops[0].as_symbol() == Some(variable) {
            if let Some(set) = ops[1].as_symbol() {
                if INTEGER_SETS.contains(&set) {
                    return Truth::True;
                }
            }
        }
    }
    Truth::Unknown
}

/// No facts at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssumptions;

impl AssumptionQuery for NoAssumptions {
    fn get_assumptions(&self, _variable: &str) -> Vec<Tree> {
        Vec::new()
    }
}

/// In-memory fact store keyed by variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssumptionSet {
    facts: BTreeMap<String, Vec<Tree>>,
}

impl AssumptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fact.
    ///
    /// Membership facts `["in", v, S]` are filed under `v` only (the set name
    /// is not a variable); other facts under every free variable they mention.
    pub fn assume(&mut self, fact: Tree) {
        let keys: Vec<String> = match membership_subject(&fact) {
            Some(subject) => vec![subject.to_string()],
            None => collect_variables(&fact).into_iter().collect(),
        };
        for key in keys {
            self.facts.entry(key).or_default().push(fact.clone());
        }
    }

    /// Record `["in", variable, "Z"]`.
    pub fn assume_integer(&mut self, variable: &str) {
        self.assume(Tree::member(Tree::sym(variable), Tree::sym("Z")));
    }

    /// Builder form of [`assume_integer`](Self::assume_integer).
    pub fn with_integer(mut self, variable: &str) -> Self {
        self.assume_integer(variable);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl AssumptionQuery for AssumptionSet {
    fn get_assumptions(&self, variable: &str) -> Vec<Tree> {
        self.facts.get(variable).cloned().unwrap_or_default()
    }
}

fn membership_subject(fact: &Tree) -> Option<&str> {
    let inner = if fact.is_op(Operator::Not) {
        &fact.operands()[0]
    } else {
        fact
    };
    if inner.is_op(Operator::In) {
        inner.operands()[0].as_symbol()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_membership() {
        let set = AssumptionSet::new().with_integer("n");
        assert_eq!(set.is_integer("n"), Truth::True);
        assert_eq!(set.is_integer("x"), Truth::Unknown);
        // The set name is not filed as a variable
        assert!(set.get_assumptions("Z").is_empty());
    }

    #[test]
    fn test_negated_membership() {
        let mut set = AssumptionSet::new();
        set.assume(Tree::parse_literal(r#"["not", ["in", "x", "Z"]]"#).unwrap());
        assert_eq!(set.is_integer("x"), Truth::False);
    }

    #[test]
    fn test_other_facts_filed_under_all_variables() {
        let mut set = AssumptionSet::new();
        set.assume(Tree::parse_literal(r#"["<", "x", "y"]"#).unwrap());
        assert_eq!(set.get_assumptions("x").len(), 1);
        assert_eq!(set.get_assumptions("y").len(), 1);
        assert_eq!(set.is_integer("x"), Truth::Unknown);
    }

    #[test]
    fn test_no_assumptions() {
        assert_eq!(NoAssumptions.is_integer("n"), Truth::Unknown);
    }
}
