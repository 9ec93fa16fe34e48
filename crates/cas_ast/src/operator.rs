//! The closed operator set of tree nodes.
//!
//! Every internal node carries an [`Operator`] instead of a free-form string,
//! so an unknown operator is a typed error at construction time rather than a
//! silent fallthrough in some later dispatch table.
//!
//! # Adding an operator
//!
//! 1. Add the variant to [`Operator`]
//! 2. Add its name to [`Operator::name`] and its arity to [`Operator::arity`]
//! 3. Append it to [`ALL_OPERATORS`] (`Operator::COUNT` must follow)

use std::fmt;

/// Operand count accepted by an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly `n` operands
    Exactly(usize),
    /// `n` or more operands
    AtLeast(usize),
}

impl Arity {
    /// Whether `count` operands are acceptable.
    #[inline]
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }

    /// Human-readable description used in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            Arity::Exactly(1) => "exactly 1",
            Arity::Exactly(2) => "exactly 2",
            Arity::Exactly(_) => "a fixed number of",
            Arity::AtLeast(1) => "at least 1",
            Arity::AtLeast(2) => "at least 2",
            Arity::AtLeast(_) => "several",
        }
    }
}

/// Operators of internal tree nodes.
///
/// # Ordering
///
/// - Arithmetic: `+ * - / ^ ! apply prime`
/// - Containers: `tuple vector altvector list array set matrix interval`
/// - Relations: `= ne < > le ge in`
/// - Logic: `and or not`
/// - Reserved: `discrete_infinite_set`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Operator {
    // Arithmetic
    Add = 0,
    Mul,
    Neg,
    Div,
    Pow,
    Factorial,
    Apply,
    Prime,

    // Containers
    Tuple,
    Vector,
    AltVector,
    List,
    Array,
    Set,
    Matrix,
    Interval,

    // Relations
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    In,

    // Logic
    And,
    Or,
    Not,

    // Reserved
    DiscreteInfiniteSet,
}

impl Operator {
    /// Total number of operators.
    pub const COUNT: usize = 27;

    /// The literal name used in tree literals (`["+", ...]`).
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Mul => "*",
            Operator::Neg => "-",
            Operator::Div => "/",
            Operator::Pow => "^",
            Operator::Factorial => "!",
            Operator::Apply => "apply",
            Operator::Prime => "prime",

            Operator::Tuple => "tuple",
            Operator::Vector => "vector",
            Operator::AltVector => "altvector",
            Operator::List => "list",
            Operator::Array => "array",
            Operator::Set => "set",
            Operator::Matrix => "matrix",
            Operator::Interval => "interval",

            Operator::Eq => "=",
            Operator::Ne => "ne",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Le => "le",
            Operator::Ge => "ge",
            Operator::In => "in",

            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",

            Operator::DiscreteInfiniteSet => "discrete_infinite_set",
        }
    }

    /// Look an operator up by its literal name.
    pub fn from_name(name: &str) -> Option<Operator> {
        ALL_OPERATORS.iter().copied().find(|op| op.name() == name)
    }

    /// Accepted operand counts.
    pub const fn arity(self) -> Arity {
        match self {
            Operator::Add | Operator::Mul | Operator::And | Operator::Or | Operator::Eq => {
                Arity::AtLeast(2)
            }
            Operator::Neg | Operator::Factorial | Operator::Prime | Operator::Not => {
                Arity::Exactly(1)
            }
            Operator::Div
            | Operator::Pow
            | Operator::Apply
            | Operator::Matrix
            | Operator::Interval
            | Operator::Ne
            | Operator::Lt
            | Operator::Gt
            | Operator::Le
            | Operator::Ge
            | Operator::In => Arity::Exactly(2),
            Operator::Tuple
            | Operator::Vector
            | Operator::AltVector
            | Operator::List
            | Operator::Array
            | Operator::Set
            | Operator::DiscreteInfiniteSet => Arity::AtLeast(1),
        }
    }

    /// Operand order is irrelevant (`+`, `*`).
    #[inline]
    pub const fn is_commutative(self) -> bool {
        matches!(self, Operator::Add | Operator::Mul)
    }

    /// Nested chains may be flattened into one n-ary node.
    #[inline]
    pub const fn is_associative(self) -> bool {
        matches!(
            self,
            Operator::Add | Operator::Mul | Operator::And | Operator::Or
        )
    }

    /// Containers compared component by component.
    #[inline]
    pub const fn is_container(self) -> bool {
        matches!(
            self,
            Operator::Tuple
                | Operator::Vector
                | Operator::AltVector
                | Operator::List
                | Operator::Array
                | Operator::Matrix
                | Operator::Interval
        )
    }

    /// Binary relations between two scalar sides.
    #[inline]
    pub const fn is_relation(self) -> bool {
        matches!(
            self,
            Operator::Eq
                | Operator::Ne
                | Operator::Lt
                | Operator::Gt
                | Operator::Le
                | Operator::Ge
        )
    }

    /// Iterate over all operators.
    #[inline]
    pub fn all() -> impl Iterator<Item = Operator> {
        ALL_OPERATORS.iter().copied()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static array of all operator variants.
pub const ALL_OPERATORS: [Operator; Operator::COUNT] = [
    Operator::Add,
    Operator::Mul,
    Operator::Neg,
    Operator::Div,
    Operator::Pow,
    Operator::Factorial,
    Operator::Apply,
    Operator::Prime,
    Operator::Tuple,
    Operator::Vector,
    Operator::AltVector,
    Operator::List,
    Operator::Array,
    Operator::Set,
    Operator::Matrix,
    Operator::Interval,
    Operator::Eq,
    Operator::Ne,
    Operator::Lt,
    Operator::Gt,
    Operator::Le,
    Operator::Ge,
    Operator::In,
    Operator::And,
    Operator::Or,
    Operator::Not,
    Operator::DiscreteInfiniteSet,
];
