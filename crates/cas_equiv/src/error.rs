use cas_ast::AstError;
use thiserror::Error;

/// Errors surfaced by equality queries.
///
/// Evaluation failures are *not* in this enum: they are [`EvalError`]s,
/// caught per sample and never escaping an equality query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EquivError {
    #[error("invalid option '{name}': {reason}")]
    InvalidOption { name: &'static str, reason: String },
    #[error("malformed discrete infinite set: {0}")]
    MalformedSet(String),
    #[error("malformed relation: {0}")]
    MalformedRelation(String),
    #[error(transparent)]
    Ast(#[from] AstError),
}

impl EquivError {
    pub(crate) fn invalid_option(name: &'static str, reason: impl Into<String>) -> Self {
        EquivError::InvalidOption {
            name,
            reason: reason.into(),
        }
    }
}

/// Why a numeric or modular evaluation failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Division by exactly zero
    #[error("division by zero in '{op}'")]
    DivisionByZero { op: &'static str },
    /// Argument outside the function's domain (log of a non-positive real, ...)
    #[error("'{function}' is undefined at {arg}")]
    Domain { function: String, arg: f64 },
    /// Result is NaN or infinite
    #[error("non-finite result")]
    NonFinite,
    /// Depth limit exceeded
    #[error("evaluation depth limit exceeded")]
    DepthExceeded,
    /// Variable missing from the bindings
    #[error("unbound variable '{name}'")]
    UnboundVariable { name: String },
    /// Operator, function or literal the evaluator does not handle
    #[error("cannot evaluate {0}")]
    Unsupported(String),
}
