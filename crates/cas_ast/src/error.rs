//! Error types for cas_ast crate.

use thiserror::Error;

/// Errors raised while building or decoding a [`Tree`](crate::Tree).
///
/// Construction never coerces: an unknown operator name or a wrong operand
/// count is reported instead of being patched up.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AstError {
    /// Operator name is not part of the closed operator set
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    /// Node built without operands
    #[error("operator '{0}' needs at least one operand")]
    EmptyOperands(&'static str),

    /// Operand count outside the operator's arity
    #[error("operator '{op}' expects {expected} operand(s), got {got}")]
    Arity {
        op: &'static str,
        expected: &'static str,
        got: usize,
    },

    /// Operand count is fine but the operands have the wrong shape
    #[error("malformed '{op}': {reason}")]
    MalformedShape { op: &'static str, reason: String },

    /// Tree literal that is neither number, string, boolean nor array
    #[error("invalid tree literal: {0}")]
    InvalidLiteral(String),

    /// Path does not address a subtree
    #[error("path {0} does not address a subtree")]
    InvalidPath(String),
}

/// Shape check for operand layouts.
/// Returns `Err(AstError::MalformedShape)` from the enclosing function if the
/// condition fails.
#[macro_export]
macro_rules! ensure_shape {
    ($cond:expr, $op:expr, $msg:literal $(, $args:expr)* $(,)?) => {
        if !$cond {
            return Err($crate::error::AstError::MalformedShape {
                op: $op,
                reason: format!($msg $(, $args)*),
            });
        }
    };
}
