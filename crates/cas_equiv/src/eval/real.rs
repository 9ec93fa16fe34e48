//! Real (`f64`) evaluation with domain checking.

use cas_ast::{BuiltinFn, Operator, Tree, EULER, IMAGINARY_UNIT, INFINITY, PI};

use super::{factorial, integer_exponent, RealBindings};
use crate::error::EvalError;

/// Evaluate `tree` over the reals.
///
/// Fails with a typed [`EvalError`] on unbound variables, domain violations
/// (`ln` of a non-positive number, `sqrt` of a negative, a negative base with
/// a non-integer exponent), division by zero, non-finite results, operators
/// without a numeric meaning (containers, relations) and unknown functions.
pub fn eval_real(tree: &Tree, bindings: &RealBindings, max_depth: usize) -> Result<f64, EvalError> {
    eval_depth(tree, bindings, max_depth)
}

fn eval_depth(tree: &Tree, bindings: &RealBindings, depth: usize) -> Result<f64, EvalError> {
    if depth == 0 {
        return Err(EvalError::DepthExceeded);
    }

    let result = match tree {
        Tree::Number(n) => *n,
        Tree::Symbol(name) => eval_symbol(name, bindings)?,
        Tree::Bool(_) => return Err(EvalError::Unsupported("a boolean".into())),
        Tree::Node(node) => {
            let ops = node.operands();
            let eval = |t: &Tree| eval_depth(t, bindings, depth - 1);
            match node.op() {
                Operator::Add => ops.iter().map(eval).sum::<Result<f64, _>>()?,
                Operator::Mul => ops.iter().map(eval).product::<Result<f64, _>>()?,
                Operator::Neg => -eval(&ops[0])?,
                Operator::Div => {
                    let den = eval(&ops[1])?;
                    if den == 0.0 {
                        return Err(EvalError::DivisionByZero { op: "/" });
                    }
                    eval(&ops[0])? / den
                }
                Operator::Pow => power(eval(&ops[0])?, eval(&ops[1])?)?,
                Operator::Factorial => {
                    let n = eval(&ops[0])?;
                    factorial(n).ok_or(EvalError::Domain {
                        function: "!".into(),
                        arg: n,
                    })?
                }
                Operator::Apply => {
                    let (name, arg) = tree
                        .as_application()
                        .ok_or_else(|| EvalError::Unsupported(tree.to_string()))?;
                    let func = BuiltinFn::from_name(name)
                        .ok_or_else(|| EvalError::Unsupported(format!("function '{}'", name)))?;
                    eval_function(func, eval(arg)?)?
                }
                op => return Err(EvalError::Unsupported(format!("operator '{}'", op))),
            }
        }
    };

    if !result.is_finite() {
        return Err(EvalError::NonFinite);
    }
    Ok(result)
}

fn eval_symbol(name: &str, bindings: &RealBindings) -> Result<f64, EvalError> {
    if let Some(value) = bindings.get(name) {
        return Ok(*value);
    }
    match name {
        PI => Ok(std::f64::consts::PI),
        EULER => Ok(std::f64::consts::E),
        INFINITY => Err(EvalError::NonFinite),
        IMAGINARY_UNIT => Err(EvalError::Domain {
            function: "i".into(),
            arg: 0.0,
        }),
        _ => Err(EvalError::UnboundVariable { name: name.into() }),
    }
}

/// `base ^ exp` over the reals.
pub(crate) fn power(base: f64, exp: f64) -> Result<f64, EvalError> {
    if base == 0.0 {
        if exp > 0.0 {
            return Ok(0.0);
        }
        if exp == 0.0 {
            return Ok(1.0);
        }
        return Err(EvalError::DivisionByZero { op: "^" });
    }
    if let Some(k) = integer_exponent(exp) {
        return Ok(base.powi(k));
    }
    if base < 0.0 {
        return Err(EvalError::Domain {
            function: "^".into(),
            arg: base,
        });
    }
    Ok(base.powf(exp))
}

#[inline(never)]
fn eval_function(func: BuiltinFn, x: f64) -> Result<f64, EvalError> {
    let domain = |lo_ok: bool| {
        if lo_ok {
            Ok(())
        } else {
            Err(EvalError::Domain {
                function: func.name().into(),
                arg: x,
            })
        }
    };
    let nonzero = |d: f64| {
        if d == 0.0 {
            Err(EvalError::DivisionByZero { op: func.name() })
        } else {
            Ok(d)
        }
    };

    Ok(match func {
        BuiltinFn::Sin => x.sin(),
        BuiltinFn::Cos => x.cos(),
        BuiltinFn::Tan => x.sin() / nonzero(x.cos())?,
        BuiltinFn::Sec => 1.0 / nonzero(x.cos())?,
        BuiltinFn::Csc => 1.0 / nonzero(x.sin())?,
        BuiltinFn::Cot => x.cos() / nonzero(x.sin())?,

        BuiltinFn::Asin => {
            domain((-1.0..=1.0).contains(&x))?;
            x.asin()
        }
        BuiltinFn::Acos => {
            domain((-1.0..=1.0).contains(&x))?;
            x.acos()
        }
        BuiltinFn::Atan => x.atan(),

        BuiltinFn::Sinh => x.sinh(),
        BuiltinFn::Cosh => x.cosh(),
        BuiltinFn::Tanh => x.tanh(),

        BuiltinFn::Exp => x.exp(),
        BuiltinFn::Ln => {
            domain(x > 0.0)?;
            x.ln()
        }
        BuiltinFn::Log => {
            domain(x > 0.0)?;
            x.log10()
        }
        BuiltinFn::Sqrt => {
            domain(x >= 0.0)?;
            x.sqrt()
        }

        BuiltinFn::Abs => x.abs(),
        BuiltinFn::Sign => {
            if x == 0.0 {
                0.0
            } else {
                x.signum()
            }
        }
        BuiltinFn::Floor => x.floor(),
        BuiltinFn::Ceil => x.ceil(),

        BuiltinFn::Conj | BuiltinFn::Re => x,
        BuiltinFn::Im => 0.0,
    })
}
