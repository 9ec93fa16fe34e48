//! Complex evaluation.
//!
//! `i` is the imaginary unit and multivalued functions use their principal
//! branch (as `num_complex` defines it). `infinity` has no complex value.

use cas_ast::{BuiltinFn, Operator, Tree, EULER, IMAGINARY_UNIT, INFINITY, PI};
use num_complex::Complex64;
use num_traits::{One, Zero};

use super::{factorial, integer_exponent, ComplexBindings};
use crate::error::EvalError;

/// Evaluate `tree` over the complex numbers.
pub fn eval_complex(
    tree: &Tree,
    bindings: &ComplexBindings,
    max_depth: usize,
) -> Result<Complex64, EvalError> {
    eval_depth(tree, bindings, max_depth)
}

fn eval_depth(
    tree: &Tree,
    bindings: &ComplexBindings,
    depth: usize,
) -> Result<Complex64, EvalError> {
    if depth == 0 {
        return Err(EvalError::DepthExceeded);
    }

    let result = match tree {
        Tree::Number(n) => Complex64::new(*n, 0.0),
        Tree::Symbol(name) => eval_symbol(name, bindings)?,
        Tree::Bool(_) => return Err(EvalError::Unsupported("a boolean".into())),
        Tree::Node(node) => {
            let ops = node.operands();
            let eval = |t: &Tree| eval_depth(t, bindings, depth - 1);
            match node.op() {
                Operator::Add => ops.iter().map(eval).sum::<Result<Complex64, _>>()?,
                Operator::Mul => ops.iter().map(eval).product::<Result<Complex64, _>>()?,
                Operator::Neg => -eval(&ops[0])?,
                Operator::Div => {
                    let den = eval(&ops[1])?;
                    if den.is_zero() {
                        return Err(EvalError::DivisionByZero { op: "/" });
                    }
                    eval(&ops[0])? / den
                }
                Operator::Pow => power(eval(&ops[0])?, eval(&ops[1])?)?,
                Operator::Factorial => {
                    let n = eval(&ops[0])?;
                    let value = (n.im == 0.0).then(|| factorial(n.re)).flatten();
                    Complex64::new(
                        value.ok_or(EvalError::Domain {
                            function: "!".into(),
                            arg: n.re,
                        })?,
                        0.0,
                    )
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

fn eval_symbol(name: &str, bindings: &ComplexBindings) -> Result<Complex64, EvalError> {
    if let Some(value) = bindings.get(name) {
        return Ok(*value);
    }
    match name {
        PI => Ok(Complex64::new(std::f64::consts::PI, 0.0)),
        EULER => Ok(Complex64::new(std::f64::consts::E, 0.0)),
        IMAGINARY_UNIT => Ok(Complex64::i()),
        INFINITY => Err(EvalError::NonFinite),
        _ => Err(EvalError::UnboundVariable { name: name.into() }),
    }
}

fn power(base: Complex64, exp: Complex64) -> Result<Complex64, EvalError> {
    if base.is_zero() {
        if exp.im == 0.0 && exp.re > 0.0 {
            return Ok(Complex64::zero());
        }
        if exp.is_zero() {
            return Ok(Complex64::one());
        }
        return Err(EvalError::DivisionByZero { op: "^" });
    }
    if exp.im == 0.0 {
        if let Some(k) = integer_exponent(exp.re) {
            return Ok(base.powi(k));
        }
    }
    Ok(base.powc(exp))
}

#[inline(never)]
fn eval_function(func: BuiltinFn, z: Complex64) -> Result<Complex64, EvalError> {
    let nonzero = |d: Complex64| {
        if d.is_zero() {
            Err(EvalError::DivisionByZero { op: func.name() })
        } else {
            Ok(d)
        }
    };
    let real_only = |z: Complex64| {
        if z.im == 0.0 {
            Ok(z.re)
        } else {
            Err(EvalError::Domain {
                function: func.name().into(),
                arg: z.im,
            })
        }
    };

    Ok(match func {
        BuiltinFn::Sin => z.sin(),
        BuiltinFn::Cos => z.cos(),
        BuiltinFn::Tan => z.sin() / nonzero(z.cos())?,
        BuiltinFn::Sec => nonzero(z.cos())?.inv(),
        BuiltinFn::Csc => nonzero(z.sin())?.inv(),
        BuiltinFn::Cot => z.cos() / nonzero(z.sin())?,

        BuiltinFn::Asin => z.asin(),
        BuiltinFn::Acos => z.acos(),
        BuiltinFn::Atan => z.atan(),

        BuiltinFn::Sinh => z.sinh(),
        BuiltinFn::Cosh => z.cosh(),
        BuiltinFn::Tanh => z.tanh(),

        BuiltinFn::Exp => z.exp(),
        BuiltinFn::Ln => nonzero_log(func, z)?.ln(),
        BuiltinFn::Log => {
            nonzero_log(func, z)?.ln() / std::f64::consts::LN_10
        }
        BuiltinFn::Sqrt => z.sqrt(),

        BuiltinFn::Abs => Complex64::new(z.norm(), 0.0),
        BuiltinFn::Sign => {
            if z.is_zero() {
                Complex64::zero()
            } else {
                z / z.norm()
            }
        }
        BuiltinFn::Floor => Complex64::new(real_only(z)?.floor(), 0.0),
        BuiltinFn::Ceil => Complex64::new(real_only(z)?.ceil(), 0.0),

        BuiltinFn::Conj => z.conj(),
        BuiltinFn::Re => Complex64::new(z.re, 0.0),
        BuiltinFn::Im => Complex64::new(z.im, 0.0),
    })
}

fn nonzero_log(func: BuiltinFn, z: Complex64) -> Result<Complex64, EvalError> {
    if z.is_zero() {
        return Err(EvalError::Domain {
            function: func.name().into(),
            arg: 0.0,
        });
    }
    Ok(z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(text: &str, vars: &[(&str, Complex64)]) -> Result<Complex64, EvalError> {
        let tree = Tree::parse_literal(text).unwrap();
        let bindings: ComplexBindings = vars.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        eval_complex(&tree, &bindings, 64)
    }

    #[test]
    fn test_imaginary_unit() {
        // i^2 = -1
        assert_eq!(eval(r#"["^","i",2]"#, &[]), Ok(Complex64::new(-1.0, 0.0)));
    }

    #[test]
    fn test_ln_of_negative_is_defined() {
        let v = eval(r#"["apply","ln",["-",1]]"#, &[]).unwrap();
        assert!(v.re.abs() < 1e-15);
        // Branch sign follows the sign of the zero imaginary part
        assert!((v.im.abs() - std::f64::consts::PI).abs() < 1e-15);
    }

    #[test]
    fn test_sqrt_of_negative() {
        let v = eval(r#"["apply","sqrt",["-",4]]"#, &[]).unwrap();
        assert!(v.re.abs() < 1e-15);
        assert!((v.im.abs() - 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_infinity_is_an_error() {
        assert_eq!(eval(r#"["+","infinity",1]"#, &[]), Err(EvalError::NonFinite));
    }

    #[test]
    fn test_bound_variables() {
        let z = Complex64::new(1.0, 2.0);
        let v = eval(r#"["*","z",["apply","conj","z"]]"#, &[("z", z)]).unwrap();
        assert!((v - Complex64::new(5.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_floor_needs_real_argument() {
        assert!(matches!(
            eval(r#"["apply","floor","i"]"#, &[]),
            Err(EvalError::Domain { .. })
        ));
    }
}
