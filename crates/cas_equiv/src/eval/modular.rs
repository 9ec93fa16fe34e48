//! Evaluation in the prime field Fp.
//!
//! Only polynomial-and-division arithmetic has a modular meaning: `+ * - /`
//! and `^` with an integer literal exponent. Everything else (functions,
//! constants, non-integer literals) is [`EvalError::Unsupported`], which the
//! refuter turns into "undecided".
//!
//! `Ok(None)` is the modular NaN: a division by a zero residue. It
//! propagates through every enclosing operation.

use cas_ast::{is_reserved_symbol, Operator, Tree};

use super::ModBindings;
use crate::error::EvalError;
use crate::modp::{add_mod, div_mod, mul_mod, neg_mod, pow_mod_signed, residue};

/// Largest integer literal that converts to a residue exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0; // 2^53

/// Evaluate `tree` modulo the prime `p`.
pub fn eval_modular(
    tree: &Tree,
    bindings: &ModBindings,
    p: u64,
    max_depth: usize,
) -> Result<Option<u64>, EvalError> {
    eval_depth(tree, bindings, p, max_depth)
}

fn eval_depth(
    tree: &Tree,
    bindings: &ModBindings,
    p: u64,
    depth: usize,
) -> Result<Option<u64>, EvalError> {
    if depth == 0 {
        return Err(EvalError::DepthExceeded);
    }

    let node = match tree {
        Tree::Number(n) => return integer_literal(*n).map(|k| Some(residue(k, p))),
        Tree::Symbol(name) => {
            return match bindings.get(name) {
                Some(v) => Ok(Some(v % p)),
                None if is_reserved_symbol(name) => {
                    Err(EvalError::Unsupported(format!("constant '{}'", name)))
                }
                None => Err(EvalError::UnboundVariable { name: name.clone() }),
            };
        }
        Tree::Bool(_) => return Err(EvalError::Unsupported("a boolean".into())),
        Tree::Node(node) => node,
    };

    let ops = node.operands();
    let eval = |t: &Tree| eval_depth(t, bindings, p, depth - 1);

    match node.op() {
        Operator::Add | Operator::Mul => {
            let fold: fn(u64, u64, u64) -> u64 = if node.op() == Operator::Add {
                add_mod
            } else {
                mul_mod
            };
            let mut acc = if node.op() == Operator::Add { 0 } else { 1 };
            let mut nan = false;
            for operand in ops {
                match eval(operand)? {
                    Some(v) => acc = fold(acc, v, p),
                    None => nan = true,
                }
            }
            Ok((!nan).then_some(acc))
        }
        Operator::Neg => Ok(eval(&ops[0])?.map(|v| neg_mod(v, p))),
        Operator::Div => {
            let num = eval(&ops[0])?;
            let den = eval(&ops[1])?;
            Ok(num.zip(den).and_then(|(a, b)| div_mod(a, b, p)))
        }
        Operator::Pow => {
            let exp = ops[1]
                .as_signed_number()
                .and_then(|e| integer_literal(e).ok())
                .ok_or_else(|| EvalError::Unsupported(format!("exponent {}", ops[1])))?;
            Ok(eval(&ops[0])?.and_then(|base| pow_mod_signed(base, exp, p)))
        }
        op => Err(EvalError::Unsupported(format!("operator '{}'", op))),
    }
}

fn integer_literal(n: f64) -> Result<i64, EvalError> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER {
        Ok(n as i64)
    } else {
        Err(EvalError::Unsupported(format!("non-integer literal {}", n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: u64 = 17;

    fn eval(text: &str, vars: &[(&str, u64)]) -> Result<Option<u64>, EvalError> {
        let tree = Tree::parse_literal(text).unwrap();
        let bindings: ModBindings = vars.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        eval_modular(&tree, &bindings, P, 64)
    }

    #[test]
    fn test_polynomial() {
        // x^2 + 3x - 1 at x = 5: 25 + 15 - 1 = 39 = 5 mod 17
        assert_eq!(eval(r#"["+",["^","x",2],["*",3,"x"],["-",1]]"#, &[("x", 5)]), Ok(Some(5)));
    }

    #[test]
    fn test_division() {
        // 1/2 = 9 mod 17
        assert_eq!(eval(r#"["/",1,2]"#, &[]), Ok(Some(9)));
        // Division by a zero residue is NaN, and NaN propagates
        assert_eq!(eval(r#"["+",1,["/",1,"x"]]"#, &[("x", 17)]), Ok(None));
    }

    #[test]
    fn test_negative_exponent() {
        // x^-1 at x = 2 is 9
        assert_eq!(eval(r#"["^","x",["-",1]]"#, &[("x", 2)]), Ok(Some(9)));
    }

    #[test]
    fn test_unsupported() {
        assert!(matches!(eval(r#"["*",0.5,"x"]"#, &[("x", 1)]), Err(EvalError::Unsupported(_))));
        assert!(matches!(eval(r#"["apply","sin","x"]"#, &[("x", 1)]), Err(EvalError::Unsupported(_))));
        assert!(matches!(eval(r#"["^","x","y"]"#, &[("x", 1), ("y", 2)]), Err(EvalError::Unsupported(_))));
        assert!(matches!(eval("\"pi\"", &[]), Err(EvalError::Unsupported(_))));
    }
}
