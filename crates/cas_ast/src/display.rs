//! Infix display for trees.
//!
//! Used for logs and error messages. This is not a renderer: the output is
//! plain text with the minimum parentheses needed to read it back by eye.

use std::fmt;

use crate::expression::Tree;
use crate::operator::Operator;

// Binding strength, loosest first.
const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_REL: u8 = 3;
const PREC_ADD: u8 = 4;
const PREC_MUL: u8 = 5;
const PREC_NEG: u8 = 6;
const PREC_POW: u8 = 7;
const PREC_POSTFIX: u8 = 8;
const PREC_ATOM: u8 = 9;

fn precedence(tree: &Tree) -> u8 {
    match tree.op() {
        None => match tree {
            Tree::Number(n) if *n < 0.0 => PREC_NEG,
            _ => PREC_ATOM,
        },
        Some(op) => match op {
            Operator::Or => PREC_OR,
            Operator::And | Operator::Not => PREC_AND,
            Operator::Eq
            | Operator::Ne
            | Operator::Lt
            | Operator::Gt
            | Operator::Le
            | Operator::Ge
            | Operator::In => PREC_REL,
            Operator::Add => PREC_ADD,
            Operator::Mul | Operator::Div => PREC_MUL,
            Operator::Neg => PREC_NEG,
            Operator::Pow => PREC_POW,
            Operator::Factorial | Operator::Prime => PREC_POSTFIX,
            _ => PREC_ATOM,
        },
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{}", n)
    }
}

/// Write `tree`, parenthesized when it binds looser than `min_prec`.
fn write_operand(f: &mut fmt::Formatter<'_>, tree: &Tree, min_prec: u8) -> fmt::Result {
    if precedence(tree) < min_prec {
        write!(f, "({})", tree)
    } else {
        write!(f, "{}", tree)
    }
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    operands: &[Tree],
    sep: &str,
    min_prec: u8,
) -> fmt::Result {
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write_operand(f, operand, min_prec)?;
    }
    Ok(())
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = match self {
            Tree::Number(n) => return write_number(f, *n),
            Tree::Symbol(s) => return f.write_str(s),
            Tree::Bool(b) => return write!(f, "{}", b),
            Tree::Node(node) => node,
        };
        let ops = node.operands();

        match node.op() {
            Operator::Add => {
                write_operand(f, &ops[0], PREC_ADD)?;
                for term in &ops[1..] {
                    if let Some(inner) = term.is_op(Operator::Neg).then(|| &term.operands()[0]) {
                        f.write_str(" - ")?;
                        write_operand(f, inner, PREC_MUL)?;
                    } else {
                        f.write_str(" + ")?;
                        write_operand(f, term, PREC_ADD + 1)?;
                    }
                }
                Ok(())
            }
            Operator::Mul => write_joined(f, ops, "*", PREC_MUL),
            Operator::Div => {
                write_operand(f, &ops[0], PREC_MUL)?;
                f.write_str("/")?;
                write_operand(f, &ops[1], PREC_MUL + 1)
            }
            Operator::Neg => {
                f.write_str("-")?;
                write_operand(f, &ops[0], PREC_POW)
            }
            Operator::Pow => {
                write_operand(f, &ops[0], PREC_POSTFIX)?;
                f.write_str("^")?;
                write_operand(f, &ops[1], PREC_POW)
            }
            Operator::Factorial => {
                write_operand(f, &ops[0], PREC_ATOM)?;
                f.write_str("!")
            }
            Operator::Prime => {
                write_operand(f, &ops[0], PREC_ATOM)?;
                f.write_str("'")
            }
            Operator::Apply => write!(f, "{}({})", ops[0], ops[1]),
            Operator::Tuple => {
                f.write_str("(")?;
                write_joined(f, ops, ", ", PREC_OR)?;
                f.write_str(")")
            }
            Operator::List => {
                f.write_str("[")?;
                write_joined(f, ops, ", ", PREC_OR)?;
                f.write_str("]")
            }
            Operator::Set => {
                f.write_str("{")?;
                write_joined(f, ops, ", ", PREC_OR)?;
                f.write_str("}")
            }
            Operator::Eq => write_joined(f, ops, " = ", PREC_REL + 1),
            Operator::Ne => write_joined(f, ops, " != ", PREC_REL + 1),
            Operator::Lt => write_joined(f, ops, " < ", PREC_REL + 1),
            Operator::Gt => write_joined(f, ops, " > ", PREC_REL + 1),
            Operator::Le => write_joined(f, ops, " <= ", PREC_REL + 1),
            Operator::Ge => write_joined(f, ops, " >= ", PREC_REL + 1),
            Operator::In => write_joined(f, ops, " in ", PREC_REL + 1),
            Operator::And => write_joined(f, ops, " and ", PREC_AND + 1),
            Operator::Or => write_joined(f, ops, " or ", PREC_OR + 1),
            Operator::Not => {
                f.write_str("not ")?;
                write_operand(f, &ops[0], PREC_REL)
            }
            op @ (Operator::Vector
            | Operator::AltVector
            | Operator::Array
            | Operator::Matrix
            | Operator::Interval
            | Operator::DiscreteInfiniteSet) => {
                write!(f, "{}(", op.name())?;
                write_joined(f, ops, ", ", PREC_OR)?;
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Tree {
        Tree::sym(s)
    }

    #[test]
    fn test_sum_with_negative_term() {
        let t = Tree::add(vec![sym("a"), Tree::neg(sym("b")), Tree::num(2.0)]);
        assert_eq!(t.to_string(), "a - b + 2");
    }

    #[test]
    fn test_parenthesization() {
        // (a + b) * c
        let t = Tree::mul(vec![Tree::add(vec![sym("a"), sym("b")]), sym("c")]);
        assert_eq!(t.to_string(), "(a + b)*c");

        // x^(2^y)  and  (x^2)^y
        let right = Tree::pow(sym("x"), Tree::pow(Tree::num(2.0), sym("y")));
        let left = Tree::pow(Tree::pow(sym("x"), Tree::num(2.0)), sym("y"));
        assert_eq!(right.to_string(), "x^2^y");
        assert_eq!(left.to_string(), "(x^2)^y");

        // a/(b*c)
        let t = Tree::div(sym("a"), Tree::mul(vec![sym("b"), sym("c")]));
        assert_eq!(t.to_string(), "a/(b*c)");
    }

    #[test]
    fn test_functions_and_containers() {
        let t = Tree::apply("sin", Tree::add(vec![sym("x"), Tree::num(1.0)]));
        assert_eq!(t.to_string(), "sin(x + 1)");

        let list = Tree::node(
            Operator::List,
            vec![Tree::num(0.0), Tree::num(7.0), Tree::ellipsis()],
        )
        .unwrap();
        assert_eq!(list.to_string(), "[0, 7, ldots]");
    }

    #[test]
    fn test_non_integer_numbers() {
        assert_eq!(Tree::num(2.5).to_string(), "2.5");
        assert_eq!(Tree::num(-3.0).to_string(), "-3");
    }
}
