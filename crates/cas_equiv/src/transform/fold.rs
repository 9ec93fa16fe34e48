//! Constant folding: the default `simplify`.
//!
//! Bottom-up, every subtree made only of numeric literals (and built-in
//! functions of them) is evaluated and replaced by its value. `+` and `*`
//! chains are flattened, their numeric operands combined, additive zeros
//! and multiplicative ones dropped. Symbols, including `pi` and `e`, are
//! never replaced by approximations.

use cas_ast::{BuiltinFn, Operator, Tree};

use crate::eval::{eval_real, RealBindings, DEFAULT_MAX_DEPTH};

/// Fold the constant parts of `tree`.
pub fn fold_constants(tree: &Tree) -> Tree {
    let Tree::Node(node) = tree else {
        return tree.clone();
    };
    let folded = node.map_operands(fold_constants);

    if is_numeric(&folded) {
        // 1/0 and friends keep their structure
        if let Ok(value) = eval_real(&folded, &RealBindings::new(), DEFAULT_MAX_DEPTH) {
            return Tree::signed_num(value);
        }
    }
    tidy(folded)
}

fn is_numeric(tree: &Tree) -> bool {
    match tree {
        Tree::Number(_) => true,
        Tree::Node(node) => match node.op() {
            Operator::Add
            | Operator::Mul
            | Operator::Neg
            | Operator::Div
            | Operator::Pow
            | Operator::Factorial => node.operands().iter().all(is_numeric),
            Operator::Apply => tree
                .as_application()
                .is_some_and(|(name, arg)| BuiltinFn::is_builtin(name) && is_numeric(arg)),
            _ => false,
        },
        _ => false,
    }
}

fn tidy(tree: Tree) -> Tree {
    let Some(op) = tree.op() else {
        return tree;
    };
    match op {
        Operator::Add => {
            let mut constant = 0.0;
            let mut rest = Vec::new();
            for operand in flatten(tree, Operator::Add) {
                match operand.as_signed_number() {
                    Some(n) => constant += n,
                    None => rest.push(operand),
                }
            }
            if constant != 0.0 {
                rest.push(Tree::signed_num(constant));
            }
            Tree::add(rest)
        }
        Operator::Mul => {
            let mut constant = 1.0;
            let mut rest = Vec::new();
            for operand in flatten(tree, Operator::Mul) {
                match operand.as_signed_number() {
                    Some(n) => constant *= n,
                    None => rest.push(operand),
                }
            }
            if constant == 0.0 {
                return Tree::num(0.0);
            }
            if constant != 1.0 {
                rest.insert(0, Tree::signed_num(constant));
            }
            Tree::mul(rest)
        }
        Operator::Neg => {
            let inner = &tree.operands()[0];
            if inner.is_op(Operator::Neg) {
                return inner.operands()[0].clone();
            }
            if inner.as_number() == Some(0.0) {
                return Tree::num(0.0);
            }
            tree
        }
        Operator::Pow => {
            let (base, exp) = (&tree.operands()[0], &tree.operands()[1]);
            match exp.as_signed_number() {
                Some(e) if e == 1.0 => base.clone(),
                Some(e) if e == 0.0 => Tree::num(1.0),
                _ if base.as_number() == Some(1.0) => Tree::num(1.0),
                _ => tree,
            }
        }
        _ => tree,
    }
}

/// Operands of nested `op` chains, in order.
fn flatten(tree: Tree, op: Operator) -> Vec<Tree> {
    let mut out = Vec::new();
    let mut stack = vec![tree];
    while let Some(current) = stack.pop() {
        match current {
            Tree::Node(node) if node.op() == op => {
                let (_, operands) = node.into_parts();
                stack.extend(operands.into_iter().rev());
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(text: &str) -> Tree {
        Tree::parse_literal(text).unwrap()
    }

    #[test]
    fn test_numeric_subtrees_fold() {
        assert_eq!(fold_constants(&t(r#"["+",1,["*",2,3]]"#)), Tree::num(7.0));
        assert_eq!(fold_constants(&t(r#"["-",["/",6,2]]"#)), Tree::signed_num(-3.0));
    }

    #[test]
    fn test_mixed_sum_combines_constants() {
        assert_eq!(
            fold_constants(&t(r#"["+",1,"x",["+",2,"y"]]"#)),
            t(r#"["+","x","y",3]"#)
        );
        assert_eq!(fold_constants(&t(r#"["+","x",["-",2],2]"#)), Tree::sym("x"));
    }

    #[test]
    fn test_products() {
        assert_eq!(fold_constants(&t(r#"["*",2,"x",3]"#)), t(r#"["*",6,"x"]"#));
        assert_eq!(fold_constants(&t(r#"["*","x",0]"#)), Tree::num(0.0));
        assert_eq!(fold_constants(&t(r#"["*","x",["/",2,2]]"#)), Tree::sym("x"));
    }

    #[test]
    fn test_powers_and_negation() {
        assert_eq!(fold_constants(&t(r#"["^","x",1]"#)), Tree::sym("x"));
        assert_eq!(fold_constants(&t(r#"["^","x",0]"#)), Tree::num(1.0));
        assert_eq!(fold_constants(&t(r#"["-",["-","x"]]"#)), Tree::sym("x"));
    }

    #[test]
    fn test_symbols_stay_exact() {
        let tree = t(r#"["*",2,"pi"]"#);
        assert_eq!(fold_constants(&tree), tree);
    }

    #[test]
    fn test_undefined_constants_keep_structure() {
        let tree = t(r#"["/",1,0]"#);
        assert_eq!(fold_constants(&tree), tree);
    }
}
