#![allow(dead_code)]

use cas_ast::Tree;
use proptest::prelude::*;

fn leaf() -> impl Strategy<Value = Tree> {
    prop_oneof![
        (-9i64..10).prop_map(|n| Tree::num(n as f64)),
        prop::sample::select(vec!["a", "b", "c", "x", "y"]).prop_map(Tree::sym),
    ]
}

/// Polynomials: sums, products, negation and small non-negative powers.
pub fn arb_polynomial() -> impl Strategy<Value = Tree> {
    leaf().prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 2..4).prop_map(Tree::add),
            prop::collection::vec(inner.clone(), 2..3).prop_map(Tree::mul),
            inner.clone().prop_map(Tree::neg),
            (inner.clone(), 0u32..3).prop_map(|(base, k)| Tree::pow(base, Tree::num(k as f64))),
        ]
    })
}

/// Arbitrary scalar expressions, including functions and division.
pub fn arb_expr() -> impl Strategy<Value = Tree> {
    leaf().prop_recursive(3, 32, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 2..4).prop_map(Tree::add),
            prop::collection::vec(inner.clone(), 2..4).prop_map(Tree::mul),
            inner.clone().prop_map(Tree::neg),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Tree::div(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Tree::pow(l, r)),
            inner.clone().prop_map(|e| Tree::apply("sin", e)),
            inner.clone().prop_map(|e| Tree::apply("exp", e)),
        ]
    })
}
