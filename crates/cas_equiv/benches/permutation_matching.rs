use cas_ast::Tree;
use cas_equiv::compare::equal;
use cas_equiv::{match_tree, CompareOptions};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

/// `x1 * 1 + x2 * 2 + ... + xn * n`, optionally with the terms reversed.
fn weighted_sum(n: usize, reversed: bool) -> Tree {
    let mut terms: Vec<Tree> = (1..=n)
        .map(|i| Tree::mul(vec![Tree::sym(&format!("x{i}")), Tree::num(i as f64)]))
        .collect();
    if reversed {
        terms.reverse();
    }
    Tree::add(terms)
}

fn benchmark_structural_equality(c: &mut Criterion) {
    let mut group = c.benchmark_group("structural_equality");
    let opts = CompareOptions::default();

    for n in [3, 5, 8] {
        let (left, right) = (weighted_sum(n, false), weighted_sum(n, true));
        group.bench_with_input(BenchmarkId::new("reversed_sum", n), &n, |b, _| {
            b.iter(|| black_box(equal(black_box(&left), black_box(&right), &opts)))
        });
    }

    group.finish();
}

fn benchmark_pattern_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_matching");

    // a*b + c*d + ... against a sum whose terms appear in another order
    let letters = ["a", "b", "c", "d", "f", "g", "h", "j"];
    for n in [2, 3, 4] {
        let pattern = Tree::add(
            letters
                .chunks(2)
                .take(n)
                .map(|pair| Tree::mul(pair.iter().map(|s| Tree::sym(s)).collect()))
                .collect(),
        );
        let tree = weighted_sum(n, true);
        group.bench_with_input(BenchmarkId::new("sum_of_products", n), &n, |b, _| {
            b.iter(|| black_box(match_tree(black_box(&tree), black_box(&pattern))))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_structural_equality,
    benchmark_pattern_matching
);
criterion_main!(benches);
