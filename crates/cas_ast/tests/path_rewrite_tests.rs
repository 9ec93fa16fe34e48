//! Path addressing and copy-on-write replacement over post-order walks.

use cas_ast::{post_order, replace_at, subtree_at, Tree};

#[test]
fn every_post_order_path_addresses_its_subtree() {
    let tree = Tree::parse_literal(r#"["*",["+","a",["apply","sin","b"]],["^","c",2]]"#).unwrap();
    for (path, sub) in post_order(&tree) {
        assert_eq!(subtree_at(&tree, &path), Some(sub));
    }
}

#[test]
fn replacing_one_occurrence_leaves_the_other() {
    // x + x: rewrite only the second occurrence
    let tree = Tree::parse_literal(r#"["+","x","x"]"#).unwrap();
    let rewritten = replace_at(&tree, &[1], Tree::sym("y")).unwrap();
    assert_eq!(rewritten, Tree::parse_literal(r#"["+","x","y"]"#).unwrap());
}

#[test]
fn replacing_the_root_returns_the_replacement() {
    let tree = Tree::sym("x");
    assert_eq!(replace_at(&tree, &[], Tree::num(4.0)).unwrap(), Tree::num(4.0));
}
