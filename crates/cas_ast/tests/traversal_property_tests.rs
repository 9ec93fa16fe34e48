use cas_ast::{count_all_nodes, count_nodes_and_max_depth, post_order, replace_at, subtree_at, Tree};
use proptest::prelude::*;

fn arb_tree() -> impl Strategy<Value = Tree> {
    let leaf = prop_oneof![
        (-20i64..20).prop_map(|n| Tree::num(n as f64)),
        "[a-d]".prop_map(|s| Tree::sym(&s)),
        any::<bool>().prop_map(Tree::Bool),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 2..5).prop_map(Tree::add),
            prop::collection::vec(inner.clone(), 2..4).prop_map(Tree::mul),
            inner.clone().prop_map(Tree::neg),
            (inner.clone(), inner.clone()).prop_map(|(b, e)| Tree::pow(b, e)),
            inner.clone().prop_map(|arg| Tree::apply("cos", arg)),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn post_order_visits_every_node_once(tree in arb_tree()) {
        prop_assert_eq!(post_order(&tree).count(), count_all_nodes(&tree));
        let (count, depth) = count_nodes_and_max_depth(&tree);
        prop_assert_eq!(count, count_all_nodes(&tree));
        let deepest = post_order(&tree).map(|(path, _)| path.len()).max();
        prop_assert_eq!(deepest, Some(depth));
    }

    #[test]
    fn replacing_a_subtree_with_itself_is_identity(tree in arb_tree()) {
        for (path, sub) in post_order(&tree) {
            prop_assert_eq!(subtree_at(&tree, &path), Some(sub));
            prop_assert_eq!(replace_at(&tree, &path, sub.clone()).unwrap(), tree.clone());
        }
    }

    #[test]
    fn literals_survive_the_json_codec(tree in arb_tree()) {
        let json = tree.to_json().unwrap();
        prop_assert_eq!(Tree::from_json(&json).unwrap(), tree);
    }
}
