//! Property-based tests for the account tree.
//!
//! Run with: cargo test -p gncql-core --test `property_tests`

use gncql_core::{Account, AccountFilter, AccountTree};
use proptest::prelude::*;

// ============================================================================
// Arbitrary generators
// ============================================================================

fn arb_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("BANK".to_string()),
        Just("EXPENSE".to_string()),
        Just("INCOME".to_string()),
        Just("ASSET".to_string()),
    ]
}

/// A tree described by, for each non-root account, the position of its
/// parent among the accounts created before it.
fn arb_tree() -> impl Strategy<Value = AccountTree> {
    prop::collection::vec((any::<prop::sample::Index>(), arb_type()), 0..40).prop_map(|specs| {
        let mut tree = AccountTree::new("root", "Root Account", "ROOT");
        let mut nodes = vec![tree.root_node()];
        for (i, (parent, account_type)) in specs.into_iter().enumerate() {
            let parent = nodes[parent.index(nodes.len())];
            let node = tree
                .insert_child(parent, format!("a{i}"), format!("Account {i}"), account_type)
                .unwrap();
            nodes.push(node);
        }
        tree
    })
}

fn depth(tree: &AccountTree, account: &Account) -> usize {
    let mut depth = 0;
    let mut current = account;
    while let Some(parent) = tree.parent(current) {
        depth += 1;
        current = parent;
    }
    depth
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn empty_filter_returns_whole_tree_root_first(tree in arb_tree()) {
        let all = tree.descendants(tree.root_node(), &AccountFilter::new());
        prop_assert_eq!(all.len(), tree.len());
        prop_assert_eq!(&all[0].id, &tree.root().id);
    }

    #[test]
    fn bfs_visits_shallower_accounts_first(tree in arb_tree()) {
        let all = tree.descendants(tree.root_node(), &AccountFilter::new());
        let depths: Vec<usize> = all.iter().map(|a| depth(&tree, a)).collect();
        prop_assert!(depths.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn id_filter_finds_exactly_one(tree in arb_tree(), pick in any::<prop::sample::Index>()) {
        let target = tree.iter().nth(pick.index(tree.len())).unwrap();
        let by_id = tree.descendants(tree.root_node(), &AccountFilter::new().with_id(target.id.clone()));
        prop_assert_eq!(by_id.len(), 1);

        let by_all = tree.descendants(
            tree.root_node(),
            &AccountFilter::new()
                .with_id(target.id.clone())
                .with_name(target.name.clone())
                .with_type(target.account_type.clone()),
        );
        prop_assert_eq!(by_all.len(), 1);
        prop_assert_eq!(&by_all[0].id, &target.id);
    }

    #[test]
    fn subtree_search_stays_inside_subtree(tree in arb_tree(), pick in any::<prop::sample::Index>()) {
        let all: Vec<&Account> = tree.iter().collect();
        let start = all[pick.index(all.len())];
        for account in tree.descendants(start.node(), &AccountFilter::new()) {
            let mut current = Some(account);
            let mut reached = false;
            while let Some(a) = current {
                if a.node() == start.node() {
                    reached = true;
                    break;
                }
                current = tree.parent(a);
            }
            prop_assert!(reached);
        }
    }
}
