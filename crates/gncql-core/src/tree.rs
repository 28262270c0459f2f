//! Arena-backed account hierarchy with an ID index.

use crate::{Account, AccountFilter, NodeId, Transaction};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

/// Error returned when a tree edit refers to something that cannot be linked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The handle does not belong to this tree.
    #[error("no account at {0} in this tree")]
    UnknownNode(NodeId),
    /// An account with the same ID is already indexed.
    #[error("account ID '{0}' is already in the index")]
    DuplicateId(String),
}

/// The accounts hierarchy.
///
/// Every account lives in one arena owned by the tree; the root is always at
/// [`AccountTree::root_node`]. The ID index maps account IDs to arena handles.
/// Accounts are only ever appended, so handles are never invalidated.
#[derive(Debug, Clone)]
pub struct AccountTree {
    nodes: Vec<Account>,
    index: HashMap<String, NodeId>,
}

impl AccountTree {
    /// Create a tree holding only its root account.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        account_type: impl Into<String>,
    ) -> Self {
        Self::with_capacity(id, name, account_type, 0)
    }

    /// Create a tree holding only its root, with room for `capacity` accounts.
    #[must_use]
    pub fn with_capacity(
        id: impl Into<String>,
        name: impl Into<String>,
        account_type: impl Into<String>,
        capacity: usize,
    ) -> Self {
        let root = Account::new(NodeId(0), None, id, name, account_type);
        let mut index = HashMap::with_capacity(capacity);
        index.insert(root.id.clone(), root.node);

        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(root);

        Self { nodes, index }
    }

    /// Reserve room for at least `additional` more accounts.
    pub fn reserve(&mut self, additional: usize) {
        self.nodes.reserve(additional);
        self.index.reserve(additional);
    }

    /// Handle of the root account.
    #[must_use]
    pub const fn root_node(&self) -> NodeId {
        NodeId(0)
    }

    /// The root account.
    #[must_use]
    pub fn root(&self) -> &Account {
        &self.nodes[0]
    }

    /// Number of accounts in the tree, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree holds at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve a handle.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&Account> {
        self.nodes.get(node.0)
    }

    /// Look up the handle of the account with this ID.
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    /// Look up an account by ID.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Account> {
        self.lookup(id).and_then(|node| self.get(node))
    }

    /// The parent of `account`, `None` for the root.
    #[must_use]
    pub fn parent(&self, account: &Account) -> Option<&Account> {
        account.parent.and_then(|node| self.get(node))
    }

    /// The direct children of `account`, in document order.
    pub fn children<'a>(&'a self, account: &'a Account) -> impl Iterator<Item = &'a Account> + 'a {
        account.children.iter().filter_map(|&node| self.get(node))
    }

    /// Iterate over every account in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.nodes.iter()
    }

    /// Link a new account under `parent` and index it.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::UnknownNode`] if `parent` is not a handle of
    /// this tree and [`LinkError::DuplicateId`] if `id` is already indexed.
    /// The tree is left unchanged on error.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        id: impl Into<String>,
        name: impl Into<String>,
        account_type: impl Into<String>,
    ) -> Result<NodeId, LinkError> {
        if parent.0 >= self.nodes.len() {
            return Err(LinkError::UnknownNode(parent));
        }
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(LinkError::DuplicateId(id));
        }

        let node = NodeId(self.nodes.len());
        self.index.insert(id.clone(), node);
        self.nodes
            .push(Account::new(node, Some(parent), id, name, account_type));
        self.nodes[parent.0].children.push(node);
        Ok(node)
    }

    /// Append a transaction record to an account.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::UnknownNode`] if `node` is not a handle of this
    /// tree.
    pub fn push_transaction(&mut self, node: NodeId, txn: Transaction) -> Result<(), LinkError> {
        let account = self
            .nodes
            .get_mut(node.0)
            .ok_or(LinkError::UnknownNode(node))?;
        account.transactions.push(txn);
        Ok(())
    }

    /// Total number of transaction records across all accounts.
    #[must_use]
    pub fn transaction_count(&self) -> usize {
        self.nodes.iter().map(|a| a.transactions.len()).sum()
    }

    /// Traverse the subtree rooted at `start` breadth-first and return, in
    /// visitation order, every account for which `visit` returns true.
    ///
    /// Returns an empty list if `start` is not a handle of this tree.
    pub fn walk_bfs<F>(&self, start: NodeId, mut visit: F) -> Vec<&Account>
    where
        F: FnMut(&Account) -> bool,
    {
        let mut found = Vec::new();
        let mut queue = VecDeque::new();
        if let Some(account) = self.get(start) {
            queue.push_back(account);
        }

        while let Some(account) = queue.pop_front() {
            if visit(account) {
                found.push(account);
            }
            queue.extend(self.children(account));
        }

        found
    }

    /// Accounts of the subtree rooted at `start` (itself included) matching
    /// `filter`, in breadth-first order.
    #[must_use]
    pub fn descendants(&self, start: NodeId, filter: &AccountFilter) -> Vec<&Account> {
        self.walk_bfs(start, |account| filter.matches(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    // Root(0) -> [Assets(1) -> [Checking(3), Savings(4)], Expenses(2) -> [Food(5)]]
    fn sample_tree() -> AccountTree {
        let mut tree = AccountTree::new("0", "Root Account", "ROOT");
        let root = tree.root_node();
        let assets = tree.insert_child(root, "1", "Assets", "ASSET").unwrap();
        let expenses = tree.insert_child(root, "2", "Expenses", "EXPENSE").unwrap();
        tree.insert_child(assets, "3", "Checking", "BANK").unwrap();
        tree.insert_child(assets, "4", "Savings", "BANK").unwrap();
        tree.insert_child(expenses, "5", "Food", "EXPENSE").unwrap();
        tree
    }

    fn ids(accounts: &[&Account]) -> Vec<String> {
        accounts.iter().map(|a| a.id.clone()).collect()
    }

    #[test]
    fn test_empty_filter_is_bfs_order() {
        let tree = sample_tree();
        let all = tree.descendants(tree.root_node(), &AccountFilter::new());
        assert_eq!(ids(&all), vec!["0", "1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_descendants_from_inner_node() {
        let tree = sample_tree();
        let assets = tree.lookup("1").unwrap();
        let sub = tree.descendants(assets, &AccountFilter::new());
        assert_eq!(ids(&sub), vec!["1", "3", "4"]);
    }

    #[test]
    fn test_filter_by_type() {
        let tree = sample_tree();
        let banks = tree.descendants(tree.root_node(), &AccountFilter::new().with_type("BANK"));
        assert_eq!(ids(&banks), vec!["3", "4"]);
    }

    #[test]
    fn test_filter_unknown_id_is_empty() {
        let tree = sample_tree();
        let none = tree.descendants(tree.root_node(), &AccountFilter::new().with_id("DuMmY"));
        assert!(none.is_empty());
    }

    #[test]
    fn test_find_and_lookup() {
        let tree = sample_tree();
        assert_eq!(tree.find("4").map(|a| a.name.as_str()), Some("Savings"));
        assert!(tree.find("DuMmY").is_none());
        assert_eq!(tree.len(), 6);

        let savings = tree.find("4").unwrap();
        assert_eq!(tree.parent(savings).map(|a| a.id.as_str()), Some("1"));
        assert!(tree.parent(tree.root()).is_none());
    }

    #[test]
    fn test_insert_child_rejects_duplicates() {
        let mut tree = sample_tree();
        let err = tree
            .insert_child(tree.root_node(), "3", "Other", "BANK")
            .unwrap_err();
        assert_eq!(err, LinkError::DuplicateId("3".to_string()));
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn test_insert_child_rejects_foreign_handle() {
        let mut tree = sample_tree();
        let err = tree.insert_child(NodeId(99), "9", "Lost", "BANK").unwrap_err();
        assert_eq!(err, LinkError::UnknownNode(NodeId(99)));
    }

    #[test]
    fn test_push_transaction() {
        let mut tree = sample_tree();
        let checking = tree.lookup("3").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        tree.push_transaction(checking, Transaction::new("1", date, dec!(15)))
            .unwrap();

        assert_eq!(tree.find("3").unwrap().transactions().len(), 1);
        assert_eq!(tree.transaction_count(), 1);
    }
}
