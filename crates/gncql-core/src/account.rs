//! Accounts and the per-account transaction records attached to them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Stable handle of an account inside an [`AccountTree`](crate::AccountTree).
///
/// Handles are arena positions: they stay valid for the whole life of the
/// tree that issued them and are meaningless for any other tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the accounts hierarchy.
///
/// Relationships are stored as [`NodeId`]s; resolve them through the owning
/// [`AccountTree`](crate::AccountTree).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    /// Document-wide unique identifier (GUID in GnuCash files).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Account type tag (`ROOT`, `BANK`, `EXPENSE`, ...). Not validated.
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(skip)]
    pub(crate) node: NodeId,
    #[serde(skip)]
    pub(crate) parent: Option<NodeId>,
    #[serde(skip)]
    pub(crate) children: Vec<NodeId>,
    #[serde(skip)]
    pub(crate) transactions: Vec<Transaction>,
}

impl Account {
    pub(crate) fn new(
        node: NodeId,
        parent: Option<NodeId>,
        id: impl Into<String>,
        name: impl Into<String>,
        account_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            account_type: account_type.into(),
            node,
            parent,
            children: Vec::new(),
            transactions: Vec::new(),
        }
    }

    /// Handle of this account in its tree.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// Handle of the parent account, `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Handles of the direct children, in document order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Transactions attached to this account, in document order.
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Whether this account is the root of its tree.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Sum of the values of all transactions attached to this account.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.transactions.iter().map(|t| t.value).sum()
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.account_type, self.id)
    }
}

/// One account's view of a ledger transaction.
///
/// A ledger transaction with several splits yields one record per split,
/// each attached to the account the split targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    /// Free-form transaction number.
    pub num: String,
    /// Posting date, time of day and offset discarded.
    pub date: NaiveDate,
    /// Signed amount of the split.
    pub value: Decimal,
}

impl Transaction {
    /// Create a new transaction record.
    #[must_use]
    pub fn new(num: impl Into<String>, date: NaiveDate, value: Decimal) -> Self {
        Self {
            num: num.into(),
            date,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_balance_sums_transactions() {
        let mut account = Account::new(NodeId(1), Some(NodeId(0)), "1", "Checking", "BANK");
        account
            .transactions
            .push(Transaction::new("", date(2024, 1, 2), dec!(15.00)));
        account
            .transactions
            .push(Transaction::new("42", date(2024, 1, 3), dec!(-4.50)));

        assert_eq!(account.balance(), dec!(10.50));
        assert!(!account.is_root());
    }

    #[test]
    fn test_serialize_account_uses_type_key() {
        let account = Account::new(NodeId(0), None, "0", "Root Account", "ROOT");
        let json = serde_json::to_value(&account).unwrap();

        assert_eq!(json["type"], "ROOT");
        assert_eq!(json["name"], "Root Account");
        assert!(json.get("children").is_none());
    }

    #[test]
    fn test_serialize_transaction_date() {
        let txn = Transaction::new("7", date(2014, 7, 30), dec!(15));
        let json = serde_json::to_value(&txn).unwrap();

        assert_eq!(json["date"], "2014-07-30");
        assert_eq!(json["num"], "7");
    }
}
