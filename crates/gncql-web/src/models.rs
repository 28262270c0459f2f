//! JSON response bodies.

use gncql_core::{Account, AccountTree, Transaction};
use gncql_loader::{Database, Statistics};
use rust_decimal::Decimal;
use serde::Serialize;

/// An account as listed in query results.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AccountSummary {
    /// Account ID.
    pub id: String,
    /// Account name.
    pub name: String,
    /// Account type (ROOT, BANK, EXPENSE, ...).
    #[serde(rename = "type")]
    pub account_type: String,
    /// ID of the parent account, absent for the root.
    pub parent: Option<String>,
    /// Number of direct children.
    pub children: usize,
}

impl AccountSummary {
    /// Summarize `account`, resolving its parent through `tree`.
    pub fn new(tree: &AccountTree, account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            name: account.name.clone(),
            account_type: account.account_type.clone(),
            parent: tree.parent(account).map(|p| p.id.clone()),
            children: account.children().len(),
        }
    }
}

/// A single account with its direct children and transactions.
#[derive(Serialize, Debug)]
pub struct AccountDetail {
    /// Account ID.
    pub id: String,
    /// Account name.
    pub name: String,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: String,
    /// The parent account, absent for the root.
    pub parent: Option<AccountSummary>,
    /// Direct children, in document order.
    pub children: Vec<AccountSummary>,
    /// Transactions touching this account, in document order.
    pub transactions: Vec<Transaction>,
    /// Sum of the transaction values.
    pub balance: Decimal,
}

impl AccountDetail {
    /// Describe `account`, resolving its relatives through `tree`.
    pub fn new(tree: &AccountTree, account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            name: account.name.clone(),
            account_type: account.account_type.clone(),
            parent: tree.parent(account).map(|p| AccountSummary::new(tree, p)),
            children: tree
                .children(account)
                .map(|child| AccountSummary::new(tree, child))
                .collect(),
            transactions: account.transactions().to_vec(),
            balance: account.balance(),
        }
    }
}

/// Service status and load statistics.
#[derive(Serialize, Debug)]
pub struct StatusResponse {
    /// Service version.
    pub version: &'static str,
    /// How and when the book was loaded.
    pub gnucash: Statistics,
    /// Accounts linked into the tree.
    pub accounts: usize,
    /// Transaction records attached to accounts.
    pub transactions: usize,
    /// Inconsistencies found while loading.
    pub warnings: Vec<String>,
}

impl StatusResponse {
    /// Report on `database`.
    pub fn new(version: &'static str, database: &Database) -> Self {
        Self {
            version,
            gnucash: database.statistics().clone(),
            accounts: database.tree().len(),
            transactions: database.tree().transaction_count(),
            warnings: database.warnings().iter().map(ToString::to_string).collect(),
        }
    }
}

/// Body of every error response.
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
}
