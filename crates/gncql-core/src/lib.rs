//! Core types for gncql
//!
//! This crate provides the read-only model a GnuCash book is loaded into:
//!
//! - [`Account`] - A node of the accounts hierarchy
//! - [`Transaction`] - One account's share of a ledger transaction
//! - [`AccountTree`] - Arena of accounts with an ID index
//! - [`AccountFilter`] - Attribute filter for breadth-first account searches
//!
//! # Example
//!
//! ```
//! use gncql_core::{AccountFilter, AccountTree};
//!
//! let mut tree = AccountTree::new("0", "Root Account", "ROOT");
//! let root = tree.root_node();
//! tree.insert_child(root, "1", "Checking", "BANK").unwrap();
//! tree.insert_child(root, "2", "Groceries", "EXPENSE").unwrap();
//!
//! let banks = tree.descendants(root, &AccountFilter::new().with_type("BANK"));
//! assert_eq!(banks.len(), 1);
//! assert_eq!(banks[0].name, "Checking");
//!
//! let all = tree.descendants(root, &AccountFilter::new());
//! let names: Vec<_> = all.iter().map(|a| a.name.as_str()).collect();
//! assert_eq!(names, ["Root Account", "Checking", "Groceries"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod filter;
pub mod tree;

pub use account::{Account, NodeId, Transaction};
pub use filter::AccountFilter;
pub use tree::{AccountTree, LinkError};

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
