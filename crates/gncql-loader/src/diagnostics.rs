//! Non-fatal load diagnostics and load statistics.

use crate::stream::Compression;
use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The record kinds a book declares totals for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CountKind {
    /// `account` elements.
    Account,
    /// `transaction` elements.
    Transaction,
}

impl fmt::Display for CountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account => f.write_str("account"),
            Self::Transaction => f.write_str("transaction"),
        }
    }
}

/// A structural inconsistency found while loading.
///
/// Warnings never interrupt the load; they are kept on the
/// [`Database`](crate::Database) in detection order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadWarning {
    /// An account whose parent is not (yet) indexed. It is not linked.
    #[error("parent '{parent_id}' not found in index for account '{name}' ({id})")]
    OrphanAccount {
        /// The orphan's ID.
        id: String,
        /// The orphan's name.
        name: String,
        /// The missing parent ID (empty if the element had none).
        parent_id: String,
    },

    /// An account reusing an ID already in the index. It is not linked.
    #[error("duplicate account ID '{id}', account '{name}' ignored")]
    DuplicateAccount {
        /// The reused ID.
        id: String,
        /// The ignored account's name.
        name: String,
    },

    /// A split targeting an account that is not indexed. It is skipped.
    #[error("account '{account_id}' not found in index for transaction '{num}'")]
    UnknownSplitAccount {
        /// The missing account ID.
        account_id: String,
        /// Number of the transaction holding the split.
        num: String,
    },

    /// A split whose value is not a usable fraction. It is skipped.
    #[error("invalid value '{value}' in split for account '{account_id}'")]
    InvalidSplitValue {
        /// Target account of the split.
        account_id: String,
        /// The value as written.
        value: String,
    },

    /// A transaction whose posted date cannot be read. None of its splits
    /// is attached.
    #[error("invalid posted date '{date}' for transaction '{num}'")]
    InvalidDate {
        /// Transaction number.
        num: String,
        /// The date as written.
        date: String,
    },

    /// A declared total that is not a non-negative integer.
    #[error("invalid {kind} count '{value}'")]
    InvalidCount {
        /// Which total.
        kind: CountKind,
        /// The content as written.
        value: String,
    },

    /// The number of records read differs from the declared total.
    #[error("read {read} {kind}s when {declared} were expected")]
    CountMismatch {
        /// Which total.
        kind: CountKind,
        /// Records actually read.
        read: usize,
        /// Total declared by the document.
        declared: usize,
    },
}

impl Serialize for LoadWarning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Facts about a completed load.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    /// Source file, absent when loaded from a bare reader.
    pub file: Option<PathBuf>,
    /// How the source was stored.
    pub compression: Compression,
    /// Account total declared by the document.
    pub declared_accounts: usize,
    /// Transaction total declared by the document.
    pub declared_transactions: usize,
    /// When the load completed.
    pub loaded_at: DateTime<Local>,
    /// Time spent decoding.
    #[serde(serialize_with = "serialize_duration")]
    pub load_duration: Duration,
}

fn serialize_duration<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{duration:?}"))
}
