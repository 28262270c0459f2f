//! Single-pass construction of the account tree from decoded records.

use crate::decode::{AccountRecord, CountRecord, SplitRecord, TransactionRecord};
use crate::diagnostics::{CountKind, LoadWarning, Statistics};
use crate::stream::Compression;
use crate::{Database, LoadError};
use chrono::{Local, NaiveDate};
use gncql_core::{AccountTree, LinkError, Transaction};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;

/// Type and name the first account of a book must carry.
pub const ROOT_TYPE: &str = "ROOT";
/// See [`ROOT_TYPE`].
pub const ROOT_NAME: &str = "Root Account";

/// Accumulates decoded records into a [`Database`].
///
/// The builder is the only writer during a load; the database it produces
/// is never modified afterwards.
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    tree: Option<AccountTree>,
    capacity_hint: Option<usize>,
    declared_accounts: usize,
    declared_transactions: usize,
    accounts_read: usize,
    transactions_read: usize,
    warnings: Vec<LoadWarning>,
}

impl DatabaseBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings recorded so far.
    #[must_use]
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    fn warn(&mut self, warning: LoadWarning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Record a declared total.
    ///
    /// The first account total also sizes the ID index.
    pub fn record_count(&mut self, count: CountRecord) {
        let kind = match count.kind.as_str() {
            "account" => CountKind::Account,
            "transaction" => CountKind::Transaction,
            _ => return,
        };
        let Ok(value) = count.value.parse::<usize>() else {
            self.warn(LoadWarning::InvalidCount {
                kind,
                value: count.value,
            });
            return;
        };
        tracing::debug!(%kind, value, "declared count");

        match kind {
            CountKind::Account => {
                if self.capacity_hint.is_none() {
                    self.capacity_hint = Some(value);
                    if let Some(tree) = &mut self.tree {
                        tree.reserve(value.saturating_sub(tree.len()));
                    }
                }
                self.declared_accounts = value;
            }
            CountKind::Transaction => self.declared_transactions = value,
        }
    }

    /// Link an account into the tree.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MissingRoot`] if this is the first account and it
    /// is not the book's root account.
    pub fn add_account(&mut self, record: AccountRecord) -> Result<(), LoadError> {
        self.accounts_read += 1;

        let Some(tree) = &mut self.tree else {
            if record.account_type != ROOT_TYPE || record.name != ROOT_NAME {
                return Err(LoadError::MissingRoot {
                    first: Some(record.name),
                });
            }
            tracing::debug!(id = %record.id, "root account");
            self.tree = Some(AccountTree::with_capacity(
                record.id,
                record.name,
                record.account_type,
                self.capacity_hint.unwrap_or_default(),
            ));
            return Ok(());
        };

        let parent_id = record.parent_id.unwrap_or_default();
        let Some(parent) = tree.lookup(&parent_id) else {
            self.warn(LoadWarning::OrphanAccount {
                id: record.id,
                name: record.name,
                parent_id,
            });
            return Ok(());
        };

        let inserted = tree.insert_child(parent, record.id, record.name.clone(), record.account_type);
        if let Err(LinkError::DuplicateId(id)) = inserted {
            self.warn(LoadWarning::DuplicateAccount {
                id,
                name: record.name,
            });
        }
        Ok(())
    }

    /// Attach one record per resolvable split to the split's account.
    pub fn add_transaction(&mut self, record: TransactionRecord) {
        self.transactions_read += 1;

        let Some(date) = parse_posted_date(&record.date_posted) else {
            self.warn(LoadWarning::InvalidDate {
                num: record.num,
                date: record.date_posted,
            });
            return;
        };

        let mut warnings = Vec::new();
        let mut tree = self.tree.as_mut();
        for SplitRecord { value, account_id } in record.splits {
            let node = tree.as_deref().and_then(|tree| tree.lookup(&account_id));
            let (Some(tree), Some(node)) = (tree.as_deref_mut(), node) else {
                warnings.push(LoadWarning::UnknownSplitAccount {
                    account_id,
                    num: record.num.clone(),
                });
                continue;
            };
            let Some(amount) = parse_fraction(&value) else {
                warnings.push(LoadWarning::InvalidSplitValue { account_id, value });
                continue;
            };

            let txn = Transaction::new(record.num.clone(), date, amount);
            let attached = tree.push_transaction(node, txn);
            debug_assert!(attached.is_ok(), "{account_id} was looked up in this tree");
        }

        for warning in warnings {
            self.warn(warning);
        }
    }

    /// Cross-check the declared totals and produce the database.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MissingRoot`] if the document held no account.
    pub fn finish(
        mut self,
        compression: Compression,
        load_duration: Duration,
    ) -> Result<Database, LoadError> {
        if self.accounts_read != self.declared_accounts {
            self.warn(LoadWarning::CountMismatch {
                kind: CountKind::Account,
                read: self.accounts_read,
                declared: self.declared_accounts,
            });
        }
        if self.transactions_read != self.declared_transactions {
            self.warn(LoadWarning::CountMismatch {
                kind: CountKind::Transaction,
                read: self.transactions_read,
                declared: self.declared_transactions,
            });
        }

        let tree = self.tree.ok_or(LoadError::MissingRoot { first: None })?;
        Ok(Database {
            tree,
            warnings: self.warnings,
            statistics: Statistics {
                file: None,
                compression,
                declared_accounts: self.declared_accounts,
                declared_transactions: self.declared_transactions,
                loaded_at: Local::now(),
                load_duration,
            },
            accounts_read: self.accounts_read,
            transactions_read: self.transactions_read,
        })
    }
}

/// Keep the calendar date of a `YYYY-MM-DD HH:MM:SS +HHMM` timestamp.
fn parse_posted_date(posted: &str) -> Option<NaiveDate> {
    let date = posted.trim().split(' ').next()?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Evaluate a `numerator/denominator` fraction.
///
/// Returns `None` for a missing slash, a non-numeric side, a zero
/// denominator or an overflowing quotient.
fn parse_fraction(value: &str) -> Option<Decimal> {
    let (numerator, denominator) = value.trim().split_once('/')?;
    let numerator = Decimal::from_str(numerator.trim()).ok()?;
    let denominator = Decimal::from_str(denominator.trim()).ok()?;
    numerator.checked_div(denominator)
}
