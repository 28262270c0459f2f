//! GnuCash XML book loader.
//!
//! This crate reads a GnuCash XML file, compressed or not, into an immutable
//! [`Database`]: the account tree, the transactions attached to each account,
//! the load statistics and the list of inconsistencies found on the way.
//!
//! # Features
//!
//! - Transparent gzip detection from the stream header, not the file name
//! - Single streaming pass, restricted to the `gnc` namespace
//! - Scheduled-transaction templates are skipped
//! - Orphan accounts and splits are reported as warnings instead of failing
//! - Declared `count-data` totals are cross-checked against what was read
//!
//! # Example
//!
//! ```ignore
//! use gncql_core::AccountFilter;
//!
//! let db = gncql_loader::load_file("books.gnucash")?;
//! for warning in db.warnings() {
//!     eprintln!("warning: {warning}");
//! }
//! for account in db.accounts(&AccountFilter::new().with_type("BANK")) {
//!     println!("{} {}", account.name, account.balance());
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod decode;
pub mod diagnostics;
pub mod stream;

pub use builder::DatabaseBuilder;
pub use diagnostics::{CountKind, LoadWarning, Statistics};
pub use stream::{Compression, DocumentStream};

use decode::{ElementKind, ElementReader};
use gncql_core::{Account, AccountFilter, AccountTree};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Errors that abort a load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened.
    #[error("failed to open file {path}: {source}")]
    Io {
        /// The path that failed to open.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Reading the (uncompressed) source failed.
    #[error("failed to read document: {0}")]
    Read(#[source] io::Error),

    /// The source carries a gzip header but cannot be decompressed.
    #[error("failed to decompress document: {0}")]
    Decompress(#[source] io::Error),

    /// The markup is malformed.
    #[error("malformed document: {0}")]
    Xml(#[source] quick_xml::Error),

    /// The document ends inside an element.
    #[error("unexpected end of document inside <{element}>")]
    UnexpectedEof {
        /// Local name of the unterminated element.
        element: String,
    },

    /// The first account is not the root account, or there is no account.
    #[error("unable to initialize accounts hierarchy with Root Account: {}", describe_first(.first))]
    MissingRoot {
        /// Name of the offending first account, if any.
        first: Option<String>,
    },
}

fn describe_first(first: &Option<String>) -> String {
    match first {
        Some(name) => format!("first account is '{name}'"),
        None => "no account found".to_string(),
    }
}

/// A loaded GnuCash book.
///
/// Built once by [`load`] or [`load_file`] and never modified afterwards, so
/// it can be shared between any number of readers without locking.
#[derive(Debug)]
pub struct Database {
    pub(crate) tree: AccountTree,
    pub(crate) warnings: Vec<LoadWarning>,
    pub(crate) statistics: Statistics,
    pub(crate) accounts_read: usize,
    pub(crate) transactions_read: usize,
}

impl Database {
    /// The root account of the book.
    #[must_use]
    pub fn root_account(&self) -> &Account {
        self.tree.root()
    }

    /// The account with this ID, if any.
    #[must_use]
    pub fn account(&self, id: &str) -> Option<&Account> {
        self.tree.find(id)
    }

    /// Accounts matching `filter`, searched breadth-first from the root.
    #[must_use]
    pub fn accounts(&self, filter: &AccountFilter) -> Vec<&Account> {
        self.tree.descendants(self.tree.root_node(), filter)
    }

    /// Accounts named `name`, searched breadth-first from the root.
    #[must_use]
    pub fn accounts_named(&self, name: &str) -> Vec<&Account> {
        self.accounts(&AccountFilter::new().with_name(name))
    }

    /// Accounts of the subtree rooted at `start` matching `filter`, in
    /// breadth-first order.
    #[must_use]
    pub fn descendants(&self, start: &Account, filter: &AccountFilter) -> Vec<&Account> {
        self.tree.descendants(start.node(), filter)
    }

    /// The account tree.
    #[must_use]
    pub const fn tree(&self) -> &AccountTree {
        &self.tree
    }

    /// Inconsistencies found while loading, in detection order.
    #[must_use]
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Load statistics.
    #[must_use]
    pub const fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Number of `account` elements read, linked or not.
    #[must_use]
    pub const fn accounts_read(&self) -> usize {
        self.accounts_read
    }

    /// Number of `transaction` elements read.
    #[must_use]
    pub const fn transactions_read(&self) -> usize {
        self.transactions_read
    }
}

/// Load a GnuCash book from a file, compressed or not.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be opened or the document cannot
/// be decoded. Inconsistencies in the book itself are reported through
/// [`Database::warnings`] instead.
pub fn load_file(path: impl AsRef<Path>) -> Result<Database, LoadError> {
    let path = path.as_ref();
    tracing::info!("loading GnuCash book from {}", path.display());

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut db = load(file)?;
    db.statistics.file = Some(path.to_path_buf());
    Ok(db)
}

/// Load a GnuCash book from a byte stream, compressed or not.
///
/// # Errors
///
/// See [`load_file`].
pub fn load<R: Read>(reader: R) -> Result<Database, LoadError> {
    let stream = DocumentStream::open(reader)?;
    let compression = stream.compression();
    tracing::debug!(%compression, "document stream selected");

    let started = Instant::now();
    let mut elements = ElementReader::new(stream, compression);
    let mut builder = DatabaseBuilder::new();

    while let Some(start) = elements.next_element()? {
        match start.kind() {
            ElementKind::CountData => builder.record_count(elements.read_count(&start)?),
            ElementKind::Account => builder.add_account(elements.read_account(&start)?)?,
            ElementKind::Transaction => builder.add_transaction(elements.read_transaction(&start)?),
            ElementKind::TemplateTransactions => elements.skip(&start)?,
        }
    }

    let db = builder.finish(compression, started.elapsed())?;
    tracing::info!(
        accounts = db.tree.len(),
        transactions = db.tree.transaction_count(),
        warnings = db.warnings.len(),
        duration = ?db.statistics.load_duration,
        "GnuCash book loaded"
    );
    Ok(db)
}
