//! Streaming decoder for the elements of a GnuCash XML book.
//!
//! The decoder walks the document once, reporting the start of every element
//! of the `gnc` namespace the loader cares about. The body of a reported
//! element is decoded only when the caller asks for it; if it does not, the
//! walk simply continues inside the element.

use crate::stream::Compression;
use crate::LoadError;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::io::{self, BufRead};
use std::sync::Arc;

/// Namespace of the top-level GnuCash containers.
pub const GNC_NAMESPACE: &[u8] = b"http://www.gnucash.org/XML/gnc";

/// The `gnc` elements the loader dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `gnc:count-data`: a declared total.
    CountData,
    /// `gnc:account`.
    Account,
    /// `gnc:transaction`.
    Transaction,
    /// `gnc:template-transactions`: scheduled-transaction templates.
    TemplateTransactions,
}

impl ElementKind {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"count-data" => Some(Self::CountData),
            b"account" => Some(Self::Account),
            b"transaction" => Some(Self::Transaction),
            b"template-transactions" => Some(Self::TemplateTransactions),
            _ => None,
        }
    }
}

/// Start of an element reported by [`ElementReader::next_element`].
#[derive(Debug, Clone)]
pub struct ElementStart {
    kind: ElementKind,
    end: BytesEnd<'static>,
    empty: bool,
    count_type: Option<String>,
}

impl ElementStart {
    /// Which element started.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Whether the element is self-closing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.empty
    }
}

/// Decoded `count-data` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountRecord {
    /// Value of the `type` attribute (`account`, `transaction`, `book`, ...).
    pub kind: String,
    /// Raw character content.
    pub value: String,
}

/// Decoded `account` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountRecord {
    /// Account ID.
    pub id: String,
    /// Account name.
    pub name: String,
    /// Account type tag.
    pub account_type: String,
    /// Parent account ID, absent for the root.
    pub parent_id: Option<String>,
}

/// Decoded `transaction` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Transaction number.
    pub num: String,
    /// Posted timestamp as written (`YYYY-MM-DD HH:MM:SS +HHMM`).
    pub date_posted: String,
    /// Splits in document order.
    pub splits: Vec<SplitRecord>,
}

/// Decoded `split` element of a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitRecord {
    /// Value as a `numerator/denominator` fraction.
    pub value: String,
    /// Target account ID.
    pub account_id: String,
}

/// Something seen while walking an element body.
///
/// Paths hold the local names of the enclosing elements, relative to the
/// element being decoded.
enum BodyEvent<'a> {
    Open(&'a [String]),
    Text(&'a [String], &'a str),
}

fn path_is(path: &[String], want: &[&str]) -> bool {
    path.len() == want.len() && path.iter().zip(want).all(|(a, b)| a == b)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Map a reader error, attributing I/O failures to the gzip layer when the
/// document is compressed.
fn decode_error(err: quick_xml::Error, compression: Compression) -> LoadError {
    match err {
        quick_xml::Error::Io(source) => {
            let source =
                Arc::try_unwrap(source).unwrap_or_else(|e| io::Error::new(e.kind(), e.to_string()));
            match compression {
                Compression::Gzip => LoadError::Decompress(source),
                Compression::Plain => LoadError::Read(source),
            }
        }
        other => LoadError::Xml(other),
    }
}

/// Pull-based reader over the `gnc` elements of a book.
pub struct ElementReader<R: BufRead> {
    reader: NsReader<R>,
    buf: Vec<u8>,
    compression: Compression,
    /// Local names of the elements opened and not yet closed.
    open: Vec<String>,
}

impl<R: BufRead> ElementReader<R> {
    /// Create a reader over a document stream.
    pub fn new(source: R, compression: Compression) -> Self {
        let mut reader = NsReader::from_reader(source);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
            compression,
            open: Vec::new(),
        }
    }

    /// Advance to the next element of interest.
    ///
    /// Returns `Ok(None)` at the end of the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup is malformed, the stream fails, or the
    /// document ends while an element is still open.
    pub fn next_element(&mut self) -> Result<Option<ElementStart>, LoadError> {
        let compression = self.compression;
        loop {
            self.buf.clear();
            let (ns, event) = self
                .reader
                .read_resolved_event_into(&mut self.buf)
                .map_err(|e| decode_error(e, compression))?;

            let (e, empty) = match event {
                Event::Start(e) => (e, false),
                Event::Empty(e) => (e, true),
                Event::End(_) => {
                    self.open.pop();
                    continue;
                }
                Event::Eof => {
                    return match self.open.pop() {
                        Some(element) => Err(LoadError::UnexpectedEof { element }),
                        None => Ok(None),
                    };
                }
                _ => continue,
            };
            if !empty {
                self.open.push(local_name(&e));
            }
            if !matches!(ns, ResolveResult::Bound(Namespace(uri)) if uri == GNC_NAMESPACE) {
                continue;
            }
            let Some(kind) = ElementKind::from_local_name(e.local_name().as_ref()) else {
                continue;
            };

            let count_type = if kind == ElementKind::CountData {
                count_type(&e).map_err(|e| decode_error(e, compression))?
            } else {
                None
            };

            return Ok(Some(ElementStart {
                kind,
                end: e.to_end().into_owned(),
                empty,
                count_type,
            }));
        }
    }

    /// Decode the body of a `count-data` element.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup is malformed or the stream fails.
    pub fn read_count(&mut self, start: &ElementStart) -> Result<CountRecord, LoadError> {
        let mut record = CountRecord {
            kind: start.count_type.clone().unwrap_or_default(),
            value: String::new(),
        };
        self.read_body(start, |event| {
            if let BodyEvent::Text([], text) = event {
                record.value.push_str(text);
            }
        })?;
        record.value = record.value.trim().to_string();
        Ok(record)
    }

    /// Decode the body of an `account` element.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup is malformed or the stream fails.
    pub fn read_account(&mut self, start: &ElementStart) -> Result<AccountRecord, LoadError> {
        let mut record = AccountRecord::default();
        let mut parent = None::<String>;
        self.read_body(start, |event| {
            let BodyEvent::Text([field], text) = event else {
                return;
            };
            match field.as_str() {
                "id" => record.id.push_str(text),
                "name" => record.name.push_str(text),
                "type" => record.account_type.push_str(text),
                "parent" => parent.get_or_insert_with(String::new).push_str(text),
                _ => {}
            }
        })?;
        record.parent_id = parent.map(|p| p.trim().to_string());
        Ok(record)
    }

    /// Decode the body of a `transaction` element.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup is malformed or the stream fails.
    pub fn read_transaction(
        &mut self,
        start: &ElementStart,
    ) -> Result<TransactionRecord, LoadError> {
        let mut record = TransactionRecord::default();
        self.read_body(start, |event| match event {
            BodyEvent::Open(path) if path_is(path, &["splits", "split"]) => {
                record.splits.push(SplitRecord::default());
            }
            BodyEvent::Open(_) => {}
            BodyEvent::Text(path, text) => {
                if path_is(path, &["num"]) {
                    record.num.push_str(text);
                } else if path_is(path, &["date-posted", "date"]) {
                    record.date_posted.push_str(text);
                } else if let Some(split) = record.splits.last_mut() {
                    if path_is(path, &["splits", "split", "value"]) {
                        split.value.push_str(text);
                    } else if path_is(path, &["splits", "split", "account"]) {
                        split.account_id.push_str(text);
                    }
                }
            }
        })?;
        Ok(record)
    }

    /// Skip the whole subtree of an element.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup is malformed or the stream fails.
    pub fn skip(&mut self, start: &ElementStart) -> Result<(), LoadError> {
        if start.empty {
            return Ok(());
        }
        let compression = self.compression;
        self.buf.clear();
        self.reader
            .read_to_end_into(start.end.name(), &mut self.buf)
            .map_err(|e| decode_error(e, compression))?;
        self.open.pop();
        Ok(())
    }

    fn read_body<F>(&mut self, start: &ElementStart, mut visit: F) -> Result<(), LoadError>
    where
        F: FnMut(BodyEvent<'_>),
    {
        if start.empty {
            return Ok(());
        }
        let compression = self.compression;
        let mut path: Vec<String> = Vec::new();
        loop {
            self.buf.clear();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|e| decode_error(e, compression))?;
            match event {
                Event::Start(e) => {
                    path.push(local_name(&e));
                    visit(BodyEvent::Open(&path));
                }
                Event::Empty(e) => {
                    path.push(local_name(&e));
                    visit(BodyEvent::Open(&path));
                    path.pop();
                }
                Event::Text(t) => {
                    let text = t.unescape().map_err(|e| decode_error(e, compression))?;
                    visit(BodyEvent::Text(&path, &text));
                }
                Event::CData(c) => {
                    let text = String::from_utf8_lossy(&c);
                    visit(BodyEvent::Text(&path, &text));
                }
                Event::End(_) => {
                    if path.pop().is_none() {
                        self.open.pop();
                        return Ok(());
                    }
                }
                Event::Eof => {
                    return Err(LoadError::UnexpectedEof {
                        element: String::from_utf8_lossy(start.end.local_name().as_ref())
                            .into_owned(),
                    });
                }
                _ => {}
            }
        }
    }
}

fn count_type(e: &BytesStart<'_>) -> Result<Option<String>, quick_xml::Error> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == b"type" {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
