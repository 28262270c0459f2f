//! Input stream selection: gzip-compressed or plain XML.

use crate::LoadError;
use flate2::read::GzDecoder;
use serde::Serialize;
use std::fmt;
use std::io::{self, BufRead, BufReader, Chain, Cursor, Read};

/// The two magic bytes opening every gzip member.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// How the document was stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Uncompressed XML.
    Plain,
    /// Gzip-compressed XML (GnuCash's default on-disk format).
    Gzip,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("plain"),
            Self::Gzip => f.write_str("gzip"),
        }
    }
}

/// The source with its header bytes put back in front.
pub type Source<R> = Chain<Cursor<Vec<u8>>, R>;

/// A byte stream over the document content, decompressed if needed.
#[derive(Debug)]
pub enum DocumentStream<R: Read> {
    /// The source read as is.
    Plain(BufReader<Source<R>>),
    /// The source read through a gzip decoder.
    Gzip(BufReader<GzDecoder<BufReader<Source<R>>>>),
}

impl<R: Read> DocumentStream<R> {
    /// Select the stream for `reader` from its first bytes.
    ///
    /// The header is read until it is complete or the source ends, however
    /// few bytes each read returns, then chained back in front of the rest,
    /// so both paths start decoding at the first byte of the source. A gzip
    /// stream is primed immediately so that an invalid gzip header is
    /// reported here.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Read`] if the source cannot be read and
    /// [`LoadError::Decompress`] if it starts with the gzip magic but is not
    /// a valid gzip stream.
    pub fn open(mut reader: R) -> Result<Self, LoadError> {
        let head = read_head(&mut reader).map_err(LoadError::Read)?;
        let gzip = head.starts_with(&GZIP_MAGIC);
        let source = BufReader::new(Cursor::new(head).chain(reader));
        if !gzip {
            return Ok(Self::Plain(source));
        }

        let mut stream = BufReader::new(GzDecoder::new(source));
        stream.fill_buf().map_err(LoadError::Decompress)?;
        Ok(Self::Gzip(stream))
    }

    /// The compression detected on the source.
    #[must_use]
    pub const fn compression(&self) -> Compression {
        match self {
            Self::Plain(_) => Compression::Plain,
            Self::Gzip(_) => Compression::Gzip,
        }
    }
}

fn read_head<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut head = Vec::with_capacity(GZIP_MAGIC.len());
    reader
        .by_ref()
        .take(GZIP_MAGIC.len() as u64)
        .read_to_end(&mut head)?;
    Ok(head)
}

impl<R: Read> Read for DocumentStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(r) => r.read(buf),
            Self::Gzip(r) => r.read(buf),
        }
    }
}

impl<R: Read> BufRead for DocumentStream<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            Self::Plain(r) => r.fill_buf(),
            Self::Gzip(r) => r.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            Self::Plain(r) => r.consume(amt),
            Self::Gzip(r) => r.consume(amt),
        }
    }
}
