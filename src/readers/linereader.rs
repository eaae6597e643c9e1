// src/readers/linereader.rs

//! Implements a [`LineReader`], the driver of deriving lines of text from
//! any [`Read`] by reading fixed-size blocks of bytes.
//!
//! Only one block is held in memory at a time, plus the bytes of any line
//! that straddles block boundaries.
//!
//! [`Read`]: std::io::Read

use crate::common::{Count, FPath, LineNumber, ResultS3, CRu8, NLu8};
use crate::debug::printers::str_to_String_noraw;

use std::fmt;
use std::io::{Error, ErrorKind, Read};

use ::memchr::memchr;
use ::more_asserts::debug_assert_le;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Blocks
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Block Size in bytes.
pub type BlockSz = usize;

/// Minimum Block Size (inclusive).
pub const BLOCKSZ_MIN: BlockSz = 1;

/// Maximum Block Size (inclusive).
pub const BLOCKSZ_MAX: BlockSz = 0xFFFFFF;

/// Default Block Size.
pub const BLOCKSZ_DEF: BlockSz = 0xFFFF;

/// A line of text and its one-based line number.
pub type LineFound = (LineNumber, String);

/// [`LineReader::next_line`] result.
pub type ResultS3LineFind = ResultS3<LineFound, Error>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LineReader
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Reads lines, in order, from a `Read`.
///
/// A line ends with `'\n'` or the end of the data. A trailing `'\r'` is
/// removed. Bytes that are not valid UTF-8 are replaced with
/// `U+FFFD REPLACEMENT CHARACTER`.
pub struct LineReader<R: Read> {
    reader: R,
    /// only for debug messages
    path: FPath,
    /// the current block
    block: Vec<u8>,
    /// count of valid bytes in `block`
    block_len: usize,
    /// index of the next unconsumed byte in `block`
    block_at: usize,
    /// bytes of a line begun in a prior block
    partial: Vec<u8>,
    /// the underlying `Read` returned zero bytes, or an error
    eof: bool,
    /// count of lines returned
    lines_read: Count,
    /// count of bytes read from `reader`
    bytes_read: Count,
    /// count of blocks read from `reader`
    blocks_read: Count,
}

impl<R: Read> fmt::Debug for LineReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LineReader")
            .field("path", &self.path)
            .field("blocksz", &self.block.len())
            .field("block_len", &self.block_len)
            .field("block_at", &self.block_at)
            .field("partial", &self.partial.len())
            .field("eof", &self.eof)
            .field("lines_read", &self.lines_read)
            .finish()
    }
}

impl<R: Read> LineReader<R> {
    /// Create a new `LineReader` reading blocks of `blocksz` bytes.
    ///
    /// `blocksz` is clamped to `BLOCKSZ_MIN..=BLOCKSZ_MAX`.
    pub fn new(
        reader: R,
        path: FPath,
        blocksz: BlockSz,
    ) -> LineReader<R> {
        let blocksz_: BlockSz = blocksz.clamp(BLOCKSZ_MIN, BLOCKSZ_MAX);
        defñ!("({:?}, {})", path, blocksz_);

        LineReader {
            reader,
            path,
            block: vec![0; blocksz_],
            block_len: 0,
            block_at: 0,
            partial: Vec::new(),
            eof: false,
            lines_read: 0,
            bytes_read: 0,
            blocks_read: 0,
        }
    }

    pub fn lines_read(&self) -> Count {
        self.lines_read
    }

    pub fn bytes_read(&self) -> Count {
        self.bytes_read
    }

    pub fn blocks_read(&self) -> Count {
        self.blocks_read
    }

    /// Turn the `partial` bytes plus `tail` into the next line.
    fn make_line(
        &mut self,
        tail_beg: usize,
        tail_end: usize,
    ) -> LineFound {
        debug_assert_le!(tail_beg, tail_end);
        self.lines_read += 1;
        let text: String = if self.partial.is_empty() {
            bytes_to_line(&self.block[tail_beg..tail_end])
        } else {
            self.partial
                .extend_from_slice(&self.block[tail_beg..tail_end]);
            let text = bytes_to_line(&self.partial);
            self.partial.clear();
            text
        };
        defñ!("line {} {:?}", self.lines_read, str_to_String_noraw(&text));

        (self.lines_read, text)
    }

    /// Return the next line, or `Done` after the last line.
    ///
    /// After an `Err` is returned, all following calls return `Done`.
    pub fn next_line(&mut self) -> ResultS3LineFind {
        loop {
            if self.block_at < self.block_len {
                let beg = self.block_at;
                match memchr(NLu8, &self.block[beg..self.block_len]) {
                    Some(index) => {
                        let end = beg + index;
                        self.block_at = end + 1;
                        return ResultS3::Found(self.make_line(beg, end));
                    }
                    None => {
                        self.partial
                            .extend_from_slice(&self.block[beg..self.block_len]);
                        self.block_at = self.block_len;
                    }
                }
            }
            if self.eof {
                if self.partial.is_empty() {
                    return ResultS3::Done;
                }
                // last line without a newline
                self.block_len = 0;
                self.block_at = 0;
                return ResultS3::Found(self.make_line(0, 0));
            }
            match self.reader.read(&mut self.block[..]) {
                Ok(0) => {
                    defo!("EOF {:?}", self.path);
                    self.eof = true;
                    self.block_len = 0;
                    self.block_at = 0;
                }
                Ok(count) => {
                    self.blocks_read += 1;
                    self.bytes_read += count as Count;
                    self.block_len = count;
                    self.block_at = 0;
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    defo!("read error {:?} {}", self.path, err);
                    self.eof = true;
                    self.partial.clear();
                    self.block_len = 0;
                    self.block_at = 0;
                    return ResultS3::Err(err);
                }
            }
        }
    }
}

/// Bytes of one line, excluding the `'\n'`, to a `String`, removing a
/// trailing `'\r'`.
fn bytes_to_line(bytes: &[u8]) -> String {
    let bytes_: &[u8] = match bytes.last() {
        Some(&CRu8) => &bytes[..bytes.len() - 1],
        _ => bytes,
    };

    String::from_utf8_lossy(bytes_).into_owned()
}
