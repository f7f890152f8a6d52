//! Error interface for this crate.
//!
//! Every error this crate produces (lexing, parsing, assembling) implements
//! [`Error`], which extends [`std::error::Error`] with a source location
//! ([`ErrSpan`]) and an optional help message.

use std::borrow::Cow;
use std::ops::Range;

pub use crate::parse::lex::LexErr;

/// Location of an error in assembly source code.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Default)]
pub struct ErrSpan {
    /// The line the error occurred on (1-indexed).
    pub line: usize,
    /// The columns of the line which caused the error.
    ///
    /// This is empty if the error applies to the whole line.
    pub cols: Range<usize>
}
impl ErrSpan {
    /// Creates a span covering the given columns of a line.
    pub fn new(line: usize, cols: Range<usize>) -> Self {
        ErrSpan { line, cols }
    }

    /// Creates a span covering an entire line.
    pub fn line(line: usize) -> Self {
        ErrSpan { line, cols: 0..0 }
    }
}
impl std::fmt::Display for ErrSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.cols.is_empty() {
            true  => write!(f, "line {}", self.line),
            false => write!(f, "line {}, col {}", self.line, self.cols.start + 1),
        }
    }
}

/// Unified error interface for all errors in this crate.
///
/// Note that the [`Display`] implementation is used for a brief message,
/// whereas [`Error::help`] is used for any clarifying messages.
///
/// [`Display`]: std::fmt::Display
pub trait Error: std::error::Error {
    /// The range where this error occurs in source.
    ///
    /// If this is not known, this can be set to `None`.
    fn span(&self) -> Option<ErrSpan> {
        None
    }

    /// A clarifying message to help aid someone in how to fix the message.
    ///
    /// By default this is `None`.
    fn help(&self) -> Option<Cow<str>> {
        None
    }
}
