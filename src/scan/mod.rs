//! Source normalisation and syntax validation.
//!
//! Parsing operates on a *working copy* of the user's expression in which
//! `**` has been rewritten to `^` and all whitespace removed. A position
//! map from the working copy back to the original string survives until
//! the end of the parse so diagnostics can point at what the user typed.

mod check;
mod number;

pub(crate) use check::syntax_check;
pub(crate) use number::scan_real;

use crate::error::{SyntaxError, SyntaxErrorKind};

/// Normalised working copy of an expression plus its position map.
pub(crate) struct Scanned {
    text: Vec<u8>,
    /// `map[k]` = byte offset in the original string of the character that
    /// ended up at normalised position `k`.
    map: Vec<usize>,
    original_len: usize,
}

impl Scanned {
    /// Build the working copy: rewrite `**` to `^`, then elide whitespace.
    ///
    /// The two rewrites are ordered so that `a ** b` and `a**b` produce the
    /// same working copy; a `* *` with intervening whitespace stays two
    /// separate `*` bytes and is rejected later by the syntax check.
    pub fn new(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut text = Vec::with_capacity(bytes.len());
        let mut map = Vec::with_capacity(bytes.len());

        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            if b == b'*' && i + 1 < bytes.len() && bytes[i + 1] == b'*' {
                text.push(b'^');
                map.push(i);
                i += 2;
            } else if b.is_ascii_whitespace() {
                i += 1;
            } else {
                text.push(b);
                map.push(i);
                i += 1;
            }
        }

        Self {
            text,
            map,
            original_len: bytes.len(),
        }
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.text
    }

    /// Map a normalised position back to the original string. Positions at
    /// or past the end map to the original length (end-of-input faults).
    pub fn original_pos(&self, normalised: usize) -> usize {
        self.map
            .get(normalised)
            .copied()
            .unwrap_or(self.original_len)
    }

    /// Build a [`SyntaxError`] located at a normalised position.
    pub fn error(&self, kind: SyntaxErrorKind, normalised: usize) -> SyntaxError {
        SyntaxError::new(kind, self.original_pos(normalised))
    }
}
