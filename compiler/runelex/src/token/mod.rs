//! Tokens produced by a scan.
//!
//! A [`Token`] is an immutable, positioned span of the input tagged with a
//! [`TokenKind`]. Kinds are split into a reserved core set (`Eof`, `Error`)
//! and a grammar payload (`Custom`), so grammar-defined kinds can never
//! collide with the engine's own.

use std::fmt;

use crate::LexError;

/// Byte offset into the scanned input.
pub type Pos = usize;

/// Token texts longer than this many bytes are truncated by `Display`.
const PREVIEW_LEN: usize = 10;

/// Classification of a [`Token`].
///
/// `K` is the grammar's own kind catalogue. Any `K` converts into
/// `TokenKind::Custom`, so state functions can write `s.emit(MyKind::Ident)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind<K> {
    /// End of input, emitted by the [`eof`](crate::eof) state.
    Eof,
    /// Scan failure. The token text carries the message.
    Error,
    /// Grammar-defined kind.
    Custom(K),
}

impl<K> TokenKind<K> {
    /// Returns `true` for the engine's own kinds (`Eof` and `Error`).
    #[inline]
    pub fn is_reserved(&self) -> bool {
        !matches!(self, TokenKind::Custom(_))
    }

    /// The grammar kind, if this is not a reserved kind.
    #[inline]
    pub fn custom(&self) -> Option<&K> {
        match self {
            TokenKind::Custom(kind) => Some(kind),
            TokenKind::Eof | TokenKind::Error => None,
        }
    }
}

impl<K> From<K> for TokenKind<K> {
    fn from(kind: K) -> Self {
        TokenKind::Custom(kind)
    }
}

/// A classified span of the input.
///
/// `pos` is a byte offset, not a character index. For every kind except
/// `Error`, `text` is exactly `input[pos..pos + text.len()]`; for `Error` it
/// is the diagnostic message and `pos` is where the offending input began.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token<K> {
    pub kind: TokenKind<K>,
    pub pos: Pos,
    pub text: String,
}

impl<K> Token<K> {
    pub fn new(kind: impl Into<TokenKind<K>>, pos: Pos, text: impl Into<String>) -> Self {
        Token {
            kind: kind.into(),
            pos,
            text: text.into(),
        }
    }

    /// Byte offset one past the token's text.
    #[inline]
    pub fn end(&self) -> Pos {
        self.pos + self.text.len()
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self.kind, TokenKind::Error)
    }

    /// Returns `true` if no token can follow this one in a stream.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.kind.is_reserved()
    }

    /// Converts an `Error` token into [`LexError::Scan`].
    pub fn into_result(self) -> Result<Self, LexError> {
        if self.is_error() {
            Err(LexError::Scan {
                pos: self.pos,
                message: self.text,
            })
        } else {
            Ok(self)
        }
    }
}

/// Gathers tokens up to and including `Eof`.
///
/// Stops at the first `Error` token and reports it; a stream that ends
/// without either is [`LexError::Truncated`].
pub(crate) fn collect_until_eof<K>(
    tokens: impl Iterator<Item = Token<K>>,
) -> Result<Vec<Token<K>>, LexError> {
    let mut collected = Vec::new();
    for token in tokens {
        let token = token.into_result()?;
        let done = token.is_eof();
        collected.push(token);
        if done {
            return Ok(collected);
        }
    }
    Err(LexError::Truncated)
}

/// Diagnostic rendering, not a serialization format.
///
/// `Eof` renders as `EOF`, `Error` as its message, anything else as a quoted
/// preview whose text is cut to its first ten characters when it is longer
/// than ten bytes.
impl<K> fmt::Display for Token<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => f.write_str("EOF"),
            TokenKind::Error => f.write_str(&self.text),
            TokenKind::Custom(_) if self.text.len() > PREVIEW_LEN => {
                let cut = self
                    .text
                    .char_indices()
                    .nth(PREVIEW_LEN)
                    .map_or(self.text.len(), |(i, _)| i);
                write!(f, "{:?}…", &self.text[..cut])
            }
            TokenKind::Custom(_) => write!(f, "{:?}", self.text),
        }
    }
}
