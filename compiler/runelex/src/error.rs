//! Errors surfaced to consumers of a token stream.
//!
//! Cursor operations never fail. The grammar reports failures in-band as an
//! `Error` token; these types exist for the convenience APIs that turn a
//! stream into a `Result`.

use crate::Pos;

#[derive(Debug, thiserror::Error)]
pub enum LexError {
    /// The grammar emitted an `Error` token.
    #[error("{message} (at byte {pos})")]
    Scan { pos: Pos, message: String },

    /// A state function panicked on the scanning thread.
    #[error("scanner panicked: {message}")]
    Panicked { message: String },

    /// The stream closed without an `Eof` or `Error` token.
    #[error("token stream ended without an EOF token")]
    Truncated,

    /// The scanning thread could not be started.
    #[error("failed to spawn scanner thread")]
    Spawn(#[from] std::io::Error),
}
