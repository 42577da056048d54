//! State-function driven lexical scanning.
//!
//! `runelex` supplies the scanning primitives and the token hand-off; the
//! caller supplies the grammar as a graph of state functions. A state reads
//! from the [`Scanner`], emits tokens, and returns the next state:
//!
//! ```
//! use runelex::{eof, Lexer, Scanner, State, Token, TokenKind, Transition};
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq)]
//! enum Calc {
//!     Number,
//!     Plus,
//! }
//!
//! fn expr(s: &mut Scanner<Calc>) -> Transition<Calc> {
//!     s.ignore_runes(char::is_whitespace);
//!     if s.accept_run('0'..='9') {
//!         s.emit(Calc::Number);
//!     } else if s.accept('+') {
//!         s.emit(Calc::Plus);
//!     } else if s.is_eof() {
//!         return Some(State::new(eof));
//!     } else {
//!         let c = s.peek();
//!         return s.errorf(format_args!("unexpected {c:?}"));
//!     }
//!     Some(State::new(expr))
//! }
//!
//! let tokens: Vec<Token<Calc>> = Lexer::new("42 + 8", expr).collect();
//! let rendered: Vec<String> = tokens.iter().map(ToString::to_string).collect();
//! assert_eq!(rendered, ["\"42\"", "\"+\"", "\"8\"", "EOF"]);
//! assert_eq!(tokens[2].pos, 5);
//! assert_eq!(tokens[3].kind, TokenKind::Eof);
//! ```
//!
//! # Two drivers
//!
//! - [`Lexer`] runs the grammar on a background thread and hands tokens over
//!   a bounded channel (rendezvous by default). Abandoned scans must be
//!   drained, cancelled or dropped.
//! - [`Tokens`] runs the grammar lazily on the caller's thread.
//!
//! # Debugging
//!
//! - `RUST_LOG=runelex=debug`: scan start/finish, disconnects, drains.
//! - `RUST_LOG=runelex=trace`: every emitted token.
//!
//! Call [`init_tracing`] to install a subscriber when the host application
//! does not set one up itself.

mod config;
mod error;
mod lexer;
mod rune_set;
mod scanner;
mod state;
mod token;
mod tokens;

pub use config::{LexerConfig, DEFAULT_THREAD_NAME};
pub use error::LexError;
pub use lexer::Lexer;
pub use rune_set::{Matching, Needles, RuneSet};
pub use scanner::Scanner;
pub use state::{eof, State, Transition};
pub use token::{Pos, Token, TokenKind};
pub use tokens::Tokens;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Only installs a subscriber when `RUST_LOG`
/// is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            // Another subscriber may already be installed by the host.
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
        }
    });
}
