//! Pull-driven lexer that runs the grammar on the caller's thread.
//!
//! Each call to [`Tokens::next_token`] runs state functions until at least
//! one token is buffered or the grammar ends. Nothing runs ahead of the
//! consumer, so abandoning a `Tokens` mid-scan needs no draining.

use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

use tracing::debug;

use crate::scanner::Scanner;
use crate::token::collect_until_eof;
use crate::{LexError, State, Token, Transition};

pub struct Tokens<K> {
    scanner: Scanner<K>,
    /// `None` once the grammar has terminated.
    state: Option<State<K>>,
}

impl<K> Tokens<K> {
    pub fn new<F>(input: impl Into<Arc<str>>, initial: F) -> Self
    where
        F: FnOnce(&mut Scanner<K>) -> Transition<K> + Send + 'static,
    {
        Tokens {
            scanner: Scanner::queued(input.into()),
            state: Some(State::new(initial)),
        }
    }

    /// Runs the grammar until the next token is available.
    ///
    /// Returns `None` once the grammar has terminated and every token was
    /// delivered, and on every call after that.
    pub fn next_token(&mut self) -> Option<Token<K>> {
        loop {
            if let Some(token) = self.scanner.pop_queued() {
                return Some(token);
            }
            let state = self.state.take()?;
            self.state = state.run(&mut self.scanner);
            if self.state.is_none() {
                debug!(tokens = self.scanner.emitted(), "scan finished");
            }
        }
    }

    /// Collects tokens up to and including `Eof`; see
    /// [`Lexer::collect_tokens`](crate::Lexer::collect_tokens).
    pub fn collect_tokens(mut self) -> Result<Vec<Token<K>>, LexError> {
        collect_until_eof(self.by_ref())
    }
}

impl<K> Iterator for Tokens<K> {
    type Item = Token<K>;

    fn next(&mut self) -> Option<Token<K>> {
        self.next_token()
    }
}

impl<K> FusedIterator for Tokens<K> {}

impl<K> fmt::Debug for Tokens<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokens")
            .field("scanner", &self.scanner)
            .field("finished", &self.state.is_none())
            .finish()
    }
}
