//! Threaded lexer: runs the grammar on its own thread and hands tokens to
//! the consumer through a bounded channel.
//!
//! # Protocol
//!
//! The scanning thread executes state functions until one returns `None`,
//! then drops its end of the channel. The consumer pulls with
//! [`Lexer::next_token`]; once the channel is closed every pull returns
//! `None`. With the default rendezvous channel each `emit` blocks until the
//! consumer pulls, so the producer never runs ahead of the consumer.
//!
//! # Abandoning a scan
//!
//! A consumer that stops early must not leave the producer blocked in
//! `emit`. Either [`drain`](Lexer::drain) the rest of the stream (finishes
//! the scan), [`cancel`](Lexer::cancel) it (stops at the next emission or
//! state boundary), or drop the `Lexer`, which cancels without waiting.

use std::any::Any;
use std::fmt;
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam::channel::{self, Receiver};
use tracing::{debug, debug_span, error};

use crate::config::LexerConfig;
use crate::scanner::{Output, Scanner};
use crate::token::collect_until_eof;
use crate::{LexError, State, Token, Transition};

/// Handle to a scan running on a background thread.
pub struct Lexer<K> {
    /// `None` once the consumer disconnected via `cancel`.
    tokens: Option<Receiver<Token<K>>>,
    /// `None` once the scanning thread has been joined.
    worker: Option<JoinHandle<()>>,
    cancel: Arc<AtomicBool>,
    /// Panic message of the scanning thread, if it panicked.
    panic: Option<String>,
}

impl<K: Send + 'static> Lexer<K> {
    /// Starts scanning `input` from `initial` with the default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the scanning thread cannot be spawned; use
    /// [`try_new`](Self::try_new) to handle that case.
    pub fn new<F>(input: impl Into<Arc<str>>, initial: F) -> Self
    where
        F: FnOnce(&mut Scanner<K>) -> Transition<K> + Send + 'static,
    {
        Self::with_config(input, initial, &LexerConfig::default())
    }

    /// Starts scanning with an explicit configuration.
    ///
    /// # Panics
    ///
    /// Panics if the scanning thread cannot be spawned.
    pub fn with_config<F>(input: impl Into<Arc<str>>, initial: F, config: &LexerConfig) -> Self
    where
        F: FnOnce(&mut Scanner<K>) -> Transition<K> + Send + 'static,
    {
        match Self::try_with_config(input, initial, config) {
            Ok(lexer) => lexer,
            Err(err) => panic!("cannot start lexer: {err}"),
        }
    }

    pub fn try_new<F>(input: impl Into<Arc<str>>, initial: F) -> Result<Self, LexError>
    where
        F: FnOnce(&mut Scanner<K>) -> Transition<K> + Send + 'static,
    {
        Self::try_with_config(input, initial, &LexerConfig::default())
    }

    pub fn try_with_config<F>(
        input: impl Into<Arc<str>>,
        initial: F,
        config: &LexerConfig,
    ) -> Result<Self, LexError>
    where
        F: FnOnce(&mut Scanner<K>) -> Transition<K> + Send + 'static,
    {
        let (tx, rx) = channel::bounded(config.capacity);
        let cancel = Arc::new(AtomicBool::new(false));
        let scanner = Scanner::new(input.into(), Output::Channel(tx), Arc::clone(&cancel));
        let initial = State::new(initial);
        let capacity = config.capacity;
        let worker = config
            .thread_builder()
            .spawn(move || run(scanner, initial, capacity))?;
        Ok(Lexer {
            tokens: Some(rx),
            worker: Some(worker),
            cancel,
            panic: None,
        })
    }
}

impl<K> Lexer<K> {
    /// Blocks until the next token is available.
    ///
    /// Returns `None` once the scan has ended and every token was delivered,
    /// and on every call after that.
    pub fn next_token(&mut self) -> Option<Token<K>> {
        self.tokens.as_ref()?.recv().ok()
    }

    /// Discards the rest of the stream and waits for the scanning thread to
    /// exit. Returns how many tokens were discarded.
    ///
    /// The scan runs to completion; use [`cancel`](Self::cancel) to stop it
    /// instead.
    pub fn drain(&mut self) -> usize {
        let discarded = self.tokens.as_ref().map_or(0, |rx| rx.iter().count());
        self.join();
        if discarded > 0 {
            debug!(discarded, "drained token stream");
        }
        discarded
    }

    /// Stops the scan at the next emission or state boundary and waits for
    /// the scanning thread to exit.
    ///
    /// A state function that loops forever without emitting or checking
    /// [`Scanner::is_cancelled`] keeps this from returning.
    pub fn cancel(mut self) -> Result<(), LexError> {
        self.cancel.store(true, Ordering::Release);
        // Disconnecting wakes a producer blocked in `emit`.
        self.tokens = None;
        self.join();
        self.outcome()
    }

    /// Drains the stream and reports whether the scanning thread panicked.
    pub fn finish(mut self) -> Result<(), LexError> {
        self.drain();
        self.outcome()
    }

    /// Collects tokens up to and including `Eof`.
    ///
    /// Returns the first `Error` token as [`LexError::Scan`], a grammar panic
    /// as [`LexError::Panicked`], and a stream without `Eof` as
    /// [`LexError::Truncated`].
    pub fn collect_tokens(mut self) -> Result<Vec<Token<K>>, LexError> {
        let collected = collect_until_eof(self.by_ref());
        self.drain();
        self.outcome()?;
        collected
    }

    fn join(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        if let Err(payload) = worker.join() {
            let message = panic_message(payload.as_ref());
            error!(%message, "scanner thread panicked");
            self.panic = Some(message);
        }
    }

    fn outcome(&mut self) -> Result<(), LexError> {
        match self.panic.take() {
            Some(message) => Err(LexError::Panicked { message }),
            None => Ok(()),
        }
    }
}

impl<K> Iterator for Lexer<K> {
    type Item = Token<K>;

    fn next(&mut self) -> Option<Token<K>> {
        self.next_token()
    }
}

impl<K> FusedIterator for Lexer<K> {}

/// Dropping a `Lexer` cancels the scan without waiting for the thread.
impl<K> Drop for Lexer<K> {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Release);
    }
}

impl<K> fmt::Debug for Lexer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexer")
            .field("connected", &self.tokens.is_some())
            .field("running", &self.worker.is_some())
            .field("cancelled", &self.cancel.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

/// Run loop of the scanning thread.
///
/// Invokes states until one returns `None` or the consumer goes away, then
/// drops the scanner, which closes the channel.
fn run<K>(mut scanner: Scanner<K>, initial: State<K>, capacity: usize) {
    let span = debug_span!("scan", len = scanner.input().len(), capacity);
    let _enter = span.enter();
    debug!("scan started");

    let mut state = Some(initial);
    while let Some(current) = state.take() {
        if scanner.is_cancelled() {
            break;
        }
        state = current.run(&mut scanner);
    }

    debug!(
        tokens = scanner.emitted(),
        cancelled = scanner.is_cancelled(),
        "scan finished"
    );
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests;
