//! Code-point cursor over a fully materialized input buffer.
//!
//! The scanner tracks three byte offsets: `start` (where the pending token
//! begins), `pos` (the read head) and `width` (byte width of the last code
//! point read). All positions are byte offsets into UTF-8 text and always lie
//! on character boundaries; lookahead is measured in code points.
//!
//! # Backup
//!
//! `width` is consumed by [`Scanner::backup`], which resets it to zero. A
//! second `backup` without an intervening read is therefore a no-op, as is a
//! `backup` at the start of input, after reading EOF, or right after `emit`
//! or `ignore`. Together these keep `start <= pos` at all times.
//!
//! # Output
//!
//! Emitted tokens go either to a channel (the threaded [`Lexer`](crate::Lexer))
//! or to a local queue (the pull-driven [`Tokens`](crate::Tokens)). The
//! grammar sees the same API in both cases.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam::channel::Sender;
use tracing::{debug, trace};

use crate::{Pos, RuneSet, Token, TokenKind, Transition};

/// Where emitted tokens go.
pub(crate) enum Output<K> {
    /// Hand-off to a consumer on another thread. `send` blocks while the
    /// channel is full, which is the only suspension point of a scan.
    Channel(Sender<Token<K>>),
    /// Buffered for a consumer on the same thread.
    Queue(VecDeque<Token<K>>),
}

/// Cursor and token sink handed to every state function.
pub struct Scanner<K> {
    input: Arc<str>,
    /// Start of the pending token.
    start: Pos,
    /// Read head.
    pos: Pos,
    /// Byte width of the last code point read; zero once consumed by `backup`.
    width: Pos,
    output: Output<K>,
    /// Set when the consumer went away or asked the scan to stop.
    cancel: Arc<AtomicBool>,
    /// Tokens delivered or queued; discarded ones are not counted.
    emitted: usize,
}

impl<K> Scanner<K> {
    pub(crate) fn new(input: Arc<str>, output: Output<K>, cancel: Arc<AtomicBool>) -> Self {
        Scanner {
            input,
            start: 0,
            pos: 0,
            width: 0,
            output,
            cancel,
            emitted: 0,
        }
    }

    /// A scanner that buffers its tokens locally.
    pub(crate) fn queued(input: Arc<str>) -> Self {
        Self::new(
            input,
            Output::Queue(VecDeque::new()),
            Arc::new(AtomicBool::new(false)),
        )
    }

    // === Queries ===

    /// The whole input being scanned.
    #[inline]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Byte offset where the pending token starts.
    #[inline]
    pub fn start(&self) -> Pos {
        self.start
    }

    /// Byte offset of the read head.
    #[inline]
    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Text consumed since the last `emit` or `ignore`.
    #[inline]
    pub fn pending(&self) -> &str {
        &self.input[self.start..self.pos]
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Returns `true` once the consumer has stopped listening.
    ///
    /// Further emitted tokens are discarded and the run loop will not start
    /// another state. Long-running states can poll this to stop early.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    pub(crate) fn emitted(&self) -> usize {
        self.emitted
    }

    // === Reading ===

    /// Consumes and returns the next code point, or `None` at end of input.
    ///
    /// Reading past the end is harmless: it keeps returning `None` and leaves
    /// nothing for `backup` to undo.
    #[allow(
        clippy::should_implement_trait,
        reason = "cursor primitive; a Scanner is not a sequence of chars to callers"
    )]
    pub fn next(&mut self) -> Option<char> {
        let Some(c) = self.input[self.pos..].chars().next() else {
            self.width = 0;
            return None;
        };
        self.width = c.len_utf8();
        self.pos += self.width;
        Some(c)
    }

    /// Returns the next code point without consuming it.
    #[inline]
    pub fn peek(&mut self) -> Option<char> {
        let c = self.next();
        self.backup();
        c
    }

    /// Steps back over the code point returned by the last `next`.
    ///
    /// Only one step of history is kept. Calling `backup` again before the
    /// next read does nothing.
    #[inline]
    pub fn backup(&mut self) {
        self.pos -= self.width;
        self.width = 0;
    }

    // === Accepting ===

    /// Consumes the next code point if it belongs to `set`.
    pub fn accept(&mut self, set: impl RuneSet) -> bool {
        match self.next() {
            Some(c) if set.contains(c) => true,
            _ => {
                self.backup();
                false
            }
        }
    }

    /// Consumes a maximal run of code points from `set`.
    ///
    /// Returns `false` when nothing was consumed.
    pub fn accept_run(&mut self, set: impl RuneSet) -> bool {
        let from = self.pos;
        while self.next().is_some_and(|c| set.contains(c)) {}
        self.backup();
        self.pos > from
    }

    /// Consumes code points up to, not including, the first member of `set`
    /// or the end of input.
    ///
    /// Returns `false` when nothing was consumed.
    pub fn accept_until(&mut self, set: impl RuneSet) -> bool {
        let from = self.pos;
        if let Some(needles) = set.needles() {
            // ASCII needles never match inside a multi-byte sequence, so the
            // jump target is always a character boundary.
            let rest = &self.input.as_bytes()[self.pos..];
            let skip = needles.find(rest).unwrap_or(rest.len());
            self.pos += skip;
            self.width = 0;
        } else {
            while self.next().is_some_and(|c| !set.contains(c)) {}
            self.backup();
        }
        self.pos > from
    }

    // === Skipping ===

    /// Discards the pending text without emitting it.
    #[inline]
    pub fn ignore(&mut self) {
        self.start = self.pos;
        // Backup must not cross into text that is no longer pending.
        self.width = 0;
    }

    /// Consumes code points while `skip` holds, then ignores everything
    /// pending.
    pub fn ignore_runes(&mut self, skip: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&skip) {
            self.next();
        }
        self.ignore();
    }

    // === Emitting ===

    /// Emits the pending text as a token of `kind` and starts a new token.
    ///
    /// On the threaded [`Lexer`](crate::Lexer) this blocks until the consumer
    /// is ready for the token.
    pub fn emit(&mut self, kind: impl Into<TokenKind<K>>) {
        let token = Token {
            kind: kind.into(),
            pos: self.start,
            text: self.input[self.start..self.pos].to_owned(),
        };
        self.start = self.pos;
        self.width = 0;
        self.send(token);
    }

    /// Emits an `Error` token carrying `message` and ends the scan.
    ///
    /// The token is positioned at the start of the pending text, which is
    /// where the offending input began.
    pub fn error(&mut self, message: impl Into<String>) -> Transition<K> {
        let token = Token {
            kind: TokenKind::Error,
            pos: self.start,
            text: message.into(),
        };
        self.send(token);
        None
    }

    /// Formatting variant of [`error`](Self::error):
    /// `return s.errorf(format_args!("bad escape {c:?}"))`.
    pub fn errorf(&mut self, args: fmt::Arguments<'_>) -> Transition<K> {
        self.error(fmt::format(args))
    }

    fn send(&mut self, token: Token<K>) {
        trace!(
            pos = token.pos,
            len = token.text.len(),
            reserved = token.kind.is_reserved(),
            "emit"
        );
        match &mut self.output {
            Output::Queue(queue) => queue.push_back(token),
            Output::Channel(tx) => {
                if self.cancel.load(Ordering::Acquire) {
                    return;
                }
                if tx.send(token).is_err() {
                    debug!(pos = self.pos, "consumer disconnected, stopping scan");
                    self.cancel.store(true, Ordering::Release);
                    return;
                }
            }
        }
        self.emitted += 1;
    }

    /// Takes the oldest locally buffered token.
    pub(crate) fn pop_queued(&mut self) -> Option<Token<K>> {
        match &mut self.output {
            Output::Queue(queue) => queue.pop_front(),
            Output::Channel(_) => None,
        }
    }
}

impl<K> fmt::Debug for Scanner<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("start", &self.start)
            .field("pos", &self.pos)
            .field("width", &self.width)
            .field("len", &self.input.len())
            .field("emitted", &self.emitted)
            .finish_non_exhaustive()
    }
}
