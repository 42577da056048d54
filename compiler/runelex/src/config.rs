//! Configuration for the threaded [`Lexer`](crate::Lexer).

use std::thread;

/// Default name of the scanning thread.
pub const DEFAULT_THREAD_NAME: &str = "runelex-scanner";

/// Settings for the scanning thread and its token channel.
///
/// The default is a rendezvous channel (capacity 0): every `emit` waits for
/// the consumer to pull the token, so the scanner never runs ahead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexerConfig {
    /// Number of tokens the scanner may buffer ahead of the consumer.
    pub capacity: usize,
    /// Name given to the scanning thread.
    pub thread_name: String,
    /// Stack size for the scanning thread; the platform default when `None`.
    pub stack_size: Option<usize>,
}

impl Default for LexerConfig {
    fn default() -> Self {
        LexerConfig {
            capacity: 0,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            stack_size: None,
        }
    }
}

impl LexerConfig {
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Deeply recursive grammars may need more than the default stack.
    #[must_use]
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    pub(crate) fn thread_builder(&self) -> thread::Builder {
        let builder = thread::Builder::new().name(self.thread_name.clone());
        match self.stack_size {
            Some(bytes) => builder.stack_size(bytes),
            None => builder,
        }
    }
}
