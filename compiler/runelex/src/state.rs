//! State functions: the grammar's unit of work.
//!
//! A grammar is a graph of states. Each state reads from the [`Scanner`],
//! emits zero or more tokens and returns the state to run next, or `None`
//! to end the scan. There is no state enumeration; a state is any function
//! or closure with the right shape, so it can capture whatever local data
//! the grammar needs.

use std::fmt;

use crate::{Scanner, TokenKind};

/// What a state returns: the next state, or `None` to stop scanning.
pub type Transition<K> = Option<State<K>>;

/// A boxed state function.
///
/// Build one from a plain function with [`State::new`] or `From`:
///
/// ```
/// use runelex::{Scanner, State, Transition};
///
/// fn skip_all(s: &mut Scanner<()>) -> Transition<()> {
///     while s.next().is_some() {}
///     s.ignore();
///     Some(State::new(runelex::eof))
/// }
/// # let _ = State::new(skip_all);
/// ```
pub struct State<K>(Box<dyn FnOnce(&mut Scanner<K>) -> Transition<K> + Send>);

impl<K> State<K> {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&mut Scanner<K>) -> Transition<K> + Send + 'static,
    {
        State(Box::new(f))
    }

    /// Runs this state against `scanner`, consuming it.
    #[inline]
    pub(crate) fn run(self, scanner: &mut Scanner<K>) -> Transition<K> {
        (self.0)(scanner)
    }
}

impl<K, F> From<F> for State<K>
where
    F: FnOnce(&mut Scanner<K>) -> Transition<K> + Send + 'static,
{
    fn from(f: F) -> Self {
        State::new(f)
    }
}

impl<K> fmt::Debug for State<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("State(..)")
    }
}

/// Terminal state: emits an `Eof` token and ends the scan.
///
/// Route a grammar's final transition here to give consumers an explicit
/// end-of-stream marker before the stream closes.
pub fn eof<K>(s: &mut Scanner<K>) -> Transition<K> {
    s.emit(TokenKind::<K>::Eof);
    None
}
