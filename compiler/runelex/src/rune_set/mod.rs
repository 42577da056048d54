//! Character sets accepted by the scanner's `accept*` operations.
//!
//! A [`RuneSet`] answers one question: does a code point belong to the set?
//! Sets built from a handful of ASCII characters also expose their bytes as
//! [`Needles`], which lets `accept_until` jump with `memchr` instead of
//! decoding the input one character at a time.

use std::ops::RangeInclusive;

/// A set of code points.
pub trait RuneSet {
    fn contains(&self, c: char) -> bool;

    /// ASCII bytes equivalent to this set, when it has one to three members
    /// that are all ASCII.
    fn needles(&self) -> Option<Needles> {
        None
    }
}

/// Up to three ASCII bytes searched for with `memchr`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Needles {
    One(u8),
    Two(u8, u8),
    Three(u8, u8, u8),
}

impl Needles {
    fn from_chars(chars: impl IntoIterator<Item = char>) -> Option<Self> {
        let mut bytes = [0u8; 3];
        let mut len = 0;
        for c in chars {
            if !c.is_ascii() || len == bytes.len() {
                return None;
            }
            bytes[len] = u8::try_from(c).ok()?;
            len += 1;
        }
        match len {
            1 => Some(Needles::One(bytes[0])),
            2 => Some(Needles::Two(bytes[0], bytes[1])),
            3 => Some(Needles::Three(bytes[0], bytes[1], bytes[2])),
            _ => None,
        }
    }

    /// Offset of the first needle in `haystack`.
    pub fn find(self, haystack: &[u8]) -> Option<usize> {
        match self {
            Needles::One(a) => memchr::memchr(a, haystack),
            Needles::Two(a, b) => memchr::memchr2(a, b, haystack),
            Needles::Three(a, b, c) => memchr::memchr3(a, b, c, haystack),
        }
    }
}

impl RuneSet for char {
    #[inline]
    fn contains(&self, c: char) -> bool {
        *self == c
    }

    fn needles(&self) -> Option<Needles> {
        Needles::from_chars([*self])
    }
}

/// Every character of the string is a member: `"+-"` matches `+` and `-`.
impl RuneSet for &str {
    #[inline]
    fn contains(&self, c: char) -> bool {
        str::contains(self, c)
    }

    fn needles(&self) -> Option<Needles> {
        Needles::from_chars(self.chars())
    }
}

impl RuneSet for &[char] {
    #[inline]
    fn contains(&self, c: char) -> bool {
        <[char]>::contains(self, &c)
    }

    fn needles(&self) -> Option<Needles> {
        Needles::from_chars(self.iter().copied())
    }
}

impl<const N: usize> RuneSet for [char; N] {
    #[inline]
    fn contains(&self, c: char) -> bool {
        <[char]>::contains(self, &c)
    }

    fn needles(&self) -> Option<Needles> {
        Needles::from_chars(self.iter().copied())
    }
}

impl RuneSet for RangeInclusive<char> {
    #[inline]
    fn contains(&self, c: char) -> bool {
        RangeInclusive::contains(self, &c)
    }
}

/// Adapts a predicate such as `char::is_alphanumeric` into a [`RuneSet`].
#[derive(Clone, Copy, Debug)]
pub struct Matching<F>(pub F);

impl<F: Fn(char) -> bool> RuneSet for Matching<F> {
    #[inline]
    fn contains(&self, c: char) -> bool {
        (self.0)(c)
    }
}
