//! Keys and the normalization rule that maps any-case keys onto one slot.
//!
//! A key is either an integer or a string. Strings that look exactly like a
//! canonical decimal integer (`"42"`, `"-7"`, but not `"042"`, `"-0"` or
//! `"+1"`) are coerced to integers, so `"42"` and `42` address the same
//! entry. All other strings are compared after folding `A-Z` to `a-z`; no
//! other byte is touched.

use core::fmt;
use core::hash::{Hash, Hasher};

use alloc::boxed::Box;
use alloc::string::String;

use hashbrown::Equivalent;

use crate::error::Error;

/// An owned map key, as it was last written.
///
/// This is the *display* form: iteration hands back exactly the casing used
/// by the most recent write. Use [`Key::from`] rather than building
/// `Key::Str` by hand so that numeric strings are coerced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl Key {
    /// Returns the integer if this is an integer key.
    #[inline]
    pub const fn as_int(&self) -> Option<i64> {
        match *self {
            Key::Int(i) => Some(i),
            Key::Str(_) => None,
        }
    }

    /// Returns the string if this is a string key.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Int(_) => None,
            Key::Str(s) => Some(s),
        }
    }

    /// Applies the numeric-string coercion to a hand-built `Key::Str`.
    #[inline]
    pub(crate) fn canonical(self) -> Self {
        match self {
            Key::Str(s) => Key::from(s),
            int => int,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => fmt::Display::fmt(i, f),
            Key::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Key {
    #[inline]
    fn from(s: &str) -> Self {
        match parse_int_key(s) {
            Some(i) => Key::Int(i),
            None => Key::Str(s.into()),
        }
    }
}

impl From<String> for Key {
    #[inline]
    fn from(s: String) -> Self {
        match parse_int_key(&s) {
            Some(i) => Key::Int(i),
            None => Key::Str(s),
        }
    }
}

impl From<&String> for Key {
    #[inline]
    fn from(s: &String) -> Self {
        Key::from(s.as_str())
    }
}

impl From<char> for Key {
    #[inline]
    fn from(c: char) -> Self {
        match c.to_digit(10) {
            Some(d) => Key::Int(i64::from(d)),
            None => Key::Str(c.into()),
        }
    }
}

macro_rules! int_conversions {
    ($($t:ty),*) => {$(
        impl From<$t> for Key {
            #[inline]
            fn from(i: $t) -> Self {
                Key::Int(i64::from(i))
            }
        }

        impl From<$t> for KeyRef<'_> {
            #[inline]
            fn from(i: $t) -> Self {
                KeyRef(Repr::Int(i64::from(i)))
            }
        }

        impl AsKeyRef for $t {
            #[inline]
            fn as_key_ref(&self) -> Option<KeyRef<'_>> {
                Some(KeyRef::from(*self))
            }
        }
    )*};
}

int_conversions!(i8, i16, i32, i64, u8, u16, u32);

impl TryFrom<u64> for Key {
    type Error = Error;

    #[inline]
    fn try_from(i: u64) -> Result<Self, Self::Error> {
        i64::try_from(i).map(Key::Int).map_err(|_| Error::KeyOutOfRange(i))
    }
}

impl TryFrom<usize> for Key {
    type Error = Error;

    #[inline]
    fn try_from(i: usize) -> Result<Self, Self::Error> {
        // usize is at most 64 bits on every supported target
        Key::try_from(i as u64)
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<i64> for Key {
    fn eq(&self, other: &i64) -> bool {
        self.as_int() == Some(*other)
    }
}

/// A borrowed lookup key.
///
/// Building one applies the numeric-string coercion but never allocates.
#[derive(Debug, Clone, Copy)]
pub struct KeyRef<'a>(Repr<'a>);

#[derive(Debug, Clone, Copy)]
enum Repr<'a> {
    Int(i64),
    Str(&'a str),
}

impl<'a> From<&'a str> for KeyRef<'a> {
    #[inline]
    fn from(s: &'a str) -> Self {
        match parse_int_key(s) {
            Some(i) => KeyRef(Repr::Int(i)),
            None => KeyRef(Repr::Str(s)),
        }
    }
}

impl<'a> From<&'a String> for KeyRef<'a> {
    #[inline]
    fn from(s: &'a String) -> Self {
        KeyRef::from(s.as_str())
    }
}

impl<'a> From<&'a Key> for KeyRef<'a> {
    #[inline]
    fn from(key: &'a Key) -> Self {
        match key {
            Key::Int(i) => KeyRef(Repr::Int(*i)),
            Key::Str(s) => KeyRef::from(s.as_str()),
        }
    }
}

/// Anything the map can be searched with.
///
/// Every read-side operation on the map takes a `Q: AsKeyRef`, so string
/// slices, `&String`, integers of any width and `&Key` can all be passed
/// directly. `None` means the value cannot name any key (an unsigned integer
/// above `i64::MAX`), and the lookup finds nothing.
pub trait AsKeyRef {
    /// Borrows `self` as a lookup key.
    fn as_key_ref(&self) -> Option<KeyRef<'_>>;
}

impl<T: AsKeyRef + ?Sized> AsKeyRef for &T {
    #[inline]
    fn as_key_ref(&self) -> Option<KeyRef<'_>> {
        (**self).as_key_ref()
    }
}

impl AsKeyRef for str {
    #[inline]
    fn as_key_ref(&self) -> Option<KeyRef<'_>> {
        Some(KeyRef::from(self))
    }
}

impl AsKeyRef for String {
    #[inline]
    fn as_key_ref(&self) -> Option<KeyRef<'_>> {
        Some(KeyRef::from(self.as_str()))
    }
}

impl AsKeyRef for Key {
    #[inline]
    fn as_key_ref(&self) -> Option<KeyRef<'_>> {
        Some(KeyRef::from(self))
    }
}

impl AsKeyRef for KeyRef<'_> {
    #[inline]
    fn as_key_ref(&self) -> Option<KeyRef<'_>> {
        Some(*self)
    }
}

impl AsKeyRef for u64 {
    #[inline]
    fn as_key_ref(&self) -> Option<KeyRef<'_>> {
        i64::try_from(*self).ok().map(|i| KeyRef(Repr::Int(i)))
    }
}

impl AsKeyRef for usize {
    #[inline]
    fn as_key_ref(&self) -> Option<KeyRef<'_>> {
        i64::try_from(*self).ok().map(|i| KeyRef(Repr::Int(i)))
    }
}

/// The normalized form of a key, stored in the lookup index.
///
/// String tokens are kept ASCII-lowercased, so derived equality agrees with
/// the folding hash below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Int(i64),
    Str(Box<str>),
}

impl From<KeyRef<'_>> for Token {
    #[inline]
    fn from(key: KeyRef<'_>) -> Self {
        match key.0 {
            Repr::Int(i) => Token::Int(i),
            Repr::Str(s) => Token::Str(s.to_ascii_lowercase().into_boxed_str()),
        }
    }
}

impl Hash for Token {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Token::Int(i) => hash_int(*i, state),
            Token::Str(s) => hash_folded(s, state),
        }
    }
}

impl Hash for KeyRef<'_> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.0 {
            Repr::Int(i) => hash_int(i, state),
            Repr::Str(s) => hash_folded(s, state),
        }
    }
}

impl Equivalent<Token> for KeyRef<'_> {
    #[inline]
    fn equivalent(&self, token: &Token) -> bool {
        match (self.0, token) {
            (Repr::Int(a), Token::Int(b)) => a == *b,
            (Repr::Str(a), Token::Str(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }
}

#[inline]
fn hash_int<H: Hasher>(i: i64, state: &mut H) {
    state.write_u8(0);
    state.write_i64(i);
}

#[inline]
fn hash_folded<H: Hasher>(s: &str, state: &mut H) {
    state.write_u8(1);
    for b in s.bytes() {
        state.write_u8(b.to_ascii_lowercase());
    }
    // 0xff never occurs in UTF-8, so this terminates the string unambiguously
    state.write_u8(0xff);
}

/// Parses `s` as an integer key.
///
/// Accepts an optional `-` followed by decimal digits without a leading zero,
/// within `i64` range. `"0"` qualifies, `"-0"` does not.
pub(crate) fn parse_int_key(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    match digits.as_bytes() {
        [] => return None,
        [b'0'] if digits.len() == s.len() => return Some(0),
        [b'0', ..] => return None,
        bytes if !bytes.iter().all(u8::is_ascii_digit) => return None,
        _ => {}
    }
    s.parse().ok()
}
