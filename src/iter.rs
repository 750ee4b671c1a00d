//! Traversal over a [`CaseInsensitiveMap`](crate::CaseInsensitiveMap).
//!
//! Every traversal walks the linked list of alive slots, so entries come out
//! in insertion order and dead slots are never visited.

use core::fmt;
use core::iter::FusedIterator;

use alloc::vec::Vec;

use crate::{Entry, Key};

/// Borrowing iterator over `(key, value)` pairs in insertion order.
#[derive(Debug)]
pub struct Iter<'a, V> {
    entries: &'a [Entry<V>],
    curr: Option<usize>,
    remaining: usize,
}

impl<'a, V> Iter<'a, V> {
    #[inline]
    pub(crate) fn new(entries: &'a [Entry<V>], head: Option<usize>, len: usize) -> Self {
        Self { entries, curr: head, remaining: len }
    }
}

impl<V> Clone for Iter<'_, V> {
    #[inline]
    fn clone(&self) -> Self {
        Self { entries: self.entries, curr: self.curr, remaining: self.remaining }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a Key, &'a V);

    #[cfg_attr(feature = "inline-more", inline)]
    fn next(&mut self) -> Option<Self::Item> {
        let entry = &self.entries[self.curr?];
        self.curr = entry.next;
        self.remaining -= 1;
        Some((&entry.key, entry.value.as_ref()?))
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {
    #[inline(always)]
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<V> FusedIterator for Iter<'_, V> {}

/// Iterator over the display keys, in insertion order.
#[derive(Debug)]
pub struct Keys<'a, V> {
    inner: Iter<'a, V>,
}

impl<V> Clone for Keys<'_, V> {
    #[inline]
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<'a, V> Keys<'a, V> {
    #[inline]
    pub(crate) fn new(inner: Iter<'a, V>) -> Self {
        Self { inner }
    }
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a Key;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Keys<'_, V> {}
impl<V> FusedIterator for Keys<'_, V> {}

/// Iterator over the values, in insertion order.
#[derive(Debug)]
pub struct Values<'a, V> {
    inner: Iter<'a, V>,
}

impl<V> Clone for Values<'_, V> {
    #[inline]
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<'a, V> Values<'a, V> {
    #[inline]
    pub(crate) fn new(inner: Iter<'a, V>) -> Self {
        Self { inner }
    }
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Values<'_, V> {}
impl<V> FusedIterator for Values<'_, V> {}

/// Owning iterator over `(key, value)` pairs in insertion order.
#[derive(Debug)]
pub struct IntoIter<V> {
    entries: Vec<Entry<V>>,
    curr: Option<usize>,
    remaining: usize,
}

impl<V> IntoIter<V> {
    #[inline]
    pub(crate) fn new(entries: Vec<Entry<V>>, head: Option<usize>, len: usize) -> Self {
        Self { entries, curr: head, remaining: len }
    }
}

impl<V> Iterator for IntoIter<V> {
    type Item = (Key, V);

    #[cfg_attr(feature = "inline-more", inline)]
    fn next(&mut self) -> Option<Self::Item> {
        let entry = &mut self.entries[self.curr?];
        self.curr = entry.next;
        self.remaining -= 1;
        let value = entry.value.take()?;
        let key = core::mem::replace(&mut entry.key, Key::Int(0));
        Some((key, value))
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}
impl<V> FusedIterator for IntoIter<V> {}

/// A restartable cursor over the entries of a map.
///
/// The cursor is either positioned at an entry or exhausted. A new cursor
/// starts at the first entry (or exhausted, for an empty map):
///
/// - [`rewind`](Self::rewind) goes back to the first entry,
/// - [`current`](Self::current) and [`key`](Self::key) read the entry under
///   the cursor, or return `None` once exhausted,
/// - [`move_next`](Self::move_next) advances by one entry,
/// - [`is_valid`](Self::is_valid) is `true` while positioned at an entry.
///
/// Plain iteration is the same walk: rewind, then yield `(key, current)` and
/// advance while valid. The cursor borrows the map, so entries cannot be
/// added or removed mid-walk.
#[derive(Debug)]
pub struct Cursor<'a, V> {
    entries: &'a [Entry<V>],
    head: Option<usize>,
    curr: Option<usize>,
}

impl<'a, V> Cursor<'a, V> {
    #[inline]
    pub(crate) fn new(entries: &'a [Entry<V>], head: Option<usize>) -> Self {
        Self { entries, head, curr: head }
    }

    /// Moves back to the first entry.
    #[inline]
    pub fn rewind(&mut self) {
        self.curr = self.head;
    }

    /// Returns the value under the cursor.
    #[inline]
    pub fn current(&self) -> Option<&'a V> {
        self.entry().and_then(|e| e.value.as_ref())
    }

    /// Returns the display key under the cursor.
    #[inline]
    pub fn key(&self) -> Option<&'a Key> {
        self.entry().map(|e| &e.key)
    }

    /// Advances to the next entry. Does nothing once exhausted.
    #[inline]
    pub fn move_next(&mut self) {
        self.curr = self.entry().and_then(|e| e.next);
    }

    /// Returns `true` while the cursor is positioned at an entry.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.curr.is_some()
    }

    #[inline]
    fn entry(&self) -> Option<&'a Entry<V>> {
        let entries: &'a [Entry<V>] = self.entries;
        entries.get(self.curr?)
    }
}

impl<V> Clone for Cursor<'_, V> {
    #[inline]
    fn clone(&self) -> Self {
        Self { entries: self.entries, head: self.head, curr: self.curr }
    }
}

/// Diagnostic rendering of a map, returned by
/// [`CaseInsensitiveMap::inspect`](crate::CaseInsensitiveMap::inspect).
///
/// Displays one `[key] => value` line per entry, values in `Debug` form.
pub struct Inspect<'a, V> {
    iter: Iter<'a, V>,
}

impl<'a, V> Inspect<'a, V> {
    #[inline]
    pub(crate) fn new(iter: Iter<'a, V>) -> Self {
        Self { iter }
    }
}

impl<V: fmt::Debug> fmt::Display for Inspect<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CaseInsensitiveMap ({}) {{", self.iter.len())?;
        for (key, value) in self.iter.clone() {
            writeln!(f, "  [{key}] => {value:?}")?;
        }
        f.write_str("}")
    }
}

impl<V: fmt::Debug> fmt::Debug for Inspect<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter.clone()).finish()
    }
}
