#![doc = include_str!("../README.md")]

#![no_std]

#![warn(
    anonymous_parameters,
    missing_copy_implementations,
    missing_debug_implementations,
    nonstandard_style,
    rust_2018_idioms,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_qualifications,
    variant_size_differences
)]

extern crate alloc;

use core::{fmt, mem};
use core::ops::{Deref, DerefMut};
use core::hash::BuildHasher;

use alloc::vec::Vec;

use hashbrown::{HashMap, DefaultHashBuilder};

mod error;
mod iter;
mod key;
#[cfg(feature = "serde")]
mod serde_impl;

pub use error::{Error, Result};
pub use iter::{Cursor, Inspect, IntoIter, Iter, Keys, Values};
pub use key::{AsKeyRef, Key, KeyRef};

use key::Token;

/// Dead slots are only compacted away once there are more of them than this.
const COMPACT_FLOOR: usize = 16;

/// One slot of a `CaseInsensitiveMap`.
///
/// A slot whose value is `None` is dead: its key was removed, but its token
/// still points here so a later write can reuse the slot.
#[derive(Debug, Clone)]
pub(crate) struct Entry<V> {
    pub(crate) key: Key,
    pub(crate) value: Option<V>,

    // doubly linked list pointers (indexes into entries vec)
    pub(crate) prev: Option<usize>,
    pub(crate) next: Option<usize>
}

impl<V> Deref for Entry<V> {
    type Target = Option<V>;
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<V> DerefMut for Entry<V> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.value
    }
}

impl<V> Entry<V> {
    #[inline(always)]
    const fn new(key: Key, value: V) -> Self {
        let value = Some(value);
        Self { key, value, prev: None, next: None }
    }

    #[inline(always)]
    const fn is_alive(&self) -> bool {
        self.value.is_some()
    }
}

/// An insertion-ordered map whose string keys are ASCII case-insensitive.
///
/// Keys are either integers or strings ([`Key`]). `"Foo"`, `"FOO"` and `"foo"`
/// all address the same entry, and so do `42` and `"42"`. The map remembers the
/// casing of the most recent write and hands it back on iteration, while the
/// entry keeps the position of its first insertion.
///
/// Like an associative array, the map also tracks the next free integer key
/// for [`push`](Self::push). That counter only ever grows, so removing
/// integer keys never causes them to be handed out again.
///
/// # Examples
///
/// ```
/// use case_insensitive_map::CaseInsensitiveMap;
///
/// let mut headers = CaseInsensitiveMap::new();
/// headers.insert("x-frame-options", "DENY");
/// headers.insert("X-FRAME-options", "SAMEORIGIN");
///
/// assert_eq!(headers.get("X-Frame-Options"), Some(&"SAMEORIGIN"));
/// assert_eq!(headers.len(), 1);
/// ```
pub struct CaseInsensitiveMap<V, S = DefaultHashBuilder> {
    index_map: HashMap<Token, usize, S>, // token -> index in entries
    entries: Vec<Entry<V>>, // all slots, alive or dead

    // doubly linked list of alive entries
    head: Option<usize>, // first alive entry
    tail: Option<usize>, // last alive entry

    alive_count: usize,

    // None once i64::MAX has been used as a key
    next_index: Option<i64>,
}

impl<V> CaseInsensitiveMap<V, DefaultHashBuilder> {
    /// Creates an empty `CaseInsensitiveMap`.
    ///
    /// The map is initially created with a capacity of 0, so it will not
    /// allocate until it is first inserted into.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity_and_hasher(0, DefaultHashBuilder::default())
    }

    /// Creates an empty `CaseInsensitiveMap` with the specified capacity.
    ///
    /// The map will be able to hold at least `capacity` elements without
    /// reallocating. If `capacity` is 0, the map will not allocate.
    #[inline]
    pub fn with_capacity(n: usize) -> Self {
        Self::with_capacity_and_hasher(n, DefaultHashBuilder::default())
    }
}

impl<V, S> CaseInsensitiveMap<V, S> {
    /// Creates an empty `CaseInsensitiveMap` using the provided hasher `h`.
    #[inline]
    pub fn with_hasher(h: S) -> Self {
        Self::with_capacity_and_hasher(0, h)
    }

    /// Creates an empty `CaseInsensitiveMap` with the specified initial
    /// capacity `n` and hasher `h`.
    #[inline]
    pub fn with_capacity_and_hasher(n: usize, h: S) -> Self {
        Self {
            index_map: HashMap::with_capacity_and_hasher(n, h),
            entries: Vec::with_capacity(n),
            alive_count: 0,
            head: None,
            tail: None,
            next_index: Some(0),
        }
    }

    /// Returns the number of entries in the map.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.alive_count
    }

    /// Returns `true` if the map contains no entries.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.alive_count == 0
    }

    /// Returns the key the next [`push`](Self::push) will use.
    ///
    /// This is one past the largest integer key ever written, or 0. It is
    /// `None` once `i64::MAX` has been used as a key.
    #[inline]
    pub const fn next_index(&self) -> Option<i64> {
        self.next_index
    }

    /// Returns an iterator over `(key, value)` pairs in insertion order.
    ///
    /// Keys are reported with the casing of their most recent write.
    #[inline]
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(&self.entries, self.head, self.alive_count)
    }

    /// Returns an iterator over the keys in insertion order.
    #[inline]
    pub fn keys(&self) -> Keys<'_, V> {
        Keys::new(self.iter())
    }

    /// Returns an iterator over the values in insertion order.
    #[inline]
    pub fn values(&self) -> Values<'_, V> {
        Values::new(self.iter())
    }

    /// Returns a cursor positioned at the first entry.
    ///
    /// See [`Cursor`] for the `rewind` / `current` / `key` / `move_next` /
    /// `is_valid` protocol. The cursor borrows the map, so the map cannot be
    /// modified while it is alive.
    ///
    /// # Examples
    ///
    /// ```
    /// use case_insensitive_map::CaseInsensitiveMap;
    ///
    /// let map: CaseInsensitiveMap<_> = [("Foo", 1), ("Bar", 2)].into();
    /// let mut cursor = map.cursor();
    ///
    /// assert_eq!(cursor.current(), Some(&1));
    /// cursor.move_next();
    /// assert_eq!(cursor.key().and_then(|k| k.as_str()), Some("Bar"));
    /// cursor.move_next();
    /// assert!(!cursor.is_valid());
    ///
    /// cursor.rewind();
    /// assert_eq!(cursor.current(), Some(&1));
    /// ```
    #[inline]
    pub fn cursor(&self) -> Cursor<'_, V> {
        Cursor::new(&self.entries, self.head)
    }

    /// Returns a read-only view that renders every entry for diagnostics.
    ///
    /// Entries are written one per line as `[key] => value`, in order, using
    /// the display keys. The `Debug` impl shows the same data as a map.
    ///
    /// # Examples
    ///
    /// ```
    /// use case_insensitive_map::CaseInsensitiveMap;
    ///
    /// let mut map = CaseInsensitiveMap::new();
    /// map.insert("Thuna", "2");
    /// map.insert("ThuNA", "3");
    ///
    /// let dump = map.inspect().to_string();
    /// assert!(dump.contains("[ThuNA] => \"3\""));
    /// ```
    #[inline]
    pub fn inspect(&self) -> Inspect<'_, V> {
        Inspect::new(self.iter())
    }

    /// Removes every entry.
    ///
    /// The [`next_index`](Self::next_index) counter is left as is.
    pub fn clear(&mut self) {
        self.index_map.clear();
        self.entries.clear();
        self.head = None;
        self.tail = None;
        self.alive_count = 0;
    }

    /// Removes an entry from the internal linked list.
    #[cfg_attr(feature = "inline-more", inline)]
    fn unlink(&mut self, idx: usize) {
        let entry = &mut self.entries[idx];

        let prev = entry.prev;
        let next = entry.next;

        entry.prev = None;
        entry.next = None;

        if let Some(prev_idx) = prev {
            self.entries[prev_idx].next = next
        } else {
            // this was the head
            self.head = next
        }

        if let Some(next_idx) = next {
            self.entries[next_idx].prev = prev
        } else {
            // this was the tail
            self.tail = prev
        }
    }

    /// Adds an entry to the end of the internal linked list.
    #[cfg_attr(feature = "inline-more", inline)]
    fn link_tail(&mut self, idx: usize) {
        let entry = &mut self.entries[idx];
        entry.prev = self.tail;
        entry.next = None;

        if let Some(tail_idx) = self.tail {
            self.entries[tail_idx].next = Some(idx)
        } else {
            self.head = Some(idx)
        }

        self.tail = Some(idx)
    }

    /// Keeps `next_index` one past the largest integer key seen.
    #[inline]
    fn bump_next_index(&mut self, key: &Key) {
        let (Key::Int(i), Some(next)) = (key, self.next_index) else {
            return
        };
        if *i >= next {
            self.next_index = i.checked_add(1);
            if self.next_index.is_none() {
                log::debug!("integer key {i} written, append counter exhausted");
            }
        }
    }

    /// Drops dead slots, preserving the order of alive entries.
    fn compact(&mut self) {
        let old_len = self.entries.len();
        let mut remap = alloc::vec![None; old_len];
        let mut old_entries: Vec<Option<Entry<V>>> =
            mem::take(&mut self.entries).into_iter().map(Some).collect();

        let mut new_entries: Vec<Entry<V>> = Vec::with_capacity(self.alive_count);
        let mut curr = self.head;
        while let Some(old_idx) = curr {
            let Some(mut entry) = old_entries[old_idx].take() else {
                break
            };
            curr = entry.next;

            let new_idx = new_entries.len();
            entry.prev = new_idx.checked_sub(1);
            entry.next = None;
            if let Some(prev) = entry.prev {
                new_entries[prev].next = Some(new_idx)
            }

            remap[old_idx] = Some(new_idx);
            new_entries.push(entry);
        }

        self.index_map.retain(|_, idx| match remap[*idx] {
            Some(new_idx) => {
                *idx = new_idx;
                true
            }
            None => false,
        });

        self.head = if new_entries.is_empty() { None } else { Some(0) };
        self.tail = new_entries.len().checked_sub(1);
        self.entries = new_entries;

        log::trace!("compacted {old_len} slots down to {}", self.entries.len());
    }

    #[inline]
    fn maybe_compact(&mut self) {
        let dead = self.entries.len() - self.alive_count;
        if dead > COMPACT_FLOOR && dead > self.alive_count {
            self.compact()
        }
    }
}

impl<V, S> CaseInsensitiveMap<V, S>
where
    S: BuildHasher,
{
    /// Inserts a key-value pair into the map.
    ///
    /// If an entry with an equivalent key exists, its value is replaced, its
    /// display key becomes `key`, and it keeps its position. The previous value
    /// is returned. Otherwise the entry is appended at the end.
    ///
    /// Writing an integer key at or above [`next_index`](Self::next_index)
    /// moves the append counter past it.
    ///
    /// # Examples
    ///
    /// ```
    /// use case_insensitive_map::{CaseInsensitiveMap, Key};
    ///
    /// let mut map = CaseInsensitiveMap::new();
    /// assert_eq!(map.insert("Foo", "Bar"), None);
    /// assert_eq!(map.insert("fOO", "baz"), Some("Bar"));
    ///
    /// let (key, value) = map.get_key_value("FOO").unwrap();
    /// assert_eq!(key, &Key::from("fOO"));
    /// assert_eq!(value, &"baz");
    /// ```
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn insert(&mut self, key: impl Into<Key>, value: V) -> Option<V> {
        let key = key.into().canonical();
        self.bump_next_index(&key);

        let existing = self.index_map.get(&KeyRef::from(&key)).copied();
        if let Some(idx) = existing {
            let entry = &mut self.entries[idx];
            entry.key = key;

            let old_value = entry.replace(value);
            if old_value.is_none() {
                // dead slot, link it back as the newest entry
                self.alive_count += 1;
                self.link_tail(idx);
            }
            return old_value
        }

        // append to the end
        let idx = self.entries.len();
        let token = Token::from(KeyRef::from(&key));
        self.entries.push(Entry::new(key, value));
        self.index_map.insert(token, idx);
        self.link_tail(idx);
        self.alive_count += 1;
        None
    }

    /// Appends a value under the next free integer key and returns that key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NextIndexOverflow`] once `i64::MAX` has been used as
    /// a key.
    ///
    /// # Examples
    ///
    /// ```
    /// use case_insensitive_map::CaseInsensitiveMap;
    ///
    /// let mut map = CaseInsensitiveMap::new();
    /// assert_eq!(map.push("Zero"), Ok(0));
    /// assert_eq!(map.push("One"), Ok(1));
    ///
    /// map.remove(1);
    /// assert_eq!(map.push("Two"), Ok(2));
    /// ```
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn push(&mut self, value: V) -> Result<i64> {
        let idx = self.next_index.ok_or(Error::NextIndexOverflow)?;
        self.insert(idx, value);
        Ok(idx)
    }

    /// Returns a reference to the value stored under an equivalent key.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn get<Q: AsKeyRef>(&self, key: Q) -> Option<&V> {
        let idx = self.find(key.as_key_ref()?)?;
        self.entries[idx].value.as_ref()
    }

    /// Returns the display key and value stored under an equivalent key.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn get_key_value<Q: AsKeyRef>(&self, key: Q) -> Option<(&Key, &V)> {
        let idx = self.find(key.as_key_ref()?)?;
        let entry = &self.entries[idx];
        entry.value.as_ref().map(|value| (&entry.key, value))
    }

    /// Returns a mutable reference to the value stored under an equivalent key.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn get_mut<Q: AsKeyRef>(&mut self, key: Q) -> Option<&mut V> {
        let idx = self.find(key.as_key_ref()?)?;
        self.entries[idx].value.as_mut()
    }

    /// Returns `true` if the map contains an entry for an equivalent key.
    #[inline]
    pub fn contains_key<Q: AsKeyRef>(&self, key: Q) -> bool {
        key.as_key_ref().and_then(|key| self.find(key)).is_some()
    }

    /// Removes the entry for an equivalent key, returning its value.
    ///
    /// Removing a missing key does nothing. The entries after the removed one
    /// keep their order, and the append counter is not rewound.
    ///
    /// # Examples
    ///
    /// ```
    /// use case_insensitive_map::CaseInsensitiveMap;
    ///
    /// let mut map = CaseInsensitiveMap::new();
    /// map.insert("Foo", "Bar");
    /// map.insert("Fred", "14343");
    ///
    /// assert_eq!(map.remove("fOO"), Some("Bar"));
    /// assert_eq!(map.remove("foo"), None);
    /// assert_eq!(map.get("FRED"), Some(&"14343"));
    /// ```
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn remove<Q: AsKeyRef>(&mut self, key: Q) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes the entry for an equivalent key, returning its display key and
    /// value.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn remove_entry<Q: AsKeyRef>(&mut self, key: Q) -> Option<(Key, V)> {
        let idx = self.find(key.as_key_ref()?)?;

        let entry = &mut self.entries[idx];
        let value = entry.take()?;
        let key = mem::replace(&mut entry.key, Key::Int(0));

        self.unlink(idx);
        self.alive_count -= 1;
        self.maybe_compact();

        Some((key, value))
    }

    /// Reserves capacity for at least `additional` more entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use case_insensitive_map::CaseInsensitiveMap;
    ///
    /// let mut map = CaseInsensitiveMap::<i32>::new();
    /// map.reserve(100);
    /// ```
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        self.index_map.reserve(additional);
        self.entries.reserve(additional);
    }

    /// Drops the slots of removed entries and releases spare capacity.
    ///
    /// Order and contents are unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use case_insensitive_map::CaseInsensitiveMap;
    ///
    /// let mut map = CaseInsensitiveMap::new();
    /// map.insert("A", 1);
    /// map.insert("B", 2);
    /// map.insert("C", 3);
    /// map.remove("b");
    ///
    /// map.shrink_to_fit();
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map.values().copied().collect::<Vec<_>>(), [1, 3]);
    /// ```
    pub fn shrink_to_fit(&mut self) {
        if self.alive_count != self.entries.len() {
            self.compact();
        }
        self.index_map.shrink_to_fit();
        self.entries.shrink_to_fit();
    }

    /// Finds the slot of an alive entry.
    #[inline]
    fn find(&self, key: KeyRef<'_>) -> Option<usize> {
        let &idx = self.index_map.get(&key)?;
        if self.entries[idx].is_alive() {
            Some(idx)
        } else {
            None
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for CaseInsensitiveMap<V, S>
where
    K: Into<Key>,
    S: Default + BuildHasher,
{
    #[cfg_attr(feature = "inline-more", inline)]
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let mut map = CaseInsensitiveMap::with_capacity_and_hasher(
            iter.size_hint().0,
            S::default()
        );
        iter.for_each(|(k, v)| _ = map.insert(k, v));
        map
    }
}

impl<K, V, S> Extend<(K, V)> for CaseInsensitiveMap<V, S>
where
    K: Into<Key>,
    S: BuildHasher,
{
    #[cfg_attr(feature = "inline-more", inline)]
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        let iter = iter.into_iter();
        let reserve = if self.is_empty() {
            iter.size_hint().0
        } else {
            (iter.size_hint().0 + 1) / 2
        };
        self.reserve(reserve);
        iter.for_each(move |(k, v)| _ = self.insert(k, v));
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for CaseInsensitiveMap<V, DefaultHashBuilder>
where
    K: Into<Key>,
{
    /// Builds a map from an array of pairs, applying each as an `insert`.
    #[inline]
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<V, S> IntoIterator for CaseInsensitiveMap<V, S> {
    type Item = (Key, V);
    type IntoIter = IntoIter<V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.entries, self.head, self.alive_count)
    }
}

impl<'a, V, S> IntoIterator for &'a CaseInsensitiveMap<V, S> {
    type Item = (&'a Key, &'a V);
    type IntoIter = Iter<'a, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V, S> Default for CaseInsensitiveMap<V, S>
where
    S: Default,
{
    #[inline]
    fn default() -> Self {
        Self::with_capacity_and_hasher(0, S::default())
    }
}

impl<V, S> Clone for CaseInsensitiveMap<V, S>
where
    V: Clone,
    S: Clone,
{
    #[inline]
    fn clone(&self) -> Self {
        Self {
            head: self.head,
            tail: self.tail,
            index_map: self.index_map.clone(),
            entries: self.entries.clone(),
            alive_count: self.alive_count,
            next_index: self.next_index,
        }
    }
}

/// Two maps are equal when they hold the same display keys and values in the
/// same order.
impl<V, S> PartialEq for CaseInsensitiveMap<V, S>
where
    V: PartialEq,
{
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().eq(other.iter())
    }
}

impl<V, S> Eq for CaseInsensitiveMap<V, S>
where
    V: Eq,
{
}

impl<V, S> fmt::Debug for CaseInsensitiveMap<V, S>
where
    V: fmt::Debug,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
