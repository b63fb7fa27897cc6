//! Chain: an ordered, doubly linked sequence backing one hash bucket.
//!
//! Entries live in a per-chain `SlotMap` arena and link to each other by
//! arena key, so splicing never needs raw pointers or shared ownership.
//! Duplicates are permitted here; set semantics are enforced one layer up.

use crate::error::ChainError;
use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Arena key of an entry inside its owning chain.
    struct EntryKey;
}

/// A stored value plus its links to the neighbouring entries.
#[derive(Clone, Debug)]
pub struct Entry<T> {
    value: T,
    prev: Option<EntryKey>,
    next: Option<EntryKey>,
}

impl<T> Entry<T> {
    pub fn value(&self) -> &T {
        &self.value
    }
}

/// Ordered, duplicate-permitting sequence of values for one bucket.
#[derive(Clone)]
pub struct Chain<T> {
    entries: SlotMap<EntryKey, Entry<T>>,
    head: Option<EntryKey>,
    tail: Option<EntryKey>,
}

impl<T> Chain<T> {
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Links `value` after the current tail. O(1).
    pub fn append(&mut self, value: T) {
        let key = self.entries.insert(Entry {
            value,
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(tail) => self.entries[tail].next = Some(key),
            None => self.head = Some(key),
        }
        self.tail = Some(key);
    }

    /// Inserts `value` so that it ends up at `position`.
    ///
    /// `position == len()` appends; anything larger fails with
    /// [`ChainError::InvalidPosition`] and leaves the chain untouched.
    pub fn insert(&mut self, position: usize, value: T) -> Result<(), ChainError> {
        let len = self.len();
        if position == len {
            self.append(value);
            return Ok(());
        }
        let successor = self
            .key_at(position)
            .ok_or(ChainError::InvalidPosition { position, len })?;
        let prev = self.entries[successor].prev;
        let key = self.entries.insert(Entry {
            value,
            prev,
            next: Some(successor),
        });
        self.entries[successor].prev = Some(key);
        match prev {
            Some(p) => self.entries[p].next = Some(key),
            None => self.head = Some(key),
        }
        Ok(())
    }

    /// Entry at zero-based `index`.
    pub fn at(&self, index: usize) -> Result<&Entry<T>, ChainError> {
        self.key_at(index)
            .map(|k| &self.entries[k])
            .ok_or(ChainError::IndexOutOfRange {
                index,
                len: self.len(),
            })
    }

    /// First entry, scanning from the head, whose value equals `q`.
    pub fn search<Q>(&self, q: &Q) -> Option<&Entry<T>>
    where
        T: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.find_by(|v| v.borrow() == q)
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.search(q).is_some()
    }

    /// First entry, scanning from the head, whose value satisfies `pred`.
    pub fn find_by<F>(&self, mut pred: F) -> Option<&Entry<T>>
    where
        F: FnMut(&T) -> bool,
    {
        self.key_where(&mut pred).map(|k| &self.entries[k])
    }

    pub fn remove_at(&mut self, index: usize) -> Result<T, ChainError> {
        let len = self.len();
        self.key_at(index)
            .and_then(|k| self.unlink(k))
            .ok_or(ChainError::IndexOutOfRange { index, len })
    }

    /// Removes the first entry equal to `q`.
    pub fn remove<Q>(&mut self, q: &Q) -> Result<T, ChainError>
    where
        T: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.remove_by(|v| v.borrow() == q)
    }

    /// Removes the first entry whose value satisfies `pred`.
    pub fn remove_by<F>(&mut self, mut pred: F) -> Result<T, ChainError>
    where
        F: FnMut(&T) -> bool,
    {
        self.key_where(&mut pred)
            .and_then(|k| self.unlink(k))
            .ok_or(ChainError::NotFound)
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.head.and_then(|k| self.unlink(k))
    }

    pub fn pop_back(&mut self) -> Option<T> {
        self.tail.and_then(|k| self.unlink(k))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.head = None;
        self.tail = None;
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            entries: &self.entries,
            front: self.head,
            back: self.tail,
            remaining: self.len(),
        }
    }

    // Walks from whichever end is closer to `index`.
    fn key_at(&self, index: usize) -> Option<EntryKey> {
        let len = self.len();
        if index >= len {
            return None;
        }
        if index <= len / 2 {
            let mut cur = self.head;
            for _ in 0..index {
                cur = self.entries[cur?].next;
            }
            cur
        } else {
            let mut cur = self.tail;
            for _ in 0..(len - 1 - index) {
                cur = self.entries[cur?].prev;
            }
            cur
        }
    }

    fn key_where<F>(&self, pred: &mut F) -> Option<EntryKey>
    where
        F: FnMut(&T) -> bool,
    {
        let mut cur = self.head;
        while let Some(k) = cur {
            let entry = &self.entries[k];
            if pred(&entry.value) {
                return Some(k);
            }
            cur = entry.next;
        }
        None
    }

    // Splices `key` out and repairs head/tail and the neighbours' links.
    fn unlink(&mut self, key: EntryKey) -> Option<T> {
        let Entry { value, prev, next } = self.entries.remove(key)?;
        match prev {
            Some(p) => self.entries[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.entries[n].prev = prev,
            None => self.tail = prev,
        }
        Some(value)
    }

    /// Panics if any structural invariant is broken.
    #[cfg(test)]
    pub(crate) fn assert_links(&self) {
        if self.is_empty() {
            assert!(self.head.is_none() && self.tail.is_none());
            return;
        }
        let head = self.head.expect("non-empty chain has a head");
        let tail = self.tail.expect("non-empty chain has a tail");
        assert!(self.entries[head].prev.is_none(), "head.prev must be None");
        assert!(self.entries[tail].next.is_none(), "tail.next must be None");

        let mut reachable = 0;
        let mut prev = None;
        let mut cur = Some(head);
        while let Some(k) = cur {
            let e = &self.entries[k];
            assert_eq!(e.prev, prev, "prev link disagrees with traversal");
            reachable += 1;
            prev = Some(k);
            cur = e.next;
        }
        assert_eq!(prev, Some(tail), "forward walk must end at tail");
        assert_eq!(reachable, self.len(), "len must match reachable entries");
    }
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Chain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Extend<T> for Chain<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.append(value);
        }
    }
}

impl<T> FromIterator<T> for Chain<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut chain = Chain::new();
        chain.extend(iter);
        chain
    }
}

/// Borrowing iterator, head to tail.
pub struct Iter<'a, T> {
    entries: &'a SlotMap<EntryKey, Entry<T>>,
    front: Option<EntryKey>,
    back: Option<EntryKey>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = &self.entries[self.front?];
        self.front = entry.next;
        self.remaining -= 1;
        Some(&entry.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = &self.entries[self.back?];
        self.back = entry.prev;
        self.remaining -= 1;
        Some(&entry.value)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a Chain<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator, head to tail.
pub struct IntoIter<T> {
    chain: Chain<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.chain.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.chain.len(), Some(self.chain.len()))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.chain.pop_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

impl<T> IntoIterator for Chain<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { chain: self }
    }
}
