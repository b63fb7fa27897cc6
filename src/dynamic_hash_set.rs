//! DynamicHashSet: separate chaining over `Chain` buckets with automatic
//! grow and shrink.
//!
//! Every stored value carries the `u64` hash computed when it was added, and
//! bucket addressing always uses that stored hash. A rehash therefore moves
//! entries between chains without calling `T: Hash` or `T: Eq`, so it cannot
//! be interrupted by user code and the new bucket array is swapped in whole.

use crate::chain::{self, Chain};
use crate::config::SetConfig;
use crate::error::SetError;
use crate::reentrancy::ReentryCheck;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use hashbrown::DefaultHashBuilder;

#[derive(Clone)]
struct Hashed<T> {
    hash: u64,
    value: T,
}

#[inline]
fn bucket_for(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

fn empty_buckets<T>(capacity: usize) -> Vec<Chain<Hashed<T>>> {
    core::iter::repeat_with(Chain::new).take(capacity).collect()
}

/// A hash set that keeps `len / capacity` within a configured band.
///
/// Adding a value that pushes the load factor above
/// `load_factor_threshold` doubles the bucket count; removing one that drops
/// it below `1 - load_factor_threshold` halves it, never going under the
/// initial capacity. Adding a value already present is a no-op, while removing
/// an absent one is an error.
pub struct DynamicHashSet<T, S = DefaultHashBuilder> {
    buckets: Vec<Chain<Hashed<T>>>,
    hasher: S,
    config: SetConfig,
    size: usize,
    reentrancy: ReentryCheck,
}

impl<T> DynamicHashSet<T>
where
    T: Hash + Eq,
{
    /// Creates an empty set with `initial_capacity` buckets.
    ///
    /// Fails unless `initial_capacity > 0` and
    /// `0 < load_factor_threshold < 1`.
    pub fn new(initial_capacity: usize, load_factor_threshold: f64) -> Result<Self, SetError> {
        Self::with_config(SetConfig::new(initial_capacity, load_factor_threshold))
    }

    pub fn with_config(config: SetConfig) -> Result<Self, SetError> {
        Self::with_config_and_hasher(config, DefaultHashBuilder::default())
    }
}

impl<T, S> Default for DynamicHashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<T, S> DynamicHashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty set with the default configuration and `hasher`.
    pub fn with_hasher(hasher: S) -> Self {
        let config = SetConfig::default();
        Self::from_parts(config, hasher)
    }

    pub fn with_config_and_hasher(config: SetConfig, hasher: S) -> Result<Self, SetError> {
        config.validate()?;
        Ok(Self::from_parts(config, hasher))
    }

    fn from_parts(config: SetConfig, hasher: S) -> Self {
        Self {
            buckets: empty_buckets(config.initial_capacity),
            hasher,
            config,
            size: 0,
            reentrancy: ReentryCheck::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Current number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn initial_capacity(&self) -> usize {
        self.config.initial_capacity
    }

    pub fn load_factor_threshold(&self) -> f64 {
        self.config.load_factor_threshold
    }

    pub fn config(&self) -> &SetConfig {
        &self.config
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn load_factor(&self) -> f64 {
        self.size as f64 / self.capacity() as f64
    }

    /// Adds `value` unless an equal value is already present.
    ///
    /// Returns whether the set changed. May rehash every value into a
    /// bucket array twice as large.
    pub fn add(&mut self, value: T) -> bool {
        {
            let _g = self.reentrancy.enter();
            let hash = self.hasher.hash_one(&value);
            let index = bucket_for(hash, self.buckets.len());
            let bucket = &mut self.buckets[index];
            if bucket
                .find_by(|slot| slot.hash == hash && slot.value == value)
                .is_some()
            {
                return false;
            }
            bucket.append(Hashed { hash, value });
        }
        self.size += 1;
        if self.load_factor() > self.config.load_factor_threshold {
            self.resize(self.capacity().saturating_mul(2));
        }
        true
    }

    /// Removes and returns the value equal to `q`.
    ///
    /// Fails with [`SetError::KeyNotFound`] without touching the set when no
    /// such value is stored. May rehash into a bucket array half as large.
    pub fn remove<Q>(&mut self, q: &Q) -> Result<T, SetError>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let removed = {
            let _g = self.reentrancy.enter();
            let hash = self.hasher.hash_one(q);
            let index = bucket_for(hash, self.buckets.len());
            let bucket = &mut self.buckets[index];
            bucket
                .remove_by(|slot| slot.hash == hash && slot.value.borrow() == q)
                .map_err(|_| SetError::KeyNotFound)?
        };
        self.size -= 1;
        if self.capacity() > self.config.initial_capacity
            && self.load_factor() < self.config.shrink_threshold()
        {
            self.resize(self.capacity() / 2);
        }
        Ok(removed.value)
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.hasher.hash_one(q);
        self.buckets[bucket_for(hash, self.buckets.len())]
            .find_by(|slot| slot.hash == hash && slot.value.borrow() == q)
            .is_some()
    }

    /// Drops every value and returns to the initial capacity.
    pub fn clear(&mut self) {
        self.buckets = empty_buckets(self.config.initial_capacity);
        self.size = 0;
    }

    /// Visits values bucket by bucket, each chain head to tail. The order
    /// changes whenever the set resizes.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            buckets: self.buckets.iter(),
            chain: None,
            remaining: self.size,
        }
    }

    // Moves every entry into a freshly built array of `new_capacity` chains
    // using the stored hashes, then installs it. Thresholds are not
    // re-checked here.
    fn resize(&mut self, new_capacity: usize) {
        let new_capacity = new_capacity.max(self.config.initial_capacity);
        let old_capacity = self.capacity();
        if new_capacity == old_capacity {
            return;
        }
        let mut rebuilt = empty_buckets(new_capacity);
        for slot in core::mem::take(&mut self.buckets).into_iter().flatten() {
            rebuilt[bucket_for(slot.hash, new_capacity)].append(slot);
        }
        self.buckets = rebuilt;
        debug_assert_eq!(
            self.size,
            self.buckets.iter().map(Chain::len).sum::<usize>(),
            "rehash must keep every entry"
        );
        tracing::debug!(
            from = old_capacity,
            to = new_capacity,
            len = self.size,
            "rehashed bucket array"
        );
    }

    /// Panics if `size` or any value's bucket placement is inconsistent.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        assert!(self.capacity() >= self.config.initial_capacity);
        let mut total = 0;
        for (index, chain) in self.buckets.iter().enumerate() {
            chain.assert_links();
            total += chain.len();
            for slot in chain.iter() {
                assert_eq!(bucket_for(slot.hash, self.capacity()), index);
                assert_eq!(self.hasher.hash_one(&slot.value), slot.hash);
            }
        }
        assert_eq!(total, self.size, "size must equal the sum of chain lengths");
    }

    #[cfg(test)]
    pub(crate) fn chain_lengths(&self) -> Vec<usize> {
        self.buckets.iter().map(Chain::len).collect()
    }
}

impl<T, S> Clone for DynamicHashSet<T, S>
where
    T: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            hasher: self.hasher.clone(),
            config: self.config,
            size: self.size,
            reentrancy: ReentryCheck::new(),
        }
    }
}

impl<T, S> PartialEq for DynamicHashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|v| other.contains(v))
    }
}

impl<T, S> Eq for DynamicHashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

impl<T, S> fmt::Debug for DynamicHashSet<T, S>
where
    T: fmt::Debug + Hash + Eq,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Renders `{a, b, c}` in iteration order.
impl<T, S> fmt::Display for DynamicHashSet<T, S>
where
    T: fmt::Display + Hash + Eq,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(value, f)?;
        }
        f.write_str("}")
    }
}

impl<T, S> Extend<T> for DynamicHashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<T, S> FromIterator<T> for DynamicHashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

/// Borrowing iterator over a set.
pub struct Iter<'a, T> {
    buckets: core::slice::Iter<'a, Chain<Hashed<T>>>,
    chain: Option<chain::Iter<'a, Hashed<T>>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(slot) = self.chain.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some(&slot.value);
            }
            self.chain = Some(self.buckets.next()?.iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<'a, T, S> IntoIterator for &'a DynamicHashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator over a set.
pub struct IntoIter<T> {
    inner: core::iter::Flatten<std::vec::IntoIter<Chain<Hashed<T>>>>,
    remaining: usize,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let slot = self.inner.next()?;
        self.remaining -= 1;
        Some(slot.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

impl<T, S> IntoIterator for DynamicHashSet<T, S> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.buckets.into_iter().flatten(),
            remaining: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::hash::Hasher;

    /// Hashes integers to themselves so bucket placement is predictable.
    #[derive(Clone, Default)]
    struct IdentityBuildHasher;
    #[derive(Default)]
    struct IdentityHasher(u64);
    impl BuildHasher for IdentityBuildHasher {
        type Hasher = IdentityHasher;
        fn build_hasher(&self) -> Self::Hasher {
            IdentityHasher::default()
        }
    }
    impl Hasher for IdentityHasher {
        fn write(&mut self, bytes: &[u8]) {
            for &b in bytes {
                self.0 = (self.0 << 8) | u64::from(b);
            }
        }
        fn write_i32(&mut self, n: i32) {
            self.0 = n as u64;
        }
        fn finish(&self) -> u64 {
            self.0
        }
    }

    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        }
    }

    fn default_set() -> DynamicHashSet<i32> {
        DynamicHashSet::default()
    }

    /// Invariant: a fresh set is empty at its initial capacity.
    #[test]
    fn fresh_set_is_empty() {
        let s = default_set();
        assert!(s.is_empty());
        assert_eq!(s.capacity(), 10);
        assert_eq!(s.initial_capacity(), 10);
        assert_eq!(s.load_factor_threshold(), 0.75);
        s.assert_invariants();
    }

    /// Invariant: construction rejects a zero capacity or an out-of-range threshold.
    #[test]
    fn new_validates_config() {
        assert_eq!(
            DynamicHashSet::<i32>::new(0, 0.75).err(),
            Some(SetError::InvalidCapacity)
        );
        assert!(matches!(
            DynamicHashSet::<i32>::new(4, 1.0),
            Err(SetError::InvalidLoadFactor { .. })
        ));
        let s = DynamicHashSet::<i32>::new(4, 0.5).unwrap();
        assert_eq!(s.capacity(), 4);
    }

    /// Invariant: repeated adds of one value change nothing after the first.
    #[test]
    fn duplicate_add_is_noop() {
        let mut s = default_set();
        assert!(s.add(1));
        assert!(!s.add(1));
        assert_eq!(s.len(), 1);
        s.assert_invariants();
    }

    /// Invariant: size tracks adds and removes.
    #[test]
    fn size_follows_mutations() {
        let mut s = default_set();
        s.add(1);
        s.add(2);
        assert_eq!(s.len(), 2);
        assert_eq!(s.remove(&1), Ok(1));
        assert_eq!(s.remove(&2), Ok(2));
        assert_eq!(s.len(), 0);
        s.assert_invariants();
    }

    /// Invariant: removing an absent key errors and leaves the set unchanged.
    #[test]
    fn remove_absent_is_error() {
        let mut s = default_set();
        assert_eq!(s.remove(&1), Err(SetError::KeyNotFound));
        s.add(2);
        assert_eq!(s.remove(&1), Err(SetError::KeyNotFound));
        assert_eq!(s.len(), 1);
        assert!(s.contains(&2));
    }

    /// Invariant: the 8th add at capacity 10 (load 0.8) doubles the capacity.
    #[test]
    fn grows_past_threshold() {
        let mut s = default_set();
        for i in 0..7 {
            s.add(i);
        }
        assert_eq!(s.capacity(), 10);
        s.add(7);
        assert_eq!(s.capacity(), 20);
        for i in 0..8 {
            assert!(s.contains(&i));
        }
        s.assert_invariants();
    }

    /// Invariant: 16 distinct adds grow twice, to capacity 40.
    #[test]
    fn grows_twice() {
        let mut s = default_set();
        for i in 0..16 {
            s.add(i);
            s.assert_invariants();
        }
        assert_eq!(s.capacity(), 40);
        assert_eq!(s.len(), 16);
    }

    /// Invariant: load 0.25 does not shrink; dropping below it halves capacity.
    #[test]
    fn shrinks_below_low_water_mark() {
        let mut s = default_set();
        for i in 0..8 {
            s.add(i);
        }
        assert_eq!(s.capacity(), 20);
        for i in 0..3 {
            s.remove(&i).unwrap();
        }
        // 5 / 20 is exactly 0.25, which is not below the mark.
        assert_eq!(s.capacity(), 20);
        s.remove(&3).unwrap();
        assert_eq!(s.capacity(), 10);
        s.assert_invariants();
    }

    /// Invariant: capacity never drops under the initial capacity.
    #[test]
    fn never_shrinks_below_initial() {
        let mut s = default_set();
        for i in 0..40 {
            s.add(i);
        }
        for i in 0..40 {
            s.remove(&i).unwrap();
            assert!(s.capacity() >= 10);
            s.assert_invariants();
        }
        assert_eq!(s.capacity(), 10);
        assert!(s.is_empty());
    }

    /// Invariant: an odd capacity halves with floor, clamped at the initial one.
    #[test]
    fn shrink_clamps_to_initial_capacity() {
        let mut s: DynamicHashSet<i32> = DynamicHashSet::new(3, 0.75).unwrap();
        for i in 0..3 {
            s.add(i);
        }
        assert_eq!(s.capacity(), 6);
        s.remove(&0).unwrap();
        s.remove(&1).unwrap();
        // 1 / 6 < 0.25, and 6 / 2 == 3 is the floor.
        assert_eq!(s.capacity(), 3);
        s.assert_invariants();
    }

    /// Invariant: all values colliding into one bucket stay distinct and removable.
    #[test]
    fn full_collision_chain() {
        let mut s: DynamicHashSet<i32, ConstBuildHasher> = DynamicHashSet::default();
        for i in 0..20 {
            s.add(i);
        }
        assert_eq!(s.len(), 20);
        let lengths = s.chain_lengths();
        assert_eq!(lengths[0], 20);
        assert!(lengths[1..].iter().all(|&n| n == 0));
        assert_eq!(s.remove(&7), Ok(7));
        assert!(!s.contains(&7));
        assert!(s.contains(&8));
        s.assert_invariants();
    }

    /// Invariant: each value sits in bucket `hash mod capacity`.
    #[test]
    fn identity_hash_places_values() {
        let mut s: DynamicHashSet<i32, IdentityBuildHasher> = DynamicHashSet::default();
        s.add(3);
        s.add(13);
        s.add(4);
        let lengths = s.chain_lengths();
        assert_eq!(lengths[3], 2);
        assert_eq!(lengths[4], 1);
    }

    /// Invariant: display is `{}` when empty and lists values in bucket order.
    #[test]
    fn display_in_bucket_order() {
        let mut s: DynamicHashSet<i32, IdentityBuildHasher> = DynamicHashSet::default();
        assert_eq!(s.to_string(), "{}");
        s.add(1);
        assert_eq!(s.to_string(), "{1}");
        s.add(2);
        s.add(3);
        assert_eq!(s.to_string(), "{1, 2, 3}");
        assert_eq!(format!("{:?}", s), "{1, 2, 3}");
    }

    /// Invariant: borrowed lookup works (store `String`, query with `&str`).
    #[test]
    fn borrowed_lookup_with_str() {
        let mut s: DynamicHashSet<String> = DynamicHashSet::default();
        s.add("hello".to_string());
        assert!(s.contains("hello"));
        assert!(!s.contains("world"));
        assert_eq!(s.remove("hello").unwrap(), "hello");
        assert!(s.is_empty());
    }

    /// Invariant: clear drops everything and restores the initial capacity.
    #[test]
    fn clear_resets_capacity() {
        let mut s = default_set();
        s.extend(0..30);
        assert!(s.capacity() > 10);
        s.clear();
        assert!(s.is_empty());
        assert_eq!(s.capacity(), 10);
        s.assert_invariants();
        assert!(s.add(5));
    }

    /// Invariant: iteration yields each value once, borrowed or owned.
    #[test]
    fn iteration_yields_each_value_once() {
        let s: DynamicHashSet<i32> = (0..25).chain(0..25).collect();
        assert_eq!(s.len(), 25);
        let mut seen: Vec<i32> = s.iter().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..25).collect::<Vec<_>>());
        assert_eq!(s.iter().len(), 25);

        let mut owned: Vec<i32> = s.into_iter().collect();
        owned.sort_unstable();
        assert_eq!(owned, (0..25).collect::<Vec<_>>());
    }

    /// Invariant: equality ignores bucket layout and insertion order.
    #[test]
    fn equality_is_membership() {
        let a: DynamicHashSet<i32> = (0..10).collect();
        let mut b = DynamicHashSet::new(2, 0.9).unwrap();
        for i in (0..10).rev() {
            b.add(i);
        }
        // Different hashers and capacities, same members.
        assert_eq!(a.len(), b.len());
        assert!(a.iter().all(|v| b.contains(v)));
        assert_ne!(a.capacity(), b.capacity());
        assert_eq!(a, b);
        let c = a.clone();
        assert_eq!(a, c);
        b.remove(&0).unwrap();
        assert!(!b.contains(&0));
        assert_ne!(a, b);
        b.add(0);
        assert_eq!(a, b);
    }

    /// Invariant (debug-only): `Eq` that reaches back into the set panics
    /// instead of observing it mid-update.
    #[cfg(debug_assertions)]
    #[test]
    fn reentrancy_panics_from_eq_during_contains() {
        use std::cell::Cell;

        struct ReentryKey {
            id: u32,
            set: Cell<*const DynamicHashSet<ReentryKey, ConstBuildHasher>>,
        }
        impl PartialEq for ReentryKey {
            fn eq(&self, other: &Self) -> bool {
                let set = other.set.get();
                if !set.is_null() {
                    // Re-enter the set that is currently probing.
                    unsafe {
                        let _ = (*set).contains(self);
                    }
                }
                self.id == other.id
            }
        }
        impl Eq for ReentryKey {}
        impl Hash for ReentryKey {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }

        let mut s: DynamicHashSet<ReentryKey, ConstBuildHasher> = DynamicHashSet::default();
        s.add(ReentryKey {
            id: 1,
            set: Cell::new(core::ptr::null()),
        });
        let query = ReentryKey {
            id: 2,
            set: Cell::new(&s as *const _),
        };
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = s.contains(&query);
        }));
        assert!(res.is_err(), "expected reentrancy to panic in debug builds");
    }
}
