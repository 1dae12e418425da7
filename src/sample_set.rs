//! SampleSet: dense storage plus a key index, kept consistent across swap-removal.

use crate::error::{AllocFailure, InsertError};
use crate::reentrancy::ReentryCheck;
use allocator_api2::alloc::{Allocator, Global};
use allocator_api2::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::HashTable;
use rand::Rng;
use std::collections::hash_map::RandomState;

#[derive(Debug)]
struct Entry<T> {
    item: T,
    hash: u64,
}

/// A set of unique items that supports O(1) amortized insert, O(1) membership,
/// O(1) amortized removal, and O(1) uniform random selection.
///
/// Items live contiguously in a dense array; a hash index maps each item to
/// its current array slot. Removal fills the vacated slot with the tail item
/// and repoints the relocated item's index entry, so both structures stay in
/// lockstep without ever shifting the array.
///
/// The item is its own key: `T: Eq + Hash` decides uniqueness, and lookups
/// accept any `Q` the item can be borrowed as, like the standard map types.
/// Both sub-structures draw from one injected allocator, and every growth
/// path reports refusal as an error instead of aborting.
pub struct SampleSet<T, S = RandomState, A = Global>
where
    A: Allocator,
{
    hasher: S,
    index: HashTable<usize, A>,
    items: Vec<Entry<T>, A>, // dense storage; slot numbers change on removal
    reentry: ReentryCheck,
}

impl<T> SampleSet<T>
where
    T: Eq + Hash,
{
    /// Empty set with the default hasher in the global allocator.
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    /// Empty set with room for `capacity` items in the global allocator.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, AllocFailure> {
        Self::try_with_capacity_in(capacity, Default::default(), Global)
    }
}

impl<T> Default for SampleSet<T>
where
    T: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A> SampleSet<T, RandomState, A>
where
    T: Eq + Hash,
    A: Allocator + Clone,
{
    /// Empty set with the default hasher in `alloc`.
    pub fn new_in(alloc: A) -> Self {
        Self::with_hasher_in(Default::default(), alloc)
    }
}

impl<T, S> SampleSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    /// Empty set with a caller-supplied hasher in the global allocator.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_hasher_in(hasher, Global)
    }
}

impl<T, S, A> SampleSet<T, S, A>
where
    A: Allocator,
{
    /// Number of live items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items the dense storage can hold before growing again.
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// One uniformly chosen live item, or `None` if the set is empty.
    ///
    /// Draws a slot in `[0, len)` from `rng`; every live item is equally
    /// likely. The statistical quality is the caller's choice of `rng`.
    pub fn choose<R>(&self, rng: &mut R) -> Option<&T>
    where
        R: Rng + ?Sized,
    {
        if self.items.is_empty() {
            return None;
        }
        let slot = rng.gen_range(0..self.items.len());
        Some(&self.items[slot].item)
    }

    /// Item stored at `slot`, or `None` if out of bounds.
    ///
    /// Slots are dense in `[0, len)` but not stable: a removal moves the
    /// tail item into the vacated slot.
    pub fn get(&self, slot: usize) -> Option<&T> {
        self.items.get(slot).map(|e| &e.item)
    }

    /// Iterator over the live items, in unspecified order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            it: self.items.iter(),
        }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Allocator backing both the dense storage and the index.
    pub fn allocator(&self) -> &A {
        self.items.allocator()
    }
}

impl<T, S, A> SampleSet<T, S, A>
where
    T: Eq + Hash,
    S: BuildHasher,
    A: Allocator + Clone,
{
    /// Empty set with a caller-supplied hasher in `alloc`. Does not allocate.
    ///
    /// The allocator is cloned for the second sub-structure; handle-style
    /// allocators must share their memory source across clones.
    pub fn with_hasher_in(hasher: S, alloc: A) -> Self {
        Self {
            hasher,
            index: HashTable::new_in(alloc.clone()),
            items: Vec::new_in(alloc),
            reentry: ReentryCheck::new(),
        }
    }

    /// Empty set with room for `capacity` items on both sides.
    ///
    /// A capacity of zero allocates nothing. On failure neither allocation is
    /// retained.
    pub fn try_with_capacity_in(
        capacity: usize,
        hasher: S,
        alloc: A,
    ) -> Result<Self, AllocFailure> {
        let mut set = Self::with_hasher_in(hasher, alloc);
        set.items
            .try_reserve_exact(capacity)
            .map_err(|_| AllocFailure)?;
        let items = &set.items;
        set.index
            .try_reserve(capacity, |&slot| items[slot].hash)
            .map_err(|_| AllocFailure)?;
        Ok(set)
    }
}

impl<T, S, A> SampleSet<T, S, A>
where
    T: Eq + Hash,
    S: BuildHasher,
    A: Allocator,
{
    fn hash_of<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentry.enter();
        let hash = self.hash_of(q);
        self.index
            .find(hash, |&slot| self.items[slot].item.borrow() == q)
            .is_some()
    }

    /// Add `item` to the set.
    ///
    /// Fails with [`InsertError::DuplicateKey`] if an equal item is present
    /// and with [`InsertError::Alloc`] if either side cannot grow. A failed
    /// insert leaves contents, length, and membership unchanged; the dense
    /// side's capacity may have grown if its reservation succeeded before
    /// the index's failed.
    pub fn insert(&mut self, item: T) -> Result<(), InsertError> {
        let _g = self.reentry.enter();
        let hash = self.hash_of(&item);
        if self
            .index
            .find(hash, |&slot| self.items[slot].item == item)
            .is_some()
        {
            return Err(InsertError::DuplicateKey);
        }

        // Reserve both sides before touching either; past this point neither
        // the push nor the index insert can fail.
        self.items.try_reserve(1).map_err(|_| AllocFailure)?;
        let items = &self.items;
        self.index
            .try_reserve(1, |&slot| items[slot].hash)
            .map_err(|_| AllocFailure)?;

        let slot = self.items.len();
        self.items.push(Entry { item, hash });
        let items = &self.items;
        let _ = self
            .index
            .insert_unique(hash, slot, |&slot| items[slot].hash);
        Ok(())
    }

    /// Remove the item equal to `q`, returning it if it was present.
    ///
    /// Removing an absent item is a no-op, not an error, so independent code
    /// paths may race to remove the same logical entry. The vacated slot is
    /// refilled by the tail item and that item's index entry is repointed;
    /// iteration order is therefore not stable across removals.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentry.enter();
        let hash = self.hash_of(q);
        let Ok(occupied) = self
            .index
            .find_entry(hash, |&slot| self.items[slot].item.borrow() == q)
        else {
            return None;
        };
        let (slot, _) = occupied.remove();

        // The tail item is about to move into `slot`; repoint its index
        // entry first. Probing by slot number keeps this exact even when
        // every live item shares one hash.
        let last = self.items.len() - 1;
        if slot != last {
            let moved = self
                .index
                .find_mut(self.items[last].hash, |&s| s == last)
                .expect("tail item must be indexed");
            *moved = slot;
        }
        Some(self.items.swap_remove(slot).item)
    }

    /// Asserts the cross-structure invariants. Test support.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        assert_eq!(
            self.index.len(),
            self.items.len(),
            "index and storage out of lockstep"
        );
        for &slot in self.index.iter() {
            assert!(slot < self.items.len(), "index holds a stale slot");
        }
        for (slot, entry) in self.items.iter().enumerate() {
            assert_eq!(
                entry.hash,
                self.hasher.hash_one(&entry.item),
                "stored hash disagrees with the hasher"
            );
            assert!(
                self.index.find(entry.hash, |&s| s == slot).is_some(),
                "slot {slot} is not reachable through the index"
            );
        }
    }
}

impl<T, S, A> fmt::Debug for SampleSet<T, S, A>
where
    T: fmt::Debug,
    A: Allocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.items.iter().map(|e| &e.item))
            .finish()
    }
}

/// Iterator over items in a [`SampleSet`].
pub struct Iter<'a, T> {
    it: core::slice::Iter<'a, Entry<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|e| &e.item)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
