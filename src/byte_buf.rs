//! Growable byte buffer with fallible growth.
//!
//! A thin wrapper over a byte vector that routes every growth through
//! `try_reserve`, so running out of memory surfaces as an [`AllocFailure`]
//! instead of an abort. The buffer is allocator-explicit: `_in` constructors
//! take the allocator that owns the backing storage, and
//! [`try_clone_in`](ByteBuf::try_clone_in) can target a different allocator
//! than the source's.

use crate::error::AllocFailure;
use allocator_api2::alloc::{Allocator, Global};
use allocator_api2::vec::Vec;
use core::fmt;

/// Contiguous, growable run of bytes.
///
/// All fallible operations leave the buffer unchanged on failure, and a
/// failed copy leaves the *source* bit-for-bit intact as well.
pub struct ByteBuf<A: Allocator = Global> {
    bytes: Vec<u8, A>,
}

impl ByteBuf {
    /// Empty buffer in the global allocator. Does not allocate.
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// Empty buffer with room for `capacity` bytes in the global allocator.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, AllocFailure> {
        Self::try_with_capacity_in(capacity, Global)
    }

    /// Buffer holding a copy of `src`, in the global allocator.
    pub fn from_slice(src: &[u8]) -> Result<Self, AllocFailure> {
        Self::from_slice_in(src, Global)
    }
}

impl Default for ByteBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> ByteBuf<A> {
    /// Empty buffer in `alloc`. Does not allocate.
    pub fn new_in(alloc: A) -> Self {
        Self {
            bytes: Vec::new_in(alloc),
        }
    }

    /// Empty buffer with room for `capacity` bytes in `alloc`.
    ///
    /// A capacity of zero allocates nothing.
    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self, AllocFailure> {
        let mut bytes = Vec::new_in(alloc);
        bytes.try_reserve_exact(capacity).map_err(|_| AllocFailure)?;
        Ok(Self { bytes })
    }

    /// Buffer holding a copy of `src`, in `alloc`.
    ///
    /// Allocates exactly `src.len()` bytes; an empty source allocates
    /// nothing.
    pub fn from_slice_in(src: &[u8], alloc: A) -> Result<Self, AllocFailure> {
        let mut buf = Self::try_with_capacity_in(src.len(), alloc)?;
        buf.bytes.extend_from_slice(src);
        Ok(buf)
    }

    /// Independently-owned copy of this buffer, backed by `alloc`.
    ///
    /// On success the copy has this buffer's length and content and at least
    /// its capacity. On failure nothing is allocated and `self` is untouched
    /// either way.
    pub fn try_clone_in<B: Allocator>(&self, alloc: B) -> Result<ByteBuf<B>, AllocFailure> {
        let mut bytes = Vec::new_in(alloc);
        bytes
            .try_reserve_exact(self.bytes.capacity())
            .map_err(|_| AllocFailure)?;
        bytes.extend_from_slice(&self.bytes);
        Ok(ByteBuf { bytes })
    }

    /// Append one byte, growing if needed.
    pub fn push(&mut self, byte: u8) -> Result<(), AllocFailure> {
        self.bytes.try_reserve(1).map_err(|_| AllocFailure)?;
        self.bytes.push(byte);
        Ok(())
    }

    /// Append a run of bytes, growing at most once.
    pub fn append(&mut self, data: &[u8]) -> Result<(), AllocFailure> {
        self.bytes.try_reserve(data.len()).map_err(|_| AllocFailure)?;
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    /// Number of initialized bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes the buffer can hold before growing again.
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Drop all content, keeping the backing storage.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Allocator backing this buffer.
    pub fn allocator(&self) -> &A {
        self.bytes.allocator()
    }
}

impl<A: Allocator> AsRef<[u8]> for ByteBuf<A> {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl<A: Allocator> fmt::Debug for ByteBuf<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuf")
            .field("len", &self.bytes.len())
            .field("capacity", &self.bytes.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::ByteBuf;
    use crate::budget_alloc::BudgetAlloc;

    #[test]
    fn new_is_empty_without_allocating() {
        let alloc = BudgetAlloc::new(0);
        let buf = ByteBuf::new_in(alloc);
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 0);
        assert_eq!(buf.allocator().calls(), 0);
    }

    /// Invariant: a zero-capacity request performs no allocation.
    #[test]
    fn zero_capacity_allocates_nothing() {
        let alloc = BudgetAlloc::new(0);
        let buf = ByteBuf::try_with_capacity_in(0, alloc.clone()).unwrap();
        assert_eq!(buf.capacity(), 0);
        assert_eq!(alloc.calls(), 0);
    }

    #[test]
    fn from_slice_copies_content() {
        let buf = ByteBuf::from_slice(b"foobar").unwrap();
        assert_eq!(buf.len(), 6);
        assert_eq!(buf.as_slice(), b"foobar");
    }

    /// Invariant: an empty source clones to an empty buffer with no allocation.
    #[test]
    fn clone_of_empty_allocates_nothing() {
        let src = ByteBuf::new();
        let alloc = BudgetAlloc::new(0);
        let copy = src.try_clone_in(alloc.clone()).unwrap();
        assert!(copy.is_empty());
        assert_eq!(alloc.calls(), 0);
    }

    #[test]
    fn clone_matches_source_and_keeps_capacity() {
        let mut src = ByteBuf::try_with_capacity(32).unwrap();
        src.append(b"abc").unwrap();
        let copy = src.try_clone_in(allocator_api2::alloc::Global).unwrap();
        assert_eq!(copy.as_slice(), src.as_slice());
        assert!(copy.capacity() >= src.capacity());
    }

    /// Invariant: a failed clone leaves the source bit-for-bit intact.
    #[test]
    fn failed_clone_leaves_source_intact() {
        let src = ByteBuf::from_slice(b"payload").unwrap();
        let refusing = BudgetAlloc::new(0);
        assert!(src.try_clone_in(refusing.clone()).is_err());
        assert_eq!(src.as_slice(), b"payload");
        assert_eq!(refusing.live_bytes(), 0);
    }

    #[test]
    fn push_and_append_grow() {
        let mut buf = ByteBuf::new();
        buf.push(b'a').unwrap();
        buf.append(b"bc").unwrap();
        assert_eq!(buf.as_slice(), b"abc");
        buf.clear();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 3);
    }

    /// Invariant: a failed append changes neither content nor length.
    #[test]
    fn failed_append_is_a_noop() {
        let alloc = BudgetAlloc::unlimited();
        let mut buf = ByteBuf::from_slice_in(b"xy", alloc.clone()).unwrap();
        alloc.set_budget(0);
        assert!(buf.append(b"zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz").is_err());
        assert_eq!(buf.as_slice(), b"xy");
        alloc.set_budget(usize::MAX);
        buf.append(b"z").unwrap();
        assert_eq!(buf.as_slice(), b"xyz");
    }

    #[test]
    fn drop_releases_backing_storage() {
        let alloc = BudgetAlloc::unlimited();
        {
            let mut buf = ByteBuf::new_in(alloc.clone());
            buf.append(&[0u8; 256]).unwrap();
            assert!(alloc.live_bytes() >= 256);
        }
        assert_eq!(alloc.live_bytes(), 0);
    }
}
