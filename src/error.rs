//! Error types shared by the crate's containers.

use thiserror::Error;

/// An underlying storage reservation failed.
///
/// Returned whenever the injected allocator declines to grow the dense
/// storage, the key index, or a byte buffer. The failing operation leaves the
/// structure's contents exactly as they were before the call; retrying after
/// freeing memory (or raising a [`BudgetAlloc`](crate::BudgetAlloc) budget) is
/// valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("allocation failure: storage could not be grown")]
pub struct AllocFailure;

/// Failure modes of [`SampleSet::insert`](crate::SampleSet::insert).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InsertError {
    /// An equal item is already present. The set is unchanged and the
    /// rejected item has been dropped.
    #[error("duplicate key: an equal item is already present")]
    DuplicateKey,
    /// Growing one of the sub-structures failed. The set is unchanged.
    #[error(transparent)]
    Alloc(#[from] AllocFailure),
}
