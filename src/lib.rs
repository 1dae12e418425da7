//! sampleset: allocator-explicit building blocks for picking random live
//! members of a changing population, built around a dense set with O(1)
//! insert, membership, removal, and uniform random selection.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep a contiguous array of items and a hash index over them in
//!   lockstep across every mutation, so membership checks and removals cost
//!   O(1) while random selection stays a single array access.
//! - Pieces:
//!   - SampleSet<T, S, A>: the core container. Items live densely in a
//!     vector; a hash table maps each item's stored hash to its current
//!     array slot. Both draw from one injected allocator.
//!   - ByteBuf<A>: a companion growable byte buffer with the same fallible
//!     allocation discipline, for embedders whose items are byte payloads.
//!   - BudgetAlloc: a failure-injection allocator that makes out-of-memory
//!     paths testable and proves nothing leaks.
//!
//! Relocation invariant
//! - The index maps every live item to the slot it occupies right now.
//!   Removal overwrites the vacated slot with the tail item, so the tail
//!   item's index entry is repointed before the array shrinks. The index
//!   entry is located by slot number, not by key equality, which keeps the
//!   step exact even when every item hashes to the same bucket.
//!
//! Allocation discipline
//! - Every growth path goes through `try_reserve`; allocator refusal comes
//!   back as an error, never an abort. Multi-step operations reserve all the
//!   room they need before mutating anything, so a failed operation changes
//!   no contents, though an early reservation may leave capacity grown.
//!   Retry after the allocator recovers is always valid.
//! - One allocator instance feeds both sub-structures for the lifetime of a
//!   container; it is cloned once at construction and never swapped.
//!
//! Hasher and rehashing invariants
//! - Each entry stores a precomputed `u64` hash and indexing always uses
//!   the stored hash; `T: Hash` is never invoked after insertion. This
//!   avoids rehash-time calls into user code.
//!
//! Reentrancy policy
//! - Only `T: Eq`/`T: Hash` may run user code inside container operations.
//!   A debug-only check at each guarded entry point panics if that user
//!   code calls back into the same container while its state is mid-update.
//!
//! Notes and non-goals
//! - No internal locking. `&mut self` enforces exclusive mutation at compile
//!   time; wrap the whole container in a lock to share it across threads.
//! - Insertion order is not preserved across removals; iteration order is
//!   unspecified.
//! - Items are immutable once inserted; there is no `get_mut` or `iter_mut`
//!   because an in-place edit could change an item's identity and
//!   desynchronize the index.
//! - `choose` on an empty set returns `None` rather than treating the call
//!   as a precondition violation.
//! - Removing an absent item is a documented no-op, not an error.
//! - No persistence or serialization.

mod budget_alloc;
mod byte_buf;
mod error;
mod reentrancy;
mod sample_set;
mod sample_set_proptest;

// Public surface
pub use budget_alloc::BudgetAlloc;
pub use byte_buf::ByteBuf;
pub use error::{AllocFailure, InsertError};
pub use sample_set::{Iter, SampleSet};
