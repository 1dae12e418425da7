//! Failure-injection allocator for exercising fallible-allocation paths.
//!
//! Every container in this crate reports allocator refusal as a recoverable
//! error, and that claim is only worth something if it is tested. A
//! [`BudgetAlloc`] wraps the global allocator and fails cleanly once a call
//! budget is spent, so tests can drive a structure into its out-of-memory
//! paths at any chosen point and then verify nothing leaked.
//!
//! Clones share the same budget and counters. Handing clones of one
//! `BudgetAlloc` to several structures models a single memory source feeding
//! all of them.

use allocator_api2::alloc::{AllocError, Allocator, Global};
use core::alloc::Layout;
use core::cell::Cell;
use core::ptr::NonNull;
use std::rc::Rc;

#[derive(Debug)]
struct BudgetState {
    /// Allocation calls left before the next one fails.
    remaining: Cell<usize>,
    /// Bytes currently allocated and not yet released.
    live_bytes: Cell<usize>,
    /// Total allocation calls that succeeded.
    calls: Cell<usize>,
}

/// Allocator that delegates to [`Global`] until a call budget runs out.
///
/// Each successful `allocate` costs one unit of budget; `deallocate` is free
/// and always forwarded, so a structure can release memory even after the
/// budget is exhausted. [`live_bytes`](Self::live_bytes) tracks outstanding
/// bytes and must read zero once every structure using the allocator has been
/// dropped.
#[derive(Clone, Debug)]
pub struct BudgetAlloc {
    state: Rc<BudgetState>,
}

impl BudgetAlloc {
    /// Allocator that fails after `budget` successful allocation calls.
    pub fn new(budget: usize) -> Self {
        Self {
            state: Rc::new(BudgetState {
                remaining: Cell::new(budget),
                live_bytes: Cell::new(0),
                calls: Cell::new(0),
            }),
        }
    }

    /// Allocator with an effectively inexhaustible budget.
    pub fn unlimited() -> Self {
        Self::new(usize::MAX)
    }

    /// Replace the remaining budget, e.g. to cut off a structure mid-life.
    pub fn set_budget(&self, budget: usize) {
        self.state.remaining.set(budget);
    }

    /// Allocation calls left before the next one fails.
    pub fn remaining(&self) -> usize {
        self.state.remaining.get()
    }

    /// Total allocation calls that have succeeded so far.
    pub fn calls(&self) -> usize {
        self.state.calls.get()
    }

    /// Bytes currently allocated through this allocator and not yet released.
    pub fn live_bytes(&self) -> usize {
        self.state.live_bytes.get()
    }
}

impl Default for BudgetAlloc {
    fn default() -> Self {
        Self::unlimited()
    }
}

unsafe impl Allocator for BudgetAlloc {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        let remaining = self.state.remaining.get();
        if remaining == 0 {
            return Err(AllocError);
        }
        let ptr = Global.allocate(layout)?;
        self.state.remaining.set(remaining - 1);
        self.state.calls.set(self.state.calls.get() + 1);
        self.state
            .live_bytes
            .set(self.state.live_bytes.get() + layout.size());
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.state
            .live_bytes
            .set(self.state.live_bytes.get() - layout.size());
        Global.deallocate(ptr, layout);
    }
}
