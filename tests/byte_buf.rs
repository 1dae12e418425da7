// ByteBuf behavior suite (consolidated).
//
// The copy contract under test:
// - a successful copy matches the source in length and content and holds
//   at least the source's capacity;
// - the source is bit-for-bit untouched whether the copy succeeds or not;
// - an empty source copies without allocating;
// - nothing leaks on either path.
use proptest::prelude::*;
use sampleset::{BudgetAlloc, ByteBuf};

// Test: copy of a populated buffer.
// Assumes: the source was built with spare capacity.
// Verifies: length, content, and capacity floor of the copy.
#[test]
fn copy_matches_source() {
    let mut src = ByteBuf::try_with_capacity(64).expect("capacity ok");
    src.append(b"the quick brown fox").expect("append ok");

    let copy = src.try_clone_in(BudgetAlloc::unlimited()).expect("copy ok");
    assert_eq!(copy.len(), src.len());
    assert_eq!(copy.as_slice(), src.as_slice());
    assert!(copy.capacity() >= src.capacity());
}

// Test: copies are independently owned.
// Assumes: nothing.
// Verifies: growing the copy leaves the source untouched.
#[test]
fn copy_is_independent() {
    let src = ByteBuf::from_slice(b"base").expect("copy ok");
    let mut copy = src.try_clone_in(BudgetAlloc::unlimited()).expect("copy ok");
    copy.append(b" extended").expect("append ok");
    assert_eq!(src.as_slice(), b"base");
    assert_eq!(copy.as_slice(), b"base extended");
}

// Test: copy of an empty buffer.
// Assumes: an empty buffer owns no storage.
// Verifies: no allocation happens and the copy is empty.
#[test]
fn empty_copy_allocates_nothing() {
    let src = ByteBuf::new();
    let alloc = BudgetAlloc::new(0);
    let copy = src.try_clone_in(alloc.clone()).expect("empty copy needs no memory");
    assert!(copy.is_empty());
    assert_eq!(alloc.calls(), 0);
}

// Test: allocation failure during copy.
// Assumes: a zero-budget allocator refuses the first request.
// Verifies: the error propagates, the source is untouched, nothing leaks.
#[test]
fn failed_copy_preserves_source() {
    let src = ByteBuf::from_slice(b"precious payload").expect("copy ok");
    let refusing = BudgetAlloc::new(0);
    assert!(src.try_clone_in(refusing.clone()).is_err());
    assert_eq!(src.as_slice(), b"precious payload");
    assert_eq!(refusing.live_bytes(), 0);
}

// Test: incremental growth.
// Assumes: append reserves before writing.
// Verifies: content accumulates in order; drop returns every byte.
#[test]
fn append_grows_and_drop_releases() {
    let alloc = BudgetAlloc::unlimited();
    {
        let mut buf = ByteBuf::new_in(alloc.clone());
        for chunk in [&b"one "[..], b"two ", b"three"] {
            buf.append(chunk).expect("append ok");
        }
        buf.push(b'!').expect("push ok");
        assert_eq!(buf.as_slice(), b"one two three!");
        assert!(alloc.live_bytes() > 0);
    }
    assert_eq!(alloc.live_bytes(), 0);
}

// Property: the copy contract holds for arbitrary content and slack, on
// the success path and the failure path alike.
proptest! {
    #[test]
    fn prop_copy_round_trip(
        content in proptest::collection::vec(any::<u8>(), 0..256),
        slack in 0usize..32,
        budget in 0usize..3,
    ) {
        let mut src = ByteBuf::try_with_capacity(content.len() + slack).unwrap();
        src.append(&content).unwrap();

        let alloc = BudgetAlloc::new(budget);
        match src.try_clone_in(alloc.clone()) {
            Ok(copy) => {
                prop_assert_eq!(copy.len(), src.len());
                prop_assert_eq!(copy.as_slice(), src.as_slice());
                prop_assert!(copy.capacity() >= src.capacity());
                drop(copy);
            }
            Err(_) => {
                // Only possible when the copy actually needed memory the
                // allocator refused to hand out.
                prop_assert!(budget == 0 && src.capacity() > 0);
            }
        }
        prop_assert_eq!(src.as_slice(), content.as_slice());
        prop_assert_eq!(alloc.live_bytes(), 0);
    }
}
