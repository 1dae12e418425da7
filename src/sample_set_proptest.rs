#![cfg(test)]

// Property tests for SampleSet kept inside the crate so they can assert the
// cross-structure invariants, not just the public surface.

use crate::budget_alloc::BudgetAlloc;
use crate::error::InsertError;
use crate::sample_set::SampleSet;
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::hash::Hasher;

// Item newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize),
    Remove(usize),
    Contains(String),
    Choose,
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            idx.clone().prop_map(OpI::Insert),
            idx.clone().prop_map(OpI::Remove),
            prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            Just(OpI::Choose),
            Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_state_machine<S>(
    mut sut: SampleSet<Key, S>,
    pool: &[String],
    ops: Vec<OpI>,
    seed: u64,
) -> Result<(), TestCaseError>
where
    S: std::hash::BuildHasher,
{
    let mut model: HashSet<Key> = HashSet::new();
    let mut rng = SmallRng::seed_from_u64(seed);

    for op in ops {
        match op {
            OpI::Insert(i) => {
                let k = key_from(pool, i);
                let already = model.contains(&k);
                match sut.insert(k.clone()) {
                    Ok(()) => {
                        prop_assert!(!already, "insert must fail on duplicate");
                        model.insert(k);
                    }
                    Err(InsertError::DuplicateKey) => {
                        prop_assert!(already, "duplicate error only when item exists");
                    }
                    Err(other) => {
                        return Err(TestCaseError::fail(format!("unexpected error: {other}")));
                    }
                }
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                let removed = sut.remove(&k);
                let model_removed = model.take(&k);
                prop_assert_eq!(removed, model_removed, "removal parity with the model");
            }
            OpI::Contains(s) => {
                let has = sut.contains(s.as_str());
                let has_model = model.iter().any(|k| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::Choose => match sut.choose(&mut rng) {
                Some(k) => prop_assert!(model.contains(k), "chosen item must be live"),
                None => prop_assert!(model.is_empty()),
            },
            OpI::Iterate => {
                let s_keys: BTreeSet<_> = sut.iter().cloned().collect();
                let m_keys: BTreeSet<_> = model.iter().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        sut.check_invariants();
    }
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashSet.
// Invariants exercised across random operation sequences:
// - Duplicate items are rejected; `contains` parity for live and absent items.
// - `remove` returns the owned item matching the model and is a no-op when absent.
// - `choose` only ever returns live items; `iter` yields each live item once.
// - `len`/`is_empty` parity and full cross-structure invariants after each op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(), seed in any::<u64>()) {
        let sut: SampleSet<Key> = SampleSet::new();
        run_state_machine(sut, &pool, ops, seed)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
// Under a constant hash every index entry shares one bucket chain, so the
// relocation step after swap-removal can only stay correct by matching on
// slot numbers.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl std::hash::BuildHasher for ConstBuildHasher {
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

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario(), seed in any::<u64>()) {
        let sut: SampleSet<Key, ConstBuildHasher> = SampleSet::with_hasher(ConstBuildHasher);
        run_state_machine(sut, &pool, ops, seed)?;
    }
}

// Property: Allocation failure at any point of an insert is atomic. A failed
// insert changes nothing, keeps the cross-structure invariants, and the same
// insert succeeds once the allocator recovers. Nothing leaks either way.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_insert_failure_is_atomic(
        pool in proptest::collection::vec("[a-z]{1,5}", 0..12),
        budget in 0usize..5,
    ) {
        let alloc = BudgetAlloc::unlimited();
        let mut sut: SampleSet<String, _, BudgetAlloc> =
            SampleSet::new_in(alloc.clone());
        let mut model: HashSet<String> = HashSet::new();
        for k in &pool {
            if model.insert(k.clone()) {
                sut.insert(k.clone()).unwrap();
            }
        }

        // The fresh key sits outside the [a-z] pool alphabet.
        alloc.set_budget(budget);
        match sut.insert("Z0".to_string()) {
            Ok(()) => {
                prop_assert_eq!(sut.len(), model.len() + 1);
                prop_assert!(sut.contains("Z0"));
            }
            Err(InsertError::Alloc(_)) => {
                prop_assert_eq!(sut.len(), model.len());
                prop_assert!(!sut.contains("Z0"));
                for k in &model {
                    prop_assert!(sut.contains(k.as_str()));
                }
                sut.check_invariants();

                // One insert takes at most two fresh blocks, one per side.
                prop_assert!(budget < 2, "insert failed with budget {}", budget);

                alloc.set_budget(usize::MAX);
                sut.insert("Z0".to_string()).unwrap();
                prop_assert_eq!(sut.len(), model.len() + 1);
            }
            Err(other) => {
                return Err(TestCaseError::fail(format!("unexpected error: {other}")));
            }
        }
        sut.check_invariants();

        drop(sut);
        prop_assert_eq!(alloc.live_bytes(), 0);
    }
}
