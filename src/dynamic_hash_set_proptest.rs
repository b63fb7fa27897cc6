#![cfg(test)]

// Property tests for DynamicHashSet kept inside the crate so they can verify
// bucket placement and chain structure, not only the public view.

use crate::config::SetConfig;
use crate::dynamic_hash_set::DynamicHashSet;
use crate::error::SetError;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum SetOp {
    Add(u16),
    Remove(u16),
    Contains(u16),
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (usize, f64, Vec<SetOp>)> {
    // A narrow key range forces duplicate adds and removes of absent keys.
    let op = prop_oneof![
        6 => (0u16..64).prop_map(SetOp::Add),
        4 => (0u16..64).prop_map(SetOp::Remove),
        2 => (0u16..64).prop_map(SetOp::Contains),
        1 => Just(SetOp::Clear),
    ];
    (
        1usize..=16,
        0.05f64..0.95,
        proptest::collection::vec(op, 1..200),
    )
}

// Property: State-machine equivalence against hashbrown::HashSet.
// Invariants exercised across random operation sequences:
// - `add` returns true exactly when the key was absent; `len` counts distinct keys.
// - `remove` of an absent key is `KeyNotFound` and changes nothing.
// - `contains` parity with the model.
// - `len` equals the sum of chain lengths and every value sits in
//   `hash mod capacity`, before and after each resize.
// - Capacity never drops below the initial capacity, and only changes by
//   one doubling or one halving per operation.
proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((initial, threshold, ops) in arb_scenario()) {
        let config = SetConfig::new(initial, threshold);
        let mut sut: DynamicHashSet<u16> = DynamicHashSet::with_config(config).unwrap();
        let mut model: hashbrown::HashSet<u16> = hashbrown::HashSet::new();

        for op in ops {
            let before = sut.capacity();
            match op {
                SetOp::Add(k) => {
                    prop_assert_eq!(sut.add(k), model.insert(k));
                    let cap = sut.capacity();
                    prop_assert!(cap == before || cap == before * 2);
                    if cap == before * 2 {
                        prop_assert!(model.len() as f64 / before as f64 > threshold);
                    }
                }
                SetOp::Remove(k) => {
                    let res = sut.remove(&k);
                    if model.remove(&k) {
                        prop_assert_eq!(res, Ok(k));
                    } else {
                        prop_assert_eq!(res, Err(SetError::KeyNotFound));
                        prop_assert_eq!(sut.capacity(), before);
                    }
                    let cap = sut.capacity();
                    prop_assert!(cap == before || cap == (before / 2).max(initial));
                }
                SetOp::Contains(k) => {
                    prop_assert_eq!(sut.contains(&k), model.contains(&k));
                }
                SetOp::Clear => {
                    sut.clear();
                    model.clear();
                    prop_assert_eq!(sut.capacity(), initial);
                }
            }

            sut.assert_invariants();
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.chain_lengths().iter().sum::<usize>(), model.len());
            prop_assert!(sut.capacity() >= initial);
        }

        let mut seen: Vec<u16> = sut.iter().copied().collect();
        let mut expected: Vec<u16> = model.into_iter().collect();
        seen.sort_unstable();
        expected.sort_unstable();
        prop_assert_eq!(seen, expected);
    }
}

// Property: adding n distinct values from an empty default set leaves the
// load factor at or below the threshold, and the capacity is the smallest
// doubling of the initial one that satisfies it.
proptest! {
    #[test]
    fn prop_growth_is_minimal(n in 0usize..300) {
        let mut s: DynamicHashSet<usize> = DynamicHashSet::default();
        for i in 0..n {
            s.add(i);
        }
        let mut expected = 10usize;
        let mut len = 0usize;
        for _ in 0..n {
            len += 1;
            if len as f64 / expected as f64 > 0.75 {
                expected *= 2;
            }
        }
        prop_assert_eq!(s.capacity(), expected);
        prop_assert!(s.load_factor() <= 0.75);
    }
}
