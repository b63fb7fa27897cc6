#![cfg(test)]

// Property tests for Chain kept inside the crate so they can check the
// private link structure after every step.

use crate::chain::Chain;
use crate::error::ChainError;
use proptest::prelude::*;
use std::collections::VecDeque;

#[derive(Clone, Debug)]
enum ChainOp {
    Append(u8),
    Insert(usize, u8),
    RemoveAt(usize),
    Remove(u8),
    At(usize),
    Search(u8),
    PopFront,
    PopBack,
}

fn arb_op() -> impl Strategy<Value = ChainOp> {
    // Small value and index ranges keep duplicates and boundary positions common.
    prop_oneof![
        3 => (0u8..8).prop_map(ChainOp::Append),
        2 => (0usize..12, 0u8..8).prop_map(|(p, v)| ChainOp::Insert(p, v)),
        1 => (0usize..12).prop_map(ChainOp::RemoveAt),
        2 => (0u8..8).prop_map(ChainOp::Remove),
        1 => (0usize..12).prop_map(ChainOp::At),
        1 => (0u8..8).prop_map(ChainOp::Search),
        1 => Just(ChainOp::PopFront),
        1 => Just(ChainOp::PopBack),
    ]
}

// Property: Chain behaves like a VecDeque under random mutation.
// Invariants exercised:
// - Positional access, insert and removal agree with the model, including the
//   `len` boundary for insert and the out-of-range errors.
// - Value removal takes the first match only.
// - head/tail/prev/next stay consistent and `len` equals reachable entries.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_chain_matches_vecdeque(ops in proptest::collection::vec(arb_op(), 1..80)) {
        let mut sut: Chain<u8> = Chain::new();
        let mut model: VecDeque<u8> = VecDeque::new();

        for op in ops {
            let len = model.len();
            match op {
                ChainOp::Append(v) => {
                    sut.append(v);
                    model.push_back(v);
                }
                ChainOp::Insert(p, v) => {
                    let res = sut.insert(p, v);
                    if p <= len {
                        prop_assert!(res.is_ok());
                        model.insert(p, v);
                    } else {
                        prop_assert_eq!(res, Err(ChainError::InvalidPosition { position: p, len }));
                    }
                }
                ChainOp::RemoveAt(i) => {
                    let res = sut.remove_at(i);
                    match model.remove(i) {
                        Some(v) => prop_assert_eq!(res, Ok(v)),
                        None => prop_assert_eq!(res, Err(ChainError::IndexOutOfRange { index: i, len })),
                    }
                }
                ChainOp::Remove(v) => {
                    let res = sut.remove(&v);
                    match model.iter().position(|&x| x == v) {
                        Some(pos) => {
                            model.remove(pos);
                            prop_assert_eq!(res, Ok(v));
                        }
                        None => prop_assert_eq!(res, Err(ChainError::NotFound)),
                    }
                }
                ChainOp::At(i) => {
                    let got = sut.at(i).map(|e| *e.value()).ok();
                    prop_assert_eq!(got, model.get(i).copied());
                }
                ChainOp::Search(v) => {
                    prop_assert_eq!(sut.search(&v).is_some(), model.contains(&v));
                }
                ChainOp::PopFront => prop_assert_eq!(sut.pop_front(), model.pop_front()),
                ChainOp::PopBack => prop_assert_eq!(sut.pop_back(), model.pop_back()),
            }

            sut.assert_links();
            prop_assert_eq!(sut.len(), model.len());
            prop_assert!(sut.iter().eq(model.iter()));
            prop_assert!(sut.iter().rev().eq(model.iter().rev()));
        }
    }
}
