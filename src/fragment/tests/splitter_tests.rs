//! Tests for outbound payload splitting and the presentation cycle.

use std::num::NonZeroUsize;

use proptest::prelude::*;
use rstest::rstest;

use crate::fragment::{FragmentCount, Splitter, TransferTag};

fn splitter(capacity: usize) -> Splitter {
    Splitter::new(NonZeroUsize::new(capacity).expect("non-zero capacity"))
}

#[rstest]
#[case(10, 3, vec![3, 3, 3, 1])]
#[case(9, 3, vec![3, 3, 3])]
#[case(1, 3, vec![1])]
#[case(3, 3, vec![3])]
#[case(4, 3, vec![3, 1])]
fn split_produces_ceil_len_over_capacity_fragments(
    #[case] payload_len: usize,
    #[case] capacity: usize,
    #[case] expected_lens: Vec<usize>,
) {
    let payload: Vec<u8> = (0..payload_len).map(|byte| byte as u8).collect();
    let batch = splitter(capacity)
        .split(TransferTag::Direct, &payload)
        .expect("split payload");

    assert_eq!(batch.len(), expected_lens.len());
    let lens: Vec<usize> = batch.fragments().iter().map(|f| f.payload().len()).collect();
    assert_eq!(lens, expected_lens);
}

#[test]
fn fragments_carry_index_order_and_shared_total() {
    let batch = splitter(3)
        .split(TransferTag::Bundle, [0_u8, 1, 2, 3, 4, 5, 6, 7, 8, 9])
        .expect("split payload");

    let total = FragmentCount::from_len(4).expect("positive total");
    for (position, frame) in batch.fragments().iter().enumerate() {
        assert_eq!(frame.header().index().as_usize(), position);
        assert_eq!(frame.header().total(), total);
        assert_eq!(frame.header().tag(), TransferTag::Bundle);
    }
}

#[test]
fn empty_payload_yields_one_empty_fragment() {
    let batch = splitter(16)
        .split(TransferTag::Direct, [])
        .expect("split empty payload");

    assert_eq!(batch.len(), 1);
    assert!(!batch.is_fragmented());
    assert_eq!(batch.fragments()[0].header().total(), FragmentCount::ONE);
    assert!(batch.fragments()[0].payload().is_empty());
}

#[test]
fn cycle_repeats_index_order_indefinitely() {
    let batch = splitter(2)
        .split(TransferTag::Direct, [1_u8, 2, 3, 4, 5])
        .expect("split payload");

    let indices: Vec<u32> = batch
        .cycle()
        .take(8)
        .map(|frame| frame.header().index().get())
        .collect();
    assert_eq!(indices, [0, 1, 2, 0, 1, 2, 0, 1]);
}

proptest! {
    #[test]
    fn concatenating_slices_in_index_order_reproduces_payload(
        payload in proptest::collection::vec(any::<u8>(), 0..256),
        capacity in 1_usize..32,
    ) {
        let batch = splitter(capacity)
            .split(TransferTag::Direct, &payload)
            .expect("split payload");

        let expected = if payload.is_empty() { 1 } else { payload.len().div_ceil(capacity) };
        prop_assert_eq!(batch.len(), expected);

        let mut rebuilt = Vec::new();
        for frame in batch.fragments() {
            rebuilt.extend_from_slice(frame.payload());
        }
        prop_assert_eq!(rebuilt, payload);
    }
}
