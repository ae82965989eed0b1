// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn tags_are_stable_and_distinct() {
    let variants = [
        Determinant::OrderDeterminant { channel_index: 0 },
        Determinant::TimerDeterminant { timer_id: TimerId(0) },
        Determinant::RngDeterminant { value: 0 },
        Determinant::SerializableDeterminant { payload: vec![] },
    ];
    let tags: Vec<u8> = variants.iter().map(Determinant::tag).collect();
    let mut sorted = tags.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), tags.len(), "tags must be pairwise distinct");
}
