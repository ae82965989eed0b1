// SPDX-License-Identifier: MIT

use super::*;
use causalrt_core::Buffer;

fn buf(n: u8) -> Buffer {
    Buffer::new_payload(vec![n; 4])
}

#[test]
fn log_preserves_dispatch_order() {
    let mut log = InFlightLog::new();
    log.log(EpochId(0), buf(1), false);
    log.log(EpochId(0), buf(2), false);
    let mut iter = log.get_in_flight_iterator().unwrap();
    assert_eq!(iter.next().unwrap().data(), &[1, 1, 1, 1]);
    assert_eq!(iter.next().unwrap().data(), &[2, 2, 2, 2]);
    assert!(!iter.has_next());
}

// S1: single epoch, no failure — checkpoint complete drains the log to zero.
#[test]
fn checkpoint_complete_drains_whole_epoch() {
    let mut log = InFlightLog::new();
    for i in 0..3 {
        log.log(EpochId(1), buf(i), false);
    }
    assert_eq!(log.len(), 3);
    log.notify_downstream_checkpoint_complete(3);
    assert_eq!(log.len(), 0);
    assert_eq!(log.last_acked_epoch(), Some(EpochId(1)));
}

#[test]
fn checkpoint_complete_drops_refcounts_to_zero() {
    let mut log = InFlightLog::new();
    let buffer = buf(9);
    assert_eq!(buffer.strong_count(), 1);
    log.log(EpochId(0), buffer.clone(), false);
    assert_eq!(buffer.strong_count(), 2);
    log.notify_downstream_checkpoint_complete(1);
    assert_eq!(buffer.strong_count(), 1);
}

#[test]
fn partial_ack_does_not_advance_watermark_mid_epoch() {
    let mut log = InFlightLog::new();
    log.log(EpochId(2), buf(1), false);
    log.log(EpochId(2), buf(2), false);
    log.log(EpochId(2), buf(3), false);
    log.notify_downstream_checkpoint_complete(2);
    assert_eq!(log.len(), 1);
    assert_eq!(log.last_acked_epoch(), None);
}

// Requesting more than the oldest epoch holds must not spill into the next
// un-acknowledged epoch's own buffers.
#[test]
fn ack_does_not_spill_past_oldest_epoch_boundary() {
    let mut log = InFlightLog::new();
    log.log(EpochId(1), buf(1), false);
    log.log(EpochId(1), buf(2), false);
    log.log(EpochId(2), buf(3), false);
    log.log(EpochId(2), buf(4), false);
    log.log(EpochId(2), buf(5), false);

    log.notify_downstream_checkpoint_complete(5);

    assert_eq!(log.len(), 3);
    assert_eq!(log.last_acked_epoch(), Some(EpochId(1)));
    let mut iter = log.get_in_flight_iterator().unwrap();
    assert_eq!(iter.next().unwrap().data(), &[3, 3, 3, 3]);
    assert_eq!(iter.next().unwrap().data(), &[4, 4, 4, 4]);
    assert_eq!(iter.next().unwrap().data(), &[5, 5, 5, 5]);
}

#[test]
fn append_after_close_is_ignored() {
    let mut log = InFlightLog::new();
    log.close();
    log.log(EpochId(0), buf(1), false);
    assert!(log.is_empty());
}

#[test]
fn iterator_after_close_is_empty() {
    let mut log = InFlightLog::new();
    log.log(EpochId(0), buf(1), false);
    log.close();
    assert!(log.get_in_flight_iterator().is_none());
}

#[test]
fn iterator_does_not_observe_later_appends() {
    let mut log = InFlightLog::new();
    log.log(EpochId(0), buf(1), false);
    let iter = log.get_in_flight_iterator().unwrap();
    log.log(EpochId(0), buf(2), false);
    assert_eq!(iter.number_remaining(), 1);
}

#[test]
fn empty_log_has_no_iterator() {
    let log = InFlightLog::new();
    assert!(log.get_in_flight_iterator().is_none());
}
