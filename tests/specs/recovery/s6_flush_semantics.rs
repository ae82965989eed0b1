// SPDX-License-Identifier: MIT

//! S6: flush semantics — add one unfinished consumer (no notify); add a
//! second consumer, implicitly finishing the first (notify fires once);
//! drain to empty (no further notify until a new finished buffer appears).

use std::sync::{Arc, Mutex};

use causalrt_core::{BufferConsumer, EpochId};
use causalrt_runtime::{AvailabilityListener, PipelinedSubpartition};

#[derive(Default)]
struct CountingListener {
    data_available: Mutex<u32>,
    released: Mutex<u32>,
}

impl AvailabilityListener for CountingListener {
    fn notify_data_available(&self) {
        *self.data_available.lock().unwrap() += 1;
    }

    fn notify_view_released(&self) {
        *self.released.lock().unwrap() += 1;
    }
}

fn finished(bytes: &[u8]) -> BufferConsumer {
    let consumer = BufferConsumer::new_payload();
    consumer.write(bytes);
    consumer.finish();
    consumer
}

#[test]
fn notify_fires_once_per_transition_then_waits_for_flush_or_new_data() {
    let sub = Arc::new(PipelinedSubpartition::new());
    sub.set_current_epoch(EpochId::FIRST);
    let listener = Arc::new(CountingListener::default());
    sub.set_read_view(listener.clone());

    let unfinished = BufferConsumer::new_payload();
    unfinished.write(b"partial");
    assert!(sub.add(unfinished, false));
    assert_eq!(*listener.data_available.lock().unwrap(), 0);

    assert!(sub.add(finished(b"done"), false));
    assert_eq!(*listener.data_available.lock().unwrap(), 1);

    while sub.poll_buffer().is_some() {}
    assert_eq!(*listener.data_available.lock().unwrap(), 1, "draining alone must not re-notify");

    // flush() against an empty queue is a no-op, per its own "iff non-empty"
    // rule — does not arm flush_requested and does not notify.
    sub.flush();
    assert_eq!(*listener.data_available.lock().unwrap(), 1);

    // A new finished buffer arriving crosses the empty-to-available edge
    // again and notifies once more.
    assert!(sub.add(finished(b"fresh"), false));
    assert_eq!(*listener.data_available.lock().unwrap(), 2);
}
