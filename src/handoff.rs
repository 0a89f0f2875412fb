//! Capacity-1 handoff between the encoding and rendering stages
//!
//! **Why**: A single-slot queue is the pipeline's only flow control. The
//! producer blocks while a payload is pending, so the renderer always gets
//! the latest fully encoded frame and memory use stays bounded at one frame.
//!
//! **Used by**: PlaybackController (put side), Renderer (take side)
//!
//! # Shutdown
//!
//! Dropping the producer disconnects the channel; the consumer observes the
//! disconnect on its next bounded wait. No separate running flag, so there
//! is no missed-wakeup window between flag and queue.

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};

/// Producer half of the slot.
pub struct SlotProducer<T> {
    tx: Sender<T>,
}

/// Consumer half of the slot.
pub struct SlotConsumer<T> {
    rx: Receiver<T>,
}

/// Outcome of a bounded take.
#[derive(Debug, PartialEq, Eq)]
pub enum Take<T> {
    Item(T),
    /// Nothing arrived within the timeout; the producer is still alive.
    Timeout,
    /// Producer dropped; no more payloads will ever arrive.
    Closed,
}

/// Create a connected capacity-1 slot.
pub fn slot<T>() -> (SlotProducer<T>, SlotConsumer<T>) {
    let (tx, rx) = bounded(1);
    (SlotProducer { tx }, SlotConsumer { rx })
}

impl<T> SlotProducer<T> {
    /// Store a payload, blocking while the slot is full (back-pressure).
    ///
    /// Returns the payload back if the consumer is gone.
    pub fn put(&self, item: T) -> Result<(), T> {
        self.tx.send(item).map_err(|e| e.into_inner())
    }
}

impl<T> SlotConsumer<T> {
    /// Wait up to `timeout` for a payload.
    pub fn take_timeout(&self, timeout: Duration) -> Take<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(item) => Take::Item(item),
            Err(RecvTimeoutError::Timeout) => Take::Timeout,
            Err(RecvTimeoutError::Disconnected) => Take::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn second_put_blocks_until_taken() {
        let (tx, rx) = slot();
        tx.put(1).unwrap();

        let second_done = Arc::new(AtomicBool::new(false));
        let done = second_done.clone();
        let producer = thread::spawn(move || {
            tx.put(2).unwrap();
            done.store(true, Ordering::SeqCst);
        });

        // The slot is full, so the second put must still be parked.
        thread::sleep(Duration::from_millis(50));
        assert!(!second_done.load(Ordering::SeqCst), "put(2) ran with slot full");

        assert_eq!(rx.take_timeout(Duration::from_secs(1)), Take::Item(1));
        assert_eq!(rx.take_timeout(Duration::from_secs(1)), Take::Item(2));
        producer.join().unwrap();
        assert!(second_done.load(Ordering::SeqCst));
    }

    #[test]
    fn payloads_arrive_in_put_order() {
        let (tx, rx) = slot();
        let producer = thread::spawn(move || {
            for i in 0..20 {
                tx.put(i).unwrap();
            }
        });

        for expected in 0..20 {
            assert_eq!(rx.take_timeout(Duration::from_secs(1)), Take::Item(expected));
        }
        producer.join().unwrap();
    }

    #[test]
    fn take_times_out_while_producer_alive() {
        let (tx, rx) = slot::<u8>();
        let start = Instant::now();
        assert_eq!(rx.take_timeout(Duration::from_millis(30)), Take::Timeout);
        assert!(start.elapsed() >= Duration::from_millis(30));
        drop(tx);
    }

    #[test]
    fn dropped_producer_closes_slot() {
        let (tx, rx) = slot::<u8>();
        drop(tx);
        assert_eq!(rx.take_timeout(Duration::from_millis(10)), Take::Closed);
    }

    #[test]
    fn put_after_consumer_gone_returns_payload() {
        let (tx, rx) = slot();
        drop(rx);
        assert_eq!(tx.put(7), Err(7));
    }
}
