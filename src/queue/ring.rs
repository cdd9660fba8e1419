//! Fixed-capacity drop-oldest ring buffer

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

/// Default queue capacity
pub const DEFAULT_CAPACITY: usize = 10;

/// Bounded FIFO of opaque payloads with drop-oldest overflow
///
/// Safe for concurrent push and pop from different tasks; a single mutex
/// around the deque is sufficient at the volumes the queue is bounded to.
/// Payloads are `Bytes`, so queued elements are reference-counted and cheap
/// to move through the queue.
#[derive(Debug)]
pub struct RelayQueue {
    inner: Mutex<VecDeque<Bytes>>,
    capacity: usize,
}

impl RelayQueue {
    /// Create a queue with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a queue with the given capacity
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "relay queue capacity must be positive");
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Push a payload at the tail
    ///
    /// If the queue is at capacity the oldest element is discarded first.
    /// Never blocks and never fails; returns the discarded element, if any,
    /// so callers can count overflow.
    pub fn push(&self, payload: Bytes) -> Option<Bytes> {
        let mut queue = self.lock();

        let discarded = if queue.len() == self.capacity {
            queue.pop_front()
        } else {
            None
        };

        queue.push_back(payload);
        discarded
    }

    /// Remove and return the head element, or `None` if the queue is empty
    ///
    /// Non-blocking. Callers that need to wait for availability poll with a
    /// bounded sleep between attempts.
    pub fn try_pop(&self) -> Option<Bytes> {
        self.lock().pop_front()
    }

    /// Number of elements currently queued
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the queue is currently empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Bytes>> {
        // Push/pop cannot panic while holding the lock, so a poisoned mutex
        // still guards a consistent deque.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RelayQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(s: &'static str) -> Bytes {
        Bytes::from_static(s.as_bytes())
    }

    #[test]
    fn test_pop_empty_returns_none() {
        let queue = RelayQueue::with_capacity(2);

        assert_eq!(queue.try_pop(), None);
        // No side effect
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_fifo_order_within_capacity() {
        let queue = RelayQueue::with_capacity(4);

        queue.push(payload("a"));
        queue.push(payload("b"));
        queue.push(payload("c"));

        assert_eq!(queue.try_pop(), Some(payload("a")));
        assert_eq!(queue.try_pop(), Some(payload("b")));
        assert_eq!(queue.try_pop(), Some(payload("c")));
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let queue = RelayQueue::with_capacity(2);

        assert_eq!(queue.push(payload("a")), None);
        assert_eq!(queue.push(payload("b")), None);
        // Third push discards "a"
        assert_eq!(queue.push(payload("c")), Some(payload("a")));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.try_pop(), Some(payload("b")));
        assert_eq!(queue.try_pop(), Some(payload("c")));
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn test_retains_most_recent_capacity_elements() {
        let queue = RelayQueue::with_capacity(3);

        for i in 0..10u8 {
            queue.push(Bytes::copy_from_slice(&[i]));
        }

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.try_pop(), Some(Bytes::copy_from_slice(&[7])));
        assert_eq!(queue.try_pop(), Some(Bytes::copy_from_slice(&[8])));
        assert_eq!(queue.try_pop(), Some(Bytes::copy_from_slice(&[9])));
    }

    #[test]
    fn test_len_never_exceeds_capacity() {
        let queue = RelayQueue::with_capacity(5);

        for i in 0..100u8 {
            queue.push(Bytes::copy_from_slice(&[i]));
            assert!(queue.len() <= 5);
        }
    }

    #[test]
    #[should_panic(expected = "capacity must be positive")]
    fn test_zero_capacity_rejected() {
        RelayQueue::with_capacity(0);
    }

    #[test]
    fn test_concurrent_push_pop() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let queue = Arc::new(RelayQueue::with_capacity(8));
        let producer_queue = Arc::clone(&queue);
        let done = Arc::new(AtomicBool::new(false));
        let producer_done = Arc::clone(&done);

        let producer = std::thread::spawn(move || {
            for i in 0..1000u16 {
                producer_queue.push(Bytes::copy_from_slice(&i.to_be_bytes()));
            }
            producer_done.store(true, Ordering::Release);
        });

        let mut last_seen: Option<u16> = None;
        loop {
            match queue.try_pop() {
                Some(p) => {
                    let value = u16::from_be_bytes([p[0], p[1]]);
                    // Order among non-discarded elements is preserved
                    if let Some(last) = last_seen {
                        assert!(value > last);
                    }
                    last_seen = Some(value);
                }
                None if done.load(Ordering::Acquire) => break,
                None => std::thread::yield_now(),
            }
        }

        producer.join().unwrap();
        assert!(queue.is_empty());
    }
}
