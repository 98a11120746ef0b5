//! Mutex/condvar guarded FIFO with one-way deactivation
//!
//! Producers call [`GuardedQueue::add_item`] until they are done and then
//! [`GuardedQueue::deactivate`]. Consumers keep pulling with
//! [`GuardedQueue::next_data_item`] until the queue is both inactive and
//! empty, so everything queued before deactivation is still delivered.
//!
//! ```text
//! Active --deactivate()--> Draining --last item taken--> Finished
//! ```
//!
//! There is no way back to `Active`.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// How long an idle consumer waits for data before returning empty-handed
pub const DEFAULT_WAIT: Duration = Duration::from_millis(10);

#[derive(Debug)]
struct QueueState<T> {
    items: VecDeque<T>,
    active: bool,
}

/// Thread-safe FIFO shared by producer and consumer threads
#[derive(Debug)]
pub struct GuardedQueue<T> {
    state: Mutex<QueueState<T>>,
    available: Condvar,
    wait: Duration,
}

impl<T> GuardedQueue<T> {
    pub fn new() -> Self {
        Self::with_wait(DEFAULT_WAIT)
    }

    /// Queue whose consumers wait at most `wait` per empty poll
    pub fn with_wait(wait: Duration) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                active: true,
            }),
            available: Condvar::new(),
            wait,
        }
    }

    // Every mutation leaves the state consistent, so a panic in another
    // holder does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueue an item and wake one waiting consumer
    ///
    /// Returns `false` (and drops the item) once the queue is deactivated.
    pub fn add_item(&self, item: T) -> bool {
        let mut state = self.lock();
        if !state.active {
            tracing::debug!("Rejected item offered to a deactivated queue");
            return false;
        }
        state.items.push_back(item);
        drop(state);
        self.available.notify_one();
        true
    }

    /// Take the oldest item, waiting briefly if none is queued yet
    ///
    /// `None` means nothing arrived within the wait. Callers decide
    /// whether to poll again by checking [`is_finished`](Self::is_finished)
    /// (or `is_active()` and `has_data()`).
    pub fn next_data_item(&self) -> Option<T> {
        let mut state = self.lock();
        if let Some(item) = state.items.pop_front() {
            return Some(item);
        }
        if !state.active {
            return None;
        }
        state = self
            .available
            .wait_timeout_while(state, self.wait, |s| s.items.is_empty() && s.active)
            .map(|(guard, _)| guard)
            .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        state.items.pop_front()
    }

    /// Stop accepting items and wake every waiting consumer
    ///
    /// Idempotent; queued items remain available.
    pub fn deactivate(&self) {
        let mut state = self.lock();
        if !state.active {
            return;
        }
        state.active = false;
        let remaining = state.items.len();
        drop(state);
        tracing::debug!(remaining, "Queue deactivated");
        self.available.notify_all();
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    pub fn has_data(&self) -> bool {
        !self.lock().items.is_empty()
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_data()
    }

    /// Deactivated and drained: consumers can stop polling
    pub fn is_finished(&self) -> bool {
        let state = self.lock();
        !state.active && state.items.is_empty()
    }

    /// Consumer loop: hand every item to `handle` until the queue finishes
    ///
    /// Returns the number of items this consumer handled.
    pub fn drain_with<F>(&self, mut handle: F) -> usize
    where
        F: FnMut(T),
    {
        let mut handled = 0;
        loop {
            match self.next_data_item() {
                Some(item) => {
                    handle(item);
                    handled += 1;
                }
                None if self.is_finished() => break,
                None => {}
            }
        }
        handled
    }
}

impl<T> Default for GuardedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fifo_order() {
        let queue = GuardedQueue::new();
        for i in 0..5 {
            assert!(queue.add_item(i));
        }
        assert_eq!(queue.len(), 5);
        let taken: Vec<i32> = (0..5).filter_map(|_| queue.next_data_item()).collect();
        assert_eq!(taken, vec![0, 1, 2, 3, 4]);
        assert!(!queue.has_data());
        assert!(queue.is_active());
    }

    #[test]
    fn test_drains_after_deactivate() {
        let queue = GuardedQueue::new();
        for name in ["a", "b", "c"] {
            queue.add_item(name.to_string());
        }
        queue.deactivate();

        assert!(!queue.is_active());
        assert!(queue.has_data());
        assert_eq!(queue.next_data_item().as_deref(), Some("a"));
        assert_eq!(queue.next_data_item().as_deref(), Some("b"));
        assert_eq!(queue.next_data_item().as_deref(), Some("c"));
        assert!(!queue.has_data());
        assert_eq!(queue.next_data_item(), None);
        assert!(!queue.is_active());
        assert!(queue.is_finished());
    }

    #[test]
    fn test_rejects_after_deactivate() {
        let queue = GuardedQueue::new();
        queue.add_item(1);
        queue.deactivate();
        assert!(!queue.add_item(2));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_deactivate_is_one_way() {
        let queue: GuardedQueue<u8> = GuardedQueue::new();
        queue.deactivate();
        queue.deactivate();
        assert!(!queue.is_active());
        assert!(queue.is_finished());
    }

    #[test]
    fn test_empty_active_poll_times_out() {
        let queue: GuardedQueue<u8> = GuardedQueue::with_wait(Duration::from_millis(5));
        assert_eq!(queue.next_data_item(), None);
        assert!(queue.is_active());
        assert!(!queue.is_finished());
    }

    #[test]
    fn test_waiting_consumer_is_woken() {
        let queue = Arc::new(GuardedQueue::with_wait(Duration::from_secs(5)));
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.next_data_item())
        };
        thread::sleep(Duration::from_millis(20));
        queue.add_item(42);
        assert_eq!(consumer.join().unwrap(), Some(42));
    }

    #[test]
    fn test_deactivate_wakes_waiting_consumer() {
        let queue: Arc<GuardedQueue<u8>> = Arc::new(GuardedQueue::with_wait(Duration::from_secs(5)));
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.next_data_item())
        };
        thread::sleep(Duration::from_millis(20));
        queue.deactivate();
        assert_eq!(consumer.join().unwrap(), None);
    }

    #[test]
    fn test_many_producers_many_consumers() {
        let queue = Arc::new(GuardedQueue::with_wait(Duration::from_millis(2)));
        let handled = Arc::new(AtomicUsize::new(0));
        let total = Arc::new(AtomicUsize::new(0));

        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let handled = Arc::clone(&handled);
                let total = Arc::clone(&total);
                thread::spawn(move || {
                    queue.drain_with(|item: usize| {
                        handled.fetch_add(1, Ordering::SeqCst);
                        total.fetch_add(item, Ordering::SeqCst);
                    })
                })
            })
            .collect();

        let producers: Vec<_> = (0..4)
            .map(|p| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for i in 0..250 {
                        assert!(queue.add_item(p * 250 + i));
                    }
                })
            })
            .collect();

        for producer in producers {
            producer.join().unwrap();
        }
        queue.deactivate();

        let per_consumer: usize = consumers.into_iter().map(|c| c.join().unwrap()).sum();
        assert_eq!(per_consumer, 1000);
        assert_eq!(handled.load(Ordering::SeqCst), 1000);
        assert_eq!(total.load(Ordering::SeqCst), (0..1000).sum::<usize>());
        assert!(queue.is_finished());
    }
}
