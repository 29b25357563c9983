use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use tracing::trace;

use crate::side::Dequeue;

/// Blocking iterator over a queue's consumer side.
///
/// Each call to `next` performs an untimed `take`. The iterator ends once the
/// queue is disposed and stays ended; items still buffered at that point are
/// lost.
///
/// # Example
///
/// ```
/// use std::thread;
/// use nexus_channel::BoundedQueue;
///
/// let queue = BoundedQueue::new(4).unwrap();
/// let producer = queue.clone();
///
/// let handle = thread::spawn(move || {
///     for i in 0..3 {
///         producer.put(i).unwrap();
///     }
/// });
///
/// let items: Vec<_> = queue.iter().take(3).collect();
/// assert_eq!(items, vec![0, 1, 2]);
/// handle.join().unwrap();
/// ```
pub struct Iter<'a, T, Q: ?Sized> {
    source: &'a Q,
    done: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T, Q: ?Sized> Iter<'a, T, Q> {
    pub(crate) fn new(source: &'a Q) -> Self {
        Self {
            source,
            done: false,
            _marker: PhantomData,
        }
    }
}

impl<T, Q: Dequeue<T> + ?Sized> Iterator for Iter<'_, T, Q> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.done {
            return None;
        }
        match self.source.take() {
            Ok(item) => Some(item),
            Err(err) => {
                trace!(id = %self.source.id(), %err, "queue iterator finished");
                self.done = true;
                None
            }
        }
    }
}

impl<T, Q: Dequeue<T> + ?Sized> FusedIterator for Iter<'_, T, Q> {}

impl<T, Q: ?Sized> fmt::Debug for Iter<'_, T, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::BoundedQueue;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn drains_in_push_order() {
        let queue = BoundedQueue::new(3).unwrap();
        let producer = queue.clone();

        let handle = thread::spawn(move || {
            for i in 0..100u32 {
                producer.put(i).unwrap();
            }
        });

        let items: Vec<_> = queue.iter().take(100).collect();
        assert_eq!(items, (0..100).collect::<Vec<_>>());
        handle.join().unwrap();
    }

    #[test]
    fn ends_on_dispose_and_stays_ended() {
        let queue = BoundedQueue::<u8>::new(2).unwrap();
        let disposer = queue.clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            disposer.dispose();
        });

        let mut iter = queue.iter();
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
        handle.join().unwrap();
    }

    #[test]
    fn for_loop_over_reference() {
        let queue = BoundedQueue::new(4).unwrap();
        queue.put("a").unwrap();
        queue.put("b").unwrap();

        let mut seen = Vec::new();
        for item in &queue {
            seen.push(item);
            if seen.len() == 2 {
                break;
            }
        }
        assert_eq!(seen, vec!["a", "b"]);
    }
}
