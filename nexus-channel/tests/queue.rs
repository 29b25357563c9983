use std::collections::HashSet;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use nexus_channel::{BoundedQueue, Consumer, Dequeue, Endpoint, Enqueue, Producer, QueueError};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

// =============================================================================
// Count invariant
// =============================================================================

#[test]
fn count_tracks_puts_minus_takes() {
    nexus_sequencer::init_tracing();
    let mut rng = SmallRng::seed_from_u64(0x5eed);

    for capacity in 1..=6usize {
        let queue = BoundedQueue::new(capacity).unwrap();
        let mut outstanding = 0usize;

        for _ in 0..200 {
            let can_put = outstanding < capacity;
            let can_take = outstanding > 0;
            let do_put = match (can_put, can_take) {
                (true, true) => rng.gen_bool(0.5),
                (true, false) => true,
                (false, true) => false,
                (false, false) => unreachable!(),
            };

            if do_put {
                queue.put(outstanding).unwrap();
                outstanding += 1;
            } else {
                queue.take().unwrap();
                outstanding -= 1;
            }

            let count = queue.count().unwrap();
            assert_eq!(count, outstanding);
            assert!(count <= capacity);
        }
    }
}

#[test]
fn capacity_zero_always_fails() {
    for _ in 0..10 {
        assert!(matches!(
            BoundedQueue::<u64>::new(0),
            Err(QueueError::InvalidCapacity(0))
        ));
    }
}

// =============================================================================
// Capacity-2 walkthrough
// =============================================================================

#[test]
fn third_put_waits_for_take() {
    let queue = BoundedQueue::new(2).unwrap();
    queue.put("A").unwrap();
    queue.put("B").unwrap();

    let producer = queue.clone();
    let (done_tx, done_rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        producer.put("C").unwrap();
        done_tx.send(()).unwrap();
    });

    assert!(done_rx.recv_timeout(Duration::from_millis(50)).is_err());
    assert_eq!(queue.take().unwrap(), "A");
    done_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    assert_eq!(queue.count().unwrap(), 2);
    assert_eq!(queue.take().unwrap(), "B");
    assert_eq!(queue.take().unwrap(), "C");
    handle.join().unwrap();
}

#[test]
fn short_put_timeout_on_full_queue() {
    let queue = BoundedQueue::new(3).unwrap();
    for i in 0..3 {
        queue.put(i).unwrap();
    }

    let before = queue.count().unwrap();
    assert!(matches!(
        queue.put_timeout(99, Duration::from_millis(1)),
        Err(QueueError::PutTimeout)
    ));
    assert_eq!(queue.count().unwrap(), before);

    let drained: Vec<_> = (0..3).map(|_| queue.take().unwrap()).collect();
    assert_eq!(drained, vec![0, 1, 2]);
}

// =============================================================================
// Multi-producer / multi-consumer
// =============================================================================

#[test]
fn many_producers_many_consumers_lose_nothing() {
    const PRODUCERS: u64 = 4;
    const CONSUMERS: usize = 3;
    const PER_PRODUCER: u64 = 500;

    let queue = BoundedQueue::new(8).unwrap();

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let tx = queue.producer();
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    tx.put(p * PER_PRODUCER + i).unwrap();
                }
            })
        })
        .collect();

    let (seen_tx, seen_rx) = mpsc::channel();
    let consumers: Vec<_> = (0..CONSUMERS)
        .map(|_| {
            let rx = queue.consumer();
            let seen_tx = seen_tx.clone();
            thread::spawn(move || {
                for item in rx.iter() {
                    seen_tx.send(item).unwrap();
                }
            })
        })
        .collect();
    drop(seen_tx);

    for p in producers {
        p.join().unwrap();
    }

    let total = (PRODUCERS * PER_PRODUCER) as usize;
    let seen: HashSet<u64> = seen_rx.iter().take(total).collect();
    assert_eq!(seen.len(), total);

    queue.dispose();
    for c in consumers {
        c.join().unwrap();
    }
}

#[test]
fn per_producer_order_is_preserved() {
    let queue = BoundedQueue::new(2).unwrap();

    let a = queue.producer();
    let b = queue.producer();
    let ha = thread::spawn(move || (0..200u32).for_each(|i| a.put(('a', i)).unwrap()));
    let hb = thread::spawn(move || (0..200u32).for_each(|i| b.put(('b', i)).unwrap()));

    let mut last_a = None;
    let mut last_b = None;
    for (tag, i) in queue.iter().take(400) {
        let last = if tag == 'a' { &mut last_a } else { &mut last_b };
        if let Some(prev) = *last {
            assert!(i > prev, "{tag}: {i} after {prev}");
        }
        *last = Some(i);
    }

    ha.join().unwrap();
    hb.join().unwrap();
}

// =============================================================================
// Views and iteration
// =============================================================================

#[test]
fn drain_through_consumer_view_round_trips() {
    let queue = BoundedQueue::new(5).unwrap();
    let producer = Producer::new(queue.producer());
    let consumer = Consumer::new(queue.consumer());
    let pushed: Vec<String> = (0..40).map(|i| format!("msg-{i}")).collect();

    let to_push = pushed.clone();
    let handle = thread::spawn(move || {
        for item in to_push {
            producer.put(item).unwrap();
        }
    });

    let drained: Vec<String> = consumer.iter().take(pushed.len()).collect();
    assert_eq!(drained, pushed);
    assert_eq!(consumer.count().unwrap(), 0);
    handle.join().unwrap();
}

#[test]
fn iterator_over_disposed_queue_yields_nothing() {
    let queue = BoundedQueue::new(4).unwrap();
    queue.put(1).unwrap();
    let consumer = queue.consumer();
    queue.dispose();

    assert_eq!(consumer.iter().count(), 0);
}

// =============================================================================
// Timed Tests (ensure no indefinite blocking)
// =============================================================================

#[test]
fn capacity_one_ping_pong_completes() {
    let (done_tx, done_rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        let queue = BoundedQueue::new(1).unwrap();
        let producer = queue.clone();

        let h = thread::spawn(move || {
            for i in 0..1000 {
                producer.put(i).unwrap();
            }
        });

        for i in 0..1000 {
            assert_eq!(queue.take().unwrap(), i);
        }

        h.join().unwrap();
        done_tx.send(()).unwrap();
    });

    let result = done_rx.recv_timeout(Duration::from_secs(10));
    assert!(result.is_ok(), "Test timed out - possible deadlock!");

    handle.join().unwrap();
}

#[test]
fn dispose_releases_blocked_consumer_view() {
    let queue = BoundedQueue::<u8>::new(1).unwrap();
    let consumer = queue.consumer();
    let id = consumer.wrapped_id();

    let handle = thread::spawn(move || consumer.take());
    thread::sleep(Duration::from_millis(30));

    // The consumer still holds a clone, so explicit disposal is required.
    assert_eq!(queue.id(), id);
    queue.dispose();

    assert!(matches!(handle.join().unwrap(), Err(QueueError::Disposed)));
}
