use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use nexus_sequencer::{Clock, Config, ManualClock};
use nexus_slot::{CellError, IVar};

/// Frozen clock that leaps an hour ahead on the second read made by the
/// named worker thread after [`arm`](Self::arm).
struct LeapingClock {
    base: Instant,
    worker: &'static str,
    armed: AtomicBool,
    reads: AtomicUsize,
}

impl LeapingClock {
    fn new(worker: &'static str) -> Self {
        Self {
            base: Instant::now(),
            worker,
            armed: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
        }
    }

    fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

impl Clock for LeapingClock {
    fn now(&self) -> Instant {
        let on_worker = thread::current().name() == Some(self.worker);
        if on_worker
            && self.armed.load(Ordering::SeqCst)
            && self.reads.fetch_add(1, Ordering::SeqCst) >= 1
        {
            return self.base + Duration::from_secs(3600);
        }
        self.base
    }
}

/// Monotonic clock that records which threads consult it.
#[derive(Default)]
struct RecordingClock {
    threads: Mutex<Vec<Option<String>>>,
}

impl Clock for RecordingClock {
    fn now(&self) -> Instant {
        let name = thread::current().name().map(str::to_owned);
        self.threads
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(name);
        Instant::now()
    }
}

// =============================================================================
// Single assignment
// =============================================================================

#[test]
fn racing_fills_have_exactly_one_winner() {
    nexus_sequencer::init_tracing();
    const WRITERS: usize = 8;

    let cell = IVar::new().unwrap();
    let barrier = Arc::new(Barrier::new(WRITERS));

    let writers: Vec<_> = (0..WRITERS)
        .map(|i| {
            let cell = cell.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cell.fill(i).map(|()| i)
            })
        })
        .collect();

    let mut winners = Vec::new();
    for w in writers {
        match w.join().unwrap() {
            Ok(i) => winners.push(i),
            Err(CellError::AlreadyFilled) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(cell.read().unwrap(), winners[0]);
}

#[test]
fn readers_before_and_after_fill_agree() {
    let cell = IVar::<Vec<u8>>::new().unwrap();

    let early: Vec<_> = (0..4)
        .map(|_| {
            let cell = cell.clone();
            thread::spawn(move || cell.read().unwrap())
        })
        .collect();

    thread::sleep(Duration::from_millis(20));
    cell.fill(vec![1, 2, 3]).unwrap();

    let late: Vec<_> = (0..4)
        .map(|_| {
            let cell = cell.clone();
            thread::spawn(move || cell.read().unwrap())
        })
        .collect();

    for h in early.into_iter().chain(late) {
        assert_eq!(h.join().unwrap(), vec![1, 2, 3]);
    }
}

// =============================================================================
// Deadlines on a manual clock
// =============================================================================

#[test]
fn read_times_out_when_clock_passes_deadline() {
    let clock = Arc::new(ManualClock::new());
    let cell = IVar::<u32>::with_config(Config::default().clock(clock.clone())).unwrap();

    let reader = cell.clone();
    let handle = thread::spawn(move || reader.read_timeout(Duration::from_secs(10)));

    // The worker notices the elapsed deadline on its next wake-up.
    while !handle.is_finished() {
        clock.advance(Duration::from_secs(10));
        assert_eq!(cell.peek().unwrap(), None);
        thread::sleep(Duration::from_millis(1));
    }

    assert!(matches!(handle.join().unwrap(), Err(CellError::ReadTimeout)));
    assert!(!cell.is_filled());

    // A timed-out reader is gone; the fill still succeeds for everyone else.
    cell.fill(5).unwrap();
    assert_eq!(cell.read().unwrap(), 5);
}

#[test]
fn fill_answers_every_timed_reader_in_one_step() {
    const READERS: usize = 16;
    const WORKER: &str = "leaping-cell";

    let clock = Arc::new(LeapingClock::new(WORKER));
    let cell =
        IVar::with_config(Config::default().name(WORKER).clock(clock.clone())).unwrap();

    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let cell = cell.clone();
            thread::spawn(move || cell.read_timeout(Duration::from_secs(60)))
        })
        .collect();

    thread::sleep(Duration::from_millis(50));

    // Time jumps past every reader's deadline right after the fill step.
    clock.arm();
    cell.fill(7u32).unwrap();

    for r in readers {
        assert_eq!(r.join().unwrap().unwrap(), 7);
    }
    assert_eq!(cell.read().unwrap(), 7);
}

#[test]
fn fill_before_deadline_satisfies_timed_reader() {
    let clock = Arc::new(ManualClock::new());
    let cell = IVar::with_config(Config::default().clock(clock.clone())).unwrap();

    let reader = cell.clone();
    let handle = thread::spawn(move || reader.read_timeout(Duration::from_secs(5)));

    thread::sleep(Duration::from_millis(20));
    clock.advance(Duration::from_secs(4));
    cell.fill("in time").unwrap();

    assert_eq!(handle.join().unwrap().unwrap(), "in time");
}

// =============================================================================
// Disposal
// =============================================================================

#[test]
fn disposed_cell_rejects_everything() {
    let cell = IVar::new().unwrap();
    cell.fill(1u8).unwrap();
    cell.dispose();
    cell.dispose();

    assert!(cell.is_disposed());
    assert!(matches!(cell.read(), Err(CellError::Disposed)));
    assert!(matches!(cell.peek(), Err(CellError::Disposed)));
    assert!(matches!(cell.fill(2), Err(CellError::Disposed)));
}

#[test]
fn worker_thread_carries_configured_name() {
    let clock = Arc::new(RecordingClock::default());
    let cell =
        IVar::<u8>::with_config(Config::default().name("answer-cell").clock(clock.clone()))
            .unwrap();

    cell.fill(0).unwrap();
    assert!(cell.is_filled());

    let threads = clock.threads.lock().unwrap();
    assert!(!threads.is_empty());
    assert!(threads.iter().any(|name| name.as_deref() == Some("answer-cell")));
}
