//! Integration tests exercising `AsyncQueue` as an external user of
//! the crate would: only through its public API.

use pieceq::{AsyncQueue, Deadline, QueueError, ASYNC_QUEUE_CAPACITY};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn fifo_order_is_preserved_under_single_thread_use() {
    let q = AsyncQueue::new();
    for i in 0..10u8 {
        q.push(&[i]).unwrap();
    }
    for i in 0..10u8 {
        assert_eq!(q.pop().unwrap(), vec![i]);
    }
    assert!(q.is_empty());
}

#[test]
fn try_pop_fails_fast_on_empty_queue() {
    let q = AsyncQueue::new();
    assert_eq!(q.try_pop(), Err(QueueError::TimedOut));
}

#[test]
fn try_push_fails_fast_once_capacity_reached() {
    let q = AsyncQueue::new();
    for i in 0..ASYNC_QUEUE_CAPACITY {
        q.try_push(&[i as u8]).unwrap();
    }
    assert_eq!(q.try_push(&[0]), Err(QueueError::TimedOut));
    assert_eq!(q.len(), ASYNC_QUEUE_CAPACITY);
}

#[test]
fn pop_timed_respects_its_deadline() {
    let q = AsyncQueue::new();
    let start = std::time::Instant::now();
    let result = q.pop_timed(Deadline::now_plus(Duration::from_millis(50)));
    assert_eq!(result, Err(QueueError::TimedOut));
    assert!(start.elapsed() >= Duration::from_millis(40));
}

#[test]
fn a_blocked_pop_is_woken_by_a_concurrent_push() {
    let q = Arc::new(AsyncQueue::new());
    let reader = {
        let q = Arc::clone(&q);
        thread::spawn(move || q.pop_timed(Deadline::now_plus(Duration::from_secs(5))))
    };

    thread::sleep(Duration::from_millis(30));
    q.push(b"hello").unwrap();

    assert_eq!(reader.join().unwrap().unwrap(), b"hello");
}

#[test]
fn a_blocked_push_is_woken_by_a_concurrent_pop() {
    let q = Arc::new(AsyncQueue::new());
    for i in 0..ASYNC_QUEUE_CAPACITY {
        q.push(&[i as u8]).unwrap();
    }

    let writer = {
        let q = Arc::clone(&q);
        thread::spawn(move || q.push_timed(b"squeezed in", Deadline::now_plus(Duration::from_secs(5))))
    };

    thread::sleep(Duration::from_millis(30));
    q.pop().unwrap();

    writer.join().unwrap().unwrap();
    assert_eq!(q.len(), ASYNC_QUEUE_CAPACITY);
}

#[test]
fn ten_producers_and_ten_consumers_exchange_every_message_exactly_once() {
    const PRODUCERS: usize = 10;
    const CONSUMERS: usize = 10;
    const PER_PRODUCER: usize = 200;

    let q = Arc::new(AsyncQueue::new());

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let q = Arc::clone(&q);
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    let tag = (p * PER_PRODUCER + i) as u32;
                    q.push(&tag.to_le_bytes()).unwrap();
                }
            })
        })
        .collect();

    let consumers: Vec<_> = (0..CONSUMERS)
        .map(|_| {
            let q = Arc::clone(&q);
            thread::spawn(move || {
                let mut tags = Vec::new();
                for _ in 0..(PRODUCERS * PER_PRODUCER / CONSUMERS) {
                    let msg = q.pop_timed(Deadline::now_plus(Duration::from_secs(10))).unwrap();
                    let bytes: [u8; 4] = msg.try_into().unwrap();
                    tags.push(u32::from_le_bytes(bytes));
                }
                tags
            })
        })
        .collect();

    for p in producers {
        p.join().unwrap();
    }

    let mut all_tags: Vec<u32> = consumers
        .into_iter()
        .flat_map(|c| c.join().unwrap())
        .collect();
    all_tags.sort_unstable();

    let expected: Vec<u32> = (0..(PRODUCERS * PER_PRODUCER) as u32).collect();
    assert_eq!(all_tags, expected);
    assert!(q.is_empty());
}
