use std::sync::Arc;

use qbroker::{Message, MessageQueue, QueueStore};

#[test]
fn test_message_queue_creation() {
    let queue = MessageQueue::new("test-queue");

    assert_eq!(queue.name(), "test-queue");
    assert_eq!(queue.size(), 0);
    assert!(queue.is_empty());
}

#[test]
fn test_push_pop_preserves_fifo_order() {
    let queue = MessageQueue::new("test-queue");

    queue.push(Message::new("1"));
    queue.push(Message::new("2"));
    queue.push(Message::new("3"));

    assert_eq!(queue.pop().unwrap().payload, "1");
    assert_eq!(queue.pop().unwrap().payload, "2");
    assert_eq!(queue.pop().unwrap().payload, "3");
    assert!(queue.pop().is_none());
}

#[test]
fn test_queue_stats_track_all_operations() {
    let queue = MessageQueue::new("test-queue");

    queue.push(Message::new("a"));
    queue.push(Message::new("b"));
    queue.push(Message::new("c"));
    queue.pop().unwrap();
    // Popping an empty queue is not counted.
    queue.pop();
    queue.pop();
    queue.pop();

    assert_eq!(queue.stats().enqueued_total(), 3);
    assert_eq!(queue.stats().dequeued_total(), 3);
}

#[test]
fn test_payload_is_not_interpreted() {
    let store = QueueStore::new();
    let raw = r#"{"not": "parsed"}  "#;

    store.append("raw", raw);

    assert_eq!(store.pop_front("raw").unwrap().payload, raw);
}

#[test]
fn test_append_creates_queue_lazily() {
    let store = QueueStore::new();
    assert_eq!(store.queue_count(), 0);

    store.append("orders", "A");

    assert_eq!(store.queue_count(), 1);
    assert_eq!(store.len("orders"), 1);
    assert_eq!(store.queue_names(), vec!["orders".to_string()]);
}

#[test]
fn test_pop_and_len_do_not_create_queues() {
    let store = QueueStore::new();

    assert!(store.pop_front("ghost").is_none());
    assert_eq!(store.len("ghost"), 0);
    assert!(store.queue_names().is_empty());
    assert_eq!(store.queue_count(), 0);
}

#[test]
fn test_emptied_queue_remains() {
    let store = QueueStore::new();
    store.append("q", "x");
    store.pop_front("q").unwrap();

    assert_eq!(store.len("q"), 0);
    assert_eq!(store.queue_count(), 1);
}

#[test]
fn test_queues_are_independent() {
    let store = QueueStore::new();
    store.append("a", "a1");
    store.append("b", "b1");
    store.append("a", "a2");

    assert_eq!(store.pop_front("b").unwrap().payload, "b1");
    assert_eq!(store.pop_front("a").unwrap().payload, "a1");
    assert_eq!(store.pop_front("a").unwrap().payload, "a2");
    assert_eq!(store.queue_names(), vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_concurrent_appends_and_pops_lose_nothing() {
    let store = Arc::new(QueueStore::new());
    let producers: Vec<_> = (0..8)
        .map(|p| {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..500 {
                    store.append("shared", format!("{}-{}", p, i));
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }
    assert_eq!(store.len("shared"), 4000);

    let consumers: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            std::thread::spawn(move || {
                let mut seen = Vec::new();
                while let Some(message) = store.pop_front("shared") {
                    seen.push(message.payload);
                }
                seen
            })
        })
        .collect();

    let mut all: Vec<String> = consumers
        .into_iter()
        .flat_map(|c| c.join().unwrap())
        .collect();
    assert_eq!(all.len(), 4000);
    all.sort();
    all.dedup();
    assert_eq!(all.len(), 4000);
}

#[test]
fn test_single_producer_order_survives_concurrent_producers() {
    let store = Arc::new(QueueStore::new());
    let handles: Vec<_> = (0..4)
        .map(|p| {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..200 {
                    store.append("mixed", format!("{}:{}", p, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut last = [-1i64; 4];
    while let Some(message) = store.pop_front("mixed") {
        let (p, i) = message.payload.split_once(':').unwrap();
        let (p, i): (usize, i64) = (p.parse().unwrap(), i.parse().unwrap());
        assert!(i > last[p], "producer {} out of order", p);
        last[p] = i;
    }
    assert_eq!(last, [199; 4]);
}
