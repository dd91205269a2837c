use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Double-buffered, multi-producer command list.
///
/// The front buffer lives behind a mutex and receives `append`s. The back
/// buffer belongs to the consumer; `swap` exchanges the two so the consumer
/// iterates without holding the lock, and producers immediately continue on
/// an empty (but already allocated) buffer.
///
/// Ordering:
/// - every appended record is returned by exactly one swap
/// - records from the same producer thread keep their append order
/// - no ordering is promised between different producers
#[derive(Debug)]
pub struct CommandList<T> {
    label: &'static str,
    front: Mutex<Vec<T>>,
    appended: AtomicU64,
    drained: AtomicU64,
}

impl<T> CommandList<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            front: Mutex::new(Vec::new()),
            appended: AtomicU64::new(0),
            drained: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Appends a record to the front buffer.
    ///
    /// The lock covers only the push.
    pub fn append(&self, record: T) {
        let mut front = self.front.lock();
        front.push(record);
        self.appended.fetch_add(1, Ordering::Relaxed);
    }

    /// Exchanges the front buffer with `back` and returns the number of
    /// records handed over.
    ///
    /// `back` is cleared first; its capacity becomes the next front buffer.
    pub fn swap(&self, back: &mut Vec<T>) -> usize {
        debug_assert!(back.is_empty(), "{}: back buffer swapped while holding records", self.label);
        back.clear();

        {
            let mut front = self.front.lock();
            std::mem::swap(&mut *front, back);
        }

        let n = back.len();
        self.drained.fetch_add(n as u64, Ordering::Relaxed);
        n
    }

    /// Takes every pending record.
    ///
    /// Allocating form of `swap`; the front buffer restarts with no capacity.
    pub fn swap_and_drain(&self) -> Vec<T> {
        let mut out = Vec::new();
        self.swap(&mut out);
        out
    }

    /// Records currently waiting in the front buffer.
    pub fn pending(&self) -> usize {
        self.front.lock().len()
    }

    /// Total records ever appended.
    pub fn appended(&self) -> u64 {
        self.appended.load(Ordering::Relaxed)
    }

    /// Total records ever handed to a consumer.
    pub fn drained(&self) -> u64 {
        self.drained.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn swap_returns_records_in_append_order() {
        let list = CommandList::new("test");
        list.append(1);
        list.append(2);
        list.append(3);

        assert_eq!(list.swap_and_drain(), vec![1, 2, 3]);
        assert_eq!(list.pending(), 0);
        assert!(list.swap_and_drain().is_empty());
    }

    #[test]
    fn swap_recycles_consumer_buffer() {
        let list = CommandList::new("test");
        let mut back = Vec::with_capacity(64);
        let ptr = back.as_ptr();

        list.append(7);
        assert_eq!(list.swap(&mut back), 1);
        assert_eq!(back, vec![7]);
        back.clear();

        // The consumer's old allocation is now the producer front buffer.
        list.append(8);
        assert_eq!(list.front.lock().as_ptr(), ptr);
        assert_eq!(list.swap(&mut back), 1);
        assert_eq!(back, vec![8]);
    }

    #[test]
    fn appends_after_swap_go_to_next_batch() {
        let list = CommandList::new("test");
        list.append("a");
        let first = list.swap_and_drain();
        list.append("b");
        assert_eq!(first, vec!["a"]);
        assert_eq!(list.swap_and_drain(), vec!["b"]);
        assert_eq!(list.appended(), 2);
        assert_eq!(list.drained(), 2);
    }

    #[test]
    fn concurrent_producers_lose_and_duplicate_nothing() {
        const PRODUCERS: u32 = 8;
        const PER_PRODUCER: u32 = 5_000;

        let list = Arc::new(CommandList::new("stress"));

        let producers: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let list = Arc::clone(&list);
                thread::spawn(move || {
                    for seq in 0..PER_PRODUCER {
                        list.append((p, seq));
                    }
                })
            })
            .collect();

        let mut seen: Vec<(u32, u32)> = Vec::new();
        let mut back = Vec::new();
        while producers.iter().any(|h| !h.is_finished()) {
            list.swap(&mut back);
            seen.extend(back.drain(..));
            thread::yield_now();
        }
        for h in producers {
            h.join().unwrap();
        }
        list.swap(&mut back);
        seen.extend(back.drain(..));

        assert_eq!(seen.len(), (PRODUCERS * PER_PRODUCER) as usize);

        // Per-producer FIFO, and every sequence number exactly once.
        let mut next: HashMap<u32, u32> = HashMap::new();
        for (p, seq) in seen {
            let expected = next.entry(p).or_insert(0);
            assert_eq!(seq, *expected, "producer {p} out of order");
            *expected += 1;
        }
        assert!(next.values().all(|n| *n == PER_PRODUCER));
    }
}
