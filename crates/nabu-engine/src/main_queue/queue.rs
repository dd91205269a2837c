use parking_lot::Mutex;

/// Deferred work for the main thread.
pub type MainThreadTask = Box<dyn FnOnce() + Send + 'static>;

/// Callbacks posted from any thread and run once on the main thread.
///
/// A callback posted while a drain is running lands in the next drain, so
/// every callback posted during frame N runs at the drain point of frame N+1
/// at the earliest, and none runs twice.
#[derive(Default)]
pub struct MainThreadQueue {
    pending: Mutex<Vec<MainThreadTask>>,
}

impl MainThreadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `task`. Callable from any thread.
    pub fn post<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pending.lock().push(Box::new(task));
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs every task queued so far. Main thread only.
    ///
    /// The pending list is swapped out under the lock and run after the lock
    /// is released, so tasks may `post` again without deadlocking.
    pub fn drain_and_run(&self) -> usize {
        let batch = std::mem::take(&mut *self.pending.lock());
        let n = batch.len();

        for task in batch {
            task();
        }

        if n > 0 {
            log::trace!("main queue: ran {n} task(s)");
        }
        n
    }
}

impl core::fmt::Debug for MainThreadQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MainThreadQueue")
            .field("pending", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn drain_runs_each_task_once() {
        let queue = MainThreadQueue::new();
        let hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let hits = Arc::clone(&hits);
            queue.post(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert_eq!(queue.drain_and_run(), 3);
        assert_eq!(queue.drain_and_run(), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn task_posting_during_drain_runs_next_drain() {
        let queue = Arc::new(MainThreadQueue::new());
        let hits = Arc::new(AtomicUsize::new(0));

        {
            let inner_queue = Arc::clone(&queue);
            let hits = Arc::clone(&hits);
            queue.post(move || {
                let hits = Arc::clone(&hits);
                inner_queue.post(move || {
                    hits.fetch_add(1, Ordering::SeqCst);
                });
            });
        }

        assert_eq!(queue.drain_and_run(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.drain_and_run(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn posts_from_other_threads_arrive() {
        let queue = Arc::new(MainThreadQueue::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let hits = Arc::clone(&hits);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let hits = Arc::clone(&hits);
                        queue.post(move || {
                            hits.fetch_add(1, Ordering::SeqCst);
                        });
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }

        assert_eq!(queue.drain_and_run(), 400);
        assert_eq!(hits.load(Ordering::SeqCst), 400);
    }
}
