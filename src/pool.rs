//! A fixed-size worker pool: task FIFO behind a mutex, a condvar to wake
//! idle workers, an atomic active-task counter, and a drain condition the
//! dispatcher blocks on in [`WorkerPool::wait`].
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

type Task = Box<dyn FnOnce() + Send>;

struct Shared {
    queue: Mutex<VecDeque<Task>>,
    wake: Condvar,
    drain: Condvar,
    active: AtomicUsize,
    stop: Mutex<bool>,
}

/// A pool of worker threads created once at device construction and torn
/// down on drop. Tasks are plain closures; the pool does not return values
/// from them (the dispatcher instead writes results through shared targets
/// partitioned by tile, so no channel back is needed).
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `worker_count` threads, each looping on the shared queue.
    /// `worker_count` is clamped to at least 1.
    pub fn new(worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        log::debug!("constructing worker pool with {worker_count} thread(s)");
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            wake: Condvar::new(),
            drain: Condvar::new(),
            active: AtomicUsize::new(0),
            stop: Mutex::new(false),
        });

        let workers = (0..worker_count)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || worker_loop(shared))
            })
            .collect();

        WorkerPool { shared, workers }
    }

    /// Number of hardware threads reported by the platform, used as the
    /// device's default worker count.
    pub fn default_worker_count() -> usize {
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    }

    /// Enqueues one task and wakes a single idle worker.
    pub fn enqueue<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut queue = self.shared.queue.lock().unwrap();
        queue.push_back(Box::new(task));
        self.shared.wake.notify_one();
    }

    /// Blocks until the queue is empty and no task is currently running.
    pub fn wait(&self) {
        let mut queue = self.shared.queue.lock().unwrap();
        while !queue.is_empty() || self.shared.active.load(Ordering::SeqCst) != 0 {
            queue = self.shared.drain.wait(queue).unwrap();
        }
    }

    /// Number of worker threads in the pool.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        *self.shared.stop.lock().unwrap() = true;
        self.shared.wake.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(shared: Arc<Shared>) {
    loop {
        let task = {
            let mut queue = shared.queue.lock().unwrap();
            loop {
                if let Some(task) = queue.pop_front() {
                    // Claim the task as active before releasing the queue lock, so a
                    // concurrent `wait()` can never observe "queue empty, active == 0"
                    // for a task that has been popped but not yet run.
                    shared.active.fetch_add(1, Ordering::SeqCst);
                    break Some(task);
                }
                if *shared.stop.lock().unwrap() {
                    break None;
                }
                queue = shared.wake.wait(queue).unwrap();
            }
        };
        let Some(task) = task else { break };

        task();
        shared.active.fetch_sub(1, Ordering::SeqCst);

        let queue = shared.queue.lock().unwrap();
        if queue.is_empty() && shared.active.load(Ordering::SeqCst) == 0 {
            shared.drain.notify_all();
        }
    }
}
