use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use tracing::{debug, error};

/// Fixed set of worker threads pulling connection jobs from a shared queue.
///
/// Dropping the pool closes the queue, lets the workers finish what they already took and
/// joins them.
pub struct ThreadPool {
    workers: Vec<Worker>,
    sender: Option<mpsc::Sender<Job>>,
}

impl ThreadPool {
    /// Create a new ThreadPool with `size` threads.
    ///
    /// 'size' must be greater than 0.
    pub fn new(size: usize) -> ThreadPool {
        assert!(size > 0, "ThreadPool size must be greater than 0");

        let (sender, receiver) = mpsc::channel();
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size)
            .map(|id| Worker::new(id, Arc::clone(&receiver)))
            .collect();
        debug!(size, "Thread pool started");

        ThreadPool {
            workers,
            sender: Some(sender),
        }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue a task to run on the threadpool when a worker is available.
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let queued = self
            .sender
            .as_ref()
            .map(|sender| sender.send(Box::new(f)).is_ok())
            .unwrap_or(false);
        if !queued {
            error!("Thread pool is shutting down, job dropped");
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        drop(self.sender.take());
        for worker in &mut self.workers {
            if let Some(thread) = worker.handle.take() {
                if thread.join().is_err() {
                    error!(worker = worker.id, "Worker panicked");
                }
            }
        }
    }
}

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Worker {
    id: usize,
    handle: Option<thread::JoinHandle<()>>,
}

impl Worker {
    /// Spawn a thread running jobs from `receiver` until the sending side is dropped
    fn new(id: usize, receiver: Arc<Mutex<mpsc::Receiver<Job>>>) -> Worker {
        let handle = thread::spawn(move || loop {
            let message = match receiver.lock() {
                Ok(receiver) => receiver.recv(),
                Err(_) => break,
            };
            match message {
                Ok(job) => job(),
                Err(_) => {
                    debug!(worker = id, "Worker stopping");
                    break;
                }
            }
        });
        Worker {
            id,
            handle: Some(handle),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_threadpool_runs_every_job() {
        let results = Arc::new(Mutex::new(Vec::<u64>::new()));
        {
            let pool = ThreadPool::new(4);
            assert_eq!(pool.size(), 4);
            for i in 0..10 {
                let vec_handle = Arc::clone(&results);
                pool.execute(move || vec_handle.lock().unwrap().push(i));
            }
            // Dropping the pool waits for the queue to drain
        }

        let mut results = results.lock().unwrap().clone();
        results.sort();
        assert_eq!(results, (0..10).collect::<Vec<_>>());
    }

    #[test]
    #[should_panic]
    fn test_empty_threadpool() {
        ThreadPool::new(0);
    }
}
