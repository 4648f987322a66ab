// Execution contexts used to hop between lookup and display work

use crossbeam_channel::{Receiver, Sender, unbounded};

pub type Job = Box<dyn FnOnce() + Send + 'static>;

pub trait ExecutionContext: Send + Sync {
    fn execute(&self, job: Job);
}

/// Runs jobs immediately on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct Inline;

impl ExecutionContext for Inline {
    fn execute(&self, job: Job) {
        job();
    }
}

/// Runs jobs on the global rayon pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct Background;

impl ExecutionContext for Background {
    fn execute(&self, job: Job) {
        rayon::spawn(job);
    }
}

/// Queues jobs for the thread that owns the matching [`MainQueueRunner`],
/// typically the UI loop.
#[derive(Clone)]
pub struct MainQueue {
    tx: Sender<Job>,
}

pub struct MainQueueRunner {
    rx: Receiver<Job>,
}

impl MainQueue {
    pub fn new() -> (Self, MainQueueRunner) {
        let (tx, rx) = unbounded();
        (Self { tx }, MainQueueRunner { rx })
    }
}

impl ExecutionContext for MainQueue {
    fn execute(&self, job: Job) {
        if self.tx.send(job).is_err() {
            log::debug!("Main queue closed, dropping job");
        }
    }
}

impl MainQueueRunner {
    /// Runs every job queued so far and returns how many ran.
    pub fn drain(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}
