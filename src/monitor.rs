//! Periodic reload scheduling.
//!
//! A [`ReloadScheduler`] owns one worker thread that runs every scheduled job
//! in turn, so two reloads of the same factory never overlap. Each factory
//! schedules one [`Monitor`], which checks its source for changes and
//! installs a freshly built synonym map when it finds one.
//!
//! ```text
//! tick ─> detect_change ─┬─ unchanged ─> done
//!                        └─ changed ──> fetch ─> parse ─> build ─> store ─> sweep
//! ```
//!
//! Errors never leave [`Monitor::run`]; they are logged and the previous map
//! stays active until the next tick.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use lazy_static::lazy_static;
use log::{debug, error, info, warn};

use crate::error::{Result, SynonymError};
use crate::factory::{ReloadOutcome, ReloadState};

type Job = Box<dyn FnMut() + Send>;

enum Command {
    Schedule {
        id: u64,
        name: String,
        period: Duration,
        job: Job,
    },
    Cancel(u64),
}

struct Entry {
    name: String,
    period: Duration,
    job: Job,
}

lazy_static! {
    static ref GLOBAL_SCHEDULER: std::result::Result<ReloadScheduler, String> =
        ReloadScheduler::new("synonym-reload").map_err(|e| e.to_string());
}

/// Runs recurring jobs on a dedicated thread.
///
/// The first run of a job happens one full period after it is scheduled.
/// After each run the next one is due at `max(previous due + period, now)`,
/// so a slow run delays the following tick instead of queueing extra ones.
pub struct ReloadScheduler {
    sender: Sender<Command>,
    next_id: AtomicU64,
}

impl ReloadScheduler {
    /// Start a scheduler with its own worker thread.
    pub fn new(thread_name: &str) -> Result<Self> {
        let (sender, receiver) = unbounded();
        thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || Self::work(receiver))?;

        Ok(ReloadScheduler {
            sender,
            next_id: AtomicU64::new(0),
        })
    }

    /// The process-wide scheduler shared by all factories.
    pub fn global() -> Result<&'static ReloadScheduler> {
        GLOBAL_SCHEDULER.as_ref().map_err(|e| {
            SynonymError::configuration(format!("failed to start reload scheduler: {e}"))
        })
    }

    /// Run `job` every `period`, starting one period from now.
    pub fn schedule<F>(&self, name: &str, period: Duration, job: F) -> Result<ScheduledJob>
    where
        F: FnMut() + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.sender
            .send(Command::Schedule {
                id,
                name: name.to_string(),
                period,
                job: Box::new(job),
            })
            .map_err(|_| SynonymError::configuration("reload scheduler is not running"))?;

        debug!("scheduled [{name}] every {period:?}");
        Ok(ScheduledJob {
            id,
            name: name.to_string(),
            sender: self.sender.clone(),
            cancelled: AtomicBool::new(false),
        })
    }

    fn work(receiver: Receiver<Command>) {
        let mut jobs: HashMap<u64, Entry> = HashMap::new();
        let mut queue: BinaryHeap<Reverse<(Instant, u64)>> = BinaryHeap::new();

        loop {
            Self::run_due(&mut jobs, &mut queue);

            let command = match queue.peek() {
                Some(Reverse((due, _))) => {
                    receiver.recv_timeout(due.saturating_duration_since(Instant::now()))
                }
                None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match command {
                Ok(Command::Schedule {
                    id,
                    name,
                    period,
                    job,
                }) => {
                    queue.push(Reverse((Instant::now() + period, id)));
                    jobs.insert(id, Entry { name, period, job });
                }
                Ok(Command::Cancel(id)) => {
                    if let Some(entry) = jobs.remove(&id) {
                        debug!("cancelled [{}]", entry.name);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!("reload scheduler stopped");
    }

    fn run_due(jobs: &mut HashMap<u64, Entry>, queue: &mut BinaryHeap<Reverse<(Instant, u64)>>) {
        while let Some(&Reverse((due, id))) = queue.peek() {
            if due > Instant::now() {
                break;
            }
            queue.pop();

            // cancelled jobs leave their last due time behind
            let Some(entry) = jobs.get_mut(&id) else {
                continue;
            };

            if panic::catch_unwind(AssertUnwindSafe(|| (entry.job)())).is_err() {
                error!("scheduled job [{}] panicked", entry.name);
            }

            let next = (due + entry.period).max(Instant::now());
            queue.push(Reverse((next, id)));
        }
    }
}

/// Handle to a scheduled job. Dropping it cancels the job.
pub struct ScheduledJob {
    id: u64,
    name: String,
    sender: Sender<Command>,
    cancelled: AtomicBool,
}

impl ScheduledJob {
    /// Stop running the job. A run already in progress completes.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            debug!("cancelling reload job {}", self.name);
            // a stopped worker has nothing left to cancel
            let _ = self.sender.send(Command::Cancel(self.id));
        }
    }

    /// Whether [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Drop for ScheduledJob {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// The recurring reload job of one factory.
pub struct Monitor {
    state: Arc<ReloadState>,
}

impl Monitor {
    /// Create a monitor driving `state`.
    pub fn new(state: Arc<ReloadState>) -> Self {
        Monitor { state }
    }

    /// Run one reload cycle, logging the outcome.
    pub fn run(&self) {
        let location = self.state.location();
        match self.state.reload_if_changed() {
            Ok(ReloadOutcome::Unchanged) => {
                debug!("synonyms at {location} unchanged");
            }
            Ok(ReloadOutcome::Reloaded { filters_updated }) => {
                info!("reloaded synonyms from {location}, updated {filters_updated} filters");
            }
            Err(e) if e.is_reload_recoverable() => {
                warn!("skipped synonym reload from {location}, keeping previous synonyms: {e}");
            }
            Err(e) => {
                error!("synonym reload from {location} failed: {e}");
            }
        }
    }
}
