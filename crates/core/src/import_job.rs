//! In-process registry for asynchronous import-and-validate jobs.
//!
//! Each running job is tracked under an opaque UUID handle. The
//! registry is an explicit synchronized type injected wherever jobs are
//! started or queried, never a bare global. All counter updates and
//! terminal transitions happen under the registry mutex, so concurrent
//! progress readers always observe a consistent snapshot.
//!
//! Cancellation is cooperative: [`ImportJobRegistry::cancel`] trips the
//! job's [`CancellationToken`]; the classification loop checks it at
//! each parcel boundary and then records the terminal state. Callers
//! must tolerate the delay between `cancel` returning and the job
//! reaching the cancelled state.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Opaque identifier for one import job.
pub type ImportHandle = Uuid;

/// Progress snapshot returned to pollers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportProgress {
    pub total: usize,
    pub processed: usize,
    /// True once the job reached any terminal state (finished, failed,
    /// or cancelled).
    pub finished: bool,
    pub cancelled: bool,
    /// Captured error message for failed jobs.
    pub error: Option<String>,
}

#[derive(Debug)]
struct JobEntry {
    total: usize,
    processed: usize,
    finished: bool,
    cancelled: bool,
    error: Option<String>,
    cancel: CancellationToken,
}

/// Process-wide registry of import jobs.
#[derive(Debug, Default)]
pub struct ImportJobRegistry {
    jobs: Mutex<HashMap<ImportHandle, JobEntry>>,
}

impl ImportJobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job with a known item count and return its handle.
    pub fn register(&self, total: usize) -> ImportHandle {
        let handle = Uuid::new_v4();
        let entry = JobEntry {
            total,
            processed: 0,
            finished: false,
            cancelled: false,
            error: None,
            cancel: CancellationToken::new(),
        };
        self.lock().insert(handle, entry);
        handle
    }

    /// Progress snapshot for a job, or `None` for an unknown handle.
    pub fn progress(&self, handle: ImportHandle) -> Option<ImportProgress> {
        self.lock().get(&handle).map(|entry| ImportProgress {
            total: entry.total,
            processed: entry.processed,
            finished: entry.finished,
            cancelled: entry.cancelled,
            error: entry.error.clone(),
        })
    }

    /// Request cancellation. Returns `false` for unknown handles and
    /// jobs that already reached a terminal state; the stored state is
    /// unchanged in both cases.
    pub fn cancel(&self, handle: ImportHandle) -> bool {
        let mut jobs = self.lock();
        match jobs.get_mut(&handle) {
            Some(entry) if !entry.finished => {
                entry.cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// The job's cancellation token, for the classification loop to
    /// poll at parcel boundaries.
    pub fn cancellation_token(&self, handle: ImportHandle) -> Option<CancellationToken> {
        self.lock().get(&handle).map(|entry| entry.cancel.clone())
    }

    /// Record one processed parcel. Saturates at `total`.
    pub fn record_processed(&self, handle: ImportHandle) {
        let mut jobs = self.lock();
        if let Some(entry) = jobs.get_mut(&handle) {
            if entry.processed < entry.total {
                entry.processed += 1;
            }
        }
    }

    /// Transition to the finished terminal state.
    pub fn finish(&self, handle: ImportHandle) {
        let mut jobs = self.lock();
        if let Some(entry) = jobs.get_mut(&handle) {
            entry.finished = true;
        }
    }

    /// Transition to the failed terminal state with a captured message.
    pub fn fail(&self, handle: ImportHandle, message: impl Into<String>) {
        let mut jobs = self.lock();
        if let Some(entry) = jobs.get_mut(&handle) {
            entry.finished = true;
            entry.error = Some(message.into());
        }
    }

    /// Transition to the cancelled terminal state. Called by the
    /// classification loop once it observes the tripped token.
    pub fn mark_cancelled(&self, handle: ImportHandle) {
        let mut jobs = self.lock();
        if let Some(entry) = jobs.get_mut(&handle) {
            entry.finished = true;
            entry.cancelled = true;
        }
    }

    /// Drop a job entry entirely (housekeeping for long-lived processes).
    pub fn remove(&self, handle: ImportHandle) -> bool {
        self.lock().remove(&handle).is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ImportHandle, JobEntry>> {
        self.jobs.lock().expect("import job registry lock poisoned")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
