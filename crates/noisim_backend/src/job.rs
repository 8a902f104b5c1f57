//! Asynchronous simulation jobs
//!
//! Gantree: L5_Backend → Job
//!
//! A [`JobHandle`] is returned by [`SimulationBackend::run`] while the
//! simulation runs on a worker thread. Handles are cheap to clone; every
//! clone observes the same job.
//!
//! [`SimulationBackend::run`]: crate::execution::SimulationBackend::run

use crate::execution::ExecutionResult;
use noisim_core::{InsError, InsResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

/// Job status
/// Gantree: JobStatus // 작업 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Submitted, worker not started yet
    Queued,

    /// Worker is simulating
    Running,

    /// Counts are available
    Completed,

    /// Simulation returned an error
    Failed,
}

impl JobStatus {
    /// Check if job is in terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Check if job is still running
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }

    /// Check if job completed successfully
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Completed => "DONE",
            Self::Failed => "ERROR",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug)]
enum JobState {
    Queued,
    Running,
    Completed(ExecutionResult),
    Failed(String),
}

impl JobState {
    fn status(&self) -> JobStatus {
        match self {
            JobState::Queued => JobStatus::Queued,
            JobState::Running => JobStatus::Running,
            JobState::Completed(_) => JobStatus::Completed,
            JobState::Failed(_) => JobStatus::Failed,
        }
    }
}

#[derive(Debug)]
struct JobShared {
    state: Mutex<JobState>,
    done: Condvar,
}

/// Handle to a submitted simulation
/// Gantree: JobHandle // 작업 핸들
#[derive(Debug, Clone)]
pub struct JobHandle {
    job_id: String,
    backend: String,
    shared: Arc<JobShared>,
}

impl JobHandle {
    /// Start `work` on a new worker thread
    /// Gantree: spawn(job_id, backend, work) -> Result<JobHandle>
    pub fn spawn<F>(job_id: impl Into<String>, backend: impl Into<String>, work: F) -> InsResult<Self>
    where
        F: FnOnce() -> InsResult<ExecutionResult> + Send + 'static,
    {
        let handle = Self {
            job_id: job_id.into(),
            backend: backend.into(),
            shared: Arc::new(JobShared {
                state: Mutex::new(JobState::Queued),
                done: Condvar::new(),
            }),
        };

        let shared = Arc::clone(&handle.shared);
        thread::Builder::new()
            .name(format!("noisim-{}", handle.job_id))
            .spawn(move || {
                set_state(&shared, JobState::Running);
                let outcome = match panic::catch_unwind(AssertUnwindSafe(work)) {
                    Ok(Ok(result)) => JobState::Completed(result),
                    Ok(Err(err)) => JobState::Failed(err.to_string()),
                    Err(_) => JobState::Failed("simulation worker panicked".to_string()),
                };
                set_state(&shared, outcome);
                shared.done.notify_all();
            })
            .map_err(|e| {
                InsError::BackendError(format!("cannot start job {}: {}", handle.job_id, e))
            })?;

        log::debug!("job {} submitted to {}", handle.job_id, handle.backend);
        Ok(handle)
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Name of the backend running the job
    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn status(&self) -> JobStatus {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .status()
    }

    pub fn is_done(&self) -> bool {
        self.status().is_terminal()
    }

    /// Outcome if the job has finished, `None` while it runs
    pub fn try_result(&self) -> Option<InsResult<ExecutionResult>> {
        let state = self
            .shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.outcome(&state)
    }

    /// Block until the job finishes
    /// Gantree: wait() -> Result<ExecutionResult> // 결과 대기
    pub fn wait(&self) -> InsResult<ExecutionResult> {
        let state = self.shared.state.lock()?;
        let state = self
            .shared
            .done
            .wait_while(state, |s| !s.status().is_terminal())?;
        self.outcome(&state).unwrap_or_else(|| {
            Err(InsError::InternalError(format!(
                "job {} woke up unfinished",
                self.job_id
            )))
        })
    }

    /// Block for at most `timeout`; `None` if the job is still running
    pub fn wait_timeout(&self, timeout: Duration) -> Option<InsResult<ExecutionResult>> {
        let state = self
            .shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (state, _) = self
            .shared
            .done
            .wait_timeout_while(state, timeout, |s| !s.status().is_terminal())
            .unwrap_or_else(PoisonError::into_inner);
        self.outcome(&state)
    }

    fn outcome(&self, state: &JobState) -> Option<InsResult<ExecutionResult>> {
        match state {
            JobState::Completed(result) => Some(Ok(result.clone())),
            JobState::Failed(reason) => Some(Err(InsError::JobFailed {
                job_id: self.job_id.clone(),
                reason: reason.clone(),
            })),
            JobState::Queued | JobState::Running => None,
        }
    }
}

// Only whole states are ever stored, so a poisoned lock still holds a valid one
fn set_state(shared: &JobShared, next: JobState) {
    let mut state = shared.state.lock().unwrap_or_else(PoisonError::into_inner);
    *state = next;
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Job({}, backend={}, {})", self.job_id, self.backend, self.status())
    }
}

// ============================================================================
// Tests
// ============================================================================
