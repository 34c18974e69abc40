// src/poller.rs
//! The export-task poll loop — the state machine at the heart of the
//! workflow.
//!
//! A created export job is checked once per fixed interval until the
//! provider reports a terminal status or the attempt cap is exhausted:
//! `Created → Polling → {Succeeded, Failed, TimedOut, Cancelled}`. All
//! right-hand states are terminal; a job never transitions out of one.
//! Timeout is structural — the cap bounds total wait at
//! `interval * max_attempts` without a wall-clock timer.

use crate::api::{ExportApi, ExportCheck};
use crate::constants::{POLL_INTERVAL, POLL_MAX_ATTEMPTS};
use crate::error::{AppError, JobStatus};
use crate::types::DocumentRef;
use std::time::Duration;
use tokio::sync::watch;

/// Interval and attempt cap for one poll run.
///
/// The defaults poll every 2 seconds for at most 30 attempts (60 s worst
/// case). Tests shrink the interval to keep runs instant.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            max_attempts: POLL_MAX_ATTEMPTS,
        }
    }
}

/// Lifecycle state of an export job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Ticket obtained, no status check yet
    Created,
    /// At least one check made, none terminal so far
    Polling,
    /// Provider reported success; a file token is recorded
    Succeeded,
    /// Provider reported a failure status
    Failed,
    /// The attempt cap was exhausted while still polling
    TimedOut,
    /// An external cancellation signal aborted the loop
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed | Self::TimedOut | Self::Cancelled
        )
    }
}

/// A provider-side export job tracked through its lifecycle.
///
/// Constructed when task creation succeeds; mutated only by the poller.
/// Only `Succeeded` carries a usable `file_token`.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub ticket: String,
    pub doc: DocumentRef,
    pub status: JobState,
    pub file_token: Option<String>,
    pub error_detail: Option<String>,
    /// The raw provider status code when the job failed.
    pub failure_code: Option<i64>,
    /// Number of status checks made.
    pub attempts: u32,
}

impl ExportJob {
    fn new(ticket: String, doc: DocumentRef) -> Self {
        Self {
            ticket,
            doc,
            status: JobState::Created,
            file_token: None,
            error_detail: None,
            failure_code: None,
            attempts: 0,
        }
    }

    fn record_check(&mut self) {
        debug_assert!(!self.status.is_terminal());
        self.status = JobState::Polling;
        self.attempts += 1;
    }

    fn succeed(&mut self, file_token: String) {
        debug_assert!(!self.status.is_terminal());
        self.status = JobState::Succeeded;
        self.file_token = Some(file_token);
    }

    fn fail(&mut self, code: i64, detail: Option<String>) {
        debug_assert!(!self.status.is_terminal());
        self.status = JobState::Failed;
        self.failure_code = Some(code);
        self.error_detail = detail;
    }

    fn time_out(&mut self) {
        debug_assert!(!self.status.is_terminal());
        self.status = JobState::TimedOut;
    }

    fn cancel(&mut self) {
        debug_assert!(!self.status.is_terminal());
        self.status = JobState::Cancelled;
    }
}

/// Drives an export job to a terminal state by bounded linear polling.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportPoller {
    policy: PollPolicy,
}

impl ExportPoller {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    /// Polls without an external cancellation source.
    pub async fn run(
        &self,
        api: &dyn ExportApi,
        doc: &DocumentRef,
        ticket: &str,
        access_token: &str,
    ) -> Result<ExportJob, AppError> {
        // A channel whose sender lives for the whole run never fires.
        let (_keep_alive, cancel) = watch::channel(false);
        self.run_with_cancel(api, doc, ticket, access_token, cancel)
            .await
    }

    /// Polls until terminal, aborting between attempts when `cancel`
    /// flips to `true`.
    ///
    /// Returns the terminal [`ExportJob`]; provider/transport errors from
    /// an individual check propagate as `Err` — the loop retries status,
    /// not failures.
    pub async fn run_with_cancel(
        &self,
        api: &dyn ExportApi,
        doc: &DocumentRef,
        ticket: &str,
        access_token: &str,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<ExportJob, AppError> {
        let mut job = ExportJob::new(ticket.to_string(), doc.clone());
        log::info!("Polling export task {} for {}", job.ticket, doc);

        while job.attempts < self.policy.max_attempts {
            if self.wait_or_cancelled(&mut cancel).await {
                log::info!("Export task {} cancelled", job.ticket);
                job.cancel();
                return Ok(job);
            }

            let check = api.check_export_task(&job.ticket, doc, access_token).await?;
            job.record_check();

            match check.status {
                JobStatus::Success => {
                    let file_token = check.file_token.ok_or_else(|| {
                        AppError::MalformedResponse(
                            "export succeeded but no file_token was returned".to_string(),
                        )
                    })?;
                    log::info!(
                        "Export task {} succeeded after {} checks",
                        job.ticket,
                        job.attempts
                    );
                    job.succeed(file_token);
                    return Ok(job);
                }
                JobStatus::Queued | JobStatus::Processing => {
                    log::debug!(
                        "Export task {} still {} (attempt {}/{})",
                        job.ticket,
                        check.status,
                        job.attempts,
                        self.policy.max_attempts
                    );
                }
                JobStatus::Failure(code) => {
                    log::warn!(
                        "Export task {} failed with status {}: {:?}",
                        job.ticket,
                        code,
                        check.error_message
                    );
                    job.fail(code, check.error_message);
                    return Ok(job);
                }
                JobStatus::Unrecognized(code) => {
                    // Treated as non-terminal, same as queued. Permissive
                    // on purpose: the provider has shipped undocumented
                    // transient codes, and the attempt cap still bounds
                    // the wait.
                    log::warn!(
                        "Export task {} returned unrecognized status {}, continuing to poll",
                        job.ticket,
                        code
                    );
                }
            }
        }

        log::warn!(
            "Export task {} timed out after {} checks",
            job.ticket,
            job.attempts
        );
        job.time_out();
        Ok(job)
    }

    /// Waits one poll interval; returns `true` if cancellation fired first.
    async fn wait_or_cancelled(&self, cancel: &mut watch::Receiver<bool>) -> bool {
        if *cancel.borrow() {
            return true;
        }
        let sleep = tokio::time::sleep(self.policy.interval);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return false,
                changed = cancel.changed() => match changed {
                    Ok(()) if *cancel.borrow() => return true,
                    Ok(()) => continue,
                    Err(_) => {
                        // Sender dropped: no cancellation can arrive anymore.
                        sleep.as_mut().await;
                        return false;
                    }
                },
            }
        }
    }
}
