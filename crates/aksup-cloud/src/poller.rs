//! Long-running operation poller
//!
//! Drives an asynchronous mutation to completion: submit once, then query
//! the operation at a fixed interval until it reaches a terminal state.
//!
//! Any error returned by a status query is treated as fatal, including
//! errors reported while the operation is still running. A transient network
//! failure during polling therefore aborts the wait even though the remote
//! operation may go on to succeed. There are no retries and no backoff.

use crate::clock::{Clock, TokioClock};
use crate::error::{CloudError, Result};
use crate::operation::{OperationFailure, OperationHandle, OperationOutcome, OperationState};
use crate::provider::ControlPlane;
use crate::spec::ResourceSpec;
use crate::state::ResourceState;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default wait between status queries
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Polls one operation at a time against a control plane
pub struct OperationPoller<'a, P: ControlPlane + ?Sized, C: Clock = TokioClock> {
    control_plane: &'a P,
    clock: C,
    interval: Duration,
    cancel: CancellationToken,
}

impl<'a, P: ControlPlane + ?Sized> OperationPoller<'a, P, TokioClock> {
    pub fn new(control_plane: &'a P) -> Self {
        Self {
            control_plane,
            clock: TokioClock,
            interval: DEFAULT_POLL_INTERVAL,
            cancel: CancellationToken::new(),
        }
    }
}

impl<'a, P: ControlPlane + ?Sized, C: Clock> OperationPoller<'a, P, C> {
    pub fn with_clock<K: Clock>(self, clock: K) -> OperationPoller<'a, P, K> {
        OperationPoller {
            control_plane: self.control_plane,
            clock,
            interval: self.interval,
            cancel: self.cancel,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Abort local polling when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Submit the create-or-update request
    pub async fn submit(
        &self,
        resource_group: &str,
        name: &str,
        spec: &ResourceSpec,
    ) -> Result<OperationHandle> {
        tracing::info!(
            provider = self.control_plane.name(),
            resource_group,
            name,
            "submitting create request"
        );
        let handle = self
            .control_plane
            .create_or_update(resource_group, name, spec)
            .await
            .map_err(|e| match e {
                CloudError::Io(_) | CloudError::Json(_) => CloudError::Submission(e.to_string()),
                other => other,
            })?;
        tracing::debug!(operation = %handle, "operation accepted");
        Ok(handle)
    }

    /// Query `handle` until it terminates.
    ///
    /// Returns `Err` only when the final result fetch fails; operation
    /// failure and cancellation are reported through [`OperationOutcome`].
    pub async fn poll_until_done(&self, handle: &OperationHandle) -> Result<OperationOutcome> {
        let mut state = OperationState::Running;
        let mut polls: u32 = 0;

        loop {
            if self.cancel.is_cancelled() {
                tracing::warn!(operation = %handle, polls, "polling cancelled");
                return Ok(OperationOutcome::Cancelled);
            }

            tracing::info!(operation = %handle, "waiting for create to finish");
            let status = tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::warn!(operation = %handle, polls, "polling cancelled during status query");
                    return Ok(OperationOutcome::Cancelled);
                }
                status = self.control_plane.query_status(handle) => status,
            };
            polls += 1;
            state = state.next(&status);

            match state {
                OperationState::Succeeded => {
                    tracing::info!(operation = %handle, polls, "operation finished");
                    let fetched = tokio::select! {
                        _ = self.cancel.cancelled() => {
                            tracing::warn!(operation = %handle, "cancelled while fetching result");
                            return Ok(OperationOutcome::Cancelled);
                        }
                        fetched = self.control_plane.fetch_result(handle) => fetched,
                    };
                    let resource = fetched.map_err(|e| match e {
                        CloudError::ResultFetch(_) => e,
                        other => CloudError::ResultFetch(other.to_string()),
                    })?;
                    return Ok(OperationOutcome::Succeeded(resource));
                }
                OperationState::Failed => {
                    let failure = status
                        .error
                        .unwrap_or_else(|| OperationFailure::new("operation failed"));
                    tracing::error!(operation = %handle, polls, error = %failure, "operation failed");
                    return Ok(OperationOutcome::Failed(failure));
                }
                OperationState::Running => {}
            }

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::warn!(operation = %handle, polls, "polling cancelled");
                    return Ok(OperationOutcome::Cancelled);
                }
                _ = self.clock.sleep(self.interval) => {}
            }
        }
    }

    /// Submit, poll to completion and return the realized resource
    pub async fn provision(
        &self,
        resource_group: &str,
        name: &str,
        spec: &ResourceSpec,
    ) -> Result<ResourceState> {
        let handle = self.submit(resource_group, name, spec).await?;
        let outcome = self.poll_until_done(&handle).await?;
        outcome_into_result(&handle, outcome)
    }
}

/// Convert a terminal outcome into the error taxonomy
pub fn outcome_into_result(
    handle: &OperationHandle,
    outcome: OperationOutcome,
) -> Result<ResourceState> {
    match outcome {
        OperationOutcome::Succeeded(resource) => Ok(resource),
        OperationOutcome::Failed(failure) => Err(CloudError::Operation(failure.to_string())),
        OperationOutcome::Cancelled => Err(CloudError::Cancelled(handle.id().to_string())),
    }
}
