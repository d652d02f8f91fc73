//! Long-running operation types

use crate::state::ResourceState;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque reference to one in-flight asynchronous mutation.
///
/// Control planes attach their own payload (URLs, tokens) when creating a
/// handle and downcast it back in `query_status` / `fetch_result`. Callers
/// only see the operation id.
#[derive(Clone)]
pub struct OperationHandle {
    id: String,
    payload: Arc<dyn Any + Send + Sync>,
}

impl OperationHandle {
    pub fn new<T: Any + Send + Sync>(id: impl Into<String>, payload: T) -> Self {
        Self {
            id: id.into(),
            payload: Arc::new(payload),
        }
    }

    /// Identifier of the operation, for logs
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Provider payload, if it has the expected type
    pub fn payload<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationHandle").field("id", &self.id).finish_non_exhaustive()
    }
}

impl fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Error reported by a status query or by the operation itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationFailure {
    pub code: Option<String>,
    pub message: String,
}

impl OperationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// One observation of an operation's progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollStatus {
    pub done: bool,
    pub error: Option<OperationFailure>,
}

impl PollStatus {
    pub fn running() -> Self {
        Self {
            done: false,
            error: None,
        }
    }

    pub fn succeeded() -> Self {
        Self {
            done: true,
            error: None,
        }
    }

    /// The operation ran to completion and failed
    pub fn failed(error: OperationFailure) -> Self {
        Self {
            done: true,
            error: Some(error),
        }
    }

    /// The status query itself failed; the operation may still be running
    pub fn query_error(error: OperationFailure) -> Self {
        Self {
            done: false,
            error: Some(error),
        }
    }
}

/// Poller state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Running,
    Succeeded,
    Failed,
}

impl OperationState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationState::Running)
    }

    /// Apply one observation. Terminal states absorb every input.
    ///
    /// Any error fails the operation, even with `done == false`.
    pub fn next(self, status: &PollStatus) -> Self {
        match self {
            OperationState::Running => match status {
                PollStatus { error: Some(_), .. } => OperationState::Failed,
                PollStatus { done: true, .. } => OperationState::Succeeded,
                _ => OperationState::Running,
            },
            terminal => terminal,
        }
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationState::Running => write!(f, "running"),
            OperationState::Succeeded => write!(f, "succeeded"),
            OperationState::Failed => write!(f, "failed"),
        }
    }
}

/// Terminal result of polling
#[derive(Debug, Clone)]
pub enum OperationOutcome {
    Succeeded(ResourceState),
    Failed(OperationFailure),
    Cancelled,
}

impl OperationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, OperationOutcome::Succeeded(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_payload_roundtrip() {
        #[derive(Debug, PartialEq)]
        struct Urls(String);

        let handle = OperationHandle::new("op-1", Urls("https://example".into()));
        assert_eq!(handle.id(), "op-1");
        assert_eq!(handle.payload::<Urls>(), Some(&Urls("https://example".into())));
        assert!(handle.payload::<String>().is_none());

        let cloned = handle.clone();
        assert_eq!(cloned.to_string(), "op-1");
    }

    #[test]
    fn test_state_transitions() {
        let running = OperationState::Running;
        assert_eq!(running.next(&PollStatus::running()), OperationState::Running);
        assert_eq!(running.next(&PollStatus::succeeded()), OperationState::Succeeded);
        assert_eq!(
            running.next(&PollStatus::failed(OperationFailure::new("boom"))),
            OperationState::Failed
        );
        assert_eq!(
            running.next(&PollStatus::query_error(OperationFailure::new("blip"))),
            OperationState::Failed
        );
    }

    #[test]
    fn test_terminal_states_absorb() {
        for terminal in [OperationState::Succeeded, OperationState::Failed] {
            assert!(terminal.is_terminal());
            assert_eq!(terminal.next(&PollStatus::running()), terminal);
            assert_eq!(terminal.next(&PollStatus::succeeded()), terminal);
            assert_eq!(
                terminal.next(&PollStatus::query_error(OperationFailure::new("x"))),
                terminal
            );
        }
    }

    #[test]
    fn test_failure_display() {
        assert_eq!(
            OperationFailure::with_code("QuotaExceeded", "quota exceeded").to_string(),
            "QuotaExceeded: quota exceeded"
        );
        assert_eq!(OperationFailure::new("plain").to_string(), "plain");
    }
}
