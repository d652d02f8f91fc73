//! aksup cloud core
//!
//! Provider-independent pieces of provisioning a managed cluster: the
//! desired-state model, the control plane and authenticator traits, and the
//! long-running operation poller that drives a create request to a terminal
//! state.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   aksup CLI                      │
//! │                 (aksup create)                   │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 aksup-cloud                      │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │            OperationPoller                │   │
//! │  │  Running ──► Succeeded | Failed           │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ ControlPlane │  │ Authenticator│            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼──────────┐
//! │ aksup-cloud-azure │
//! │   (ARM + AAD)     │
//! └──────────────────┘
//! ```

pub mod clock;
pub mod error;
pub mod operation;
pub mod poller;
pub mod provider;
pub mod spec;
pub mod state;

// Re-exports
pub use clock::{Clock, TokioClock};
pub use error::{CloudError, Result};
pub use operation::{
    OperationFailure, OperationHandle, OperationOutcome, OperationState, PollStatus,
};
pub use poller::{DEFAULT_POLL_INTERVAL, OperationPoller, outcome_into_result};
pub use provider::{Authenticator, ControlPlane, Credentials};
pub use spec::{AgentPoolMode, AgentPoolProfile, ResourceSpec, ResourceSpecBuilder, ServicePrincipal};
pub use state::{ResourceState, ResourceStatus};
pub use tokio_util::sync::CancellationToken;
