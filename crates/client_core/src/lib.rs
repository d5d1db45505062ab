//! Client side of the content review workflow: rendering of backend
//! payloads, the page model and the controller that drives both.

pub mod backend;
pub mod controller;
pub mod form;
pub mod format;
pub mod page;
pub mod workflow;

pub use backend::{HttpBackend, ReviewBackend};
pub use controller::{ActionOutcome, UserPrompter, WorkflowController, WorkflowError};
pub use form::{EvaluationForm, FormValues};
pub use page::{PendingRequest, WorkflowPage};
pub use workflow::{Action, SessionState, WorkflowEvent, WorkflowState};
