//! Drives the review workflow: issues backend requests for user actions,
//! renders the responses into the page and carries the evaluation/feedback
//! forward between requests.

use std::sync::Arc;

use shared::{
    domain::FormattableValue,
    error::InvalidScore,
    protocol::{GenerateRequest, IncorporateFeedbackRequest, SubmitFeedbackRequest},
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    backend::ReviewBackend,
    form::FormValues,
    page::{PendingRequest, WorkflowPage, FEEDBACK_HEADING, UPDATED_FEEDBACK_HEADING},
    workflow::{Action, SessionState, WorkflowEvent, WorkflowState},
};

pub const ADDITIONAL_FEEDBACK_PROMPT: &str = "Please provide additional feedback for improvement:";
pub const NO_IMPROVEMENTS_MESSAGE: &str =
    "No further improvements needed. You can start a new interaction.";
pub const INCORPORATE_ERROR_MESSAGE: &str =
    "An error occurred while incorporating additional feedback.";

/// Blocking interactions with the person at the keyboard.
pub trait UserPrompter: Send + Sync {
    /// Asks for free text; `None` when the user dismisses the prompt.
    fn prompt(&self, message: &str) -> Option<String>;
    fn notify(&self, message: &str);
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{operation} request failed: {source:#}")]
    Request {
        operation: &'static str,
        source: anyhow::Error,
    },
    #[error("{event:?} is not allowed while {state:?}")]
    IllegalTransition {
        state: WorkflowState,
        event: WorkflowEvent,
    },
    #[error("a {} request is already in flight", .0.operation())]
    RequestInFlight(PendingRequest),
    #[error(transparent)]
    InvalidScore(#[from] InvalidScore),
    #[error("no generated content to review")]
    NothingToReview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Improvements were requested and new content was generated.
    Regenerated,
    /// Nothing left to improve; the page was reset.
    Completed,
    FeedbackUpdated,
    /// The user supplied no additional feedback; nothing was sent.
    Aborted,
    Reset,
}

struct ControllerState {
    workflow: WorkflowState,
    session: SessionState,
    page: WorkflowPage,
}

impl ControllerState {
    fn ensure_allowed(&self, event: WorkflowEvent) -> Result<(), WorkflowError> {
        if let Some(pending) = self.page.pending() {
            return Err(WorkflowError::RequestInFlight(pending));
        }
        if !self.workflow.accepts(event) {
            return Err(WorkflowError::IllegalTransition {
                state: self.workflow,
                event,
            });
        }
        Ok(())
    }

    fn begin(&mut self, event: WorkflowEvent, request: PendingRequest) -> Result<(), WorkflowError> {
        self.ensure_allowed(event)?;
        self.page.begin_request(request);
        Ok(())
    }

    fn advance(&mut self, event: WorkflowEvent) {
        if let Some(next) = self.workflow.transition(event) {
            debug!(from = ?self.workflow, to = ?next, ?event, "workflow transition");
            self.workflow = next;
        }
    }

    fn reset(&mut self) {
        self.page.reset();
        self.session = SessionState::default();
        self.advance(WorkflowEvent::Reset);
    }
}

pub struct WorkflowController {
    backend: Arc<dyn ReviewBackend>,
    prompter: Arc<dyn UserPrompter>,
    inner: Mutex<ControllerState>,
}

impl WorkflowController {
    pub fn new(backend: Arc<dyn ReviewBackend>, prompter: Arc<dyn UserPrompter>) -> Arc<Self> {
        Arc::new(Self {
            backend,
            prompter,
            inner: Mutex::new(ControllerState {
                workflow: WorkflowState::Idle,
                session: SessionState::default(),
                page: WorkflowPage::new(),
            }),
        })
    }

    pub async fn state(&self) -> WorkflowState {
        self.inner.lock().await.workflow
    }

    pub async fn page(&self) -> WorkflowPage {
        self.inner.lock().await.page.clone()
    }

    pub async fn session(&self) -> SessionState {
        self.inner.lock().await.session.clone()
    }

    /// Sends `prompt` for generation and renders the content, evaluation and
    /// rating form on success.
    pub async fn generate(&self, prompt: &str) -> Result<(), WorkflowError> {
        let iteration = {
            let mut inner = self.inner.lock().await;
            inner.begin(WorkflowEvent::Generate, PendingRequest::Generate)?;
            inner.page.set_prompt_input(prompt);
            inner.session.iteration + 1
        };
        info!(iteration, "requesting content generation");

        let result = self
            .backend
            .generate(&GenerateRequest {
                prompt: prompt.to_string(),
            })
            .await;

        let mut inner = self.inner.lock().await;
        inner.page.finish_request();
        match result {
            Ok(response) => {
                info!(
                    iteration,
                    criteria = response.criteria.len(),
                    has_evaluation = response.evaluation.is_some(),
                    "content generated"
                );
                let content_html = inner.page.show_generated(
                    &response.content,
                    response.acknowledgment.as_deref(),
                    response.evaluation.as_ref(),
                    response.criteria,
                );
                inner.session.content_html = content_html;
                inner.session.current_evaluation = response.evaluation;
                inner.session.iteration = iteration;
                inner.advance(WorkflowEvent::Generate);
                Ok(())
            }
            Err(source) => {
                error!(error = %format!("{source:#}"), "content generation failed");
                inner.page.show_generate_error();
                Err(WorkflowError::Request {
                    operation: PendingRequest::Generate.operation(),
                    source,
                })
            }
        }
    }

    /// Re-runs generation with whatever the prompt field currently holds.
    pub async fn regenerate(&self) -> Result<(), WorkflowError> {
        let prompt = self.inner.lock().await.page.prompt_input().to_string();
        self.generate(&prompt).await
    }

    /// Submits the reviewer's ratings for the rendered criteria.
    pub async fn submit_feedback(&self, values: &FormValues) -> Result<(), WorkflowError> {
        let request = {
            let mut inner = self.inner.lock().await;
            inner.ensure_allowed(WorkflowEvent::SubmitFeedback)?;
            let user_eval_content = inner
                .page
                .form()
                .ok_or(WorkflowError::NothingToReview)?
                .collect(values)?;
            inner.begin(WorkflowEvent::SubmitFeedback, PendingRequest::SubmitFeedback)?;

            SubmitFeedbackRequest {
                recent_iterations: Vec::new(),
                prompt: inner.page.prompt_input().to_string(),
                content: inner.session.content_html.clone(),
                evaluation: inner.session.current_evaluation.clone(),
                user_eval_content,
                user_feedback_evaluator: values.evaluator_feedback().to_string(),
            }
        };
        info!(
            criteria = request.user_eval_content.scores.len(),
            "submitting reviewer feedback"
        );

        let result = self.backend.submit_feedback(&request).await;

        let mut inner = self.inner.lock().await;
        inner.page.finish_request();
        match result {
            Ok(response) => {
                info!("feedback analysis received");
                inner.page.show_feedback(FEEDBACK_HEADING, &response.feedback);
                inner.session.current_feedback = Some(response.feedback);
                inner.advance(WorkflowEvent::SubmitFeedback);
                Ok(())
            }
            Err(source) => {
                error!(error = %format!("{source:#}"), "feedback submission failed");
                inner.page.show_submit_error();
                Err(WorkflowError::Request {
                    operation: PendingRequest::SubmitFeedback.operation(),
                    source,
                })
            }
        }
    }

    pub async fn handle_action(&self, action: Action) -> Result<ActionOutcome, WorkflowError> {
        debug!(%action, "handling follow-up action");
        match action {
            Action::Continue => self.continue_review().await,
            Action::Disagree => self.disagree().await,
            Action::Quit => self.quit().await,
        }
    }

    pub async fn continue_review(&self) -> Result<ActionOutcome, WorkflowError> {
        let improvements_needed = {
            let inner = self.inner.lock().await;
            inner.ensure_allowed(WorkflowEvent::Continue)?;
            inner.session.improvements_needed()
        };

        if improvements_needed {
            info!("improvements requested; generating next iteration");
            self.regenerate().await?;
            return Ok(ActionOutcome::Regenerated);
        }

        info!("no further improvements needed");
        self.prompter.notify(NO_IMPROVEMENTS_MESSAGE);
        self.inner.lock().await.reset();
        Ok(ActionOutcome::Completed)
    }

    /// Asks the reviewer why they disagree and has the feedback revised.
    pub async fn disagree(&self) -> Result<ActionOutcome, WorkflowError> {
        self.inner
            .lock()
            .await
            .ensure_allowed(WorkflowEvent::Disagree)?;

        let Some(additional_feedback) = self
            .prompter
            .prompt(ADDITIONAL_FEEDBACK_PROMPT)
            .filter(|text| !text.trim().is_empty())
        else {
            debug!("no additional feedback given; nothing sent");
            return Ok(ActionOutcome::Aborted);
        };

        let request = {
            let mut inner = self.inner.lock().await;
            let state = inner.workflow;
            let feedback = inner.session.current_feedback.clone().ok_or(
                WorkflowError::IllegalTransition {
                    state,
                    event: WorkflowEvent::Disagree,
                },
            )?;
            inner.begin(WorkflowEvent::Disagree, PendingRequest::IncorporateFeedback)?;
            IncorporateFeedbackRequest {
                feedback,
                additional_feedback,
            }
        };
        info!("sending additional feedback");

        let result = self.backend.incorporate_feedback(&request).await;

        let mut inner = self.inner.lock().await;
        inner.page.finish_request();
        match result {
            Ok(response) => {
                inner
                    .page
                    .show_feedback(UPDATED_FEEDBACK_HEADING, &response.feedback);
                inner.session.current_feedback = Some(response.feedback);
                inner.advance(WorkflowEvent::Disagree);
                Ok(ActionOutcome::FeedbackUpdated)
            }
            Err(source) => {
                error!(error = %format!("{source:#}"), "incorporating additional feedback failed");
                drop(inner);
                self.prompter.notify(INCORPORATE_ERROR_MESSAGE);
                Err(WorkflowError::Request {
                    operation: PendingRequest::IncorporateFeedback.operation(),
                    source,
                })
            }
        }
    }

    pub async fn quit(&self) -> Result<ActionOutcome, WorkflowError> {
        let mut inner = self.inner.lock().await;
        inner.ensure_allowed(WorkflowEvent::Quit)?;
        inner.reset();
        Ok(ActionOutcome::Reset)
    }

    /// Clears the page and session from any state.
    pub async fn reset(&self) -> Result<(), WorkflowError> {
        let mut inner = self.inner.lock().await;
        if let Some(pending) = inner.page.pending() {
            warn!(operation = pending.operation(), "reset refused while a request is in flight");
            return Err(WorkflowError::RequestInFlight(pending));
        }
        inner.reset();
        Ok(())
    }

    /// Current feedback, if any, for front ends that show it outside the page.
    pub async fn current_feedback(&self) -> Option<FormattableValue> {
        self.inner.lock().await.session.current_feedback.clone()
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
