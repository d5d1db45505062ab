//! In-memory model of the review page: the prompt field, the four output
//! panels and the visibility of the controls that drive the workflow.

use shared::domain::FormattableValue;

use crate::{
    form::EvaluationForm,
    format::{format_acknowledgment, format_content, format_response},
    workflow::Action,
};

pub const CONTENT_HEADING: &str = "<h2>Generated Content</h2>";
pub const EVALUATION_HEADING: &str = "<h2>AI Evaluation</h2>";
pub const FEEDBACK_HEADING: &str = "<h2>AI Feedback</h2>";
pub const UPDATED_FEEDBACK_HEADING: &str = "<h2>Updated AI Feedback</h2>";

const NO_EVALUATION: &str = "<p>No evaluation available.</p>";
const GENERATE_CONTENT_ERROR: &str = "<pre>An error occurred while generating content.</pre>";
const GENERATE_EVALUATION_ERROR: &str =
    "<pre>An error occurred while generating evaluation.</pre>";
const SUBMIT_FEEDBACK_ERROR: &str = "<pre>An error occurred while submitting feedback.</pre>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingRequest {
    Generate,
    SubmitFeedback,
    IncorporateFeedback,
}

impl PendingRequest {
    pub fn operation(self) -> &'static str {
        match self {
            PendingRequest::Generate => "generate",
            PendingRequest::SubmitFeedback => "submit_feedback",
            PendingRequest::IncorporateFeedback => "incorporate_feedback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowPage {
    prompt_input: String,
    content_panel: String,
    evaluation_panel: String,
    form: Option<EvaluationForm>,
    feedback_panel: String,
    submit_visible: bool,
    actions_visible: bool,
    pending: Option<PendingRequest>,
}

impl Default for WorkflowPage {
    fn default() -> Self {
        Self {
            prompt_input: String::new(),
            content_panel: CONTENT_HEADING.to_string(),
            evaluation_panel: EVALUATION_HEADING.to_string(),
            form: None,
            feedback_panel: FEEDBACK_HEADING.to_string(),
            submit_visible: false,
            actions_visible: false,
            pending: None,
        }
    }
}

impl WorkflowPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompt_input(&self) -> &str {
        &self.prompt_input
    }

    pub fn content_panel(&self) -> &str {
        &self.content_panel
    }

    pub fn evaluation_panel(&self) -> &str {
        &self.evaluation_panel
    }

    pub fn form(&self) -> Option<&EvaluationForm> {
        self.form.as_ref()
    }

    pub fn form_panel(&self) -> String {
        self.form.as_ref().map(EvaluationForm::to_html).unwrap_or_default()
    }

    pub fn feedback_panel(&self) -> &str {
        &self.feedback_panel
    }

    pub fn submit_visible(&self) -> bool {
        self.submit_visible
    }

    pub fn actions_visible(&self) -> bool {
        self.actions_visible
    }

    pub fn pending(&self) -> Option<PendingRequest> {
        self.pending
    }

    /// Request-triggering controls are disabled while this holds.
    pub fn busy(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn set_prompt_input(&mut self, prompt: &str) {
        self.prompt_input = prompt.to_string();
    }

    pub(crate) fn begin_request(&mut self, request: PendingRequest) {
        self.pending = Some(request);
    }

    pub(crate) fn finish_request(&mut self) {
        self.pending = None;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self {
            pending: self.pending,
            ..Self::default()
        };
    }

    /// Fills the content, evaluation and form panels from a generate
    /// response. Returns the inner HTML of the generated-content block.
    pub(crate) fn show_generated(
        &mut self,
        content: &str,
        acknowledgment: Option<&str>,
        evaluation: Option<&FormattableValue>,
        criteria: Vec<String>,
    ) -> String {
        let content_html = format_content(content);

        let mut panel = CONTENT_HEADING.to_string();
        if let Some(acknowledgment) = acknowledgment.filter(|text| !text.is_empty()) {
            panel.push_str(&format_acknowledgment(acknowledgment));
        }
        panel.push_str(&format!("<div class=\"generated-content\">{content_html}</div>"));
        self.content_panel = panel;

        self.evaluation_panel = match evaluation.filter(|value| value.is_truthy()) {
            Some(evaluation) => format!(
                "{EVALUATION_HEADING}<div class=\"ai-response\">{}</div>",
                format_response(evaluation)
            ),
            None => format!("{EVALUATION_HEADING}{NO_EVALUATION}"),
        };

        self.form = Some(EvaluationForm::new(criteria));
        self.feedback_panel = FEEDBACK_HEADING.to_string();
        self.actions_visible = false;
        self.submit_visible = true;
        content_html
    }

    pub(crate) fn show_generate_error(&mut self) {
        self.content_panel = format!("{CONTENT_HEADING}{GENERATE_CONTENT_ERROR}");
        self.evaluation_panel = format!("{EVALUATION_HEADING}{GENERATE_EVALUATION_ERROR}");
        self.form = None;
        self.submit_visible = false;
        self.actions_visible = false;
    }

    pub(crate) fn show_feedback(&mut self, heading: &str, feedback: &FormattableValue) {
        self.feedback_panel = format!(
            "{heading}<div class=\"ai-response\">{}</div>",
            format_response(feedback)
        );
        self.actions_visible = true;
    }

    pub(crate) fn show_submit_error(&mut self) {
        self.feedback_panel = format!("{FEEDBACK_HEADING}{SUBMIT_FEEDBACK_ERROR}");
        self.actions_visible = false;
    }

    /// Standalone HTML document of the current page.
    pub fn to_document(&self) -> String {
        let disabled = if self.busy() { " disabled" } else { "" };
        let mut html = String::from(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Content Review</title></head>\n<body>\n",
        );

        html.push_str(&format!(
            "<input type=\"text\" id=\"prompt-input\" value=\"{}\"><button id=\"generate-btn\"{disabled}>Generate</button>\n",
            escape_attribute(&self.prompt_input)
        ));
        html.push_str(&format!(
            "<section id=\"content-section\">{}</section>\n",
            self.content_panel
        ));
        html.push_str(&format!(
            "<section id=\"evaluation-section\">{}</section>\n",
            self.evaluation_panel
        ));
        html.push_str(&format!(
            "<form id=\"user-evaluation-form\">{}</form>\n",
            self.form_panel()
        ));
        html.push_str(&format!(
            "<button id=\"submit-feedback-btn\" style=\"display: {}\"{disabled}>Submit Feedback</button>\n",
            if self.submit_visible { "block" } else { "none" }
        ));

        html.push_str(&format!("<section id=\"feedback-section\">{}", self.feedback_panel));
        if self.actions_visible {
            html.push_str("<div id=\"action-buttons\">");
            for action in Action::ALL {
                html.push_str(&format!(
                    "<button data-action=\"{}\"{disabled}>{}</button>",
                    action.as_str(),
                    action.label()
                ));
            }
            html.push_str("</div>");
        }
        html.push_str("</section>\n</body>\n</html>\n");
        html
    }
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
