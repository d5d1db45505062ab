//! Review workflow states and the transition table between them.

use std::{fmt, str::FromStr};

use shared::domain::FormattableValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    ContentGenerated,
    FeedbackSubmitted,
    FeedbackIncorporated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowEvent {
    Generate,
    SubmitFeedback,
    Continue,
    Disagree,
    Quit,
    Reset,
}

impl WorkflowState {
    /// Target state of `event` when its request (if any) succeeds, or `None`
    /// when the event is not allowed from this state.
    ///
    /// `Continue` maps to the regenerate branch; when no improvement is
    /// needed the controller applies `Reset` instead.
    pub fn transition(self, event: WorkflowEvent) -> Option<WorkflowState> {
        use WorkflowEvent as E;
        use WorkflowState as S;

        match (self, event) {
            (_, E::Generate) => Some(S::ContentGenerated),
            (_, E::Reset) => Some(S::Idle),
            (S::ContentGenerated | S::FeedbackSubmitted | S::FeedbackIncorporated, E::SubmitFeedback) => {
                Some(S::FeedbackSubmitted)
            }
            (S::FeedbackSubmitted | S::FeedbackIncorporated, E::Continue) => {
                Some(S::ContentGenerated)
            }
            (S::FeedbackSubmitted | S::FeedbackIncorporated, E::Disagree) => {
                Some(S::FeedbackIncorporated)
            }
            (S::FeedbackSubmitted | S::FeedbackIncorporated, E::Quit) => Some(S::Idle),
            _ => None,
        }
    }

    pub fn accepts(self, event: WorkflowEvent) -> bool {
        self.transition(event).is_some()
    }
}

/// Follow-up actions offered once AI feedback is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Disagree,
    Quit,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Continue, Action::Disagree, Action::Quit];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Continue => "continue",
            Action::Disagree => "disagree",
            Action::Quit => "quit",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::Continue => "Continue",
            Action::Disagree => "Disagree",
            Action::Quit => "Quit",
        }
    }

    pub fn event(self) -> WorkflowEvent {
        match self {
            Action::Continue => WorkflowEvent::Continue,
            Action::Disagree => WorkflowEvent::Disagree,
            Action::Quit => WorkflowEvent::Quit,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continue" => Ok(Action::Continue),
            "disagree" => Ok(Action::Disagree),
            "quit" => Ok(Action::Quit),
            other => Err(format!("unknown action '{other}'")),
        }
    }
}

/// Values carried from one request to the next within a review session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub current_evaluation: Option<FormattableValue>,
    pub current_feedback: Option<FormattableValue>,
    /// Inner HTML of the generated-content block, echoed back on submit.
    pub content_html: String,
    pub iteration: u32,
}

impl SessionState {
    pub fn improvements_needed(&self) -> bool {
        self.current_feedback
            .as_ref()
            .and_then(|feedback| feedback.text_field("improvements_needed"))
            .is_some_and(|flag| flag.trim().to_uppercase().starts_with("YES"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn feedback_actions_require_feedback_on_screen() {
        for state in [WorkflowState::Idle, WorkflowState::ContentGenerated] {
            for action in Action::ALL {
                assert!(!state.accepts(action.event()), "{state:?} accepted {action}");
            }
        }
        assert_eq!(
            WorkflowState::FeedbackSubmitted.transition(WorkflowEvent::Disagree),
            Some(WorkflowState::FeedbackIncorporated)
        );
        assert_eq!(
            WorkflowState::FeedbackIncorporated.transition(WorkflowEvent::Quit),
            Some(WorkflowState::Idle)
        );
    }

    #[test]
    fn submit_needs_generated_content() {
        assert!(!WorkflowState::Idle.accepts(WorkflowEvent::SubmitFeedback));
        assert_eq!(
            WorkflowState::ContentGenerated.transition(WorkflowEvent::SubmitFeedback),
            Some(WorkflowState::FeedbackSubmitted)
        );
    }

    #[test]
    fn generate_and_reset_are_always_available() {
        for state in [
            WorkflowState::Idle,
            WorkflowState::ContentGenerated,
            WorkflowState::FeedbackSubmitted,
            WorkflowState::FeedbackIncorporated,
        ] {
            assert_eq!(
                state.transition(WorkflowEvent::Generate),
                Some(WorkflowState::ContentGenerated)
            );
            assert_eq!(state.transition(WorkflowEvent::Reset), Some(WorkflowState::Idle));
        }
    }

    #[test]
    fn parses_action_names() {
        assert_eq!(" Continue ".parse::<Action>(), Ok(Action::Continue));
        assert_eq!("quit".parse::<Action>(), Ok(Action::Quit));
        assert!("new".parse::<Action>().is_err());
    }

    #[test]
    fn improvements_flag_reads_leading_yes() {
        let mut session = SessionState::default();
        assert!(!session.improvements_needed());

        session.current_feedback = Some(json!({"improvements_needed": "  yes, add examples"}).into());
        assert!(session.improvements_needed());

        session.current_feedback = Some(json!({"improvements_needed": "No further changes"}).into());
        assert!(!session.improvements_needed());

        session.current_feedback = Some(json!({"everything": "YES"}).into());
        assert!(!session.improvements_needed());
    }
}
