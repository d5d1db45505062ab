use serde::{Deserialize, Serialize};

use crate::domain::{FormattableValue, UserEvaluation};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<FormattableValue>,
    #[serde(default)]
    pub criteria: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledgment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitFeedbackRequest {
    /// Always sent empty; the backend keeps its own iteration history.
    pub recent_iterations: Vec<FormattableValue>,
    pub prompt: String,
    /// Rendered HTML of the generated-content block.
    pub content: String,
    pub evaluation: Option<FormattableValue>,
    pub user_eval_content: UserEvaluation,
    pub user_feedback_evaluator: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitFeedbackResponse {
    pub feedback: FormattableValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncorporateFeedbackRequest {
    pub feedback: FormattableValue,
    pub additional_feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncorporateFeedbackResponse {
    pub feedback: FormattableValue,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn generate_response_tolerates_missing_optional_fields() {
        let response: GenerateResponse =
            serde_json::from_value(json!({"content": "text", "evaluation": null}))
                .expect("decode");
        assert!(response.evaluation.is_none());
        assert!(response.criteria.is_empty());
        assert!(response.acknowledgment.is_none());
    }

    #[test]
    fn submit_request_matches_backend_field_names() {
        let request = SubmitFeedbackRequest {
            recent_iterations: Vec::new(),
            prompt: "Write a haiku".to_string(),
            content: "<h3>Haiku</h3>".to_string(),
            evaluation: Some(FormattableValue::from(json!({"Clarity": "Good"}))),
            user_eval_content: UserEvaluation::default(),
            user_feedback_evaluator: String::new(),
        };

        assert_eq!(
            serde_json::to_value(&request).expect("encode"),
            json!({
                "recent_iterations": [],
                "prompt": "Write a haiku",
                "content": "<h3>Haiku</h3>",
                "evaluation": {"Clarity": "Good"},
                "user_eval_content": {"scores": {}, "feedbacks": {}},
                "user_feedback_evaluator": ""
            })
        );
    }
}
