use std::collections::HashMap;

use shared::{
    domain::{CriterionEntry, UserEvaluation},
    error::InvalidScore,
};

pub const EVALUATOR_FEEDBACK_LABEL: &str = "Feedback for Evaluator";

/// Per-criterion rating form built from the criteria returned by `/generate`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationForm {
    criteria: Vec<String>,
}

impl EvaluationForm {
    pub fn new(criteria: Vec<String>) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &[String] {
        &self.criteria
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for criterion in &self.criteria {
            html.push_str(&format!(
                "<div><h3>{criterion}</h3>\
                 <input type=\"number\" min=\"0\" max=\"10\" step=\"0.1\" id=\"rating-{criterion}\" placeholder=\"Rate (0-10)\">\
                 <textarea id=\"feedback-{criterion}\" placeholder=\"Provide feedback for {criterion}\"></textarea></div>"
            ));
        }
        html.push_str(&format!(
            "<div><h3>{EVALUATOR_FEEDBACK_LABEL}</h3>\
             <textarea id=\"evaluator-feedback\" placeholder=\"Provide feedback for the evaluator\"></textarea></div>"
        ));
        html
    }

    /// One entry per rendered criterion; blanks fall back to the defaults.
    pub fn collect(&self, values: &FormValues) -> Result<UserEvaluation, InvalidScore> {
        self.criteria
            .iter()
            .map(|criterion| {
                CriterionEntry::from_form(
                    criterion.as_str(),
                    values.rating(criterion),
                    values.feedback(criterion),
                )
            })
            .collect()
    }
}

/// Raw values typed into an [`EvaluationForm`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues {
    ratings: HashMap<String, String>,
    feedbacks: HashMap<String, String>,
    evaluator_feedback: String,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rating(mut self, criterion: impl Into<String>, raw: impl Into<String>) -> Self {
        self.set_rating(criterion, raw);
        self
    }

    pub fn with_feedback(mut self, criterion: impl Into<String>, text: impl Into<String>) -> Self {
        self.set_feedback(criterion, text);
        self
    }

    pub fn with_evaluator_feedback(mut self, text: impl Into<String>) -> Self {
        self.evaluator_feedback = text.into();
        self
    }

    pub fn set_rating(&mut self, criterion: impl Into<String>, raw: impl Into<String>) {
        self.ratings.insert(criterion.into(), raw.into());
    }

    pub fn set_feedback(&mut self, criterion: impl Into<String>, text: impl Into<String>) {
        self.feedbacks.insert(criterion.into(), text.into());
    }

    pub fn set_evaluator_feedback(&mut self, text: impl Into<String>) {
        self.evaluator_feedback = text.into();
    }

    pub fn rating(&self, criterion: &str) -> &str {
        self.ratings.get(criterion).map_or("", String::as_str)
    }

    pub fn feedback(&self, criterion: &str) -> &str {
        self.feedbacks.get(criterion).map_or("", String::as_str)
    }

    pub fn evaluator_feedback(&self) -> &str {
        &self.evaluator_feedback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> EvaluationForm {
        EvaluationForm::new(vec!["Clarity".to_string(), "Originality".to_string()])
    }

    #[test]
    fn renders_one_block_per_criterion_plus_evaluator_box() {
        let html = form().to_html();
        assert_eq!(html.matches("<div><h3>").count(), 3);
        assert!(html.contains("id=\"rating-Clarity\""));
        assert!(html.contains("id=\"feedback-Originality\""));
        assert!(html.ends_with(
            "<div><h3>Feedback for Evaluator</h3><textarea id=\"evaluator-feedback\" placeholder=\"Provide feedback for the evaluator\"></textarea></div>"
        ));
    }

    #[test]
    fn collect_defaults_blank_inputs() {
        let values = FormValues::new()
            .with_rating("Originality", "8.5")
            .with_feedback("Originality", "fresh imagery");
        let evaluation = form().collect(&values).expect("collect");

        assert_eq!(evaluation.scores["Clarity"], 5.0);
        assert_eq!(evaluation.feedbacks["Clarity"], "");
        assert_eq!(evaluation.scores["Originality"], 8.5);
        assert_eq!(evaluation.feedbacks["Originality"], "fresh imagery");
    }

    #[test]
    fn collect_ignores_values_for_unrendered_criteria() {
        let values = FormValues::new().with_rating("Tone", "1");
        let evaluation = form().collect(&values).expect("collect");
        assert!(!evaluation.scores.contains_key("Tone"));
        assert_eq!(evaluation.scores.len(), 2);
    }

    #[test]
    fn collect_rejects_invalid_rating() {
        let values = FormValues::new().with_rating("Clarity", "eleven");
        let err = form().collect(&values).expect_err("must fail");
        assert_eq!(err.criterion, "Clarity");
        assert_eq!(err.value, "eleven");
    }
}
