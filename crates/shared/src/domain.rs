use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InvalidScore;

/// Score assumed for a criterion the reviewer left unrated.
pub const DEFAULT_SCORE: f64 = 5.0;
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

/// Loosely-typed payload returned by the backend agents.
///
/// Mapping keys keep the order in which they arrived on the wire, which is the
/// order they are rendered in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum FormattableValue {
    Text(String),
    Mapping(IndexMap<String, FormattableValue>),
    /// Numbers, booleans, null and arrays.
    Other(Value),
}

impl FormattableValue {
    pub fn get(&self, key: &str) -> Option<&FormattableValue> {
        match self {
            Self::Mapping(entries) => entries.get(key),
            _ => None,
        }
    }

    pub fn text_field(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// False for null, `false`, zero and empty text; mappings and arrays
    /// always count as present.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Text(text) => !text.is_empty(),
            Self::Mapping(_) => true,
            Self::Other(Value::Null | Value::Bool(false)) => false,
            Self::Other(Value::Number(n)) => n.as_f64().map_or(true, |n| n != 0.0),
            Self::Other(_) => true,
        }
    }
}

impl From<Value> for FormattableValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Object(map) => Self::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
            other => Self::Other(other),
        }
    }
}

impl From<FormattableValue> for Value {
    fn from(value: FormattableValue) -> Self {
        match value {
            FormattableValue::Text(text) => Value::String(text),
            FormattableValue::Mapping(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
            FormattableValue::Other(other) => other,
        }
    }
}

impl From<&str> for FormattableValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One reviewer judgement, built from form input for a single submit.
#[derive(Debug, Clone, PartialEq)]
pub struct CriterionEntry {
    pub name: String,
    pub score: f64,
    pub feedback_text: String,
}

impl CriterionEntry {
    pub fn from_form(
        name: impl Into<String>,
        raw_rating: &str,
        feedback_text: impl Into<String>,
    ) -> Result<Self, InvalidScore> {
        let name = name.into();
        let score = parse_score(&name, raw_rating)?;
        Ok(Self {
            name,
            score,
            feedback_text: feedback_text.into(),
        })
    }
}

pub fn parse_score(criterion: &str, raw_rating: &str) -> Result<f64, InvalidScore> {
    let raw_rating = raw_rating.trim();
    if raw_rating.is_empty() {
        return Ok(DEFAULT_SCORE);
    }

    let invalid = || InvalidScore {
        criterion: criterion.to_string(),
        value: raw_rating.to_string(),
    };
    let score = raw_rating.parse::<f64>().map_err(|_| invalid())?;
    if !score.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(invalid());
    }
    Ok(score)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserEvaluation {
    pub scores: IndexMap<String, f64>,
    pub feedbacks: IndexMap<String, String>,
}

impl FromIterator<CriterionEntry> for UserEvaluation {
    fn from_iter<I: IntoIterator<Item = CriterionEntry>>(entries: I) -> Self {
        let mut evaluation = Self::default();
        for entry in entries {
            evaluation.scores.insert(entry.name.clone(), entry.score);
            evaluation.feedbacks.insert(entry.name, entry.feedback_text);
        }
        evaluation
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn mapping_keeps_wire_order() {
        let value: FormattableValue =
            serde_json::from_str(r#"{"Zeta":"z","Alpha":{"Inner":1}}"#).expect("parse");
        let FormattableValue::Mapping(entries) = &value else {
            panic!("expected mapping, got {value:?}");
        };
        let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
        assert_eq!(keys, ["Zeta", "Alpha"]);
        assert_eq!(
            value.get("Alpha").and_then(|inner| inner.get("Inner")),
            Some(&FormattableValue::Other(json!(1)))
        );
    }

    #[test]
    fn serializes_back_to_plain_json() {
        let raw = json!({"improvements_needed": "YES", "scores": [1, 2], "nested": {"a": null}});
        let value = FormattableValue::from(raw.clone());
        assert_eq!(serde_json::to_value(&value).expect("serialize"), raw);
        assert_eq!(value.text_field("improvements_needed"), Some("YES"));
        assert_eq!(value.text_field("scores"), None);
    }

    #[test]
    fn falsy_values_match_json_truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!FormattableValue::from(falsy.clone()).is_truthy(), "{falsy}");
        }
        for truthy in [json!(true), json!(-1), json!(" "), json!([]), json!({})] {
            assert!(FormattableValue::from(truthy.clone()).is_truthy(), "{truthy}");
        }
    }

    #[test]
    fn empty_rating_defaults_to_midpoint() {
        let entry = CriterionEntry::from_form("Clarity", "  ", "").expect("entry");
        assert_eq!(entry.score, DEFAULT_SCORE);
        assert_eq!(entry.feedback_text, "");
    }

    #[test]
    fn rejects_out_of_range_and_non_numeric_ratings() {
        assert!(parse_score("Clarity", "10.5").is_err());
        assert!(parse_score("Clarity", "-1").is_err());
        assert!(parse_score("Clarity", "great").is_err());
        assert!(parse_score("Clarity", "NaN").is_err());
        assert_eq!(parse_score("Clarity", "7.5").expect("score"), 7.5);
    }

    #[test]
    fn user_evaluation_collects_entries_in_order() {
        let evaluation: UserEvaluation = [
            CriterionEntry::from_form("Originality", "3", "derivative").expect("entry"),
            CriterionEntry::from_form("Clarity", "", "").expect("entry"),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            serde_json::to_value(&evaluation).expect("serialize"),
            json!({
                "scores": {"Originality": 3.0, "Clarity": 5.0},
                "feedbacks": {"Originality": "derivative", "Clarity": ""}
            })
        );
    }
}
