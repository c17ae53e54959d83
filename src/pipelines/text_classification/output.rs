use derive_new::new;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single class label with its confidence
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, new)]
pub struct Prediction {
    /// The class name
    #[new(into)]
    pub label: String,

    /// The confidence score
    pub score: f64,
}

/// Normalization Error
#[derive(thiserror::Error, Debug)]
pub enum NormalizeError {
    /// A score could not be read as a number
    #[error("could not convert score {score} for label {label} to a number")]
    InvalidScore {
        /// The label the score belongs to
        label: String,

        /// The offending raw value
        score: Value,
    },

    /// A label was not a string
    #[error("label {0} is not a string")]
    InvalidLabel(Value),

    /// A labelled list held a value that cannot carry a label
    #[error("cannot look for a label in {0}")]
    MalformedItem(Value),
}

/// The predictions returned when the model output has no recognizable shape
pub fn unrecognized_fallback() -> Vec<Prediction> {
    vec![
        Prediction::new("joy", 0.25),
        Prediction::new("sadness", 0.25),
        Prediction::new("other", 0.50),
    ]
}

/// The predictions returned alongside an error message when classification fails
pub fn error_fallback() -> Vec<Prediction> {
    vec![
        Prediction::new("error", 1.0),
        Prediction::new("unknown", 0.0),
        Prediction::new("other", 0.0),
    ]
}

/// Reshape raw classifier output into a flat list of predictions
///
/// Accepted shapes, tried in order:
/// - a list of `{label, score}` objects, used as is
/// - a list of lists, of which only the first inner list is considered
/// - a list of objects with `label` and a score under any key starting with `score`
/// - an object mapping labels to scores
///
/// Anything else yields [`unrecognized_fallback`].
pub fn normalize_output(raw: &Value) -> Result<Vec<Prediction>, NormalizeError> {
    log::debug!("Raw model output: {raw}");

    if let Value::Array(items) = raw {
        if items.iter().all(has_label_and_score) {
            return items
                .iter()
                .filter_map(Value::as_object)
                .map(|item| prediction(&item["label"], &item["score"]))
                .collect();
        }
    }

    let raw = match raw {
        Value::Array(items) => match items.first() {
            Some(first @ Value::Array(_)) => first,
            _ => raw,
        },
        _ => raw,
    };

    if let Value::Array(items) = raw {
        if let Some(predictions) = from_labelled_items(items)? {
            return Ok(predictions);
        }
    }

    if let Value::Object(mapping) = raw {
        return mapping
            .iter()
            .map(|(label, score)| {
                let score = parse_score(score).ok_or_else(|| NormalizeError::InvalidScore {
                    label: label.clone(),
                    score: score.clone(),
                })?;

                Ok(Prediction::new(label.as_str(), score))
            })
            .collect();
    }

    log::warn!("Could not normalize output format. Using fallback.");

    Ok(unrecognized_fallback())
}

/// Keep the `k` highest scored predictions, best first. Ties keep their input order.
pub fn top_k(mut predictions: Vec<Prediction>, k: usize) -> Vec<Prediction> {
    predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
    predictions.truncate(k);

    predictions
}

fn has_label_and_score(item: &Value) -> bool {
    item.as_object()
        .is_some_and(|item| item.contains_key("label") && item.contains_key("score"))
}

/// Read a list of `label`-carrying objects whose score may sit under a `score*` key
fn from_labelled_items(items: &[Value]) -> Result<Option<Vec<Prediction>>, NormalizeError> {
    if !items.first().is_some_and(Value::is_object) {
        return Ok(None);
    }

    let mut objects: Vec<&Map<String, Value>> = Vec::with_capacity(items.len());

    // Stops at the first item without a label; scalars reached before that are malformed
    for item in items {
        match item {
            Value::Object(object) if object.contains_key("label") => objects.push(object),
            Value::Object(_) | Value::String(_) | Value::Array(_) => return Ok(None),
            _ => return Err(NormalizeError::MalformedItem(item.clone())),
        }
    }

    let mut predictions = Vec::with_capacity(objects.len());

    for item in objects {
        let score = item.get("score").or_else(|| {
            item.iter()
                .find(|(key, _)| key.starts_with("score"))
                .map(|(_, score)| score)
        });

        if let Some(score) = score {
            predictions.push(prediction(&item["label"], score)?);
        }
    }

    if predictions.is_empty() {
        Ok(None)
    } else {
        Ok(Some(predictions))
    }
}

fn prediction(label: &Value, score: &Value) -> Result<Prediction, NormalizeError> {
    let label = label
        .as_str()
        .ok_or_else(|| NormalizeError::InvalidLabel(label.clone()))?;

    let score = parse_score(score).ok_or_else(|| NormalizeError::InvalidScore {
        label: label.to_string(),
        score: score.clone(),
    })?;

    Ok(Prediction::new(label, score))
}

/// Scores are numbers, booleans, or strings holding numbers
fn parse_score(score: &Value) -> Option<f64> {
    match score {
        Value::Number(number) => number.as_f64(),
        Value::Bool(flag) => Some(f64::from(u8::from(*flag))),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn label_score_lists_pass_through() {
        let raw = json!([
            { "label": "joy", "score": 0.7 },
            { "label": "anger", "score": 0.1 },
        ]);

        assert_eq!(
            normalize_output(&raw).unwrap(),
            vec![Prediction::new("joy", 0.7), Prediction::new("anger", 0.1)]
        );
    }

    #[test]
    fn hosted_api_nesting_uses_the_first_list() {
        let raw = json!([
            [
                { "label": "sadness", "score": 0.6 },
                { "label": "others", "score": 0.3 },
            ],
            [
                { "label": "joy", "score": 0.9 },
            ],
        ]);

        assert_eq!(
            normalize_output(&raw).unwrap(),
            vec![
                Prediction::new("sadness", 0.6),
                Prediction::new("others", 0.3)
            ]
        );
    }

    #[test]
    fn scores_under_prefixed_keys_are_found() {
        let raw = json!([
            { "label": "fear", "score_0": 0.4 },
            { "label": "surprise", "scores": "0.2" },
            { "label": "disgust" },
        ]);

        assert_eq!(
            normalize_output(&raw).unwrap(),
            vec![
                Prediction::new("fear", 0.4),
                Prediction::new("surprise", 0.2)
            ]
        );
    }

    #[test]
    fn labels_without_any_score_fall_back() {
        let raw = json!([{ "label": "joy" }, { "label": "fear" }]);

        assert_eq!(normalize_output(&raw).unwrap(), unrecognized_fallback());
    }

    #[test]
    fn label_to_score_mappings_are_flattened() {
        let raw = json!({ "joy": 0.5, "anger": "0.25" });

        assert_eq!(
            normalize_output(&raw).unwrap(),
            vec![Prediction::new("joy", 0.5), Prediction::new("anger", 0.25)]
        );
    }

    #[test]
    fn tied_mapping_scores_keep_document_order() {
        let raw = json!({ "joy": 0.5, "anger": 0.5, "fear": 0.5, "sadness": 0.5 });

        let labels: Vec<_> = top_k(normalize_output(&raw).unwrap(), 3)
            .into_iter()
            .map(|p| p.label)
            .collect();

        assert_eq!(labels, vec!["joy", "anger", "fear"]);
    }

    #[test]
    fn first_prefixed_score_key_wins() {
        let raw = json!([{ "label": "joy", "score_b": 0.1, "score_a": 0.9 }]);

        assert_eq!(
            normalize_output(&raw).unwrap(),
            vec![Prediction::new("joy", 0.1)]
        );
    }

    #[test]
    fn scalars_among_labelled_items_are_errors() {
        let raw = json!([{ "label": "joy" }, 5]);

        let error = normalize_output(&raw).unwrap_err();

        assert!(matches!(error, NormalizeError::MalformedItem(_)));
    }

    #[test]
    fn unlabelled_items_end_the_search_before_scalars() {
        let raw = json!([{ "name": "joy" }, 5]);

        assert_eq!(normalize_output(&raw).unwrap(), unrecognized_fallback());
    }

    #[test]
    fn boolean_scores_count_as_numbers() {
        let raw = json!([
            { "label": "joy", "score": true },
            { "label": "fear", "score": false },
        ]);

        assert_eq!(
            normalize_output(&raw).unwrap(),
            vec![Prediction::new("joy", 1.0), Prediction::new("fear", 0.0)]
        );
    }

    #[test]
    fn labels_accept_owned_and_borrowed_strings() {
        assert_eq!(
            Prediction::new(String::from("joy"), 0.5),
            Prediction::new("joy", 0.5)
        );
    }

    #[test]
    fn error_objects_are_not_scores() {
        let raw = json!({ "error": "Model is currently loading", "estimated_time": 20.0 });

        let error = normalize_output(&raw).unwrap_err();

        assert!(matches!(error, NormalizeError::InvalidScore { .. }));
    }

    #[test]
    fn unknown_shapes_use_the_fallback() {
        for raw in [json!("joy"), json!(42), json!(null), json!([1, 2, 3])] {
            assert_eq!(normalize_output(&raw).unwrap(), unrecognized_fallback());
        }
    }

    #[test]
    fn empty_lists_yield_no_predictions() {
        assert_eq!(normalize_output(&json!([])).unwrap(), Vec::<Prediction>::new());
    }

    #[test]
    fn non_numeric_scores_are_errors() {
        let raw = json!([{ "label": "joy", "score": "high" }]);

        assert!(normalize_output(&raw).is_err());
    }

    #[test]
    fn top_k_sorts_descending_and_truncates() {
        let predictions = vec![
            Prediction::new("others", 0.05),
            Prediction::new("joy", 0.6),
            Prediction::new("sadness", 0.2),
            Prediction::new("anger", 0.15),
        ];

        assert_eq!(
            top_k(predictions, 3),
            vec![
                Prediction::new("joy", 0.6),
                Prediction::new("sadness", 0.2),
                Prediction::new("anger", 0.15),
            ]
        );
    }

    #[test]
    fn top_k_keeps_short_lists_whole() {
        let predictions = vec![Prediction::new("joy", 0.1), Prediction::new("fear", 0.9)];

        assert_eq!(
            top_k(predictions, 3),
            vec![Prediction::new("fear", 0.9), Prediction::new("joy", 0.1)]
        );
    }

    #[test]
    fn fallback_top_three_orders_other_first() {
        assert_eq!(
            top_k(unrecognized_fallback(), 3),
            vec![
                Prediction::new("other", 0.5),
                Prediction::new("joy", 0.25),
                Prediction::new("sadness", 0.25),
            ]
        );
    }
}
