//! Request payloads as they arrive over the wire, and their decoding.
//!
//! Field names here are the stable contract with the web client.

use serde::Deserialize;
use serde_json::{Map, Number, Value};

use crate::common::error::{DiagError, DiagResult};
use crate::evaluation::domain::{ConfusionCount, KappaInput};
use crate::experiment::domain::{ExperimentId, IngestRow};

/// Parse a JSON body, reporting malformed payloads as invalid input.
pub fn parse_body<'a, T: Deserialize<'a>>(payload: &'a str) -> DiagResult<T> {
    serde_json::from_str(payload).map_err(|e| DiagError::invalid("request body", e.to_string()))
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateExperimentRequest {
    pub technique_name: String,
    pub true_positives: i64,
    pub true_negatives: i64,
    pub false_positives: i64,
    pub false_negatives: i64,
    #[serde(default)]
    pub confidence_level: Option<f64>,
}

impl CreateExperimentRequest {
    pub fn confusion_count(&self) -> DiagResult<ConfusionCount> {
        ConfusionCount::from_signed(
            self.true_positives,
            self.true_negatives,
            self.false_positives,
            self.false_negatives,
        )
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct KappaRequest {
    pub rater1_data: Vec<Value>,
    pub rater2_data: Vec<Value>,
    #[serde(default)]
    pub confidence_level: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl KappaRequest {
    pub fn into_input(self, default_confidence: f64) -> DiagResult<KappaInput> {
        Ok(KappaInput {
            rater1: labels("rater1_data", self.rater1_data)?,
            rater2: labels("rater2_data", self.rater2_data)?,
            confidence_level: self.confidence_level.unwrap_or(default_confidence),
            description: self.description.filter(|d| !d.trim().is_empty()),
        })
    }
}

/// Normalise labels to text so that `1`, `1.0` and `"1"` name the same category.
fn labels(field: &'static str, values: Vec<Value>) -> DiagResult<Vec<String>> {
    values
        .into_iter()
        .enumerate()
        .map(|(pos, value)| match value {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(number_label(&n)),
            other => Err(DiagError::invalid(
                field,
                format!("label at position {pos} must be a string or number, got {other}"),
            )),
        })
        .collect()
}

fn number_label(n: &Number) -> String {
    n.as_i64()
        .or_else(|| n.as_f64().and_then(whole))
        .map(|i| i.to_string())
        .unwrap_or_else(|| n.to_string())
}

/// Integer value of a whole float that converts exactly.
fn whole(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f.abs() < 9.0e15).then_some(f as i64)
}

#[derive(Clone, Debug, Deserialize)]
pub struct CompareRequest {
    pub experiment_ids: Vec<String>,
}

impl CompareRequest {
    pub fn ids(&self) -> Vec<ExperimentId> {
        self.experiment_ids
            .iter()
            .map(|id| ExperimentId::new(id.as_str()))
            .collect()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct UploadRequest {
    pub rows: Vec<Value>,
}

/// Decode one uploaded row. Cells may be JSON numbers or numeric text.
pub fn decode_row(value: &Value) -> DiagResult<IngestRow> {
    let row = value
        .as_object()
        .ok_or_else(|| DiagError::invalid("row", format!("expected an object, got {value}")))?;

    Ok(IngestRow {
        technique_name: text_cell(row, "technique_name")?,
        true_positives: count_cell(row, "true_positives")?,
        true_negatives: count_cell(row, "true_negatives")?,
        false_positives: count_cell(row, "false_positives")?,
        false_negatives: count_cell(row, "false_negatives")?,
        confidence_level: confidence_cell(row, "confidence_level")?,
    })
}

fn text_cell(row: &Map<String, Value>, field: &'static str) -> DiagResult<String> {
    match row.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(DiagError::invalid(field, format!("expected text, got {other}"))),
        None => Err(DiagError::invalid(field, "missing column")),
    }
}

fn count_cell(row: &Map<String, Value>, field: &'static str) -> DiagResult<i64> {
    let parsed = match row.get(field) {
        None | Some(Value::Null) => return Err(DiagError::invalid(field, "missing column")),
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(whole)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole))
        }
        Some(_) => None,
    };
    parsed.ok_or_else(|| {
        DiagError::invalid(
            field,
            format!("expected a whole number, got {}", row[field]),
        )
    })
}

fn confidence_cell(row: &Map<String, Value>, field: &'static str) -> DiagResult<Option<f64>> {
    match row.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| DiagError::invalid(field, format!("expected a number, got {s:?}"))),
        Some(other) => Err(DiagError::invalid(field, format!("expected a number, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numeric_and_text_labels_share_categories() {
        let req: KappaRequest = parse_body(
            r#"{"rater1_data":[1,"2",1.5],"rater2_data":["1",2,"1.5"],"confidence_level":0.9}"#,
        )
        .unwrap();
        let input = req.into_input(0.95).unwrap();
        assert_eq!(input.rater1, input.rater2);
        assert_eq!(input.confidence_level, 0.9);
    }

    #[test]
    fn whole_floats_label_like_integers() {
        let req: KappaRequest = parse_body(
            r#"{"rater1_data":[1,2,-3,1e2],"rater2_data":[1.0,2.0,-3.0,"100"]}"#,
        )
        .unwrap();
        let input = req.into_input(0.95).unwrap();
        assert_eq!(input.rater1, vec!["1", "2", "-3", "100"]);
        assert_eq!(input.rater1, input.rater2);
    }

    #[test]
    fn boolean_labels_are_rejected() {
        let req: KappaRequest =
            parse_body(r#"{"rater1_data":[true,false],"rater2_data":[1,0]}"#).unwrap();
        let err = req.into_input(0.95).unwrap_err();
        assert!(matches!(err, DiagError::InvalidInput { field: "rater1_data", .. }));
        assert!(err.to_string().contains("position 0"));
    }

    #[test]
    fn kappa_defaults_confidence() {
        let req: KappaRequest = parse_body(r#"{"rater1_data":["a"],"rater2_data":["b"]}"#).unwrap();
        assert_eq!(req.into_input(0.95).unwrap().confidence_level, 0.95);
    }

    #[test]
    fn nested_labels_are_rejected_with_position() {
        let req: KappaRequest =
            parse_body(r#"{"rater1_data":[1,[2]],"rater2_data":[1,2]}"#).unwrap();
        let err = req.into_input(0.95).unwrap_err();
        assert!(matches!(err, DiagError::InvalidInput { field: "rater1_data", .. }));
        assert!(err.to_string().contains("position 1"));
    }

    #[test]
    fn rows_accept_spreadsheet_text() {
        let row = decode_row(&json!({
            "technique_name": "qPCR Test",
            "true_positives": "45",
            "true_negatives": 38,
            "false_positives": "2.0",
            "false_negatives": 5,
            "confidence_level": ""
        }))
        .unwrap();
        assert_eq!(row.true_positives, 45);
        assert_eq!(row.false_positives, 2);
        assert_eq!(row.confidence_level, None);
    }

    #[test]
    fn row_errors_name_the_column() {
        let err = decode_row(&json!({
            "technique_name": "x",
            "true_positives": 1,
            "true_negatives": "many",
            "false_positives": 0,
            "false_negatives": 0
        }))
        .unwrap_err();
        assert!(matches!(err, DiagError::InvalidInput { field: "true_negatives", .. }));

        let err = decode_row(&json!({"technique_name": "x"})).unwrap_err();
        assert!(matches!(err, DiagError::InvalidInput { field: "true_positives", .. }));
    }

    #[test]
    fn malformed_body_is_invalid_input() {
        let err = parse_body::<CompareRequest>("{not json").unwrap_err();
        assert_eq!(err.status(), 422);
    }
}
