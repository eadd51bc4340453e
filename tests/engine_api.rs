//! End-to-end flow of the web client against an in-process engine.

use diagstat::{Engine, ExperimentStore};
use serde_json::{json, Value};

fn engine() -> Engine {
    Engine::new(ExperimentStore::in_memory())
}

fn create(engine: &Engine, name: &str, tp: i64, tn: i64, fp: i64, fn_: i64, level: f64) -> Value {
    let payload = json!({
        "technique_name": name,
        "true_positives": tp,
        "true_negatives": tn,
        "false_positives": fp,
        "false_negatives": fn_,
        "confidence_level": level,
    });
    let r = engine.create_experiment(&payload.to_string());
    assert_eq!(r.status, 200, "{}", r.body);
    r.body
}

#[test]
fn experiment_records_carry_the_wire_contract() {
    let engine = engine();
    let body = create(&engine, "qPCR (Quantitative PCR)", 45, 38, 2, 5, 0.95);

    for field in [
        "experiment_id",
        "technique_name",
        "confusion_matrix",
        "confidence_level",
        "prevalence",
        "created_at",
    ] {
        assert!(body.get(field).is_some(), "missing {field}");
    }
    for metric in ["sensitivity", "specificity", "ppv", "npv", "accuracy"] {
        let m = &body[metric];
        let (v, lo, hi) = (
            m["value"].as_f64().unwrap(),
            m["ci_lower"].as_f64().unwrap(),
            m["ci_upper"].as_f64().unwrap(),
        );
        assert!(0.0 < lo && lo < v && v < hi && hi < 1.0, "{metric}: {m}");
    }
    assert!((body["sensitivity"]["value"].as_f64().unwrap() - 0.9).abs() < 1e-4);
    assert!((body["specificity"]["value"].as_f64().unwrap() - 0.95).abs() < 1e-4);
    assert!((body["ppv"]["value"].as_f64().unwrap() - 0.9574).abs() < 1e-4);
    assert!((body["npv"]["value"].as_f64().unwrap() - 0.8837).abs() < 1e-4);
    assert!((body["accuracy"]["value"].as_f64().unwrap() - 0.9222).abs() < 1e-4);
    assert!((body["prevalence"].as_f64().unwrap() - 0.5556).abs() < 1e-4);
}

#[test]
fn create_list_get_compare() {
    let engine = engine();
    let ids: Vec<String> = [
        ("qPCR (Quantitative PCR)", 45, 38, 2, 5, 0.95),
        ("RPA (Recombinase Polymerase Amplification)", 42, 40, 3, 4, 0.95),
        ("LAMP (Loop-mediated Isothermal Amplification)", 48, 35, 1, 6, 0.99),
    ]
    .into_iter()
    .map(|(name, tp, tn, fp, fn_, level)| {
        create(&engine, name, tp, tn, fp, fn_, level)["experiment_id"]
            .as_str()
            .unwrap()
            .to_owned()
    })
    .collect();

    let listed = engine.list_experiments();
    assert_eq!(listed.status, 200);
    let listed_ids: Vec<&str> = listed
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["experiment_id"].as_str().unwrap())
        .collect();
    assert_eq!(listed_ids, ids);

    let one = engine.get_experiment(&ids[2]);
    assert_eq!(one.status, 200);
    assert_eq!(one.body["confidence_level"], 0.99);

    let compared = engine.compare(&json!({ "experiment_ids": ids }).to_string());
    assert_eq!(compared.status, 200, "{}", compared.body);
    assert_eq!(compared.body["techniques"].as_array().unwrap().len(), 3);
    // Sensitivity 45/50, 42/46, 48/54; specificity 38/40, 40/43, 35/36.
    assert_eq!(
        compared.body["summary"]["best_sensitivity"]["technique"],
        "RPA (Recombinase Polymerase Amplification)"
    );
    assert_eq!(
        compared.body["summary"]["best_specificity"]["technique"],
        "LAMP (Loop-mediated Isothermal Amplification)"
    );
}

#[test]
fn kappa_reference_panel() {
    let r = engine().kappa(
        &json!({
            "rater1_data": [1, 2, 1, 3, 2, 1, 3],
            "rater2_data": [1, 1, 1, 3, 2, 2, 3],
            "confidence_level": 0.95,
            "description": "Inter-rater reliability test"
        })
        .to_string(),
    );
    assert_eq!(r.status, 200, "{}", r.body);
    assert_eq!(r.body["sample_size"], 7);
    assert!((r.body["kappa"].as_f64().unwrap() - 0.5625).abs() < 1e-4);
    assert_eq!(r.body["interpretation"], "Moderate");
    assert_eq!(r.body["description"], "Inter-rater reliability test");
    for field in ["ci_lower", "ci_upper", "observed_agreement", "expected_agreement"] {
        assert!(r.body[field].is_f64(), "missing {field}");
    }
}

#[test]
fn upload_creates_good_rows_and_reports_bad_ones() {
    let engine = engine();
    let r = engine.upload_rows(
        &json!({
            "rows": [
                {"technique_name": "qPCR Test", "true_positives": "45", "true_negatives": "38",
                 "false_positives": "2", "false_negatives": "5", "confidence_level": "0.95"},
                {"technique_name": "", "true_positives": 1, "true_negatives": 1,
                 "false_positives": 1, "false_negatives": 1},
                {"technique_name": "RPA Test", "true_positives": 42, "true_negatives": 40,
                 "false_positives": 3, "false_negatives": 4}
            ]
        })
        .to_string(),
    );
    assert_eq!(r.status, 200);

    let results = r.body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[1]["confidence_level"], 0.95);

    let errors = r.body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["row_index"], 1);
    assert!(errors[0]["message"].as_str().unwrap().contains("technique_name"));

    assert_eq!(engine.list_experiments().body.as_array().unwrap().len(), 2);
}

#[test]
fn error_statuses_match_the_client_expectations() {
    let engine = engine();

    let invalid = engine.create_experiment(
        &json!({
            "technique_name": "",
            "true_positives": -1,
            "true_negatives": 10,
            "false_positives": 2,
            "false_negatives": 3
        })
        .to_string(),
    );
    assert_eq!(invalid.status, 422);

    assert_eq!(engine.get_experiment("non-existent-id").status, 404);

    let mismatch = engine.kappa(
        &json!({"rater1_data": [1, 2, 3], "rater2_data": [1, 2], "confidence_level": 0.95})
            .to_string(),
    );
    assert_eq!(mismatch.status, 400);

    let empty = engine.kappa(&json!({"rater1_data": [], "rater2_data": []}).to_string());
    assert_eq!(empty.status, 400);

    let degenerate = engine.kappa(&json!({"rater1_data": ["+"], "rater2_data": ["+"]}).to_string());
    assert_eq!(degenerate.status, 400);

    let bad_level = engine.create_experiment(
        &json!({
            "technique_name": "x",
            "true_positives": 1,
            "true_negatives": 1,
            "false_positives": 1,
            "false_negatives": 1,
            "confidence_level": 1.0
        })
        .to_string(),
    );
    assert_eq!(bad_level.status, 422);
}

#[test]
fn compare_needs_two_known_experiments() {
    let engine = engine();
    let id = create(&engine, "only", 10, 10, 1, 1, 0.95)["experiment_id"]
        .as_str()
        .unwrap()
        .to_owned();

    let single = engine.compare(&json!({ "experiment_ids": [id] }).to_string());
    assert_eq!(single.status, 400);

    let unknown = engine.compare(&json!({ "experiment_ids": [id, "ghost"] }).to_string());
    assert_eq!(unknown.status, 404);
    assert!(unknown.body["detail"].as_str().unwrap().contains("ghost"));
}

#[test]
fn deleted_experiments_disappear() {
    let engine = engine();
    let id = create(&engine, "gone", 10, 10, 1, 1, 0.95)["experiment_id"]
        .as_str()
        .unwrap()
        .to_owned();

    assert_eq!(engine.delete_experiment(&id).status, 200);
    assert_eq!(engine.delete_experiment(&id).status, 200);
    assert_eq!(engine.get_experiment(&id).status, 404);
    assert!(engine.list_experiments().body.as_array().unwrap().is_empty());
}

#[test]
fn counts_past_the_integer_limit_are_rejected() {
    let engine = engine();
    let r = engine.create_experiment(
        &json!({
            "technique_name": "huge",
            "true_positives": i64::MAX,
            "true_negatives": i64::MAX,
            "false_positives": i64::MAX,
            "false_negatives": i64::MAX
        })
        .to_string(),
    );
    assert_eq!(r.status, 422, "{}", r.body);
    assert!(r.body["detail"].as_str().unwrap().contains("confusion_matrix"));
    assert!(engine.list_experiments().body.as_array().unwrap().is_empty());

    let half = i64::MAX / 2;
    let body = create(&engine, "large", half, half, half, half, 0.95);
    assert!((body["accuracy"]["value"].as_f64().unwrap() - 0.5).abs() < 1e-9);
}

#[test]
fn float_encoded_labels_match_integer_labels() {
    let r = engine().kappa(
        &json!({
            "rater1_data": [1, 2, 1, 2],
            "rater2_data": [1.0, 2.0, 1.0, 2.0]
        })
        .to_string(),
    );
    assert_eq!(r.status, 200, "{}", r.body);
    assert_eq!(r.body["kappa"], 1.0);
    assert_eq!(r.body["observed_agreement"], 1.0);
    assert_eq!(r.body["interpretation"], "Almost Perfect");
}
