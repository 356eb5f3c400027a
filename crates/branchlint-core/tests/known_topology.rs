//! Known-topology regression tests for the validation report.
//!
//! Each test feeds a hand-written dialogue through the JSON boundary and
//! checks the exact findings that come out.

use std::collections::{BTreeMap, HashSet};

use branchlint_core::{
    CycleId, Finding, FindingKind, IntentionalCycles, NoIntentionalCycles, ValidationReport,
    ValidationRequest, Validator, validate,
};
use serde_json::{Value, json};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn run(nodes: Value) -> ValidationReport {
    run_with(nodes, &NoIntentionalCycles)
}

fn run_with<I: IntentionalCycles + ?Sized>(nodes: Value, intentional: &I) -> ValidationReport {
    let request = ValidationRequest::from_value(json!({ "nodes": nodes })).expect("valid request");
    validate(&request.nodes, intentional)
}

fn line(id: &str, next: &str) -> Value {
    json!({ "id": id, "type": "dialogue", "speaker": "Narrator", "line": "...", "next": next })
}

fn cycle_ids(report: &ValidationReport) -> Vec<CycleId> {
    report
        .cycles()
        .filter_map(Finding::cycle_id)
        .cloned()
        .collect()
}

fn is_well_formed(id: &str) -> bool {
    id.len() == 22
        && id.starts_with("cycle_")
        && id[6..]
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

// ---------------------------------------------------------------------------
// Cycles
// ---------------------------------------------------------------------------

#[test]
fn single_three_node_cycle() {
    let report = run(json!([
        line("START", "A"),
        line("A", "B"),
        line("B", "C"),
        line("C", "A"),
    ]));

    let cycles: Vec<&Finding> = report.cycles().collect();
    assert_eq!(cycles.len(), 1);

    let value = serde_json::to_value(cycles[0]).expect("serialize");
    let nodes: HashSet<&str> = value["cycle_nodes"]
        .as_array()
        .expect("cycle_nodes array")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(nodes, HashSet::from(["A", "B", "C"]));

    let path = value["cycle_path"].as_str().expect("cycle_path");
    assert!(path.contains('→'));
    for id in ["A", "B", "C"] {
        assert!(path.contains(id), "{path} should mention {id}");
    }
    assert!(is_well_formed(value["cycle_id"].as_str().expect("cycle_id")));
}

#[test]
fn two_disjoint_cycles_have_distinct_ids() {
    let report = run(json!([
        line("A", "B"),
        line("B", "A"),
        line("C", "D"),
        line("D", "C"),
    ]));

    let ids = cycle_ids(&report);
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[test]
fn acyclic_graph_reports_zero_cycles() {
    let report = run(json!([
        {
            "id": "START", "type": "dialogue", "line": "Choose.",
            "choices": [ { "text": "Left", "next": "LEFT" }, { "text": "Right", "next": "RIGHT" } ]
        },
        line("LEFT", "JOIN"),
        line("RIGHT", "JOIN"),
        line("JOIN", "END"),
    ]));

    assert_eq!(report.count(FindingKind::CycleDetected), 0);
    assert!(report.is_clean(), "{report:?}");
}

#[test]
fn validation_is_idempotent() {
    let nodes = json!([
        line("START", "HUB"),
        {
            "id": "HUB", "type": "dialogue", "line": "Anything else?",
            "choices": [ { "next": "ASK" }, { "next": "SHOP" }, { "next": "END" } ]
        },
        line("ASK", "HUB"),
        line("SHOP", "HUB"),
    ]);

    let first = run(nodes.clone());
    let second = run(nodes);
    assert_eq!(cycle_ids(&first), cycle_ids(&second));
    assert_eq!(first, second);
    assert_eq!(cycle_ids(&first).len(), 2);
}

#[test]
fn cycle_id_survives_reordering_the_input() {
    let forward = run(json!([line("START", "A"), line("A", "B"), line("B", "START")]));
    let shuffled = run(json!([line("B", "START"), line("A", "B"), line("START", "A")]));

    assert_eq!(cycle_ids(&forward), cycle_ids(&shuffled));
}

#[test]
fn self_loop_reports_one_node_cycle() {
    let report = run(json!([line("START", "WAIT"), line("WAIT", "WAIT")]));
    let value = serde_json::to_value(report.cycles().next().expect("cycle")).expect("serialize");
    assert_eq!(value["cycle_nodes"], json!(["WAIT"]));
    assert_eq!(value["cycle_path"], "WAIT → WAIT");
}

// ---------------------------------------------------------------------------
// Intentional cycles
// ---------------------------------------------------------------------------

#[test]
fn marking_and_unmarking_a_cycle() {
    let nodes = json!([
        line("START", "A"),
        line("A", "START"),
        line("LOOP", "LOOP"),
        line("DANGLING", "NOWHERE"),
    ]);

    let baseline = run(nodes.clone());
    let ids = cycle_ids(&baseline);
    assert_eq!(ids.len(), 2);

    let mut registry: BTreeMap<CycleId, bool> = BTreeMap::new();
    registry.insert(ids[0].clone(), true);
    let marked = run_with(nodes.clone(), &registry);

    assert_eq!(cycle_ids(&marked), vec![ids[1].clone()]);
    let others = |r: &ValidationReport| -> Vec<Finding> {
        r.iter()
            .filter(|f| f.kind != FindingKind::CycleDetected)
            .cloned()
            .collect()
    };
    assert_eq!(others(&marked), others(&baseline));

    registry.insert(ids[0].clone(), false);
    let unmarked = run_with(nodes, &registry);
    assert_eq!(unmarked, baseline);
}

#[test]
fn closure_predicate_is_consulted_per_cycle() {
    let nodes = json!([line("A", "B"), line("B", "A"), line("C", "D"), line("D", "C")]);
    let asked = std::cell::RefCell::new(Vec::new());
    let predicate = |id: &CycleId| {
        asked.borrow_mut().push(id.clone());
        false
    };
    let report = run_with(nodes, &predicate);
    assert_eq!(asked.into_inner(), cycle_ids(&report));
}

// ---------------------------------------------------------------------------
// References and reachability
// ---------------------------------------------------------------------------

#[test]
fn end_is_never_a_broken_reference() {
    let report = run(json!([
        {
            "id": "START", "type": "test", "skill": "charm",
            "criticalFailureNode": "END", "failureNode": "END",
            "successNode": "END", "criticalSuccessNode": "END"
        }
    ]));
    assert_eq!(report.count(FindingKind::BrokenReference), 0);
    assert!(report.is_clean(), "{report:?}");
}

#[test]
fn legacy_two_outcome_test_validates_like_current_schema() {
    let legacy = run(json!([
        line("START", "CHECK"),
        { "id": "CHECK", "type": "test", "skill": "lockpicking",
          "failureNode": "STUCK", "successNode": "OPEN" },
        line("STUCK", "END"),
        line("OPEN", "END"),
    ]));
    let current = run(json!([
        line("START", "CHECK"),
        { "id": "CHECK", "type": "test", "skill": "lockpicking",
          "criticalFailureNode": "", "failureNode": "STUCK",
          "successNode": "OPEN", "criticalSuccessNode": null },
        line("STUCK", "END"),
        line("OPEN", "END"),
    ]));

    assert!(legacy.is_clean(), "{legacy:?}");
    assert_eq!(legacy, current);
}

#[test]
fn broken_reference_names_source_and_target() {
    let report = run(json!([
        {
            "id": "START", "type": "dialogue", "line": "Go?",
            "choices": [ { "next": "END" }, { "next": "NODE_MISSING" } ]
        }
    ]));

    assert_eq!(report.errors.len(), 1);
    let value = serde_json::to_value(&report.errors[0]).expect("serialize");
    assert_eq!(value["type"], "broken_reference");
    assert_eq!(value["severity"], "error");
    assert_eq!(value["node_id"], "START");
    assert_eq!(value["target"], "NODE_MISSING");
    assert_eq!(value["edge_kind"], "choice[1]");
}

#[test]
fn orphan_is_not_unreachable() {
    let report = run(json!([line("START", "END"), line("STRAY", "END")]));
    assert_eq!(report.count(FindingKind::OrphanNode), 1);
    assert_eq!(report.count(FindingKind::UnreachableNode), 0);
    assert_eq!(report.warnings[0].node_id.as_deref(), Some("STRAY"));
}

#[test]
fn malformed_nodes_are_findings_not_failures() {
    let report = run(json!([
        line("START", "END"),
        { "type": "dialogue", "line": "who am I" },
        { "id": null, "type": "dialogue", "line": "pending" },
        line("START", "END"),
        { "id": "END", "type": "end" },
    ]));

    let kinds: Vec<FindingKind> = report.errors.iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        vec![
            FindingKind::MissingId,
            FindingKind::MissingId,
            FindingKind::DuplicateNode,
            FindingKind::ReservedId,
        ]
    );
    assert_eq!(report.errors[1].node_id, None);
    assert_eq!(report.errors[3].node_id.as_deref(), Some("END"));
}

#[test]
fn null_id_from_json_text_is_a_finding() {
    let request = ValidationRequest::from_json(
        r#"{"nodes":[
            {"id":"START","type":"dialogue","line":"Hello","next":"END"},
            {"id":null,"type":"dialogue","line":"pending"}
        ]}"#,
    )
    .expect("null id is not a schema error");

    let report = validate(&request.nodes, &NoIntentionalCycles);
    assert_eq!(report.count(FindingKind::MissingId), 1);
    assert!(report.warnings.is_empty(), "{report:?}");
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_validations_agree() {
    let request = ValidationRequest::from_value(json!({
        "nodes": [line("START", "A"), line("A", "B"), line("B", "START"), line("X", "Y")]
    }))
    .expect("valid request");
    let validator = Validator::default();
    let expected = validator.validate(&request.nodes, &NoIntentionalCycles);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| validator.validate(&request.nodes, &NoIntentionalCycles)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().expect("thread"), expected);
        }
    });
}
