//! Test: Failure Handling - fail fast, attribute the failure, keep earlier fields

use crate::helpers::*;
use meetup_ops::core::{Fields, StepError, StepState};
use meetup_ops::execution::WorkflowError;

fn sequence(len: usize, failing: usize) -> Vec<MockStep> {
    (1..=len)
        .map(|i| {
            let name = format!("step {}", i);
            if i == failing {
                MockStep::fails(&name, &format!("simulated failure in {}", name))
            } else {
                MockStep::writes(&name, Fields::new().with(format!("field{}", i), i))
            }
        })
        .collect()
}

/// For every failing position k, steps after k never execute and the failure
/// is attributed to step k
#[tokio::test]
async fn test_fail_fast_at_every_position() {
    let len = 5;
    for k in 1..=len {
        let steps = sequence(len, k);
        let workflow = workflow_of("fail-fast", &steps);

        let result = run_workflow(&workflow, Fields::new()).await;

        let failing = format!("step {}", k);
        assert_run_failed_at(&result, &failing, &format!("simulated failure in {}", failing));

        for (index, step) in steps.iter().enumerate() {
            let position = index + 1;
            let expected = if position <= k { 1 } else { 0 };
            assert_eq!(step.calls(), expected, "k={} step {} call count", k, position);
        }

        for record in &result.run.steps[k..] {
            assert!(matches!(record.state, StepState::Skipped { .. }), "k={}", k);
        }

        match &result.result {
            Err(WorkflowError::StepFailed { position, .. }) => assert_eq!(*position, k),
            other => panic!("expected StepFailed, got {:?}", other),
        }
    }
}

/// Fields written before the failure stay in the context; nothing is rolled back
#[tokio::test]
async fn test_no_rollback_of_earlier_fields() {
    let steps = sequence(4, 3);
    let workflow = workflow_of("no-rollback", &steps);

    let result = run_workflow(&workflow, Fields::new()).await;

    assert!(result.is_failed());
    assert_field(&result, "field1", 1);
    assert_field(&result, "field2", 2);
    assert!(!result.context().contains("field4"));
}

/// A step whose required field is absent fails the same way every time
#[tokio::test]
async fn test_missing_required_field_fails_deterministically() {
    for _ in 0..3 {
        let steps = [
            MockStep::writes("collect", Fields::new().with("eventName", "March Meetup")),
            MockStep::requires("update event", "eventApiId", Fields::new().with("eventSlug", "x")),
            MockStep::writes("publish", Fields::new()),
        ];
        let workflow = workflow_of("missing-field", &steps);

        let result = run_workflow(&workflow, Fields::new()).await;

        assert_run_failed_at(&result, "update event", "missing required field 'eventApiId'");
        assert!(!result.context().contains("eventSlug"));
        assert_eq!(steps[2].calls(), 0);

        match &result.result {
            Err(WorkflowError::StepFailed { source, .. }) => {
                assert!(matches!(source, StepError::MissingField(f) if f == "eventApiId"))
            }
            other => panic!("expected StepFailed, got {:?}", other),
        }
    }
}

/// A null value does not satisfy a required field
#[tokio::test]
async fn test_null_field_is_missing() {
    let steps = [MockStep::requires("read releases", "eventApiUrl", Fields::new())];
    let workflow = workflow_of("null-field", &steps);

    let result = run_workflow(&workflow, Fields::new().with("eventApiUrl", serde_json::Value::Null)).await;

    assert_run_failed_at(&result, "read releases", "eventApiUrl");
}

/// Duplicate step names are rejected before anything runs
#[tokio::test]
async fn test_ambiguous_step_names_rejected() {
    let steps = [
        MockStep::writes("same", Fields::new().with("a", 1)),
        MockStep::writes("same", Fields::new()),
    ];
    let workflow = workflow_of("ambiguous", &steps);

    let result = run_workflow(&workflow, Fields::new()).await;

    assert!(matches!(result.result, Err(WorkflowError::Invalid(_))));
    assert_eq!(steps[0].calls(), 0);
    assert!(result.events.is_empty());
}
