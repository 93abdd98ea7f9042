//! Test: Success Chain - fields accumulate across steps

use crate::helpers::*;
use meetup_ops::core::Fields;
use serde_json::json;

/// Every field written by every step ends up in the final context
#[tokio::test]
async fn test_final_context_is_union_of_step_outputs() {
    let steps = [
        MockStep::writes("collect", Fields::new().with("eventDate", "2024-03-15")),
        MockStep::writes("issue", Fields::new().with("mentorRegistrationUrl", "https://example.com/issues/42")),
        MockStep::writes(
            "event",
            Fields::new()
                .with("eventApiId", "99")
                .with("eventCoordinates", json!({"lat": 1.0, "lng": 2.0})),
        ),
    ];
    let workflow = workflow_of("union", &steps);

    let result = run_workflow(&workflow, Fields::new().with("eventName", "March Meetup")).await;

    assert_run_completed(&result);
    assert_eq!(result.context().len(), 5);
    assert_field(&result, "eventName", "March Meetup");
    assert_field(&result, "eventDate", "2024-03-15");
    assert_field(&result, "mentorRegistrationUrl", "https://example.com/issues/42");
    assert_field(&result, "eventApiId", "99");
    assert_field(&result, "eventCoordinates", json!({"lat": 1.0, "lng": 2.0}));
}

/// Each step sees what earlier steps wrote and nothing from later ones
#[tokio::test]
async fn test_steps_see_earlier_fields_only() {
    let steps = [
        MockStep::writes("first", Fields::new().with("a", 1)),
        MockStep::writes("second", Fields::new().with("b", 2)),
        MockStep::writes("third", Fields::new().with("c", 3)),
    ];
    let workflow = workflow_of("visibility", &steps);

    let result = run_workflow(&workflow, Fields::new()).await;
    assert_run_completed(&result);

    let second = &steps[1].seen()[0];
    assert!(second.contains("a"));
    assert!(!second.contains("b"));
    assert!(!second.contains("c"));

    let third = &steps[2].seen()[0];
    assert!(third.contains("a") && third.contains("b"));
    assert!(!third.contains("c"));
}

/// A later write of the same field is what subsequent steps observe
#[tokio::test]
async fn test_later_write_is_visible_downstream() {
    let steps = [
        MockStep::writes("duplicate", Fields::new().with("eventSlug", "copy-of-october")),
        MockStep::writes("update", Fields::new().with("eventSlug", "march-meetup")),
        MockStep::requires("publish", "eventSlug", Fields::new()),
    ];
    let workflow = workflow_of("overwrite", &steps);

    let result = run_workflow(&workflow, Fields::new()).await;

    assert_run_completed(&result);
    assert_field(&result, "eventSlug", "march-meetup");
    assert_eq!(steps[2].seen()[0].get_str("eventSlug"), Some("march-meetup"));
}

/// Steps run one at a time in declaration order, each exactly once
#[tokio::test]
async fn test_steps_run_in_order_once() {
    let steps = [
        MockStep::writes("one", Fields::new()),
        MockStep::writes("two", Fields::new()),
        MockStep::writes("three", Fields::new()),
        MockStep::writes("four", Fields::new()),
    ];
    let workflow = workflow_of("order", &steps);

    let result = run_workflow(&workflow, Fields::new()).await;

    assert_run_completed(&result);
    assert_eq!(result.started_steps(), vec!["one", "two", "three", "four"]);
    assert!(steps.iter().all(|s| s.calls() == 1));
    assert_eq!(result.run.completed_steps(), 4);
}

/// A workflow with no steps succeeds and returns its initial context
#[tokio::test]
async fn test_empty_workflow() {
    let workflow = workflow_of("empty", &[]);
    let result = run_workflow(&workflow, Fields::new().with("eventName", "March Meetup")).await;

    assert_run_completed(&result);
    assert_field(&result, "eventName", "March Meetup");
}
