//! Test: March Meetup - prompt, mentor issue and duplicate event against mock APIs

use crate::helpers::*;
use meetup_ops::clients::{GitHubClient, TitoClient};
use meetup_ops::core::config::{GitHubSettings, TicketingSettings};
use meetup_ops::core::{Fields, Workflow};
use meetup_ops::steps::{CreateMentorIssueStep, DuplicateEventStep, PromptStep, Question, ScriptedAnswers, Validation};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEMPLATE_EVENT: &str = "october-2016-npm";

fn questions() -> Vec<Question> {
    vec![
        Question::new(
            "eventLocationName",
            "What is the name of the location of the event?",
            Validation::Required("You must input a location name for the event!".to_string()),
        )
        .with_default("npm"),
        Question::new(
            "eventDate",
            "What date will the event be on? (MM/DD/YY)",
            Validation::Date("You must input a date for the event!".to_string()),
        ),
        Question::new(
            "eventTime",
            "What time will the event start?",
            Validation::Required("You must input a time for the event!".to_string()),
        )
        .with_default("1-5PM"),
    ]
}

async fn mock_github(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/repos/Fauntleroy/github-api-test-repo/issues"))
        .and(header("Authorization", "token ghp_test"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "number": 42,
            "html_url": "https://example.com/issues/42"
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn march_workflow(github: &MockServer, tito: &MockServer) -> Workflow {
    let answers = Arc::new(ScriptedAnswers::new(["", "03/15/24", ""]));
    let issues = GitHubClient::new(
        &GitHubSettings {
            api_url: github.uri(),
            ..Default::default()
        },
        "organizer",
        "ghp_test",
    );
    let ticketing = TitoClient::new(
        &TicketingSettings {
            api_url: tito.uri(),
            account: "nodeschool-oakland".to_string(),
            ..Default::default()
        },
        "tito_test",
    );

    Workflow::new("march-meetup")
        .step(PromptStep::new("collect event details", questions(), answers))
        .step(CreateMentorIssueStep::new(Arc::new(issues), "{{locationName}} {{date}} {{time}}"))
        .step(DuplicateEventStep::new(Arc::new(ticketing), TEMPLATE_EVENT))
}

#[tokio::test]
async fn test_march_meetup_succeeds() {
    let github = MockServer::start().await;
    let tito = MockServer::start().await;
    mock_github(&github).await;

    Mock::given(method("POST"))
        .and(path(format!("/nodeschool-oakland/{}/duplication", TEMPLATE_EVENT)))
        .and(header("Authorization", "Token token=tito_test"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {
                "id": "99",
                "type": "events",
                "attributes": { "slug": "october-2016-npm-copy" },
                "links": { "self": "https://api.example.com/events/99" }
            }
        })))
        .expect(1)
        .mount(&tito)
        .await;

    let workflow = march_workflow(&github, &tito);
    let result = run_workflow(&workflow, Fields::new().with("eventName", "March Meetup")).await;

    assert_run_completed(&result);
    assert_field(&result, "eventName", "March Meetup");
    assert_field(&result, "eventDate", "2024-03-15");
    assert_field(&result, "eventTime", "1-5PM");
    assert_field(&result, "mentorRegistrationUrl", "https://example.com/issues/42");
    assert_field(&result, "eventApiId", "99");
    assert_field(&result, "eventApiUrl", "https://api.example.com/events/99");
}

#[tokio::test]
async fn test_march_meetup_duplicate_rejected() {
    let github = MockServer::start().await;
    let tito = MockServer::start().await;
    mock_github(&github).await;

    Mock::given(method("POST"))
        .and(path(format!("/nodeschool-oakland/{}/duplication", TEMPLATE_EVENT)))
        .respond_with(ResponseTemplate::new(422).set_body_string("event could not be duplicated"))
        .expect(1)
        .mount(&tito)
        .await;

    let workflow = march_workflow(&github, &tito);
    let result = run_workflow(&workflow, Fields::new().with("eventName", "March Meetup")).await;

    assert_run_failed_at(&result, "duplicate event", "422");
    assert_field(&result, "eventDate", "2024-03-15");
    assert_field(&result, "eventTime", "1-5PM");
    assert_field(&result, "mentorRegistrationUrl", "https://example.com/issues/42");
    assert!(!result.context().contains("eventApiId"));
    assert!(!result.context().contains("eventApiUrl"));
}
