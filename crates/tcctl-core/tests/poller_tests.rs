//! Poller behavior against a scripted in-memory client
//!
//! Tests run with a paused tokio clock so the polling ticks complete
//! instantly while still exercising the real sleep/deadline logic.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tcctl_core::{
    Completion, CoreError, Operation, OperationClient, PollOptions, Poller, ProgressEvent,
    ResourceKind, Result, RetryConfig,
};
use tokio_util::sync::CancellationToken;

/// One scripted answer: an HTTP status plus body, or a transport failure
enum Reply {
    Http(u16, Value),
    ConnectionError,
}

/// A call observed by the stub
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Status {
        tracking_id: String,
        project_id: Option<String>,
    },
    Resource {
        kind: ResourceKind,
        item_id: String,
        project_id: Option<String>,
    },
}

#[derive(Default)]
struct ScriptedClient {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedClient {
    fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always answers `202` with the same tracking id
    fn always_running() -> Self {
        Self::default()
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn next<T: DeserializeOwned>(&self, call: Call) -> Result<Operation<T>> {
        self.calls.lock().unwrap().push(call);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Reply::Http(202, running("t-loop", None)));
        match reply {
            Reply::Http(status, body) => Operation::decode(status, body),
            Reply::ConnectionError => Err(CoreError::Connection("connection reset".to_string())),
        }
    }
}

#[async_trait]
impl OperationClient for ScriptedClient {
    async fn status<T>(&self, tracking_id: &str, project_id: Option<&str>) -> Result<Operation<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.next(Call::Status {
            tracking_id: tracking_id.to_string(),
            project_id: project_id.map(str::to_string),
        })
    }

    async fn resource<T>(
        &self,
        kind: ResourceKind,
        item_id: &str,
        project_id: Option<&str>,
    ) -> Result<Operation<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.next(Call::Resource {
            kind,
            item_id: item_id.to_string(),
            project_id: project_id.map(str::to_string),
        })
    }
}

fn running(tracking_id: &str, location: Option<&str>) -> Value {
    json!({
        "code": 202,
        "status": "Accepted",
        "state": "Running",
        "location": location,
        "_trackingId": tracking_id,
    })
}

fn redirect(location: &str) -> Value {
    json!({ "code": 302, "status": "Found", "state": "Completed", "location": location })
}

fn submitted(status: u16, body: Value) -> Result<Operation<Value>> {
    Operation::decode(status, body)
}

fn status_call(tracking_id: &str, project_id: Option<&str>) -> Call {
    Call::Status {
        tracking_id: tracking_id.to_string(),
        project_id: project_id.map(str::to_string),
    }
}

fn fast_options() -> PollOptions {
    PollOptions {
        tick: Duration::from_millis(10),
        ticks_per_poll: 2,
        timeout: None,
        max_polls: None,
    }
}

#[tokio::test(start_paused = true)]
async fn synchronous_result_is_returned_without_polling() {
    let client = ScriptedClient::new(vec![]);
    let poller = Poller::new(&client, fast_options());

    let completion = poller
        .run_create(
            ResourceKind::ProjectType,
            None,
            async { submitted(201, json!({ "code": 201, "data": { "id": "azure.default" } })) },
        )
        .await
        .unwrap();

    assert_eq!(completion.data(), Some(&json!({ "id": "azure.default" })));
    assert!(client.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn running_operation_polls_until_success() {
    let client = ScriptedClient::new(vec![
        Reply::Http(200, running("t-1", Some("https://tc/api/status/t-1"))),
        Reply::Http(
            200,
            json!({ "code": 200, "state": "Completed", "_trackingId": "t-1", "location": "https://tc/api/users/u1" }),
        ),
    ]);
    let poller = Poller::new(&client, fast_options());

    let completion = poller
        .run_create(ResourceKind::User, None, async {
            submitted(202, running("t-1", Some("https://tc/api/status/t-1")))
        })
        .await
        .unwrap();

    assert_eq!(
        client.calls(),
        vec![status_call("t-1", None), status_call("t-1", None)]
    );
    match completion {
        Completion::Status(status) => {
            assert_eq!(status.state.as_deref(), Some("Completed"));
            assert_eq!(status.location.as_deref(), Some("https://tc/api/users/u1"));
        }
        other => panic!("expected status completion, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn redirect_fetches_item_named_by_location() {
    for location in [
        "https://tc/api/providers/abc123",
        "https://tc/api/providers/abc123/",
        "https://tc/api/providers/abc123?api-version=2",
    ] {
        let client = ScriptedClient::new(vec![Reply::Http(
            200,
            json!({ "code": 200, "data": { "id": "abc123" } }),
        )]);
        let poller = Poller::new(&client, fast_options());

        let completion = poller
            .run_create(ResourceKind::Provider, None, async {
                submitted(302, redirect(location))
            })
            .await
            .unwrap();

        assert_eq!(
            client.calls(),
            vec![Call::Resource {
                kind: ResourceKind::Provider,
                item_id: "abc123".to_string(),
                project_id: None,
            }],
            "location: {location}"
        );
        assert!(completion.data().is_some());
    }
}

#[tokio::test(start_paused = true)]
async fn redirect_after_polling_keeps_project_scope() {
    let client = ScriptedClient::new(vec![
        Reply::Http(200, redirect("https://tc/api/projects/P1/users/u-7")),
        Reply::Http(200, json!({ "code": 200, "data": { "id": "u-7" } })),
    ]);
    let poller = Poller::new(&client, fast_options());

    poller
        .run_create(ResourceKind::ProjectUser, Some("P1"), async {
            submitted(202, running("t-2", None))
        })
        .await
        .unwrap();

    assert_eq!(
        client.calls(),
        vec![
            status_call("t-2", Some("P1")),
            Call::Resource {
                kind: ResourceKind::ProjectUser,
                item_id: "u-7".to_string(),
                project_id: Some("P1".to_string()),
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn project_id_is_taken_from_location() {
    let client = ScriptedClient::new(vec![Reply::Http(200, json!({ "code": 200 }))]);
    let poller = Poller::new(&client, fast_options());

    poller
        .run_create(ResourceKind::Project, None, async {
            submitted(
                202,
                running("t-3", Some("https://tc/api/projects/P1/status/t-3")),
            )
        })
        .await
        .unwrap();

    assert_eq!(client.calls(), vec![status_call("t-3", Some("P1"))]);
}

#[tokio::test(start_paused = true)]
async fn explicit_project_scope_wins_over_location() {
    let client = ScriptedClient::new(vec![Reply::Http(200, json!({ "code": 200 }))]);
    let poller = Poller::new(&client, fast_options());

    poller
        .run_delete(ResourceKind::ProjectUser, Some("P2"), async {
            submitted(
                202,
                running("t-4", Some("https://tc/api/projects/P1/status/t-4")),
            )
        })
        .await
        .unwrap();

    assert_eq!(client.calls(), vec![status_call("t-4", Some("P2"))]);
}

#[tokio::test(start_paused = true)]
async fn delete_of_missing_item_returns_failure_without_polling() {
    let client = ScriptedClient::new(vec![]);
    let poller = Poller::new(&client, fast_options());

    let completion = poller
        .run_delete(ResourceKind::User, None, async {
            submitted(
                404,
                json!({ "code": 404, "status": "NotFound", "errors": [{ "message": "User not found" }] }),
            )
        })
        .await
        .unwrap();

    assert!(completion.is_failed());
    assert!(client.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn failure_while_polling_stops_the_loop() {
    let client = ScriptedClient::new(vec![Reply::Http(
        200,
        json!({ "code": 409, "status": "Conflict", "errors": [{ "message": "in use" }] }),
    )]);
    let poller = Poller::new(&client, fast_options());

    let completion = poller
        .run_delete(ResourceKind::Provider, None, async {
            submitted(202, running("t-5", None))
        })
        .await
        .unwrap();

    match completion {
        Completion::Failed(error) => assert_eq!(error.code, Some(409)),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn endless_running_is_bounded_by_max_polls() {
    let client = ScriptedClient::always_running();
    let options = PollOptions {
        max_polls: Some(5),
        ..fast_options()
    };
    let poller = Poller::new(&client, options);

    let err = poller
        .run_create(ResourceKind::User, None, async {
            submitted(202, running("t-loop", None))
        })
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::PollLimitExceeded(5)));
    assert_eq!(client.calls().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn endless_running_is_bounded_by_deadline() {
    let client = ScriptedClient::always_running();
    let options = PollOptions {
        timeout: Some(Duration::from_secs(30)),
        ..PollOptions::default()
    };
    let poller = Poller::new(&client, options);

    let err = poller
        .run_create(ResourceKind::User, None, async {
            submitted(202, running("t-loop", None))
        })
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    // 4 one-second ticks per poll inside a 30 second window
    assert!(client.calls().len() <= 8);
}

#[tokio::test(start_paused = true)]
async fn redirect_is_a_protocol_violation_when_deleting() {
    let client = ScriptedClient::new(vec![]);
    let poller = Poller::new(&client, fast_options());

    let err = poller
        .run_delete(ResourceKind::Provider, None, async {
            submitted(302, redirect("https://tc/api/providers/abc123"))
        })
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::ProtocolViolation(_)));
    assert!(client.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn running_without_tracking_id_is_a_protocol_violation() {
    let client = ScriptedClient::new(vec![]);
    let poller = Poller::new(&client, fast_options());

    let err = poller
        .run_create(ResourceKind::User, None, async {
            submitted(202, json!({ "code": 202, "state": "Running" }))
        })
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::ProtocolViolation(_)));
}

#[tokio::test(start_paused = true)]
async fn submit_errors_propagate() {
    let client = ScriptedClient::new(vec![]);
    let poller = Poller::new(&client, fast_options());

    let err = poller
        .run_create::<Value, _>(ResourceKind::User, None, async {
            Err(CoreError::Connection("refused".to_string()))
        })
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Connection(_)));
    assert!(client.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn transient_status_errors_are_retried() {
    let client = ScriptedClient::new(vec![
        Reply::ConnectionError,
        Reply::ConnectionError,
        Reply::Http(200, json!({ "code": 200 })),
    ]);
    let poller = Poller::new(&client, fast_options()).with_retry(RetryConfig::default());

    let completion = poller
        .run_create(ResourceKind::User, None, async {
            submitted(202, running("t-6", None))
        })
        .await
        .unwrap();

    assert!(matches!(completion, Completion::Status(_)));
    assert_eq!(client.calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn throttled_and_server_error_answers_are_retried() {
    let client = ScriptedClient::new(vec![
        Reply::Http(503, Value::Null),
        Reply::Http(429, json!({ "status": "TooManyRequests" })),
        Reply::Http(200, json!({ "code": 200 })),
    ]);
    let poller = Poller::new(&client, fast_options()).with_retry(RetryConfig::default());

    let completion = poller
        .run_create(ResourceKind::User, None, async {
            submitted(202, running("t-8", None))
        })
        .await
        .unwrap();

    assert!(matches!(completion, Completion::Status(_)));
    assert_eq!(client.calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn server_errors_without_retry_end_as_failure() {
    let client = ScriptedClient::new(vec![Reply::Http(503, Value::Null)]);
    let retry = RetryConfig {
        enabled: false,
        ..RetryConfig::default()
    };
    let poller = Poller::new(&client, fast_options()).with_retry(retry);

    let completion = poller
        .run_create(ResourceKind::User, None, async {
            submitted(202, running("t-9", None))
        })
        .await
        .unwrap();

    match completion {
        Completion::Failed(error) => assert_eq!(error.code, Some(503)),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn retries_give_up_after_max_attempts() {
    let client = ScriptedClient::new(vec![
        Reply::ConnectionError,
        Reply::ConnectionError,
        Reply::ConnectionError,
    ]);
    let retry = RetryConfig {
        max_attempts: 2,
        ..RetryConfig::default()
    };
    let poller = Poller::new(&client, fast_options()).with_retry(retry);

    let err = poller
        .run_create(ResourceKind::User, None, async {
            submitted(202, running("t-7", None))
        })
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Connection(_)));
    assert_eq!(client.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_polling() {
    let client = ScriptedClient::always_running();
    let token = CancellationToken::new();
    let poller = Poller::new(&client, PollOptions::default()).with_cancellation(token.clone());

    let cancel = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        token.cancel();
    });

    let err = poller
        .run_create(ResourceKind::User, None, async {
            submitted(202, running("t-loop", None))
        })
        .await
        .unwrap_err();
    cancel.await.unwrap();

    assert!(matches!(err, CoreError::Cancelled));
    assert!(client.calls().len() <= 3);
}

#[tokio::test(start_paused = true)]
async fn progress_events_follow_the_operation() {
    let client = ScriptedClient::new(vec![Reply::Http(200, json!({ "code": 200 }))]);
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);

    let poller = Poller::new(&client, fast_options()).with_progress(Box::new(move |event| {
        sink.lock().unwrap().push(event);
    }));

    poller
        .run_delete(ResourceKind::Provider, None, async {
            submitted(202, json!({ "code": 202, "state": "Running", "_trackingId": "t-8" }))
        })
        .await
        .unwrap();

    let events = events.lock().unwrap();
    assert_eq!(
        events.first(),
        Some(&ProgressEvent::Started {
            message: "Starting: Delete Provider".to_string()
        })
    );
    let polling: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Polling { message, .. } => Some(message.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(polling, vec!["Running: Deleting Provider"; 2]);
    assert_eq!(
        events.last(),
        Some(&ProgressEvent::Finished {
            message: "Finished.".to_string()
        })
    );
}
