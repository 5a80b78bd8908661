//! Classification of TeamCloud API responses
//!
//! Every call against the service returns one of three documents: a data
//! envelope, a status document or an error document. [`Operation`] turns
//! that into a tagged union so the poller can match on it exhaustively.

use crate::error::{CoreError, Result};
use crate::models::{DataResult, ErrorResult, StatusResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// One step of a (possibly asynchronous) operation
#[derive(Debug, Clone, PartialEq)]
pub enum Operation<T> {
    /// The resource itself; the operation is complete
    Data(DataResult<T>),
    /// Status code 200: the operation finished
    Succeeded(StatusResult),
    /// Status code 202: still running, poll again by tracking id
    Running(StatusResult),
    /// Status code 302: finished, fetch the resource named by `location`
    Redirect(StatusResult),
    /// The service reported a failure
    Failed(ErrorResult),
}

/// Terminal outcome handed back by the poller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Completion<T> {
    Data(DataResult<T>),
    Status(StatusResult),
    Failed(ErrorResult),
}

impl<T> Completion<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, Completion::Failed(_))
    }

    /// The materialized resource, if the operation produced one
    pub fn data(&self) -> Option<&T> {
        match self {
            Completion::Data(result) => Some(&result.data),
            _ => None,
        }
    }
}

impl<T: DeserializeOwned> Operation<T> {
    /// Classify a response from its HTTP status and JSON body
    pub fn decode(http_status: u16, body: Value) -> Result<Self> {
        let is_error_doc = body.get("errors").is_some_and(|e| !e.is_null());
        if http_status >= 400 || is_error_doc {
            let mut error: ErrorResult = if body.is_object() {
                serde_json::from_value(body)?
            } else {
                ErrorResult::default()
            };
            error.code.get_or_insert(http_status);
            return Ok(Operation::Failed(error));
        }

        if body.get("data").is_some_and(|d| !d.is_null()) {
            let data: DataResult<T> = serde_json::from_value(body)?;
            return Ok(Operation::Data(data));
        }

        let status: StatusResult = if body.is_null() {
            StatusResult::default()
        } else {
            serde_json::from_value(body)?
        };
        Self::classify(status.code.unwrap_or(http_status), status)
    }

    fn classify(code: u16, status: StatusResult) -> Result<Self> {
        match code {
            200 | 201 | 204 => Ok(Operation::Succeeded(status)),
            202 => Ok(Operation::Running(status)),
            302 => Ok(Operation::Redirect(status)),
            other => Err(CoreError::ProtocolViolation(format!(
                "unexpected status code {} in operation result",
                other
            ))),
        }
    }
}

impl<T> Operation<T> {
    /// A failure that re-issuing the same idempotent query may clear (429, 5xx)
    pub fn is_transient_failure(&self) -> bool {
        matches!(self, Operation::Failed(error) if error.is_transient())
    }

    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Data(_) => "data",
            Operation::Succeeded(_) => "succeeded",
            Operation::Running(_) => "running",
            Operation::Redirect(_) => "redirect",
            Operation::Failed(_) => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provider;
    use serde_json::json;

    #[test]
    fn test_decode_data_envelope() {
        let op: Operation<Provider> = Operation::decode(
            200,
            json!({ "code": 200, "status": "Ok", "data": { "id": "azure.devops" } }),
        )
        .unwrap();

        match op {
            Operation::Data(result) => assert_eq!(result.data.id, "azure.devops"),
            other => panic!("expected data, got {}", other.kind()),
        }
    }

    #[test]
    fn test_decode_running_status() {
        let op: Operation<Value> = Operation::decode(
            202,
            json!({ "code": 202, "state": "Running", "_trackingId": "t-1" }),
        )
        .unwrap();

        assert!(matches!(op, Operation::Running(ref s) if s.tracking_id.as_deref() == Some("t-1")));
    }

    #[test]
    fn test_status_code_in_body_wins() {
        // Status endpoint answers HTTP 200 with a body that says "still running"
        let op: Operation<Value> =
            Operation::decode(200, json!({ "code": 202, "_trackingId": "t-1" })).unwrap();
        assert_eq!(op.kind(), "running");

        let op: Operation<Value> =
            Operation::decode(200, json!({ "code": 302, "location": "/api/users/u1" })).unwrap();
        assert_eq!(op.kind(), "redirect");

        let op: Operation<Value> =
            Operation::decode(200, json!({ "code": 200, "state": "Completed" })).unwrap();
        assert_eq!(op.kind(), "succeeded");
    }

    #[test]
    fn test_missing_body_code_falls_back_to_http_status() {
        let op: Operation<Value> = Operation::decode(302, json!({ "location": "/x/y" })).unwrap();
        assert_eq!(op.kind(), "redirect");
    }

    #[test]
    fn test_empty_success_body_is_terminal() {
        let op: Operation<Provider> = Operation::decode(204, Value::Null).unwrap();
        assert_eq!(op.kind(), "succeeded");

        let op: Operation<Provider> =
            Operation::decode(200, json!({ "code": 200, "data": null })).unwrap();
        assert_eq!(op.kind(), "succeeded");
    }

    #[test]
    fn test_decode_error_document() {
        let op: Operation<Value> = Operation::decode(
            404,
            json!({ "status": "NotFound", "errors": [{ "message": "gone" }] }),
        )
        .unwrap();

        match op {
            Operation::Failed(err) => {
                assert_eq!(err.code, Some(404));
                assert_eq!(err.first_message(), Some("gone"));
            }
            other => panic!("expected failure, got {}", other.kind()),
        }
    }

    #[test]
    fn test_decode_error_without_body() {
        let op: Operation<Value> = Operation::decode(500, Value::Null).unwrap();
        assert!(matches!(op, Operation::Failed(ref e) if e.code == Some(500)));
    }

    #[test]
    fn test_transient_failures() {
        let op: Operation<Value> = Operation::decode(503, Value::Null).unwrap();
        assert!(op.is_transient_failure());
        let op: Operation<Value> =
            Operation::decode(429, json!({ "status": "TooManyRequests" })).unwrap();
        assert!(op.is_transient_failure());

        let op: Operation<Value> = Operation::decode(404, Value::Null).unwrap();
        assert!(!op.is_transient_failure());
        let op: Operation<Value> = Operation::decode(202, json!({ "_trackingId": "t-1" })).unwrap();
        assert!(!op.is_transient_failure());
    }

    #[test]
    fn test_unknown_status_code_is_protocol_violation() {
        let err = Operation::<Value>::decode(200, json!({ "code": 418 })).unwrap_err();
        assert!(matches!(err, CoreError::ProtocolViolation(_)));
    }

    #[test]
    fn test_completion_accessors() {
        let done: Completion<Value> = Completion::Data(DataResult {
            code: Some(200),
            status: None,
            data: json!({ "id": "x" }),
            location: None,
        });
        assert_eq!(done.data(), Some(&json!({ "id": "x" })));
        assert!(!done.is_failed());

        let failed: Completion<Value> = Completion::Failed(ErrorResult::default());
        assert!(failed.is_failed());
        assert!(failed.data().is_none());
    }
}
