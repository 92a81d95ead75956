//! Diagnostic formatting: error records, payload diffs, source listings and
//! remediation snippets, assembled into the final failure report.
//!
//! Everything here is pure apart from the single source read done by
//! [`SourceContext`] when a request's call site has to be shown.

pub mod context;
pub mod diff;
pub mod remediation;

use std::fmt;

use serde_json::Value;

pub use context::SourceContext;
pub use diff::{pretty_format, pretty_print_diff};

use crate::compiler::RequestId;
use crate::config::ReportConfig;
use crate::constants::POWERED_BY_FIELD;
use crate::spec::RequestSpec;

/// One divergence between spec and transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub description: String,
    pub context: String,
    pub remediation: String,
}

impl ErrorRecord {
    /// The response to `request` carried a different `result`.
    pub fn incorrect_result(
        id: RequestId,
        request: &RequestSpec,
        actual_response: &Value,
        request_context: &str,
    ) -> Self {
        let actual_result = actual_response.get("result").unwrap_or(&Value::Null);
        let diff = pretty_print_diff(actual_result, &request.result);
        Self {
            description: format!(
                "{} got an incorrect result:\n\n{diff}",
                request_description(id, request)
            ),
            context: associated_request(request_context),
            remediation: remediation::for_response(request, actual_response),
        }
    }

    /// The response to `request` carried a different `powered_by` tag.
    pub fn incorrect_powered_by(
        id: RequestId,
        request: &RequestSpec,
        actual_response: &Value,
        request_context: &str,
    ) -> Self {
        let actual = actual_response.get(POWERED_BY_FIELD).and_then(Value::as_str);
        Self {
            description: format!(
                "{} had an incorrect value for the `{POWERED_BY_FIELD}` field\n\
                 (expected {:?}; got {:?})\n",
                request_description(id, request),
                request.powered_by.as_deref(),
                actual,
            ),
            context: associated_request(request_context),
            remediation: remediation::for_response(request, actual_response),
        }
    }

    /// The server sent a request no spec waited for.
    pub fn unexpected_request(received: &Value, previous_request_context: &str) -> Self {
        let (method, params) = method_and_params(received);
        Self {
            description: format!(
                "An unexpected request of type {method:?} was sent by the language server.\n\
                 Here is the request payload:\n\n{}\n",
                pretty_print_snippet(received)
            ),
            context: previous_request(previous_request_context),
            remediation: remediation::for_unexpected_request(method, params),
        }
    }

    /// The server sent a notification that was neither waited for nor ignored.
    pub fn unexpected_notification(received: &Value, previous_request_context: &str) -> Self {
        let (method, params) = method_and_params(received);
        Self {
            description: format!(
                "An unexpected notification of type {method:?} was sent by the language server.\n\
                 Here is the notification payload:\n\n{}\n",
                pretty_print_snippet(received)
            ),
            context: previous_request(previous_request_context),
            remediation: remediation::for_unexpected_notification(method, params),
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Description: {}", self.description)?;
        writeln!(f, "Context:\n{}", self.context)?;
        write!(f, "Remediation:\n{}", self.remediation)
    }
}

fn method_and_params(received: &Value) -> (&str, &Value) {
    let method = received
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or("<unknown>");
    let params = received.get("params").unwrap_or(&Value::Null);
    (method, params)
}

pub fn request_description(id: RequestId, request: &RequestSpec) -> String {
    match &request.comment {
        Some(comment) => format!(
            "Request {:?} with ID {id} (comment: {comment:?})",
            request.method.as_str()
        ),
        None => format!("Request {:?} with ID {id}", request.method.as_str()),
    }
}

fn associated_request(request_context: &str) -> String {
    format!("This was the associated request:\n\n{request_context}")
}

fn previous_request(request_context: &str) -> String {
    format!(
        "This was the most recent request issued from the language client before it\n\
         received the notification:\n\n{request_context}"
    )
}

/// Pretty JSON indented by two spaces.
pub fn pretty_print_snippet(value: &Value) -> String {
    pretty_format(value)
        .lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Aggregate report for a failed test.
pub fn failure_report(test_name: &str, errors: &[ErrorRecord], config: &ReportConfig) -> String {
    let total = errors.len();
    let mut out = format!("Test case {test_name} failed with {total} errors:\n\n");
    for (i, error) in errors.iter().enumerate() {
        out.push_str(&format!("Error {}/{total}:\n{error}\n", i + 1));
    }
    if config.raw_log_hint {
        out.push_str(&config.log_hint);
    }
    out
}
