#![allow(dead_code)]

use lsp_testspec::config::ReportConfig;
use lsp_testspec::{client_request_key, LspTestSpec, TestSpecConfig, Transcript, TranscriptEntry};
use serde_json::{json, Value};

/// Entry for a client request with `id` and the response the server gave.
pub fn client_request(
    id: i64,
    method: &str,
    params: Value,
    response: Value,
) -> (String, TranscriptEntry) {
    (
        client_request_key(id),
        TranscriptEntry::new(
            Some(json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params})),
            Some(response),
        ),
    )
}

/// Response carrying `result`, as the server would send it.
pub fn response(id: i64, result: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "result": result})
}

pub fn server_notification(seq: usize, method: &str, params: Value) -> (String, TranscriptEntry) {
    (
        format!("_server_notification_{seq}"),
        TranscriptEntry::new(
            None,
            Some(json!({"jsonrpc": "2.0", "method": method, "params": params})),
        ),
    )
}

/// A server-initiated request; `answered` adds the client's reply as `sent`.
pub fn server_request(
    seq: usize,
    id: i64,
    method: &str,
    params: Value,
    answered: bool,
) -> (String, TranscriptEntry) {
    let sent = answered.then(|| json!({"jsonrpc": "2.0", "id": id, "result": null}));
    (
        format!("_server_request_{seq}"),
        TranscriptEntry::new(
            sent,
            Some(json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params})),
        ),
    )
}

pub fn transcript(entries: impl IntoIterator<Item = (String, TranscriptEntry)>) -> Transcript {
    entries.into_iter().collect()
}

/// Spec that sends `initialize` and expects empty capabilities.
pub fn initialize_spec(name: &str) -> LspTestSpec {
    LspTestSpec::new(name)
        .request(
            "initialize",
            json!({"rootUri": "file:///tmp/repo"}),
            json!({"capabilities": {}}),
        )
        .notification("initialized", json!({}))
}

/// Config without the raw-log trailer, so assertions see only the errors.
pub fn quiet_config() -> TestSpecConfig {
    TestSpecConfig {
        report: ReportConfig {
            raw_log_hint: false,
            ..ReportConfig::default()
        },
        ..TestSpecConfig::default()
    }
}

/// Same as [`quiet_config`] but never reads source files.
pub fn no_source_config() -> TestSpecConfig {
    let mut config = quiet_config();
    config.locator.enabled = false;
    config
}
