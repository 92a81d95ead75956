mod common;

use common::{
    client_request, initialize_spec, no_source_config, quiet_config, response, server_notification,
    server_request, transcript,
};
use lsp_testspec::report::SourceContext;
use lsp_testspec::{
    ErrorRecord, LspTestSpec, RequestOptions, TestSpecConfig, TestSpecError, Transcript,
    TranscriptEntry, Variables, Verifier,
};
use serde_json::json;

fn verify(spec: &LspTestSpec, transcript: &Transcript) -> Vec<ErrorRecord> {
    verify_with(spec, transcript, &no_source_config())
}

fn verify_with(
    spec: &LspTestSpec,
    transcript: &Transcript,
    config: &TestSpecConfig,
) -> Vec<ErrorRecord> {
    let compiled = spec.compile(&Variables::new()).unwrap();
    let context = SourceContext::from_config(&config.locator);
    Verifier::new(spec, transcript, &compiled.correlation, &context)
        .unwrap()
        .ignoring(&config.verify.ignored_notifications)
        .errors()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn initialize_ok() -> Transcript {
    transcript([client_request(
        1,
        "initialize",
        json!({"rootUri": "file:///tmp/repo"}),
        response(1, json!({"capabilities": {}})),
    )])
}

#[test]
fn test_matching_transcript_has_no_errors() {
    let errors = verify(&initialize_spec("ok"), &initialize_ok());
    assert!(errors.is_empty(), "{errors:#?}");
}

#[test]
fn test_result_mismatch_yields_one_error() {
    let recorded = transcript([client_request(
        1,
        "initialize",
        json!({}),
        response(1, json!({"capabilities": {"hoverProvider": true}})),
    )]);

    let errors = verify(&initialize_spec("mismatch"), &recorded);
    assert_eq!(errors.len(), 1);
    let error = &errors[0];
    assert!(error.description.contains("Request \"initialize\" with ID 1 got an incorrect result"));
    assert!(error.description.contains("(+ is expected lines, - is actual lines)"));
    assert!(error.description.contains("-     \"hoverProvider\": true"));
    assert!(error.remediation.contains("    .request(\n        \"initialize\",\n"));
    assert!(error.remediation.contains("\"hoverProvider\": true"));
}

#[test]
fn test_powered_by_mismatch() {
    let spec = LspTestSpec::new("powered by").request_with(
        "textDocument/hover",
        json!({}),
        json!({"contents": "int"}),
        RequestOptions::new().powered_by("serverless_ide"),
    );
    let recorded = transcript([client_request(
        1,
        "textDocument/hover",
        json!({}),
        json!({"id": 1, "result": {"contents": "int"}, "powered_by": "hh_server"}),
    )]);

    let errors = verify(&spec, &recorded);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].description.contains("incorrect value for the `powered_by` field"));
    assert!(errors[0].remediation.contains(".powered_by(\"hh_server\")"));
}

#[test]
fn test_result_mismatch_takes_priority_over_powered_by() {
    let spec = LspTestSpec::new("both").request_with(
        "textDocument/hover",
        json!({}),
        json!({"contents": "int"}),
        RequestOptions::new().powered_by("serverless_ide"),
    );
    let recorded = transcript([client_request(
        1,
        "textDocument/hover",
        json!({}),
        json!({"id": 1, "result": {"contents": "string"}, "powered_by": "hh_server"}),
    )]);

    let errors = verify(&spec, &recorded);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].description.contains("got an incorrect result"));
    assert!(!errors[0].description.contains("powered_by"));
}

#[test]
fn test_matching_powered_by_passes() {
    let spec = LspTestSpec::new("powered by ok").request_with(
        "textDocument/hover",
        json!({}),
        json!(null),
        RequestOptions::new().powered_by("serverless_ide"),
    );
    let recorded = transcript([client_request(
        1,
        "textDocument/hover",
        json!({}),
        json!({"id": 1, "result": null, "powered_by": "serverless_ide"}),
    )]);
    assert!(verify(&spec, &recorded).is_empty());
}

#[test]
fn test_every_mismatch_is_reported() {
    let spec = LspTestSpec::new("many")
        .request("a", json!({}), json!(1))
        .request("b", json!({}), json!(2));
    let recorded = transcript([
        client_request(1, "a", json!({}), response(1, json!(10))),
        client_request(2, "b", json!({}), response(2, json!(20))),
    ]);

    let errors = verify(&spec, &recorded);
    assert_eq!(errors.len(), 2);
    assert!(errors[0].description.contains("ID 1"));
    assert!(errors[1].description.contains("ID 2"));
}

#[test]
fn test_ignored_notifications_are_never_flagged() {
    let mut entries = vec![server_notification(0, "window/logMessage", json!({"message": "hi"}))];
    entries.extend(initialize_ok());
    entries.push(server_notification(1, "window/logMessage", json!({"message": "bye"})));
    let recorded = transcript(entries);

    let spec = initialize_spec("ignored").ignore_notifications("window/logMessage");
    assert!(verify(&spec, &recorded).is_empty());

    let errors = verify(&initialize_spec("not ignored"), &recorded);
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_configured_ignores_apply_to_every_spec() {
    let mut entries: Vec<_> = initialize_ok().into_iter().collect();
    entries.push(server_notification(0, "telemetry/event", json!({})));
    let recorded = transcript(entries);

    let mut config = no_source_config();
    config.verify.ignored_notifications = vec!["telemetry/event".to_string()];
    assert!(verify_with(&initialize_spec("configured"), &recorded, &config).is_empty());
}

#[test]
fn test_unexpected_notification() {
    let mut entries: Vec<_> = initialize_ok().into_iter().collect();
    entries.push(server_notification(
        0,
        "textDocument/publishDiagnostics",
        json!({"uri": "file:///a.php", "diagnostics": []}),
    ));

    let errors = verify(&initialize_spec("unexpected notification"), &transcript(entries));
    assert_eq!(errors.len(), 1);
    let error = &errors[0];
    assert!(error
        .description
        .contains("An unexpected notification of type \"textDocument/publishDiagnostics\""));
    assert!(error
        .remediation
        .contains(".ignore_notifications(\"textDocument/publishDiagnostics\")"));
    assert!(error.remediation.contains(".wait_for_server_notification("));
    assert!(error.context.contains("most recent request"));
    assert!(error.context.ends_with("<source context disabled>"));
}

#[test]
fn test_unexpected_request_suggests_wait_for_server_request() {
    let mut entries: Vec<_> = initialize_ok().into_iter().collect();
    entries.push(server_request(
        0,
        0,
        "window/showMessageRequest",
        json!({"type": 1, "message": "Restart?"}),
        false,
    ));

    let errors = verify(&initialize_spec("unexpected request"), &transcript(entries));
    assert_eq!(errors.len(), 1);
    let error = &errors[0];
    assert!(error
        .description
        .contains("An unexpected request of type \"window/showMessageRequest\""));
    assert!(error.remediation.contains(
        ".wait_for_server_request(\n        \"window/showMessageRequest\",\n        json!({\n"
    ));
    assert!(error.remediation.contains("\"message\": \"Restart?\""));
}

#[test]
fn test_answered_server_requests_are_not_flagged() {
    let mut entries: Vec<_> = initialize_ok().into_iter().collect();
    entries.push(server_request(0, 0, "client/registerCapability", json!({}), true));

    let spec = initialize_spec("answered").wait_for_server_request(
        "client/registerCapability",
        json!({}),
        json!(null),
    );
    assert!(verify(&spec, &transcript(entries)).is_empty());
}

#[test]
fn test_no_previous_request() {
    let recorded = transcript([server_notification(0, "window/logMessage", json!({}))]);
    let errors = verify(&LspTestSpec::new("empty"), &recorded);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].context.ends_with("<no previous request was found>"));
}

#[test]
fn test_missing_transcript_entry_is_fatal() {
    let spec = initialize_spec("missing");
    let compiled = spec.compile(&Variables::new()).unwrap();
    let context = SourceContext::default();

    let recorded = Transcript::new();
    let result: Result<Vec<_>, _> =
        Verifier::new(&spec, &recorded, &compiled.correlation, &context)
            .unwrap()
            .errors()
            .collect();
    match result {
        Err(TestSpecError::MissingTranscriptEntry { id, key }) => {
            assert_eq!(id, 1);
            assert_eq!(key, "_client_request_1");
        }
        other => panic!("expected a missing-entry error, got {other:?}"),
    }
}

#[test]
fn test_report_shows_source_of_previous_request() {
    let spec = LspTestSpec::new("context").request("textDocument/definition", json!({}), json!([]));
    let recorded = transcript([
        client_request(1, "textDocument/definition", json!({}), response(1, json!([]))),
        server_notification(0, "window/logMessage", json!({"message": "done"})),
    ]);

    let errors = verify_with(&spec, &recorded, &quiet_config());
    assert_eq!(errors.len(), 1);
    let context = &errors[0].context;
    assert!(context.contains("tests/verify_test.rs"), "{context}");
    assert!(context.contains("\u{2502}"), "{context}");
    assert!(context.contains("textDocument/definition"), "{context}");
}

fn hover_then_definition() -> LspTestSpec {
    let hover = LspTestSpec::new("two").request("textDocument/hover", json!({}), json!(null));
    hover.request("textDocument/definition", json!({}), json!([]))
}

#[test]
fn test_context_names_the_most_recent_request() {
    let recorded = transcript([
        client_request(1, "textDocument/hover", json!({}), response(1, json!(null))),
        client_request(2, "textDocument/definition", json!({}), response(2, json!([]))),
        server_notification(0, "window/logMessage", json!({})),
    ]);

    let errors = verify_with(&hover_then_definition(), &recorded, &quiet_config());
    assert_eq!(errors.len(), 1);
    let context = &errors[0].context;
    assert!(context.contains("textDocument/definition"), "{context}");
    assert!(!context.contains("textDocument/hover"), "{context}");
}

#[test]
fn test_context_ignores_requests_sent_later() {
    let recorded = transcript([
        client_request(1, "textDocument/hover", json!({}), response(1, json!(null))),
        server_notification(0, "window/logMessage", json!({})),
        client_request(2, "textDocument/definition", json!({}), response(2, json!([]))),
    ]);

    let errors = verify_with(&hover_then_definition(), &recorded, &quiet_config());
    assert_eq!(errors.len(), 1);
    let context = &errors[0].context;
    assert!(context.contains("textDocument/hover"), "{context}");
    assert!(!context.contains("textDocument/definition"), "{context}");
}

#[test]
fn test_prior_id_of_a_notification_is_fatal() {
    let spec = LspTestSpec::new("not a request")
        .notification("initialized", json!({}))
        .request("shutdown", json!(null), json!(null));
    let stray = TranscriptEntry::new(
        Some(json!({"jsonrpc": "2.0", "id": 1, "method": "initialized", "params": {}})),
        Some(response(1, json!(null))),
    );
    let recorded = transcript([
        client_request(2, "shutdown", json!(null), response(2, json!(null))),
        ("_client_request_1".to_string(), stray),
        server_notification(0, "window/logMessage", json!({})),
    ]);

    let compiled = spec.compile(&Variables::new()).unwrap();
    let context = SourceContext::from_config(&no_source_config().locator);
    let result: Result<Vec<_>, _> =
        Verifier::new(&spec, &recorded, &compiled.correlation, &context)
            .unwrap()
            .errors()
            .collect();
    assert!(matches!(result, Err(TestSpecError::NotARequest { id: 1 })), "{result:?}");
}

#[test]
fn test_compilation_of_another_spec_is_rejected() {
    let spec = LspTestSpec::new("one").request("shutdown", json!(null), json!(null));
    let other = initialize_spec("other").request("shutdown", json!(null), json!(null));
    let compiled = other.compile(&Variables::new()).unwrap();
    let recorded = transcript([
        client_request(3, "shutdown", json!(null), response(3, json!(null))),
        server_notification(0, "window/logMessage", json!({})),
    ]);

    let err = spec.check(&recorded, &compiled, &no_source_config()).unwrap_err();
    match err {
        TestSpecError::CorrelationMismatch { messages, ids } => {
            assert_eq!((messages, ids), (1, 3));
        }
        err => panic!("unexpected error: {err}"),
    }
}
