//! Copy-pasteable builder snippets suggested in failure reports.

use serde_json::{json, Map, Value};

use super::diff::pretty_format;
use crate::constants::{FILL_IN_MARKER, POWERED_BY_FIELD, SNIPPET_INDENT};
use crate::spec::RequestSpec;

const BUGGY_SERVER: &str = "\
1) If this was unexpected, then the language server is buggy and should be
fixed.";

/// `json!(...)` literal for `value`, with continuation lines indented by `indent`.
pub fn json_literal(value: &Value, indent: &str) -> String {
    let pretty = pretty_format(value);
    let mut out = String::from("json!(");
    for (i, line) in pretty.lines().enumerate() {
        if i > 0 {
            out.push('\n');
            out.push_str(indent);
        }
        out.push_str(line);
    }
    out.push(')');
    out
}

/// Rust string literal for `text`.
fn str_literal(text: &str) -> String {
    format!("{text:?}")
}

/// Builder call that would make `request` match `actual_response`.
///
/// Options are spelled out only when they differ from the defaults.
pub fn request_snippet(request: &RequestSpec, actual_response: &Value) -> String {
    let result = actual_response.get("result").unwrap_or(&Value::Null);
    let powered_by = actual_response
        .get(POWERED_BY_FIELD)
        .and_then(Value::as_str);

    let arg_indent = SNIPPET_INDENT.repeat(2);
    let mut options = Vec::new();
    if let Some(comment) = &request.comment {
        options.push(format!(".comment({})", str_literal(comment)));
    }
    if !request.wait {
        options.push(".no_wait()".to_string());
    }
    if let Some(powered_by) = powered_by {
        options.push(format!(".powered_by({})", str_literal(powered_by)));
    }

    let builder = if options.is_empty() {
        "request"
    } else {
        "request_with"
    };

    let mut snippet = format!("{SNIPPET_INDENT}.{builder}(\n");
    snippet.push_str(&format!("{arg_indent}{},\n", str_literal(&request.method)));
    snippet.push_str(&format!(
        "{arg_indent}{},\n",
        json_literal(&request.params, &arg_indent)
    ));
    snippet.push_str(&format!("{arg_indent}{},\n", json_literal(result, &arg_indent)));
    if !options.is_empty() {
        snippet.push_str(&format!(
            "{arg_indent}RequestOptions::new(){},\n",
            options.concat()
        ));
    }
    snippet.push_str(SNIPPET_INDENT);
    snippet.push(')');
    snippet
}

pub fn for_response(request: &RequestSpec, actual_response: &Value) -> String {
    format!(
        "{BUGGY_SERVER}

2) If this was expected, you can update your request with the following code to
make it match:

{}
",
        request_snippet(request, actual_response)
    )
}

pub fn for_unexpected_request(method: &str, params: &Value) -> String {
    let arg_indent = SNIPPET_INDENT.repeat(2);
    let mut placeholder = Map::new();
    placeholder.insert(FILL_IN_MARKER.to_string(), json!("fill in request data here"));
    let placeholder = Value::Object(placeholder);
    format!(
        "{BUGGY_SERVER}

2) To handle this request, add this directive to your test to wait for it and
respond to it before proceeding:

{SNIPPET_INDENT}.wait_for_server_request(
{arg_indent}{method},
{arg_indent}{params},
{arg_indent}{result},
{SNIPPET_INDENT})
",
        method = str_literal(method),
        params = json_literal(params, &arg_indent),
        result = json_literal(&placeholder, &arg_indent),
    )
}

pub fn for_unexpected_notification(method: &str, params: &Value) -> String {
    let arg_indent = SNIPPET_INDENT.repeat(2);
    let quoted = str_literal(method);
    format!(
        "{BUGGY_SERVER}

2) If all notifications of type {quoted} should be ignored, add this directive
anywhere in your test:

{SNIPPET_INDENT}.ignore_notifications({quoted})

3) If this single instance of the notification was expected, add this directive
to your test to wait for it before proceeding:

{SNIPPET_INDENT}.wait_for_server_notification(
{arg_indent}{quoted},
{arg_indent}{params},
{SNIPPET_INDENT})
",
        params = json_literal(params, &arg_indent),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::CapturedFrames;

    fn request(wait: bool, comment: Option<&str>) -> RequestSpec {
        RequestSpec {
            method: "textDocument/hover".into(),
            params: json!({"position": {"line": 3, "character": 10}}),
            result: Value::Null,
            wait,
            comment: comment.map(str::to_string),
            powered_by: None,
            captured_frames: CapturedFrames::default(),
        }
    }

    #[test]
    fn json_literal_indents_continuation_lines() {
        assert_eq!(json_literal(&json!(null), "  "), "json!(null)");
        assert_eq!(
            json_literal(&json!({"a": 1}), "  "),
            "json!({\n    \"a\": 1\n  })"
        );
    }

    #[test]
    fn default_options_use_plain_request() {
        let snippet =
            request_snippet(&request(true, None), &json!({"result": {"contents": "int"}}));
        assert!(snippet.starts_with("    .request(\n"));
        assert!(snippet.contains("\"textDocument/hover\",\n"));
        assert!(snippet.contains("\"contents\": \"int\""));
        assert!(!snippet.contains("RequestOptions"));
        assert!(snippet.ends_with("    )"));
    }

    #[test]
    fn non_default_options_are_spelled_out() {
        let snippet = request_snippet(
            &request(false, Some("hover over \"x\"")),
            &json!({"result": null, "powered_by": "serverless_ide"}),
        );
        assert!(snippet.starts_with("    .request_with(\n"));
        assert!(snippet.contains(
            "RequestOptions::new().comment(\"hover over \\\"x\\\"\").no_wait().powered_by(\"serverless_ide\"),"
        ));
    }

    #[test]
    fn unexpected_request_suggests_wait_directive() {
        let text = for_unexpected_request(
            "window/showMessageRequest",
            &json!({"type": 1, "message": "restart?"}),
        );
        assert!(text.contains(
            ".wait_for_server_request(\n        \"window/showMessageRequest\",\n"
        ));
        assert!(text.contains("\"message\": \"restart?\""));
        assert!(text.contains("\"@nocommit\": \"fill in request data here\""));
    }

    #[test]
    fn unexpected_notification_offers_ignore_and_wait() {
        let text = for_unexpected_notification("window/logMessage", &json!({"type": 3}));
        assert!(text.contains(".ignore_notifications(\"window/logMessage\")"));
        assert!(text.contains(".wait_for_server_notification(\n        \"window/logMessage\",\n"));
    }
}
