use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::frames::CapturedFrames;

/// One expected protocol event, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MessageSpec {
    /// Client-to-server request whose response is checked.
    Request(RequestSpec),
    /// Client-to-server notification.
    Notification(NotificationSpec),
    /// Server-to-client request the client waits for and answers.
    WaitForServerRequest(WaitForRequestSpec),
    /// Server-to-client notification the client waits for.
    WaitForServerNotification(WaitForNotificationSpec),
}

impl MessageSpec {
    pub fn method(&self) -> &str {
        match self {
            Self::Request(spec) => &spec.method,
            Self::Notification(spec) => &spec.method,
            Self::WaitForServerRequest(spec) => &spec.method,
            Self::WaitForServerNotification(spec) => &spec.method,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            Self::Request(spec) => spec.comment.as_deref(),
            Self::Notification(spec) => spec.comment.as_deref(),
            Self::WaitForServerRequest(spec) => spec.comment.as_deref(),
            Self::WaitForServerNotification(spec) => spec.comment.as_deref(),
        }
    }

    pub fn as_request(&self) -> Option<&RequestSpec> {
        match self {
            Self::Request(spec) => Some(spec),
            Self::Notification(_)
            | Self::WaitForServerRequest(_)
            | Self::WaitForServerNotification(_) => None,
        }
    }
}

fn default_wait() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSpec {
    pub method: CompactString,

    #[serde(default)]
    pub params: Value,

    /// Expected `result` of the response.
    #[serde(default)]
    pub result: Value,

    /// Emit a wait-for-response directive right after the request.
    #[serde(default = "default_wait", skip_serializing_if = "is_true")]
    pub wait: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Expected `powered_by` tag on the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub powered_by: Option<String>,

    /// Diagnostics only; never consulted when matching.
    #[serde(default, skip_serializing_if = "CapturedFrames::is_empty")]
    pub captured_frames: CapturedFrames,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSpec {
    pub method: CompactString,

    #[serde(default)]
    pub params: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitForRequestSpec {
    pub method: CompactString,

    #[serde(default)]
    pub params: Value,

    /// Result the client answers the server request with.
    #[serde(default)]
    pub result: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitForNotificationSpec {
    pub method: CompactString,

    #[serde(default)]
    pub params: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Optional knobs for [`LspTestSpec::request_with`](super::LspTestSpec::request_with).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub wait: bool,
    pub comment: Option<String>,
    pub powered_by: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            wait: true,
            comment: None,
            powered_by: None,
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send the request without blocking on its response.
    pub fn no_wait(mut self) -> Self {
        self.wait = false;
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn powered_by(mut self, powered_by: impl Into<String>) -> Self {
        self.powered_by = Some(powered_by.into());
        self
    }
}
