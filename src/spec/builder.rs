use std::collections::BTreeSet;
use std::path::Path;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::frames::{CapturedFrames, Frame};
use super::message::{
    MessageSpec, NotificationSpec, RequestOptions, RequestSpec, WaitForNotificationSpec,
    WaitForRequestSpec,
};
use crate::compiler::{self, CompiledSpec};
use crate::config::TestSpecConfig;
use crate::error::{Result, TestSpecError};
use crate::interpolate::Variables;
use crate::report::{self, SourceContext};
use crate::runner::CommandProcessor;
use crate::transcript::Transcript;
use crate::verifier::Verifier;

/// File holding the builder methods. Frames from this file are skipped when
/// looking for the test author's call site.
pub const ENGINE_FILE: &str = file!();

/// An LSP test, described declaratively.
///
/// Specs are plain values: every builder method leaves `self` untouched and
/// returns a new spec, so a shared setup spec (say, one that already sends
/// and checks `initialize`) can be extended by many tests independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LspTestSpec {
    name: String,

    #[serde(default)]
    messages: Vec<MessageSpec>,

    #[serde(default)]
    ignored_notification_methods: BTreeSet<CompactString>,
}

impl LspTestSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: Vec::new(),
            ignored_notification_methods: BTreeSet::new(),
        }
    }

    /// Load a spec stored as JSON. Requests loaded this way carry no call-site frames.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TestSpecError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| TestSpecError::json(path, e))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn messages(&self) -> &[MessageSpec] {
        &self.messages
    }

    pub fn ignored_notification_methods(&self) -> &BTreeSet<CompactString> {
        &self.ignored_notification_methods
    }

    /// Never flag incoming messages with this method as unexpected.
    pub fn ignore_notifications(&self, method: &str) -> Self {
        let mut spec = self.clone();
        spec.ignored_notification_methods.insert(method.into());
        spec
    }

    /// Send a request and expect `result` back.
    #[track_caller]
    pub fn request(&self, method: &str, params: Value, result: Value) -> Self {
        self.request_with(method, params, result, RequestOptions::default())
    }

    #[track_caller]
    pub fn request_with(
        &self,
        method: &str,
        params: Value,
        result: Value,
        options: RequestOptions,
    ) -> Self {
        let captured_frames = CapturedFrames::capture(Frame::new(ENGINE_FILE, line!(), column!()));

        self.append(MessageSpec::Request(RequestSpec {
            method: method.into(),
            params,
            result,
            wait: options.wait,
            comment: options.comment,
            powered_by: options.powered_by,
            captured_frames,
        }))
    }

    pub fn notification(&self, method: &str, params: Value) -> Self {
        self.append(MessageSpec::Notification(NotificationSpec {
            method: method.into(),
            params,
            comment: None,
        }))
    }

    pub fn notification_with_comment(&self, method: &str, params: Value, comment: &str) -> Self {
        self.append(MessageSpec::Notification(NotificationSpec {
            method: method.into(),
            params,
            comment: Some(comment.to_string()),
        }))
    }

    /// Wait for the server to send a matching request, and answer it with `result`.
    pub fn wait_for_server_request(&self, method: &str, params: Value, result: Value) -> Self {
        self.append(MessageSpec::WaitForServerRequest(WaitForRequestSpec {
            method: method.into(),
            params,
            result,
            comment: None,
        }))
    }

    pub fn wait_for_server_request_with_comment(
        &self,
        method: &str,
        params: Value,
        result: Value,
        comment: &str,
    ) -> Self {
        self.append(MessageSpec::WaitForServerRequest(WaitForRequestSpec {
            method: method.into(),
            params,
            result,
            comment: Some(comment.to_string()),
        }))
    }

    /// Wait for the server to send a matching notification.
    pub fn wait_for_server_notification(&self, method: &str, params: Value) -> Self {
        self.append(MessageSpec::WaitForServerNotification(
            WaitForNotificationSpec {
                method: method.into(),
                params,
                comment: None,
            },
        ))
    }

    pub fn wait_for_server_notification_with_comment(
        &self,
        method: &str,
        params: Value,
        comment: &str,
    ) -> Self {
        self.append(MessageSpec::WaitForServerNotification(
            WaitForNotificationSpec {
                method: method.into(),
                params,
                comment: Some(comment.to_string()),
            },
        ))
    }

    /// Turn this spec into wire commands for a command runner.
    pub fn compile(&self, variables: &Variables) -> Result<CompiledSpec> {
        compiler::compile(&self.messages, variables)
    }

    /// Run the test with default configuration.
    ///
    /// Returns the transcript and, if the test failed, a report describing
    /// every divergence. `Err` is reserved for broken runner contracts and
    /// failures inside the diagnostics path itself.
    pub fn run(
        &self,
        processor: &mut dyn CommandProcessor,
        variables: &Variables,
    ) -> Result<(Transcript, Option<String>)> {
        self.run_with_config(processor, variables, &TestSpecConfig::default())
    }

    pub fn run_with_config(
        &self,
        processor: &mut dyn CommandProcessor,
        variables: &Variables,
        config: &TestSpecConfig,
    ) -> Result<(Transcript, Option<String>)> {
        let compiled = self.compile(variables)?;
        debug!(
            test = %self.name,
            commands = compiled.commands.len(),
            "Compiled test spec"
        );

        let transcript = processor.communicate(&compiled.commands)?;
        let report = self.check(&transcript, &compiled, config)?;
        Ok((transcript, report))
    }

    /// Verify an already collected transcript against this spec.
    pub fn check(
        &self,
        transcript: &Transcript,
        compiled: &CompiledSpec,
        config: &TestSpecConfig,
    ) -> Result<Option<String>> {
        let context = SourceContext::from_config(&config.locator);
        let errors = Verifier::new(self, transcript, &compiled.correlation, &context)?
            .ignoring(&config.verify.ignored_notifications)
            .errors()
            .collect::<Result<Vec<_>>>()
            .inspect_err(TestSpecError::log_warn)?;

        if errors.is_empty() {
            debug!(test = %self.name, "Test spec passed");
            return Ok(None);
        }

        info!(test = %self.name, errors = errors.len(), "Test spec failed");
        Ok(Some(report::failure_report(&self.name, &errors, &config.report)))
    }

    fn append(&self, message: MessageSpec) -> Self {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        messages.extend_from_slice(&self.messages);
        messages.push(message);
        Self {
            name: self.name.clone(),
            messages,
            ignored_notification_methods: self.ignored_notification_methods.clone(),
        }
    }
}
