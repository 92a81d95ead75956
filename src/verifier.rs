//! Matching of a spec against the transcript of its run.
//!
//! Requests are checked in declaration order, then every transcript entry
//! that no spec or ignore rule accounted for is reported, in wire order.
//! Notifications and wait directives are not re-checked here: the command
//! runner fails the run if a waited-for message never arrived.

use rustc_hash::FxHashSet;
use serde_json::Value;
use tracing::debug;

use crate::compiler::{CorrelationMap, RequestId};
use crate::constants::POWERED_BY_FIELD;
use crate::error::{Result, TestSpecError};
use crate::report::{ErrorRecord, SourceContext};
use crate::spec::{LspTestSpec, MessageSpec, RequestSpec};
use crate::transcript::{client_request_key, is_request, Transcript, TranscriptEntry};

const NO_PREVIOUS_REQUEST: &str = "<no previous request was found>";

#[derive(Clone, Copy)]
pub struct Verifier<'a> {
    spec: &'a LspTestSpec,
    transcript: &'a Transcript,
    correlation: &'a CorrelationMap,
    context: &'a SourceContext,
    extra_ignored: &'a [String],
}

impl<'a> Verifier<'a> {
    /// Fails if `correlation` was not compiled from `spec`.
    pub fn new(
        spec: &'a LspTestSpec,
        transcript: &'a Transcript,
        correlation: &'a CorrelationMap,
        context: &'a SourceContext,
    ) -> Result<Self> {
        let messages = spec.messages().len();
        if correlation.len() != messages {
            return Err(TestSpecError::CorrelationMismatch {
                messages,
                ids: correlation.len(),
            });
        }

        Ok(Self {
            spec,
            transcript,
            correlation,
            context,
            extra_ignored: &[],
        })
    }

    /// Also ignore these methods, in addition to the spec's own list.
    pub fn ignoring(mut self, methods: &'a [String]) -> Self {
        self.extra_ignored = methods;
        self
    }

    /// Every divergence, produced lazily. An `Err` item is fatal and ends the run.
    pub fn errors(self) -> impl Iterator<Item = Result<ErrorRecord>> + 'a {
        let handled = self.handled_keys();
        debug!(
            entries = self.transcript.len(),
            handled = handled.len(),
            "Verifying transcript"
        );

        let mismatches = self
            .spec
            .messages()
            .iter()
            .zip(self.correlation.ids())
            .filter_map(move |(message, &id)| self.check_message(message, id).transpose());

        let unexpected = self
            .transcript
            .iter()
            .filter(move |(key, _)| !handled.contains(key.as_str()))
            .filter_map(move |(key, entry)| self.check_unhandled(key, entry).transpose());

        mismatches.chain(unexpected)
    }

    /// Keys of entries accounted for by request specs or ignore rules.
    fn handled_keys(&self) -> FxHashSet<String> {
        let mut handled: FxHashSet<String> = self
            .spec
            .messages()
            .iter()
            .zip(self.correlation.ids())
            .filter_map(|(message, &id)| match message {
                MessageSpec::Request(_) => Some(client_request_key(id)),
                MessageSpec::Notification(_)
                | MessageSpec::WaitForServerRequest(_)
                | MessageSpec::WaitForServerNotification(_) => None,
            })
            .collect();

        handled.extend(
            self.transcript
                .iter()
                .filter(|(_, entry)| entry.received_method().is_some_and(|m| self.is_ignored(m)))
                .map(|(key, _)| key.clone()),
        );
        handled
    }

    fn is_ignored(&self, method: &str) -> bool {
        self.spec.ignored_notification_methods().contains(method)
            || self.extra_ignored.iter().any(|ignored| ignored == method)
    }

    fn check_message(&self, message: &MessageSpec, id: RequestId) -> Result<Option<ErrorRecord>> {
        match message {
            MessageSpec::Request(request) => {
                let key = client_request_key(id);
                let entry = self
                    .transcript
                    .get(&key)
                    .ok_or(TestSpecError::MissingTranscriptEntry { id, key })?;
                self.check_request(id, request, entry)
            }
            // Sent without expecting a reply.
            MessageSpec::Notification(_) => Ok(None),
            // Already enforced by the command runner.
            MessageSpec::WaitForServerRequest(_) | MessageSpec::WaitForServerNotification(_) => {
                Ok(None)
            }
        }
    }

    /// At most one record per request; a result mismatch hides a `powered_by` mismatch.
    fn check_request(
        &self,
        id: RequestId,
        request: &RequestSpec,
        entry: &TranscriptEntry,
    ) -> Result<Option<ErrorRecord>> {
        let empty = Value::Object(Default::default());
        let received = entry.received.as_ref().unwrap_or(&empty);
        let actual_result = received.get("result").unwrap_or(&Value::Null);
        let actual_powered_by = received.get(POWERED_BY_FIELD).and_then(Value::as_str);

        if actual_result != &request.result {
            let context = self.context.render(&request.captured_frames)?;
            return Ok(Some(ErrorRecord::incorrect_result(id, request, received, &context)));
        }
        if actual_powered_by != request.powered_by.as_deref() {
            let context = self.context.render(&request.captured_frames)?;
            return Ok(Some(ErrorRecord::incorrect_powered_by(
                id, request, received, &context,
            )));
        }
        Ok(None)
    }

    fn check_unhandled(&self, key: &str, entry: &TranscriptEntry) -> Result<Option<ErrorRecord>> {
        let Some(received) = &entry.received else {
            return Ok(None);
        };
        // A server request we already answered.
        if entry.sent.is_some() {
            return Ok(None);
        }

        let request_context = match self.previous_request(key)? {
            Some(request) => self.context.render(&request.captured_frames)?,
            None => NO_PREVIOUS_REQUEST.to_string(),
        };

        let record = if received.get("id").is_some() {
            ErrorRecord::unexpected_request(received, &request_context)
        } else {
            ErrorRecord::unexpected_notification(received, &request_context)
        };
        Ok(Some(record))
    }

    /// The client request sent most recently before `key`, scanning backward.
    fn previous_request(&self, key: &str) -> Result<Option<&'a RequestSpec>> {
        let previous_id = self
            .transcript
            .entries_before(key)
            .filter_map(|(_, entry)| entry.sent.as_ref())
            .filter(|sent| is_request(sent))
            .find_map(|sent| sent.get("id").and_then(Value::as_i64));

        // Requests the runner issued on its own have no spec.
        let Some(position) = previous_id.and_then(|id| self.correlation.position_of(id)) else {
            return Ok(None);
        };

        let id = self.correlation.ids()[position];
        match self.spec.messages().get(position) {
            Some(MessageSpec::Request(request)) => Ok(Some(request)),
            Some(
                MessageSpec::Notification(_)
                | MessageSpec::WaitForServerRequest(_)
                | MessageSpec::WaitForServerNotification(_),
            ) => Err(TestSpecError::NotARequest { id }),
            None => Err(TestSpecError::CorrelationMismatch {
                messages: self.spec.messages().len(),
                ids: self.correlation.len(),
            }),
        }
    }
}
