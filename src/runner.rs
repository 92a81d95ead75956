//! Command runner seam.
//!
//! A [`CommandProcessor`] owns all process and transport concerns: it sends
//! the compiled commands, honors the synthetic `$test/...` directives, and
//! hands back the full transcript once every directive was satisfied.

use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::{
    WAIT_FOR_NOTIFICATION_METHOD, WAIT_FOR_REQUEST_METHOD, WAIT_FOR_RESPONSE_METHOD,
};
use crate::error::{Result, TestSpecError};
use crate::transcript::{client_request_key, Transcript};

pub trait CommandProcessor {
    /// Execute `commands` in order and return the transcript.
    ///
    /// Must return `Err` if any wait directive could not be satisfied. The
    /// verifier relies on this: it does not re-check waited-for messages.
    fn communicate(&mut self, commands: &[Value]) -> Result<Transcript>;
}

impl<F> CommandProcessor for F
where
    F: FnMut(&[Value]) -> Result<Transcript>,
{
    fn communicate(&mut self, commands: &[Value]) -> Result<Transcript> {
        self(commands)
    }
}

/// Replays a recorded transcript instead of talking to a live server.
///
/// Wait directives are checked against the recording so that the runner
/// contract holds exactly as it would for a live run.
#[derive(Debug, Clone)]
pub struct ReplayProcessor {
    transcript: Transcript,
}

impl ReplayProcessor {
    pub fn new(transcript: Transcript) -> Self {
        Self { transcript }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    fn check_directive(&self, command: &Value) -> Result<()> {
        let method = command.get("method").and_then(Value::as_str);
        let params = command.get("params").unwrap_or(&Value::Null);

        let satisfied = match method {
            Some(WAIT_FOR_RESPONSE_METHOD) => {
                let key = params
                    .get("id")
                    .and_then(Value::as_i64)
                    .map(client_request_key);
                key.and_then(|key| self.transcript.get(&key))
                    .is_some_and(|entry| entry.received.is_some())
            }
            Some(WAIT_FOR_REQUEST_METHOD) => self.has_server_message(params, true),
            Some(WAIT_FOR_NOTIFICATION_METHOD) => self.has_server_message(params, false),
            _ => return Ok(()),
        };

        if satisfied {
            Ok(())
        } else {
            warn!(directive = %command, "Recorded transcript cannot satisfy wait directive");
            Err(TestSpecError::WaitNotSatisfied {
                directive: command.to_string(),
            })
        }
    }

    /// Any received message matching the directive's method and params, with
    /// or without an id depending on `expect_request`.
    fn has_server_message(&self, directive_params: &Value, expect_request: bool) -> bool {
        let method = directive_params.get("method");
        let params = directive_params.get("params").unwrap_or(&Value::Null);

        self.transcript.iter().any(|(_, entry)| {
            entry.received.as_ref().is_some_and(|received| {
                received.get("id").is_some() == expect_request
                    && received.get("method") == method
                    && received.get("params").unwrap_or(&Value::Null) == params
            })
        })
    }
}

impl CommandProcessor for ReplayProcessor {
    fn communicate(&mut self, commands: &[Value]) -> Result<Transcript> {
        for command in commands {
            self.check_directive(command)?;
        }
        debug!(
            commands = commands.len(),
            entries = self.transcript.len(),
            "Replayed recorded transcript"
        );
        Ok(self.transcript.clone())
    }
}
