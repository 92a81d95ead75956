//! Lowering of message specs into the wire commands a command runner executes.
//!
//! Every message gets the next id from a counter starting at 1, whether or
//! not its command uses one, so ids line up with declaration positions.

use rustc_hash::FxHashMap;
use serde_json::{json, Value};
use tracing::trace;

use crate::constants::{
    JSONRPC_VERSION, WAIT_FOR_NOTIFICATION_METHOD, WAIT_FOR_REQUEST_METHOD,
    WAIT_FOR_RESPONSE_METHOD,
};
use crate::error::Result;
use crate::interpolate::{interpolate, Variables};
use crate::spec::MessageSpec;

/// Correlation id assigned to a declared message.
pub type RequestId = i64;

/// Ids assigned during one compilation, keyed by message position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrelationMap {
    ids: Vec<RequestId>,
    positions: FxHashMap<RequestId, usize>,
}

impl CorrelationMap {
    fn assign(&mut self, position: usize, id: RequestId) {
        debug_assert_eq!(self.ids.len(), position);
        self.ids.push(id);
        self.positions.insert(id, position);
    }

    /// Id of the message at `position`.
    pub fn id_of(&self, position: usize) -> Option<RequestId> {
        self.ids.get(position).copied()
    }

    /// Position of the message that was assigned `id`.
    pub fn position_of(&self, id: RequestId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Ids in declaration order.
    pub fn ids(&self) -> &[RequestId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Output of [`compile`].
#[derive(Debug, Clone)]
pub struct CompiledSpec {
    pub commands: Vec<Value>,
    pub correlation: CorrelationMap,
}

pub fn compile(messages: &[MessageSpec], variables: &Variables) -> Result<CompiledSpec> {
    let mut commands = Vec::with_capacity(messages.len() * 2);
    let mut correlation = CorrelationMap::default();
    let mut current_id: RequestId = 0;

    for (position, message) in messages.iter().enumerate() {
        current_id += 1;
        correlation.assign(position, current_id);

        match message {
            MessageSpec::Request(request) => {
                commands.push(json!({
                    "jsonrpc": JSONRPC_VERSION,
                    "comment": request.comment,
                    "id": current_id,
                    "method": request.method,
                    "params": interpolate(&request.params, variables)?,
                }));
                if request.wait {
                    commands.push(wait_for_response(current_id));
                }
            }
            MessageSpec::Notification(notification) => {
                commands.push(json!({
                    "jsonrpc": JSONRPC_VERSION,
                    "comment": notification.comment,
                    "method": notification.method,
                    "params": interpolate(&notification.params, variables)?,
                }));
            }
            MessageSpec::WaitForServerRequest(wait) => {
                commands.push(json!({
                    "jsonrpc": JSONRPC_VERSION,
                    "comment": wait.comment,
                    "method": WAIT_FOR_REQUEST_METHOD,
                    "params": {
                        "method": wait.method,
                        "params": interpolate(&wait.params, variables)?,
                        "result": interpolate(&wait.result, variables)?,
                    },
                }));
            }
            MessageSpec::WaitForServerNotification(wait) => {
                commands.push(json!({
                    "jsonrpc": JSONRPC_VERSION,
                    "comment": wait.comment,
                    "method": WAIT_FOR_NOTIFICATION_METHOD,
                    "params": {
                        "method": wait.method,
                        "params": interpolate(&wait.params, variables)?,
                    },
                }));
            }
        }
        trace!(id = current_id, method = message.method(), "Assigned correlation id");
    }

    Ok(CompiledSpec {
        commands,
        correlation,
    })
}

fn wait_for_response(id: RequestId) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "method": WAIT_FOR_RESPONSE_METHOD,
        "params": {"id": id},
    })
}
