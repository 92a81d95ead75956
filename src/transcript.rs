//! Ordered record of one protocol conversation.
//!
//! Entries are kept in the order their messages crossed the wire. A client
//! request and its response share one entry under [`client_request_key`];
//! every message the server initiates gets an entry of its own.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::compiler::RequestId;
use crate::constants::CLIENT_REQUEST_KEY_PREFIX;
use crate::error::{Result, TestSpecError};

/// Transcript key of the entry for the client request with `id`.
pub fn client_request_key(id: RequestId) -> String {
    format!("{CLIENT_REQUEST_KEY_PREFIX}{id}")
}

/// A JSON-RPC message is a request when it carries both an id and a method.
pub fn is_request(message: &Value) -> bool {
    message.get("id").is_some() && message.get("method").is_some()
}

/// What was sent and what was received for one correlation key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    #[serde(default)]
    pub sent: Option<Value>,

    #[serde(default)]
    pub received: Option<Value>,
}

impl TranscriptEntry {
    pub fn new(sent: Option<Value>, received: Option<Value>) -> Self {
        Self { sent, received }
    }

    /// Method of the received message, if it has one.
    pub fn received_method(&self) -> Option<&str> {
        self.received
            .as_ref()
            .and_then(|received| received.get("method"))
            .and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    entries: IndexMap<String, TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TestSpecError::io(path, e))?;
        Self::from_json_str(&content).map_err(|e| TestSpecError::json(path, e))
    }

    /// Insert or replace an entry. A new key goes to the end; a replaced key keeps its place.
    pub fn insert(&mut self, key: impl Into<String>, entry: TranscriptEntry) {
        self.entries.insert(key.into(), entry);
    }

    pub fn get(&self, key: &str) -> Option<&TranscriptEntry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, TranscriptEntry> {
        self.entries.iter()
    }

    /// Entries recorded before `key`, most recent first. Empty if `key` is absent.
    pub fn entries_before<'a>(
        &'a self,
        key: &str,
    ) -> impl Iterator<Item = (&'a String, &'a TranscriptEntry)> + 'a {
        let end = self.entries.get_index_of(key).unwrap_or(0);
        self.entries.iter().take(end).rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = (&'a String, &'a TranscriptEntry);
    type IntoIter = indexmap::map::Iter<'a, String, TranscriptEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Transcript {
    type Item = (String, TranscriptEntry);
    type IntoIter = indexmap::map::IntoIter<String, TranscriptEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, TranscriptEntry)> for Transcript {
    fn from_iter<I: IntoIterator<Item = (String, TranscriptEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
