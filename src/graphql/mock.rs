//! In-memory transport for unit tests

use super::Transport;
use crate::catalog::OperationDocument;
use crate::error::Result;
use crate::types::JsonValue;
use async_trait::async_trait;
use std::sync::Mutex;

type Responder = Box<dyn Fn(&str, &JsonValue) -> Result<JsonValue> + Send + Sync>;

/// Transport that answers from a closure and records every call
pub(crate) struct MockTransport {
    responder: Responder,
    calls: Mutex<Vec<(String, JsonValue)>>,
}

impl MockTransport {
    /// Answer each call with `responder(operation_name, variables)`
    pub(crate) fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, &JsonValue) -> Result<JsonValue> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Operation names and variables of every call so far
    pub(crate) fn calls(&self) -> Vec<(String, JsonValue)> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls so far
    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(
        &self,
        operation: &OperationDocument,
        variables: JsonValue,
    ) -> Result<JsonValue> {
        self.calls
            .lock()
            .unwrap()
            .push((operation.name.clone(), variables.clone()));
        (self.responder)(&operation.name, &variables)
    }
}
