//! Recording in-memory backend for tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{AuthToken, ClientError, ContentBackend, FormPayload};
use crate::models::ResourceKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    List,
    Create,
    Update,
    Delete,
    CreatePage,
    UpdatePage,
}

/// One backend call as observed by the double
#[derive(Debug, Clone)]
pub struct Call {
    pub op: Op,
    pub kind: ResourceKind,
    pub form: Option<FormPayload>,
    pub id: Option<i64>,
    pub body: Option<Value>,
}

/// Request lifecycle markers, in the order they happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Started(usize),
    Finished(usize),
}

#[derive(Default)]
pub struct RecordingBackend {
    lists: Mutex<HashMap<ResourceKind, Vec<Value>>>,
    list_failures: Mutex<HashMap<ResourceKind, ClientError>>,
    nth_list_failures: Mutex<HashMap<(ResourceKind, usize), ClientError>>,
    write_failures: Mutex<HashMap<usize, ClientError>>,
    created_page: Mutex<Option<Value>>,
    calls: Mutex<Vec<Call>>,
    events: Mutex<Vec<Event>>,
    writes: Mutex<usize>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(self, kind: ResourceKind, items: Vec<Value>) -> Self {
        self.set_list(kind, items);
        self
    }

    pub fn set_list(&self, kind: ResourceKind, items: Vec<Value>) {
        self.lists.lock().unwrap().insert(kind, items);
    }

    pub fn fail_list(&self, kind: ResourceKind, error: ClientError) {
        self.list_failures.lock().unwrap().insert(kind, error);
    }

    pub fn clear_list_failure(&self, kind: ResourceKind) {
        self.list_failures.lock().unwrap().remove(&kind);
    }

    /// Fail only the `n`th (0-based) list call for `kind`
    pub fn fail_nth_list(&self, kind: ResourceKind, n: usize, error: ClientError) {
        self.nth_list_failures.lock().unwrap().insert((kind, n), error);
    }

    /// Fail the `n`th write (0-based, counting creates, updates, deletes and page writes)
    pub fn fail_write(&self, n: usize, error: ClientError) {
        self.write_failures.lock().unwrap().insert(n, error);
    }

    /// Response body returned by `create_page`
    pub fn respond_to_page_create(&self, body: Value) {
        *self.created_page.lock().unwrap() = Some(body);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn list_count(&self, kind: ResourceKind) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.op == Op::List && c.kind == kind)
            .count()
    }

    pub fn writes(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.op != Op::List)
            .cloned()
            .collect()
    }

    fn record(&self, call: Call) -> usize {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        let index = calls.len() - 1;
        self.events.lock().unwrap().push(Event::Started(index));
        index
    }

    fn finish(&self, index: usize) {
        self.events.lock().unwrap().push(Event::Finished(index));
    }

    async fn write(&self, call: Call) -> Result<(), ClientError> {
        let index = self.record(call);
        let n = {
            let mut writes = self.writes.lock().unwrap();
            let n = *writes;
            *writes += 1;
            n
        };
        // Give any concurrently issued request a chance to start.
        tokio::task::yield_now().await;
        let failure = self.write_failures.lock().unwrap().remove(&n);
        self.finish(index);
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ContentBackend for RecordingBackend {
    async fn list(&self, kind: ResourceKind) -> Result<Vec<Value>, ClientError> {
        let n = self.list_count(kind);
        let index = self.record(Call {
            op: Op::List,
            kind,
            form: None,
            id: None,
            body: None,
        });
        tokio::task::yield_now().await;
        let failure = self
            .nth_list_failures
            .lock()
            .unwrap()
            .remove(&(kind, n))
            .or_else(|| self.list_failures.lock().unwrap().get(&kind).cloned());
        let items = self.lists.lock().unwrap().get(&kind).cloned().unwrap_or_default();
        self.finish(index);
        match failure {
            Some(error) => Err(error),
            None => Ok(items),
        }
    }

    async fn create(&self, kind: ResourceKind, form: FormPayload, _token: &AuthToken) -> Result<(), ClientError> {
        self.write(Call { op: Op::Create, kind, form: Some(form), id: None, body: None }).await
    }

    async fn update(&self, kind: ResourceKind, form: FormPayload, _token: &AuthToken) -> Result<(), ClientError> {
        self.write(Call { op: Op::Update, kind, form: Some(form), id: None, body: None }).await
    }

    async fn delete(&self, kind: ResourceKind, id: i64, _token: &AuthToken) -> Result<(), ClientError> {
        self.write(Call { op: Op::Delete, kind, form: None, id: Some(id), body: None }).await
    }

    async fn create_page(&self, body: Value, _token: Option<&AuthToken>) -> Result<Value, ClientError> {
        self.write(Call {
            op: Op::CreatePage,
            kind: ResourceKind::Pages,
            form: None,
            id: None,
            body: Some(body),
        })
        .await?;
        Ok(self.created_page.lock().unwrap().clone().unwrap_or(Value::Null))
    }

    async fn update_page(&self, body: Value, _token: Option<&AuthToken>) -> Result<(), ClientError> {
        self.write(Call {
            op: Op::UpdatePage,
            kind: ResourceKind::Pages,
            form: None,
            id: None,
            body: Some(body),
        })
        .await
    }
}
