//! Test doubles shared by the unit tests.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Serialize;
use storefront_api::{Role, UserProfile};

use crate::error::{ClientError, Result};
use crate::http::{HttpRequest, RawResponse, RequestBody, Transport};
use crate::storage::{KeyValueStore, MemoryStore, StorageError};

pub fn sample_user(role: &str) -> UserProfile {
    UserProfile {
        id: uuid::Uuid::from_u128(0x6f1c_2a5e_7b0d_4d3e_9a51_0c8e_4f1b_2a77),
        email: "ada@example.com".to_string(),
        name: "Ada".to_string(),
        username: Some("ada".to_string()),
        role: Some(Role::from(role.to_string())),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
    }
}

/// Records every request and answers from a queue. An empty queue answers
/// with a network error.
#[derive(Default)]
pub struct StubTransport {
    responses: Mutex<VecDeque<Result<RawResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, response: Result<RawResponse>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn push_json<T: Serialize>(&self, status: u16, body: &T) {
        let body = serde_json::to_vec(body).unwrap();
        self.push(Ok(RawResponse::new(status, body)));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }

    /// JSON body of the last request
    pub fn last_json(&self) -> serde_json::Value {
        match self.last_request().body {
            RequestBody::Json(value) => value,
            other => panic!("expected a JSON body, got {other:?}"),
        }
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::network("no stubbed response")))
    }
}

/// Memory store whose operations can be made to fail
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    failing_removals: Mutex<HashSet<String>>,
}

impl FlakyStore {
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn fail_removal_of(&self, key: &str) {
        self.failing_removals
            .lock()
            .unwrap()
            .insert(key.to_string());
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("read refused".to_string()));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.failing_removals.lock().unwrap().contains(key) {
            return Err(StorageError::Unavailable("remove refused".to_string()));
        }
        self.inner.remove(key)
    }
}
