//
// Copyright (c) 2025 STUF contributors
//
// This file is part of the STUF File Sharing Client
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.


//! In-memory [`ApiClient`] for service and state tests.

use crate::modules::api::{
    request::{RequestBody, RequestOptions},
    ApiClient, ApiResponse, AuthContext, RawBody,
};
use crate::modules::context::download::DownloadSink;
use crate::modules::error::{code::ErrorCode, StufResult};
use crate::modules::files::File;
use crate::modules::users::User;
use crate::raise_error;
use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, StatusCode};
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Clone, Debug)]
pub enum MockReply {
    Json(Value),
    Raw(RawBody),
    Status(StatusCode),
    Network(String),
}

impl MockReply {
    pub fn files(files: &[File]) -> Self {
        MockReply::Json(json!({ "files": files }))
    }

    pub fn bytes(content: &'static [u8]) -> Self {
        MockReply::Raw(RawBody {
            content_type: Some("application/octet-stream".into()),
            bytes: Bytes::from_static(content),
        })
    }

    fn into_result(self) -> StufResult<ApiResponse> {
        match self {
            MockReply::Json(value) => Ok(ApiResponse::Json(value)),
            MockReply::Raw(raw) => Ok(ApiResponse::Raw(raw)),
            MockReply::Status(status) => Err(raise_error!(
                format!("HTTP error! status: {}", status.as_u16()),
                ErrorCode::from_status(status)
            )),
            MockReply::Network(message) => Err(raise_error!(message, ErrorCode::NetworkError)),
        }
    }
}

impl From<ApiResponse> for MockReply {
    fn from(response: ApiResponse) -> Self {
        match response {
            ApiResponse::Json(value) => MockReply::Json(value),
            ApiResponse::Raw(raw) => MockReply::Raw(raw),
        }
    }
}

impl From<StatusCode> for MockReply {
    fn from(status: StatusCode) -> Self {
        MockReply::Status(status)
    }
}

#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub method: Method,
    pub endpoint: String,
    pub body: RequestBody,
    pub access_token: Option<String>,
}

type RouteKey = (Method, String);

#[derive(Default)]
pub struct MockApiClient {
    routes: Mutex<HashMap<RouteKey, MockReply>>,
    gates: Mutex<HashMap<RouteKey, VecDeque<oneshot::Receiver<()>>>>,
    calls: Mutex<Vec<RecordedCall>>,
    auth: Mutex<AuthContext>,
}

impl MockApiClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request to `method endpoint` gets `reply`. Unrouted requests get 404.
    pub fn on(&self, method: Method, endpoint: &str, reply: impl Into<MockReply>) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, endpoint.to_string()), reply.into());
    }

    /// Holds the next request to `method endpoint` until the returned sender
    /// fires (or is dropped). Gates queue up in the order they are created.
    pub fn gate(&self, method: Method, endpoint: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .entry((method, endpoint.to_string()))
            .or_default()
            .push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.endpoint).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub async fn wait_for_calls(&self, count: usize) {
        for _ in 0..1000 {
            if self.call_count() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("expected {} calls, saw {}", count, self.call_count());
    }
}

#[async_trait]
impl ApiClient for MockApiClient {
    fn set_auth(&self, auth: AuthContext) {
        *self.auth.lock().unwrap() = auth;
    }

    fn access_token(&self) -> Option<String> {
        self.auth.lock().unwrap().access_token.clone()
    }

    async fn request(&self, endpoint: &str, options: RequestOptions) -> StufResult<ApiResponse> {
        let key = (options.method.clone(), endpoint.to_string());
        self.calls.lock().unwrap().push(RecordedCall {
            method: options.method.clone(),
            endpoint: endpoint.to_string(),
            body: options.body.clone(),
            access_token: self.access_token(),
        });

        let gate = self
            .gates
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let reply = self.routes.lock().unwrap().get(&key).cloned();
        reply
            .unwrap_or(MockReply::Status(StatusCode::NOT_FOUND))
            .into_result()
    }
}

/// A file as the backend lists it.
pub fn file(collection: &str, owner: &str, name: &str, upload_time: &str) -> File {
    File {
        object_name: format!("{}/{}/{}", collection, owner, name),
        collection: collection.to_string(),
        owner: owner.to_string(),
        original_filename: name.to_string(),
        upload_time: upload_time.to_string(),
        content_type: "application/octet-stream".to_string(),
        size: Some(1024),
        metadata: None,
    }
}

/// A user holding `grants` on each of `collections`.
pub fn user(username: &str, collections: &[&str], grants: &[&str]) -> User {
    User {
        username: username.to_string(),
        name: username.to_string(),
        collections: collections
            .iter()
            .map(|c| {
                (
                    c.to_string(),
                    grants.iter().map(|g| g.to_string()).collect::<BTreeSet<_>>(),
                )
            })
            .collect(),
        ..Default::default()
    }
}

/// Records saved downloads instead of writing them.
#[derive(Default)]
pub struct RecordingSink {
    saved: Mutex<Vec<(String, Bytes)>>,
}

impl RecordingSink {
    pub fn saved(&self) -> Vec<(String, Bytes)> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl DownloadSink for RecordingSink {
    async fn save(&self, filename: &str, body: RawBody) -> StufResult<()> {
        self.saved
            .lock()
            .unwrap()
            .push((filename.to_string(), body.bytes));
        Ok(())
    }
}
