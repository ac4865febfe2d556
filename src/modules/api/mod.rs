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


//! REST transport.
//!
//! [`ApiClient`] is the seam between the services and the network: the
//! services only speak in endpoints and [`RequestOptions`], so tests can swap
//! in an in-memory client and a future transport only has to implement this
//! trait.

use crate::modules::error::StufResult;
use async_trait::async_trait;
use bytes::Bytes;
use request::RequestOptions;
use serde_json::Value;

pub mod client;
pub mod request;
pub mod system;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AuthContext {
    pub access_token: Option<String>,
}

impl AuthContext {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
        }
    }
}

/// A successful response body that is not JSON, e.g. a file download.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawBody {
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    Raw(RawBody),
}

impl ApiResponse {
    pub fn into_json(self) -> Option<Value> {
        match self {
            ApiResponse::Json(value) => Some(value),
            ApiResponse::Raw(_) => None,
        }
    }

    /// The body as bytes, whatever its content type.
    pub fn into_raw(self) -> RawBody {
        match self {
            ApiResponse::Raw(raw) => raw,
            ApiResponse::Json(value) => RawBody {
                content_type: Some(request::APPLICATION_JSON.to_string()),
                bytes: Bytes::from(value.to_string()),
            },
        }
    }
}

#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Stores the credentials used by every following request. Call again
    /// whenever the token is refreshed.
    fn set_auth(&self, auth: AuthContext);

    fn access_token(&self) -> Option<String>;

    /// Performs a single attempt. Non-success statuses come back as errors
    /// classified by [`ErrorCode::from_status`](crate::modules::error::code::ErrorCode::from_status).
    async fn request(&self, endpoint: &str, options: RequestOptions) -> StufResult<ApiResponse>;
}
