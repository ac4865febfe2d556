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


use crate::modules::api::{
    request::{build_headers, RequestBody, RequestOptions, APPLICATION_JSON},
    ApiClient, ApiResponse, AuthContext, RawBody,
};
use crate::modules::error::{code::ErrorCode, StufResult};
use crate::raise_error;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::sync::RwLock;
use tracing::{debug, warn};

/// [`ApiClient`] over HTTP.
///
/// Each instance carries its own credentials; build one per session and hand
/// it to the services rather than sharing a global.
pub struct HttpApiClient {
    base_url: String,
    http: reqwest::Client,
    auth: RwLock<AuthContext>,
}

impl HttpApiClient {
    pub fn new(base_url: impl Into<String>) -> StufResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("stuf/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            auth: RwLock::new(AuthContext::default()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn multipart(form: crate::modules::api::request::MultipartForm) -> StufResult<Form> {
        let mut multipart = Form::new();
        if let Some(file) = form.file {
            let part = Part::stream(file.bytes)
                .file_name(file.filename)
                .mime_str(&file.content_type)
                .map_err(|e| {
                    raise_error!(
                        format!("Invalid content type for upload: {}", e),
                        ErrorCode::InvalidParameter
                    )
                })?;
            multipart = multipart.part(file.field, part);
        }
        for (name, value) in form.fields {
            multipart = multipart.text(name, value);
        }
        Ok(multipart)
    }

    /// Prefers the backend's own explanation (`message`, then `detail`).
    fn error_message(status: reqwest::StatusCode, body: Option<Value>) -> String {
        body.as_ref()
            .and_then(|body| {
                body.get("message")
                    .and_then(Value::as_str)
                    .or_else(|| body.get("detail").and_then(Value::as_str))
            })
            .filter(|message| !message.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()))
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    fn set_auth(&self, auth: AuthContext) {
        match self.auth.write() {
            Ok(mut guard) => *guard = auth,
            Err(poisoned) => *poisoned.into_inner() = auth,
        }
    }

    fn access_token(&self) -> Option<String> {
        match self.auth.read() {
            Ok(guard) => guard.access_token.clone(),
            Err(poisoned) => poisoned.into_inner().access_token.clone(),
        }
    }

    async fn request(&self, endpoint: &str, options: RequestOptions) -> StufResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, endpoint);
        let headers = build_headers(self.access_token().as_deref(), &options);
        debug!("{} {}", options.method, endpoint);

        let mut builder = self.http.request(options.method.clone(), &url);
        for (name, value) in &headers {
            builder = builder.header(name, value);
        }
        builder = match options.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(value.to_string()),
            RequestBody::Multipart(form) => builder.multipart(Self::multipart(form)?),
        };

        let response = builder.send().await.map_err(|e| {
            raise_error!(
                format!("Request to {} failed: {}", endpoint, e),
                ErrorCode::NetworkError
            )
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let is_json = content_type
            .as_deref()
            .is_some_and(|ct| ct.contains(APPLICATION_JSON));

        if !status.is_success() {
            let body = if is_json {
                response.json::<Value>().await.ok()
            } else {
                None
            };
            let message = Self::error_message(status, body);
            warn!("{} {} returned {}: {}", options.method, endpoint, status, message);
            return Err(raise_error!(message, ErrorCode::from_status(status)));
        }

        if is_json {
            let value = response.json::<Value>().await.map_err(|e| {
                raise_error!(
                    format!("Invalid JSON from {}: {}", endpoint, e),
                    ErrorCode::HttpResponseError
                )
            })?;
            return Ok(ApiResponse::Json(value));
        }

        let bytes = response.bytes().await.map_err(|e| {
            raise_error!(
                format!("Failed to read response from {}: {}", endpoint, e),
                ErrorCode::NetworkError
            )
        })?;
        Ok(ApiResponse::Raw(RawBody {
            content_type,
            bytes,
        }))
    }
}
