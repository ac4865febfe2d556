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


use bytes::Bytes;
use http::Method;
use serde_json::Value;
use std::collections::BTreeMap;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const AUTHORIZATION: &str = "Authorization";
pub const APPLICATION_JSON: &str = "application/json";

/// A single outgoing request, independent of the transport.
#[derive(Clone, Debug)]
pub struct RequestOptions {
    pub method: Method,
    /// Caller headers. A `None` value removes the header from the request.
    pub headers: BTreeMap<String, Option<String>>,
    pub body: RequestBody,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartForm),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultipartForm {
    pub file: Option<FilePart>,
    pub fields: Vec<(String, String)>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, part: FilePart) -> Self {
        self.file = Some(part);
        self
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::with_method(Method::GET)
    }

    pub fn delete() -> Self {
        Self::with_method(Method::DELETE)
    }

    pub fn post_multipart(form: MultipartForm) -> Self {
        Self {
            body: RequestBody::Multipart(form),
            ..Self::with_method(Method::POST)
        }
    }

    pub fn patch_json(body: Value) -> Self {
        Self {
            body: RequestBody::Json(body),
            ..Self::with_method(Method::PATCH)
        }
    }

    fn with_method(method: Method) -> Self {
        Self {
            method,
            headers: BTreeMap::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        self.headers.insert(name.into(), value);
        self
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self.body, RequestBody::Multipart(_))
    }
}

/// Computes the final header set for a request.
///
/// The bearer token comes first, caller headers are merged over it, JSON is
/// the default content type except for multipart bodies (the transport adds
/// the boundary), and headers whose value is `None` are dropped.
pub fn build_headers(token: Option<&str>, options: &RequestOptions) -> BTreeMap<String, String> {
    let mut merged: BTreeMap<String, Option<String>> = BTreeMap::new();

    if let Some(token) = token.filter(|t| !t.is_empty()) {
        merged.insert(AUTHORIZATION.to_string(), Some(format!("Bearer {}", token)));
    }

    for (name, value) in &options.headers {
        // Header names are case-insensitive; the caller's spelling wins.
        merged.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        merged.insert(name.clone(), value.clone());
    }

    let has_content_type = merged
        .keys()
        .any(|name| name.eq_ignore_ascii_case(CONTENT_TYPE));
    if !has_content_type && !options.is_multipart() {
        merged.insert(CONTENT_TYPE.to_string(), Some(APPLICATION_JSON.to_string()));
    }

    merged
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
        .collect()
}

pub fn files_endpoint(collection: &str) -> String {
    format!("/api/files/{}", urlencoding::encode(collection))
}

/// Object names are path-like (`collection/owner/stamp-name`); each segment is
/// encoded on its own so the slashes survive.
pub fn file_endpoint(collection: &str, object_name: &str) -> String {
    let object_path = object_name
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/{}", files_endpoint(collection), object_path)
}
