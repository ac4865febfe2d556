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


use crate::modules::api::{request::files_endpoint, request::RequestOptions, ApiClient};
use crate::modules::collections::Collection;
use crate::modules::error::{
    code::ErrorCode,
    messages::{self, REQUEST_ACCESS, TRY_AGAIN_OR_CONTACT_SUPPORT, VERIFY_EXISTS},
    ServiceError, StufError, StufResult,
};
use crate::modules::users::User;
use crate::raise_error;
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// Every collection the user holds a grant on. Collections whose count could
/// not be read are still listed, with a count of zero, and add an entry to
/// `errors`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GetCollectionsResult {
    pub collections: Vec<Collection>,
    pub errors: Vec<ServiceError>,
}

#[derive(Clone)]
pub struct CollectionsService {
    client: Arc<dyn ApiClient>,
}

impl CollectionsService {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub async fn get_collections(&self, user: &User) -> GetCollectionsResult {
        let names = user.collection_names();
        let counts = join_all(names.iter().map(|name| self.file_count(name))).await;

        let mut result = GetCollectionsResult::default();
        for (name, count) in names.iter().zip(counts) {
            match count {
                Ok(count) => result.collections.push(Collection::new(name, Some(count))),
                Err(e) => {
                    warn!("Collection '{}' could not be counted: {}", name, e);
                    result
                        .errors
                        .push(e.to_service_error(&format!("file count for \"{}\"", name)));
                    result.collections.push(Collection::new(name, Some(0)));
                }
            }
        }
        result
    }

    async fn file_count(&self, collection: &str) -> StufResult<u64> {
        let count = async {
            let body = self
                .client
                .request(&files_endpoint(collection), RequestOptions::get())
                .await?
                .into_json()
                .ok_or_else(|| {
                    raise_error!(
                        "Expected a JSON file listing".into(),
                        ErrorCode::HttpResponseError
                    )
                })?;
            Ok::<_, StufError>(
                body.get("files")
                    .and_then(Value::as_array)
                    .map_or(0, |files| files.len() as u64),
            )
        };

        count.await.map_err(|e| {
            let code = e.code();
            match code {
                ErrorCode::ResourceNotFound => StufError::application(
                    messages::not_found(&format!("Collection \"{}\"", collection)),
                    VERIFY_EXISTS,
                    code,
                ),
                ErrorCode::Forbidden => StufError::application(
                    messages::forbidden(&format!("collection \"{}\"", collection)),
                    REQUEST_ACCESS,
                    code,
                ),
                _ => StufError::application(
                    messages::fetch_failed(
                        &format!("file count for \"{}\"", collection),
                        Some(&e.to_string()),
                    ),
                    TRY_AGAIN_OR_CONTACT_SUPPORT,
                    code,
                ),
            }
        })
    }
}
