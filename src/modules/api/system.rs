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


use crate::modules::api::{request::RequestOptions, ApiClient};
use crate::modules::error::{code::ErrorCode, StufResult};
use crate::raise_error;
use serde_json::Value;

pub const ME_ENDPOINT: &str = "/api/me";
pub const HEALTH_ENDPOINT: &str = "/api/health";

/// Profile the backend associates with the current token.
pub async fn get_user_info(client: &dyn ApiClient) -> StufResult<Value> {
    json_of(client, ME_ENDPOINT).await
}

pub async fn get_health(client: &dyn ApiClient) -> StufResult<Value> {
    json_of(client, HEALTH_ENDPOINT).await
}

async fn json_of(client: &dyn ApiClient, endpoint: &str) -> StufResult<Value> {
    client
        .request(endpoint, RequestOptions::get())
        .await?
        .into_json()
        .ok_or_else(|| {
            raise_error!(
                format!("Expected a JSON response from {}", endpoint),
                ErrorCode::HttpResponseError
            )
        })
}
