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


use crate::modules::error::{code::ErrorCode, StufResult};
use crate::raise_error;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The subset of access-token claims the client relies on.
///
/// The token is issued by the identity provider and verified by the backend;
/// the client only reads the payload to learn who the user is and which
/// collections they may touch.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub preferred_username: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub email: Option<String>,
    /// collection name -> permission tokens
    pub collections: Option<BTreeMap<String, Vec<String>>>,
    /// Expiry, seconds since the epoch.
    pub exp: Option<i64>,
}

impl AccessTokenClaims {
    /// Decodes the payload segment of a JWT. The signature is not checked.
    pub fn decode(token: &str) -> StufResult<Self> {
        let mut segments = token.trim().split('.');
        let payload = match (segments.next(), segments.next(), segments.next()) {
            (Some(_header), Some(payload), Some(_signature)) if !payload.is_empty() => payload,
            _ => {
                return Err(raise_error!(
                    "Access token is not a JWT (expected three dot-separated segments).".into(),
                    ErrorCode::InvalidToken
                ))
            }
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| {
                raise_error!(
                    format!("Access token payload is not valid base64url: {}", e),
                    ErrorCode::InvalidToken
                )
            })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            raise_error!(
                format!("Access token payload is not valid JSON: {}", e),
                ErrorCode::InvalidToken
            )
        })
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| at <= now)
    }
}

#[cfg(test)]
pub(crate) fn encode_test_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.signature", header, payload)
}
