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


//! Runtime configuration.
//!
//! Deployments provide a small JSON document describing where the backend
//! and the identity provider live:
//!
//! ```json
//! {
//!   "apiBaseUrl": "https://stuf.example.org",
//!   "keycloakUrl": "https://id.example.org",
//!   "keycloakRealm": "stuf",
//!   "keycloakClientId": "stuf-spa"
//! }
//! ```
//!
//! When no document is available the local development defaults are used and
//! a warning is logged.

use crate::modules::error::{code::ErrorCode, StufResult};
use crate::raise_error;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_KEYCLOAK_URL: &str = "http://localhost:8080";
pub const DEFAULT_KEYCLOAK_REALM: &str = "stuf";
pub const DEFAULT_KEYCLOAK_CLIENT_ID: &str = "stuf-spa";

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StufConfig {
    pub api_base_url: String,
    pub keycloak_url: String,
    pub keycloak_realm: String,
    pub keycloak_client_id: String,
}

/// Individual values that win over the runtime configuration document.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConfigOverrides {
    pub api_base_url: Option<String>,
    pub keycloak_url: Option<String>,
    pub keycloak_realm: Option<String>,
    pub keycloak_client_id: Option<String>,
}

impl Default for StufConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            keycloak_url: DEFAULT_KEYCLOAK_URL.into(),
            keycloak_realm: DEFAULT_KEYCLOAK_REALM.into(),
            keycloak_client_id: DEFAULT_KEYCLOAK_CLIENT_ID.into(),
        }
    }
}

impl StufConfig {
    /// Reads the configuration document at `path`, falling back to defaults
    /// when no path is given or the file does not exist. A file that exists
    /// but cannot be parsed is an error.
    pub async fn load(path: Option<&Path>) -> StufResult<Self> {
        let Some(path) = path else {
            return Ok(Self::fallback());
        };

        if !tokio::fs::try_exists(path).await? {
            warn!("Runtime configuration {:?} does not exist", path);
            return Ok(Self::fallback());
        }

        let raw = tokio::fs::read_to_string(path).await?;
        let config: StufConfig = serde_json::from_str(&raw).map_err(|e| {
            raise_error!(
                format!("Invalid runtime configuration {:?}: {}", path, e),
                ErrorCode::MissingConfiguration
            )
        })?;
        config.validate()?;
        info!("Runtime configuration loaded from {:?}", path);
        Ok(config)
    }

    fn fallback() -> Self {
        warn!("STUF Config: Using default configuration. Provide a runtime configuration file for deployments.");
        Self::default()
    }

    /// Applies the per-field overrides given on the command line or through
    /// the environment on top of the loaded document.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        let fields = [
            (&mut self.api_base_url, &overrides.api_base_url),
            (&mut self.keycloak_url, &overrides.keycloak_url),
            (&mut self.keycloak_realm, &overrides.keycloak_realm),
            (&mut self.keycloak_client_id, &overrides.keycloak_client_id),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                *field = value.clone();
            }
        }
        self
    }

    pub fn validate(&self) -> StufResult<()> {
        for (name, value) in [
            ("apiBaseUrl", &self.api_base_url),
            ("keycloakUrl", &self.keycloak_url),
        ] {
            url::Url::parse(value).map_err(|e| {
                raise_error!(
                    format!("Configuration value {} '{}' is not a valid URL: {}", name, value, e),
                    ErrorCode::MissingConfiguration
                )
            })?;
        }
        Ok(())
    }

    /// Issuer URL of the identity provider realm.
    pub fn issuer_url(&self) -> String {
        format!(
            "{}/realms/{}",
            self.keycloak_url.trim_end_matches('/'),
            self.keycloak_realm
        )
    }
}
