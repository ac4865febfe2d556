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


use crate::modules::files::sort::{FileSortField, SortDirection};
use crate::modules::settings::config::ConfigOverrides;
use clap::{builder::ValueParser, ArgAction, Parser, Subcommand};
use serde_json::{Map, Value};
use std::{path::PathBuf, sync::LazyLock};

#[cfg(not(test))]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::parse);

#[cfg(test)]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(|| Settings {
    stuf_log_level: "info".to_string(),
    stuf_ansi_logs: false,
    stuf_json_logs: false,
    stuf_log_to_file: false,
    stuf_log_dir: std::env::temp_dir().join("stuf_test_logs"),
    stuf_max_log_files: 5,
    stuf_config: None,
    stuf_api_base_url: None,
    stuf_keycloak_url: None,
    stuf_keycloak_realm: None,
    stuf_keycloak_client_id: None,
    stuf_access_token: None,
    stuf_download_dir: std::env::temp_dir(),
    command: Command::Health,
});

#[derive(Debug, Parser)]
#[clap(
    name = "stuf",
    about = "Browse collections and manage files on a STUF server",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Settings {
    /// stuf log level (default: "info")
    #[clap(long, default_value = "info", env, help = "Set the log level for stuf")]
    pub stuf_log_level: String,

    /// Enable ANSI logs (default: true)
    #[clap(
        long,
        default_value = "true",
        env,
        action = ArgAction::Set,
        help = "Enable ANSI formatted logs"
    )]
    pub stuf_ansi_logs: bool,

    /// Enable JSON logs (default: false)
    #[clap(
        long,
        default_value = "false",
        env,
        action = ArgAction::Set,
        help = "Enable JSON formatted logs"
    )]
    pub stuf_json_logs: bool,

    /// Enable log file output (default: false)
    /// If false, logs will be printed to stderr
    #[clap(
        long,
        default_value = "false",
        env,
        action = ArgAction::Set,
        help = "Enable log file output (otherwise logs go to stderr)"
    )]
    pub stuf_log_to_file: bool,

    #[clap(
        long,
        default_value = "logs",
        env,
        help = "Directory for log files when file output is enabled"
    )]
    pub stuf_log_dir: PathBuf,

    /// Maximum number of log files (default: 5)
    #[clap(
        long,
        default_value = "5",
        env,
        help = "Set the maximum number of rotated log files"
    )]
    pub stuf_max_log_files: usize,

    /// Path to the runtime configuration file (JSON with apiBaseUrl,
    /// keycloakUrl, keycloakRealm, keycloakClientId).
    #[clap(long, env, help = "Path to the runtime configuration JSON file")]
    pub stuf_config: Option<PathBuf>,

    #[clap(
        long,
        env,
        help = "Override the API base URL from the runtime configuration",
        value_parser = ValueParser::new(parse_url)
    )]
    pub stuf_api_base_url: Option<String>,

    #[clap(
        long,
        env,
        help = "Override the identity provider URL from the runtime configuration",
        value_parser = ValueParser::new(parse_url)
    )]
    pub stuf_keycloak_url: Option<String>,

    #[clap(long, env, help = "Override the identity provider realm")]
    pub stuf_keycloak_realm: Option<String>,

    #[clap(long, env, help = "Override the identity provider client id")]
    pub stuf_keycloak_client_id: Option<String>,

    /// Access token issued by the identity provider. Its claims carry the
    /// user's per-collection permissions.
    #[clap(long, env, hide_env_values = true, help = "Bearer access token")]
    pub stuf_access_token: Option<String>,

    #[clap(
        long,
        default_value = ".",
        env,
        help = "Directory downloaded files are written to"
    )]
    pub stuf_download_dir: PathBuf,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the profile the backend associates with the access token
    Me,
    /// Check backend health
    Health,
    /// List the collections you have access to, with file counts
    Collections,
    /// Show the most recent files across all your collections
    Recent {
        #[clap(long, default_value = "10")]
        limit: usize,
    },
    /// List one page of files in a collection
    List {
        collection: String,
        #[clap(long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
        page: u64,
        #[clap(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
        page_size: u64,
        /// Only files uploaded by this owner (repeatable)
        #[clap(long = "uploader")]
        uploaders: Vec<String>,
        /// Only files with this status (repeatable)
        #[clap(long = "status")]
        statuses: Vec<String>,
        /// Start of the upload date range (YYYY-MM-DD)
        #[clap(long, requires = "to")]
        from: Option<String>,
        /// End of the upload date range, inclusive (YYYY-MM-DD)
        #[clap(long, requires = "from")]
        to: Option<String>,
        #[clap(long, value_enum)]
        sort_by: Option<FileSortField>,
        #[clap(long, value_enum, default_value = "desc")]
        direction: SortDirection,
    },
    /// Upload a file into a collection
    Upload {
        collection: String,
        path: PathBuf,
        /// Metadata as a JSON object, e.g. '{"status":"Draft"}'
        #[clap(long, value_parser = ValueParser::new(parse_metadata))]
        metadata: Option<Map<String, Value>>,
    },
    /// Download one or more files, one after another
    Download {
        collection: String,
        #[clap(required = true, num_args = 1..)]
        objects: Vec<String>,
    },
    /// Delete a file
    Delete { collection: String, object: String },
    /// Mark a file as archived
    Archive { collection: String, object: String },
    /// Show what you may do with a file
    Permissions { collection: String, object: String },
}

impl Settings {
    pub fn config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_base_url: self.stuf_api_base_url.clone(),
            keycloak_url: self.stuf_keycloak_url.clone(),
            keycloak_realm: self.stuf_keycloak_realm.clone(),
            keycloak_client_id: self.stuf_keycloak_client_id.clone(),
        }
    }
}

fn parse_url(s: &str) -> Result<String, String> {
    url::Url::parse(s)
        .map(|_| s.trim_end_matches('/').to_string())
        .map_err(|e| format!("Invalid URL '{}': {}", s, e))
}

fn parse_metadata(s: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(s) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("Metadata must be a JSON object".to_string()),
        Err(e) => Err(format!("Metadata is not valid JSON: {}", e)),
    }
}
