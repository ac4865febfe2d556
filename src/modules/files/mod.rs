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


use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod chips;
pub mod filters;
pub mod permissions;
pub mod selection;
pub mod service;
pub mod sort;

/// Status shown for files whose metadata does not carry one.
pub const DEFAULT_STATUS: &str = "In progress";

/// A stored file as listed by the backend.
///
/// `object_name` is the unique key and is path-like:
/// `<collection>/<owner>/<stamp>-<filename>`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct File {
    pub object_name: String,
    pub collection: String,
    pub owner: String,
    pub original_filename: String,
    /// ISO-8601. Older backends send `YYYYMMDD`; the service normalises it.
    pub upload_time: String,
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FileMetadata>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl File {
    /// The status as stored, if any.
    pub fn metadata_status(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.status.as_deref())
    }

    /// The status for display.
    pub fn status(&self) -> &str {
        self.metadata_status().unwrap_or(DEFAULT_STATUS)
    }

    pub fn is_archived(&self) -> bool {
        self.metadata
            .as_ref()
            .and_then(|m| m.archived)
            .unwrap_or(false)
    }

    /// Name to save a download under: the last segment of the object name.
    pub fn filename(&self) -> &str {
        download_name(&self.object_name)
    }

    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        parse_upload_time(&self.upload_time)
    }
}

pub fn download_name(object_name: &str) -> &str {
    match object_name.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => "download",
    }
}

/// Parses the timestamp formats the backend and the date pickers produce.
/// Offset-less values are taken as UTC.
pub fn parse_upload_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(at) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(at.and_utc());
    }
    if let Ok(at) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M") {
        return Some(at.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
}
