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


use crate::modules::files::{parse_upload_time, File};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client-side listing filters. Empty lists do not filter.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileFilters {
    pub uploaders: Vec<String>,
    pub statuses: Vec<String>,
    pub date_range: Option<DateRange>,
}

/// Inclusive upload-date window; `end` covers its whole day.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.start.is_empty() && !self.end.is_empty()
    }

    fn start_bound(&self) -> Option<DateTime<Utc>> {
        parse_upload_time(&self.start)
    }

    fn end_bound(&self) -> Option<DateTime<Utc>> {
        Some(
            parse_upload_time(&self.end)?
                .date_naive()
                .and_hms_milli_opt(23, 59, 59, 999)?
                .and_utc(),
        )
    }

    /// Each bound applies on its own; a bound that cannot be parsed, or a
    /// file time that cannot be parsed, excludes nothing.
    pub fn contains(&self, upload_time: &str) -> bool {
        let Some(at) = parse_upload_time(upload_time) else {
            return true;
        };
        let after_start = self.start_bound().is_none_or(|start| at >= start);
        let before_end = self.end_bound().is_none_or(|end| at <= end);
        after_start && before_end
    }
}

impl FileFilters {
    pub fn is_empty(&self) -> bool {
        self.uploaders.is_empty()
            && self.statuses.is_empty()
            && !self.date_range.as_ref().is_some_and(DateRange::is_complete)
    }

    /// Uploader, then status, then date range.
    pub fn matches(&self, file: &File) -> bool {
        if !self.uploaders.is_empty() && !self.uploaders.contains(&file.owner) {
            return false;
        }

        if !self.statuses.is_empty() {
            let status = file.metadata_status().unwrap_or_default();
            if !self.statuses.iter().any(|s| s == status) {
                return false;
            }
        }

        match &self.date_range {
            Some(range) if range.is_complete() => range.contains(&file.upload_time),
            _ => true,
        }
    }

    pub fn apply(&self, files: Vec<File>) -> Vec<File> {
        files.into_iter().filter(|file| self.matches(file)).collect()
    }
}
