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


use crate::modules::files::{
    filters::{DateRange, FileFilters},
    parse_upload_time, File,
};
use serde::Serialize;
use std::collections::BTreeSet;

const UPLOADER_PREFIX: &str = "uploader-";
const STATUS_PREFIX: &str = "status-";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Uploader,
    Status,
    Date,
}

/// A removable filter chip.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ActiveFilter {
    pub id: String,
    pub label: String,
    pub kind: FilterKind,
}

/// Filter chips of a collection view and the [`FileFilters`] they stand for.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CollectionFilters {
    active: Vec<ActiveFilter>,
    date_range: DateRange,
}

/// Unique owners of `files`, sorted.
pub fn available_uploaders(files: &[File]) -> Vec<String> {
    files
        .iter()
        .map(|file| file.owner.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn short_date(value: &str) -> String {
    parse_upload_time(value)
        .map(|at| at.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| value.to_string())
}

impl CollectionFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &[ActiveFilter] {
        &self.active
    }

    /// Replaces the uploader and status chips; a date chip is kept.
    pub fn apply_filters(&mut self, uploaders: &[String], statuses: &[String]) {
        self.active.retain(|f| f.kind == FilterKind::Date);
        self.active.extend(uploaders.iter().map(|uploader| ActiveFilter {
            id: format!("{}{}", UPLOADER_PREFIX, uploader),
            label: format!("Uploader: {}", uploader),
            kind: FilterKind::Uploader,
        }));
        self.active.extend(statuses.iter().map(|status| ActiveFilter {
            id: format!("{}{}", STATUS_PREFIX, status),
            label: format!("Status: {}", status),
            kind: FilterKind::Status,
        }));
    }

    /// Replaces the date chip.
    pub fn apply_date_filter(&mut self, start: &str, end: &str) {
        self.date_range = DateRange::new(start, end);
        self.active.retain(|f| f.kind != FilterKind::Date);
        self.active.push(ActiveFilter {
            id: format!("date-{}-{}", start, end),
            label: format!("{} – {}", short_date(start), short_date(end)),
            kind: FilterKind::Date,
        });
    }

    pub fn remove_filter(&mut self, id: &str) {
        let removes_date = self
            .active
            .iter()
            .any(|f| f.id == id && f.kind == FilterKind::Date);
        if removes_date {
            self.date_range = DateRange::default();
        }
        self.active.retain(|f| f.id != id);
    }

    pub fn clear_all(&mut self) {
        self.active.clear();
        self.date_range = DateRange::default();
    }

    pub fn current_filters(&self) -> FileFilters {
        let values = |kind: FilterKind, prefix: &str| -> Vec<String> {
            self.active
                .iter()
                .filter(|f| f.kind == kind)
                .map(|f| f.id.strip_prefix(prefix).unwrap_or(&f.id).to_string())
                .collect()
        };

        FileFilters {
            uploaders: values(FilterKind::Uploader, UPLOADER_PREFIX),
            statuses: values(FilterKind::Status, STATUS_PREFIX),
            date_range: self
                .date_range
                .is_complete()
                .then(|| self.date_range.clone()),
        }
    }
}
