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


use crate::modules::files::File;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A file to fetch, as handed to bulk downloads.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadTarget {
    pub collection: String,
    pub object_name: String,
}

impl From<&File> for DownloadTarget {
    fn from(file: &File) -> Self {
        Self {
            collection: file.collection.clone(),
            object_name: file.object_name.clone(),
        }
    }
}

/// Row selection of a file table, keyed by object name.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TableSelection {
    selected: BTreeSet<String>,
}

impl TableSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn toggle_item(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    /// Deselects everything when all of `ids` are already selected, otherwise
    /// selects exactly `ids`.
    pub fn toggle_all<S: AsRef<str>>(&mut self, ids: &[S]) {
        if ids.iter().all(|id| self.selected.contains(id.as_ref())) {
            self.selected.clear();
        } else {
            self.selected = ids.iter().map(|id| id.as_ref().to_string()).collect();
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn are_all_selected<S: AsRef<str>>(&self, ids: &[S]) -> bool {
        !ids.is_empty() && ids.iter().all(|id| self.selected.contains(id.as_ref()))
    }

    /// Some, but not all, of `ids` are selected.
    pub fn are_some_selected<S: AsRef<str>>(&self, ids: &[S]) -> bool {
        let any = ids.iter().any(|id| self.selected.contains(id.as_ref()));
        any && !self.are_all_selected(ids)
    }

    /// Selected files in table order.
    pub fn selected_downloads(&self, files: &[File]) -> Vec<DownloadTarget> {
        files
            .iter()
            .filter(|file| self.selected.contains(&file.object_name))
            .map(DownloadTarget::from)
            .collect()
    }
}
