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
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FileSortField {
    #[default]
    Status,
    Uploader,
    Date,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Sort state of a file table.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FilesSort {
    pub field: FileSortField,
    pub direction: SortDirection,
}

impl FilesSort {
    pub fn new(field: FileSortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Clicking the current column flips the direction; another column starts descending.
    pub fn toggle(&mut self, field: FileSortField) {
        if field == self.field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Desc;
        }
    }

    fn compare(&self, a: &File, b: &File) -> Ordering {
        let ordering = match self.field {
            FileSortField::Status => a.status().to_lowercase().cmp(&b.status().to_lowercase()),
            FileSortField::Uploader => a.owner.to_lowercase().cmp(&b.owner.to_lowercase()),
            FileSortField::Date => {
                let millis = |f: &File| f.uploaded_at().map_or(0, |at| at.timestamp_millis());
                millis(a).cmp(&millis(b))
            }
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    /// Stable; unreadable dates count as the epoch.
    pub fn apply(&self, files: &[File]) -> Vec<File> {
        let mut sorted = files.to_vec();
        sorted.sort_by(|a, b| self.compare(a, b));
        sorted
    }
}
