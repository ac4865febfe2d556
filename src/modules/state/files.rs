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
use crate::modules::state::{ListState, Pagination};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesState {
    pub files: Vec<File>,
    pub loading: bool,
    pub error: Option<String>,
    pub total_pages: u64,
    pub current_page: u64,
    pub total_count: u64,
}

impl Default for FilesState {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            loading: false,
            error: None,
            total_pages: 0,
            current_page: 1,
            total_count: 0,
        }
    }
}

impl FilesState {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            total_pages: self.total_pages,
            current_page: self.current_page,
            total_count: self.total_count,
        }
    }

    /// The current page lies past the last page, e.g. after a filter shrank
    /// the listing. The first page of an empty listing is not out of range.
    pub fn is_page_out_of_range(&self) -> bool {
        self.current_page > self.total_pages.max(1)
    }
}

impl ListState for FilesState {
    type Item = File;
    const PAGINATED: bool = true;

    fn items_mut(&mut self) -> &mut Vec<File> {
        &mut self.files
    }

    fn loading_mut(&mut self) -> &mut bool {
        &mut self.loading
    }

    fn error_mut(&mut self) -> &mut Option<String> {
        &mut self.error
    }

    fn set_pagination(&mut self, pagination: Pagination) {
        self.total_pages = pagination.total_pages;
        self.current_page = pagination.current_page;
        self.total_count = pagination.total_count;
    }
}
