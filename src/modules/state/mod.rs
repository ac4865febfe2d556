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


//! Reducer-owned list state shared by the files and collections views.
//!
//! Both views hold a list that is fetched, may partially fail and keeps the
//! last good items on error. [`reduce`] implements those transitions once for
//! any [`ListState`].

use serde::Serialize;
use std::sync::Arc;

pub mod collections;
pub mod files;
pub mod store;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_pages: u64,
    pub current_page: u64,
    pub total_count: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ListAction<T> {
    FetchStart,
    FetchSuccess(Vec<T>),
    FetchPartialSuccess { items: Vec<T>, error: String },
    FetchError(String),
    SetPagination(Pagination),
    Reset,
}

pub trait ListState: Clone + Default + Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    /// Whether the state tracks pagination. When false, `SetPagination` is
    /// not an action of this state and leaves it untouched.
    const PAGINATED: bool = false;

    fn items_mut(&mut self) -> &mut Vec<Self::Item>;
    fn loading_mut(&mut self) -> &mut bool;
    fn error_mut(&mut self) -> &mut Option<String>;

    fn set_pagination(&mut self, _pagination: Pagination) {}
}

/// Returns the next state. Actions the state does not handle return the very
/// same `Arc`.
pub fn reduce<S: ListState>(state: &Arc<S>, action: ListAction<S::Item>) -> Arc<S> {
    if matches!(action, ListAction::SetPagination(_)) && !S::PAGINATED {
        return Arc::clone(state);
    }

    let mut next = S::clone(state);
    match action {
        ListAction::FetchStart => {
            *next.loading_mut() = true;
            *next.error_mut() = None;
        }
        ListAction::FetchSuccess(items) => {
            *next.loading_mut() = false;
            *next.items_mut() = items;
            *next.error_mut() = None;
        }
        ListAction::FetchPartialSuccess { items, error } => {
            *next.loading_mut() = false;
            *next.items_mut() = items;
            *next.error_mut() = Some(error);
        }
        // The last good list stays on screen.
        ListAction::FetchError(error) => {
            *next.loading_mut() = false;
            *next.error_mut() = Some(error);
        }
        ListAction::SetPagination(pagination) => next.set_pagination(pagination),
        ListAction::Reset => next = S::default(),
    }
    Arc::new(next)
}
