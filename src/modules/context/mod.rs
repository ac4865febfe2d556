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


//! Action creators over the list stores.
//!
//! Each operation turns a service result into an [`Outcome`]: the actions to
//! dispatch and the notifications to show. [`Outcome::apply`] is the only
//! place either side effect happens.

use crate::modules::context::notify::{Notification, Notifier};
use crate::modules::error::{ServiceError, StufError};
use crate::modules::state::{store::Store, ListAction, ListState};

pub mod collections;
pub mod download;
pub mod files;
pub mod notify;

#[derive(Clone, Debug, PartialEq)]
pub struct Outcome<T> {
    pub actions: Vec<ListAction<T>>,
    pub notifications: Vec<Notification>,
}

impl<T> Default for Outcome<T> {
    fn default() -> Self {
        Self {
            actions: Vec::new(),
            notifications: Vec::new(),
        }
    }
}

impl<T> Outcome<T> {
    pub fn dispatch(action: ListAction<T>) -> Self {
        Self {
            actions: vec![action],
            notifications: Vec::new(),
        }
    }

    /// Result of a fan-out fetch: one error notification per failure, then
    /// success, partial success, or a plain error when nothing came back.
    pub fn from_partial(
        items: Vec<T>,
        errors: &[ServiceError],
        partial_error: impl FnOnce(usize) -> String,
        total_failure: &str,
    ) -> Self {
        let notifications = errors.iter().map(error_notification).collect();
        let action = if errors.is_empty() {
            ListAction::FetchSuccess(items)
        } else if !items.is_empty() {
            ListAction::FetchPartialSuccess {
                items,
                error: partial_error(errors.len()),
            }
        } else {
            ListAction::FetchError(total_failure.to_string())
        };
        Self {
            actions: vec![action],
            notifications,
        }
    }

    /// Application errors become a `FetchError` and a notification; anything
    /// else is handed back to the caller.
    pub fn from_error(error: StufError) -> Result<Self, StufError> {
        let Some(notification) = application_notification(&error) else {
            return Err(error);
        };
        Ok(Self {
            actions: vec![ListAction::FetchError(error.to_string())],
            notifications: vec![notification],
        })
    }
}

impl<T: Clone + Send + Sync + 'static> Outcome<T> {
    pub fn apply<S>(self, store: &Store<S>, notifier: &dyn Notifier)
    where
        S: ListState<Item = T>,
    {
        for action in self.actions {
            store.dispatch(action);
        }
        for notification in self.notifications {
            notifier.notify(notification);
        }
    }
}

pub fn error_notification(error: &ServiceError) -> Notification {
    Notification::error(error.message.clone()).with_description(error.action.clone())
}

/// The notification for an application error; `None` for anything else.
pub fn application_notification(error: &StufError) -> Option<Notification> {
    error
        .action()
        .map(|action| Notification::error(error.to_string()).with_description(action))
}
