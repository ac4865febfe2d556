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


use crate::modules::state::{reduce, ListAction, ListState};
use std::sync::Arc;
use tokio::sync::watch;

/// Single-writer cell around a [`ListState`].
///
/// [`Store::dispatch`] is the only way to change the state; readers take
/// snapshots or subscribe for changes. Actions that leave the state as is do
/// not wake subscribers.
pub struct Store<S: ListState> {
    tx: watch::Sender<Arc<S>>,
}

impl<S: ListState> Default for Store<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ListState> Store<S> {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(S::default()));
        Self { tx }
    }

    pub fn dispatch(&self, action: ListAction<S::Item>) {
        self.tx.send_if_modified(|state| {
            let next = reduce(state, action);
            if Arc::ptr_eq(&next, state) {
                return false;
            }
            *state = next;
            true
        });
    }

    pub fn snapshot(&self) -> Arc<S> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<S>> {
        self.tx.subscribe()
    }
}
