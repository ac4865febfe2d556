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
use crate::modules::users::{permissions::Permission, User};
use serde::Serialize;
use std::sync::Arc;

/// What the current user may do with one file.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePermissions {
    pub can_read: bool,
    pub can_write: bool,
    pub can_delete: bool,
    pub can_download: bool,
    pub can_archive: bool,
    pub can_view_history: bool,
    pub is_own_file: bool,
}

impl FilePermissions {
    /// Strongest grant on the file's collection decides:
    ///
    /// | grant    | read | write | delete | download  | archive | history |
    /// |----------|------|-------|--------|-----------|---------|---------|
    /// | delete   | yes  | yes   | yes    | yes       | yes     | yes     |
    /// | write    | yes  | yes   | no     | own files | no      | no      |
    /// | read     | yes  | no    | no     | yes       | no      | no      |
    /// | none     | no   | no    | no     | no        | no      | no      |
    ///
    /// Ownership is an exact, case-sensitive match of owner and username.
    pub fn derive(user: Option<&User>, file: &File) -> Self {
        let Some(user) = user else {
            return Self::default();
        };

        let is_own_file = file.owner == user.username;
        let has = |permission: &str| user.has_collection_permission(&file.collection, permission);

        if has(Permission::DELETE) {
            return Self {
                can_read: true,
                can_write: true,
                can_delete: true,
                can_download: true,
                can_archive: true,
                can_view_history: true,
                is_own_file,
            };
        }
        if has(Permission::WRITE) {
            return Self {
                can_read: true,
                can_write: true,
                can_download: is_own_file,
                is_own_file,
                ..Self::default()
            };
        }
        if has(Permission::READ) {
            return Self {
                can_read: true,
                can_download: true,
                is_own_file,
                ..Self::default()
            };
        }
        Self {
            is_own_file,
            ..Self::default()
        }
    }
}

/// Remembers the last derivation and reuses it while the same user and file
/// instances are passed in.
#[derive(Default)]
pub struct PermissionCache {
    last: Option<(Option<Arc<User>>, Arc<File>, FilePermissions)>,
    computed: usize,
}

impl PermissionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, user: Option<&Arc<User>>, file: &Arc<File>) -> FilePermissions {
        if let Some((cached_user, cached_file, permissions)) = &self.last {
            let same_user = match (cached_user, user) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            };
            if same_user && Arc::ptr_eq(cached_file, file) {
                return *permissions;
            }
        }

        let permissions = FilePermissions::derive(user.map(Arc::as_ref), file);
        self.last = Some((user.cloned(), file.clone(), permissions));
        self.computed += 1;
        permissions
    }

    /// How many times the permissions were actually derived.
    pub fn computed(&self) -> usize {
        self.computed
    }
}
