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


use std::collections::HashSet;
use std::sync::LazyLock;

/// Permission tokens granted per collection in the access token's
/// `collections` claim.
pub struct Permission;

impl Permission {
    pub const READ: &'static str = "read";
    pub const WRITE: &'static str = "write";
    pub const DELETE: &'static str = "delete";
}

pub static VALID_PERMISSION_SET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [Permission::READ, Permission::WRITE, Permission::DELETE]
        .into_iter()
        .collect()
});
