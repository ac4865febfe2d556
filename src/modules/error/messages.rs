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


//! User-facing error wording shared by the services and the state containers.

pub const TRY_AGAIN: &str = "Please try again later";
pub const CONTACT_SUPPORT: &str = "Please contact support if this problem persists";
pub const TRY_AGAIN_OR_CONTACT_SUPPORT: &str =
    "Please try again later or contact support if the problem persists";
pub const VERIFY_EXISTS: &str = "Please verify the resource exists";
pub const REQUEST_ACCESS: &str = "Contact an administrator to request access";
pub const CHECK_PERMISSIONS: &str = "Please check your permissions";
pub const REFRESH_PAGE: &str = "Please refresh the page and try again";
pub const CHECK_INPUT: &str = "Please verify your input and try again";

pub const NETWORK_ERROR: &str = "Network request failed";
pub const UNKNOWN_ERROR: &str = "An unexpected error occurred";

pub fn not_found(resource: &str) -> String {
    format!("{} not found", resource)
}

pub fn forbidden(resource: &str) -> String {
    format!("Access to {} is forbidden", resource)
}

pub fn fetch_failed(resource: &str, details: Option<&str>) -> String {
    match details {
        Some(details) => format!("Failed to fetch {}: {}", resource, details),
        None => format!("Failed to fetch {}", resource),
    }
}

pub fn validation_failed(operation: &str) -> String {
    format!("Validation failed for {}", operation)
}

pub fn operation_failed(operation: &str, details: Option<&str>) -> String {
    match details {
        Some(details) => format!("{} failed: {}", operation, details),
        None => format!("{} failed", operation),
    }
}

/// "1 file", "3 files".
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
