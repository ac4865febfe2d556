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


use crate::modules::{
    error::StufResult,
    users::{
        claims::AccessTokenClaims,
        permissions::{Permission, VALID_PERMISSION_SET},
    },
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

pub mod claims;
pub mod permissions;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    Admin,
    TrustArchitect,
    ProjectParticipant,
}

/// The authenticated user, built once per session from the access token.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub name: String,
    pub email: String,
    pub roles: Vec<UserRole>,
    /// Scoped access: collection name -> granted permission tokens.
    /// Example:
    /// { "research": {"read"} }          -> may list and download
    /// { "shared": {"read", "delete"} }  -> full control
    pub collections: BTreeMap<String, BTreeSet<String>>,
}

impl User {
    pub fn from_claims(claims: AccessTokenClaims) -> Self {
        let username = claims.preferred_username.unwrap_or_default();

        let name = match (&claims.given_name, &claims.family_name) {
            (Some(given), Some(family)) if !given.is_empty() && !family.is_empty() => {
                format!("{} {}", given, family)
            }
            _ if !username.is_empty() => username.clone(),
            _ => "Unknown User".to_string(),
        };

        let collections = claims
            .collections
            .unwrap_or_default()
            .into_iter()
            .map(|(collection, grants)| {
                let grants: BTreeSet<String> = grants
                    .into_iter()
                    .filter(|grant| {
                        let known = VALID_PERMISSION_SET.contains(grant.as_str());
                        if !known {
                            warn!(
                                "Ignoring unknown permission '{}' on collection '{}'",
                                grant, collection
                            );
                        }
                        known
                    })
                    .collect();
                (collection, grants)
            })
            .collect();

        User {
            username,
            name,
            email: claims.email.unwrap_or_default(),
            // Authorization is collection based; roles are not carried in the token.
            roles: Vec::new(),
            collections,
        }
    }

    pub fn from_access_token(token: &str) -> StufResult<Self> {
        Ok(Self::from_claims(AccessTokenClaims::decode(token)?))
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(&UserRole::Admin)
    }

    /// Permission tokens granted on `collection`; `None` without a grant.
    pub fn collection_permissions(&self, collection: &str) -> Option<&BTreeSet<String>> {
        self.collections.get(collection)
    }

    pub fn has_collection_permission(&self, collection: &str, permission: &str) -> bool {
        self.collection_permissions(collection)
            .is_some_and(|grants| grants.contains(permission))
    }

    pub fn can_upload_to(&self, collection: &str) -> bool {
        self.has_collection_permission(collection, Permission::WRITE)
            || self.has_collection_permission(collection, Permission::DELETE)
    }

    pub fn collection_names(&self) -> Vec<String> {
        self.collections.keys().cloned().collect()
    }
}
