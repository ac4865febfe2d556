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
    api::{client::HttpApiClient, ApiClient, AuthContext},
    collections::service::CollectionsService,
    context::{
        collections::CollectionsContext, download::DownloadSink, files::FilesContext,
        notify::Notifier,
    },
    files::service::FilesService,
    settings::config::StufConfig,
    users::{claims::AccessTokenClaims, User},
};
use crate::modules::error::StufResult;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Composition root of a session: one API client, the user derived from the
/// access token, and the state containers built on top of them.
pub struct StufClient {
    api: Arc<dyn ApiClient>,
    user: Option<Arc<User>>,
    files: FilesContext,
    collections: CollectionsContext,
}

impl StufClient {
    /// Connects to the configured backend. Without a token the session is
    /// anonymous and user-scoped fetches reset their state.
    pub fn connect(
        config: &StufConfig,
        access_token: Option<&str>,
        notifier: Arc<dyn Notifier>,
        sink: Arc<dyn DownloadSink>,
    ) -> StufResult<Self> {
        let api: Arc<dyn ApiClient> = Arc::new(HttpApiClient::new(config.api_base_url.as_str())?);
        let user = match access_token.filter(|t| !t.is_empty()) {
            Some(token) => {
                let claims = AccessTokenClaims::decode(token)?;
                if claims.is_expired(Utc::now()) {
                    warn!("Access token expired; the backend will likely reject it");
                }
                api.set_auth(AuthContext::bearer(token));
                let user = User::from_claims(claims);
                info!(
                    "Signed in as '{}'{} with access to {} collection(s) (issuer {})",
                    user.username,
                    if user.is_admin() { " (admin)" } else { "" },
                    user.collections.len(),
                    config.issuer_url()
                );
                Some(user)
            }
            None => None,
        };
        Ok(Self::with_client(api, user, notifier, sink))
    }

    pub fn with_client(
        api: Arc<dyn ApiClient>,
        user: Option<User>,
        notifier: Arc<dyn Notifier>,
        sink: Arc<dyn DownloadSink>,
    ) -> Self {
        let user = user.map(Arc::new);
        let files = FilesContext::new(
            FilesService::new(api.clone()),
            user.clone(),
            notifier.clone(),
            sink,
        );
        let collections =
            CollectionsContext::new(CollectionsService::new(api.clone()), user.clone(), notifier);
        Self {
            api,
            user,
            files,
            collections,
        }
    }

    pub fn api(&self) -> &dyn ApiClient {
        self.api.as_ref()
    }

    pub fn api_handle(&self) -> Arc<dyn ApiClient> {
        self.api.clone()
    }

    pub fn user(&self) -> Option<&Arc<User>> {
        self.user.as_ref()
    }

    pub fn files(&self) -> &FilesContext {
        &self.files
    }

    pub fn collections(&self) -> &CollectionsContext {
        &self.collections
    }
}
