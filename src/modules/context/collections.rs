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


use crate::modules::collections::service::CollectionsService;
use crate::modules::context::{notify::Notifier, Outcome};
use crate::modules::error::{messages::plural, StufResult};
use crate::modules::state::{collections::CollectionsState, store::Store, ListAction};
use crate::modules::users::User;
use std::sync::Arc;
use tokio::sync::watch;

pub struct CollectionsContext {
    service: CollectionsService,
    user: Option<Arc<User>>,
    store: Store<CollectionsState>,
    notifier: Arc<dyn Notifier>,
}

impl CollectionsContext {
    pub fn new(
        service: CollectionsService,
        user: Option<Arc<User>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            service,
            user,
            store: Store::new(),
            notifier,
        }
    }

    pub fn state(&self) -> Arc<CollectionsState> {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<CollectionsState>> {
        self.store.subscribe()
    }

    /// Loads the user's collections with their file counts. Without a user
    /// the state is reset.
    pub async fn fetch_collections(&self) -> StufResult<()> {
        let Some(user) = self.user.clone() else {
            self.store.dispatch(ListAction::Reset);
            return Ok(());
        };

        self.store.dispatch(ListAction::FetchStart);
        let result = self.service.get_collections(&user).await;
        Outcome::from_partial(
            result.collections,
            &result.errors,
            |failed| format!("Failed to fetch {}", plural(failed, "collection")),
            "Failed to fetch collections",
        )
        .apply(&self.store, self.notifier.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::collections::Collection;
    use crate::modules::context::notify::ChannelNotifier;
    use crate::modules::testing::{file, user, MockApiClient, MockReply};
    use http::{Method, StatusCode};

    fn context(
        client: &Arc<MockApiClient>,
        user: Option<User>,
    ) -> (
        CollectionsContext,
        tokio::sync::mpsc::UnboundedReceiver<crate::modules::context::notify::Notification>,
    ) {
        let (notifier, rx) = ChannelNotifier::channel();
        let context = CollectionsContext::new(
            CollectionsService::new(client.clone()),
            user.map(Arc::new),
            Arc::new(notifier),
        );
        (context, rx)
    }

    #[tokio::test]
    async fn loads_collections() {
        let client = Arc::new(MockApiClient::new());
        client.on(
            Method::GET,
            "/api/files/a",
            MockReply::files(&[file("a", "x", "1", "")]),
        );
        let (context, mut rx) = context(&client, Some(user("alice", &["a"], &["read"])));

        context.fetch_collections().await.unwrap();
        let state = context.state();
        assert_eq!(state.collections, vec![Collection::new("a", Some(1))]);
        assert_eq!(state.error, None);
        assert!(!state.loading);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn failed_collections_are_a_partial_success() {
        let client = Arc::new(MockApiClient::new());
        client.on(Method::GET, "/api/files/a", StatusCode::FORBIDDEN);
        client.on(Method::GET, "/api/files/b", StatusCode::FORBIDDEN);
        let (context, mut rx) = context(&client, Some(user("alice", &["a", "b"], &["read"])));

        context.fetch_collections().await.unwrap();
        let state = context.state();
        // Failed collections are still listed, so this is never a total failure.
        assert_eq!(state.collections.len(), 2);
        assert_eq!(state.error.as_deref(), Some("Failed to fetch 2 collections"));
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn no_user_resets() {
        let client = Arc::new(MockApiClient::new());
        let (context, _rx) = context(&client, None);
        context.fetch_collections().await.unwrap();
        assert_eq!(*context.state(), CollectionsState::default());
        assert_eq!(client.call_count(), 0);
    }
}
