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


use crate::modules::context::{
    application_notification,
    download::DownloadSink,
    notify::{Notification, Notifier},
    Outcome,
};
use crate::modules::error::{
    messages::{self, plural, TRY_AGAIN_OR_CONTACT_SUPPORT},
    StufError, StufResult,
};
use crate::modules::files::{
    download_name,
    filters::FileFilters,
    selection::{DownloadTarget, TableSelection},
    service::{FileUpload, FilesService},
    File,
};
use crate::modules::state::{files::FilesState, store::Store, ListAction, Pagination};
use crate::modules::users::User;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Tally of a bulk download.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct DownloadSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl DownloadSummary {
    pub fn notification(&self) -> Option<Notification> {
        match (self.succeeded, self.failed) {
            (0, 0) => None,
            (succeeded, 0) => Some(Notification::success(format!(
                "Successfully downloaded {}",
                plural(succeeded, "file")
            ))),
            (0, failed) => Some(Notification::error(format!(
                "Failed to download all {}",
                plural(failed, "file")
            ))),
            (succeeded, failed) => Some(
                Notification::warning(format!("Downloaded {}", plural(succeeded, "file")))
                    .with_description(format!("{} failed to download", plural(failed, "file"))),
            ),
        }
    }
}

/// File listing state of the current session and the operations that change it.
pub struct FilesContext {
    service: FilesService,
    user: Option<Arc<User>>,
    store: Store<FilesState>,
    notifier: Arc<dyn Notifier>,
    sink: Arc<dyn DownloadSink>,
    // Bumped by every listing fetch; only the latest one may write its result.
    generation: AtomicU64,
}

impl FilesContext {
    pub fn new(
        service: FilesService,
        user: Option<Arc<User>>,
        notifier: Arc<dyn Notifier>,
        sink: Arc<dyn DownloadSink>,
    ) -> Self {
        Self {
            service,
            user,
            store: Store::new(),
            notifier,
            sink,
            generation: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> Arc<FilesState> {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<FilesState>> {
        self.store.subscribe()
    }

    pub fn user(&self) -> Option<&Arc<User>> {
        self.user.as_ref()
    }

    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn finish(&self, generation: u64, outcome: Outcome<File>) {
        if !self.is_current(generation) {
            debug!("Dropping stale files result (request {})", generation);
            return;
        }
        outcome.apply(&self.store, self.notifier.as_ref());
    }

    /// Shows an application error to the user and hands the error back.
    fn report(&self, error: StufError) -> StufError {
        if let Some(notification) = application_notification(&error) {
            self.notifier.notify(notification);
        }
        error
    }

    /// Loads one page of `collection`.
    ///
    /// Application errors end up in the state and as a notification. Other
    /// errors are returned. When several fetches overlap, only the most
    /// recently started one updates the state.
    pub async fn fetch_files(
        &self,
        collection: &str,
        page: u64,
        page_size: u64,
        filters: Option<&FileFilters>,
    ) -> StufResult<()> {
        let generation = self.begin();
        self.store.dispatch(ListAction::FetchStart);

        let outcome = match self
            .service
            .list_files(collection, page, page_size, filters)
            .await
        {
            Ok(listing) => Outcome {
                actions: vec![
                    ListAction::FetchSuccess(listing.files),
                    ListAction::SetPagination(Pagination {
                        total_pages: listing.total_pages,
                        current_page: listing.current_page,
                        total_count: listing.total_count,
                    }),
                ],
                notifications: Vec::new(),
            },
            Err(error) => match Outcome::from_error(error) {
                Ok(outcome) => outcome,
                Err(error) => {
                    if self.is_current(generation) {
                        self.store.dispatch(ListAction::FetchError(error.to_string()));
                    }
                    return Err(error);
                }
            },
        };

        self.finish(generation, outcome);
        Ok(())
    }

    /// Loads the newest files across the user's collections. Without a user
    /// the state is reset.
    pub async fn fetch_recent_files(&self, limit: usize) -> StufResult<()> {
        let generation = self.begin();
        let Some(user) = self.user.clone() else {
            self.store.dispatch(ListAction::Reset);
            return Ok(());
        };

        self.store.dispatch(ListAction::FetchStart);
        let result = self.service.get_recent_files(&user, limit).await;
        let outcome = Outcome::from_partial(
            result.files,
            &result.errors,
            |failed| format!("Failed to fetch files from {}", plural(failed, "collection")),
            "Failed to fetch recent files",
        );
        self.finish(generation, outcome);
        Ok(())
    }

    pub async fn upload_file(
        &self,
        upload: FileUpload,
        collection: &str,
        metadata: &Map<String, Value>,
    ) -> StufResult<()> {
        self.service
            .upload_file(upload, collection, metadata)
            .await
            .map_err(|e| self.report(e))?;
        self.notifier
            .notify(Notification::success("File uploaded successfully"));
        Ok(())
    }

    pub async fn delete_file(&self, collection: &str, object_name: &str) -> StufResult<()> {
        self.service
            .delete_file(collection, object_name)
            .await
            .map_err(|e| self.report(e))?;
        self.notifier
            .notify(Notification::success("File deleted successfully"));
        Ok(())
    }

    pub async fn archive_file(&self, collection: &str, object_name: &str) -> StufResult<()> {
        self.service
            .archive_file(collection, object_name)
            .await
            .map_err(|e| self.report(e))?;
        self.notifier
            .notify(Notification::success("File archived successfully"));
        Ok(())
    }

    /// Fetches one file and hands it to the download sink under the last
    /// segment of its object name.
    pub async fn download_file(&self, collection: &str, object_name: &str) -> StufResult<()> {
        let body = self
            .service
            .download_file(collection, object_name)
            .await
            .map_err(|e| self.report(e))?;

        let filename = download_name(object_name);
        self.sink.save(filename, body).await.map_err(|e| {
            let code = e.code();
            self.report(StufError::application(
                messages::operation_failed(
                    &format!("Saving \"{}\"", filename),
                    Some(&e.to_string()),
                ),
                TRY_AGAIN_OR_CONTACT_SUPPORT,
                code,
            ))
        })
    }

    /// Downloads `targets` one after another, in order. A failed download
    /// does not stop the rest; a single summary is shown at the end.
    pub async fn download_files(&self, targets: &[DownloadTarget]) -> DownloadSummary {
        let mut summary = DownloadSummary::default();
        for target in targets {
            match self
                .download_file(&target.collection, &target.object_name)
                .await
            {
                Ok(()) => summary.succeeded += 1,
                // Already reported by download_file.
                Err(_) => summary.failed += 1,
            }
        }

        if let Some(notification) = summary.notification() {
            self.notifier.notify(notification);
        }
        summary
    }

    /// Downloads the selected rows of `files`.
    pub async fn download_selected(
        &self,
        selection: &TableSelection,
        files: &[File],
    ) -> Option<DownloadSummary> {
        if selection.is_empty() {
            self.notifier.notify(
                Notification::error("No files selected")
                    .with_description("Please select files to download"),
            );
            return None;
        }
        Some(self.download_files(&selection.selected_downloads(files)).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::context::download::FsDownloadSink;
    use crate::modules::context::notify::{ChannelNotifier, NotificationLevel};
    use crate::modules::error::{code::ErrorCode, messages::VERIFY_EXISTS};
    use crate::modules::testing::{file, user, MockApiClient, MockReply, RecordingSink};
    use bytes::Bytes;
    use http::{Method, StatusCode};
    use tokio::sync::mpsc::UnboundedReceiver;

    struct Harness {
        client: Arc<MockApiClient>,
        sink: Arc<RecordingSink>,
        notifications: UnboundedReceiver<Notification>,
        context: Arc<FilesContext>,
    }

    impl Harness {
        fn new(user: Option<User>) -> Self {
            let client = Arc::new(MockApiClient::new());
            let sink = Arc::new(RecordingSink::default());
            let (notifier, notifications) = ChannelNotifier::channel();
            let context = Arc::new(FilesContext::new(
                FilesService::new(client.clone()),
                user.map(Arc::new),
                Arc::new(notifier),
                sink.clone(),
            ));
            Self {
                client,
                sink,
                notifications,
                context,
            }
        }

        fn drain(&mut self) -> Vec<Notification> {
            let mut seen = Vec::new();
            while let Ok(n) = self.notifications.try_recv() {
                seen.push(n);
            }
            seen
        }
    }

    #[tokio::test]
    async fn fetch_files_stores_page_and_pagination() {
        let mut h = Harness::new(None);
        let items: Vec<File> = (0..3).map(|i| file("c", "a", &i.to_string(), "")).collect();
        h.client.on(Method::GET, "/api/files/c", MockReply::files(&items));

        h.context.fetch_files("c", 2, 2, None).await.unwrap();
        let state = h.context.state();
        assert_eq!(state.files, vec![items[2].clone()]);
        assert_eq!((state.total_pages, state.current_page, state.total_count), (2, 2, 3));
        assert!(!state.loading);
        assert!(h.drain().is_empty());
    }

    #[tokio::test]
    async fn fetch_files_keeps_last_list_on_application_error() {
        let mut h = Harness::new(None);
        h.client.on(
            Method::GET,
            "/api/files/c",
            MockReply::files(&[file("c", "a", "1", "")]),
        );
        h.context.fetch_files("c", 1, 10, None).await.unwrap();

        h.context.fetch_files("gone", 1, 10, None).await.unwrap();
        let state = h.context.state();
        assert_eq!(state.files.len(), 1);
        assert_eq!(state.error.as_deref(), Some("Collection \"gone\" not found"));
        assert!(!state.loading);

        let notes = h.drain();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Error);
        assert_eq!(notes[0].description.as_deref(), Some(VERIFY_EXISTS));
    }

    #[tokio::test]
    async fn fetch_files_returns_unexpected_errors() {
        let mut h = Harness::new(None);
        let error = h.context.fetch_files("c", 0, 10, None).await.unwrap_err();
        assert_eq!(error.code(), ErrorCode::InvalidParameter);
        assert!(!h.context.state().loading);
        assert!(h.drain().is_empty());
    }

    #[tokio::test]
    async fn last_issued_fetch_wins() {
        let h = Harness::new(None);
        h.client.on(
            Method::GET,
            "/api/files/slow",
            MockReply::files(&[file("slow", "a", "old", "")]),
        );
        h.client.on(
            Method::GET,
            "/api/files/fast",
            MockReply::files(&[file("fast", "a", "new", "")]),
        );
        let release_slow = h.client.gate(Method::GET, "/api/files/slow");

        let context = h.context.clone();
        let slow = tokio::spawn(async move { context.fetch_files("slow", 1, 10, None).await });
        h.client.wait_for_calls(1).await;

        h.context.fetch_files("fast", 1, 10, None).await.unwrap();
        assert_eq!(h.context.state().files[0].original_filename, "new");

        release_slow.send(()).unwrap();
        slow.await.unwrap().unwrap();
        let state = h.context.state();
        assert_eq!(state.files[0].original_filename, "new");
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn recent_files_without_user_resets() {
        let h = Harness::new(None);
        h.context.fetch_recent_files(10).await.unwrap();
        assert_eq!(*h.context.state(), FilesState::default());
        assert_eq!(h.client.call_count(), 0);
    }

    #[tokio::test]
    async fn recent_files_report_partial_failures() {
        let mut h = Harness::new(Some(user("alice", &["open", "closed"], &["read"])));
        h.client.on(
            Method::GET,
            "/api/files/open",
            MockReply::files(&[file("open", "a", "1", "2025-01-01T00:00:00Z")]),
        );
        h.client.on(Method::GET, "/api/files/closed", StatusCode::FORBIDDEN);

        h.context.fetch_recent_files(10).await.unwrap();
        let state = h.context.state();
        assert_eq!(state.files.len(), 1);
        assert_eq!(
            state.error.as_deref(),
            Some("Failed to fetch files from 1 collection")
        );

        let notes = h.drain();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].message, "Access to collection \"closed\" is forbidden");
    }

    #[tokio::test]
    async fn recent_files_total_failure() {
        let mut h = Harness::new(Some(user("alice", &["a", "b"], &["read"])));
        h.client.on(Method::GET, "/api/files/a", StatusCode::FORBIDDEN);
        h.client.on(Method::GET, "/api/files/b", StatusCode::INTERNAL_SERVER_ERROR);

        h.context.fetch_recent_files(10).await.unwrap();
        assert_eq!(
            h.context.state().error.as_deref(),
            Some("Failed to fetch recent files")
        );
        assert_eq!(h.drain().len(), 2);
    }

    #[tokio::test]
    async fn mutations_notify() {
        let mut h = Harness::new(None);
        h.client.on(Method::POST, "/api/files/c", MockReply::Json(serde_json::json!({})));
        h.client.on(Method::DELETE, "/api/files/c/x", MockReply::bytes(b""));
        h.client.on(Method::PATCH, "/api/files/c/x", MockReply::Json(serde_json::json!({})));
        h.client.on(Method::DELETE, "/api/files/c/locked", StatusCode::FORBIDDEN);

        let upload = FileUpload {
            filename: "x".into(),
            content_type: "text/plain".into(),
            bytes: Bytes::from_static(b"x"),
        };
        h.context.upload_file(upload, "c", &Map::new()).await.unwrap();
        h.context.delete_file("c", "x").await.unwrap();
        h.context.archive_file("c", "x").await.unwrap();
        assert!(h.context.delete_file("c", "locked").await.is_err());

        let messages: Vec<_> = h.drain().into_iter().map(|n| n.message).collect();
        assert_eq!(
            messages,
            vec![
                "File uploaded successfully",
                "File deleted successfully",
                "File archived successfully",
                "Access to file \"locked\" is forbidden",
            ]
        );
    }

    #[tokio::test]
    async fn download_files_runs_in_order_and_summarizes() {
        let mut h = Harness::new(None);
        h.client.on(Method::GET, "/api/files/c/c/o/a", MockReply::bytes(b"A"));
        h.client.on(Method::GET, "/api/files/c/c/o/c", MockReply::bytes(b"C"));
        let targets: Vec<DownloadTarget> = ["a", "b", "c"]
            .iter()
            .map(|name| DownloadTarget::from(&file("c", "o", name, "")))
            .collect();

        let summary = h.context.download_files(&targets).await;
        assert_eq!(summary, DownloadSummary { succeeded: 2, failed: 1 });
        assert_eq!(
            h.client.endpoints(),
            vec!["/api/files/c/c/o/a", "/api/files/c/c/o/b", "/api/files/c/c/o/c"]
        );
        assert_eq!(
            h.sink.saved(),
            vec![
                ("a".to_string(), Bytes::from_static(b"A")),
                ("c".to_string(), Bytes::from_static(b"C"))
            ]
        );

        let notes = h.drain();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].message, "File \"c/o/b\" not found");
        assert_eq!(notes[1].level, NotificationLevel::Warning);
        assert_eq!(notes[1].message, "Downloaded 2 files");
        assert_eq!(notes[1].description.as_deref(), Some("1 file failed to download"));
    }

    #[tokio::test]
    async fn download_summaries() {
        assert_eq!(DownloadSummary::default().notification(), None);
        assert_eq!(
            DownloadSummary { succeeded: 1, failed: 0 }.notification().unwrap().message,
            "Successfully downloaded 1 file"
        );
        let all_failed = DownloadSummary { succeeded: 0, failed: 2 }.notification().unwrap();
        assert_eq!(all_failed.level, NotificationLevel::Error);
        assert_eq!(all_failed.message, "Failed to download all 2 files");

        let mut h = Harness::new(None);
        assert_eq!(h.context.download_files(&[]).await, DownloadSummary::default());
        assert!(h.drain().is_empty());
        assert_eq!(h.client.call_count(), 0);
    }

    #[tokio::test]
    async fn sink_failures_keep_the_io_detail() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();

        let client = Arc::new(MockApiClient::new());
        client.on(Method::GET, "/api/files/c/c/o/a.txt", MockReply::bytes(b"A"));
        let (notifier, mut notifications) = ChannelNotifier::channel();
        let context = FilesContext::new(
            FilesService::new(client.clone()),
            None,
            Arc::new(notifier),
            Arc::new(FsDownloadSink::new(blocker.join("downloads"))),
        );

        let error = context.download_file("c", "c/o/a.txt").await.unwrap_err();
        let message = error.to_string();
        assert!(message.starts_with("Saving \"a.txt\" failed: "), "{}", message);
        assert!(!message.ends_with("IoError"), "{}", message);
        assert!(message.len() > "Saving \"a.txt\" failed: ".len());

        let notification = notifications.try_recv().unwrap();
        assert_eq!(notification.message, message);
    }

    #[tokio::test]
    async fn download_selected_needs_a_selection() {
        let mut h = Harness::new(None);
        let files = vec![file("c", "o", "a", "")];
        assert!(h
            .context
            .download_selected(&TableSelection::new(), &files)
            .await
            .is_none());
        assert_eq!(h.drain()[0].message, "No files selected");

        h.client.on(Method::GET, "/api/files/c/c/o/a", MockReply::bytes(b"A"));
        let mut selection = TableSelection::new();
        selection.toggle_item(&files[0].object_name);
        let summary = h.context.download_selected(&selection, &files).await.unwrap();
        assert_eq!(summary.succeeded, 1);
    }
}
