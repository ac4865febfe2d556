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


use crate::modules::api::{
    request::{file_endpoint, files_endpoint, FilePart, MultipartForm, RequestOptions},
    ApiClient, RawBody,
};
use crate::modules::error::{
    code::ErrorCode,
    messages::{self, CHECK_INPUT, REQUEST_ACCESS, TRY_AGAIN_OR_CONTACT_SUPPORT, VERIFY_EXISTS},
    ServiceError, StufError, StufResult,
};
use crate::modules::files::{filters::FileFilters, File};
use crate::modules::users::User;
use crate::raise_error;
use bytes::Bytes;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::cmp::Reverse;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Page size used when a caller wants a whole collection in one page.
pub const ALL_FILES_PAGE_SIZE: u64 = 9999;

/// A file to upload: its name, type and content.
#[derive(Clone, Debug, PartialEq)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl FileUpload {
    pub async fn from_path(path: &Path) -> StufResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                raise_error!(
                    format!("{:?} does not name a file", path),
                    ErrorCode::InvalidParameter
                )
            })?;
        Ok(Self {
            content_type: mime_guess::from_path(path)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
            filename,
            bytes: Bytes::from(bytes),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesResponse {
    pub files: Vec<File>,
    pub total_count: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub page_size: u64,
}

/// Files merged across collections, plus one entry per collection that
/// could not be read.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RecentFilesResponse {
    pub files: Vec<File>,
    pub errors: Vec<ServiceError>,
}

#[derive(Default, Deserialize)]
struct FileListing {
    #[serde(default)]
    files: Vec<File>,
}

/// `YYYYMMDD` becomes midnight UTC in ISO-8601; anything else is returned as is.
pub fn normalize_upload_time(upload_time: &str) -> String {
    if upload_time.len() == 8 && upload_time.bytes().all(|b| b.is_ascii_digit()) {
        return format!(
            "{}-{}-{}T00:00:00Z",
            &upload_time[0..4],
            &upload_time[4..6],
            &upload_time[6..8]
        );
    }
    upload_time.to_string()
}

/// How a failed call is described to the user.
struct Failure {
    not_found: Option<String>,
    forbidden: String,
    validation: Option<String>,
}

impl Failure {
    fn into_error(self, error: StufError, fallback: impl FnOnce(&str) -> String) -> StufError {
        let code = error.code();
        match code {
            ErrorCode::ResourceNotFound if self.not_found.is_some() => StufError::application(
                self.not_found.unwrap_or_default(),
                VERIFY_EXISTS,
                code,
            ),
            ErrorCode::Forbidden => StufError::application(self.forbidden, REQUEST_ACCESS, code),
            ErrorCode::ValidationFailed if self.validation.is_some() => StufError::application(
                self.validation.unwrap_or_default(),
                CHECK_INPUT,
                code,
            ),
            _ => StufError::application(
                fallback(&error.to_string()),
                TRY_AGAIN_OR_CONTACT_SUPPORT,
                code,
            ),
        }
    }

    fn collection(collection: &str) -> Self {
        Self {
            not_found: Some(messages::not_found(&format!("Collection \"{}\"", collection))),
            forbidden: messages::forbidden(&format!("collection \"{}\"", collection)),
            validation: None,
        }
    }

    fn file(object_name: &str) -> Self {
        Self {
            not_found: Some(messages::not_found(&format!("File \"{}\"", object_name))),
            forbidden: messages::forbidden(&format!("file \"{}\"", object_name)),
            validation: None,
        }
    }
}

/// File operations against the backend. Listing is paginated and filtered
/// client side over a full fetch of the collection.
#[derive(Clone)]
pub struct FilesService {
    client: Arc<dyn ApiClient>,
}

impl FilesService {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub async fn upload_file(
        &self,
        upload: FileUpload,
        collection: &str,
        metadata: &Map<String, Value>,
    ) -> StufResult<()> {
        let form = MultipartForm::new()
            .file(FilePart {
                field: "file".into(),
                filename: upload.filename,
                content_type: upload.content_type,
                bytes: upload.bytes,
            })
            .text("metadata", Value::Object(metadata.clone()).to_string());

        self.client
            .request(&files_endpoint(collection), RequestOptions::post_multipart(form))
            .await
            .map_err(|e| {
                Failure {
                    not_found: None,
                    forbidden: messages::forbidden(&format!("collection \"{}\"", collection)),
                    validation: Some(messages::validation_failed("file upload")),
                }
                .into_error(e, |details| messages::operation_failed("File upload", Some(details)))
            })?;
        Ok(())
    }

    /// One page of `collection`. Pages past the end come back empty; the page
    /// number is not clamped.
    pub async fn list_files(
        &self,
        collection: &str,
        page: u64,
        page_size: u64,
        filters: Option<&FileFilters>,
    ) -> StufResult<ListFilesResponse> {
        if page == 0 || page_size == 0 {
            return Err(raise_error!(
                format!(
                    "page and page size start at 1 (got page {}, page size {})",
                    page, page_size
                ),
                ErrorCode::InvalidParameter
            ));
        }

        let files = self.fetch_all(collection).await.map_err(|e| {
            Failure::collection(collection).into_error(e, |details| {
                messages::fetch_failed(&format!("files from \"{}\"", collection), Some(details))
            })
        })?;

        let files = match filters {
            Some(filters) => filters.apply(files),
            None => files,
        };

        let total_count = files.len() as u64;
        let total_pages = total_count.div_ceil(page_size);
        let start = (page - 1).saturating_mul(page_size);
        let files = files
            .into_iter()
            .skip(usize::try_from(start).unwrap_or(usize::MAX))
            .take(usize::try_from(page_size).unwrap_or(usize::MAX))
            .collect();

        Ok(ListFilesResponse {
            files,
            total_count,
            total_pages,
            current_page: page,
            page_size,
        })
    }

    async fn fetch_all(&self, collection: &str) -> StufResult<Vec<File>> {
        let body = self
            .client
            .request(&files_endpoint(collection), RequestOptions::get())
            .await?
            .into_json()
            .ok_or_else(|| {
                raise_error!(
                    "Expected a JSON file listing".into(),
                    ErrorCode::HttpResponseError
                )
            })?;
        let listing: FileListing = serde_json::from_value(body).map_err(|e| {
            raise_error!(
                format!("Malformed file listing: {}", e),
                ErrorCode::HttpResponseError
            )
        })?;

        Ok(listing
            .files
            .into_iter()
            .map(|mut file| {
                file.upload_time = normalize_upload_time(&file.upload_time);
                file
            })
            .collect())
    }

    pub async fn download_file(&self, collection: &str, object_name: &str) -> StufResult<RawBody> {
        self.client
            .request(&file_endpoint(collection, object_name), RequestOptions::get())
            .await
            .map(|response| response.into_raw())
            .map_err(|e| {
                Failure::file(object_name).into_error(e, |details| {
                    messages::fetch_failed(&format!("file \"{}\"", object_name), Some(details))
                })
            })
    }

    pub async fn delete_file(&self, collection: &str, object_name: &str) -> StufResult<()> {
        self.client
            .request(&file_endpoint(collection, object_name), RequestOptions::delete())
            .await
            .map_err(|e| {
                Failure::file(object_name).into_error(e, |details| {
                    messages::operation_failed("File deletion", Some(details))
                })
            })?;
        Ok(())
    }

    /// Flags the file as archived.
    pub async fn archive_file(&self, collection: &str, object_name: &str) -> StufResult<()> {
        self.client
            .request(
                &file_endpoint(collection, object_name),
                RequestOptions::patch_json(json!({ "archived": true })),
            )
            .await
            .map_err(|e| {
                Failure::file(object_name).into_error(e, |details| {
                    messages::operation_failed("File archival", Some(details))
                })
            })?;
        Ok(())
    }

    /// Newest files across every collection the user holds a grant on.
    ///
    /// All collections are requested at once. A failing collection adds an
    /// entry to `errors` and does not affect the others.
    pub async fn get_recent_files(&self, user: &User, limit: usize) -> RecentFilesResponse {
        let collections = user.collection_names();
        let results = join_all(
            collections
                .iter()
                .map(|c| self.list_files(c, 1, ALL_FILES_PAGE_SIZE, None)),
        )
        .await;

        let mut files = Vec::new();
        let mut errors = Vec::new();
        for (collection, result) in collections.iter().zip(results) {
            match result {
                Ok(listing) => files.extend(listing.files),
                Err(e) => {
                    warn!("Recent files: collection '{}' failed: {}", collection, e);
                    errors.push(e.to_service_error(&format!("files from \"{}\"", collection)));
                }
            }
        }

        // Stable; files without a readable time go last.
        files.sort_by_key(|file| Reverse(file.uploaded_at()));
        files.truncate(limit);
        debug!(
            "Recent files: {} file(s), {} failed collection(s)",
            files.len(),
            errors.len()
        );

        RecentFilesResponse { files, errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::api::request::RequestBody;
    use crate::modules::testing::{file, MockApiClient, MockReply};
    use http::{Method, StatusCode};
    use std::collections::{BTreeMap, BTreeSet};

    fn service(client: &Arc<MockApiClient>) -> FilesService {
        FilesService::new(client.clone())
    }

    fn user_with(collections: &[&str]) -> User {
        User {
            username: "alice".into(),
            collections: collections
                .iter()
                .map(|c| (c.to_string(), BTreeSet::from(["read".to_string()])))
                .collect::<BTreeMap<_, _>>(),
            ..Default::default()
        }
    }

    #[test]
    fn normalizes_compact_dates() {
        assert_eq!(normalize_upload_time("20251020"), "2025-10-20T00:00:00Z");
        assert_eq!(
            normalize_upload_time("2025-10-20T08:30:00Z"),
            "2025-10-20T08:30:00Z"
        );
        assert_eq!(normalize_upload_time("2025102"), "2025102");
        assert_eq!(normalize_upload_time("2025102a"), "2025102a");
    }

    #[tokio::test]
    async fn lists_first_page_of_two() {
        let client = Arc::new(MockApiClient::new());
        let items = [
            file("test", "alice", "0", "2025-01-01T00:00:00Z"),
            file("test", "alice", "1", "2025-01-02T00:00:00Z"),
        ];
        client.on(Method::GET, "/api/files/test", MockReply::files(&items));

        let result = service(&client).list_files("test", 1, 1, None).await.unwrap();
        assert_eq!(result.files, vec![items[0].clone()]);
        assert_eq!(result.total_pages, 2);
        assert_eq!(result.total_count, 2);
        assert_eq!(result.current_page, 1);
        assert_eq!(result.page_size, 1);
    }

    #[tokio::test]
    async fn pages_reconstruct_the_filtered_listing() {
        let client = Arc::new(MockApiClient::new());
        let items: Vec<File> = (0..7)
            .map(|i| {
                let owner = if i % 3 == 0 { "bob" } else { "alice" };
                file("c", owner, &format!("f{}", i), "2025-01-01T00:00:00Z")
            })
            .collect();
        client.on(Method::GET, "/api/files/c", MockReply::files(&items));
        let filters = FileFilters {
            uploaders: vec!["alice".into()],
            ..Default::default()
        };
        let expected: Vec<String> = filters
            .apply(items.clone())
            .into_iter()
            .map(|f| f.object_name)
            .collect();

        let service = service(&client);
        for page_size in 1..=8u64 {
            let first = service.list_files("c", 1, page_size, Some(&filters)).await.unwrap();
            let mut seen = first.files.iter().map(|f| f.object_name.clone()).collect::<Vec<_>>();
            for page in 2..=first.total_pages {
                let next = service
                    .list_files("c", page, page_size, Some(&filters))
                    .await
                    .unwrap();
                seen.extend(next.files.into_iter().map(|f| f.object_name));
            }
            assert_eq!(seen, expected, "page size {}", page_size);
        }
    }

    #[tokio::test]
    async fn normalizes_listing_and_tolerates_pages_past_the_end() {
        let client = Arc::new(MockApiClient::new());
        client.on(
            Method::GET,
            "/api/files/c",
            MockReply::files(&[file("c", "a", "x", "20251020")]),
        );

        let service = service(&client);
        let result = service.list_files("c", 1, 10, None).await.unwrap();
        assert_eq!(result.files[0].upload_time, "2025-10-20T00:00:00Z");

        let result = service.list_files("c", 5, 10, None).await.unwrap();
        assert!(result.files.is_empty());
        assert_eq!(result.current_page, 5);
        assert_eq!(result.total_pages, 1);
    }

    #[tokio::test]
    async fn empty_collection_has_zero_pages() {
        let client = Arc::new(MockApiClient::new());
        client.on(Method::GET, "/api/files/c", MockReply::Json(json!({})));
        let result = service(&client).list_files("c", 1, 10, None).await.unwrap();
        assert_eq!(result.total_count, 0);
        assert_eq!(result.total_pages, 0);
    }

    #[tokio::test]
    async fn rejects_zero_paging_before_requesting() {
        let client = Arc::new(MockApiClient::new());
        let service = service(&client);
        for (page, size) in [(0, 10), (1, 0)] {
            let error = service.list_files("c", page, size, None).await.unwrap_err();
            assert_eq!(error.code(), ErrorCode::InvalidParameter);
            assert!(!error.is_application());
        }
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn maps_listing_errors() {
        let client = Arc::new(MockApiClient::new());
        client.on(Method::GET, "/api/files/gone", StatusCode::NOT_FOUND);
        client.on(Method::GET, "/api/files/secret", StatusCode::FORBIDDEN);
        client.on(Method::GET, "/api/files/down", StatusCode::BAD_GATEWAY);
        let service = service(&client);

        let error = service.list_files("gone", 1, 10, None).await.unwrap_err();
        assert_eq!(error.to_string(), "Collection \"gone\" not found");
        assert_eq!(error.action(), Some(VERIFY_EXISTS));

        let error = service.list_files("secret", 1, 10, None).await.unwrap_err();
        assert_eq!(error.to_string(), "Access to collection \"secret\" is forbidden");
        assert_eq!(error.action(), Some(REQUEST_ACCESS));

        let error = service.list_files("down", 1, 10, None).await.unwrap_err();
        assert_eq!(
            error.to_string(),
            "Failed to fetch files from \"down\": HTTP error! status: 502"
        );
        assert_eq!(error.action(), Some(TRY_AGAIN_OR_CONTACT_SUPPORT));
        assert_eq!(error.code(), ErrorCode::ServerError);
    }

    #[tokio::test]
    async fn uploads_multipart_with_metadata() {
        let client = Arc::new(MockApiClient::new());
        client.on(Method::POST, "/api/files/research", MockReply::Json(json!({})));

        let mut metadata = Map::new();
        metadata.insert("status".into(), json!("Draft"));
        let upload = FileUpload {
            filename: "notes.txt".into(),
            content_type: "text/plain".into(),
            bytes: Bytes::from_static(b"hi"),
        };
        service(&client)
            .upload_file(upload, "research", &metadata)
            .await
            .unwrap();

        let call = &client.calls()[0];
        assert_eq!(call.method, Method::POST);
        match &call.body {
            RequestBody::Multipart(form) => {
                assert_eq!(form.field("metadata"), Some(r#"{"status":"Draft"}"#));
                let part = form.file.as_ref().unwrap();
                assert_eq!(part.field, "file");
                assert_eq!(part.filename, "notes.txt");
            }
            other => panic!("expected multipart, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn maps_upload_errors() {
        let upload = FileUpload {
            filename: "a".into(),
            content_type: "text/plain".into(),
            bytes: Bytes::new(),
        };
        let cases = [
            (StatusCode::UNPROCESSABLE_ENTITY, "Validation failed for file upload", CHECK_INPUT),
            (StatusCode::BAD_REQUEST, "Validation failed for file upload", CHECK_INPUT),
            (
                StatusCode::FORBIDDEN,
                "Access to collection \"c\" is forbidden",
                REQUEST_ACCESS,
            ),
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "File upload failed: HTTP error! status: 500",
                TRY_AGAIN_OR_CONTACT_SUPPORT,
            ),
            (
                StatusCode::NOT_FOUND,
                "File upload failed: HTTP error! status: 404",
                TRY_AGAIN_OR_CONTACT_SUPPORT,
            ),
        ];
        for (status, message, action) in cases {
            let client = Arc::new(MockApiClient::new());
            client.on(Method::POST, "/api/files/c", status);
            let error = service(&client)
                .upload_file(upload.clone(), "c", &Map::new())
                .await
                .unwrap_err();
            assert_eq!(error.to_string(), message);
            assert_eq!(error.action(), Some(action));
        }
    }

    #[tokio::test]
    async fn downloads_deletes_and_archives_by_object_name() {
        let client = Arc::new(MockApiClient::new());
        let endpoint = "/api/files/c/c/alice/1-a%20b.txt";
        client.on(Method::GET, endpoint, MockReply::bytes(b"content"));
        client.on(Method::DELETE, endpoint, MockReply::bytes(b""));
        client.on(Method::PATCH, endpoint, MockReply::Json(json!({ "ok": true })));
        let service = service(&client);

        let body = service.download_file("c", "c/alice/1-a b.txt").await.unwrap();
        assert_eq!(body.bytes, Bytes::from_static(b"content"));
        service.delete_file("c", "c/alice/1-a b.txt").await.unwrap();
        service.archive_file("c", "c/alice/1-a b.txt").await.unwrap();

        let calls = client.calls();
        assert_eq!(calls[1].method, Method::DELETE);
        assert_eq!(calls[2].method, Method::PATCH);
        assert_eq!(calls[2].body, RequestBody::Json(json!({ "archived": true })));
    }

    #[tokio::test]
    async fn maps_single_file_errors() {
        let client = Arc::new(MockApiClient::new());
        client.on(Method::GET, "/api/files/c/x", StatusCode::NOT_FOUND);
        client.on(Method::DELETE, "/api/files/c/x", StatusCode::FORBIDDEN);
        client.on(Method::PATCH, "/api/files/c/x", MockReply::Network("offline".into()));
        let service = service(&client);

        let error = service.download_file("c", "x").await.unwrap_err();
        assert_eq!(error.to_string(), "File \"x\" not found");
        let error = service.delete_file("c", "x").await.unwrap_err();
        assert_eq!(error.to_string(), "Access to file \"x\" is forbidden");
        let error = service.archive_file("c", "x").await.unwrap_err();
        assert_eq!(error.to_string(), "File archival failed: offline");
        assert_eq!(error.code(), ErrorCode::NetworkError);
    }

    #[tokio::test]
    async fn recent_files_survive_a_forbidden_collection() {
        let client = Arc::new(MockApiClient::new());
        client.on(
            Method::GET,
            "/api/files/open",
            MockReply::files(&[
                file("open", "a", "old", "20250101"),
                file("open", "a", "new", "2025-03-01T00:00:00Z"),
                file("open", "a", "odd", "sometime"),
            ]),
        );
        client.on(Method::GET, "/api/files/closed", StatusCode::FORBIDDEN);

        let result = service(&client)
            .get_recent_files(&user_with(&["open", "closed"]), 10)
            .await;
        let names: Vec<_> = result.files.iter().map(|f| f.original_filename.as_str()).collect();
        assert_eq!(names, vec!["new", "old", "odd"]);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(
            result.errors[0].message,
            "Access to collection \"closed\" is forbidden"
        );
        assert_eq!(result.errors[0].action, REQUEST_ACCESS);
    }

    #[tokio::test]
    async fn recent_files_merge_sort_and_truncate() {
        let client = Arc::new(MockApiClient::new());
        client.on(
            Method::GET,
            "/api/files/a",
            MockReply::files(&[file("a", "x", "a1", "2025-01-01T00:00:00Z")]),
        );
        client.on(
            Method::GET,
            "/api/files/b",
            MockReply::files(&[
                file("b", "x", "b1", "2025-02-01T00:00:00Z"),
                file("b", "x", "b2", "2024-12-01T00:00:00Z"),
            ]),
        );

        let result = service(&client).get_recent_files(&user_with(&["a", "b"]), 2).await;
        let names: Vec<_> = result.files.iter().map(|f| f.original_filename.as_str()).collect();
        assert_eq!(names, vec!["b1", "a1"]);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn recent_files_are_requested_concurrently() {
        let client = Arc::new(MockApiClient::new());
        client.on(Method::GET, "/api/files/a", MockReply::files(&[]));
        client.on(Method::GET, "/api/files/b", MockReply::files(&[]));
        let release_a = client.gate(Method::GET, "/api/files/a");
        let release_b = client.gate(Method::GET, "/api/files/b");

        let service = service(&client);
        let task = tokio::spawn(async move {
            service.get_recent_files(&user_with(&["a", "b"]), 10).await
        });

        // Both requests are in flight before either is answered.
        client.wait_for_calls(2).await;
        release_b.send(()).unwrap();
        release_a.send(()).unwrap();
        let result = task.await.unwrap();
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn user_without_collections_gets_nothing() {
        let client = Arc::new(MockApiClient::new());
        let result = service(&client).get_recent_files(&User::default(), 10).await;
        assert!(result.files.is_empty());
        assert!(result.errors.is_empty());
        assert_eq!(client.call_count(), 0);
    }
}
