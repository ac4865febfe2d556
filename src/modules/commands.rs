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
    api::system::{get_health, get_user_info},
    error::{code::ErrorCode, messages, StufError, StufResult},
    files::{
        filters::{DateRange, FileFilters},
        permissions::FilePermissions,
        selection::DownloadTarget,
        service::{FileUpload, FilesService, ALL_FILES_PAGE_SIZE},
        sort::FilesSort,
        File,
    },
    session::StufClient,
    settings::cli::Command,
};
use crate::raise_error;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// Runs one subcommand and prints its result to stdout.
pub async fn execute(command: &Command, client: &StufClient) -> StufResult<()> {
    match command {
        Command::Me => print_json(&get_user_info(client.api()).await?),
        Command::Health => print_json(&get_health(client.api()).await?),
        Command::Collections => {
            require_user(client);
            let context = client.collections();
            context.fetch_collections().await?;
            let state = context.state();
            for collection in &state.collections {
                println!(
                    "{:<32} {:>6} file(s)",
                    collection.name,
                    collection.file_count.unwrap_or_default()
                );
            }
            report_state_error(state.error.as_deref());
            Ok(())
        }
        Command::Recent { limit } => {
            require_user(client);
            let context = client.files();
            context.fetch_recent_files(*limit).await?;
            let state = context.state();
            print_files(&state.files, Utc::now());
            report_state_error(state.error.as_deref());
            Ok(())
        }
        Command::List {
            collection,
            page,
            page_size,
            uploaders,
            statuses,
            from,
            to,
            sort_by,
            direction,
        } => {
            let filters = FileFilters {
                uploaders: uploaders.clone(),
                statuses: statuses.clone(),
                date_range: from
                    .as_ref()
                    .zip(to.as_ref())
                    .map(|(from, to)| DateRange::new(from.as_str(), to.as_str())),
            };
            let context = client.files();
            context
                .fetch_files(collection, *page, *page_size, Some(&filters))
                .await?;

            let state = context.state();
            let files = match sort_by {
                Some(field) => FilesSort::new(*field, *direction).apply(&state.files),
                None => state.files.clone(),
            };
            print_files(&files, Utc::now());
            if state.is_page_out_of_range() {
                println!(
                    "Page {} is past the last page ({}).",
                    state.current_page, state.total_pages
                );
            } else if state.error.is_none() {
                println!(
                    "Page {} of {} ({} file(s))",
                    state.current_page,
                    state.total_pages.max(1),
                    state.total_count
                );
            }
            report_state_error(state.error.as_deref());
            Ok(())
        }
        Command::Upload {
            collection,
            path,
            metadata,
        } => {
            let upload = FileUpload::from_path(path).await?;
            client
                .files()
                .upload_file(upload, collection, &metadata.clone().unwrap_or_default())
                .await
        }
        Command::Download {
            collection,
            objects,
        } => {
            let targets = objects
                .iter()
                .map(|object| DownloadTarget {
                    collection: collection.clone(),
                    object_name: object.clone(),
                })
                .collect_vec();
            let summary = client.files().download_files(&targets).await;
            if summary.failed > 0 {
                return Err(raise_error!(
                    format!(
                        "{} of {} download(s) failed",
                        summary.failed,
                        targets.len()
                    ),
                    ErrorCode::HttpResponseError
                ));
            }
            Ok(())
        }
        Command::Delete { collection, object } => {
            client.files().delete_file(collection, object).await
        }
        Command::Archive { collection, object } => {
            client.files().archive_file(collection, object).await
        }
        Command::Permissions { collection, object } => {
            let file = find_file(client, collection, object).await?;
            let permissions = FilePermissions::derive(client.user().map(Arc::as_ref), &file);
            println!("{}", file.object_name);
            println!("  {}", describe_permissions(&permissions));
            Ok(())
        }
    }
}

fn require_user(client: &StufClient) {
    if client.user().is_none() {
        warn!("No access token given; set STUF_ACCESS_TOKEN to see your collections");
    }
}

fn print_json(value: &Value) -> StufResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
    println!("{}", rendered);
    Ok(())
}

fn report_state_error(error: Option<&str>) {
    if let Some(error) = error {
        eprintln!("warning: {}", error);
    }
}

async fn find_file(client: &StufClient, collection: &str, object_name: &str) -> StufResult<File> {
    let listing = FilesService::new(client.api_handle())
        .list_files(collection, 1, ALL_FILES_PAGE_SIZE, None)
        .await?;
    listing
        .files
        .into_iter()
        .find(|file| file.object_name == object_name)
        .ok_or_else(|| {
            StufError::application(
                messages::not_found(&format!("File \"{}\"", object_name)),
                messages::VERIFY_EXISTS,
                ErrorCode::ResourceNotFound,
            )
        })
}

pub fn describe_permissions(permissions: &FilePermissions) -> String {
    let granted = [
        ("read", permissions.can_read),
        ("write", permissions.can_write),
        ("delete", permissions.can_delete),
        ("download", permissions.can_download),
        ("archive", permissions.can_archive),
        ("history", permissions.can_view_history),
    ]
    .into_iter()
    .filter(|(_, granted)| *granted)
    .map(|(name, _)| name)
    .join(", ");

    let granted = if granted.is_empty() {
        "no access".to_string()
    } else {
        granted
    };
    if permissions.is_own_file {
        format!("{} (own file)", granted)
    } else {
        granted
    }
}

pub fn format_size(size: Option<u64>) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let Some(size) = size else {
        return "-".to_string();
    };
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", size, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

pub fn format_age(file: &File, now: DateTime<Utc>) -> String {
    match file.uploaded_at() {
        Some(at) => {
            let elapsed = (now - at).to_std().unwrap_or_default();
            timeago::Formatter::new().convert(elapsed)
        }
        None => file.upload_time.clone(),
    }
}

pub fn format_file_row(file: &File, now: DateTime<Utc>) -> String {
    format!(
        "{:<12} {:<16} {:<16} {:>10}  {}",
        file.status(),
        file.owner,
        format_age(file, now),
        format_size(file.size),
        file.object_name
    )
}

fn print_files(files: &[File], now: DateTime<Utc>) {
    if files.is_empty() {
        println!("No files.");
        return;
    }
    for file in files {
        println!("{}", format_file_row(file, now));
    }
}
