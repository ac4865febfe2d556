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


use crate::modules::settings::cli::SETTINGS;
use std::sync::OnceLock;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_FILE_PREFIX: &str = "stuf.log";

/// Installs the global tracing subscriber.
///
/// Logs go to stderr so command output on stdout stays clean, or to daily
/// rotated files when `stuf_log_to_file` is set.
pub fn initialize_logging() {
    let filter = EnvFilter::try_new(&SETTINGS.stuf_log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    if SETTINGS.stuf_log_to_file {
        let appender = rolling::Builder::new()
            .rotation(rolling::Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .max_log_files(SETTINGS.stuf_max_log_files.max(1))
            .build(&SETTINGS.stuf_log_dir);

        match appender {
            Ok(appender) => {
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let _ = FILE_GUARD.set(guard);
                if SETTINGS.stuf_json_logs {
                    registry
                        .with(fmt::layer().json().with_writer(writer))
                        .init();
                } else {
                    registry
                        .with(fmt::layer().with_ansi(false).with_writer(writer))
                        .init();
                }
                return;
            }
            Err(e) => {
                eprintln!(
                    "Failed to open log directory {:?}: {}. Logging to stderr instead.",
                    SETTINGS.stuf_log_dir, e
                );
            }
        }
    }

    if SETTINGS.stuf_json_logs {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_ansi(SETTINGS.stuf_ansi_logs)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
