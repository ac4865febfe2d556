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

use mimalloc::MiMalloc;
use stuf::modules::{
    commands,
    context::{download::FsDownloadSink, notify::LogNotifier},
    error::StufResult,
    logger,
    session::StufClient,
    settings::{cli::SETTINGS, config::StufConfig},
};
use std::sync::Arc;
use tracing::info;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[cfg(not(test))]
#[tokio::main]
async fn main() -> StufResult<()> {
    logger::initialize_logging();
    info!("stuf {}", env!("CARGO_PKG_VERSION"));

    if let Err(error) = run().await {
        eprintln!("{}", error);
        return Err(error);
    }
    Ok(())
}

async fn run() -> StufResult<()> {
    let config = StufConfig::load(SETTINGS.stuf_config.as_deref())
        .await?
        .with_overrides(&SETTINGS.config_overrides());
    config.validate()?;
    info!("Using API at {}", config.api_base_url);

    let client = StufClient::connect(
        &config,
        SETTINGS.stuf_access_token.as_deref(),
        Arc::new(LogNotifier),
        Arc::new(FsDownloadSink::new(&SETTINGS.stuf_download_dir)),
    )?;
    commands::execute(&SETTINGS.command, &client).await
}
