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


use crate::modules::api::RawBody;
use crate::modules::error::StufResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where downloaded files end up.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn save(&self, filename: &str, body: RawBody) -> StufResult<()>;
}

/// Writes downloads into a directory, creating it when needed.
#[derive(Clone, Debug)]
pub struct FsDownloadSink {
    dir: PathBuf,
}

impl FsDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn target(&self, filename: &str) -> PathBuf {
        let name = match filename {
            "" | "." | ".." => "download",
            name => name,
        };
        self.dir.join(name)
    }
}

#[async_trait]
impl DownloadSink for FsDownloadSink {
    async fn save(&self, filename: &str, body: RawBody) -> StufResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let target = self.target(filename);
        tokio::fs::write(&target, &body.bytes).await?;
        info!("Saved {} bytes to {:?}", body.bytes.len(), target);
        Ok(())
    }
}
