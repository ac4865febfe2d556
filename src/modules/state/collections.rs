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


use crate::modules::collections::Collection;
use crate::modules::state::ListState;
use serde::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CollectionsState {
    pub collections: Vec<Collection>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ListState for CollectionsState {
    type Item = Collection;

    fn items_mut(&mut self) -> &mut Vec<Collection> {
        &mut self.collections
    }

    fn loading_mut(&mut self) -> &mut bool {
        &mut self.loading
    }

    fn error_mut(&mut self) -> &mut Option<String> {
        &mut self.error
    }
}
