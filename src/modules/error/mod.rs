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


use code::ErrorCode;
use serde::{Deserialize, Serialize};
use snafu::{Location, Snafu};

pub mod code;
pub mod messages;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StufError {
    /// Transport and internal failures, classified by `code`.
    #[snafu(display("{message}"))]
    Generic {
        message: String,
        #[snafu(implicit)]
        location: Location,
        code: ErrorCode,
    },
    /// A failure the user can act on: `message` says what went wrong and
    /// `action` what to do about it. Produced by the service layer.
    #[snafu(display("{message}"))]
    Application {
        message: String,
        action: String,
        code: ErrorCode,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("{source}"))]
    IoError {
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

pub type StufResult<T, E = StufError> = std::result::Result<T, E>;

#[macro_export]
macro_rules! raise_error {
    ($message:expr, $code:expr) => {
        $crate::modules::error::StufError::Generic {
            message: $message,
            location: snafu::location!(),
            code: $code,
        }
    };
}

impl From<std::io::Error> for StufError {
    fn from(source: std::io::Error) -> Self {
        Self::IoError {
            source,
            location: Location::default(),
        }
    }
}

impl StufError {
    #[track_caller]
    pub fn application(message: String, action: &str, code: ErrorCode) -> Self {
        StufError::Application {
            message,
            action: action.to_string(),
            code,
            location: Location::default(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            StufError::Generic { code, .. } | StufError::Application { code, .. } => *code,
            StufError::IoError { .. } => ErrorCode::IoError,
        }
    }

    pub fn is_application(&self) -> bool {
        matches!(self, StufError::Application { .. })
    }

    /// Remediation hint, present only on application errors.
    pub fn action(&self) -> Option<&str> {
        match self {
            StufError::Application { action, .. } => Some(action),
            _ => None,
        }
    }

    /// Turns any error into a partial-failure record. Application errors keep
    /// their wording; anything else is reported as a failed fetch of `resource`.
    pub fn to_service_error(&self, resource: &str) -> ServiceError {
        match self {
            StufError::Application {
                message, action, ..
            } => ServiceError {
                message: message.clone(),
                action: action.clone(),
            },
            other => ServiceError {
                message: messages::fetch_failed(resource, Some(&other.to_string())),
                action: messages::TRY_AGAIN_OR_CONTACT_SUPPORT.to_string(),
            },
        }
    }
}

/// A failure reported alongside partial results.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ServiceError {
    pub message: String,
    pub action: String,
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.action)
    }
}
