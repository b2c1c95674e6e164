//! Error responses.
//!
//! # Responsibilities
//! - Flatten an error and its source chain into an `ErrorReport`
//! - Render the report as a JSON `500 Internal Server Error`
//!
//! # Design Decisions
//! - Only the outermost frame carries a location: where the report was taken
//! - Messages come from `Display`, never `Debug`

use std::error::Error;
use std::panic::Location;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// One error in a source chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorFrame {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// An error with its causes, outermost first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub frames: Vec<ErrorFrame>,
}

impl ErrorReport {
    #[track_caller]
    pub fn capture(error: &(dyn Error + 'static)) -> Self {
        let caller = Location::caller();
        let mut frames = vec![ErrorFrame {
            message: error.to_string(),
            location: Some(format!("{}:{}", caller.file(), caller.line())),
        }];

        let mut source = error.source();
        while let Some(cause) = source {
            frames.push(ErrorFrame {
                message: cause.to_string(),
                location: None,
            });
            source = cause.source();
        }
        Self { frames }
    }

    /// Messages joined outermost first, for log lines.
    pub fn summary(&self) -> String {
        self.frames
            .iter()
            .map(|frame| frame.message.as_str())
            .collect::<Vec<_>>()
            .join(": ")
    }
}

impl IntoResponse for ErrorReport {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}
