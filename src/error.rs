//! Error types for backend calls and their user-facing messages.

use std::fmt;

use thiserror::Error;

/// Failures talking to the analysis backend.
#[derive(Error, Debug)]
pub enum ApiError {
	/// The call exceeded its configured timeout and was abandoned.
	#[error("request timed out")]
	Timeout,

	/// Transport-level failure.
	#[error("HTTP error: {0}")]
	Http(#[source] reqwest::Error),

	/// Non-success HTTP status.
	#[error("server returned {status}{}", detail_suffix(.detail))]
	Server { status: u16, detail: Option<String> },

	/// Success status, but the job did not report `"ok"`.
	#[error("job finished with status {status:?}{}", detail_suffix(.detail))]
	Rejected { status: String, detail: Option<String> },

	/// `"ok"` without a result filename.
	#[error("response did not name a result file")]
	MissingResult,

	#[error("invalid API URL: {0}")]
	InvalidUrl(String),

	#[error("JSON error: {0}")]
	Decode(#[from] serde_json::Error),

	#[error("failed to read file: {0}")]
	FileRead(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
	detail.as_ref().map(|d| format!(": {}", d)).unwrap_or_default()
}

impl From<reqwest::Error> for ApiError {
	fn from(err: reqwest::Error) -> Self {
		if err.is_timeout() {
			ApiError::Timeout
		} else {
			ApiError::Http(err)
		}
	}
}

impl ApiError {
	pub fn is_timeout(&self) -> bool {
		matches!(self, ApiError::Timeout)
	}

	/// Message supplied by the backend, if any.
	pub fn detail(&self) -> Option<&str> {
		match self {
			ApiError::Server { detail, .. } | ApiError::Rejected { detail, .. } => detail.as_deref(),
			_ => None,
		}
	}
}

/// Which network call failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStage {
	Upload,
	Submit,
	Download,
}

impl fmt::Display for RunStage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			RunStage::Upload => "upload",
			RunStage::Submit => "submit",
			RunStage::Download => "download",
		})
	}
}

/// A failed stage together with its cause.
#[derive(Error, Debug)]
#[error("{stage} failed: {error}")]
pub struct RunFailure {
	pub stage: RunStage,
	#[source]
	pub error: ApiError,
}

impl RunFailure {
	pub fn new(stage: RunStage, error: ApiError) -> Self {
		Self { stage, error }
	}

	/// Text shown in the status line.
	pub fn user_message(&self) -> String {
		if self.error.is_timeout() {
			return match self.stage {
				RunStage::Upload => "Upload request timed out. Please try again.",
				RunStage::Submit => "Path computation request timed out. Please try again.",
				RunStage::Download => "Result download request timed out. Please try again.",
			}
			.to_string();
		}
		if let Some(detail) = self.error.detail() {
			return detail.to_string();
		}
		match self.stage {
			RunStage::Upload => "File upload failed.",
			RunStage::Submit => "Failed to compute the mutation path.",
			RunStage::Download => "Failed to download the result file.",
		}
		.to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_timeout_message_is_stage_specific() {
		let submit = RunFailure::new(RunStage::Submit, ApiError::Timeout).user_message();
		let download = RunFailure::new(RunStage::Download, ApiError::Timeout).user_message();
		assert!(submit.contains("timed out"));
		assert!(download.contains("timed out"));
		assert_ne!(submit, download);
	}

	#[test]
	fn test_detail_shown_verbatim() {
		let failure = RunFailure::new(
			RunStage::Submit,
			ApiError::Server {
				status: 422,
				detail: Some("start node not in graph".into()),
			},
		);
		assert_eq!(failure.user_message(), "start node not in graph");
	}

	#[test]
	fn test_generic_message_without_detail() {
		let failure = RunFailure::new(RunStage::Download, ApiError::MissingResult);
		assert_eq!(failure.user_message(), "Failed to download the result file.");
		let failure = RunFailure::new(
			RunStage::Submit,
			ApiError::Rejected {
				status: "error".into(),
				detail: None,
			},
		);
		assert_eq!(failure.user_message(), "Failed to compute the mutation path.");
	}

	#[test]
	fn test_display() {
		let err = ApiError::Server {
			status: 500,
			detail: Some("boom".into()),
		};
		assert_eq!(err.to_string(), "server returned 500: boom");
		let failure = RunFailure::new(RunStage::Download, ApiError::Timeout);
		assert_eq!(failure.to_string(), "download failed: request timed out");
	}
}
