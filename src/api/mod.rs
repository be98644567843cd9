//! Backend API: wire types and the HTTP implementation.

mod client;
mod types;

pub use client::HttpBackend;
pub use types::{Detail, DetailPart, ErrorBody, OutputFormat, RunParameters, RunResponse, UploadResponse};

use crate::error::ApiError;

/// Calls the run orchestration needs from the analysis service.
///
/// Futures are not `Send`; everything runs on the browser's UI thread.
#[allow(async_fn_in_trait)]
pub trait PathBackend {
	/// Store a file server-side and return its saved name.
	async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ApiError>;

	/// Start a path computation and wait for its reply.
	async fn submit(&self, params: &RunParameters) -> Result<RunResponse, ApiError>;

	/// Fetch a result file by name.
	async fn download(&self, filename: &str) -> Result<Vec<u8>, ApiError>;
}
