//! Backend endpoint configuration.

use std::time::Duration;

use log::debug;

/// Compile-time override for the backend base URL.
const API_URL_ENV: Option<&str> = option_env!("MUTATION_PATH_API_URL");
const FALLBACK_API_URL: &str = "http://localhost:8000";

/// Where the analysis backend lives and how long each call may take.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
	pub base_url: String,
	pub upload_timeout: Duration,
	pub submit_timeout: Duration,
	pub download_timeout: Duration,
}

impl ApiConfig {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into().trim_end_matches('/').to_string(),
			upload_timeout: Duration::from_secs(60),
			submit_timeout: Duration::from_secs(120),
			download_timeout: Duration::from_secs(30),
		}
	}

	/// Build-time env var, then `<page origin>/api`, then localhost.
	pub fn from_env() -> Self {
		let base_url = API_URL_ENV
			.map(str::to_string)
			.or_else(|| page_origin().map(|origin| format!("{}/api", origin)))
			.unwrap_or_else(|| FALLBACK_API_URL.to_string());
		debug!("API base URL: {}", base_url);
		Self::new(base_url)
	}

	pub fn endpoint(&self, path: &str) -> String {
		format!("{}/{}", self.base_url, path.trim_start_matches('/'))
	}
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self::new(FALLBACK_API_URL)
	}
}

#[cfg(target_arch = "wasm32")]
fn page_origin() -> Option<String> {
	web_sys::window()?
		.location()
		.origin()
		.ok()
		.filter(|o| !o.is_empty() && o != "null")
}

#[cfg(not(target_arch = "wasm32"))]
fn page_origin() -> Option<String> {
	None
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_timeouts() {
		let config = ApiConfig::default();
		assert_eq!(config.submit_timeout, Duration::from_secs(120));
		assert_eq!(config.download_timeout, Duration::from_secs(30));
	}

	#[test]
	fn test_trailing_slash_trimmed() {
		let config = ApiConfig::new("http://example.org/api///");
		assert_eq!(config.base_url, "http://example.org/api");
		assert_eq!(config.endpoint("/run"), "http://example.org/api/run");
		assert_eq!(config.endpoint("upload"), "http://example.org/api/upload");
	}
}
