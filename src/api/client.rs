//! HTTP client for the mutation-path backend.
//!
//! Calls `POST {base}/upload`, `POST {base}/run` and
//! `GET {base}/download/{filename}`. Every call carries its own timeout;
//! an expired timeout surfaces as [`ApiError::Timeout`].

use std::time::Duration;

use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, Url};

use super::PathBackend;
use super::types::{ErrorBody, RunParameters, RunResponse, UploadResponse};
use crate::config::ApiConfig;
use crate::error::ApiError;

/// Backend reached over HTTP.
#[derive(Clone, Debug)]
pub struct HttpBackend {
	config: ApiConfig,
	http: Client,
}

impl HttpBackend {
	pub fn new(config: ApiConfig) -> Self {
		Self {
			config,
			http: Client::new(),
		}
	}

	pub fn config(&self) -> &ApiConfig {
		&self.config
	}

	/// `{base}/download/{filename}` with the filename encoded as one segment.
	pub fn download_url(&self, filename: &str) -> Result<Url, ApiError> {
		let mut url = Url::parse(&self.config.base_url)
			.map_err(|e| ApiError::InvalidUrl(format!("{}: {}", self.config.base_url, e)))?;
		url.path_segments_mut()
			.map_err(|_| ApiError::InvalidUrl(self.config.base_url.clone()))?
			.pop_if_empty()
			.push("download")
			.push(filename);
		Ok(url)
	}

	async fn send(&self, request: RequestBuilder, timeout: Duration) -> Result<Response, ApiError> {
		let response = request.timeout(timeout).send().await?;
		let status = response.status();
		if status.is_success() {
			return Ok(response);
		}
		let body = response.bytes().await?;
		Err(ApiError::Server {
			status: status.as_u16(),
			detail: ErrorBody::detail_from(&body),
		})
	}
}

impl PathBackend for HttpBackend {
	async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ApiError> {
		let url = self.config.endpoint("upload");
		debug!("POST {} ({} bytes)", url, bytes.len());
		let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));
		let request = self.http.post(&url).multipart(form);
		let response = self.send(request, self.config.upload_timeout).await?;
		let body = response.bytes().await?;
		let upload: UploadResponse = serde_json::from_slice(&body)?;
		Ok(upload.filename)
	}

	async fn submit(&self, params: &RunParameters) -> Result<RunResponse, ApiError> {
		let url = self.config.endpoint("run");
		debug!("POST {} {:?}", url, params);
		let request = self.http.post(&url).json(params);
		let response = self.send(request, self.config.submit_timeout).await?;
		let body = response.bytes().await?;
		Ok(serde_json::from_slice(&body)?)
	}

	async fn download(&self, filename: &str) -> Result<Vec<u8>, ApiError> {
		let url = self.download_url(filename)?;
		debug!("GET {}", url);
		let request = self.http.get(url);
		let response = self.send(request, self.config.download_timeout).await?;
		Ok(response.bytes().await?.to_vec())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_download_url_encodes_filename() {
		let backend = HttpBackend::new(ApiConfig::new("http://localhost:8000/api/"));
		let url = backend.download_url("path result#1.csv").unwrap();
		assert_eq!(
			url.as_str(),
			"http://localhost:8000/api/download/path%20result%231.csv"
		);
	}

	#[test]
	fn test_download_url_at_root() {
		let backend = HttpBackend::new(ApiConfig::new("http://localhost:8000"));
		let url = backend.download_url("a/b.tsv").unwrap();
		assert_eq!(url.as_str(), "http://localhost:8000/download/a%2Fb.tsv");
	}

	#[test]
	fn test_invalid_base_url() {
		let backend = HttpBackend::new(ApiConfig::new("not a url"));
		assert!(matches!(
			backend.download_url("x.csv"),
			Err(ApiError::InvalidUrl(_))
		));
	}
}
