use std::fmt;

use serde::{Deserialize, Serialize};

/// Format the backend writes the result table in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
	#[default]
	Csv,
	Tsv,
}

impl OutputFormat {
	pub const ALL: [OutputFormat; 2] = [OutputFormat::Csv, OutputFormat::Tsv];

	pub fn as_str(&self) -> &'static str {
		match self {
			OutputFormat::Csv => "csv",
			OutputFormat::Tsv => "tsv",
		}
	}

	pub fn from_name(name: &str) -> Option<Self> {
		Self::ALL
			.into_iter()
			.find(|f| f.as_str().eq_ignore_ascii_case(name.trim()))
	}
}

impl fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Body of the job submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunParameters {
	pub input_path: String,
	pub start_node: String,
	pub end_node: String,
	pub max_cost: i64,
	pub output_format: OutputFormat,
}

/// Reply to a job submission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RunResponse {
	#[serde(default)]
	pub status: String,
	#[serde(default)]
	pub result: Option<String>,
	#[serde(default, alias = "message")]
	pub detail: Option<Detail>,
}

impl RunResponse {
	pub fn is_ok(&self) -> bool {
		self.status == "ok"
	}
}

/// Reply to an upload.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
	#[serde(alias = "saved_filename", alias = "file_name")]
	pub filename: String,
}

/// Error body returned with a failing status.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
	#[serde(default, alias = "message")]
	pub detail: Option<Detail>,
}

impl ErrorBody {
	/// Extract a detail message from a raw body; `None` if absent or not JSON.
	pub fn detail_from(body: &[u8]) -> Option<String> {
		serde_json::from_slice::<ErrorBody>(body)
			.ok()
			.and_then(|b| b.detail)
			.map(|d| d.joined())
			.filter(|d| !d.is_empty())
	}
}

/// Backend detail: a single message or a list of them.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Detail {
	Text(String),
	Parts(Vec<DetailPart>),
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DetailPart {
	Text(String),
	Message { msg: String },
}

impl Detail {
	/// Lists are joined with `"; "`.
	pub fn joined(&self) -> String {
		match self {
			Detail::Text(text) => text.clone(),
			Detail::Parts(parts) => parts
				.iter()
				.map(|p| match p {
					DetailPart::Text(text) => text.as_str(),
					DetailPart::Message { msg } => msg.as_str(),
				})
				.collect::<Vec<_>>()
				.join("; "),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_run_parameters_body() {
		let params = RunParameters {
			input_path: "upload_1.fasta".into(),
			start_node: "AAAA".into(),
			end_node: "TTTT".into(),
			max_cost: 10,
			output_format: OutputFormat::Tsv,
		};
		let body = serde_json::to_value(&params).unwrap();
		assert_eq!(
			body,
			serde_json::json!({
				"input_path": "upload_1.fasta",
				"start_node": "AAAA",
				"end_node": "TTTT",
				"max_cost": 10,
				"output_format": "tsv",
			})
		);
	}

	#[test]
	fn test_run_response() {
		let ok: RunResponse =
			serde_json::from_str(r#"{"status":"ok","result":"path_42.csv"}"#).unwrap();
		assert!(ok.is_ok());
		assert_eq!(ok.result.as_deref(), Some("path_42.csv"));

		let failed: RunResponse =
			serde_json::from_str(r#"{"status":"error","message":"no path"}"#).unwrap();
		assert!(!failed.is_ok());
		assert_eq!(failed.detail.map(|d| d.joined()).as_deref(), Some("no path"));
	}

	#[test]
	fn test_detail_string() {
		assert_eq!(
			ErrorBody::detail_from(br#"{"detail":"file not found"}"#).as_deref(),
			Some("file not found")
		);
	}

	#[test]
	fn test_detail_list_joined() {
		assert_eq!(
			ErrorBody::detail_from(br#"{"detail":["bad start","bad end"]}"#).as_deref(),
			Some("bad start; bad end")
		);
		assert_eq!(
			ErrorBody::detail_from(
				br#"{"detail":[{"loc":["body","max_cost"],"msg":"not an int","type":"x"},"other"]}"#
			)
			.as_deref(),
			Some("not an int; other")
		);
	}

	#[test]
	fn test_detail_absent() {
		assert_eq!(ErrorBody::detail_from(b"Internal Server Error"), None);
		assert_eq!(ErrorBody::detail_from(b"{}"), None);
		assert_eq!(ErrorBody::detail_from(br#"{"detail":""}"#), None);
	}

	#[test]
	fn test_output_format_names() {
		assert_eq!(OutputFormat::from_name(" TSV "), Some(OutputFormat::Tsv));
		assert_eq!(OutputFormat::from_name("xlsx"), None);
		assert_eq!(OutputFormat::default().to_string(), "csv");
	}
}
