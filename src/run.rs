//! Run orchestration: submit a job, download its result, build the graph.
//!
//! One operation per controller at a time. The busy flag is held by a guard
//! that clears it on drop, so a finished, failed or abandoned run always
//! leaves the controller usable again.

use std::cell::Cell;
use std::fmt;

use log::{debug, info, warn};

use crate::api::{OutputFormat, PathBackend, RunParameters};
use crate::error::{ApiError, RunFailure, RunStage};
use crate::path_graph::{GraphData, graph_from_table};

pub const DEFAULT_MAX_COST: i64 = 10;

/// Where the current run is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RunPhase {
	#[default]
	Idle,
	Submitting,
	/// Submit replied; its status and result name are being checked.
	AwaitingResult,
	Downloading,
	Parsing,
	Rendered { nodes: usize, links: usize },
	Failed(String),
}

impl RunPhase {
	pub fn is_busy(&self) -> bool {
		matches!(
			self,
			RunPhase::Submitting
				| RunPhase::AwaitingResult
				| RunPhase::Downloading
				| RunPhase::Parsing
		)
	}
}

impl fmt::Display for RunPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RunPhase::Idle => Ok(()),
			RunPhase::Submitting => f.write_str("Submitting…"),
			RunPhase::AwaitingResult => f.write_str("Waiting for result…"),
			RunPhase::Downloading => f.write_str("Downloading…"),
			RunPhase::Parsing => f.write_str("Parsing…"),
			RunPhase::Rendered { nodes, links } => {
				write!(f, "{} sequences, {} transitions", nodes, links)
			}
			RunPhase::Failed(message) => f.write_str(message),
		}
	}
}

/// Values entered by the user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunForm {
	/// Saved name returned by the upload, once it finished.
	pub input_path: Option<String>,
	pub start_node: String,
	pub end_node: String,
	pub max_cost: i64,
	pub output_format: OutputFormat,
}

impl RunForm {
	/// `None` unless a file is uploaded and both sequences are non-blank.
	pub fn parameters(&self) -> Option<RunParameters> {
		let input_path = self.input_path.as_deref().map(str::trim).filter(|p| !p.is_empty())?;
		let start_node = self.start_node.trim();
		let end_node = self.end_node.trim();
		if start_node.is_empty() || end_node.is_empty() {
			return None;
		}
		Some(RunParameters {
			input_path: input_path.to_string(),
			start_node: start_node.to_string(),
			end_node: end_node.to_string(),
			max_cost: self.max_cost,
			output_format: self.output_format,
		})
	}
}

/// Max cost field text; anything that is not an integer keeps the default.
pub fn parse_max_cost(text: &str) -> i64 {
	text.trim().parse().unwrap_or(DEFAULT_MAX_COST)
}

/// A completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOutcome {
	pub result_file: String,
	pub graph: GraphData,
}

struct BusyGuard<'a>(&'a Cell<bool>);

impl Drop for BusyGuard<'_> {
	fn drop(&mut self) {
		self.0.set(false);
	}
}

/// Drives upload and submit → download → parse against a backend.
pub struct RunController<B> {
	backend: B,
	busy: Cell<bool>,
}

impl<B: PathBackend> RunController<B> {
	pub fn new(backend: B) -> Self {
		Self {
			backend,
			busy: Cell::new(false),
		}
	}

	pub fn backend(&self) -> &B {
		&self.backend
	}

	pub fn is_processing(&self) -> bool {
		self.busy.get()
	}

	pub fn can_start(&self, form: &RunForm) -> bool {
		!self.is_processing() && form.parameters().is_some()
	}

	fn acquire(&self) -> Option<BusyGuard<'_>> {
		if self.busy.replace(true) {
			return None;
		}
		Some(BusyGuard(&self.busy))
	}

	/// Upload a file and return its saved name. `None` if another operation
	/// is in flight.
	pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Option<Result<String, RunFailure>> {
		let _guard = self.acquire()?;
		debug!("uploading {} ({} bytes)", file_name, bytes.len());
		let result = self
			.backend
			.upload(file_name, bytes)
			.await
			.map_err(|e| RunFailure::new(RunStage::Upload, e));
		match &result {
			Ok(saved) => info!("uploaded {} as {}", file_name, saved),
			Err(failure) => warn!("{}", failure),
		}
		Some(result)
	}

	/// Run the job described by `form`, reporting each phase.
	///
	/// Returns `None` without touching the network when the form is
	/// incomplete or another operation is in flight.
	pub async fn start(
		&self,
		form: &RunForm,
		mut report: impl FnMut(&RunPhase),
	) -> Option<Result<RunOutcome, RunFailure>> {
		let params = form.parameters()?;
		let _guard = self.acquire()?;

		let mut enter = |phase: RunPhase| {
			debug!("run phase: {:?}", phase);
			report(&phase);
		};

		enter(RunPhase::Submitting);
		let result = self.execute(&params, &mut enter).await;
		match &result {
			Ok(outcome) => {
				info!(
					"run finished: {} nodes, {} links from {}",
					outcome.graph.nodes.len(),
					outcome.graph.links.len(),
					outcome.result_file
				);
				enter(RunPhase::Rendered {
					nodes: outcome.graph.nodes.len(),
					links: outcome.graph.links.len(),
				});
			}
			Err(failure) => {
				warn!("{}", failure);
				enter(RunPhase::Failed(failure.user_message()));
			}
		}
		Some(result)
	}

	async fn execute(
		&self,
		params: &RunParameters,
		enter: &mut impl FnMut(RunPhase),
	) -> Result<RunOutcome, RunFailure> {
		let submit = |e: ApiError| RunFailure::new(RunStage::Submit, e);

		let response = self.backend.submit(params).await.map_err(submit)?;
		enter(RunPhase::AwaitingResult);
		if !response.is_ok() {
			return Err(submit(ApiError::Rejected {
				detail: response.detail.map(|d| d.joined()).filter(|d| !d.is_empty()),
				status: response.status,
			}));
		}
		let result_file = response
			.result
			.filter(|r| !r.trim().is_empty())
			.ok_or_else(|| submit(ApiError::MissingResult))?;

		enter(RunPhase::Downloading);
		let bytes = self
			.backend
			.download(&result_file)
			.await
			.map_err(|e| RunFailure::new(RunStage::Download, e))?;

		enter(RunPhase::Parsing);
		let graph = graph_from_table(&String::from_utf8_lossy(&bytes));
		Ok(RunOutcome { result_file, graph })
	}

	/// Fetch a result file again for saving. Independent of any run in
	/// flight and of the rendered graph.
	pub async fn fetch_result(&self, filename: &str) -> Result<Vec<u8>, RunFailure> {
		self.backend
			.download(filename)
			.await
			.map_err(|e| RunFailure::new(RunStage::Download, e))
	}
}
