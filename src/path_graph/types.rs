/// One transition between two sequences as reported by the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathStep {
	pub from_sequence: String,
	pub to_sequence: String,
	pub transition_cost: i64,
}

impl PathStep {
	pub fn new(from: impl Into<String>, to: impl Into<String>, cost: i64) -> Self {
		Self {
			from_sequence: from.into(),
			to_sequence: to.into(),
			transition_cost: cost,
		}
	}
}

/// A distinct sequence; `index` is its 0-based discovery order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphNode {
	pub id: String,
	pub sequence: String,
	pub index: usize,
}

/// Directed edge between two node ids. Parallel links are kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
	pub cost: i64,
}

/// Everything produced from one downloaded result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphData {
	pub steps: Vec<PathStep>,
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl GraphData {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Sum of all transition costs along the path, saturating at the `i64`
	/// bounds.
	pub fn total_cost(&self) -> i64 {
		self.steps
			.iter()
			.fold(0i64, |acc, s| acc.saturating_add(s.transition_cost))
	}
}
