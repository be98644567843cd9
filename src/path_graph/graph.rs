use std::collections::HashSet;

use super::types::{GraphData, GraphLink, GraphNode, PathStep};

/// Build nodes and links from an ordered walk.
///
/// Nodes are discovered from the first step's `from_sequence` and then from
/// every step's `to_sequence`. A later `from_sequence` that never appeared as
/// an earlier target is not added, so a result made of disconnected segments
/// produces links whose source has no node.
pub fn build_graph(steps: Vec<PathStep>) -> GraphData {
	let mut seen = HashSet::new();
	let mut nodes = Vec::new();
	let mut discover = |sequence: &str, nodes: &mut Vec<GraphNode>| {
		if seen.insert(sequence.to_string()) {
			nodes.push(GraphNode {
				id: sequence.to_string(),
				sequence: sequence.to_string(),
				index: nodes.len(),
			});
		}
	};

	if let Some(first) = steps.first() {
		discover(&first.from_sequence, &mut nodes);
	}
	for step in &steps {
		discover(&step.to_sequence, &mut nodes);
	}

	let links = steps
		.iter()
		.map(|s| GraphLink {
			source: s.from_sequence.clone(),
			target: s.to_sequence.clone(),
			cost: s.transition_cost,
		})
		.collect();

	GraphData {
		steps,
		nodes,
		links,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::path_graph::parse_path_table;

	fn ids(data: &GraphData) -> Vec<(&str, usize)> {
		data.nodes
			.iter()
			.map(|n| (n.id.as_str(), n.index))
			.collect()
	}

	#[test]
	fn test_empty_steps() {
		let data = build_graph(Vec::new());
		assert!(data.nodes.is_empty());
		assert!(data.links.is_empty());
		assert!(data.is_empty());
	}

	#[test]
	fn test_linear_walk_end_to_end() {
		let data = build_graph(parse_path_table(
			"From_Sequence,To_Sequence,Transition_Cost\nAAAA,AAAT,1\nAAAT,AATT,2\n",
		));
		assert_eq!(
			data.steps,
			vec![
				PathStep::new("AAAA", "AAAT", 1),
				PathStep::new("AAAT", "AATT", 2)
			]
		);
		assert_eq!(ids(&data), vec![("AAAA", 0), ("AAAT", 1), ("AATT", 2)]);
		assert_eq!(
			data.links,
			vec![
				GraphLink {
					source: "AAAA".into(),
					target: "AAAT".into(),
					cost: 1
				},
				GraphLink {
					source: "AAAT".into(),
					target: "AATT".into(),
					cost: 2
				},
			]
		);
		assert_eq!(data.total_cost(), 3);
	}

	#[test]
	fn test_node_sequence_matches_id() {
		let data = build_graph(vec![PathStep::new("AC", "AG", 1)]);
		assert!(data.nodes.iter().all(|n| n.id == n.sequence));
	}

	#[test]
	fn test_revisited_sequences_deduplicated() {
		let data = build_graph(vec![
			PathStep::new("A", "B", 1),
			PathStep::new("B", "A", 1),
			PathStep::new("A", "B", 1),
		]);
		assert_eq!(ids(&data), vec![("A", 0), ("B", 1)]);
		// parallel links are kept
		assert_eq!(data.links.len(), 3);
	}

	#[test]
	fn test_disconnected_segment_source_not_discovered() {
		// second segment starts at X, which is never a target
		let data = build_graph(vec![
			PathStep::new("A", "B", 1),
			PathStep::new("X", "Y", 2),
		]);
		assert_eq!(ids(&data), vec![("A", 0), ("B", 1), ("Y", 2)]);
		assert_eq!(data.links.len(), 2);
		assert_eq!(data.links[1].source, "X");
	}

	#[test]
	fn test_link_count_equals_step_count() {
		let steps: Vec<PathStep> = (0..20)
			.map(|i| PathStep::new(format!("S{}", i % 5), format!("S{}", (i + 1) % 5), i))
			.collect();
		let data = build_graph(steps);
		assert_eq!(data.links.len(), 20);
		assert_eq!(data.nodes.len(), 5);
	}

	#[test]
	fn test_total_cost_saturates() {
		let data = crate::path_graph::graph_from_table(
			"From_Sequence,To_Sequence,Transition_Cost\nA,C,9223372036854775807\nC,G,1\n",
		);
		assert_eq!(data.steps.len(), 2);
		assert_eq!(data.total_cost(), i64::MAX);

		let data = build_graph(vec![PathStep::new("A", "C", i64::MIN), PathStep::new("C", "G", -5)]);
		assert_eq!(data.total_cost(), i64::MIN);
	}
}
