//! Path result model: table parsing and graph assembly.

mod graph;
mod parser;
mod types;

pub use graph::build_graph;
pub use parser::{detect_delimiter, parse_path_table, split_row};
pub use types::{GraphData, GraphLink, GraphNode, PathStep};

/// Parse a downloaded result and assemble its graph in one step.
pub fn graph_from_table(content: &str) -> GraphData {
	build_graph(parse_path_table(content))
}
