//! Presentation-side positions, kept apart from the parsed graph.

pub const LABEL_MAX_CHARS: usize = 20;

/// Current on-screen state of one node, keyed by its graph id.
#[derive(Clone, Debug, PartialEq)]
pub struct NodePosition {
	pub id: String,
	pub x: f64,
	pub y: f64,
	/// Held in place by a drag.
	pub pinned: bool,
}

/// Current endpoints of one link.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkPosition {
	pub x1: f64,
	pub y1: f64,
	pub x2: f64,
	pub y2: f64,
	pub cost: i64,
	pub highlighted: bool,
}

/// Cut `text` to `LABEL_MAX_CHARS` characters, marking the cut with `…`.
pub fn truncate_label(text: &str) -> String {
	if text.chars().count() <= LABEL_MAX_CHARS {
		return text.to_string();
	}
	let mut label: String = text.chars().take(LABEL_MAX_CHARS).collect();
	label.push('…');
	label
}
