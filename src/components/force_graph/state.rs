use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::warn;

use super::types::{LinkPosition, NodePosition, truncate_label};
use crate::path_graph::GraphData;

const START_COLOR: &str = "#2ca02c";
const END_COLOR: &str = "#d62728";
const PATH_COLOR: &str = "#1f77b4";

pub const NODE_RADIUS: f64 = 6.0;
pub const HIT_RADIUS: f64 = 12.0;

/// Rest length the link force pulls towards.
pub const LINK_DISTANCE: f32 = 80.0;
/// Share of the length error corrected per tick, independent of heat.
pub const LINK_STRENGTH: f32 = 0.5;
/// Pull of every free node towards the x and y axes.
pub const AXIS_STRENGTH: f32 = 0.05;
pub const CENTER_STRENGTH: f32 = 1.0;

pub const ALPHA_MIN: f64 = 0.001;
/// Reaches `ALPHA_MIN` from 1.0 in about 300 ticks.
pub const ALPHA_DECAY: f64 = 0.0228;
pub const DRAG_ALPHA_TARGET: f64 = 0.3;

const INITIAL_RADIUS: f64 = 100.0;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub label: String,
	pub color: &'static str,
}

#[derive(Clone, Debug)]
struct LinkInfo {
	source: DefaultNodeIdx,
	target: DefaultNodeIdx,
	cost: i64,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

/// Simulation-owned copy of one graph plus the view and pointer state.
pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	/// Simulation heat; ticks stop once it cools below `ALPHA_MIN`.
	pub alpha: f64,
	pub alpha_target: f64,
	pub flow_time: f64,
	links: Vec<LinkInfo>,
}

impl ForceGraphState {
	/// `None` for an empty graph or a surface without area.
	pub fn new(data: &GraphData, width: f64, height: f64) -> Option<Self> {
		if data.nodes.is_empty() || width <= 0.0 || height <= 0.0 {
			return None;
		}

		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.02,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let mut id_to_idx: HashMap<&str, DefaultNodeIdx> = HashMap::new();
		let mut first = None;
		let last = data.nodes.len() - 1;

		for (i, node) in data.nodes.iter().enumerate() {
			let color = match i {
				0 => START_COLOR,
				i if i == last => END_COLOR,
				_ => PATH_COLOR,
			};
			let angle = (i as f64) * 2.0 * PI / data.nodes.len() as f64;
			let idx = graph.add_node(NodeData {
				x: (INITIAL_RADIUS * angle.cos()) as f32,
				y: (INITIAL_RADIUS * angle.sin()) as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: truncate_label(&node.sequence),
					color,
				},
			});
			id_to_idx.insert(node.id.as_str(), idx);
			first.get_or_insert(idx);
		}
		let first = first?;

		let resolve = |id: &str| {
			id_to_idx.get(id).copied().unwrap_or_else(|| {
				warn!("link endpoint {:?} has no node, attaching to {:?}", id, data.nodes[0].id);
				first
			})
		};

		let mut links = Vec::with_capacity(data.links.len());
		for link in &data.links {
			let (source, target) = (resolve(link.source.as_str()), resolve(link.target.as_str()));
			if source != target {
				graph.add_edge(source, target, EdgeData::default());
			}
			links.push(LinkInfo {
				source,
				target,
				cost: link.cost,
			});
		}

		Some(Self {
			graph,
			links,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			alpha: 1.0,
			alpha_target: 0.0,
			flow_time: 0.0,
		})
	}

	pub fn is_running(&self) -> bool {
		self.alpha >= ALPHA_MIN || self.alpha_target > 0.0
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// HIT_RADIUS is in world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.index());
			}
		});
		found
	}

	/// Pin `idx` under the pointer and keep the simulation warm.
	pub fn drag_start(&mut self, idx: DefaultNodeIdx, sx: f64, sy: f64) {
		self.alpha_target = DRAG_ALPHA_TARGET;
		self.drag = DragState {
			active: true,
			node_idx: Some(idx),
			start_x: sx,
			start_y: sy,
			..DragState::default()
		};
		let drag = &mut self.drag;
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				drag.node_start_x = node.x();
				drag.node_start_y = node.y();
				node.data.is_anchor = true;
			}
		});
	}

	/// Move the pinned node along with the pointer.
	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let Some(idx) = self.drag.node_idx.filter(|_| self.drag.active) else {
			return;
		};
		let (dx, dy) = (
			(sx - self.drag.start_x) / self.transform.k,
			(sy - self.drag.start_y) / self.transform.k,
		);
		let (nx, ny) = (
			self.drag.node_start_x + dx as f32,
			self.drag.node_start_y + dy as f32,
		);
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = nx;
				node.data.y = ny;
			}
		});
	}

	/// Release the pin and let the heat decay.
	pub fn drag_end(&mut self) {
		if let Some(idx) = self.drag.node_idx.take() {
			self.graph.visit_nodes_mut(|node| {
				if node.index() == idx {
					node.data.is_anchor = false;
				}
			});
		}
		self.drag.active = false;
		self.alpha_target = 0.0;
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Save previous state for fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for link in &self.links {
				if link.source == idx {
					self.hover.neighbors.insert(link.target);
				} else if link.target == idx {
					self.hover.neighbors.insert(link.source);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn tick(&mut self, dt: f32) {
		if self.is_running() {
			self.graph.update(dt);
			self.apply_layout_forces();
			self.alpha += (self.alpha_target - self.alpha) * ALPHA_DECAY;
		}
		self.flow_time += dt as f64;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	/// Link rest length, centering and axis pull. The axis pull is scaled by
	/// the current heat. Pinned nodes are left where they are.
	fn apply_layout_forces(&mut self) {
		let alpha = self.alpha as f32;
		let mut pos: HashMap<DefaultNodeIdx, (f32, f32)> = HashMap::new();
		self.graph.visit_nodes(|node| {
			pos.insert(node.index(), (node.x(), node.y()));
		});
		if pos.is_empty() {
			return;
		}
		let mut shift: HashMap<DefaultNodeIdx, (f32, f32)> =
			pos.keys().map(|&idx| (idx, (0.0, 0.0))).collect();

		for link in &self.links {
			let (Some(&(sx, sy)), Some(&(tx, ty))) = (pos.get(&link.source), pos.get(&link.target))
			else {
				continue;
			};
			let (dx, dy) = (tx - sx, ty - sy);
			let len = (dx * dx + dy * dy).sqrt();
			if link.source == link.target || len < 1e-3 {
				continue;
			}
			let k = (len - LINK_DISTANCE) / len * LINK_STRENGTH * 0.5;
			if let Some(s) = shift.get_mut(&link.source) {
				s.0 += dx * k;
				s.1 += dy * k;
			}
			if let Some(t) = shift.get_mut(&link.target) {
				t.0 -= dx * k;
				t.1 -= dy * k;
			}
		}

		let n = pos.len() as f32;
		let (mx, my) = pos
			.values()
			.fold((0.0, 0.0), |(ax, ay), &(x, y)| (ax + x / n, ay + y / n));

		for (idx, &(x, y)) in &pos {
			if let Some(s) = shift.get_mut(idx) {
				s.0 += -mx * CENTER_STRENGTH - x * AXIS_STRENGTH * alpha;
				s.1 += -my * CENTER_STRENGTH - y * AXIS_STRENGTH * alpha;
			}
		}

		self.graph.visit_nodes_mut(|node| {
			if node.data.is_anchor {
				return;
			}
			if let Some(&(dx, dy)) = shift.get(&node.index()) {
				if dx.is_finite() && dy.is_finite() {
					node.data.x += dx;
					node.data.y += dy;
				}
			}
		});
	}

	/// Whether a surface of this size would need a fresh layout.
	pub fn size_differs(&self, width: f64, height: f64) -> bool {
		(self.width - width).abs() >= 0.5 || (self.height - height).abs() >= 0.5
	}

	/// Current positions keyed by node id, in insertion order.
	pub fn node_positions(&self) -> Vec<NodePosition> {
		let mut out = Vec::new();
		self.graph.visit_nodes(|node| {
			out.push(NodePosition {
				id: node.data.user_data.id.clone(),
				x: node.x() as f64,
				y: node.y() as f64,
				pinned: node.data.is_anchor,
			});
		});
		out
	}

	pub fn position_of(&self, id: &str) -> Option<NodePosition> {
		self.node_positions().into_iter().find(|p| p.id == id)
	}

	/// Current endpoints of every link, one per path step.
	pub fn link_positions(&self) -> Vec<LinkPosition> {
		let mut pos = HashMap::new();
		self.graph.visit_nodes(|node| {
			pos.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		self.links
			.iter()
			.filter_map(|link| {
				let (&(x1, y1), &(x2, y2)) = (pos.get(&link.source)?, pos.get(&link.target)?);
				Some(LinkPosition {
					x1,
					y1,
					x2,
					y2,
					cost: link.cost,
					highlighted: self.is_highlighted(link.source) && self.is_highlighted(link.target),
				})
			})
			.collect()
	}

	pub fn link_count(&self) -> usize {
		self.links.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::path_graph::{GraphLink, PathStep, build_graph};

	fn walk() -> GraphData {
		build_graph(vec![
			PathStep::new("AAAA", "AAAT", 1),
			PathStep::new("AAAT", "AATT", 2),
			PathStep::new("AATT", "ATTT", 3),
		])
	}

	fn node_idx(state: &ForceGraphState, id: &str) -> DefaultNodeIdx {
		let mut found = None;
		state.graph.visit_nodes(|node| {
			if node.data.user_data.id == id {
				found = Some(node.index());
			}
		});
		found.unwrap()
	}

	#[test]
	fn test_empty_graph_has_no_layout() {
		assert!(ForceGraphState::new(&GraphData::default(), 800.0, 600.0).is_none());
	}

	#[test]
	fn test_zero_size_has_no_layout() {
		assert!(ForceGraphState::new(&walk(), 0.0, 600.0).is_none());
		assert!(ForceGraphState::new(&walk(), 800.0, -1.0).is_none());
	}

	#[test]
	fn test_copies_nodes_and_links() {
		let data = walk();
		let state = ForceGraphState::new(&data, 800.0, 600.0).unwrap();
		let ids: Vec<String> = state.node_positions().into_iter().map(|p| p.id).collect();
		assert_eq!(ids, vec!["AAAA", "AAAT", "AATT", "ATTT"]);
		assert_eq!(state.link_count(), 3);
		assert_eq!(data, walk());
	}

	#[test]
	fn test_unresolved_link_falls_back_to_first_node() {
		let mut data = walk();
		data.links.push(GraphLink {
			source: "MISSING".into(),
			target: "AATT".into(),
			cost: 9,
		});
		let state = ForceGraphState::new(&data, 800.0, 600.0).unwrap();
		assert_eq!(state.link_count(), 4);

		let first = state.position_of("AAAA").unwrap();
		let link = state.link_positions().pop().unwrap();
		assert_eq!((link.x1, link.y1), (first.x, first.y));
		assert_eq!(link.cost, 9);
	}

	#[test]
	fn test_labels_truncated() {
		let long = "ACGT".repeat(8);
		let data = build_graph(vec![PathStep::new(long.as_str(), "A", 1)]);
		let state = ForceGraphState::new(&data, 800.0, 600.0).unwrap();
		let mut labels = Vec::new();
		state.graph.visit_nodes(|node| labels.push(node.data.user_data.label.clone()));
		assert_eq!(labels[0].chars().count(), 21);
		assert_eq!(labels[1], "A");
	}

	#[test]
	fn test_simulation_cools_down() {
		let mut state = ForceGraphState::new(&walk(), 800.0, 600.0).unwrap();
		assert!(state.is_running());
		for _ in 0..400 {
			state.tick(0.016);
		}
		assert!(!state.is_running());
		for p in state.node_positions() {
			assert!(p.x.is_finite() && p.y.is_finite());
		}
	}

	#[test]
	fn test_links_settle_near_rest_length() {
		let steps = (0..8)
			.map(|i| PathStep::new(format!("S{}", i), format!("S{}", i + 1), 1))
			.collect();
		let mut state = ForceGraphState::new(&build_graph(steps), 800.0, 600.0).unwrap();
		while state.is_running() {
			state.tick(0.016);
		}

		for link in state.link_positions() {
			let len = ((link.x2 - link.x1).powi(2) + (link.y2 - link.y1).powi(2)).sqrt();
			assert!((len - LINK_DISTANCE as f64).abs() < 10.0, "link length {}", len);
		}
		let nodes = state.node_positions();
		for (i, a) in nodes.iter().enumerate() {
			for b in &nodes[i + 1..] {
				let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
				assert!(d > 4.0 * NODE_RADIUS, "{} and {} are {} apart", a.id, b.id, d);
			}
		}
	}

	#[test]
	fn test_drag_pins_and_releases() {
		let mut state = ForceGraphState::new(&walk(), 800.0, 600.0).unwrap();
		for _ in 0..400 {
			state.tick(0.016);
		}
		let idx = node_idx(&state, "AAAT");
		let before = state.position_of("AAAT").unwrap();

		state.drag_start(idx, 100.0, 100.0);
		assert_eq!(state.alpha_target, DRAG_ALPHA_TARGET);
		assert!(state.is_running());
		assert!(state.position_of("AAAT").unwrap().pinned);

		state.drag_to(130.0, 90.0);
		for _ in 0..10 {
			state.tick(0.016);
		}
		let moved = state.position_of("AAAT").unwrap();
		assert!((moved.x - (before.x + 30.0)).abs() < 1e-3);
		assert!((moved.y - (before.y - 10.0)).abs() < 1e-3);

		state.drag_end();
		assert_eq!(state.alpha_target, 0.0);
		assert!(!state.drag.active);
		assert!(!state.position_of("AAAT").unwrap().pinned);
	}

	#[test]
	fn test_drag_to_without_drag_is_noop() {
		let mut state = ForceGraphState::new(&walk(), 800.0, 600.0).unwrap();
		let before = state.node_positions();
		state.drag_to(500.0, 500.0);
		assert_eq!(state.node_positions(), before);
	}

	#[test]
	fn test_hover_collects_neighbors() {
		let mut state = ForceGraphState::new(&walk(), 800.0, 600.0).unwrap();
		let middle = node_idx(&state, "AAAT");
		state.set_hover(Some(middle));
		assert!(state.is_highlighted(node_idx(&state, "AAAA")));
		assert!(state.is_highlighted(node_idx(&state, "AATT")));
		assert!(!state.is_highlighted(node_idx(&state, "ATTT")));
	}

	#[test]
	fn test_node_at_position_uses_transform() {
		let state = ForceGraphState::new(&walk(), 800.0, 600.0).unwrap();
		let first = state.position_of("AAAA").unwrap();
		let (sx, sy) = (first.x + state.transform.x, first.y + state.transform.y);
		assert_eq!(state.node_at_position(sx, sy), Some(node_idx(&state, "AAAA")));
		assert_eq!(state.node_at_position(-1000.0, -1000.0), None);
	}

	#[test]
	fn test_size_differs() {
		let state = ForceGraphState::new(&walk(), 800.0, 600.0).unwrap();
		assert!(!state.size_differs(800.0, 600.0));
		assert!(!state.size_differs(800.2, 599.9));
		assert!(state.size_differs(640.0, 600.0));
	}
}
