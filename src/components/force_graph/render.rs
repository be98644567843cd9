use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{ForceGraphState, NODE_RADIUS};

const BACKGROUND: &str = "#1a1a2e";

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Wipe the whole surface, e.g. when there is nothing to draw.
pub fn clear(ctx: &CanvasRenderingContext2d, width: f64, height: f64) {
	ctx.clear_rect(0.0, 0.0, width, height);
}

/// Draw one frame from the simulation's current positions.
pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (line_width, dash, gap, arrow_size) = (1.5 / k, 8.0 / k, 4.0 / k, 8.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);

	for link in state.link_positions() {
		let (dx, dy) = (link.x2 - link.x1, link.y2 - link.y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		// t=0: all edges at base (0.6), t=1: highlighted at 0.9, others at 0.15
		let (edge_alpha, arrow_alpha, width) = if link.highlighted {
			(0.6 + 0.3 * t, 0.8 + 0.1 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, 0.8 - 0.45 * t, line_width * (1.0 - 0.3 * t))
		};

		ctx.set_stroke_style_str(&format!("rgba(100, 180, 255, {})", edge_alpha));
		ctx.set_line_width(width);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
		ctx.set_line_dash_offset(dash_offset);

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(link.x1 + ux * NODE_RADIUS, link.y1 + uy * NODE_RADIUS);
		ctx.line_to(
			link.x2 - ux * (NODE_RADIUS + arrow_size),
			link.y2 - uy * (NODE_RADIUS + arrow_size),
		);
		ctx.stroke();

		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.set_fill_style_str(&format!("rgba(100, 180, 255, {})", arrow_alpha));
		let (tip_x, tip_y) = (link.x2 - ux * NODE_RADIUS, link.y2 - uy * NODE_RADIUS);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();

		// cost label at the midpoint
		ctx.set_fill_style_str(&format!("rgba(255, 220, 120, {})", arrow_alpha));
		ctx.set_font(&format!("{}px sans-serif", 9.0 / k.max(0.5)));
		ctx.set_text_align("center");
		let _ = ctx.fill_text(
			&link.cost.to_string(),
			(link.x1 + link.x2) / 2.0 + px,
			(link.y1 + link.y2) / 2.0 + py,
		);
		ctx.set_text_align("start");
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if has_highlight && state.is_highlighted(idx) {
			return;
		}
		let (x, y) = (node.x() as f64, node.y() as f64);
		let (alpha, radius) = (1.0 - 0.7 * t, NODE_RADIUS * (1.0 - 0.15 * t));

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node.data.user_data.color);
		ctx.fill();
		if node.data.is_anchor {
			ctx.set_stroke_style_str("white");
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}
		ctx.set_global_alpha(1.0);

		ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", alpha * 0.8));
		ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
		let _ = ctx.fill_text(&node.data.user_data.label, x + radius + 3.0, y + 3.0);
	});

	if !has_highlight {
		return;
	}

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if !state.is_highlighted(idx) {
			return;
		}
		let (x, y) = (node.x() as f64, node.y() as f64);
		let is_hovered = state.is_hovered(idx);
		let is_neighbor =
			state.hover.neighbors.contains(&idx) || state.hover.prev_neighbors.contains(&idx);

		let (radius, glow_radius) = if is_hovered {
			(
				NODE_RADIUS * (1.0 + 0.35 * t),
				NODE_RADIUS * (1.8 + 1.2 * t),
			)
		} else if is_neighbor {
			(NODE_RADIUS * (1.0 + 0.2 * t), NODE_RADIUS * (1.4 + 0.6 * t))
		} else {
			(NODE_RADIUS, 0.0)
		};

		if glow_radius > 0.0 && t > 0.01 {
			draw_glow(ctx, x, y, radius, glow_radius, if is_hovered { 0.35 * t } else { 0.2 * t });
		}

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node.data.user_data.color);
		ctx.fill();

		if is_hovered && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		ctx.set_fill_style_str("white");
		ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
		let _ = ctx.fill_text(&node.data.user_data.label, x + radius + 3.0, y + 3.0);
	});
}

fn draw_glow(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64, glow_radius: f64, alpha: f64) {
	let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius) else {
		return;
	};
	let stops = [
		(0.0, format!("rgba(255, 255, 255, {})", alpha)),
		(0.6, format!("rgba(200, 220, 255, {})", alpha * 0.3)),
		(1.0, "rgba(255, 255, 255, 0)".to_string()),
	];
	for (offset, color) in &stops {
		if gradient.add_color_stop(*offset, color).is_err() {
			return;
		}
	}
	ctx.begin_path();
	let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();
}
