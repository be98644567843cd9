use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use super::resize::{ResizeWatcher, watch_resize};
use super::state::ForceGraphState;
use crate::path_graph::GraphData;

const FRAME_DT: f32 = 0.016;

type SharedState = Rc<RefCell<Option<ForceGraphState>>>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// `requestAnimationFrame` loop, cancelled on drop.
struct AnimationLoop {
	callback: FrameCallback,
	pending: Rc<Cell<Option<i32>>>,
}

impl AnimationLoop {
	fn start(mut frame: impl FnMut() + 'static) -> Self {
		let callback: FrameCallback = Rc::new(RefCell::new(None));
		let pending = Rc::new(Cell::new(None));
		let (callback_inner, pending_inner) = (callback.clone(), pending.clone());
		*callback.borrow_mut() = Some(Closure::new(move || {
			pending_inner.set(None);
			frame();
			request_frame(&callback_inner, &pending_inner);
		}));
		request_frame(&callback, &pending);
		Self { callback, pending }
	}
}

fn request_frame(callback: &FrameCallback, pending: &Cell<Option<i32>>) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let callback = callback.borrow();
	let Some(cb) = callback.as_ref() else {
		return;
	};
	if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
		pending.set(Some(id));
	}
}

impl Drop for AnimationLoop {
	fn drop(&mut self) {
		if let (Some(id), Some(window)) = (self.pending.take(), web_sys::window()) {
			let _ = window.cancel_animation_frame(id);
		}
		// breaks the closure's reference to itself
		self.callback.borrow_mut().take();
	}
}

/// Browser resources owned by a mounted graph.
#[derive(Default)]
struct GraphHandles {
	frames: Option<AnimationLoop>,
	watcher: Option<Box<dyn ResizeWatcher>>,
}

impl GraphHandles {
	fn release(&mut self) {
		if let Some(mut watcher) = self.watcher.take() {
			watcher.detach();
		}
		self.frames.take();
	}
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

/// Pixel size of the element the canvas fills.
fn container_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.unwrap_or((0.0, 0.0))
}

fn pointer_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Clear the surface and build a fresh simulation for `data`.
///
/// Leaves the state empty when there is nothing to draw or the container
/// has no area.
fn relayout(canvas: &HtmlCanvasElement, state: &SharedState, data: &GraphData) {
	state.borrow_mut().take();
	let Some(ctx) = context_2d(canvas) else {
		warn!("canvas has no 2d context");
		return;
	};
	render::clear(&ctx, canvas.width() as f64, canvas.height() as f64);
	if data.is_empty() {
		return;
	}

	let (w, h) = container_size(canvas);
	if w <= 0.0 || h <= 0.0 {
		debug!("graph container has no area, skipping layout");
		return;
	}
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);
	*state.borrow_mut() = ForceGraphState::new(data, w, h);
}

#[component]
pub fn ForceGraphCanvas(#[prop(into)] data: Signal<GraphData>) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let context: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));
	let handles = StoredValue::new_local(GraphHandles::default());

	let (state_fx, context_fx) = (state.clone(), context.clone());
	Effect::new(move |_| {
		let graph = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		relayout(&canvas, &state_fx, &graph);
		*context_fx.borrow_mut() = context_2d(&canvas);

		handles.update_value(|h| {
			if h.frames.is_none() {
				let (state_anim, context_anim) = (state_fx.clone(), context_fx.clone());
				h.frames = Some(AnimationLoop::start(move || {
					if let Some(ref mut s) = *state_anim.borrow_mut() {
						s.tick(FRAME_DT);
						if let Some(ref ctx) = *context_anim.borrow() {
							render::render(s, ctx);
						}
					}
				}));
			}
			if h.watcher.is_none() {
				let Some(container) = canvas.parent_element() else {
					return;
				};
				let (state_rs, canvas_rs) = (state_fx.clone(), canvas.clone());
				h.watcher = watch_resize(
					&container,
					Rc::new(move || {
						let (width, height) = container_size(&canvas_rs);
						let unchanged = state_rs
							.borrow()
							.as_ref()
							.is_some_and(|s| !s.size_differs(width, height));
						if unchanged {
							return;
						}
						let Some(graph) = data.try_get_untracked() else {
							return;
						};
						debug!("container resized to {}x{}, laying out again", width, height);
						relayout(&canvas_rs, &state_rs, &graph);
					}),
				);
			}
		});
	});

	on_cleanup(move || {
		handles.try_update_value(GraphHandles::release);
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = pointer_position(&canvas.into(), &ev);

		if let Some(ref mut s) = *state_md.borrow_mut() {
			if let Some(idx) = s.node_at_position(x, y) {
				s.drag_start(idx, x, y);
			} else {
				s.pan.active = true;
				s.pan.start_x = x;
				s.pan.start_y = y;
				s.pan.transform_start_x = s.transform.x;
				s.pan.transform_start_y = s.transform.y;
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = pointer_position(&canvas.into(), &ev);

		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.drag.active {
				s.drag_to(x, y);
			} else {
				let hovered = s.node_at_position(x, y);
				s.set_hover(hovered);
				if s.pan.active {
					s.transform.x = s.pan.transform_start_x + (x - s.pan.start_x);
					s.transform.y = s.pan.transform_start_y + (y - s.pan.start_y);
				}
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			if s.drag.active {
				s.drag_end();
			}
			s.pan.active = false;
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			if s.drag.active {
				s.drag_end();
			}
			s.pan.active = false;
			s.set_hover(None);
		}
	};

	let state_wh = state;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = pointer_position(&canvas.into(), &ev);

		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (s.transform.k * factor).clamp(0.1, 10.0);
			let ratio = new_k / s.transform.k;
			s.transform.x = x - (x - s.transform.x) * ratio;
			s.transform.y = y - (y - s.transform.y) * ratio;
			s.transform.k = new_k;
		}
	};

	view! {
		<div class="force-graph-container" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="force-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; width: 100%; height: 100%; cursor: grab;"
			/>
		</div>
	}
}
