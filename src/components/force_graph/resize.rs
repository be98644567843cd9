//! Container resize notification.
//!
//! Uses `ResizeObserver` on the container when the runtime has it and falls
//! back to the window `resize` event otherwise. Dropping a watcher detaches
//! it.

use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Element, ResizeObserver, Window};

/// A live resize subscription.
pub trait ResizeWatcher {
	/// Which mechanism backs this watcher, for logging.
	fn mechanism(&self) -> &'static str;

	/// Stop delivering notifications. Safe to call more than once.
	fn detach(&mut self);
}

/// Observes one element through `ResizeObserver`.
pub struct ObserverWatcher {
	observer: Option<ResizeObserver>,
	_callback: Closure<dyn FnMut(js_sys::Array)>,
}

impl ObserverWatcher {
	pub fn attach(target: &Element, on_resize: Rc<dyn Fn()>) -> Result<Self, JsValue> {
		let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |_entries: js_sys::Array| {
			on_resize();
		});
		let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
		observer.observe(target);
		Ok(Self {
			observer: Some(observer),
			_callback: callback,
		})
	}
}

impl ResizeWatcher for ObserverWatcher {
	fn mechanism(&self) -> &'static str {
		"ResizeObserver"
	}

	fn detach(&mut self) {
		if let Some(observer) = self.observer.take() {
			observer.disconnect();
		}
	}
}

impl Drop for ObserverWatcher {
	fn drop(&mut self) {
		self.detach();
	}
}

/// Listens for `resize` on the window.
pub struct WindowResizeWatcher {
	window: Option<Window>,
	callback: Closure<dyn FnMut()>,
}

impl WindowResizeWatcher {
	pub fn attach(window: Window, on_resize: Rc<dyn Fn()>) -> Result<Self, JsValue> {
		let callback = Closure::<dyn FnMut()>::new(move || on_resize());
		window.add_event_listener_with_callback("resize", callback.as_ref().unchecked_ref())?;
		Ok(Self {
			window: Some(window),
			callback,
		})
	}
}

impl ResizeWatcher for WindowResizeWatcher {
	fn mechanism(&self) -> &'static str {
		"window resize event"
	}

	fn detach(&mut self) {
		if let Some(window) = self.window.take() {
			let _ = window
				.remove_event_listener_with_callback("resize", self.callback.as_ref().unchecked_ref());
		}
	}
}

impl Drop for WindowResizeWatcher {
	fn drop(&mut self) {
		self.detach();
	}
}

fn has_resize_observer(window: &Window) -> bool {
	js_sys::Reflect::has(window, &JsValue::from_str("ResizeObserver")).unwrap_or(false)
}

/// Subscribe `on_resize` to size changes of `target`.
pub fn watch_resize(target: &Element, on_resize: Rc<dyn Fn()>) -> Option<Box<dyn ResizeWatcher>> {
	let window = web_sys::window()?;
	let watcher: Result<Box<dyn ResizeWatcher>, JsValue> = if has_resize_observer(&window) {
		ObserverWatcher::attach(target, on_resize).map(|w| Box::new(w) as Box<dyn ResizeWatcher>)
	} else {
		WindowResizeWatcher::attach(window, on_resize).map(|w| Box::new(w) as Box<dyn ResizeWatcher>)
	};
	match watcher {
		Ok(w) => {
			debug!("watching container size via {}", w.mechanism());
			Some(w)
		}
		Err(e) => {
			warn!("could not watch container size: {:?}", e);
			None
		}
	}
}
