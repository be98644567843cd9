//! Force-directed canvas view of a path graph.

mod component;
mod render;
mod resize;
mod state;
mod types;

pub use component::ForceGraphCanvas;
pub use resize::{ObserverWatcher, ResizeWatcher, WindowResizeWatcher, watch_resize};
pub use state::ForceGraphState;
pub use types::{LABEL_MAX_CHARS, LinkPosition, NodePosition, truncate_label};
