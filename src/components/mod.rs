//! UI components.

pub mod force_graph;
pub mod path_table;
pub mod run_panel;
pub mod save;
