use leptos::prelude::*;

use crate::components::force_graph::ForceGraphCanvas;
use crate::components::path_table::PathTable;
use crate::components::run_panel::RunPanel;
use crate::path_graph::GraphData;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let (graph, set_graph) = signal(GraphData::default());

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="path-viewer">
				<aside class="path-viewer-sidebar">
					<h1>"Mutation Path Viewer"</h1>
					<p class="subtitle">
						"Upload sequences, pick a start and end, then drag nodes to inspect the path."
					</p>
					<RunPanel set_graph=set_graph />
					<PathTable graph=graph />
				</aside>
				<div class="path-viewer-graph">
					<ForceGraphCanvas data=graph />
				</div>
			</div>
		</ErrorBoundary>
	}
}
