use leptos::prelude::*;

use crate::path_graph::GraphData;

/// The parsed steps of the current result, with their total cost.
#[component]
pub fn PathTable(#[prop(into)] graph: Signal<GraphData>) -> impl IntoView {
	view! {
		<Show when=move || graph.with(|g| !g.steps.is_empty())>
			<table class="path-table">
				<thead>
					<tr>
						<th>"From"</th>
						<th>"To"</th>
						<th>"Cost"</th>
					</tr>
				</thead>
				<tbody>
					{move || {
						graph
							.with(|g| {
								g.steps
									.iter()
									.map(|step| {
										view! {
											<tr>
												<td>{step.from_sequence.clone()}</td>
												<td>{step.to_sequence.clone()}</td>
												<td>{step.transition_cost}</td>
											</tr>
										}
									})
									.collect_view()
							})
					}}
				</tbody>
				<tfoot>
					<tr>
						<td colspan="2">"Total"</td>
						<td>{move || graph.with(GraphData::total_cost)}</td>
					</tr>
				</tfoot>
			</table>
		</Show>
	}
}
