use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::error;
use web_sys::HtmlInputElement;

use super::save::{read_file, save_bytes};
use crate::api::{HttpBackend, OutputFormat};
use crate::config::ApiConfig;
use crate::error::{RunFailure, RunStage};
use crate::path_graph::GraphData;
use crate::run::{DEFAULT_MAX_COST, RunController, RunForm, RunPhase, parse_max_cost};

/// Upload, parameter entry and run controls.
///
/// Each finished run replaces the graph through `set_graph`.
#[component]
pub fn RunPanel(set_graph: WriteSignal<GraphData>) -> impl IntoView {
	let controller = StoredValue::new_local(Rc::new(RunController::new(HttpBackend::new(
		ApiConfig::from_env(),
	))));

	let saved_file = RwSignal::new(None::<String>);
	let uploading = RwSignal::new(false);
	let start_node = RwSignal::new(String::new());
	let end_node = RwSignal::new(String::new());
	let max_cost = RwSignal::new(DEFAULT_MAX_COST.to_string());
	let output_format = RwSignal::new(OutputFormat::default());
	let phase = RwSignal::new(RunPhase::Idle);
	let result_file = RwSignal::new(None::<String>);
	let notice = RwSignal::new(None::<String>);

	let form = move || RunForm {
		input_path: saved_file.get(),
		start_node: start_node.get(),
		end_node: end_node.get(),
		max_cost: parse_max_cost(&max_cost.get()),
		output_format: output_format.get(),
	};
	let busy = move || uploading.get() || phase.get().is_busy();
	let can_start = move || !busy() && form().parameters().is_some();

	let on_file = move |ev: web_sys::Event| {
		let input: HtmlInputElement = event_target(&ev);
		let Some(file) = input.files().and_then(|files| files.get(0)) else {
			return;
		};
		saved_file.set(None);
		notice.set(None);
		uploading.set(true);
		let controller = controller.get_value();
		spawn_local(async move {
			let uploaded = match read_file(&file).await {
				Ok(bytes) => controller.upload(&file.name(), bytes).await,
				Err(e) => Some(Err(RunFailure::new(RunStage::Upload, e))),
			};
			match uploaded {
				Some(Ok(saved)) => saved_file.set(Some(saved)),
				Some(Err(failure)) => notice.set(Some(failure.user_message())),
				None => {}
			}
			uploading.set(false);
		});
	};

	let on_start = move |_| {
		let form = untrack(form);
		let controller = controller.get_value();
		if uploading.get_untracked() || !controller.can_start(&form) {
			return;
		}
		notice.set(None);
		result_file.set(None);
		set_graph.set(GraphData::default());
		spawn_local(async move {
			let finished = controller.start(&form, move |p| phase.set(p.clone())).await;
			if let Some(Ok(outcome)) = finished {
				result_file.set(Some(outcome.result_file));
				set_graph.set(outcome.graph);
			}
		});
	};

	let on_download = move |_| {
		let Some(filename) = result_file.get_untracked() else {
			return;
		};
		let controller = controller.get_value();
		spawn_local(async move {
			match controller.fetch_result(&filename).await {
				Ok(bytes) => {
					if let Err(e) = save_bytes(&filename, &bytes) {
						error!("could not save {}: {:?}", filename, e);
						notice.set(Some(format!("Could not save {}.", filename)));
					}
				}
				Err(failure) => notice.set(Some(failure.user_message())),
			}
		});
	};

	view! {
		<form class="run-panel" on:submit=|ev| ev.prevent_default()>
			<label>
				"Sequence file"
				<input type="file" on:change=on_file prop:disabled=busy />
			</label>
			<p class="upload-status">
				{move || {
					if uploading.get() {
						Some("Uploading…".to_string())
					} else {
						saved_file.get().map(|f| format!("Uploaded as {}", f))
					}
				}}
			</p>

			<label>
				"Start sequence"
				<input
					type="text"
					prop:value=move || start_node.get()
					on:input=move |ev| start_node.set(event_target_value(&ev))
				/>
			</label>
			<label>
				"End sequence"
				<input
					type="text"
					prop:value=move || end_node.get()
					on:input=move |ev| end_node.set(event_target_value(&ev))
				/>
			</label>
			<label>
				"Max cost"
				<input
					type="number"
					min="0"
					prop:value=move || max_cost.get()
					on:input=move |ev| max_cost.set(event_target_value(&ev))
				/>
			</label>
			<label>
				"Output format"
				<select on:change=move |ev| {
					if let Some(format) = OutputFormat::from_name(&event_target_value(&ev)) {
						output_format.set(format);
					}
				}>
					{OutputFormat::ALL
						.into_iter()
						.map(|format| {
							view! {
								<option
									value=format.as_str()
									selected=move || output_format.get() == format
								>
									{format.as_str()}
								</option>
							}
						})
						.collect_view()}
				</select>
			</label>

			<button type="button" on:click=on_start disabled=move || !can_start()>
				{move || if phase.get().is_busy() { "Running…" } else { "Find path" }}
			</button>
			<Show when=move || result_file.get().is_some()>
				<button type="button" on:click=on_download>
					"Download result"
				</button>
			</Show>

			<p class="run-status">{move || phase.get().to_string()}</p>
			<p class="run-notice">{move || notice.get()}</p>
		</form>
	}
}
