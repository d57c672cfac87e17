use leptos::prelude::*;

use super::document_graph;
use crate::components::force_graph::ForceGraphCanvas;
use crate::config::AppConfig;

/// Full-screen document graph with the layout menu
#[component]
pub fn Home() -> impl IntoView {
	let graph_data = document_graph();
	let layout = use_context::<AppConfig>()
		.unwrap_or_default()
		.default_layout();

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

			<div class="fullscreen-graph">
				<ForceGraphCanvas data=graph_data layout=layout fullscreen=true />
				<div class="graph-overlay">
					<h1>"Document Graph"</h1>
					<p class="subtitle">"Pick a layout. Drag nodes to reposition. Scroll to zoom. Drag background to pan."</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
