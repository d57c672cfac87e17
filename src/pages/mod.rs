pub mod home;
pub mod not_found;
pub mod similarity;

use leptos::prelude::*;
use leptos_router::hooks::use_params_map;
use log::{error, info};

use crate::api;
use crate::components::force_graph::GraphData;
use crate::config::AppConfig;

/// Graph signal filled by one fetch of the routed document; stays empty on failure.
pub(crate) fn document_graph() -> RwSignal<GraphData> {
	let graph = RwSignal::new(GraphData::default());
	let config = use_context::<AppConfig>().unwrap_or_default();
	let params = use_params_map();

	Effect::new(move |_| {
		let url = match params.read().get("id") {
			Some(id) => config.document_graph_url(&id),
			None => config.graph_url(),
		};
		let token = api::stored_token(&config.token_key);
		leptos::task::spawn_local(async move {
			match api::fetch_graph(&url, token.as_deref()).await {
				Ok(data) => {
					info!("loaded {} nodes, {} links from {url}", data.nodes.len(), data.links.len());
					graph.set(data);
				}
				Err(err) => error!("failed to load graph from {url}: {err}"),
			}
		});
	});

	graph
}
