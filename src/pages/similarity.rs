use leptos::prelude::*;

use super::document_graph;
use crate::components::similarity_graph::SimilarityGraph;

/// Term similarity view of the routed document
#[component]
pub fn DocumentSimilarity() -> impl IntoView {
	let graph_data = document_graph();

	view! {
		<section class="similarity-page">
			<h1>"Term Similarity"</h1>
			<p class="subtitle">"Click a word to focus its neighbours. Click an edge to show its similarity."</p>
			<SimilarityGraph data=graph_data />
		</section>
	}
}
