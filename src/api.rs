//! Document graph endpoint client.

use log::debug;
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

use crate::components::force_graph::{Attributes, GraphData, GraphLink, GraphNode};
use crate::error::{GraphError, Result};

/// Decodes `{ "graphData": { "nodes": { id: {...} }, "edges": [...] } }`.
///
/// Node order follows the key order of the `nodes` object.
pub fn parse_graph_payload(body: &str) -> Result<GraphData> {
	let payload: Value = serde_json::from_str(body)?;
	let graph = payload
		.get("graphData")
		.ok_or(GraphError::MalformedPayload("graphData"))?;
	let nodes = graph
		.get("nodes")
		.and_then(Value::as_object)
		.ok_or(GraphError::MalformedPayload("nodes"))?;
	let edges = graph
		.get("edges")
		.and_then(Value::as_array)
		.ok_or(GraphError::MalformedPayload("edges"))?;

	let nodes = nodes
		.iter()
		.map(|(id, attrs)| GraphNode {
			id: id.clone(),
			attrs: attrs.as_object().cloned().unwrap_or_else(Attributes::new),
		})
		.collect();
	let links = edges.iter().filter_map(parse_edge).collect();
	Ok(GraphData { nodes, links })
}

fn endpoint(value: Option<&Value>) -> Option<String> {
	match value? {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

fn parse_edge(edge: &Value) -> Option<GraphLink> {
	let (Some(source), Some(target)) = (endpoint(edge.get("source")), endpoint(edge.get("target")))
	else {
		debug!("skipping edge without endpoints: {edge}");
		return None;
	};
	let similarity = match edge.get("similarity") {
		Some(Value::Number(n)) => n.as_f64(),
		Some(Value::String(s)) => s.trim().parse().ok(),
		_ => None,
	};
	Some(GraphLink {
		source,
		target,
		similarity,
	})
}

/// Bearer token from localStorage, when one is stored.
pub fn stored_token(key: &str) -> Option<String> {
	web_sys::window()?
		.local_storage()
		.ok()
		.flatten()?
		.get_item(key)
		.ok()
		.flatten()
}

/// One authenticated GET of a document graph.
pub async fn fetch_graph(url: &str, token: Option<&str>) -> Result<GraphData> {
	let window = web_sys::window().ok_or(GraphError::Unavailable("window"))?;

	let headers = Headers::new()?;
	headers.set("Content-Type", "application/json")?;
	if let Some(token) = token {
		headers.set("Authorization", &format!("Bearer {token}"))?;
	}
	let init = RequestInit::new();
	init.set_method("GET");
	init.set_mode(RequestMode::Cors);
	init.set_headers(&headers);
	let request = Request::new_with_str_and_init(url, &init)?;

	let response = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(|err| GraphError::Network {
			url: url.to_string(),
			reason: GraphError::from(err).to_string(),
		})?;
	let response: Response = response.dyn_into()?;
	if !response.ok() {
		return Err(GraphError::Status {
			status: response.status(),
			status_text: response.status_text(),
		});
	}

	let body = JsFuture::from(response.text()?).await?;
	let body = body.as_string().ok_or(GraphError::MalformedPayload("body"))?;
	parse_graph_payload(&body)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn nodes_keep_object_order_and_attributes() {
		let data = parse_graph_payload(
			r#"{"graphData": {
				"nodes": {"water": {"count": 3}, "energy": {"count": 1}, "alone": 7},
				"edges": [{"source": "water", "target": "energy", "similarity": 0.42}]
			}}"#,
		)
		.unwrap();
		let ids: Vec<&str> = data.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec!["water", "energy", "alone"]);
		assert_eq!(data.nodes[0].attrs["count"], 3);
		assert!(data.nodes[2].attrs.is_empty());
		assert_eq!(data.links[0].similarity, Some(0.42));
	}

	#[test]
	fn similarity_accepts_numeric_strings_and_defaults() {
		let data = parse_graph_payload(
			r#"{"graphData": {"nodes": {"1": {}, "2": {}}, "edges": [
				{"source": 1, "target": "2", "similarity": " 0.5 "},
				{"source": "2", "target": "1", "similarity": "high"},
				{"source": "2", "target": "1", "similarity": 0},
				{"target": "1"}
			]}}"#,
		)
		.unwrap();
		assert_eq!(data.links.len(), 3);
		assert_eq!(data.links[0].source, "1");
		assert_eq!(data.links[0].similarity, Some(0.5));
		assert_eq!(data.links[1].similarity_or_default(), 1.0);
		assert_eq!(data.links[2].similarity_or_default(), 1.0);
	}

	#[test]
	fn missing_sections_are_malformed() {
		let missing = |body: &str| match parse_graph_payload(body) {
			Err(GraphError::MalformedPayload(what)) => what,
			other => panic!("expected malformed payload, got {other:?}"),
		};
		assert_eq!(missing(r#"{"nodes": {}}"#), "graphData");
		assert_eq!(missing(r#"{"graphData": {"edges": []}}"#), "nodes");
		assert_eq!(missing(r#"{"graphData": {"nodes": {}}}"#), "edges");
		assert!(matches!(parse_graph_payload("nope"), Err(GraphError::Json(_))));
	}
}
