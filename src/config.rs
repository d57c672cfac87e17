//! Build-time application settings.

use log::warn;
use serde::Deserialize;

use crate::components::force_graph::LayoutKind;

/// Where the graph API lives and how the front-end talks to it.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
	/// Base URL of the API, without a trailing slash.
	pub api_url: String,
	/// Path of the document graph endpoint below `api_url`.
	pub graph_path: String,
	/// localStorage key holding the bearer token.
	pub token_key: String,
	/// Layout applied when a graph is first shown.
	pub default_layout: String,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			api_url: "https://dev.text-corpus.com/api".to_string(),
			graph_path: "documento/graph".to_string(),
			token_key: "token".to_string(),
			default_layout: "normal".to_string(),
		}
	}
}

impl AppConfig {
	/// Defaults, then `ODS_GRAPH_CONFIG` JSON, then `ODS_API_URL`, all read at build time.
	pub fn load() -> Self {
		Self::from_sources(option_env!("ODS_GRAPH_CONFIG"), option_env!("ODS_API_URL"))
	}

	fn from_sources(json: Option<&str>, api_url: Option<&str>) -> Self {
		let mut config = match json.map(serde_json::from_str::<AppConfig>) {
			Some(Ok(config)) => config,
			Some(Err(err)) => {
				warn!("ignoring ODS_GRAPH_CONFIG: {err}");
				Self::default()
			}
			None => Self::default(),
		};
		if let Some(url) = api_url.filter(|u| !u.is_empty()) {
			config.api_url = url.to_string();
		}
		config
	}

	pub fn graph_url(&self) -> String {
		format!(
			"{}/{}",
			self.api_url.trim_end_matches('/'),
			self.graph_path.trim_matches('/')
		)
	}

	pub fn document_graph_url(&self, id: &str) -> String {
		format!("{}/{}", self.graph_url(), id)
	}

	/// Configured layout, falling back to `normal` for unknown names.
	pub fn default_layout(&self) -> LayoutKind {
		self.default_layout.parse().unwrap_or_else(|err| {
			warn!("{err}, using normal");
			LayoutKind::Normal
		})
	}
}
