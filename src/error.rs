//! Error type shared by the API client, config loading and layout parsing.

use wasm_bindgen::JsValue;

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
	#[error("request to {url} failed: {reason}")]
	Network { url: String, reason: String },
	#[error("server answered {status} {status_text}")]
	Status { status: u16, status_text: String },
	#[error("malformed graph payload: missing `{0}`")]
	MalformedPayload(&'static str),
	#[error("invalid JSON: {0}")]
	Json(#[from] serde_json::Error),
	#[error("unknown layout: {0}")]
	UnknownLayout(String),
	#[error("unknown label mode: {0}")]
	UnknownLabelMode(String),
	#[error("browser API unavailable: {0}")]
	Unavailable(&'static str),
	#[error("javascript error: {0}")]
	Js(String),
}

impl From<JsValue> for GraphError {
	fn from(value: JsValue) -> Self {
		let message = value
			.as_string()
			.or_else(|| {
				js_sys::Reflect::get(&value, &JsValue::from_str("message"))
					.ok()
					.and_then(|m| m.as_string())
			})
			.unwrap_or_else(|| format!("{value:?}"));
		GraphError::Js(message)
	}
}

pub type Result<T> = std::result::Result<T, GraphError>;
