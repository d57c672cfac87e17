//! Canvas plumbing shared by the graph components.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlAnchorElement, HtmlCanvasElement, MouseEvent};

use crate::error::{GraphError, Result};

pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
	canvas
		.get_context("2d")?
		.ok_or(GraphError::Unavailable("2d context"))?
		.dyn_into()
		.map_err(|_| GraphError::Unavailable("2d context"))
}

/// Cursor position relative to the canvas' top-left corner.
pub fn event_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

pub fn window_size() -> Option<(f64, f64)> {
	let window = web_sys::window()?;
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Size of the canvas' parent element, or `fallback` when detached.
pub fn parent_size(canvas: &HtmlCanvasElement, fallback: (f64, f64)) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or(fallback)
}

/// Serializes the canvas to PNG and triggers a browser download.
pub fn download_png(canvas: &HtmlCanvasElement, filename: &str) -> Result<()> {
	let url = canvas.to_data_url_with_type("image/png")?;
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or(GraphError::Unavailable("document"))?;
	let anchor: HtmlAnchorElement = document
		.create_element("a")?
		.dyn_into()
		.map_err(|_| GraphError::Unavailable("anchor element"))?;
	anchor.set_href(&url);
	anchor.set_download(filename);
	anchor.click();
	log::info!("exported canvas as {filename}");
	Ok(())
}
