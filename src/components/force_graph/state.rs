use std::collections::HashSet;

use super::engine::LayoutEngine;
use super::layout::LayoutKind;
use super::types::{GraphData, Point, Viewport};

pub const HIT_RADIUS: f64 = 12.0;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Point,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<usize>,
	pub neighbors: HashSet<usize>,
}

pub struct ForceGraphState {
	pub engine: LayoutEngine,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
}

impl ForceGraphState {
	pub fn new(width: f64, height: f64, seed: u64) -> Self {
		Self {
			engine: LayoutEngine::new(Viewport::new(width, height), seed),
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
		}
	}

	/// Swaps in a new data set and drops interaction state tied to old indices.
	pub fn load(&mut self, data: &GraphData, layout: LayoutKind) {
		self.drag = DragState::default();
		self.hover = HoverState::default();
		self.engine.set_data(data);
		if self.engine.layout().is_none() {
			self.engine.apply_layout(layout);
		}
	}

	pub fn select_layout(&mut self, name: &str) -> Option<LayoutKind> {
		let selected = self.engine.select_layout(name);
		if selected.is_some() {
			self.engine.drag_end();
			self.drag = DragState::default();
		}
		selected
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		Point::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		// HIT_RADIUS is in world-space, scales with zoom like nodes
		self.engine.node_at(self.screen_to_graph(sx, sy), HIT_RADIUS)
	}

	/// Starts dragging the node under the cursor, or panning when there is none.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		match self.node_at_position(sx, sy) {
			Some(idx) => {
				self.drag = DragState {
					active: true,
					node_idx: Some(idx),
					start_x: sx,
					start_y: sy,
					node_start: self.engine.positions()[idx],
				};
				self.engine.drag_start(idx);
			}
			None => {
				self.pan = PanState {
					active: true,
					start_x: sx,
					start_y: sy,
					transform_start_x: self.transform.x,
					transform_start_y: self.transform.y,
				};
			}
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if !self.drag.active {
			let hovered = self.node_at_position(sx, sy);
			self.set_hover(hovered);
		}

		if self.drag.active {
			let (dx, dy) = (
				(sx - self.drag.start_x) / self.transform.k,
				(sy - self.drag.start_y) / self.transform.k,
			);
			self.engine.drag_move(Point::new(
				self.drag.node_start.x + dx,
				self.drag.node_start.y + dy,
			));
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
	}

	pub fn pointer_up(&mut self) {
		if self.drag.active {
			self.engine.drag_end();
		}
		self.drag = DragState::default();
		self.pan.active = false;
	}

	pub fn pointer_leave(&mut self) {
		self.pointer_up();
		self.set_hover(None);
	}

	/// Zooms by one wheel notch, keeping the graph point under the cursor fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn set_hover(&mut self, node: Option<usize>) {
		if self.hover.node == node {
			return;
		}
		self.hover.node = node;
		self.hover.neighbors = node
			.map(|idx| self.engine.graph().neighbors(idx))
			.unwrap_or_default();
	}

	pub fn is_highlighted(&self, idx: usize) -> bool {
		self.hover.node == Some(idx) || self.hover.neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: usize) -> bool {
		self.hover.node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some()
	}

	/// Tooltip body for the hovered node: its id and pretty-printed attributes.
	pub fn tooltip(&self) -> Option<String> {
		let node = self.engine.graph().nodes.get(self.hover.node?)?;
		let attrs = serde_json::to_string_pretty(&node.attrs).unwrap_or_default();
		Some(format!("Node: {}\nAttributes:\n{}", node.id, attrs))
	}

	pub fn tick(&mut self) -> bool {
		self.engine.tick()
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.engine.resize(Viewport::new(width, height));
	}
}
