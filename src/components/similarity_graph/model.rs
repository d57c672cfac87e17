//! Term similarity graph with click-driven neighbourhood filtering.
//!
//! Clicking a node while the view is unfiltered hides everything except that
//! node, its outgoing edges and their targets. Clicking any node again shows
//! the whole graph. Edge labels are toggled individually by clicking edges.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde_json::Value;

use crate::components::force_graph::{Graph, GraphData, Point, Viewport};
use crate::error::GraphError;

pub const NODE_HEIGHT: f64 = 30.0;
const CHAR_WIDTH: f64 = 8.0;
const PADDING: f64 = 30.0;
const EDGE_HIT_TOLERANCE: f64 = 4.0;

#[derive(Clone, Debug, PartialEq)]
pub struct TermNode {
	pub id: String,
	pub label: String,
	pub count: u64,
}

impl TermNode {
	/// Box width grows with the label, eight pixels per character.
	pub fn width(&self) -> f64 {
		self.label.chars().count() as f64 * CHAR_WIDTH
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct TermEdge {
	pub id: String,
	pub source: usize,
	pub target: usize,
	pub similarity: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LabelMode {
	#[default]
	Numeric,
	Text,
}

impl LabelMode {
	pub fn format(self, similarity: f64) -> String {
		match self {
			// ties round away from zero
			LabelMode::Numeric => format!("{:.2}", (similarity * 100.0).round() / 100.0),
			LabelMode::Text => format!("Sim: {similarity}"),
		}
	}

	pub fn value(self) -> &'static str {
		match self {
			LabelMode::Numeric => "number",
			LabelMode::Text => "string",
		}
	}
}

impl fmt::Display for LabelMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.value())
	}
}

impl FromStr for LabelMode {
	type Err = GraphError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"number" => Ok(LabelMode::Numeric),
			"string" => Ok(LabelMode::Text),
			other => Err(GraphError::UnknownLabelMode(other.to_string())),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mark {
	Plain,
	Clicked,
	Highlighted,
}

#[derive(Clone, Debug)]
struct Filter {
	clicked: usize,
	targets: HashSet<usize>,
	edges: HashSet<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct SimilarityView {
	nodes: Vec<TermNode>,
	edges: Vec<TermEdge>,
	positions: Vec<Point>,
	filter: Option<Filter>,
	labelled: HashSet<String>,
	label_mode: LabelMode,
	selected: Option<String>,
}

impl SimilarityView {
	pub fn from_data(data: &GraphData) -> Self {
		let graph = Graph::from_data(data);
		let nodes: Vec<TermNode> = graph
			.nodes
			.iter()
			.map(|node| TermNode {
				id: node.id.clone(),
				label: node
					.attrs
					.get("label")
					.and_then(Value::as_str)
					.unwrap_or(&node.id)
					.to_string(),
				count: node.attrs.get("count").and_then(Value::as_u64).unwrap_or(0),
			})
			.collect();
		let edges = graph
			.edges
			.iter()
			.map(|e| TermEdge {
				id: format!("{}-{}", nodes[e.source].id, nodes[e.target].id),
				source: e.source,
				target: e.target,
				similarity: e.similarity,
			})
			.collect();
		let positions = vec![Point::default(); nodes.len()];
		Self {
			nodes,
			edges,
			positions,
			..Self::default()
		}
	}

	pub fn nodes(&self) -> &[TermNode] {
		&self.nodes
	}

	pub fn edges(&self) -> &[TermEdge] {
		&self.edges
	}

	pub fn positions(&self) -> &[Point] {
		&self.positions
	}

	/// Picker entries, sorted by label ignoring case.
	pub fn node_options(&self) -> Vec<&TermNode> {
		let mut options: Vec<&TermNode> = self.nodes.iter().collect();
		options.sort_by_cached_key(|n| (n.label.to_lowercase(), n.label.clone(), n.id.clone()));
		options
	}

	/// Scatters node centres uniformly inside the padded viewport.
	pub fn layout<R: Rng>(&mut self, viewport: Viewport, rng: &mut R) {
		let span = |extent: f64| (extent - 2.0 * PADDING).max(0.0);
		let (w, h) = (span(viewport.width), span(viewport.height));
		let (x0, y0) = (
			(viewport.width - w) / 2.0,
			(viewport.height - h) / 2.0,
		);
		self.positions = (0..self.nodes.len())
			.map(|_| {
				Point::new(
					x0 + rng.random::<f64>() * w,
					y0 + rng.random::<f64>() * h,
				)
			})
			.collect();
	}

	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.nodes.iter().position(|n| n.id == id)
	}

	/// Toggles the neighbourhood filter around `id`.
	pub fn click_node(&mut self, id: &str) {
		if self.filter.take().is_some() {
			return;
		}
		let Some(clicked) = self.index_of(id) else {
			return;
		};
		let edges: HashSet<usize> = self
			.edges
			.iter()
			.enumerate()
			.filter(|(_, e)| e.source == clicked)
			.map(|(i, _)| i)
			.collect();
		let targets = edges.iter().map(|&i| self.edges[i].target).collect();
		self.filter = Some(Filter {
			clicked,
			targets,
			edges,
		});
	}

	/// Picker selection: focuses the chosen word, or clears the filter when
	/// the placeholder is picked.
	pub fn select_word(&mut self, id: &str) {
		self.filter = None;
		if id.is_empty() {
			self.selected = None;
			return;
		}
		self.selected = Some(id.to_string());
		self.click_node(id);
	}

	pub fn selected(&self) -> Option<&str> {
		self.selected.as_deref()
	}

	pub fn click_edge(&mut self, edge_id: &str) {
		if !self.labelled.remove(edge_id) {
			self.labelled.insert(edge_id.to_string());
		}
	}

	pub fn is_filtered(&self) -> bool {
		self.filter.is_some()
	}

	pub fn node_mark(&self, idx: usize) -> Mark {
		match &self.filter {
			Some(f) if f.clicked == idx => Mark::Clicked,
			Some(f) if f.targets.contains(&idx) => Mark::Highlighted,
			_ => Mark::Plain,
		}
	}

	pub fn node_visible(&self, idx: usize) -> bool {
		match &self.filter {
			Some(f) => f.clicked == idx || f.targets.contains(&idx),
			None => idx < self.nodes.len(),
		}
	}

	pub fn edge_visible(&self, idx: usize) -> bool {
		match &self.filter {
			Some(f) => f.edges.contains(&idx),
			None => idx < self.edges.len(),
		}
	}

	/// Label text for a clicked edge; `None` while its label is hidden.
	pub fn edge_label(&self, idx: usize) -> Option<String> {
		let edge = self.edges.get(idx)?;
		self.labelled
			.contains(&edge.id)
			.then(|| self.label_mode.format(edge.similarity))
	}

	pub fn label_mode(&self) -> LabelMode {
		self.label_mode
	}

	pub fn set_label_mode(&mut self, mode: LabelMode) {
		self.label_mode = mode;
	}

	/// Visible node whose box contains `at`, topmost first.
	pub fn node_at(&self, at: Point) -> Option<usize> {
		(0..self.nodes.len()).rev().find(|&i| {
			let (c, half_w) = (self.positions[i], self.nodes[i].width() / 2.0);
			self.node_visible(i)
				&& (at.x - c.x).abs() <= half_w.max(NODE_HEIGHT / 2.0)
				&& (at.y - c.y).abs() <= NODE_HEIGHT / 2.0
		})
	}

	/// Visible edge passing within a few pixels of `at`.
	pub fn edge_at(&self, at: Point) -> Option<usize> {
		self.edges.iter().enumerate().find_map(|(i, e)| {
			let d = segment_distance(at, self.positions[e.source], self.positions[e.target]);
			(self.edge_visible(i) && d <= EDGE_HIT_TOLERANCE).then_some(i)
		})
	}
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len2 = dx * dx + dy * dy;
	if len2 == 0.0 {
		return p.distance(a);
	}
	let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
	p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::{GraphLink, GraphNode};
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	fn view() -> SimilarityView {
		let data = GraphData {
			nodes: vec![
				GraphNode::new("water").with_attr("count", 4),
				GraphNode::new("energy").with_attr("label", "Energy"),
				GraphNode::new("climate"),
				GraphNode::new("poverty"),
			],
			links: vec![
				GraphLink {
					similarity: Some(0.8567),
					..GraphLink::new("water", "energy")
				},
				GraphLink {
					similarity: Some(0.5),
					..GraphLink::new("water", "climate")
				},
				GraphLink::new("climate", "poverty"),
			],
		};
		SimilarityView::from_data(&data)
	}

	#[test]
	fn nodes_carry_labels_and_counts() {
		let v = view();
		assert_eq!(v.nodes()[0].count, 4);
		assert_eq!(v.nodes()[1].label, "Energy");
		assert_eq!(v.nodes()[2].label, "climate");
		assert_eq!(v.edges()[0].id, "water-energy");
	}

	#[test]
	fn options_are_sorted_by_label() {
		let v = view();
		let labels: Vec<&str> = v.node_options().iter().map(|n| n.label.as_str()).collect();
		assert_eq!(labels, vec!["climate", "Energy", "poverty", "water"]);
	}

	#[test]
	fn clicking_a_node_filters_to_outgoing_neighbourhood() {
		let mut v = view();
		v.click_node("water");
		assert!(v.is_filtered());
		assert_eq!(v.node_mark(0), Mark::Clicked);
		assert_eq!(v.node_mark(1), Mark::Highlighted);
		assert_eq!(v.node_mark(2), Mark::Highlighted);
		assert!(!v.node_visible(3));
		assert!(v.edge_visible(0) && v.edge_visible(1));
		assert!(!v.edge_visible(2));

		v.click_node("poverty");
		assert!(!v.is_filtered());
		assert!((0..4).all(|i| v.node_visible(i) && v.node_mark(i) == Mark::Plain));
		assert!(v.edge_visible(2));
	}

	#[test]
	fn incoming_edges_do_not_count() {
		let mut v = view();
		v.click_node("energy");
		assert!(v.is_filtered());
		assert!(v.node_visible(1));
		assert!(!v.node_visible(0));
		assert!((0..3).all(|i| !v.edge_visible(i)));
	}

	#[test]
	fn unknown_node_click_is_a_no_op() {
		let mut v = view();
		v.click_node("nowhere");
		assert!(!v.is_filtered());
	}

	#[test]
	fn picking_a_word_refocuses() {
		let mut v = view();
		v.select_word("water");
		v.select_word("climate");
		assert_eq!(v.selected(), Some("climate"));
		assert_eq!(v.node_mark(2), Mark::Clicked);
		v.select_word("");
		assert!(!v.is_filtered());
	}

	#[test]
	fn edge_labels_toggle_and_follow_mode() {
		let mut v = view();
		assert_eq!(v.edge_label(0), None);
		v.click_edge("water-energy");
		assert_eq!(v.edge_label(0).as_deref(), Some("0.86"));
		v.set_label_mode("string".parse().unwrap());
		assert_eq!(v.edge_label(0).as_deref(), Some("Sim: 0.8567"));
		assert_eq!(v.edge_label(2), None);
		v.click_edge("water-energy");
		assert_eq!(v.edge_label(0), None);
	}

	#[test]
	fn numeric_labels_round_ties_up() {
		assert_eq!(LabelMode::Numeric.format(0.125), "0.13");
		assert_eq!(LabelMode::Numeric.format(0.625), "0.63");
		assert_eq!(LabelMode::Numeric.format(-0.125), "-0.13");
		assert_eq!(LabelMode::Numeric.format(1.0), "1.00");
		assert_eq!(LabelMode::Text.format(0.125), "Sim: 0.125");
	}

	#[test]
	fn layout_respects_padding_and_hit_tests() {
		let mut v = view();
		let vp = Viewport::new(400.0, 300.0);
		v.layout(vp, &mut SmallRng::seed_from_u64(9));
		for p in v.positions() {
			assert!((PADDING..=370.0).contains(&p.x) && (PADDING..=270.0).contains(&p.y));
		}
		let c = v.positions()[3];
		assert_eq!(v.node_at(c), Some(3));
		v.click_node("water");
		assert_ne!(v.node_at(c), Some(3));
	}

	#[test]
	fn edge_hit_uses_segment_distance() {
		assert_eq!(
			segment_distance(
				Point::new(5.0, 3.0),
				Point::new(0.0, 0.0),
				Point::new(10.0, 0.0)
			),
			3.0
		);
		assert_eq!(
			segment_distance(
				Point::new(-4.0, 0.0),
				Point::new(0.0, 0.0),
				Point::new(0.0, 0.0)
			),
			4.0
		);
	}
}
