//! Drawable primitives derived from the graph and its current positions.

use super::scale::{EdgeScales, group_color};
use super::types::{Graph, Point};

pub const NODE_RADIUS: f64 = 5.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Line {
	pub edge: usize,
	pub from: Point,
	pub to: Point,
	pub color: String,
	pub width: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Circle {
	pub node: usize,
	pub center: Point,
	pub radius: f64,
	pub color: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Label {
	pub node: usize,
	pub anchor: Point,
	pub text: String,
}

/// Per-edge stroke, computed once per data set.
#[derive(Clone, Debug, Default)]
pub struct EdgeStyles {
	styles: Vec<(String, f64)>,
}

impl EdgeStyles {
	pub fn for_graph(graph: &Graph) -> Self {
		let scales = EdgeScales::from_similarities(graph.edges.iter().map(|e| e.similarity));
		Self {
			styles: graph
				.edges
				.iter()
				.map(|e| (scales.color(e.similarity), scales.width(e.similarity)))
				.collect(),
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
	pub lines: Vec<Line>,
	pub circles: Vec<Circle>,
	pub labels: Vec<Label>,
}

impl Scene {
	pub fn clear(&mut self) {
		self.lines.clear();
		self.circles.clear();
		self.labels.clear();
	}

	pub fn is_empty(&self) -> bool {
		self.lines.is_empty() && self.circles.is_empty() && self.labels.is_empty()
	}

	/// Rewrites every primitive from `positions`, reusing allocations.
	pub fn rebuild(&mut self, graph: &Graph, positions: &[Point], styles: &EdgeStyles) {
		self.clear();
		for (i, edge) in graph.edges.iter().enumerate() {
			let (Some(&from), Some(&to)) = (positions.get(edge.source), positions.get(edge.target))
			else {
				continue;
			};
			let (color, width) = styles
				.styles
				.get(i)
				.cloned()
				.unwrap_or_else(|| ("rgb(128, 0, 128)".to_string(), 2.5));
			self.lines.push(Line {
				edge: i,
				from,
				to,
				color,
				width,
			});
		}
		for (i, (node, &center)) in graph.nodes.iter().zip(positions).enumerate() {
			self.circles.push(Circle {
				node: i,
				center,
				radius: NODE_RADIUS,
				color: group_color(node.group()),
			});
			self.labels.push(Label {
				node: i,
				anchor: center,
				text: node.id.clone(),
			});
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{GraphData, GraphLink, GraphNode};

	#[test]
	fn lines_follow_endpoint_positions() {
		let data = GraphData {
			nodes: vec![GraphNode::new("a"), GraphNode::new("b")],
			links: vec![GraphLink {
				similarity: Some(0.4),
				..GraphLink::new("b", "a")
			}],
		};
		let graph = Graph::from_data(&data);
		let positions = [Point::new(1.0, 2.0), Point::new(3.0, 4.0)];
		let mut scene = Scene::default();
		scene.rebuild(&graph, &positions, &EdgeStyles::for_graph(&graph));

		assert_eq!(scene.lines.len(), 1);
		assert_eq!(scene.lines[0].from, positions[1]);
		assert_eq!(scene.lines[0].to, positions[0]);
		assert!(scene.lines[0].width.is_finite());
		assert_eq!(scene.circles[1].center, positions[1]);
		assert_eq!(scene.labels[0].text, "a");
	}

	#[test]
	fn dangling_edge_never_reaches_the_scene() {
		let data = GraphData {
			nodes: vec![GraphNode::new("a")],
			links: vec![GraphLink::new("a", "missing")],
		};
		let graph = Graph::from_data(&data);
		let mut scene = Scene::default();
		scene.rebuild(&graph, &[Point::new(0.0, 0.0)], &EdgeStyles::for_graph(&graph));
		assert!(scene.lines.is_empty());
		assert_eq!(scene.circles.len(), 1);
	}
}
