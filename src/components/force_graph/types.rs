use std::collections::{HashMap, HashSet};

use log::warn;
use serde_json::{Map, Value};

/// Free-form node attributes, kept in payload order.
pub type Attributes = Map<String, Value>;

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub attrs: Attributes,
}

impl GraphNode {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			attrs: Attributes::new(),
		}
	}

	pub fn with_attr(mut self, key: &str, value: impl Into<Value>) -> Self {
		self.attrs.insert(key.to_string(), value.into());
		self
	}

	pub fn group(&self) -> f64 {
		scalar_or_one(self.attrs.get("group"))
	}

	/// Band index for the flow layout; absent or falsy levels sit in band 0.
	pub fn level(&self) -> f64 {
		scalar(self.attrs.get("level")).unwrap_or(0.0)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
	pub similarity: Option<f64>,
}

impl GraphLink {
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			similarity: None,
		}
	}

	pub fn similarity_or_default(&self) -> f64 {
		match self.similarity {
			Some(s) if s.is_finite() && s != 0.0 => s,
			_ => 1.0,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

/// Reads a scaling attribute. Absent or falsy values (null, false, 0, "",
/// non-numeric strings, NaN) read as `1` so they never reach pixel maths.
pub fn scalar_or_one(value: Option<&Value>) -> f64 {
	scalar(value).unwrap_or(1.0)
}

/// Finite, non-zero numeric reading of an attribute.
fn scalar(value: Option<&Value>) -> Option<f64> {
	let v = match value? {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => s.trim().parse::<f64>().ok(),
		Value::Bool(true) => Some(1.0),
		_ => None,
	};
	v.filter(|v| v.is_finite() && *v != 0.0)
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn is_finite(&self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}

	pub fn distance(&self, other: Point) -> f64 {
		((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	pub fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}

	pub fn min_side(&self) -> f64 {
		self.width.min(self.height)
	}

	pub fn contains(&self, p: Point) -> bool {
		(0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
	}
}

impl Default for Viewport {
	fn default() -> Self {
		Self::new(800.0, 600.0)
	}
}

/// An edge resolved to node indices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
	pub source: usize,
	pub target: usize,
	pub similarity: f64,
}

/// Node arena plus index-resolved edges.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<Edge>,
	index: HashMap<String, usize>,
}

impl Graph {
	/// Builds the arena. Duplicate ids keep their first slot and take the
	/// latest attributes; edges naming an unknown id are dropped.
	pub fn from_data(data: &GraphData) -> Self {
		let mut nodes: Vec<GraphNode> = Vec::with_capacity(data.nodes.len());
		let mut index: HashMap<String, usize> = HashMap::with_capacity(data.nodes.len());

		for node in &data.nodes {
			match index.get(&node.id) {
				Some(&i) => nodes[i].attrs = node.attrs.clone(),
				None => {
					index.insert(node.id.clone(), nodes.len());
					nodes.push(node.clone());
				}
			}
		}

		let mut edges = Vec::with_capacity(data.links.len());
		for link in &data.links {
			match (index.get(&link.source), index.get(&link.target)) {
				(Some(&source), Some(&target)) => edges.push(Edge {
					source,
					target,
					similarity: link.similarity_or_default(),
				}),
				_ => warn!(
					"dropping edge {} -> {}: endpoint not in node set",
					link.source, link.target
				),
			}
		}

		Self {
			nodes,
			edges,
			index,
		}
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	pub fn neighbors(&self, idx: usize) -> HashSet<usize> {
		let mut out = HashSet::new();
		for edge in &self.edges {
			if edge.source == idx {
				out.insert(edge.target);
			} else if edge.target == idx {
				out.insert(edge.source);
			}
		}
		out
	}
}
