//! Tree layouts over a synthetic hierarchy.
//!
//! The graph payload carries no parent/child relation, so the hierarchical and
//! radial-tree layouts first build a [`Hierarchy`] with one virtual root whose
//! children are every node, in node order. The root is an explicit arena slot
//! with no graph node behind it; only leaf positions are handed back.

use super::types::Point;

#[derive(Clone, Debug)]
struct TreeNode {
	node: Option<usize>,
	children: Vec<usize>,
	depth: usize,
}

#[derive(Clone, Debug)]
pub struct Hierarchy {
	arena: Vec<TreeNode>,
}

impl Hierarchy {
	const ROOT: usize = 0;

	/// Virtual root plus one leaf per graph node.
	pub fn synthetic(node_count: usize) -> Self {
		let mut arena = Vec::with_capacity(node_count + 1);
		arena.push(TreeNode {
			node: None,
			children: (1..=node_count).collect(),
			depth: 0,
		});
		arena.extend((0..node_count).map(|i| TreeNode {
			node: Some(i),
			children: Vec::new(),
			depth: 1,
		}));
		Self { arena }
	}

	pub fn node_count(&self) -> usize {
		self.arena.iter().filter(|n| n.node.is_some()).count()
	}

	fn leaves(&self) -> Vec<usize> {
		let mut out = Vec::new();
		let mut stack = vec![Self::ROOT];
		while let Some(i) = stack.pop() {
			let n = &self.arena[i];
			if n.children.is_empty() {
				out.push(i);
			} else {
				stack.extend(n.children.iter().rev());
			}
		}
		out
	}

	fn height(&self, i: usize) -> usize {
		self.arena[i]
			.children
			.iter()
			.map(|&c| self.height(c) + 1)
			.max()
			.unwrap_or(0)
	}

	fn max_depth(&self) -> usize {
		self.arena.iter().map(|n| n.depth).max().unwrap_or(0)
	}

	/// Leaves spaced one unit apart in order; parents sit at the midpoint of
	/// their outermost children (`mean == false`) or the mean of all children.
	fn breadth(&self, mean: bool) -> Vec<f64> {
		let mut x = vec![0.0; self.arena.len()];
		for (slot, leaf) in self.leaves().into_iter().enumerate() {
			x[leaf] = slot as f64;
		}
		self.place_parents(Self::ROOT, mean, &mut x);
		x
	}

	fn place_parents(&self, i: usize, mean: bool, x: &mut [f64]) {
		let children = &self.arena[i].children;
		if children.is_empty() {
			return;
		}
		for &c in children {
			self.place_parents(c, mean, x);
		}
		x[i] = if mean {
			children.iter().map(|&c| x[c]).sum::<f64>() / children.len() as f64
		} else {
			(x[children[0]] + x[children[children.len() - 1]]) / 2.0
		};
	}

	fn collect(&self, mut place: impl FnMut(usize) -> Point) -> Vec<Point> {
		let mut out = vec![Point::default(); self.node_count()];
		for (i, n) in self.arena.iter().enumerate() {
			if let Some(node) = n.node {
				out[node] = place(i);
			}
		}
		out
	}

	/// Rectangular tidy tree of `size = (width, height)`; depth grows downward.
	pub fn tree(&self, size: (f64, f64)) -> Vec<Point> {
		let x = self.breadth(false);
		let (left, right) = x
			.iter()
			.fold((f64::INFINITY, f64::NEG_INFINITY), |(l, r), &v| (l.min(v), r.max(v)));
		let s = if left == right { 1.0 } else { 0.5 };
		let tx = s - left;
		let kx = size.0 / (right + s + tx);
		let ky = size.1 / self.max_depth().max(1) as f64;
		self.collect(|i| Point::new((x[i] + tx) * kx, self.arena[i].depth as f64 * ky))
	}

	/// Cluster (dendrogram) layout of `size = (breadth, depth)`; all leaves end
	/// at the full depth.
	pub fn cluster(&self, size: (f64, f64)) -> Vec<Point> {
		let x = self.breadth(true);
		let leaves = self.leaves();
		let (x0, x1) = match (leaves.first(), leaves.last()) {
			(Some(&l), Some(&r)) => (x[l] - 0.5, x[r] + 0.5),
			_ => (0.0, 1.0),
		};
		let root_height = self.height(Self::ROOT) as f64;
		self.collect(|i| {
			let h = self.height(i) as f64;
			let y = if root_height > 0.0 { 1.0 - h / root_height } else { 1.0 };
			Point::new((x[i] - x0) / (x1 - x0) * size.0, y * size.1)
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn synthetic_root_is_not_a_graph_node() {
		let h = Hierarchy::synthetic(3);
		assert_eq!(h.node_count(), 3);
		assert_eq!(h.tree((300.0, 100.0)).len(), 3);
	}

	#[test]
	fn tree_spreads_leaves_in_bands() {
		let points = Hierarchy::synthetic(4).tree((400.0, 200.0));
		let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
		assert_eq!(xs, vec![50.0, 150.0, 250.0, 350.0]);
		assert!(points.iter().all(|p| p.y == 200.0));
	}

	#[test]
	fn single_leaf_is_centered() {
		let points = Hierarchy::synthetic(1).tree((400.0, 200.0));
		assert_eq!(points, vec![Point::new(200.0, 200.0)]);
	}

	#[test]
	fn cluster_spans_full_circle() {
		let n = 8;
		let points = Hierarchy::synthetic(n).cluster((2.0 * std::f64::consts::PI, 100.0));
		for (i, p) in points.iter().enumerate() {
			let expected = (i as f64 + 0.5) / n as f64 * 2.0 * std::f64::consts::PI;
			assert!((p.x - expected).abs() < 1e-12);
			assert_eq!(p.y, 100.0);
		}
	}

	#[test]
	fn empty_hierarchy_has_no_points() {
		assert!(Hierarchy::synthetic(0).tree((10.0, 10.0)).is_empty());
		assert!(Hierarchy::synthetic(0).cluster((10.0, 10.0)).is_empty());
	}
}
