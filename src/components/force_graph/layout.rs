//! The twelve layout strategies.
//!
//! Geometric layouts are pure functions from node count (or attributes) and
//! viewport to a position per node. Force layouts build a [`Simulation`] that
//! the engine ticks from the animation loop.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use rand::Rng;

use super::hierarchy::Hierarchy;
use super::simulation::{
	CenterForce, CollideForce, DEFAULT_LINK_DISTANCE, Force, LinkForce, ManyBodyForce, Simulation,
};
use super::types::{Graph, GraphNode, Point, Viewport};
use crate::error::GraphError;

const RING_MARGIN: f64 = 20.0;
const RADIAL_MARGIN: f64 = 50.0;
const SPIRAL_SPACING: f64 = 15.0;
const SPIRAL_STEP: f64 = 0.5;
const CHARGE: f64 = -50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutKind {
	Normal,
	SmallWorld,
	Hierarchical,
	Grid,
	Circular,
	Clustered,
	Spiral,
	RadialTree,
	Concentric,
	Random,
	Star,
	Flow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForceLayout {
	Normal,
	SmallWorld,
	Clustered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeometricLayout {
	Hierarchical,
	Grid,
	Circular,
	Spiral,
	RadialTree,
	Concentric,
	Random,
	Star,
	Flow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
	Force(ForceLayout),
	Geometric(GeometricLayout),
}

impl LayoutKind {
	pub const ALL: [LayoutKind; 12] = [
		LayoutKind::Normal,
		LayoutKind::SmallWorld,
		LayoutKind::Hierarchical,
		LayoutKind::Grid,
		LayoutKind::Circular,
		LayoutKind::Clustered,
		LayoutKind::Spiral,
		LayoutKind::RadialTree,
		LayoutKind::Concentric,
		LayoutKind::Random,
		LayoutKind::Star,
		LayoutKind::Flow,
	];

	pub fn name(self) -> &'static str {
		match self {
			LayoutKind::Normal => "normal",
			LayoutKind::SmallWorld => "small-world",
			LayoutKind::Hierarchical => "hierarchical",
			LayoutKind::Grid => "grid",
			LayoutKind::Circular => "circular",
			LayoutKind::Clustered => "clustered",
			LayoutKind::Spiral => "spiral",
			LayoutKind::RadialTree => "radial-tree",
			LayoutKind::Concentric => "concentric",
			LayoutKind::Random => "random",
			LayoutKind::Star => "star",
			LayoutKind::Flow => "flow",
		}
	}

	/// Six-letter menu codes used by the platform's links.
	fn code(self) -> &'static str {
		match self {
			LayoutKind::Normal => "normal",
			LayoutKind::SmallWorld => "mundop",
			LayoutKind::Hierarchical => "hierar",
			LayoutKind::Grid => "gradeg",
			LayoutKind::Circular => "circul",
			LayoutKind::Clustered => "cluste",
			LayoutKind::Spiral => "espira",
			LayoutKind::RadialTree => "arvore",
			LayoutKind::Concentric => "concen",
			LayoutKind::Random => "aleato",
			LayoutKind::Star => "estrel",
			LayoutKind::Flow => "fluxor",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			LayoutKind::Normal => "Normal",
			LayoutKind::SmallWorld => "Small World",
			LayoutKind::Hierarchical => "Hierarchical",
			LayoutKind::Grid => "Grid",
			LayoutKind::Circular => "Circular",
			LayoutKind::Clustered => "Clustered Force",
			LayoutKind::Spiral => "Spiral",
			LayoutKind::RadialTree => "Radial Tree",
			LayoutKind::Concentric => "Concentric Circles",
			LayoutKind::Random => "Random",
			LayoutKind::Star => "Star",
			LayoutKind::Flow => "Flow",
		}
	}

	pub fn strategy(self) -> Strategy {
		match self {
			LayoutKind::Normal => Strategy::Force(ForceLayout::Normal),
			LayoutKind::SmallWorld => Strategy::Force(ForceLayout::SmallWorld),
			LayoutKind::Clustered => Strategy::Force(ForceLayout::Clustered),
			LayoutKind::Hierarchical => Strategy::Geometric(GeometricLayout::Hierarchical),
			LayoutKind::Grid => Strategy::Geometric(GeometricLayout::Grid),
			LayoutKind::Circular => Strategy::Geometric(GeometricLayout::Circular),
			LayoutKind::Spiral => Strategy::Geometric(GeometricLayout::Spiral),
			LayoutKind::RadialTree => Strategy::Geometric(GeometricLayout::RadialTree),
			LayoutKind::Concentric => Strategy::Geometric(GeometricLayout::Concentric),
			LayoutKind::Random => Strategy::Geometric(GeometricLayout::Random),
			LayoutKind::Star => Strategy::Geometric(GeometricLayout::Star),
			LayoutKind::Flow => Strategy::Geometric(GeometricLayout::Flow),
		}
	}

	pub fn is_force(self) -> bool {
		matches!(self.strategy(), Strategy::Force(_))
	}
}

impl fmt::Display for LayoutKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for LayoutKind {
	type Err = GraphError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
		LayoutKind::ALL
			.into_iter()
			.find(|k| k.name() == wanted || k.code() == wanted)
			.ok_or_else(|| GraphError::UnknownLayout(s.to_string()))
	}
}

/// Builds the simulation for a force variant, starting from `positions`.
pub fn force_simulation(
	layout: ForceLayout,
	graph: &Graph,
	positions: &[Point],
	viewport: Viewport,
) -> Simulation {
	let n = graph.len();
	let links: Vec<(usize, usize)> = graph.edges.iter().map(|e| (e.source, e.target)).collect();
	let center = Force::Center(CenterForce::new(viewport.center()));
	let sim = Simulation::new(positions);

	match layout {
		ForceLayout::Normal => sim
			.with_force(Force::Link(LinkForce::new(links, n, DEFAULT_LINK_DISTANCE)))
			.with_force(Force::ManyBody(ManyBodyForce::uniform(n, CHARGE)))
			.with_force(center),
		ForceLayout::SmallWorld => sim
			.with_force(Force::Link(LinkForce::new(links, n, 30.0)))
			.with_force(Force::ManyBody(ManyBodyForce::uniform(n, CHARGE)))
			.with_force(Force::Collide(CollideForce::new(10.0)))
			.with_force(center),
		ForceLayout::Clustered => sim
			.with_force(Force::Link(LinkForce::new(links, n, 30.0)))
			.with_force(Force::ManyBody(ManyBodyForce::per_node(
				graph.nodes.iter().map(|node| CHARGE * node.group()).collect(),
			)))
			.with_force(center)
			.with_force(Force::Collide(CollideForce::new(15.0).with_strength(0.7))),
	}
}

/// One-shot placement for a geometric variant.
pub fn geometric<R: Rng>(
	layout: GeometricLayout,
	nodes: &[GraphNode],
	viewport: Viewport,
	rng: &mut R,
) -> Vec<Point> {
	let n = nodes.len();
	match layout {
		GeometricLayout::Hierarchical => hierarchical(n, viewport),
		GeometricLayout::Grid => grid(n, viewport),
		GeometricLayout::Circular => circular(n, viewport),
		GeometricLayout::Spiral => spiral(n, viewport),
		GeometricLayout::RadialTree => radial_tree(n, viewport),
		GeometricLayout::Concentric => concentric(nodes, viewport),
		GeometricLayout::Random => random(n, viewport, rng),
		GeometricLayout::Star => star(n, viewport),
		GeometricLayout::Flow => flow(nodes, viewport, rng),
	}
}

pub fn grid(n: usize, viewport: Viewport) -> Vec<Point> {
	if n == 0 {
		return Vec::new();
	}
	let side = (n as f64).sqrt().ceil() as usize;
	let cell = (viewport.width / side as f64).min(viewport.height / side as f64);
	(0..n)
		.map(|i| {
			Point::new(
				(i % side) as f64 * cell + cell / 2.0,
				(i / side) as f64 * cell + cell / 2.0,
			)
		})
		.collect()
}

fn on_ring(center: Point, radius: f64, angle: f64) -> Point {
	Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}

pub fn circular(n: usize, viewport: Viewport) -> Vec<Point> {
	let radius = (viewport.min_side() / 2.0 - RING_MARGIN).max(0.0);
	let center = viewport.center();
	(0..n)
		.map(|i| on_ring(center, radius, i as f64 / n as f64 * 2.0 * PI))
		.collect()
}

/// Unbounded: large graphs spiral past the viewport edge.
pub fn spiral(n: usize, viewport: Viewport) -> Vec<Point> {
	let center = viewport.center();
	(0..n)
		.map(|i| {
			let angle = i as f64 * SPIRAL_STEP;
			on_ring(center, SPIRAL_SPACING * angle, angle)
		})
		.collect()
}

pub fn radial_tree(n: usize, viewport: Viewport) -> Vec<Point> {
	let radius = (viewport.min_side() / 2.0 - RADIAL_MARGIN).max(0.0);
	let center = viewport.center();
	Hierarchy::synthetic(n)
		.cluster((2.0 * PI, radius))
		.into_iter()
		.map(|polar| on_ring(center, polar.y, polar.x))
		.collect()
}

pub fn hierarchical(n: usize, viewport: Viewport) -> Vec<Point> {
	Hierarchy::synthetic(n).tree((viewport.width, viewport.height))
}

pub fn concentric(nodes: &[GraphNode], viewport: Viewport) -> Vec<Point> {
	let n = nodes.len();
	let max_radius = (viewport.min_side() / 2.0 - RING_MARGIN).max(0.0);
	let max_group = nodes
		.iter()
		.map(GraphNode::group)
		.fold(f64::NEG_INFINITY, f64::max);
	let center = viewport.center();
	nodes
		.iter()
		.enumerate()
		.map(|(i, node)| {
			let share = if max_group > 0.0 {
				(node.group() / max_group).clamp(0.0, 1.0)
			} else {
				0.0
			};
			on_ring(center, share * max_radius, i as f64 / n as f64 * 2.0 * PI)
		})
		.collect()
}

pub fn random<R: Rng>(n: usize, viewport: Viewport, rng: &mut R) -> Vec<Point> {
	(0..n)
		.map(|_| {
			Point::new(
				rng.random::<f64>() * viewport.width,
				rng.random::<f64>() * viewport.height,
			)
		})
		.collect()
}

pub fn star(n: usize, viewport: Viewport) -> Vec<Point> {
	let center = viewport.center();
	let radius = viewport.min_side() / 3.0;
	(0..n)
		.map(|i| match i {
			0 => center,
			_ => on_ring(center, radius, i as f64 / (n - 1) as f64 * 2.0 * PI),
		})
		.collect()
}

/// Horizontal bands by `level`; x is scattered inside the band. The deepest
/// band counts as at least level 1.
pub fn flow<R: Rng>(nodes: &[GraphNode], viewport: Viewport, rng: &mut R) -> Vec<Point> {
	let level = |node: &GraphNode| node.level().max(0.0);
	let max_level = nodes.iter().map(level).fold(1.0, f64::max);
	let band = viewport.height / (max_level + 1.0);
	nodes
		.iter()
		.map(|node| {
			Point::new(
				rng.random::<f64>() * viewport.width,
				band * level(node) + band / 2.0,
			)
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	const VP: Viewport = Viewport::new(800.0, 600.0);

	fn nodes(n: usize) -> Vec<GraphNode> {
		(0..n).map(|i| GraphNode::new(i.to_string())).collect()
	}

	fn angle_of(p: Point, center: Point) -> f64 {
		(p.y - center.y).atan2(p.x - center.x).rem_euclid(2.0 * PI)
	}

	#[test]
	fn names_and_codes_parse() {
		for kind in LayoutKind::ALL {
			assert_eq!(kind.name().parse::<LayoutKind>().unwrap(), kind);
			assert_eq!(kind.code().parse::<LayoutKind>().unwrap(), kind);
		}
		assert_eq!("Radial_Tree".parse::<LayoutKind>().unwrap(), LayoutKind::RadialTree);
		assert!(matches!(
			"zigzag".parse::<LayoutKind>(),
			Err(GraphError::UnknownLayout(name)) if name == "zigzag"
		));
	}

	#[test]
	fn three_force_variants() {
		let force: Vec<_> = LayoutKind::ALL.into_iter().filter(|k| k.is_force()).collect();
		assert_eq!(
			force,
			vec![LayoutKind::Normal, LayoutKind::SmallWorld, LayoutKind::Clustered]
		);
	}

	#[test]
	fn bounded_layouts_stay_in_viewport() {
		let mut rng = SmallRng::seed_from_u64(7);
		let mut data = nodes(37);
		for (i, node) in data.iter_mut().enumerate() {
			node.attrs.insert("group".into(), (i % 5).into());
			node.attrs.insert("level".into(), (i % 4).into());
		}
		for layout in [
			GeometricLayout::Hierarchical,
			GeometricLayout::Grid,
			GeometricLayout::Circular,
			GeometricLayout::Concentric,
			GeometricLayout::Random,
			GeometricLayout::Star,
			GeometricLayout::Flow,
		] {
			let points = geometric(layout, &data, VP, &mut rng);
			assert_eq!(points.len(), data.len());
			for p in points {
				assert!(p.is_finite(), "{layout:?} produced {p:?}");
				assert!(VP.contains(p), "{layout:?} left the viewport: {p:?}");
			}
		}
	}

	#[test]
	fn unbounded_layouts_stay_finite() {
		let mut rng = SmallRng::seed_from_u64(7);
		let data = nodes(200);
		for layout in [GeometricLayout::Spiral, GeometricLayout::RadialTree] {
			assert!(geometric(layout, &data, VP, &mut rng).iter().all(Point::is_finite));
		}
	}

	#[test]
	fn four_nodes_make_a_two_by_two_grid() {
		let cell = VP.min_side() / 2.0;
		let points = grid(4, VP);
		assert_eq!(
			points,
			vec![
				Point::new(cell / 2.0, cell / 2.0),
				Point::new(cell * 1.5, cell / 2.0),
				Point::new(cell / 2.0, cell * 1.5),
				Point::new(cell * 1.5, cell * 1.5),
			]
		);
	}

	#[test]
	fn circular_angles_are_evenly_spaced() {
		let n = 9;
		let center = VP.center();
		let points = circular(n, VP);
		for (i, p) in points.iter().enumerate() {
			let expected = i as f64 * 2.0 * PI / n as f64;
			assert!((angle_of(*p, center) - expected).abs() < 1e-9);
			assert!((p.distance(center) - (300.0 - RING_MARGIN)).abs() < 1e-9);
		}
	}

	#[test]
	fn star_puts_first_node_in_the_middle() {
		let n = 7;
		let center = VP.center();
		let points = star(n, VP);
		assert_eq!(points[0], center);
		let step = 2.0 * PI / (n - 1) as f64;
		for (i, p) in points.iter().enumerate().skip(1) {
			let expected = (i as f64 * step).rem_euclid(2.0 * PI);
			let got = angle_of(*p, center);
			let diff = (got - expected).abs();
			assert!(diff < 1e-9 || (diff - 2.0 * PI).abs() < 1e-9, "node {i}: {got} vs {expected}");
			assert!((p.distance(center) - 200.0).abs() < 1e-9);
		}
	}

	#[test]
	fn star_with_one_node_does_not_divide_by_zero() {
		assert_eq!(star(1, VP), vec![VP.center()]);
	}

	#[test]
	fn concentric_radius_grows_with_group() {
		let center = VP.center();
		let data: Vec<GraphNode> = [1, 2, 3, 4]
			.iter()
			.map(|&g| GraphNode::new(g.to_string()).with_attr("group", g))
			.collect();
		let radii: Vec<f64> = concentric(&data, VP)
			.iter()
			.map(|p| p.distance(center))
			.collect();
		assert!(radii.windows(2).all(|w| w[0] <= w[1] + 1e-9), "{radii:?}");
		assert!((radii[3] - (300.0 - RING_MARGIN)).abs() < 1e-9);
	}

	#[test]
	fn missing_attributes_never_yield_nan() {
		let mut rng = SmallRng::seed_from_u64(1);
		let data = nodes(5);
		for p in concentric(&data, VP).into_iter().chain(flow(&data, VP, &mut rng)) {
			assert!(p.is_finite());
		}
		// every node reads as group 1, so all sit on the outer ring
		let center = VP.center();
		assert!(
			concentric(&data, VP)
				.iter()
				.all(|p| (p.distance(center) - 280.0).abs() < 1e-9)
		);
	}

	#[test]
	fn flow_bands_follow_level() {
		let mut rng = SmallRng::seed_from_u64(3);
		let data = vec![
			GraphNode::new("a").with_attr("level", 1),
			GraphNode::new("b").with_attr("level", 2),
			GraphNode::new("c").with_attr("level", -3),
		];
		let points = flow(&data, VP, &mut rng);
		let band = VP.height / 3.0;
		assert!((points[0].y - band * 1.5).abs() < 1e-9);
		assert!((points[1].y - band * 2.5).abs() < 1e-9);
		assert!((points[2].y - band * 0.5).abs() < 1e-9);
	}

	#[test]
	fn flow_separates_levels_zero_one_and_two() {
		let mut rng = SmallRng::seed_from_u64(8);
		let data = vec![
			GraphNode::new("a").with_attr("level", 0),
			GraphNode::new("b").with_attr("level", 1),
			GraphNode::new("c").with_attr("level", 2),
			GraphNode::new("d"),
		];
		let points = flow(&data, VP, &mut rng);
		let band = VP.height / 3.0;
		assert!((points[0].y - band * 0.5).abs() < 1e-9);
		assert!((points[1].y - band * 1.5).abs() < 1e-9);
		assert!((points[2].y - band * 2.5).abs() < 1e-9);
		assert!((points[3].y - points[0].y).abs() < 1e-9);
	}

	#[test]
	fn flow_with_only_level_zero_uses_two_bands() {
		let mut rng = SmallRng::seed_from_u64(8);
		let data = vec![GraphNode::new("a"), GraphNode::new("b").with_attr("level", 0)];
		let points = flow(&data, VP, &mut rng);
		assert!(points.iter().all(|p| (p.y - VP.height / 4.0).abs() < 1e-9));
	}

	#[test]
	fn empty_graph_gives_empty_layouts() {
		let mut rng = SmallRng::seed_from_u64(0);
		for layout in LayoutKind::ALL {
			if let Strategy::Geometric(g) = layout.strategy() {
				assert!(geometric(g, &[], VP, &mut rng).is_empty());
			}
		}
	}

	#[test]
	fn clustered_charge_scales_with_group() {
		use super::super::types::GraphData;
		let data = GraphData {
			nodes: vec![
				GraphNode::new("a").with_attr("group", 3),
				GraphNode::new("b"),
			],
			links: vec![],
		};
		let graph = Graph::from_data(&data);
		let positions = vec![Point::new(390.0, 300.0), Point::new(410.0, 300.0)];
		let mut sim = force_simulation(ForceLayout::Clustered, &graph, &positions, VP);
		while sim.tick() {}
		assert!(sim.positions().all(|p| p.is_finite()));
	}
}
