//! Layout engine: owns the graph, the node positions and at most one running
//! simulation, and keeps the scene in step with the positions.

use std::f64::consts::PI;

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::layout::{self, ForceLayout, GeometricLayout, LayoutKind, Strategy};
use super::scene::{EdgeStyles, Scene};
use super::simulation::Simulation;
use super::types::{Graph, GraphData, Point, Viewport};

/// Alpha target held while a node is being dragged.
const DRAG_ALPHA_TARGET: f64 = 0.3;

/// Identifies one simulation run. Ticking with a handle from a cancelled run
/// does nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SimulationHandle(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
	Idle,
	LayoutSelected(LayoutKind),
	Simulating(SimulationHandle),
	Settled(LayoutKind),
}

struct Run {
	handle: SimulationHandle,
	simulation: Simulation,
}

pub struct LayoutEngine {
	graph: Graph,
	styles: EdgeStyles,
	positions: Vec<Point>,
	viewport: Viewport,
	layout: Option<LayoutKind>,
	phase: Phase,
	run: Option<Run>,
	next_run: u64,
	pinned: Option<usize>,
	scene: Scene,
	rng: SmallRng,
}

impl LayoutEngine {
	pub fn new(viewport: Viewport, seed: u64) -> Self {
		Self {
			graph: Graph::default(),
			styles: EdgeStyles::default(),
			positions: Vec::new(),
			viewport,
			layout: None,
			phase: Phase::Idle,
			run: None,
			next_run: 0,
			pinned: None,
			scene: Scene::default(),
			rng: SmallRng::seed_from_u64(seed),
		}
	}

	/// Replaces the graph wholesale. Nodes start on a phyllotaxis around the
	/// viewport centre and the current layout, if any, is applied again.
	pub fn set_data(&mut self, data: &GraphData) {
		self.cancel_simulation();
		self.graph = Graph::from_data(data);
		self.styles = EdgeStyles::for_graph(&self.graph);
		self.pinned = None;
		self.positions = seed_positions(self.graph.len(), self.viewport.center());
		info!(
			"graph loaded: {} nodes, {} edges",
			self.graph.len(),
			self.graph.edges.len()
		);
		match self.layout {
			Some(kind) => self.apply_layout(kind),
			None => self.update_positions(),
		}
	}

	/// Applies the layout called `name`. Unknown names are ignored.
	pub fn select_layout(&mut self, name: &str) -> Option<LayoutKind> {
		match name.parse::<LayoutKind>() {
			Ok(kind) => {
				self.apply_layout(kind);
				Some(kind)
			}
			Err(err) => {
				debug!("{err}; keeping current layout");
				None
			}
		}
	}

	/// Switches to `kind`. A drag in progress is released.
	pub fn apply_layout(&mut self, kind: LayoutKind) {
		self.cancel_simulation();
		self.pinned = None;
		self.scene.clear();
		self.layout = Some(kind);
		self.phase = Phase::LayoutSelected(kind);
		debug!("layout selected: {kind}");
		match kind.strategy() {
			Strategy::Force(variant) => {
				self.apply_force_layout(variant);
			}
			Strategy::Geometric(variant) => self.apply_geometric_layout(variant),
		}
	}

	/// Starts a fresh simulation from the current positions, stopping any
	/// previous one first.
	pub fn apply_force_layout(&mut self, variant: ForceLayout) -> SimulationHandle {
		self.cancel_simulation();
		let mut simulation =
			layout::force_simulation(variant, &self.graph, &self.positions, self.viewport);
		if let Some(idx) = self.pinned {
			simulation.pin(idx, self.positions[idx]);
		}
		let handle = SimulationHandle(self.next_run);
		self.next_run += 1;
		self.run = Some(Run { handle, simulation });
		self.phase = Phase::Simulating(handle);
		self.update_positions();
		handle
	}

	pub fn apply_geometric_layout(&mut self, variant: GeometricLayout) {
		self.cancel_simulation();
		self.positions = layout::geometric(variant, &self.graph.nodes, self.viewport, &mut self.rng);
		if let Some(kind) = self.layout {
			self.phase = Phase::Settled(kind);
		}
		self.update_positions();
	}

	pub fn cancel_simulation(&mut self) {
		if let Some(mut run) = self.run.take() {
			run.simulation.stop();
			debug!("simulation {:?} cancelled", run.handle);
		}
	}

	/// Advances the current simulation by one tick.
	pub fn tick(&mut self) -> bool {
		match self.current_handle() {
			Some(handle) => self.tick_run(handle),
			None => false,
		}
	}

	/// Advances the run behind `handle`; stale handles are a no-op.
	pub fn tick_run(&mut self, handle: SimulationHandle) -> bool {
		let Some(run) = self.run.as_mut().filter(|r| r.handle == handle) else {
			return false;
		};
		if !run.simulation.is_running() {
			return false;
		}
		let hot = run.simulation.tick();
		self.positions.clear();
		self.positions.extend(run.simulation.positions());
		if !hot {
			info!("simulation {:?} settled", handle);
			if let Some(kind) = self.layout {
				self.phase = Phase::Settled(kind);
			}
		}
		self.update_positions();
		hot
	}

	pub fn current_handle(&self) -> Option<SimulationHandle> {
		self.run.as_ref().map(|r| r.handle)
	}

	pub fn is_simulating(&self) -> bool {
		self.run.as_ref().is_some_and(|r| r.simulation.is_running())
	}

	/// Pushes the current positions into the scene.
	pub fn update_positions(&mut self) {
		self.scene.rebuild(&self.graph, &self.positions, &self.styles);
	}

	/// Pins `idx` where it stands and keeps the simulation warm while dragging.
	pub fn drag_start(&mut self, idx: usize) {
		let Some(&at) = self.positions.get(idx) else {
			return;
		};
		self.pinned = Some(idx);
		if let Some(run) = self.run.as_mut() {
			run.simulation.pin(idx, at);
			run.simulation.reheat(DRAG_ALPHA_TARGET);
			self.phase = Phase::Simulating(run.handle);
		}
	}

	pub fn drag_move(&mut self, to: Point) {
		let Some(idx) = self.pinned else {
			return;
		};
		if !to.is_finite() {
			return;
		}
		if let Some(run) = self.run.as_mut() {
			run.simulation.pin(idx, to);
		}
		self.positions[idx] = to;
		self.update_positions();
	}

	pub fn drag_end(&mut self) {
		let Some(idx) = self.pinned.take() else {
			return;
		};
		if let Some(run) = self.run.as_mut() {
			run.simulation.unpin(idx);
			run.simulation.set_alpha_target(0.0);
		}
	}

	pub fn dragging(&self) -> Option<usize> {
		self.pinned
	}

	/// Topmost node whose centre lies within `radius` of `at`.
	pub fn node_at(&self, at: Point, radius: f64) -> Option<usize> {
		self.positions
			.iter()
			.enumerate()
			.rev()
			.find(|(_, p)| p.distance(at) < radius)
			.map(|(i, _)| i)
	}

	/// New viewport dimensions apply from the next layout.
	pub fn resize(&mut self, viewport: Viewport) {
		self.viewport = viewport;
	}

	pub fn graph(&self) -> &Graph {
		&self.graph
	}

	pub fn positions(&self) -> &[Point] {
		&self.positions
	}

	pub fn scene(&self) -> &Scene {
		&self.scene
	}

	pub fn layout(&self) -> Option<LayoutKind> {
		self.layout
	}

	pub fn phase(&self) -> Phase {
		self.phase
	}

	pub fn viewport(&self) -> Viewport {
		self.viewport
	}
}

fn seed_positions(n: usize, center: Point) -> Vec<Point> {
	let angle = PI * (3.0 - 5f64.sqrt());
	(0..n)
		.map(|i| {
			let r = 10.0 * (0.5 + i as f64).sqrt();
			let a = i as f64 * angle;
			Point::new(center.x + r * a.cos(), center.y + r * a.sin())
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{GraphLink, GraphNode};

	const VP: Viewport = Viewport::new(800.0, 600.0);

	fn sample(n: usize) -> GraphData {
		GraphData {
			nodes: (0..n).map(|i| GraphNode::new(format!("n{i}"))).collect(),
			links: (1..n)
				.map(|i| GraphLink::new(format!("n{i}"), format!("n{}", i / 2)))
				.collect(),
		}
	}

	fn engine(n: usize) -> LayoutEngine {
		let mut engine = LayoutEngine::new(VP, 11);
		engine.set_data(&sample(n));
		engine
	}

	#[test]
	fn starts_idle_with_a_drawable_scene() {
		let engine = engine(5);
		assert_eq!(engine.phase(), Phase::Idle);
		assert_eq!(engine.scene().circles.len(), 5);
		assert_eq!(engine.scene().lines.len(), 4);
	}

	#[test]
	fn geometric_layout_settles_immediately() {
		let mut engine = engine(4);
		assert_eq!(engine.select_layout("grid"), Some(LayoutKind::Grid));
		assert_eq!(engine.phase(), Phase::Settled(LayoutKind::Grid));
		assert!(!engine.is_simulating());
		assert_eq!(engine.scene().circles[3].center, Point::new(450.0, 450.0));
		assert_eq!(engine.scene().lines[0].from, engine.positions()[1]);
	}

	#[test]
	fn unknown_layout_is_ignored() {
		let mut engine = engine(4);
		engine.select_layout("circular");
		let before = engine.positions().to_vec();
		assert_eq!(engine.select_layout("pinwheel"), None);
		assert_eq!(engine.layout(), Some(LayoutKind::Circular));
		assert_eq!(engine.phase(), Phase::Settled(LayoutKind::Circular));
		assert_eq!(engine.positions(), &before[..]);
	}

	#[test]
	fn force_layout_runs_until_settled() {
		let mut engine = engine(12);
		engine.select_layout("small-world");
		let handle = engine.current_handle().expect("running simulation");
		assert_eq!(engine.phase(), Phase::Simulating(handle));
		let mut ticks = 0;
		while engine.tick() {
			ticks += 1;
			assert!(ticks < 1_000);
		}
		assert_eq!(engine.phase(), Phase::Settled(LayoutKind::SmallWorld));
		assert!(engine.positions().iter().all(Point::is_finite));
		assert!(!engine.tick());
	}

	#[test]
	fn new_layout_cancels_the_old_simulation() {
		let mut engine = engine(6);
		engine.select_layout("normal");
		let old = engine.current_handle().expect("first run");
		engine.tick();
		engine.select_layout("clustered");
		let new = engine.current_handle().expect("second run");
		assert_ne!(old, new);
		assert!(!engine.tick_run(old));
		assert!(engine.tick_run(new));

		engine.select_layout("star");
		assert_eq!(engine.current_handle(), None);
		let star = engine.positions().to_vec();
		assert!(!engine.tick_run(new));
		assert_eq!(engine.positions(), &star[..]);
	}

	#[test]
	fn dragged_node_holds_its_pin() {
		let mut engine = engine(8);
		engine.select_layout("normal");
		for _ in 0..5 {
			engine.tick();
		}
		engine.drag_start(2);
		let target = Point::new(123.0, 321.0);
		engine.drag_move(target);
		for _ in 0..50 {
			engine.tick();
			assert_eq!(engine.positions()[2], target);
		}
		engine.drag_end();
		assert_eq!(engine.dragging(), None);
		engine.tick();
		assert_ne!(engine.positions()[2], target);
	}

	#[test]
	fn new_layout_drops_the_drag_pin() {
		let mut engine = engine(6);
		engine.select_layout("grid");
		engine.drag_start(3);
		engine.drag_move(Point::new(50.0, 50.0));
		engine.select_layout("normal");
		assert_eq!(engine.dragging(), None);
		let start = engine.positions()[3];
		engine.tick();
		assert_ne!(engine.positions()[3], start);
	}

	#[test]
	fn drag_reheats_a_settled_simulation() {
		let mut engine = engine(3);
		engine.select_layout("normal");
		while engine.tick() {}
		assert!(!engine.is_simulating());
		engine.drag_start(0);
		assert!(engine.is_simulating());
		assert!(matches!(engine.phase(), Phase::Simulating(_)));
	}

	#[test]
	fn drag_on_geometric_layout_is_a_manual_override() {
		let mut engine = engine(4);
		engine.select_layout("grid");
		engine.drag_start(1);
		engine.drag_move(Point::new(10.0, 10.0));
		engine.drag_end();
		assert_eq!(engine.positions()[1], Point::new(10.0, 10.0));
		assert_eq!(engine.scene().circles[1].center, Point::new(10.0, 10.0));
		assert!(!engine.tick());
	}

	#[test]
	fn new_data_reapplies_the_layout() {
		let mut engine = engine(4);
		engine.select_layout("grid");
		engine.set_data(&sample(9));
		assert_eq!(engine.layout(), Some(LayoutKind::Grid));
		assert_eq!(engine.scene().circles.len(), 9);
		assert_eq!(engine.positions()[0], Point::new(100.0, 100.0));
	}

	#[test]
	fn hit_test_finds_nearby_node() {
		let mut engine = engine(4);
		engine.select_layout("grid");
		assert_eq!(engine.node_at(Point::new(152.0, 148.0), 12.0), Some(0));
		assert_eq!(engine.node_at(Point::new(300.0, 300.0), 12.0), None);
	}
}
