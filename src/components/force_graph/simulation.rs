//! Velocity Verlet force simulation with alpha cooling.
//!
//! Forces read and write a flat body arena indexed like the graph's nodes.
//! Each [`Simulation::tick`] decays `alpha` toward `alpha_target`, applies the
//! forces, then integrates velocities. Pinned bodies are held at their pin.

use std::f64::consts::PI;

use super::types::Point;

pub const DEFAULT_LINK_DISTANCE: f64 = 30.0;

const ALPHA_MIN: f64 = 0.001;
const VELOCITY_DECAY: f64 = 0.4;
const INITIAL_RADIUS: f64 = 10.0;
const DISTANCE_MIN2: f64 = 1.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Body {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub fx: Option<f64>,
	pub fy: Option<f64>,
}

impl Body {
	pub fn position(&self) -> Point {
		Point::new(self.x, self.y)
	}
}

/// Linear congruential generator used to separate coincident bodies, so the
/// simulation stays deterministic for a given input.
#[derive(Clone, Debug)]
struct Lcg(u64);

impl Lcg {
	const A: u64 = 1_664_525;
	const C: u64 = 1_013_904_223;
	const M: u64 = 1 << 32;

	fn next_unit(&mut self) -> f64 {
		self.0 = (Self::A * self.0 + Self::C) % Self::M;
		self.0 as f64 / Self::M as f64
	}

	fn jiggle(&mut self) -> f64 {
		(self.next_unit() - 0.5) * 1e-6
	}
}

#[derive(Clone, Debug)]
pub struct LinkForce {
	links: Vec<(usize, usize)>,
	distance: f64,
	strengths: Vec<f64>,
	biases: Vec<f64>,
}

impl LinkForce {
	/// Link strength is `1 / min(degree(source), degree(target))` and the
	/// correction is split between endpoints by relative degree.
	pub fn new(links: Vec<(usize, usize)>, node_count: usize, distance: f64) -> Self {
		let links: Vec<(usize, usize)> = links
			.into_iter()
			.filter(|&(s, t)| s != t && s < node_count && t < node_count)
			.collect();
		let mut degree = vec![0usize; node_count];
		for &(s, t) in &links {
			degree[s] += 1;
			degree[t] += 1;
		}
		let strengths = links
			.iter()
			.map(|&(s, t)| 1.0 / degree[s].min(degree[t]) as f64)
			.collect();
		let biases = links
			.iter()
			.map(|&(s, t)| degree[s] as f64 / (degree[s] + degree[t]) as f64)
			.collect();
		Self {
			links,
			distance,
			strengths,
			biases,
		}
	}

	fn apply(&self, bodies: &mut [Body], alpha: f64, lcg: &mut Lcg) {
		for (k, &(s, t)) in self.links.iter().enumerate() {
			let (src, tgt) = (bodies[s], bodies[t]);
			let mut x = tgt.x + tgt.vx - src.x - src.vx;
			let mut y = tgt.y + tgt.vy - src.y - src.vy;
			if x == 0.0 {
				x = lcg.jiggle();
			}
			if y == 0.0 {
				y = lcg.jiggle();
			}
			let l = (x * x + y * y).sqrt();
			let l = (l - self.distance) / l * alpha * self.strengths[k];
			x *= l;
			y *= l;
			let b = self.biases[k];
			bodies[t].vx -= x * b;
			bodies[t].vy -= y * b;
			bodies[s].vx += x * (1.0 - b);
			bodies[s].vy += y * (1.0 - b);
		}
	}
}

/// Charge between all bodies, approximated with a Barnes-Hut quadtree.
/// Negative strengths repel.
#[derive(Clone, Debug)]
pub struct ManyBodyForce {
	strengths: Vec<f64>,
}

impl ManyBodyForce {
	pub fn uniform(node_count: usize, strength: f64) -> Self {
		Self {
			strengths: vec![strength; node_count],
		}
	}

	pub fn per_node(strengths: Vec<f64>) -> Self {
		Self { strengths }
	}

	fn apply(&self, bodies: &mut [Body], alpha: f64, lcg: &mut Lcg) {
		let n = bodies.len().min(self.strengths.len());
		let tree = QuadTree::build(&bodies[..n], &self.strengths[..n]);
		for i in 0..n {
			let (dvx, dvy) = tree.charge_on(i, &bodies[..n], &self.strengths, alpha, lcg);
			bodies[i].vx += dvx;
			bodies[i].vy += dvy;
		}
	}
}

/// Cells farther than `size / sqrt(THETA2)` act as one point charge.
const THETA2: f64 = 0.81;
const MAX_DEPTH: usize = 32;

#[derive(Clone, Debug)]
struct Cell {
	x0: f64,
	y0: f64,
	size: f64,
	/// Centre of charge, weighted by absolute strength.
	cx: f64,
	cy: f64,
	strength: f64,
	children: [Option<usize>; 4],
	/// Bodies held by a leaf; empty for internal cells.
	bodies: Vec<usize>,
}

impl Cell {
	fn is_leaf(&self) -> bool {
		self.children.iter().all(Option::is_none)
	}

	fn contains(&self, b: &Body) -> bool {
		b.x >= self.x0 && b.x <= self.x0 + self.size && b.y >= self.y0 && b.y <= self.y0 + self.size
	}
}

#[derive(Clone, Debug, Default)]
struct QuadTree {
	cells: Vec<Cell>,
}

/// Velocity change from a charge of `strength` at offset `(x, y)`.
fn pull(mut x: f64, mut y: f64, strength: f64, alpha: f64, lcg: &mut Lcg) -> (f64, f64) {
	let mut l = x * x + y * y;
	if x == 0.0 {
		x = lcg.jiggle();
		l += x * x;
	}
	if y == 0.0 {
		y = lcg.jiggle();
		l += y * y;
	}
	if l < DISTANCE_MIN2 {
		l = (DISTANCE_MIN2 * l).sqrt();
	}
	let w = strength * alpha / l;
	(x * w, y * w)
}

impl QuadTree {
	fn build(bodies: &[Body], strengths: &[f64]) -> Self {
		let mut tree = Self::default();
		if bodies.is_empty() {
			return tree;
		}
		let (mut x0, mut y0, mut x1, mut y1) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
		for b in bodies {
			x0 = x0.min(b.x);
			y0 = y0.min(b.y);
			x1 = x1.max(b.x);
			y1 = y1.max(b.y);
		}
		let size = (x1 - x0).max(y1 - y0);
		tree.insert((0..bodies.len()).collect(), (x0, y0, size), 0, bodies, strengths);
		tree
	}

	/// Adds the cell covering the square `(x0, y0, size)` and returns its slot.
	fn insert(
		&mut self,
		members: Vec<usize>,
		(x0, y0, size): (f64, f64, f64),
		depth: usize,
		bodies: &[Body],
		strengths: &[f64],
	) -> usize {
		let slot = self.cells.len();
		self.cells.push(Cell {
			x0,
			y0,
			size,
			cx: 0.0,
			cy: 0.0,
			strength: 0.0,
			children: [None; 4],
			bodies: Vec::new(),
		});

		let splittable = members.len() > 1 && depth < MAX_DEPTH && size > 0.0 && size.is_finite();
		let (mut weight, mut wx, mut wy, mut strength) = (0.0, 0.0, 0.0, 0.0);
		if splittable {
			let half = size / 2.0;
			let mut quadrants: [Vec<usize>; 4] = Default::default();
			for i in members {
				let right = bodies[i].x >= x0 + half;
				let below = bodies[i].y >= y0 + half;
				quadrants[usize::from(right) + 2 * usize::from(below)].push(i);
			}
			for (q, group) in quadrants.into_iter().enumerate() {
				if group.is_empty() {
					continue;
				}
				let (qx, qy) = (x0 + half * (q % 2) as f64, y0 + half * (q / 2) as f64);
				let child = self.insert(group, (qx, qy, half), depth + 1, bodies, strengths);
				let c = &self.cells[child];
				let w = c.strength.abs();
				weight += w;
				wx += w * c.cx;
				wy += w * c.cy;
				strength += c.strength;
				self.cells[slot].children[q] = Some(child);
			}
		} else {
			for &i in &members {
				let w = strengths[i].abs();
				weight += w;
				wx += w * bodies[i].x;
				wy += w * bodies[i].y;
				strength += strengths[i];
			}
			self.cells[slot].bodies = members;
		}

		let cell = &mut self.cells[slot];
		cell.strength = strength;
		if weight > 0.0 {
			cell.cx = wx / weight;
			cell.cy = wy / weight;
		}
		slot
	}

	/// Velocity change on body `i` from every other body.
	fn charge_on(
		&self,
		i: usize,
		bodies: &[Body],
		strengths: &[f64],
		alpha: f64,
		lcg: &mut Lcg,
	) -> (f64, f64) {
		let (mut dvx, mut dvy) = (0.0, 0.0);
		let body = &bodies[i];
		let mut stack = Vec::with_capacity(64);
		if !self.cells.is_empty() {
			stack.push(0);
		}
		while let Some(slot) = stack.pop() {
			let cell = &self.cells[slot];
			if cell.strength == 0.0 {
				continue;
			}
			if !cell.is_leaf() {
				let (x, y) = (cell.cx - body.x, cell.cy - body.y);
				if !cell.contains(body) && cell.size * cell.size / THETA2 < x * x + y * y {
					let (vx, vy) = pull(x, y, cell.strength, alpha, lcg);
					dvx += vx;
					dvy += vy;
				} else {
					stack.extend(cell.children.iter().flatten());
				}
				continue;
			}
			for &j in cell.bodies.iter().filter(|&&j| j != i) {
				let (vx, vy) = pull(bodies[j].x - body.x, bodies[j].y - body.y, strengths[j], alpha, lcg);
				dvx += vx;
				dvy += vy;
			}
		}
		(dvx, dvy)
	}
}

/// Translates every body so the mean position sits on `(x, y)`.
#[derive(Clone, Copy, Debug)]
pub struct CenterForce {
	pub x: f64,
	pub y: f64,
	pub strength: f64,
}

impl CenterForce {
	pub fn new(center: Point) -> Self {
		Self {
			x: center.x,
			y: center.y,
			strength: 1.0,
		}
	}

	fn apply(&self, bodies: &mut [Body]) {
		if bodies.is_empty() {
			return;
		}
		let n = bodies.len() as f64;
		let (sx, sy) = bodies
			.iter()
			.fold((0.0, 0.0), |(sx, sy), b| (sx + b.x, sy + b.y));
		let (sx, sy) = (
			(sx / n - self.x) * self.strength,
			(sy / n - self.y) * self.strength,
		);
		for b in bodies {
			b.x -= sx;
			b.y -= sy;
		}
	}
}

/// Treats bodies as circles of `radius` and pushes overlapping pairs apart.
#[derive(Clone, Copy, Debug)]
pub struct CollideForce {
	pub radius: f64,
	pub strength: f64,
}

impl CollideForce {
	pub fn new(radius: f64) -> Self {
		Self {
			radius,
			strength: 1.0,
		}
	}

	pub fn with_strength(mut self, strength: f64) -> Self {
		self.strength = strength;
		self
	}

	fn apply(&self, bodies: &mut [Body], lcg: &mut Lcg) {
		let r = self.radius * 2.0;
		for i in 0..bodies.len() {
			let xi = bodies[i].x + bodies[i].vx;
			let yi = bodies[i].y + bodies[i].vy;
			for j in (i + 1)..bodies.len() {
				let mut x = xi - bodies[j].x - bodies[j].vx;
				let mut y = yi - bodies[j].y - bodies[j].vy;
				let mut l = x * x + y * y;
				if l >= r * r {
					continue;
				}
				if x == 0.0 {
					x = lcg.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = lcg.jiggle();
					l += y * y;
				}
				let d = l.sqrt();
				let k = (r - d) / d * self.strength;
				x *= k;
				y *= k;
				// equal radii split the correction evenly
				bodies[i].vx += x * 0.5;
				bodies[i].vy += y * 0.5;
				bodies[j].vx -= x * 0.5;
				bodies[j].vy -= y * 0.5;
			}
		}
	}
}

#[derive(Clone, Debug)]
pub enum Force {
	Link(LinkForce),
	ManyBody(ManyBodyForce),
	Center(CenterForce),
	Collide(CollideForce),
}

impl Force {
	fn apply(&self, bodies: &mut [Body], alpha: f64, lcg: &mut Lcg) {
		match self {
			Force::Link(f) => f.apply(bodies, alpha, lcg),
			Force::ManyBody(f) => f.apply(bodies, alpha, lcg),
			Force::Center(f) => f.apply(bodies),
			Force::Collide(f) => f.apply(bodies, lcg),
		}
	}
}

#[derive(Clone, Debug)]
pub struct Simulation {
	bodies: Vec<Body>,
	forces: Vec<Force>,
	alpha: f64,
	alpha_target: f64,
	alpha_decay: f64,
	running: bool,
	lcg: Lcg,
}

impl Simulation {
	/// Seeds bodies from `initial`; non-finite entries get a phyllotaxis spot.
	pub fn new(initial: &[Point]) -> Self {
		let angle = PI * (3.0 - 5f64.sqrt());
		let bodies = initial
			.iter()
			.enumerate()
			.map(|(i, p)| {
				if p.is_finite() {
					Body {
						x: p.x,
						y: p.y,
						..Body::default()
					}
				} else {
					let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
					let a = i as f64 * angle;
					Body {
						x: radius * a.cos(),
						y: radius * a.sin(),
						..Body::default()
					}
				}
			})
			.collect();

		Self {
			bodies,
			forces: Vec::new(),
			alpha: 1.0,
			alpha_target: 0.0,
			alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / 300.0),
			running: true,
			lcg: Lcg(1),
		}
	}

	pub fn with_force(mut self, force: Force) -> Self {
		self.forces.push(force);
		self
	}

	/// Advances one step. Returns whether the simulation is still hot.
	pub fn tick(&mut self) -> bool {
		if !self.running {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

		for force in &self.forces {
			force.apply(&mut self.bodies, self.alpha, &mut self.lcg);
		}

		for b in &mut self.bodies {
			match b.fx {
				Some(fx) => {
					b.x = fx;
					b.vx = 0.0;
				}
				None => {
					b.vx *= 1.0 - VELOCITY_DECAY;
					b.x += b.vx;
				}
			}
			match b.fy {
				Some(fy) => {
					b.y = fy;
					b.vy = 0.0;
				}
				None => {
					b.vy *= 1.0 - VELOCITY_DECAY;
					b.y += b.vy;
				}
			}
		}

		if self.alpha < ALPHA_MIN {
			self.running = false;
		}
		self.running
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn stop(&mut self) {
		self.running = false;
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Sets the alpha target and resumes ticking if the simulation had cooled.
	pub fn reheat(&mut self, target: f64) {
		self.alpha_target = target;
		self.running = true;
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	pub fn pin(&mut self, idx: usize, at: Point) {
		if let Some(b) = self.bodies.get_mut(idx) {
			b.fx = Some(at.x);
			b.fy = Some(at.y);
		}
	}

	pub fn unpin(&mut self, idx: usize) {
		if let Some(b) = self.bodies.get_mut(idx) {
			b.fx = None;
			b.fy = None;
		}
	}

	pub fn bodies(&self) -> &[Body] {
		&self.bodies
	}

	pub fn positions(&self) -> impl Iterator<Item = Point> + '_ {
		self.bodies.iter().map(Body::position)
	}
}
