//! Force simulation positioning devices on the canvas.
//!
//! Velocity-Verlet style integration with a cooling `alpha`: every tick the
//! registered forces adjust node velocities, velocities decay, positions
//! advance, and the result is clamped into the visible canvas. The simulation
//! halts itself once `alpha` falls below `alpha_min`; ticks are driven by an
//! external scheduler calling [`Simulation::step`].

use std::collections::HashMap;
use std::f64::consts::PI;

use log::debug;

use super::aggregate::VisualEdge;
use super::types::Zig;

/// Tunable simulation constants.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationParams {
	/// Device icon size; also the canvas margin nodes are kept within.
	pub icon_size: f64,
	/// Simulation halts when alpha drops below this.
	pub alpha_min: f64,
	/// Fraction of the remaining distance to `alpha_target` covered per tick.
	pub alpha_decay: f64,
	/// Alpha used when reheating after interaction, resize or layout restore.
	pub alpha_restart: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Collision radius as a multiple of `icon_size`.
	pub repel_factor: f64,
	/// Rest length of link springs.
	pub link_distance: f64,
}

impl Default for SimulationParams {
	fn default() -> Self {
		Self {
			icon_size: 48.0,
			alpha_min: 0.01,
			alpha_decay: 0.04,
			alpha_restart: 0.3,
			velocity_decay: 0.4,
			repel_factor: 2.0,
			link_distance: 30.0,
		}
	}
}

impl SimulationParams {
	/// Collision radius: half the icon size plus padding.
	pub fn repel_radius(&self) -> f64 {
		self.icon_size * self.repel_factor
	}
}

/// Clamp `coordinate` into `[low, high - low]`.
///
/// When `high < 2 * low` the range is inverted and every input maps to
/// `low`; a canvas smaller than two icons cannot show the graph properly.
pub fn constrain_within_boundary(coordinate: f64, low: f64, high: f64) -> f64 {
	low.max((high - low).min(coordinate))
}

/// A device together with its physics state.
#[derive(Clone, Debug, PartialEq)]
pub struct SimNode {
	/// Device id.
	pub id: String,
	/// Current position, in canvas pixels.
	pub x: f64,
	/// Vertical counterpart of `x`.
	pub y: f64,
	/// Velocity, in pixels per tick.
	pub vx: f64,
	/// Vertical counterpart of `vx`.
	pub vy: f64,
	/// Fixed position; present only while the node is pinned.
	pub fx: Option<f64>,
	/// Vertical counterpart of `fx`.
	pub fy: Option<f64>,
}

impl SimNode {
	/// True while both fixed coordinates are set.
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() && self.fy.is_some()
	}

	/// The fixed position, if pinned.
	pub fn pinned_position(&self) -> Option<(f64, f64)> {
		Some((self.fx?, self.fy?))
	}
}

/// Canvas geometry forces are configured against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	/// See [`SimulationParams::repel_radius`].
	pub repel_radius: f64,
}

/// Deterministic source for the tiny displacements used to separate
/// coincident nodes.
#[derive(Clone, Debug)]
pub struct Jiggle {
	state: u64,
}

impl Default for Jiggle {
	fn default() -> Self {
		Self { state: 1 }
	}
}

impl Jiggle {
	/// Linear congruential generator yielding values in [0, 1).
	fn next_unit(&mut self) -> f64 {
		const A: u64 = 1_664_525;
		const C: u64 = 1_013_904_223;
		const M: u64 = 1 << 32;
		self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
		self.state as f64 / M as f64
	}

	/// Next displacement, smaller than one millionth of a pixel.
	pub fn next(&mut self) -> f64 {
		(self.next_unit() - 0.5) * 1e-6
	}
}

/// A force acting on node velocities.
pub trait Force {
	/// Called when nodes are (re)bound or the canvas changes.
	fn configure(&mut self, _nodes: &[SimNode], _bounds: &Bounds) {}

	/// Adjust velocities for one tick at cooling level `alpha`.
	fn apply(&mut self, nodes: &mut [SimNode], alpha: f64, jiggle: &mut Jiggle);
}

/// Shifts all nodes so their mean position sits at the canvas center.
#[derive(Clone, Debug, Default)]
pub struct CenterForce {
	x: f64,
	y: f64,
}

impl Force for CenterForce {
	fn configure(&mut self, _nodes: &[SimNode], bounds: &Bounds) {
		self.x = bounds.width / 2.0;
		self.y = bounds.height / 2.0;
	}

	fn apply(&mut self, nodes: &mut [SimNode], _alpha: f64, _jiggle: &mut Jiggle) {
		if nodes.is_empty() {
			return;
		}
		let n = nodes.len() as f64;
		let (sx, sy) = nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let (dx, dy) = (sx / n - self.x, sy / n - self.y);
		for node in nodes {
			node.x -= dx;
			node.y -= dy;
		}
	}
}

/// Pushes apart any two nodes closer than twice the repel radius. Pinned
/// nodes take part like any other node.
#[derive(Clone, Debug)]
pub struct CollideForce {
	radius: f64,
	strength: f64,
}

impl Default for CollideForce {
	fn default() -> Self {
		Self {
			radius: 1.0,
			strength: 1.0,
		}
	}
}

impl Force for CollideForce {
	fn configure(&mut self, _nodes: &[SimNode], bounds: &Bounds) {
		self.radius = bounds.repel_radius;
	}

	fn apply(&mut self, nodes: &mut [SimNode], _alpha: f64, jiggle: &mut Jiggle) {
		let (ri, rj) = (self.radius, self.radius);
		let (ri2, rj2) = (ri * ri, rj * rj);
		let r = ri + rj;
		let share = rj2 / (ri2 + rj2);

		for i in 0..nodes.len() {
			let xi = nodes[i].x + nodes[i].vx;
			let yi = nodes[i].y + nodes[i].vy;
			for j in (i + 1)..nodes.len() {
				let mut x = xi - nodes[j].x - nodes[j].vx;
				let mut y = yi - nodes[j].y - nodes[j].vy;
				let mut l = x * x + y * y;
				if l >= r * r {
					continue;
				}
				if x == 0.0 {
					x = jiggle.next();
					l += x * x;
				}
				if y == 0.0 {
					y = jiggle.next();
					l += y * y;
				}
				let len = l.sqrt();
				let k = (r - len) / len * self.strength;
				x *= k;
				y *= k;
				nodes[i].vx += x * share;
				nodes[i].vy += y * share;
				nodes[j].vx -= x * (1.0 - share);
				nodes[j].vy -= y * (1.0 - share);
			}
		}
	}
}

#[derive(Clone, Debug)]
struct Spring {
	source: usize,
	target: usize,
	strength: f64,
	bias: f64,
}

/// Springs pulling the endpoints of every visual edge toward the rest
/// length. Springs of well-connected nodes are weakened so hubs do not
/// collapse their neighborhood.
#[derive(Clone, Debug)]
pub struct LinkForce {
	links: Vec<(usize, usize)>,
	springs: Vec<Spring>,
	distance: f64,
}

impl LinkForce {
	/// Springs between node index pairs, resting at `distance`.
	pub fn new(links: Vec<(usize, usize)>, distance: f64) -> Self {
		Self {
			links,
			springs: Vec::new(),
			distance,
		}
	}
}

impl Force for LinkForce {
	fn configure(&mut self, nodes: &[SimNode], _bounds: &Bounds) {
		let mut count = vec![0usize; nodes.len()];
		let links: Vec<(usize, usize)> = self
			.links
			.iter()
			.copied()
			.filter(|&(s, t)| s < nodes.len() && t < nodes.len())
			.collect();
		for &(s, t) in &links {
			count[s] += 1;
			count[t] += 1;
		}
		self.springs = links
			.into_iter()
			.map(|(source, target)| {
				let (cs, ct) = (count[source] as f64, count[target] as f64);
				Spring {
					source,
					target,
					strength: 1.0 / cs.min(ct),
					bias: cs / (cs + ct),
				}
			})
			.collect();
	}

	fn apply(&mut self, nodes: &mut [SimNode], alpha: f64, jiggle: &mut Jiggle) {
		for spring in &self.springs {
			let (s, t) = (&nodes[spring.source], &nodes[spring.target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			let mut y = t.y + t.vy - s.y - s.vy;
			if x == 0.0 {
				x = jiggle.next();
			}
			if y == 0.0 {
				y = jiggle.next();
			}
			let len = (x * x + y * y).sqrt();
			let k = (len - self.distance) / len * alpha * spring.strength;
			x *= k;
			y *= k;
			let b = spring.bias;
			nodes[spring.target].vx -= x * b;
			nodes[spring.target].vy -= y * b;
			nodes[spring.source].vx += x * (1.0 - b);
			nodes[spring.source].vy += y * (1.0 - b);
		}
	}
}

/// Callback invoked synchronously after every tick.
pub type TickCallback = Box<dyn FnMut(&[SimNode])>;

/// The force layout engine. Sole owner of node physics state: all pinning,
/// unpinning and resizing goes through its methods.
pub struct Simulation {
	params: SimulationParams,
	nodes: Vec<SimNode>,
	forces: Vec<(String, Box<dyn Force>)>,
	width: f64,
	height: f64,
	alpha: f64,
	alpha_target: f64,
	running: bool,
	jiggle: Jiggle,
	on_tick: Option<TickCallback>,
}

impl Simulation {
	/// Empty, idle simulation on a `width` x `height` canvas.
	pub fn new(params: SimulationParams, width: f64, height: f64) -> Self {
		Self {
			params,
			nodes: Vec::new(),
			forces: Vec::new(),
			width,
			height,
			alpha: 1.0,
			alpha_target: 0.0,
			running: false,
			jiggle: Jiggle::default(),
			on_tick: None,
		}
	}

	/// Physics parameters.
	pub fn params(&self) -> &SimulationParams {
		&self.params
	}

	/// Nodes in the order of the device list they were bound from.
	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	/// Node with the given id.
	pub fn node(&self, id: &str) -> Option<&SimNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Index of the node with the given id.
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.nodes.iter().position(|n| n.id == id)
	}

	/// Canvas `(width, height)`.
	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	/// Current cooling level.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// False once alpha has dropped below `alpha_min`.
	pub fn is_running(&self) -> bool {
		self.running
	}

	fn bounds(&self) -> Bounds {
		Bounds {
			width: self.width,
			height: self.height,
			repel_radius: self.params.repel_radius(),
		}
	}

	/// Bind a new node and edge set.
	///
	/// Velocities are discarded. Nodes whose id was already present keep
	/// their position and pin; new nodes are seeded on a spiral around the
	/// canvas center.
	pub fn initialize(&mut self, zigs: &[Zig], edges: &[VisualEdge], width: f64, height: f64) {
		let previous: HashMap<String, SimNode> = self
			.nodes
			.drain(..)
			.map(|node| (node.id.clone(), node))
			.collect();
		self.width = width;
		self.height = height;

		let initial_angle = PI * (3.0 - 5f64.sqrt());
		let (cx, cy) = (width / 2.0, height / 2.0);
		self.nodes = zigs
			.iter()
			.enumerate()
			.map(|(i, zig)| match previous.get(&zig.id) {
				Some(old) => SimNode {
					vx: 0.0,
					vy: 0.0,
					..old.clone()
				},
				None => {
					let radius = 10.0 * (0.5 + i as f64).sqrt();
					let angle = i as f64 * initial_angle;
					SimNode {
						id: zig.id.clone(),
						x: cx + radius * angle.cos(),
						y: cy + radius * angle.sin(),
						vx: 0.0,
						vy: 0.0,
						fx: None,
						fy: None,
					}
				}
			})
			.collect();

		let links = edges.iter().map(|e| (e.source, e.target)).collect();
		self.forces.clear();
		self.register_force("link", LinkForce::new(links, self.params.link_distance));
		self.register_force("center", CenterForce::default());
		self.register_force("repel", CollideForce::default());

		debug!(
			"zigzag: simulation bound to {} nodes, {} edges",
			self.nodes.len(),
			edges.len()
		);
		self.reheat(self.params.alpha_restart);
	}

	/// Add or replace a named force.
	pub fn register_force(&mut self, name: &str, mut force: impl Force + 'static) {
		force.configure(&self.nodes, &self.bounds());
		let force: Box<dyn Force> = Box::new(force);
		match self.forces.iter_mut().find(|(n, _)| n == name) {
			Some(slot) => slot.1 = force,
			None => self.forces.push((name.to_string(), force)),
		}
	}

	/// Remove a named force. Returns whether it was registered.
	pub fn remove_force(&mut self, name: &str) -> bool {
		let before = self.forces.len();
		self.forces.retain(|(n, _)| n != name);
		self.forces.len() != before
	}

	/// Replace the callback run after every [`step`](Self::step).
	pub fn on_tick(&mut self, callback: TickCallback) {
		self.on_tick = Some(callback);
	}

	/// Resume ticking without changing alpha.
	pub fn restart(&mut self) {
		self.running = true;
	}

	/// Set alpha and resume ticking.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = alpha;
		self.running = true;
	}

	/// Advance one tick without invoking the callback or the halt check.
	pub fn tick(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;

		for (_, force) in &mut self.forces {
			force.apply(&mut self.nodes, self.alpha, &mut self.jiggle);
		}

		let keep = 1.0 - self.params.velocity_decay;
		let margin = self.params.icon_size;
		for node in &mut self.nodes {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= keep;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= keep;
					node.y += node.vy;
				}
			}
			node.x = constrain_within_boundary(node.x, margin, self.width);
			node.y = constrain_within_boundary(node.y, margin, self.height);
		}
	}

	/// Scheduler entry point: tick, notify, and halt once cooled. Returns
	/// whether the simulation wants further steps.
	pub fn step(&mut self) -> bool {
		if !self.running {
			return false;
		}
		self.tick();
		if let Some(callback) = self.on_tick.as_mut() {
			callback(&self.nodes);
		}
		if self.alpha < self.params.alpha_min {
			self.running = false;
		}
		self.running
	}

	/// Fix a node at `(x, y)`. Returns false for unknown ids.
	pub fn pin(&mut self, id: &str, x: f64, y: f64) -> bool {
		match self.nodes.iter_mut().find(|n| n.id == id) {
			Some(node) => {
				node.fx = Some(x);
				node.fy = Some(y);
				true
			}
			None => false,
		}
	}

	/// Release a pinned node back to the physics. Returns false for unknown
	/// ids.
	pub fn unpin(&mut self, id: &str) -> bool {
		match self.nodes.iter_mut().find(|n| n.id == id) {
			Some(node) => {
				node.fx = None;
				node.fy = None;
				true
			}
			None => false,
		}
	}

	/// Clamp a pointer coordinate pair into the canvas.
	pub fn constrain(&self, x: f64, y: f64) -> (f64, f64) {
		let margin = self.params.icon_size;
		(
			constrain_within_boundary(x, margin, self.width),
			constrain_within_boundary(y, margin, self.height),
		)
	}

	/// Apply new canvas dimensions. Restarts only when they changed; returns
	/// whether a restart happened.
	pub fn resize(&mut self, width: f64, height: f64) -> bool {
		if self.width == width && self.height == height {
			return false;
		}
		self.width = width;
		self.height = height;
		let bounds = self.bounds();
		for (_, force) in &mut self.forces {
			force.configure(&self.nodes, &bounds);
		}
		debug!("zigzag: resized to {}x{}", width, height);
		self.reheat(self.params.alpha_restart);
		true
	}

	/// Topmost node whose icon circle contains `(x, y)`.
	pub fn node_at(&self, x: f64, y: f64) -> Option<usize> {
		let radius = self.params.icon_size / 2.0;
		self.nodes
			.iter()
			.rposition(|n| (n.x - x).hypot(n.y - y) < radius)
	}
}
