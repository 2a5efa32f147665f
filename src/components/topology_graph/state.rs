//! The topology view state: simulation, retained scene and interaction
//! wired together.
//!
//! [`ZigzagGraph`] is created once per mounted view and driven by the
//! animation loop. Topology refreshes go through [`ZigzagGraph::set_data`];
//! a saved layout can be injected at any time and is held until the first
//! topology arrives.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use log::{info, warn};

use super::aggregate::{VisualEdge, aggregate};
use super::binder::RenderBinder;
use super::config::DisplayConfig;
use super::interaction::InteractionController;
use super::persistence::{self, LayoutEntry, LayoutStore};
use super::simulation::{Simulation, SimulationParams};
use super::source::unique_zigs;
use super::theme::Theme;
use super::types::TopologyData;

/// Eases the dim level of the scene towards fully dimmed while a hover
/// highlight is active and back to clear once it ends.
///
/// Exponential smoothing: `level += (target - level) * (1 - e^(-speed * dt))`.
#[derive(Clone, Debug, Default)]
pub struct DimFade {
	level: f64,
}

impl DimFade {
	const FADE_IN_SPEED: f64 = 6.0;
	const FADE_OUT_SPEED: f64 = 4.0;

	/// Advance by `dt` seconds towards dimmed or clear.
	pub fn tick(&mut self, dimmed: bool, dt: f64) {
		let (target, speed) = if dimmed {
			(1.0, Self::FADE_IN_SPEED)
		} else {
			(0.0, Self::FADE_OUT_SPEED)
		};
		self.level += (target - self.level) * (1.0 - (-speed * dt).exp());
		if (target - self.level).abs() < 0.005 {
			self.level = target;
		}
	}

	/// 0.0 = nothing dimmed, 1.0 = fully dimmed.
	pub fn level(&self) -> f64 {
		self.level
	}

	/// True once the level has reached its target.
	pub fn is_settled(&self, dimmed: bool) -> bool {
		self.level == if dimmed { 1.0 } else { 0.0 }
	}
}

/// Force-directed topology view: the single owner of simulation state.
pub struct ZigzagGraph {
	config: DisplayConfig,
	theme: Theme,
	sim: Simulation,
	binder: Rc<RefCell<RenderBinder>>,
	interaction: InteractionController,
	edges: Vec<VisualEdge>,
	pending_layout: Option<Vec<LayoutEntry>>,
	initialised: bool,
	fade: DimFade,
}

impl ZigzagGraph {
	/// View with default physics on a `width` x `height` canvas.
	pub fn new(config: DisplayConfig, width: f64, height: f64) -> Self {
		Self::with_params(config, SimulationParams::default(), width, height)
	}

	/// View with custom physics.
	pub fn with_params(
		config: DisplayConfig,
		params: SimulationParams,
		width: f64,
		height: f64,
	) -> Self {
		let binder = Rc::new(RefCell::new(RenderBinder::default()));
		let mut sim = Simulation::new(params, width, height);
		let binder_tick = binder.clone();
		sim.on_tick(Box::new(move |nodes| {
			binder_tick.borrow_mut().update_positions(nodes);
		}));
		Self {
			theme: Theme::by_name(config.theme.as_deref()),
			config,
			sim,
			binder,
			interaction: InteractionController::default(),
			edges: Vec::new(),
			pending_layout: None,
			initialised: false,
			fade: DimFade::default(),
		}
	}

	/// Display config the view was created with.
	pub fn config(&self) -> &DisplayConfig {
		&self.config
	}

	/// Theme picked from the config's theme name.
	pub fn theme(&self) -> &Theme {
		&self.theme
	}

	/// Read access to the physics state.
	pub fn simulation(&self) -> &Simulation {
		&self.sim
	}

	/// The retained scene, as of the last tick. Drop the guard before
	/// calling a `&mut self` method.
	pub fn scene(&self) -> Ref<'_, RenderBinder> {
		self.binder.borrow()
	}

	/// Visual edges of the current topology.
	pub fn edges(&self) -> &[VisualEdge] {
		&self.edges
	}

	/// True once topology data has been set.
	pub fn is_initialised(&self) -> bool {
		self.initialised
	}

	/// Eased dim level, 0.0 (clear) to 1.0 (fully dimmed).
	pub fn dim_level(&self) -> f64 {
		self.fade.level()
	}

	/// Replace the topology: rebuild edges, rebind the simulation and the
	/// scene, then apply any layout that arrived before the data did.
	///
	/// Devices with a blank or repeated id are dropped first, so every id
	/// names exactly one simulation node and one scene element.
	pub fn set_data(&mut self, data: TopologyData) {
		let data = TopologyData {
			nodes: unique_zigs(data.nodes),
			links: data.links,
		};
		self.edges = aggregate(&data.links, &data.nodes);
		let (width, height) = self.sim.size();
		self.sim.initialize(&data.nodes, &self.edges, width, height);

		{
			let mut binder = self.binder.borrow_mut();
			binder.clear_highlight();
			binder.join_nodes(&data.nodes, &self.config);
			binder.join_edges(&self.edges, &self.config);
			for (index, node) in self.sim.nodes().iter().enumerate() {
				binder.set_lock_visible(index, node.is_pinned());
			}
			binder.update_positions(self.sim.nodes());
		}
		self.interaction.reset();

		info!(
			"zigzag: topology set with {} devices, {} links, {} edges",
			data.nodes.len(),
			data.links.len(),
			self.edges.len()
		);

		self.initialised = true;
		if let Some(layout) = self.pending_layout.take() {
			self.inject_layout(layout);
		}
	}

	/// Advance one animation frame. Returns whether another frame is wanted.
	pub fn step(&mut self, dt: f64) -> bool {
		let running = self.sim.step();
		let dimmed = self.binder.borrow().is_dimmed();
		self.fade.tick(dimmed, dt);
		running || !self.fade.is_settled(dimmed)
	}

	/// Apply new canvas dimensions; restarts only when they changed.
	pub fn resize(&mut self, width: f64, height: f64) -> bool {
		self.sim.resize(width, height)
	}

	/// Press at `(x, y)`; starts a drag when a device is hit.
	pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
		let mut binder = self.binder.borrow_mut();
		self.interaction.pointer_down(&mut self.sim, &mut binder, x, y)
	}

	/// Drag the held device, or update the hover highlight.
	pub fn pointer_move(&mut self, x: f64, y: f64) {
		let mut binder = self.binder.borrow_mut();
		self.interaction.pointer_move(&mut self.sim, &mut binder, x, y);
	}

	/// End a drag; the device stays pinned where it was dropped.
	pub fn pointer_up(&mut self) {
		self.interaction.pointer_up(&mut self.sim);
	}

	/// Pointer left the canvas: end any drag and clear the highlight.
	pub fn pointer_leave(&mut self) {
		let mut binder = self.binder.borrow_mut();
		self.interaction.pointer_leave(&mut self.sim, &mut binder);
	}

	/// Release the pin of the device at `(x, y)`, if any.
	pub fn double_click(&mut self, x: f64, y: f64) {
		let mut binder = self.binder.borrow_mut();
		self.interaction.pointer_double_click(&mut self.sim, &mut binder, x, y);
	}

	/// True while a device is being dragged.
	pub fn is_dragging(&self) -> bool {
		self.interaction.drag.active
	}

	/// Node index under the pointer, if any.
	pub fn hovered(&self) -> Option<usize> {
		self.interaction.hovered()
	}

	/// Positions of every pinned device.
	pub fn extract_layout(&self) -> Vec<LayoutEntry> {
		persistence::extract(&self.sim)
	}

	/// Apply a saved layout now, or hold it until topology data arrives.
	pub fn inject_layout(&mut self, layout: Vec<LayoutEntry>) {
		if !self.initialised {
			self.pending_layout = Some(layout);
			return;
		}
		let mut binder = self.binder.borrow_mut();
		let pinned = persistence::apply(&mut self.sim, &mut binder, &layout);
		info!("zigzag: restored {} of {} saved positions", pinned, layout.len());
	}

	/// Load and inject the layout held by `store`. Failures are logged.
	pub fn restore_layout(&mut self, store: &dyn LayoutStore) {
		match store.load() {
			Ok(Some(layout)) => self.inject_layout(layout),
			Ok(None) => {}
			Err(e) => warn!("zigzag: could not load saved layout: {e}"),
		}
	}

	/// Save the current pins to `store`. Failures are logged.
	pub fn save_layout(&self, store: &dyn LayoutStore) {
		let layout = self.extract_layout();
		if let Err(e) = store.save(&layout) {
			warn!("zigzag: could not save layout: {e}");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::topology_graph::persistence::MemoryLayoutStore;
	use crate::components::topology_graph::types::{Relation, Zag, Zig};

	fn topology() -> TopologyData {
		TopologyData {
			nodes: ["A", "B", "C"].iter().map(|id| Zig::new(*id)).collect(),
			links: vec![
				Zag::new("A", "B", Relation::Parent),
				Zag::new("B", "A", Relation::Child),
				Zag::new("B", "C", Relation::Parent),
			],
		}
	}

	fn settle(graph: &mut ZigzagGraph) {
		let mut frames = 0;
		while graph.step(0.016) {
			frames += 1;
			assert!(frames < 10_000);
		}
	}

	#[test]
	fn tick_callback_keeps_scene_in_step_with_simulation() {
		let mut graph = ZigzagGraph::new(DisplayConfig::default(), 800.0, 600.0);
		graph.set_data(topology());
		settle(&mut graph);
		let scene = graph.scene();
		for (element, node) in scene.nodes().iter().zip(graph.simulation().nodes()) {
			assert_eq!((element.center.x, element.center.y), (node.x, node.y));
		}
		assert_eq!(scene.edges().len(), 2);
	}

	#[test]
	fn layout_injected_early_is_applied_with_the_data() {
		let mut graph = ZigzagGraph::new(DisplayConfig::default(), 800.0, 600.0);
		let layout = vec![LayoutEntry { id: "C".into(), x: 100.0, y: 150.0 }];
		graph.inject_layout(layout.clone());
		assert!(graph.extract_layout().is_empty());

		graph.set_data(topology());
		assert_eq!(graph.extract_layout(), layout);
		assert!(graph.scene().node("C").unwrap().lock_visible);
	}

	#[test]
	fn store_round_trip_through_the_facade() {
		let store = MemoryLayoutStore::default();
		let mut graph = ZigzagGraph::new(DisplayConfig::default(), 800.0, 600.0);
		graph.set_data(topology());
		settle(&mut graph);
		let (x, y) = (graph.simulation().nodes()[1].x, graph.simulation().nodes()[1].y);
		assert!(graph.pointer_down(x, y));
		graph.pointer_up();
		graph.save_layout(&store);

		let mut fresh = ZigzagGraph::new(DisplayConfig::default(), 800.0, 600.0);
		fresh.restore_layout(&store);
		fresh.set_data(topology());
		assert_eq!(fresh.extract_layout(), graph.extract_layout());
		assert_eq!(fresh.extract_layout().len(), 1);
	}

	#[test]
	fn unreadable_store_is_logged_not_fatal() {
		let store = MemoryLayoutStore::with_json("not json");
		let mut graph = ZigzagGraph::new(DisplayConfig::default(), 800.0, 600.0);
		graph.set_data(topology());
		graph.restore_layout(&store);
		assert!(graph.extract_layout().is_empty());
	}

	#[test]
	fn dim_level_eases_in_and_out() {
		let mut fade = DimFade::default();
		fade.tick(true, 0.016);
		let first = fade.level();
		assert!(first > 0.0 && first < 1.0);
		for _ in 0..200 {
			fade.tick(true, 0.016);
		}
		assert_eq!(fade.level(), 1.0);
		assert!(fade.is_settled(true));
		fade.tick(false, 0.016);
		assert!(fade.level() < 1.0);
	}
}
