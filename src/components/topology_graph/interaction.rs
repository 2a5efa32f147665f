//! Pointer interaction: drag to pin, double-click to unpin, hover to
//! highlight a device's neighborhood.
//!
//! Every device is either [`PinState::Free`] or [`PinState::Pinned`].
//! Starting a drag pins the device where it stands, moving the pointer moves
//! the pin, and releasing leaves it pinned while the rest of the graph
//! resettles. Hover state is presentation only and never touches the
//! simulation.

use super::binder::RenderBinder;
use super::simulation::Simulation;

/// Pin state of one device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinState {
	/// Positioned by the forces.
	Free,
	/// Held at a fixed position until double-clicked.
	Pinned,
}

/// Tracks an in-progress device drag.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	/// A drag is in progress.
	pub active: bool,
	/// Index of the dragged node.
	pub node: Option<usize>,
	/// Pointer position minus device position at drag start.
	pub offset_x: f64,
	/// See `offset_x`.
	pub offset_y: f64,
}

/// Routes pointer events to the simulation and the retained scene.
#[derive(Clone, Debug, Default)]
pub struct InteractionController {
	/// Current drag, if any.
	pub drag: DragState,
	hovered: Option<usize>,
}

impl InteractionController {
	/// Pin state of node `index`; out-of-range indices read as free.
	pub fn pin_state(sim: &Simulation, index: usize) -> PinState {
		match sim.nodes().get(index) {
			Some(node) if node.is_pinned() => PinState::Pinned,
			_ => PinState::Free,
		}
	}

	/// Node index currently hovered.
	pub fn hovered(&self) -> Option<usize> {
		self.hovered
	}

	/// Free → Pinned: fix the device at its current position and show the
	/// lock.
	pub fn drag_start(
		&mut self,
		sim: &mut Simulation,
		binder: &mut RenderBinder,
		index: usize,
		pointer_x: f64,
		pointer_y: f64,
	) {
		let Some(node) = sim.nodes().get(index) else {
			return;
		};
		let (id, x, y) = (node.id.clone(), node.x, node.y);
		let (fx, fy) = sim.constrain(x, y);
		sim.pin(&id, fx, fy);
		binder.set_lock_visible(index, true);
		self.drag = DragState {
			active: true,
			node: Some(index),
			offset_x: pointer_x - x,
			offset_y: pointer_y - y,
		};
	}

	/// Pinned → Pinned: move the pin with the pointer. Ticks once more even
	/// if the simulation has cooled so the device follows the pointer.
	pub fn drag_move(&mut self, sim: &mut Simulation, pointer_x: f64, pointer_y: f64) {
		let Some(index) = self.drag.node.filter(|_| self.drag.active) else {
			return;
		};
		let Some(id) = sim.nodes().get(index).map(|n| n.id.clone()) else {
			return;
		};
		let (fx, fy) = sim.constrain(pointer_x - self.drag.offset_x, pointer_y - self.drag.offset_y);
		sim.pin(&id, fx, fy);
		sim.restart();
	}

	/// Pinned → Pinned: release the pointer and reheat so neighbors resettle.
	pub fn drag_end(&mut self, sim: &mut Simulation) {
		if self.drag.active {
			let alpha = sim.params().alpha_restart;
			sim.reheat(alpha);
		}
		self.drag = DragState::default();
	}

	/// Pinned → Free: clear the fixed position and hide the lock.
	pub fn double_click(&mut self, sim: &mut Simulation, binder: &mut RenderBinder, index: usize) {
		let Some(id) = sim.nodes().get(index).map(|n| n.id.clone()) else {
			return;
		};
		sim.unpin(&id);
		binder.set_lock_visible(index, false);
	}

	/// Highlight the neighborhood of node `index`.
	pub fn hover_enter(&mut self, binder: &mut RenderBinder, index: usize) {
		binder.clear_highlight();
		binder.highlight_neighborhood(index);
		self.hovered = Some(index);
	}

	/// Drop the highlight.
	pub fn hover_leave(&mut self, binder: &mut RenderBinder) {
		binder.clear_highlight();
		self.hovered = None;
	}

	/// Pointer pressed: start a drag if it landed on a device.
	pub fn pointer_down(
		&mut self,
		sim: &mut Simulation,
		binder: &mut RenderBinder,
		x: f64,
		y: f64,
	) -> bool {
		match sim.node_at(x, y) {
			Some(index) => {
				self.drag_start(sim, binder, index, x, y);
				true
			}
			None => false,
		}
	}

	/// Pointer moved: drag, or translate into hover enter/leave when the
	/// device under the pointer changes.
	pub fn pointer_move(&mut self, sim: &mut Simulation, binder: &mut RenderBinder, x: f64, y: f64) {
		if self.drag.active {
			self.drag_move(sim, x, y);
			return;
		}
		let under = sim.node_at(x, y);
		if under == self.hovered {
			return;
		}
		match under {
			Some(index) => self.hover_enter(binder, index),
			None => self.hover_leave(binder),
		}
	}

	/// Pointer released: end any drag.
	pub fn pointer_up(&mut self, sim: &mut Simulation) {
		self.drag_end(sim);
	}

	/// Double-click: unpin the device under the pointer.
	pub fn pointer_double_click(
		&mut self,
		sim: &mut Simulation,
		binder: &mut RenderBinder,
		x: f64,
		y: f64,
	) {
		if let Some(index) = sim.node_at(x, y) {
			self.double_click(sim, binder, index);
		}
	}

	/// Pointer left the canvas: finish any drag and drop the hover.
	pub fn pointer_leave(&mut self, sim: &mut Simulation, binder: &mut RenderBinder) {
		self.drag_end(sim);
		self.hover_leave(binder);
	}

	/// Forget element indices after the topology was rebound.
	pub fn reset(&mut self) {
		self.drag = DragState::default();
		self.hovered = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::topology_graph::aggregate::aggregate;
	use crate::components::topology_graph::config::DisplayConfig;
	use crate::components::topology_graph::simulation::SimulationParams;
	use crate::components::topology_graph::types::{Relation, Zag, Zig};

	fn setup() -> (Simulation, RenderBinder) {
		let zigs: Vec<Zig> = ["A", "B", "C"].iter().map(|id| Zig::new(*id)).collect();
		let edges = aggregate(&[Zag::new("A", "B", Relation::Parent)], &zigs);
		let mut sim = Simulation::new(SimulationParams::default(), 800.0, 600.0);
		sim.initialize(&zigs, &edges, 800.0, 600.0);
		while sim.step() {}
		let mut binder = RenderBinder::default();
		let config = DisplayConfig::default();
		binder.join_nodes(&zigs, &config);
		binder.join_edges(&edges, &config);
		binder.update_positions(sim.nodes());
		(sim, binder)
	}

	#[test]
	fn drag_pins_and_double_click_frees() {
		let (mut sim, mut binder) = setup();
		let mut controller = InteractionController::default();
		let (x, y) = (sim.nodes()[0].x, sim.nodes()[0].y);

		controller.drag_start(&mut sim, &mut binder, 0, x + 5.0, y + 5.0);
		assert_eq!(InteractionController::pin_state(&sim, 0), PinState::Pinned);
		assert!(binder.nodes()[0].lock_visible);
		assert_eq!(sim.nodes()[0].pinned_position(), Some((x, y)));

		controller.drag_move(&mut sim, 305.0, 205.0);
		assert_eq!(sim.nodes()[0].pinned_position(), Some((300.0, 200.0)));
		assert!(sim.is_running());
		sim.step();
		assert_eq!((sim.nodes()[0].x, sim.nodes()[0].y), (300.0, 200.0));

		controller.drag_end(&mut sim);
		assert!(!controller.drag.active);
		assert_eq!(sim.alpha(), sim.params().alpha_restart);
		assert_eq!(InteractionController::pin_state(&sim, 0), PinState::Pinned);

		controller.double_click(&mut sim, &mut binder, 0);
		assert_eq!(InteractionController::pin_state(&sim, 0), PinState::Free);
		assert!(!binder.nodes()[0].lock_visible);
	}

	#[test]
	fn dragging_past_the_edge_is_clamped() {
		let (mut sim, mut binder) = setup();
		let mut controller = InteractionController::default();
		let (x, y) = (sim.nodes()[1].x, sim.nodes()[1].y);
		controller.drag_start(&mut sim, &mut binder, 1, x, y);
		controller.drag_move(&mut sim, -500.0, 9000.0);
		assert_eq!(sim.nodes()[1].pinned_position(), Some((48.0, 600.0 - 48.0)));
	}

	#[test]
	fn moves_without_a_drag_leave_pins_alone() {
		let (mut sim, _) = setup();
		let mut controller = InteractionController::default();
		controller.drag_move(&mut sim, 100.0, 100.0);
		assert!(sim.nodes().iter().all(|n| !n.is_pinned()));
	}

	#[test]
	fn hover_follows_the_pointer() {
		let (mut sim, mut binder) = setup();
		let mut controller = InteractionController::default();
		let (x, y) = (sim.nodes()[0].x, sim.nodes()[0].y);

		controller.pointer_move(&mut sim, &mut binder, x, y);
		assert_eq!(controller.hovered(), Some(0));
		assert!(binder.is_dimmed());
		assert!(binder.nodes()[1].highlighted);
		assert!(!binder.nodes()[2].highlighted);

		controller.pointer_leave(&mut sim, &mut binder);
		assert_eq!(controller.hovered(), None);
		assert!(!binder.is_dimmed());
		assert!(binder.nodes().iter().all(|n| !n.highlighted));
	}
}
