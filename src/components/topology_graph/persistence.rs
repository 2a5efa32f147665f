//! Saving and restoring the positions of pinned devices.
//!
//! Only pinned devices are persisted: a layout is the list of user-fixed
//! positions, and everything else is left to the simulation.

use std::cell::RefCell;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::binder::RenderBinder;
use super::error::LayoutError;
use super::simulation::Simulation;

/// Storage key of the saved layout.
pub const LAYOUT_KEY: &str = "zigzag-layout";

/// A user-pinned device position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
	/// Device id.
	pub id: String,
	/// Pinned x, in canvas pixels.
	pub x: f64,
	/// Pinned y, in canvas pixels.
	pub y: f64,
}

/// Entries for every currently pinned device.
///
/// Entries come out in node order, whatever order they were applied in. A
/// layout is a set keyed by id: two layouts with the same entries in a
/// different order restore the same positions.
pub fn extract(sim: &Simulation) -> Vec<LayoutEntry> {
	sim.nodes()
		.iter()
		.filter_map(|node| {
			let (x, y) = node.pinned_position()?;
			Some(LayoutEntry {
				id: node.id.clone(),
				x,
				y,
			})
		})
		.collect()
}

/// Pin every device named in `entries` and restart once.
///
/// Entries for unknown devices are ignored. The whole batch is checked
/// before anything is pinned, so a rejected layout leaves the graph as it
/// was. Returns the number of devices pinned.
pub fn try_apply(
	sim: &mut Simulation,
	binder: &mut RenderBinder,
	entries: &[LayoutEntry],
) -> Result<usize, LayoutError> {
	if let Some(bad) = entries.iter().find(|e| !e.x.is_finite() || !e.y.is_finite()) {
		return Err(LayoutError::NonFinite {
			id: bad.id.clone(),
			x: bad.x,
			y: bad.y,
		});
	}

	let mut pinned = 0;
	for entry in entries {
		let Some(index) = sim.index_of(&entry.id) else {
			debug!("zigzag: layout entry for unknown device {} ignored", entry.id);
			continue;
		};
		sim.pin(&entry.id, entry.x, entry.y);
		binder.set_lock_visible(index, true);
		pinned += 1;
	}

	let alpha = sim.params().alpha_restart;
	sim.reheat(alpha);
	Ok(pinned)
}

/// Best-effort restore: failures are logged and swallowed.
pub fn apply(sim: &mut Simulation, binder: &mut RenderBinder, entries: &[LayoutEntry]) -> usize {
	match try_apply(sim, binder, entries) {
		Ok(pinned) => pinned,
		Err(e) => {
			warn!("zigzag: could not restore layout: {e}");
			0
		}
	}
}

/// Parse a stored layout. `null` means no layout was saved.
pub fn parse_layout(json: &str) -> Result<Option<Vec<LayoutEntry>>, LayoutError> {
	Ok(serde_json::from_str(json)?)
}

/// Persistence collaborator holding the saved layout between sessions.
pub trait LayoutStore {
	/// The saved layout, or `None` if nothing was saved.
	fn load(&self) -> Result<Option<Vec<LayoutEntry>>, LayoutError>;

	/// Replace the saved layout.
	fn save(&self, entries: &[LayoutEntry]) -> Result<(), LayoutError>;
}

/// Keeps the layout as serialized JSON in memory.
#[derive(Debug, Default)]
pub struct MemoryLayoutStore {
	value: RefCell<Option<String>>,
}

impl MemoryLayoutStore {
	/// Store that starts out holding `json`.
	pub fn with_json(json: impl Into<String>) -> Self {
		Self {
			value: RefCell::new(Some(json.into())),
		}
	}
}

impl LayoutStore for MemoryLayoutStore {
	fn load(&self) -> Result<Option<Vec<LayoutEntry>>, LayoutError> {
		match self.value.borrow().as_deref() {
			Some(json) => parse_layout(json),
			None => Ok(None),
		}
	}

	fn save(&self, entries: &[LayoutEntry]) -> Result<(), LayoutError> {
		*self.value.borrow_mut() = Some(serde_json::to_string(entries)?);
		Ok(())
	}
}

/// Keeps the layout in the browser's `localStorage`.
#[derive(Clone, Debug)]
pub struct LocalStorageLayoutStore {
	key: String,
}

impl Default for LocalStorageLayoutStore {
	fn default() -> Self {
		Self {
			key: LAYOUT_KEY.to_string(),
		}
	}
}

impl LocalStorageLayoutStore {
	fn storage() -> Result<web_sys::Storage, LayoutError> {
		web_sys::window()
			.ok_or_else(|| LayoutError::Store("no window".into()))?
			.local_storage()
			.map_err(|e| LayoutError::Store(format!("{e:?}")))?
			.ok_or_else(|| LayoutError::Store("localStorage disabled".into()))
	}
}

impl LayoutStore for LocalStorageLayoutStore {
	fn load(&self) -> Result<Option<Vec<LayoutEntry>>, LayoutError> {
		let stored = Self::storage()?
			.get_item(&self.key)
			.map_err(|e| LayoutError::Store(format!("{e:?}")))?;
		match stored {
			Some(json) => parse_layout(&json),
			None => Ok(None),
		}
	}

	fn save(&self, entries: &[LayoutEntry]) -> Result<(), LayoutError> {
		let json = serde_json::to_string(entries)?;
		Self::storage()?
			.set_item(&self.key, &json)
			.map_err(|e| LayoutError::Store(format!("{e:?}")))
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;
	use crate::components::topology_graph::config::DisplayConfig;
	use crate::components::topology_graph::simulation::SimulationParams;
	use crate::components::topology_graph::types::Zig;

	const IDS: [&str; 4] = ["A", "B", "C", "D"];

	fn setup() -> (Simulation, RenderBinder) {
		let zigs: Vec<Zig> = IDS.iter().map(|id| Zig::new(*id)).collect();
		let mut sim = Simulation::new(SimulationParams::default(), 800.0, 600.0);
		sim.initialize(&zigs, &[], 800.0, 600.0);
		let mut binder = RenderBinder::default();
		binder.join_nodes(&zigs, &DisplayConfig::default());
		(sim, binder)
	}

	fn entry(id: &str, x: f64, y: f64) -> LayoutEntry {
		LayoutEntry { id: id.into(), x, y }
	}

	#[test]
	fn extract_lists_only_pinned_devices() {
		let (mut sim, _) = setup();
		assert!(extract(&sim).is_empty());
		sim.pin("C", 10.0, 20.0);
		assert_eq!(extract(&sim), vec![entry("C", 10.0, 20.0)]);
		sim.unpin("C");
		assert!(extract(&sim).is_empty());
	}

	#[test]
	fn zero_coordinates_still_count_as_pinned() {
		let (mut sim, _) = setup();
		sim.pin("A", 0.0, 0.0);
		assert_eq!(extract(&sim), vec![entry("A", 0.0, 0.0)]);
	}

	#[test]
	fn apply_pins_known_devices_and_shows_locks() {
		let (mut sim, mut binder) = setup();
		let pinned = apply(&mut sim, &mut binder, &[entry("B", 120.0, 140.0), entry("ghost", 1.0, 1.0)]);
		assert_eq!(pinned, 1);
		assert_eq!(sim.node("B").unwrap().pinned_position(), Some((120.0, 140.0)));
		assert!(binder.node("B").unwrap().lock_visible);
		assert!(!binder.node("A").unwrap().lock_visible);
		assert!(sim.is_running());
		assert_eq!(extract(&sim), vec![entry("B", 120.0, 140.0)]);
	}

	#[test]
	fn extract_reports_node_order_regardless_of_apply_order() {
		let (mut sim, mut binder) = setup();
		apply(&mut sim, &mut binder, &[entry("D", 4.0, 4.0), entry("B", 2.0, 2.0)]);
		assert_eq!(extract(&sim), vec![entry("B", 2.0, 2.0), entry("D", 4.0, 4.0)]);
	}

	#[test]
	fn non_finite_layout_is_rejected_without_side_effects() {
		let (mut sim, mut binder) = setup();
		let layout = [entry("A", 10.0, 10.0), entry("B", f64::NAN, 5.0)];
		assert!(matches!(
			try_apply(&mut sim, &mut binder, &layout),
			Err(LayoutError::NonFinite { .. })
		));
		assert_eq!(apply(&mut sim, &mut binder, &layout), 0);
		assert!(extract(&sim).is_empty());
		assert!(binder.nodes().iter().all(|n| !n.lock_visible));
	}

	#[test]
	fn stored_layout_parses_null_and_rejects_garbage() {
		assert_eq!(parse_layout("null").unwrap(), None);
		assert_eq!(
			parse_layout(r#"[{"id":"A","x":1.5,"y":2}]"#).unwrap(),
			Some(vec![entry("A", 1.5, 2.0)])
		);
		assert!(matches!(parse_layout("{oops"), Err(LayoutError::Parse(_))));
	}

	#[test]
	fn memory_store_round_trips_entries() {
		let store = MemoryLayoutStore::default();
		assert_eq!(store.load().unwrap(), None);
		store.save(&[entry("A", 3.0, 4.0)]).unwrap();
		assert_eq!(store.load().unwrap(), Some(vec![entry("A", 3.0, 4.0)]));
		assert!(MemoryLayoutStore::with_json("[1,").load().is_err());
	}

	proptest! {
		#[test]
		fn apply_then_extract_is_a_fixed_point(
			coords in proptest::collection::vec((-1e4f64..1e4, -1e4f64..1e4), 4),
			mask in proptest::collection::vec(any::<bool>(), 4),
			order in Just(vec![0usize, 1, 2, 3]).prop_shuffle(),
		) {
			let (mut sim, mut binder) = setup();
			let layout: Vec<LayoutEntry> = order
				.iter()
				.filter(|&&i| mask[i])
				.map(|&i| entry(IDS[i], coords[i].0, coords[i].1))
				.collect();
			apply(&mut sim, &mut binder, &layout);

			let by_id = |mut entries: Vec<LayoutEntry>| {
				entries.sort_by(|a, b| a.id.cmp(&b.id));
				entries
			};
			let extracted = extract(&sim);
			prop_assert_eq!(by_id(extracted.clone()), by_id(layout));
			apply(&mut sim, &mut binder, &extracted);
			prop_assert_eq!(extract(&sim), extracted);
		}
	}
}
