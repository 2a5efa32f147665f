//! zigzag-graph: Interactive force-directed Zigbee network topology view.
//!
//! This crate provides a WASM-based component that renders the devices and
//! neighbor links of a Zigbee mesh with physics-based layout, pinnable
//! devices, link-quality coloring, and hover highlighting.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::topology_graph::{
	DisplayConfig, Relation, TopologyCanvas, TopologyData, UnrecognizedRelationPolicy, Zag, Zig,
	ZigRole, ZigzagGraph,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("zigzag: logging initialized");
}

/// Text of the `<script>` element with the given id.
fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load topology from a script element with id="topology-data".
///
/// Accepts either a raw coordinator snapshot (`{ devices, map: { devices } }`)
/// or decoded `{ nodes, links }`. A missing or malformed document yields an
/// empty topology.
pub fn load_topology() -> TopologyData {
	let Some(json_text) = script_text("topology-data") else {
		warn!("zigzag: no topology-data element found");
		return TopologyData::default();
	};

	match components::topology_graph::source::parse_topology(
		&json_text,
		UnrecognizedRelationPolicy::default(),
	) {
		Ok(data) => {
			info!(
				"zigzag: loaded {} devices, {} links",
				data.nodes.len(),
				data.links.len()
			);
			data
		}
		Err(e) => {
			warn!("zigzag: failed to parse topology data: {}", e);
			TopologyData::default()
		}
	}
}

/// Load the card configuration from a script element with
/// id="topology-config", falling back to defaults.
pub fn load_config() -> DisplayConfig {
	let Some(json_text) = script_text("topology-config") else {
		return DisplayConfig::default();
	};
	DisplayConfig::from_json(&json_text).unwrap_or_else(|e| {
		warn!("zigzag: invalid card config, using defaults: {}", e);
		DisplayConfig::default()
	})
}

/// Main application component.
/// Loads topology and card configuration from the DOM and renders the view.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let topology = load_topology();
	let config = load_config();
	let topology_signal = Signal::derive(move || topology.clone());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Zigbee Network Topology" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<TopologyCanvas data=topology_signal config=config />
			<div class="graph-overlay">
				<h1>"Zigbee Network"</h1>
				<p class="subtitle">"Drag devices to pin them. Double-click to release. Hover to see neighbors."</p>
			</div>
		</div>
	}
}
