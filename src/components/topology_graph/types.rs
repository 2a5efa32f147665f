//! Topology records consumed by the graph: devices (zigs) and the directed
//! neighbor relationships observed between them (zags).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role a device plays in the Zigbee mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZigRole {
	/// Forms the network; exactly one per mesh.
	Coordinator,
	/// Mains-powered device that relays traffic.
	Router,
	/// Leaf device, usually battery powered.
	EndDevice,
	/// Device type missing or not one of the above.
	#[default]
	#[serde(other)]
	Unknown,
}

impl ZigRole {
	/// Parse a coordinator-reported device type, falling back to `Unknown`.
	pub fn from_device_type(device_type: &str) -> Self {
		match device_type {
			"Coordinator" => ZigRole::Coordinator,
			"Router" => ZigRole::Router,
			"EndDevice" => ZigRole::EndDevice,
			_ => ZigRole::Unknown,
		}
	}
}

/// One physical device in the topology.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Zig {
	/// Unique identifier, stable across refreshes (the IEEE address).
	pub id: String,
	/// Name reported by the device; the id when none was reported.
	pub name: String,
	/// Name assigned by the user; preferred over `name` for display.
	pub user_given_name: Option<String>,
	/// Role in the mesh.
	pub role: ZigRole,
	/// 16-bit network address, as reported.
	pub nwk: Option<String>,
	/// Link quality indicator, 0-255.
	pub lqi: u8,
	/// Received signal strength in dBm.
	pub rssi: i16,
	/// Manufacturer string.
	pub manufacturer: String,
	/// Model identifier.
	pub model: String,
	/// Timestamp text of the last message seen from the device.
	pub last_seen: String,
	/// `Mains`, `Battery` and so on.
	pub power_source: Option<String>,
	/// Area the user assigned the device to.
	pub area_id: Option<String>,
	/// Copied from the last neighbor-table entry that names this device.
	pub pan_id: Option<String>,
	/// Copied from the last neighbor-table entry that names this device.
	pub rx_on_when_idle: Option<String>,
	/// Copied from the last neighbor-table entry that names this device.
	pub new_joins_accepted: Option<String>,
}

impl Zig {
	/// Minimal device with only an identifier; used by tests and callers
	/// that supply already-decoded records.
	pub fn new(id: impl Into<String>) -> Self {
		let id = id.into();
		Self {
			name: id.clone(),
			id,
			..Default::default()
		}
	}

	/// Builder: set the role.
	pub fn with_role(mut self, role: ZigRole) -> Self {
		self.role = role;
		self
	}

	/// Label shown under the device icon.
	pub fn display_name(&self) -> &str {
		match self.user_given_name.as_deref() {
			Some(name) if !name.is_empty() => name,
			_ => &self.name,
		}
	}
}

/// Classification of a neighbor relationship.
///
/// Serialized as the coordinator's relationship text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Relation {
	/// The neighbor is the parent of the reporting device.
	Parent,
	/// The neighbor is a child of the reporting device.
	Child,
	/// Both devices share a parent.
	Sibling,
	/// The neighbor was a child and has since left.
	PreviousChild,
	/// The coordinator could not classify the relationship.
	Unrecognized,
	/// Any other classification text, kept verbatim for labeling.
	Other(String),
}

impl Relation {
	/// Classify relationship text. Blank text counts as unrecognized.
	pub fn parse(text: &str) -> Self {
		match text.trim() {
			"" => Relation::Unrecognized,
			"Parent" | "parent" => Relation::Parent,
			"Child" | "child" => Relation::Child,
			"Sibling" | "sibling" => Relation::Sibling,
			"Previous_Child" | "previous_child" => Relation::PreviousChild,
			"None_of_the_above" | "none_of_the_above" => Relation::Unrecognized,
			other => Relation::Other(other.to_string()),
		}
	}

	/// True for relationships the coordinator could not classify.
	pub fn is_unrecognized(&self) -> bool {
		matches!(self, Relation::Unrecognized)
	}
}

impl From<String> for Relation {
	fn from(text: String) -> Self {
		Relation::parse(&text)
	}
}

impl From<Relation> for String {
	fn from(relation: Relation) -> Self {
		relation.to_string()
	}
}

impl fmt::Display for Relation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Relation::Parent => f.write_str("Parent"),
			Relation::Child => f.write_str("Child"),
			Relation::Sibling => f.write_str("Sibling"),
			Relation::PreviousChild => f.write_str("Previous_Child"),
			Relation::Unrecognized => f.write_str("None_of_the_above"),
			Relation::Other(text) => f.write_str(text),
		}
	}
}

/// One observed, directional neighbor relationship.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Zag {
	/// Id of the device whose neighbor table reported the link.
	pub from: String,
	/// Id of the neighbor.
	pub to: String,
	/// How `to` relates to `from`.
	pub relation: Relation,
	/// Hierarchical depth reported by the neighbor table.
	#[serde(default)]
	pub depth: u8,
	/// Link quality as seen at the `from` end.
	#[serde(default)]
	pub lqi_from: u8,
	/// Link quality as seen at the `to` end; drives the edge color.
	#[serde(default)]
	pub lqi_to: u8,
}

impl Zag {
	/// Link with zero depth and link quality.
	pub fn new(from: impl Into<String>, to: impl Into<String>, relation: Relation) -> Self {
		Self {
			from: from.into(),
			to: to.into(),
			relation,
			depth: 0,
			lqi_from: 0,
			lqi_to: 0,
		}
	}

	/// Builder: set the link quality at both ends.
	pub fn with_lqi(mut self, lqi_from: u8, lqi_to: u8) -> Self {
		self.lqi_from = lqi_from;
		self.lqi_to = lqi_to;
		self
	}

	/// True when `other` runs between the same pair in the opposite direction.
	pub fn is_reverse_of(&self, other: &Zag) -> bool {
		self.from == other.to && self.to == other.from
	}
}

/// A complete topology snapshot: devices and links. Replaced wholesale on
/// every refresh.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyData {
	/// Devices, unique by id.
	#[serde(default)]
	pub nodes: Vec<Zig>,
	/// Directed links in discovery order.
	#[serde(default)]
	pub links: Vec<Zag>,
}
