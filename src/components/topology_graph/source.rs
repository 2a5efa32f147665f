//! Mapping of raw coordinator snapshots into topology records.
//!
//! The coordinator reports two documents: a device list and a neighbor map
//! (one neighbor table per device). Both arrive as loosely typed JSON; every
//! field is validated or defaulted here so the rest of the graph only ever
//! sees [`Zig`] and [`Zag`] values.

use std::collections::HashSet;

use log::{debug, warn};
use serde::{Deserialize, Deserializer};

use super::error::SourceError;
use super::types::{Relation, TopologyData, Zag, Zig, ZigRole};

/// How to treat a neighbor entry whose relationship the coordinator could
/// not classify.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum UnrecognizedRelationPolicy {
	/// Skip only the offending entry and keep scanning the neighbor table.
	#[default]
	SkipLink,
	/// Stop scanning the device's remaining neighbors at the first
	/// unrecognized entry. Matches older widget releases.
	StopDeviceScan,
}

/// A number the coordinator may deliver either as JSON number or as text.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum Numeric {
	Number(f64),
	Text(String),
}

impl Numeric {
	fn as_f64(&self) -> Option<f64> {
		match self {
			Numeric::Number(n) => Some(*n),
			Numeric::Text(s) => s.trim().parse().ok(),
		}
	}
}

/// Deserialize `null` as the type's default. The coordinator sends `null`
/// for text fields it has no value for.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn to_u8(value: &Option<Numeric>) -> u8 {
	value
		.as_ref()
		.and_then(Numeric::as_f64)
		.filter(|n| n.is_finite())
		.map(|n| n.clamp(0.0, 255.0) as u8)
		.unwrap_or(0)
}

fn to_i16(value: &Option<Numeric>) -> i16 {
	value
		.as_ref()
		.and_then(Numeric::as_f64)
		.filter(|n| n.is_finite())
		.map(|n| n.clamp(i16::MIN as f64, i16::MAX as f64) as i16)
		.unwrap_or(0)
}

/// One entry of the coordinator's device list.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawDevice {
	/// IEEE address; records without one are rejected.
	#[serde(deserialize_with = "null_as_default")]
	pub ieee: String,
	/// Model-level name; used when the user gave none.
	#[serde(deserialize_with = "null_as_default")]
	pub name: String,
	/// Name the user assigned.
	pub user_given_name: Option<String>,
	/// `Coordinator`, `Router` or `EndDevice`.
	#[serde(deserialize_with = "null_as_default")]
	pub device_type: String,
	/// 16-bit network address.
	pub nwk: Option<String>,
	lqi: Option<Numeric>,
	rssi: Option<Numeric>,
	/// Manufacturer string.
	#[serde(deserialize_with = "null_as_default")]
	pub manufacturer: String,
	/// Model identifier.
	#[serde(deserialize_with = "null_as_default")]
	pub model: String,
	/// Timestamp text of the last message.
	#[serde(deserialize_with = "null_as_default")]
	pub last_seen: String,
	/// `Mains`, `Battery` and so on.
	pub power_source: Option<String>,
	/// Area the user assigned the device to.
	pub area_id: Option<String>,
}

/// One entry of a device's neighbor table.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawNeighbor {
	/// IEEE address of the neighbor.
	#[serde(deserialize_with = "null_as_default")]
	pub ieee: String,
	/// Coordinator spelling, e.g. `Child` or `None_of_the_above`.
	#[serde(deserialize_with = "null_as_default")]
	pub relation: String,
	depth: Option<Numeric>,
	lqi: Option<Numeric>,
	/// PAN id the neighbor reported.
	pub pan_id: Option<String>,
	/// Whether the neighbor accepts joins.
	pub new_joins_accepted: Option<String>,
	/// Whether the neighbor listens while idle.
	pub rx_on_when_idle: Option<String>,
}

/// One device of the neighbor map together with its neighbor table.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawMapDevice {
	/// IEEE address of the device.
	#[serde(deserialize_with = "null_as_default")]
	pub ieee: String,
	lqi: Option<Numeric>,
	/// Spelled the way the coordinator spells it.
	#[serde(deserialize_with = "null_as_default")]
	pub neighbours: Vec<RawNeighbor>,
}

/// The neighbor-map response.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawMap {
	/// One entry per device that reported a table.
	#[serde(deserialize_with = "null_as_default")]
	pub devices: Vec<RawMapDevice>,
}

/// A raw snapshot: device list plus neighbor map.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawSnapshot {
	/// Device list.
	#[serde(deserialize_with = "null_as_default")]
	pub devices: Vec<RawDevice>,
	/// Neighbor map; empty when absent.
	#[serde(default, deserialize_with = "null_as_default")]
	pub map: RawMap,
}

/// Map one device record, rejecting records without an IEEE address.
pub fn map_zig(position: usize, raw: &RawDevice) -> Result<Zig, SourceError> {
	let ieee = raw.ieee.trim();
	if ieee.is_empty() {
		return Err(SourceError::MissingIeee(position));
	}
	Ok(Zig {
		id: ieee.to_string(),
		name: if raw.name.is_empty() {
			ieee.to_string()
		} else {
			raw.name.clone()
		},
		user_given_name: raw.user_given_name.clone(),
		role: ZigRole::from_device_type(&raw.device_type),
		nwk: raw.nwk.clone(),
		lqi: to_u8(&raw.lqi),
		rssi: to_i16(&raw.rssi),
		manufacturer: raw.manufacturer.clone(),
		model: raw.model.clone(),
		last_seen: raw.last_seen.clone(),
		power_source: raw.power_source.clone(),
		area_id: raw.area_id.clone(),
		..Default::default()
	})
}

/// Drop (and log) devices with a blank id and every repeat of an id already
/// seen, keeping the first occurrence. Node ids are unique afterwards.
pub fn unique_zigs(zigs: Vec<Zig>) -> Vec<Zig> {
	let mut seen: HashSet<String> = HashSet::with_capacity(zigs.len());
	zigs.into_iter()
		.filter(|zig| {
			if zig.id.trim().is_empty() {
				warn!("zigzag: device without id ignored");
				false
			} else if !seen.insert(zig.id.clone()) {
				warn!("zigzag: duplicate device {} ignored", zig.id);
				false
			} else {
				true
			}
		})
		.collect()
}

/// Map the device list, dropping (and logging) invalid records and repeated
/// identifiers so that node ids stay unique.
pub fn map_zigs(devices: &[RawDevice]) -> Vec<Zig> {
	let zigs = devices
		.iter()
		.enumerate()
		.filter_map(|(position, raw)| {
			map_zig(position, raw)
				.inspect_err(|e| warn!("zigzag: {}", e))
				.ok()
		})
		.collect();
	unique_zigs(zigs)
}

/// Map the neighbor map into directed links.
///
/// Neighbors that are not in `zigs` produce no link. For neighbors that are
/// known, the neighbor-table metadata is copied onto the device record.
pub fn map_zags(map: &RawMap, zigs: &mut [Zig], policy: UnrecognizedRelationPolicy) -> Vec<Zag> {
	let mut zags = Vec::new();
	for device in &map.devices {
		for neighbor in &device.neighbours {
			let relation = Relation::parse(&neighbor.relation);
			if relation.is_unrecognized() {
				debug!(
					"zigzag: unrecognized relation {} -> {}",
					device.ieee, neighbor.ieee
				);
				match policy {
					UnrecognizedRelationPolicy::SkipLink => continue,
					UnrecognizedRelationPolicy::StopDeviceScan => break,
				}
			}
			let Some(zig) = zigs.iter_mut().find(|z| z.id == neighbor.ieee) else {
				continue;
			};
			zags.push(Zag {
				from: device.ieee.clone(),
				to: neighbor.ieee.clone(),
				relation,
				depth: to_u8(&neighbor.depth),
				lqi_from: to_u8(&device.lqi),
				lqi_to: to_u8(&neighbor.lqi),
			});
			zig.pan_id = neighbor.pan_id.clone();
			zig.new_joins_accepted = neighbor.new_joins_accepted.clone();
			zig.rx_on_when_idle = neighbor.rx_on_when_idle.clone();
		}
	}
	zags
}

impl RawSnapshot {
	/// Map devices and neighbor tables into validated topology records.
	pub fn into_topology(self, policy: UnrecognizedRelationPolicy) -> TopologyData {
		let mut nodes = map_zigs(&self.devices);
		let links = map_zags(&self.map, &mut nodes, policy);
		TopologyData { nodes, links }
	}
}

/// Parse a topology document: either a raw snapshot (`devices` + `map`) or
/// already-decoded `nodes` / `links`.
///
/// A document with a top-level `devices` key is a raw snapshot and its
/// errors are reported as such. Decoded nodes go through [`unique_zigs`].
pub fn parse_topology(
	json: &str,
	policy: UnrecognizedRelationPolicy,
) -> Result<TopologyData, SourceError> {
	let value: serde_json::Value = serde_json::from_str(json)?;
	if value.get("devices").is_some() {
		let raw = RawSnapshot::deserialize(value)?;
		return Ok(raw.into_topology(policy));
	}
	let data = TopologyData::deserialize(value)?;
	Ok(TopologyData {
		nodes: unique_zigs(data.nodes),
		links: data.links,
	})
}
