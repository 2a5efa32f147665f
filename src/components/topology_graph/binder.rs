//! Retained visual elements for devices and edges, kept in step with the
//! topology by a keyed join.
//!
//! Device elements are keyed by device id and survive refreshes; edge
//! elements are keyed by position since edges are rebuilt wholesale on every
//! refresh. The join only creates, rebinds and removes elements; positions
//! are written separately on every simulation tick.

use std::collections::HashMap;

use super::aggregate::VisualEdge;
use super::config::DisplayConfig;
use super::curve::{self, EdgePath, Point};
use super::simulation::SimNode;
use super::types::{Zig, ZigRole};

/// Where along a unidirectional edge its label sits.
pub const UNI_LABEL_OFFSET: f64 = 0.8;
/// Where along a lens the labels of its two links sit.
pub const BI_LABEL_OFFSETS: [f64; 2] = [0.4, 0.9];

/// Counts of what a join did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JoinReport {
	/// Elements created for new keys.
	pub entered: usize,
	/// Elements kept and rebound.
	pub updated: usize,
	/// Elements removed.
	pub exited: usize,
}

/// The visual element of one device: a circular background, the role icon,
/// the name label and a lock indicator shown while pinned.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeElement {
	/// Creation serial; unchanged for as long as the element lives.
	pub serial: u64,
	/// Device id the element is keyed by.
	pub id: String,
	/// Display name drawn under the icon.
	pub label: String,
	/// Role, for the glyph drawn inside the icon.
	pub role: ZigRole,
	/// Configured icon name for the role.
	pub icon: String,
	/// Configured CSS color for the role.
	pub icon_color: String,
	/// Padlock shown; mirrors the device's pinned state.
	pub lock_visible: bool,
	/// Part of the hovered neighborhood.
	pub highlighted: bool,
	/// Icon center in canvas coordinates.
	pub center: Point,
}

impl NodeElement {
	/// Top-left corner of the icon box.
	pub fn origin(&self, icon_size: f64) -> Point {
		Point::new(self.center.x - icon_size / 2.0, self.center.y - icon_size / 2.0)
	}
}

/// A relationship label anchored along an edge path.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeLabel {
	/// Relationship text of one constituent link.
	pub text: String,
	/// Fraction of the path length the label is anchored at.
	pub start_offset: f64,
	/// Canvas position of that fraction, updated every tick.
	pub anchor: Point,
}

/// The visual element of one visual edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeElement {
	/// Creation serial; unchanged for as long as the element lives.
	pub serial: u64,
	/// `zagPath-<index>-uni` or `zagPath-<index>-bi`.
	pub path_id: String,
	/// Source node index.
	pub source: usize,
	/// Target node index.
	pub target: usize,
	/// Number of constituent links, 1 or 2.
	pub link_count: usize,
	/// CSS color of the link-quality band.
	pub stroke: String,
	/// One label per constituent link.
	pub labels: Vec<EdgeLabel>,
	/// Route between the endpoint centers.
	pub path: EdgePath,
	/// Part of the hovered neighborhood.
	pub highlighted: bool,
}

impl EdgeElement {
	fn bind(&mut self, index: usize, edge: &VisualEdge, config: &DisplayConfig) {
		let kind = if edge.is_bidirectional() { "bi" } else { "uni" };
		self.path_id = format!("zagPath-{index}-{kind}");
		self.source = edge.source;
		self.target = edge.target;
		self.link_count = edge.zags.len();
		self.stroke = edge
			.zags
			.first()
			.map(|z| config.zag.color_for(z.lqi_to).to_string())
			.unwrap_or_else(|| config.zag.color_poor.clone());
		let offsets: &[f64] = if edge.is_bidirectional() {
			&BI_LABEL_OFFSETS
		} else {
			&[UNI_LABEL_OFFSET]
		};
		self.labels = edge
			.zags
			.iter()
			.zip(offsets)
			.map(|(zag, &start_offset)| EdgeLabel {
				text: zag.relation.to_string(),
				start_offset,
				anchor: Point::default(),
			})
			.collect();
	}
}

/// The retained scene.
#[derive(Clone, Debug, Default)]
pub struct RenderBinder {
	nodes: Vec<NodeElement>,
	edges: Vec<EdgeElement>,
	dimmed: bool,
	next_serial: u64,
}

impl RenderBinder {
	/// Device elements, in simulation node order.
	pub fn nodes(&self) -> &[NodeElement] {
		&self.nodes
	}

	/// Edge elements, in visual edge order.
	pub fn edges(&self) -> &[EdgeElement] {
		&self.edges
	}

	/// Device element for `id`.
	pub fn node(&self, id: &str) -> Option<&NodeElement> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// True while a hover highlight is active; everything not highlighted is
	/// drawn dimmed.
	pub fn is_dimmed(&self) -> bool {
		self.dimmed
	}

	fn serial(&mut self) -> u64 {
		self.next_serial += 1;
		self.next_serial
	}

	/// Join device elements to `zigs`, keyed by id. Element order follows
	/// `zigs` so element `i` always renders simulation node `i`.
	pub fn join_nodes(&mut self, zigs: &[Zig], config: &DisplayConfig) -> JoinReport {
		let mut report = JoinReport::default();
		let mut existing: HashMap<String, NodeElement> = self
			.nodes
			.drain(..)
			.map(|element| (element.id.clone(), element))
			.collect();

		let mut joined = Vec::with_capacity(zigs.len());
		for zig in zigs {
			let element = match existing.remove(&zig.id) {
				Some(mut element) => {
					report.updated += 1;
					element.label = zig.display_name().to_string();
					element.role = zig.role;
					element.icon = config.zig.icon_for(zig.role).to_string();
					element.icon_color = config.zig.color_for(zig.role).to_string();
					element
				}
				None => {
					report.entered += 1;
					NodeElement {
						serial: self.serial(),
						id: zig.id.clone(),
						label: zig.display_name().to_string(),
						role: zig.role,
						icon: config.zig.icon_for(zig.role).to_string(),
						icon_color: config.zig.color_for(zig.role).to_string(),
						lock_visible: false,
						highlighted: false,
						center: Point::default(),
					}
				}
			};
			joined.push(element);
		}
		report.exited = existing.len();
		self.nodes = joined;
		report
	}

	/// Join edge elements to `edges`, keyed by position.
	pub fn join_edges(&mut self, edges: &[VisualEdge], config: &DisplayConfig) -> JoinReport {
		let mut report = JoinReport {
			exited: self.edges.len().saturating_sub(edges.len()),
			..Default::default()
		};
		self.edges.truncate(edges.len());

		for (index, edge) in edges.iter().enumerate() {
			if let Some(element) = self.edges.get_mut(index) {
				element.bind(index, edge, config);
				report.updated += 1;
			} else {
				let mut element = EdgeElement {
					serial: self.serial(),
					path_id: String::new(),
					source: edge.source,
					target: edge.target,
					link_count: 0,
					stroke: String::new(),
					labels: Vec::new(),
					path: EdgePath::Straight {
						from: Point::default(),
						to: Point::default(),
					},
					highlighted: false,
				};
				element.bind(index, edge, config);
				self.edges.push(element);
				report.entered += 1;
			}
		}
		report
	}

	/// Write node coordinates and reroute every edge. Called on every tick.
	pub fn update_positions(&mut self, nodes: &[SimNode]) {
		for (element, node) in self.nodes.iter_mut().zip(nodes) {
			element.center = Point::new(node.x, node.y);
		}
		let centers: Vec<Point> = self.nodes.iter().map(|n| n.center).collect();
		for edge in &mut self.edges {
			let (Some(&from), Some(&to)) = (centers.get(edge.source), centers.get(edge.target))
			else {
				continue;
			};
			edge.path = curve::route(from, to, edge.link_count);
			for label in &mut edge.labels {
				label.anchor = edge.path.point_at(label.start_offset);
			}
		}
	}

	/// Show or hide the padlock of node `index`.
	pub fn set_lock_visible(&mut self, index: usize, visible: bool) {
		if let Some(element) = self.nodes.get_mut(index) {
			element.lock_visible = visible;
		}
	}

	/// Highlight a device, every edge touching it and the devices at the
	/// other end of those edges; dim everything else.
	pub fn highlight_neighborhood(&mut self, index: usize) {
		let Some(element) = self.nodes.get_mut(index) else {
			return;
		};
		element.highlighted = true;
		let mut neighbors = Vec::new();
		for edge in &mut self.edges {
			if let Some(other) = edge.other_end(index) {
				edge.highlighted = true;
				neighbors.push(other);
			}
		}
		for other in neighbors {
			if let Some(element) = self.nodes.get_mut(other) {
				element.highlighted = true;
			}
		}
		self.dimmed = true;
	}

	/// Clear every highlight and dim mark.
	pub fn clear_highlight(&mut self) {
		for element in &mut self.nodes {
			element.highlighted = false;
		}
		for edge in &mut self.edges {
			edge.highlighted = false;
		}
		self.dimmed = false;
	}

	/// SVG path data of every edge, in edge order.
	pub fn edge_paths(&self) -> Vec<String> {
		self.edges.iter().map(|e| e.path.to_svg()).collect()
	}
}

impl EdgeElement {
	/// The endpoint across from `node`, if `node` is an endpoint.
	fn other_end(&self, node: usize) -> Option<usize> {
		if self.source == node {
			Some(self.target)
		} else if self.target == node {
			Some(self.source)
		} else {
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::topology_graph::aggregate::aggregate;
	use crate::components::topology_graph::types::{Relation, Zag};

	fn zigs(ids: &[&str]) -> Vec<Zig> {
		ids.iter().map(|id| Zig::new(*id)).collect()
	}

	fn sim_nodes(points: &[(&str, f64, f64)]) -> Vec<SimNode> {
		points
			.iter()
			.map(|&(id, x, y)| SimNode {
				id: id.into(),
				x,
				y,
				vx: 0.0,
				vy: 0.0,
				fx: None,
				fy: None,
			})
			.collect()
	}

	#[test]
	fn node_join_creates_keeps_and_removes_by_id() {
		let config = DisplayConfig::default();
		let mut binder = RenderBinder::default();
		let report = binder.join_nodes(&zigs(&["A", "B"]), &config);
		assert_eq!(report, JoinReport { entered: 2, updated: 0, exited: 0 });
		binder.set_lock_visible(1, true);
		let serial_b = binder.node("B").unwrap().serial;

		let report = binder.join_nodes(&zigs(&["C", "B"]), &config);
		assert_eq!(report, JoinReport { entered: 1, updated: 1, exited: 1 });
		let b = binder.node("B").unwrap();
		assert_eq!(b.serial, serial_b);
		assert!(b.lock_visible);
		assert!(binder.node("A").is_none());
		assert_eq!(binder.nodes()[0].id, "C");
		assert!(!binder.nodes()[0].lock_visible);
	}

	#[test]
	fn node_elements_carry_role_icon_and_label() {
		let config = DisplayConfig::default();
		let mut binder = RenderBinder::default();
		let mut zig = Zig::new("00:0d").with_role(ZigRole::Coordinator);
		zig.user_given_name = Some("Stick".into());
		binder.join_nodes(&[zig], &config);
		let element = &binder.nodes()[0];
		assert_eq!(element.label, "Stick");
		assert_eq!(element.icon, "mdi:zigbee");
		assert_eq!(element.icon_color, config.zig.icon_color_coordinator);
	}

	#[test]
	fn edge_labels_follow_link_count() {
		let config = DisplayConfig::default();
		let nodes = zigs(&["A", "B", "C"]);
		let edges = aggregate(
			&[
				Zag::new("A", "B", Relation::Parent).with_lqi(0, 230),
				Zag::new("B", "A", Relation::Child),
				Zag::new("B", "C", Relation::Sibling).with_lqi(0, 100),
			],
			&nodes,
		);
		let mut binder = RenderBinder::default();
		binder.join_nodes(&nodes, &config);
		binder.join_edges(&edges, &config);

		let bi = &binder.edges()[0];
		assert_eq!(bi.path_id, "zagPath-0-bi");
		assert_eq!(bi.stroke, "forestgreen");
		let texts: Vec<(&str, f64)> = bi.labels.iter().map(|l| (l.text.as_str(), l.start_offset)).collect();
		assert_eq!(texts, vec![("Parent", 0.4), ("Child", 0.9)]);

		let uni = &binder.edges()[1];
		assert_eq!(uni.path_id, "zagPath-1-uni");
		assert_eq!(uni.stroke, "crimson");
		assert_eq!(uni.labels.len(), 1);
		assert_eq!(uni.labels[0].start_offset, UNI_LABEL_OFFSET);
	}

	#[test]
	fn edge_join_is_positional() {
		let config = DisplayConfig::default();
		let nodes = zigs(&["A", "B", "C"]);
		let mut binder = RenderBinder::default();
		let two = aggregate(
			&[Zag::new("A", "B", Relation::Parent), Zag::new("B", "C", Relation::Parent)],
			&nodes,
		);
		binder.join_edges(&two, &config);
		let first_serial = binder.edges()[0].serial;

		let one = aggregate(&[Zag::new("C", "A", Relation::Child)], &nodes);
		let report = binder.join_edges(&one, &config);
		assert_eq!(report, JoinReport { entered: 0, updated: 1, exited: 1 });
		assert_eq!(binder.edges()[0].serial, first_serial);
		assert_eq!((binder.edges()[0].source, binder.edges()[0].target), (2, 0));
	}

	#[test]
	fn tick_update_moves_nodes_and_reroutes_edges() {
		let config = DisplayConfig::default();
		let nodes = zigs(&["A", "B"]);
		let edges = aggregate(&[Zag::new("A", "B", Relation::Parent)], &nodes);
		let mut binder = RenderBinder::default();
		binder.join_nodes(&nodes, &config);
		binder.join_edges(&edges, &config);

		binder.update_positions(&sim_nodes(&[("A", 100.0, 100.0), ("B", 200.0, 100.0)]));
		assert_eq!(binder.nodes()[0].origin(48.0), Point::new(76.0, 76.0));
		assert_eq!(binder.edge_paths(), vec!["M100,100 L200,100".to_string()]);
		let anchor = binder.edges()[0].labels[0].anchor;
		assert!((anchor.x - 180.0).abs() < 1e-9);
	}

	#[test]
	fn hover_highlights_direct_neighborhood_only() {
		let config = DisplayConfig::default();
		let nodes = zigs(&["A", "B", "C", "D"]);
		let edges = aggregate(
			&[
				Zag::new("A", "B", Relation::Parent),
				Zag::new("C", "A", Relation::Child),
				Zag::new("C", "D", Relation::Sibling),
			],
			&nodes,
		);
		let mut binder = RenderBinder::default();
		binder.join_nodes(&nodes, &config);
		binder.join_edges(&edges, &config);

		binder.highlight_neighborhood(0);
		let lit: Vec<bool> = binder.nodes().iter().map(|n| n.highlighted).collect();
		assert_eq!(lit, vec![true, true, true, false]);
		let lit_edges: Vec<bool> = binder.edges().iter().map(|e| e.highlighted).collect();
		assert_eq!(lit_edges, vec![true, true, false]);
		assert!(binder.is_dimmed());

		binder.clear_highlight();
		assert!(!binder.is_dimmed());
		assert!(binder.nodes().iter().all(|n| !n.highlighted));
		assert!(binder.edges().iter().all(|e| !e.highlighted));
	}
}
