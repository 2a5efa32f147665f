//! Folds directed links into visual edges.
//!
//! Two links running in opposite directions between the same pair of devices
//! become one bidirectional edge; a lone link stays a unidirectional edge.

use std::collections::HashMap;

use log::{debug, warn};

use super::types::{Zag, Zig};

/// Most constituent links a visual edge can hold.
pub const MAX_LINKS_PER_EDGE: usize = 2;

/// The rendered representation of one or two links between the same pair.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualEdge {
	/// Index of the source device in the node list the edge was built from.
	pub source: usize,
	/// Index of the target device.
	pub target: usize,
	/// Constituent links in discovery order.
	pub zags: Vec<Zag>,
}

impl VisualEdge {
	/// True when the edge holds a link in each direction.
	pub fn is_bidirectional(&self) -> bool {
		self.zags.len() == MAX_LINKS_PER_EDGE
	}

	/// The endpoint across from `node`, if `node` is an endpoint.
	pub fn other_end(&self, node: usize) -> Option<usize> {
		if self.source == node {
			Some(self.target)
		} else if self.target == node {
			Some(self.source)
		} else {
			None
		}
	}
}

fn pair_key(a: usize, b: usize) -> (usize, usize) {
	if a <= b { (a, b) } else { (b, a) }
}

/// Build visual edges from `zags` in input order.
///
/// A link whose endpoints are not both in `zigs`, whose relationship is
/// unrecognized, or that runs from a device to itself is skipped. A link whose reverse is already held by a
/// unidirectional edge joins that edge. Any further link between an
/// already-connected pair (a same-direction repeat, or a third link) is
/// rejected so that each unordered pair appears at most once with at most
/// [`MAX_LINKS_PER_EDGE`] links.
pub fn aggregate(zags: &[Zag], zigs: &[Zig]) -> Vec<VisualEdge> {
	let index: HashMap<&str, usize> = zigs
		.iter()
		.enumerate()
		.map(|(i, zig)| (zig.id.as_str(), i))
		.collect();
	let mut edges: Vec<VisualEdge> = Vec::new();
	let mut by_pair: HashMap<(usize, usize), usize> = HashMap::new();

	for zag in zags {
		if zag.relation.is_unrecognized() {
			debug!("zigzag: unrecognized link {} -> {} skipped", zag.from, zag.to);
			continue;
		}
		let (Some(&source), Some(&target)) =
			(index.get(zag.from.as_str()), index.get(zag.to.as_str()))
		else {
			debug!("zigzag: dangling link {} -> {} skipped", zag.from, zag.to);
			continue;
		};
		if source == target {
			debug!("zigzag: self-link on {} skipped", zag.from);
			continue;
		}

		match by_pair.get(&pair_key(source, target)) {
			Some(&existing) => {
				let edge = &mut edges[existing];
				if edge.zags.len() < MAX_LINKS_PER_EDGE && edge.zags[0].is_reverse_of(zag) {
					edge.zags.push(zag.clone());
				} else {
					warn!(
						"zigzag: extra link {} -> {} ({}) rejected",
						zag.from, zag.to, zag.relation
					);
				}
			}
			None => {
				by_pair.insert(pair_key(source, target), edges.len());
				edges.push(VisualEdge {
					source,
					target,
					zags: vec![zag.clone()],
				});
			}
		}
	}
	edges
}
