//! Path geometry for visual edges.
//!
//! A unidirectional edge is a straight line. A bidirectional edge is a lens:
//! two quadratic curves bulging to opposite sides of the straight segment,
//! the first running source → target and the second target → source, so
//! each direction gets its own track and label.

use std::fmt::Write;

/// Distance of each lens control point from the segment midpoint.
pub const CONTROL_POINT_OFFSET: f64 = 50.0;

/// Samples per quadratic segment when measuring arc length.
const ARC_SAMPLES: usize = 32;

/// A position in canvas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal, growing right.
	pub x: f64,
	/// Vertical, growing down.
	pub y: f64,
}

impl Point {
	/// Point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Halfway between `self` and `other`.
	pub fn midpoint(self, other: Point) -> Point {
		Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
	}

	/// Euclidean distance.
	pub fn distance(self, other: Point) -> f64 {
		(other.x - self.x).hypot(other.y - self.y)
	}
}

/// Routed geometry of one visual edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EdgePath {
	/// A single link: one line segment.
	Straight {
		/// Source center.
		from: Point,
		/// Target center.
		to: Point,
	},
	/// Two links: a closed pair of quadratic curves.
	Lens {
		/// Source center.
		from: Point,
		/// Target center.
		to: Point,
		/// Control point of the source → target curve.
		forward: Point,
		/// Control point of the target → source curve.
		back: Point,
	},
}

/// Control points of a lens between `from` and `to`, reflections of each
/// other through the segment midpoint.
pub fn lens_control_points(from: Point, to: Point, offset: f64) -> (Point, Point) {
	let mid = from.midpoint(to);
	let theta = (to.y - from.y).atan2(to.x - from.x) - std::f64::consts::FRAC_PI_2;
	let (dx, dy) = (offset * theta.cos(), offset * theta.sin());
	(
		Point::new(mid.x + dx, mid.y + dy),
		Point::new(mid.x - dx, mid.y - dy),
	)
}

/// Route an edge carrying `link_count` links between two endpoints.
pub fn route(from: Point, to: Point, link_count: usize) -> EdgePath {
	if link_count >= 2 {
		let (forward, back) = lens_control_points(from, to, CONTROL_POINT_OFFSET);
		EdgePath::Lens {
			from,
			to,
			forward,
			back,
		}
	} else {
		EdgePath::Straight { from, to }
	}
}

fn quadratic(p0: Point, c: Point, p1: Point, t: f64) -> Point {
	let u = 1.0 - t;
	Point::new(
		u * u * p0.x + 2.0 * u * t * c.x + t * t * p1.x,
		u * u * p0.y + 2.0 * u * t * c.y + t * t * p1.y,
	)
}

impl EdgePath {
	/// SVG path data (`d` attribute).
	pub fn to_svg(&self) -> String {
		let mut d = String::new();
		match *self {
			EdgePath::Straight { from, to } => {
				let _ = write!(d, "M{},{} L{},{}", from.x, from.y, to.x, to.y);
			}
			EdgePath::Lens {
				from,
				to,
				forward,
				back,
			} => {
				let _ = write!(
					d,
					"M{},{} Q{},{} {},{} Q{},{} {},{}",
					from.x, from.y, forward.x, forward.y, to.x, to.y, back.x, back.y, from.x, from.y
				);
			}
		}
		d
	}

	/// Polyline approximation of the path, endpoints included.
	pub fn sample(&self) -> Vec<Point> {
		match *self {
			EdgePath::Straight { from, to } => vec![from, to],
			EdgePath::Lens {
				from,
				to,
				forward,
				back,
			} => {
				let mut points = Vec::with_capacity(2 * ARC_SAMPLES + 1);
				for i in 0..=ARC_SAMPLES {
					points.push(quadratic(from, forward, to, i as f64 / ARC_SAMPLES as f64));
				}
				for i in 1..=ARC_SAMPLES {
					points.push(quadratic(to, back, from, i as f64 / ARC_SAMPLES as f64));
				}
				points
			}
		}
	}

	/// Point at `fraction` of the path's length, for anchoring labels.
	pub fn point_at(&self, fraction: f64) -> Point {
		let points = self.sample();
		let total: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
		if total <= f64::EPSILON {
			return points[0];
		}
		let mut remaining = total * fraction.clamp(0.0, 1.0);
		for w in points.windows(2) {
			let len = w[0].distance(w[1]);
			if remaining <= len && len > 0.0 {
				let t = remaining / len;
				return Point::new(
					w[0].x + (w[1].x - w[0].x) * t,
					w[0].y + (w[1].y - w[0].y) * t,
				);
			}
			remaining -= len;
		}
		points[points.len() - 1]
	}
}
