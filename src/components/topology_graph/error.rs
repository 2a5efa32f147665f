//! Error types for the boundaries where external data enters the graph.

use thiserror::Error;

/// Invalid display configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Not valid JSON, or a field has the wrong type.
	#[error("config parse error: {0}")]
	Parse(#[from] serde_json::Error),

	/// Thresholds out of order.
	#[error("LQI thresholds must be strictly ascending, got {lower} / {middle} / {upper}")]
	ThresholdOrder {
		/// `thresholdLowerLQI`.
		lower: u8,
		/// `thresholdMiddleLQI`.
		middle: u8,
		/// `thresholdUpperLQI`.
		upper: u8,
	},

	/// A color or icon name is blank; holds the config key.
	#[error("config value `{0}` must not be empty")]
	Empty(&'static str),
}

/// Stored layout data that cannot be restored.
#[derive(Debug, Error)]
pub enum LayoutError {
	/// Stored text is not a layout.
	#[error("layout parse error: {0}")]
	Parse(#[from] serde_json::Error),

	/// An entry has a NaN or infinite coordinate.
	#[error("layout entry `{id}` has a non-finite coordinate ({x}, {y})")]
	NonFinite {
		/// Device id of the entry.
		id: String,
		/// Stored x.
		x: f64,
		/// Stored y.
		y: f64,
	},

	/// The backing store could not be reached.
	#[error("layout store unavailable: {0}")]
	Store(String),
}

/// Raw topology snapshot that cannot be mapped into devices and links.
#[derive(Debug, Error)]
pub enum SourceError {
	/// Not valid JSON, or not shaped like a snapshot or decoded topology.
	#[error("topology parse error: {0}")]
	Parse(#[from] serde_json::Error),

	/// A device record without an IEEE address; holds its list position.
	#[error("device at position {0} has no IEEE address")]
	MissingIeee(usize),
}
