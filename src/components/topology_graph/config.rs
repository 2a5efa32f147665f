//! Display configuration: per-role icons and colors, and the LQI bands used
//! to color links.
//!
//! The configuration is owned by the caller and passed explicitly to every
//! computation that needs it.

use serde::Deserialize;

use super::error::ConfigError;
use super::types::ZigRole;

/// Icon names and colors per device role.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZigDisplayConfig {
	/// Icon names, e.g. `mdi:zigbee`, one per role.
	pub icon_name_coordinator: String,
	/// Icon name for routers.
	pub icon_name_router: String,
	/// Icon name for end devices.
	pub icon_name_end_device: String,
	/// Icon name for devices of unknown role.
	pub icon_name_unknown: String,
	/// Any CSS color, one per role.
	pub icon_color_coordinator: String,
	/// Icon color for routers.
	pub icon_color_router: String,
	/// Icon color for end devices.
	pub icon_color_end_device: String,
	/// Icon color for devices of unknown role.
	pub icon_color_unknown: String,
}

impl Default for ZigDisplayConfig {
	fn default() -> Self {
		Self {
			icon_name_coordinator: "mdi:zigbee".into(),
			icon_name_router: "mdi:router".into(),
			icon_name_end_device: "mdi:radio-tower".into(),
			icon_name_unknown: "mdi:crosshairs-question".into(),
			icon_color_coordinator: "#03a9f4".into(),
			icon_color_router: "#ff9800".into(),
			icon_color_end_device: "#4caf50".into(),
			icon_color_unknown: "#9e9e9e".into(),
		}
	}
}

impl ZigDisplayConfig {
	/// Icon name for `role`.
	pub fn icon_for(&self, role: ZigRole) -> &str {
		match role {
			ZigRole::Coordinator => &self.icon_name_coordinator,
			ZigRole::Router => &self.icon_name_router,
			ZigRole::EndDevice => &self.icon_name_end_device,
			ZigRole::Unknown => &self.icon_name_unknown,
		}
	}

	/// Icon color for `role`.
	pub fn color_for(&self, role: ZigRole) -> &str {
		match role {
			ZigRole::Coordinator => &self.icon_color_coordinator,
			ZigRole::Router => &self.icon_color_router,
			ZigRole::EndDevice => &self.icon_color_end_device,
			ZigRole::Unknown => &self.icon_color_unknown,
		}
	}
}

/// Link-quality band a link falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LqiBand {
	/// Below the lower threshold.
	Poor,
	/// From the lower threshold up to the middle one.
	Moderate,
	/// From the middle threshold up to the upper one.
	Good,
	/// At or above the upper threshold.
	Excellent,
}

/// Three LQI thresholds splitting link quality into four color bands.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZagDisplayConfig {
	/// Band thresholds; must be strictly increasing.
	#[serde(rename = "thresholdLowerLQI")]
	pub threshold_lower: u8,
	/// Lower bound of the good band.
	#[serde(rename = "thresholdMiddleLQI")]
	pub threshold_middle: u8,
	/// Lower bound of the excellent band.
	#[serde(rename = "thresholdUpperLQI")]
	pub threshold_upper: u8,
	/// Any CSS color, one per band.
	#[serde(rename = "colorLQIPoor")]
	pub color_poor: String,
	/// Stroke for moderate links.
	#[serde(rename = "colorLQIModerate")]
	pub color_moderate: String,
	/// Stroke for good links.
	#[serde(rename = "colorLQIGood")]
	pub color_good: String,
	/// Stroke for excellent links.
	#[serde(rename = "colorLQIExcellent")]
	pub color_excellent: String,
}

impl Default for ZagDisplayConfig {
	fn default() -> Self {
		Self {
			threshold_lower: 120,
			threshold_middle: 180,
			threshold_upper: 220,
			color_poor: "crimson".into(),
			color_moderate: "darkorange".into(),
			color_good: "lightgreen".into(),
			color_excellent: "forestgreen".into(),
		}
	}
}

impl ZagDisplayConfig {
	/// A value equal to a threshold belongs to the band above it.
	pub fn band(&self, lqi: u8) -> LqiBand {
		if lqi < self.threshold_lower {
			LqiBand::Poor
		} else if lqi < self.threshold_middle {
			LqiBand::Moderate
		} else if lqi < self.threshold_upper {
			LqiBand::Good
		} else {
			LqiBand::Excellent
		}
	}

	/// Stroke color for a link of quality `lqi`.
	pub fn color_for(&self, lqi: u8) -> &str {
		match self.band(lqi) {
			LqiBand::Poor => &self.color_poor,
			LqiBand::Moderate => &self.color_moderate,
			LqiBand::Good => &self.color_good,
			LqiBand::Excellent => &self.color_excellent,
		}
	}
}

/// Complete display configuration as supplied by the host card config.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
	/// Device icons and colors.
	#[serde(flatten)]
	pub zig: ZigDisplayConfig,
	/// Link-quality bands.
	#[serde(flatten)]
	pub zag: ZagDisplayConfig,
	/// Host theme name; see [`super::theme::Theme::by_name`].
	pub theme: Option<String>,
}

impl DisplayConfig {
	/// Parse and validate a card configuration object.
	pub fn from_json(json: &str) -> Result<Self, ConfigError> {
		let config: DisplayConfig = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}

	/// Check threshold order and that no color or icon name is blank.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let zag = &self.zag;
		if !(zag.threshold_lower < zag.threshold_middle && zag.threshold_middle < zag.threshold_upper)
		{
			return Err(ConfigError::ThresholdOrder {
				lower: zag.threshold_lower,
				middle: zag.threshold_middle,
				upper: zag.threshold_upper,
			});
		}
		let required = [
			("colorLQIPoor", &zag.color_poor),
			("colorLQIModerate", &zag.color_moderate),
			("colorLQIGood", &zag.color_good),
			("colorLQIExcellent", &zag.color_excellent),
			("iconNameCoordinator", &self.zig.icon_name_coordinator),
			("iconNameRouter", &self.zig.icon_name_router),
			("iconNameEndDevice", &self.zig.icon_name_end_device),
			("iconNameUnknown", &self.zig.icon_name_unknown),
			("iconColorCoordinator", &self.zig.icon_color_coordinator),
			("iconColorRouter", &self.zig.icon_color_router),
			("iconColorEndDevice", &self.zig.icon_color_end_device),
			("iconColorUnknown", &self.zig.icon_color_unknown),
		];
		for (key, value) in required {
			if value.trim().is_empty() {
				return Err(ConfigError::Empty(key));
			}
		}
		Ok(())
	}
}
