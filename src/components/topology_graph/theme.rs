//! Canvas colors for the topology view.
//!
//! The host picks a theme by name; device and link colors come from
//! [`DisplayConfig`](super::config::DisplayConfig) instead.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity in `0.0..=1.0`.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color at opacity `a`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// `#rrggbb` when opaque, `rgba(..)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Complete visual theme.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
	/// Name the host selects the theme by.
	pub name: &'static str,
	/// Canvas fill behind everything else.
	pub background: Color,
	/// Circle drawn behind each device icon.
	pub node_fill: Color,
	/// Outline of the device circle.
	pub node_stroke: Color,
	/// Device names.
	pub label: Color,
	/// Relationship labels along edges.
	pub edge_label: Color,
	/// Padlock on pinned devices.
	pub lock: Color,
	/// Opacity of elements outside the hovered neighborhood.
	pub dim_alpha: f64,
	/// CSS font for device names and role glyphs.
	pub label_font: &'static str,
	/// CSS font for relationship labels.
	pub edge_label_font: &'static str,
	/// Edge stroke width in pixels.
	pub edge_width: f64,
}

impl Theme {
	/// Dark card background (default)
	pub fn default_theme() -> Self {
		Self {
			name: "default",
			background: Color::rgb(28, 28, 28),
			node_fill: Color::rgb(44, 44, 44),
			node_stroke: Color::rgba(255, 255, 255, 0.25),
			label: Color::rgb(225, 225, 225),
			edge_label: Color::rgba(225, 225, 225, 0.8),
			lock: Color::rgb(255, 193, 7),
			dim_alpha: 0.2,
			label_font: "12px sans-serif",
			edge_label_font: "10px sans-serif",
			edge_width: 2.0,
		}
	}

	/// Light card background
	pub fn light() -> Self {
		Self {
			name: "light",
			background: Color::rgb(250, 250, 250),
			node_fill: Color::rgb(255, 255, 255),
			node_stroke: Color::rgba(0, 0, 0, 0.2),
			label: Color::rgb(33, 33, 33),
			edge_label: Color::rgba(33, 33, 33, 0.8),
			lock: Color::rgb(230, 81, 0),
			..Self::default_theme()
		}
	}

	/// Theme for a host-supplied name; unknown names fall back to the default.
	pub fn by_name(name: Option<&str>) -> Self {
		match name {
			Some("light") => Self::light(),
			_ => Self::default_theme(),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}
