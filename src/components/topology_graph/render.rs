//! Canvas rendering for the topology view.
//!
//! Paints the retained scene held by [`ZigzagGraph`] in three passes:
//! 1. Background
//! 2. Edges with their relationship labels
//! 3. Devices (background circle, role glyph, name, lock indicator)
//!
//! Elements outside the hovered neighborhood fade towards the theme's dim
//! opacity as the dim level eases in.

use std::f64::consts::PI;

use web_sys::{CanvasRenderingContext2d, Path2d};

use super::binder::{EdgeElement, NodeElement};
use super::state::ZigzagGraph;
use super::theme::{Color, Theme};
use super::types::ZigRole;

/// Opacity of an element given its highlight flag and the eased dim level.
fn element_alpha(highlighted: bool, dim_level: f64, theme: &Theme) -> f64 {
	if highlighted {
		1.0
	} else {
		1.0 - (1.0 - theme.dim_alpha) * dim_level
	}
}

/// CSS color handed to the canvas for a configured stroke or fill.
///
/// Configured colors are any CSS color string, so they reach the canvas as
/// written. Dimming goes through the global alpha, not the color.
fn configured_color<'a>(value: &'a str, fallback: &'a str) -> &'a str {
	let value = value.trim();
	if value.is_empty() { fallback } else { value }
}

/// Color used when a configured color is blank.
const FALLBACK_COLOR: &str = "gray";

fn role_glyph(role: ZigRole) -> &'static str {
	match role {
		ZigRole::Coordinator => "C",
		ZigRole::Router => "R",
		ZigRole::EndDevice => "E",
		ZigRole::Unknown => "?",
	}
}

/// Renders the complete scene to the canvas.
pub fn render(graph: &ZigzagGraph, ctx: &CanvasRenderingContext2d) {
	let theme = graph.theme();
	let (width, height) = graph.simulation().size();
	let icon_size = graph.simulation().params().icon_size;
	let dim_level = graph.dim_level();
	let scene = graph.scene();

	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, width, height);

	for edge in scene.edges() {
		draw_edge(ctx, edge, theme, element_alpha(edge.highlighted, dim_level, theme));
	}
	for node in scene.nodes() {
		draw_node(
			ctx,
			node,
			theme,
			icon_size,
			element_alpha(node.highlighted, dim_level, theme),
		);
	}
	ctx.set_global_alpha(1.0);
}

fn draw_edge(ctx: &CanvasRenderingContext2d, edge: &EdgeElement, theme: &Theme, alpha: f64) {
	let Ok(path) = Path2d::new_with_path_string(&edge.path.to_svg()) else {
		return;
	};
	ctx.set_global_alpha(alpha);
	ctx.set_stroke_style_str(configured_color(&edge.stroke, FALLBACK_COLOR));
	ctx.set_line_width(theme.edge_width);
	ctx.stroke_with_path(&path);

	ctx.set_fill_style_str(&theme.edge_label.to_css());
	ctx.set_font(theme.edge_label_font);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	for label in &edge.labels {
		let _ = ctx.fill_text(&label.text, label.anchor.x, label.anchor.y);
	}
}

fn draw_node(
	ctx: &CanvasRenderingContext2d,
	node: &NodeElement,
	theme: &Theme,
	icon_size: f64,
	alpha: f64,
) {
	let (x, y) = (node.center.x, node.center.y);
	let radius = icon_size / 2.0;
	ctx.set_global_alpha(alpha);

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&theme.node_fill.to_css());
	ctx.fill();
	ctx.set_stroke_style_str(&theme.node_stroke.to_css());
	ctx.set_line_width(1.0);
	ctx.stroke();

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius * 0.6, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(configured_color(&node.icon_color, FALLBACK_COLOR));
	ctx.fill();

	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_fill_style_str(&theme.node_fill.to_css());
	ctx.set_font(theme.label_font);
	let _ = ctx.fill_text(role_glyph(node.role), x, y);

	ctx.set_fill_style_str(&theme.label.to_css());
	ctx.set_text_baseline("top");
	let _ = ctx.fill_text(&node.label, x, y + radius + 4.0);

	if node.lock_visible {
		draw_lock(ctx, x + radius * 0.5, y + radius * 0.5, radius * 0.4, theme.lock);
	}
}

/// Small padlock centered at `(x, y)`, drawn in the icon's lower-right
/// quadrant.
fn draw_lock(ctx: &CanvasRenderingContext2d, x: f64, y: f64, size: f64, color: Color) {
	let body = size;
	ctx.set_fill_style_str(&color.to_css());
	ctx.fill_rect(x - body / 2.0, y - body / 4.0, body, body * 0.75);

	ctx.begin_path();
	let _ = ctx.arc(x, y - body / 4.0, body * 0.3, PI, 2.0 * PI);
	ctx.set_stroke_style_str(&color.to_css());
	ctx.set_line_width(body * 0.15);
	ctx.stroke();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn highlighted_elements_never_dim() {
		let theme = Theme::default();
		assert_eq!(element_alpha(true, 1.0, &theme), 1.0);
		assert_eq!(element_alpha(false, 0.0, &theme), 1.0);
		assert!((element_alpha(false, 1.0, &theme) - theme.dim_alpha).abs() < 1e-12);
	}

	#[test]
	fn configured_colors_reach_the_canvas_as_written() {
		for css in ["gold", "red", "rebeccapurple", "hsl(120, 50%, 50%)", "#0f0", "#03a9f480"] {
			assert_eq!(configured_color(css, FALLBACK_COLOR), css);
		}
		assert_eq!(configured_color("  gold ", FALLBACK_COLOR), "gold");
		assert_eq!(configured_color("", FALLBACK_COLOR), "gray");
	}
}
