//! Canvas rendering for the force graph.
//!
//! Rendering uses passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Links, then their arrowheads (world space)
//! 3. Node glyphs, selection outlines and badges, then labels on top

use std::collections::HashMap;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, Path2d};

use super::geometry::{EdgePoints, Point};
use super::scene::{Frame, Scene};
use super::state::GraphState;
use super::style::{Shape, Theme};

/// Icon paths live in a 24x24 box.
const ICON_BOX: f64 = 24.0;
const DASH: (f64, f64) = (4.0, 3.0);
const OUTLINE_GAP: f64 = 3.0;
const LABEL_FONT: &str = "11px system-ui, sans-serif";

/// Parsed icon paths, keyed by their SVG path data.
#[derive(Debug, Default)]
pub struct IconCache {
	paths: HashMap<&'static str, Option<Path2d>>,
}

impl IconCache {
	fn get(&mut self, data: &'static str) -> Option<&Path2d> {
		self.paths
			.entry(data)
			.or_insert_with(|| Path2d::new_with_path_string(data).ok())
			.as_ref()
	}
}

/// Renders the complete graph to the canvas.
pub fn render(
	state: &GraphState,
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	icons: &mut IconCache,
	now_ms: f64,
) {
	draw_background(state, ctx, theme);

	let Some(scene) = state.scene() else {
		return;
	};
	let interaction = &state.config().interaction;
	let frame = scene.frame(state.controller.particles(), interaction.arrow_clearance);
	let fade = scene.fade_factor(now_ms, interaction.fade_ms);

	ctx.save();
	let _ = ctx.translate(scene.transform.x, scene.transform.y);
	let _ = ctx.scale(scene.transform.k, scene.transform.k);

	draw_links(scene, &frame, ctx, fade);
	draw_nodes(scene, &frame, ctx, theme, icons, fade);
	draw_labels(scene, &frame, ctx, theme, fade);

	ctx.restore();
	ctx.set_global_alpha(1.0);
}

fn draw_background(state: &GraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let (w, h) = (state.width, state.height);
	match ctx.create_radial_gradient(w / 2.0, h / 2.0, 0.0, w / 2.0, h / 2.0, w.max(h) * 0.8) {
		Ok(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		Err(_) => ctx.set_fill_style_str(&theme.background.to_css()),
	}
	ctx.fill_rect(0.0, 0.0, w, h);
}

fn draw_links(scene: &Scene, frame: &Frame, ctx: &CanvasRenderingContext2d, fade: f64) {
	let solid: JsValue = js_sys::Array::new().into();
	let dashed: JsValue = js_sys::Array::of2(&JsValue::from_f64(DASH.0), &JsValue::from_f64(DASH.1)).into();

	for (i, link) in scene.links.iter().enumerate() {
		let Some(Some(edge)) = frame.edges.get(i) else {
			continue;
		};
		let emphasis = scene.link_emphasis(i);
		let alpha = if scene.is_link_fading(i) {
			emphasis.opacity * fade
		} else {
			emphasis.opacity
		};
		if alpha <= 0.0 {
			continue;
		}

		let _ = ctx.set_line_dash(if emphasis.dashed { &dashed } else { &solid });
		ctx.set_line_width(link.width);
		ctx.set_stroke_style_str(&link.color.with_alpha(alpha).to_css());
		ctx.begin_path();
		ctx.move_to(edge.source.x, edge.source.y);
		ctx.line_to(edge.target.x, edge.target.y);
		ctx.stroke();

		if let Some(marker) = scene.markers.get(link.marker) {
			let _ = ctx.set_line_dash(&solid);
			ctx.set_fill_style_str(&link.color.with_alpha(alpha).to_css());
			draw_arrowhead(ctx, edge, marker.length, marker.width);
		}
	}
	let _ = ctx.set_line_dash(&solid);
}

/// Arrowhead with its tip at the trimmed target end.
fn draw_arrowhead(ctx: &CanvasRenderingContext2d, edge: &EdgePoints, length: f64, width: f64) {
	let (ux, uy) = edge.direction();
	let tip = edge.target;
	let back = Point::new(tip.x - ux * length, tip.y - uy * length);
	let (px, py) = (-uy * width * 0.5, ux * width * 0.5);

	ctx.begin_path();
	ctx.move_to(tip.x, tip.y);
	ctx.line_to(back.x + px, back.y + py);
	ctx.line_to(back.x - px, back.y - py);
	ctx.close_path();
	ctx.fill();
}

fn node_alpha(scene: &Scene, index: usize, fade: f64) -> f64 {
	let opacity = scene.node_emphasis(index).opacity;
	if scene.is_node_fading(index) {
		opacity * fade
	} else {
		opacity
	}
}

fn draw_nodes(
	scene: &Scene,
	frame: &Frame,
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	icons: &mut IconCache,
	fade: f64,
) {
	for (i, visual) in scene.nodes.iter().enumerate() {
		let Some(center) = frame.nodes.get(i).and_then(|g| g.position) else {
			continue;
		};
		let alpha = node_alpha(scene, i, fade);
		if alpha <= 0.0 {
			continue;
		}
		let r = visual.radius;
		ctx.set_global_alpha(alpha);
		ctx.set_fill_style_str(&visual.fill.to_css());

		let icon = match visual.style.shape {
			Shape::Icon(data) => icons.get(data),
			Shape::Circle => None,
		};
		match icon {
			Some(path) => {
				ctx.save();
				let _ = ctx.translate(center.x - r, center.y - r);
				let s = 2.0 * r / ICON_BOX;
				let _ = ctx.scale(s, s);
				ctx.fill_with_path_2d(path);
				ctx.restore();
			}
			// Circles, and icons whose path failed to parse.
			None => {
				ctx.begin_path();
				let _ = ctx.arc(center.x, center.y, r, 0.0, 2.0 * PI);
				ctx.fill();
			}
		}

		if scene.node_emphasis(i).outline {
			ctx.begin_path();
			let _ = ctx.arc(center.x, center.y, r + OUTLINE_GAP, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&theme.selection_outline.to_css());
			ctx.set_line_width(2.0);
			ctx.stroke();
		}

		if visual.badge {
			ctx.begin_path();
			let _ = ctx.arc(center.x + r * 0.8, center.y - r * 0.8, r * 0.35, 0.0, 2.0 * PI);
			ctx.set_fill_style_str(&theme.badge.to_css());
			ctx.fill();
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_labels(scene: &Scene, frame: &Frame, ctx: &CanvasRenderingContext2d, theme: &Theme, fade: f64) {
	ctx.set_font(LABEL_FONT);
	ctx.set_text_align("center");
	ctx.set_fill_style_str(&theme.label.to_css());
	for (i, visual) in scene.nodes.iter().enumerate() {
		let Some(center) = frame.nodes.get(i).and_then(|g| g.position) else {
			continue;
		};
		let alpha = node_alpha(scene, i, fade);
		if alpha <= 0.0 {
			continue;
		}
		ctx.set_global_alpha(alpha);
		let _ = ctx.fill_text(&visual.label, center.x, center.y + visual.label_offset);
	}
	ctx.set_global_alpha(1.0);
}
