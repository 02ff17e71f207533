//! Colors and the per-kind visual configuration table.
//!
//! Each [`NodeKind`] maps to one static [`KindStyle`] describing its glyph,
//! hit area, fill rule and label placement, so adding a kind is a compile
//! error until every table entry exists.

use super::types::{Demand, GraphLink, GraphNode, LinkType, NodeKind, ServiceStatus};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha in [0, 1].
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color with alpha replaced.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Linear interpolation between two colors
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
		Self {
			r: mix(self.r, other.r),
			g: mix(self.g, other.g),
			b: mix(self.b, other.b),
			a: self.a * (1.0 - t) + other.a * t,
		}
	}

	/// `#rrggbb` when opaque, otherwise `rgba(..)`.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

const NEUTRAL: Color = Color::rgb(158, 158, 158);
const NPS_LOW: Color = Color::rgb(198, 40, 40);
const NPS_MID: Color = Color::rgb(249, 168, 37);
const NPS_HIGH: Color = Color::rgb(46, 125, 50);

/// Fill for a service by delivery status.
pub fn status_color(status: Option<ServiceStatus>) -> Color {
	match status {
		Some(ServiceStatus::Active) => Color::rgb(46, 125, 50),
		Some(ServiceStatus::InDevelopment) => Color::rgb(249, 168, 37),
		Some(ServiceStatus::Planned) => Color::rgb(25, 118, 210),
		Some(ServiceStatus::Vapour) | Some(ServiceStatus::Unknown) | None => NEUTRAL,
	}
}

/// Diverging red-amber-green scale over NPS in [-100, 100]. No score is grey.
pub fn nps_color(nps: Option<f64>) -> Color {
	let Some(nps) = nps.filter(|v| v.is_finite()) else {
		return NEUTRAL;
	};
	let t = (nps.clamp(-100.0, 100.0) + 100.0) / 200.0;
	if t < 0.5 {
		NPS_LOW.lerp(NPS_MID, t * 2.0)
	} else {
		NPS_MID.lerp(NPS_HIGH, (t - 0.5) * 2.0)
	}
}

/// Stroke and arrowhead color for a link type.
pub fn link_color(link_type: LinkType) -> Color {
	match link_type {
		LinkType::Does => Color::rgb(123, 31, 162),
		LinkType::DependsOn => Color::rgb(230, 81, 0),
		LinkType::Reads => Color::rgb(0, 131, 143),
		LinkType::Writes => Color::rgb(198, 40, 40),
		LinkType::Updates => Color::rgb(69, 90, 100),
		LinkType::Other => Color::rgb(120, 144, 156),
	}
}

/// Stroke width of a link with no demand attached.
pub const LINK_WIDTH: f64 = 1.5;

/// Stroke width for a link. `DOES` links carry the user's demand for the
/// goal and thicken with it.
pub fn link_width(demand: Option<Demand>) -> f64 {
	match demand {
		Some(Demand::High) => 3.0,
		Some(Demand::Med) => 2.2,
		Some(Demand::Low) => 1.2,
		Some(Demand::None) => 0.8,
		Some(Demand::Unknown) | None => LINK_WIDTH,
	}
}

/// Stroke color for a link: its NPS on the node scale when scored,
/// otherwise the color of its type.
pub fn link_stroke(link: &GraphLink) -> Color {
	match link.nps.filter(|v| v.is_finite()) {
		Some(_) => nps_color(link.nps),
		None => link_color(link.link_type),
	}
}

/// Visible glyph of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
	/// Filled disc.
	Circle,
	/// SVG path data in a 24x24 box centered at (12, 12).
	Icon(&'static str),
}

/// How a node's fill color is chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FillRule {
	/// By service status.
	Status,
	/// By NPS score.
	Nps,
	/// Always this color.
	Fixed(Color),
}

impl FillRule {
	/// Fill for `node` under this rule.
	pub fn color_for(self, node: &GraphNode) -> Color {
		match self {
			FillRule::Status => status_color(node.status),
			FillRule::Nps => nps_color(node.nps_score),
			FillRule::Fixed(color) => color,
		}
	}
}

/// Static visual configuration for one node kind.
#[derive(Clone, Copy, Debug)]
pub struct KindStyle {
	/// Glyph drawn for the node.
	pub shape: Shape,
	/// Hit-area radius relative to the visible radius.
	pub hit_multiplier: f64,
	/// How the glyph is colored.
	pub fill: FillRule,
	/// Whether to draw a small badge next to the glyph.
	pub extra_icon: fn(&GraphNode) -> bool,
	/// Labels longer than this are truncated with an ellipsis.
	pub label_max_chars: Option<usize>,
	/// Label baseline sits `radius * label_scale + label_gap` below the center.
	pub label_scale: f64,
	/// Fixed part of the label offset.
	pub label_gap: f64,
}

impl KindStyle {
	/// Distance from the node center to the label baseline.
	pub fn label_offset(&self, radius: f64) -> f64 {
		radius * self.label_scale + self.label_gap
	}

	/// `name`, truncated to this kind's label length.
	pub fn label_text(&self, name: &str) -> String {
		match self.label_max_chars {
			Some(max) if name.chars().count() > max => {
				let mut out: String = name.chars().take(max).collect();
				out.push('…');
				out
			}
			_ => name.to_string(),
		}
	}
}

const USER_ICON: &str = "M12 12c2.65 0 4.8-2.15 4.8-4.8S14.65 2.4 12 2.4 7.2 4.55 7.2 7.2 9.35 12 12 12zm0 2.4c-3.2 0-9.6 1.6-9.6 4.8v2.4h19.2v-2.4c0-3.2-6.4-4.8-9.6-4.8z";
const SERVICE_ICON: &str = "M12 1.5L21.1 6.75V17.25L12 22.5L2.9 17.25V6.75Z";

fn no_badge(_: &GraphNode) -> bool {
	false
}

fn service_badge(node: &GraphNode) -> bool {
	node.status == Some(ServiceStatus::InDevelopment)
}

static GOAL: KindStyle = KindStyle {
	shape: Shape::Circle,
	hit_multiplier: 1.4,
	fill: FillRule::Nps,
	extra_icon: no_badge,
	label_max_chars: Some(20),
	label_scale: 1.0,
	label_gap: 12.0,
};

static USER: KindStyle = KindStyle {
	shape: Shape::Icon(USER_ICON),
	hit_multiplier: 2.2,
	fill: FillRule::Nps,
	extra_icon: no_badge,
	label_max_chars: None,
	label_scale: 1.3,
	label_gap: 10.0,
};

static SERVICE: KindStyle = KindStyle {
	shape: Shape::Icon(SERVICE_ICON),
	hit_multiplier: 1.8,
	fill: FillRule::Status,
	extra_icon: service_badge,
	label_max_chars: None,
	label_scale: 1.2,
	label_gap: 8.0,
};

static UNKNOWN: KindStyle = KindStyle {
	shape: Shape::Circle,
	hit_multiplier: 1.5,
	fill: FillRule::Fixed(NEUTRAL),
	extra_icon: no_badge,
	label_max_chars: None,
	label_scale: 1.0,
	label_gap: 10.0,
};

/// The style table entry for `kind`.
pub fn kind_style(kind: NodeKind) -> &'static KindStyle {
	match kind {
		NodeKind::Goal => &GOAL,
		NodeKind::User => &USER,
		NodeKind::Service => &SERVICE,
		NodeKind::Unknown => &UNKNOWN,
	}
}

/// Canvas-wide colors.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Edge of the background gradient, and the flat fallback.
	pub background: Color,
	/// Center of the background gradient.
	pub background_secondary: Color,
	/// Label text.
	pub label: Color,
	/// Ring around selected nodes.
	pub selection_outline: Color,
	/// Status badge fill.
	pub badge: Color,
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			background: Color::rgb(22, 27, 34),
			background_secondary: Color::rgb(30, 35, 42),
			label: Color::rgba(230, 237, 243, 0.9),
			selection_outline: Color::rgb(255, 255, 255),
			badge: Color::rgb(255, 213, 79),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn nps_scale_endpoints() {
		assert_eq!(nps_color(Some(-100.0)), NPS_LOW);
		assert_eq!(nps_color(Some(0.0)), NPS_MID);
		assert_eq!(nps_color(Some(100.0)), NPS_HIGH);
		assert_eq!(nps_color(Some(500.0)), NPS_HIGH);
		assert_eq!(nps_color(None), NEUTRAL);
		assert_eq!(nps_color(Some(f64::NAN)), NEUTRAL);
	}

	#[test]
	fn demand_thickens_links() {
		let widths: Vec<f64> = [Some(Demand::High), Some(Demand::Med), Some(Demand::Low), Some(Demand::None)]
			.into_iter()
			.map(link_width)
			.collect();
		assert!(widths.windows(2).all(|w| w[0] > w[1]));
		assert_eq!(link_width(None), LINK_WIDTH);
		assert_eq!(link_width(Some(Demand::Unknown)), LINK_WIDTH);
	}

	#[test]
	fn scored_links_use_nps_scale() {
		let mut link = GraphLink::new("u", "g", LinkType::Does);
		assert_eq!(link_stroke(&link), link_color(LinkType::Does));
		link.nps = Some(100.0);
		assert_eq!(link_stroke(&link), NPS_HIGH);
		link.nps = Some(f64::NAN);
		assert_eq!(link_stroke(&link), link_color(LinkType::Does));
	}

	#[test]
	fn goal_labels_truncate() {
		let style = kind_style(NodeKind::Goal);
		assert_eq!(style.label_text("short"), "short");
		let long = "Reconcile every supplier invoice";
		let label = style.label_text(long);
		assert_eq!(label.chars().count(), 21);
		assert!(label.ends_with('…'));
		assert_eq!(kind_style(NodeKind::Service).label_text(long), long);
	}

	#[test]
	fn label_offsets_differ_per_kind() {
		let r = 10.0;
		assert_eq!(kind_style(NodeKind::Goal).label_offset(r), 22.0);
		assert_eq!(kind_style(NodeKind::User).label_offset(r), 23.0);
		assert_eq!(kind_style(NodeKind::Service).label_offset(r), 20.0);
	}

	#[test]
	fn service_badge_only_in_development() {
		let mut node = GraphNode::new("s", NodeKind::Service, "Billing");
		let style = kind_style(NodeKind::Service);
		assert!(!(style.extra_icon)(&node));
		node.status = Some(ServiceStatus::InDevelopment);
		assert!((style.extra_icon)(&node));
		assert_eq!(style.fill.color_for(&node), status_color(node.status));
	}

	#[test]
	fn css_output() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(Color::rgba(1, 2, 3, 0.5).to_css(), "rgba(1, 2, 3, 0.5)");
	}
}
