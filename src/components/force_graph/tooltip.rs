//! Hover tooltip content and fade timing.
//!
//! Showing waits a short delay before fading in so the pointer can settle;
//! sweeping across many nodes never flashes a tooltip for each of them.

use web_sys::HtmlElement;

use super::config::TooltipConfig;
use super::types::{GraphNode, NodeKind};

fn escape(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#39;"),
			_ => out.push(c),
		}
	}
	out
}

fn number(value: f64) -> String {
	if value.fract() == 0.0 && value.abs() < 1e15 {
		format!("{}", value as i64)
	} else {
		format!("{value:.1}")
	}
}

/// Tooltip markup for a node: name and type, then whichever metrics it has.
pub fn describe(node: &GraphNode) -> String {
	let mut html = format!(
		"<strong>{}</strong><br/><em>{}</em>",
		escape(&node.name),
		node.kind.as_str()
	);
	let mut field = |label: &str, value: String| {
		html.push_str(&format!("<br/>{label}: {value}"));
	};
	match node.kind {
		NodeKind::Goal => {
			if let Some(c) = node.complexity {
				field("Complexity", number(c));
			}
			if let Some(nps) = node.nps_score {
				field("NPS", number(nps));
			}
		}
		NodeKind::Service => {
			if let Some(d) = node.dependants {
				field("Dependants", number(d));
			}
			if let Some(status) = node.status {
				field("Status", status.as_str().to_string());
			}
		}
		NodeKind::User => {
			if let Some(i) = node.importance {
				field("Importance", number(i));
			}
			if let Some(nps) = node.nps_score {
				field("NPS", number(nps));
			}
		}
		NodeKind::Unknown => {}
	}
	html
}

/// Cubic in-out easing.
fn ease(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0) * 2.0;
	if t <= 1.0 {
		t * t * t / 2.0
	} else {
		let t = t - 2.0;
		(t * t * t + 2.0) / 2.0
	}
}

#[derive(Clone, Debug)]
struct Fade {
	/// Captured when the fade actually begins.
	from: Option<f64>,
	to: f64,
	start_ms: f64,
	duration_ms: f64,
}

/// Tooltip state: what it says, where it is, and how opaque it is.
#[derive(Clone, Debug, Default)]
pub struct Tooltip {
	content: String,
	node_id: Option<String>,
	x: f64,
	y: f64,
	opacity: f64,
	fade: Option<Fade>,
	content_dirty: bool,
}

impl Tooltip {
	/// Sets content and position, then fades in after the configured delay.
	pub fn show(&mut self, node: &GraphNode, x: f64, y: f64, now_ms: f64, config: &TooltipConfig) {
		if self.node_id.as_deref() != Some(node.id.as_str()) {
			self.content = describe(node);
			self.node_id = Some(node.id.clone());
			self.content_dirty = true;
		}
		self.x = x;
		self.y = y;
		self.fade = Some(Fade {
			from: None,
			to: config.opacity,
			start_ms: now_ms + config.show_delay_ms,
			duration_ms: config.show_duration_ms,
		});
	}

	/// Moves the tooltip without restarting its fade.
	pub fn follow(&mut self, x: f64, y: f64) {
		self.x = x;
		self.y = y;
	}

	/// Fades out immediately.
	pub fn hide(&mut self, now_ms: f64, config: &TooltipConfig) {
		self.node_id = None;
		self.fade = Some(Fade {
			from: None,
			to: 0.0,
			start_ms: now_ms,
			duration_ms: config.hide_duration_ms,
		});
	}

	#[cfg(test)]
	pub fn is_visible_for(&self, id: &str) -> bool {
		self.node_id.as_deref() == Some(id)
	}

	/// Advances the fade. Returns the current opacity.
	pub fn tick(&mut self, now_ms: f64) -> f64 {
		let Some(fade) = self.fade.as_mut() else {
			return self.opacity;
		};
		if now_ms < fade.start_ms {
			return self.opacity;
		}
		let from = *fade.from.get_or_insert(self.opacity);
		let t = if fade.duration_ms <= 0.0 {
			1.0
		} else {
			(now_ms - fade.start_ms) / fade.duration_ms
		};
		self.opacity = from + (fade.to - from) * ease(t);
		if t >= 1.0 {
			self.opacity = fade.to;
			self.fade = None;
		}
		self.opacity
	}

	#[cfg(test)]
	pub fn opacity(&self) -> f64 {
		self.opacity
	}

	#[cfg(test)]
	pub fn content(&self) -> &str {
		&self.content
	}

	/// Writes the current state to the tooltip element.
	pub fn apply(&mut self, element: &HtmlElement) {
		if self.content_dirty {
			element.set_inner_html(&self.content);
			self.content_dirty = false;
		}
		let style = element.style();
		let _ = style.set_property("left", &format!("{}px", self.x + 12.0));
		let _ = style.set_property("top", &format!("{}px", self.y + 12.0));
		let _ = style.set_property("opacity", &format!("{:.3}", self.opacity));
		let _ = style.set_property(
			"visibility",
			if self.opacity > 0.001 { "visible" } else { "hidden" },
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::ServiceStatus;

	#[test]
	fn goal_description() {
		let mut goal = GraphNode::new("g", NodeKind::Goal, "Pay <rent>");
		goal.complexity = Some(4.0);
		let html = describe(&goal);
		assert!(html.starts_with("<strong>Pay &lt;rent&gt;</strong><br/><em>Goal</em>"));
		assert!(html.contains("Complexity: 4"));
		assert!(!html.contains("NPS"));
	}

	#[test]
	fn service_and_user_fields() {
		let mut service = GraphNode::new("s", NodeKind::Service, "Ledger");
		service.status = Some(ServiceStatus::Planned);
		let html = describe(&service);
		assert!(html.contains("Status: planned"));
		assert!(!html.contains("Dependants"));

		let mut user = GraphNode::new("u", NodeKind::User, "Clerk");
		user.importance = Some(3.0);
		user.nps_score = Some(-12.5);
		let html = describe(&user);
		assert!(html.contains("Importance: 3"));
		assert!(html.contains("NPS: -12.5"));
	}

	#[test]
	fn show_waits_then_fades_in() {
		let config = TooltipConfig::default();
		let node = GraphNode::new("g", NodeKind::Goal, "Plan");
		let mut tip = Tooltip::default();
		tip.show(&node, 10.0, 20.0, 0.0, &config);
		assert_eq!(tip.tick(config.show_delay_ms - 1.0), 0.0);
		let mid = tip.tick(config.show_delay_ms + config.show_duration_ms / 2.0);
		assert!(mid > 0.0 && mid < config.opacity);
		let done = tip.tick(config.show_delay_ms + config.show_duration_ms + 1.0);
		assert_eq!(done, config.opacity);
		assert!(tip.is_visible_for("g"));
	}

	#[test]
	fn hide_starts_immediately() {
		let config = TooltipConfig::default();
		let node = GraphNode::new("g", NodeKind::Goal, "Plan");
		let mut tip = Tooltip::default();
		tip.show(&node, 0.0, 0.0, 0.0, &config);
		tip.tick(10_000.0);
		tip.hide(10_000.0, &config);
		assert!(tip.tick(10_000.0 + config.hide_duration_ms / 2.0) < config.opacity);
		assert_eq!(tip.tick(10_000.0 + config.hide_duration_ms), 0.0);
		assert!(!tip.is_visible_for("g"));
	}
}
