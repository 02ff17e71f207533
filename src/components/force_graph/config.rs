//! Tunable parameters for layout, interaction timing and tooltips.
//!
//! Every value has a default; a partial JSON object only overrides the fields
//! it names. The click threshold and redraw delay are tuned constants rather
//! than derived ones.

use serde::Deserialize;

/// Force parameters for both layout modes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
	/// Link rest length with no selection.
	pub context_link_distance: f64,
	/// Link stiffness with no selection.
	pub context_link_strength: f64,
	/// Uniform many-body strength (negative repels).
	pub charge: f64,
	/// Added to a node's radius to get its collision radius.
	pub collision_padding: f64,
	/// How hard overlapping nodes are pushed apart, in [0, 1].
	pub collision_strength: f64,
	/// Link rest length for links touching the selection.
	pub focus_link_distance: f64,
	/// Link rest length for all other links in focus mode.
	pub focus_base_link_distance: f64,
	/// Stiffness of links touching the selection.
	pub focus_link_strength: f64,
	/// Stiffness of all other links in focus mode.
	pub focus_base_link_strength: f64,
	/// Charge multiplier for selected nodes.
	pub selected_charge_scale: f64,
	/// Charge multiplier for nodes one hop from the selection.
	pub connected_charge_scale: f64,
	/// Charge multiplier for every other node.
	pub context_charge_scale: f64,
	/// Residual x/y pull in focus mode, only there to stop drift.
	pub focus_position_strength: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Per-tick cooling rate.
	pub alpha_decay: f64,
	/// Damping used during the settle burst after a selection change.
	pub settle_velocity_decay: f64,
	/// Cooling rate during the settle burst.
	pub settle_alpha_decay: f64,
	/// Synchronous ticks run on every selection change.
	pub settle_ticks: usize,
	/// Alpha the simulation restarts at after settling.
	pub restart_alpha: f64,
	/// Target alpha while a node is being dragged.
	pub drag_alpha_target: f64,
	/// Seed for the jitter generator.
	pub seed: u32,
}

impl Default for ForceConfig {
	fn default() -> Self {
		Self {
			context_link_distance: 90.0,
			context_link_strength: 0.7,
			charge: -300.0,
			collision_padding: 6.0,
			collision_strength: 0.7,
			focus_link_distance: 140.0,
			focus_base_link_distance: 60.0,
			focus_link_strength: 0.8,
			focus_base_link_strength: 0.2,
			selected_charge_scale: 3.0,
			connected_charge_scale: 1.5,
			context_charge_scale: 0.5,
			focus_position_strength: 0.02,
			velocity_decay: 0.4,
			alpha_decay: 0.0228,
			settle_velocity_decay: 0.7,
			settle_alpha_decay: 0.1,
			settle_ticks: 20,
			restart_alpha: 0.3,
			drag_alpha_target: 0.3,
			seed: 1,
		}
	}
}

/// Pointer and redraw timing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
	/// A drag that never moves further than this (screen px) is a click.
	pub click_threshold_px: f64,
	/// Delay between a snapshot arriving and the rebuild.
	pub redraw_delay_ms: f64,
	/// Fade-out duration for removed elements. Should not exceed the redraw delay.
	pub fade_ms: f64,
	/// Room left at the target end of a link for the arrowhead.
	pub arrow_clearance: f64,
}

impl Default for InteractionConfig {
	fn default() -> Self {
		Self {
			click_threshold_px: 5.0,
			redraw_delay_ms: 250.0,
			fade_ms: 200.0,
			arrow_clearance: 3.0,
		}
	}
}

/// Tooltip fade timing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TooltipConfig {
	/// Hover time before the fade-in starts.
	pub show_delay_ms: f64,
	/// Fade-in length.
	pub show_duration_ms: f64,
	/// Fade-out length.
	pub hide_duration_ms: f64,
	/// Opacity once fully shown.
	pub opacity: f64,
}

impl Default for TooltipConfig {
	fn default() -> Self {
		Self {
			show_delay_ms: 300.0,
			show_duration_ms: 300.0,
			hide_duration_ms: 200.0,
			opacity: 0.9,
		}
	}
}

/// Complete configuration for one graph instance.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	/// Layout physics.
	pub forces: ForceConfig,
	/// Pointer and redraw timing.
	pub interaction: InteractionConfig,
	/// Tooltip fades.
	pub tooltip: TooltipConfig,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_other_defaults() {
		let config: GraphConfig =
			serde_json::from_str(r#"{ "interaction": { "click_threshold_px": 8 } }"#).unwrap();
		assert_eq!(config.interaction.click_threshold_px, 8.0);
		assert_eq!(config.interaction.redraw_delay_ms, 250.0);
		assert_eq!(config.forces, ForceConfig::default());
	}

	#[test]
	fn focus_charge_scales_are_ordered() {
		let f = ForceConfig::default();
		assert!(f.selected_charge_scale > f.connected_charge_scale);
		assert!(f.connected_charge_scale > f.context_charge_scale);
	}
}
