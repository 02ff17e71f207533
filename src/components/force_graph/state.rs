//! Per-instance interaction state.
//!
//! Owns the render pipeline, the simulation controller and the selection,
//! and turns pointer and keyboard input into selection changes, drags, pans
//! and tooltip updates. Everything here is DOM-free; the component feeds it
//! canvas-relative coordinates and a clock.

use log::info;

use super::config::GraphConfig;
use super::controller::{DragGesture, DragOutcome, SimulationController};
use super::geometry::Point;
use super::pipeline::{RedrawPlan, Rebuilt, RenderPipeline};
use super::scene::Scene;
use super::selection::Selection;
use super::tooltip::Tooltip;
use super::types::GraphData;

/// Zoom step per wheel notch.
const ZOOM_IN: f64 = 1.1;
const ZOOM_OUT: f64 = 0.9;

/// Emitted whenever the selection changes.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionEvent {
	pub ids: Vec<String>,
	/// Whether the click that caused it had the modifier held.
	pub modifier: bool,
}

/// A node drag in progress.
#[derive(Clone, Debug)]
struct ActiveDrag {
	gesture: DragGesture,
	modifier: bool,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Copy, Debug)]
struct PanState {
	start: Point,
	origin: Point,
}

/// Core graph state combining the pipeline, physics and interaction tracking.
///
/// Created once when the component mounts, then mutated by DOM events and
/// by the animation loop through [`GraphState::frame`].
pub struct GraphState {
	config: GraphConfig,
	pub pipeline: RenderPipeline,
	pub controller: SimulationController,
	pub selection: Selection,
	pub tooltip: Tooltip,
	pub width: f64,
	pub height: f64,
	drag: Option<ActiveDrag>,
	pan: Option<PanState>,
	hovered: Option<usize>,
	reveal: bool,
	events: Vec<SelectionEvent>,
}

impl GraphState {
	pub fn new(config: GraphConfig, width: f64, height: f64) -> Self {
		Self {
			pipeline: RenderPipeline::new(config.interaction.clone()),
			controller: SimulationController::new(config.forces.clone(), width, height),
			selection: Selection::new(),
			tooltip: Tooltip::default(),
			config,
			width,
			height,
			drag: None,
			pan: None,
			hovered: None,
			reveal: false,
			events: Vec::new(),
		}
	}

	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	pub fn scene(&self) -> Option<&Scene> {
		self.pipeline.scene()
	}

	pub fn hovered(&self) -> Option<usize> {
		self.hovered
	}

	/// Whether the second-hop tier is currently revealed.
	#[cfg(test)]
	pub fn reveal(&self) -> bool {
		self.reveal
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.is_some()
	}

	/// CSS cursor for the canvas in the current pointer state.
	pub fn cursor(&self) -> &'static str {
		if self.is_dragging() || self.pan.is_some() {
			"grabbing"
		} else if self.hovered().is_some() {
			"pointer"
		} else {
			"grab"
		}
	}

	/// Feeds a new snapshot into the pipeline.
	pub fn set_data(&mut self, data: GraphData, now_ms: f64) {
		let plan = self
			.pipeline
			.submit(data, now_ms, &mut self.controller, &mut self.selection);
		if let RedrawPlan::Immediate(rebuilt) = plan {
			self.after_rebuild(rebuilt, now_ms);
		}
	}

	/// Runs due rebuilds, advances the simulation and the tooltip fade.
	pub fn frame(&mut self, now_ms: f64) {
		if let Some(rebuilt) = self
			.pipeline
			.poll(now_ms, &mut self.controller, &mut self.selection)
		{
			self.after_rebuild(rebuilt, now_ms);
		}
		self.controller.step();
		self.tooltip.tick(now_ms);
	}

	fn after_rebuild(&mut self, rebuilt: Rebuilt, now_ms: f64) {
		// Indices from the old scene mean nothing now.
		self.drag = None;
		if self.hovered.take().is_some() {
			self.tooltip.hide(now_ms, &self.config.tooltip);
		}
		if let Some(scene) = self.pipeline.scene_mut() {
			scene.restyle(&self.selection, self.reveal);
		}
		if rebuilt.selection_pruned {
			self.emit(false);
		}
	}

	fn node_under(&self, screen: Point) -> Option<usize> {
		let scene = self.scene()?;
		scene.node_at(scene.transform.screen_to_graph(screen), self.controller.particles())
	}

	pub fn pointer_down(&mut self, screen: Point, modifier: bool) {
		if let Some(index) = self.node_under(screen) {
			if let Some(gesture) = self.controller.drag_start(index, screen) {
				self.drag = Some(ActiveDrag { gesture, modifier });
				return;
			}
		}
		let Some(scene) = self.scene() else {
			return;
		};
		self.pan = Some(PanState {
			start: screen,
			origin: Point::new(scene.transform.x, scene.transform.y),
		});
	}

	pub fn pointer_move(&mut self, screen: Point, now_ms: f64) {
		if let Some(drag) = self.drag.as_mut() {
			let world = self
				.pipeline
				.scene()
				.map(|s| s.transform.screen_to_graph(screen))
				.unwrap_or(screen);
			self.controller.drag_move(&mut drag.gesture, screen, world);
			return;
		}
		if let Some(pan) = self.pan {
			if let Some(scene) = self.pipeline.scene_mut() {
				scene.transform.x = pan.origin.x + (screen.x - pan.start.x);
				scene.transform.y = pan.origin.y + (screen.y - pan.start.y);
			}
			return;
		}
		self.update_hover(screen, now_ms);
	}

	fn update_hover(&mut self, screen: Point, now_ms: f64) {
		let hovered = self.node_under(screen);
		match (hovered, self.hovered) {
			(Some(index), previous) if previous != Some(index) => {
				let node = self.scene().and_then(|s| s.graph.nodes.get(index)).cloned();
				if let Some(node) = node {
					self.tooltip
						.show(&node, screen.x, screen.y, now_ms, &self.config.tooltip);
				}
			}
			(Some(_), _) => self.tooltip.follow(screen.x, screen.y),
			(None, Some(_)) => self.tooltip.hide(now_ms, &self.config.tooltip),
			(None, None) => {}
		}
		self.hovered = hovered;
	}

	pub fn pointer_up(&mut self) {
		self.pan = None;
		let Some(drag) = self.drag.take() else {
			return;
		};
		let keep_pinned = self.id_at(drag.gesture.index).is_some_and(|id| self.selection.contains(&id));
		let outcome = self.controller.drag_end(
			drag.gesture,
			self.config.interaction.click_threshold_px,
			keep_pinned,
		);
		if let DragOutcome::Click(index) = outcome {
			if let Some(id) = self.id_at(index) {
				if self.selection.click(&id, drag.modifier) {
					self.apply_selection(drag.modifier);
				}
			}
		}
	}

	/// Pointer left the canvas: ends any gesture without clicking.
	pub fn pointer_leave(&mut self, now_ms: f64) {
		self.pan = None;
		if let Some(drag) = self.drag.take() {
			let keep_pinned = self.id_at(drag.gesture.index).is_some_and(|id| self.selection.contains(&id));
			// A negative threshold never reads as a click.
			self.controller.drag_end(drag.gesture, -1.0, keep_pinned);
		}
		if self.hovered.take().is_some() {
			self.tooltip.hide(now_ms, &self.config.tooltip);
		}
	}

	/// Handles a key press. Returns whether the key was consumed.
	pub fn key_down(&mut self, key: &str) -> bool {
		match key {
			"Escape" => {
				if self.selection.clear() {
					self.apply_selection(false);
				}
				true
			}
			"s" | "S" => {
				if !self.reveal {
					self.reveal = true;
					self.restyle();
				}
				true
			}
			_ => false,
		}
	}

	pub fn key_up(&mut self, key: &str) -> bool {
		match key {
			"s" | "S" => {
				if self.reveal {
					self.reveal = false;
					self.restyle();
				}
				true
			}
			_ => false,
		}
	}

	/// Zooms around the pointer. Positive `delta_y` zooms out.
	pub fn wheel(&mut self, screen: Point, delta_y: f64) {
		let factor = if delta_y > 0.0 { ZOOM_OUT } else { ZOOM_IN };
		if let Some(scene) = self.pipeline.scene_mut() {
			scene.transform.zoom_at(screen, factor);
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.controller.resize(width, height);
	}

	/// Drains selection events queued since the last call.
	pub fn take_events(&mut self) -> Vec<SelectionEvent> {
		std::mem::take(&mut self.events)
	}

	fn id_at(&self, index: usize) -> Option<String> {
		self.scene()?.graph.nodes.get(index).map(|n| n.id.clone())
	}

	fn restyle(&mut self) {
		if let Some(scene) = self.pipeline.scene_mut() {
			scene.restyle(&self.selection, self.reveal);
		}
	}

	fn apply_selection(&mut self, modifier: bool) {
		if let Some(scene) = self.pipeline.scene_mut() {
			self.controller.on_selection_change(&scene.graph, &self.selection);
			scene.restyle(&self.selection, self.reveal);
		}
		self.emit(modifier);
	}

	fn emit(&mut self, modifier: bool) {
		let ids = self.selection.to_vec();
		info!("jtbd-graph: selection {:?} (modifier: {})", ids, modifier);
		self.events.push(SelectionEvent { ids, modifier });
	}
}
