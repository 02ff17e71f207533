//! Owns the simulation and tunes its forces to the current selection.
//!
//! With nothing selected the layout is in context mode: uniform charge, firm
//! links and a centering force. With a selection it switches to focus mode:
//! selected nodes are pinned where they stand, charge is scaled by how close
//! each node is to the selection, links touching the selection lengthen, and
//! only a weak x/y pull remains to stop drift.

use log::debug;

use super::config::ForceConfig;
use super::geometry::Point;
use super::graph::{ResolvedGraph, Tier};
use super::selection::Selection;
use super::simulation::{Center, Collide, Forces, LinkForce, ManyBody, Particle, PositionForce, Simulation};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutMode {
	Context,
	Focus,
}

impl LayoutMode {
	pub fn for_selection(selection: &Selection) -> Self {
		if selection.is_empty() {
			LayoutMode::Context
		} else {
			LayoutMode::Focus
		}
	}
}

/// One pointer drag on a node, from press to release.
#[derive(Clone, Debug)]
pub struct DragGesture {
	pub index: usize,
	start: Point,
	/// Furthest the pointer has been from `start`, in screen pixels.
	travelled: f64,
}

/// How a drag ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragOutcome {
	/// The pointer never left the click threshold; treat as a click.
	Click(usize),
	Moved(usize),
}

/// The force simulation controller for one graph instance.
#[derive(Debug)]
pub struct SimulationController {
	config: ForceConfig,
	simulation: Option<Simulation>,
	center: Point,
	mode: LayoutMode,
}

impl SimulationController {
	pub fn new(config: ForceConfig, width: f64, height: f64) -> Self {
		Self {
			config,
			simulation: None,
			center: Point::new(width / 2.0, height / 2.0),
			mode: LayoutMode::Context,
		}
	}

	#[cfg(test)]
	pub fn mode(&self) -> LayoutMode {
		self.mode
	}

	#[cfg(test)]
	pub fn simulation(&self) -> Option<&Simulation> {
		self.simulation.as_ref()
	}

	pub fn particles(&self) -> &[Particle] {
		self.simulation.as_ref().map(|s| s.particles.as_slice()).unwrap_or(&[])
	}

	#[cfg(test)]
	pub fn particle(&self, index: usize) -> Option<&Particle> {
		self.particles().get(index)
	}

	#[cfg(test)]
	pub fn is_running(&self) -> bool {
		self.simulation.as_ref().is_some_and(Simulation::is_running)
	}

	/// Replaces any existing simulation with a fresh one for `graph`.
	pub fn install(&mut self, graph: &ResolvedGraph, selection: &Selection) {
		self.stop();
		self.simulation = None;
		if graph.is_empty() {
			return;
		}
		let mut sim = Simulation::new(graph.nodes.len(), self.center, self.config.seed);
		sim.velocity_decay = self.config.velocity_decay;
		sim.alpha_decay = self.config.alpha_decay;
		self.simulation = Some(sim);
		self.configure(graph, selection);
		debug!(
			"jtbd-graph: simulation installed for {} nodes in {:?} mode",
			graph.nodes.len(),
			self.mode
		);
	}

	pub fn stop(&mut self) {
		if let Some(sim) = self.simulation.as_mut() {
			sim.stop();
		}
	}

	pub fn clear(&mut self) {
		self.stop();
		self.simulation = None;
	}

	/// Advances one frame's worth of physics. Returns whether anything moved.
	pub fn step(&mut self) -> bool {
		self.simulation.as_mut().is_some_and(Simulation::step)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.center = Point::new(width / 2.0, height / 2.0);
		let Some(sim) = self.simulation.as_mut() else {
			return;
		};
		if let Some(center) = sim.forces.center.as_mut() {
			(center.x, center.y) = (self.center.x, self.center.y);
		}
		if let Some(x) = sim.forces.x.as_mut() {
			x.target = self.center.x;
		}
		if let Some(y) = sim.forces.y.as_mut() {
			y.target = self.center.y;
		}
	}

	/// Installs the forces and pins for the current selection without
	/// disturbing alpha.
	pub fn configure(&mut self, graph: &ResolvedGraph, selection: &Selection) {
		self.mode = LayoutMode::for_selection(selection);
		let Some(sim) = self.simulation.as_mut() else {
			return;
		};
		let config = &self.config;
		let edges = graph.edges();
		let n = graph.nodes.len();
		let collide = Collide::new(
			graph.radii.iter().map(|r| r + config.collision_padding).collect(),
			config.collision_strength,
		);

		sim.forces = match self.mode {
			LayoutMode::Context => Forces {
				link: Some(LinkForce::new(
					&edges,
					n,
					|_| config.context_link_distance,
					|_| config.context_link_strength,
				)),
				charge: Some(ManyBody::new(vec![config.charge; n])),
				collide: Some(collide),
				center: Some(Center {
					x: self.center.x,
					y: self.center.y,
				}),
				x: None,
				y: None,
			},
			LayoutMode::Focus => {
				let tiers = graph.tiers(selection);
				let touching: Vec<bool> = edges
					.iter()
					.map(|&(s, t)| tiers[s] == Tier::Selected || tiers[t] == Tier::Selected)
					.collect();
				let charge = tiers
					.iter()
					.map(|tier| {
						config.charge
							* match tier {
								Tier::Selected => config.selected_charge_scale,
								Tier::Connected => config.connected_charge_scale,
								Tier::SecondHop | Tier::Context => config.context_charge_scale,
							}
					})
					.collect();
				Forces {
					link: Some(LinkForce::new(
						&edges,
						n,
						|i| {
							if touching[i] {
								config.focus_link_distance
							} else {
								config.focus_base_link_distance
							}
						},
						|i| {
							if touching[i] {
								config.focus_link_strength
							} else {
								config.focus_base_link_strength
							}
						},
					)),
					charge: Some(ManyBody::new(charge)),
					collide: Some(collide),
					center: None,
					x: Some(PositionForce::new(
						self.center.x,
						vec![config.focus_position_strength; n],
					)),
					y: Some(PositionForce::new(
						self.center.y,
						vec![config.focus_position_strength; n],
					)),
				}
			}
		};

		for (node, particle) in graph.nodes.iter().zip(sim.particles.iter_mut()) {
			if selection.contains(&node.id) {
				particle.pin_here();
			} else {
				particle.unpin();
			}
		}
	}

	/// Reconfigures for a new selection, then runs a damped burst of ticks
	/// so the layout settles before normal animation resumes.
	pub fn on_selection_change(&mut self, graph: &ResolvedGraph, selection: &Selection) {
		let previous = self.mode;
		self.configure(graph, selection);
		debug!(
			"jtbd-graph: selection of {} -> {:?} mode (was {:?})",
			selection.len(),
			self.mode,
			previous
		);
		let config = &self.config;
		let Some(sim) = self.simulation.as_mut() else {
			return;
		};
		sim.velocity_decay = config.settle_velocity_decay;
		sim.alpha_decay = config.settle_alpha_decay;
		sim.alpha = config.restart_alpha;
		sim.alpha_target = 0.0;
		sim.tick(config.settle_ticks);
		sim.velocity_decay = config.velocity_decay;
		sim.alpha_decay = config.alpha_decay;
		sim.alpha = config.restart_alpha;
		sim.restart();
	}

	/// Stops the layout and pins the pressed node where it is.
	pub fn drag_start(&mut self, index: usize, pointer: Point) -> Option<DragGesture> {
		let sim = self.simulation.as_mut()?;
		if index >= sim.particles.len() {
			return None;
		}
		sim.stop();
		sim.particles[index].pin_here();
		Some(DragGesture {
			index,
			start: pointer,
			travelled: 0.0,
		})
	}

	/// Pins the node under the pointer and lets its neighbors follow.
	pub fn drag_move(&mut self, gesture: &mut DragGesture, pointer: Point, world: Point) {
		gesture.travelled = gesture.travelled.max(gesture.start.distance(pointer));
		let Some(sim) = self.simulation.as_mut() else {
			return;
		};
		if let Some(particle) = sim.particles.get_mut(gesture.index) {
			particle.pin(world.x, world.y);
		}
		sim.alpha_target = self.config.drag_alpha_target;
		sim.restart();
	}

	/// Finishes a drag. A drag shorter than `click_threshold` is reported as
	/// a click and leaves pinning to the selection logic; otherwise the node
	/// stays pinned only if `keep_pinned`.
	pub fn drag_end(&mut self, gesture: DragGesture, click_threshold: f64, keep_pinned: bool) -> DragOutcome {
		let outcome = if gesture.travelled <= click_threshold {
			DragOutcome::Click(gesture.index)
		} else {
			DragOutcome::Moved(gesture.index)
		};
		let Some(sim) = self.simulation.as_mut() else {
			return outcome;
		};
		sim.alpha_target = 0.0;
		if let DragOutcome::Moved(index) = outcome {
			if let Some(particle) = sim.particles.get_mut(index) {
				if !keep_pinned {
					particle.unpin();
				}
			}
			sim.restart();
		}
		outcome
	}
}
