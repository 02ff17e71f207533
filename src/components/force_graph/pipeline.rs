//! Snapshot updates: diff, fade, then a delayed full rebuild.
//!
//! When a new snapshot arrives, elements it no longer contains start fading
//! and a rebuild is scheduled for after the fade. A later snapshot replaces
//! the pending rebuild rather than queueing behind it. The rebuild tears the
//! whole scene down, builds a new one, keeps the old view transform, and
//! installs a fresh simulation.

use std::collections::HashSet;

use log::{debug, info};

use super::config::InteractionConfig;
use super::controller::SimulationController;
use super::graph::ResolvedGraph;
use super::scene::Scene;
use super::selection::Selection;
use super::types::{GraphData, LinkKey};

/// Which ids and link keys the next snapshot drops.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SnapshotDiff {
	/// Indices into the current scene's nodes.
	pub removed_nodes: HashSet<usize>,
	/// Indices into the current scene's links.
	pub removed_links: HashSet<usize>,
}

impl SnapshotDiff {
	pub fn between(current: &ResolvedGraph, next: &GraphData) -> Self {
		let node_ids: HashSet<&str> = next.nodes.iter().map(|n| n.id.as_str()).collect();
		let link_keys: HashSet<LinkKey> = next.links.iter().map(|l| l.key()).collect();
		Self {
			removed_nodes: current
				.nodes
				.iter()
				.enumerate()
				.filter(|(_, n)| !node_ids.contains(n.id.as_str()))
				.map(|(i, _)| i)
				.collect(),
			removed_links: current
				.links
				.iter()
				.enumerate()
				.filter(|(_, l)| !link_keys.contains(&l.link.key()))
				.map(|(i, _)| i)
				.collect(),
		}
	}
}

/// A rebuild waiting for its delay to pass. Dropping it cancels it.
#[derive(Clone, Debug)]
pub struct ScheduledRedraw {
	pub due_ms: f64,
	pub generation: u64,
	snapshot: GraphData,
}

/// What [`RenderPipeline::submit`] decided.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RedrawPlan {
	/// Nothing on screen and nothing to draw.
	Ignored,
	/// Built right away; there was nothing to fade.
	Immediate(Rebuilt),
	Scheduled { due_ms: f64 },
}

/// Result of a completed rebuild.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rebuilt {
	/// Selected ids were dropped because their nodes are gone.
	pub selection_pruned: bool,
}

#[derive(Debug)]
pub struct RenderPipeline {
	config: InteractionConfig,
	scene: Option<Scene>,
	pending: Option<ScheduledRedraw>,
	generation: u64,
}

impl RenderPipeline {
	pub fn new(config: InteractionConfig) -> Self {
		Self {
			config,
			scene: None,
			pending: None,
			generation: 0,
		}
	}

	pub fn scene(&self) -> Option<&Scene> {
		self.scene.as_ref()
	}

	pub fn scene_mut(&mut self) -> Option<&mut Scene> {
		self.scene.as_mut()
	}

	#[cfg(test)]
	pub fn pending(&self) -> Option<&ScheduledRedraw> {
		self.pending.as_ref()
	}

	/// Accepts a new snapshot.
	pub fn submit(
		&mut self,
		data: GraphData,
		now_ms: f64,
		controller: &mut SimulationController,
		selection: &mut Selection,
	) -> RedrawPlan {
		let Some(scene) = self.scene.as_mut() else {
			if data.is_empty() {
				return RedrawPlan::Ignored;
			}
			self.pending = None;
			return RedrawPlan::Immediate(self.rebuild(data, controller, selection));
		};

		let diff = SnapshotDiff::between(&scene.graph, &data);
		scene.mark_fading(diff.removed_nodes, diff.removed_links, now_ms);

		self.generation += 1;
		let due_ms = now_ms + self.config.redraw_delay_ms;
		if let Some(old) = self.pending.replace(ScheduledRedraw {
			due_ms,
			generation: self.generation,
			snapshot: data,
		}) {
			debug!(
				"jtbd-graph: redraw {} superseded by {}",
				old.generation, self.generation
			);
		}
		RedrawPlan::Scheduled { due_ms }
	}

	/// Runs the pending rebuild if its delay has passed.
	pub fn poll(
		&mut self,
		now_ms: f64,
		controller: &mut SimulationController,
		selection: &mut Selection,
	) -> Option<Rebuilt> {
		if self.pending.as_ref()?.due_ms > now_ms {
			return None;
		}
		let pending = self.pending.take()?;
		Some(self.rebuild(pending.snapshot, controller, selection))
	}

	fn rebuild(
		&mut self,
		data: GraphData,
		controller: &mut SimulationController,
		selection: &mut Selection,
	) -> Rebuilt {
		let transform = self.scene.take().map(|s| s.transform).unwrap_or_default();
		controller.clear();

		if data.is_empty() {
			let pruned = selection.clear();
			debug!("jtbd-graph: snapshot empty, scene cleared");
			return Rebuilt {
				selection_pruned: pruned,
			};
		}

		let graph = ResolvedGraph::from_data(&data);
		let pruned = selection.retain(|id| graph.contains(id));
		let mut scene = Scene::build(graph);
		scene.transform = transform;
		controller.install(&scene.graph, selection);
		info!(
			"jtbd-graph: drew {} nodes, {} links",
			scene.nodes.len(),
			scene.links.len()
		);
		self.scene = Some(scene);
		Rebuilt {
			selection_pruned: pruned,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::config::ForceConfig;
	use crate::components::force_graph::geometry::Point;
	use crate::components::force_graph::types::{GraphLink, GraphNode, LinkType, NodeKind};

	fn data(ids: &[&str], links: &[(&str, &str)]) -> GraphData {
		GraphData {
			nodes: ids
				.iter()
				.map(|id| GraphNode::new(*id, NodeKind::Goal, *id))
				.collect(),
			links: links
				.iter()
				.map(|(s, t)| GraphLink::new(*s, *t, LinkType::DependsOn))
				.collect(),
		}
	}

	fn parts() -> (RenderPipeline, SimulationController, Selection) {
		(
			RenderPipeline::new(InteractionConfig::default()),
			SimulationController::new(ForceConfig::default(), 800.0, 600.0),
			Selection::new(),
		)
	}

	fn settle(controller: &mut SimulationController) -> Vec<(f64, f64)> {
		while controller.step() {}
		controller.particles().iter().map(|p| (p.x, p.y)).collect()
	}

	#[test]
	fn empty_first_snapshot_is_ignored() {
		let (mut pipeline, mut controller, mut selection) = parts();
		let plan = pipeline.submit(GraphData::default(), 0.0, &mut controller, &mut selection);
		assert_eq!(plan, RedrawPlan::Ignored);
		assert!(pipeline.scene().is_none());
		assert!(controller.simulation().is_none());
	}

	#[test]
	fn first_snapshot_builds_immediately() {
		let (mut pipeline, mut controller, mut selection) = parts();
		let plan = pipeline.submit(data(&["a", "b"], &[("a", "b")]), 0.0, &mut controller, &mut selection);
		assert!(matches!(plan, RedrawPlan::Immediate(_)));
		assert_eq!(pipeline.scene().unwrap().nodes.len(), 2);
		assert_eq!(controller.particles().len(), 2);
	}

	#[test]
	fn removals_fade_then_rebuild_after_delay() {
		let (mut pipeline, mut controller, mut selection) = parts();
		pipeline.submit(data(&["a", "b", "c"], &[("a", "b"), ("b", "c")]), 0.0, &mut controller, &mut selection);

		let plan = pipeline.submit(data(&["a", "b"], &[("a", "b")]), 1000.0, &mut controller, &mut selection);
		let delay = InteractionConfig::default().redraw_delay_ms;
		assert_eq!(plan, RedrawPlan::Scheduled { due_ms: 1000.0 + delay });
		let scene = pipeline.scene().unwrap();
		assert!(scene.is_node_fading(2));
		assert!(scene.is_link_fading(1));
		assert!(!scene.is_node_fading(0));

		assert!(pipeline.poll(1000.0 + delay - 1.0, &mut controller, &mut selection).is_none());
		assert_eq!(pipeline.scene().unwrap().nodes.len(), 3);
		assert!(pipeline.poll(1000.0 + delay, &mut controller, &mut selection).is_some());
		let scene = pipeline.scene().unwrap();
		assert_eq!(scene.nodes.len(), 2);
		assert!(!scene.is_node_fading(0));
		assert!(pipeline.pending().is_none());
	}

	#[test]
	fn readded_element_stops_fading() {
		let (mut pipeline, mut controller, mut selection) = parts();
		let fade_ms = InteractionConfig::default().fade_ms;
		pipeline.submit(data(&["a", "b", "c"], &[("b", "c")]), 0.0, &mut controller, &mut selection);
		pipeline.submit(data(&["a", "b"], &[]), 10.0, &mut controller, &mut selection);
		assert!(pipeline.scene().unwrap().is_node_fading(2));

		pipeline.submit(data(&["a", "b", "c"], &[("b", "c")]), 20.0, &mut controller, &mut selection);
		let scene = pipeline.scene().unwrap();
		assert!(!scene.is_node_fading(2));
		assert!(!scene.is_link_fading(0));
		assert_eq!(scene.fade_factor(220.0, fade_ms), 1.0);
	}

	#[test]
	fn fade_keeps_its_start_across_snapshots() {
		let (mut pipeline, mut controller, mut selection) = parts();
		let fade_ms = InteractionConfig::default().fade_ms;
		pipeline.submit(data(&["a", "b", "c"], &[]), 0.0, &mut controller, &mut selection);
		pipeline.submit(data(&["a", "b"], &[]), 0.0, &mut controller, &mut selection);
		pipeline.submit(data(&["a"], &[]), fade_ms / 2.0, &mut controller, &mut selection);
		let scene = pipeline.scene().unwrap();
		assert!(scene.is_node_fading(1));
		assert!(scene.is_node_fading(2));
		assert_eq!(scene.fade_factor(fade_ms, fade_ms), 0.0);
	}

	#[test]
	fn newer_snapshot_supersedes_pending_redraw() {
		let (mut pipeline, mut controller, mut selection) = parts();
		pipeline.submit(data(&["a"], &[]), 0.0, &mut controller, &mut selection);
		pipeline.submit(data(&["a", "b"], &[]), 100.0, &mut controller, &mut selection);
		let first = pipeline.pending().unwrap().generation;
		pipeline.submit(data(&["a", "b", "c"], &[]), 200.0, &mut controller, &mut selection);
		let pending = pipeline.pending().unwrap();
		assert!(pending.generation > first);
		assert_eq!(pending.due_ms, 200.0 + InteractionConfig::default().redraw_delay_ms);

		// the superseded deadline passes without a rebuild
		assert!(pipeline.poll(100.0 + 260.0, &mut controller, &mut selection).is_none());
		pipeline.poll(1000.0, &mut controller, &mut selection);
		assert_eq!(pipeline.scene().unwrap().nodes.len(), 3);
	}

	#[test]
	fn rebuild_keeps_view_transform() {
		let (mut pipeline, mut controller, mut selection) = parts();
		pipeline.submit(data(&["a", "b"], &[]), 0.0, &mut controller, &mut selection);
		let scene = pipeline.scene_mut().unwrap();
		scene.transform.zoom_at(Point::new(10.0, 10.0), 2.5);
		scene.transform.x += 40.0;
		let before = scene.transform;

		pipeline.submit(data(&["a"], &[]), 0.0, &mut controller, &mut selection);
		pipeline.poll(10_000.0, &mut controller, &mut selection);
		assert_eq!(pipeline.scene().unwrap().transform, before);
	}

	#[test]
	fn rebuild_prunes_missing_selection() {
		let (mut pipeline, mut controller, mut selection) = parts();
		pipeline.submit(data(&["a", "b"], &[]), 0.0, &mut controller, &mut selection);
		selection.click("b", false);
		pipeline.submit(data(&["a"], &[]), 0.0, &mut controller, &mut selection);
		let rebuilt = pipeline.poll(10_000.0, &mut controller, &mut selection).unwrap();
		assert!(rebuilt.selection_pruned);
		assert!(selection.is_empty());
	}

	#[test]
	fn emptied_snapshot_clears_everything() {
		let (mut pipeline, mut controller, mut selection) = parts();
		pipeline.submit(data(&["a", "b"], &[("a", "b")]), 0.0, &mut controller, &mut selection);
		pipeline.submit(GraphData::default(), 0.0, &mut controller, &mut selection);
		assert_eq!(pipeline.scene().unwrap().nodes.len(), 2);
		pipeline.poll(10_000.0, &mut controller, &mut selection);
		assert!(pipeline.scene().is_none());
		assert!(controller.simulation().is_none());
	}

	#[test]
	fn same_snapshot_twice_lays_out_identically() {
		let (mut pipeline, mut controller, mut selection) = parts();
		let snapshot = data(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("c", "a"), ("c", "d")]);
		selection.click("b", false);

		pipeline.submit(snapshot.clone(), 0.0, &mut controller, &mut selection);
		let first = settle(&mut controller);

		pipeline.submit(snapshot, 0.0, &mut controller, &mut selection);
		pipeline.poll(10_000.0, &mut controller, &mut selection);
		let second = settle(&mut controller);

		assert_eq!(first, second);
		let scene = pipeline.scene().unwrap();
		assert_eq!(scene.nodes.len(), 4);
		assert_eq!(scene.links.len(), 4);
		assert_eq!(selection.to_vec(), ["b"]);
	}
}
