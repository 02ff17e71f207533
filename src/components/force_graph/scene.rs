//! Visual elements built from a resolved snapshot.
//!
//! A [`Scene`] is rebuilt from scratch on every redraw. It holds one visual
//! per node and per link, the arrowhead markers, the view transform and the
//! per-element emphasis derived from the selection.

use std::collections::HashSet;

use super::geometry::{EdgePoints, NodeGeometry, Point, edge_points};
use super::graph::{ResolvedGraph, Tier};
use super::selection::Selection;
use super::simulation::Particle;
use super::style::{Color, KindStyle, kind_style, link_stroke, link_width};
use super::types::LinkType;

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

impl ViewTransform {
	pub fn screen_to_graph(&self, screen: Point) -> Point {
		Point::new((screen.x - self.x) / self.k, (screen.y - self.y) / self.k)
	}

	/// Zooms by `factor` keeping `anchor` (screen space) fixed.
	pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
		let k = (self.k * factor).clamp(0.1, 10.0);
		let ratio = k / self.k;
		self.x = anchor.x - (anchor.x - self.x) * ratio;
		self.y = anchor.y - (anchor.y - self.y) * ratio;
		self.k = k;
	}
}

/// Arrowhead definition shared by every link of one type.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
	pub link_type: LinkType,
	/// Length of the arrowhead along the link.
	pub length: f64,
	/// Full width at the base.
	pub width: f64,
}

/// Drawable node.
#[derive(Clone, Debug)]
pub struct NodeVisual {
	pub style: &'static KindStyle,
	pub fill: Color,
	pub radius: f64,
	/// Radius of the invisible clickable area.
	pub hit_radius: f64,
	pub label: String,
	pub label_offset: f64,
	pub badge: bool,
}

/// Drawable link.
#[derive(Clone, Debug)]
pub struct LinkVisual {
	pub source: Option<usize>,
	pub target: Option<usize>,
	/// Stroke and arrowhead color.
	pub color: Color,
	pub width: f64,
	/// Index into [`Scene::markers`].
	pub marker: usize,
}

/// How strongly an element is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Emphasis {
	pub opacity: f64,
	/// Selected nodes get an outline.
	pub outline: bool,
	/// Revealed second-tier links are dashed.
	pub dashed: bool,
}

impl Emphasis {
	const NORMAL: Emphasis = Emphasis {
		opacity: 1.0,
		outline: false,
		dashed: false,
	};
	const DIMMED: Emphasis = Emphasis {
		opacity: 0.15,
		outline: false,
		dashed: false,
	};
	const REVEALED: Emphasis = Emphasis {
		opacity: 0.5,
		outline: false,
		dashed: true,
	};
}

const LINK_OPACITY: f64 = 0.6;
const LINK_DIMMED: f64 = 0.08;
const ARROW_LENGTH: f64 = 6.0;

/// Positions for one frame.
#[derive(Clone, Debug, Default)]
pub struct Frame {
	pub nodes: Vec<NodeGeometry>,
	pub edges: Vec<Option<EdgePoints>>,
}

/// Everything drawn for one snapshot.
#[derive(Clone, Debug, Default)]
pub struct Scene {
	pub graph: ResolvedGraph,
	pub nodes: Vec<NodeVisual>,
	pub links: Vec<LinkVisual>,
	pub markers: Vec<Marker>,
	pub transform: ViewTransform,
	node_emphasis: Vec<Emphasis>,
	link_emphasis: Vec<Emphasis>,
	fading_nodes: HashSet<usize>,
	fading_links: HashSet<usize>,
	fade_started_ms: Option<f64>,
}

impl Scene {
	pub fn build(graph: ResolvedGraph) -> Self {
		let nodes: Vec<NodeVisual> = graph
			.nodes
			.iter()
			.zip(&graph.radii)
			.map(|(node, &radius)| {
				let style = kind_style(node.kind);
				NodeVisual {
					style,
					fill: style.fill.color_for(node),
					radius,
					hit_radius: radius * style.hit_multiplier,
					label: style.label_text(&node.name),
					label_offset: style.label_offset(radius),
					badge: (style.extra_icon)(node),
				}
			})
			.collect();

		// Markers first, so every link can point at its own.
		let mut markers: Vec<Marker> = Vec::new();
		for link in &graph.links {
			let link_type = link.link.link_type;
			if !markers.iter().any(|m| m.link_type == link_type) {
				markers.push(Marker {
					link_type,
					length: ARROW_LENGTH,
					width: ARROW_LENGTH * 0.8,
				});
			}
		}

		let links = graph
			.links
			.iter()
			.map(|link| {
				let link_type = link.link.link_type;
				LinkVisual {
					source: link.source,
					target: link.target,
					color: link_stroke(&link.link),
					width: link_width(link.link.demand),
					marker: markers
						.iter()
						.position(|m| m.link_type == link_type)
						.unwrap_or_default(),
				}
			})
			.collect();

		let mut scene = Self {
			node_emphasis: vec![Emphasis::NORMAL; nodes.len()],
			link_emphasis: Vec::new(),
			graph,
			nodes,
			links,
			markers,
			..Default::default()
		};
		scene.restyle(&Selection::new(), false);
		scene
	}

	/// Recomputes emphasis for a selection. `reveal` shows the second tier.
	pub fn restyle(&mut self, selection: &Selection, reveal: bool) {
		let tiers = self.graph.tiers(selection);
		let active = !selection.is_empty();

		self.node_emphasis = tiers
			.iter()
			.map(|tier| match (active, tier) {
				(false, _) => Emphasis::NORMAL,
				(true, Tier::Selected) => Emphasis {
					outline: true,
					..Emphasis::NORMAL
				},
				(true, Tier::Connected) => Emphasis::NORMAL,
				(true, Tier::SecondHop) if reveal => Emphasis {
					dashed: false,
					..Emphasis::REVEALED
				},
				(true, _) => Emphasis::DIMMED,
			})
			.collect();

		let tier_of = |index: Option<usize>| index.and_then(|i| tiers.get(i).copied());
		self.link_emphasis = self
			.links
			.iter()
			.map(|link| {
				let base = Emphasis {
					opacity: LINK_OPACITY,
					..Emphasis::NORMAL
				};
				if !active {
					return base;
				}
				let ends = (tier_of(link.source), tier_of(link.target));
				match ends {
					(Some(Tier::Selected), _) | (_, Some(Tier::Selected)) => Emphasis::NORMAL,
					(Some(Tier::Connected), Some(Tier::Connected)) => base,
					(Some(Tier::Connected), Some(Tier::SecondHop))
					| (Some(Tier::SecondHop), Some(Tier::Connected))
						if reveal =>
					{
						Emphasis {
							opacity: Emphasis::REVEALED.opacity * 0.8,
							..Emphasis::REVEALED
						}
					}
					_ => Emphasis {
						opacity: LINK_DIMMED,
						..Emphasis::NORMAL
					},
				}
			})
			.collect();
	}

	pub fn node_emphasis(&self, index: usize) -> Emphasis {
		self.node_emphasis.get(index).copied().unwrap_or(Emphasis::NORMAL)
	}

	pub fn link_emphasis(&self, index: usize) -> Emphasis {
		self.link_emphasis.get(index).copied().unwrap_or(Emphasis::NORMAL)
	}

	/// Replaces the set of elements fading out with those the newest
	/// snapshot drops. A fade already under way keeps its start time.
	pub fn mark_fading(&mut self, nodes: HashSet<usize>, links: HashSet<usize>, now_ms: f64) {
		self.fading_nodes = nodes;
		self.fading_links = links;
		if self.fading_nodes.is_empty() && self.fading_links.is_empty() {
			self.fade_started_ms = None;
		} else {
			self.fade_started_ms.get_or_insert(now_ms);
		}
	}

	pub fn is_node_fading(&self, index: usize) -> bool {
		self.fading_nodes.contains(&index)
	}

	pub fn is_link_fading(&self, index: usize) -> bool {
		self.fading_links.contains(&index)
			|| self.links.get(index).is_some_and(|l| {
				l.source.is_some_and(|s| self.fading_nodes.contains(&s))
					|| l.target.is_some_and(|t| self.fading_nodes.contains(&t))
			})
	}

	/// Opacity multiplier for fading elements at `now_ms`.
	pub fn fade_factor(&self, now_ms: f64, fade_ms: f64) -> f64 {
		let Some(start) = self.fade_started_ms else {
			return 1.0;
		};
		if fade_ms <= 0.0 {
			return 0.0;
		}
		(1.0 - (now_ms - start) / fade_ms).clamp(0.0, 1.0)
	}

	/// Node and edge geometry for the current particle positions.
	pub fn frame(&self, particles: &[Particle], clearance: f64) -> Frame {
		let nodes: Vec<NodeGeometry> = self
			.nodes
			.iter()
			.enumerate()
			.map(|(i, visual)| NodeGeometry {
				position: particles.get(i).and_then(Particle::position),
				radius: visual.radius,
			})
			.collect();
		let edges = self
			.links
			.iter()
			.map(|link| edge_points(link.source, link.target, &nodes, clearance))
			.collect();
		Frame { nodes, edges }
	}

	/// The node whose hit area contains `world`, preferring the closest.
	pub fn node_at(&self, world: Point, particles: &[Particle]) -> Option<usize> {
		let mut best: Option<(usize, f64)> = None;
		for (i, visual) in self.nodes.iter().enumerate() {
			let Some(position) = particles.get(i).and_then(Particle::position) else {
				continue;
			};
			let d = position.distance(world);
			if d <= visual.hit_radius && best.is_none_or(|(_, bd)| d < bd) {
				best = Some((i, d));
			}
		}
		best.map(|(i, _)| i)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::style::LINK_WIDTH;
	use crate::components::force_graph::types::{Demand, GraphData, GraphLink, GraphNode, NodeKind};

	fn scene() -> Scene {
		let data = GraphData {
			nodes: vec![
				GraphNode::new("u", NodeKind::User, "Clerk"),
				GraphNode::new("g", NodeKind::Goal, "File an insurance claim online"),
				GraphNode::new("s", NodeKind::Service, "Claims"),
				GraphNode::new("t", NodeKind::Service, "Ledger"),
			],
			links: vec![
				GraphLink::new("u", "g", LinkType::Does),
				GraphLink::new("g", "s", LinkType::DependsOn),
				GraphLink::new("s", "t", LinkType::DependsOn),
				GraphLink::new("s", "nowhere", LinkType::Reads),
			],
		};
		Scene::build(ResolvedGraph::from_data(&data))
	}

	fn particles_at(points: &[(f64, f64)]) -> Vec<Particle> {
		points
			.iter()
			.map(|&(x, y)| Particle {
				x,
				y,
				..Default::default()
			})
			.collect()
	}

	#[test]
	fn one_marker_per_link_type() {
		let scene = scene();
		assert_eq!(scene.markers.len(), 3);
		assert_eq!(scene.links[1].marker, scene.links[2].marker);
		let marker = &scene.markers[scene.links[0].marker];
		assert_eq!(marker.link_type, LinkType::Does);
	}

	#[test]
	fn demand_and_nps_style_links() {
		let mut does = GraphLink::new("u", "g", LinkType::Does);
		does.demand = Some(Demand::High);
		does.nps = Some(-100.0);
		let data = GraphData {
			nodes: vec![
				GraphNode::new("u", NodeKind::User, "Clerk"),
				GraphNode::new("g", NodeKind::Goal, "Claim"),
			],
			links: vec![does, GraphLink::new("g", "u", LinkType::Reads)],
		};
		let scene = Scene::build(ResolvedGraph::from_data(&data));
		assert!(scene.links[0].width > LINK_WIDTH);
		assert_ne!(scene.links[0].color, scene.links[1].color);
		assert_eq!(scene.links[1].width, LINK_WIDTH);
	}

	#[test]
	fn visuals_follow_kind_table() {
		let scene = scene();
		let user = &scene.nodes[0];
		assert_eq!(user.hit_radius, user.radius * kind_style(NodeKind::User).hit_multiplier);
		assert!(user.hit_radius > user.radius);
		assert!(scene.nodes[1].label.ends_with('…'));
	}

	#[test]
	fn selection_dims_unrelated_nodes() {
		let mut scene = scene();
		scene.restyle(&Selection::from_ids(["u"]), false);
		assert!(scene.node_emphasis(0).outline);
		assert_eq!(scene.node_emphasis(1), Emphasis::NORMAL);
		assert_eq!(scene.node_emphasis(2), Emphasis::DIMMED);
		assert_eq!(scene.link_emphasis(0).opacity, 1.0);
		assert!(scene.link_emphasis(1).opacity < LINK_OPACITY);
	}

	#[test]
	fn reveal_shows_second_tier_dashed() {
		let mut scene = scene();
		let selection = Selection::from_ids(["u"]);
		scene.restyle(&selection, true);
		let node = scene.node_emphasis(2);
		assert!(node.opacity > Emphasis::DIMMED.opacity && node.opacity < 1.0);
		assert!(scene.link_emphasis(1).dashed);
		assert_eq!(scene.node_emphasis(3), Emphasis::DIMMED);

		scene.restyle(&selection, false);
		assert!(!scene.link_emphasis(1).dashed);
	}

	#[test]
	fn frame_skips_dangling_links() {
		let scene = scene();
		let particles = particles_at(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (200.0, 100.0)]);
		let frame = scene.frame(&particles, 3.0);
		assert_eq!(frame.edges.len(), 4);
		assert!(frame.edges[..3].iter().all(Option::is_some));
		assert!(frame.edges[3].is_none());
	}

	#[test]
	fn hit_area_is_larger_than_glyph() {
		let scene = scene();
		let particles = particles_at(&[(0.0, 0.0), (300.0, 0.0), (600.0, 0.0), (900.0, 0.0)]);
		let r = scene.nodes[0].radius;
		assert_eq!(scene.node_at(Point::new(r * 1.5, 0.0), &particles), Some(0));
		assert_eq!(scene.node_at(Point::new(150.0, 0.0), &particles), None);
	}

	#[test]
	fn fade_runs_down_to_zero() {
		let mut scene = scene();
		assert_eq!(scene.fade_factor(0.0, 200.0), 1.0);
		scene.mark_fading(HashSet::from([2]), HashSet::new(), 1000.0);
		assert!(scene.is_node_fading(2));
		assert!(scene.is_link_fading(1));
		assert!(!scene.is_link_fading(0));
		assert_eq!(scene.fade_factor(1100.0, 200.0), 0.5);
		assert_eq!(scene.fade_factor(1300.0, 200.0), 0.0);
	}

	#[test]
	fn zoom_keeps_anchor_fixed() {
		let mut t = ViewTransform::default();
		let anchor = Point::new(200.0, 100.0);
		let before = t.screen_to_graph(anchor);
		t.zoom_at(anchor, 2.0);
		assert_eq!(t.screen_to_graph(anchor), before);
		t.zoom_at(anchor, 1000.0);
		assert_eq!(t.k, 10.0);
	}
}
