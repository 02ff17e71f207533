//! Node radii and trimmed edge endpoints.
//!
//! Both functions are total: bad input yields a default radius or no
//! geometry, never a panic.

use super::sizing::NodeSizes;
use super::types::{GraphNode, NodeKind};

/// Radius for unknown kinds and nodes without a usable metric.
pub const DEFAULT_RADIUS: f64 = 10.0;
/// Floor applied to supplied sizes.
pub const MIN_RADIUS: f64 = 4.0;

/// A point in graph (world) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate, growing downwards.
	pub y: f64,
}

impl Point {
	/// A point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// `None` unless both coordinates are finite.
	pub fn finite(x: f64, y: f64) -> Option<Self> {
		(x.is_finite() && y.is_finite()).then_some(Self { x, y })
	}

	/// Euclidean distance to `other`.
	pub fn distance(self, other: Point) -> f64 {
		(other.x - self.x).hypot(other.y - self.y)
	}
}

/// Position and radius of a node at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeGeometry {
	/// `None` until the simulation has placed the node.
	pub position: Option<Point>,
	/// Visible radius.
	pub radius: f64,
}

/// Start and end of a drawn link, already trimmed to the node outlines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgePoints {
	/// On the source node's outline.
	pub source: Point,
	/// Short of the target node's outline by the arrow clearance.
	pub target: Point,
}

impl EdgePoints {
	/// Unit vector from source to target.
	pub fn direction(&self) -> (f64, f64) {
		let len = self.source.distance(self.target);
		if len < f64::EPSILON {
			return (1.0, 0.0);
		}
		(
			(self.target.x - self.source.x) / len,
			(self.target.y - self.source.y) / len,
		)
	}
}

/// Visible radius of a node.
///
/// Uses the bucketed size when present, otherwise grows from the kind's
/// minimum with its raw metric and clamps to the kind's range.
pub fn node_radius(node: &GraphNode) -> f64 {
	let Some(range) = NodeSizes::for_kind(node.kind) else {
		return DEFAULT_RADIUS;
	};
	if let Some(size) = node.size.filter(|s| s.is_finite()) {
		return size.max(MIN_RADIUS);
	}
	let Some(metric) = node.size_metric().filter(|m| m.is_finite() && *m >= 0.0) else {
		return DEFAULT_RADIUS;
	};
	let grown = match node.kind {
		NodeKind::Goal => range.min + metric.sqrt() * 2.0,
		NodeKind::User => range.min + metric * 1.5,
		NodeKind::Service => range.min + metric.sqrt() * 2.5,
		NodeKind::Unknown => DEFAULT_RADIUS,
	};
	grown.clamp(range.min, range.max)
}

/// Endpoints of the straight segment between two node outlines.
///
/// The target end is pulled back by a further `clearance` to leave room for
/// an arrowhead. Returns `None` when either index is missing or out of
/// range, either node lacks a position, or the centers coincide.
pub fn edge_points(
	source: Option<usize>,
	target: Option<usize>,
	nodes: &[NodeGeometry],
	clearance: f64,
) -> Option<EdgePoints> {
	let source = nodes.get(source?)?;
	let target = nodes.get(target?)?;
	let (from, to) = (source.position?, target.position?);

	let (dx, dy) = (to.x - from.x, to.y - from.y);
	let dist = dx.hypot(dy);
	if dist == 0.0 || !dist.is_finite() {
		return None;
	}
	let (ux, uy) = (dx / dist, dy / dist);
	let back = target.radius + clearance;

	Some(EdgePoints {
		source: Point::new(from.x + ux * source.radius, from.y + uy * source.radius),
		target: Point::new(to.x - ux * back, to.y - uy * back),
	})
}
