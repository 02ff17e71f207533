//! Metric-to-radius mapping.
//!
//! Sizes are bucketed rather than continuous so a single outlier metric
//! cannot dominate the visual scale.

use std::collections::HashMap;

use super::types::{GraphNode, NodeKind};

/// Radius range for one node kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeRange {
	/// Smallest radius.
	pub min: f64,
	/// Largest radius.
	pub max: f64,
}

/// Radius ranges per node kind.
pub struct NodeSizes;

impl NodeSizes {
	/// Goals, sized by complexity.
	pub const GOAL: SizeRange = SizeRange { min: 8.0, max: 20.0 };
	/// Users, sized by importance.
	pub const USER: SizeRange = SizeRange { min: 10.0, max: 22.0 };
	/// Services, sized by dependants.
	pub const SERVICE: SizeRange = SizeRange { min: 6.0, max: 16.0 };

	/// `None` for kinds without a size metric.
	pub fn for_kind(kind: NodeKind) -> Option<SizeRange> {
		match kind {
			NodeKind::Goal => Some(Self::GOAL),
			NodeKind::User => Some(Self::USER),
			NodeKind::Service => Some(Self::SERVICE),
			NodeKind::Unknown => None,
		}
	}
}

/// Number of distinct sizes per kind.
pub const DEFAULT_BUCKETS: usize = 4;

/// Maps `value` onto one of `bucket_count` evenly spaced sizes in `[min, max]`.
///
/// Missing values and empty populations map to `min`; a population with no
/// spread maps to the midpoint. Fewer than two buckets collapses to `min`.
pub fn bucketed_size(
	value: Option<f64>,
	all_values: &[f64],
	min: f64,
	max: f64,
	bucket_count: usize,
) -> f64 {
	let Some(value) = value.filter(|v| v.is_finite()) else {
		return min;
	};
	let finite = all_values.iter().copied().filter(|v| v.is_finite());
	let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
		(lo.min(v), hi.max(v))
	});
	if lo > hi {
		return min;
	}
	if lo == hi {
		return (min + max) / 2.0;
	}
	if bucket_count < 2 {
		return min;
	}

	let width = (hi - lo) / bucket_count as f64;
	let raw = ((value - lo) / width).floor();
	let index = raw.clamp(0.0, (bucket_count - 1) as f64);
	min + (max - min) * index / (bucket_count - 1) as f64
}

/// Fills in [`GraphNode::size`] for every node that doesn't carry one,
/// bucketing each kind against the metric values of its own kind.
pub fn assign_sizes(nodes: &mut [GraphNode]) {
	let mut populations: HashMap<NodeKind, Vec<f64>> = HashMap::new();
	for node in nodes.iter() {
		if let Some(value) = node.size_metric() {
			populations.entry(node.kind).or_default().push(value);
		}
	}

	for node in nodes.iter_mut() {
		if node.size.is_some() {
			continue;
		}
		let Some(range) = NodeSizes::for_kind(node.kind) else {
			continue;
		};
		let values = populations.get(&node.kind).map(Vec::as_slice).unwrap_or(&[]);
		node.size = Some(bucketed_size(
			node.size_metric(),
			values,
			range.min,
			range.max,
			DEFAULT_BUCKETS,
		));
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn degenerate_inputs() {
		assert_eq!(bucketed_size(None, &[1.0, 2.0], 4.0, 12.0, 4), 4.0);
		assert_eq!(bucketed_size(Some(3.0), &[], 4.0, 12.0, 4), 4.0);
		assert_eq!(bucketed_size(Some(3.0), &[3.0, 3.0, 3.0], 4.0, 12.0, 4), 8.0);
		assert_eq!(bucketed_size(Some(3.0), &[1.0, 5.0], 4.0, 12.0, 1), 4.0);
	}

	#[test]
	fn sizes_step_through_buckets() {
		let all = [0.0, 10.0, 20.0, 30.0, 40.0];
		// width 10: buckets [0,10) [10,20) [20,30) [30,40]
		assert_eq!(bucketed_size(Some(0.0), &all, 0.0, 30.0, 4), 0.0);
		assert_eq!(bucketed_size(Some(12.0), &all, 0.0, 30.0, 4), 10.0);
		assert_eq!(bucketed_size(Some(25.0), &all, 0.0, 30.0, 4), 20.0);
		assert_eq!(bucketed_size(Some(40.0), &all, 0.0, 30.0, 4), 30.0);
	}

	#[test]
	fn out_of_population_values_clamp() {
		let all = [10.0, 20.0];
		assert_eq!(bucketed_size(Some(-50.0), &all, 2.0, 8.0, 4), 2.0);
		assert_eq!(bucketed_size(Some(900.0), &all, 2.0, 8.0, 4), 8.0);
	}

	#[test]
	fn assign_sizes_per_kind() {
		let mut goal_low = GraphNode::new("g1", NodeKind::Goal, "a");
		goal_low.complexity = Some(1.0);
		let mut goal_high = GraphNode::new("g2", NodeKind::Goal, "b");
		goal_high.complexity = Some(9.0);
		let mut service = GraphNode::new("s", NodeKind::Service, "c");
		service.dependants = Some(100.0);
		let mut preset = GraphNode::new("u", NodeKind::User, "d");
		preset.size = Some(17.0);
		let unknown = GraphNode::new("x", NodeKind::Unknown, "e");

		let mut nodes = vec![goal_low, goal_high, service, preset, unknown];
		assign_sizes(&mut nodes);

		assert_eq!(nodes[0].size, Some(NodeSizes::GOAL.min));
		assert_eq!(nodes[1].size, Some(NodeSizes::GOAL.max));
		// a lone service has no spread
		let mid = (NodeSizes::SERVICE.min + NodeSizes::SERVICE.max) / 2.0;
		assert_eq!(nodes[2].size, Some(mid));
		assert_eq!(nodes[3].size, Some(17.0));
		assert_eq!(nodes[4].size, None);
	}

	proptest! {
		#[test]
		fn result_stays_in_range(
			value in -1000.0f64..1000.0,
			all in prop::collection::vec(-1000.0f64..1000.0, 0..20),
			buckets in 1usize..8,
		) {
			let size = bucketed_size(Some(value), &all, 5.0, 25.0, buckets);
			prop_assert!((5.0..=25.0).contains(&size));
		}
	}
}
