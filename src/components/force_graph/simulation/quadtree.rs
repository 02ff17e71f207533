//! Region quadtree over particle positions.
//!
//! Each cell carries the aggregates the forces need: total charge strength
//! with its weighted centroid (Barnes-Hut), and the largest radius inside it
//! (collision pruning).

const MAX_DEPTH: usize = 24;

#[derive(Clone, Copy, Debug)]
pub(super) struct Bounds {
	pub(super) x0: f64,
	pub(super) y0: f64,
	pub(super) size: f64,
}

impl Bounds {
	fn quadrant(&self, index: usize) -> Bounds {
		let half = self.size / 2.0;
		Bounds {
			x0: if index & 1 == 0 { self.x0 } else { self.x0 + half },
			y0: if index & 2 == 0 { self.y0 } else { self.y0 + half },
			size: half,
		}
	}

	fn quadrant_of(&self, x: f64, y: f64) -> usize {
		let half = self.size / 2.0;
		let right = usize::from(x >= self.x0 + half);
		let below = usize::from(y >= self.y0 + half);
		right | (below << 1)
	}

	/// Whether the square lies entirely outside `[x - r, x + r] x [y - r, y + r]`.
	pub(super) fn misses(&self, x: f64, y: f64, r: f64) -> bool {
		self.x0 > x + r || self.x0 + self.size < x - r || self.y0 > y + r || self.y0 + self.size < y - r
	}
}

#[derive(Debug)]
pub(super) struct QuadNode {
	pub(super) bounds: Bounds,
	/// Particle indices. Only populated on leaves.
	pub(super) indices: Vec<usize>,
	pub(super) children: [Option<Box<QuadNode>>; 4],
	/// Sum of charge strengths in this cell.
	pub(super) strength: f64,
	/// Centroid weighted by absolute strength.
	pub(super) cx: f64,
	pub(super) cy: f64,
	pub(super) max_radius: f64,
}

impl QuadNode {
	/// Builds a tree over `points`; `strengths` and `radii` are indexed alike.
	/// Points with non-finite coordinates are left out.
	pub(super) fn build(points: &[(f64, f64)], strengths: &[f64], radii: &[f64]) -> Option<Self> {
		let indices: Vec<usize> = (0..points.len())
			.filter(|&i| points[i].0.is_finite() && points[i].1.is_finite())
			.collect();
		if indices.is_empty() {
			return None;
		}

		let (mut x0, mut y0, mut x1, mut y1) = (
			f64::INFINITY,
			f64::INFINITY,
			f64::NEG_INFINITY,
			f64::NEG_INFINITY,
		);
		for &i in &indices {
			let (x, y) = points[i];
			x0 = x0.min(x);
			y0 = y0.min(y);
			x1 = x1.max(x);
			y1 = y1.max(y);
		}
		let size = (x1 - x0).max(y1 - y0).max(1.0) * 1.0001;
		let bounds = Bounds { x0, y0, size };

		Some(Self::build_cell(points, strengths, radii, indices, bounds, 0))
	}

	fn build_cell(
		points: &[(f64, f64)],
		strengths: &[f64],
		radii: &[f64],
		indices: Vec<usize>,
		bounds: Bounds,
		depth: usize,
	) -> Self {
		let mut node = QuadNode {
			bounds,
			indices: Vec::new(),
			children: [None, None, None, None],
			strength: 0.0,
			cx: 0.0,
			cy: 0.0,
			max_radius: 0.0,
		};

		if indices.len() <= 1 || depth >= MAX_DEPTH {
			node.aggregate_leaf(points, strengths, radii, &indices);
			node.indices = indices;
			return node;
		}

		let mut buckets: [Vec<usize>; 4] = Default::default();
		for i in indices {
			let (x, y) = points[i];
			buckets[bounds.quadrant_of(x, y)].push(i);
		}
		for (q, bucket) in buckets.into_iter().enumerate() {
			if bucket.is_empty() {
				continue;
			}
			let child = Self::build_cell(
				points,
				strengths,
				radii,
				bucket,
				bounds.quadrant(q),
				depth + 1,
			);
			node.children[q] = Some(Box::new(child));
		}
		node.aggregate_children();
		node
	}

	fn aggregate_leaf(&mut self, points: &[(f64, f64)], strengths: &[f64], radii: &[f64], indices: &[usize]) {
		let (mut weight, mut sx, mut sy, mut gx, mut gy) = (0.0, 0.0, 0.0, 0.0, 0.0);
		for &i in indices {
			let (x, y) = points[i];
			let s = strengths.get(i).copied().unwrap_or(0.0);
			self.strength += s;
			weight += s.abs();
			sx += x * s.abs();
			sy += y * s.abs();
			gx += x;
			gy += y;
			self.max_radius = self.max_radius.max(radii.get(i).copied().unwrap_or(0.0));
		}
		if weight > 0.0 {
			(self.cx, self.cy) = (sx / weight, sy / weight);
		} else {
			let n = indices.len().max(1) as f64;
			(self.cx, self.cy) = (gx / n, gy / n);
		}
	}

	fn aggregate_children(&mut self) {
		let (mut weight, mut sx, mut sy, mut gx, mut gy, mut n) = (0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
		for child in self.children.iter().flatten() {
			self.strength += child.strength;
			weight += child.strength.abs();
			sx += child.cx * child.strength.abs();
			sy += child.cy * child.strength.abs();
			gx += child.cx;
			gy += child.cy;
			n += 1.0;
			self.max_radius = self.max_radius.max(child.max_radius);
		}
		if weight > 0.0 {
			(self.cx, self.cy) = (sx / weight, sy / weight);
		} else if n > 0.0 {
			(self.cx, self.cy) = (gx / n, gy / n);
		}
	}

	pub(super) fn is_leaf(&self) -> bool {
		self.children.iter().all(Option::is_none)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn aggregates_strength_and_centroid() {
		let points = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)];
		let strengths = [-1.0, -1.0, -2.0];
		let radii = [1.0, 3.0, 2.0];
		let tree = QuadNode::build(&points, &strengths, &radii).unwrap();
		assert_eq!(tree.strength, -4.0);
		assert!((tree.cx - 7.5).abs() < 1e-9);
		assert!((tree.cy - 5.0).abs() < 1e-9);
		assert_eq!(tree.max_radius, 3.0);
		assert!(!tree.is_leaf());
	}

	#[test]
	fn coincident_points_share_a_leaf() {
		let points = [(5.0, 5.0), (5.0, 5.0)];
		let tree = QuadNode::build(&points, &[-1.0, -1.0], &[0.0, 0.0]).unwrap();
		let mut leaf = &tree;
		while !leaf.is_leaf() {
			leaf = leaf.children.iter().flatten().next().unwrap();
		}
		assert_eq!(leaf.indices.len(), 2);
	}

	#[test]
	fn skips_non_finite_points() {
		assert!(QuadNode::build(&[(f64::NAN, 0.0)], &[-1.0], &[1.0]).is_none());
	}
}
