//! Individual forces. Each one nudges particle velocities, scaled by alpha.

use super::quadtree::QuadNode;
use rand::rngs::SmallRng;

use super::{Particle, jiggle};

const THETA_SQ: f64 = 0.81;
const DISTANCE_MIN_SQ: f64 = 1.0;

/// Spring force along links, with per-link rest length and stiffness.
///
/// The correction is split between the endpoints by degree so that
/// well-connected nodes move less.
#[derive(Clone, Debug, Default)]
pub struct LinkForce {
	links: Vec<(usize, usize)>,
	distance: Vec<f64>,
	strength: Vec<f64>,
	bias: Vec<f64>,
}

impl LinkForce {
	/// Links with an endpoint outside `0..node_count` are dropped.
	pub fn new(
		links: &[(usize, usize)],
		node_count: usize,
		distance: impl Fn(usize) -> f64,
		strength: impl Fn(usize) -> f64,
	) -> Self {
		let mut degree = vec![0usize; node_count];
		let mut force = LinkForce::default();
		for (i, &(s, t)) in links.iter().enumerate() {
			if s >= node_count || t >= node_count || s == t {
				continue;
			}
			degree[s] += 1;
			degree[t] += 1;
			force.links.push((s, t));
			force.distance.push(distance(i));
			force.strength.push(strength(i));
		}
		force.bias = force
			.links
			.iter()
			.map(|&(s, t)| degree[s] as f64 / (degree[s] + degree[t]) as f64)
			.collect();
		force
	}

	#[cfg(test)]
	pub fn len(&self) -> usize {
		self.links.len()
	}

	pub(super) fn apply(&self, particles: &mut [Particle], alpha: f64, rng: &mut SmallRng) {
		for (i, &(s, t)) in self.links.iter().enumerate() {
			let (src, tgt) = (&particles[s], &particles[t]);
			let mut x = tgt.x + tgt.vx - src.x - src.vx;
			let mut y = tgt.y + tgt.vy - src.y - src.vy;
			if x == 0.0 {
				x = jiggle(rng);
			}
			if y == 0.0 {
				y = jiggle(rng);
			}
			let len = x.hypot(y);
			let l = (len - self.distance[i]) / len * alpha * self.strength[i];
			x *= l;
			y *= l;
			let b = self.bias[i];
			particles[t].vx -= x * b;
			particles[t].vy -= y * b;
			particles[s].vx += x * (1.0 - b);
			particles[s].vy += y * (1.0 - b);
		}
	}
}

/// N-body charge with per-node strength, approximated with Barnes-Hut.
#[derive(Clone, Debug, Default)]
pub struct ManyBody {
	strength: Vec<f64>,
}

impl ManyBody {
	pub fn new(strength: Vec<f64>) -> Self {
		Self { strength }
	}

	pub fn strength(&self, index: usize) -> f64 {
		self.strength.get(index).copied().unwrap_or(0.0)
	}

	pub(super) fn apply(&self, particles: &mut [Particle], alpha: f64, rng: &mut SmallRng) {
		let points: Vec<(f64, f64)> = particles.iter().map(|p| (p.x, p.y)).collect();
		let Some(tree) = QuadNode::build(&points, &self.strength, &[]) else {
			return;
		};
		for (i, particle) in particles.iter_mut().enumerate() {
			let (mut vx, mut vy) = (0.0, 0.0);
			self.accumulate(&tree, i, &points, alpha, rng, &mut vx, &mut vy);
			particle.vx += vx;
			particle.vy += vy;
		}
	}

	#[allow(clippy::too_many_arguments)]
	fn accumulate(
		&self,
		cell: &QuadNode,
		index: usize,
		points: &[(f64, f64)],
		alpha: f64,
		rng: &mut SmallRng,
		vx: &mut f64,
		vy: &mut f64,
	) {
		if cell.strength == 0.0 {
			return;
		}
		let (px, py) = points[index];
		let mut x = cell.cx - px;
		let mut y = cell.cy - py;
		let w = cell.bounds.size;
		let mut l = x * x + y * y;

		if !cell.is_leaf() && w * w / THETA_SQ < l {
			if l < DISTANCE_MIN_SQ {
				l = (DISTANCE_MIN_SQ * l).sqrt();
			}
			*vx += x * cell.strength * alpha / l;
			*vy += y * cell.strength * alpha / l;
			return;
		}

		if cell.is_leaf() {
			for &other in &cell.indices {
				if other == index {
					continue;
				}
				x = points[other].0 - px;
				y = points[other].1 - py;
				if x == 0.0 {
					x = jiggle(rng);
				}
				if y == 0.0 {
					y = jiggle(rng);
				}
				l = x * x + y * y;
				if l < DISTANCE_MIN_SQ {
					l = (DISTANCE_MIN_SQ * l).sqrt();
				}
				let s = self.strength(other);
				*vx += x * s * alpha / l;
				*vy += y * s * alpha / l;
			}
			return;
		}

		for child in cell.children.iter().flatten() {
			self.accumulate(child, index, points, alpha, rng, vx, vy);
		}
	}
}

/// Pushes apart overlapping circles, using predicted positions.
#[derive(Clone, Debug, Default)]
pub struct Collide {
	radius: Vec<f64>,
	strength: f64,
}

impl Collide {
	pub fn new(radius: Vec<f64>, strength: f64) -> Self {
		Self { radius, strength }
	}

	pub fn radius(&self, index: usize) -> f64 {
		self.radius.get(index).copied().unwrap_or(0.0)
	}

	pub(super) fn apply(&self, particles: &mut [Particle], rng: &mut SmallRng) {
		let points: Vec<(f64, f64)> = particles.iter().map(|p| (p.x + p.vx, p.y + p.vy)).collect();
		let Some(tree) = QuadNode::build(&points, &[], &self.radius) else {
			return;
		};
		for i in 0..particles.len() {
			let (xi, yi) = points[i];
			if !(xi.is_finite() && yi.is_finite()) {
				continue;
			}
			self.visit(&tree, i, &points, particles, rng);
		}
	}

	fn visit(
		&self,
		cell: &QuadNode,
		index: usize,
		points: &[(f64, f64)],
		particles: &mut [Particle],
		rng: &mut SmallRng,
	) {
		let (xi, yi) = points[index];
		let ri = self.radius(index);
		if cell.bounds.misses(xi, yi, ri + cell.max_radius) {
			return;
		}
		if !cell.is_leaf() {
			for child in cell.children.iter().flatten() {
				self.visit(child, index, points, particles, rng);
			}
			return;
		}
		for &j in &cell.indices {
			if j <= index {
				continue;
			}
			let rj = self.radius(j);
			let r = ri + rj;
			let mut x = xi - points[j].0;
			let mut y = yi - points[j].1;
			let mut l = x * x + y * y;
			if l >= r * r {
				continue;
			}
			if x == 0.0 {
				x = jiggle(rng);
				l += x * x;
			}
			if y == 0.0 {
				y = jiggle(rng);
				l += y * y;
			}
			let dist = l.sqrt();
			let push = (r - dist) / dist * self.strength;
			x *= push;
			y *= push;
			let share = rj * rj / (ri * ri + rj * rj).max(f64::EPSILON);
			particles[index].vx += x * share;
			particles[index].vy += y * share;
			particles[j].vx -= x * (1.0 - share);
			particles[j].vy -= y * (1.0 - share);
		}
	}
}

/// Translates the whole layout so its mean position sits on a point.
#[derive(Clone, Copy, Debug)]
pub struct Center {
	pub x: f64,
	pub y: f64,
}

impl Center {
	pub(super) fn apply(&self, particles: &mut [Particle]) {
		let finite = particles.iter().filter(|p| p.x.is_finite() && p.y.is_finite());
		let (mut sx, mut sy, mut n) = (0.0, 0.0, 0usize);
		for p in finite {
			sx += p.x;
			sy += p.y;
			n += 1;
		}
		if n == 0 {
			return;
		}
		let (dx, dy) = (sx / n as f64 - self.x, sy / n as f64 - self.y);
		for p in particles.iter_mut() {
			p.x -= dx;
			p.y -= dy;
		}
	}
}

/// Per-node pull toward a fixed coordinate on one axis.
#[derive(Clone, Debug)]
pub struct PositionForce {
	pub target: f64,
	strength: Vec<f64>,
}

impl PositionForce {
	pub fn new(target: f64, strength: Vec<f64>) -> Self {
		Self { target, strength }
	}

	pub(super) fn apply_x(&self, particles: &mut [Particle], alpha: f64) {
		for (p, s) in particles.iter_mut().zip(&self.strength) {
			p.vx += (self.target - p.x) * s * alpha;
		}
	}

	pub(super) fn apply_y(&self, particles: &mut [Particle], alpha: f64) {
		for (p, s) in particles.iter_mut().zip(&self.strength) {
			p.vy += (self.target - p.y) * s * alpha;
		}
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;

	use super::*;

	fn at(x: f64, y: f64) -> Particle {
		Particle {
			x,
			y,
			..Default::default()
		}
	}

	#[test]
	fn stretched_link_pulls_endpoints_together() {
		let mut particles = vec![at(0.0, 0.0), at(100.0, 0.0)];
		let force = LinkForce::new(&[(0, 1)], 2, |_| 50.0, |_| 1.0);
		force.apply(&mut particles, 1.0, &mut SmallRng::seed_from_u64(1));
		assert!(particles[0].vx > 0.0);
		assert!(particles[1].vx < 0.0);
	}

	#[test]
	fn dangling_and_self_links_are_dropped() {
		let force = LinkForce::new(&[(0, 5), (1, 1), (0, 1)], 2, |_| 10.0, |_| 1.0);
		assert_eq!(force.len(), 1);
	}

	#[test]
	fn negative_charge_repels() {
		let mut particles = vec![at(0.0, 0.0), at(10.0, 0.0), at(0.0, 300.0)];
		let force = ManyBody::new(vec![-30.0; 3]);
		force.apply(&mut particles, 1.0, &mut SmallRng::seed_from_u64(1));
		assert!(particles[0].vx < 0.0);
		assert!(particles[1].vx > 0.0);
	}

	#[test]
	fn overlapping_circles_separate() {
		let mut particles = vec![at(0.0, 0.0), at(4.0, 0.0)];
		let force = Collide::new(vec![5.0, 5.0], 1.0);
		force.apply(&mut particles, &mut SmallRng::seed_from_u64(1));
		assert!(particles[0].vx < 0.0);
		assert!(particles[1].vx > 0.0);
	}

	#[test]
	fn center_moves_mean() {
		let mut particles = vec![at(0.0, 0.0), at(10.0, 20.0)];
		Center { x: 100.0, y: 100.0 }.apply(&mut particles);
		assert_eq!((particles[0].x, particles[0].y), (95.0, 90.0));
		assert_eq!((particles[1].x, particles[1].y), (105.0, 110.0));
	}
}
