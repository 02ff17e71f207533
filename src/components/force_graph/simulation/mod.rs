//! Velocity-Verlet force simulation with alpha cooling.
//!
//! Each tick moves `alpha` toward `alpha_target` by `alpha_decay`, applies
//! every installed force scaled by alpha, then integrates velocities with
//! `velocity_decay` friction. Pinned particles snap to their pin.
//! The simulation never schedules itself; its owner calls [`Simulation::step`]
//! once per animation frame.

mod forces;
mod quadtree;

pub use forces::{Center, Collide, LinkForce, ManyBody, PositionForce};

use std::f64::consts::PI;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::geometry::Point;

pub const ALPHA_MIN: f64 = 0.001;
const INITIAL_RADIUS: f64 = 10.0;

/// A simulated node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Particle {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Pinned x, if any.
	pub fx: Option<f64>,
	/// Pinned y, if any.
	pub fy: Option<f64>,
}

impl Particle {
	pub fn pin(&mut self, x: f64, y: f64) {
		self.fx = Some(x);
		self.fy = Some(y);
	}

	/// Pins the particle where it currently is.
	pub fn pin_here(&mut self) {
		self.pin(self.x, self.y);
	}

	pub fn unpin(&mut self) {
		self.fx = None;
		self.fy = None;
	}

	#[cfg(test)]
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() && self.fy.is_some()
	}

	pub fn position(&self) -> Option<Point> {
		Point::finite(self.x, self.y)
	}
}

/// A tiny nonzero offset for separating coincident points.
pub(crate) fn jiggle(rng: &mut SmallRng) -> f64 {
	let v: f64 = rng.gen_range(-0.5..0.5);
	if v == 0.0 {
		return 1e-7;
	}
	v * 1e-6
}

/// The installed forces. `None` means the force is off.
#[derive(Clone, Debug, Default)]
pub struct Forces {
	pub link: Option<LinkForce>,
	pub charge: Option<ManyBody>,
	pub collide: Option<Collide>,
	pub center: Option<Center>,
	pub x: Option<PositionForce>,
	pub y: Option<PositionForce>,
}

/// The physics state for one graph instance.
#[derive(Clone, Debug)]
pub struct Simulation {
	pub particles: Vec<Particle>,
	pub forces: Forces,
	pub alpha: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	pub alpha_target: f64,
	pub velocity_decay: f64,
	running: bool,
	rng: SmallRng,
}

impl Simulation {
	/// Lays `count` particles out on a phyllotaxis spiral around `center`.
	pub fn new(count: usize, center: Point, seed: u32) -> Self {
		let angle_step = PI * (3.0 - 5f64.sqrt());
		let particles = (0..count)
			.map(|i| {
				let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
				let angle = i as f64 * angle_step;
				Particle {
					x: center.x + radius * angle.cos(),
					y: center.y + radius * angle.sin(),
					..Default::default()
				}
			})
			.collect();

		Self {
			particles,
			forces: Forces::default(),
			alpha: 1.0,
			alpha_min: ALPHA_MIN,
			alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / 300.0),
			alpha_target: 0.0,
			velocity_decay: 0.4,
			running: true,
			rng: SmallRng::seed_from_u64(u64::from(seed)),
		}
	}

	#[cfg(test)]
	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn stop(&mut self) {
		self.running = false;
	}

	pub fn restart(&mut self) {
		self.running = true;
	}

	/// Runs `iterations` ticks synchronously, regardless of running state.
	pub fn tick(&mut self, iterations: usize) {
		for _ in 0..iterations {
			self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
			self.apply_forces();
			self.integrate();
		}
	}

	/// One scheduled tick. Stops once alpha has cooled below `alpha_min`.
	/// Returns whether a tick ran.
	pub fn step(&mut self) -> bool {
		if !self.running {
			return false;
		}
		self.tick(1);
		if self.alpha < self.alpha_min {
			self.running = false;
		}
		true
	}

	fn apply_forces(&mut self) {
		let alpha = self.alpha;
		let particles = &mut self.particles;
		if let Some(link) = &self.forces.link {
			link.apply(particles, alpha, &mut self.rng);
		}
		if let Some(charge) = &self.forces.charge {
			charge.apply(particles, alpha, &mut self.rng);
		}
		if let Some(collide) = &self.forces.collide {
			collide.apply(particles, &mut self.rng);
		}
		if let Some(center) = &self.forces.center {
			center.apply(particles);
		}
		if let Some(x) = &self.forces.x {
			x.apply_x(particles, alpha);
		}
		if let Some(y) = &self.forces.y {
			y.apply_y(particles, alpha);
		}
	}

	fn integrate(&mut self) {
		let keep = 1.0 - self.velocity_decay;
		for p in &mut self.particles {
			match p.fx {
				Some(fx) => {
					p.x = fx;
					p.vx = 0.0;
				}
				None => {
					p.vx *= keep;
					p.x += p.vx;
				}
			}
			match p.fy {
				Some(fy) => {
					p.y = fy;
					p.vy = 0.0;
				}
				None => {
					p.vy *= keep;
					p.y += p.vy;
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn initial_layout_is_spread_and_repeatable() {
		let a = Simulation::new(5, Point::new(400.0, 300.0), 7);
		let b = Simulation::new(5, Point::new(400.0, 300.0), 7);
		assert_eq!(a.particles, b.particles);
		for (i, p) in a.particles.iter().enumerate() {
			for q in &a.particles[i + 1..] {
				assert!(p.position().unwrap().distance(q.position().unwrap()) > 1.0);
			}
		}
	}

	#[test]
	fn cools_and_stops() {
		let mut sim = Simulation::new(3, Point::new(0.0, 0.0), 1);
		let mut ticks = 0;
		while sim.step() {
			ticks += 1;
			assert!(ticks < 1000);
		}
		assert!(!sim.is_running());
		assert!(sim.alpha < ALPHA_MIN);
	}

	#[test]
	fn pinned_particles_stay_put() {
		let mut sim = Simulation::new(2, Point::new(0.0, 0.0), 1);
		sim.forces.charge = Some(ManyBody::new(vec![-500.0, -500.0]));
		sim.particles[0].pin(42.0, -7.0);
		sim.tick(10);
		assert_eq!((sim.particles[0].x, sim.particles[0].y), (42.0, -7.0));
		assert_eq!((sim.particles[0].vx, sim.particles[0].vy), (0.0, 0.0));
	}

	#[test]
	fn linked_pair_settles_near_rest_length() {
		let mut sim = Simulation::new(2, Point::new(0.0, 0.0), 1);
		sim.forces.link = Some(LinkForce::new(&[(0, 1)], 2, |_| 80.0, |_| 1.0));
		sim.tick(300);
		let d = sim.particles[0]
			.position()
			.unwrap()
			.distance(sim.particles[1].position().unwrap());
		assert!((d - 80.0).abs() < 2.0, "distance {d}");
	}

	#[test]
	fn jiggle_is_tiny_and_nonzero() {
		let mut rng = SmallRng::seed_from_u64(3);
		for _ in 0..100 {
			let v = jiggle(&mut rng);
			assert!(v != 0.0 && v.abs() <= 5e-7);
		}
	}

	#[test]
	fn coincident_particles_separate_repeatably() {
		let run = || {
			let mut sim = Simulation::new(2, Point::new(0.0, 0.0), 9);
			for p in &mut sim.particles {
				(p.x, p.y) = (5.0, 5.0);
			}
			sim.forces.collide = Some(Collide::new(vec![4.0, 4.0], 1.0));
			sim.tick(5);
			sim.particles
		};
		let (a, b) = (run(), run());
		assert_eq!(a, b);
		assert!(a[0].position().unwrap().distance(a[1].position().unwrap()) > 1.0);
	}
}
