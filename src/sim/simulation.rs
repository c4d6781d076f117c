//! Simulation state and the per-frame step loop.

use super::Lcg;
use super::force::Force;

/// A node as the simulation sees it: position, velocity, optional pin.
#[derive(Debug, Clone, PartialEq)]
pub struct SimNode {
	/// Current x position.
	pub x: f64,
	/// Current y position.
	pub y: f64,
	/// Current x velocity.
	pub vx: f64,
	/// Current y velocity.
	pub vy: f64,
	/// Pinned x position; while set it overrides integration on that axis.
	pub fx: Option<f64>,
	/// Pinned y position; while set it overrides integration on that axis.
	pub fy: Option<f64>,
	/// Collision radius.
	pub radius: f64,
}

impl SimNode {
	/// Create an unpinned node at rest.
	pub fn new(x: f64, y: f64, radius: f64) -> Self {
		Self {
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			fx: None,
			fy: None,
			radius,
		}
	}

	/// Pin the node where it currently sits (drag start).
	pub fn pin(&mut self) {
		self.fx = Some(self.x);
		self.fy = Some(self.y);
	}

	/// Move the pin (drag in progress).
	pub fn pin_at(&mut self, x: f64, y: f64) {
		self.fx = Some(x);
		self.fy = Some(y);
	}

	/// Release the pin (drag end).
	pub fn unpin(&mut self) {
		self.fx = None;
		self.fy = None;
	}
}

/// One independent layout: the node set, the active forces and the
/// annealing state that drives convergence.
///
/// All state is explicit, so multiple simulations can run side by side
/// and the engine is testable without any drawing surface.
#[derive(Debug)]
pub struct Simulation {
	/// The node set, mutated in place by [`Simulation::tick`].
	pub nodes: Vec<SimNode>,
	forces: Vec<Force>,
	/// Current annealing temperature.
	pub alpha: f64,
	/// Stepping halts once `alpha` falls below this.
	pub alpha_min: f64,
	/// Per-step decay rate toward [`Simulation::alpha_target`].
	pub alpha_decay: f64,
	/// Value `alpha` relaxes toward; raised above `alpha_min` during a
	/// drag to keep the layout hot.
	pub alpha_target: f64,
	/// Fraction of velocity shed at each integration.
	pub velocity_decay: f64,
	rng: Lcg,
}

impl Simulation {
	/// Create a simulation over `nodes` with the reference cooling
	/// schedule: alpha decays from 1 to the 0.001 floor over ~300 steps.
	pub fn new(nodes: Vec<SimNode>) -> Self {
		Self {
			nodes,
			forces: Vec::new(),
			alpha: 1.0,
			alpha_min: 0.001,
			alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
			alpha_target: 0.0,
			velocity_decay: 0.4,
			rng: Lcg::new(1),
		}
	}

	/// Register a force. Forces run in registration order each step.
	pub fn add_force(&mut self, force: Force) {
		self.forces.push(force);
	}

	/// True once alpha has decayed below the minimum and no raised
	/// target will reheat it.
	pub fn finished(&self) -> bool {
		self.alpha < self.alpha_min && self.alpha_target < self.alpha_min
	}

	/// Advance one step; returns `false` (leaving every position
	/// untouched) once the simulation has settled.
	pub fn tick(&mut self) -> bool {
		if self.finished() {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

		for force in &self.forces {
			force.apply(&mut self.nodes, self.alpha, &mut self.rng);
		}

		// One combined integration after all forces have contributed; a
		// pinned axis snaps to the pin and sheds its velocity.
		let retain = 1.0 - self.velocity_decay;
		for node in &mut self.nodes {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= retain;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= retain;
					node.y += node.vy;
				}
			}
		}
		true
	}

	/// Reset alpha to full energy, e.g. after loading new data.
	pub fn reheat(&mut self) {
		self.alpha = 1.0;
	}
}

#[cfg(test)]
mod tests {
	use super::super::Force;
	use super::*;

	fn pair() -> Vec<SimNode> {
		vec![SimNode::new(0.0, 0.0, 10.0), SimNode::new(40.0, 30.0, 10.0)]
	}

	#[test]
	fn alpha_decays_monotonically_and_stays_positive() {
		let mut sim = Simulation::new(pair());
		let mut prev = sim.alpha;
		while sim.tick() {
			assert!(sim.alpha < prev, "alpha must strictly decrease");
			assert!(sim.alpha > 0.0, "alpha must never go negative");
			prev = sim.alpha;
		}
	}

	#[test]
	fn settled_simulation_is_a_fixed_point() {
		let mut sim = Simulation::new(pair());
		sim.add_force(Force::many_body(-30.0, 100.0));
		while sim.tick() {}
		let snapshot = sim.nodes.clone();
		for _ in 0..5 {
			assert!(!sim.tick());
		}
		assert_eq!(sim.nodes, snapshot);
	}

	#[test]
	fn raised_alpha_target_resumes_a_settled_simulation() {
		let mut sim = Simulation::new(pair());
		while sim.tick() {}
		assert!(sim.finished());
		sim.alpha_target = 0.3;
		assert!(!sim.finished());
		assert!(sim.tick());
		// Alpha climbs toward the raised target.
		assert!(sim.alpha > sim.alpha_min);
	}

	#[test]
	fn pinned_node_reports_exactly_the_pin() {
		let mut sim = Simulation::new(pair());
		sim.add_force(Force::many_body(-30.0, 100.0));
		let link = Force::link(vec![(0, 1)], 50.0, &sim.nodes).unwrap();
		sim.add_force(link);
		sim.nodes[0].pin_at(123.0, -7.5);
		for _ in 0..50 {
			sim.tick();
			assert_eq!(sim.nodes[0].x, 123.0);
			assert_eq!(sim.nodes[0].y, -7.5);
		}
		sim.nodes[0].unpin();
		sim.alpha_target = 0.3;
		sim.tick();
		assert_ne!(sim.nodes[0].x, 123.0, "released node rejoins the physics");
	}

	#[test]
	fn identical_runs_are_bit_identical() {
		let build = || {
			let mut sim = Simulation::new(vec![
				SimNode::new(0.0, 0.0, 15.0),
				SimNode::new(0.0, 0.0, 15.0),
				SimNode::new(25.0, 10.0, 15.0),
			]);
			sim.add_force(Force::many_body(-30.0, 100.0));
			sim.add_force(Force::collide(1));
			sim.add_force(Force::center(100.0, 100.0, 1.0));
			sim
		};
		let (mut a, mut b) = (build(), build());
		for _ in 0..200 {
			a.tick();
			b.tick();
		}
		for (na, nb) in a.nodes.iter().zip(&b.nodes) {
			assert_eq!(na.x, nb.x);
			assert_eq!(na.y, nb.y);
		}
	}

	#[test]
	fn reheat_restores_full_energy() {
		let mut sim = Simulation::new(pair());
		while sim.tick() {}
		sim.reheat();
		assert_eq!(sim.alpha, 1.0);
		assert!(sim.tick());
	}
}
