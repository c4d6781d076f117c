//! The closed set of forces a simulation can apply.
//!
//! Each variant contributes velocity deltas (or, for [`Force::Center`],
//! a direct position correction) to every node; the step loop in
//! [`super::Simulation`] integrates them afterwards. Adding a force never
//! requires touching the step loop itself.

use thiserror::Error;

use super::simulation::SimNode;
use super::{Lcg, jiggle};

/// Errors raised while assembling forces.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
	/// A link named a node index outside the node slice.
	#[error("link {link} references node index {index} but only {len} nodes exist")]
	LinkOutOfRange {
		/// Position of the offending link in the input list.
		link: usize,
		/// The out-of-range node index.
		index: usize,
		/// Number of nodes in the simulation.
		len: usize,
	},
}

/// A spring constraint between two nodes, by index into the node slice.
#[derive(Debug, Clone, PartialEq)]
pub struct SpringLink {
	/// Index of the source node.
	pub source: usize,
	/// Index of the target node.
	pub target: usize,
	/// Rest length the spring relaxes toward.
	pub distance: f64,
	/// Correction scale, normalized by endpoint degree so hubs are not
	/// yanked disproportionately.
	pub strength: f64,
	/// Share of the correction taken by the target endpoint; the
	/// higher-degree side moves less.
	pub bias: f64,
}

/// A velocity-contributing force over the whole node set.
#[derive(Debug, Clone)]
pub enum Force {
	/// Spring-like pull of linked nodes toward a rest length.
	Link {
		/// Resolved, degree-weighted springs.
		links: Vec<SpringLink>,
	},
	/// Pairwise charge between all nodes; negative strength repels.
	ManyBody {
		/// Charge magnitude; negative repels, positive attracts.
		strength: f64,
		/// Interaction cutoff; pairs farther apart are skipped.
		distance_max: f64,
	},
	/// Pulls the node centroid toward a fixed point.
	Center {
		/// Target x.
		x: f64,
		/// Target y.
		y: f64,
		/// Fraction of the centroid offset corrected per step.
		strength: f64,
	},
	/// Pushes overlapping nodes apart until their radii no longer touch.
	Collide {
		/// Overlap fraction resolved per relaxation pass.
		strength: f64,
		/// Relaxation passes per step.
		iterations: usize,
	},
}

impl Force {
	/// Build a link force from `(source, target)` index pairs.
	///
	/// Fails fast on any out-of-range index; a resolved graph must never
	/// surface a bad link mid-step. Per-link strength is `1 / min(degree)`
	/// of the endpoints and the correction is biased toward the
	/// lower-degree side.
	pub fn link(
		links: Vec<(usize, usize)>,
		distance: f64,
		nodes: &[SimNode],
	) -> Result<Self, SimError> {
		let len = nodes.len();
		let mut degree = vec![0usize; len];
		for (link, &(source, target)) in links.iter().enumerate() {
			for index in [source, target] {
				if index >= len {
					return Err(SimError::LinkOutOfRange { link, index, len });
				}
			}
			degree[source] += 1;
			degree[target] += 1;
		}

		let links = links
			.into_iter()
			.map(|(source, target)| {
				let (ds, dt) = (degree[source] as f64, degree[target] as f64);
				SpringLink {
					source,
					target,
					distance,
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
				}
			})
			.collect();
		Ok(Force::Link { links })
	}

	/// Pairwise charge force; negative `strength` repels.
	pub fn many_body(strength: f64, distance_max: f64) -> Self {
		Force::ManyBody {
			strength,
			distance_max,
		}
	}

	/// Centering force toward `(x, y)` with full-strength correction.
	pub fn center(x: f64, y: f64, strength: f64) -> Self {
		Force::Center { x, y, strength }
	}

	/// Collision force using each node's own radius.
	pub fn collide(iterations: usize) -> Self {
		Force::Collide {
			strength: 1.0,
			iterations,
		}
	}

	pub(crate) fn apply(&self, nodes: &mut [SimNode], alpha: f64, rng: &mut Lcg) {
		match self {
			Force::Link { links } => apply_links(links, nodes, alpha, rng),
			Force::ManyBody {
				strength,
				distance_max,
			} => apply_many_body(nodes, *strength, *distance_max, alpha, rng),
			Force::Center { x, y, strength } => apply_center(nodes, *x, *y, *strength),
			Force::Collide {
				strength,
				iterations,
			} => apply_collide(nodes, *strength, *iterations, rng),
		}
	}
}

/// Spring correction per link, split between the endpoints by degree bias.
///
/// Works on projected positions (`x + vx`) so corrections compose with
/// whatever the earlier forces contributed this step.
fn apply_links(links: &[SpringLink], nodes: &mut [SimNode], alpha: f64, rng: &mut Lcg) {
	for link in links {
		let (s, t) = (link.source, link.target);
		let mut x = nodes[t].x + nodes[t].vx - nodes[s].x - nodes[s].vx;
		let mut y = nodes[t].y + nodes[t].vy - nodes[s].y - nodes[s].vy;
		if x == 0.0 {
			x = jiggle(rng);
		}
		if y == 0.0 {
			y = jiggle(rng);
		}
		let mut l = (x * x + y * y).sqrt();
		l = (l - link.distance) / l * alpha * link.strength;
		x *= l;
		y *= l;
		nodes[t].vx -= x * link.bias;
		nodes[t].vy -= y * link.bias;
		nodes[s].vx += x * (1.0 - link.bias);
		nodes[s].vy += y * (1.0 - link.bias);
	}
}

/// Exact O(n²) pairwise charge pass.
///
/// Graphs here stay well under a thousand nodes, so the quadtree
/// approximation is not worth its bookkeeping.
fn apply_many_body(
	nodes: &mut [SimNode],
	strength: f64,
	distance_max: f64,
	alpha: f64,
	rng: &mut Lcg,
) {
	let max2 = distance_max * distance_max;
	let n = nodes.len();
	for i in 0..n {
		for j in (i + 1)..n {
			let mut dx = nodes[j].x - nodes[i].x;
			let mut dy = nodes[j].y - nodes[i].y;
			if dx == 0.0 {
				dx = jiggle(rng);
			}
			if dy == 0.0 {
				dy = jiggle(rng);
			}
			let mut d2 = dx * dx + dy * dy;
			if d2 >= max2 {
				continue;
			}
			// Soften the singularity inside unit distance.
			if d2 < 1.0 {
				d2 = d2.sqrt();
			}
			let w = strength * alpha / d2;
			nodes[i].vx += dx * w;
			nodes[i].vy += dy * w;
			nodes[j].vx -= dx * w;
			nodes[j].vy -= dy * w;
		}
	}
}

/// Shift every node so the centroid moves toward the target.
///
/// Not alpha-scaled: a lone node must land on the center exactly, and the
/// correction is a rigid translation that cannot oscillate.
fn apply_center(nodes: &mut [SimNode], x: f64, y: f64, strength: f64) {
	let n = nodes.len() as f64;
	if nodes.is_empty() {
		return;
	}
	let (mut sx, mut sy) = (0.0, 0.0);
	for node in nodes.iter() {
		sx += node.x;
		sy += node.y;
	}
	sx = (sx / n - x) * strength;
	sy = (sy / n - y) * strength;
	for node in nodes.iter_mut() {
		node.x -= sx;
		node.y -= sy;
	}
}

/// Iterative pairwise separation on projected positions.
///
/// One pass is not exact; overlap left behind is resolved over the next
/// steps (or by raising `iterations`).
fn apply_collide(nodes: &mut [SimNode], strength: f64, iterations: usize, rng: &mut Lcg) {
	let n = nodes.len();
	for _ in 0..iterations {
		for i in 0..n {
			let ri = nodes[i].radius;
			let xi = nodes[i].x + nodes[i].vx;
			let yi = nodes[i].y + nodes[i].vy;
			for j in (i + 1)..n {
				let rj = nodes[j].radius;
				let r = ri + rj;
				if r <= 0.0 {
					continue;
				}
				let mut x = xi - nodes[j].x - nodes[j].vx;
				let mut y = yi - nodes[j].y - nodes[j].vy;
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
				l = l.sqrt();
				l = (r - l) / l * strength;
				x *= l;
				y *= l;
				// Heavier (larger) node absorbs less of the separation.
				let rj2 = rj * rj;
				let ratio = rj2 / (ri * ri + rj2);
				nodes[i].vx += x * ratio;
				nodes[i].vy += y * ratio;
				nodes[j].vx -= x * (1.0 - ratio);
				nodes[j].vy -= y * (1.0 - ratio);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::super::Simulation;
	use super::*;

	fn two_nodes(d: f64) -> Vec<SimNode> {
		vec![SimNode::new(0.0, 0.0, 0.0), SimNode::new(d, 0.0, 0.0)]
	}

	fn distance(sim: &Simulation, a: usize, b: usize) -> f64 {
		let (na, nb) = (&sim.nodes[a], &sim.nodes[b]);
		((na.x - nb.x).powi(2) + (na.y - nb.y).powi(2)).sqrt()
	}

	#[test]
	fn link_rejects_out_of_range_index() {
		let nodes = two_nodes(10.0);
		let err = Force::link(vec![(0, 5)], 50.0, &nodes).unwrap_err();
		assert_eq!(
			err,
			SimError::LinkOutOfRange {
				link: 0,
				index: 5,
				len: 2
			}
		);
	}

	#[test]
	fn link_strength_is_degree_normalized() {
		// Star: node 0 has degree 3, each leaf degree 1.
		let nodes = vec![
			SimNode::new(0.0, 0.0, 0.0),
			SimNode::new(1.0, 0.0, 0.0),
			SimNode::new(0.0, 1.0, 0.0),
			SimNode::new(-1.0, 0.0, 0.0),
		];
		let force = Force::link(vec![(0, 1), (0, 2), (0, 3)], 30.0, &nodes).unwrap();
		let Force::Link { links } = force else {
			panic!("expected a link force");
		};
		for link in &links {
			assert!((link.strength - 1.0).abs() < 1e-12, "1 / min(3, 1)");
			assert!((link.bias - 0.75).abs() < 1e-12, "hub takes 3/4 of the pull");
		}
	}

	#[test]
	fn link_converges_to_rest_length() {
		let mut sim = Simulation::new(two_nodes(10.0));
		let force = Force::link(vec![(0, 1)], 50.0, &sim.nodes).unwrap();
		sim.add_force(force);
		// Hold the layout hot so decay does not stop it short.
		sim.alpha_target = 1.0;
		for _ in 0..500 {
			sim.tick();
		}
		assert!(
			(distance(&sim, 0, 1) - 50.0).abs() < 1.0,
			"distance {} should settle near the 50.0 rest length",
			distance(&sim, 0, 1)
		);
	}

	#[test]
	fn many_body_repels_close_nodes() {
		let mut sim = Simulation::new(two_nodes(10.0));
		sim.add_force(Force::many_body(-30.0, 100.0));
		let before = distance(&sim, 0, 1);
		for _ in 0..10 {
			sim.tick();
		}
		assert!(distance(&sim, 0, 1) > before);
	}

	#[test]
	fn many_body_ignores_pairs_beyond_cutoff() {
		let mut sim = Simulation::new(two_nodes(200.0));
		sim.add_force(Force::many_body(-30.0, 100.0));
		sim.tick();
		assert_eq!(sim.nodes[0].x, 0.0);
		assert_eq!(sim.nodes[1].x, 200.0);
	}

	#[test]
	fn center_moves_single_node_to_exact_target() {
		let mut sim = Simulation::new(vec![SimNode::new(37.0, -12.0, 0.0)]);
		sim.add_force(Force::center(400.0, 300.0, 1.0));
		while sim.tick() {}
		assert!((sim.nodes[0].x - 400.0).abs() < 1e-9);
		assert!((sim.nodes[0].y - 300.0).abs() < 1e-9);
	}

	#[test]
	fn collide_separates_overlapping_nodes() {
		let mut nodes = two_nodes(10.0);
		for node in &mut nodes {
			node.radius = 15.0;
		}
		let mut sim = Simulation::new(nodes);
		sim.add_force(Force::collide(1));
		while sim.tick() {}
		assert!(
			distance(&sim, 0, 1) >= 29.5,
			"distance {} should reach the 30.0 radius sum",
			distance(&sim, 0, 1)
		);
	}

	#[test]
	fn coincident_nodes_break_apart_without_nan() {
		let nodes = vec![SimNode::new(100.0, 100.0, 15.0), SimNode::new(100.0, 100.0, 15.0)];
		let mut sim = Simulation::new(nodes);
		sim.add_force(Force::many_body(-30.0, 100.0));
		sim.add_force(Force::collide(1));
		for _ in 0..50 {
			sim.tick();
		}
		for node in &sim.nodes {
			assert!(node.x.is_finite() && node.y.is_finite());
		}
		assert!(distance(&sim, 0, 1) > 0.0, "the pair must split");
	}
}
