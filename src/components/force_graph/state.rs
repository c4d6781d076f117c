//! Simulation ownership, drag state and hit-testing for the graph view.

use std::collections::HashMap;
use std::f64::consts::PI;

use log::debug;

use crate::sim::{Force, SimNode, Simulation};

use super::scale::OrdinalScale;
use super::types::{GraphData, GraphError, NodeId};

/// Tunable layout and rendering parameters.
///
/// Defaults reproduce the reference visualization's constants; pass a
/// customized value to the component to tune a particular graph.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphConfig {
	/// Spring rest length for every link.
	pub link_distance: f64,
	/// Many-body charge strength; negative repels.
	pub charge_strength: f64,
	/// Distance beyond which the charge force is cut off.
	pub charge_distance_max: f64,
	/// Collision radius given to every node.
	pub collide_radius: f64,
	/// Relaxation passes of the collision force per step.
	pub collide_iterations: usize,
	/// Fraction of the centroid offset the centering force corrects per step.
	pub center_strength: f64,
	/// Rendered circle radius.
	pub node_radius: f64,
	/// Pointer hit-test radius.
	pub hit_radius: f64,
	/// Per-step alpha decay rate.
	pub alpha_decay: f64,
	/// Alpha target held while a drag keeps the layout hot.
	pub drag_alpha_target: f64,
	/// Fraction of velocity shed at each integration.
	pub velocity_decay: f64,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			link_distance: 50.0,
			charge_strength: -30.0,
			charge_distance_max: 100.0,
			collide_radius: 15.0,
			collide_iterations: 1,
			center_strength: 1.0,
			node_radius: 10.0,
			hit_radius: 12.0,
			alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
			drag_alpha_target: 0.3,
			velocity_decay: 0.4,
		}
	}
}

/// What the renderer needs to know about a node besides its position.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// The node's wire id, shown in hover text and tooltips.
	pub id: NodeId,
	/// Style class, if the payload carried one.
	pub kind: Option<String>,
	/// Display label for the tooltip.
	pub label: Option<String>,
	/// Explicit fill for kind-less nodes; kinded nodes are colored by CSS.
	pub color: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	/// Whether the pointer traveled far enough to count as a drag
	/// rather than a click.
	pub moved: bool,
}

/// All mutable state behind the SVG surface.
#[derive(Debug)]
pub struct ForceGraphState {
	/// The layout engine instance this view drives.
	pub sim: Simulation,
	/// Per-node render styling, index-aligned with `sim.nodes`.
	pub styles: Vec<NodeStyle>,
	/// Links resolved to node indices, in payload order.
	pub links: Vec<(usize, usize)>,
	pub drag: DragState,
	/// Index of the clicked node currently highlighted, if any.
	pub selected: Option<usize>,
	pub width: f64,
	pub height: f64,
	pub config: GraphConfig,
}

impl ForceGraphState {
	/// Build the simulation from a payload.
	///
	/// Link endpoints are resolved to node indices here, once; an unknown
	/// id is a configuration error, never skipped silently.
	pub fn new(
		data: &GraphData,
		config: GraphConfig,
		width: f64,
		height: f64,
	) -> Result<Self, GraphError> {
		let mut id_to_idx = HashMap::with_capacity(data.nodes.len());
		let mut scale = OrdinalScale::new();
		let mut nodes = Vec::with_capacity(data.nodes.len());
		let mut styles = Vec::with_capacity(data.nodes.len());

		for (i, node) in data.nodes.iter().enumerate() {
			// Seed positions on a ring around the center so the first steps
			// unfold a recognizable shape instead of a random cloud.
			let angle = (i as f64) * 2.0 * PI / data.nodes.len() as f64;
			let (x, y) = (
				width / 2.0 + 100.0 * angle.cos(),
				height / 2.0 + 100.0 * angle.sin(),
			);
			nodes.push(SimNode::new(x, y, config.collide_radius));

			let color = match node.kind {
				Some(_) => None,
				None => {
					let key = node
						.group
						.map(|group| group.to_string())
						.unwrap_or_else(|| node.id.to_string());
					Some(scale.color(&key).to_owned())
				}
			};
			styles.push(NodeStyle {
				id: node.id.clone(),
				kind: node.kind.clone(),
				label: node.label.clone(),
				color,
			});
			if id_to_idx.insert(node.id.clone(), i).is_some() {
				return Err(GraphError::DuplicateId {
					id: node.id.clone(),
				});
			}
		}

		let mut links = Vec::with_capacity(data.links.len());
		for link in &data.links {
			let resolve = |id: &NodeId| {
				id_to_idx
					.get(id)
					.copied()
					.ok_or_else(|| GraphError::UnknownNode { id: id.clone() })
			};
			links.push((resolve(&link.source)?, resolve(&link.target)?));
		}

		let mut sim = Simulation::new(nodes);
		sim.alpha_decay = config.alpha_decay;
		sim.velocity_decay = config.velocity_decay;
		let link_force = Force::link(links.clone(), config.link_distance, &sim.nodes)?;
		sim.add_force(link_force);
		sim.add_force(Force::many_body(
			config.charge_strength,
			config.charge_distance_max,
		));
		sim.add_force(Force::center(
			width / 2.0,
			height / 2.0,
			config.center_strength,
		));
		sim.add_force(Force::collide(config.collide_iterations));

		debug!(
			"graph state ready: {} nodes, {} links, surface {width}x{height}",
			data.nodes.len(),
			data.links.len()
		);

		Ok(Self {
			sim,
			styles,
			links,
			drag: DragState::default(),
			selected: None,
			width,
			height,
			config,
		})
	}

	/// Topmost node under the pointer, if any.
	pub fn node_at_position(&self, x: f64, y: f64) -> Option<usize> {
		let mut found = None;
		for (i, node) in self.sim.nodes.iter().enumerate() {
			let (dx, dy) = (node.x - x, node.y - y);
			// Last hit wins, matching paint order.
			if (dx * dx + dy * dy).sqrt() < self.config.hit_radius {
				found = Some(i);
			}
		}
		found
	}

	/// Drag start: pin the node where it sits and hold the layout hot.
	pub fn begin_drag(&mut self, idx: usize, x: f64, y: f64) {
		if let Some(node) = self.sim.nodes.get_mut(idx) {
			node.pin();
			self.drag = DragState {
				active: true,
				node_idx: Some(idx),
				start_x: x,
				start_y: y,
				moved: false,
			};
			self.sim.alpha_target = self.config.drag_alpha_target;
		}
	}

	/// Drag move: the pin follows the pointer; the dragged node's position
	/// is authoritative until release.
	pub fn drag_to(&mut self, x: f64, y: f64) {
		if !self.drag.active {
			return;
		}
		if (x - self.drag.start_x).abs() + (y - self.drag.start_y).abs() > 3.0 {
			self.drag.moved = true;
		}
		if let Some(node) = self
			.drag
			.node_idx
			.and_then(|idx| self.sim.nodes.get_mut(idx))
		{
			node.pin_at(x, y);
		}
	}

	/// Drag end: release the pin and let the layout cool back down.
	pub fn end_drag(&mut self) {
		if let Some(node) = self
			.drag
			.node_idx
			.and_then(|idx| self.sim.nodes.get_mut(idx))
		{
			node.unpin();
		}
		self.drag = DragState::default();
		self.sim.alpha_target = 0.0;
	}

	/// Advance the simulation one frame; false once it has settled.
	pub fn tick(&mut self) -> bool {
		self.sim.tick()
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::super::types::{GraphLink, GraphNode};
	use super::*;

	fn payload() -> GraphData {
		let node = |id: &str, kind: &str| GraphNode {
			id: NodeId::Str(id.into()),
			kind: Some(kind.into()),
			label: None,
			group: None,
		};
		GraphData {
			nodes: vec![
				node("t1", "tweet"),
				node("t2", "tweet"),
				node("rust", "hashtag"),
			],
			links: vec![
				GraphLink {
					source: NodeId::Str("t1".into()),
					target: NodeId::Str("rust".into()),
				},
				GraphLink {
					source: NodeId::Str("t2".into()),
					target: NodeId::Str("rust".into()),
				},
			],
		}
	}

	#[test]
	fn builds_and_resolves_links_to_indices() {
		let state =
			ForceGraphState::new(&payload(), GraphConfig::default(), 800.0, 600.0).unwrap();
		assert_eq!(state.sim.nodes.len(), 3);
		assert_eq!(state.links, vec![(0, 2), (1, 2)]);
		// Kinded nodes take their color from CSS, not the ordinal scale.
		assert!(state.styles.iter().all(|style| style.color.is_none()));
	}

	#[test]
	fn unknown_link_endpoint_fails_at_build_time() {
		let mut data = payload();
		data.links.push(GraphLink {
			source: NodeId::Str("t1".into()),
			target: NodeId::Str("ghost".into()),
		});
		let err =
			ForceGraphState::new(&data, GraphConfig::default(), 800.0, 600.0).unwrap_err();
		assert_eq!(
			err,
			GraphError::UnknownNode {
				id: NodeId::Str("ghost".into())
			}
		);
	}

	#[test]
	fn duplicate_node_id_fails_at_build_time() {
		let mut data = payload();
		data.nodes.push(GraphNode {
			id: NodeId::Str("t1".into()),
			kind: None,
			label: None,
			group: None,
		});
		let err =
			ForceGraphState::new(&data, GraphConfig::default(), 800.0, 600.0).unwrap_err();
		assert!(matches!(err, GraphError::DuplicateId { .. }));
	}

	#[test]
	fn drag_lifecycle_pins_moves_and_releases() {
		let mut state =
			ForceGraphState::new(&payload(), GraphConfig::default(), 800.0, 600.0).unwrap();

		let (x, y) = (state.sim.nodes[0].x, state.sim.nodes[0].y);
		state.begin_drag(0, x, y);
		assert_eq!(state.sim.nodes[0].fx, Some(x));
		assert_eq!(state.sim.alpha_target, state.config.drag_alpha_target);

		state.drag_to(x + 40.0, y - 25.0);
		assert!(state.drag.moved);
		state.tick();
		assert_eq!(state.sim.nodes[0].x, x + 40.0);
		assert_eq!(state.sim.nodes[0].y, y - 25.0);

		state.end_drag();
		assert!(state.sim.nodes[0].fx.is_none());
		assert_eq!(state.sim.alpha_target, 0.0);
		assert!(!state.drag.active);
	}

	#[test]
	fn tiny_pointer_travel_is_a_click_not_a_drag() {
		let mut state =
			ForceGraphState::new(&payload(), GraphConfig::default(), 800.0, 600.0).unwrap();
		let (x, y) = (state.sim.nodes[1].x, state.sim.nodes[1].y);
		state.begin_drag(1, x, y);
		state.drag_to(x + 1.0, y);
		assert!(!state.drag.moved);
	}

	#[test]
	fn hit_testing_respects_the_configured_radius() {
		let mut state =
			ForceGraphState::new(&payload(), GraphConfig::default(), 800.0, 600.0).unwrap();
		state.sim.nodes[0].x = 100.0;
		state.sim.nodes[0].y = 100.0;
		assert_eq!(state.node_at_position(105.0, 100.0), Some(0));
		assert_eq!(state.node_at_position(400.0, 100.0), None);
	}

	#[test]
	fn kindless_nodes_are_colored_by_the_scale() {
		let data = GraphData {
			nodes: vec![
				GraphNode {
					id: NodeId::Int(0),
					kind: None,
					label: None,
					group: Some(1),
				},
				GraphNode {
					id: NodeId::Int(1),
					kind: None,
					label: None,
					group: Some(1),
				},
			],
			links: vec![],
		};
		let state = ForceGraphState::new(&data, GraphConfig::default(), 800.0, 600.0).unwrap();
		assert!(state.styles[0].color.is_some());
		// Same group, same color.
		assert_eq!(state.styles[0].color, state.styles[1].color);
	}
}
