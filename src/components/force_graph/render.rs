//! SVG scene construction and per-frame position updates.
//!
//! The scene is built once per dataset (one line per link, one circle per
//! node); afterwards only positional attributes are touched each frame.

use web_sys::{Document, Element};

use super::state::ForceGraphState;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Handles to the elements the per-frame update mutates.
pub struct Scene {
	lines: Vec<Element>,
	circles: Vec<Element>,
}

/// Create the link and node elements under `svg` and return their handles.
///
/// Any children from a previous dataset are dropped first.
pub fn build(state: &ForceGraphState, document: &Document, svg: &Element) -> Scene {
	svg.set_inner_html("");

	let links_group = create(document, "g");
	let _ = links_group.set_attribute("class", "links");
	let mut lines = Vec::with_capacity(state.links.len());
	for _ in &state.links {
		let line = create(document, "line");
		let _ = links_group.append_child(&line);
		lines.push(line);
	}

	let nodes_group = create(document, "g");
	let _ = nodes_group.set_attribute("class", "nodes");
	let mut circles = Vec::with_capacity(state.styles.len());
	for style in &state.styles {
		let circle = create(document, "circle");
		let _ = circle.set_attribute("r", &state.config.node_radius.to_string());
		let class = match &style.kind {
			Some(kind) => format!("node {kind}"),
			None => "node".to_owned(),
		};
		let _ = circle.set_attribute("class", &class);
		if let Some(color) = &style.color {
			let _ = circle.set_attribute("fill", color);
		}

		// Native hover text, cheaper than any tooltip machinery.
		let title = create(document, "title");
		title.set_text_content(Some(&style.id.to_string()));
		let _ = circle.append_child(&title);

		let _ = nodes_group.append_child(&circle);
		circles.push(circle);
	}

	let _ = svg.append_child(&links_group);
	let _ = svg.append_child(&nodes_group);
	Scene { lines, circles }
}

/// Push current simulation positions into the SVG attributes.
pub fn update(state: &ForceGraphState, scene: &Scene) {
	for (line, &(source, target)) in scene.lines.iter().zip(&state.links) {
		let (Some(s), Some(t)) = (state.sim.nodes.get(source), state.sim.nodes.get(target))
		else {
			continue;
		};
		let _ = line.set_attribute("x1", &coord(s.x));
		let _ = line.set_attribute("y1", &coord(s.y));
		let _ = line.set_attribute("x2", &coord(t.x));
		let _ = line.set_attribute("y2", &coord(t.y));
	}

	for (i, (circle, node)) in scene.circles.iter().zip(&state.sim.nodes).enumerate() {
		let _ = circle.set_attribute("cx", &coord(node.x));
		let _ = circle.set_attribute("cy", &coord(node.y));
		let stroke = if state.selected == Some(i) { "3" } else { "1.5" };
		let _ = circle.set_attribute("stroke-width", stroke);
	}
}

fn create(document: &Document, tag: &str) -> Element {
	document.create_element_ns(Some(SVG_NS), tag).unwrap()
}

fn coord(v: f64) -> String {
	format!("{v:.2}")
}
