use leptos::prelude::*;

use crate::components::force_graph::{ForceGraphSvg, GraphData, GraphLink, GraphNode, NodeId};

/// Build a barbell graph: two cliques of `m` nodes joined by a path of
/// `p` nodes, the same shape the reference data endpoint serves.
fn barbell_graph(m: usize, p: usize) -> GraphData {
	let total = 2 * m + p;
	let id = |i: usize| NodeId::Int(i as i64);

	let nodes = (0..total)
		.map(|i| {
			let group = if i < m {
				0
			} else if i < m + p {
				1
			} else {
				2
			};
			GraphNode {
				id: id(i),
				kind: None,
				label: Some(format!("Node {i}")),
				group: Some(group),
			}
		})
		.collect();

	let mut links = Vec::new();
	let mut clique = |from: usize, to: usize| {
		for i in from..to {
			for j in (i + 1)..to {
				links.push(GraphLink {
					source: id(i),
					target: id(j),
				});
			}
		}
	};
	clique(0, m);
	clique(m + p, total);
	// Bridge the cliques through the path nodes.
	let mut prev = m - 1;
	for i in m..(m + p) {
		links.push(GraphLink {
			source: id(prev),
			target: id(i),
		});
		prev = i;
	}
	links.push(GraphLink {
		source: id(prev),
		target: id(m + p),
	});

	GraphData { nodes, links }
}

/// Self-contained demo page; no backend required.
#[component]
pub fn Demo() -> impl IntoView {
	let graph_data = Signal::derive(move || barbell_graph(6, 3));

	view! {
		<div class="fullscreen-graph">
			<ForceGraphSvg data=graph_data fullscreen=true />
			<div class="graph-overlay">
				<h1>"Demo Graph"</h1>
				<p class="subtitle">"A barbell graph laid out live. Drag nodes to reposition."</p>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn barbell_has_expected_shape() {
		let data = barbell_graph(6, 3);
		assert_eq!(data.nodes.len(), 15);
		// Two K6 cliques (15 edges each) plus a 3-node path (4 edges).
		assert_eq!(data.links.len(), 34);
		data.validate().unwrap();
	}

	#[test]
	fn barbell_groups_split_bells_from_path() {
		let data = barbell_graph(6, 3);
		assert_eq!(data.nodes[0].group, Some(0));
		assert_eq!(data.nodes[6].group, Some(1));
		assert_eq!(data.nodes[14].group, Some(2));
	}
}
