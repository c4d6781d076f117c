//! Wire types for the graph payload and the errors that can reject it.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::sim::SimError;

/// Node identity as it appears on the wire: a string or an integer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
	/// Integer id, as emitted by graph-library exporters.
	Int(i64),
	/// String id.
	Str(String),
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NodeId::Int(id) => write!(f, "{id}"),
			NodeId::Str(id) => f.write_str(id),
		}
	}
}

/// One node of the fetched graph.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphNode {
	/// Unique identity; links refer to it.
	pub id: NodeId,
	/// Visual category, mapped to a style class (e.g. "tweet", "hashtag").
	#[serde(default)]
	pub kind: Option<String>,
	/// Human-readable label; exporters may call this "name".
	#[serde(default, alias = "name", deserialize_with = "scalar_string")]
	pub label: Option<String>,
	/// Grouping hint used for color assignment when no kind is set.
	#[serde(default)]
	pub group: Option<u32>,
}

/// One link of the fetched graph, by raw endpoint ids.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphLink {
	/// Id of the source node.
	pub source: NodeId,
	/// Id of the target node.
	pub target: NodeId,
}

/// The full `{ nodes, links }` payload.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphData {
	/// All nodes.
	pub nodes: Vec<GraphNode>,
	/// All links; endpoints must resolve within `nodes`.
	pub links: Vec<GraphLink>,
}

impl GraphData {
	/// Referential integrity check, run once at load time.
	///
	/// A link naming an unknown node is a configuration error in the data
	/// source and is never tolerated silently.
	pub fn validate(&self) -> Result<(), GraphError> {
		let mut seen = HashSet::with_capacity(self.nodes.len());
		for node in &self.nodes {
			if !seen.insert(&node.id) {
				return Err(GraphError::DuplicateId {
					id: node.id.clone(),
				});
			}
		}
		for link in &self.links {
			for id in [&link.source, &link.target] {
				if !seen.contains(id) {
					return Err(GraphError::UnknownNode { id: (*id).clone() });
				}
			}
		}
		Ok(())
	}
}

/// Labels arrive as strings or bare numbers; normalize to a string.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<serde_json::Value>::deserialize(deserializer)?;
	Ok(value.map(|value| match value {
		serde_json::Value::String(s) => s,
		other => other.to_string(),
	}))
}

/// Everything that can go wrong between requesting the payload and
/// handing a resolved graph to the simulation. All fatal: the view
/// renders an error instead of a partial graph.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GraphError {
	/// The request itself failed (network, CORS, missing window).
	#[error("failed to fetch graph data: {0}")]
	Fetch(String),
	/// The endpoint answered with a non-success status.
	#[error("graph endpoint returned HTTP {status}")]
	Http {
		/// The HTTP status code.
		status: u16,
	},
	/// The body was not the expected JSON shape.
	#[error("failed to parse graph payload: {0}")]
	Parse(String),
	/// A link referenced an id missing from the node set.
	#[error("link references unknown node id \"{id}\"")]
	UnknownNode {
		/// The unresolvable id.
		id: NodeId,
	},
	/// Two nodes shared one id.
	#[error("duplicate node id \"{id}\"")]
	DuplicateId {
		/// The repeated id.
		id: NodeId,
	},
	/// The layout engine rejected the resolved graph.
	#[error(transparent)]
	Sim(#[from] SimError),
}
