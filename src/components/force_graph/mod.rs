mod component;
mod fetch;
mod render;
pub mod scale;
mod state;
mod types;

pub use component::ForceGraphSvg;
pub use fetch::load_graph;
pub use state::GraphConfig;
pub use types::{GraphData, GraphError, GraphLink, GraphNode, NodeId};
