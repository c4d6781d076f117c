//! One-shot download of the graph payload.

use log::{debug, error};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use super::types::{GraphData, GraphError};

/// Fetch, decode and validate the graph payload at `url`.
///
/// Every failure here is fatal to initialization: the caller reports the
/// error and renders nothing rather than a partial graph.
pub async fn load_graph(url: &str) -> Result<GraphData, GraphError> {
	let result = fetch_json(url).await;
	match &result {
		Ok(data) => debug!(
			"loaded graph from {url}: {} nodes, {} links",
			data.nodes.len(),
			data.links.len()
		),
		Err(err) => error!("graph load from {url} failed: {err}"),
	}
	result
}

async fn fetch_json(url: &str) -> Result<GraphData, GraphError> {
	let window =
		web_sys::window().ok_or_else(|| GraphError::Fetch("no window object".into()))?;
	let response = JsFuture::from(window.fetch_with_str(url))
		.await
		.map_err(|err| GraphError::Fetch(format!("{err:?}")))?;
	let response: Response = response
		.dyn_into()
		.map_err(|_| GraphError::Fetch("fetch resolved to a non-Response value".into()))?;
	if !response.ok() {
		return Err(GraphError::Http {
			status: response.status(),
		});
	}

	let body = response
		.text()
		.map_err(|err| GraphError::Fetch(format!("{err:?}")))?;
	let body = JsFuture::from(body)
		.await
		.map_err(|err| GraphError::Fetch(format!("{err:?}")))?;
	let body = body
		.as_string()
		.ok_or_else(|| GraphError::Fetch("response body was not text".into()))?;

	let data: GraphData =
		serde_json::from_str(&body).map_err(|err| GraphError::Parse(err.to_string()))?;
	data.validate()?;
	Ok(data)
}
