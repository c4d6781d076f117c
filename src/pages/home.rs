use leptos::prelude::*;

use crate::components::force_graph::{ForceGraphSvg, load_graph};

/// Endpoint serving the `{ nodes, links }` payload.
const DATA_URL: &str = "/data";

/// Default Home Page: fetch the graph once and render it fullscreen.
///
/// A load failure of any sort is fatal to initialization; the error
/// boundary reports it and no partial graph is drawn.
#[component]
pub fn Home() -> impl IntoView {
	let graph = LocalResource::new(move || load_graph(DATA_URL));

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<Suspense fallback=|| {
				view! { <p class="loading">"Loading graph..."</p> }
			}>
				{move || Suspend::new(async move {
					graph
						.await
						.map(|data| {
							view! {
								<div class="fullscreen-graph">
									<ForceGraphSvg
										data=Signal::derive(move || data.clone())
										fullscreen=true
									/>
									<div class="graph-overlay">
										<h1>"Hashtag Graph"</h1>
										<p class="subtitle">
											"Drag nodes to reposition. Click a node for details."
										</p>
									</div>
								</div>
							}
						})
				})}
			</Suspense>
		</ErrorBoundary>
	}
}
