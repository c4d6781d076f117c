//! CSR entry point.

use hashtag_graph::App;
use leptos::prelude::*;

fn main() {
	hashtag_graph::init_logging();
	leptos::mount::mount_to_body(|| view! { <App /> });
}
