//! The interactive SVG graph component.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{Element, MouseEvent, Window};

use super::render::{self, Scene};
use super::state::{ForceGraphState, GraphConfig};
use super::types::GraphData;

/// Horizontal offset between the pointer and the tooltip box.
const TOOLTIP_OFFSET_X: f64 = 70.0;

/// Contents and placement of the tooltip for a clicked node.
#[derive(Clone, Debug, PartialEq)]
struct Tooltip {
	x: f64,
	y: f64,
	text: String,
	kind: Option<String>,
}

/// Force-directed node-link view over `data`, rendered as SVG.
///
/// The component owns the simulation: it steps it once per animation
/// frame, maps pointer drags onto pinned positions, and shows a tooltip
/// for the clicked node. Pass a [`GraphConfig`] to tune the forces.
#[component]
pub fn ForceGraphSvg(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(default = GraphConfig::default())] config: GraphConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let svg_ref = NodeRef::<leptos::svg::Svg>::new();
	let state: Rc<RefCell<Option<ForceGraphState>>> = Rc::new(RefCell::new(None));
	let scene: Rc<RefCell<Option<Scene>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (tooltip, set_tooltip) = signal(None::<Tooltip>);

	let (state_init, scene_init, animate_init, resize_cb_init) = (
		state.clone(),
		scene.clone(),
		animate.clone(),
		resize_cb.clone(),
	);

	Effect::new(move |_| {
		let Some(svg) = svg_ref.get() else {
			return;
		};
		let svg: Element = svg.into();
		let window: Window = web_sys::window().unwrap();
		let document = window.document().unwrap();

		let (w, h) = if fullscreen {
			(
				window.inner_width().unwrap().as_f64().unwrap(),
				window.inner_height().unwrap().as_f64().unwrap(),
			)
		} else {
			(
				width.unwrap_or_else(|| {
					svg.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					svg.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		let _ = svg.set_attribute("width", &w.to_string());
		let _ = svg.set_attribute("height", &h.to_string());

		// The payload was validated at load time, so a failure here means
		// the caller bypassed the loader; report it and render nothing.
		let graph_state = match ForceGraphState::new(&data.get(), config.clone(), w, h) {
			Ok(graph_state) => graph_state,
			Err(err) => {
				error!("cannot build graph view: {err}");
				return;
			}
		};
		*scene_init.borrow_mut() = Some(render::build(&graph_state, &document, &svg));
		*state_init.borrow_mut() = Some(graph_state);

		if fullscreen {
			let (state_resize, svg_resize) = (state_init.clone(), svg.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let win: Window = web_sys::window().unwrap();
				let (nw, nh) = (
					win.inner_width().unwrap().as_f64().unwrap(),
					win.inner_height().unwrap().as_f64().unwrap(),
				);
				let _ = svg_resize.set_attribute("width", &nw.to_string());
				let _ = svg_resize.set_attribute("height", &nh.to_string());
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, scene_anim, animate_inner) =
			(state_init.clone(), scene_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick();
				if let Some(ref scene) = *scene_anim.borrow() {
					render::update(s, scene);
				}
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let pointer_position = move |ev: &MouseEvent| {
		let svg: Element = svg_ref.get().unwrap().into();
		let rect = svg.get_bounding_client_rect();
		(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		)
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let (x, y) = pointer_position(&ev);
		if let Some(ref mut s) = *state_md.borrow_mut() {
			if let Some(idx) = s.node_at_position(x, y) {
				s.begin_drag(idx, x, y);
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let (x, y) = pointer_position(&ev);
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.drag.active {
				s.drag_to(x, y);
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let (x, y) = pointer_position(&ev);
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			let dragged = s.drag.active && s.drag.moved;
			s.end_drag();
			if dragged {
				return;
			}
			// A click: select the node under the pointer, or dismiss.
			match s.node_at_position(x, y) {
				Some(idx) => {
					s.selected = Some(idx);
					let style = &s.styles[idx];
					let text = match (&style.label, &style.kind) {
						(Some(label), _) => label.clone(),
						(None, Some(kind)) => format!("{kind} {}", style.id),
						(None, None) => format!("node {}", style.id),
					};
					set_tooltip.set(Some(Tooltip {
						x: x + TOOLTIP_OFFSET_X,
						y,
						text,
						kind: style.kind.clone(),
					}));
				}
				None => {
					s.selected = None;
					set_tooltip.set(None);
				}
			}
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			if s.drag.active {
				s.end_drag();
			}
		}
	};

	view! {
		<div class="force-graph">
			<svg
				node_ref=svg_ref
				class="force-graph-svg"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
			/>
			{move || {
				tooltip
					.get()
					.map(|tip| {
						let class = match &tip.kind {
							Some(kind) => format!("tooltip {kind}"),
							None => "tooltip".to_owned(),
						};
						view! {
							<div class=class style=format!("left: {}px; top: {}px;", tip.x, tip.y)>
								{tip.text}
							</div>
						}
					})
			}}
		</div>
	}
}
