use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{MouseEvent, WheelEvent};

use super::layout::LayoutKind;
use super::render;
use super::state::ForceGraphState;
use super::types::GraphData;
use crate::components::canvas;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn random_seed() -> u64 {
	(js_sys::Math::random() * u64::MAX as f64) as u64
}

#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(default = LayoutKind::Normal)] layout: LayoutKind,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state = Rc::new(RefCell::new(ForceGraphState::new(
		width.unwrap_or(800.0),
		height.unwrap_or(600.0),
		random_seed(),
	)));
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let resize_cb: FrameCallback = Rc::new(RefCell::new(None));
	let (active_layout, set_active_layout) = signal(layout);
	let tooltip = RwSignal::new(None::<(f64, f64, String)>);

	let state_data = state.clone();
	Effect::new(move |_| {
		let graph = data.get();
		state_data
			.borrow_mut()
			.load(&graph, active_layout.get_untracked());
	});

	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if animate_init.borrow().is_some() {
			return;
		}

		let (w, h) = if fullscreen {
			canvas::window_size().unwrap_or((800.0, 600.0))
		} else {
			let parent = canvas::parent_size(&canvas, (800.0, 600.0));
			(width.unwrap_or(parent.0), height.unwrap_or(parent.1))
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx = match canvas::context_2d(&canvas) {
			Ok(ctx) => ctx,
			Err(err) => {
				error!("graph canvas unavailable: {err}");
				return;
			}
		};
		{
			let mut s = state_init.borrow_mut();
			s.resize(w, h);
			if let Some(kind) = s.engine.layout() {
				s.engine.apply_layout(kind);
			}
		}

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = canvas::window_size() else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				state_resize.borrow_mut().resize(nw, nh);
			}));
			if let (Some(window), Some(cb)) = (web_sys::window(), resize_cb_init.borrow().as_ref()) {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			{
				let mut s = state_anim.borrow_mut();
				if s.engine.is_simulating() {
					s.tick();
				}
				render::render(&s, &ctx);
			}
			if let (Some(window), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let (Some(window), Some(cb)) = (web_sys::window(), animate_init.borrow().as_ref()) {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = canvas::event_point(&canvas, &ev);
		state_md.borrow_mut().pointer_down(x, y);
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = canvas::event_point(&canvas, &ev);
		let mut s = state_mm.borrow_mut();
		s.pointer_move(x, y);
		tooltip.set(s.tooltip().map(|text| (x, y, text)));
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		state_mu.borrow_mut().pointer_up();
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		state_ml.borrow_mut().pointer_leave();
		tooltip.set(None);
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = canvas::event_point(&canvas, &ev);
		state_wh.borrow_mut().zoom_at(x, y, ev.delta_y());
	};

	let on_export = move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if let Err(err) = canvas::download_png(&canvas, "graph.png") {
			error!("PNG export failed: {err}");
		}
	};

	let menu = LayoutKind::ALL
		.into_iter()
		.map(|kind| {
			let state_menu = state.clone();
			view! {
				<button
					class="layout-option"
					class:active=move || active_layout.get() == kind
					on:click=move |_| {
						if state_menu.borrow_mut().select_layout(kind.name()).is_some() {
							set_active_layout.set(kind);
						}
					}
				>
					{kind.label()}
				</button>
			}
		})
		.collect_view();

	view! {
		<div class="force-graph" style="position: relative; width: 100%; height: 100%;">
			<nav class="layout-menu">
				{menu}
				<button class="export-png" on:click=on_export>"Export PNG"</button>
			</nav>
			<canvas
				node_ref=canvas_ref
				class="force-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<pre
				class="graph-tooltip"
				style=move || {
					tooltip
						.with(|t| match t {
							Some((x, y, _)) => {
								format!("visibility: visible; left: {}px; top: {}px;", x + 10.0, y + 10.0)
							}
							None => "visibility: hidden;".to_string(),
						})
				}
			>
				{move || tooltip.with(|t| t.as_ref().map(|(_, _, text)| text.clone()).unwrap_or_default())}
			</pre>
		</div>
	}
}
