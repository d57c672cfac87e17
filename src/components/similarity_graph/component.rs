use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use web_sys::{CanvasRenderingContext2d, Event, MouseEvent};

use super::model::{LabelMode, SimilarityView};
use super::render;
use crate::components::canvas;
use crate::components::force_graph::{GraphData, Point, Viewport};

struct Surface {
	view: SimilarityView,
	ctx: Option<CanvasRenderingContext2d>,
	viewport: Viewport,
	rng: SmallRng,
}

impl Surface {
	fn redraw(&self) {
		if let Some(ctx) = &self.ctx {
			render::render(&self.view, ctx, self.viewport.width, self.viewport.height);
		}
	}
}

/// Term similarity graph with a word picker and edge label mode switch.
#[component]
pub fn SimilarityGraph(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(default = 800.0)] width: f64,
	#[prop(default = 600.0)] height: f64,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let surface = Rc::new(RefCell::new(Surface {
		view: SimilarityView::default(),
		ctx: None,
		viewport: Viewport::new(width, height),
		rng: SmallRng::seed_from_u64((js_sys::Math::random() * u64::MAX as f64) as u64),
	}));
	let options = RwSignal::new(Vec::<(String, String)>::new());
	let selected = RwSignal::new(String::new());
	let mode = RwSignal::new(LabelMode::default());

	let surface_data = surface.clone();
	Effect::new(move |_| {
		let graph = data.get();
		let mut s = surface_data.borrow_mut();
		let mut view = SimilarityView::from_data(&graph);
		view.set_label_mode(mode.get_untracked());
		let viewport = s.viewport;
		view.layout(viewport, &mut s.rng);
		options.set(
			view.node_options()
				.into_iter()
				.map(|n| (n.id.clone(), n.label.clone()))
				.collect(),
		);
		selected.set(String::new());
		s.view = view;
		s.redraw();
	});

	let surface_init = surface.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		canvas.set_width(width as u32);
		canvas.set_height(height as u32);
		match canvas::context_2d(&canvas) {
			Ok(ctx) => {
				let mut s = surface_init.borrow_mut();
				s.ctx = Some(ctx);
				s.redraw();
			}
			Err(err) => error!("similarity canvas unavailable: {err}"),
		}
	});

	let surface_click = surface.clone();
	let on_click = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = canvas::event_point(&canvas, &ev);
		let at = Point::new(x, y);
		let mut s = surface_click.borrow_mut();
		if let Some(idx) = s.view.node_at(at) {
			let id = s.view.nodes()[idx].id.clone();
			debug!("similarity node clicked: {id}");
			s.view.click_node(&id);
		} else if let Some(idx) = s.view.edge_at(at) {
			let id = s.view.edges()[idx].id.clone();
			s.view.click_edge(&id);
		} else {
			return;
		}
		s.redraw();
	};

	let surface_pick = surface.clone();
	let on_pick = move |ev: Event| {
		let id = event_target_value(&ev);
		let mut s = surface_pick.borrow_mut();
		s.view.select_word(&id);
		selected.set(id);
		s.redraw();
	};

	let surface_mode = surface.clone();
	let on_mode = move |ev: Event| match event_target_value(&ev).parse::<LabelMode>() {
		Ok(next) => {
			mode.set(next);
			let mut s = surface_mode.borrow_mut();
			s.view.set_label_mode(next);
			s.redraw();
		}
		Err(err) => debug!("{err}"),
	};

	view! {
		<div class="similarity-graph">
			<div class="similarity-controls">
				<select class="word-picker" on:change=on_pick prop:value=move || selected.get()>
					<option value="">"Select a word"</option>
					{move || {
						options
							.get()
							.into_iter()
							.map(|(id, label)| view! { <option value=id>{label}</option> })
							.collect_view()
					}}
				</select>
				<select class="label-mode" on:change=on_mode prop:value=move || mode.get().value().to_string()>
					<option value=LabelMode::Numeric.value()>"Numeric"</option>
					<option value=LabelMode::Text.value()>"Text"</option>
				</select>
			</div>
			<canvas
				node_ref=canvas_ref
				class="similarity-graph-canvas"
				on:click=on_click
				style="display: block; cursor: pointer;"
			/>
		</div>
	}
}
