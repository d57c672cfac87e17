use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scene::Line;
use super::state::ForceGraphState;

const BACKGROUND: &str = "#ffffff";
const ARROW_SIZE: f64 = 6.0;
const LABEL_FONT_PX: f64 = 9.0;

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let has_highlight = state.has_active_highlight();
	let edges = &state.engine.graph().edges;

	for line in &state.engine.scene().lines {
		let lit = edges
			.get(line.edge)
			.is_some_and(|e| state.is_highlighted(e.source) && state.is_highlighted(e.target));
		let alpha = match (has_highlight, lit) {
			(false, _) => 0.8,
			(true, true) => 1.0,
			(true, false) => 0.15,
		};
		ctx.set_global_alpha(alpha);
		draw_arrow(ctx, line, k);
	}
	ctx.set_global_alpha(1.0);
}

fn draw_arrow(ctx: &CanvasRenderingContext2d, line: &Line, k: f64) {
	let radius = super::scene::NODE_RADIUS;
	let (dx, dy) = (line.to.x - line.from.x, line.to.y - line.from.y);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);
	let arrow = ARROW_SIZE * line.width.max(1.0).sqrt() / k.max(0.5);

	ctx.set_stroke_style_str(&line.color);
	ctx.set_line_width(line.width / k.max(0.5));
	ctx.begin_path();
	ctx.move_to(line.from.x, line.from.y);
	ctx.line_to(
		line.to.x - ux * (radius + arrow),
		line.to.y - uy * (radius + arrow),
	);
	ctx.stroke();

	let (tip_x, tip_y) = (line.to.x - ux * radius, line.to.y - uy * radius);
	let (back_x, back_y) = (tip_x - ux * arrow, tip_y - uy * arrow);
	let (px, py) = (-uy * arrow * 0.5, ux * arrow * 0.5);
	ctx.set_fill_style_str(&line.color);
	ctx.begin_path();
	ctx.move_to(tip_x, tip_y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let has_highlight = state.has_active_highlight();
	let scene = state.engine.scene();

	for circle in &scene.circles {
		let dimmed = has_highlight && !state.is_highlighted(circle.node);
		ctx.set_global_alpha(if dimmed { 0.3 } else { 1.0 });
		ctx.begin_path();
		let _ = ctx.arc(circle.center.x, circle.center.y, circle.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(circle.color);
		ctx.fill();

		if state.is_hovered(circle.node) {
			ctx.begin_path();
			let _ = ctx.arc(
				circle.center.x,
				circle.center.y,
				circle.radius + 2.0 / k,
				0.0,
				2.0 * PI,
			);
			ctx.set_stroke_style_str("#222222");
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}
	}

	ctx.set_font(&format!("{}px sans-serif", LABEL_FONT_PX / k.max(0.5)));
	for label in &scene.labels {
		let dimmed = has_highlight && !state.is_highlighted(label.node);
		ctx.set_global_alpha(if dimmed { 0.3 } else { 1.0 });
		ctx.set_fill_style_str("#333333");
		let _ = ctx.fill_text(&label.text, label.anchor.x, label.anchor.y);
	}
	ctx.set_global_alpha(1.0);
}
