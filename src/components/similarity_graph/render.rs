use web_sys::CanvasRenderingContext2d;

use super::model::{Mark, NODE_HEIGHT, SimilarityView};
use crate::components::force_graph::Point;

const BACKGROUND: &str = "#ffffff";
const NODE_COLOR: &str = "#3182ce";
const HIGHLIGHT_COLOR: &str = "#f39c12";
const CLICKED_COLOR: &str = "#e74c3c";
const EDGE_COLOR: &str = "#9f7aea";
const EDGE_WIDTH: f64 = 3.0;
const ARROW_SIZE: f64 = 10.0;
const CORNER_RADIUS: f64 = 6.0;

pub fn render(view: &SimilarityView, ctx: &CanvasRenderingContext2d, width: f64, height: f64) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);
	draw_edges(view, ctx);
	draw_nodes(view, ctx);
	draw_edge_labels(view, ctx);
}

/// Point where the ray from the box centre towards `toward` leaves the box.
fn box_exit(center: Point, half_w: f64, half_h: f64, toward: Point) -> Point {
	let (dx, dy) = (toward.x - center.x, toward.y - center.y);
	if dx == 0.0 && dy == 0.0 {
		return center;
	}
	let tx = if dx == 0.0 { f64::INFINITY } else { half_w / dx.abs() };
	let ty = if dy == 0.0 { f64::INFINITY } else { half_h / dy.abs() };
	let t = tx.min(ty).min(1.0);
	Point::new(center.x + dx * t, center.y + dy * t)
}

fn draw_edges(view: &SimilarityView, ctx: &CanvasRenderingContext2d) {
	let (nodes, positions) = (view.nodes(), view.positions());
	ctx.set_stroke_style_str(EDGE_COLOR);
	ctx.set_fill_style_str(EDGE_COLOR);
	ctx.set_line_width(EDGE_WIDTH);

	for (i, edge) in view.edges().iter().enumerate() {
		if !view.edge_visible(i) || edge.source == edge.target {
			continue;
		}
		let (from, to) = (positions[edge.source], positions[edge.target]);
		let target = &nodes[edge.target];
		let tip = box_exit(to, target.width() / 2.0, NODE_HEIGHT / 2.0, from);
		let (dx, dy) = (tip.x - from.x, tip.y - from.y);
		let len = (dx * dx + dy * dy).sqrt();
		if len < ARROW_SIZE {
			continue;
		}
		let (ux, uy) = (dx / len, dy / len);
		let back = Point::new(tip.x - ux * ARROW_SIZE, tip.y - uy * ARROW_SIZE);

		ctx.begin_path();
		ctx.move_to(from.x, from.y);
		ctx.line_to(back.x, back.y);
		ctx.stroke();

		let (px, py) = (-uy * ARROW_SIZE * 0.5, ux * ARROW_SIZE * 0.5);
		ctx.begin_path();
		ctx.move_to(tip.x, tip.y);
		ctx.line_to(back.x + px, back.y + py);
		ctx.line_to(back.x - px, back.y - py);
		ctx.close_path();
		ctx.fill();
	}
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	let r = r.min(w / 2.0).min(h / 2.0);
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

fn draw_nodes(view: &SimilarityView, ctx: &CanvasRenderingContext2d) {
	ctx.set_font("12px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for (i, (node, center)) in view.nodes().iter().zip(view.positions()).enumerate() {
		if !view.node_visible(i) {
			continue;
		}
		let fill = match view.node_mark(i) {
			Mark::Plain => NODE_COLOR,
			Mark::Highlighted => HIGHLIGHT_COLOR,
			Mark::Clicked => CLICKED_COLOR,
		};
		let w = node.width().max(NODE_HEIGHT);
		rounded_rect(
			ctx,
			center.x - w / 2.0,
			center.y - NODE_HEIGHT / 2.0,
			w,
			NODE_HEIGHT,
			CORNER_RADIUS,
		);
		ctx.set_fill_style_str(fill);
		ctx.fill();
		ctx.set_fill_style_str("#ffffff");
		let _ = ctx.fill_text(&node.label, center.x, center.y);
	}
}

fn draw_edge_labels(view: &SimilarityView, ctx: &CanvasRenderingContext2d) {
	ctx.set_font("11px sans-serif");
	let positions = view.positions();

	for (i, edge) in view.edges().iter().enumerate() {
		if !view.edge_visible(i) {
			continue;
		}
		let Some(text) = view.edge_label(i) else {
			continue;
		};
		let (a, b) = (positions[edge.source], positions[edge.target]);
		let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
		let w = ctx.measure_text(&text).map(|m| m.width()).unwrap_or(40.0) + 8.0;
		let h = 16.0;

		rounded_rect(ctx, mid.x - w / 2.0, mid.y - h / 2.0, w, h, 3.0);
		ctx.set_fill_style_str("#ffffff");
		ctx.fill();
		ctx.set_stroke_style_str("#cccccc");
		ctx.set_line_width(1.0);
		ctx.stroke();
		ctx.set_fill_style_str("#333333");
		let _ = ctx.fill_text(&text, mid.x, mid.y);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn arrows_stop_at_the_box_border() {
		let c = Point::new(100.0, 100.0);
		assert_eq!(box_exit(c, 20.0, 15.0, Point::new(0.0, 100.0)), Point::new(80.0, 100.0));
		assert_eq!(box_exit(c, 20.0, 15.0, Point::new(100.0, 200.0)), Point::new(100.0, 115.0));
		assert_eq!(box_exit(c, 20.0, 15.0, c), c);
		// source inside the box
		assert_eq!(box_exit(c, 20.0, 15.0, Point::new(105.0, 100.0)), Point::new(105.0, 100.0));
	}
}
