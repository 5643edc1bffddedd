//! Browser backend: replays a display list onto a 2D canvas context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`;
//! the top-level caller ([`crate::engine::Engine::render`]) handles the result.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::render::{DrawOp, Stroke};
use crate::surface::Point;

/// Paint `ops` in order. `dpr` is the device pixel ratio of the backing store.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn paint(ctx: &CanvasRenderingContext2d, ops: &[DrawOp], dpr: f64) -> Result<(), JsValue> {
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    for op in ops {
        match op {
            DrawOp::Clear { width, height } => ctx.clear_rect(0.0, 0.0, *width, *height),
            DrawOp::Polygon { points, stroke, fill } => paint_polygon(ctx, points, *stroke, *fill)?,
            DrawOp::Line { from, to, stroke } => {
                ctx.begin_path();
                ctx.move_to(from.x, from.y);
                ctx.line_to(to.x, to.y);
                apply_stroke(ctx, *stroke)?;
                ctx.stroke();
                clear_dash(ctx)?;
            }
            DrawOp::Circle { center, radius, fill, stroke } => {
                ctx.begin_path();
                ctx.arc(center.x, center.y, *radius, 0.0, 2.0 * PI)?;
                if let Some(color) = fill {
                    ctx.set_fill_style_str(color);
                    ctx.fill();
                }
                if let Some(stroke) = stroke {
                    apply_stroke(ctx, *stroke)?;
                    ctx.stroke();
                    clear_dash(ctx)?;
                }
            }
            DrawOp::Text { text, at, font, color } => {
                ctx.set_fill_style_str(color);
                ctx.set_font(font);
                ctx.set_text_align("center");
                ctx.set_text_baseline("middle");
                ctx.fill_text(text, at.x, at.y)?;
            }
        }
    }
    Ok(())
}

fn paint_polygon(
    ctx: &CanvasRenderingContext2d,
    points: &[Point; 4],
    stroke: Stroke,
    fill: Option<&str>,
) -> Result<(), JsValue> {
    let [first, rest @ ..] = points;
    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    for p in rest {
        ctx.line_to(p.x, p.y);
    }
    ctx.close_path();

    apply_stroke(ctx, stroke)?;
    ctx.stroke();
    clear_dash(ctx)?;

    if let Some(color) = fill {
        ctx.set_fill_style_str(color);
        ctx.fill();
    }
    Ok(())
}

fn apply_stroke(ctx: &CanvasRenderingContext2d, stroke: Stroke) -> Result<(), JsValue> {
    ctx.set_stroke_style_str(stroke.color);
    ctx.set_line_width(stroke.width);
    if let Some(dash) = stroke.dash {
        let dash_array = js_sys::Array::new();
        dash_array.push(&dash.into());
        dash_array.push(&dash.into());
        ctx.set_line_dash(&dash_array)?;
    }
    Ok(())
}

fn clear_dash(ctx: &CanvasRenderingContext2d) -> Result<(), JsValue> {
    ctx.set_line_dash(&js_sys::Array::new())
}
