//! Canvas drawing. The only module that touches `CanvasRenderingContext2d`.
//!
//! One pass per frame: reset the transform for the device pixel ratio, clear
//! to the stage color, apply the camera transform, then walk the layers in
//! fixed order drawing each node at its world position. All clamping and
//! ordering decisions were made upstream; this module just paints.

use std::collections::HashMap;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::consts::{LOCK_TINT, STAGE_FILL};
use crate::scene::{Layer, MediaKind, Node, NodeId, NodeKind, Scene};
use crate::viewport::Viewport;

/// Draw the whole scene through the viewport's camera.
///
/// # Errors
///
/// Returns `Err` when a canvas call fails; the caller logs and drops the
/// frame rather than unwinding.
pub(crate) fn draw(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene,
    viewport: &Viewport,
    images: &HashMap<NodeId, HtmlImageElement>,
    dpr: f64,
) -> Result<(), JsValue> {
    let screen = viewport.screen_size();

    // Backing store is dpr-scaled; draw in CSS pixel coordinates.
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, screen.width, screen.height);
    ctx.set_fill_style_str(STAGE_FILL);
    ctx.fill_rect(0.0, 0.0, screen.width, screen.height);

    // Camera: screen center, then scale, then world offset.
    ctx.save();
    ctx.translate(screen.width * 0.5, screen.height * 0.5)?;
    ctx.scale(viewport.scale(), viewport.scale())?;
    let center = viewport.center();
    ctx.translate(-center.x, -center.y)?;

    for layer in Layer::ORDER {
        for node in scene.layer_nodes(layer) {
            if !node.visible || node.opacity <= 0.0 {
                continue;
            }
            ctx.set_global_alpha(node.opacity);
            draw_node(ctx, node, images)?;
        }
    }

    ctx.set_global_alpha(1.0);
    ctx.restore();
    Ok(())
}

fn draw_node(
    ctx: &CanvasRenderingContext2d,
    node: &Node,
    images: &HashMap<NodeId, HtmlImageElement>,
) -> Result<(), JsValue> {
    match &node.kind {
        NodeKind::Fill { color } => {
            ctx.set_fill_style_str(color);
            ctx.fill_rect(node.x, node.y, node.width, node.height);
        }
        NodeKind::Text { content, color, font_size } => {
            ctx.set_fill_style_str(color);
            ctx.set_font(&format!("{font_size}px sans-serif"));
            ctx.set_text_baseline("top");
            ctx.fill_text(content, node.x, node.y)?;
        }
        NodeKind::Image { .. } => match images.get(&node.id) {
            Some(image) => {
                ctx.draw_image_with_html_image_element_and_dw_and_dh(
                    image,
                    node.x,
                    node.y,
                    node.width,
                    node.height,
                )?;
            }
            // Element not in the shell's map (e.g. core-only node): gray box.
            None => {
                ctx.set_fill_style_str("#c3c7cd");
                ctx.fill_rect(node.x, node.y, node.width, node.height);
            }
        },
        NodeKind::Placeholder { media, label } => {
            draw_placeholder(ctx, node, *media, label)?;
        }
        NodeKind::Block { .. } => {
            // Layout blocks render as faint outlines so authors can see the
            // margin structure without it competing with content.
            ctx.set_stroke_style_str("#d4d7dc");
            ctx.set_line_width(1.0);
            ctx.stroke_rect(node.x, node.y, node.width, node.height);
        }
        NodeKind::Overlay => {
            ctx.set_fill_style_str(LOCK_TINT);
            ctx.fill_rect(node.x, node.y, node.width, node.height);
        }
    }
    Ok(())
}

fn draw_placeholder(
    ctx: &CanvasRenderingContext2d,
    node: &Node,
    media: MediaKind,
    label: &str,
) -> Result<(), JsValue> {
    let fill = match media {
        MediaKind::Audio => "#e4ddf4",
        MediaKind::Video => "#2b2f36",
    };
    ctx.set_fill_style_str(fill);
    ctx.fill_rect(node.x, node.y, node.width, node.height);
    ctx.set_stroke_style_str("#9aa0a9");
    ctx.set_line_width(1.0);
    ctx.stroke_rect(node.x, node.y, node.width, node.height);

    ctx.set_fill_style_str(match media {
        MediaKind::Audio => "#52425f",
        MediaKind::Video => "#e8e9ec",
    });
    ctx.set_font("13px sans-serif");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.fill_text(label, node.x + node.width * 0.5, node.y + node.height * 0.5)?;
    ctx.set_text_align("start");
    Ok(())
}
