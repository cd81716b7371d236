//! Grad-CAM heatmap embedding.
//!
//! Decoding failures never abort the report: the heatmap region is replaced
//! by a bordered notice and layout continues.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::RgbImage;
use thiserror::Error;
use tracing::{debug, warn};

use crate::report::canvas::{Canvas, Color, Rect, TextStyle};
use crate::report::cursor::RenderCursor;
use crate::report::font_metrics::measure;

pub const CAPTION_HEIGHT: f32 = 18.0;
pub const FALLBACK_HEIGHT: f32 = 62.0;

const FALLBACK_BOX_HEIGHT: f32 = 50.0;
const FALLBACK_FILL: Color = Color::rgb(1.0, 0.97, 0.93);
const FALLBACK_BORDER: Color = Color::rgb(0.9, 0.6, 0.2);
const FALLBACK_TITLE_COLOR: Color = Color::rgb(0.7, 0.3, 0.0);
const FALLBACK_BODY_COLOR: Color = Color::rgb(0.3, 0.2, 0.0);
const CAPTION_COLOR: Color = Color::rgb(0.4, 0.4, 0.4);

const CAPTION: &str = "Figure 1: Grad-CAM heatmap of the regions that most influenced the classification";
const FALLBACK_TITLE: &str = "! Grad-CAM visualization unavailable";
const FALLBACK_BODY: &str =
    "The heatmap for this analysis could not be decoded. The findings on page 1 are unaffected.";

/// Why a heatmap could not be embedded. Always recovered locally.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("no heatmap payload")]
    Missing,

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("undecodable image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image has no pixels")]
    Empty,
}

/// Maximum size the heatmap may occupy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub max_width: f32,
    pub max_height: f32,
}

/// Result of an embedding attempt, for callers that want to know which
/// branch was drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedOutcome {
    Embedded { width: f32, height: f32 },
    Fallback,
}

/// Decodes a base64 heatmap, accepting either a bare payload or a
/// `data:image/...;base64,` URL.
pub fn decode_gradcam(payload: &str) -> Result<RgbImage, EmbedError> {
    let body = match payload.trim().strip_prefix("data:") {
        Some(url) => url.split_once(',').map(|(_, data)| data).unwrap_or(""),
        None => payload,
    };
    let cleaned: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(EmbedError::Missing);
    }

    let bytes = STANDARD.decode(cleaned.as_bytes())?;
    let image = image::load_from_memory(&bytes)?.to_rgb8();
    if image.width() == 0 || image.height() == 0 {
        return Err(EmbedError::Empty);
    }
    Ok(image)
}

/// Largest size with the intrinsic aspect ratio that fits the box.
///
/// `scale = min(max_w / w, max_h / h)`; images smaller than the box are
/// scaled up.
pub fn fit_within(width: u32, height: u32, bounds: BoundingBox) -> (f32, f32) {
    if width == 0 || height == 0 {
        return (0.0, 0.0);
    }
    let (w, h) = (width as f32, height as f32);
    let scale = (bounds.max_width / w).min(bounds.max_height / h);
    (w * scale, h * scale)
}

/// Draws the heatmap centered in the content column with a caption below,
/// or the fallback notice when the payload cannot be used.
pub fn embed_heatmap(
    canvas: &mut dyn Canvas,
    payload: Option<&str>,
    bounds: BoundingBox,
    content_x: f32,
    content_width: f32,
    cursor: RenderCursor,
) -> (RenderCursor, EmbedOutcome) {
    let decoded = payload
        .ok_or(EmbedError::Missing)
        .and_then(decode_gradcam);

    let image = match decoded {
        Ok(image) => image,
        Err(e) => {
            warn!(error = %e, "Grad-CAM heatmap could not be embedded; drawing fallback");
            let cursor = draw_fallback(canvas, content_x, content_width, cursor);
            return (cursor, EmbedOutcome::Fallback);
        }
    };

    let (width, height) = fit_within(image.width(), image.height(), bounds);
    let top = cursor.block_top(height + CAPTION_HEIGHT);
    let x = content_x + (content_width - width) / 2.0;
    canvas.embed_image(&image, Rect::new(x, top - height, width, height));

    let caption_style = TextStyle::regular(8.0, CAPTION_COLOR);
    let caption_width = measure(CAPTION, caption_style.font, caption_style.size);
    canvas.draw_text(
        CAPTION,
        content_x + (content_width - caption_width).max(0.0) / 2.0,
        top - height - 12.0,
        caption_style,
    );

    debug!(
        intrinsic_w = image.width(),
        intrinsic_h = image.height(),
        width,
        height,
        "Heatmap embedded"
    );
    (
        cursor.advance(height + CAPTION_HEIGHT),
        EmbedOutcome::Embedded { width, height },
    )
}

fn draw_fallback(
    canvas: &mut dyn Canvas,
    content_x: f32,
    content_width: f32,
    cursor: RenderCursor,
) -> RenderCursor {
    let top = cursor.block_top(FALLBACK_BOX_HEIGHT);
    canvas.draw_rect(
        Rect::new(content_x, top - FALLBACK_BOX_HEIGHT, content_width, FALLBACK_BOX_HEIGHT),
        Some(FALLBACK_FILL),
        Some(FALLBACK_BORDER),
    );
    canvas.draw_text(
        FALLBACK_TITLE,
        content_x + 10.0,
        top - 20.0,
        TextStyle::bold(10.0, FALLBACK_TITLE_COLOR),
    );
    canvas.draw_text(
        FALLBACK_BODY,
        content_x + 10.0,
        top - 36.0,
        TextStyle::regular(8.0, FALLBACK_BODY_COLOR),
    );
    cursor.advance(FALLBACK_HEIGHT)
}
