//! In-memory `Canvas` that records every call, for layout tests.

use image::RgbImage;

use crate::report::canvas::{Canvas, Color, PageSize, Rect, TextStyle, A4};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        text: String,
        x: f32,
        y: f32,
        style: TextStyle,
    },
    Rect {
        rect: Rect,
        fill: Option<Color>,
        border: Option<Color>,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        thickness: f32,
    },
    Image {
        width_px: u32,
        height_px: u32,
        rect: Rect,
    },
}

#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub pages: Vec<Vec<DrawOp>>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, op: DrawOp) {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        if let Some(page) = self.pages.last_mut() {
            page.push(op);
        }
    }

    pub fn text_op(&self, page: usize, needle: &str) -> Option<&DrawOp> {
        self.pages.get(page)?.iter().find(
            |op| matches!(op, DrawOp::Text { text, .. } if text.contains(needle)),
        )
    }

    pub fn has_text(&self, page: usize, needle: &str) -> bool {
        self.text_op(page, needle).is_some()
    }

    pub fn images(&self) -> Vec<&DrawOp> {
        self.pages
            .iter()
            .flatten()
            .filter(|op| matches!(op, DrawOp::Image { .. }))
            .collect()
    }

    pub fn rects(&self, page: usize) -> Vec<Rect> {
        self.pages
            .get(page)
            .into_iter()
            .flatten()
            .filter_map(|op| match op {
                DrawOp::Rect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn page_size(&self) -> PageSize {
        A4
    }

    fn begin_page(&mut self) {
        self.pages.push(Vec::new());
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle) {
        self.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            style,
        });
    }

    fn draw_rect(&mut self, rect: Rect, fill: Option<Color>, border: Option<Color>) {
        self.push(DrawOp::Rect { rect, fill, border });
    }

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, _color: Color) {
        self.push(DrawOp::Line {
            from,
            to,
            thickness,
        });
    }

    fn embed_image(&mut self, image: &RgbImage, rect: Rect) {
        self.push(DrawOp::Image {
            width_px: image.width(),
            height_px: image.height(),
            rect,
        });
    }
}
