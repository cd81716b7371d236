//! Canvas port: the only surface the assembler draws through.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner of
//! the page. Rectangles are anchored at their bottom-left corner.

use image::RgbImage;

use crate::report::font_metrics::Font;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// ISO A4 in points.
pub const A4: PageSize = PageSize {
    width: 595.0,
    height: 842.0,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub color: Color,
}

impl TextStyle {
    pub const fn regular(size: f32, color: Color) -> Self {
        Self {
            font: Font::Helvetica,
            size,
            color,
        }
    }

    pub const fn bold(size: f32, color: Color) -> Self {
        Self {
            font: Font::HelveticaBold,
            size,
            color,
        }
    }
}

/// Drawing backend for the report. Implementations may target a PDF library,
/// an SVG pipeline or a test recorder without the assembler changing.
pub trait Canvas {
    fn page_size(&self) -> PageSize;

    /// Starts a new blank page; subsequent calls draw onto it.
    fn begin_page(&mut self);

    /// Draws a single line of text with its baseline at `y`.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle);

    /// Draws a rectangle, filled and/or outlined with a 1pt border.
    fn draw_rect(&mut self, rect: Rect, fill: Option<Color>, border: Option<Color>);

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, color: Color);

    /// Places `image` scaled into `rect`.
    fn embed_image(&mut self, image: &RgbImage, rect: Rect);
}
