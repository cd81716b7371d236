//! `Canvas` implementation on top of `printpdf` 0.8.
//!
//! printpdf 0.8 is data-oriented: each page is a `Vec<Op>` and the document
//! is serialized once with `PdfDocument::save()`. Text uses the built-in
//! Helvetica faces so no font program is embedded.

use image::RgbImage;
use printpdf::{
    BuiltinFont, Color as PdfColor, Line, LinePoint, Mm, Op, PaintMode, PdfDocument, PdfPage,
    PdfSaveOptions, PdfWarnMsg, Point, Polygon, PolygonRing, Pt, RawImage, RawImageData,
    RawImageFormat, Rgb, TextItem, WindingOrder, XObjectTransform,
};
use tracing::debug;

use crate::report::canvas::{Canvas, Color, PageSize, Rect, TextStyle};
use crate::report::font_metrics::Font;

const BORDER_WIDTH_PT: f32 = 1.0;

pub struct PdfCanvas {
    doc: PdfDocument,
    page_size: PageSize,
    pages: Vec<PdfPage>,
    ops: Vec<Op>,
    page_open: bool,
}

impl PdfCanvas {
    pub fn new(title: &str, page_size: PageSize) -> Self {
        Self {
            doc: PdfDocument::new(title),
            page_size,
            pages: Vec::new(),
            ops: Vec::new(),
            page_open: false,
        }
    }

    /// Closes the last page and serializes the document.
    pub fn finish(mut self) -> Vec<u8> {
        self.close_page();
        let pages = std::mem::take(&mut self.pages);
        let page_count = pages.len();
        self.doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = self.doc.save(&PdfSaveOptions::default(), &mut warnings);
        debug!(
            page_count,
            warnings = warnings.len(),
            bytes = bytes.len(),
            "PDF serialized"
        );
        bytes
    }

    fn close_page(&mut self) {
        if !self.page_open {
            return;
        }
        let ops = std::mem::take(&mut self.ops);
        self.pages.push(PdfPage::new(
            pt_to_mm(self.page_size.width),
            pt_to_mm(self.page_size.height),
            ops,
        ));
        self.page_open = false;
    }

    fn ensure_page(&mut self) {
        if !self.page_open {
            self.begin_page();
        }
    }
}

impl Canvas for PdfCanvas {
    fn page_size(&self) -> PageSize {
        self.page_size
    }

    fn begin_page(&mut self) {
        self.close_page();
        self.page_open = true;
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle) {
        self.ensure_page();
        let font = builtin(style.font);
        self.ops.extend([
            Op::SaveGraphicsState,
            Op::StartTextSection,
            Op::SetFillColor {
                col: pdf_color(style.color),
            },
            Op::SetTextCursor {
                pos: point(x, y),
            },
            Op::SetFontSizeBuiltinFont {
                size: Pt(style.size),
                font,
            },
            Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(text.to_string())],
                font,
            },
            Op::EndTextSection,
            Op::RestoreGraphicsState,
        ]);
    }

    fn draw_rect(&mut self, rect: Rect, fill: Option<Color>, border: Option<Color>) {
        let mode = match (fill, border) {
            (Some(_), Some(_)) => PaintMode::FillStroke,
            (Some(_), None) => PaintMode::Fill,
            (None, Some(_)) => PaintMode::Stroke,
            (None, None) => return,
        };
        self.ensure_page();

        self.ops.push(Op::SaveGraphicsState);
        if let Some(col) = fill {
            self.ops.push(Op::SetFillColor {
                col: pdf_color(col),
            });
        }
        if let Some(col) = border {
            self.ops.push(Op::SetOutlineColor {
                col: pdf_color(col),
            });
            self.ops.push(Op::SetOutlineThickness {
                pt: Pt(BORDER_WIDTH_PT),
            });
        }
        let corners = [
            (rect.x, rect.y),
            (rect.x + rect.width, rect.y),
            (rect.x + rect.width, rect.y + rect.height),
            (rect.x, rect.y + rect.height),
        ];
        self.ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing {
                    points: corners
                        .iter()
                        .map(|&(x, y)| LinePoint {
                            p: point(x, y),
                            bezier: false,
                        })
                        .collect(),
                }],
                mode,
                winding_order: WindingOrder::NonZero,
            },
        });
        self.ops.push(Op::RestoreGraphicsState);
    }

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, color: Color) {
        self.ensure_page();
        self.ops.extend([
            Op::SaveGraphicsState,
            Op::SetOutlineColor {
                col: pdf_color(color),
            },
            Op::SetOutlineThickness { pt: Pt(thickness) },
            Op::DrawLine {
                line: Line {
                    points: vec![
                        LinePoint {
                            p: point(from.0, from.1),
                            bezier: false,
                        },
                        LinePoint {
                            p: point(to.0, to.1),
                            bezier: false,
                        },
                    ],
                    is_closed: false,
                },
            },
            Op::RestoreGraphicsState,
        ]);
    }

    fn embed_image(&mut self, image: &RgbImage, rect: Rect) {
        if image.width() == 0 || image.height() == 0 {
            return;
        }
        self.ensure_page();

        let raw = RawImage {
            pixels: RawImageData::U8(image.as_raw().clone()),
            width: image.width() as usize,
            height: image.height() as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let id = self.doc.add_image(&raw);

        // At 72 dpi one pixel maps to one point, so the scale is the target
        // size over the pixel size.
        self.ops.push(Op::UseXobject {
            id,
            transform: XObjectTransform {
                translate_x: Some(Pt(rect.x)),
                translate_y: Some(Pt(rect.y)),
                scale_x: Some(rect.width / image.width() as f32),
                scale_y: Some(rect.height / image.height() as f32),
                dpi: Some(72.0),
                rotate: None,
            },
        });
    }
}

fn builtin(font: Font) -> BuiltinFont {
    match font {
        Font::Helvetica => BuiltinFont::Helvetica,
        Font::HelveticaBold => BuiltinFont::HelveticaBold,
    }
}

fn pdf_color(color: Color) -> PdfColor {
    PdfColor::Rgb(Rgb::new(color.r, color.g, color.b, None))
}

fn point(x: f32, y: f32) -> Point {
    Point { x: Pt(x), y: Pt(y) }
}

fn pt_to_mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::canvas::A4;

    #[test]
    fn test_finish_produces_pdf_header() {
        let mut canvas = PdfCanvas::new("test", A4);
        canvas.begin_page();
        canvas.draw_text("hello", 50.0, 700.0, TextStyle::regular(10.0, Color::BLACK));
        canvas.draw_rect(
            Rect::new(50.0, 600.0, 100.0, 20.0),
            Some(Color::WHITE),
            Some(Color::BLACK),
        );
        canvas.draw_line((50.0, 590.0), (150.0, 590.0), 1.0, Color::BLACK);
        let bytes = canvas.finish();
        assert!(bytes.starts_with(b"%PDF"), "output should be a PDF");
    }

    #[test]
    fn test_begin_page_twice_yields_two_pages() {
        let mut canvas = PdfCanvas::new("test", A4);
        canvas.begin_page();
        canvas.draw_text("one", 50.0, 700.0, TextStyle::regular(10.0, Color::BLACK));
        canvas.begin_page();
        canvas.draw_text("two", 50.0, 700.0, TextStyle::regular(10.0, Color::BLACK));
        canvas.close_page();
        assert_eq!(canvas.pages.len(), 2);
    }

    #[test]
    fn test_embed_image_registers_xobject_op() {
        let mut canvas = PdfCanvas::new("test", A4);
        canvas.begin_page();
        let img = RgbImage::from_pixel(4, 2, image::Rgb([255, 0, 0]));
        canvas.embed_image(&img, Rect::new(10.0, 10.0, 40.0, 20.0));
        assert!(canvas
            .ops
            .iter()
            .any(|op| matches!(op, Op::UseXobject { .. })));
    }
}
