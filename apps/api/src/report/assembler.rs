//! Document assembler: two pages of ordered content regions.
//!
//! Every region is a plain function `(canvas, context, cursor) -> cursor`.
//! Page 1 is the patient-facing summary, page 2 the technical and visual
//! explanation. Regions draw relative to the cursor they are handed and
//! return it advanced past their content; the footer draws in the reserved
//! band below the cursor floor and leaves the cursor untouched.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::models::prediction::{Analysis, Prediction, PredictionRecord};
use crate::report::canvas::{Canvas, Color, PageSize, Rect, TextStyle, A4};
use crate::report::content;
use crate::report::cursor::RenderCursor;
use crate::report::font_metrics::measure;
use crate::report::identifier::format_identifier;
use crate::report::image_embed::{embed_heatmap, BoundingBox, EmbedOutcome};
use crate::report::visualizer::{
    draw_confidence_bar, draw_metric_grid, format_percent, resolve_metrics, GridLayout,
    DEFAULT_MODEL_VERSION,
};
use crate::report::wrap::{block_height, truncate_to_width, wrap_text};

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page: PageSize,
    pub margin: f32,
    /// Height of the band at the bottom of each page reserved for the footer.
    pub footer_reserve: f32,
}

impl PageLayout {
    pub fn content_width(&self) -> f32 {
        self.page.width - 2.0 * self.margin
    }

    pub fn cursor(&self) -> RenderCursor {
        RenderCursor::new(self.page.height, self.footer_reserve)
    }
}

pub const A4_LAYOUT: PageLayout = PageLayout {
    page: A4,
    margin: 50.0,
    footer_reserve: 70.0,
};

pub const HEATMAP_BOX: BoundingBox = BoundingBox {
    max_width: 300.0,
    max_height: 220.0,
};

const HEADER_BAND: f32 = 100.0;
const HEADER_ADVANCE: f32 = 120.0;
const SECTION_TITLE_ADVANCE: f32 = 25.0;
const SECTION_GAP: f32 = 15.0;

const BODY_LINE_HEIGHT: f32 = 14.0;
const BULLET_LINE_HEIGHT: f32 = 15.0;
const SMALL_LINE_HEIGHT: f32 = 10.0;
const SPEC_ROW_HEIGHT: f32 = 18.0;
const LEGEND_LINE_HEIGHT: f32 = 13.0;

const HEADER_FILL: Color = Color::rgb(0.05, 0.2, 0.45);
const SUBTITLE_COLOR: Color = Color::rgb(0.9, 0.9, 0.9);
const SECTION_COLOR: Color = Color::rgb(0.1, 0.1, 0.4);
const LABEL_COLOR: Color = Color::rgb(0.3, 0.3, 0.3);
const BODY_COLOR: Color = Color::rgb(0.2, 0.2, 0.2);
const MUTED_COLOR: Color = Color::rgb(0.5, 0.5, 0.5);
const PANEL_FILL: Color = Color::rgb(0.97, 0.97, 0.98);
const PANEL_BORDER: Color = Color::rgb(0.8, 0.8, 0.85);
const STRIPE_FILL: Color = Color::rgb(0.95, 0.96, 0.98);
const WARNING_FILL: Color = Color::rgb(1.0, 0.95, 0.9);
const WARNING_BORDER: Color = Color::rgb(0.9, 0.6, 0.2);
const WARNING_TITLE: Color = Color::rgb(0.7, 0.3, 0.0);
const WARNING_BODY: Color = Color::rgb(0.3, 0.2, 0.0);
const NOTICE_FILL: Color = Color::rgb(0.93, 0.96, 1.0);
const NOTICE_BORDER: Color = Color::rgb(0.5, 0.65, 0.9);

fn result_color(prediction: Prediction) -> Color {
    match prediction {
        Prediction::Benign => Color::rgb(0.1, 0.6, 0.2),
        Prediction::Malignant => Color::rgb(0.8, 0.1, 0.1),
    }
}

fn result_background(prediction: Prediction) -> Color {
    match prediction {
        Prediction::Benign => Color::rgb(0.9, 0.98, 0.92),
        Prediction::Malignant => Color::rgb(0.98, 0.92, 0.92),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Context and region tables
// ────────────────────────────────────────────────────────────────────────────

/// Everything a region may read. Regions never mutate it.
pub struct ReportContext<'a> {
    pub record: &'a PredictionRecord,
    pub readable_id: String,
    pub generated_at: DateTime<Utc>,
    pub layout: PageLayout,
}

impl<'a> ReportContext<'a> {
    pub fn new(record: &'a PredictionRecord, generated_at: DateTime<Utc>, layout: PageLayout) -> Self {
        Self {
            record,
            readable_id: format_identifier(&record.id),
            generated_at,
            layout,
        }
    }
}

pub type Region = fn(&mut dyn Canvas, &ReportContext<'_>, RenderCursor) -> RenderCursor;

const SUMMARY_PAGE: &[Region] = &[
    header,
    patient_and_report_info,
    diagnostic_findings,
    clinical_interpretation,
    metrics_grid,
    recommendations,
    footer,
];

const TECHNICAL_PAGE: &[Region] = &[
    header,
    visualization_block,
    technical_specifications,
    disclaimer,
    footer,
];

pub const PAGES: &[&[Region]] = &[SUMMARY_PAGE, TECHNICAL_PAGE];

/// Draws every page onto `canvas`. Returns the cursor after the last region.
pub fn assemble(canvas: &mut dyn Canvas, ctx: &ReportContext<'_>) -> RenderCursor {
    if canvas.page_size() != ctx.layout.page {
        warn!(
            canvas = ?canvas.page_size(),
            layout = ?ctx.layout.page,
            "Canvas page size differs from the report layout"
        );
    }

    let mut cursor = ctx.layout.cursor();
    for (index, regions) in PAGES.iter().enumerate() {
        if index > 0 {
            cursor = cursor.next_page();
        }
        canvas.begin_page();
        for region in regions.iter() {
            cursor = region(&mut *canvas, ctx, cursor);
        }
    }
    cursor
}

// ────────────────────────────────────────────────────────────────────────────
// Shared pieces
// ────────────────────────────────────────────────────────────────────────────

fn section_title(
    canvas: &mut dyn Canvas,
    ctx: &ReportContext<'_>,
    cursor: RenderCursor,
    title: &str,
) -> RenderCursor {
    let style = TextStyle::bold(12.0, SECTION_COLOR);
    let x = ctx.layout.margin;
    let baseline = cursor.block_top(SECTION_TITLE_ADVANCE) - 12.0;
    canvas.draw_text(title, x, baseline, style);
    let underline = measure(title, style.font, style.size) + 10.0;
    canvas.draw_line((x, baseline - 3.0), (x + underline, baseline - 3.0), 1.5, SECTION_COLOR);
    cursor.advance(SECTION_TITLE_ADVANCE)
}

fn right_aligned_x(text: &str, style: TextStyle, right_edge: f32) -> f32 {
    right_edge - measure(text, style.font, style.size)
}

// ────────────────────────────────────────────────────────────────────────────
// Regions shared by both pages
// ────────────────────────────────────────────────────────────────────────────

fn header(canvas: &mut dyn Canvas, ctx: &ReportContext<'_>, cursor: RenderCursor) -> RenderCursor {
    let PageSize { width, height } = ctx.layout.page;
    let margin = ctx.layout.margin;

    canvas.draw_rect(
        Rect::new(0.0, height - HEADER_BAND, width, HEADER_BAND),
        Some(HEADER_FILL),
        None,
    );
    // Medical cross.
    canvas.draw_rect(Rect::new(margin, height - 85.0, 15.0, 50.0), Some(Color::WHITE), None);
    canvas.draw_rect(
        Rect::new(margin - 10.0, height - 70.0, 35.0, 20.0),
        Some(Color::WHITE),
        None,
    );

    canvas.draw_text(
        content::REPORT_TITLE,
        margin + 50.0,
        height - 55.0,
        TextStyle::bold(22.0, Color::WHITE),
    );
    let subtitle = if cursor.page() == 0 {
        content::REPORT_SUBTITLE
    } else {
        "Technical Details & Visual Explanation"
    };
    canvas.draw_text(
        subtitle,
        margin + 50.0,
        height - 78.0,
        TextStyle::regular(12.0, SUBTITLE_COLOR),
    );

    let id_style = TextStyle::regular(9.0, SUBTITLE_COLOR);
    let id_text = format!("Ref. {}", ctx.readable_id);
    canvas.draw_text(
        &id_text,
        right_aligned_x(&id_text, id_style, width - margin),
        height - 78.0,
        id_style,
    );

    cursor.advance(HEADER_ADVANCE)
}

fn footer(canvas: &mut dyn Canvas, ctx: &ReportContext<'_>, cursor: RenderCursor) -> RenderCursor {
    let PageSize { width, .. } = ctx.layout.page;
    let margin = ctx.layout.margin;
    let baseline = 40.0;
    let style = TextStyle::regular(8.0, MUTED_COLOR);

    canvas.draw_line(
        (margin, baseline + 15.0),
        (width - margin, baseline + 15.0),
        0.5,
        Color::rgb(0.7, 0.7, 0.7),
    );
    canvas.draw_text(content::SYSTEM_NAME, margin, baseline, style);

    let page_label = format!("Page {} of {}", cursor.page() + 1, PAGES.len());
    let page_width = measure(&page_label, style.font, style.size);
    canvas.draw_text(&page_label, (width - page_width) / 2.0, baseline, style);

    let generated = format!(
        "Report generated on {}",
        ctx.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    canvas.draw_text(
        &generated,
        right_aligned_x(&generated, style, width - margin),
        baseline,
        style,
    );

    cursor
}

// ────────────────────────────────────────────────────────────────────────────
// Page 1: summary
// ────────────────────────────────────────────────────────────────────────────

fn patient_and_report_info(
    canvas: &mut dyn Canvas,
    ctx: &ReportContext<'_>,
    cursor: RenderCursor,
) -> RenderCursor {
    const BOX_HEIGHT: f32 = 85.0;
    let record = ctx.record;
    let x = ctx.layout.margin;
    let width = ctx.layout.content_width();
    let top = cursor.block_top(BOX_HEIGHT);

    canvas.draw_rect(
        Rect::new(x, top - BOX_HEIGHT, width, BOX_HEIGHT),
        Some(PANEL_FILL),
        Some(PANEL_BORDER),
    );

    let title_style = TextStyle::bold(11.0, Color::rgb(0.2, 0.2, 0.5));
    canvas.draw_text("REPORT INFORMATION", x + 10.0, top - 20.0, title_style);
    let underline = measure("REPORT INFORMATION", title_style.font, title_style.size);
    canvas.draw_line(
        (x + 10.0, top - 23.0),
        (x + 10.0 + underline, top - 23.0),
        1.0,
        title_style.color,
    );

    let label = TextStyle::bold(10.0, LABEL_COLOR);
    let value = TextStyle::regular(10.0, Color::BLACK);
    let left_value_x = x + 100.0;
    let right_label_x = x + 260.0;
    let right_value_x = x + 345.0;
    let left_value_width = right_label_x - left_value_x - 10.0;
    let right_value_width = x + width - 10.0 - right_value_x;
    let fit = |text: &str, max: f32| {
        truncate_to_width(text, max, |s| measure(s, value.font, value.size))
    };

    let left = [
        ("Report ID:", ctx.readable_id.clone()),
        ("Patient Name:", record.owner.display_name().to_string()),
        ("Report Date:", record.timestamp.format("%B %-d, %Y").to_string()),
    ];
    let right = [
        ("Analysis Type:", content::analysis_label(&record.analysis).to_string()),
        (
            "Model Version:",
            record
                .metrics
                .version
                .clone()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL_VERSION.to_string()),
        ),
        ("Analysis Time:", record.timestamp.format("%H:%M UTC").to_string()),
    ];

    for (row, ((l_label, l_value), (r_label, r_value))) in left.iter().zip(right.iter()).enumerate() {
        let y = top - 40.0 - row as f32 * 15.0;
        canvas.draw_text(l_label, x + 10.0, y, label);
        canvas.draw_text(&fit(l_value, left_value_width), left_value_x, y, value);
        canvas.draw_text(r_label, right_label_x, y, label);
        canvas.draw_text(&fit(r_value, right_value_width), right_value_x, y, value);
    }

    cursor.advance(BOX_HEIGHT + 25.0)
}

fn diagnostic_findings(
    canvas: &mut dyn Canvas,
    ctx: &ReportContext<'_>,
    cursor: RenderCursor,
) -> RenderCursor {
    const BOX_HEIGHT: f32 = 115.0;
    let record = ctx.record;
    let x = ctx.layout.margin;
    let color = result_color(record.prediction);
    let top = cursor.block_top(BOX_HEIGHT);

    canvas.draw_rect(
        Rect::new(x, top - BOX_HEIGHT, ctx.layout.content_width(), BOX_HEIGHT),
        Some(result_background(record.prediction)),
        Some(color),
    );

    let title_style = TextStyle::bold(13.0, color);
    canvas.draw_text("DIAGNOSTIC FINDINGS", x + 10.0, top - 22.0, title_style);
    let underline = measure("DIAGNOSTIC FINDINGS", title_style.font, title_style.size);
    canvas.draw_line((x + 10.0, top - 26.0), (x + 10.0 + underline, top - 26.0), 2.0, color);

    canvas.draw_text(
        content::headline(record.prediction),
        x + 10.0,
        top - 50.0,
        TextStyle::bold(20.0, color),
    );

    let label = TextStyle::bold(11.0, BODY_COLOR);
    let value = TextStyle::bold(14.0, color);
    canvas.draw_text("Classification:", x + 10.0, top - 74.0, label);
    canvas.draw_text(
        &record.prediction.as_str().to_uppercase(),
        x + 120.0,
        top - 74.0,
        value,
    );
    canvas.draw_text("AI Confidence:", x + 10.0, top - 97.0, label);
    canvas.draw_text(&format_percent(record.confidence), x + 120.0, top - 97.0, value);

    draw_confidence_bar(canvas, x + 250.0, top - 99.0, record.confidence, color);

    cursor.advance(BOX_HEIGHT + 25.0)
}

fn clinical_interpretation(
    canvas: &mut dyn Canvas,
    ctx: &ReportContext<'_>,
    cursor: RenderCursor,
) -> RenderCursor {
    let cursor = section_title(canvas, ctx, cursor, "CLINICAL INTERPRETATION");
    let style = TextStyle::regular(10.0, BODY_COLOR);
    let lines = wrap_text(
        content::interpretation(ctx.record.prediction),
        ctx.layout.content_width(),
        |s| measure(s, style.font, style.size),
    );
    let height = block_height(lines.len(), BODY_LINE_HEIGHT);
    let top = cursor.block_top(height);

    for (i, line) in lines.iter().enumerate() {
        canvas.draw_text(
            line,
            ctx.layout.margin,
            top - 10.0 - i as f32 * BODY_LINE_HEIGHT,
            style,
        );
    }
    cursor.advance(height + SECTION_GAP)
}

fn metrics_grid(canvas: &mut dyn Canvas, ctx: &ReportContext<'_>, cursor: RenderCursor) -> RenderCursor {
    let cursor = section_title(canvas, ctx, cursor, "AI MODEL PERFORMANCE METRICS");
    let metrics = resolve_metrics(&ctx.record.metrics, ctx.record.kind());
    let gap = 15.0;
    let grid = GridLayout {
        x: ctx.layout.margin,
        column_width: (ctx.layout.content_width() - gap) / 2.0,
        column_gap: gap,
        row_height: 50.0,
    };
    draw_metric_grid(canvas, &metrics, grid, cursor).advance(10.0)
}

fn recommendations(
    canvas: &mut dyn Canvas,
    ctx: &ReportContext<'_>,
    cursor: RenderCursor,
) -> RenderCursor {
    let mut cursor = section_title(canvas, ctx, cursor, "RECOMMENDATIONS");
    let style = TextStyle::regular(10.0, BODY_COLOR);
    let indent = 12.0;
    let x = ctx.layout.margin;

    for item in content::recommendations(ctx.record.prediction) {
        let lines = wrap_text(item, ctx.layout.content_width() - indent, |s| {
            measure(s, style.font, style.size)
        });
        let height = block_height(lines.len(), BULLET_LINE_HEIGHT);
        let top = cursor.block_top(height);
        canvas.draw_text("-", x, top - 10.0, style);
        for (i, line) in lines.iter().enumerate() {
            canvas.draw_text(line, x + indent, top - 10.0 - i as f32 * BULLET_LINE_HEIGHT, style);
        }
        cursor = cursor.advance(height);
    }
    cursor.advance(10.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Page 2: technical
// ────────────────────────────────────────────────────────────────────────────

fn visualization_block(
    canvas: &mut dyn Canvas,
    ctx: &ReportContext<'_>,
    cursor: RenderCursor,
) -> RenderCursor {
    match &ctx.record.analysis {
        Analysis::Image(image) => {
            let cursor = section_title(canvas, ctx, cursor, "AI MODEL EXPLAINABILITY (GRAD-CAM)");
            let (cursor, outcome) = embed_heatmap(
                canvas,
                image.gradcam.as_deref(),
                HEATMAP_BOX,
                ctx.layout.margin,
                ctx.layout.content_width(),
                cursor,
            );
            match outcome {
                EmbedOutcome::Embedded { .. } => heatmap_legend(canvas, ctx, cursor),
                EmbedOutcome::Fallback => cursor.advance(SECTION_GAP),
            }
        }
        Analysis::Tabular(_) => tabular_notice(canvas, ctx, cursor),
    }
}

fn heatmap_legend(canvas: &mut dyn Canvas, ctx: &ReportContext<'_>, cursor: RenderCursor) -> RenderCursor {
    let style = TextStyle::regular(9.0, BODY_COLOR);
    let height = block_height(content::HEATMAP_LEGEND.len(), LEGEND_LINE_HEIGHT);
    let top = cursor.block_top(height);
    for (i, line) in content::HEATMAP_LEGEND.iter().enumerate() {
        canvas.draw_text(
            line,
            ctx.layout.margin,
            top - 9.0 - i as f32 * LEGEND_LINE_HEIGHT,
            style,
        );
    }
    cursor.advance(height + SECTION_GAP)
}

fn tabular_notice(canvas: &mut dyn Canvas, ctx: &ReportContext<'_>, cursor: RenderCursor) -> RenderCursor {
    let cursor = section_title(canvas, ctx, cursor, "ANALYSIS METHOD");
    let x = ctx.layout.margin;
    let width = ctx.layout.content_width();
    let style = TextStyle::regular(9.0, BODY_COLOR);
    let lines = wrap_text(content::TABULAR_NOTICE, width - 20.0, |s| {
        measure(s, style.font, style.size)
    });
    let box_height = 30.0 + block_height(lines.len(), 12.0) + 8.0;
    let top = cursor.block_top(box_height);

    canvas.draw_rect(
        Rect::new(x, top - box_height, width, box_height),
        Some(NOTICE_FILL),
        Some(NOTICE_BORDER),
    );
    canvas.draw_text(
        content::TABULAR_NOTICE_TITLE,
        x + 10.0,
        top - 18.0,
        TextStyle::bold(10.0, SECTION_COLOR),
    );
    for (i, line) in lines.iter().enumerate() {
        canvas.draw_text(line, x + 10.0, top - 34.0 - i as f32 * 12.0, style);
    }
    cursor.advance(box_height + SECTION_GAP)
}

fn technical_specifications(
    canvas: &mut dyn Canvas,
    ctx: &ReportContext<'_>,
    cursor: RenderCursor,
) -> RenderCursor {
    let cursor = section_title(canvas, ctx, cursor, "TECHNICAL SPECIFICATIONS");
    let rows = content::technical_specifications(&ctx.record.analysis);
    let x = ctx.layout.margin;
    let width = ctx.layout.content_width();
    let label = TextStyle::bold(9.0, LABEL_COLOR);
    let value = TextStyle::regular(9.0, Color::BLACK);
    let value_x = x + 160.0;
    let height = block_height(rows.len(), SPEC_ROW_HEIGHT);
    let top = cursor.block_top(height);

    for (i, (name, text)) in rows.iter().enumerate() {
        let row_top = top - i as f32 * SPEC_ROW_HEIGHT;
        if i % 2 == 0 {
            canvas.draw_rect(
                Rect::new(x, row_top - SPEC_ROW_HEIGHT, width, SPEC_ROW_HEIGHT),
                Some(STRIPE_FILL),
                None,
            );
        }
        canvas.draw_text(name, x + 10.0, row_top - 12.5, label);
        let shown = truncate_to_width(text, x + width - 10.0 - value_x, |s| {
            measure(s, value.font, value.size)
        });
        canvas.draw_text(&shown, value_x, row_top - 12.5, value);
    }
    cursor.advance(height + SECTION_GAP)
}

fn disclaimer(canvas: &mut dyn Canvas, ctx: &ReportContext<'_>, cursor: RenderCursor) -> RenderCursor {
    let x = ctx.layout.margin;
    let width = ctx.layout.content_width();
    let style = TextStyle::regular(8.0, WARNING_BODY);
    let lines = wrap_text(content::DISCLAIMER, width - 20.0, |s| {
        measure(s, style.font, style.size)
    });
    let box_height = 30.0 + block_height(lines.len(), SMALL_LINE_HEIGHT) + 8.0;
    let top = cursor.block_top(box_height);

    canvas.draw_rect(
        Rect::new(x, top - box_height, width, box_height),
        Some(WARNING_FILL),
        Some(WARNING_BORDER),
    );
    canvas.draw_text(
        "! IMPORTANT MEDICAL DISCLAIMER",
        x + 10.0,
        top - 20.0,
        TextStyle::bold(11.0, WARNING_TITLE),
    );
    for (i, line) in lines.iter().enumerate() {
        canvas.draw_text(
            line,
            x + 10.0,
            top - 35.0 - i as f32 * SMALL_LINE_HEIGHT,
            style,
        );
    }
    cursor.advance(box_height + 10.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::prediction::{ImageAnalysis, ModelMetrics, TabularAnalysis, UserSnapshot};
    use crate::report::image_embed::tests::png_base64;
    use crate::report::recording::{DrawOp, RecordingCanvas};
    use crate::report::visualizer::{CONFIDENCE_TRACK_HEIGHT, CONFIDENCE_TRACK_WIDTH};
    use chrono::TimeZone;
    use serde_json::json;

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 9, 30, 0).unwrap()
    }

    fn make_record(prediction: Prediction, confidence: f64, analysis: Analysis) -> PredictionRecord {
        PredictionRecord {
            id: "img-pred-1700000000000-abc123xyz".to_string(),
            prediction,
            confidence,
            metrics: ModelMetrics::default(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            user_id: "user_1".to_string(),
            owner: UserSnapshot {
                id: Some("user_1".to_string()),
                email: Some("jane@example.com".to_string()),
                username: Some("jane".to_string()),
                role: Some("user".to_string()),
            },
            analysis,
        }
    }

    fn image(gradcam: Option<String>) -> Analysis {
        Analysis::Image(ImageAnalysis {
            gradcam,
            input: json!({ "fileName": "scan.png" }),
        })
    }

    fn tabular() -> Analysis {
        Analysis::Tabular(TabularAnalysis {
            input: json!({ "radius_mean": 14.2 }),
        })
    }

    fn render(record: &PredictionRecord) -> RecordingCanvas {
        let ctx = ReportContext::new(record, generated_at(), A4_LAYOUT);
        let mut canvas = RecordingCanvas::new();
        assemble(&mut canvas, &ctx);
        canvas
    }

    #[test]
    fn test_produces_two_pages_with_footers() {
        let record = make_record(Prediction::Benign, 91.0, tabular());
        let canvas = render(&record);
        assert_eq!(canvas.pages.len(), 2);
        assert!(canvas.has_text(0, "Page 1 of 2"));
        assert!(canvas.has_text(1, "Page 2 of 2"));
        assert!(canvas.has_text(0, "Report generated on 2024-03-02 09:30 UTC"));
    }

    #[test]
    fn test_malignant_image_summary_page() {
        let record = make_record(
            Prediction::Malignant,
            82.3,
            image(Some(png_base64(224, 224))),
        );
        let canvas = render(&record);

        assert!(canvas.has_text(0, "CANCER SIGNS FOUND"));
        assert!(!canvas.has_text(0, "NO CANCER SIGNS FOUND"));
        assert!(canvas.has_text(0, "MALIGNANT"));
        assert!(canvas.has_text(0, "82.3%"));
        assert!(canvas.has_text(0, "IMG-00000-ABC123"));
        assert!(canvas.has_text(0, "Schedule immediate consultation with an oncologist"));

        // Confidence bar: 200pt track, filled portion ~82% of it.
        let filled = canvas
            .rects(0)
            .into_iter()
            .find(|r| r.height == CONFIDENCE_TRACK_HEIGHT && r.width < CONFIDENCE_TRACK_WIDTH)
            .expect("confidence fill missing");
        assert!((filled.width - 0.823 * CONFIDENCE_TRACK_WIDTH).abs() < 1e-3);
    }

    #[test]
    fn test_benign_summary_uses_benign_copy() {
        let record = make_record(Prediction::Benign, 97.5, tabular());
        let canvas = render(&record);
        assert!(canvas.has_text(0, "NO CANCER SIGNS FOUND"));
        assert!(canvas.has_text(0, "BENIGN"));
        assert!(canvas.has_text(0, "Keep this report for your medical records"));
        assert!(canvas.has_text(0, "Clinical Data Analysis"));
    }

    #[test]
    fn test_valid_heatmap_is_embedded_on_page_two() {
        let record = make_record(Prediction::Malignant, 82.3, image(Some(png_base64(640, 480))));
        let canvas = render(&record);

        let images = canvas.images();
        assert_eq!(images.len(), 1);
        let DrawOp::Image { rect, .. } = images[0] else {
            panic!("expected image op");
        };
        assert!(rect.width <= HEATMAP_BOX.max_width + 1e-3);
        assert!(rect.height <= HEATMAP_BOX.max_height + 1e-3);
        assert!((rect.width / rect.height - 640.0 / 480.0).abs() < 1e-3);
        assert!(canvas.pages[1].iter().any(|op| matches!(op, DrawOp::Image { .. })));
        assert!(canvas.has_text(1, "Red / yellow areas"));
        assert!(!canvas.has_text(1, "Grad-CAM visualization unavailable"));
    }

    #[test]
    fn test_corrupt_heatmap_falls_back_and_render_completes() {
        let record = make_record(
            Prediction::Malignant,
            82.3,
            image(Some("data:image/png;base64,iVBORw0KGgoAAAA".to_string())),
        );
        let canvas = render(&record);

        assert_eq!(canvas.pages.len(), 2);
        assert!(canvas.images().is_empty());
        assert!(canvas.has_text(1, "Grad-CAM visualization unavailable"));
        assert!(!canvas.has_text(1, "Red / yellow areas"));
        assert!(canvas.has_text(1, "TECHNICAL SPECIFICATIONS"));
        assert!(canvas.has_text(1, "IMPORTANT MEDICAL DISCLAIMER"));
    }

    #[test]
    fn test_tabular_never_touches_image_path() {
        let record = make_record(Prediction::Benign, 64.0, tabular());
        let canvas = render(&record);

        assert!(canvas.images().is_empty());
        assert!(canvas.has_text(1, content::TABULAR_NOTICE_TITLE));
        assert!(!canvas.has_text(1, "GRAD-CAM"));
        assert!(!canvas.has_text(1, "Grad-CAM visualization unavailable"));
        assert!(canvas.has_text(1, "XGBoost gradient-boosted trees"));
    }

    #[test]
    fn test_text_never_enters_footer_band() {
        for record in [
            make_record(Prediction::Malignant, 82.3, image(Some(png_base64(100, 900)))),
            make_record(Prediction::Benign, 10.0, tabular()),
        ] {
            let canvas = render(&record);
            for page in &canvas.pages {
                for op in page {
                    if let DrawOp::Text { text, y, .. } = op {
                        let is_footer = text.starts_with("Page ")
                            || text.starts_with("Report generated")
                            || text == content::SYSTEM_NAME;
                        if !is_footer {
                            assert!(
                                *y >= A4_LAYOUT.footer_reserve - 12.0,
                                "'{text}' drawn in footer band at {y}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_cursor_ends_on_second_page_above_floor() {
        let record = make_record(Prediction::Malignant, 50.0, image(None));
        let ctx = ReportContext::new(&record, generated_at(), A4_LAYOUT);
        let mut canvas = RecordingCanvas::new();
        let cursor = assemble(&mut canvas, &ctx);
        assert_eq!(cursor.page(), 1);
        assert!(cursor.y() >= A4_LAYOUT.footer_reserve);
    }

    #[test]
    fn test_identical_input_draws_identically() {
        let record = make_record(Prediction::Benign, 73.4, image(Some(png_base64(32, 16))));
        assert_eq!(render(&record).pages, render(&record).pages);
    }

    #[test]
    fn test_missing_model_version_uses_default() {
        let record = make_record(Prediction::Benign, 73.4, tabular());
        let canvas = render(&record);
        assert!(canvas.has_text(0, DEFAULT_MODEL_VERSION));
    }
}
