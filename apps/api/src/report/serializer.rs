//! Output serializer. Drives the assembler onto a PDF canvas and packages
//! the finished bytes with their download metadata.

use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::{debug, error};

use crate::errors::AppError;
use crate::models::prediction::PredictionRecord;
use crate::report::assembler::{assemble, ReportContext, A4_LAYOUT};
use crate::report::content::REPORT_TITLE;
use crate::report::pdf_canvas::PdfCanvas;

pub const CONTENT_TYPE: &str = "application/pdf";

const FALLBACK_NAME: &str = "Patient";

/// RFC 5987 `attr-char`: everything else in an extended value is
/// percent-encoded.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// A finished report, ready to be streamed back to the caller.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub bytes: Vec<u8>,
    /// ASCII name for the quoted `filename` parameter.
    pub filename: String,
    /// Set when the display name carries characters the ASCII name had to drop.
    pub filename_utf8: Option<String>,
}

impl ReportDocument {
    pub fn content_disposition(&self) -> String {
        match &self.filename_utf8 {
            Some(name) => format!(
                "attachment; filename=\"{}\"; filename*=UTF-8''{}",
                self.filename,
                utf8_percent_encode(name, ATTR_CHAR)
            ),
            None => format!("attachment; filename=\"{}\"", self.filename),
        }
    }
}

fn sanitize_name(display_name: &str, keep: impl Fn(char) -> bool) -> String {
    let name: String = display_name
        .trim()
        .chars()
        .filter_map(|c| match c {
            '-' | '_' | '.' => Some(c),
            c if c.is_whitespace() => Some('_'),
            c if keep(c) => Some(c),
            _ => None,
        })
        .collect();
    name.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// `<readable-id>-<display-name>.pdf`, safe to place inside a quoted
/// `Content-Disposition` parameter.
pub fn build_filename(readable_id: &str, display_name: &str) -> String {
    let name = sanitize_name(display_name, |c| c.is_ascii_alphanumeric());
    let name = if name.is_empty() { FALLBACK_NAME } else { &name };
    format!("{readable_id}-{name}.pdf")
}

/// Same shape as [`build_filename`] but keeps non-ASCII letters and digits.
/// `None` when it would add nothing over the ASCII name.
pub fn build_unicode_filename(readable_id: &str, display_name: &str) -> Option<String> {
    let name = sanitize_name(display_name, char::is_alphanumeric);
    if name.is_ascii() {
        return None;
    }
    Some(format!("{readable_id}-{name}.pdf"))
}

/// Builds the complete two-page report for `record`.
///
/// CPU-bound: call from `spawn_blocking`. `generated_at` is printed in the
/// footer; fixing it makes the drawing sequence identical across calls.
pub fn render_report(
    record: &PredictionRecord,
    generated_at: DateTime<Utc>,
) -> Result<ReportDocument, AppError> {
    let ctx = ReportContext::new(record, generated_at, A4_LAYOUT);
    let title = format!("{REPORT_TITLE} {}", ctx.readable_id);

    let mut canvas = PdfCanvas::new(&title, A4_LAYOUT.page);
    let cursor = assemble(&mut canvas, &ctx);
    let bytes = canvas.finish();

    if bytes.is_empty() {
        error!(prediction_id = %record.id, "PDF serializer produced no bytes");
        return Err(AppError::RenderFailure(format!(
            "empty document for {}",
            record.id
        )));
    }

    debug!(
        prediction_id = %record.id,
        pages = cursor.page() + 1,
        bytes = bytes.len(),
        "Report rendered"
    );

    let display_name = record.owner.display_name();
    Ok(ReportDocument {
        filename: build_filename(&ctx.readable_id, display_name),
        filename_utf8: build_unicode_filename(&ctx.readable_id, display_name),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::prediction::{
        Analysis, ImageAnalysis, ModelMetrics, Prediction, TabularAnalysis, UserSnapshot,
    };
    use crate::report::image_embed::tests::png_base64;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(analysis: Analysis, username: Option<&str>) -> PredictionRecord {
        PredictionRecord {
            id: "tab-pred-1700000012345-9f8e7d6c".to_string(),
            prediction: Prediction::Benign,
            confidence: 88.8,
            metrics: ModelMetrics::default(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap(),
            user_id: "user_9".to_string(),
            owner: UserSnapshot {
                username: username.map(str::to_string),
                ..Default::default()
            },
            analysis,
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 11, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_filename_uses_readable_id_and_name() {
        assert_eq!(
            build_filename("TAB-12345-9F8E7D", "jane"),
            "TAB-12345-9F8E7D-jane.pdf"
        );
    }

    #[test]
    fn test_filename_strips_header_unsafe_characters() {
        assert_eq!(
            build_filename("IMG-00000-ABC123", "Jane \"Doe\"; x=y"),
            "IMG-00000-ABC123-Jane_Doe_xy.pdf"
        );
        assert_eq!(build_filename("IMG-00000-ABC123", "   "), "IMG-00000-ABC123-Patient.pdf");
        assert_eq!(build_filename("IMG-00000-ABC123", "\u{5f20}\u{4f1f}"), "IMG-00000-ABC123-Patient.pdf");
    }

    #[test]
    fn test_content_disposition_is_attachment() {
        let doc = ReportDocument {
            bytes: vec![1],
            filename: "A-b.pdf".to_string(),
            filename_utf8: None,
        };
        assert_eq!(doc.content_disposition(), "attachment; filename=\"A-b.pdf\"");
    }

    #[test]
    fn test_unicode_name_survives_in_extended_filename() {
        assert_eq!(
            build_filename("IMG-00000-ABC123", "M\u{fc}ller"),
            "IMG-00000-ABC123-Mller.pdf"
        );
        assert_eq!(
            build_unicode_filename("IMG-00000-ABC123", "M\u{fc}ller").as_deref(),
            Some("IMG-00000-ABC123-M\u{fc}ller.pdf")
        );
        assert_eq!(build_unicode_filename("IMG-00000-ABC123", "Jane Doe"), None);
        assert_eq!(build_unicode_filename("IMG-00000-ABC123", "   "), None);
    }

    #[test]
    fn test_content_disposition_percent_encodes_unicode_name() {
        let doc = ReportDocument {
            bytes: vec![1],
            filename: build_filename("IMG-00000-ABC123", "M\u{fc}ller"),
            filename_utf8: build_unicode_filename("IMG-00000-ABC123", "M\u{fc}ller"),
        };
        assert_eq!(
            doc.content_disposition(),
            "attachment; filename=\"IMG-00000-ABC123-Mller.pdf\"; \
             filename*=UTF-8''IMG-00000-ABC123-M%C3%BCller.pdf"
        );

        let doc = ReportDocument {
            bytes: vec![1],
            filename: build_filename("IMG-00000-ABC123", "\u{5f20}\u{4f1f}"),
            filename_utf8: build_unicode_filename("IMG-00000-ABC123", "\u{5f20}\u{4f1f}"),
        };
        assert_eq!(
            doc.content_disposition(),
            "attachment; filename=\"IMG-00000-ABC123-Patient.pdf\"; \
             filename*=UTF-8''IMG-00000-ABC123-%E5%BC%A0%E4%BC%9F.pdf"
        );
    }

    #[test]
    fn test_renders_tabular_pdf() {
        let rec = record(
            Analysis::Tabular(TabularAnalysis {
                input: json!({ "radius_mean": 12.0 }),
            }),
            Some("jane"),
        );
        let doc = render_report(&rec, at()).unwrap();
        assert!(doc.bytes.starts_with(b"%PDF"));
        assert_eq!(doc.filename, "TAB-12345-9F8E7D-jane.pdf");
    }

    #[test]
    fn test_renders_image_pdf_with_and_without_heatmap() {
        for gradcam in [Some(png_base64(64, 48)), Some("garbage".to_string()), None] {
            let rec = record(
                Analysis::Image(ImageAnalysis {
                    gradcam,
                    input: json!({}),
                }),
                None,
            );
            let doc = render_report(&rec, at()).unwrap();
            assert!(doc.bytes.starts_with(b"%PDF"));
            assert!(doc.filename.ends_with("-Patient.pdf"));
        }
    }
}
