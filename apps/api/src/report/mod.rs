//! Diagnostic report rendering engine.
//!
//! `assembler` lays out the two pages through the `Canvas` port;
//! `serializer` binds that port to `printpdf` and produces the download.
//! Everything in here is synchronous and CPU-bound. Handlers run it inside
//! `tokio::task::spawn_blocking`.

pub mod assembler;
pub mod canvas;
pub mod content;
pub mod cursor;
pub mod font_metrics;
pub mod identifier;
pub mod image_embed;
pub mod pdf_canvas;
pub mod serializer;
pub mod visualizer;
pub mod wrap;

#[cfg(test)]
pub(crate) mod recording;

pub use serializer::{render_report, CONTENT_TYPE};
