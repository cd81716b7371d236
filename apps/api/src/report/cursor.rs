//! Vertical layout cursor threaded through every content region.
//!
//! The cursor is a plain `Copy` value: regions take it in and hand the
//! advanced one back. `y` is a PDF offset (origin bottom-left), so advancing
//! moves it down. It never drops below `floor`, the line above the reserved
//! footer band; only `next_page` moves it back up.

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCursor {
    y: f32,
    page: usize,
    top: f32,
    floor: f32,
}

impl RenderCursor {
    /// Cursor at the top of the first page.
    pub fn new(top: f32, floor: f32) -> Self {
        Self {
            y: top,
            page: 0,
            top,
            floor: floor.min(top),
        }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    /// Zero-based page index.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn space_left(&self) -> f32 {
        self.y - self.floor
    }

    /// Moves down by `dy`, clamping at the footer floor. Negative deltas are
    /// ignored so the cursor stays monotonic within a page.
    #[must_use]
    pub fn advance(self, dy: f32) -> Self {
        let target = self.y - dy.max(0.0);
        if target < self.floor {
            debug!(
                page = self.page,
                requested = target,
                floor = self.floor,
                space_left = self.space_left(),
                "Region overflowed the footer margin; clamping cursor"
            );
        }
        Self {
            y: target.max(self.floor),
            ..self
        }
    }

    /// Top edge for a block of `height` that must not cross the floor.
    ///
    /// When the block does not fit below the cursor it is pulled up so its
    /// bottom sits on the floor, compressing it into the content above.
    pub fn block_top(&self, height: f32) -> f32 {
        self.y.max(self.floor + height).min(self.top)
    }

    /// Cursor at the top of the following page.
    #[must_use]
    pub fn next_page(self) -> Self {
        Self {
            y: self.top,
            page: self.page + 1,
            ..self
        }
    }
}
