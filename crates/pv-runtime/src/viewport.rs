#![forbid(unsafe_code)]

//! Scroll state for a graph view.
//!
//! The offset is the pixel position of the viewport's top-left corner in
//! content space. It always stays inside the current [`Boundaries`]; a pan
//! that would leave them is clamped componentwise.

use std::time::{Duration, Instant};

use pv_core::geometry::{PixelPoint, PixelSize, Point, Rect, Sides, Size};

/// Ease-out quadratic: fast start, slow end.
#[inline]
#[must_use]
pub fn ease_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Scrollable range for the offset, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Boundaries {
    pub min: PixelPoint,
    pub max: PixelPoint,
}

impl Boundaries {
    /// Range for `content` placed at `origin` inside a viewport of `viewport`.
    ///
    /// `max` never drops below `min`, so the origin stays reachable when the
    /// content is smaller than the viewport.
    #[must_use]
    pub fn compute(
        origin: Point,
        content: Size,
        margins: Sides,
        cell_pixel_size: f64,
        viewport: PixelSize,
    ) -> Self {
        let ox = f64::from(origin.x);
        let oy = f64::from(origin.y);
        let min = PixelPoint::new(
            (ox - f64::from(margins.left)) * cell_pixel_size,
            (oy - f64::from(margins.top)) * cell_pixel_size,
        );
        let far_x = (ox + f64::from(content.width) + f64::from(margins.right)) * cell_pixel_size;
        let far_y = (oy + f64::from(content.height) + f64::from(margins.bottom)) * cell_pixel_size;
        let max = PixelPoint::new(
            (far_x - viewport.width).max(min.x),
            (far_y - viewport.height).max(min.y),
        );
        Self { min, max }
    }

    #[inline]
    #[must_use]
    pub fn clamp(&self, offset: PixelPoint) -> PixelPoint {
        offset.clamp(self.min, self.max)
    }

    #[must_use]
    pub fn contains(&self, offset: PixelPoint) -> bool {
        offset.x >= self.min.x
            && offset.x <= self.max.x
            && offset.y >= self.min.y
            && offset.y <= self.max.y
    }
}

/// Observable scroll state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewState {
    pub offset: PixelPoint,
    pub size: PixelSize,
    /// True while a reveal slide is in flight.
    pub animating: bool,
}

#[derive(Debug, Clone, Copy)]
struct Slide {
    from: PixelPoint,
    to: PixelPoint,
    started: Instant,
    duration: Duration,
}

#[derive(Debug, Clone)]
pub struct Viewport {
    state: ViewState,
    boundaries: Boundaries,
    cell_pixel_size: f64,
    slide: Option<Slide>,
}

impl Viewport {
    #[must_use]
    pub fn new(cell_pixel_size: f64) -> Self {
        Self {
            state: ViewState::default(),
            boundaries: Boundaries::default(),
            cell_pixel_size,
            slide: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> ViewState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn offset(&self) -> PixelPoint {
        self.state.offset
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> PixelSize {
        self.state.size
    }

    #[inline]
    #[must_use]
    pub fn boundaries(&self) -> Boundaries {
        self.boundaries
    }

    #[inline]
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.state.animating
    }

    #[inline]
    #[must_use]
    pub fn cell_pixel_size(&self) -> f64 {
        self.cell_pixel_size
    }

    pub fn set_cell_pixel_size(&mut self, cell_pixel_size: f64) {
        self.cell_pixel_size = cell_pixel_size;
    }

    pub fn set_size(&mut self, size: PixelSize) {
        self.state.size = size;
    }

    /// Install a new scroll range and pull the offset (and any slide target)
    /// back inside it.
    pub fn set_boundaries(&mut self, boundaries: Boundaries) {
        self.boundaries = boundaries;
        self.state.offset = boundaries.clamp(self.state.offset);
        if let Some(slide) = &mut self.slide {
            slide.from = boundaries.clamp(slide.from);
            slide.to = boundaries.clamp(slide.to);
        }
    }

    /// Move by `(dx, dy)` pixels, clamped. Cancels a running reveal.
    ///
    /// Returns whether the offset changed.
    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        self.cancel_reveal();
        let current = self.state.offset;
        let next = self
            .boundaries
            .clamp(PixelPoint::new(current.x + dx, current.y + dy));
        self.state.offset = next;
        next != current
    }

    /// Jump to `offset`, clamped.
    pub fn scroll_to(&mut self, offset: PixelPoint) {
        self.cancel_reveal();
        self.state.offset = self.boundaries.clamp(offset);
    }

    /// Jump back to the top-left of the scroll range.
    pub fn reset(&mut self) {
        self.scroll_to(self.boundaries.min);
    }

    /// Whether the grid-space `rect` lies fully inside the visible area.
    #[must_use]
    pub fn is_visible(&self, rect: Rect) -> bool {
        let cell = self.cell_pixel_size;
        let offset = self.state.offset;
        let size = self.state.size;
        let left = f64::from(rect.x) * cell;
        let top = f64::from(rect.y) * cell;
        let right = f64::from(rect.right()) * cell;
        let bottom = f64::from(rect.bottom()) * cell;
        left >= offset.x
            && top >= offset.y
            && right <= offset.x + size.width
            && bottom <= offset.y + size.height
    }

    /// Bring the grid-space `rect` into view.
    ///
    /// Visible targets leave the offset alone. Otherwise the target is
    /// centered (within boundaries), sliding over `duration`; a zero duration
    /// jumps. Returns whether the offset will move.
    pub fn reveal_at(&mut self, rect: Rect, duration: Duration, now: Instant) -> bool {
        if self.is_visible(rect) {
            return false;
        }
        let cell = self.cell_pixel_size;
        let size = self.state.size;
        let center_x = (f64::from(rect.x) + f64::from(rect.width) / 2.0) * cell;
        let center_y = (f64::from(rect.y) + f64::from(rect.height) / 2.0) * cell;
        let target = self.boundaries.clamp(PixelPoint::new(
            center_x - size.width / 2.0,
            center_y - size.height / 2.0,
        ));
        let from = self.state.offset;
        if target == from {
            return false;
        }
        if duration.is_zero() {
            self.scroll_to(target);
            return true;
        }
        self.slide = Some(Slide {
            from,
            to: target,
            started: now,
            duration,
        });
        self.state.animating = true;
        tracing::trace!(x = target.x, y = target.y, "reveal slide started");
        true
    }

    /// Advance a running slide. Returns whether the offset moved.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        let Some(slide) = self.slide else {
            return false;
        };
        let elapsed = now
            .checked_duration_since(slide.started)
            .unwrap_or(Duration::ZERO);
        let before = self.state.offset;
        if elapsed >= slide.duration {
            self.state.offset = slide.to;
            self.cancel_reveal();
        } else {
            let t = elapsed.as_secs_f64() / slide.duration.as_secs_f64();
            self.state.offset = self
                .boundaries
                .clamp(slide.from.lerp(slide.to, ease_out(t)));
        }
        self.state.offset != before
    }

    /// Stop a running slide where it is.
    pub fn cancel_reveal(&mut self) {
        self.slide = None;
        self.state.animating = false;
    }
}
