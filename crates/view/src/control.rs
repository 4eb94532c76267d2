use crate::viewport::Viewport;

/// What the pointer went down on inside the overview strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    ResizerLeft,
    ResizerRight,
    /// The shaded region outside the current viewport.
    CutoffBox,
    /// The strip itself (inside the current viewport).
    Strip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Idle,
    /// One edge follows the cursor while the other stays pinned.
    Resizing { fixed_point: u64 },
    /// The whole window follows the cursor, keeping the distances from the
    /// press position to both edges.
    Dragging {
        start_offset: u64,
        end_offset: u64,
    },
}

/// Pointer state machine for the overview strip. Translates pixel
/// x-coordinates into nanosecond timestamps (the inverse of the bar
/// geometry), clamps every gesture to the trace bounds, and keeps the
/// committed viewport valid at all times: a zero-width selection is held
/// internally and resolves to the full window on release.
#[derive(Debug, Clone)]
pub struct ViewportController {
    bounds: Viewport,
    viewport: Viewport,
    pending: (u64, u64),
    gesture: Gesture,
}

impl ViewportController {
    pub fn new(bounds: Viewport) -> Self {
        Self {
            bounds,
            viewport: bounds,
            pending: (bounds.start_time_unix_nano(), bounds.end_time_unix_nano()),
            gesture: Gesture::Idle,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn bounds(&self) -> Viewport {
        self.bounds
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Timestamp under a pixel x-coordinate, clamped to the trace bounds.
    fn time_at(&self, px: f64, width: f64) -> u64 {
        if width <= 0.0 {
            return self.bounds.start_time_unix_nano();
        }
        let duration = self.bounds.duration_nanos() as f64;
        let offset = (px / width * duration).round().clamp(0.0, duration) as u64;
        self.bounds.start_time_unix_nano() + offset
    }

    pub fn press(&mut self, px: f64, width: f64, target: HitTarget) {
        let cursor = self.time_at(px, width);
        let is_full_window = self.viewport == self.bounds;

        match target {
            HitTarget::ResizerLeft => {
                self.gesture = Gesture::Resizing {
                    fixed_point: self.viewport.end_time_unix_nano(),
                };
            }
            HitTarget::ResizerRight => {
                self.gesture = Gesture::Resizing {
                    fixed_point: self.viewport.start_time_unix_nano(),
                };
            }
            // pressing outside the window (or anywhere while un-zoomed)
            // starts a fresh selection anchored at the cursor
            HitTarget::CutoffBox => self.begin_selection(cursor),
            HitTarget::Strip if is_full_window => self.begin_selection(cursor),
            HitTarget::Strip => {
                self.gesture = Gesture::Dragging {
                    start_offset: cursor.saturating_sub(self.viewport.start_time_unix_nano()),
                    end_offset: self.viewport.end_time_unix_nano().saturating_sub(cursor),
                };
            }
        }
    }

    fn begin_selection(&mut self, cursor: u64) {
        self.gesture = Gesture::Resizing {
            fixed_point: cursor,
        };
        self.pending = (cursor, cursor);
    }

    pub fn drag_to(&mut self, px: f64, width: f64) {
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Resizing { fixed_point } => {
                let cursor = self.time_at(px, width);
                let (start, end) = if fixed_point < cursor {
                    (fixed_point, cursor)
                } else {
                    (cursor, fixed_point)
                };
                self.pending = (start, end);
                self.commit();
            }
            Gesture::Dragging {
                start_offset,
                end_offset,
            } => {
                let mut cursor = self.time_at(px, width);
                if cursor.saturating_sub(start_offset) < self.bounds.start_time_unix_nano() {
                    cursor = self.bounds.start_time_unix_nano() + start_offset;
                }
                if cursor + end_offset > self.bounds.end_time_unix_nano() {
                    cursor = self.bounds.end_time_unix_nano() - end_offset;
                }
                self.pending = (cursor - start_offset, cursor + end_offset);
                self.commit();
            }
        }
    }

    pub fn release(&mut self) {
        self.gesture = Gesture::Idle;
        // a click without movement leaves a zero-width selection: reset
        if self.pending.0 == self.pending.1 {
            self.viewport = self.bounds;
        }
        self.pending = (
            self.viewport.start_time_unix_nano(),
            self.viewport.end_time_unix_nano(),
        );
    }

    fn commit(&mut self) {
        if let Ok(viewport) = Viewport::new(self.pending.0, self.pending.1) {
            self.viewport = viewport;
        }
    }
}
