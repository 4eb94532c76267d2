use serde::Serialize;

use gantry_core::model::span::Span;

use crate::viewport::Viewport;

/// Horizontal placement of one span bar, as fractions of the viewport
/// duration. Values are not clamped to [0, 1]: a span may extend past
/// either edge of a zoomed window, e.g. a parent wider than the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpanGeometry {
    pub relative_start: f64,
    pub relative_duration: f64,
}

pub fn span_geometry(span: &Span, viewport: &Viewport) -> SpanGeometry {
    let duration = viewport.duration_nanos() as f64;
    // absolute nanosecond timestamps exceed f64's integer range, so take the
    // difference in integer space before converting
    let offset = span.start_time_unix_nano as i128 - viewport.start_time_unix_nano() as i128;
    SpanGeometry {
        relative_start: offset as f64 / duration,
        relative_duration: span.duration_nanos() as f64 / duration,
    }
}
