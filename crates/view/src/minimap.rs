use gantry_core::model::span::{SpanIdx, Trace};

pub const MIN_BAR_HEIGHT: f64 = 1.0;
pub const MAX_BAR_HEIGHT: f64 = 7.0;

/// Pixel rectangle of one bar in the overview strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Total node count of the tree, by full depth-first traversal. Drives the
/// bar height so the whole trace fits the fixed-height strip.
pub fn count_spans(trace: &Trace) -> usize {
    let mut count = 0;
    let mut stack = vec![trace.root()];
    while let Some(idx) = stack.pop() {
        count += 1;
        stack.extend(trace.span(idx).children.iter().copied());
    }
    count
}

/// Emit one pixel rectangle per span, depth first, scaled to the full trace
/// window. Painting stops once the cumulative y offset leaves the canvas,
/// and the remaining subtree is skipped with it — children of an off-canvas
/// span are never emitted even when an individual child would fit. The
/// strip is a density overview, so that approximation is accepted.
pub fn draw_overview<F>(trace: &Trace, width: f64, height: f64, mut draw: F)
where
    F: FnMut(SpanIdx, PixelRect),
{
    let num_spans = count_spans(trace);
    let bar_height = (height / num_spans as f64)
        .clamp(MIN_BAR_HEIGHT, MAX_BAR_HEIGHT)
        .round();

    let root = trace.root_span();
    let root_start = root.start_time_unix_nano;
    // a zero-duration trace collapses every bar onto x = 0
    let trace_duration = root.duration_nanos().max(1) as f64;

    let mut y = 0.0;
    draw_node(
        trace,
        trace.root(),
        root_start,
        trace_duration,
        width,
        height,
        bar_height,
        &mut y,
        &mut draw,
    );
}

#[allow(clippy::too_many_arguments)]
fn draw_node<F>(
    trace: &Trace,
    idx: SpanIdx,
    root_start: u64,
    trace_duration: f64,
    width: f64,
    height: f64,
    bar_height: f64,
    y: &mut f64,
    draw: &mut F,
) where
    F: FnMut(SpanIdx, PixelRect),
{
    let span = trace.span(idx);
    let offset = span.start_time_unix_nano as i128 - root_start as i128;
    let relative_start = offset as f64 / trace_duration;
    let relative_duration = span.duration_nanos() as f64 / trace_duration;

    draw(
        idx,
        PixelRect {
            x: (relative_start * width).round(),
            y: *y,
            width: (relative_duration * width).round(),
            height: bar_height,
        },
    );
    *y += bar_height;

    if *y > height {
        return;
    }

    for &child in &span.children {
        draw_node(
            trace,
            child,
            root_start,
            trace_duration,
            width,
            height,
            bar_height,
            y,
            draw,
        );
    }
}
