use chrono::SecondsFormat;
use owo_colors::OwoColorize;

use gantry_core::color::parse_hex_color;
use gantry_core::model::span::{SpanIdx, Trace};
use gantry_core::time::{format_duration_nanos, nanos_to_dt};
use gantry_view::geometry::SpanGeometry;
use gantry_view::minimap;
use gantry_view::{Viewport, span_geometry};

const FALLBACK_RGB: (u8, u8, u8) = (0x80, 0x80, 0x80);

/// Render one line per projected row: ancestor indent, service and span
/// name, a bar positioned by the span's viewport geometry, the duration.
pub fn render_rows(trace: &Trace, rows: &[SpanIdx], viewport: &Viewport, width: usize) -> String {
    let labels: Vec<String> = rows
        .iter()
        .map(|&idx| {
            let span = trace.span(idx);
            format!(
                "{}{} {}",
                "  ".repeat(trace.depth(idx)),
                trace.resource_of(span).service_name,
                span.name
            )
        })
        .collect();
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for (&idx, label) in rows.iter().zip(&labels) {
        let span = trace.span(idx);
        let bar = render_bar(
            span_geometry(span, viewport),
            width,
            &trace.resource_of(span).color,
        );
        out.push_str(&format!(
            "{label:<label_width$} |{bar}| {}\n",
            format_duration_nanos(span.duration_nanos())
        ));
    }
    out
}

fn render_bar(geometry: SpanGeometry, width: usize, color: &str) -> String {
    if width == 0 {
        return String::new();
    }
    let width_f = width as f64;
    let start = (geometry.relative_start * width_f).round();
    let end = ((geometry.relative_start + geometry.relative_duration) * width_f).round();

    let visible = end > 0.0 && start < width_f;
    let mut left = start.clamp(0.0, width_f) as usize;
    let mut right = end.clamp(0.0, width_f) as usize;
    // every span overlapping the viewport gets at least one cell
    if visible && right == left {
        if right < width {
            right += 1;
        } else {
            left -= 1;
        }
    }

    let block = "▆".repeat(right - left);
    let painted = match parse_hex_color(color) {
        Some((r, g, b)) => block.truecolor(r, g, b).to_string(),
        None => block,
    };
    format!("{}{painted}{}", " ".repeat(left), " ".repeat(width - right))
}

/// Render the compressed overview strip onto a character grid, one grid
/// cell per pixel of the mini-map canvas.
pub fn render_overview(trace: &Trace, width: usize, height: usize) -> String {
    let mut grid = vec![vec![None::<(u8, u8, u8)>; width]; height];
    minimap::draw_overview(trace, width as f64, height as f64, |idx, rect| {
        let span = trace.span(idx);
        let color = parse_hex_color(&trace.resource_of(span).color).unwrap_or(FALLBACK_RGB);

        let x0 = rect.x.clamp(0.0, width as f64) as usize;
        let x1 = ((rect.x + rect.width).clamp(0.0, width as f64) as usize).max((x0 + 1).min(width));
        let y0 = rect.y.clamp(0.0, height as f64) as usize;
        let y1 = (rect.y + rect.height).clamp(0.0, height as f64) as usize;
        for row in &mut grid[y0..y1] {
            for cell in &mut row[x0..x1] {
                *cell = Some(color);
            }
        }
    });

    let mut out = String::new();
    for row in &grid {
        for cell in row {
            match cell {
                Some((r, g, b)) => out.push_str(&"█".truecolor(*r, *g, *b).to_string()),
                None => out.push(' '),
            }
        }
        out.push('\n');
    }
    out
}

/// Flat span listing for scripting.
pub fn render_spans(trace: &Trace, rows: &[SpanIdx]) -> String {
    let mut out = String::new();
    for &idx in rows {
        let span = trace.span(idx);
        let parent = span
            .parent
            .map(|p| trace.span(p).span_id.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "span={} parent={} service={} name=\"{}\" start={} duration={}\n",
            span.span_id,
            parent,
            trace.resource_of(span).service_name,
            span.name,
            nanos_to_dt(span.start_time_unix_nano).to_rfc3339_opts(SecondsFormat::Millis, true),
            format_duration_nanos(span.duration_nanos()),
        ));
    }
    out.push_str(&format!("-- {} spans --\n", rows.len()));
    out
}

pub fn rows_payload(trace: &Trace, rows: &[SpanIdx], viewport: &Viewport) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = rows
        .iter()
        .map(|&idx| {
            let span = trace.span(idx);
            let resource = trace.resource_of(span);
            let geometry = span_geometry(span, viewport);
            serde_json::json!({
                "span_id": span.span_id.as_str(),
                "service": resource.service_name,
                "color": resource.color,
                "name": span.name,
                "depth": trace.depth(idx),
                "relative_start": geometry.relative_start,
                "relative_duration": geometry.relative_duration,
                "duration_nanos": span.duration_nanos(),
            })
        })
        .collect();
    serde_json::json!({ "viewport": viewport, "rows": rows })
}

pub fn overview_payload(trace: &Trace, width: usize, height: usize) -> serde_json::Value {
    let mut rects = Vec::new();
    minimap::draw_overview(trace, width as f64, height as f64, |idx, rect| {
        rects.push(serde_json::json!({
            "span_id": trace.span(idx).span_id.as_str(),
            "x": rect.x,
            "y": rect.y,
            "width": rect.width,
            "height": rect.height,
        }));
    });
    serde_json::json!({
        "span_count": minimap::count_spans(trace),
        "rects": rects,
    })
}

pub fn spans_payload(trace: &Trace, rows: &[SpanIdx]) -> serde_json::Value {
    let spans: Vec<serde_json::Value> = rows
        .iter()
        .map(|&idx| {
            let span = trace.span(idx);
            serde_json::json!({
                "span_id": span.span_id.as_str(),
                "parent_span_id": span.parent.map(|p| trace.span(p).span_id.as_str().to_string()),
                "service": trace.resource_of(span).service_name,
                "name": span.name,
                "start_time_unix_nano": span.start_time_unix_nano,
                "end_time_unix_nano": span.end_time_unix_nano,
                "duration_nanos": span.duration_nanos(),
            })
        })
        .collect();
    serde_json::json!({ "spans": spans })
}
