use std::collections::HashSet;

use gantry_core::ids::SpanId;
use gantry_core::model::span::{SpanIdx, Trace};

/// Depth-first row order for the span list: every visible span, each parent
/// immediately followed by its subtree, siblings in stored (time-sorted)
/// order. Descendants of a collapsed span are elided; the collapsed span
/// itself stays visible. Pure; re-run whenever the collapse set changes.
pub fn visible_rows(trace: &Trace, collapsed: &HashSet<SpanId>) -> Vec<SpanIdx> {
    let mut rows = Vec::with_capacity(trace.span_count());
    let mut stack = vec![trace.root()];
    while let Some(idx) = stack.pop() {
        rows.push(idx);
        let span = trace.span(idx);
        if !collapsed.contains(&span.span_id) {
            stack.extend(span.children.iter().rev().copied());
        }
    }
    rows
}
