use serde::{Deserialize, Serialize};

use crate::error::{GantryError, Result};
use crate::ids::SpanId;
use crate::model::attribute::Attribute;
use crate::model::resource::Resource;

/// Index of a span within its [`Trace`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpanIdx(usize);

impl SpanIdx {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a resource within its [`Trace`] resource table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceIdx(usize);

impl ResourceIdx {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// One timed operation in a trace. Parent/child links are arena indices:
/// `children` is the owning edge, `parent` a back-reference used for
/// ancestor display only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub span_id: SpanId,
    pub parent: Option<SpanIdx>,
    pub name: String,
    pub start_time_unix_nano: u64,
    pub end_time_unix_nano: u64,
    pub resource: ResourceIdx,
    pub attributes: Vec<Attribute>,
    pub children: Vec<SpanIdx>,
}

impl Span {
    pub fn duration_nanos(&self) -> u64 {
        // end >= start is enforced when the trace is built
        self.end_time_unix_nano - self.start_time_unix_nano
    }
}

/// A fully built trace: flat span arena plus resource table, rooted at a
/// single parentless span. Immutable once constructed; new trace data
/// replaces the whole tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    spans: Vec<Span>,
    resources: Vec<Resource>,
    root: SpanIdx,
}

impl Trace {
    /// Assemble a trace from builder output, verifying that all indices are
    /// in range and that every span is reachable from the root (a cycle or
    /// an orphaned subtree would otherwise loop or vanish during traversal).
    pub fn from_parts(spans: Vec<Span>, resources: Vec<Resource>, root: SpanIdx) -> Result<Self> {
        if root.index() >= spans.len() {
            return Err(GantryError::MalformedTrace(format!(
                "root index {} out of range for {} spans",
                root.index(),
                spans.len()
            )));
        }
        for span in &spans {
            if span.resource.index() >= resources.len() {
                return Err(GantryError::MalformedTrace(format!(
                    "span {} references unknown resource",
                    span.span_id
                )));
            }
            for link in span.children.iter().chain(span.parent.iter()) {
                if link.index() >= spans.len() {
                    return Err(GantryError::MalformedTrace(format!(
                        "span {} links outside the arena",
                        span.span_id
                    )));
                }
            }
        }

        let trace = Self {
            spans,
            resources,
            root,
        };
        let mut seen = vec![false; trace.spans.len()];
        let mut stack = vec![trace.root];
        let mut reachable = 0usize;
        while let Some(idx) = stack.pop() {
            if std::mem::replace(&mut seen[idx.index()], true) {
                continue;
            }
            reachable += 1;
            stack.extend(trace.span(idx).children.iter().copied());
        }
        if reachable != trace.spans.len() {
            return Err(GantryError::MalformedTrace(format!(
                "{} of {} spans unreachable from the root",
                trace.spans.len() - reachable,
                trace.spans.len()
            )));
        }
        Ok(trace)
    }

    pub fn root(&self) -> SpanIdx {
        self.root
    }

    pub fn root_span(&self) -> &Span {
        &self.spans[self.root.index()]
    }

    pub fn span(&self, idx: SpanIdx) -> &Span {
        &self.spans[idx.index()]
    }

    pub fn resource(&self, idx: ResourceIdx) -> &Resource {
        &self.resources[idx.index()]
    }

    pub fn resource_of(&self, span: &Span) -> &Resource {
        &self.resources[span.resource.index()]
    }

    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    pub fn spans(&self) -> impl Iterator<Item = (SpanIdx, &Span)> {
        self.spans
            .iter()
            .enumerate()
            .map(|(i, span)| (SpanIdx::new(i), span))
    }

    pub fn find(&self, id: &SpanId) -> Option<SpanIdx> {
        self.spans
            .iter()
            .position(|span| &span.span_id == id)
            .map(SpanIdx::new)
    }

    /// Number of ancestors between this span and the root.
    pub fn depth(&self, idx: SpanIdx) -> usize {
        let mut depth = 0;
        let mut current = self.span(idx);
        while let Some(parent) = current.parent {
            depth += 1;
            current = self.span(parent);
        }
        depth
    }

    pub fn duration_nanos(&self) -> u64 {
        self.root_span().duration_nanos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(id: &str, parent: Option<usize>, start: u64, end: u64) -> Span {
        Span {
            span_id: SpanId::parse(id).unwrap(),
            parent: parent.map(SpanIdx::new),
            name: id.to_string(),
            start_time_unix_nano: start,
            end_time_unix_nano: end,
            resource: ResourceIdx::new(0),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    fn resource() -> Resource {
        Resource {
            service_name: "api".to_string(),
            color: "#7eb26d".to_string(),
            attributes: Vec::new(),
        }
    }

    #[test]
    fn assembles_and_walks_depth() {
        let mut root = span("root", None, 0, 100);
        root.children.push(SpanIdx::new(1));
        let mut child = span("child", Some(0), 10, 40);
        child.children.push(SpanIdx::new(2));
        let leaf = span("leaf", Some(1), 20, 30);

        let trace =
            Trace::from_parts(vec![root, child, leaf], vec![resource()], SpanIdx::new(0)).unwrap();
        assert_eq!(trace.span_count(), 3);
        assert_eq!(trace.depth(trace.root()), 0);
        assert_eq!(trace.depth(SpanIdx::new(2)), 2);
        assert_eq!(trace.root_span().duration_nanos(), 100);
    }

    #[test]
    fn rejects_unreachable_spans() {
        let root = span("root", None, 0, 100);
        let orphan = span("orphan", None, 10, 20);
        let err = Trace::from_parts(vec![root, orphan], vec![resource()], SpanIdx::new(0))
            .unwrap_err();
        assert!(matches!(err, GantryError::MalformedTrace(_)));
    }

    #[test]
    fn rejects_out_of_range_links() {
        let mut root = span("root", None, 0, 100);
        root.children.push(SpanIdx::new(9));
        let err =
            Trace::from_parts(vec![root], vec![resource()], SpanIdx::new(0)).unwrap_err();
        assert!(matches!(err, GantryError::MalformedTrace(_)));
    }

    #[test]
    fn finds_spans_by_id() {
        let trace = Trace::from_parts(
            vec![span("root", None, 0, 100)],
            vec![resource()],
            SpanIdx::new(0),
        )
        .unwrap();
        let id = SpanId::parse("root").unwrap();
        assert_eq!(trace.find(&id), Some(trace.root()));
        assert_eq!(trace.find(&SpanId::parse("ghost").unwrap()), None);
    }
}
