use std::collections::HashMap;

use gantry_core::color::ColorAssigner;
use gantry_core::error::{GantryError, Result};
use gantry_core::ids::SpanId;
use gantry_core::model::attribute::{Attribute, AttributeValue};
use gantry_core::model::resource::Resource;
use gantry_core::model::span::{ResourceIdx, Span, SpanIdx, Trace};

use crate::model::{RawAttribute, RawSpan, RawValue, TraceResponse};

/// Build the span tree from a raw trace payload.
///
/// Three linear passes: index every span into an arena keyed by span id,
/// link children to their parents, then sort each child list by start time
/// (stable, so ties keep wire order). Malformed payloads fail the build:
/// dangling parent references, duplicate span ids, unparseable timestamps,
/// spans ending before they start, and zero or multiple roots.
pub fn build_trace(response: &TraceResponse, palette: &[String]) -> Result<Trace> {
    let mut colors = ColorAssigner::new(palette);
    let mut spans: Vec<Span> = Vec::new();
    let mut parents: Vec<Option<SpanId>> = Vec::new();
    let mut resources: Vec<Resource> = Vec::new();
    let mut by_id: HashMap<SpanId, SpanIdx> = HashMap::new();

    for batch in &response.batches {
        let attributes = decode_attributes(&batch.resource.attributes);
        let service_name = Resource::service_name_of(&attributes);
        let color = colors.color_for(&service_name).to_string();
        let resource_idx = ResourceIdx::new(resources.len());
        resources.push(Resource {
            service_name,
            color,
            attributes,
        });

        for scope in &batch.scope_spans {
            for raw in &scope.spans {
                let (span, parent) = decode_span(raw, resource_idx)?;
                let idx = SpanIdx::new(spans.len());
                if by_id.insert(span.span_id.clone(), idx).is_some() {
                    return Err(GantryError::DuplicateSpanId(raw.span_id.clone()));
                }
                spans.push(span);
                parents.push(parent);
            }
        }
    }

    let mut roots: Vec<SpanIdx> = Vec::new();
    for (i, parent_id) in parents.iter().enumerate() {
        let idx = SpanIdx::new(i);
        match parent_id {
            None => roots.push(idx),
            Some(pid) => {
                let Some(&parent_idx) = by_id.get(pid) else {
                    return Err(GantryError::MalformedTrace(format!(
                        "span {} references unknown parent {}",
                        spans[i].span_id, pid
                    )));
                };
                spans[i].parent = Some(parent_idx);
                spans[parent_idx.index()].children.push(idx);
            }
        }
    }

    let root = match roots.as_slice() {
        [root] => *root,
        [] => return Err(GantryError::NoRoot),
        many => {
            return Err(GantryError::MultipleRoots(
                many.iter()
                    .map(|idx| spans[idx.index()].span_id.as_str().to_string())
                    .collect(),
            ));
        }
    };

    let starts: Vec<u64> = spans.iter().map(|s| s.start_time_unix_nano).collect();
    for span in &mut spans {
        span.children.sort_by_key(|child| starts[child.index()]);
    }

    tracing::debug!(
        spans = spans.len(),
        resources = resources.len(),
        "built span tree"
    );

    Trace::from_parts(spans, resources, root)
}

fn decode_span(raw: &RawSpan, resource: ResourceIdx) -> Result<(Span, Option<SpanId>)> {
    let span_id = SpanId::parse(&raw.span_id)
        .map_err(|_| GantryError::MalformedTrace("span without span id".to_string()))?;

    // an empty parentSpanId marks the root, same as an absent one
    let parent = match raw.parent_span_id.as_deref() {
        None | Some("") => None,
        Some(pid) => Some(SpanId::parse(pid)?),
    };

    let start = parse_nanos(&raw.start_time_unix_nano, &raw.span_id)?;
    let end = parse_nanos(&raw.end_time_unix_nano, &raw.span_id)?;
    if end < start {
        return Err(GantryError::MalformedTrace(format!(
            "span {} ends before it starts",
            raw.span_id
        )));
    }

    Ok((
        Span {
            span_id,
            parent: None,
            name: raw.name.clone(),
            start_time_unix_nano: start,
            end_time_unix_nano: end,
            resource,
            attributes: decode_attributes(&raw.attributes),
            children: Vec::new(),
        },
        parent,
    ))
}

fn parse_nanos(input: &str, span_id: &str) -> Result<u64> {
    input.parse::<u64>().map_err(|e| {
        GantryError::MalformedTrace(format!("span {span_id}: bad timestamp {input:?}: {e}"))
    })
}

fn decode_attributes(raw: &[RawAttribute]) -> Vec<Attribute> {
    raw.iter()
        .map(|attr| Attribute {
            key: attr.key.clone(),
            value: decode_value(&attr.value),
        })
        .collect()
}

fn decode_value(raw: &RawValue) -> AttributeValue {
    if let Some(s) = &raw.string_value {
        AttributeValue::String(s.clone())
    } else if let Some(i) = &raw.int_value {
        // keep the raw text when a producer sends a non-numeric intValue
        i.parse::<i64>()
            .map(AttributeValue::Int)
            .unwrap_or_else(|_| AttributeValue::String(i.clone()))
    } else if let Some(b) = raw.bool_value {
        AttributeValue::Bool(b)
    } else if let Some(array) = &raw.array_value {
        AttributeValue::Array(array.values.iter().map(decode_value).collect())
    } else {
        AttributeValue::String(String::new())
    }
}

#[cfg(test)]
mod tests {
    use gantry_core::model::span::Trace;

    use super::*;
    use crate::model::{Batch, BatchResource, RawArrayValue, ScopeSpans};

    fn raw_span(id: &str, parent: Option<&str>, name: &str, start: u64, end: u64) -> RawSpan {
        RawSpan {
            span_id: id.to_string(),
            parent_span_id: parent.map(|p| p.to_string()),
            name: name.to_string(),
            start_time_unix_nano: start.to_string(),
            end_time_unix_nano: end.to_string(),
            attributes: Vec::new(),
        }
    }

    fn batch(service: Option<&str>, spans: Vec<RawSpan>) -> Batch {
        let attributes = service
            .map(|name| {
                vec![RawAttribute {
                    key: "service.name".to_string(),
                    value: RawValue {
                        string_value: Some(name.to_string()),
                        ..RawValue::default()
                    },
                }]
            })
            .unwrap_or_default();
        Batch {
            resource: BatchResource { attributes },
            scope_spans: vec![ScopeSpans { spans }],
        }
    }

    fn palette() -> Vec<String> {
        vec!["#111111".to_string(), "#222222".to_string()]
    }

    fn build(batches: Vec<Batch>) -> Result<Trace> {
        build_trace(&TraceResponse { batches }, &palette())
    }

    #[test]
    fn builds_tree_and_sorts_children() {
        // children arrive out of start-time order
        let trace = build(vec![batch(
            Some("api"),
            vec![
                raw_span("root", None, "GET /checkout", 0, 100),
                raw_span("b", Some("root"), "place-articles", 20, 90),
                raw_span("a", Some("root"), "authenticate", 10, 40),
            ],
        )])
        .unwrap();

        assert_eq!(trace.span_count(), 3);
        let root = trace.root_span();
        assert_eq!(root.span_id.as_str(), "root");
        let child_ids: Vec<&str> = root
            .children
            .iter()
            .map(|&idx| trace.span(idx).span_id.as_str())
            .collect();
        assert_eq!(child_ids, vec!["a", "b"]);
        for &child in &root.children {
            assert_eq!(trace.span(child).parent, Some(trace.root()));
        }
    }

    #[test]
    fn sort_is_stable_on_equal_starts() {
        let trace = build(vec![batch(
            Some("api"),
            vec![
                raw_span("root", None, "root", 0, 100),
                raw_span("x", Some("root"), "x", 10, 20),
                raw_span("y", Some("root"), "y", 10, 30),
            ],
        )])
        .unwrap();

        let child_ids: Vec<&str> = trace
            .root_span()
            .children
            .iter()
            .map(|&idx| trace.span(idx).span_id.as_str())
            .collect();
        assert_eq!(child_ids, vec!["x", "y"]);
    }

    #[test]
    fn shares_resource_across_batch_and_assigns_colors() {
        let trace = build(vec![
            batch(
                Some("shop-backend"),
                vec![
                    raw_span("root", None, "root", 0, 100),
                    raw_span("c1", Some("root"), "c1", 10, 20),
                ],
            ),
            batch(
                Some("auth-service"),
                vec![raw_span("c2", Some("root"), "c2", 30, 40)],
            ),
        ])
        .unwrap();

        let root = trace.root_span();
        let c1 = trace.span(trace.find(&SpanId::parse("c1").unwrap()).unwrap());
        let c2 = trace.span(trace.find(&SpanId::parse("c2").unwrap()).unwrap());

        assert_eq!(root.resource, c1.resource);
        assert_ne!(root.resource, c2.resource);
        assert_eq!(trace.resource_of(root).service_name, "shop-backend");
        assert_eq!(trace.resource_of(root).color, "#111111");
        assert_eq!(trace.resource_of(c2).service_name, "auth-service");
        assert_eq!(trace.resource_of(c2).color, "#222222");
    }

    #[test]
    fn missing_service_name_defaults() {
        let trace = build(vec![batch(None, vec![raw_span("root", None, "r", 0, 1)])]).unwrap();
        assert_eq!(trace.resource_of(trace.root_span()).service_name, "?");
    }

    #[test]
    fn decodes_attribute_values() {
        let mut span = raw_span("root", None, "r", 0, 1);
        span.attributes = vec![
            RawAttribute {
                key: "http.method".to_string(),
                value: RawValue {
                    string_value: Some("GET".to_string()),
                    ..RawValue::default()
                },
            },
            RawAttribute {
                key: "http.status_code".to_string(),
                value: RawValue {
                    int_value: Some("204".to_string()),
                    ..RawValue::default()
                },
            },
            RawAttribute {
                key: "exception.escape".to_string(),
                value: RawValue {
                    bool_value: Some(false),
                    ..RawValue::default()
                },
            },
            RawAttribute {
                key: "numbers".to_string(),
                value: RawValue {
                    array_value: Some(RawArrayValue {
                        values: vec![RawValue {
                            string_value: Some("one".to_string()),
                            ..RawValue::default()
                        }],
                    }),
                    ..RawValue::default()
                },
            },
        ];

        let trace = build(vec![batch(Some("api"), vec![span])]).unwrap();
        let attrs = &trace.root_span().attributes;
        assert_eq!(attrs[0].value, AttributeValue::String("GET".to_string()));
        assert_eq!(attrs[1].value, AttributeValue::Int(204));
        assert_eq!(attrs[2].value, AttributeValue::Bool(false));
        assert_eq!(
            attrs[3].value,
            AttributeValue::Array(vec![AttributeValue::String("one".to_string())])
        );
    }

    #[test]
    fn fails_on_dangling_parent() {
        let err = build(vec![batch(
            Some("api"),
            vec![
                raw_span("root", None, "r", 0, 100),
                raw_span("child", Some("ghost"), "c", 10, 20),
            ],
        )])
        .unwrap_err();
        assert!(matches!(err, GantryError::MalformedTrace(_)));
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn fails_on_duplicate_span_id() {
        let err = build(vec![batch(
            Some("api"),
            vec![
                raw_span("root", None, "r", 0, 100),
                raw_span("root", None, "r again", 0, 100),
            ],
        )])
        .unwrap_err();
        assert!(matches!(err, GantryError::DuplicateSpanId(id) if id == "root"));
    }

    #[test]
    fn fails_without_root() {
        let err = build(vec![batch(
            Some("api"),
            vec![
                raw_span("a", Some("b"), "a", 0, 1),
                raw_span("b", Some("a"), "b", 0, 1),
            ],
        )])
        .unwrap_err();
        assert!(matches!(err, GantryError::NoRoot));
    }

    #[test]
    fn fails_on_multiple_roots() {
        let err = build(vec![batch(
            Some("api"),
            vec![
                raw_span("r1", None, "r1", 0, 1),
                raw_span("r2", Some(""), "r2", 0, 1),
            ],
        )])
        .unwrap_err();
        let GantryError::MultipleRoots(ids) = err else {
            panic!("expected MultipleRoots, got {err:?}");
        };
        assert_eq!(ids, vec!["r1".to_string(), "r2".to_string()]);
    }

    #[test]
    fn fails_on_bad_timestamp() {
        let mut span = raw_span("root", None, "r", 0, 1);
        span.start_time_unix_nano = "not-a-number".to_string();
        let err = build(vec![batch(Some("api"), vec![span])]).unwrap_err();
        assert!(matches!(err, GantryError::MalformedTrace(_)));
    }

    #[test]
    fn fails_when_span_ends_before_it_starts() {
        let err = build(vec![batch(
            Some("api"),
            vec![raw_span("root", None, "r", 100, 50)],
        )])
        .unwrap_err();
        assert!(matches!(err, GantryError::MalformedTrace(_)));
    }

    #[test]
    fn parses_decimal_string_timestamps() {
        let trace = build(vec![batch(
            Some("api"),
            vec![RawSpan {
                span_id: "root".to_string(),
                parent_span_id: None,
                name: "r".to_string(),
                start_time_unix_nano: "1717777733437732352".to_string(),
                end_time_unix_nano: "1717777734017966805".to_string(),
                attributes: Vec::new(),
            }],
        )])
        .unwrap();
        let root = trace.root_span();
        assert_eq!(root.start_time_unix_nano, 1_717_777_733_437_732_352);
        assert_eq!(root.end_time_unix_nano, 1_717_777_734_017_966_805);
    }
}
