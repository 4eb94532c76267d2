use serde::{Deserialize, Serialize};

/// Trace payload as returned by the tracing backend: spans grouped into one
/// batch per resource, each batch split into scope groups. Timestamps and
/// 64-bit integers arrive as decimal strings per the OTLP JSON convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceResponse {
    #[serde(default)]
    pub batches: Vec<Batch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    #[serde(default)]
    pub resource: BatchResource,
    #[serde(default)]
    pub scope_spans: Vec<ScopeSpans>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BatchResource {
    #[serde(default)]
    pub attributes: Vec<RawAttribute>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScopeSpans {
    #[serde(default)]
    pub spans: Vec<RawSpan>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawSpan {
    pub span_id: String,
    #[serde(default)]
    pub parent_span_id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub start_time_unix_nano: String,
    pub end_time_unix_nano: String,
    #[serde(default)]
    pub attributes: Vec<RawAttribute>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawAttribute {
    pub key: String,
    #[serde(default)]
    pub value: RawValue,
}

/// Wire attribute value; exactly one field is populated per the contract.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    /// int64 encoded as a decimal string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub int_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bool_value: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_value: Option<RawArrayValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawArrayValue {
    #[serde(default)]
    pub values: Vec<RawValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_payload() {
        let payload: TraceResponse = serde_json::from_str(
            r#"{
                "batches": [{
                    "resource": {
                        "attributes": [
                            {"key": "service.name", "value": {"stringValue": "shop-backend"}}
                        ]
                    },
                    "scopeSpans": [{
                        "scope": {"name": "k6"},
                        "spans": [{
                            "traceId": "TfeVba+dzQlA+vIjKkCplQ==",
                            "spanId": "rp3Bmf5Z4wk=",
                            "name": "article-to-cart",
                            "kind": "SPAN_KIND_SERVER",
                            "startTimeUnixNano": "1717777733437732352",
                            "endTimeUnixNano": "1717777734017966805",
                            "attributes": [
                                {"key": "net.host.port", "value": {"intValue": "8319"}},
                                {"key": "numbers", "value": {"arrayValue": {"values": [
                                    {"stringValue": "one"}
                                ]}}}
                            ]
                        }]
                    }]
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(payload.batches.len(), 1);
        let span = &payload.batches[0].scope_spans[0].spans[0];
        assert_eq!(span.span_id, "rp3Bmf5Z4wk=");
        assert_eq!(span.parent_span_id, None);
        assert_eq!(span.start_time_unix_nano, "1717777733437732352");
        assert_eq!(
            span.attributes[0].value.int_value.as_deref(),
            Some("8319")
        );
        assert!(span.attributes[1].value.array_value.is_some());
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let payload: TraceResponse = serde_json::from_str(r#"{"batches": []}"#).unwrap();
        assert!(payload.batches.is_empty());
    }
}
