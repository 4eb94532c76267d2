use serde::{Deserialize, Serialize};

use crate::error::{GantryError, Result};

/// Span identifier as it appears on the wire. Tracing backends emit these
/// base64 or hex encoded; gantry treats them as opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpanId(String);

impl SpanId {
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() {
            return Err(GantryError::Parse("span id cannot be empty".to_string()));
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SpanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
