use serde::{Deserialize, Serialize};

use crate::model::attribute::Attribute;

/// Service name reported when a batch carries no `service.name` attribute.
pub const UNKNOWN_SERVICE: &str = "?";

/// Identity of the service that produced a batch of spans. One `Resource`
/// is shared by every span of its batch via `ResourceIdx`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub service_name: String,
    pub color: String,
    pub attributes: Vec<Attribute>,
}

impl Resource {
    /// Extract the service name from resource attributes: first `service.name`
    /// entry with a populated string value wins.
    pub fn service_name_of(attributes: &[Attribute]) -> String {
        for attr in attributes {
            if attr.key == "service.name"
                && let Some(name) = attr.value.as_str()
            {
                return name.to_string();
            }
        }
        UNKNOWN_SERVICE.to_string()
    }
}
