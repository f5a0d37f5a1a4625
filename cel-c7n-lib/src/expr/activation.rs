use chrono::{DateTime, FixedOffset};
use serde_json::Value as JsonValue;

/// The named values one evaluation sees
///
/// Bound as `Resource`, `Now` and `Event`. `Event` is `null` for policies that are not
/// triggered by a cloud event.
#[derive(Debug, Clone)]
pub struct Activation {
    pub resource: JsonValue,
    pub now: DateTime<FixedOffset>,
    pub event: Option<JsonValue>,
}

impl Activation {
    #[must_use]
    pub const fn new(resource: JsonValue, now: DateTime<FixedOffset>) -> Self {
        Self {
            resource,
            now,
            event: None,
        }
    }

    #[must_use]
    pub fn with_event(mut self, event: JsonValue) -> Self {
        self.event = Some(event);
        self
    }
}
