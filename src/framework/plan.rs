//! Schema-driven plan modification
//!
//! Mirrors what the host framework does before a resource's own plan hook
//! runs: static defaults, use-state-for-unknown on computed attributes, and
//! detection of changed requires-replace attributes.

use serde::de::Error as _;
use serde::Serialize;
use serde_json::{Map, Value};

use super::schema::Schema;
use crate::api::{ProviderError, Result};

/// Result of planning one resource instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedChange {
    pub planned_state: Value,
    /// Attributes whose change forces destroy-and-recreate
    pub requires_replace: Vec<String>,
}

fn as_object(kind: &'static str, value: Value) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ProviderError::InvalidDocument {
            kind,
            source: serde_json::Error::custom(format!("expected an object, got: {}", other)),
        }),
    }
}

fn attr_value<'a>(map: &'a Map<String, Value>, name: &str) -> &'a Value {
    map.get(name).unwrap_or(&Value::Null)
}

impl Schema {
    /// Plan a proposed state against the prior state (`None` means create)
    pub fn plan(&self, prior: Option<&Value>, proposed: Value) -> Result<PlannedChange> {
        let mut planned = as_object("plan", proposed)?;
        let prior = match prior {
            Some(Value::Null) | None => None,
            Some(value) => Some(as_object("state", value.clone())?),
        };

        for attr in &self.attributes {
            let current = attr_value(&planned, &attr.name).clone();
            if !current.is_null() {
                continue;
            }

            if let Some(default) = &attr.default {
                planned.insert(attr.name.clone(), default.clone());
                continue;
            }

            if attr.presence.is_computed() && attr.use_state_for_unknown {
                if let Some(prior) = &prior {
                    let previous = attr_value(prior, &attr.name);
                    if !previous.is_null() {
                        planned.insert(attr.name.clone(), previous.clone());
                    }
                }
            }
        }

        let requires_replace = match &prior {
            None => Vec::new(),
            Some(prior) => self
                .attributes
                .iter()
                .filter(|attr| attr.requires_replace)
                .filter(|attr| attr_value(prior, &attr.name) != attr_value(&planned, &attr.name))
                .map(|attr| attr.name.clone())
                .collect(),
        };

        Ok(PlannedChange {
            planned_state: Value::Object(planned),
            requires_replace,
        })
    }
}
