//! Attribute schemas
//!
//! Each resource and data source declares a fixed attribute schema. The
//! schema is part of the external contract: the host's planning engine reads
//! presence, sensitivity and replacement flags from it. The same schema drives
//! configuration validation and plan modification in [`super::plan`].

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::diagnostics::{Diagnostic, Diagnostics};

/// Value type of an attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    List(Box<AttributeType>),
    Set(Box<AttributeType>),
    Map(Box<AttributeType>),
    Object(BTreeMap<String, AttributeType>),
}

impl AttributeType {
    /// Whether a JSON value fits this type (null always fits)
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (AttributeType::String, Value::String(_)) => true,
            (AttributeType::Bool, Value::Bool(_)) => true,
            (AttributeType::List(elem) | AttributeType::Set(elem), Value::Array(items)) => {
                items.iter().all(|item| !item.is_null() && elem.accepts(item))
            }
            (AttributeType::Map(elem), Value::Object(entries)) => {
                entries.values().all(|v| !v.is_null() && elem.accepts(v))
            }
            (AttributeType::Object(fields), Value::Object(entries)) => {
                entries.keys().all(|k| fields.contains_key(k))
                    && fields
                        .iter()
                        .all(|(k, ty)| entries.get(k).map_or(true, |v| ty.accepts(v)))
            }
            _ => false,
        }
    }
}

/// Who supplies an attribute's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Required,
    Optional,
    Computed,
    OptionalComputed,
}

impl Presence {
    pub fn is_computed(self) -> bool {
        matches!(self, Presence::Computed | Presence::OptionalComputed)
    }

    pub fn is_configurable(self) -> bool {
        !matches!(self, Presence::Computed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: AttributeType,
    pub presence: Presence,
    pub description: String,
    pub sensitive: bool,
    pub requires_replace: bool,
    pub use_state_for_unknown: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Attribute {
    pub fn new(name: &str, ty: AttributeType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            presence: Presence::Optional,
            description: String::new(),
            sensitive: false,
            requires_replace: false,
            use_state_for_unknown: false,
            default: None,
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn bool(name: &str) -> Self {
        Self::new(name, AttributeType::Bool)
    }

    pub fn string_list(name: &str) -> Self {
        Self::new(name, AttributeType::List(Box::new(AttributeType::String)))
    }

    pub fn string_set(name: &str) -> Self {
        Self::new(name, AttributeType::Set(Box::new(AttributeType::String)))
    }

    pub fn string_map(name: &str) -> Self {
        Self::new(name, AttributeType::Map(Box::new(AttributeType::String)))
    }

    /// List of objects whose fields are all strings
    pub fn object_list(name: &str, fields: &[&str]) -> Self {
        let fields = fields
            .iter()
            .map(|f| (f.to_string(), AttributeType::String))
            .collect();
        Self::new(
            name,
            AttributeType::List(Box::new(AttributeType::Object(fields))),
        )
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.presence = Presence::Required;
        self
    }

    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    pub fn computed(mut self) -> Self {
        self.presence = Presence::Computed;
        self
    }

    pub fn optional_computed(mut self) -> Self {
        self.presence = Presence::OptionalComputed;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Changing this attribute destroys and recreates the resource
    pub fn requires_replace(mut self) -> Self {
        self.requires_replace = true;
        self
    }

    /// Keep the prior state value instead of planning an unknown
    pub fn use_state_for_unknown(mut self) -> Self {
        self.use_state_for_unknown = true;
        self
    }

    /// Static default applied at plan time; makes the attribute optional+computed
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self.presence = Presence::OptionalComputed;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub version: i64,
    pub description: String,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(description: &str) -> Self {
        Self {
            version: 0,
            description: description.to_string(),
            attributes: Vec::new(),
        }
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Check a configuration object against the schema
    ///
    /// Reports missing required arguments, values set on read-only
    /// attributes, unknown arguments and type mismatches.
    pub fn validate_config(&self, config: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();

        let Some(entries) = config.as_object() else {
            diags.add_error(
                "Invalid Configuration",
                format!("expected an object, got: {}", config),
            );
            return diags;
        };

        for (name, value) in entries {
            match self.get(name) {
                None => diags.push(
                    Diagnostic::error(
                        "Unsupported argument",
                        format!("An argument named \"{}\" is not expected here.", name),
                    )
                    .with_attribute(name.clone()),
                ),
                Some(attr) if !attr.presence.is_configurable() && !value.is_null() => diags.push(
                    Diagnostic::error(
                        "Invalid Configuration for Read-Only Attribute",
                        format!("\"{}\" is computed by the provider and cannot be set.", name),
                    )
                    .with_attribute(name.clone()),
                ),
                Some(attr) if !attr.ty.accepts(value) => diags.push(
                    Diagnostic::error(
                        "Incorrect attribute value type",
                        format!("\"{}\" does not accept the value {}.", name, value),
                    )
                    .with_attribute(name.clone()),
                ),
                Some(_) => {}
            }
        }

        for attr in &self.attributes {
            if attr.presence == Presence::Required
                && entries.get(&attr.name).map_or(true, Value::is_null)
            {
                diags.push(
                    Diagnostic::error(
                        "Missing required argument",
                        format!("The argument \"{}\" is required, but no definition was found.", attr.name),
                    )
                    .with_attribute(attr.name.clone()),
                );
            }
        }

        diags
    }
}
