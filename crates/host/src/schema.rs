//! Declarative node and credential schemas consumed by the host UI.
//!
//! Pure data: the host renders these into forms and validates user input
//! against them. Nothing here is interpreted at execution time.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Static description of a node type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    pub display_name: String,
    /// Registered type name, unique across the pack.
    pub name: String,
    pub group: Vec<String>,
    pub version: u32,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub credentials: Vec<CredentialRef>,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub properties: Vec<NodeProperty>,
}

/// Reference to a credential type a node requires.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialRef {
    pub name: String,
    pub required: bool,
}

/// Static description of a credential type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDescriptor {
    pub name: String,
    pub display_name: String,
    pub properties: Vec<NodeProperty>,
}

/// One configurable field of a node or credential.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProperty {
    pub display_name: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub default: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<PropertyOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_options: Option<DisplayOptions>,
    /// Masked input for secrets.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub password: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    String,
    Number,
    Boolean,
    Options,
    Json,
}

/// One entry of an options-typed property.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyOption {
    pub name: String,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Conditional visibility: the field is shown only while every named
/// parameter currently holds one of the listed values.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DisplayOptions {
    pub show: BTreeMap<String, Vec<Value>>,
}

impl NodeProperty {
    fn new(display_name: &str, name: &str, kind: PropertyKind) -> Self {
        Self {
            display_name: display_name.to_string(),
            name: name.to_string(),
            kind,
            default: Value::Null,
            description: None,
            required: false,
            options: Vec::new(),
            display_options: None,
            password: false,
        }
    }

    pub fn string(display_name: &str, name: &str) -> Self {
        Self::new(display_name, name, PropertyKind::String)
    }

    pub fn number(display_name: &str, name: &str) -> Self {
        Self::new(display_name, name, PropertyKind::Number)
    }

    pub fn boolean(display_name: &str, name: &str) -> Self {
        Self::new(display_name, name, PropertyKind::Boolean)
    }

    pub fn json(display_name: &str, name: &str) -> Self {
        Self::new(display_name, name, PropertyKind::Json)
    }

    pub fn options(
        display_name: &str,
        name: &str,
        options: impl IntoIterator<Item = (&'static str, &'static str)>,
    ) -> Self {
        let mut property = Self::new(display_name, name, PropertyKind::Options);
        property.options = options
            .into_iter()
            .map(|(option_name, value)| PropertyOption {
                name: option_name.to_string(),
                value: Value::from(value),
                description: None,
            })
            .collect();
        property
    }

    pub fn default(mut self, value: Value) -> Self {
        self.default = value;
        self
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn password(mut self) -> Self {
        self.password = true;
        self
    }

    /// Show this field only when `parameter` holds one of `values`.
    pub fn show_when(
        mut self,
        parameter: &str,
        values: impl IntoIterator<Item = &'static str>,
    ) -> Self {
        let show = &mut self
            .display_options
            .get_or_insert_with(DisplayOptions::default)
            .show;
        show.insert(
            parameter.to_string(),
            values.into_iter().map(Value::from).collect(),
        );
        self
    }
}
