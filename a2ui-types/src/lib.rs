//! Shared wire types for the A2UI protocol
//!
//! This crate defines the inbound message taxonomy and the value carriers
//! used across the a2ui ecosystem. Every type matches the JSON wire shape
//! one-to-one: messages are externally tagged (exactly one top-level key),
//! field names are camelCase, and unknown style keys are preserved.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One unit of the inbound protocol stream.
///
/// The wire shape is `{ "<kind>": { ... } }` with exactly one top-level key;
/// serde's external tagging enforces that during decoding, so a message with
/// zero or multiple keys never constructs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    #[serde(rename = "beginRendering")]
    BeginRendering(BeginRendering),
    #[serde(rename = "surfaceUpdate")]
    SurfaceUpdate(SurfaceUpdate),
    #[serde(rename = "dataModelUpdate")]
    DataModelUpdate(DataModelUpdate),
    #[serde(rename = "deleteSurface")]
    DeleteSurface(DeleteSurface),
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::BeginRendering(_) => MessageKind::BeginRendering,
            Message::SurfaceUpdate(_) => MessageKind::SurfaceUpdate,
            Message::DataModelUpdate(_) => MessageKind::DataModelUpdate,
            Message::DeleteSurface(_) => MessageKind::DeleteSurface,
        }
    }

    /// The surface this message addresses.
    pub fn surface_id(&self) -> &str {
        match self {
            Message::BeginRendering(m) => &m.surface_id,
            Message::SurfaceUpdate(m) => &m.surface_id,
            Message::DataModelUpdate(m) => &m.surface_id,
            Message::DeleteSurface(m) => &m.surface_id,
        }
    }

    /// Decode a message from loose JSON.
    ///
    /// Unknown or malformed messages fail here rather than inside the
    /// dispatch pipeline.
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// Message discriminant, matching the wire tag names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageKind {
    BeginRendering,
    SurfaceUpdate,
    DataModelUpdate,
    DeleteSurface,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::BeginRendering => "beginRendering",
            MessageKind::SurfaceUpdate => "surfaceUpdate",
            MessageKind::DataModelUpdate => "dataModelUpdate",
            MessageKind::DeleteSurface => "deleteSurface",
        }
    }
}

/// Creates a surface and names its root component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginRendering {
    pub surface_id: String,
    /// Component id the tree hangs from.
    pub root: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<SurfaceStyles>,
}

/// Adds or replaces component definitions on a surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceUpdate {
    pub surface_id: String,
    #[serde(default)]
    pub components: Vec<ComponentDefinition>,
}

/// Writes parsed contents into a surface's data model at `path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataModelUpdate {
    pub surface_id: String,
    /// Target path; absent means the model root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub contents: Vec<DataEntry>,
}

/// Tears down a surface and its data model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSurface {
    pub surface_id: String,
}

/// One entry of a `dataModelUpdate`'s `contents` array.
///
/// Carries at most one `value*` field; `valueMap` nests recursively. The
/// parser in `a2ui-core` picks the first populated field in declaration
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DataEntry {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_number: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_array: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_map: Option<Vec<DataEntry>>,
}

impl DataEntry {
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value_string: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn number(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value_number: Some(value),
            ..Default::default()
        }
    }

    pub fn boolean(key: impl Into<String>, value: bool) -> Self {
        Self {
            key: key.into(),
            value_boolean: Some(value),
            ..Default::default()
        }
    }

    pub fn map(key: impl Into<String>, entries: Vec<DataEntry>) -> Self {
        Self {
            key: key.into(),
            value_map: Some(entries),
            ..Default::default()
        }
    }
}

/// A typed component definition inside a surface's flat component map.
///
/// `component` holds exactly one key (the component type) mapped to a
/// type-specific property bag. Definitions with zero or multiple keys are
/// rejected by the surface store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinition {
    pub id: String,
    pub component: Map<String, Value>,
    /// Optional layout weight hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl ComponentDefinition {
    pub fn new(id: impl Into<String>, component_type: impl Into<String>, props: Value) -> Self {
        let mut component = Map::new();
        component.insert(component_type.into(), props);
        Self {
            id: id.into(),
            component,
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// The single type key, or `None` when the definition is malformed.
    pub fn component_type(&self) -> Option<&str> {
        if self.component.len() == 1 {
            self.component.keys().next().map(String::as_str)
        } else {
            None
        }
    }

    /// Property bag of the single type key.
    pub fn props(&self) -> Option<&Value> {
        if self.component.len() == 1 {
            self.component.values().next()
        } else {
            None
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && self.component.len() == 1
    }
}

/// Per-surface style record. Well-known keys are typed; everything else is
/// kept verbatim under `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceStyles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SurfaceStyles {
    /// Shallow-merges `other` into `self`; populated fields win.
    pub fn merge_from(&mut self, other: &SurfaceStyles) {
        if other.font.is_some() {
            self.font = other.font.clone();
        }
        if other.primary_color.is_some() {
            self.primary_color = other.primary_color.clone();
        }
        for (key, value) in &other.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }
}

/// Tagged value carrier: a literal, or a path into the owning surface's
/// data model. Exactly one variant populates on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueDescriptor {
    #[serde(rename = "literalString")]
    LiteralString(String),
    #[serde(rename = "literalNumber")]
    LiteralNumber(f64),
    #[serde(rename = "literalBoolean")]
    LiteralBoolean(bool),
    #[serde(rename = "literalArray")]
    LiteralArray(Vec<Value>),
    #[serde(rename = "path")]
    Path(String),
}

impl ValueDescriptor {
    pub fn is_path(&self) -> bool {
        matches!(self, ValueDescriptor::Path(_))
    }

    /// The referenced path, for two-way-bindable fields.
    pub fn path(&self) -> Option<&str> {
        match self {
            ValueDescriptor::Path(p) => Some(p),
            _ => None,
        }
    }
}

/// A named, context-carrying action raised by user interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<ContextEntry>,
}

impl ActionDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: ValueDescriptor) -> Self {
        self.context.push(ContextEntry {
            key: key.into(),
            value,
        });
        self
    }
}

/// One `{key, value}` pair of an action's context sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub key: String,
    pub value: ValueDescriptor,
}
