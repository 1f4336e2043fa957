//! Data model for the generic form renderer. These types only describe the
//! shape of a form; rendering and update callbacks live in the studio UI.

use serde::{Deserialize, Serialize};

/// One rich-content block, an open JSON object keyed by field name.
pub type FormData = serde_json::Map<String, serde_json::Value>;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FormField {
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "defaultValue")]
    pub default_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FormOption>,
    // Group fields nest one level per group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FormField>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FormOption {
    pub value: String,
    pub label: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FormAdvancedSetting {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}
