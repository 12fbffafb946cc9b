//! Entity types extracted from an API specification document.
//!
//! These are the collections the `_each` template types iterate over.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A parsed specification document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecDocument {
    /// `openapi` or `swagger` version string
    pub version: String,
    pub info: ApiInfo,
    /// Operations grouped by their first tag
    pub apis: Vec<ApiGroup>,
    /// All operations in document order
    pub operations: Vec<Operation>,
    /// Named object schemas
    pub models: Vec<Model>,
    /// Named enumeration schemas
    pub enums: Vec<EnumDef>,
    /// The untouched document
    pub raw: JsonValue,
}

/// Document-level metadata from `info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
}

/// Operations sharing a tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiGroup {
    pub name: String,
    pub description: Option<String>,
    pub operations: Vec<Operation>,
}

/// One (path, method) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// `operationId`, or an id derived from method and path
    pub id: String,
    pub method: String,
    pub path: String,
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    pub parameters: Vec<Parameter>,
    pub request_body: Option<JsonValue>,
    pub responses: Vec<Response>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// `path`, `query`, `header`, `cookie` (or Swagger's `body`/`formData`)
    pub location: String,
    pub required: bool,
    pub description: Option<String>,
    pub schema: JsonValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub status: String,
    pub description: Option<String>,
    pub content: Option<JsonValue>,
}

/// A named non-enum schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub description: Option<String>,
    pub properties: Vec<Property>,
    pub schema: JsonValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub required: bool,
    pub description: Option<String>,
    pub schema: JsonValue,
}

/// A named schema carrying an `enum` list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    pub description: Option<String>,
    /// The schema `type`, `string` when unspecified
    pub value_type: String,
    pub values: Vec<JsonValue>,
}

impl SpecDocument {
    pub fn operation(&self, id: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.id == id)
    }

    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }
}
