//! OpenAPI / Swagger document parser
//!
//! Walks the raw JSON value of a specification and extracts the entity
//! collections used by template iteration. Handles:
//! - OpenAPI 3.x (`components.schemas`) and Swagger 2.0 (`definitions`)
//! - Local `$ref` resolution for parameters, request bodies and responses
//! - Path-level parameters merged into each operation
//! - Tag grouping of operations

use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::core::error::{Error, Result};
use crate::core::utils::identifier_from_route;

use super::types::{
    ApiGroup, ApiInfo, EnumDef, Model, Operation, Parameter, Property, Response, SpecDocument,
};

/// Group name for operations without tags
pub const DEFAULT_API_GROUP: &str = "default";

/// HTTP methods supported by OpenAPI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    pub fn all() -> &'static [HttpMethod] {
        &[
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Delete,
            HttpMethod::Patch,
            HttpMethod::Head,
            HttpMethod::Options,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Specification parser over a raw JSON document
pub struct OpenApiParser {
    json: JsonValue,
}

impl OpenApiParser {
    pub fn new(json: JsonValue) -> Self {
        Self { json }
    }

    /// Parse the document into a [`SpecDocument`]
    pub fn parse(self) -> Result<SpecDocument> {
        let version = self
            .json
            .get("openapi")
            .or_else(|| self.json.get("swagger"))
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::spec("Missing 'openapi' or 'swagger' version"))?
            .to_string();

        let info = self.parse_info()?;
        let operations = self.parse_operations()?;
        let apis = self.group_operations(&operations);
        let (models, enums) = self.parse_schemas();

        debug!(
            operations = operations.len(),
            apis = apis.len(),
            models = models.len(),
            enums = enums.len(),
            "Parsed specification document"
        );

        Ok(SpecDocument {
            version,
            info,
            apis,
            operations,
            models,
            enums,
            raw: self.json,
        })
    }

    fn parse_info(&self) -> Result<ApiInfo> {
        let info = self
            .json
            .get("info")
            .ok_or_else(|| Error::spec("Missing 'info' object"))?;
        let title = info
            .get("title")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::spec("Missing info.title"))?;
        let version = info
            .get("version")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::spec("Missing info.version"))?;

        Ok(ApiInfo {
            title: title.to_string(),
            version: version.to_string(),
            description: string_field(info, "description"),
        })
    }

    /// All operations, in document path order then method order
    fn parse_operations(&self) -> Result<Vec<Operation>> {
        let paths = self
            .json
            .get("paths")
            .and_then(JsonValue::as_object)
            .ok_or_else(|| Error::spec("Missing 'paths' object"))?;

        paths
            .iter()
            .flat_map(|(path, path_item)| {
                HttpMethod::all().iter().filter_map(move |method| {
                    path_item
                        .get(method.as_str())
                        .and_then(JsonValue::as_object)
                        .map(|method_item| (path, *method, path_item, method_item))
                })
            })
            .map(|(path, method, path_item, method_item)| {
                self.build_operation(path, method, path_item, method_item)
            })
            .collect()
    }

    fn build_operation(
        &self,
        path: &str,
        method: HttpMethod,
        path_item: &JsonValue,
        method_item: &Map<String, JsonValue>,
    ) -> Result<Operation> {
        let id = method_item
            .get("operationId")
            .and_then(JsonValue::as_str)
            .map(String::from)
            .unwrap_or_else(|| identifier_from_route(method.as_str(), path));

        // Operation-level parameters override path-level ones by (name, in)
        let mut parameters = self.extract_parameters(path_item.get("parameters"))?;
        for param in self.extract_parameters(method_item.get("parameters"))? {
            match parameters
                .iter_mut()
                .find(|p| p.name == param.name && p.location == param.location)
            {
                Some(existing) => *existing = param,
                None => parameters.push(param),
            }
        }

        let request_body = method_item
            .get("requestBody")
            .map(|body| self.resolve(body))
            .transpose()?;

        let responses = match method_item.get("responses").and_then(JsonValue::as_object) {
            Some(map) => map
                .iter()
                .map(|(status, response)| {
                    let response = self.resolve(response)?;
                    Ok(Response {
                        status: status.clone(),
                        description: string_field(&response, "description"),
                        content: response
                            .get("content")
                            .or_else(|| response.get("schema"))
                            .cloned(),
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        let tags = method_item
            .get("tags")
            .and_then(JsonValue::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(JsonValue::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Operation {
            id,
            method: method.to_string(),
            path: path.to_string(),
            tags,
            summary: method_item
                .get("summary")
                .and_then(JsonValue::as_str)
                .map(String::from),
            description: method_item
                .get("description")
                .and_then(JsonValue::as_str)
                .map(String::from),
            deprecated: method_item
                .get("deprecated")
                .and_then(JsonValue::as_bool)
                .unwrap_or(false),
            parameters,
            request_body,
            responses,
        })
    }

    fn extract_parameters(&self, params: Option<&JsonValue>) -> Result<Vec<Parameter>> {
        let Some(params) = params.and_then(JsonValue::as_array) else {
            return Ok(Vec::new());
        };

        params
            .iter()
            .map(|param| {
                let param = self.resolve(param)?;
                let name = param
                    .get("name")
                    .and_then(JsonValue::as_str)
                    .ok_or_else(|| Error::spec("Parameter missing name"))?;
                let location = param
                    .get("in")
                    .and_then(JsonValue::as_str)
                    .ok_or_else(|| Error::spec(format!("Parameter '{name}' missing 'in'")))?;
                let required = param
                    .get("required")
                    .and_then(JsonValue::as_bool)
                    .unwrap_or(location == "path");

                // Swagger 2 keeps type information inline on non-body parameters
                let schema = match param.get("schema") {
                    Some(schema) => schema.clone(),
                    None => inline_schema(&param),
                };

                Ok(Parameter {
                    name: name.to_string(),
                    location: location.to_string(),
                    required,
                    description: string_field(&param, "description"),
                    schema,
                })
            })
            .collect()
    }

    /// Groups operations by first tag; declared tag order first, then first use
    fn group_operations(&self, operations: &[Operation]) -> Vec<ApiGroup> {
        let mut groups: Vec<ApiGroup> = self
            .json
            .get("tags")
            .and_then(JsonValue::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(|tag| {
                        Some(ApiGroup {
                            name: tag.get("name")?.as_str()?.to_string(),
                            description: string_field(tag, "description"),
                            operations: Vec::new(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        for operation in operations {
            let name = operation
                .tags
                .first()
                .map(String::as_str)
                .unwrap_or(DEFAULT_API_GROUP);
            match groups.iter_mut().find(|g| g.name == name) {
                Some(group) => group.operations.push(operation.clone()),
                None => groups.push(ApiGroup {
                    name: name.to_string(),
                    description: None,
                    operations: vec![operation.clone()],
                }),
            }
        }

        // Declared tags nobody uses produce no output
        groups.retain(|g| !g.operations.is_empty());
        groups
    }

    fn parse_schemas(&self) -> (Vec<Model>, Vec<EnumDef>) {
        let schemas = self
            .json
            .pointer("/components/schemas")
            .or_else(|| self.json.get("definitions"))
            .and_then(JsonValue::as_object);

        let mut models = Vec::new();
        let mut enums = Vec::new();
        let Some(schemas) = schemas else {
            return (models, enums);
        };

        for (name, schema) in schemas {
            let description = string_field(schema, "description");
            if let Some(values) = schema.get("enum").and_then(JsonValue::as_array) {
                enums.push(EnumDef {
                    name: name.clone(),
                    description,
                    value_type: schema
                        .get("type")
                        .and_then(JsonValue::as_str)
                        .unwrap_or("string")
                        .to_string(),
                    values: values.clone(),
                });
                continue;
            }

            let required: Vec<&str> = schema
                .get("required")
                .and_then(JsonValue::as_array)
                .map(|arr| arr.iter().filter_map(JsonValue::as_str).collect())
                .unwrap_or_default();
            let properties = schema
                .get("properties")
                .and_then(JsonValue::as_object)
                .map(|props| {
                    props
                        .iter()
                        .map(|(prop_name, prop_schema)| Property {
                            name: prop_name.clone(),
                            required: required.contains(&prop_name.as_str()),
                            description: string_field(prop_schema, "description"),
                            schema: prop_schema.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default();

            models.push(Model {
                name: name.clone(),
                description,
                properties,
                schema: schema.clone(),
            });
        }
        (models, enums)
    }

    /// Follows a local `$ref` one level; non-ref values are returned as-is
    fn resolve(&self, value: &JsonValue) -> Result<JsonValue> {
        match value.get("$ref").and_then(JsonValue::as_str) {
            Some(reference) => {
                let pointer = reference.strip_prefix('#').ok_or_else(|| {
                    Error::spec(format!("Only local references are supported: {reference}"))
                })?;
                self.json
                    .pointer(pointer)
                    .cloned()
                    .ok_or_else(|| Error::spec(format!("Unresolvable reference: {reference}")))
            }
            None => Ok(value.clone()),
        }
    }
}

fn string_field(value: &JsonValue, key: &str) -> Option<String> {
    value.get(key).and_then(JsonValue::as_str).map(String::from)
}

fn inline_schema(param: &JsonValue) -> JsonValue {
    let mut schema = Map::new();
    for key in ["type", "format", "items", "enum", "default"] {
        if let Some(v) = param.get(key) {
            schema.insert(key.to_string(), v.clone());
        }
    }
    JsonValue::Object(schema)
}
