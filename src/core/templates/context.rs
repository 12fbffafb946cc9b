//! Render context construction.
//!
//! Every render sees the document-wide variables (`spec`, `config`, `file`,
//! `apis`, `operations`, `models`, `enums`) plus the variables of the entity
//! being rendered:
//!
//! | type             | entity variable | `name`          |
//! |------------------|-----------------|-----------------|
//! | `support_once`   | none            | template set id |
//! | `api_once`       | `api`           | document title  |
//! | `api_each`       | `api`           | group name      |
//! | `operation_each` | `operation`     | operation id    |
//! | `model_each`     | `model`         | schema name     |
//! | `enum_each`      | `enum`          | schema name     |

use serde_json::json;
use tera::Context;

use crate::core::error::Result;
use crate::core::openapi::{ApiGroup, EnumDef, Model, Operation, SpecDocument};

use super::{TemplateConfig, TemplateFile, TemplateType};

/// One iteration unit of a template file
#[derive(Debug, Clone, Copy)]
pub enum ScopeEntity<'a> {
    Support,
    Document(&'a SpecDocument),
    Api(&'a ApiGroup),
    Operation(&'a Operation),
    Model(&'a Model),
    Enum(&'a EnumDef),
}

impl<'a> ScopeEntity<'a> {
    /// Enumerate the entities a file of `template_type` is rendered for
    pub fn expand(template_type: TemplateType, spec: &'a SpecDocument) -> Vec<ScopeEntity<'a>> {
        match template_type {
            TemplateType::SupportOnce => vec![Self::Support],
            TemplateType::ApiOnce => vec![Self::Document(spec)],
            TemplateType::ApiEach => spec.apis.iter().map(Self::Api).collect(),
            TemplateType::OperationEach => spec.operations.iter().map(Self::Operation).collect(),
            TemplateType::ModelEach => spec.models.iter().map(Self::Model).collect(),
            TemplateType::EnumEach => spec.enums.iter().map(Self::Enum).collect(),
        }
    }

    /// The value bound to `name`
    pub fn name<'b>(&'b self, config: &'b TemplateConfig) -> &'b str {
        match self {
            Self::Support => &config.id,
            Self::Document(spec) => &spec.info.title,
            Self::Api(api) => &api.name,
            Self::Operation(operation) => &operation.id,
            Self::Model(model) => &model.name,
            Self::Enum(enum_def) => &enum_def.name,
        }
    }
}

/// Document-wide context shared by every render of a pass
#[derive(Debug, Clone)]
pub struct RenderContext {
    base: Context,
}

impl RenderContext {
    pub fn new(spec: &SpecDocument, config: &TemplateConfig) -> Result<Self> {
        let mut base = Context::new();
        base.try_insert(
            "spec",
            &json!({
                "version": spec.version,
                "title": spec.info.title,
                "info": spec.info,
                "raw": spec.raw,
            }),
        )?;
        base.try_insert(
            "config",
            &json!({
                "id": config.id,
                "description": config.description,
            }),
        )?;
        base.try_insert("apis", &spec.apis)?;
        base.try_insert("operations", &spec.operations)?;
        base.try_insert("models", &spec.models)?;
        base.try_insert("enums", &spec.enums)?;
        Ok(Self { base })
    }

    /// Context for rendering `file` for one entity
    pub fn for_entity(
        &self,
        config: &TemplateConfig,
        file: &TemplateFile,
        entity: &ScopeEntity<'_>,
    ) -> Result<Context> {
        let mut context = self.base.clone();
        context.try_insert(
            "file",
            &json!({
                "description": file.description,
                "source_template": file.source_template,
                "type": file.template_type,
            }),
        )?;
        context.try_insert("name", entity.name(config))?;

        match entity {
            ScopeEntity::Support => {}
            ScopeEntity::Document(spec) => {
                context.try_insert(
                    "api",
                    &json!({
                        "name": spec.info.title,
                        "description": spec.info.description,
                        "operations": spec.operations,
                    }),
                )?;
            }
            ScopeEntity::Api(api) => context.try_insert("api", api)?,
            ScopeEntity::Operation(operation) => {
                context.try_insert("operation", operation)?;
                context.try_insert("operation_id", &operation.id)?;
            }
            ScopeEntity::Model(model) => context.try_insert("model", model)?,
            ScopeEntity::Enum(enum_def) => context.try_insert("enum", enum_def)?,
        }
        Ok(context)
    }
}
