// Template engine for generating the HTML diagrammer

use crate::diagram::ClassDiagram;
use crate::error::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

/// Project page linked from the generated diagrammer
pub const REPOSITORY_URL: &str = env!("CARGO_PKG_REPOSITORY");

const DIAGRAMMER_TEMPLATE: &str = "class-diagrammer.html";
const VIEWER_SCRIPT: &str = include_str!("../../assets/script.js");

/// Values substituted into the diagrammer page
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo<'a> {
    pub assembly: &'a str,
    pub assembly_version: Option<&'a str>,
    pub builder_version: &'a str,
    pub repo_url: &'a str,
}

/// Template engine wrapping Tera with the embedded diagrammer page
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Create a new template engine with embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![(
            DIAGRAMMER_TEMPLATE,
            include_str!("../../templates/class-diagrammer.html.tera"),
        )])?;

        tera.register_filter("pluralize", pluralize);

        Ok(Self { tera })
    }

    /// Render the diagrammer page for a built model
    pub fn render_diagrammer(&self, info: &PageInfo, model: &ClassDiagram) -> Result<String> {
        let mut context = Context::new();
        context.insert("assembly", info.assembly);
        context.insert("assembly_version", &info.assembly_version);
        context.insert("builder_version", info.builder_version);
        context.insert("repo_url", info.repo_url);
        context.insert("type_count", &model.type_count());
        context.insert("model", &model_json(model)?);
        context.insert("script", VIEWER_SCRIPT);

        self.render(DIAGRAMMER_TEMPLATE, &context)
    }

    /// Render a template with a custom context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Pretty JSON of the model, safe to embed in a `<script>` element
pub fn model_json(model: &ClassDiagram) -> Result<String> {
    let json = serde_json::to_string_pretty(model)?;
    Ok(json.replace("</", "<\\/"))
}

/// Pluralize a word based on count
fn pluralize(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let count = value.as_u64().unwrap_or(0);
    let singular = args
        .get("singular")
        .and_then(|v| v.as_str())
        .unwrap_or("item");
    let default_plural = format!("{}s", singular);
    let plural = args
        .get("plural")
        .and_then(|v| v.as_str())
        .unwrap_or(&default_plural);

    if count == 1 {
        Ok(Value::String(format!("{} {}", count, singular)))
    } else {
        Ok(Value::String(format!("{} {}", count, plural)))
    }
}
