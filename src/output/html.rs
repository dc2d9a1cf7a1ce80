// HTML diagrammer generator
//
// Writes the diagrammer files to disk: class-diagrammer.html, styles.css
// and optionally the excluded types report. Everything is rendered before
// the first file is written.

use crate::diagram::ClassDiagram;
use crate::error::Result;
use crate::output::templates::{PageInfo, TemplateEngine, REPOSITORY_URL};
use log::info;
use std::fs;
use std::path::PathBuf;

pub const DIAGRAMMER_FILE: &str = "class-diagrammer.html";
pub const STYLES_FILE: &str = "styles.css";
pub const EXCLUDED_TYPES_FILE: &str = "excluded types.txt";

const STYLES: &str = include_str!("../../assets/styles.css");

/// Configuration for HTML generation
#[derive(Debug, Clone)]
pub struct HtmlConfig {
    /// Output directory
    pub output_dir: PathBuf,
    /// Assembly name for titles
    pub assembly_name: String,
    pub assembly_version: Option<String>,
    /// Whether to write the excluded types report
    pub report_excluded: bool,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("netAmermaid"),
            assembly_name: "Assembly".to_string(),
            assembly_version: None,
            report_excluded: false,
        }
    }
}

/// HTML diagrammer generator
pub struct HtmlGenerator {
    config: HtmlConfig,
    template_engine: TemplateEngine,
}

impl HtmlGenerator {
    /// Create a new HTML generator
    pub fn new(config: HtmlConfig) -> Result<Self> {
        let template_engine = TemplateEngine::new()?;
        Ok(Self {
            config,
            template_engine,
        })
    }

    /// Generate the diagrammer for a built model
    pub fn generate(&self, model: &ClassDiagram) -> Result<GenerationReport> {
        let info = PageInfo {
            assembly: &self.config.assembly_name,
            assembly_version: self.config.assembly_version.as_deref(),
            builder_version: env!("CARGO_PKG_VERSION"),
            repo_url: REPOSITORY_URL,
        };
        let html = self.template_engine.render_diagrammer(&info, model)?;

        fs::create_dir_all(&self.config.output_dir)?;
        fs::write(self.config.output_dir.join(DIAGRAMMER_FILE), html)?;
        fs::write(self.config.output_dir.join(STYLES_FILE), STYLES)?;

        let mut report = GenerationReport {
            types_rendered: model.type_count(),
            outside_references: model.outside_references.len(),
            excluded_report: None,
        };

        if self.config.report_excluded {
            let path = self.config.output_dir.join(EXCLUDED_TYPES_FILE);
            fs::write(&path, excluded_report(&model.excluded))?;
            report.excluded_report = Some(path);
        }

        info!("wrote diagrammer to {}", self.config.output_dir.display());
        Ok(report)
    }
}

fn excluded_report(excluded: &[String]) -> String {
    excluded.iter().map(|name| format!("{name}\n")).collect()
}

/// Report of what was generated
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub types_rendered: usize,
    pub outside_references: usize,
    pub excluded_report: Option<PathBuf>,
}

impl GenerationReport {
    pub fn summary(&self) -> String {
        format!(
            "Generated diagrammer for {} types, outside references: {}, excluded report: {}",
            self.types_rendered,
            self.outside_references,
            if self.excluded_report.is_some() {
                "yes"
            } else {
                "no"
            }
        )
    }
}
