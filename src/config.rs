use crate::diagram::compile_filter;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "amermaid.toml";

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub filter: FilterConfig,
    pub docs: DocsConfig,
    pub output: OutputConfig,
}

/// Type selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Regular expression a type's reflection name must match
    pub include: Option<String>,
    /// Regular expression a type's reflection name must not match
    pub exclude: Option<String>,
}

/// XML documentation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Documentation file, defaults to the assembly path with an `.xml` extension
    pub path: Option<PathBuf>,
    /// Namespaces removed from documentation text, in replacement order
    pub strip_namespaces: Vec<String>,
}

/// Output settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output folder, defaults to `netAmermaid` next to the assembly
    pub directory: Option<PathBuf>,
    /// Also write a report of the types left out of the diagram
    pub report_excluded: bool,
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file, or defaults when the file does not exist.
    /// A file that exists but fails to parse or validate is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            result => result,
        }
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(
        &mut self,
        output: Option<PathBuf>,
        include: Option<String>,
        exclude: Option<String>,
        docs: Option<PathBuf>,
        strip_namespaces: Vec<String>,
        report_excluded: bool,
    ) {
        if let Some(out) = output {
            self.output.directory = Some(out);
        }

        if include.is_some() {
            self.filter.include = include;
        }

        if exclude.is_some() {
            self.filter.exclude = exclude;
        }

        if docs.is_some() {
            self.docs.path = docs;
        }

        if !strip_namespaces.is_empty() {
            self.docs.strip_namespaces = strip_namespaces;
        }

        if report_excluded {
            self.output.report_excluded = true;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for pattern in [&self.filter.include, &self.filter.exclude].into_iter().flatten() {
            if pattern.is_empty() {
                return Err(Error::config_validation("filter patterns must not be empty"));
            }
            compile_filter(Some(pattern.as_str()))?;
        }

        if self.docs.strip_namespaces.iter().any(|ns| ns.trim().is_empty()) {
            return Err(Error::config_validation("stripped namespaces must not be blank"));
        }

        Ok(())
    }
}
