//! amermaid - Generate interactive mermaid class diagrams of .NET assemblies
//!
//! Reads the type metadata of an assembly from a JSON snapshot, builds a
//! class diagram model of the selected types and writes a static HTML
//! diagrammer that renders it with mermaid.

pub mod cli;
pub mod config;
pub mod diagram;
pub mod error;
pub mod metadata;
pub mod output;

// Re-export main types
pub use config::Config;
pub use diagram::{ClassDiagram, ClassDiagramBuilder, DocFormatter};
pub use error::{Error, Result};
pub use metadata::{DocumentationProvider, Snapshot, TypeSystem, XmlDocumentationFile};
pub use output::{HtmlConfig, HtmlGenerator};
