//! CLI module for amermaid

mod args;

pub use args::{Args, Command};

use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::diagram::{ClassDiagramBuilder, DocFormatter};
use crate::error::{Error, Result};
use crate::metadata::{Snapshot, TypeSystem, XmlDocumentationFile};
use crate::output::{HtmlConfig, HtmlGenerator};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Folder created next to the assembly when no output folder is given
pub const DEFAULT_OUTPUT_FOLDER: &str = "netAmermaid";

/// Run the CLI application
pub fn run(args: Args) -> ExitCode {
    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(args: Args) -> Result<()> {
    let verbose = args.verbose;

    match args.command {
        Command::Generate {
            assembly,
            output_folder,
            include,
            exclude,
            docs,
            strip_namespaces,
            report_excluded,
            config,
        } => {
            let assembly_path = resolve_path(&assembly)?;
            if !assembly_path.exists() {
                return Err(Error::PathNotFound(assembly_path));
            }

            let mut cfg = match &config {
                Some(config_path) => Config::load(config_path)?,
                None => Config::load_or_default(Path::new(DEFAULT_CONFIG_FILE))?,
            };

            let docs = docs.as_deref().map(resolve_path).transpose()?;

            // CLI takes precedence
            cfg.merge_cli(
                output_folder,
                include,
                exclude,
                docs,
                strip_namespaces,
                report_excluded,
            );
            cfg.validate()?;

            let docs_path = cfg
                .docs
                .path
                .clone()
                .unwrap_or_else(|| default_docs_path(&assembly_path));
            let output_dir = cfg
                .output
                .directory
                .clone()
                .unwrap_or_else(|| default_output_dir(&assembly_path));

            if verbose {
                println!("Assembly: {}", assembly_path.display());
                println!("Docs: {}", docs_path.display());
                println!("Output: {}", output_dir.display());
                println!("Include: {:?}", cfg.filter.include);
                println!("Exclude: {:?}", cfg.filter.exclude);
                println!("Strip namespaces: {:?}", cfg.docs.strip_namespaces);
            }

            println!("Loading assembly metadata...");
            let snapshot = Snapshot::load(&assembly_path)?;

            let doc_file = if docs_path.exists() {
                Some(XmlDocumentationFile::load(&docs_path)?)
            } else {
                println!("No XML documentation file found. Continuing without.");
                None
            };

            let mut builder = ClassDiagramBuilder::new(&snapshot);
            if let Some(doc_file) = &doc_file {
                builder = builder.with_docs(DocFormatter::new(doc_file, &cfg.docs.strip_namespaces)?);
            }

            println!("Building class diagram model...");
            let model = builder.build(cfg.filter.include.as_deref(), cfg.filter.exclude.as_deref())?;

            println!(
                "Model complete: {} types in {} namespaces, {} excluded",
                model.type_count(),
                model.namespaces.len(),
                model.excluded.len()
            );

            let html_config = HtmlConfig {
                output_dir: output_dir.clone(),
                assembly_name: snapshot.assembly().name.clone(),
                assembly_version: snapshot.assembly().version.clone(),
                report_excluded: cfg.output.report_excluded,
            };

            let generator = HtmlGenerator::new(html_config)?;
            let report = generator.generate(&model)?;

            println!("{}", report.summary());
            println!("Diagrammer written to: {}", output_dir.display());
            println!("Successfully generated HTML diagrammer.");

            Ok(())
        }

        Command::Version => {
            println!("amermaid {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Resolve a plain path or a `file://` URI to a local path
pub fn resolve_path(input: &str) -> Result<PathBuf> {
    let Some((scheme, rest)) = input.split_once("://") else {
        return Ok(PathBuf::from(input));
    };

    if !scheme.eq_ignore_ascii_case("file") {
        return Err(Error::InvalidPath(input.to_string()));
    }

    // file://localhost/path and file:///path both name a local path
    let rest = rest.strip_prefix("localhost").unwrap_or(rest);
    if !rest.starts_with('/') {
        return Err(Error::InvalidPath(input.to_string()));
    }

    let decoded = urlparse(rest).ok_or_else(|| Error::InvalidPath(input.to_string()))?;

    // file:///C:/dir names a drive path
    let bytes = decoded.as_bytes();
    if bytes.len() >= 3 && bytes[0] == b'/' && bytes[1].is_ascii_alphabetic() && bytes[2] == b':' {
        return Ok(PathBuf::from(&decoded[1..]));
    }

    Ok(PathBuf::from(decoded))
}

/// `MyApp.dll` and `MyApp.dll.json` both document into `MyApp.xml`
pub fn default_docs_path(assembly: &Path) -> PathBuf {
    let mut path = assembly.to_path_buf();
    if path.extension().is_some_and(|ext| ext == "json") {
        path.set_extension("");
    }
    path.set_extension("xml");
    path
}

pub fn default_output_dir(assembly: &Path) -> PathBuf {
    assembly
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(DEFAULT_OUTPUT_FOLDER)
}

/// Percent-decode a URI path, dropping any query string or fragment
fn urlparse(s: &str) -> Option<String> {
    let path = s.split(['?', '#']).next().unwrap_or(s);

    let mut bytes = Vec::with_capacity(path.len());
    let mut rest = path.as_bytes();

    while let Some((&b, tail)) = rest.split_first() {
        if b == b'%' {
            let hex = tail.get(..2)?;
            let hex = std::str::from_utf8(hex).ok()?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
            rest = &tail[2..];
        } else {
            bytes.push(b);
            rest = tail;
        }
    }

    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_plain_path() {
        assert_eq!(
            resolve_path("bin/My App.dll.json").unwrap(),
            PathBuf::from("bin/My App.dll.json")
        );
    }

    #[test]
    fn test_resolve_file_uri() {
        assert_eq!(
            resolve_path("file:///tmp/My%20App.dll.json").unwrap(),
            PathBuf::from("/tmp/My App.dll.json")
        );
        assert_eq!(
            resolve_path("file://localhost/tmp/App.json").unwrap(),
            PathBuf::from("/tmp/App.json")
        );
        assert_eq!(
            resolve_path("file:///C:/Builds/App.dll.json").unwrap(),
            PathBuf::from("C:/Builds/App.dll.json")
        );
    }

    #[test]
    fn test_resolve_utf8_escapes() {
        assert_eq!(
            resolve_path("file:///tmp/K%C3%A4se.json").unwrap(),
            PathBuf::from("/tmp/Käse.json")
        );
    }

    #[test]
    fn test_resolve_invalid_uris() {
        assert!(matches!(resolve_path("https://example.com/App.json"), Err(Error::InvalidPath(_))));
        assert!(matches!(resolve_path("file:///tmp/bad%2"), Err(Error::InvalidPath(_))));
        assert!(matches!(resolve_path("file:///tmp/%zz"), Err(Error::InvalidPath(_))));
        assert!(matches!(resolve_path("file://server/share"), Err(Error::InvalidPath(_))));
    }

    #[test]
    fn test_default_docs_path() {
        assert_eq!(default_docs_path(Path::new("bin/MyApp.dll")), PathBuf::from("bin/MyApp.xml"));
        assert_eq!(
            default_docs_path(Path::new("bin/MyApp.dll.json")),
            PathBuf::from("bin/MyApp.xml")
        );
        assert_eq!(default_docs_path(Path::new("MyApp.json")), PathBuf::from("MyApp.xml"));
    }

    #[test]
    fn test_default_output_dir() {
        assert_eq!(
            default_output_dir(Path::new("/builds/MyApp.dll.json")),
            PathBuf::from("/builds/netAmermaid")
        );
        assert_eq!(default_output_dir(Path::new("MyApp.dll.json")), PathBuf::from("netAmermaid"));
    }

    #[test]
    fn test_urlparse_strips_query() {
        assert_eq!(urlparse("/a%2Fb?x=1").as_deref(), Some("/a/b"));
    }
}
