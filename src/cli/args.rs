//! CLI argument parsing

use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

/// Generate interactive mermaid class diagrams of .NET assemblies
#[derive(Parser, Debug)]
#[command(name = "amermaid")]
#[command(about = "Generate interactive mermaid class diagrams of .NET assemblies")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: LevelFilter,

    /// Verbose output, also raises the log level to at least info
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// The effective log level
    pub fn log_filter(&self) -> LevelFilter {
        if self.verbose {
            self.log_level.max(LevelFilter::Info)
        } else {
            self.log_level
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the class diagram model and write the HTML diagrammer
    Generate {
        /// Path or file:// URI of the assembly metadata snapshot
        #[arg(short, long)]
        assembly: String,

        /// Output folder, defaults to `netAmermaid` next to the assembly
        #[arg(short = 'o', long)]
        output_folder: Option<PathBuf>,

        /// Regular expression for the reflection names of types to include
        #[arg(short, long)]
        include: Option<String>,

        /// Regular expression for the reflection names of types to exclude
        #[arg(short, long)]
        exclude: Option<String>,

        /// Path or file:// URI of the XML documentation file, defaults to the
        /// assembly path with an .xml extension
        #[arg(short, long)]
        docs: Option<String>,

        /// Namespaces to strip from documentation, in order (can be repeated)
        #[arg(short = 'n', long, num_args = 1..)]
        strip_namespaces: Vec<String>,

        /// Write the names of types left out of the diagram to `excluded types.txt`
        #[arg(short, long)]
        report_excluded: bool,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_defaults() {
        let args = Args::try_parse_from(["amermaid", "generate", "-a", "bin/MyApp.dll.json"]).unwrap();
        assert_eq!(args.log_filter(), LevelFilter::Warn);
        match args.command {
            Command::Generate {
                assembly,
                output_folder,
                include,
                strip_namespaces,
                report_excluded,
                config,
                ..
            } => {
                assert_eq!(assembly, "bin/MyApp.dll.json");
                assert!(output_folder.is_none());
                assert!(include.is_none());
                assert!(strip_namespaces.is_empty());
                assert!(!report_excluded);
                assert!(config.is_none());
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_generate_with_options() {
        let args = Args::try_parse_from([
            "amermaid", "generate",
            "--assembly", "file:///tmp/My%20App.dll.json",
            "--output-folder", "/tmp/diagrams",
            "--include", r"^MyApp\.",
            "--exclude", "Internal$",
            "--docs", "file:///tmp/MyApp.xml",
            "--strip-namespaces", "System.Collections.Generic", "System",
            "--report-excluded",
            "--config", "custom.toml",
            "--verbose",
        ]).unwrap();

        assert!(args.verbose);
        assert_eq!(args.log_filter(), LevelFilter::Info);

        match args.command {
            Command::Generate {
                assembly, output_folder, include, exclude, docs,
                strip_namespaces, report_excluded, config,
            } => {
                assert_eq!(assembly, "file:///tmp/My%20App.dll.json");
                assert_eq!(output_folder, Some(PathBuf::from("/tmp/diagrams")));
                assert_eq!(include.as_deref(), Some(r"^MyApp\."));
                assert_eq!(exclude.as_deref(), Some("Internal$"));
                assert_eq!(docs.as_deref(), Some("file:///tmp/MyApp.xml"));
                assert_eq!(
                    strip_namespaces,
                    vec!["System.Collections.Generic".to_string(), "System".to_string()]
                );
                assert!(report_excluded);
                assert_eq!(config, Some(PathBuf::from("custom.toml")));
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from([
            "amermaid", "generate", "-a", "MyApp.dll.json", "-o", "out", "-i", "Models", "-e", "Dto$",
            "-d", "docs.xml", "-n", "System", "-r",
        ]).unwrap();
        match args.command {
            Command::Generate { output_folder, exclude, report_excluded, .. } => {
                assert_eq!(output_folder, Some(PathBuf::from("out")));
                assert_eq!(exclude.as_deref(), Some("Dto$"));
                assert!(report_excluded);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_assembly_is_required() {
        assert!(Args::try_parse_from(["amermaid", "generate"]).is_err());
    }

    #[test]
    fn test_log_level() {
        let args = Args::try_parse_from(["amermaid", "generate", "-a", "x.json", "--log-level", "debug"]).unwrap();
        assert_eq!(args.log_filter(), LevelFilter::Debug);

        let args = Args::try_parse_from(["amermaid", "--log-level", "debug", "-v", "version"]).unwrap();
        assert_eq!(args.log_filter(), LevelFilter::Debug);
    }

    #[test]
    fn test_version_command() {
        let args = Args::try_parse_from(["amermaid", "version"]).unwrap();
        assert!(matches!(args.command, Command::Version));
    }
}
