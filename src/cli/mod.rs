//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod convert;
mod inspect;

use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use glob::glob;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Check if a path looks like a packer export (.json).
pub fn is_export_file(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("json"))
}

/// Expand inputs into export files.
///
/// Files are taken as given; directories are searched recursively for
/// `.json` exports. The result is sorted and free of duplicates.
pub fn collect_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let pattern = format!("{}/**/*.json", input.display());
            match glob(&pattern) {
                Ok(paths) => {
                    files.extend(paths.filter_map(Result::ok).filter(|p| is_export_file(p)))
                }
                Err(e) => log::warn!("invalid input pattern '{}': {}", pattern, e),
            }
        } else {
            files.push(input.clone());
        }
    }

    files.sort();
    files.dedup();
    files
}

/// Atlasmesh - convert polygon sprite atlas exports into OBJ meshes
#[derive(Parser)]
#[command(name = "atlasmesh")]
#[command(about = "Atlasmesh - convert polygon sprite atlas exports into OBJ meshes")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert atlas exports to one mesh file per shape
    Convert {
        /// Export files or directories containing .json exports
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (default: output.dir from atlasmesh.toml, or "meshes")
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Pixels per world unit (default: 2048/21)
        #[arg(long)]
        pixels_per_unit: Option<f32>,

        /// Mesh file extension (default: obj)
        #[arg(long)]
        extension: Option<String>,

        /// Delete mesh files in the output directory that no shape produced
        #[arg(long)]
        prune: bool,

        /// Print what would be written without touching the filesystem
        #[arg(long)]
        dry_run: bool,

        /// Number of parallel jobs (default: number of CPUs)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Path to atlasmesh.toml (default: discovered from the current directory)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show the shapes contained in an atlas export
    Inspect {
        /// Export file to inspect
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Path to atlasmesh.toml (default: discovered from the current directory)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Log level filter for the `-v`/`-q` flags.
fn log_filter(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let env = env_logger::Env::default().default_filter_or(log_filter(verbose, quiet));
    // Keep an already-installed logger
    let _ = env_logger::Builder::from_env(env).format_timestamp(None).try_init();
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Convert {
            inputs,
            out,
            pixels_per_unit,
            extension,
            prune,
            dry_run,
            jobs,
            config,
        } => convert::run_convert(&convert::ConvertArgs {
            inputs,
            out,
            pixels_per_unit,
            extension,
            prune,
            dry_run,
            jobs,
            config,
        }),
        Commands::Inspect { input, json, config } => {
            inspect::run_inspect(&input, json, config.as_deref())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_log_filter() {
        assert_eq!(log_filter(0, false), "warn");
        assert_eq!(log_filter(1, false), "info");
        assert_eq!(log_filter(2, false), "debug");
        assert_eq!(log_filter(5, false), "trace");
        assert_eq!(log_filter(0, true), "error");
    }

    #[test]
    fn test_is_export_file() {
        assert!(is_export_file(Path::new("atlas.json")));
        assert!(!is_export_file(Path::new("atlas.png")));
        assert!(!is_export_file(Path::new("atlas")));
    }

    #[test]
    fn test_collect_inputs_expands_directories() {
        let temp = tempdir().unwrap();
        let nested = temp.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join("a.json"), "{}").unwrap();
        fs::write(nested.join("b.json"), "{}").unwrap();
        fs::write(temp.path().join("a.png"), "").unwrap();

        let files = collect_inputs(&[temp.path().to_path_buf(), temp.path().join("a.json")]);
        assert_eq!(files, vec![temp.path().join("a.json"), nested.join("b.json")]);
    }

    #[test]
    fn test_cli_parses_convert() {
        let cli = Cli::try_parse_from([
            "atlasmesh",
            "-vv",
            "convert",
            "atlas.json",
            "-o",
            "out",
            "--pixels-per-unit",
            "100",
            "--prune",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Convert { inputs, out, pixels_per_unit, prune, dry_run, .. } => {
                assert_eq!(inputs, vec![PathBuf::from("atlas.json")]);
                assert_eq!(out, Some(PathBuf::from("out")));
                assert_eq!(pixels_per_unit, Some(100.0));
                assert!(prune);
                assert!(!dry_run);
            }
            _ => panic!("Expected convert command"),
        }
    }

    #[test]
    fn test_cli_convert_requires_input() {
        assert!(Cli::try_parse_from(["atlasmesh", "convert"]).is_err());
    }
}
