//! CLI dispatch for the `atlasmesh convert` command.

use std::collections::{HashMap, HashSet};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{self, CliOverrides, MeshConfig};
use crate::convert::{default_jobs, AtlasConversion, Converter};
use crate::output::{find_stale, mesh_path, prune_stale, write_meshes};

use super::{collect_inputs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Arguments of the convert command.
#[derive(Debug, Clone, Default)]
pub struct ConvertArgs {
    pub inputs: Vec<PathBuf>,
    pub out: Option<PathBuf>,
    pub pixels_per_unit: Option<f32>,
    pub extension: Option<String>,
    pub prune: bool,
    pub dry_run: bool,
    pub jobs: Option<usize>,
    pub config: Option<PathBuf>,
}

/// Load the configuration, resolve its output directory and apply
/// command-line overrides.
///
/// A relative `output.dir` is anchored at the config file when that file was
/// named explicitly or found by walking up from the current directory. A
/// user-wide config under `$XDG_CONFIG_HOME` leaves it relative to the
/// current directory.
pub(crate) fn resolve_config(
    config_path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<MeshConfig, config::ConfigError> {
    let project_config = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => env::current_dir().ok().and_then(config::find_config_from),
    };

    match project_config {
        Some(path) => load_resolved(Some(&path), true, overrides),
        None => load_resolved(config::find_xdg_config().as_deref(), false, overrides),
    }
}

fn load_resolved(
    config_path: Option<&Path>,
    anchor_output: bool,
    overrides: &CliOverrides,
) -> Result<MeshConfig, config::ConfigError> {
    let mut mesh_config = config::load_config(config_path)?;

    if anchor_output {
        if let Some(root) = config_path.and_then(Path::parent) {
            mesh_config.output.dir = config::resolve_path(root, &mesh_config.output.dir);
        }
    }

    config::merge_cli_overrides(&mut mesh_config, overrides)?;
    Ok(mesh_config)
}

/// Execute the convert command.
pub fn run_convert(args: &ConvertArgs) -> ExitCode {
    let overrides = CliOverrides {
        out: args.out.clone(),
        pixels_per_unit: args.pixels_per_unit,
        extension: args.extension.clone(),
        prune: args.prune.then_some(true),
    };

    let mesh_config = match resolve_config(args.config.as_deref(), &overrides) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let files = collect_inputs(&args.inputs);
    if files.is_empty() {
        eprintln!("Error: no export files found");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let converter = Converter::new()
        .with_geometry(mesh_config.geometry_options())
        .with_scan_options(mesh_config.scan_options());
    let jobs = args.jobs.unwrap_or_else(default_jobs);
    log::debug!("converting {} files with {} jobs", files.len(), jobs);

    let results = match converter.convert_files(&files, jobs) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let out_dir = mesh_config.output.dir.as_path();
    let extension = mesh_config.output.extension.as_str();
    let mut failures = 0;
    let mut converted_files = 0;
    let mut mesh_count = 0;
    let mut keep = HashSet::new();
    let mut owners: HashMap<String, PathBuf> = HashMap::new();

    for result in results {
        let conversion = match result {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {}", e);
                failures += 1;
                continue;
            }
        };

        warn_on_shared_names(&conversion, &mut owners);
        mesh_count += conversion.meshes.len();

        if args.dry_run {
            for mesh in &conversion.meshes {
                let path = mesh_path(out_dir, mesh, extension);
                println!("would write {}", path.display());
                keep.insert(path);
            }
            converted_files += 1;
            continue;
        }

        match write_meshes(out_dir, &conversion.meshes, extension) {
            Ok(written) => {
                keep.extend(written);
                converted_files += 1;
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                failures += 1;
            }
        }
    }

    if mesh_config.output.prune {
        if failures > 0 {
            log::warn!("skipping prune because {} file(s) failed", failures);
        } else if let Err(e) = prune(out_dir, &keep, extension, args.dry_run) {
            eprintln!("Error: {}", e);
            failures += 1;
        }
    }

    println!("Converted {} meshes from {} of {} files", mesh_count, converted_files, files.len());

    if failures > 0 {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

fn prune(
    out_dir: &Path,
    keep: &HashSet<PathBuf>,
    extension: &str,
    dry_run: bool,
) -> Result<(), crate::output::OutputError> {
    if dry_run {
        for path in find_stale(out_dir, keep, extension)? {
            println!("would remove {}", path.display());
        }
    } else {
        let removed = prune_stale(out_dir, keep, extension)?;
        if !removed.is_empty() {
            println!("Removed {} stale mesh files", removed.len());
        }
    }
    Ok(())
}

/// Shapes with the same name in different exports write the same file.
fn warn_on_shared_names(conversion: &AtlasConversion, owners: &mut HashMap<String, PathBuf>) {
    for mesh in &conversion.meshes {
        if let Some(previous) = owners.insert(mesh.name.clone(), conversion.source.clone()) {
            log::warn!(
                "shape '{}' from {} overwrites the one from {}",
                mesh.name,
                conversion.source.display(),
                previous.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_config_relative_to_config_file() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("atlasmesh.toml");
        fs::write(&config_path, "[output]\ndir = \"build/meshes\"\n").unwrap();

        let config = resolve_config(Some(&config_path), &CliOverrides::default()).unwrap();
        assert_eq!(config.output.dir, temp.path().join("build/meshes"));
    }

    #[test]
    fn test_user_config_output_dir_stays_relative() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("atlasmesh.toml");
        fs::write(&config_path, "[output]\nprune = true\n").unwrap();

        let config = load_resolved(Some(&config_path), false, &CliOverrides::default()).unwrap();
        assert!(config.output.prune);
        assert_eq!(config.output.dir, PathBuf::from("meshes"));

        let config = load_resolved(Some(&config_path), true, &CliOverrides::default()).unwrap();
        assert_eq!(config.output.dir, temp.path().join("meshes"));
    }

    #[test]
    fn test_resolve_config_cli_out_wins() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("atlasmesh.toml");
        fs::write(&config_path, "[output]\ndir = \"build/meshes\"\n").unwrap();

        let overrides =
            CliOverrides { out: Some(PathBuf::from("elsewhere")), ..Default::default() };
        let config = resolve_config(Some(&config_path), &overrides).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("elsewhere"));
    }
}
