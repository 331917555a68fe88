//! Shared steps for the roast subcommands.

use std::path::{Path, PathBuf};

use roast_compiler::CommandLocator;
use roast_config::{ColorMode, Settings};
use roast_loader::{NoopEvaluator, ProgressReporter, Runtime};

use crate::{ColorChoice, GlobalArgs};

/// Resolves settings from `--config`, or from `roast.toml` in the current
/// directory when present. The `--color` flag overrides the file unless it
/// is `auto`.
pub fn load_settings(global: &GlobalArgs) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = match global.config {
        Some(ref path) => roast_config::load_config_file(&absolute(path)?)?,
        None => roast_config::load_config(&std::env::current_dir()?)?,
    };
    settings.install_root = std::path::absolute(&settings.install_root)?;
    match global.color {
        ColorChoice::Auto => {}
        ColorChoice::Always => settings.color = ColorMode::Always,
        ColorChoice::Never => settings.color = ColorMode::Never,
    }
    Ok(settings)
}

/// Brings up the loader with the transpiler found on `PATH`.
pub fn start_runtime(
    settings: Settings,
    global: &GlobalArgs,
) -> Result<Runtime, Box<dyn std::error::Error>> {
    let progress = if global.quiet {
        ProgressReporter::silent()
    } else {
        ProgressReporter::stdout(&settings)
    };
    let runtime = Runtime::init(settings, &CommandLocator::from_env(), NoopEvaluator, progress)?;
    Ok(runtime)
}

/// Makes a command-line path absolute against the current directory.
pub fn absolute(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    Ok(std::path::absolute(path)?)
}

/// Discovers tracked source files below `dir` (recursive), sorted by path.
///
/// Cache directories and hidden directories are skipped.
pub fn discover_tracked_files(
    dir: &Path,
    settings: &Settings,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut files = Vec::new();
    walk_dir(dir, settings, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk_dir(
    dir: &Path,
    settings: &Settings,
    files: &mut Vec<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name == settings.cache_dir || name.starts_with('.') {
                continue;
            }
            walk_dir(&path, settings, files)?;
        } else if settings.extensions.is_tracked(&path) {
            files.push(path);
        }
    }
    Ok(())
}
