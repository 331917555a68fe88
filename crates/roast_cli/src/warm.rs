//! `roast warm`: precompile every tracked file below a directory.

use std::path::PathBuf;

use crate::pipeline::{absolute, discover_tracked_files, load_settings, start_runtime};
use crate::{GlobalArgs, WarmArgs};

/// Runs the `roast warm` command.
///
/// Loads every discovered file, which compiles the stale ones and leaves
/// fresh artifacts alone. Returns exit code 1 if any file failed.
pub fn run(args: &WarmArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let settings = load_settings(global)?;
    let dir: PathBuf = match args.dir {
        Some(ref dir) => absolute(dir)?,
        None => settings.install_root.clone(),
    };
    let files = discover_tracked_files(&dir, &settings)?;
    if files.is_empty() {
        if !global.quiet {
            eprintln!("warning: no tracked source files found in {}", dir.display());
        }
        return Ok(0);
    }

    let runtime = start_runtime(settings, global)?;
    let mut failed = 0usize;
    for file in &files {
        if let Err(err) = runtime.require(file) {
            failed += 1;
            eprintln!("roast: {err}");
        }
    }

    if !global.quiet {
        let stats = runtime.hook().stats();
        eprintln!(
            "   Result: {} file(s), {} compiled, {} cached, {} failed",
            files.len(),
            stats.compiles,
            stats.cache_hits,
            failed
        );
    }
    Ok(if failed == 0 { 0 } else { 1 })
}
