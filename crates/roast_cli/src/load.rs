//! `roast load`: load files through the cache hook.

use crate::pipeline::{absolute, load_settings, start_runtime};
use crate::{GlobalArgs, LoadArgs};

/// Loads every requested file. A failed file does not stop the others;
/// returns exit code 1 if any failed.
pub fn run(args: &LoadArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let settings = load_settings(global)?;
    let runtime = start_runtime(settings, global)?;

    let mut failures = 0usize;
    for file in &args.files {
        let path = absolute(file)?;
        match runtime.require(&path) {
            Ok(module) => {
                if args.emit {
                    println!("{}", module.code);
                }
            }
            Err(err) => {
                failures += 1;
                eprintln!("roast: {err}");
            }
        }
    }

    let stats = runtime.hook().stats();
    tracing::debug!(
        hits = stats.cache_hits,
        compiles = stats.compiles,
        fallbacks = stats.fallbacks,
        "load finished"
    );
    Ok(if failures == 0 { 0 } else { 1 })
}
