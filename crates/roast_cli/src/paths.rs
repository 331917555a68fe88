//! `roast paths`: show where a source file's artifacts live.

use roast_cache::{CachePaths, PathResolver};

use crate::pipeline::{absolute, load_settings};
use crate::GlobalArgs;

/// Prints the artifact locations for `file`. Needs no transpiler.
pub fn run(file: &str, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let settings = load_settings(global)?;
    let resolver = PathResolver::from_settings(&settings);
    let source = absolute(file)?;
    if !resolver.extensions().is_tracked(&source) {
        eprintln!(
            "warning: {} does not have the tracked '.{}' suffix",
            source.display(),
            resolver.extensions().source()
        );
    }
    print!("{}", render(&resolver.resolve(&source)));
    Ok(0)
}

fn render(paths: &CachePaths) -> String {
    format!(
        "cache:    {}\nmap:      {}\nroot:     {}\nrelative: {}\n",
        paths.cache.display(),
        paths.map.display(),
        paths.root.display(),
        paths.relative.display()
    )
}
