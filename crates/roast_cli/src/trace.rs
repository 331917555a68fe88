//! `roast trace`: map a generated position back to its original source.

use std::sync::Arc;

use roast_cache::PathResolver;
use roast_trace::{CacheMapRetriever, StackFrame, TranslatorChain, TRANSPILER_BUILTIN_ID};

use crate::pipeline::{absolute, load_settings};
use crate::GlobalArgs;

/// Translates one `<file>:<line>:<column>` position through the cached map.
///
/// Returns exit code 1 when no map covers the position.
pub fn run(position: &str, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (file, line, column) = parse_position(position)?;
    let settings = load_settings(global)?;

    let chain = TranslatorChain::new();
    chain.block(TRANSPILER_BUILTIN_ID);
    chain.install(Arc::new(CacheMapRetriever::new(PathResolver::from_settings(
        &settings,
    ))));

    let frame = StackFrame::new(absolute(file)?, line, column);
    let Some(translated) = chain.lookup(&frame) else {
        eprintln!("roast: no mapping for {position}");
        return Ok(1);
    };
    println!(
        "{}:{}:{}",
        translated.file.display(),
        translated.line,
        translated.column
    );
    Ok(0)
}

/// Splits `<file>:<line>:<column>`; the file part may itself contain colons.
fn parse_position(s: &str) -> Result<(&str, u32, u32), Box<dyn std::error::Error>> {
    let mut parts = s.rsplitn(3, ':');
    let (Some(column), Some(line), Some(file)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("invalid position '{s}' (expected <file>:<line>:<column>)").into());
    };
    if file.is_empty() {
        return Err(format!("invalid position '{s}': missing file").into());
    }
    let line: u32 = line
        .parse()
        .map_err(|_| format!("invalid line number in '{s}'"))?;
    let column: u32 = column
        .parse()
        .map_err(|_| format!("invalid column number in '{s}'"))?;
    if line == 0 || column == 0 {
        return Err(format!("position '{s}' is one-based; line and column start at 1").into());
    }
    Ok((file, line, column))
}
