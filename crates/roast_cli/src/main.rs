//! Roast CLI: drives the cache-aware loader from the command line.
//!
//! Provides `roast load` to load files through the cache, `roast warm` to
//! precompile a whole tree, `roast paths` to show where a file's artifacts
//! live, and `roast trace` to map a generated position back to its source.

#![warn(missing_docs)]

mod load;
mod logging;
mod paths;
mod pipeline;
mod trace;
mod warm;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Roast: a compile cache for transpiled modules.
#[derive(Parser, Debug)]
#[command(name = "roast", version, about = "Compile cache for transpiled modules")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `roast.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load files through the cache, compiling whatever is stale.
    Load(LoadArgs),
    /// Precompile every tracked file below a directory.
    Warm(WarmArgs),
    /// Show the artifact locations for a source file.
    Paths {
        /// Source file.
        file: String,
    },
    /// Translate a generated position to its original source position.
    Trace {
        /// Position in the generated code of a source file, as
        /// `<file>:<line>:<column>` (one-based).
        position: String,
    },
}

/// Arguments for the `roast load` subcommand.
#[derive(Parser, Debug)]
pub struct LoadArgs {
    /// Source files to load.
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Print the compiled code of each file.
    #[arg(long)]
    pub emit: bool,
}

/// Arguments for the `roast warm` subcommand.
#[derive(Parser, Debug)]
pub struct WarmArgs {
    /// Directory to scan (default: the install root).
    pub dir: Option<String>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Defer to `roast.toml`, then terminal detection.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Requested colour policy.
    pub color: ColorChoice,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color: cli.color,
        config: cli.config,
    };
    logging::init(&global);

    let result = match cli.command {
        Command::Load(ref args) => load::run(args, &global),
        Command::Warm(ref args) => warm::run(args, &global),
        Command::Paths { ref file } => paths::run(file, &global),
        Command::Trace { ref position } => trace::run(position, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("roast: {e}");
            process::exit(1);
        }
    }
}
