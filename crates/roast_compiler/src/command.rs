//! A transpiler driven through its command-line interface.
//!
//! The executable is invoked as
//! `<program> <args..> --compile --bare [--map] --output <dir> <input>` on a
//! scratch copy of the source text, which matches the CoffeeScript CLI. The
//! generated file and its map are read back from the scratch directory.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::rc::Rc;

use roast_config::TranspilerConfig;

use crate::error::{LocateError, TranspileError};
use crate::transpiler::{TranspileOutput, TranspileRequest, Transpiler, TranspilerLocator};

/// Trailing comment forms that point at a map next to the generated file.
/// The artifact's map is stored under a different name, so they are dropped.
const MAP_COMMENT_PREFIXES: [&str; 2] = ["//# sourceMappingURL=", "//@ sourceMappingURL="];

/// Runs an external transpiler executable.
#[derive(Debug, Clone)]
pub struct CommandTranspiler {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandTranspiler {
    /// Uses `program` (already located) with extra leading `args`.
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// The resolved executable.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Transpiler for CommandTranspiler {
    fn name(&self) -> &str {
        "command"
    }

    fn transpile(&self, request: &TranspileRequest<'_>) -> Result<TranspileOutput, TranspileError> {
        let scratch = tempfile::tempdir()
            .map_err(|e| TranspileError::new(format!("cannot create scratch directory: {e}")))?;
        let input_name = request.source_files.first().copied().unwrap_or("input");
        let input = scratch.path().join(input_name);
        let out_dir = scratch.path().join("out");
        fs::write(&input, request.source)
            .and_then(|()| fs::create_dir(&out_dir))
            .map_err(|e| TranspileError::new(format!("cannot stage source: {e}")))?;

        let mut command = Command::new(&self.program);
        command.args(&self.args).arg("--compile").arg("--bare");
        if request.source_map {
            command.arg("--map");
        }
        command.arg("--output").arg(&out_dir).arg(&input);

        tracing::debug!(program = %self.program.display(), file = %request.filename.display(), "running transpiler");
        let output = command
            .output()
            .map_err(|e| TranspileError::new(format!("cannot run {}: {e}", self.program.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            return Err(TranspileError::new(if stderr.is_empty() {
                format!("{} exited with {}", self.program.display(), output.status)
            } else {
                stderr.to_string()
            }));
        }

        let generated = out_dir.join(request.generated_file);
        let code = fs::read_to_string(&generated).map_err(|e| {
            TranspileError::new(format!(
                "transpiler produced no {}: {e}",
                request.generated_file
            ))
        })?;

        let map = if request.source_map {
            map_candidates(&out_dir, request.generated_file)
                .iter()
                .find_map(|p| fs::read_to_string(p).ok())
        } else {
            None
        };

        Ok(TranspileOutput {
            code: strip_map_comment(&code),
            map,
        })
    }
}

/// Newer CLIs write `a.js.map`, older ones `a.map`.
fn map_candidates(out_dir: &Path, generated: &str) -> [PathBuf; 2] {
    let stem = Path::new(generated)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    [
        out_dir.join(format!("{generated}.map")),
        out_dir.join(format!("{stem}.map")),
    ]
}

fn strip_map_comment(code: &str) -> String {
    let kept: Vec<&str> = code
        .lines()
        .filter(|line| {
            let line = line.trim_start();
            !MAP_COMMENT_PREFIXES.iter().any(|p| line.starts_with(p))
        })
        .collect();
    let mut out = kept.join("\n");
    if code.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Locates a transpiler executable on a search path.
#[derive(Debug, Clone, Default)]
pub struct CommandLocator {
    search_path: Option<OsString>,
}

impl CommandLocator {
    /// Searches the process `PATH`, captured now.
    pub fn from_env() -> Self {
        Self {
            search_path: std::env::var_os("PATH"),
        }
    }

    /// Searches an explicit `PATH`-style list.
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }

    /// Resolves `program` to an executable path.
    ///
    /// Programs containing a path separator are checked as given; bare names
    /// are looked up in each search path entry in order.
    pub fn find(&self, program: &str) -> Result<PathBuf, LocateError> {
        let as_path = Path::new(program);
        if as_path.components().count() > 1 {
            return if is_executable(as_path) {
                Ok(as_path.to_path_buf())
            } else if as_path.exists() {
                Err(LocateError::NotExecutable {
                    path: as_path.to_path_buf(),
                })
            } else {
                Err(LocateError::NotFound {
                    program: program.to_string(),
                    searched: 1,
                })
            };
        }

        let dirs: Vec<PathBuf> = self
            .search_path
            .as_ref()
            .map(|p| std::env::split_paths(p).collect())
            .unwrap_or_default();

        let mut searched = 0;
        for dir in &dirs {
            for name in candidate_names(program) {
                searched += 1;
                let candidate = dir.join(&name);
                if is_executable(&candidate) {
                    return Ok(candidate);
                }
            }
        }
        Err(LocateError::NotFound {
            program: program.to_string(),
            searched,
        })
    }
}

impl TranspilerLocator for CommandLocator {
    fn locate(&self, config: &TranspilerConfig) -> Result<Rc<dyn Transpiler>, LocateError> {
        let program = self.find(&config.program)?;
        tracing::debug!(program = %program.display(), "transpiler located");
        Ok(Rc::new(CommandTranspiler::new(program, config.args.clone())))
    }
}

#[cfg(windows)]
fn candidate_names(program: &str) -> Vec<String> {
    ["", ".exe", ".cmd", ".bat"]
        .iter()
        .map(|ext| format!("{program}{ext}"))
        .collect()
}

#[cfg(not(windows))]
fn candidate_names(program: &str) -> Vec<String> {
    vec![program.to_string()]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
