//! Configuration types deserialized from `roast.toml`, and the resolved
//! settings the runtime consumes.

use roast_common::{ExtensionError, Extensions};
use serde::Deserialize;
use std::path::PathBuf;

/// Default name of the cache directory created under every cache root.
pub const DEFAULT_CACHE_DIR: &str = ".roast-cache";

/// Default name of the directory that holds bundled dependency packages.
pub const DEFAULT_PACKAGE_CONTAINER: &str = "node_modules";

/// Default transpiler executable.
pub const DEFAULT_TRANSPILER: &str = "coffee";

/// The top-level configuration parsed from `roast.toml`.
///
/// Every section is optional; an empty file (or no file at all) yields the
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoastConfig {
    /// Cache placement settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// The source/output/map suffixes.
    #[serde(default)]
    pub extensions: ExtensionConfig,
    /// Package boundary detection and the installation root.
    #[serde(default)]
    pub layout: LayoutConfig,
    /// How to find and run the external transpiler.
    #[serde(default)]
    pub transpiler: TranspilerConfig,
    /// Progress output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Settings for the `[cache]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Name of the cache directory under each cache root.
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

/// Settings for the `[extensions]` section. Suffixes carry no leading dot.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtensionConfig {
    /// Tracked source suffix.
    #[serde(default = "default_source_ext")]
    pub source: String,
    /// Compiled-output suffix.
    #[serde(default = "default_output_ext")]
    pub output: String,
    /// Source-map suffix.
    #[serde(default = "default_map_ext")]
    pub map: String,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            source: default_source_ext(),
            output: default_output_ext(),
            map: default_map_ext(),
        }
    }
}

impl ExtensionConfig {
    /// Validates the section into an [`Extensions`] triple.
    pub fn to_extensions(&self) -> Result<Extensions, ExtensionError> {
        Extensions::new(&self.source, &self.output, &self.map)
    }
}

/// Settings for the `[layout]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    /// Directory name under which dependency packages are installed.
    #[serde(default = "default_package_container")]
    pub package_container: String,
    /// Fixed installation root. Defaults to the directory holding `roast.toml`.
    #[serde(default)]
    pub install_root: Option<PathBuf>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            package_container: default_package_container(),
            install_root: None,
        }
    }
}

/// Settings for the `[transpiler]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TranspilerConfig {
    /// Executable name or path.
    #[serde(default = "default_transpiler")]
    pub program: String,
    /// Extra arguments passed before the generated ones.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for TranspilerConfig {
    fn default() -> Self {
        Self {
            program: default_transpiler(),
            args: Vec::new(),
        }
    }
}

/// Settings for the `[output]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Colour policy for progress lines.
    #[serde(default)]
    pub color: ColorMode,
    /// Marks the process as detached; forces plain output.
    #[serde(default)]
    pub daemonized: bool,
}

/// Colour policy for progress output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Colour when stdout is a terminal.
    #[default]
    Auto,
    /// Always colour.
    Always,
    /// Never colour.
    Never,
}

/// Fully resolved settings: file values, defaults, and environment overlay
/// merged and validated.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Name of the cache directory under each cache root.
    pub cache_dir: String,
    /// Validated suffix triple.
    pub extensions: Extensions,
    /// Directory name that marks a package boundary.
    pub package_container: String,
    /// Absolute installation root used outside package boundaries.
    pub install_root: PathBuf,
    /// Transpiler invocation.
    pub transpiler: TranspilerConfig,
    /// Colour policy.
    pub color: ColorMode,
    /// Whether the process runs detached.
    pub daemonized: bool,
}

impl Settings {
    /// Default settings rooted at `install_root`, ignoring the environment.
    pub fn with_root(install_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: default_cache_dir(),
            extensions: Extensions::default(),
            package_container: default_package_container(),
            install_root: install_root.into(),
            transpiler: TranspilerConfig::default(),
            color: ColorMode::default(),
            daemonized: false,
        }
    }
}

fn default_cache_dir() -> String {
    DEFAULT_CACHE_DIR.to_string()
}

fn default_source_ext() -> String {
    "coffee".to_string()
}

fn default_output_ext() -> String {
    "js".to_string()
}

fn default_map_ext() -> String {
    "map".to_string()
}

fn default_package_container() -> String {
    DEFAULT_PACKAGE_CONTAINER.to_string()
}

fn default_transpiler() -> String {
    DEFAULT_TRANSPILER.to_string()
}
