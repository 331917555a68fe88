//! Configuration file loading and validation.

use crate::env::{apply_env, EnvOverrides};
use crate::error::ConfigError;
use crate::types::{RoastConfig, Settings};
use std::path::Path;

/// Name of the configuration file looked up in the installation root.
pub const CONFIG_FILE: &str = "roast.toml";

/// Loads settings for an installation rooted at `install_dir`.
///
/// Reads `<install_dir>/roast.toml` when it exists (a missing file means all
/// defaults), then applies the process environment.
pub fn load_config(install_dir: &Path) -> Result<Settings, ConfigError> {
    let config_path = install_dir.join(CONFIG_FILE);
    let content = if config_path.is_file() {
        std::fs::read_to_string(&config_path)?
    } else {
        String::new()
    };
    load_config_from_str(&content, install_dir, &EnvOverrides::from_process())
}

/// Loads settings from an explicit configuration file path.
///
/// The install root defaults to the file's directory.
pub fn load_config_file(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content, config_dir(path), &EnvOverrides::from_process())
}

/// Directory holding a config file; a bare file name lives in `.`.
fn config_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Parses and validates configuration text.
///
/// Useful for testing without filesystem or environment dependencies.
pub fn load_config_from_str(
    content: &str,
    base_dir: &Path,
    overrides: &EnvOverrides,
) -> Result<Settings, ConfigError> {
    let config: RoastConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    apply_env(config, base_dir, overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColorMode;
    use std::path::PathBuf;

    fn parse(toml: &str) -> Result<Settings, ConfigError> {
        load_config_from_str(toml, Path::new("/srv/app"), &EnvOverrides::default())
    }

    #[test]
    fn bare_config_name_lives_in_current_dir() {
        assert_eq!(config_dir(Path::new("roast.toml")), Path::new("."));
        assert_eq!(config_dir(Path::new("conf/roast.toml")), Path::new("conf"));
        assert_eq!(config_dir(Path::new("/srv/app/roast.toml")), Path::new("/srv/app"));
    }

    #[test]
    fn bare_config_name_yields_usable_install_root() {
        let settings =
            load_config_from_str("", config_dir(Path::new("roast.toml")), &EnvOverrides::default())
                .unwrap();
        assert_eq!(settings.install_root, PathBuf::from("."));
        assert!(std::path::absolute(&settings.install_root).is_ok());
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let settings = parse("").unwrap();
        assert_eq!(settings.cache_dir, ".roast-cache");
        assert_eq!(settings.extensions.source(), "coffee");
        assert_eq!(settings.package_container, "node_modules");
        assert_eq!(settings.transpiler.program, "coffee");
        assert_eq!(settings.color, ColorMode::Auto);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[cache]
dir = ".js"

[extensions]
source = "ls"
output = "js"
map = "map"

[layout]
package_container = "vendor"
install_root = "/opt/pimatic"

[transpiler]
program = "/usr/local/bin/lsc"
args = ["--no-header"]

[output]
color = "never"
daemonized = true
"#;
        let settings = parse(toml).unwrap();
        assert_eq!(settings.cache_dir, ".js");
        assert_eq!(settings.extensions.source(), "ls");
        assert_eq!(settings.package_container, "vendor");
        assert_eq!(settings.install_root, PathBuf::from("/opt/pimatic"));
        assert_eq!(settings.transpiler.args, vec!["--no-header"]);
        assert_eq!(settings.color, ColorMode::Never);
        assert!(settings.daemonized);
    }

    #[test]
    fn environment_wins_over_file() {
        let toml = "[cache]\ndir = \".from-file\"\n";
        let env = EnvOverrides {
            cache_dir: Some(".from-env".to_string()),
            daemonized: true,
        };
        let settings = load_config_from_str(toml, Path::new("/srv"), &env).unwrap();
        assert_eq!(settings.cache_dir, ".from-env");
        assert!(settings.daemonized);
    }

    #[test]
    fn invalid_toml_errors() {
        let err = parse("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn unknown_section_errors() {
        let err = parse("[bogus]\nx = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn bad_extensions_error() {
        let err = parse("[extensions]\nsource = \"js\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Extensions(_)));
    }

    #[test]
    fn empty_program_errors() {
        let err = parse("[transpiler]\nprogram = \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn load_from_directory_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_config(dir.path()).unwrap();
        assert_eq!(settings.install_root, dir.path());
    }

    #[test]
    fn load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[layout]\npackage_container = \"deps\"\n").unwrap();
        let settings = load_config_file(&path).unwrap();
        assert_eq!(settings.package_container, "deps");
        assert_eq!(settings.install_root, dir.path());
    }

    #[test]
    fn io_error_from_missing_file() {
        let err = load_config_file(Path::new("/nonexistent/dir/roast.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
