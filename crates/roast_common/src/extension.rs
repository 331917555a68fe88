//! The tracked-extension triple: source, compiled output, and source map.

use std::path::{Path, PathBuf};

/// Errors raised when an extension triple is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtensionError {
    /// An extension was empty.
    #[error("the {role} extension must not be empty")]
    Empty {
        /// Which extension of the triple was empty.
        role: &'static str,
    },

    /// An extension contained a dot or a path separator.
    #[error("the {role} extension '{value}' must be a bare suffix without '.' or separators")]
    Malformed {
        /// Which extension of the triple was malformed.
        role: &'static str,
        /// The offending value.
        value: String,
    },

    /// Two roles share the same extension, which would make artifacts collide.
    #[error("the {first} and {second} extensions are both '{value}'")]
    Collision {
        /// The first colliding role.
        first: &'static str,
        /// The second colliding role.
        second: &'static str,
        /// The shared value.
        value: String,
    },
}

/// The three file suffixes the cache works with.
///
/// A source file carrying the `source` suffix is compiled to an artifact with
/// the `output` suffix, and the artifact's source map sits next to it with the
/// `map` suffix. Suffixes are stored without their leading dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extensions {
    source: String,
    output: String,
    map: String,
}

impl Default for Extensions {
    fn default() -> Self {
        Self {
            source: "coffee".to_string(),
            output: "js".to_string(),
            map: "map".to_string(),
        }
    }
}

impl Extensions {
    /// Builds a validated extension triple.
    pub fn new(
        source: impl Into<String>,
        output: impl Into<String>,
        map: impl Into<String>,
    ) -> Result<Self, ExtensionError> {
        let ext = Self {
            source: source.into(),
            output: output.into(),
            map: map.into(),
        };
        ext.validate()?;
        Ok(ext)
    }

    fn validate(&self) -> Result<(), ExtensionError> {
        let roles = [
            ("source", &self.source),
            ("output", &self.output),
            ("map", &self.map),
        ];
        for (role, value) in roles {
            if value.is_empty() {
                return Err(ExtensionError::Empty { role });
            }
            if value.contains(['.', '/', '\\']) {
                return Err(ExtensionError::Malformed {
                    role,
                    value: value.clone(),
                });
            }
        }
        for (i, (first, a)) in roles.iter().enumerate() {
            for (second, b) in &roles[i + 1..] {
                if a == b {
                    return Err(ExtensionError::Collision {
                        first,
                        second,
                        value: (*a).clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The tracked source suffix.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The compiled-output suffix.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// The source-map suffix.
    pub fn map(&self) -> &str {
        &self.map
    }

    /// Returns `true` if `path` ends in the tracked source suffix.
    pub fn is_tracked(&self, path: &Path) -> bool {
        has_suffix(path, &self.source)
    }

    /// Replaces a trailing source suffix with the output suffix.
    ///
    /// Paths that do not end in the source suffix are returned unchanged.
    pub fn to_output(&self, path: &Path) -> PathBuf {
        swap_suffix(path, &self.source, &self.output)
    }

    /// Replaces a trailing output suffix with the map suffix.
    ///
    /// Paths that do not end in the output suffix are returned unchanged.
    pub fn to_map(&self, path: &Path) -> PathBuf {
        swap_suffix(path, &self.output, &self.map)
    }
}

fn has_suffix(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(ext)
}

fn swap_suffix(path: &Path, from: &str, to: &str) -> PathBuf {
    if has_suffix(path, from) {
        path.with_extension(to)
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_triple() {
        let ext = Extensions::default();
        assert_eq!(ext.source(), "coffee");
        assert_eq!(ext.output(), "js");
        assert_eq!(ext.map(), "map");
    }

    #[test]
    fn tracked_detection() {
        let ext = Extensions::default();
        assert!(ext.is_tracked(Path::new("/srv/app/lib/a.coffee")));
        assert!(!ext.is_tracked(Path::new("/srv/app/lib/a.js")));
        assert!(!ext.is_tracked(Path::new("/srv/app/lib/a.coffee.bak")));
        assert!(!ext.is_tracked(Path::new("/srv/app/lib/coffee")));
    }

    #[test]
    fn swaps_only_matching_suffix() {
        let ext = Extensions::default();
        assert_eq!(
            ext.to_output(Path::new("lib/a.coffee")),
            PathBuf::from("lib/a.js")
        );
        assert_eq!(ext.to_output(Path::new("lib/a.txt")), PathBuf::from("lib/a.txt"));
        assert_eq!(ext.to_map(Path::new("lib/a.js")), PathBuf::from("lib/a.map"));
        assert_eq!(ext.to_map(Path::new("lib/a.mjs")), PathBuf::from("lib/a.mjs"));
    }

    #[test]
    fn dotted_names_keep_their_stem() {
        let ext = Extensions::default();
        assert_eq!(
            ext.to_output(Path::new("lib/a.spec.coffee")),
            PathBuf::from("lib/a.spec.js")
        );
    }

    #[test]
    fn rejects_empty() {
        let err = Extensions::new("", "js", "map").unwrap_err();
        assert_eq!(err, ExtensionError::Empty { role: "source" });
    }

    #[test]
    fn rejects_leading_dot() {
        let err = Extensions::new(".coffee", "js", "map").unwrap_err();
        assert!(matches!(err, ExtensionError::Malformed { role: "source", .. }));
    }

    #[test]
    fn rejects_collision() {
        let err = Extensions::new("ts", "js", "js").unwrap_err();
        assert!(err.to_string().contains("output and map"));
    }
}
