//! Cache placement: mapping a source path to its artifact, map, and cache root.
//!
//! Sources inside a bundled dependency package (a directory directly below the
//! package container, `node_modules` by default) get a cache tree rooted at that
//! package. Everything else shares one tree rooted at the installation root.
//! Within a tree, artifacts keep the relative layout of their sources.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use roast_common::Extensions;
use roast_config::Settings;

/// Where the cached output for one source file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    /// The compiled artifact.
    pub cache: PathBuf,
    /// The artifact's source map.
    pub map: PathBuf,
    /// The cache root the artifact was placed under.
    pub root: PathBuf,
    /// The source's position relative to `root`.
    pub relative: PathBuf,
}

/// Pure mapping from source paths to [`CachePaths`].
#[derive(Debug, Clone)]
pub struct PathResolver {
    install_root: PathBuf,
    cache_dir: String,
    package_container: String,
    extensions: Extensions,
}

impl PathResolver {
    /// Creates a resolver with explicit layout parameters.
    pub fn new(
        install_root: impl Into<PathBuf>,
        cache_dir: impl Into<String>,
        package_container: impl Into<String>,
        extensions: Extensions,
    ) -> Self {
        let install_root: PathBuf = install_root.into();
        Self {
            install_root: normalize(&install_root),
            cache_dir: cache_dir.into(),
            package_container: package_container.into(),
            extensions,
        }
    }

    /// Creates a resolver from resolved settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.install_root.clone(),
            settings.cache_dir.clone(),
            settings.package_container.clone(),
            settings.extensions.clone(),
        )
    }

    /// The extension triple used for renaming.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// The installation root used outside package boundaries.
    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    /// The cache directory name.
    pub fn cache_dir(&self) -> &str {
        &self.cache_dir
    }

    /// Computes the cache locations for `source`.
    ///
    /// Never touches the filesystem and never fails. `.` and `..` are resolved
    /// lexically first, so `relative` never climbs out of its cache tree.
    pub fn resolve(&self, source: &Path) -> CachePaths {
        let source = normalize(source);
        let (root, relative) = self
            .package_boundary(&source)
            .unwrap_or_else(|| (self.install_root.clone(), self.relative_to_install(&source)));

        let cache = self
            .extensions
            .to_output(&root.join(&self.cache_dir).join(&relative));
        let map = self.extensions.to_map(&cache);

        CachePaths {
            cache,
            map,
            root,
            relative,
        }
    }

    /// Splits `source` at the innermost `<container>/<package>/` boundary.
    ///
    /// The package directory must be followed by at least one more component,
    /// so a file sitting directly in the container is not a package.
    fn package_boundary(&self, source: &Path) -> Option<(PathBuf, PathBuf)> {
        let components: Vec<Component<'_>> = source.components().collect();
        let container = OsStr::new(&self.package_container);

        let idx = (0..components.len())
            .rev()
            .find(|&i| i + 2 < components.len() && components[i].as_os_str() == container)?;

        let root: PathBuf = components[..=idx + 1].iter().collect();
        let relative: PathBuf = components[idx + 2..].iter().collect();
        Some((root, relative))
    }

    /// Position of `source` below the installation root.
    ///
    /// Sources outside the root are mirrored under the cache directory by their
    /// full path, so no artifact can land outside its cache tree.
    fn relative_to_install(&self, source: &Path) -> PathBuf {
        let rel = source.strip_prefix(&self.install_root).unwrap_or(source);
        rel.components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect()
    }
}

/// Resolves `.` and `..` without consulting the filesystem.
///
/// `..` at the root stays at the root; leading `..` of a relative path is kept.
fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn resolver() -> PathResolver {
        PathResolver::new(
            "/srv/app",
            ".roast-cache",
            "node_modules",
            Extensions::default(),
        )
    }

    #[test]
    fn project_file_uses_install_root() {
        let paths = resolver().resolve(Path::new("/srv/app/lib/devices/a.coffee"));
        assert_eq!(paths.root, PathBuf::from("/srv/app"));
        assert_eq!(paths.relative, PathBuf::from("lib/devices/a.coffee"));
        assert_eq!(
            paths.cache,
            PathBuf::from("/srv/app/.roast-cache/lib/devices/a.js")
        );
        assert_eq!(
            paths.map,
            PathBuf::from("/srv/app/.roast-cache/lib/devices/a.map")
        );
    }

    #[test]
    fn package_file_uses_package_root() {
        let paths = resolver().resolve(Path::new(
            "/srv/app/node_modules/pimatic-shell/lib/exec.coffee",
        ));
        assert_eq!(
            paths.root,
            PathBuf::from("/srv/app/node_modules/pimatic-shell")
        );
        assert_eq!(paths.relative, PathBuf::from("lib/exec.coffee"));
        assert_eq!(
            paths.cache,
            PathBuf::from("/srv/app/node_modules/pimatic-shell/.roast-cache/lib/exec.js")
        );
    }

    #[test]
    fn nested_packages_use_innermost_boundary() {
        let paths = resolver().resolve(Path::new(
            "/srv/app/node_modules/outer/node_modules/inner/index.coffee",
        ));
        assert_eq!(
            paths.root,
            PathBuf::from("/srv/app/node_modules/outer/node_modules/inner")
        );
        assert_eq!(paths.relative, PathBuf::from("index.coffee"));
    }

    #[test]
    fn file_directly_in_container_is_not_a_package() {
        let paths = resolver().resolve(Path::new("/srv/app/node_modules/loose.coffee"));
        assert_eq!(paths.root, PathBuf::from("/srv/app"));
        assert_eq!(paths.relative, PathBuf::from("node_modules/loose.coffee"));
    }

    #[test]
    fn container_outside_install_root() {
        let paths = resolver().resolve(Path::new("/usr/lib/node_modules/tool/bin/run.coffee"));
        assert_eq!(paths.root, PathBuf::from("/usr/lib/node_modules/tool"));
        assert_eq!(
            paths.cache,
            PathBuf::from("/usr/lib/node_modules/tool/.roast-cache/bin/run.js")
        );
    }

    #[test]
    fn source_outside_install_root_stays_in_cache_tree() {
        let paths = resolver().resolve(Path::new("/home/user/scratch/a.coffee"));
        assert_eq!(paths.root, PathBuf::from("/srv/app"));
        assert_eq!(
            paths.cache,
            PathBuf::from("/srv/app/.roast-cache/home/user/scratch/a.js")
        );
    }

    #[test]
    fn untracked_extension_is_not_renamed() {
        let paths = resolver().resolve(Path::new("/srv/app/lib/a.txt"));
        assert_eq!(paths.cache, PathBuf::from("/srv/app/.roast-cache/lib/a.txt"));
        assert_eq!(paths.map, paths.cache);
    }

    #[test]
    fn custom_layout() {
        let resolver = PathResolver::new(
            "/opt/site",
            ".js",
            "vendor",
            Extensions::new("ls", "js", "jsmap").unwrap(),
        );
        let paths = resolver.resolve(Path::new("/opt/site/vendor/util/str.ls"));
        assert_eq!(paths.cache, PathBuf::from("/opt/site/vendor/util/.js/str.js"));
        assert_eq!(paths.map, PathBuf::from("/opt/site/vendor/util/.js/str.jsmap"));
    }

    #[test]
    fn from_settings_uses_configured_values() {
        let mut settings = Settings::with_root("/srv/app");
        settings.cache_dir = ".js".to_string();
        let resolver = PathResolver::from_settings(&settings);
        assert_eq!(resolver.cache_dir(), ".js");
        assert_eq!(resolver.install_root(), Path::new("/srv/app"));
        assert_eq!(resolver.extensions().source(), "coffee");
    }

    #[test]
    fn parent_components_are_resolved_before_placement() {
        let paths = resolver().resolve(Path::new("/srv/app/../app/lib/./a.coffee"));
        assert_eq!(paths.root, PathBuf::from("/srv/app"));
        assert_eq!(paths.relative, PathBuf::from("lib/a.coffee"));
        assert_eq!(paths.cache, PathBuf::from("/srv/app/.roast-cache/lib/a.js"));
    }

    #[test]
    fn sibling_of_install_root_cannot_escape_cache_tree() {
        let paths = resolver().resolve(Path::new("/srv/app/../x.coffee"));
        assert_eq!(paths.cache, PathBuf::from("/srv/app/.roast-cache/srv/x.js"));
        assert!(!paths
            .cache
            .components()
            .any(|c| c == Component::ParentDir));
    }

    #[test]
    fn parent_components_inside_package_are_resolved() {
        let paths = resolver().resolve(Path::new(
            "/srv/app/node_modules/w/lib/../index.coffee",
        ));
        assert_eq!(paths.root, PathBuf::from("/srv/app/node_modules/w"));
        assert_eq!(paths.relative, PathBuf::from("index.coffee"));
    }

    #[test]
    fn normalize_handles_root_and_relative_parents() {
        assert_eq!(normalize(Path::new("/../a/./b/..")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("../a/../../b")), PathBuf::from("../../b"));
    }

    fn segment() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_-]{0,8}"
            .prop_filter("reserved name", |s| s != "node_modules")
    }

    proptest! {
        #[test]
        fn project_suffix_preserved(dirs in proptest::collection::vec(segment(), 0..4), stem in segment()) {
            let rel: PathBuf = dirs.iter().collect::<PathBuf>().join(format!("{stem}.coffee"));
            let paths = resolver().resolve(&Path::new("/srv/app").join(&rel));
            prop_assert_eq!(&paths.root, &PathBuf::from("/srv/app"));
            prop_assert_eq!(&paths.relative, &rel);
            prop_assert_eq!(
                paths.cache,
                Path::new("/srv/app/.roast-cache").join(rel.with_extension("js"))
            );
        }

        #[test]
        fn cache_path_never_contains_parent_dir(
            parts in proptest::collection::vec(
                prop_oneof![segment(), Just("..".to_string()), Just(".".to_string())],
                0..6,
            ),
            stem in segment(),
        ) {
            let source = parts
                .iter()
                .fold(PathBuf::from("/srv/app"), |p, s| p.join(s))
                .join(format!("{stem}.coffee"));
            let paths = resolver().resolve(&source);
            prop_assert!(!paths.cache.components().any(|c| c == Component::ParentDir));
            prop_assert!(paths.cache.starts_with(paths.root.join(".roast-cache")));
        }

        #[test]
        fn package_suffix_preserved(
            pkg in segment(),
            dirs in proptest::collection::vec(segment(), 0..4),
            stem in segment(),
        ) {
            let rel: PathBuf = dirs.iter().collect::<PathBuf>().join(format!("{stem}.coffee"));
            let pkg_root = Path::new("/srv/app/node_modules").join(&pkg);
            let paths = resolver().resolve(&pkg_root.join(&rel));
            prop_assert_eq!(&paths.root, &pkg_root);
            prop_assert_eq!(
                paths.cache,
                pkg_root.join(".roast-cache").join(rel.with_extension("js"))
            );
        }
    }
}
