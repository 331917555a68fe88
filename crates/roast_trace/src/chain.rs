//! Chain of responsibility over source map retrievers.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use roast_common::{Position, SourceMap};

use crate::error::TraceError;
use crate::frame::StackFrame;
use crate::retriever::{RetrievedMap, SourceMapRetriever};

/// Ordered retrievers consulted for every frame.
///
/// Each id appears at most once, and ids on the block list are refused
/// outright. Blocking an id also evicts a retriever already installed under it.
#[derive(Default)]
pub struct TranslatorChain {
    retrievers: RwLock<Vec<Arc<dyn SourceMapRetriever>>>,
    blocked: RwLock<HashSet<String>>,
}

impl std::fmt::Debug for TranslatorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslatorChain")
            .field("retrievers", &self.ids())
            .finish()
    }
}

impl TranslatorChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses any present or future retriever with this id.
    pub fn block(&self, id: &str) {
        self.blocked
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string());
        self.retrievers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|r| r.id() != id);
    }

    /// Appends a retriever. Returns `false` if its id is blocked or taken.
    pub fn install(&self, retriever: Arc<dyn SourceMapRetriever>) -> bool {
        self.insert(retriever, false)
    }

    /// Puts a retriever ahead of all others, for deliberate overrides such as
    /// a diagnostic tool. Same refusal rules as [`install`](Self::install).
    pub fn install_front(&self, retriever: Arc<dyn SourceMapRetriever>) -> bool {
        self.insert(retriever, true)
    }

    fn insert(&self, retriever: Arc<dyn SourceMapRetriever>, front: bool) -> bool {
        let id = retriever.id().to_string();
        if self
            .blocked
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
        {
            tracing::debug!(%id, "refusing blocked trace retriever");
            return false;
        }
        let mut retrievers = self.retrievers.write().unwrap_or_else(PoisonError::into_inner);
        if retrievers.iter().any(|r| r.id() == id) {
            tracing::debug!(%id, "trace retriever already installed");
            return false;
        }
        if front {
            retrievers.insert(0, retriever);
        } else {
            retrievers.push(retriever);
        }
        true
    }

    /// Installed ids, in consultation order.
    pub fn ids(&self) -> Vec<String> {
        self.retrievers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|r| r.id().to_string())
            .collect()
    }

    /// Asks each retriever in turn; the first map found wins.
    pub fn retrieve(&self, file: &Path) -> Option<RetrievedMap> {
        let retrievers = self
            .retrievers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        retrievers.iter().find_map(|r| r.retrieve(file))
    }

    /// Rewrites a frame to its original position, or returns it unchanged.
    pub fn translate(&self, frame: &StackFrame) -> StackFrame {
        self.lookup(frame).unwrap_or_else(|| frame.clone())
    }

    /// The original position of `frame`, or `None` when no retriever maps it.
    ///
    /// A retriever whose map is unreadable or has no segment for the position
    /// counts as declining, and the next one is asked.
    pub fn lookup(&self, frame: &StackFrame) -> Option<StackFrame> {
        let retrievers = self
            .retrievers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        retrievers.iter().find_map(|r| {
            let found = r.retrieve(&frame.file)?;
            match map_frame(frame, &found) {
                Ok(translated) => translated,
                Err(err) => {
                    tracing::debug!(id = r.id(), %err, "retriever map unusable");
                    None
                }
            }
        })
    }

    /// Renders an error message followed by its translated frames.
    pub fn format_trace(&self, message: &str, frames: &[StackFrame]) -> String {
        let mut out = message.to_string();
        for frame in frames {
            out.push_str("\n    ");
            out.push_str(&self.translate(frame).to_string());
        }
        out
    }
}

fn map_frame(
    frame: &StackFrame,
    found: &RetrievedMap,
) -> Result<Option<StackFrame>, TraceError> {
    let parse_err = |source| TraceError::MapParse {
        path: frame.file.clone(),
        source,
    };
    let map = SourceMap::from_json(&found.map).map_err(parse_err)?;
    let generated = Position::new(
        frame.line.saturating_sub(1),
        frame.column.saturating_sub(1),
    );
    let location = map.lookup(generated).map_err(parse_err)?;

    Ok(location.map(|loc| StackFrame {
        function: frame.function.clone(),
        file: resolve_source(&found.url, &loc.source),
        line: loc.position.line + 1,
        column: loc.position.column + 1,
    }))
}

/// Map sources are basenames; they resolve against the directory of the file
/// the map was retrieved for.
fn resolve_source(url: &Path, source: &str) -> PathBuf {
    let source = Path::new(source);
    if source.is_absolute() {
        return source.to_path_buf();
    }
    match url.parent() {
        Some(dir) => dir.join(source),
        None => source.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roast_common::vlq::encode_segment;

    /// Serves one fixed map for one file.
    struct Fixed {
        id: &'static str,
        file: PathBuf,
        map: String,
    }

    impl SourceMapRetriever for Fixed {
        fn id(&self) -> &str {
            self.id
        }

        fn retrieve(&self, file: &Path) -> Option<RetrievedMap> {
            (file == self.file).then(|| RetrievedMap {
                url: file.to_path_buf(),
                map: self.map.clone(),
            })
        }
    }

    fn map_json() -> String {
        // generated 0:0 -> original 2:4 ; generated 1:0 -> original 5:0
        let mappings = format!(
            "{};{}",
            encode_segment(&[0, 0, 2, 4]),
            encode_segment(&[0, 0, 3, -4])
        );
        format!(
            r#"{{"version":3,"file":"a.js","sources":["a.coffee"],"names":[],"mappings":"{mappings}"}}"#
        )
    }

    fn fixed(id: &'static str) -> Arc<Fixed> {
        Arc::new(Fixed {
            id,
            file: PathBuf::from("/srv/app/lib/a.coffee"),
            map: map_json(),
        })
    }

    #[test]
    fn translates_through_first_retriever() {
        let chain = TranslatorChain::new();
        assert!(chain.install(fixed("cache")));
        let frame = StackFrame::new("/srv/app/lib/a.coffee", 2, 5).with_function("poll");
        let out = chain.translate(&frame);
        assert_eq!(out.file, PathBuf::from("/srv/app/lib/a.coffee"));
        assert_eq!((out.line, out.column), (6, 1));
        assert_eq!(out.function.as_deref(), Some("poll"));
    }

    #[test]
    fn untouched_when_everyone_declines() {
        let chain = TranslatorChain::new();
        chain.install(fixed("cache"));
        let frame = StackFrame::new("/srv/app/lib/other.js", 10, 2);
        assert_eq!(chain.translate(&frame), frame);
    }

    #[test]
    fn corrupt_map_declines() {
        let chain = TranslatorChain::new();
        chain.install(Arc::new(Fixed {
            id: "broken",
            file: PathBuf::from("/a.coffee"),
            map: "{\"version\":3".to_string(),
        }));
        let frame = StackFrame::new("/a.coffee", 1, 1);
        assert_eq!(chain.translate(&frame), frame);
    }

    #[test]
    fn duplicate_id_refused() {
        let chain = TranslatorChain::new();
        assert!(chain.install(fixed("cache")));
        assert!(!chain.install(fixed("cache")));
        assert_eq!(chain.ids(), vec!["cache"]);
    }

    #[test]
    fn blocked_id_refused_and_evicted() {
        let chain = TranslatorChain::new();
        assert!(chain.install(fixed("builtin")));
        chain.block("builtin");
        assert!(chain.ids().is_empty());
        assert!(!chain.install(fixed("builtin")));
        assert!(chain.install(fixed("diagnostics")));
    }

    #[test]
    fn front_install_takes_precedence() {
        let chain = TranslatorChain::new();
        chain.install(fixed("cache"));
        chain.install_front(fixed("diagnostics"));
        assert_eq!(chain.ids(), vec!["diagnostics", "cache"]);
    }

    #[test]
    fn later_retriever_consulted_after_decline() {
        let chain = TranslatorChain::new();
        chain.install(Arc::new(Fixed {
            id: "elsewhere",
            file: PathBuf::from("/other.coffee"),
            map: map_json(),
        }));
        chain.install(fixed("cache"));
        let found = chain.retrieve(Path::new("/srv/app/lib/a.coffee")).unwrap();
        assert_eq!(found.url, PathBuf::from("/srv/app/lib/a.coffee"));
    }

    #[test]
    fn format_trace_rewrites_each_frame() {
        let chain = TranslatorChain::new();
        chain.install(fixed("cache"));
        let frames = [
            StackFrame::new("/srv/app/lib/a.coffee", 1, 1).with_function("boom"),
            StackFrame::new("/srv/app/main.js", 4, 2),
        ];
        let text = chain.format_trace("Error: boom", &frames);
        assert_eq!(
            text,
            "Error: boom\n    at boom (/srv/app/lib/a.coffee:3:5)\n    at /srv/app/main.js:4:2"
        );
    }

    #[test]
    fn identity_mapping_is_still_a_mapping() {
        let chain = TranslatorChain::new();
        chain.install(Arc::new(Fixed {
            id: "cache",
            file: PathBuf::from("/srv/app/a.coffee"),
            map: r#"{"version":3,"sources":["a.coffee"],"names":[],"mappings":"AAAA"}"#
                .to_string(),
        }));
        let frame = StackFrame::new("/srv/app/a.coffee", 1, 1);
        assert_eq!(chain.lookup(&frame), Some(frame.clone()));
        assert_eq!(chain.translate(&frame), frame);
    }

    #[test]
    fn lookup_is_none_when_everyone_declines() {
        let chain = TranslatorChain::new();
        chain.install(fixed("cache"));
        assert!(chain
            .lookup(&StackFrame::new("/srv/app/lib/other.js", 1, 1))
            .is_none());
    }

    #[test]
    fn unmapped_position_falls_through_to_next_retriever() {
        let chain = TranslatorChain::new();
        // Covers only generated line 1.
        chain.install(Arc::new(Fixed {
            id: "partial",
            file: PathBuf::from("/srv/app/lib/a.coffee"),
            map: r#"{"version":3,"sources":["x.coffee"],"names":[],"mappings":"AAAA"}"#
                .to_string(),
        }));
        chain.install(fixed("cache"));
        let frame = StackFrame::new("/srv/app/lib/a.coffee", 2, 1);
        let out = chain.lookup(&frame).unwrap();
        assert_eq!(out.file, PathBuf::from("/srv/app/lib/a.coffee"));
        assert_eq!((out.line, out.column), (6, 1));
    }

    #[test]
    fn corrupt_map_falls_through_to_next_retriever() {
        let chain = TranslatorChain::new();
        chain.install(Arc::new(Fixed {
            id: "broken",
            file: PathBuf::from("/srv/app/lib/a.coffee"),
            map: "{".to_string(),
        }));
        chain.install(fixed("cache"));
        let frame = StackFrame::new("/srv/app/lib/a.coffee", 1, 1);
        assert_eq!(chain.lookup(&frame).map(|f| f.line), Some(3));
    }

    #[test]
    fn resolve_source_against_url() {
        assert_eq!(
            resolve_source(Path::new("/srv/app/lib/a.coffee"), "a.coffee"),
            PathBuf::from("/srv/app/lib/a.coffee")
        );
        assert_eq!(
            resolve_source(Path::new("/srv/app/lib/a.coffee"), "/abs/b.coffee"),
            PathBuf::from("/abs/b.coffee")
        );
    }
}
