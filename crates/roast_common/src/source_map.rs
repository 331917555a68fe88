//! Version 3 source maps: the persisted mapping from generated positions back
//! to original source positions.
//!
//! The transpiler produces the JSON; the cache annotates and stores it; the
//! trace translator parses it back and answers position queries.

use serde::{Deserialize, Serialize};

use crate::position::Position;
use crate::vlq::{self, VlqError};

/// The only source map format revision understood here.
pub const SOURCE_MAP_VERSION: u32 = 3;

/// Errors produced while parsing or querying a source map.
#[derive(Debug, thiserror::Error)]
pub enum SourceMapError {
    /// The map text is not valid source map JSON.
    #[error("invalid source map JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The map declares a revision other than 3.
    #[error("unsupported source map version {0}")]
    UnsupportedVersion(u32),

    /// A `mappings` segment could not be decoded.
    #[error("bad mapping segment '{segment}' on generated line {line}: {source}")]
    Segment {
        /// Zero-based generated line holding the segment.
        line: u32,
        /// The raw segment text.
        segment: String,
        /// The decoding failure.
        source: VlqError,
    },

    /// A segment has a field count other than 1, 4 or 5, or a field went negative.
    #[error("malformed mapping segment '{segment}' on generated line {line}")]
    Malformed {
        /// Zero-based generated line holding the segment.
        line: u32,
        /// The raw segment text.
        segment: String,
    },
}

/// A version 3 source map document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    /// Format revision; always 3.
    pub version: u32,

    /// Basename of the generated file this map describes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Prefix prepended to every entry of `sources`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,

    /// Contributing original sources.
    #[serde(default)]
    pub sources: Vec<String>,

    /// Inline copies of the original sources, parallel to `sources`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,

    /// Symbol names referenced by mappings.
    #[serde(default)]
    pub names: Vec<String>,

    /// Base64 VLQ encoded mapping segments.
    pub mappings: String,
}

/// One decoded mapping segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    /// Position in the generated output.
    pub generated: Position,
    /// Index into `sources`, when the segment maps to original code.
    pub source: Option<u32>,
    /// Position in the original source, when the segment maps to original code.
    pub original: Option<Position>,
    /// Index into `names`, when the segment carries a symbol name.
    pub name: Option<u32>,
}

/// The answer to a position query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalLocation {
    /// The original source, with `sourceRoot` applied.
    pub source: String,
    /// Position in that source.
    pub position: Position,
    /// Symbol name at that position, if recorded.
    pub name: Option<String>,
}

impl SourceMap {
    /// Parses map JSON and checks its revision.
    pub fn from_json(text: &str) -> Result<Self, SourceMapError> {
        let map: SourceMap = serde_json::from_str(text)?;
        if map.version != SOURCE_MAP_VERSION {
            return Err(SourceMapError::UnsupportedVersion(map.version));
        }
        Ok(map)
    }

    /// Serializes the map back to compact JSON.
    pub fn to_json(&self) -> Result<String, SourceMapError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Records the generated basename and the contributing source basenames,
    /// so the map stays meaningful wherever the artifact is placed.
    pub fn annotate(&mut self, generated_file: &str, sources: &[&str]) {
        self.file = Some(generated_file.to_string());
        self.sources = sources.iter().map(|s| s.to_string()).collect();
        self.source_root = None;
    }

    /// Decodes the `mappings` field into segments ordered by generated position.
    pub fn decode(&self) -> Result<Vec<Mapping>, SourceMapError> {
        let mut out = Vec::new();
        let mut source: i64 = 0;
        let mut orig_line: i64 = 0;
        let mut orig_col: i64 = 0;
        let mut name: i64 = 0;

        for (line_idx, line) in self.mappings.split(';').enumerate() {
            let line_no = line_idx as u32;
            let mut gen_col: i64 = 0;
            for segment in line.split(',').filter(|s| !s.is_empty()) {
                let fields = vlq::decode_segment(segment).map_err(|e| SourceMapError::Segment {
                    line: line_no,
                    segment: segment.to_string(),
                    source: e,
                })?;
                let malformed = || SourceMapError::Malformed {
                    line: line_no,
                    segment: segment.to_string(),
                };

                gen_col += fields.first().copied().ok_or_else(malformed)?;
                let generated = Position::new(line_no, to_u32(gen_col).ok_or_else(malformed)?);

                let mapping = match fields.len() {
                    1 => Mapping {
                        generated,
                        source: None,
                        original: None,
                        name: None,
                    },
                    4 | 5 => {
                        source += fields[1];
                        orig_line += fields[2];
                        orig_col += fields[3];
                        let named = if fields.len() == 5 {
                            name += fields[4];
                            Some(to_u32(name).ok_or_else(malformed)?)
                        } else {
                            None
                        };
                        Mapping {
                            generated,
                            source: Some(to_u32(source).ok_or_else(malformed)?),
                            original: Some(Position::new(
                                to_u32(orig_line).ok_or_else(malformed)?,
                                to_u32(orig_col).ok_or_else(malformed)?,
                            )),
                            name: named,
                        }
                    }
                    _ => return Err(malformed()),
                };
                out.push(mapping);
            }
        }

        out.sort_by_key(|m| m.generated);
        Ok(out)
    }

    /// Finds the original location of a generated position.
    ///
    /// Uses the closest segment at or before `generated` on the same generated
    /// line. Returns `None` when that line has no such segment or the segment
    /// does not point at original code.
    pub fn lookup(&self, generated: Position) -> Result<Option<OriginalLocation>, SourceMapError> {
        let mappings = self.decode()?;
        let idx = mappings.partition_point(|m| m.generated <= generated);
        let Some(found) = idx.checked_sub(1).map(|i| mappings[i]) else {
            return Ok(None);
        };
        if found.generated.line != generated.line {
            return Ok(None);
        }
        let (Some(source), Some(position)) = (found.source, found.original) else {
            return Ok(None);
        };
        let Some(source) = self.sources.get(source as usize) else {
            return Ok(None);
        };
        Ok(Some(OriginalLocation {
            source: self.source_path(source),
            position,
            name: found
                .name
                .and_then(|n| self.names.get(n as usize))
                .cloned(),
        }))
    }

    fn source_path(&self, source: &str) -> String {
        match self.source_root.as_deref() {
            Some(root) if !root.is_empty() => {
                format!("{}/{}", root.trim_end_matches('/'), source)
            }
            _ => source.to_string(),
        }
    }
}

fn to_u32(value: i64) -> Option<u32> {
    u32::try_from(value).ok()
}
