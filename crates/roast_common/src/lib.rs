//! Shared foundational types used across the roast compile cache.
//!
//! This crate provides the tracked-extension triple, source positions, the
//! version 3 source map model with its VLQ mapping decoder.

#![warn(missing_docs)]

pub mod extension;
pub mod position;
pub mod source_map;
pub mod vlq;

pub use extension::{ExtensionError, Extensions};
pub use position::Position;
pub use source_map::{Mapping, OriginalLocation, SourceMap, SourceMapError};
