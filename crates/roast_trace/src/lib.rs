//! Stack-trace translation through cached source maps.
//!
//! Code runs under its original source path but executes the generated
//! artifact, so raw frame positions point into generated code. A
//! [`TranslatorChain`] asks its retrievers, in order, for the map belonging to
//! a frame's file and rewrites the frame to the original position. A retriever
//! declines by returning `None`; a frame nobody can map is left as it was.

#![warn(missing_docs)]

pub mod chain;
pub mod error;
pub mod frame;
pub mod global;
pub mod retriever;

pub use chain::TranslatorChain;
pub use error::TraceError;
pub use frame::StackFrame;
pub use global::{install, installed};
pub use retriever::{CacheMapRetriever, RetrievedMap, SourceMapRetriever, CACHE_RETRIEVER_ID, TRANSPILER_BUILTIN_ID};
