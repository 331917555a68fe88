//! Isolated invocation of the external transpiler.
//!
//! The transpiler itself is not part of roast. This crate defines the
//! [`Transpiler`] seam, wraps every call in [`Compiler`] so that a failing or
//! panicking transpiler becomes a [`CompileError`] instead of taking the process
//! down, and ships [`CommandTranspiler`], which drives a transpiler executable
//! found on `PATH`.

#![warn(missing_docs)]

pub mod command;
pub mod compiler;
pub mod error;
pub mod transpiler;

pub use command::{CommandLocator, CommandTranspiler};
pub use compiler::{CompiledOutput, Compiler};
pub use error::{CompileError, LocateError, TranspileError};
pub use transpiler::{TranspileOutput, TranspileRequest, Transpiler, TranspilerLocator};
