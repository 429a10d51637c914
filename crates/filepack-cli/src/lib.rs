//! Offline compiler for the filepack registry
//!
//! Turns real files into generated Rust source whose execution registers
//! their zlib-compressed contents with `filepack`. The `filepack-compile`
//! binary is a thin clap front end over the [`compile`] module.

pub mod compile;

pub use compile::{compile, CompiledFile, Options, Output};
