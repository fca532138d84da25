//! Command line interface module
//!
//! Argument parsing and the runner behind the `blob-transfer` binary.

pub mod args;
pub mod runner;

pub use args::{Args, Command};
pub use runner::Runner;
