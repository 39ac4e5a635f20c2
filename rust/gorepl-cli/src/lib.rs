//! Terminal front-end for gorepl: configuration, the Go toolchain runner and
//! the interactive loop.

pub mod colors;
pub mod config;
pub mod repl;
pub mod runner;
