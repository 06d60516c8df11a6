//! Library surface of the `nineml-client` binary, shared with its tests.

pub mod cli;
pub mod commands;
pub mod logging;
