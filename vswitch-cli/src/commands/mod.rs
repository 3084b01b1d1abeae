//! Subcommand implementations.

pub mod config;
pub mod detect;
pub mod init;
pub mod resolve;
pub mod switch;
pub mod versions;
