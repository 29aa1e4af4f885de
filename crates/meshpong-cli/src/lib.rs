//! # meshpong-cli
//!
//! Command-line interface for the meshpong node.
//!
//! ## Commands
//!
//! - `meshpong run` runs the node and simulated peers on a loopback mesh
//! - `meshpong config` prints the effective configuration
//! - `meshpong usage` prints the command channel help
//! - `meshpong completions` generates shell completions
//! - `meshpong version` shows build info

pub mod commands;

pub use commands::Cli;
