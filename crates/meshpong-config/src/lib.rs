//! # meshpong-config
//!
//! Configuration for the meshpong node. Reads from `meshpong.toml`, then
//! applies environment variable overrides.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::MeshpongConfig;
pub use schema::{
    CommandConfig, ConfigWarning, LoggingConfig, MeshConfig, NodeConfig, PacketFormat, RadioMode,
    WarningSeverity,
};
