//! # meshpong-core
//!
//! Shared vocabulary for the meshpong responder node: value handles, the
//! device payload, mesh events, command bytes and the unified error type.

pub mod error;
pub mod event;
pub mod types;

pub use error::{MeshpongError, Result};
pub use event::{CommandBytes, MeshEvent};
pub use types::*;
