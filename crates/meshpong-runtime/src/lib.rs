//! # meshpong-runtime
//!
//! The responder node. A [`Responder`] owns the node's [`ResponderState`]
//! (interest filter and payload) and reacts to two inputs:
//!
//! - mesh events from the value store, via [`Responder::on_event`]
//! - command bytes from the command channel, via [`Responder::on_command`]
//!
//! [`MeshpongNode`] feeds both from message queues through one loop, so
//! reactions never overlap.

pub mod indicator;
pub mod node;
pub mod reactor;
pub mod source;
pub mod state;

pub use indicator::{Indicator, LedIndicator};
pub use node::{MeshpongNode, NodeStats};
pub use reactor::{
    CommandOutcome, ConfigurationError, DIAG_TARGET, EventOutcome, ParseMode, Responder,
    parse_handle, usage,
};
pub use source::{CommandSource, ScriptedCommandSource, StdinCommandSource, spawn_sources};
pub use state::{Filter, ResponderState};
