//! Reaction rules over [`ResponderState`].
//!
//! Both entry points run to completion and never block: store calls only
//! queue work. A store error is returned to the caller untouched; command
//! rejections are ordinary outcomes.

mod command;
mod event;

pub use command::{CommandOutcome, ConfigurationError, ParseMode, parse_handle, usage};
pub use event::EventOutcome;

use meshpong_core::{DeviceAddr, Handle};
use meshpong_mesh::ValueStore;

use crate::indicator::{Indicator, LedIndicator};
use crate::state::ResponderState;

/// Tracing target for the node's operator-facing diagnostics.
pub const DIAG_TARGET: &str = "meshpong::diag";

/// Owns the node state and the collaborators the reactions call into.
pub struct Responder<S, I = LedIndicator> {
    state: ResponderState,
    store: S,
    indicator: I,
    handle_count: u8,
    parse_mode: ParseMode,
}

impl<S: ValueStore, I: Indicator> Responder<S, I> {
    /// A responder with an unset filter and a zero counter. `handle_count`
    /// is capped at [`Handle::MAX_COUNT`].
    pub fn new(addr: DeviceAddr, store: S, indicator: I, handle_count: u8) -> Self {
        Self {
            state: ResponderState::new(addr),
            store,
            indicator,
            handle_count: handle_count.min(Handle::MAX_COUNT),
            parse_mode: ParseMode::default(),
        }
    }

    pub fn with_parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = parse_mode;
        self
    }

    pub fn state(&self) -> &ResponderState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn handle_count(&self) -> u8 {
        self.handle_count
    }

    pub fn parse_mode(&self) -> ParseMode {
        self.parse_mode
    }

    /// Usage help for this node's handle range.
    pub fn usage(&self) -> String {
        usage(self.handle_count)
    }
}
