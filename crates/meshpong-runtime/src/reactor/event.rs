use meshpong_core::{Handle, MeshEvent, Result};
use meshpong_mesh::ValueStore;
use tracing::{debug, info};

use super::{DIAG_TARGET, Responder};
use crate::indicator::Indicator;

/// What a mesh event made the node do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Counter bumped and the payload published under `handle`.
    Republished { handle: Handle, counter: u8 },
    /// Not interested; the store was told to stop syncing `handle`.
    Disabled { handle: Handle },
    /// Lifecycle notice, nothing to do.
    Acknowledged,
}

impl<S: ValueStore, I: Indicator> Responder<S, I> {
    /// React to one value store event.
    pub fn on_event(&mut self, event: MeshEvent) -> Result<EventOutcome> {
        let Some(handle) = event.value_handle() else {
            return Ok(EventOutcome::Acknowledged);
        };

        let filter = self.state.filter();
        if !filter.matches(handle) {
            self.store.disable(handle)?;
            debug!(handle = %handle, %filter, "not interested, handle disabled");
            return Ok(EventOutcome::Disabled { handle });
        }

        self.indicator.toggle();
        let counter = self.state.bump_counter();
        self.store.set(handle, self.state.payload().as_bytes())?;
        if filter.is_wildcard() {
            info!(target: DIAG_TARGET, "{}[{}]", event.tag(), handle);
        }
        debug!(handle = %handle, counter, kind = event.kind_name(), "republished");
        Ok(EventOutcome::Republished { handle, counter })
    }
}
