use std::future::Future;

use meshpong_core::{CommandBytes, MeshEvent, Result};
use meshpong_mesh::ValueStore;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::indicator::Indicator;
use crate::reactor::{CommandOutcome, DIAG_TARGET, EventOutcome, Responder};

/// Counters collected over a node run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeStats {
    /// Mesh events received.
    pub events: u64,
    /// Commands received, ignored ones included.
    pub commands: u64,
    /// `set` calls made, by either reactor.
    pub republished: u64,
    /// `disable` calls made.
    pub disabled: u64,
    /// Commands rejected.
    pub rejected: u64,
}

/// A responder driven by its event and command queues.
pub struct MeshpongNode<S, I> {
    name: String,
    responder: Responder<S, I>,
    stats: NodeStats,
}

impl<S: ValueStore, I: Indicator> MeshpongNode<S, I> {
    pub fn new(name: impl Into<String>, responder: Responder<S, I>) -> Self {
        Self {
            name: name.into(),
            responder,
            stats: NodeStats::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn responder(&self) -> &Responder<S, I> {
        &self.responder
    }

    pub fn stats(&self) -> NodeStats {
        self.stats
    }

    /// Run until both queues close or `shutdown` resolves.
    ///
    /// Events and commands are handled one at a time in arrival order per
    /// queue. A store error stops the node and is returned.
    pub async fn run(
        &mut self,
        mut events: mpsc::Receiver<MeshEvent>,
        mut commands: mpsc::Receiver<CommandBytes>,
        shutdown: impl Future<Output = ()>,
    ) -> Result<NodeStats> {
        info!(target: DIAG_TARGET, "START");
        info!(target: DIAG_TARGET, "{}", self.responder.usage());

        tokio::pin!(shutdown);
        let mut events_open = true;
        let mut commands_open = true;

        while events_open || commands_open {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!(node = %self.name, "shutdown requested");
                    break;
                }
                event = events.recv(), if events_open => match event {
                    Some(event) => self.handle_event(event)?,
                    None => {
                        info!(node = %self.name, "mesh event queue closed");
                        events_open = false;
                    }
                },
                cmd = commands.recv(), if commands_open => match cmd {
                    Some(cmd) => self.handle_command(&cmd)?,
                    None => {
                        info!(node = %self.name, "command queue closed");
                        commands_open = false;
                    }
                },
            }
        }

        info!(
            node = %self.name,
            events = self.stats.events,
            commands = self.stats.commands,
            republished = self.stats.republished,
            disabled = self.stats.disabled,
            rejected = self.stats.rejected,
            "node stopped"
        );
        Ok(self.stats)
    }

    fn handle_event(&mut self, event: MeshEvent) -> Result<()> {
        self.stats.events += 1;
        match self.responder.on_event(event) {
            Ok(EventOutcome::Republished { .. }) => self.stats.republished += 1,
            Ok(EventOutcome::Disabled { .. }) => self.stats.disabled += 1,
            Ok(EventOutcome::Acknowledged) => {}
            Err(e) => {
                error!(node = %self.name, error = %e, event = event.kind_name(), "value store failed");
                return Err(e);
            }
        }
        Ok(())
    }

    fn handle_command(&mut self, cmd: &CommandBytes) -> Result<()> {
        self.stats.commands += 1;
        match self.responder.on_command(cmd) {
            Ok(CommandOutcome::RespondingToAll { .. }) => {
                self.stats.republished += u64::from(self.responder.handle_count());
            }
            Ok(CommandOutcome::RespondingTo { .. }) => self.stats.republished += 1,
            Ok(CommandOutcome::Rejected(_)) => self.stats.rejected += 1,
            Ok(CommandOutcome::Ignored) => {}
            Err(e) => {
                error!(node = %self.name, error = %e, "value store failed");
                return Err(e);
            }
        }
        Ok(())
    }
}
