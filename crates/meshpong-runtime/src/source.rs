//! Command channel sources.
//!
//! A source pumps raw command bytes into the node's command queue. Framing
//! is kept: a line read from a terminal arrives with its newline.

use std::io::BufRead;

use async_trait::async_trait;
use meshpong_core::{CommandBytes, MeshpongError, Result};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Something that delivers command bytes.
#[async_trait]
pub trait CommandSource: Send {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Forward commands into `tx` until the source runs dry or the receiver
    /// is dropped. Returns how many commands were forwarded.
    async fn pump(&mut self, tx: &mpsc::Sender<CommandBytes>) -> Result<usize>;
}

/// Replays a fixed list of commands.
pub struct ScriptedCommandSource {
    commands: Vec<CommandBytes>,
}

impl ScriptedCommandSource {
    /// Raw commands, sent exactly as given.
    pub fn new(commands: Vec<CommandBytes>) -> Self {
        Self { commands }
    }

    /// Text lines, each framed with a trailing newline as a terminal would
    /// send it. Blank lines are skipped.
    pub fn from_lines<L: AsRef<str>>(lines: impl IntoIterator<Item = L>) -> Self {
        let commands = lines
            .into_iter()
            .filter(|l| !l.as_ref().trim().is_empty())
            .map(|l| CommandBytes::from(format!("{}\n", l.as_ref().trim_end())))
            .collect();
        Self { commands }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[async_trait]
impl CommandSource for ScriptedCommandSource {
    fn name(&self) -> &str {
        "script"
    }

    async fn pump(&mut self, tx: &mpsc::Sender<CommandBytes>) -> Result<usize> {
        let mut sent = 0;
        for cmd in self.commands.drain(..) {
            if tx.send(cmd).await.is_err() {
                break;
            }
            sent += 1;
        }
        Ok(sent)
    }
}

/// Reads newline-terminated commands from standard input.
///
/// Reading happens on a dedicated thread so a pending read never holds up
/// runtime shutdown.
#[derive(Default)]
pub struct StdinCommandSource;

impl StdinCommandSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandSource for StdinCommandSource {
    fn name(&self) -> &str {
        "stdin"
    }

    async fn pump(&mut self, tx: &mpsc::Sender<CommandBytes>) -> Result<usize> {
        let tx = tx.clone();
        let (done_tx, done_rx) = oneshot::channel();
        std::thread::Builder::new()
            .name("meshpong-stdin".into())
            .spawn(move || {
                let _ = done_tx.send(read_lines(std::io::stdin().lock(), &tx));
            })?;
        done_rx
            .await
            .map_err(|_| MeshpongError::CommandSource("stdin reader exited".into()))?
    }
}

fn read_lines(mut reader: impl BufRead, tx: &mpsc::Sender<CommandBytes>) -> Result<usize> {
    let mut sent = 0;
    loop {
        let mut line = Vec::new();
        let n = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| MeshpongError::CommandSource(format!("stdin: {e}")))?;
        if n == 0 {
            debug!("stdin closed");
            return Ok(sent);
        }
        if tx.blocking_send(CommandBytes::from(line)).is_err() {
            return Ok(sent);
        }
        sent += 1;
    }
}

/// Run `sources` one after another in a background task, feeding a single
/// queue of `capacity`. The receiver closes once every source is done.
pub fn spawn_sources(
    sources: Vec<Box<dyn CommandSource>>,
    capacity: usize,
) -> mpsc::Receiver<CommandBytes> {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    tokio::spawn(async move {
        for mut source in sources {
            match source.pump(&tx).await {
                Ok(n) => debug!(source = source.name(), commands = n, "command source finished"),
                Err(e) => warn!(source = source.name(), error = %e, "command source failed"),
            }
            if tx.is_closed() {
                break;
            }
        }
    });
    rx
}
