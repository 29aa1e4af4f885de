use meshpong_core::{CommandBytes, Handle, Result};
use meshpong_mesh::ValueStore;
use thiserror::Error;
use tracing::{info, warn};

use super::{DIAG_TARGET, Responder};
use crate::indicator::Indicator;
use crate::state::Filter;

/// How to treat a command with no leading number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Treat it as `0`, the wildcard.
    #[default]
    Lenient,
    /// Reject it.
    Strict,
}

/// A command the node refused. The filter is left as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("handle {requested} is out of bounds, max {max}")]
    OutOfBounds { requested: i64, max: u8 },

    #[error("command '{0}' does not start with a handle number")]
    NotANumber(String),
}

/// What a command made the node do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Too short to carry content.
    Ignored,
    /// Filter set to the wildcard; payload published on every handle.
    RespondingToAll { counter: u8 },
    /// Filter set to `handle`; payload published there.
    RespondingTo { handle: Handle, counter: u8 },
    Rejected(ConfigurationError),
}

/// Usage help listing the valid handle range.
pub fn usage(handle_count: u8) -> String {
    format!(
        "To configure: transmit the handle number this device responds to, \
         or 0 to respond to all handles. MAX: {handle_count}"
    )
}

/// Read the leading signed decimal number of a command.
///
/// Leading ASCII whitespace and one `+` or `-` are skipped. Returns `None`
/// when no digit follows. Values beyond the `i64` range saturate.
pub fn parse_handle(bytes: &[u8]) -> Option<i64> {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let (negative, rest) = match &bytes[start..] {
        [b'-', tail @ ..] => (true, tail),
        [b'+', tail @ ..] => (false, tail),
        rest => (false, rest),
    };
    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    Some(rest[..digits].iter().fold(0i64, |acc, d| {
        let d = i64::from(d - b'0');
        if negative {
            acc.saturating_mul(10).saturating_sub(d)
        } else {
            acc.saturating_mul(10).saturating_add(d)
        }
    }))
}

impl<S: ValueStore, I: Indicator> Responder<S, I> {
    /// React to one command from the command channel.
    ///
    /// `"0"` (or, in lenient mode, anything without a leading number)
    /// selects every handle; `"1"` through the handle count select one.
    /// The framing byte counts toward the length, so `"5\n"` is the shortest
    /// command acted on.
    pub fn on_command(&mut self, cmd: &CommandBytes) -> Result<CommandOutcome> {
        if cmd.len() <= 1 {
            return Ok(CommandOutcome::Ignored);
        }

        let requested = match (parse_handle(cmd.as_bytes()), self.parse_mode) {
            (Some(n), _) => n,
            (None, ParseMode::Lenient) => i64::from(Handle::WILDCARD),
            (None, ParseMode::Strict) => {
                let text = String::from_utf8_lossy(cmd.as_bytes()).trim().to_string();
                warn!(target: DIAG_TARGET, "UNRECOGNISED COMMAND: {text}");
                return Ok(self.reject(ConfigurationError::NotANumber(text)));
            }
        };

        if !(0..=i64::from(self.handle_count)).contains(&requested) {
            warn!(target: DIAG_TARGET, "OUT OF BOUNDS!");
            return Ok(self.reject(ConfigurationError::OutOfBounds {
                requested,
                max: self.handle_count,
            }));
        }

        // In range, so it fits in a u8 and is either the wildcard or a handle.
        let handle = u8::try_from(requested).ok().and_then(Handle::new);
        match handle {
            None => {
                self.state.set_filter(Filter::All);
                let counter = self.state.bump_counter();
                for h in Handle::all(self.handle_count) {
                    self.store.set(h, self.state.payload().as_bytes())?;
                }
                info!(target: DIAG_TARGET, "Responding to all");
                Ok(CommandOutcome::RespondingToAll { counter })
            }
            Some(handle) => {
                self.state.set_filter(Filter::Handle(handle));
                let counter = self.state.bump_counter();
                self.store.set(handle, self.state.payload().as_bytes())?;
                info!(target: DIAG_TARGET, "Responding to handle {handle}");
                Ok(CommandOutcome::RespondingTo { handle, counter })
            }
        }
    }

    fn reject(&self, error: ConfigurationError) -> CommandOutcome {
        info!(target: DIAG_TARGET, "{}", self.usage());
        CommandOutcome::Rejected(error)
    }
}
