use meshpong_core::{DeviceAddr, Handle, RadioParams};
use serde::{Deserialize, Serialize};

pub use meshpong_core::{PacketFormat, RadioMode};

/// Root configuration, mapped from `meshpong.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshpongConfig {
    pub node: NodeConfig,
    pub mesh: MeshConfig,
    pub command: CommandConfig,
    pub logging: LoggingConfig,
}

// ── Node ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Device address, e.g. "c1:02:03:04:05:06". Random when unset.
    pub address: Option<DeviceAddr>,
    /// Command applied at startup as if it arrived on the command channel,
    /// e.g. "0" to respond to every handle straight away.
    pub initial_command: Option<String>,
}

// ── Mesh ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Radio access address shared by every node of the mesh.
    pub access_addr: u32,
    /// Minimum interval between transmissions of one handle.
    pub interval_min_ms: u64,
    /// Advertising channel.
    pub channel: u8,
    /// Number of value slots; valid handles are `1..=handle_count`.
    pub handle_count: u8,
    pub packet_format: PacketFormat,
    pub radio_mode: RadioMode,
}

impl Default for MeshConfig {
    fn default() -> Self {
        let radio = RadioParams::default();
        Self {
            access_addr: radio.access_addr,
            interval_min_ms: 100,
            channel: radio.channel,
            handle_count: 20,
            packet_format: radio.packet_format,
            radio_mode: radio.radio_mode,
        }
    }
}

impl MeshConfig {
    /// The radio settings nodes must share to hear each other.
    pub fn radio(&self) -> RadioParams {
        RadioParams {
            access_addr: self.access_addr,
            channel: self.channel,
            packet_format: self.packet_format,
            radio_mode: self.radio_mode,
        }
    }
}

// ── Command ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Reject commands without a leading number instead of treating them as
    /// the wildcard.
    pub strict: bool,
    /// Capacity of the command queue feeding the node loop.
    pub queue_capacity: usize,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            strict: false,
            queue_capacity: 64,
        }
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "json", "compact".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

/// A single config validation issue.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            WarningSeverity::Error => "error",
            WarningSeverity::Warning => "warning",
            WarningSeverity::Info => "info",
        };
        write!(f, "{} {}: {}", label, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   ↳ {}", h)?;
        }
        Ok(())
    }
}

impl MeshpongConfig {
    /// Validate the config and return a list of warnings.
    /// Returns `Err` with all messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();

        // ── Handle count ───
        if self.mesh.handle_count == 0 || self.mesh.handle_count > Handle::MAX_COUNT {
            warnings.push(ConfigWarning {
                field: "mesh.handle_count".into(),
                message: format!("handle count {} is invalid", self.mesh.handle_count),
                severity: WarningSeverity::Error,
                hint: Some(format!("Must be between 1 and {}", Handle::MAX_COUNT)),
            });
        }

        // ── Radio ───
        if self.mesh.channel > 39 {
            warnings.push(ConfigWarning {
                field: "mesh.channel".into(),
                message: format!("channel {} does not exist", self.mesh.channel),
                severity: WarningSeverity::Error,
                hint: Some("Channels range 0-39; 37, 38 and 39 are the advertising channels".into()),
            });
        } else if !(37..=39).contains(&self.mesh.channel) {
            warnings.push(ConfigWarning {
                field: "mesh.channel".into(),
                message: format!("channel {} is a data channel", self.mesh.channel),
                severity: WarningSeverity::Warning,
                hint: Some("Nodes scanning the advertising channels will not hear this mesh".into()),
            });
        }

        if self.mesh.interval_min_ms == 0 {
            warnings.push(ConfigWarning {
                field: "mesh.interval_min_ms".into(),
                message: "interval is 0, nodes would retransmit without pause".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 100".into()),
            });
        }

        if self.mesh.access_addr == 0 || self.mesh.access_addr == u32::MAX {
            warnings.push(ConfigWarning {
                field: "mesh.access_addr".into(),
                message: format!("access address {:#010X} has no bit transitions", self.mesh.access_addr),
                severity: WarningSeverity::Warning,
                hint: Some("Use e.g. 0xA541A68F".into()),
            });
        }

        // ── Command queue ───
        if self.command.queue_capacity == 0 {
            warnings.push(ConfigWarning {
                field: "command.queue_capacity".into(),
                message: "queue capacity must be positive".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 64".into()),
            });
        }

        // ── Initial command ───
        if let Some(ref cmd) = self.node.initial_command {
            if cmd.trim().is_empty() {
                warnings.push(ConfigWarning {
                    field: "node.initial_command".into(),
                    message: "initial command is empty and will be ignored".into(),
                    severity: WarningSeverity::Warning,
                    hint: None,
                });
            }
        }

        // ── Logging format ───
        let valid_formats = ["pretty", "json", "compact"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_formats.join(", "))),
            });
        }

        // ── Logging level ───
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_levels.join(", "))),
            });
        }

        // Check for hard errors
        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| format!("{}: {}", w.field, w.message))
            .collect();

        if !errors.is_empty() {
            return Err(format!("Configuration errors:\n  • {}", errors.join("\n  • ")));
        }

        Ok(warnings)
    }
}
