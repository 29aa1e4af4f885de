use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::types::Handle;

/// Notices delivered by the value store.
///
/// The three value events fire when a handle's synchronized value changes;
/// `Initialized` and `Tx` are lifecycle acknowledgements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeshEvent {
    /// First value seen for a handle.
    NewValue { handle: Handle },
    /// A newer value replaced the one we held.
    UpdateValue { handle: Handle },
    /// A peer published a different value at the same version.
    ConflictingValue { handle: Handle },
    /// The store joined the mesh.
    Initialized,
    /// A value we published went out over the air.
    Tx { handle: Handle },
}

impl MeshEvent {
    /// Single-character diagnostic tag for this event kind.
    pub fn tag(&self) -> char {
        match self {
            MeshEvent::UpdateValue { .. } => 'U',
            MeshEvent::ConflictingValue { .. } => 'C',
            MeshEvent::NewValue { .. } => 'N',
            MeshEvent::Initialized => 'I',
            MeshEvent::Tx { .. } => 'T',
        }
    }

    /// The handle whose value changed, for the three value events.
    pub fn value_handle(&self) -> Option<Handle> {
        match self {
            MeshEvent::NewValue { handle }
            | MeshEvent::UpdateValue { handle }
            | MeshEvent::ConflictingValue { handle } => Some(*handle),
            MeshEvent::Initialized | MeshEvent::Tx { .. } => None,
        }
    }

    /// Human-readable name of the event kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            MeshEvent::NewValue { .. } => "new",
            MeshEvent::UpdateValue { .. } => "update",
            MeshEvent::ConflictingValue { .. } => "conflict",
            MeshEvent::Initialized => "initialized",
            MeshEvent::Tx { .. } => "tx",
        }
    }
}

/// Raw bytes received on the command channel, framing included.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandBytes(Bytes);

impl CommandBytes {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&'static str> for CommandBytes {
    fn from(s: &'static str) -> Self {
        Self(Bytes::from_static(s.as_bytes()))
    }
}

impl From<String> for CommandBytes {
    fn from(s: String) -> Self {
        Self(Bytes::from(s))
    }
}

impl From<Vec<u8>> for CommandBytes {
    fn from(v: Vec<u8>) -> Self {
        Self(Bytes::from(v))
    }
}
