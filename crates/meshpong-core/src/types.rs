use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MeshpongError;

/// Maximum length of a value stored under a handle, and the size of the
/// payload this node publishes.
pub const MAX_VALUE_LENGTH: usize = 8;

/// Number of address bytes at the head of the payload.
pub const ADDRESS_LEN: usize = 6;

/// Payload byte holding the republish counter.
pub const COUNTER_INDEX: usize = 6;

/// Identifier of a synchronized value slot, always in `1..=254`.
///
/// Raw `0` is the wildcard and raw `255` the platform's invalid-handle
/// sentinel; neither is ever a `Handle`. Whether a handle is in range for a
/// particular mesh is checked against that mesh's handle count with
/// [`Handle::within`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Handle(u8);

impl Handle {
    /// Raw value selecting every handle.
    pub const WILDCARD: u8 = 0;
    /// Raw value the platform reserves for "no handle".
    pub const INVALID: u8 = 0xFF;
    /// Largest handle count a mesh can be configured with.
    pub const MAX_COUNT: u8 = 254;

    /// Wrap a raw slot number. Returns `None` for the wildcard and the
    /// invalid sentinel.
    pub fn new(raw: u8) -> Option<Self> {
        (raw != Self::WILDCARD && raw != Self::INVALID).then_some(Self(raw))
    }

    /// The raw slot number.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Whether this handle exists on a mesh with `handle_count` slots.
    pub fn within(self, handle_count: u8) -> bool {
        self.0 <= handle_count
    }

    /// Every handle of a mesh with `handle_count` slots, ascending.
    pub fn all(handle_count: u8) -> impl Iterator<Item = Handle> {
        (1..=handle_count.min(Self::MAX_COUNT)).map(Handle)
    }
}

impl TryFrom<u8> for Handle {
    type Error = MeshpongError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Handle::new(raw).ok_or(MeshpongError::InvalidHandle {
            handle: raw,
            max: Handle::MAX_COUNT,
        })
    }
}

impl From<Handle> for u8 {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Six-byte network address of a device, least significant byte first
/// (the order the radio stack reports it in).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceAddr([u8; ADDRESS_LEN]);

impl DeviceAddr {
    pub fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// A random static address: the two most significant bits are set.
    pub fn random() -> Self {
        let mut bytes: [u8; ADDRESS_LEN] = rand::random();
        bytes[ADDRESS_LEN - 1] |= 0xC0;
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

/// Displayed most significant byte first, colon separated.
impl fmt::Display for DeviceAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().rev().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for DeviceAddr {
    type Err = MeshpongError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != ADDRESS_LEN {
            return Err(MeshpongError::InvalidAddress(s.to_string()));
        }
        let mut bytes = [0u8; ADDRESS_LEN];
        for (slot, part) in bytes.iter_mut().rev().zip(&parts) {
            if part.len() != 2 {
                return Err(MeshpongError::InvalidAddress(s.to_string()));
            }
            *slot = u8::from_str_radix(part, 16)
                .map_err(|_| MeshpongError::InvalidAddress(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for DeviceAddr {
    type Error = MeshpongError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DeviceAddr> for String {
    fn from(addr: DeviceAddr) -> Self {
        addr.to_string()
    }
}

/// The value template this node publishes.
///
/// Bytes `0..6` carry the device address and are fixed at construction.
/// Byte `6` is a counter that wraps modulo 256. The rest stays zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Payload([u8; MAX_VALUE_LENGTH]);

impl Payload {
    pub fn new(addr: DeviceAddr) -> Self {
        let mut bytes = [0u8; MAX_VALUE_LENGTH];
        bytes[..ADDRESS_LEN].copy_from_slice(addr.as_bytes());
        Self(bytes)
    }

    pub fn address(&self) -> DeviceAddr {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&self.0[..ADDRESS_LEN]);
        DeviceAddr(bytes)
    }

    pub fn counter(&self) -> u8 {
        self.0[COUNTER_INDEX]
    }

    /// Advance the counter by one, wrapping, and return the new value.
    pub fn bump(&mut self) -> u8 {
        self.0[COUNTER_INDEX] = self.0[COUNTER_INDEX].wrapping_add(1);
        self.0[COUNTER_INDEX]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// On-air packet layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketFormat {
    #[default]
    Original,
    Extended,
}

impl fmt::Display for PacketFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PacketFormat::Original => "original",
            PacketFormat::Extended => "extended",
        })
    }
}

/// Radio modulation and bit rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RadioMode {
    #[default]
    #[serde(rename = "ble_1mbit")]
    Ble1Mbit,
    #[serde(rename = "ble_2mbit")]
    Ble2Mbit,
    #[serde(rename = "nrf_1mbit")]
    Nrf1Mbit,
    #[serde(rename = "nrf_2mbit")]
    Nrf2Mbit,
}

impl fmt::Display for RadioMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RadioMode::Ble1Mbit => "ble_1mbit",
            RadioMode::Ble2Mbit => "ble_2mbit",
            RadioMode::Nrf1Mbit => "nrf_1mbit",
            RadioMode::Nrf2Mbit => "nrf_2mbit",
        })
    }
}

/// Radio settings a node's mesh is initialised with. Two nodes hear each
/// other only when all of them match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioParams {
    pub access_addr: u32,
    pub channel: u8,
    pub packet_format: PacketFormat,
    pub radio_mode: RadioMode,
}

impl Default for RadioParams {
    fn default() -> Self {
        Self {
            access_addr: 0xA541_A68F,
            channel: 38,
            packet_format: PacketFormat::Original,
            radio_mode: RadioMode::Ble1Mbit,
        }
    }
}

impl fmt::Display for RadioParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "access {:#010X}, channel {}, {} packets, {}",
            self.access_addr, self.channel, self.packet_format, self.radio_mode
        )
    }
}
