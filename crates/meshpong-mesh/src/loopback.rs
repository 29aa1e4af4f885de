//! In-process loopback mesh.
//!
//! Every [`LoopbackStore`] joined to a [`LoopbackMesh`] hears the values the
//! others publish on the same radio settings. A background radio task wakes
//! once per mesh interval, transmits the latest pending value of each
//! `(handle, origin)` pair to every other member tuned to the origin's
//! [`RadioParams`] and acknowledges the origin with a `Tx` event.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use meshpong_core::{
    DeviceAddr, Handle, MAX_VALUE_LENGTH, MeshEvent, MeshpongError, RadioParams, Result,
};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::store::ValueStore;

/// Capacity of each member's event queue. The radio drops events for a
/// member whose queue is full.
const EVENT_QUEUE_CAPACITY: usize = 256;

/// A value on the air.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transmission {
    pub origin: DeviceAddr,
    pub handle: Handle,
    pub version: u32,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone)]
struct Slot {
    version: u32,
    value: Vec<u8>,
    origin: DeviceAddr,
}

/// One node's view of the mesh slots.
#[derive(Debug, Default)]
pub struct SlotTable {
    slots: HashMap<Handle, Slot>,
    disabled: HashSet<Handle>,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a local publish. Returns the transmission to put on the air.
    pub fn publish(&mut self, origin: DeviceAddr, handle: Handle, value: &[u8]) -> Transmission {
        self.disabled.remove(&handle);
        let version = self.slots.get(&handle).map_or(1, |s| s.version.wrapping_add(1));
        self.slots.insert(
            handle,
            Slot {
                version,
                value: value.to_vec(),
                origin,
            },
        );
        Transmission {
            origin,
            handle,
            version,
            value: value.to_vec(),
        }
    }

    pub fn disable(&mut self, handle: Handle) {
        self.disabled.insert(handle);
    }

    pub fn is_disabled(&self, handle: Handle) -> bool {
        self.disabled.contains(&handle)
    }

    /// Current version and value held for `handle`.
    pub fn get(&self, handle: Handle) -> Option<(u32, &[u8])> {
        self.slots
            .get(&handle)
            .map(|s| (s.version, s.value.as_slice()))
    }

    /// Arbitrate an incoming transmission against the held value.
    ///
    /// A higher version replaces the slot. An equal version carrying a
    /// different value is a conflict; the larger origin address wins. Lower
    /// versions and disabled handles are dropped without an event.
    pub fn receive(&mut self, tx: &Transmission) -> Option<MeshEvent> {
        let handle = tx.handle;
        if self.disabled.contains(&handle) {
            return None;
        }
        let incoming = Slot {
            version: tx.version,
            value: tx.value.clone(),
            origin: tx.origin,
        };
        match self.slots.get_mut(&handle) {
            None => {
                self.slots.insert(handle, incoming);
                Some(MeshEvent::NewValue { handle })
            }
            Some(slot) if tx.version > slot.version => {
                *slot = incoming;
                Some(MeshEvent::UpdateValue { handle })
            }
            Some(slot) if tx.version == slot.version && tx.value != slot.value => {
                if tx.origin > slot.origin {
                    *slot = incoming;
                }
                Some(MeshEvent::ConflictingValue { handle })
            }
            Some(_) => None,
        }
    }
}

/// Parameters the mesh is initialised with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshParams {
    pub radio: RadioParams,
    /// Number of value slots; valid handles are `1..=handle_count`.
    pub handle_count: u8,
    /// Minimum interval between transmissions of one handle.
    pub interval: Duration,
}

impl MeshParams {
    /// Default radio settings with the given slot count and interval.
    pub fn new(handle_count: u8, interval: Duration) -> Self {
        Self {
            radio: RadioParams::default(),
            handle_count,
            interval,
        }
    }

    pub fn with_radio(mut self, radio: RadioParams) -> Self {
        self.radio = radio;
        self
    }
}

struct Member {
    addr: DeviceAddr,
    radio: RadioParams,
    slots: Arc<Mutex<SlotTable>>,
    events: mpsc::Sender<MeshEvent>,
}

/// A transmission queued for the radio task, with the settings it goes out on.
type Queued = (RadioParams, Transmission);

/// Hub connecting loopback stores. Cloning shares the same mesh.
#[derive(Clone)]
pub struct LoopbackMesh {
    members: Arc<Mutex<Vec<Member>>>,
    radio_tx: mpsc::UnboundedSender<Queued>,
    params: MeshParams,
}

impl LoopbackMesh {
    /// Create the mesh and spawn its radio task. Must be called inside a
    /// tokio runtime.
    pub fn start(params: MeshParams) -> Self {
        let members = Arc::new(Mutex::new(Vec::new()));
        let (radio_tx, radio_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_radio(Arc::clone(&members), radio_rx, params.interval));
        info!(
            handle_count = params.handle_count,
            interval_ms = params.interval.as_millis() as u64,
            access_addr = %format_args!("{:#010X}", params.radio.access_addr),
            channel = params.radio.channel,
            packet_format = %params.radio.packet_format,
            radio_mode = %params.radio.radio_mode,
            "loopback mesh started"
        );
        Self {
            members,
            radio_tx,
            params,
        }
    }

    /// Join the mesh as `addr` on the mesh's own radio settings. Returns the
    /// node's store and the receiver for its events; `Initialized` is
    /// already queued.
    pub fn join(&self, addr: DeviceAddr) -> (LoopbackStore, mpsc::Receiver<MeshEvent>) {
        self.join_with(addr, self.params.radio)
    }

    /// Join as `addr` tuned to `radio`. The member only exchanges values
    /// with members on identical settings.
    pub fn join_with(
        &self,
        addr: DeviceAddr,
        radio: RadioParams,
    ) -> (LoopbackStore, mpsc::Receiver<MeshEvent>) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let slots = Arc::new(Mutex::new(SlotTable::new()));
        let _ = events_tx.try_send(MeshEvent::Initialized);
        self.members.lock().push(Member {
            addr,
            radio,
            slots: Arc::clone(&slots),
            events: events_tx,
        });
        debug!(%addr, %radio, "joined loopback mesh");
        let store = LoopbackStore {
            addr,
            radio,
            handle_count: self.params.handle_count,
            slots,
            radio_tx: self.radio_tx.clone(),
        };
        (store, events_rx)
    }

    pub fn params(&self) -> MeshParams {
        self.params
    }

    /// Number of members whose event receiver is still open.
    pub fn member_count(&self) -> usize {
        self.members
            .lock()
            .iter()
            .filter(|m| !m.events.is_closed())
            .count()
    }

    pub fn handle_count(&self) -> u8 {
        self.params.handle_count
    }
}

/// A node's store on a [`LoopbackMesh`].
pub struct LoopbackStore {
    addr: DeviceAddr,
    radio: RadioParams,
    handle_count: u8,
    slots: Arc<Mutex<SlotTable>>,
    radio_tx: mpsc::UnboundedSender<Queued>,
}

impl LoopbackStore {
    pub fn addr(&self) -> DeviceAddr {
        self.addr
    }

    pub fn radio(&self) -> RadioParams {
        self.radio
    }

    /// Current version and value held for `handle`.
    pub fn get(&self, handle: Handle) -> Option<(u32, Vec<u8>)> {
        self.slots
            .lock()
            .get(handle)
            .map(|(version, value)| (version, value.to_vec()))
    }

    pub fn is_disabled(&self, handle: Handle) -> bool {
        self.slots.lock().is_disabled(handle)
    }

    fn check_handle(&self, handle: Handle) -> Result<()> {
        if !handle.within(self.handle_count) {
            return Err(MeshpongError::InvalidHandle {
                handle: handle.get(),
                max: self.handle_count,
            });
        }
        Ok(())
    }
}

impl ValueStore for LoopbackStore {
    fn set(&mut self, handle: Handle, value: &[u8]) -> Result<()> {
        self.check_handle(handle)?;
        if value.len() > MAX_VALUE_LENGTH {
            return Err(MeshpongError::ValueTooLong {
                len: value.len(),
                max: MAX_VALUE_LENGTH,
            });
        }
        let tx = self.slots.lock().publish(self.addr, handle, value);
        trace!(handle = %handle, version = tx.version, "queued transmission");
        self.radio_tx
            .send((self.radio, tx))
            .map_err(|_| MeshpongError::StoreClosed)
    }

    fn disable(&mut self, handle: Handle) -> Result<()> {
        self.check_handle(handle)?;
        self.slots.lock().disable(handle);
        trace!(handle = %handle, "handle disabled");
        Ok(())
    }
}

/// Radio loop: collect queued transmissions, deliver them once per interval.
async fn run_radio(
    members: Arc<Mutex<Vec<Member>>>,
    mut radio_rx: mpsc::UnboundedReceiver<Queued>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut pending: BTreeMap<(Handle, DeviceAddr), Queued> = BTreeMap::new();
    let mut open = true;

    loop {
        tokio::select! {
            msg = radio_rx.recv(), if open => match msg {
                Some((radio, tx)) => {
                    pending.insert((tx.handle, tx.origin), (radio, tx));
                }
                None => open = false,
            },
            _ = ticker.tick() => {
                if pending.is_empty() {
                    if !open {
                        break;
                    }
                    continue;
                }
                let batch = std::mem::take(&mut pending);
                deliver(&members, batch.into_values());
            }
        }
    }
    debug!("loopback radio stopped");
}

fn deliver(members: &Mutex<Vec<Member>>, batch: impl Iterator<Item = Queued>) {
    let mut members = members.lock();
    members.retain(|m| !m.events.is_closed());

    for (radio, tx) in batch {
        for member in members.iter() {
            let event = if member.addr == tx.origin {
                Some(MeshEvent::Tx { handle: tx.handle })
            } else if member.radio == radio {
                member.slots.lock().receive(&tx)
            } else {
                None
            };
            if let Some(event) = event {
                if let Err(e) = member.events.try_send(event) {
                    warn!(addr = %member.addr, error = %e, "dropping mesh event");
                }
            }
        }
    }
}
