//! # meshpong-mesh
//!
//! The value store seam the responder talks to, plus two implementations:
//!
//! - [`LoopbackMesh`] connects several stores inside one process so nodes can
//!   ping-pong values without a radio. Transmissions are paced by the mesh
//!   interval and arbitrated by a per-slot version.
//! - [`RecordingStore`] records every call, for tests.

pub mod loopback;
pub mod recording;
pub mod store;

pub use loopback::{LoopbackMesh, LoopbackStore, MeshParams, SlotTable, Transmission};
pub use recording::{RecordingStore, StoreCall};
pub use store::ValueStore;
