//! A value store that records calls instead of transmitting.

use meshpong_core::{Handle, MeshpongError, Result};

use crate::store::ValueStore;

/// One call made against a [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Set { handle: Handle, value: Vec<u8> },
    Disable { handle: Handle },
}

/// Records every `set` and `disable` in order.
///
/// # Example
/// ```
/// use meshpong_core::Handle;
/// use meshpong_mesh::{RecordingStore, ValueStore};
///
/// let mut store = RecordingStore::new();
/// store.set(Handle::new(3).unwrap(), b"hi").unwrap();
/// assert_eq!(store.sets().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RecordingStore {
    calls: Vec<StoreCall>,
    fail_on: Option<Handle>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call touching `handle` fail with a store error.
    pub fn failing_on(mut self, handle: Handle) -> Self {
        self.fail_on = Some(handle);
        self
    }

    /// All calls, oldest first.
    pub fn calls(&self) -> &[StoreCall] {
        &self.calls
    }

    /// `(handle, value)` of every `set`, oldest first.
    pub fn sets(&self) -> Vec<(Handle, &[u8])> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                StoreCall::Set { handle, value } => Some((*handle, value.as_slice())),
                StoreCall::Disable { .. } => None,
            })
            .collect()
    }

    /// Handles passed to `disable`, oldest first.
    pub fn disables(&self) -> Vec<Handle> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                StoreCall::Disable { handle } => Some(*handle),
                StoreCall::Set { .. } => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    fn check(&self, handle: Handle) -> Result<()> {
        if self.fail_on == Some(handle) {
            return Err(MeshpongError::Store {
                handle: handle.get(),
                reason: "injected failure".into(),
            });
        }
        Ok(())
    }
}

impl ValueStore for RecordingStore {
    fn set(&mut self, handle: Handle, value: &[u8]) -> Result<()> {
        self.check(handle)?;
        self.calls.push(StoreCall::Set {
            handle,
            value: value.to_vec(),
        });
        Ok(())
    }

    fn disable(&mut self, handle: Handle) -> Result<()> {
        self.check(handle)?;
        self.calls.push(StoreCall::Disable { handle });
        Ok(())
    }
}
