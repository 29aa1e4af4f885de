use meshpong_core::{Handle, Result};

/// Handle-addressed value storage synchronized across the mesh.
///
/// Calls never block: implementations queue work for the radio and return.
/// Value-change notices flow back to the node as [`meshpong_core::MeshEvent`]s
/// on a separate channel.
pub trait ValueStore: Send {
    /// Publish `value` under `handle`. Re-enables a disabled handle.
    fn set(&mut self, handle: Handle, value: &[u8]) -> Result<()>;

    /// Stop synchronizing `handle` for this node.
    fn disable(&mut self, handle: Handle) -> Result<()>;
}

impl<S: ValueStore + ?Sized> ValueStore for Box<S> {
    fn set(&mut self, handle: Handle, value: &[u8]) -> Result<()> {
        (**self).set(handle, value)
    }

    fn disable(&mut self, handle: Handle) -> Result<()> {
        (**self).disable(handle)
    }
}
