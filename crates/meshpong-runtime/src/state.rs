use meshpong_core::{DeviceAddr, Handle, Payload};

/// Which handles the node reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    /// Not configured yet; the node reacts to nothing.
    #[default]
    Unset,
    /// Wildcard: every handle.
    All,
    Handle(Handle),
}

impl Filter {
    pub fn matches(&self, handle: Handle) -> bool {
        match self {
            Filter::Unset => false,
            Filter::All => true,
            Filter::Handle(h) => *h == handle,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Filter::All)
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::Unset => f.write_str("unset"),
            Filter::All => f.write_str("all"),
            Filter::Handle(h) => write!(f, "{h}"),
        }
    }
}

/// The node's interest filter and the payload it publishes.
///
/// The filter changes only when a command is accepted and the payload
/// counter only inside a reaction; both mutators are crate-private. The
/// address bytes are written once here and never again.
#[derive(Debug, Clone)]
pub struct ResponderState {
    filter: Filter,
    payload: Payload,
}

impl ResponderState {
    pub fn new(addr: DeviceAddr) -> Self {
        Self {
            filter: Filter::Unset,
            payload: Payload::new(addr),
        }
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn counter(&self) -> u8 {
        self.payload.counter()
    }

    pub(crate) fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub(crate) fn bump_counter(&mut self) -> u8 {
        self.payload.bump()
    }
}
