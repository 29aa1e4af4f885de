use tracing::trace;

/// A visible "I reacted" signal.
pub trait Indicator: Send {
    fn toggle(&mut self);
}

/// Software stand-in for the board's activity LED.
#[derive(Debug, Default)]
pub struct LedIndicator {
    lit: bool,
    toggles: u64,
}

impl LedIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Number of toggles since start.
    pub fn toggles(&self) -> u64 {
        self.toggles
    }
}

impl Indicator for LedIndicator {
    fn toggle(&mut self) {
        self.lit = !self.lit;
        self.toggles += 1;
        trace!(lit = self.lit, "activity led toggled");
    }
}
