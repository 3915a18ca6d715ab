//! Edge color masks assigning segments to distance field channels.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Subset of the red, green and blue channels a segment contributes to.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct EdgeColor: u8 {
        const RED = 0b001;
        const GREEN = 0b010;
        const BLUE = 0b100;
        const YELLOW = Self::RED.bits() | Self::GREEN.bits();
        const MAGENTA = Self::RED.bits() | Self::BLUE.bits();
        const CYAN = Self::GREEN.bits() | Self::BLUE.bits();
        const WHITE = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits();
    }
}

impl EdgeColor {
    /// No channel at all.
    pub const BLACK: Self = Self::empty();

    /// Two-channel starting colors used by the coloring pass.
    pub(crate) const PRIMARY_PAIRS: [Self; 3] = [Self::CYAN, Self::MAGENTA, Self::YELLOW];

    /// Number of channels in the mask.
    pub fn channel_count(self) -> u32 {
        self.bits().count_ones()
    }

    /// Channel mask for a channel index (0 = red, 1 = green, 2 = blue).
    pub(crate) fn channel(index: usize) -> Self {
        Self::from_bits_truncate(1 << index)
    }

    /// Channels shared with `other` form at most one channel, marking a corner between them.
    pub fn is_corner_with(self, other: Self) -> bool {
        (self & other).channel_count() <= 1
    }
}

impl Default for EdgeColor {
    fn default() -> Self {
        Self::WHITE
    }
}
