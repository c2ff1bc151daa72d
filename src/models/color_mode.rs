//! Color-mode descriptors.
//!
//! A color mode names the four density channels a densitometer reads and
//! maps each channel letter to a fixed positional slot (`a`..`d`) of the
//! curve store. The two supported modes are process-wide constants looked
//! up by name through [`ColorChannelSet::get`].

use std::fmt;

/// Positional slot keys, in slot order.
pub const SLOT_KEYS: [&str; 4] = ["a", "b", "c", "d"];

/// Canonical ordering of every channel letter across modes.
pub const CHANNEL_ORDER: [&str; 7] = ["v", "r", "g", "b", "c", "m", "y"];

/// Neutral (visual) channel, excluded from gamma statistics by convention.
pub const NEUTRAL_CHANNEL: &str = "v";

/// Immutable descriptor for one color mode.
#[derive(Debug, PartialEq, Eq)]
pub struct ColorChannelSet {
    name: &'static str,
    channels: [&'static str; 4],
    color_names: [&'static str; 4],
}

/// Visual + red, green, blue
pub static VRGB: ColorChannelSet = ColorChannelSet {
    name: "vrgb",
    channels: ["v", "r", "g", "b"],
    color_names: ["grey", "red", "green", "blue"],
};

/// Visual + cyan, magenta, yellow
pub static VCMY: ColorChannelSet = ColorChannelSet {
    name: "vcmy",
    channels: ["v", "c", "m", "y"],
    color_names: ["grey", "cyan", "magenta", "yellow"],
};

static COLOR_MODES: [&ColorChannelSet; 2] = [&VRGB, &VCMY];

impl ColorChannelSet {
    /// Look up a mode by name (`"vrgb"` or `"vcmy"`).
    pub fn get(mode: &str) -> Option<&'static ColorChannelSet> {
        COLOR_MODES.iter().copied().find(|set| set.name == mode)
    }

    /// All supported modes.
    pub fn all() -> &'static [&'static ColorChannelSet] {
        &COLOR_MODES
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Channel letters in slot order.
    pub fn channels(&self) -> &[&'static str] {
        &self.channels
    }

    /// Display name of a channel, or the letter itself if the mode lacks it.
    pub fn name_of<'a>(&self, letter: &'a str) -> &'a str {
        self.index_of(letter)
            .map(|i| self.color_names[i])
            .unwrap_or(letter)
    }

    /// Slot key of a channel letter, or `""` if the mode lacks it.
    pub fn slot_of(&self, letter: &str) -> &'static str {
        self.index_of(letter).map(|i| SLOT_KEYS[i]).unwrap_or("")
    }

    /// Channel letter stored in a slot, or `""` for an unknown slot.
    pub fn letter_of(&self, slot: &str) -> &'static str {
        SLOT_KEYS
            .iter()
            .position(|s| *s == slot)
            .map(|i| self.channels[i])
            .unwrap_or("")
    }

    pub fn contains(&self, letter: &str) -> bool {
        self.index_of(letter).is_some()
    }

    /// Slots of the non-neutral channels, the default gamma selection.
    pub fn gamma_slots(&self) -> Vec<&'static str> {
        self.channels
            .iter()
            .zip(SLOT_KEYS)
            .filter(|(letter, _)| **letter != NEUTRAL_CHANNEL)
            .map(|(_, slot)| slot)
            .collect()
    }

    fn index_of(&self, letter: &str) -> Option<usize> {
        self.channels.iter().position(|c| *c == letter)
    }
}

impl fmt::Display for ColorChannelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Sort key of a channel letter in [`CHANNEL_ORDER`], case-insensitive.
/// Unknown letters sort last.
pub fn channel_rank(letter: &str) -> usize {
    let lower = letter.to_lowercase();
    CHANNEL_ORDER
        .iter()
        .position(|c| *c == lower)
        .unwrap_or(CHANNEL_ORDER.len())
}
