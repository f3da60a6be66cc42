//! Named key layouts and digit orderings.

use core_events::KeyToken;
use std::fmt;
use std::str::FromStr;

use crate::ConfigError;

/// Home-row (and numpad-substitute) key sets, listed left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutPreset {
    Qwerty,
    Dvorak,
    Colemak,
    ColemakDh,
    Workman,
    Norman,
    Qwertz,
    Azerty,
    /// Right-hand cluster arranged like a keypad: `m , .` / `j k l` / `u i o`,
    /// with the space bar standing in for the zero key.
    Numpad,
    /// Left-hand keypad cluster: `z x c` / `a s d` / `q w e` plus space.
    NumpadLeft,
}

impl LayoutPreset {
    pub const ALL: [LayoutPreset; 10] = [
        LayoutPreset::Qwerty,
        LayoutPreset::Dvorak,
        LayoutPreset::Colemak,
        LayoutPreset::ColemakDh,
        LayoutPreset::Workman,
        LayoutPreset::Norman,
        LayoutPreset::Qwertz,
        LayoutPreset::Azerty,
        LayoutPreset::Numpad,
        LayoutPreset::NumpadLeft,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayoutPreset::Qwerty => "qwerty",
            LayoutPreset::Dvorak => "dvorak",
            LayoutPreset::Colemak => "colemak",
            LayoutPreset::ColemakDh => "colemak-dh",
            LayoutPreset::Workman => "workman",
            LayoutPreset::Norman => "norman",
            LayoutPreset::Qwertz => "qwertz",
            LayoutPreset::Azerty => "azerty",
            LayoutPreset::Numpad => "numpad",
            LayoutPreset::NumpadLeft => "numpad-left",
        }
    }

    fn key_chars(self) -> &'static str {
        match self {
            LayoutPreset::Qwerty => "asdfghjkl;",
            LayoutPreset::Dvorak => "aoeuidhtns",
            LayoutPreset::Colemak => "arstdhneio",
            LayoutPreset::ColemakDh => "arstgmneio",
            LayoutPreset::Workman => "ashtgyneoi",
            LayoutPreset::Norman => "asetgynioh",
            LayoutPreset::Qwertz => "asdfghjklö",
            LayoutPreset::Azerty => "qsdfghjklm",
            LayoutPreset::Numpad => "m,.jkluio ",
            LayoutPreset::NumpadLeft => "zxcasdqwe ",
        }
    }

    pub fn keys(self) -> Vec<KeyToken> {
        self.key_chars().chars().map(KeyToken::Char).collect()
    }

    /// Numpad presets assume the traditional digit order lines up with the
    /// visual keypad grid.
    pub fn is_numpad(self) -> bool {
        matches!(self, LayoutPreset::Numpad | LayoutPreset::NumpadLeft)
    }
}

impl fmt::Display for LayoutPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        LayoutPreset::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownLayout(s.to_string()))
    }
}

/// Named digit orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DigitOrder {
    /// `1 2 3 4 5 6 7 8 9 0`, matching the number row.
    #[default]
    Traditional,
    /// `0 1 2 3 4 5 6 7 8 9`.
    ZeroFirst,
    /// The number row of Programmer Dvorak: `7 5 3 1 9 0 2 4 6 8`.
    ProgrammerDvorak,
}

impl DigitOrder {
    pub const ALL: [DigitOrder; 3] = [
        DigitOrder::Traditional,
        DigitOrder::ZeroFirst,
        DigitOrder::ProgrammerDvorak,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DigitOrder::Traditional => "traditional",
            DigitOrder::ZeroFirst => "zero-first",
            DigitOrder::ProgrammerDvorak => "programmer-dvorak",
        }
    }

    pub fn digit_chars(self) -> &'static str {
        match self {
            DigitOrder::Traditional => "1234567890",
            DigitOrder::ZeroFirst => "0123456789",
            DigitOrder::ProgrammerDvorak => "7531902468",
        }
    }
}

impl fmt::Display for DigitOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigitOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        DigitOrder::ALL
            .into_iter()
            .find(|o| o.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownDigitOrder(s.to_string()))
    }
}
