use core_events::KeyToken;
use smallvec::SmallVec;
use std::fmt;

use crate::ConfigError;

/// A single decimal digit, `0..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digit(u8);

impl Digit {
    pub const ZERO: Digit = Digit(0);

    pub fn new(value: u8) -> Option<Self> {
        (value <= 9).then_some(Digit(value))
    }

    pub fn from_char(c: char) -> Option<Self> {
        c.to_digit(10).map(|d| Digit(d as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn as_char(self) -> char {
        (b'0' + self.0) as char
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<char> for Digit {
    type Error = ConfigError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Digit::from_char(c).ok_or(ConfigError::InvalidDigit(c))
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable one-to-one pairing of input keys to digits.
///
/// Invariants: keys and digits have equal length, no key appears twice and
/// the mapping is never empty. Order is the configuration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutMapping {
    entries: SmallVec<[(KeyToken, Digit); 10]>,
}

impl LayoutMapping {
    pub fn new(keys: Vec<KeyToken>, digits: Vec<Digit>) -> Result<Self, ConfigError> {
        if keys.len() != digits.len() {
            return Err(ConfigError::LengthMismatch {
                keys: keys.len(),
                digits: digits.len(),
            });
        }
        if keys.is_empty() {
            return Err(ConfigError::EmptyMapping);
        }
        let mut entries: SmallVec<[(KeyToken, Digit); 10]> = SmallVec::with_capacity(keys.len());
        for (key, digit) in keys.into_iter().zip(digits) {
            if entries.iter().any(|(k, _)| *k == key) {
                return Err(ConfigError::DuplicateKey(key));
            }
            entries.push((key, digit));
        }
        Ok(Self { entries })
    }

    /// Convenience constructor from raw digit characters.
    pub fn from_chars(keys: Vec<KeyToken>, digits: &[char]) -> Result<Self, ConfigError> {
        let digits = digits
            .iter()
            .map(|&c| Digit::try_from(c))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(keys, digits)
    }

    pub fn digit_for(&self, key: &KeyToken) -> Option<Digit> {
        self.entries
            .iter()
            .find_map(|(k, d)| (k == key).then_some(*d))
    }

    pub fn contains_key(&self, key: &KeyToken) -> bool {
        self.digit_for(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &KeyToken> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn digits(&self) -> impl Iterator<Item = Digit> + '_ {
        self.entries.iter().map(|(_, d)| *d)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&KeyToken, Digit)> {
        self.entries.iter().map(|(k, d)| (k, *d))
    }
}
