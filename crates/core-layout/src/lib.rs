//! core-layout: resolves a layout choice and a digit ordering into a
//! validated [`LayoutMapping`].
//!
//! Resolution is pure. The only side channel is logging: a numpad preset
//! combined with a non-traditional digit order is reported through
//! `tracing::warn!` (target `layout.resolve`) and returned to the caller as
//! a [`LayoutWarning`] so the host can display it as well.

use core_events::{KeyParseError, KeyToken};
use std::fmt;
use tracing::{debug, warn};

mod mapping;
mod presets;

pub use mapping::{Digit, LayoutMapping};
pub use presets::{DigitOrder, LayoutPreset};

// -------------------------------------------------------------------------------------------------
// Errors
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("layout has {keys} keys but digit order has {digits} digits")]
    LengthMismatch { keys: usize, digits: usize },
    #[error("key `{0}` appears more than once in the layout")]
    DuplicateKey(KeyToken),
    #[error("`{0}` is not a decimal digit")]
    InvalidDigit(char),
    #[error("layout must map at least one key")]
    EmptyMapping,
    #[error("unknown layout preset `{0}`")]
    UnknownLayout(String),
    #[error("unknown digit order `{0}`")]
    UnknownDigitOrder(String),
    #[error("layout `{layout}` expects the traditional digit order")]
    NumpadDigitOrder { layout: LayoutPreset },
    #[error("key `{key}` is bound both as {first} and as {second}")]
    ConflictingBinding {
        key: KeyToken,
        first: &'static str,
        second: &'static str,
    },
    #[error(transparent)]
    Key(#[from] KeyParseError),
}

/// Non-fatal resolution findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutWarning {
    /// A numpad preset was paired with a digit order other than the
    /// traditional one, so keys no longer match the keypad picture.
    NumpadDigitOrder { layout: LayoutPreset, digits: String },
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutWarning::NumpadDigitOrder { layout, digits } => write!(
                f,
                "layout `{layout}` is meant for the traditional digit order; using `{digits}` anyway"
            ),
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Specs
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutSpec {
    Preset(LayoutPreset),
    Keys(Vec<KeyToken>),
}

impl Default for LayoutSpec {
    fn default() -> Self {
        LayoutSpec::Preset(LayoutPreset::Qwerty)
    }
}

impl LayoutSpec {
    pub fn keys(&self) -> Vec<KeyToken> {
        match self {
            LayoutSpec::Preset(preset) => preset.keys(),
            LayoutSpec::Keys(keys) => keys.clone(),
        }
    }

    fn numpad_preset(&self) -> Option<LayoutPreset> {
        match self {
            LayoutSpec::Preset(preset) if preset.is_numpad() => Some(*preset),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigitOrderSpec {
    Preset(DigitOrder),
    Digits(Vec<char>),
}

impl Default for DigitOrderSpec {
    fn default() -> Self {
        DigitOrderSpec::Preset(DigitOrder::Traditional)
    }
}

impl DigitOrderSpec {
    pub fn digits(&self) -> Vec<char> {
        match self {
            DigitOrderSpec::Preset(order) => order.digit_chars().chars().collect(),
            DigitOrderSpec::Digits(digits) => digits.clone(),
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Resolution
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone)]
pub struct ResolvedLayout {
    pub mapping: LayoutMapping,
    pub warnings: Vec<LayoutWarning>,
}

/// Build the key-to-digit mapping for `layout` and `order`.
///
/// With `strict` set, warnings are promoted to errors and no mapping is
/// produced.
pub fn resolve(
    layout: &LayoutSpec,
    order: &DigitOrderSpec,
    strict: bool,
) -> Result<ResolvedLayout, ConfigError> {
    let digits = order.digits();
    let mapping = LayoutMapping::from_chars(layout.keys(), &digits)?;
    let mut warnings = Vec::new();

    if let Some(preset) = layout.numpad_preset() {
        let traditional = DigitOrder::Traditional.digit_chars();
        if !digits.iter().copied().eq(traditional.chars()) {
            if strict {
                return Err(ConfigError::NumpadDigitOrder { layout: preset });
            }
            let digits: String = digits.iter().collect();
            warn!(
                target: "layout.resolve",
                layout = preset.name(),
                digits = digits.as_str(),
                "numpad_digit_order_override"
            );
            warnings.push(LayoutWarning::NumpadDigitOrder {
                layout: preset,
                digits,
            });
        }
    }

    debug!(
        target: "layout.resolve",
        keys = mapping.len(),
        warnings = warnings.len(),
        "layout_resolved"
    );
    Ok(ResolvedLayout { mapping, warnings })
}
