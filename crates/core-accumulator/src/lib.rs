//! core-accumulator: numeric prefix accumulation and rendering.
//!
//! State machine:
//! * Idle: pending prefix unset, no leading zeroes, nothing emitted.
//! * Accumulating: a prefix value (or a bare minus) is being typed.
//!
//! A plain integer cannot tell `07` from `7`, so zero keypresses typed while
//! the value is unset or zero are counted separately in `leading_zeros` and
//! rendered back in front of the digits. Fragments committed with a decimal
//! separator are remembered in `already_emitted` so the status line can show
//! the whole number while the fractional part is typed.
//!
//! Rendering rule shared by commits and the status line: optional `-`, then
//! the counted leading zeroes (one fewer when the value itself is zero since
//! its own digit supplies one), then the absolute value. A bare minus renders
//! as `-` alone.

use core_events::KeyToken;
use core_layout::{Digit, LayoutMapping};
use tracing::debug;

mod prefix;

pub use prefix::PrefixArg;

/// Delimiter the host inserts after a commit-and-continue.
pub const CONTINUATION_DELIMITER: &str = " ";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslationError {
    #[error("key `{0}` is not mapped to a digit")]
    UnmappedKey(KeyToken),
    #[error("prefix value overflows when appending digit {digit}")]
    Overflow { digit: Digit },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccumulatorOptions {
    pub show_status: bool,
    /// Text shown in front of the status line while a prefix is typed.
    pub prefix_indicator: String,
}

impl Default for AccumulatorOptions {
    fn default() -> Self {
        Self {
            show_status: true,
            prefix_indicator: "C-u ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccumulatorState {
    pending: PrefixArg,
    leading_zeros: usize,
    already_emitted: Vec<String>,
}

impl AccumulatorState {
    pub fn pending(&self) -> PrefixArg {
        self.pending
    }

    pub fn leading_zeros(&self) -> usize {
        self.leading_zeros
    }

    pub fn already_emitted(&self) -> &[String] {
        &self.already_emitted
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_unset() && self.leading_zeros == 0 && self.already_emitted.is_empty()
    }

    fn clear_idle_fields(&mut self) {
        self.leading_zeros = 0;
        self.already_emitted.clear();
    }
}

/// Result of a digit keypress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub digit: Digit,
    pub status: Option<String>,
}

/// What the host should do after inserting a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    /// Leave prefix collection.
    Idle,
    /// Keep collecting a fresh prefix (after commit-and-continue).
    Continue,
    /// Keep collecting the fractional part, starting from zero.
    Fraction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Canonical rendering of the committed value.
    pub rendered: String,
    /// Inserted right after `rendered` (delimiter or decimal separator).
    pub suffix: String,
    pub resume: Resume,
    pub status: Option<String>,
}

impl Commit {
    /// Full text for the host to insert at point.
    pub fn insertion(&self) -> String {
        let mut text = String::with_capacity(self.rendered.len() + self.suffix.len());
        text.push_str(&self.rendered);
        text.push_str(&self.suffix);
        text
    }
}

/// Render a pending value with its counted leading zeroes.
pub fn render_value(pending: PrefixArg, leading_zeros: usize) -> String {
    let mut out = String::new();
    if pending.is_negative() {
        out.push('-');
    }
    let zeros = if pending.is_zero() {
        leading_zeros.saturating_sub(1)
    } else {
        leading_zeros
    };
    out.extend(std::iter::repeat_n('0', zeros));
    if let PrefixArg::Value(n) = pending {
        out.push_str(&n.unsigned_abs().to_string());
    }
    out
}

/// Digit accumulator bound to one layout mapping.
#[derive(Debug, Clone)]
pub struct NumericAccumulator {
    mapping: LayoutMapping,
    options: AccumulatorOptions,
    state: AccumulatorState,
}

impl NumericAccumulator {
    pub fn new(mapping: LayoutMapping, options: AccumulatorOptions) -> Self {
        Self {
            mapping,
            options,
            state: AccumulatorState::default(),
        }
    }

    pub fn mapping(&self) -> &LayoutMapping {
        &self.mapping
    }

    pub fn options(&self) -> &AccumulatorOptions {
        &self.options
    }

    pub fn state(&self) -> &AccumulatorState {
        &self.state
    }

    pub fn pending(&self) -> PrefixArg {
        self.state.pending
    }

    /// Resolve `key` through the mapping and append its digit to the prefix.
    ///
    /// Errors leave the state untouched.
    pub fn translate_keypress(&mut self, key: &KeyToken) -> Result<Translation, TranslationError> {
        let digit = self
            .mapping
            .digit_for(key)
            .ok_or_else(|| TranslationError::UnmappedKey(key.clone()))?;
        let before = self.state.pending;
        let next = before
            .with_digit(digit)
            .ok_or(TranslationError::Overflow { digit })?;

        if before.is_unset() {
            self.state.clear_idle_fields();
        }
        if digit.is_zero() && (before.is_unset() || before.is_zero()) {
            self.state.leading_zeros += 1;
        }
        self.state.pending = next;
        debug!(
            target: "accumulator",
            digit = %digit,
            pending = ?next,
            leading_zeros = self.state.leading_zeros,
            "digit_extend"
        );
        Ok(Translation {
            digit,
            status: self.status_if_enabled(),
        })
    }

    /// Minus key: toggle the sign of the pending prefix.
    pub fn negate(&mut self) -> Option<String> {
        if self.state.pending.is_unset() {
            self.state.clear_idle_fields();
        }
        self.state.pending = self.state.pending.negated();
        debug!(target: "accumulator", pending = ?self.state.pending, "negate");
        self.status_if_enabled()
    }

    /// Render the pending value and return to Idle.
    pub fn commit_and_reset(&mut self) -> String {
        let rendered = render_value(self.state.pending, self.state.leading_zeros);
        debug!(
            target: "accumulator",
            pending = ?self.state.pending,
            leading_zeros = self.state.leading_zeros,
            len = rendered.len(),
            "commit"
        );
        self.state = AccumulatorState::default();
        rendered
    }

    /// Commit, then ask the host to insert a delimiter and keep collecting.
    pub fn commit_and_continue(&mut self) -> Commit {
        let rendered = self.commit_and_reset();
        Commit {
            rendered,
            suffix: CONTINUATION_DELIMITER.to_string(),
            resume: Resume::Continue,
            status: self
                .options
                .show_status
                .then(|| self.options.prefix_indicator.clone()),
        }
    }

    /// Commit the integer part followed by `decimal_text`, then continue
    /// with a zero-valued prefix for the fractional part.
    pub fn commit_with_decimal(&mut self, decimal_text: &str) -> Commit {
        // Earlier fragments of the same number survive the reset.
        let mut emitted = std::mem::take(&mut self.state.already_emitted);
        let rendered = self.commit_and_reset();
        let mut fragment = rendered.clone();
        fragment.push_str(decimal_text);
        emitted.push(fragment);
        self.state.already_emitted = emitted;
        self.state.pending = PrefixArg::Value(0);
        debug!(
            target: "accumulator",
            fragments = self.state.already_emitted.len(),
            "decimal_continue"
        );
        let status = self.options.show_status.then(|| {
            let mut line = self.options.prefix_indicator.clone();
            line.extend(self.state.already_emitted.iter().map(String::as_str));
            line
        });
        Commit {
            rendered,
            suffix: decimal_text.to_string(),
            resume: Resume::Fraction,
            status,
        }
    }

    /// Current status line, `None` when status display is off.
    pub fn status(&self) -> Option<String> {
        self.status_if_enabled()
    }

    /// Drop any pending input and return to Idle.
    pub fn cancel(&mut self) {
        if !self.state.is_idle() {
            debug!(target: "accumulator", pending = ?self.state.pending, "cancel");
        }
        self.state = AccumulatorState::default();
    }

    fn status_line(&self) -> String {
        let mut line = self.options.prefix_indicator.clone();
        line.extend(self.state.already_emitted.iter().map(String::as_str));
        line.push_str(&render_value(self.state.pending, self.state.leading_zeros));
        line
    }

    fn status_if_enabled(&self) -> Option<String> {
        self.options.show_status.then(|| self.status_line())
    }
}
