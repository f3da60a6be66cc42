//! core-keymap: explicit binding registry for prefix collection.
//!
//! Instead of mutating a global keymap, callers own a [`KeymapRegistry`] and
//! `install` fully resolved [`KeymapSettings`] into it. Each installation
//! gets its own [`BindingTable`] and [`NumericAccumulator`], so several can
//! coexist and each is torn down by disposing its [`InstallHandle`].
//!
//! Dispatch contract:
//! * digit keys: resolved through the layout mapping into the accumulator.
//! * role keys (negate / commit / continue / decimal): call the matching
//!   accumulator operation and hand rendered text back to the host.
//! * any other key: cancels accumulation (state returns to Idle) and is
//!   passed through with the prefix value it interrupted.

use core_accumulator::{
    AccumulatorOptions, Commit, NumericAccumulator, PrefixArg, Resume, TranslationError,
};
use core_events::KeyToken;
use core_layout::{ConfigError, DigitOrderSpec, LayoutSpec, LayoutWarning, resolve};
use std::collections::BTreeMap;
use tracing::{debug, info};

mod bindings;

pub use bindings::{Binding, BindingTable, Resolution};

// -------------------------------------------------------------------------------------------------
// Settings
// -------------------------------------------------------------------------------------------------
/// Fully resolved configuration for one installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeymapSettings {
    pub layout: LayoutSpec,
    pub digit_order: DigitOrderSpec,
    /// Promote layout warnings to errors.
    pub strict_layout: bool,
    pub show_status: bool,
    pub prefix_indicator: String,
    pub negate_keys: Vec<KeyToken>,
    pub commit_keys: Vec<KeyToken>,
    pub commit_and_continue_keys: Vec<KeyToken>,
    pub decimal_keys: Vec<KeyToken>,
    pub decimal_text: String,
}

impl Default for KeymapSettings {
    fn default() -> Self {
        let options = AccumulatorOptions::default();
        Self {
            layout: LayoutSpec::default(),
            digit_order: DigitOrderSpec::default(),
            strict_layout: false,
            show_status: options.show_status,
            prefix_indicator: options.prefix_indicator,
            negate_keys: vec![KeyToken::Char('-')],
            commit_keys: Vec::new(),
            commit_and_continue_keys: Vec::new(),
            decimal_keys: Vec::new(),
            decimal_text: ".".to_string(),
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Dispatch results
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Still collecting; `status` is the text to display, if enabled.
    Pending { status: Option<String> },
    /// Text is ready for insertion; `Commit::resume` says whether to keep
    /// collecting.
    Committed(Commit),
    /// Key is not bound. Accumulation was cancelled; `prefix` is the value
    /// that was pending when the key arrived.
    Passthrough { key: KeyToken, prefix: PrefixArg },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("no installation with id {0}")]
    UnknownHandle(u64),
    #[error(transparent)]
    Translation(#[from] TranslationError),
}

// -------------------------------------------------------------------------------------------------
// Registry
// -------------------------------------------------------------------------------------------------
/// Token for one installation. Not `Clone`: disposing consumes it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct InstallHandle {
    id: u64,
}

impl InstallHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remove the installation's bindings and state. Returns `false` when it
    /// was already gone.
    pub fn dispose(self, registry: &mut KeymapRegistry) -> bool {
        registry.uninstall(self.id)
    }
}

#[derive(Debug)]
struct Installation {
    table: BindingTable,
    accumulator: NumericAccumulator,
    decimal_text: String,
    warnings: Vec<LayoutWarning>,
}

#[derive(Debug, Default)]
pub struct KeymapRegistry {
    next_id: u64,
    installs: BTreeMap<u64, Installation>,
}

impl KeymapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `settings` and register its bindings. Nothing is installed
    /// when an error is returned.
    pub fn install(&mut self, settings: &KeymapSettings) -> Result<InstallHandle, ConfigError> {
        let resolved = resolve(&settings.layout, &settings.digit_order, settings.strict_layout)?;
        let table = BindingTable::build(
            &resolved.mapping,
            &[
                (Binding::Negate, settings.negate_keys.as_slice()),
                (Binding::Commit, settings.commit_keys.as_slice()),
                (
                    Binding::CommitAndContinue,
                    settings.commit_and_continue_keys.as_slice(),
                ),
                (Binding::CommitWithDecimal, settings.decimal_keys.as_slice()),
            ],
        )?;
        let accumulator = NumericAccumulator::new(
            resolved.mapping,
            AccumulatorOptions {
                show_status: settings.show_status,
                prefix_indicator: settings.prefix_indicator.clone(),
            },
        );

        let id = self.next_id;
        self.next_id += 1;
        info!(
            target: "keymap.registry",
            id,
            bindings = table.len(),
            warnings = resolved.warnings.len(),
            "install"
        );
        self.installs.insert(
            id,
            Installation {
                table,
                accumulator,
                decimal_text: settings.decimal_text.clone(),
                warnings: resolved.warnings,
            },
        );
        Ok(InstallHandle { id })
    }

    fn uninstall(&mut self, id: u64) -> bool {
        let removed = self.installs.remove(&id).is_some();
        info!(target: "keymap.registry", id, removed, "dispose");
        removed
    }

    pub fn is_installed(&self, handle: &InstallHandle) -> bool {
        self.installs.contains_key(&handle.id)
    }

    pub fn len(&self) -> usize {
        self.installs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installs.is_empty()
    }

    pub fn accumulator(&self, handle: &InstallHandle) -> Option<&NumericAccumulator> {
        self.installs.get(&handle.id).map(|i| &i.accumulator)
    }

    pub fn bindings(&self, handle: &InstallHandle) -> Option<&BindingTable> {
        self.installs.get(&handle.id).map(|i| &i.table)
    }

    pub fn warnings(&self, handle: &InstallHandle) -> &[LayoutWarning] {
        self.installs
            .get(&handle.id)
            .map(|i| i.warnings.as_slice())
            .unwrap_or(&[])
    }

    /// Drop pending input for `handle` (explicit cancel).
    pub fn cancel(&mut self, handle: &InstallHandle) -> Result<(), DispatchError> {
        self.get_mut(handle)?.accumulator.cancel();
        Ok(())
    }

    /// Route one key through `handle`'s bindings.
    pub fn dispatch(
        &mut self,
        handle: &InstallHandle,
        key: &KeyToken,
    ) -> Result<Outcome, DispatchError> {
        let install = self.get_mut(handle)?;
        let acc = &mut install.accumulator;
        let outcome = match install.table.resolve(key) {
            Resolution::Bound(Binding::Digit) => Outcome::Pending {
                status: acc.translate_keypress(key)?.status,
            },
            Resolution::Bound(Binding::Negate) => Outcome::Pending {
                status: acc.negate(),
            },
            Resolution::Bound(Binding::Commit) => {
                let rendered = acc.commit_and_reset();
                Outcome::Committed(Commit {
                    rendered,
                    suffix: String::new(),
                    resume: Resume::Idle,
                    status: None,
                })
            }
            Resolution::Bound(Binding::CommitAndContinue) => {
                Outcome::Committed(acc.commit_and_continue())
            }
            Resolution::Bound(Binding::CommitWithDecimal) => {
                Outcome::Committed(acc.commit_with_decimal(&install.decimal_text))
            }
            Resolution::Unbound => {
                let prefix = acc.pending();
                acc.cancel();
                Outcome::Passthrough {
                    key: key.clone(),
                    prefix,
                }
            }
        };
        debug!(
            target: "keymap.dispatch",
            id = handle.id,
            key = %key,
            outcome = outcome.kind(),
            "dispatch"
        );
        Ok(outcome)
    }

    fn get_mut(&mut self, handle: &InstallHandle) -> Result<&mut Installation, DispatchError> {
        self.installs
            .get_mut(&handle.id)
            .ok_or(DispatchError::UnknownHandle(handle.id))
    }
}

impl Outcome {
    fn kind(&self) -> &'static str {
        match self {
            Outcome::Pending { .. } => "pending",
            Outcome::Committed(_) => "committed",
            Outcome::Passthrough { .. } => "passthrough",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_layout::{DigitOrder, LayoutPreset};
    use pretty_assertions::assert_eq;

    fn k(name: &str) -> KeyToken {
        KeyToken::parse(name).unwrap()
    }

    fn settings() -> KeymapSettings {
        KeymapSettings {
            commit_keys: vec![k("RET")],
            commit_and_continue_keys: vec![k("SPC")],
            decimal_keys: vec![k(".")],
            ..KeymapSettings::default()
        }
    }

    fn feed(reg: &mut KeymapRegistry, handle: &InstallHandle, keys: &[&str]) -> Vec<Outcome> {
        keys.iter()
            .map(|name| reg.dispatch(handle, &k(name)).unwrap())
            .collect()
    }

    fn inserted(outcomes: &[Outcome]) -> String {
        outcomes
            .iter()
            .filter_map(|o| match o {
                Outcome::Committed(c) => Some(c.insertion()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn digits_then_commit() {
        let mut reg = KeymapRegistry::new();
        let h = reg.install(&settings()).unwrap();
        let out = feed(&mut reg, &h, &["a", "s", "d", "RET"]);
        assert_eq!(
            out[2],
            Outcome::Pending {
                status: Some("C-u 123".to_string())
            }
        );
        assert_eq!(inserted(&out), "123");
        match &out[3] {
            Outcome::Committed(c) => assert_eq!(c.resume, Resume::Idle),
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[test]
    fn continue_and_decimal_sequences() {
        let mut reg = KeymapRegistry::new();
        let h = reg.install(&settings()).unwrap();
        let out = feed(&mut reg, &h, &["a", "s", ".", "g", "SPC", "-", "f", "RET"]);
        assert_eq!(inserted(&out), "12.5 -4");
        assert_eq!(
            out[3],
            Outcome::Pending {
                status: Some("C-u 12.5".to_string())
            }
        );
    }

    #[test]
    fn unbound_key_cancels_and_passes_through() {
        let mut reg = KeymapRegistry::new();
        let h = reg.install(&settings()).unwrap();
        feed(&mut reg, &h, &["f", "a"]);
        let out = reg.dispatch(&h, &k("x")).unwrap();
        assert_eq!(
            out,
            Outcome::Passthrough {
                key: k("x"),
                prefix: PrefixArg::Value(41)
            }
        );
        assert!(reg.accumulator(&h).unwrap().state().is_idle());
    }

    #[test]
    fn installations_are_independent() {
        let mut reg = KeymapRegistry::new();
        let qwerty = reg.install(&settings()).unwrap();
        let dvorak = reg
            .install(&KeymapSettings {
                layout: LayoutSpec::Preset(LayoutPreset::Dvorak),
                digit_order: DigitOrderSpec::Preset(DigitOrder::ZeroFirst),
                ..settings()
            })
            .unwrap();
        assert_ne!(qwerty.id(), dvorak.id());
        feed(&mut reg, &qwerty, &["s"]);
        feed(&mut reg, &dvorak, &["o", "e"]);
        assert_eq!(reg.accumulator(&qwerty).unwrap().pending(), PrefixArg::Value(2));
        assert_eq!(reg.accumulator(&dvorak).unwrap().pending(), PrefixArg::Value(12));
    }

    #[test]
    fn dispose_removes_bindings() {
        let mut reg = KeymapRegistry::new();
        let h = reg.install(&settings()).unwrap();
        let id = h.id();
        let stale = InstallHandle { id };
        assert!(reg.is_installed(&stale));
        assert!(h.dispose(&mut reg));
        assert!(reg.is_empty());
        assert_eq!(
            reg.dispatch(&stale, &k("a")),
            Err(DispatchError::UnknownHandle(id))
        );
        assert!(!stale.dispose(&mut reg));
    }

    #[test]
    fn conflicting_roles_install_nothing() {
        let mut reg = KeymapRegistry::new();
        let err = reg
            .install(&KeymapSettings {
                commit_keys: vec![k("a")],
                ..settings()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingBinding { .. }));
        assert!(reg.is_empty());
    }

    #[test]
    fn numpad_warning_is_kept_per_installation() {
        let mut reg = KeymapRegistry::new();
        let h = reg
            .install(&KeymapSettings {
                layout: LayoutSpec::Preset(LayoutPreset::Numpad),
                digit_order: DigitOrderSpec::Preset(DigitOrder::ZeroFirst),
                commit_and_continue_keys: Vec::new(),
                ..settings()
            })
            .unwrap();
        assert_eq!(reg.warnings(&h).len(), 1);
    }

    #[test]
    fn cancel_resets_pending_input() {
        let mut reg = KeymapRegistry::new();
        let h = reg.install(&settings()).unwrap();
        feed(&mut reg, &h, &["j"]);
        reg.cancel(&h).unwrap();
        assert!(reg.accumulator(&h).unwrap().state().is_idle());
    }
}
