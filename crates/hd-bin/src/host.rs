//! Minimal editor host driving the binding registry.
//!
//! Normal mode self-inserts printable keys into an in-memory document. A
//! prefix key switches to prefix mode, where every key goes through the
//! registry: digits accumulate, commit keys insert rendered text, and any
//! unbound key leaves prefix mode and self-inserts as many times as the
//! prefix says (Emacs style `C-u 3 x` inserts `xxx`).

use core_accumulator::{PrefixArg, Resume};
use core_events::{KeyToken, ModMask, NamedKey};
use core_keymap::{InstallHandle, KeymapRegistry, KeymapSettings, Outcome};
use core_layout::ConfigError;
use tracing::{debug, info, warn};

/// Upper bound for prefix-repeated self-insertion.
pub const MAX_REPEAT: i64 = 10_000;

const TOGGLE_KEY: KeyToken = KeyToken::Named(NamedKey::F(2));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Prefix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    Continue,
    Quit,
}

pub struct Host {
    registry: KeymapRegistry,
    handle: Option<InstallHandle>,
    settings: KeymapSettings,
    prefix_keys: Vec<KeyToken>,
    mode: Mode,
    document: String,
    status: Option<String>,
    message: Option<String>,
}

/// How many times an unbound key self-inserts after `prefix`.
pub fn repeat_count(prefix: PrefixArg) -> usize {
    prefix.numeric_value().clamp(0, MAX_REPEAT) as usize
}

impl Host {
    pub fn new(settings: KeymapSettings, prefix_keys: Vec<KeyToken>) -> Result<Self, ConfigError> {
        let mut host = Self {
            registry: KeymapRegistry::new(),
            handle: None,
            settings,
            prefix_keys,
            mode: Mode::Normal,
            document: String::new(),
            status: None,
            message: None,
        };
        host.enable()?;
        Ok(host)
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    #[cfg(test)]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_enabled(&self) -> bool {
        self.handle.is_some()
    }

    /// Line shown at the bottom of the screen.
    pub fn status_line(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        match self.mode {
            Mode::Prefix => self.status.clone().unwrap_or_default(),
            Mode::Normal => {
                let prefix = self
                    .prefix_keys
                    .first()
                    .map_or_else(|| "-".to_string(), ToString::to_string);
                let state = if self.is_enabled() { "on" } else { "off" };
                format!("{prefix}: number prefix ({state})  {TOGGLE_KEY}: toggle  ESC: quit")
            }
        }
    }

    fn enable(&mut self) -> Result<(), ConfigError> {
        let handle = self.registry.install(&self.settings)?;
        let warnings = self.registry.warnings(&handle);
        if let Some(first) = warnings.first() {
            self.message = Some(format!("warning: {first}"));
        }
        self.handle = Some(handle);
        Ok(())
    }

    fn disable(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.dispose(&mut self.registry);
        }
        self.mode = Mode::Normal;
        self.status = None;
    }

    pub fn handle_key(&mut self, key: &KeyToken) -> HostAction {
        self.message = None;
        if *key == KeyToken::chord(KeyToken::Char('c'), ModMask::CTRL) {
            info!(target: "runtime", "interrupt");
            return HostAction::Quit;
        }
        match self.mode {
            Mode::Normal => self.handle_normal(key),
            Mode::Prefix => {
                self.handle_prefix(key);
                HostAction::Continue
            }
        }
    }

    fn handle_normal(&mut self, key: &KeyToken) -> HostAction {
        if *key == TOGGLE_KEY {
            if self.is_enabled() {
                self.disable();
                info!(target: "runtime", "prefix_digits_disabled");
            } else if let Err(err) = self.enable() {
                warn!(target: "runtime", %err, "prefix_digits_enable_failed");
                self.message = Some(err.to_string());
            } else {
                info!(target: "runtime", "prefix_digits_enabled");
            }
            return HostAction::Continue;
        }
        if self.is_enabled() && self.prefix_keys.contains(key) {
            self.enter_prefix();
            return HostAction::Continue;
        }
        match key {
            KeyToken::Named(NamedKey::Esc) => return HostAction::Quit,
            KeyToken::Named(NamedKey::Backspace) => {
                self.document.pop();
            }
            _ => self.self_insert(key, 1),
        }
        HostAction::Continue
    }

    fn enter_prefix(&mut self) {
        self.mode = Mode::Prefix;
        self.status = self
            .settings
            .show_status
            .then(|| self.settings.prefix_indicator.clone());
        debug!(target: "runtime", "prefix_mode_enter");
    }

    fn handle_prefix(&mut self, key: &KeyToken) {
        let Some(handle) = self.handle.as_ref() else {
            self.mode = Mode::Normal;
            return;
        };
        match self.registry.dispatch(handle, key) {
            Ok(Outcome::Pending { status }) => self.status = status,
            Ok(Outcome::Committed(commit)) => {
                self.document.push_str(&commit.insertion());
                if commit.resume == Resume::Idle {
                    self.mode = Mode::Normal;
                    self.status = None;
                } else {
                    self.status = commit.status;
                }
            }
            Ok(Outcome::Passthrough { key, prefix }) => {
                self.mode = Mode::Normal;
                self.status = None;
                if self.prefix_keys.contains(&key) {
                    self.enter_prefix();
                } else if key != KeyToken::Named(NamedKey::Esc) {
                    self.self_insert(&key, repeat_count(prefix));
                }
            }
            Err(err) => {
                warn!(target: "runtime", %err, "prefix_dispatch_error");
                self.message = Some(err.to_string());
            }
        }
    }

    fn self_insert(&mut self, key: &KeyToken, times: usize) {
        let text = match key {
            KeyToken::Named(NamedKey::Enter) => '\n',
            KeyToken::Named(NamedKey::Tab) => '\t',
            other => match other.as_char() {
                Some(c) => c,
                None => return,
            },
        };
        self.document.extend(std::iter::repeat_n(text, times));
    }
}
