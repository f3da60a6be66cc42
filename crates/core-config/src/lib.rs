//! Configuration loading and parsing.
//!
//! Parses `homedigits.toml` (or an override path provided by the binary)
//! into [`ConfigFile`], then resolves it into [`KeymapSettings`] for the
//! binding registry. Every field has a default, so a missing file yields a
//! working qwerty setup. A file that exists but cannot be read or parsed is
//! an error. Unknown fields are ignored (TOML deserialization tolerance).
//!
//! Layout selection: `layout.keys` (explicit key list) overrides
//! `layout.name`; `layout.digits` (explicit digit string) overrides
//! `layout.digit_order`.

use anyhow::{Context, Result};
use core_events::{KeyToken, parse_keys};
use core_keymap::KeymapSettings;
use core_layout::{ConfigError, DigitOrder, DigitOrderSpec, LayoutPreset, LayoutSpec};
use serde::Deserialize;
use std::{fs, io, path::PathBuf};
use tracing::info;

pub const CONFIG_FILE_NAME: &str = "homedigits.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct LayoutConfig {
    #[serde(default = "LayoutConfig::default_name")]
    pub name: String,
    #[serde(default)]
    pub keys: Option<Vec<String>>,
    #[serde(default = "LayoutConfig::default_digit_order")]
    pub digit_order: String,
    #[serde(default)]
    pub digits: Option<String>,
    #[serde(default)]
    pub strict: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            keys: None,
            digit_order: Self::default_digit_order(),
            digits: None,
            strict: false,
        }
    }
}

impl LayoutConfig {
    fn default_name() -> String {
        LayoutPreset::Qwerty.name().to_string()
    }
    fn default_digit_order() -> String {
        DigitOrder::Traditional.name().to_string()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct KeysConfig {
    /// Host keys that open prefix collection.
    #[serde(default = "KeysConfig::default_prefix")]
    pub prefix: Vec<String>,
    #[serde(default = "KeysConfig::default_negate")]
    pub negate: Vec<String>,
    #[serde(default = "KeysConfig::default_commit")]
    pub commit: Vec<String>,
    #[serde(default)]
    pub commit_and_continue: Vec<String>,
    #[serde(default)]
    pub decimal: Vec<String>,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            prefix: Self::default_prefix(),
            negate: Self::default_negate(),
            commit: Self::default_commit(),
            commit_and_continue: Vec::new(),
            decimal: Vec::new(),
        }
    }
}

impl KeysConfig {
    fn default_prefix() -> Vec<String> {
        vec!["C-u".to_string()]
    }
    fn default_negate() -> Vec<String> {
        vec!["-".to_string()]
    }
    fn default_commit() -> Vec<String> {
        vec!["RET".to_string()]
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "DisplayConfig::default_show_status")]
    pub show_status_message: bool,
    #[serde(default = "DisplayConfig::default_prefix_indicator")]
    pub prefix_indicator: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_status_message: Self::default_show_status(),
            prefix_indicator: Self::default_prefix_indicator(),
        }
    }
}

impl DisplayConfig {
    const fn default_show_status() -> bool {
        true
    }
    fn default_prefix_indicator() -> String {
        "C-u ".to_string()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InsertConfig {
    #[serde(default = "InsertConfig::default_decimal_text")]
    pub decimal_text: String,
}

impl Default for InsertConfig {
    fn default() -> Self {
        Self {
            decimal_text: Self::default_decimal_text(),
        }
    }
}

impl InsertConfig {
    fn default_decimal_text() -> String {
        ".".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    /// Accepted for compatibility; has no effect on behavior.
    #[serde(default)]
    pub auto_compile: bool,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub keys: KeysConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub insert: InsertConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("homedigits").join(CONFIG_FILE_NAME);
    }
    // Final fallback relative filename.
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(target: "config", path = %path.display(), "config_missing_using_defaults");
            return Ok(Config::default());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("reading {}", path.display()));
        }
    };
    let file = parse_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    info!(target: "config", path = %path.display(), "config_loaded");
    Ok(Config {
        raw: Some(content),
        file,
    })
}

pub fn parse_str(content: &str) -> Result<ConfigFile> {
    let file: ConfigFile = toml::from_str(content)?;
    if file.auto_compile {
        info!(target: "config", "auto_compile_ignored");
    }
    Ok(file)
}

impl Config {
    /// Resolve names and key strings into registry settings.
    pub fn keymap_settings(&self) -> Result<KeymapSettings, ConfigError> {
        let layout_cfg = &self.file.layout;
        let layout = match &layout_cfg.keys {
            Some(keys) => LayoutSpec::Keys(parse_keys(keys)?),
            None => LayoutSpec::Preset(layout_cfg.name.parse()?),
        };
        let digit_order = match &layout_cfg.digits {
            Some(digits) => DigitOrderSpec::Digits(digits.chars().collect()),
            None => DigitOrderSpec::Preset(layout_cfg.digit_order.parse()?),
        };
        let keys = &self.file.keys;
        Ok(KeymapSettings {
            layout,
            digit_order,
            strict_layout: layout_cfg.strict,
            show_status: self.file.display.show_status_message,
            prefix_indicator: self.file.display.prefix_indicator.clone(),
            negate_keys: parse_keys(&keys.negate)?,
            commit_keys: parse_keys(&keys.commit)?,
            commit_and_continue_keys: parse_keys(&keys.commit_and_continue)?,
            decimal_keys: parse_keys(&keys.decimal)?,
            decimal_text: self.file.insert.decimal_text.clone(),
        })
    }

    /// Host keys that open prefix collection.
    pub fn prefix_keys(&self) -> Result<Vec<KeyToken>, ConfigError> {
        Ok(parse_keys(&self.file.keys.prefix)?)
    }

    /// Replace the layout selection with a preset name (command line override).
    pub fn override_layout(&mut self, name: &str) {
        self.file.layout.name = name.to_string();
        self.file.layout.keys = None;
    }

    /// Replace the digit order selection with a preset name.
    pub fn override_digit_order(&mut self, name: &str) {
        self.file.layout.digit_order = name.to_string();
        self.file.layout.digits = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), body).unwrap();
        tmp
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.raw.is_none());
        let settings = cfg.keymap_settings().unwrap();
        assert_eq!(settings.layout, LayoutSpec::Preset(LayoutPreset::Qwerty));
        assert_eq!(
            settings.digit_order,
            DigitOrderSpec::Preset(DigitOrder::Traditional)
        );
        assert_eq!(settings.commit_keys, vec![KeyToken::parse("RET").unwrap()]);
        assert_eq!(settings.negate_keys, vec![KeyToken::Char('-')]);
        assert!(settings.show_status);
        assert_eq!(settings.decimal_text, ".");
        assert_eq!(
            cfg.prefix_keys().unwrap(),
            vec![KeyToken::parse("C-u").unwrap()]
        );
    }

    #[test]
    fn parses_every_section() {
        let tmp = write_config(
            r##"
auto_compile = true

[layout]
name = "colemak"
digit_order = "zero-first"
strict = true

[keys]
prefix = ["C-c"]
negate = ["_"]
commit = ["RET", "TAB"]
commit_and_continue = ["SPC"]
decimal = [","]

[display]
show_status_message = false
prefix_indicator = "# "

[insert]
decimal_text = ","
"##,
        );
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(cfg.file.auto_compile);
        let s = cfg.keymap_settings().unwrap();
        assert_eq!(s.layout, LayoutSpec::Preset(LayoutPreset::Colemak));
        assert_eq!(s.digit_order, DigitOrderSpec::Preset(DigitOrder::ZeroFirst));
        assert!(s.strict_layout);
        assert_eq!(s.negate_keys, vec![KeyToken::Char('_')]);
        assert_eq!(s.commit_keys.len(), 2);
        assert_eq!(s.commit_and_continue_keys, vec![KeyToken::Char(' ')]);
        assert_eq!(s.decimal_keys, vec![KeyToken::Char(',')]);
        assert!(!s.show_status);
        assert_eq!(s.prefix_indicator, "# ");
        assert_eq!(s.decimal_text, ",");
        assert_eq!(
            cfg.prefix_keys().unwrap(),
            vec![KeyToken::parse("C-c").unwrap()]
        );
    }

    #[test]
    fn explicit_keys_and_digits_override_names() {
        let tmp = write_config(
            "[layout]\nname = \"dvorak\"\nkeys = [\"x\", \"y\", \"SPC\"]\ndigits = \"120\"\n",
        );
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        let s = cfg.keymap_settings().unwrap();
        assert_eq!(
            s.layout,
            LayoutSpec::Keys(vec![
                KeyToken::Char('x'),
                KeyToken::Char('y'),
                KeyToken::Char(' ')
            ])
        );
        assert_eq!(s.digit_order, DigitOrderSpec::Digits(vec!['1', '2', '0']));
    }

    #[test]
    fn unknown_preset_names_surface_as_config_errors() {
        let tmp = write_config("[layout]\nname = \"bepo\"\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(matches!(
            cfg.keymap_settings(),
            Err(ConfigError::UnknownLayout(name)) if name == "bepo"
        ));

        let tmp = write_config("[layout]\ndigit_order = \"backwards\"\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(matches!(
            cfg.keymap_settings(),
            Err(ConfigError::UnknownDigitOrder(_))
        ));
    }

    #[test]
    fn invalid_key_names_surface_as_config_errors() {
        let tmp = write_config("[keys]\ncommit = [\"<nope>\"]\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(matches!(cfg.keymap_settings(), Err(ConfigError::Key(_))));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let tmp = write_config("[layout\nname = ");
        let err = load_from(Some(tmp.path().to_path_buf())).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let cfg = parse_str("[layout]\nname = \"workman\"\ncolor = \"red\"\n[future]\nx = 1\n")
            .unwrap();
        assert_eq!(cfg.layout.name, "workman");
    }

    #[test]
    fn command_line_overrides_replace_explicit_lists() {
        let tmp = write_config("[layout]\nkeys = [\"x\"]\ndigits = \"1\"\n");
        let mut cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        cfg.override_layout("numpad");
        cfg.override_digit_order("traditional");
        let s = cfg.keymap_settings().unwrap();
        assert_eq!(s.layout, LayoutSpec::Preset(LayoutPreset::Numpad));
        assert_eq!(s.digit_order, DigitOrderSpec::default());
    }

    #[test]
    fn load_logging_uses_config_target() {
        let tmp = write_config("auto_compile = true\n");
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        with_default(subscriber, || {
            load_from(Some(tmp.path().to_path_buf())).unwrap();
        });

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("INFO config:"));
        assert!(log_output.contains("auto_compile_ignored"));
        assert!(log_output.contains("config_loaded"));
    }
}
