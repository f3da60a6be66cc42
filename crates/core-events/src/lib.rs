//! Core key token types shared by the layout resolver, the binding registry
//! and the terminal host.
//!
//! Keys are named in configuration files using a compact Emacs-like
//! notation (`"a"`, `"SPC"`, `"RET"`, `"C-u"`, `"<f5>"`). [`KeyToken`]
//! implements both `FromStr` and `Display` for that notation so a parsed
//! key prints back the way a user would write it.

use std::fmt;
use std::str::FromStr;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ModMask: u16 { const CTRL=1; const ALT=2; const SHIFT=4; const META=8; const SUPER=16; }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Esc,
    Backspace,
    Tab,
    F(u8),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
}

/// Canonical logical key tokens.
///
/// `KeyToken::Chord` wraps a base token plus modifier mask so combinations
/// such as `C-u` stay distinguishable from the plain `u` key. Use
/// [`KeyToken::chord`] to build one; it collapses an empty mask back into
/// the base token so equal keys always compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyToken {
    Char(char),
    Named(NamedKey),
    Chord { base: Box<KeyToken>, mods: ModMask },
}

impl KeyToken {
    pub fn chord(base: KeyToken, mods: ModMask) -> Self {
        if mods.is_empty() {
            return base;
        }
        match base {
            KeyToken::Chord {
                base: inner,
                mods: inner_mods,
            } => KeyToken::Chord {
                base: inner,
                mods: inner_mods | mods,
            },
            other => KeyToken::Chord {
                base: Box::new(other),
                mods,
            },
        }
    }

    /// The printable character this key inserts when it is not bound, if any.
    pub fn as_char(&self) -> Option<char> {
        match self {
            KeyToken::Char(c) if !c.is_control() => Some(*c),
            _ => None,
        }
    }

    /// Parse a whitespace-free key name (see module docs for the notation).
    pub fn parse(text: &str) -> Result<Self, KeyParseError> {
        if text.is_empty() {
            return Err(KeyParseError::Empty);
        }
        let mut rest = text;
        let mut mods = ModMask::empty();
        // `C--` is ctrl + '-', so only strip a prefix when something follows it.
        while rest.len() > 2 && rest.as_bytes()[1] == b'-' {
            let bit = match rest.as_bytes()[0] {
                b'C' => ModMask::CTRL,
                b'M' => ModMask::ALT,
                b'S' => ModMask::SHIFT,
                b's' => ModMask::SUPER,
                b'H' => ModMask::META,
                _ => break,
            };
            mods |= bit;
            rest = &rest[2..];
        }
        let base = parse_base(rest).ok_or_else(|| KeyParseError::Unknown(text.to_string()))?;
        Ok(KeyToken::chord(base, mods))
    }
}

fn parse_base(name: &str) -> Option<KeyToken> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyToken::Char(c));
    }
    let token = match name {
        "SPC" | "<space>" => KeyToken::Char(' '),
        "RET" | "<return>" | "<enter>" => KeyToken::Named(NamedKey::Enter),
        "TAB" | "<tab>" => KeyToken::Named(NamedKey::Tab),
        "ESC" | "<escape>" | "<esc>" => KeyToken::Named(NamedKey::Esc),
        "DEL" | "<backspace>" => KeyToken::Named(NamedKey::Backspace),
        "<delete>" => KeyToken::Named(NamedKey::Delete),
        "<insert>" => KeyToken::Named(NamedKey::Insert),
        "<up>" => KeyToken::Named(NamedKey::Up),
        "<down>" => KeyToken::Named(NamedKey::Down),
        "<left>" => KeyToken::Named(NamedKey::Left),
        "<right>" => KeyToken::Named(NamedKey::Right),
        "<home>" => KeyToken::Named(NamedKey::Home),
        "<end>" => KeyToken::Named(NamedKey::End),
        "<prior>" | "<pageup>" => KeyToken::Named(NamedKey::PageUp),
        "<next>" | "<pagedown>" => KeyToken::Named(NamedKey::PageDown),
        _ => {
            let n = name.strip_prefix("<f")?.strip_suffix('>')?;
            let n: u8 = n.parse().ok()?;
            if n == 0 {
                return None;
            }
            KeyToken::Named(NamedKey::F(n))
        }
    };
    Some(token)
}

impl FromStr for KeyToken {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyToken::parse(s)
    }
}

impl fmt::Display for NamedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamedKey::Enter => f.write_str("RET"),
            NamedKey::Esc => f.write_str("ESC"),
            NamedKey::Backspace => f.write_str("DEL"),
            NamedKey::Tab => f.write_str("TAB"),
            NamedKey::F(n) => write!(f, "<f{n}>"),
            NamedKey::Up => f.write_str("<up>"),
            NamedKey::Down => f.write_str("<down>"),
            NamedKey::Left => f.write_str("<left>"),
            NamedKey::Right => f.write_str("<right>"),
            NamedKey::Home => f.write_str("<home>"),
            NamedKey::End => f.write_str("<end>"),
            NamedKey::PageUp => f.write_str("<prior>"),
            NamedKey::PageDown => f.write_str("<next>"),
            NamedKey::Insert => f.write_str("<insert>"),
            NamedKey::Delete => f.write_str("<delete>"),
        }
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyToken::Char(' ') => f.write_str("SPC"),
            KeyToken::Char(c) => write!(f, "{c}"),
            KeyToken::Named(named) => write!(f, "{named}"),
            KeyToken::Chord { base, mods } => {
                for (bit, prefix) in [
                    (ModMask::CTRL, "C-"),
                    (ModMask::ALT, "M-"),
                    (ModMask::SHIFT, "S-"),
                    (ModMask::SUPER, "s-"),
                    (ModMask::META, "H-"),
                ] {
                    if mods.contains(bit) {
                        f.write_str(prefix)?;
                    }
                }
                write!(f, "{base}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("empty key name")]
    Empty,
    #[error("unrecognized key name `{0}`")]
    Unknown(String),
}

/// Parse a list of key names, stopping at the first invalid entry.
pub fn parse_keys<S: AsRef<str>>(specs: &[S]) -> Result<Vec<KeyToken>, KeyParseError> {
    specs.iter().map(|s| KeyToken::parse(s.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_characters_parse_as_char_tokens() {
        assert_eq!(KeyToken::parse("a"), Ok(KeyToken::Char('a')));
        assert_eq!(KeyToken::parse(";"), Ok(KeyToken::Char(';')));
        assert_eq!(KeyToken::parse("ö"), Ok(KeyToken::Char('ö')));
        assert_eq!(KeyToken::parse("-"), Ok(KeyToken::Char('-')));
    }

    #[test]
    fn named_keys_and_aliases() {
        assert_eq!(KeyToken::parse("SPC"), Ok(KeyToken::Char(' ')));
        assert_eq!(KeyToken::parse("<space>"), Ok(KeyToken::Char(' ')));
        assert_eq!(
            KeyToken::parse("RET"),
            Ok(KeyToken::Named(NamedKey::Enter))
        );
        assert_eq!(
            KeyToken::parse("<f12>"),
            Ok(KeyToken::Named(NamedKey::F(12)))
        );
    }

    #[test]
    fn modifier_prefixes_build_chords() {
        let token = KeyToken::parse("C-u").unwrap();
        assert_eq!(
            token,
            KeyToken::Chord {
                base: Box::new(KeyToken::Char('u')),
                mods: ModMask::CTRL
            }
        );
        let token = KeyToken::parse("C-M-<up>").unwrap();
        match token {
            KeyToken::Chord { base, mods } => {
                assert_eq!(*base, KeyToken::Named(NamedKey::Up));
                assert_eq!(mods, ModMask::CTRL | ModMask::ALT);
            }
            other => panic!("expected chord, got {other:?}"),
        }
    }

    #[test]
    fn control_minus_is_a_chord_on_minus() {
        assert_eq!(
            KeyToken::parse("C--"),
            Ok(KeyToken::chord(KeyToken::Char('-'), ModMask::CTRL))
        );
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(KeyToken::parse(""), Err(KeyParseError::Empty));
        assert!(matches!(
            KeyToken::parse("<hyper-space>"),
            Err(KeyParseError::Unknown(_))
        ));
        assert!(matches!(
            KeyToken::parse("<f0>"),
            Err(KeyParseError::Unknown(_))
        ));
    }

    #[test]
    fn display_matches_parse_notation() {
        for name in ["a", "SPC", "RET", "C-u", "M-<f3>", "C--"] {
            let token = KeyToken::parse(name).unwrap();
            assert_eq!(token.to_string(), name);
        }
    }

    #[test]
    fn chord_with_empty_mask_collapses_to_base() {
        assert_eq!(
            KeyToken::chord(KeyToken::Char('x'), ModMask::empty()),
            KeyToken::Char('x')
        );
    }

    #[test]
    fn as_char_only_for_printable_chars() {
        assert_eq!(KeyToken::Char('q').as_char(), Some('q'));
        assert_eq!(KeyToken::Named(NamedKey::Tab).as_char(), None);
        assert_eq!(KeyToken::parse("C-q").unwrap().as_char(), None);
    }

    #[test]
    fn parse_keys_collects_or_fails_fast() {
        let keys = parse_keys(&["a", "SPC"]).unwrap();
        assert_eq!(keys, vec![KeyToken::Char('a'), KeyToken::Char(' ')]);
        assert!(parse_keys(&["a", "<bogus>"]).is_err());
    }
}
