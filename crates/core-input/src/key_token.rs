use core_events::{KeyToken, ModMask, NamedKey};
use crossterm::event::{
    KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind as CKeyEventKind,
    KeyModifiers as CKeyModifiers,
};

/// Map a crossterm key event into a key token, folding modifiers into a chord.
///
/// Returns `None` for releases and for key codes we do not support (e.g.
/// media keys). Shift on a character is dropped because the terminal already
/// reports the shifted character.
pub fn map_key_event(event: &CKeyEvent) -> Option<KeyToken> {
    if matches!(event.kind, CKeyEventKind::Release) {
        return None;
    }
    let mut mods = map_mod_mask(event.modifiers);
    let base = match event.code {
        CKeyCode::BackTab => {
            mods |= ModMask::SHIFT;
            KeyToken::Named(NamedKey::Tab)
        }
        ref code => map_key_token(code)?,
    };
    if matches!(base, KeyToken::Char(_)) {
        mods.remove(ModMask::SHIFT);
    }
    Some(KeyToken::chord(base, mods))
}

/// Convert a crossterm key code into an unmodified key token.
pub(crate) fn map_key_token(code: &CKeyCode) -> Option<KeyToken> {
    match code {
        CKeyCode::Char(c) => Some(KeyToken::Char(*c)),
        other => named_key(other).map(KeyToken::Named),
    }
}

fn named_key(code: &CKeyCode) -> Option<NamedKey> {
    Some(match code {
        CKeyCode::Enter => NamedKey::Enter,
        CKeyCode::Esc => NamedKey::Esc,
        CKeyCode::Backspace => NamedKey::Backspace,
        CKeyCode::Tab | CKeyCode::BackTab => NamedKey::Tab,
        CKeyCode::Up => NamedKey::Up,
        CKeyCode::Down => NamedKey::Down,
        CKeyCode::Left => NamedKey::Left,
        CKeyCode::Right => NamedKey::Right,
        CKeyCode::Home => NamedKey::Home,
        CKeyCode::End => NamedKey::End,
        CKeyCode::PageUp => NamedKey::PageUp,
        CKeyCode::PageDown => NamedKey::PageDown,
        CKeyCode::Insert => NamedKey::Insert,
        CKeyCode::Delete => NamedKey::Delete,
        CKeyCode::F(n) if *n > 0 => NamedKey::F(*n),
        // Lock keys, media keys, bare modifiers and F0.
        _ => return None,
    })
}

const MOD_TABLE: [(CKeyModifiers, ModMask); 5] = [
    (CKeyModifiers::CONTROL, ModMask::CTRL),
    (CKeyModifiers::ALT, ModMask::ALT),
    (CKeyModifiers::SHIFT, ModMask::SHIFT),
    (CKeyModifiers::SUPER, ModMask::SUPER),
    (CKeyModifiers::META, ModMask::META),
];

/// Convert crossterm modifier flags into `ModMask` bits.
pub(crate) fn map_mod_mask(mods: CKeyModifiers) -> ModMask {
    MOD_TABLE
        .iter()
        .filter(|(flag, _)| mods.contains(*flag))
        .fold(ModMask::empty(), |acc, (_, bit)| acc | *bit)
}
