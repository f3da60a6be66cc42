//! Blocking terminal input: reads crossterm events and turns them into key
//! tokens for the host loop.

mod key_token;

pub use key_token::map_key_event;

use anyhow::Result;
use core_events::KeyToken;
use crossterm::event::{self, Event as CEvent};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyToken),
    /// Terminal resize (columns, rows).
    Resize(u16, u16),
}

/// Translate one crossterm event. Events the host has no use for (mouse,
/// focus, paste, key releases) yield `None`.
pub fn translate_event(event: &CEvent) -> Option<InputEvent> {
    match event {
        CEvent::Key(key) => map_key_event(key).map(InputEvent::Key),
        CEvent::Resize(cols, rows) => Some(InputEvent::Resize(*cols, *rows)),
        _ => None,
    }
}

/// Block until the next event the host cares about.
pub fn next_event() -> Result<InputEvent> {
    loop {
        let raw = event::read()?;
        if let Some(ev) = translate_event(&raw) {
            if let InputEvent::Key(ref key) = ev {
                trace!(target: "input.key", key = %key, "keypress");
            }
            return Ok(ev);
        }
    }
}
